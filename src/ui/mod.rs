//! egui rendering of the dashboard state.

pub mod panels;
pub mod plot;
pub mod table;
