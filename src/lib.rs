//! Regional population and wage statistics explorer.
//!
//! The [`data`] layer loads the four statistics tables, filters them by the
//! user's selection and turns the result into chart specifications. [`state`]
//! holds the selection and the computed view; [`ui`] and [`app`] draw it with egui.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
