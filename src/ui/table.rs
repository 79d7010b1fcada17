use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Table, Value};
use crate::data::plot_spec::format_value;

const HEADER_HEIGHT: f32 = 22.0;
const ROW_HEIGHT: f32 = 20.0;

/// Render a table with every column, scrolling horizontally when wide.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table) {
    if table.is_empty() {
        ui.label("No rows for this selection.");
        return;
    }

    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(48.0), table.columns().len())
                .header(HEADER_HEIGHT, |mut header| {
                    for name in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in table.rows() {
                        body.row(ROW_HEIGHT, |mut cells| {
                            for value in row.values() {
                                cells.col(|ui: &mut Ui| {
                                    ui.label(cell_text(value));
                                });
                            }
                        });
                    }
                });
        });
    });
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Float(v) => format_value(*v),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_compactly() {
        assert_eq!(cell_text(&Value::Float(51344.0)), "51344");
        assert_eq!(cell_text(&Value::Float(0.126)), "0.13");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&Value::Text("Москва".into())), "Москва");
    }
}
