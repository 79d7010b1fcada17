use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::error::Severity;
use crate::data::plot_spec::ChartKind;
use crate::data::registry::Category;
use crate::data::model::{MONTH_COLUMNS, QUARTER_COLUMNS};
use crate::state::{AppState, Notice, WageView, YearMode};

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

pub fn severity_color(severity: Severity) -> Color32 {
    match severity {
        Severity::Info => Color32::LIGHT_BLUE,
        Severity::Warning => Color32::from_rgb(230, 170, 40),
        Severity::Blocking => Color32::RED,
    }
}

pub fn notice_label(ui: &mut Ui, notice: &Notice) {
    ui.label(RichText::new(&notice.message).color(severity_color(notice.severity)));
}

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection");
    ui.separator();

    if state.regions.is_empty() {
        ui.label("No regions loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            region_picker(ui, state);
            ui.separator();
            year_controls(ui, state);
            ui.separator();

            ui.strong("Category");
            let mut category = state.category;
            ui.horizontal(|ui: &mut Ui| {
                for c in Category::ALL {
                    ui.radio_value(&mut category, c, c.label());
                }
            });
            state.set_category(category);
            ui.separator();

            wage_controls(ui, state);
            ui.separator();

            age_picker(ui, state);
        });
}

fn region_picker(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Region");
    let current = state.region.clone().unwrap_or_default();
    let mut picked = None;
    egui::ComboBox::from_id_salt("region")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for region in &state.regions {
                if ui.selectable_label(current == *region, region).clicked() {
                    picked = Some(region.clone());
                }
            }
        });
    if let Some(region) = picked {
        state.set_region(region);
    }
}

fn year_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Years");
    let mut mode = state.year_mode;
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut mode, YearMode::Single, "Single year");
        ui.radio_value(&mut mode, YearMode::Range, "Range");
    });
    state.set_year_mode(mode);

    let Some((min, max)) = state.year_bounds else {
        ui.label("No years available.");
        return;
    };

    match state.year_mode {
        YearMode::Single => {
            let mut year = state.single_year;
            ui.add(egui::Slider::new(&mut year, min..=max).text("Year"));
            state.set_single_year(year);
        }
        YearMode::Range => {
            let (mut start, mut end) = (state.range_start, state.range_end);
            ui.add(egui::Slider::new(&mut start, min..=max).text("From"));
            ui.add(egui::Slider::new(&mut end, min..=max).text("To"));
            state.set_year_range(start, end);
            if let Some(e) = state.range_error() {
                ui.label(RichText::new(e.to_string()).color(severity_color(e.severity())));
            }
        }
    }
}

fn wage_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Wage chart");
    let mut view = state.wage_view;
    egui::ComboBox::from_id_salt("wage_view")
        .selected_text(view.label())
        .show_ui(ui, |ui: &mut Ui| {
            for v in WageView::ALL {
                ui.selectable_value(&mut view, v, v.label());
            }
        });
    state.set_wage_view(view);

    let mut kind = state.chart_kind;
    egui::ComboBox::from_id_salt("chart_kind")
        .selected_text(kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for k in ChartKind::ALL {
                ui.selectable_value(&mut kind, k, k.label());
            }
        });
    state.set_chart_kind(kind);

    // Only the active view's series are offered.
    match state.wage_view {
        WageView::Average => {}
        WageView::Quarters => {
            if let Some(q) = checkbox_row(ui, QUARTER_COLUMNS, &state.selected_quarters) {
                state.toggle_quarter(&q);
            }
        }
        WageView::Months => {
            if let Some(m) = checkbox_row(ui, MONTH_COLUMNS, &state.selected_months) {
                state.toggle_month(&m);
            }
        }
    }
}

fn age_picker(ui: &mut Ui, state: &mut AppState) {
    let header = format!(
        "Ages  ({}/{})",
        state.selected_ages.len(),
        state.available_ages.len()
    );
    let mut toggled = None;
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("ages")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            toggled = checkbox_row(ui, &state.available_ages, &state.selected_ages);
        });
    if let Some(age) = toggled {
        state.toggle_age(&age);
    }
}

/// Wrapped checkboxes; returns the option whose box was clicked this frame.
fn checkbox_row<S: AsRef<str>>(ui: &mut Ui, offered: &[S], selected: &[String]) -> Option<String> {
    let mut toggled = None;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for option in offered {
            let option = option.as_ref();
            let mut checked = selected.iter().any(|s| s == option);
            if ui.checkbox(&mut checked, option).changed() {
                toggled = Some(option.to_string());
            }
        }
    });
    toggled
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload(state.config.clone());
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Data: {}", state.config.data_dir.display()));
    });
}

/// Dataset cards plus any load failures.
pub fn summary_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for summary in &state.summaries {
            egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                ui.vertical(|ui: &mut Ui| {
                    ui.strong(&summary.label);
                    ui.label(format!("{} records", summary.record_count));
                    ui.label(format!("Years: {}", summary.year_span));
                    ui.label(format!("Regions: {}", summary.region_count));
                });
            });
        }
    });
    for notice in &state.load_notices {
        notice_label(ui, notice);
    }
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open statistics folder")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(dir) = folder {
        let mut config = state.config.clone();
        config.data_dir = dir;
        state.reload(config);
        log::info!(
            "Loaded {} datasets, {} regions",
            state.summaries.len(),
            state.regions.len()
        );
    }
}
