use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Pos2, ScrollArea, Sense, Shape, Stroke, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Legend, Line, Plot, PlotPoints, Polygon};

use crate::color::SeriesColors;
use crate::data::plot_spec::{format_value, ChartKind, PlotSpec, Series, SeriesKind};
use crate::state::{AppState, DashboardView, Panel, PanelContent};
use crate::ui::{panels, table};

const CHART_HEIGHT: f32 = 280.0;
const PIE_SIZE: f32 = 260.0;
/// Share of one x unit taken by a group of bars.
const BAR_GROUP_WIDTH: f64 = 0.8;
/// Largest arc drawn as one convex polygon.
const MAX_WEDGE_SWEEP: f32 = FRAC_PI_2;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the current view: tables, charts, or a notice.
pub fn central_view(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match &state.view {
            DashboardView::Blocked(notice) => {
                ui.add_space(24.0);
                panels::notice_label(ui, notice);
            }
            DashboardView::SingleYear {
                heading,
                population,
                wage,
                wage_panel,
            } => {
                ui.heading(heading);
                ui.strong("Population");
                table::data_table(ui, "population_table", population);
                ui.add_space(8.0);
                ui.strong("Wages");
                table::data_table(ui, "wage_table", wage);
                ui.add_space(8.0);
                panel(ui, 0, wage_panel);
            }
            DashboardView::Range { heading, panels } => {
                ui.heading(heading);
                for (i, p) in panels.iter().enumerate() {
                    panel(ui, i, p);
                }
            }
        });
}

fn panel(ui: &mut Ui, idx: usize, panel: &Panel) {
    if let Some(heading) = &panel.heading {
        ui.heading(heading);
    }
    match &panel.content {
        PanelContent::Chart(spec) => chart(ui, idx, spec),
        PanelContent::Notice(notice) => panels::notice_label(ui, notice),
    }
    ui.add_space(12.0);
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Render one [`PlotSpec`].
pub fn chart(ui: &mut Ui, idx: usize, spec: &PlotSpec) {
    ui.strong(&spec.title);
    let colors = SeriesColors::new(spec.series.iter().map(|s| s.label.as_str()));

    if spec.kind == ChartKind::Pie {
        pie_chart(ui, spec, &colors);
        return;
    }

    let mut plot = Plot::new(("chart", idx))
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(spec.x_column.clone())
        .allow_scroll(false)
        .allow_boxed_zoom(true);
    if let Some(step) = spec.x_tick_step {
        plot = plot.x_grid_spacer(uniform_grid_spacer(move |_| {
            [step, step * 5.0, step * 10.0]
        }));
    }

    let bar_count = spec
        .series
        .iter()
        .filter(|s| s.kind == SeriesKind::Bar)
        .count();

    plot.show(ui, |plot_ui| {
        let mut bar_index = 0;
        for series in &spec.series {
            let color = colors.color_for(&series.label);
            match series.kind {
                SeriesKind::Line => {
                    let points: PlotPoints = series
                        .x_values
                        .iter()
                        .zip(&series.y_values)
                        .map(|(&x, &y)| [x, y])
                        .collect();
                    plot_ui.line(Line::new(points).name(&series.label).color(color).width(2.0));
                }
                SeriesKind::Bar => {
                    let (offset, width) = bar_slot(bar_index, bar_count);
                    bar_index += 1;
                    let bars: Vec<Bar> = series
                        .x_values
                        .iter()
                        .zip(&series.y_values)
                        .zip(&series.hover)
                        .map(|((&x, &y), hover)| Bar::new(x + offset, y).width(width).name(hover))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(&series.label).color(color));
                }
                SeriesKind::Area => {
                    let fill = color.gamma_multiply(0.4);
                    for quad in area_quads(series) {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(quad.to_vec()))
                                .fill_color(fill)
                                .name(&series.label),
                        );
                    }
                    let top: PlotPoints = series
                        .x_values
                        .iter()
                        .zip(series.y_values.iter().zip(&series.baseline))
                        .map(|(&x, (&y, &b))| [x, b + y])
                        .collect();
                    plot_ui.line(Line::new(top).name(&series.label).color(color).width(2.0));
                }
                SeriesKind::Slice => {}
            }
        }
    });
}

/// Offset from the group centre and width of bar `index` among `count` grouped bars.
fn bar_slot(index: usize, count: usize) -> (f64, f64) {
    let count = count.max(1) as f64;
    let width = BAR_GROUP_WIDTH / count;
    let offset = (index as f64 - (count - 1.0) / 2.0) * width;
    (offset, width)
}

/// One convex quad per segment between consecutive points, baseline to top.
fn area_quads(series: &Series) -> Vec<[[f64; 2]; 4]> {
    let points: Vec<(f64, f64, f64)> = series
        .x_values
        .iter()
        .zip(series.y_values.iter().zip(&series.baseline))
        .map(|(&x, (&y, &b))| (x, b, b + y))
        .collect();
    points
        .windows(2)
        .map(|w| {
            let (x0, b0, t0) = w[0];
            let (x1, b1, t1) = w[1];
            [[x0, b0], [x1, b1], [x1, t1], [x0, t0]]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

fn pie_chart(ui: &mut Ui, spec: &PlotSpec, colors: &SeriesColors) {
    let slices: Vec<(&str, f64)> = spec.slices().filter(|(_, v)| *v > 0.0).collect();
    let total: f64 = slices.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        ui.label("Nothing to draw: all values are zero.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) =
            ui.allocate_painter(egui::vec2(PIE_SIZE, PIE_SIZE), Sense::hover());
        let center = response.rect.center();
        let radius = response.rect.width().min(response.rect.height()) * 0.45;
        let outline = Stroke::new(1.0, ui.visuals().panel_fill);

        let hover_angle = response.hover_pos().and_then(|pos| {
            let d = pos - center;
            (d.length() <= radius).then(|| (d.angle() + FRAC_PI_2).rem_euclid(TAU))
        });

        let mut start = 0.0_f32;
        let mut hovered = None;
        for &(label, value) in &slices {
            let sweep = (value / total) as f32 * TAU;
            let color = colors.color_for(label);
            for wedge in wedge_points(center, radius, start - FRAC_PI_2, sweep) {
                painter.add(Shape::convex_polygon(wedge, color, outline));
            }
            if hover_angle.is_some_and(|a| a >= start && a < start + sweep) {
                hovered = Some(format!(
                    "{label}: {} ({:.1}%)",
                    format_value(value),
                    value / total * 100.0
                ));
            }
            start += sweep;
        }
        if let Some(text) = hovered {
            response.on_hover_text(text);
        }

        ui.vertical(|ui: &mut Ui| {
            for &(label, value) in &slices {
                ui.horizontal(|ui: &mut Ui| {
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, colors.color_for(label));
                    ui.label(format!("{label}: {}", format_value(value)));
                });
            }
        });
    });
}

/// Split a pie wedge into convex pieces no wider than [`MAX_WEDGE_SWEEP`].
fn wedge_points(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<Vec<Pos2>> {
    let pieces = (sweep / MAX_WEDGE_SWEEP).ceil().max(1.0) as usize;
    let piece_sweep = sweep / pieces as f32;
    (0..pieces)
        .map(|p| {
            let from = start + p as f32 * piece_sweep;
            let steps = 16;
            std::iter::once(center)
                .chain((0..=steps).map(|s| {
                    let a = from + piece_sweep * s as f32 / steps as f32;
                    center + radius * egui::vec2(a.cos(), a.sin())
                }))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_bars_are_centred() {
        let (o0, w) = bar_slot(0, 2);
        let (o1, _) = bar_slot(1, 2);
        assert!((w - 0.4).abs() < 1e-9);
        assert!((o0 + 0.2).abs() < 1e-9);
        assert!((o1 - 0.2).abs() < 1e-9);
        assert_eq!(bar_slot(0, 1).0, 0.0);
    }

    #[test]
    fn area_quads_span_baseline_to_top() {
        let series = Series {
            label: "I".into(),
            kind: SeriesKind::Area,
            x_values: vec![2019.0, 2020.0, 2021.0],
            y_values: vec![1.0, 2.0, 3.0],
            baseline: vec![10.0, 10.0, 10.0],
            hover: Vec::new(),
        };
        let quads = area_quads(&series);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0], [[2019.0, 10.0], [2020.0, 10.0], [2020.0, 12.0], [2019.0, 11.0]]);
    }

    #[test]
    fn wide_wedges_are_split() {
        let pieces = wedge_points(Pos2::ZERO, 1.0, 0.0, TAU * 0.6);
        assert_eq!(pieces.len(), 3);
        assert!(pieces.iter().all(|p| p[0] == Pos2::ZERO));
    }
}
