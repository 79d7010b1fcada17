use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{DataError, Result};
use super::model::Table;

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

/// Chart requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
    Area,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Area,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Pie => "Pie",
            ChartKind::Area => "Area",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a single series is drawn. May differ from the requested [`ChartKind`]
/// (a line over a single year is drawn as bars).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Bar,
    /// Filled between `baseline` and `baseline + y`.
    Area,
    Slice,
}

// ---------------------------------------------------------------------------
// PlotSpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub kind: SeriesKind,
    /// Empty for pie slices.
    pub x_values: Vec<f64>,
    pub y_values: Vec<f64>,
    /// Stack offset per point; zeros except for stacked areas.
    pub baseline: Vec<f64>,
    /// One hover line per point.
    pub hover: Vec<String>,
}

/// Chart-ready description handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub title: String,
    pub x_column: String,
    pub kind: ChartKind,
    pub series: Vec<Series>,
    /// `Some(1.0)` asks for one labelled tick per year.
    pub x_tick_step: Option<f64>,
}

impl PlotSpec {
    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    /// `(label, value)` for each pie slice.
    pub fn slices(&self) -> impl Iterator<Item = (&str, f64)> {
        self.series
            .iter()
            .filter(|s| s.kind == SeriesKind::Slice)
            .filter_map(|s| s.y_values.first().map(|&v| (s.label.as_str(), v)))
    }
}

/// Format a value for hover text and table cells: integers without a fraction.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.2}")
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Turn a (filtered) table into a [`PlotSpec`].
///
/// * Requested y columns missing from the schema are skipped; if none remain the
///   build fails with [`DataError::NoSeries`].
/// * `Pie` needs exactly one row; each y column becomes a slice.
/// * `Line` and `Area` in `single_point_mode` become one bar per y column.
/// * `Area` stacks series in the order given.
/// * Rows with a missing x or y value are left out of that series.
pub fn build<S: AsRef<str>>(
    table: &Table,
    x_column: &str,
    y_columns: &[S],
    kind: ChartKind,
    title: &str,
    single_point_mode: bool,
) -> Result<PlotSpec> {
    let present: Vec<&str> = y_columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| {
            let found = table.has_column(c);
            if !found {
                log::debug!("Skipping column '{c}' missing from table for '{title}'");
            }
            found
        })
        .collect();

    if present.is_empty() {
        return Err(DataError::NoSeries {
            requested: y_columns.iter().map(|c| c.as_ref().to_string()).collect(),
        });
    }

    let series = if kind == ChartKind::Pie {
        pie_slices(table, &present)?
    } else {
        if !table.has_column(x_column) {
            return Err(DataError::MissingColumn(x_column.to_string()));
        }
        let series_kind = match (kind, single_point_mode) {
            (ChartKind::Line | ChartKind::Area, true) | (ChartKind::Bar, _) => SeriesKind::Bar,
            (ChartKind::Area, false) => SeriesKind::Area,
            _ => SeriesKind::Line,
        };
        xy_series(table, x_column, &present, series_kind)
    };

    let x_tick_step = if kind != ChartKind::Pie && !single_point_mode {
        let distinct: BTreeSet<u64> = table
            .rows()
            .filter_map(|r| r.get(x_column).and_then(|v| v.as_f64()))
            .map(f64::to_bits)
            .collect();
        (distinct.len() > 1).then_some(1.0)
    } else {
        None
    };

    Ok(PlotSpec {
        title: title.to_string(),
        x_column: x_column.to_string(),
        kind,
        series,
        x_tick_step,
    })
}

fn pie_slices(table: &Table, columns: &[&str]) -> Result<Vec<Series>> {
    let (1, Some(row)) = (table.len(), table.row(0)) else {
        return Err(DataError::UnsupportedPlot {
            kind: ChartKind::Pie,
            rows: table.len(),
        });
    };

    let slices: Vec<Series> = columns
        .iter()
        .filter_map(|&c| {
            let value = row.get(c)?.as_f64()?;
            Some(Series {
                label: c.to_string(),
                kind: SeriesKind::Slice,
                x_values: Vec::new(),
                y_values: vec![value],
                baseline: vec![0.0],
                hover: vec![format!("{c}: {}", format_value(value))],
            })
        })
        .collect();

    if slices.is_empty() {
        return Err(DataError::NoSeries {
            requested: columns.iter().map(|c| c.to_string()).collect(),
        });
    }
    Ok(slices)
}

fn xy_series(table: &Table, x_column: &str, columns: &[&str], kind: SeriesKind) -> Vec<Series> {
    let xs: Vec<Option<f64>> = table
        .rows()
        .map(|r| r.get(x_column).and_then(|v| v.as_f64()))
        .collect();
    // Running stack height per row, only advanced for areas.
    let mut stack = vec![0.0; table.len()];

    columns
        .iter()
        .map(|&c| {
            let mut series = Series {
                label: c.to_string(),
                kind,
                x_values: Vec::new(),
                y_values: Vec::new(),
                baseline: Vec::new(),
                hover: Vec::new(),
            };
            for (i, row) in table.rows().enumerate() {
                let (Some(x), Some(y)) = (xs[i], row.get(c).and_then(|v| v.as_f64())) else {
                    continue;
                };
                series.x_values.push(x);
                series.y_values.push(y);
                series.baseline.push(stack[i]);
                series.hover.push(format!(
                    "{c}\n{x_column}: {}\n{}",
                    format_value(x),
                    format_value(y)
                ));
                if kind == SeriesKind::Area {
                    stack[i] += y;
                }
            }
            series
        })
        .collect()
}
