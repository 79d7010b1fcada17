use std::path::PathBuf;

use super::plot_spec::ChartKind;

/// Everything the data layer can report back to the dashboard.
///
/// Loader and registry failures become blocking notices; filter and plot
/// failures are ordinary return values the caller turns into inline messages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("File not found: {}", path.display())]
    FileMissing { path: PathBuf },

    #[error("Cannot parse {}: {reason}", path.display())]
    FileParse { path: PathBuf, reason: String },

    #[error("No data: {0}")]
    NoData(String),

    #[error("Invalid year range: start {start} must be before end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("No data for the selected parameters")]
    EmptyResult,

    #[error("{kind} chart needs exactly one row, got {rows}")]
    UnsupportedPlot { kind: ChartKind, rows: usize },

    #[error("None of the requested columns are present: {}", requested.join(", "))]
    NoSeries { requested: Vec<String> },

    #[error("Column '{0}' not found")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, DataError>;

/// How prominently an error should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Blocking,
}

impl DataError {
    pub fn severity(&self) -> Severity {
        match self {
            DataError::EmptyResult => Severity::Info,
            DataError::InvalidRange { .. }
            | DataError::UnsupportedPlot { .. }
            | DataError::NoSeries { .. }
            | DataError::MissingColumn(_) => Severity::Warning,
            DataError::FileMissing { .. } | DataError::FileParse { .. } | DataError::NoData(_) => {
                Severity::Blocking
            }
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DataError::FileParse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
