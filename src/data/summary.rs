use std::collections::BTreeSet;

use super::model::Table;

/// Display metadata for one dataset card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub label: String,
    pub record_count: usize,
    /// `"2011–2022"`, a single year, or `"N/A"`.
    pub year_span: String,
    pub region_count: usize,
}

/// Never fails: an empty table yields zeros and an `"N/A"` span.
pub fn summarize(table: &Table, label: &str) -> Summary {
    let years = table.years();
    let year_span = match (years.iter().min(), years.iter().max()) {
        (Some(lo), Some(hi)) if lo == hi => lo.to_string(),
        (Some(lo), Some(hi)) => format!("{lo}–{hi}"),
        _ => "N/A".to_string(),
    };
    let region_count = table.regions().into_iter().collect::<BTreeSet<_>>().len();

    Summary {
        label: label.to_string(),
        record_count: table.len(),
        year_span,
        region_count,
    }
}
