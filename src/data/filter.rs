use super::error::{DataError, Result};
use super::model::{RowRef, Table};
use super::registry::{Category, DatasetKind, DatasetRegistry};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which years the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSelection {
    Single(i64),
    /// Inclusive on both ends; `start < end` is required.
    Range { start: i64, end: i64 },
}

impl YearSelection {
    /// Checked constructor for a range selection.
    pub fn range(start: i64, end: i64) -> Result<Self> {
        YearSelection::Range { start, end }.validated()
    }

    pub fn validated(self) -> Result<Self> {
        match self {
            YearSelection::Range { start, end } if start >= end => {
                Err(DataError::InvalidRange { start, end })
            }
            other => Ok(other),
        }
    }

    pub fn contains(&self, year: i64) -> bool {
        match *self {
            YearSelection::Single(y) => year == y,
            YearSelection::Range { start, end } => (start..=end).contains(&year),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, YearSelection::Single(_))
    }
}

/// The user's resolved control values for one recompute pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub region: String,
    pub years: YearSelection,
    pub category: Category,
}

/// Rows matching a selection. Recomputed from scratch on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResult {
    pub population: Table,
    /// Wage rows for the selected years; may be empty.
    pub wage: Table,
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Filter the category's population table and the wage table held by `registry`.
///
/// A wage table that failed to load is treated as an empty one.
pub fn filter(registry: &DatasetRegistry, selection: &SelectionState) -> Result<FilteredResult> {
    selection.years.validated()?;
    let kind = selection.category.dataset();
    let population = registry
        .table(kind)
        .ok_or_else(|| DataError::NoData(format!("{kind} is not loaded")))?;
    filter_tables(population, registry.table(DatasetKind::Wage), selection)
}

/// Stable filter of `population` by region and years, and of `wage` by years.
pub fn filter_tables(
    population: &Table,
    wage: Option<&Table>,
    selection: &SelectionState,
) -> Result<FilteredResult> {
    let years = selection.years.validated()?;

    let region_col = population
        .region_column()
        .ok_or_else(|| DataError::MissingColumn("region".to_string()))?;
    let year_col = population
        .year_column()
        .ok_or_else(|| DataError::MissingColumn("year".to_string()))?;

    let population = population.filter_rows(|row| {
        row.get(region_col)
            .is_some_and(|v| v.as_key().trim() == selection.region)
            && year_matches(row, year_col, &years)
    });
    if population.is_empty() {
        return Err(DataError::EmptyResult);
    }

    let wage = match wage {
        Some(table) => match table.year_column() {
            Some(wage_year_col) => table.filter_rows(|row| year_matches(row, wage_year_col, &years)),
            None => {
                log::warn!("Wage table has no year column");
                table.empty_like()
            }
        },
        None => Table::default(),
    };

    log::debug!(
        "Filtered {} population rows and {} wage rows for {:?}",
        population.len(),
        wage.len(),
        selection
    );
    Ok(FilteredResult { population, wage })
}

fn year_matches(row: &RowRef<'_>, year_col: &str, years: &YearSelection) -> bool {
    row.get(year_col)
        .and_then(|v| v.as_i64())
        .is_some_and(|y| years.contains(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn population() -> Table {
        let mut t = Table::new(["Region", "Year", "Total"]);
        for (region, year, total) in [
            ("A", 2019, 100),
            ("B", 2019, 50),
            ("A", 2020, 110),
            ("A", 2021, 120),
        ] {
            t.push_row(vec![
                Value::Text(region.into()),
                Value::Integer(year),
                Value::Integer(total),
            ]);
        }
        t
    }

    fn wage() -> Table {
        let mut t = Table::new(["Год", "В среднем за год"]);
        for (year, avg) in [(2020, 51_344.0), (2021, 57_244.0)] {
            t.push_row(vec![Value::Integer(year), Value::Float(avg)]);
        }
        t
    }

    fn selection(years: YearSelection) -> SelectionState {
        SelectionState {
            region: "A".into(),
            years,
            category: Category::Total,
        }
    }

    fn totals(t: &Table) -> Vec<i64> {
        t.rows()
            .filter_map(|r| r.get("Total").and_then(|v| v.as_i64()))
            .collect()
    }

    #[test]
    fn range_is_inclusive_and_keeps_order() {
        let sel = selection(YearSelection::Range {
            start: 2019,
            end: 2020,
        });
        let out = filter_tables(&population(), Some(&wage()), &sel).unwrap();
        assert_eq!(totals(&out.population), vec![100, 110]);
        assert_eq!(out.wage.years(), vec![2020]);
    }

    #[test]
    fn single_year_matches_exactly() {
        let out = filter_tables(
            &population(),
            Some(&wage()),
            &selection(YearSelection::Single(2021)),
        )
        .unwrap();
        assert_eq!(totals(&out.population), vec![120]);
        assert_eq!(out.wage.len(), 1);
    }

    #[test]
    fn inverted_or_empty_range_is_rejected() {
        for (start, end) in [(2020, 2019), (2020, 2020)] {
            let sel = selection(YearSelection::Range { start, end });
            assert_eq!(
                filter_tables(&population(), None, &sel).unwrap_err(),
                DataError::InvalidRange { start, end }
            );
        }
        assert!(YearSelection::range(2019, 2020).is_ok());
        assert!(YearSelection::range(2020, 2019).is_err());
    }

    #[test]
    fn no_matching_rows_is_empty_result() {
        let mut sel = selection(YearSelection::Single(2019));
        sel.region = "Z".into();
        assert_eq!(
            filter_tables(&population(), None, &sel).unwrap_err(),
            DataError::EmptyResult
        );
    }

    #[test]
    fn empty_wage_subset_is_not_an_error() {
        let out = filter_tables(
            &population(),
            Some(&wage()),
            &selection(YearSelection::Single(2019)),
        )
        .unwrap();
        assert_eq!(out.population.len(), 1);
        assert!(out.wage.is_empty());
        assert!(out.wage.has_column("В среднем за год"));
    }

    #[test]
    fn filtering_is_idempotent() {
        let sel = selection(YearSelection::Range {
            start: 2019,
            end: 2021,
        });
        let once = filter_tables(&population(), Some(&wage()), &sel).unwrap();
        let twice = filter_tables(&once.population, Some(&once.wage), &sel).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn registry_filter_uses_category_table() {
        let reg = DatasetRegistry::from_tables([(DatasetKind::Male, population())]);
        let mut sel = selection(YearSelection::Single(2020));
        assert!(matches!(filter(&reg, &sel), Err(DataError::NoData(_))));

        sel.category = Category::Male;
        let out = filter(&reg, &sel).unwrap();
        assert_eq!(totals(&out.population), vec![110]);
        assert!(out.wage.is_empty());
    }
}
