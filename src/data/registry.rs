use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use super::error::{DataError, Result};
use super::loader;
use super::model::Table;

// ---------------------------------------------------------------------------
// Dataset keys
// ---------------------------------------------------------------------------

/// The four input tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    Total,
    Male,
    Female,
    Wage,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Total,
        DatasetKind::Male,
        DatasetKind::Female,
        DatasetKind::Wage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::Total => "Population (total)",
            DatasetKind::Male => "Population (male)",
            DatasetKind::Female => "Population (female)",
            DatasetKind::Wage => "Wages",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Population segmentation chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    Total,
    Male,
    Female,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Total, Category::Male, Category::Female];

    pub fn label(self) -> &'static str {
        match self {
            Category::Total => "Total",
            Category::Male => "Male",
            Category::Female => "Female",
        }
    }

    /// Population table backing this category.
    pub fn dataset(self) -> DatasetKind {
        match self {
            Category::Total => DatasetKind::Total,
            Category::Male => DatasetKind::Male,
            Category::Female => DatasetKind::Female,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owns the loaded tables for the lifetime of the dashboard.
///
/// Each dataset is loaded at most once; a failed load is remembered as well so
/// the error can be shown without touching the file again.
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    sources: BTreeMap<DatasetKind, PathBuf>,
    tables: BTreeMap<DatasetKind, Table>,
    failures: BTreeMap<DatasetKind, DataError>,
}

impl DatasetRegistry {
    /// Registry reading each dataset from the given path on first use.
    pub fn new(sources: BTreeMap<DatasetKind, PathBuf>) -> Self {
        DatasetRegistry {
            sources,
            ..Default::default()
        }
    }

    /// Registry over tables that are already in memory.
    pub fn from_tables(tables: impl IntoIterator<Item = (DatasetKind, Table)>) -> Self {
        DatasetRegistry {
            tables: tables.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Load `kind`, reusing the cached table (or cached failure) on repeat calls.
    pub fn load(&mut self, kind: DatasetKind) -> Result<&Table> {
        if !self.tables.contains_key(&kind) && !self.failures.contains_key(&kind) {
            let outcome = match self.sources.get(&kind) {
                Some(path) => loader::load_file(path),
                None => Err(DataError::NoData(format!("no source configured for {kind}"))),
            };
            match outcome {
                Ok(table) => {
                    self.tables.insert(kind, table);
                }
                Err(e) => {
                    log::warn!("{kind}: {e}");
                    self.failures.insert(kind, e);
                }
            }
        }
        if let Some(e) = self.failures.get(&kind) {
            return Err(e.clone());
        }
        self.tables
            .get(&kind)
            .ok_or_else(|| DataError::NoData(format!("{kind} is not loaded")))
    }

    /// Load every dataset; returns the failures, in dataset order.
    pub fn load_all(&mut self) -> Vec<(DatasetKind, DataError)> {
        DatasetKind::ALL
            .into_iter()
            .filter_map(|kind| self.load(kind).err().map(|e| (kind, e)))
            .collect()
    }

    /// Already-loaded table, without triggering a load.
    pub fn table(&self, kind: DatasetKind) -> Option<&Table> {
        self.tables.get(&kind)
    }

    pub fn loaded(&self) -> impl Iterator<Item = (DatasetKind, &Table)> {
        self.tables.iter().map(|(k, t)| (*k, t))
    }

    /// `(min, max)` year over every loaded table.
    pub fn get_years(&self) -> Result<(i64, i64)> {
        let years = self.tables.values().flat_map(Table::years);
        let (min, max) = years.fold((i64::MAX, i64::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if min > max {
            return Err(DataError::NoData("no table has year values".to_string()));
        }
        Ok((min, max))
    }

    /// Sorted distinct regions over every loaded table, sentinel excluded.
    pub fn get_regions(&self) -> Result<Vec<String>> {
        let regions: BTreeSet<String> = self.tables.values().flat_map(Table::regions).collect();
        if regions.is_empty() {
            return Err(DataError::NoData("no regions found".to_string()));
        }
        Ok(regions.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::{Value, SENTINEL_REGION};

    fn population(rows: &[(&str, i64)]) -> Table {
        let mut t = Table::new(["Регион", "Год", "Всего"]);
        for &(region, year) in rows {
            t.push_row(vec![
                Value::Text(region.into()),
                Value::Integer(year),
                Value::Integer(1),
            ]);
        }
        t
    }

    #[test]
    fn years_span_all_tables() {
        let mut wage = Table::new(["Год", "I"]);
        wage.push_row(vec![Value::Integer(2023), Value::Integer(1)]);
        let reg = DatasetRegistry::from_tables([
            (DatasetKind::Total, population(&[("A", 2019), ("B", 2015)])),
            (DatasetKind::Wage, wage),
        ]);
        assert_eq!(reg.get_years().unwrap(), (2015, 2023));
    }

    #[test]
    fn years_fail_without_data() {
        let reg = DatasetRegistry::from_tables([(DatasetKind::Total, population(&[]))]);
        assert!(matches!(reg.get_years(), Err(DataError::NoData(_))));

        let mut no_year = Table::new(["Регион", "Всего"]);
        no_year.push_row(vec![Value::Text("A".into()), Value::Integer(1)]);
        let reg = DatasetRegistry::from_tables([(DatasetKind::Total, no_year)]);
        assert!(matches!(reg.get_years(), Err(DataError::NoData(_))));
        assert!(matches!(
            DatasetRegistry::default().get_regions(),
            Err(DataError::NoData(_))
        ));
    }

    #[test]
    fn regions_are_sorted_distinct_without_sentinel() {
        let reg = DatasetRegistry::from_tables([
            (
                DatasetKind::Total,
                population(&[("B", 2019), (SENTINEL_REGION, 2019), ("A", 2019)]),
            ),
            (DatasetKind::Male, population(&[("A", 2020), ("C", 2020)])),
        ]);
        let regions = reg.get_regions().unwrap();
        assert_eq!(regions, vec!["A", "B", "C"]);
        assert!(!regions.iter().any(|r| r == SENTINEL_REGION));
    }

    #[test]
    fn load_is_memoized() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Регион,Год,Всего\nA,2019,100").unwrap();
        let mut reg = DatasetRegistry::new(BTreeMap::from([(
            DatasetKind::Total,
            file.path().to_path_buf(),
        )]));

        assert_eq!(reg.load(DatasetKind::Total).unwrap().len(), 1);
        // Changing the file afterwards has no effect: the first load is kept.
        writeln!(file, "A,2020,110").unwrap();
        assert_eq!(reg.load(DatasetKind::Total).unwrap().len(), 1);
    }

    #[test]
    fn failures_are_isolated_per_dataset() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Год,I\n2019,1").unwrap();
        let mut reg = DatasetRegistry::new(BTreeMap::from([
            (DatasetKind::Wage, file.path().to_path_buf()),
            (DatasetKind::Total, PathBuf::from("/missing/Всего.csv")),
        ]));

        let failures = reg.load_all();
        let kinds: Vec<DatasetKind> = failures.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![DatasetKind::Total, DatasetKind::Male, DatasetKind::Female]
        );
        assert!(matches!(failures[0].1, DataError::FileMissing { .. }));
        assert!(reg.table(DatasetKind::Wage).is_some());
        assert_eq!(reg.get_years().unwrap(), (2019, 2019));
    }
}
