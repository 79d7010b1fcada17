use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Column-name conventions
// ---------------------------------------------------------------------------

/// Header names accepted for the region column, in lookup order.
pub const REGION_COLUMNS: &[&str] = &["Субъект Российской Федерации", "Регион", "Region"];

/// Header names accepted for the year column, in lookup order.
pub const YEAR_COLUMNS: &[&str] = &["Год", "Year"];

/// Header names accepted for the total-population column.
pub const TOTAL_COLUMNS: &[&str] = &["Всего", "Total"];

/// Placeholder region meaning "no region"; never offered for selection.
pub const SENTINEL_REGION: &str = "0";

/// Working-age breakdown columns of the population tables.
pub const AGE_GROUP_COLUMNS: &[&str] = &[
    "моложе трудоспособного возраста",
    "в трудоспособном возрасте",
    "старше трудоспособного возраста",
];

/// Under-one-year column (header trimmed).
pub const INFANT_COLUMN: &str = "до 1";

/// Yearly average wage column.
pub const WAGE_AVERAGE_COLUMN: &str = "В среднем за год";

pub const QUARTER_COLUMNS: &[&str] = &["I", "II", "III", "IV"];

pub const MONTH_COLUMNS: &[&str] = &[
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август", "Сентябрь",
    "Октябрь", "Ноябрь", "Декабрь",
];

/// Single-age columns in display order: `до 1`, then `1`..`100`.
pub fn age_columns() -> Vec<String> {
    std::iter::once(INFANT_COLUMN.to_string())
        .chain((1..=100).map(|age: u32| age.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as read from a delimited or parquet file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if v.is_finite() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Interpret the value as a whole number (years are sometimes stored as `2019.0`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Textual key used for region comparison; numeric region codes compare by their text.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Table – ordered rows over a fixed schema
// ---------------------------------------------------------------------------

/// A loaded table: ordered column names plus rows of cells in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given schema. Duplicate names keep the first position.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Table {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with nulls and long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// First of `candidates` present in the schema.
    pub fn find_column(&self, candidates: &[&str]) -> Option<&str> {
        candidates
            .iter()
            .find(|c| self.has_column(c))
            .map(|c| self.columns[self.index[*c]].as_str())
    }

    pub fn region_column(&self) -> Option<&str> {
        self.find_column(REGION_COLUMNS)
    }

    pub fn year_column(&self) -> Option<&str> {
        self.find_column(YEAR_COLUMNS)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |values| RowRef {
            table: self,
            values,
        })
    }

    pub fn row(&self, i: usize) -> Option<RowRef<'_>> {
        self.rows.get(i).map(|values| RowRef {
            table: self,
            values,
        })
    }

    /// Rows passing `keep`, in original order, over the same schema.
    pub fn filter_rows(&self, mut keep: impl FnMut(&RowRef<'_>) -> bool) -> Table {
        let rows = self
            .rows()
            .filter(|r| keep(r))
            .map(|r| r.values.to_vec())
            .collect();
        Table {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows,
        }
    }

    /// Same schema, no rows.
    pub fn empty_like(&self) -> Table {
        Table {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows: Vec::new(),
        }
    }

    /// Copy of the table with the named columns removed (unknown names are ignored).
    pub fn without_columns(&self, drop: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !drop.contains(&self.columns[i].as_str()))
            .collect();
        let mut out = Table::new(keep.iter().map(|&i| self.columns[i].clone()));
        for row in &self.rows {
            out.push_row(keep.iter().map(|&i| row[i].clone()).collect());
        }
        out
    }

    /// All whole-number values of the year column, if the table has one.
    pub fn years(&self) -> Vec<i64> {
        let Some(idx) = self.year_column().and_then(|c| self.column_index(c)) else {
            return Vec::new();
        };
        self.rows.iter().filter_map(|r| r[idx].as_i64()).collect()
    }

    /// Non-empty region names excluding the sentinel, in row order (with repeats).
    pub fn regions(&self) -> Vec<String> {
        let Some(idx) = self.region_column().and_then(|c| self.column_index(c)) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|r| r[idx].as_key().trim().to_string())
            .filter(|r| !r.is_empty() && r != SENTINEL_REGION)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// RowRef – borrowed view of one row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    /// Cell for `column`, or `None` when the schema has no such column.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table
            .column_index(column)
            .and_then(|i| self.values.get(i))
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut t = Table::new(["Регион", "Год", "Всего"]);
        t.push_row(vec![
            Value::Text("A".into()),
            Value::Integer(2019),
            Value::Integer(100),
        ]);
        t.push_row(vec![Value::Integer(0), Value::Float(2020.0), Value::Null]);
        t
    }

    #[test]
    fn schema_lookup_uses_aliases() {
        let t = sample();
        assert_eq!(t.region_column(), Some("Регион"));
        assert_eq!(t.year_column(), Some("Год"));
        assert_eq!(t.find_column(TOTAL_COLUMNS), Some("Всего"));
        assert!(!t.has_column("Total"));
    }

    #[test]
    fn years_accept_whole_floats() {
        assert_eq!(sample().years(), vec![2019, 2020]);
    }

    #[test]
    fn regions_skip_sentinel_even_when_numeric() {
        assert_eq!(sample().regions(), vec!["A".to_string()]);
    }

    #[test]
    fn short_rows_are_padded() {
        let mut t = Table::new(["a", "b"]);
        t.push_row(vec![Value::Integer(1)]);
        let row = t.row(0).unwrap();
        assert_eq!(row.get("b"), Some(&Value::Null));
        assert_eq!(row.get("c"), None);
    }

    #[test]
    fn without_columns_keeps_order() {
        let t = sample().without_columns(&["Регион", "Год"]);
        assert_eq!(t.columns(), ["Всего".to_string()]);
        assert_eq!(t.len(), 2);
        assert_eq!(t.row(0).unwrap().get("Всего"), Some(&Value::Integer(100)));
    }
}
