/// Data layer: tables, loading, filtering, and chart preparation.
///
/// Architecture:
/// ```text
///  .csv / .parquet  (total, male, female, wage)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ registry  │  one Table per DatasetKind, loaded once
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  region + year selection → FilteredResult
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ plot_spec  │  x column + y columns + ChartKind → PlotSpec
///   └───────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod plot_spec;
pub mod registry;
pub mod summary;
