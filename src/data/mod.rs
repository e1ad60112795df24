/// Data layer: core types, loading, and the filter pipeline.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file + period labels → TimeSeriesTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ TimeSeriesTable │  periods × named columns, read-only
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  difference → select columns → restrict years
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ scaling   │  display-only rescaling on a copy
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod period;
pub mod registry;
pub mod scaling;
