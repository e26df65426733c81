/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐     ┌───────┐
///   │  loader   │◄────│ cache  │  memoized by source identity
///   └──────────┘     └───────┘
///        │
///        ▼
///   ┌────────────┐
///   │ SalesTable  │  Vec<SalesRecord>, distinct values per column
///   └────────────┘
///        │  + FilterSelection
///        ▼
///   ┌──────────┐
///   │  filter   │  city ∧ title ∧ status membership → FilteredTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  KPIs, sums per product, sums per date
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
