/// Data layer: core types, loading, and canonical-schema resolution.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ resolve  │  schema synonyms + coerce → CanonicalTable
///   └──────────┘
///        │
///        ▼
///   CanonicalTable  →  map::aggregate / report::stats
/// ```

pub mod coerce;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod schema;
