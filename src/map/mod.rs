/// Geospatial layer: coordinate validation and the hotspot map.
///
/// ```text
///  CanonicalTable ──► aggregate ──► GeoDataset ──► render ──► HTML fragment
///                         │
///                         └── Empty ──► "<p>Error: ...</p>"
/// ```

pub mod aggregate;
pub mod render;
