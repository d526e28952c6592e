use log::debug;
use serde::Serialize;

use crate::data::model::{CanonicalRow, CanonicalTable, Role, Severity};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// GeoDataset – rows that can be put on a map
// ---------------------------------------------------------------------------

/// A sample with validated coordinates and index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Position of the row in the canonical table.
    pub row: usize,
    pub label: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub pollution_index: f64,
    pub pollution_level: Option<Severity>,
    /// Heat-layer intensity, see [`display_weight`].
    pub weight: f64,
}

/// Min/max extent of the points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// `[[south, west], [north, east]]`, the Leaflet `fitBounds` shape.
    /// A degenerate box is widened by `pad` degrees so the fit stays defined.
    pub fn to_leaflet(&self, pad: f64) -> [[f64; 2]; 2] {
        let (mut s, mut w, mut n, mut e) = (self.min_lat, self.min_lon, self.max_lat, self.max_lon);
        if n - s < f64::EPSILON {
            s -= pad;
            n += pad;
        }
        if e - w < f64::EPSILON {
            w -= pad;
            e += pad;
        }
        [[s, w], [n, e]]
    }
}

/// Everything the map renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoDataset {
    pub points: Vec<GeoPoint>,
    /// Mean latitude/longitude.
    pub center: (f64, f64),
    pub bounds: BoundingBox,
    pub max_weight: f64,
    /// Whether the source table had a pollution-level column.
    pub has_levels: bool,
    /// Rows dropped during validation.
    pub dropped: usize,
}

/// Aggregation result: a dataset, or the explicit empty case.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoOutcome {
    Dataset(GeoDataset),
    Empty { dropped: usize },
}

impl GeoOutcome {
    pub fn into_result(self) -> Result<GeoDataset, AnalysisError> {
        match self {
            GeoOutcome::Dataset(ds) => Ok(ds),
            GeoOutcome::Empty { dropped } => Err(AnalysisError::EmptyAfterFiltering { dropped }),
        }
    }
}

/// `ln(1 + index)`, compressing indices that span orders of magnitude.
/// Negative indices count as zero.
pub fn display_weight(pollution_index: f64) -> f64 {
    pollution_index.max(0.0).ln_1p()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Why a row was left off the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Missing,
    NotFinite,
    OutOfRange,
}

fn validate(row: &CanonicalRow) -> Result<(f64, f64, f64), Rejection> {
    let (Some(lat), Some(lon), Some(index)) = (row.latitude, row.longitude, row.pollution_index)
    else {
        return Err(Rejection::Missing);
    };
    if !(lat.is_finite() && lon.is_finite() && index.is_finite()) {
        return Err(Rejection::NotFinite);
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(Rejection::OutOfRange);
    }
    Ok((lat, lon, index))
}

/// Filter rows to those with usable coordinates and index, then compute
/// framing and weights.
pub fn aggregate(table: &CanonicalTable) -> GeoOutcome {
    let mut points = Vec::with_capacity(table.len());
    let (mut missing, mut not_finite, mut out_of_range) = (0usize, 0usize, 0usize);

    for (idx, row) in table.rows.iter().enumerate() {
        match validate(row) {
            Ok((latitude, longitude, pollution_index)) => points.push(GeoPoint {
                row: idx,
                label: row.id.clone(),
                latitude,
                longitude,
                pollution_index,
                pollution_level: row.pollution_level,
                weight: display_weight(pollution_index),
            }),
            Err(Rejection::Missing) => missing += 1,
            Err(Rejection::NotFinite) => not_finite += 1,
            Err(Rejection::OutOfRange) => out_of_range += 1,
        }
    }

    let dropped = missing + not_finite + out_of_range;
    debug!(
        "geo filter kept {} row(s); dropped {missing} missing, {not_finite} non-finite, {out_of_range} out of range",
        points.len()
    );

    if points.is_empty() {
        return GeoOutcome::Empty { dropped };
    }

    let n = points.len() as f64;
    let center = (
        points.iter().map(|p| p.latitude).sum::<f64>() / n,
        points.iter().map(|p| p.longitude).sum::<f64>() / n,
    );
    let bounds = points.iter().fold(
        BoundingBox {
            min_lat: f64::INFINITY,
            min_lon: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            max_lon: f64::NEG_INFINITY,
        },
        |b, p| BoundingBox {
            min_lat: b.min_lat.min(p.latitude),
            min_lon: b.min_lon.min(p.longitude),
            max_lat: b.max_lat.max(p.latitude),
            max_lon: b.max_lon.max(p.longitude),
        },
    );
    let max_weight = points.iter().map(|p| p.weight).fold(0.0, f64::max);

    GeoOutcome::Dataset(GeoDataset {
        points,
        center,
        bounds,
        max_weight,
        has_levels: table.has_role(Role::PollutionLevel),
        dropped,
    })
}
