use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{CanonicalRow, CanonicalTable, Role, Severity};
use crate::error::AnalysisError;

/// How many metals the contaminant table lists.
pub const TOP_METALS: usize = 5;

/// The row with the highest pollution index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRef {
    /// Position in the canonical table.
    pub row: usize,
    pub label: String,
    pub pollution_index: f64,
}

/// One severity group of the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelShare {
    pub level: Severity,
    pub count: usize,
    /// Share of all rows, as a percentage rounded to one decimal.
    pub percent: f64,
}

impl LevelShare {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Mean concentration of one metal column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetalMean {
    pub metal: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_sites: usize,
    /// `None` when no row has an index value.
    pub mean_index: Option<f64>,
    pub worst_site: Option<SiteRef>,
    pub breakdown_by_level: Vec<LevelShare>,
    pub top_metals_by_mean_concentration: Vec<MetalMean>,
}

/// Summary statistics over the canonical fields. Needs the pollution-index
/// role; coordinates are not required.
pub fn summarize(table: &CanonicalTable) -> Result<Summary, AnalysisError> {
    if !table.has_role(Role::PollutionIndex) {
        return Err(AnalysisError::UnresolvedSchema(vec![Role::PollutionIndex]));
    }

    Ok(Summary {
        total_sites: table.len(),
        mean_index: mean(table.rows.iter().filter_map(|r| r.pollution_index)),
        worst_site: top_sites(table, 1).into_iter().next(),
        breakdown_by_level: breakdown_by_level(table),
        top_metals_by_mean_concentration: top_metals(table, TOP_METALS),
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn site_ref(row: usize, r: &CanonicalRow, pollution_index: f64) -> SiteRef {
    SiteRef {
        row,
        label: r.label().to_string(),
        pollution_index,
    }
}

/// Rows ranked by pollution index, highest first; ties keep table order.
pub fn top_sites(table: &CanonicalTable, n: usize) -> Vec<SiteRef> {
    let mut ranked: Vec<SiteRef> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| {
            r.pollution_index
                .filter(|v| v.is_finite())
                .map(|v| site_ref(idx, r, v))
        })
        .collect();
    // Stable sort: equal indices stay in table order.
    ranked.sort_by(|a, b| b.pollution_index.total_cmp(&a.pollution_index));
    ranked.truncate(n);
    ranked
}

/// Count rows per severity, as a share of all rows. Empty when the table
/// has no level column.
pub fn breakdown_by_level(table: &CanonicalTable) -> Vec<LevelShare> {
    if table.is_empty() || !table.has_role(Role::PollutionLevel) {
        return Vec::new();
    }
    let mut counts: BTreeMap<Severity, usize> = BTreeMap::new();
    for level in table.rows.iter().filter_map(|r| r.pollution_level) {
        *counts.entry(level).or_default() += 1;
    }

    let total = table.len() as f64;
    let mut shares: Vec<LevelShare> = counts
        .into_iter()
        .map(|(level, count)| LevelShare {
            level,
            count,
            percent: (count as f64 * 1000.0 / total).round() / 10.0,
        })
        .collect();
    // BTreeMap iteration is severity order; the stable sort keeps it for ties.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// Up to `n` metal columns with the highest mean concentration, descending;
/// ties keep input column order. Columns without any value are skipped.
pub fn top_metals(table: &CanonicalTable, n: usize) -> Vec<MetalMean> {
    let mut means: Vec<MetalMean> = table
        .metal_columns()
        .into_iter()
        .filter_map(|metal| {
            mean(table.rows.iter().filter_map(|r| r.metals.get(metal).copied())).map(|mean| {
                MetalMean {
                    metal: metal.to_string(),
                    mean,
                }
            })
        })
        .collect();
    means.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    means.truncate(n);
    means
}
