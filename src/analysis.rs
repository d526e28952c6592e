use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::data::loader::load_file;
use crate::data::model::{CanonicalTable, RawTable, Role};
use crate::data::resolve::{resolve, Resolution};
use crate::error::AnalysisError;
use crate::map::aggregate::{aggregate, GeoOutcome};
use crate::map::render::{render_or_message, try_render, MapStyle};
use crate::report::config::ReportConfig;
use crate::report::document::{build_report, AssetDir, ReportDocument};
use crate::report::stats::{summarize, Summary};

// ---------------------------------------------------------------------------
// Analysis – one uploaded table, resolved once
// ---------------------------------------------------------------------------

/// Everything derived from a single upload. The resolved table is shared
/// read-only by the map and the report.
#[derive(Debug, Clone)]
pub struct Analysis {
    resolution: Resolution,
}

impl Analysis {
    /// Resolve a raw table.
    pub fn from_raw(raw: &RawTable) -> Self {
        Self {
            resolution: resolve(raw),
        }
    }

    /// Load and resolve a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = load_file(path)?;
        Ok(Self::from_raw(&raw))
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn table(&self) -> &CanonicalTable {
        &self.resolution.table
    }

    /// Mandatory geospatial roles that were not found.
    pub fn unresolved(&self) -> &[Role] {
        &self.resolution.unresolved
    }

    pub fn geo(&self) -> GeoOutcome {
        aggregate(self.table())
    }

    /// Map fragment, or the HTML message explaining why there is none.
    pub fn map_html(&self, style: &MapStyle) -> String {
        render_or_message(&self.resolution, style)
    }

    pub fn try_map_html(&self, style: &MapStyle) -> Result<String, AnalysisError> {
        try_render(&self.resolution, style)
    }

    pub fn summary(&self) -> Result<Summary, AnalysisError> {
        summarize(self.table())
    }

    pub fn report(
        &self,
        config: &ReportConfig,
        assets: &AssetDir,
        today: NaiveDate,
    ) -> Result<ReportDocument, AnalysisError> {
        build_report(self.table(), config, assets, today)
    }
}
