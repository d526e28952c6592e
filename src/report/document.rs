use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use super::config::ReportConfig;
use super::stats::{summarize, top_sites, Summary};
use crate::data::model::{CanonicalTable, Role};
use crate::data::schema::display_name;
use crate::error::AnalysisError;

pub const REPORT_HEADER: &str = "JalSuchak - Heavy Metal Analysis Report";

/// Rows in the high-risk table.
pub const HIGH_RISK_ROWS: usize = 10;

/// Longest table cell before truncation.
const MAX_CELL_CHARS: usize = 40;

// ---------------------------------------------------------------------------
// Document model – laid out by the external PDF typesetter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Large centred title.
    Title { text: String },
    /// Centred single line under the title.
    Line { text: String },
    /// Shaded chapter heading.
    Chapter { text: String },
    /// Bold sub-heading.
    Heading { text: String },
    Paragraph { text: String },
    Bullets { items: Vec<String> },
    Table {
        headers: Vec<String>,
        /// Column widths in millimetres.
        widths: Vec<u32>,
        rows: Vec<Vec<String>>,
    },
    Image {
        path: PathBuf,
        width_px: u32,
        height_px: u32,
    },
    /// Stand-in for an asset that could not be loaded.
    Placeholder { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub header: String,
    pub blocks: Vec<Block>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub pages: Vec<Page>,
}

impl ReportDocument {
    fn new() -> Self {
        Self { pages: Vec::new() }
    }

    fn add_page(&mut self) -> &mut Vec<Block> {
        let number = self.pages.len() + 1;
        self.pages.push(Page {
            header: REPORT_HEADER.to_string(),
            blocks: Vec::new(),
            footer: format!("Page {number}"),
        });
        let last = self.pages.len() - 1;
        &mut self.pages[last].blocks
    }

    /// Every block in page order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.pages.iter().flat_map(|p| p.blocks.iter())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ---------------------------------------------------------------------------
// Assets – chart images and the map screenshot
// ---------------------------------------------------------------------------

/// Directory holding `images/graphs/<chart>.png` and
/// `images/map_screenshot.png`. `None` means no assets at all.
#[derive(Debug, Clone, Default)]
pub struct AssetDir {
    root: Option<PathBuf>,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    fn image(&self, relative: &Path) -> Option<Block> {
        let path = self.root.as_ref()?.join(relative);
        match image::image_dimensions(&path) {
            Ok((width_px, height_px)) => Some(Block::Image {
                path,
                width_px,
                height_px,
            }),
            Err(err) => {
                warn!("report asset {} unavailable: {err}", path.display());
                None
            }
        }
    }

    /// A chart image block, or a placeholder naming the chart.
    pub fn chart(&self, name: &str) -> Block {
        self.image(&Path::new("images").join("graphs").join(name))
            .unwrap_or_else(|| Block::Placeholder {
                text: format!("[Chart image '{name}' not found]"),
            })
    }

    pub fn map_screenshot(&self) -> Block {
        self.image(&Path::new("images").join("map_screenshot.png"))
            .unwrap_or_else(|| Block::Placeholder {
                text: "[Map screenshot not available. Please add a 'map_screenshot.png' to the images folder.]"
                    .to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Cell formatting
// ---------------------------------------------------------------------------

pub fn format_number(v: f64) -> String {
    format!("{v:.2}")
}

/// Truncate long text to fit a table cell.
pub fn fit_cell(text: &str) -> String {
    if text.chars().count() > MAX_CELL_CHARS {
        let head: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn optional_number(v: Option<f64>) -> String {
    v.map(format_number).unwrap_or_else(|| "N/A".to_string())
}

// ---------------------------------------------------------------------------
// Report assembly
// ---------------------------------------------------------------------------

const INSIGHTS: [(&str, &str, &str); 7] = [
    (
        "graph_1.png",
        "Insight 1: HMPI Distribution",
        "Frequency of HMPI scores across all samples. A distribution leaning towards high values points to widespread contamination.",
    ),
    (
        "graph_2.png",
        "Insight 2: Overall Water Quality",
        "Share of sites in each pollution category.",
    ),
    (
        "graph_3.png",
        "Insight 3: HMPI Values by Sample",
        "HMPI value of every sample in collection order, which makes anomalies and high-risk sites stand out.",
    ),
    (
        "graph_4.png",
        "Insight 4: Key Heavy Metal Concentrations",
        "Levels of the key toxic metals (As, Cd, Cr) per sample, showing which sites exceed safe limits.",
    ),
    (
        "graph_5.png",
        "Insight 5: Metal Concentration Distributions",
        "Distribution of each heavy metal, highlighting metals with extreme outliers.",
    ),
    (
        "graph_6.png",
        "Insight 6: Correlation Matrix",
        "Correlation between metal concentrations and HMPI. Strong correlations point to the primary drivers of pollution.",
    ),
    (
        "graph_7.png",
        "Insight 7: PCA Analysis",
        "Principal Component Analysis of the metal concentrations, showing their combined variance and relationships.",
    ),
];

const RECOMMENDATIONS: [&str; 4] = [
    "Immediate Investigation: sites classified as 'Extremely Poor' or 'Very Poor' need follow-up sampling and public health advisories.",
    "Source Identification: trace the primary contamination sources of high-HMPI sites, such as industrial discharge or agricultural runoff.",
    "Remediation Planning: evaluate and apply suitable remediation techniques for the most affected areas.",
    "Long-Term Monitoring: set up regular monitoring to track pollution trends and measure the effect of interventions.",
];

/// Assemble the report pages. Fails only when the table has no pollution
/// index; missing images become placeholders.
pub fn build_report(
    table: &CanonicalTable,
    config: &ReportConfig,
    assets: &AssetDir,
    today: NaiveDate,
) -> Result<ReportDocument, AnalysisError> {
    let summary = summarize(table)?;
    let mut doc = ReportDocument::new();

    // ── Title page ──────────────────────────────────────────────────────
    let page = doc.add_page();
    page.push(Block::Title {
        text: config.title().to_string(),
    });
    page.push(Block::Line {
        text: format!("Date: {}", config.date(today)),
    });
    page.push(Block::Line {
        text: format!("Organization: {}", config.org()),
    });
    page.push(Block::Line {
        text: format!("Author: {}", config.author()),
    });

    if config.sections.exec {
        executive_summary(page, &summary);
    }
    if config.sections.quality {
        quality_assessment(page, &summary);
    }

    // ── High-risk locations ─────────────────────────────────────────────
    let page = doc.add_page();
    page.push(Block::Chapter {
        text: "3. High-Risk Locations".to_string(),
    });
    page.push(Block::Paragraph {
        text: format!(
            "HMPI scores of the {HIGH_RISK_ROWS} most polluted sites. These sites should be prioritised for further action."
        ),
    });
    page.push(assets.chart("graph_8.png"));
    page.push(high_risk_table(table));

    // ── Geospatial overview ─────────────────────────────────────────────
    if config.include_maps {
        let page = doc.add_page();
        page.push(Block::Chapter {
            text: "4. Geospatial Hotspot Overview".to_string(),
        });
        page.push(Block::Paragraph {
            text: "Static snapshot of the geospatial analysis highlighting pollution hotspots. \
                   Use the map view of the web application for the interactive version."
                .to_string(),
        });
        page.push(assets.map_screenshot());
    }

    // ── Chart insights ──────────────────────────────────────────────────
    for (chart, title, description) in INSIGHTS {
        let page = doc.add_page();
        page.push(Block::Chapter {
            text: title.to_string(),
        });
        page.push(Block::Paragraph {
            text: description.to_string(),
        });
        page.push(assets.chart(chart));
    }

    // ── Contaminants and recommendations ────────────────────────────────
    let page = doc.add_page();
    page.push(Block::Chapter {
        text: "8. Primary Contaminant Analysis".to_string(),
    });
    page.push(Block::Paragraph {
        text: "Heavy metals with the highest average concentration across all samples.".to_string(),
    });
    if summary.top_metals_by_mean_concentration.is_empty() {
        page.push(Block::Placeholder {
            text: "[No heavy-metal concentration columns found]".to_string(),
        });
    } else {
        page.push(Block::Table {
            headers: vec!["Heavy Metal".to_string(), "Avg. Conc. (mg/L)".to_string()],
            widths: vec![80, 80],
            rows: summary
                .top_metals_by_mean_concentration
                .iter()
                .map(|m| vec![fit_cell(&m.metal), format_number(m.mean)])
                .collect(),
        });
    }

    if config.recommendations {
        page.push(Block::Chapter {
            text: "9. Recommendations".to_string(),
        });
        page.push(Block::Bullets {
            items: RECOMMENDATIONS
                .iter()
                .enumerate()
                .map(|(i, r)| format!("{}. {r}", i + 1))
                .collect(),
        });
    }

    info!("report assembled: {} page(s)", doc.pages.len());
    Ok(doc)
}

fn executive_summary(page: &mut Vec<Block>, summary: &Summary) {
    let mean = optional_number(summary.mean_index);
    page.push(Block::Chapter {
        text: "1. Executive Summary".to_string(),
    });
    page.push(Block::Paragraph {
        text: format!(
            "This report covers {} groundwater samples analysed for heavy metal contamination. \
             The average Heavy Metal Pollution Index (HMPI) across all sites is {mean}. \
             The analysis locates pollution hotspots and gives a data-driven assessment of water quality.",
            summary.total_sites
        ),
    });
    page.push(Block::Heading {
        text: "Key Findings at a Glance:".to_string(),
    });
    let worst = match &summary.worst_site {
        Some(site) => format!(
            "Most Contaminated Site: '{}' (HMPI: {})",
            fit_cell(&site.label),
            format_number(site.pollution_index)
        ),
        None => "Most Contaminated Site: N/A".to_string(),
    };
    page.push(Block::Bullets {
        items: vec![
            format!("Total Sites Analyzed: {}", summary.total_sites),
            format!("Average HMPI Score: {mean}"),
            worst,
        ],
    });
}

fn quality_assessment(page: &mut Vec<Block>, summary: &Summary) {
    page.push(Block::Chapter {
        text: "2. Water Quality Assessment".to_string(),
    });
    page.push(Block::Heading {
        text: "Site Classification Breakdown:".to_string(),
    });
    if summary.breakdown_by_level.is_empty() {
        page.push(Block::Placeholder {
            text: "[Pollution level column not found]".to_string(),
        });
        return;
    }
    page.push(Block::Bullets {
        items: summary
            .breakdown_by_level
            .iter()
            .map(|b| format!("{}: {} sites ({})", b.level, b.count, b.percent_label()))
            .collect(),
    });
}

fn high_risk_table(table: &CanonicalTable) -> Block {
    let with_levels = table.has_role(Role::PollutionLevel);
    let mut headers = vec![
        "Rank".to_string(),
        display_name(Role::Id.canonical_name()),
        display_name(Role::PollutionIndex.canonical_name()),
    ];
    let mut widths = vec![20, 90, 40];
    if with_levels {
        headers.push(display_name(Role::PollutionLevel.canonical_name()));
        widths.push(40);
    }

    let rows = top_sites(table, HIGH_RISK_ROWS)
        .into_iter()
        .enumerate()
        .map(|(rank, site)| {
            let mut cells = vec![
                (rank + 1).to_string(),
                fit_cell(&site.label),
                format_number(site.pollution_index),
            ];
            if with_levels {
                let level = table.rows[site.row]
                    .pollution_level
                    .map(|l| l.label().to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                cells.push(level);
            }
            cells
        })
        .collect();

    Block::Table {
        headers,
        widths,
        rows,
    }
}
