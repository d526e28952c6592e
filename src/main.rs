use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use jalsuchak::data::model::ColumnKind;
use jalsuchak::map::render::MapStyle;
use jalsuchak::report::config::ReportConfig;
use jalsuchak::report::document::AssetDir;
use jalsuchak::Analysis;

/// Resolve heavy-metal sample tables and produce hotspot maps and reports.
#[derive(Parser, Debug)]
#[command(name = "jalsuchak", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how each header was resolved
    Columns {
        /// .csv, .json or .parquet sample table
        file: PathBuf,
    },
    /// Render the interactive hotspot map as an HTML fragment
    Map {
        file: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Heat point radius in pixels
        #[arg(long)]
        radius: Option<u32>,
    },
    /// Print summary statistics as JSON
    Summary { file: PathBuf },
    /// Assemble the report document as JSON
    Report {
        file: PathBuf,
        /// JSON report options ({"title": ..., "sections": {...}, ...})
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory holding images/graphs/*.png and images/map_screenshot.png
        #[arg(long)]
        assets: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Columns { file } => {
            let analysis = Analysis::from_path(&file)?;
            for binding in &analysis.table().columns {
                let kind = match binding.kind {
                    ColumnKind::Role(role) => format!("role {role}"),
                    ColumnKind::Metal => "metal".to_string(),
                    ColumnKind::Auxiliary => "auxiliary".to_string(),
                };
                println!("{:<24} -> {:<20} {kind}", binding.source, binding.name);
            }
            if !analysis.unresolved().is_empty() {
                let names: Vec<&str> = analysis
                    .unresolved()
                    .iter()
                    .map(|r| r.canonical_name())
                    .collect();
                println!("unresolved: {}", names.join(", "));
            }
        }
        Command::Map {
            file,
            output,
            radius,
        } => {
            let analysis = Analysis::from_path(&file)?;
            let mut style = MapStyle::default();
            if let Some(radius) = radius {
                style.heat_radius = radius;
            }
            emit(&analysis.map_html(&style), output.as_deref())?;
        }
        Command::Summary { file } => {
            let analysis = Analysis::from_path(&file)?;
            let summary = analysis.summary()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Report {
            file,
            config,
            assets,
            output,
        } => {
            let analysis = Analysis::from_path(&file)?;
            let config = match config {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    ReportConfig::from_json(&text).context("parsing report config")?
                }
                None => ReportConfig::default(),
            };
            let assets = assets.map(AssetDir::new).unwrap_or_default();
            let today = chrono::Local::now().date_naive();
            let doc = analysis.report(&config, &assets, today)?;
            emit(&doc.to_json()?, output.as_deref())?;
        }
    }
    Ok(())
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
