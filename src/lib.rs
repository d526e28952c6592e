//! Heavy-metal sample analysis: header resolution, hotspot maps and report
//! tables for tables with user-supplied column names.

pub mod analysis;
pub mod color;
pub mod data;
pub mod error;
pub mod map;
pub mod report;

pub use analysis::Analysis;
pub use error::AnalysisError;
