/// Report layer: summary statistics and the paginated report document.
///
/// The document is a typesetting-neutral list of pages and blocks; the PDF
/// writer that lays it out lives outside this crate.

pub mod config;
pub mod document;
pub mod stats;
