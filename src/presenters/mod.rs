//! Presenter extraction, scholar link corrections and presenter analysis

pub mod analysis;
pub mod extractor;
pub mod scholar;

pub use analysis::{by_affiliation, export_csv, search_appearances, AnalysisReport, Appearance};
pub use extractor::{extract, extract_catalog, extract_into, ExtractionSummary};
pub use scholar::{ScholarCorrections, ScholarFixReport};
