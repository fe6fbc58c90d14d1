/// Workshop Explorer - Rust Implementation
///
/// Presenter extraction, catalog search and transcript chat for the videos
/// of an academic workshop.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod llm;
pub mod presenters;
pub mod transcripts;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::catalog::{Catalog, CatalogError, CatalogStats, CatalogStore, Presenter, VideoRecord};
pub use crate::chat::{ChatContext, ChatError, ChatScope, ChatSession, ChatTurn};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::llm::{create_llm, LLMConfig, LLMProvider, LLM};
pub use crate::presenters::{extract, AnalysisReport, ScholarCorrections};
pub use crate::transcripts::{backfill, BackfillReport, TranscriptStats, TranscriptUpdate};
