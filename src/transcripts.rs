//! Transcript statistics and backfill of newly available transcripts

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::Catalog;

/// Cached counts derived from a transcript body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptStats {
    /// Whitespace-separated tokens
    pub word_count: usize,
    /// Unicode scalar values
    pub char_count: usize,
}

impl TranscriptStats {
    pub fn of(text: &str) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        }
    }
}

/// One entry of a transcript backfill file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptUpdate {
    pub id: String,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl TranscriptUpdate {
    pub fn new(id: impl Into<String>, transcript: Option<String>) -> Self {
        Self {
            id: id.into(),
            transcript,
        }
    }
}

/// A JSON array of `{id, transcript}` objects
pub struct TranscriptFile;

impl TranscriptFile {
    pub async fn load(path: impl AsRef<Path>) -> Result<Vec<TranscriptUpdate>> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read transcript file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse transcript file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Vec<TranscriptUpdate>> {
        let updates: Vec<TranscriptUpdate> = serde_json::from_str(content)?;
        debug!("Parsed {} transcript updates", updates.len());
        Ok(updates)
    }
}

/// Outcome of a backfill pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Ids that received a transcript in this pass
    pub newly_available: Vec<String>,
    /// Ids still without a transcript afterwards
    pub still_missing: Vec<String>,
    /// Update ids that match no catalog record
    pub unknown_ids: Vec<String>,
}

impl BackfillReport {
    pub fn changed(&self) -> bool {
        !self.newly_available.is_empty()
    }
}

/// Attach transcripts to records that are still missing one
///
/// Records that already carry a transcript are never overwritten, and
/// null or blank updates are ignored, so running the same updates twice
/// changes nothing the second time.
pub fn backfill(catalog: &mut Catalog, updates: &[TranscriptUpdate]) -> BackfillReport {
    let mut available: HashMap<&str, &str> = HashMap::new();
    for update in updates {
        if let Some(text) = update.transcript.as_deref() {
            if !text.trim().is_empty() {
                available.entry(update.id.as_str()).or_insert(text);
            }
        }
    }

    let mut report = BackfillReport::default();

    for video in catalog.videos_mut() {
        if video.transcript.is_some() {
            continue;
        }

        match available.get(video.id.as_str()) {
            Some(text) => {
                debug!("📝 Transcript now available for {} ({})", video.id, video.title);
                video.set_transcript(Some((*text).to_string()));
                report.newly_available.push(video.id.clone());
            }
            None => report.still_missing.push(video.id.clone()),
        }
    }

    for update in updates {
        if catalog.get(&update.id).is_none() && !report.unknown_ids.contains(&update.id) {
            report.unknown_ids.push(update.id.clone());
        }
    }

    info!(
        "✅ Backfill: {} newly available, {} still missing, {} unknown ids",
        report.newly_available.len(),
        report.still_missing.len(),
        report.unknown_ids.len()
    );

    report
}
