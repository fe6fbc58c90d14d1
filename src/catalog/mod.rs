//! Video catalog: records, presenters and the collection that holds them
//!
//! The persisted form is a JSON array of lower-snake-case objects. Every
//! optional field tolerates omission so partially enriched catalogs load.

pub mod search;
pub mod store;

pub use search::{build_directory, filter_directory, search, DirectoryEntry, DirectoryVideo};
pub use store::CatalogStore;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::transcripts::TranscriptStats;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error types for catalog operations
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Duplicate video id in catalog: {0}")]
    DuplicateId(String),

    #[error("Failed to persist catalog: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A speaker listed in a video description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Presenter {
    pub name: String,

    #[serde(default)]
    pub affiliation: String,

    /// Set only by the scholar correction pass, never by extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholar_url: Option<String>,
}

impl Presenter {
    pub fn new(name: impl Into<String>, affiliation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affiliation: affiliation.into(),
            scholar_url: None,
        }
    }

    pub fn with_scholar_url(mut self, url: impl Into<String>) -> Self {
        self.scholar_url = Some(url.into());
        self
    }
}

/// One workshop video with its description, presenters and transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    /// External video identifier, unique within a catalog
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,

    /// Presenters in the order they appear in the description
    #[serde(default, deserialize_with = "null_as_default")]
    pub presenters: Vec<Presenter>,

    #[serde(default)]
    pub num_presenters: usize,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,

    #[serde(default)]
    pub upload_date: Option<String>,

    #[serde(default)]
    pub days_ago: Option<i64>,

    /// Mirrors `transcript.is_some()`
    #[serde(default)]
    pub has_transcript: bool,

    #[serde(default)]
    pub word_count: usize,

    #[serde(default)]
    pub char_count: usize,

    #[serde(default)]
    pub transcript: Option<String>,
}

impl VideoRecord {
    /// Create a record without presenters or transcript
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            presenters: Vec::new(),
            num_presenters: 0,
            description: description.into(),
            ai_summary: None,
            upload_date: None,
            days_ago: None,
            has_transcript: false,
            word_count: 0,
            char_count: 0,
            transcript: None,
        }
    }

    pub fn with_presenters(mut self, presenters: Vec<Presenter>) -> Self {
        self.set_presenters(presenters);
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.set_transcript(Some(transcript.into()));
        self
    }

    pub fn with_upload_date(mut self, upload_date: impl Into<String>) -> Self {
        self.upload_date = Some(upload_date.into());
        self
    }

    /// Replace the presenter list and keep the cached count in step
    pub fn set_presenters(&mut self, presenters: Vec<Presenter>) {
        self.num_presenters = presenters.len();
        self.presenters = presenters;
    }

    /// Attach or clear the transcript, recomputing the cached counts
    pub fn set_transcript(&mut self, transcript: Option<String>) {
        let stats = transcript
            .as_deref()
            .map(TranscriptStats::of)
            .unwrap_or_default();

        self.has_transcript = transcript.is_some();
        self.word_count = stats.word_count;
        self.char_count = stats.char_count;
        self.transcript = transcript;
    }

    pub fn transcript_text(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Presenter names joined for prompts and listings
    pub fn presenter_line(&self) -> String {
        self.presenters
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Days between the upload date and `today`, if the date is known
    pub fn days_since_upload(&self, today: NaiveDate) -> Option<i64> {
        let upload_date = self.upload_date.as_deref()?;
        let date = NaiveDate::parse_from_str(upload_date, "%Y-%m-%d").ok()?;
        Some((today - date).num_days())
    }

    /// Recompute `days_ago`; an unparseable date leaves the stored value
    pub fn refresh_days_ago(&mut self, today: NaiveDate) {
        if let Some(days) = self.days_since_upload(today) {
            self.days_ago = Some(days);
        }
    }

    /// Re-derive the cached fields from the data they summarize
    pub fn normalize(&mut self) {
        let transcript = self.transcript.take();
        self.set_transcript(transcript);
        self.num_presenters = self.presenters.len();
    }
}

/// Ordered collection of video records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    videos: Vec<VideoRecord>,
}

impl Catalog {
    pub fn new(videos: Vec<VideoRecord>) -> Self {
        Self { videos }
    }

    /// Build a catalog, rejecting duplicate ids and normalizing cached fields
    pub fn from_records(mut videos: Vec<VideoRecord>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for video in &mut videos {
            if !seen.insert(video.id.clone()) {
                return Err(CatalogError::DuplicateId(video.id.clone()));
            }
            video.normalize();
        }
        Ok(Self { videos })
    }

    pub fn videos(&self) -> &[VideoRecord] {
        &self.videos
    }

    pub fn videos_mut(&mut self) -> &mut [VideoRecord] {
        &mut self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| v.id == id)
    }

    /// Videos that carry a transcript, in catalog order
    pub fn with_transcripts(&self) -> impl Iterator<Item = &VideoRecord> {
        self.videos.iter().filter(|v| v.transcript.is_some())
    }

    pub fn refresh_days_ago(&mut self, today: NaiveDate) {
        for video in &mut self.videos {
            video.refresh_days_ago(today);
        }
    }

    pub fn stats(&self) -> CatalogStats {
        let unique_presenters = self
            .videos
            .iter()
            .flat_map(|v| v.presenters.iter().map(|p| p.name.as_str()))
            .collect::<std::collections::HashSet<_>>()
            .len();

        CatalogStats {
            videos: self.videos.len(),
            with_transcripts: self.with_transcripts().count(),
            total_presenters: self.videos.iter().map(|v| v.num_presenters).sum(),
            unique_presenters,
            with_summaries: self.videos.iter().filter(|v| v.ai_summary.is_some()).count(),
            total_words: self.videos.iter().map(|v| v.word_count).sum(),
        }
    }
}

/// Headline numbers shown above the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub videos: usize,
    pub with_transcripts: usize,
    pub total_presenters: usize,
    pub unique_presenters: usize,
    pub with_summaries: usize,
    pub total_words: usize,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_transcript_keeps_flags_consistent() {
        let mut video = VideoRecord::new("abc", "Title", "https://youtu.be/abc", "");
        assert!(!video.has_transcript);

        video.set_transcript(Some("one two  three".to_string()));
        assert!(video.has_transcript);
        assert_eq!(video.word_count, 3);
        assert_eq!(video.char_count, 14);

        video.set_transcript(None);
        assert!(!video.has_transcript);
        assert_eq!(video.word_count, 0);
        assert_eq!(video.char_count, 0);
    }

    #[test]
    fn test_empty_transcript_is_not_absent() {
        let video = VideoRecord::new("abc", "Title", "", "").with_transcript("");
        assert!(video.has_transcript);
        assert_eq!(video.transcript_text(), Some(""));
        assert_eq!(video.word_count, 0);
    }

    #[test]
    fn test_deserialize_tolerates_missing_and_null_fields() {
        let json = r#"{"id": "x1", "title": "Talk", "presenters": null, "description": null}"#;
        let video: VideoRecord = serde_json::from_str(json).unwrap();

        assert!(video.presenters.is_empty());
        assert_eq!(video.description, "");
        assert!(video.transcript.is_none());
        assert_eq!(video.url, "");
    }

    #[test]
    fn test_scholar_url_omitted_when_absent() {
        let presenter = Presenter::new("Anton Korinek", "University of Virginia");
        let json = serde_json::to_value(&presenter).unwrap();
        assert!(json.get("scholar_url").is_none());

        let presenter = presenter.with_scholar_url("https://scholar.google.com/citations?user=x");
        let json = serde_json::to_value(&presenter).unwrap();
        assert!(json.get("scholar_url").is_some());
    }

    #[test]
    fn test_days_since_upload() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let video = VideoRecord::new("a", "", "", "").with_upload_date("2025-09-21");
        assert_eq!(video.days_since_upload(today), Some(10));

        let unknown = VideoRecord::new("b", "", "", "").with_upload_date("Unknown");
        assert_eq!(unknown.days_since_upload(today), None);
    }

    #[test]
    fn test_refresh_days_ago() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let mut dated = VideoRecord::new("a", "", "", "").with_upload_date("2025-09-19");
        dated.days_ago = Some(0);
        let mut unknown = VideoRecord::new("b", "", "", "").with_upload_date("Unknown");
        unknown.days_ago = Some(3);

        let mut catalog = Catalog::new(vec![dated, unknown, VideoRecord::new("c", "", "", "")]);
        catalog.refresh_days_ago(today);

        let days: Vec<Option<i64>> = catalog.videos().iter().map(|v| v.days_ago).collect();
        assert_eq!(days, vec![Some(12), Some(3), None]);
    }

    #[test]
    fn test_from_records_rejects_duplicate_ids() {
        let records = vec![
            VideoRecord::new("same", "One", "", ""),
            VideoRecord::new("same", "Two", "", ""),
        ];
        assert!(matches!(
            Catalog::from_records(records),
            Err(CatalogError::DuplicateId(id)) if id == "same"
        ));
    }

    #[test]
    fn test_from_records_normalizes_cached_fields() {
        let mut video = VideoRecord::new("a", "", "", "");
        video.transcript = Some("a b".to_string());
        video.presenters = vec![Presenter::new("Chad Syverson", "University of Chicago")];

        let catalog = Catalog::from_records(vec![video]).unwrap();
        let video = &catalog.videos()[0];
        assert!(video.has_transcript);
        assert_eq!(video.word_count, 2);
        assert_eq!(video.num_presenters, 1);
    }

    #[test]
    fn test_stats() {
        let shared = Presenter::new("Erik Brynjolfsson", "Stanford University");
        let catalog = Catalog::new(vec![
            VideoRecord::new("a", "", "", "")
                .with_presenters(vec![shared.clone(), Presenter::new("Diane Coyle", "Cambridge")])
                .with_transcript("four words right here"),
            VideoRecord::new("b", "", "", "").with_presenters(vec![shared]),
        ]);

        let stats = catalog.stats();
        assert_eq!(stats.videos, 2);
        assert_eq!(stats.with_transcripts, 1);
        assert_eq!(stats.total_presenters, 3);
        assert_eq!(stats.unique_presenters, 2);
        assert_eq!(stats.total_words, 4);
    }
}
