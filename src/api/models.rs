//! API data models

use serde::{Deserialize, Serialize};

use crate::catalog::{Presenter, VideoRecord};
use crate::chat::ChatSession;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// `?q=` filter shared by the listing endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn text(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }
}

/// Video listing entry; the transcript body is left out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub url: String,
    pub presenters: Vec<Presenter>,
    pub upload_date: Option<String>,
    pub ai_summary: Option<String>,
    pub has_transcript: bool,
    pub word_count: usize,
}

impl From<&VideoRecord> for VideoSummary {
    fn from(video: &VideoRecord) -> Self {
        Self {
            id: video.id.clone(),
            title: video.title.clone(),
            url: video.url.clone(),
            presenters: video.presenters.clone(),
            upload_date: video.upload_date.clone(),
            ai_summary: video.ai_summary.clone(),
            has_transcript: video.has_transcript,
            word_count: video.word_count,
        }
    }
}

/// Body of `POST /api/chat`; a missing session starts a catalog conversation
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session: Option<ChatSession>,
    /// Video picked in the UI; a different video than the session's starts over
    #[serde(default)]
    pub video_id: Option<String>,
    pub message: String,
}
