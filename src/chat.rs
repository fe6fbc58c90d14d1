//! Question answering over one transcript or the whole catalog
//!
//! Conversation state is a plain value. Callers hand a [`ChatSession`] in
//! with each message and get the extended session back, so nothing about a
//! conversation lives in the server.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{Catalog, VideoRecord};
use crate::llm::{ChatMessage, ChatOptions, LLM};

/// Error types for chat turns
#[derive(thiserror::Error, Debug)]
pub enum ChatError {
    #[error("Unknown video: {0}")]
    UnknownVideo(String),

    #[error("No transcript available for video {0}")]
    NoTranscript(String),

    #[error("No transcripts available")]
    NoTranscripts,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("LLM request failed: {0}")]
    Llm(#[source] anyhow::Error),
}

/// Prompt limits and sampling settings for chat
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatSettings {
    pub workshop_name: String,
    /// Transcript characters given to a single-video chat
    pub transcript_chars: usize,
    /// Transcript characters per video when no AI summary exists
    pub overview_chars: usize,
    /// Videos included in the catalog-wide context
    pub max_catalog_videos: usize,
    pub temperature: f32,
    pub video_max_tokens: u32,
    pub catalog_max_tokens: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            workshop_name: "NBER Economics of Transformative AI Workshop".to_string(),
            transcript_chars: 15_000,
            overview_chars: 500,
            max_catalog_videos: 10,
            temperature: 0.7,
            video_max_tokens: 1000,
            catalog_max_tokens: 1200,
        }
    }
}

/// What a conversation is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatScope {
    Video { video_id: String },
    Catalog,
}

/// A conversation: its scope and the user/assistant history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub scope: ChatScope,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn for_video(video_id: impl Into<String>) -> Self {
        Self {
            scope: ChatScope::Video {
                video_id: video_id.into(),
            },
            messages: Vec::new(),
        }
    }

    pub fn for_catalog() -> Self {
        Self {
            scope: ChatScope::Catalog,
            messages: Vec::new(),
        }
    }

    /// Switching videos starts a new conversation
    pub fn select_video(&self, video_id: &str) -> Self {
        match &self.scope {
            ChatScope::Video { video_id: current } if current == video_id => self.clone(),
            _ => Self::for_video(video_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Result of one chat exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub session: ChatSession,
    pub reply: String,
}

fn has_transcript_text(video: &VideoRecord) -> bool {
    video
        .transcript_text()
        .map_or(false, |t| !t.trim().is_empty())
}

/// System prompt grounding a conversation in one transcript
pub fn video_context(video: &VideoRecord, settings: &ChatSettings) -> Result<String, ChatError> {
    if !has_transcript_text(video) {
        return Err(ChatError::NoTranscript(video.id.clone()));
    }

    let transcript: String = video
        .transcript_text()
        .unwrap_or_default()
        .chars()
        .take(settings.transcript_chars)
        .collect();

    Ok(format!(
        "You are an AI assistant helping users understand a presentation from the {}.\n\n\
         Video Title: {}\n\
         Presenters: {}\n\n\
         Full Transcript:\n{}\n\n\
         Answer the user's question based on this transcript. Be concise and cite specific \
         points from the presentation when relevant.",
        settings.workshop_name,
        video.title,
        video.presenter_line(),
        transcript
    ))
}

/// System prompt summarizing every transcribed video
pub fn catalog_context(catalog: &Catalog, settings: &ChatSettings) -> Result<String, ChatError> {
    let available: Vec<&VideoRecord> = catalog
        .videos()
        .iter()
        .filter(|v| has_transcript_text(v))
        .collect();

    if available.is_empty() {
        return Err(ChatError::NoTranscripts);
    }

    let blocks: Vec<String> = available
        .iter()
        .take(settings.max_catalog_videos)
        .map(|video| {
            let overview = match video.ai_summary.as_deref() {
                Some(summary) if !summary.trim().is_empty() => summary.to_string(),
                _ => video
                    .transcript_text()
                    .unwrap_or_default()
                    .chars()
                    .take(settings.overview_chars)
                    .collect(),
            };
            format!("**{}** by {}\n{}", video.title, video.presenter_line(), overview)
        })
        .collect();

    Ok(format!(
        "You are an AI assistant helping users understand presentations from the {}.\n\n\
         You have access to information from {} presentations:\n\n\
         {}\n\n\
         Answer the user's question by synthesizing information across these presentations. \
         When referencing specific presentations, mention the title and presenter. If the \
         question relates to a specific topic, identify which presentations are most relevant.",
        settings.workshop_name,
        available.len(),
        blocks.join("\n")
    ))
}

/// Everything a chat turn reads: the model, the catalog and the limits
pub struct ChatContext<'a> {
    pub llm: &'a dyn LLM,
    pub catalog: &'a Catalog,
    pub settings: &'a ChatSettings,
}

impl<'a> ChatContext<'a> {
    pub fn new(llm: &'a dyn LLM, catalog: &'a Catalog, settings: &'a ChatSettings) -> Self {
        Self {
            llm,
            catalog,
            settings,
        }
    }

    /// Answer `message` within `session`, returning the extended session
    pub async fn respond(&self, session: &ChatSession, message: &str) -> Result<ChatTurn, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let (system, max_tokens) = match &session.scope {
            ChatScope::Video { video_id } => {
                let video = self
                    .catalog
                    .get(video_id)
                    .ok_or_else(|| ChatError::UnknownVideo(video_id.clone()))?;
                (video_context(video, self.settings)?, self.settings.video_max_tokens)
            }
            ChatScope::Catalog => (
                catalog_context(self.catalog, self.settings)?,
                self.settings.catalog_max_tokens,
            ),
        };

        let mut history: Vec<ChatMessage> = session
            .messages
            .iter()
            .filter(|m| m.role == "user" || m.role == "assistant")
            .cloned()
            .collect();
        history.push(ChatMessage::user(message));

        let mut request = Vec::with_capacity(history.len() + 1);
        request.push(ChatMessage::system(system));
        request.extend(history.iter().cloned());

        debug!(
            "💬 Chat turn in {:?} with {} prior messages",
            session.scope,
            history.len() - 1
        );

        let options = ChatOptions::new(self.settings.temperature, max_tokens);
        let response = self
            .llm
            .chat(request, options)
            .await
            .map_err(ChatError::Llm)?;

        let reply = response.content.trim().to_string();
        history.push(ChatMessage::assistant(reply.clone()));

        info!("💬 Answered chat message ({} chars)", reply.chars().count());

        Ok(ChatTurn {
            session: ChatSession {
                scope: session.scope.clone(),
                messages: history,
            },
            reply,
        })
    }
}
