//! API request handlers
//!
//! Plain functions over the shared catalog; the axum layer in `server`
//! maps their results onto status codes.

use anyhow::Result;
use serde_json::Value;

use super::models::{ChatRequest, VideoSummary};
use crate::catalog::{build_directory, filter_directory, search, Catalog};
use crate::chat::{ChatContext, ChatError, ChatSession, ChatSettings, ChatTurn};
use crate::llm::LLM;

/// Handle health check requests
pub async fn health_check() -> Result<Value> {
    Ok(serde_json::json!({
        "status": "healthy",
        "service": "workshop-explorer",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Headline catalog numbers
pub fn catalog_stats(catalog: &Catalog) -> Result<Value> {
    Ok(serde_json::to_value(catalog.stats())?)
}

/// Search the catalog; an empty query lists everything
pub fn list_videos(catalog: &Catalog, query: &str) -> Result<Value> {
    let videos: Vec<VideoSummary> = search(catalog.videos(), query)
        .into_iter()
        .map(VideoSummary::from)
        .collect();

    Ok(serde_json::json!({
        "total": videos.len(),
        "videos": videos,
    }))
}

/// Full record including the transcript, or `None` for an unknown id
pub fn get_video(catalog: &Catalog, id: &str) -> Result<Option<Value>> {
    catalog
        .get(id)
        .map(serde_json::to_value)
        .transpose()
        .map_err(Into::into)
}

/// Presenter directory filtered by name or affiliation
pub fn list_presenters(catalog: &Catalog, query: &str) -> Result<Value> {
    let presenters = filter_directory(build_directory(catalog.videos()), query);

    Ok(serde_json::json!({
        "total": presenters.len(),
        "presenters": presenters,
    }))
}

/// One chat turn for the UI
pub async fn chat(
    llm: &dyn LLM,
    catalog: &Catalog,
    settings: &ChatSettings,
    request: ChatRequest,
) -> std::result::Result<ChatTurn, ChatError> {
    let session = request.session.unwrap_or_else(ChatSession::for_catalog);
    let session = match request.video_id.as_deref() {
        Some(video_id) => session.select_video(video_id),
        None => session,
    };
    ChatContext::new(llm, catalog, settings)
        .respond(&session, &request.message)
        .await
}
