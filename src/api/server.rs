//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use super::{
    handlers,
    models::{ApiResponse, ChatRequest, SearchQuery},
};
use crate::catalog::Catalog;
use crate::chat::ChatError;
use crate::config::Config;
use crate::llm::LLM;

/// Page served when no `index.html` exists in the configured UI directory
const EMBEDDED_UI: &str = include_str!("../../ui/index.html");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    /// `None` when no provider could be configured; chat then answers 503
    pub llm: Option<Arc<dyn LLM>>,
    pub config: Arc<Config>,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Configure CORS to allow browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/videos", get(list_videos_handler))
        .route("/api/videos/:id", get(video_handler))
        .route("/api/presenters", get(presenters_handler))
        .route("/api/chat", post(chat_handler))
        .route("/", get(serve_ui))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Bind and serve until the process is stopped
pub async fn start_http_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

fn internal_error(e: anyhow::Error) -> Response {
    warn!("Request failed: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Status code for a failed chat turn
fn chat_error_status(error: &ChatError) -> StatusCode {
    match error {
        ChatError::UnknownVideo(_) => StatusCode::NOT_FOUND,
        ChatError::Llm(_) => StatusCode::BAD_GATEWAY,
        ChatError::NoTranscript(_) | ChatError::NoTranscripts | ChatError::EmptyMessage => {
            StatusCode::BAD_REQUEST
        }
    }
}

/// Health check handler
async fn health_handler() -> Response {
    match handlers::health_check().await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn stats_handler(State(state): State<AppState>) -> Response {
    match handlers::catalog_stats(&state.catalog) {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn list_videos_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match handlers::list_videos(&state.catalog, query.text()) {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn video_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match handlers::get_video(&state.catalog, &id) {
        Ok(Some(data)) => (StatusCode::OK, Json(data)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("Video not found: {}", id)),
        Err(e) => internal_error(e),
    }
}

async fn presenters_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match handlers::list_presenters(&state.catalog, query.text()) {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn chat_handler(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let Some(llm) = state.llm.as_deref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Chat is unavailable: no LLM provider is configured".to_string(),
        );
    };

    match handlers::chat(llm, &state.catalog, &state.config.chat, request).await {
        Ok(turn) => (StatusCode::OK, Json(turn)).into_response(),
        Err(e) => {
            debug!("Chat turn rejected: {}", e);
            error_response(chat_error_status(&e), e.to_string())
        }
    }
}

/// Serve the single-page UI
async fn serve_ui(State(state): State<AppState>) -> Response {
    let index = state.config.server.ui_dir.join("index.html");

    let html = match tokio::fs::read_to_string(&index).await {
        Ok(content) => content,
        Err(_) => EMBEDDED_UI.to_string(),
    };

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Presenter, VideoRecord};
    use crate::config::ConfigBuilder;
    use crate::llm::{ChatMessage, ChatOptions, LLMProvider, LLMResponse};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct CannedLLM;

    #[async_trait]
    impl LLM for CannedLLM {
        async fn chat(&self, _: Vec<ChatMessage>, _: ChatOptions) -> Result<LLMResponse> {
            Ok(LLMResponse {
                content: "It is about growth.".to_string(),
                tokens_used: None,
            })
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn provider_type(&self) -> LLMProvider {
            LLMProvider::OpenAI
        }
    }

    fn state(llm: Option<Arc<dyn LLM>>) -> AppState {
        let catalog = Catalog::new(vec![VideoRecord::new("a1", "AI and Growth", "https://youtu.be/a1", "")
            .with_presenters(vec![Presenter::new("Chad Jones", "Stanford University")])
            .with_transcript("ideas drive growth")]);

        AppState {
            catalog: Arc::new(catalog),
            llm,
            config: Arc::new(ConfigBuilder::new().with_ui_dir("does-not-exist").build()),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_video_routes() {
        let app = build_router(state(None));

        let response = app
            .clone()
            .oneshot(Request::get("/api/videos?q=growth").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], 1);

        let response = app
            .clone()
            .oneshot(Request::get("/api/videos/a1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/api/videos/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_chat_without_llm_is_unavailable() {
        let app = build_router(state(None));
        let response = app
            .oneshot(chat_request(r#"{"message": "hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let app = build_router(state(Some(Arc::new(CannedLLM))));
        let response = app
            .clone()
            .oneshot(chat_request(
                r#"{"session": {"scope": {"kind": "video", "video_id": "a1"}, "messages": []}, "message": "Summary?"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["reply"], "It is about growth.");
        assert_eq!(body["session"]["messages"].as_array().unwrap().len(), 2);

        let response = app
            .oneshot(chat_request(
                r#"{"session": {"scope": {"kind": "video", "video_id": "nope"}}, "message": "Hi"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_video_selection() {
        let app = build_router(state(Some(Arc::new(CannedLLM))));
        let response = app
            .clone()
            .oneshot(chat_request(r#"{"video_id": "a1", "message": "Summary?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["session"]["scope"]["kind"], "video");
        assert_eq!(body["session"]["scope"]["video_id"], "a1");

        // Same video keeps the history
        let follow_up = serde_json::json!({
            "session": body["session"],
            "video_id": "a1",
            "message": "And then?",
        });
        let response = app
            .clone()
            .oneshot(chat_request(&follow_up.to_string()))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["session"]["messages"].as_array().unwrap().len(), 4);

        // Another video starts over, and an unknown one is rejected
        let switched = serde_json::json!({
            "session": body["session"],
            "video_id": "zz9",
            "message": "Hi",
        });
        let response = app.oneshot(chat_request(&switched.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ui_falls_back_to_embedded_page() {
        let app = build_router(state(None));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Workshop Explorer"));
    }
}
