//! API module for the workshop explorer
//!
//! Provides the JSON endpoints and the single-page UI.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::llm::{create_llm, LLM};

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{build_router, AppState};

/// API server over a catalog loaded once at startup
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a server, building the LLM from configuration when possible
    pub fn new(catalog: Catalog, config: Config) -> Self {
        let llm: Option<Arc<dyn LLM>> = match config.validate_llm().and_then(|_| create_llm(&config.llm)) {
            Ok(llm) => Some(Arc::from(llm)),
            Err(e) => {
                warn!("⚠️ Chat disabled: {}", e);
                None
            }
        };

        Self::with_llm(catalog, config, llm)
    }

    pub fn with_llm(catalog: Catalog, config: Config, llm: Option<Arc<dyn LLM>>) -> Self {
        Self {
            state: AppState {
                catalog: Arc::new(catalog),
                llm,
                config: Arc::new(config),
            },
        }
    }

    pub fn chat_enabled(&self) -> bool {
        self.state.llm.is_some()
    }

    /// Start the API server
    pub async fn run(self) -> Result<()> {
        info!(
            "🚀 Starting API server with {} videos (chat {})",
            self.state.catalog.len(),
            if self.chat_enabled() { "enabled" } else { "disabled" }
        );

        server::start_http_server(self.state).await
    }
}
