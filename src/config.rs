use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::chat::ChatSettings;
use crate::llm::summaries::SummarySettings;
use crate::llm::{LLMConfig, LLMProvider};

/// Configuration file names searched by [`Config::load`], in order
pub const CONFIG_PATHS: [&str; 2] = ["workshop-explorer.toml", "config/workshop-explorer.toml"];

/// Configuration for the workshop explorer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog file location
    pub catalog: CatalogConfig,

    /// LLM provider used by chat and summaries
    pub llm: LLMConfig,

    /// Chat prompt limits
    pub chat: ChatSettings,

    /// Summary prompt settings
    pub summaries: SummarySettings,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog of video records
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("nber_videos_transcripts.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html`; the embedded page is served otherwise
    pub ui_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ui_dir: PathBuf::from("ui"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log level for this crate when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file that exists, else
    /// defaults, then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_first(&CONFIG_PATHS)
    }

    /// Load the first of `paths` that exists. A file that exists but does not
    /// parse is an error, never a silent fall back to defaults.
    pub fn load_first<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        for path in paths {
            let path = path.as_ref();
            if path.is_file() {
                return Self::load_from(path);
            }
        }

        tracing::debug!("No config file found; using defaults and environment");
        Self::from_env()
    }

    /// Load an explicit configuration file, then apply environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.apply_env();
        Ok(config)
    }

    /// Defaults with environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps variable names to values
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("WORKSHOP_EXPLORER_CATALOG") {
            self.catalog.path = PathBuf::from(path);
        }

        if let Some(port) = lookup("WORKSHOP_EXPLORER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid WORKSHOP_EXPLORER_PORT: {}", port),
            }
        }

        if let Some(log_level) = lookup("WORKSHOP_EXPLORER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        let key_var = match self.llm.provider {
            LLMProvider::OpenAI => Some("OPENAI_API_KEY"),
            LLMProvider::Gemini => Some("GEMINI_API_KEY"),
            LLMProvider::LMStudio => None,
        };
        if self.llm.api_key.is_none() {
            if let Some(api_key) = key_var.and_then(|var| lookup(var)) {
                self.llm.api_key = Some(api_key);
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate limits and ports
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }

        if self.chat.transcript_chars == 0 || self.chat.max_catalog_videos == 0 {
            return Err(anyhow!("chat limits must be greater than 0"));
        }

        if self.summaries.excerpt_chars == 0 {
            return Err(anyhow!("summaries.excerpt_chars must be greater than 0"));
        }

        for (name, temperature) in [
            ("llm.temperature", self.llm.temperature),
            ("chat.temperature", self.chat.temperature),
            ("summaries.temperature", self.summaries.temperature),
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("{} must be between 0.0 and 2.0", name));
            }
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Check that the configured provider can be constructed
    pub fn validate_llm(&self) -> Result<()> {
        if self.llm.requires_api_key() && self.llm.api_key.is_none() {
            return Err(anyhow!(
                "API key required for {:?}; set it in the config file or the environment",
                self.llm.provider
            ));
        }
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Workshop Explorer Configuration:\n\
            - Catalog: {}\n\
            - LLM Provider: {:?} ({})\n\
            - API Key: {}\n\
            - Server: {}:{}\n\
            - UI Directory: {}\n\
            - Log Level: {}",
            self.catalog.path.display(),
            self.llm.provider,
            self.llm.model,
            if self.llm.api_key.is_some() { "set" } else { "not set" },
            self.server.host,
            self.server.port,
            self.server.ui_dir.display(),
            self.output.log_level
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.catalog.path = path.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_llm_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.llm.api_key = Some(api_key.into());
        self
    }

    pub fn with_ui_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.server.ui_dir = dir.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
