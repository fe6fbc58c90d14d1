//! Manual scholar profile corrections keyed by presenter name

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::Catalog;

/// Presenter name to corrected profile link; `None` removes the link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScholarCorrections {
    urls: BTreeMap<String, Option<String>>,
}

impl ScholarCorrections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, url: Option<String>) -> &mut Self {
        self.urls.insert(name.into(), url);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Option<String>> {
        self.urls.get(name)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Load from `.json` (null removes) or TOML (empty string removes)
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read corrections file: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let corrections = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_toml(&content)
        }
        .with_context(|| format!("Failed to parse corrections file: {}", path.display()))?;

        info!("🎓 Loaded {} scholar corrections from {}", corrections.len(), path.display());
        Ok(corrections)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let urls: BTreeMap<String, Option<String>> = serde_json::from_str(content)?;
        Ok(Self { urls })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = toml::from_str(content)?;
        let urls = raw
            .into_iter()
            .map(|(name, url)| {
                let url = url.trim().to_string();
                (name, if url.is_empty() { None } else { Some(url) })
            })
            .collect();
        Ok(Self { urls })
    }
}

/// Counts of changes made by one correction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarFixReport {
    pub updated: usize,
    pub removed: usize,
}

impl ScholarFixReport {
    pub fn total(&self) -> usize {
        self.updated + self.removed
    }
}

/// Apply corrections to every presenter whose name is listed
pub fn apply(catalog: &mut Catalog, corrections: &ScholarCorrections) -> ScholarFixReport {
    let mut report = ScholarFixReport::default();

    for video in catalog.videos_mut() {
        for presenter in &mut video.presenters {
            let Some(correction) = corrections.get(&presenter.name) else {
                continue;
            };

            match correction {
                None => {
                    if presenter.scholar_url.take().is_some() {
                        debug!("✗ Removed scholar link for {}", presenter.name);
                        report.removed += 1;
                    }
                }
                Some(url) => {
                    if presenter.scholar_url.as_deref() != Some(url.as_str()) {
                        debug!("✓ Updated scholar link for {}: {}", presenter.name, url);
                        presenter.scholar_url = Some(url.clone());
                        report.updated += 1;
                    }
                }
            }
        }
    }

    info!(
        "🎓 Scholar links: {} updated, {} removed",
        report.updated, report.removed
    );
    report
}
