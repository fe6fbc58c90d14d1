//! JSON file persistence for the catalog

use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{Catalog, CatalogError, Result, VideoRecord};

/// Reads and writes a catalog file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog, normalizing cached fields and `days_ago`
    pub async fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            return Err(CatalogError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path).await?;
        let mut catalog = parse_catalog(&content)?;
        catalog.refresh_days_ago(chrono::Local::now().date_naive());

        info!("📚 Loaded {} videos from {}", catalog.len(), self.path.display());
        Ok(catalog)
    }

    /// Overwrite the catalog file atomically
    pub async fn save(&self, catalog: &Catalog) -> Result<()> {
        self.save_to(catalog, &self.path).await
    }

    /// Write the catalog to another file, e.g. an `--output` path
    pub async fn save_to(&self, catalog: &Catalog, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(catalog)?;
        let path = path.to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&dir).await?;

        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
            temp.write_all(content.as_bytes())?;
            temp.write_all(b"\n")?;
            temp.as_file().sync_all()?;
            temp.persist(&target)?;
            Ok(())
        })
        .await??;

        info!("💾 Saved {} videos to {}", catalog.len(), path.display());
        Ok(())
    }
}

/// Parse a catalog document: a JSON array of video objects
pub fn parse_catalog(content: &str) -> Result<Catalog> {
    let records: Vec<VideoRecord> = serde_json::from_str(content)?;
    debug!("Parsed {} video records", records.len());
    Catalog::from_records(records)
}
