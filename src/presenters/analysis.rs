//! Presenter statistics across the catalog

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::catalog::{Catalog, CatalogStats, VideoRecord};

/// One presenter appearing in one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub name: String,
    pub affiliation: String,
    pub video_id: String,
    pub video_title: String,
    pub video_url: String,
}

/// Every presenter appearance, in catalog then description order
pub fn appearances(catalog: &Catalog) -> Vec<Appearance> {
    catalog
        .videos()
        .iter()
        .flat_map(|video| {
            video.presenters.iter().map(move |p| Appearance {
                name: p.name.clone(),
                affiliation: p.affiliation.clone(),
                video_id: video.id.clone(),
                video_title: video.title.clone(),
                video_url: video.url.clone(),
            })
        })
        .collect()
}

/// Appearances whose name or affiliation contains `query`, case-insensitively
pub fn search_appearances(catalog: &Catalog, query: &str) -> Vec<Appearance> {
    let needle = query.to_lowercase();
    appearances(catalog)
        .into_iter()
        .filter(|a| {
            a.name.to_lowercase().contains(&needle) || a.affiliation.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Appearances grouped by affiliation; each group keeps the input order
pub fn by_affiliation(appearances: Vec<Appearance>) -> BTreeMap<String, Vec<Appearance>> {
    let mut groups: BTreeMap<String, Vec<Appearance>> = BTreeMap::new();
    for appearance in appearances {
        groups
            .entry(appearance.affiliation.clone())
            .or_default()
            .push(appearance);
    }
    groups
}

const CSV_HEADER: &str = "name,affiliation,video_title,video_url";

/// Quote a CSV field when it holds a comma, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render appearances as CSV with a header row
pub fn appearances_csv(appearances: &[Appearance]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");
    for a in appearances {
        let row = [&a.name, &a.affiliation, &a.video_title, &a.video_url]
            .iter()
            .map(|field| csv_field(field))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&row);
        out.push_str("\r\n");
    }
    out
}

pub async fn export_csv(appearances: &[Appearance], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, appearances_csv(appearances))
        .await
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;

    info!("📄 Exported {} presenter appearances to {}", appearances.len(), path.display());
    Ok(())
}

pub fn affiliation_counts(catalog: &Catalog) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for presenter in catalog.videos().iter().flat_map(|v| &v.presenters) {
        *counts.entry(presenter.affiliation.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn presenter_counts(catalog: &Catalog) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for presenter in catalog.videos().iter().flat_map(|v| &v.presenters) {
        *counts.entry(presenter.name.clone()).or_insert(0) += 1;
    }
    counts
}

/// Presenters in more than one video, most frequent first, ties by name
pub fn repeat_presenters(catalog: &Catalog) -> Vec<(String, usize)> {
    let mut repeats: Vec<(String, usize)> = presenter_counts(catalog)
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    repeats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    repeats
}

/// Videos ordered by presenter count, descending; ties keep catalog order
pub fn videos_by_presenter_count(catalog: &Catalog) -> Vec<&VideoRecord> {
    let mut videos: Vec<&VideoRecord> = catalog.videos().iter().collect();
    videos.sort_by(|a, b| b.num_presenters.cmp(&a.num_presenters));
    videos
}

/// Short reference to a video in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPresenterCount {
    pub id: String,
    pub title: String,
    pub num_presenters: usize,
}

/// Everything the `stats` command prints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub catalog: CatalogStats,
    pub videos_with_presenters: usize,
    pub average_presenters: f64,
    pub affiliations: BTreeMap<String, usize>,
    pub presenters: BTreeMap<String, usize>,
    pub repeat_presenters: Vec<(String, usize)>,
    pub top_videos: Vec<VideoPresenterCount>,
}

impl AnalysisReport {
    /// Number of videos listed in `top_videos`
    pub const TOP_VIDEOS: usize = 5;

    pub fn build(catalog: &Catalog) -> Self {
        let stats = catalog.stats();
        let average_presenters = if stats.videos == 0 {
            0.0
        } else {
            stats.total_presenters as f64 / stats.videos as f64
        };

        let top_videos = videos_by_presenter_count(catalog)
            .into_iter()
            .take(Self::TOP_VIDEOS)
            .map(|v| VideoPresenterCount {
                id: v.id.clone(),
                title: v.title.clone(),
                num_presenters: v.num_presenters,
            })
            .collect();

        Self {
            videos_with_presenters: catalog
                .videos()
                .iter()
                .filter(|v| !v.presenters.is_empty())
                .count(),
            average_presenters,
            affiliations: affiliation_counts(catalog),
            presenters: presenter_counts(catalog),
            repeat_presenters: repeat_presenters(catalog),
            top_videos,
            catalog: stats,
        }
    }

    /// Affiliations by count descending, ties by name
    pub fn top_affiliations(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut sorted: Vec<(&str, usize)> = self
            .affiliations
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted.truncate(limit);
        sorted
    }

    pub async fn export_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        info!("📊 Analysis report exported to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Presenter;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            VideoRecord::new("a", "Opening", "https://youtu.be/a", "")
                .with_presenters(vec![Presenter::new("Erik Brynjolfsson", "Stanford University")]),
            VideoRecord::new("b", "Panel", "https://youtu.be/b", "").with_presenters(vec![
                Presenter::new("Chad Jones", "Stanford University"),
                Presenter::new("Erik Brynjolfsson", "Stanford University"),
                Presenter::new("Daron Acemoglu", "MIT"),
            ]),
            VideoRecord::new("c", "Closing", "https://youtu.be/c", "")
                .with_presenters(vec![Presenter::new("Daron Acemoglu", "MIT")]),
            VideoRecord::new("d", "Break", "https://youtu.be/d", ""),
        ])
    }

    #[test]
    fn test_appearances_flatten_in_order() {
        let all = appearances(&catalog());
        assert_eq!(all.len(), 5);
        assert_eq!(all[1].name, "Chad Jones");
        assert_eq!(all[1].video_id, "b");
        assert_eq!(all[1].video_url, "https://youtu.be/b");
    }

    #[test]
    fn test_search_appearances() {
        let results = search_appearances(&catalog(), "mit");
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|a| a.name == "Daron Acemoglu"));
    }

    #[test]
    fn test_counts() {
        let catalog = catalog();
        let affiliations = affiliation_counts(&catalog);
        assert_eq!(affiliations["Stanford University"], 3);
        assert_eq!(affiliations["MIT"], 2);

        let presenters = presenter_counts(&catalog);
        assert_eq!(presenters["Chad Jones"], 1);
        assert_eq!(presenters.len(), 3);
    }

    #[test]
    fn test_repeat_presenters_sorted() {
        let repeats = repeat_presenters(&catalog());
        assert_eq!(
            repeats,
            vec![
                ("Daron Acemoglu".to_string(), 2),
                ("Erik Brynjolfsson".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_videos_by_presenter_count_is_stable() {
        let catalog = catalog();
        let ids: Vec<&str> = videos_by_presenter_count(&catalog)
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_report() {
        let report = AnalysisReport::build(&catalog());

        assert_eq!(report.videos_with_presenters, 3);
        assert!((report.average_presenters - 1.25).abs() < f64::EPSILON);
        assert_eq!(report.top_videos[0].id, "b");
        assert_eq!(report.top_affiliations(1), vec![("Stanford University", 3)]);
    }

    #[test]
    fn test_empty_catalog_report() {
        let report = AnalysisReport::build(&Catalog::default());
        assert_eq!(report.average_presenters, 0.0);
        assert!(report.top_videos.is_empty());
    }

    #[test]
    fn test_by_affiliation() {
        let groups = by_affiliation(appearances(&catalog()));
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["MIT", "Stanford University"]);

        let stanford: Vec<(&str, &str)> = groups["Stanford University"]
            .iter()
            .map(|a| (a.name.as_str(), a.video_id.as_str()))
            .collect();
        assert_eq!(
            stanford,
            vec![("Erik Brynjolfsson", "a"), ("Chad Jones", "b"), ("Erik Brynjolfsson", "b")]
        );
    }

    #[test]
    fn test_appearances_csv_quotes_fields() {
        let rows = vec![Appearance {
            name: "Anton Korinek".to_string(),
            affiliation: "University of Virginia, and NBER".to_string(),
            video_id: "x".to_string(),
            video_title: "The \"Last\" Invention".to_string(),
            video_url: "https://youtu.be/x".to_string(),
        }];

        let csv = appearances_csv(&rows);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "name,affiliation,video_title,video_url");
        assert_eq!(
            lines[1],
            "Anton Korinek,\"University of Virginia, and NBER\",\"The \"\"Last\"\" Invention\",https://youtu.be/x"
        );
        assert_eq!(lines[2], "");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("presenters.csv");

        export_csv(&search_appearances(&catalog(), "mit"), &path).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("Daron Acemoglu,MIT,Closing,https://youtu.be/c"));
    }

    #[tokio::test]
    async fn test_export_json() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        AnalysisReport::build(&catalog()).export_json(&path).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["catalog"]["videos"], 4);
        assert_eq!(raw["affiliations"]["MIT"], 2);
    }
}
