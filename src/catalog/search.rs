//! Catalog search and the presenter directory
//!
//! Both are linear scans over the in-memory catalog. Search is a plain
//! order-preserving filter; there is no ranking or tokenization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::VideoRecord;

/// Filter videos whose title, presenters or transcript contain `query`
///
/// Matching is case-insensitive substring containment. An empty or
/// whitespace-only query returns every video in catalog order.
pub fn search<'a>(videos: &'a [VideoRecord], query: &str) -> Vec<&'a VideoRecord> {
    if query.trim().is_empty() {
        return videos.iter().collect();
    }

    let needle = query.to_lowercase();
    videos
        .iter()
        .filter(|video| matches_video(video, &needle))
        .collect()
}

/// `needle` must already be lower-cased
fn matches_video(video: &VideoRecord, needle: &str) -> bool {
    if video.title.to_lowercase().contains(needle) {
        return true;
    }

    let presenter_match = video.presenters.iter().any(|p| {
        p.name.to_lowercase().contains(needle) || p.affiliation.to_lowercase().contains(needle)
    });
    if presenter_match {
        return true;
    }

    video
        .transcript
        .as_deref()
        .map_or(false, |t| t.to_lowercase().contains(needle))
}

/// A video reference inside a directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryVideo {
    pub title: String,
    pub id: String,
    pub url: String,
}

/// One presenter aggregated across every video they appear in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub affiliation: String,
    pub scholar_url: Option<String>,
    pub videos: Vec<DirectoryVideo>,
}

/// Deduplicate presenters by exact name, sorted by name
///
/// The first occurrence of a name fixes its affiliation and scholar link.
/// Later occurrences only contribute their video, so a differing
/// affiliation on a later talk is dropped.
pub fn build_directory(videos: &[VideoRecord]) -> Vec<DirectoryEntry> {
    let mut entries: BTreeMap<&str, DirectoryEntry> = BTreeMap::new();

    for video in videos {
        for presenter in &video.presenters {
            let entry = entries
                .entry(presenter.name.as_str())
                .or_insert_with(|| DirectoryEntry {
                    name: presenter.name.clone(),
                    affiliation: presenter.affiliation.clone(),
                    scholar_url: presenter.scholar_url.clone(),
                    videos: Vec::new(),
                });

            entry.videos.push(DirectoryVideo {
                title: video.title.clone(),
                id: video.id.clone(),
                url: video.url.clone(),
            });
        }
    }

    entries.into_values().collect()
}

/// Keep directory entries whose name or affiliation contains `query`
pub fn filter_directory(entries: Vec<DirectoryEntry>, query: &str) -> Vec<DirectoryEntry> {
    if query.trim().is_empty() {
        return entries;
    }

    let needle = query.to_lowercase();
    entries
        .into_iter()
        .filter(|entry| {
            entry.name.to_lowercase().contains(&needle)
                || entry.affiliation.to_lowercase().contains(&needle)
        })
        .collect()
}
