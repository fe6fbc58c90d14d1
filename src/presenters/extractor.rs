//! Heuristic presenter extraction from video descriptions
//!
//! Descriptions list speakers under a "Presented by:" header, one per line
//! as `Name, Affiliation`. Two tiers are tried:
//!
//! 1. The header followed by a line break, with the section running until a
//!    blank line, a title-like line or the end of the text.
//! 2. A line scanner for descriptions where the header is malformed or sits
//!    on the same line as other text.
//!
//! Extraction never fails; anything unrecognised yields no presenters.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Presenter, VideoRecord};

/// Lines in the fallback tier containing these are never presenters
const NOISE_MARKERS: [&str; 3] = ["organizers", "supported by", "september"];

/// Fallback title lines must be longer than this many characters
const TITLE_MIN_CHARS: usize = 10;

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| match Regex::new(r"Presented b[yi]:\s*\n") {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("⚠️ Failed to compile presenter header pattern: {}", e);
                None
            }
        })
        .as_ref()
}

/// Extract presenters in the order they appear in `description`
pub fn extract(description: &str) -> Vec<Presenter> {
    let section = match header_section(description) {
        Some(section) => section.to_string(),
        None => match scan_for_section(description) {
            Some(lines) => lines.join("\n"),
            None => return Vec::new(),
        },
    };

    section
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

/// Primary tier: the text following the header up to the section end
fn header_section(description: &str) -> Option<&str> {
    let header = header_regex()?.find(description)?;
    let rest = &description[header.end()..];
    Some(rest[..section_end(rest)].trim())
}

/// Offset of the first line break that closes the section
///
/// A break closes the section when it is followed by another break, or by
/// a line that starts with an ASCII capital, has no comma and is itself
/// newline-terminated.
fn section_end(text: &str) -> usize {
    for (offset, _) in text.match_indices('\n') {
        let next = &text[offset + 1..];

        if next.starts_with('\n') {
            return offset;
        }

        if next.starts_with(|c: char| c.is_ascii_uppercase()) {
            if let Some(line_end) = next.find('\n') {
                if !next[..line_end].contains(',') {
                    return offset;
                }
            }
        }
    }

    text.len()
}

/// Fallback tier: collect comma lines after a line mentioning the header
fn scan_for_section(description: &str) -> Option<Vec<&str>> {
    let mut lines = Vec::new();
    let mut in_section = false;

    for line in description.split('\n').map(str::trim) {
        if line.contains("Presented b") {
            in_section = true;
            continue;
        }
        if !in_section || line.is_empty() {
            continue;
        }

        if !line.contains(',') {
            if is_title_line(line) {
                break;
            }
            continue;
        }

        let lowered = line.to_lowercase();
        if NOISE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            continue;
        }
        lines.push(line);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines)
    }
}

fn is_title_line(line: &str) -> bool {
    line.chars().next().map_or(false, char::is_uppercase)
        && line.chars().count() > TITLE_MIN_CHARS
}

/// Split `Name, Affiliation` on the first comma
fn parse_line(line: &str) -> Option<Presenter> {
    let (name, affiliation) = line.split_once(',')?;
    let name = name.trim();
    let affiliation = affiliation.trim();

    if name.is_empty() || affiliation.to_lowercase().contains("organizers") {
        return None;
    }

    Some(Presenter::new(name, affiliation))
}

/// Re-run extraction on a record, keeping scholar links of unchanged names
pub fn extract_into(video: &mut VideoRecord) -> usize {
    let links: HashMap<String, String> = video
        .presenters
        .drain(..)
        .filter_map(|p| p.scholar_url.map(|url| (p.name, url)))
        .collect();

    let presenters = extract(&video.description)
        .into_iter()
        .map(|mut presenter| {
            presenter.scholar_url = links.get(&presenter.name).cloned();
            presenter
        })
        .collect::<Vec<_>>();

    let count = presenters.len();
    video.set_presenters(presenters);
    count
}

/// Per-video outcome of a catalog extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub videos: usize,
    pub with_presenters: usize,
    pub total_presenters: usize,
    /// Ids of videos whose description yielded nobody
    pub without_presenters: Vec<String>,
}

/// Re-extract presenters for every video in the catalog
pub fn extract_catalog(catalog: &mut Catalog) -> ExtractionSummary {
    let mut summary = ExtractionSummary::default();

    for video in catalog.videos_mut() {
        let found = extract_into(video);
        debug!("👥 {} presenter(s) in {} ({})", found, video.id, video.title);

        summary.videos += 1;
        summary.total_presenters += found;
        if found > 0 {
            summary.with_presenters += 1;
        } else {
            summary.without_presenters.push(video.id.clone());
        }
    }

    info!(
        "✅ Extracted {} presenters from {}/{} videos",
        summary.total_presenters, summary.with_presenters, summary.videos
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(presenters: &[Presenter]) -> Vec<(&str, &str)> {
        presenters
            .iter()
            .map(|p| (p.name.as_str(), p.affiliation.as_str()))
            .collect()
    }

    #[test]
    fn test_header_section_ends_at_blank_line() {
        let description = "Presented by:\n\
            Joseph Stiglitz, Columbia University\n\
            Daron Acemoglu, MIT\n\
            \n\
            Organizers: Jane Doe, NBER\n\
            \n\
            Some Talk Title";

        assert_eq!(
            names(&extract(description)),
            vec![
                ("Joseph Stiglitz", "Columbia University"),
                ("Daron Acemoglu", "MIT")
            ]
        );
    }

    #[test]
    fn test_header_section_ends_at_title_line() {
        let description = "Presented by:\n\
            Anton Korinek, University of Virginia\n\
            Economics of Transformative AI Workshop\n\
            Chad Jones, Stanford University\n";

        assert_eq!(
            names(&extract(description)),
            vec![("Anton Korinek", "University of Virginia")]
        );
    }

    #[test]
    fn test_header_section_runs_to_end_of_text() {
        let description = "Presented by:\nBenjamin Jones, Northwestern University";
        assert_eq!(
            names(&extract(description)),
            vec![("Benjamin Jones", "Northwestern University")]
        );
    }

    #[test]
    fn test_unterminated_title_line_does_not_close_section() {
        let description = "Presented by:\nZoe Cullen, Harvard Business School\nA final line";
        let presenters = extract(description);

        assert_eq!(names(&presenters), vec![("Zoe Cullen", "Harvard Business School")]);
    }

    #[test]
    fn test_typo_header_and_trailing_spaces() {
        let description = "Presented bi:   \n  Ajay Agrawal, University of Toronto  \n\nMore";
        assert_eq!(
            names(&extract(description)),
            vec![("Ajay Agrawal", "University of Toronto")]
        );
    }

    #[test]
    fn test_affiliation_keeps_extra_commas() {
        let description = "Presented by:\nAvi Goldfarb, University of Toronto, and NBER\n";
        assert_eq!(
            names(&extract(description)),
            vec![("Avi Goldfarb", "University of Toronto, and NBER")]
        );
    }

    #[test]
    fn test_lines_without_comma_and_organizer_lines_are_skipped() {
        let description = "Presented by:\n\
            Erik Brynjolfsson, Stanford\n\
            and colleagues\n\
            Jane Doe, Workshop Organizers\n\
            , Nameless University\n";

        assert_eq!(names(&extract(description)), vec![("Erik Brynjolfsson", "Stanford")]);
    }

    #[test]
    fn test_fallback_when_header_shares_line() {
        let description = "Presented by: the following speakers\n\
            Diane Coyle, University of Cambridge\n\
            Supported by the Sloan Foundation, thanks\n\
            September 2024, Cambridge MA\n\
            Tyna Eloundou, OpenAI\n\
            Economics of Transformative AI\n\
            Ignored Person, Nowhere";

        assert_eq!(
            names(&extract(description)),
            vec![
                ("Diane Coyle", "University of Cambridge"),
                ("Tyna Eloundou", "OpenAI")
            ]
        );
    }

    #[test]
    fn test_unrecognised_header_typo_uses_line_scan() {
        let description = "Presented bt:\n\
            Anton Korinek, University of Virginia\n\
            \n\
            Organizers, NBER\n\
            Basil Halperin, Stanford University\n\
            Economics of Transformative AI Workshop\n\
            Late Entry, Elsewhere\n";

        assert!(header_section(description).is_none());
        assert_eq!(
            names(&extract(description)),
            vec![
                ("Anton Korinek", "University of Virginia"),
                ("Basil Halperin", "Stanford University")
            ]
        );
    }

    #[test]
    fn test_fallback_short_capitalised_line_does_not_stop() {
        let description = "Presented by: speakers\nPanel\nLindsey Raymond, MIT";
        assert_eq!(names(&extract(description)), vec![("Lindsey Raymond", "MIT")]);
    }

    #[test]
    fn test_no_header_yields_nothing() {
        assert!(extract("A talk about growth.\nJohn Smith, Somewhere").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let description = "Presented by:\nDaron Acemoglu, MIT\nSimon Johnson, MIT\n";
        assert_eq!(extract(description), extract(description));
    }

    #[test]
    fn test_extract_into_preserves_scholar_urls() {
        let mut video = VideoRecord::new(
            "v1",
            "Talk",
            "",
            "Presented by:\nDaron Acemoglu, MIT\nSimon Johnson, MIT\n",
        )
        .with_presenters(vec![
            Presenter::new("Daron Acemoglu", "MIT").with_scholar_url("https://scholar/da"),
            Presenter::new("Someone Gone", "Nowhere").with_scholar_url("https://scholar/sg"),
        ]);

        let found = extract_into(&mut video);

        assert_eq!(found, 2);
        assert_eq!(video.num_presenters, 2);
        assert_eq!(video.presenters[0].scholar_url.as_deref(), Some("https://scholar/da"));
        assert!(video.presenters[1].scholar_url.is_none());
    }

    #[test]
    fn test_extract_catalog_summary() {
        let mut catalog = Catalog::new(vec![
            VideoRecord::new("a", "A", "", "Presented by:\nLi Jin, Harvard\n"),
            VideoRecord::new("b", "B", "", "Opening remarks"),
        ]);

        let summary = extract_catalog(&mut catalog);

        assert_eq!(summary.videos, 2);
        assert_eq!(summary.with_presenters, 1);
        assert_eq!(summary.total_presenters, 1);
        assert_eq!(summary.without_presenters, vec!["b"]);
        assert_eq!(catalog.get("a").unwrap().presenter_line(), "Li Jin");
    }
}
