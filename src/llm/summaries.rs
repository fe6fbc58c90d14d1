//! AI summaries of transcribed presentations

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ChatMessage, ChatOptions, LLM};
use crate::catalog::{Catalog, VideoRecord};

const SYSTEM_PROMPT: &str = "You are an expert at summarizing economics research presentations.";

/// Prompt and sampling settings for summary generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarySettings {
    /// Event name quoted in the prompt
    pub workshop_name: String,
    /// Transcript characters included in the prompt
    pub excerpt_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            workshop_name: "NBER Economics of Transformative AI Workshop".to_string(),
            excerpt_chars: 12_000,
            temperature: 0.5,
            max_tokens: 500,
        }
    }
}

impl SummarySettings {
    fn options(&self) -> ChatOptions {
        ChatOptions::new(self.temperature, self.max_tokens)
    }
}

/// Transcript text worth summarizing, if any
fn usable_transcript(video: &VideoRecord) -> Option<&str> {
    video.transcript_text().filter(|t| !t.trim().is_empty())
}

/// Build the user prompt for one video; `None` without a transcript
pub fn summary_prompt(video: &VideoRecord, settings: &SummarySettings) -> Option<String> {
    let transcript = usable_transcript(video)?;
    let excerpt: String = transcript.chars().take(settings.excerpt_chars).collect();

    Some(format!(
        "You are summarizing an academic presentation from the {workshop}.\n\
         \n\
         Title: {title}\n\
         Presenters: {presenters}\n\
         \n\
         Based on the following transcript excerpt, create a concise 2-3 paragraph summary that captures:\n\
         1. The main research question or topic\n\
         2. Key findings or arguments presented\n\
         3. Important implications or conclusions\n\
         \n\
         Keep the summary accessible to economists and policymakers. Be specific about the content.\n\
         \n\
         Transcript:\n\
         {excerpt}\n\
         \n\
         Summary:",
        workshop = settings.workshop_name,
        title = video.title,
        presenters = video.presenter_line(),
        excerpt = excerpt,
    ))
}

/// Ask the LLM for a summary; `Ok(None)` when there is nothing to summarize
pub async fn generate_summary(
    llm: &dyn LLM,
    video: &VideoRecord,
    settings: &SummarySettings,
) -> Result<Option<String>> {
    let Some(prompt) = summary_prompt(video, settings) else {
        return Ok(None);
    };

    let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];
    let response = llm.chat(messages, settings.options()).await?;

    let summary = response.content.trim().to_string();
    if summary.is_empty() {
        return Ok(None);
    }

    debug!(
        "Summary for {} ({} words, {:?} tokens)",
        video.id,
        summary.split_whitespace().count(),
        response.tokens_used
    );
    Ok(Some(summary))
}

/// Outcome of a catalog summary pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub generated: usize,
    /// No transcript, or a summary already present without `overwrite`
    pub skipped: usize,
    pub failed: usize,
}

/// Fill `ai_summary` for every transcribed video
///
/// A failure on one video is logged and counted; the pass continues.
pub async fn summarize_catalog(
    llm: &dyn LLM,
    catalog: &mut Catalog,
    settings: &SummarySettings,
    overwrite: bool,
) -> SummaryReport {
    let mut report = SummaryReport::default();
    let total = catalog.len();

    for (index, video) in catalog.videos_mut().iter_mut().enumerate() {
        if usable_transcript(video).is_none() {
            debug!("⏭️ {}/{} {}: no transcript", index + 1, total, video.id);
            report.skipped += 1;
            continue;
        }
        if video.ai_summary.is_some() && !overwrite {
            debug!("⏭️ {}/{} {}: summary exists", index + 1, total, video.id);
            report.skipped += 1;
            continue;
        }

        info!("🤖 {}/{} Summarizing: {}", index + 1, total, video.title);

        match generate_summary(llm, video, settings).await {
            Ok(Some(summary)) => {
                video.ai_summary = Some(summary);
                report.generated += 1;
            }
            Ok(None) => {
                warn!("⚠️ Empty summary returned for {}", video.id);
                report.failed += 1;
            }
            Err(e) => {
                warn!("❌ Failed to summarize {}: {}", video.id, e);
                report.failed += 1;
            }
        }
    }

    info!(
        "✅ Summaries: {} generated, {} skipped, {} failed",
        report.generated, report.skipped, report.failed
    );
    report
}
