//! Prompt context building.

use super::format::{format_match_block, normalize_video_url};
use crate::config::Prompts;
use crate::vector_index::SearchMatch;
use std::collections::HashMap;

/// Context text used when no match clears the score threshold.
pub const NO_MATCHES_SENTINEL: &str = "No relevant video segments were found.";

/// Matches whose score is at or above `threshold`, in their original order.
pub fn relevant_matches(matches: &[SearchMatch], threshold: f32) -> Vec<SearchMatch> {
    matches
        .iter()
        .filter(|m| m.score >= threshold)
        .cloned()
        .collect()
}

/// Build the context block for a prompt.
pub fn build_context(matches: &[SearchMatch], threshold: f32) -> String {
    format_context(&relevant_matches(matches, threshold))
}

/// Format already-filtered matches, or the sentinel when there are none.
fn format_context(relevant: &[SearchMatch]) -> String {
    let blocks: Vec<String> = relevant.iter().map(format_match_block).collect();

    if blocks.is_empty() {
        NO_MATCHES_SENTINEL.to_string()
    } else {
        blocks.join("\n\n")
    }
}

/// Build the user instruction from the default templates.
pub fn build_prompt(context: &str, question: &str) -> String {
    build_prompt_with(&Prompts::default(), context, question)
}

/// Build the user instruction from the given templates.
pub fn build_prompt_with(prompts: &Prompts, context: &str, question: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("context".to_string(), context.to_string());
    vars.insert("question".to_string(), question.to_string());
    prompts.render_with_custom(&prompts.assistant.user, &vars)
}

/// Everything derived from the index for one question.
///
/// Built fresh per query and dropped with the answer.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The question as asked.
    pub question: String,
    /// Matches that cleared the threshold, highest score first.
    pub matches: Vec<SearchMatch>,
    /// Rendered context block (or the sentinel).
    pub context_text: String,
    video_map: HashMap<String, String>,
}

impl QueryContext {
    /// Filter `matches` and derive the context text and URL-to-summary map.
    pub fn new(question: &str, matches: &[SearchMatch], threshold: f32) -> Self {
        let relevant = relevant_matches(matches, threshold);
        let context_text = format_context(&relevant);

        let mut video_map = HashMap::new();
        for m in &relevant {
            let url = normalize_video_url(&m.url());
            if url.is_empty() {
                continue;
            }
            // Highest-scoring segment wins for a repeated video
            video_map.entry(url).or_insert_with(|| m.summary());
        }

        Self {
            question: question.to_string(),
            matches: relevant,
            context_text,
            video_map,
        }
    }

    /// Summary of the video with the given normalized URL.
    pub fn summary_for(&self, url: &str) -> Option<&str> {
        self.video_map.get(url).map(String::as_str)
    }

    /// Whether any match cleared the threshold.
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }
}
