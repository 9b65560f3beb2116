//! Video citations in assistant replies.

use super::context::QueryContext;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Width and height of embedded players, in pixels.
pub const EMBED_SIZE: u32 = 300;

static VIDEO_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[VIDEO:\s*([^\]]*)\]").expect("Invalid regex"));

/// All URLs cited with `[VIDEO: <url>]`, in order of appearance, duplicates kept.
pub fn extract_video_urls(text: &str) -> Vec<String> {
    VIDEO_MARKER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// A cited video with the summary of the segment it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoReference {
    pub url: String,
    pub summary: String,
}

impl VideoReference {
    /// Player markup: fixed size, no scrolling, no autoplay.
    pub fn iframe_html(&self) -> String {
        format!(
            r#"<iframe src="{}" width="{size}" height="{size}" scrolling="no" frameborder="0" allowfullscreen></iframe>"#,
            escape_attr(&self.url),
            size = EMBED_SIZE
        )
    }
}

/// Pair each distinct cited URL with its summary from this query's matches.
/// URLs the index never returned get an empty summary.
pub fn resolve_references(urls: &[String], query: &QueryContext) -> Vec<VideoReference> {
    let mut seen = std::collections::HashSet::new();
    urls.iter()
        .filter(|url| !url.is_empty() && seen.insert(url.as_str()))
        .map(|url| VideoReference {
            url: url.clone(),
            summary: query.summary_for(url).unwrap_or_default().to_string(),
        })
        .collect()
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::{keys, Metadata, SearchMatch};

    #[test]
    fn test_extracts_in_order() {
        let urls = extract_video_urls("See [VIDEO: https://a.com] and [VIDEO: https://b.com]");
        assert_eq!(urls, vec!["https://a.com", "https://b.com"]);
    }

    #[test]
    fn test_no_markers() {
        assert!(extract_video_urls("no markers here").is_empty());
    }

    #[test]
    fn test_duplicates_kept_and_spacing_tolerated() {
        let urls = extract_video_urls("[VIDEO:https://a.com] then [VIDEO:   https://a.com ]");
        assert_eq!(urls, vec!["https://a.com", "https://a.com"]);
    }

    #[test]
    fn test_match_stops_at_first_closing_bracket() {
        let urls = extract_video_urls("[VIDEO: https://a.com/x] trailing] [VIDEO: b]");
        assert_eq!(urls, vec!["https://a.com/x", "b"]);
    }

    #[test]
    fn test_unterminated_marker_ignored() {
        assert!(extract_video_urls("[VIDEO: https://a.com").is_empty());
    }

    #[test]
    fn test_resolve_dedupes_and_attaches_summaries() {
        let matches = vec![SearchMatch::new(
            "a",
            0.9,
            Metadata::default()
                .with(keys::URL, "https://drive.google.com/file/d/1/view")
                .with(keys::SUMMARY, "Creating invoices"),
        )];
        let query = QueryContext::new("q", &matches, 0.5);

        let urls = vec![
            "https://drive.google.com/file/d/1/preview".to_string(),
            "https://elsewhere.com/v".to_string(),
            "https://drive.google.com/file/d/1/preview".to_string(),
        ];

        let refs = resolve_references(&urls, &query);
        assert_eq!(
            refs,
            vec![
                VideoReference {
                    url: "https://drive.google.com/file/d/1/preview".to_string(),
                    summary: "Creating invoices".to_string(),
                },
                VideoReference {
                    url: "https://elsewhere.com/v".to_string(),
                    summary: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_iframe_markup() {
        let reference = VideoReference {
            url: "https://drive.google.com/file/d/1/preview?a=1&b=2".to_string(),
            summary: String::new(),
        };
        let html = reference.iframe_html();
        assert!(html.contains(r#"src="https://drive.google.com/file/d/1/preview?a=1&amp;b=2""#));
        assert!(html.contains(r#"width="300""#));
        assert!(html.contains(r#"height="300""#));
        assert!(html.contains(r#"scrolling="no""#));
        assert!(!html.contains("autoplay"));
    }
}
