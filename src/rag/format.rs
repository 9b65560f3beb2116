//! Display cleanup for matches coming back from the index.

use crate::vector_index::SearchMatch;
use url::Url;

/// Host whose share links need rewriting before they can be embedded.
pub const DRIVE_HOST: &str = "drive.google.com";

/// Rewrite a Google Drive share link from `view` to the embeddable `preview`
/// mode. Only the first occurrence is replaced. Any other URL, including ones
/// that do not parse, is returned as is.
///
/// The host must be exactly `drive.google.com`, so a scheme-less link such as
/// `drive.google.com/file/d/x/view` or a URL that merely mentions the host in
/// its path is left unchanged.
pub fn normalize_video_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.host_str() == Some(DRIVE_HOST) => url.replacen("view", "preview", 1),
        _ => url.to_string(),
    }
}

/// Turn a stored file name into a display title: hyphens become spaces and
/// everything from the first period on is dropped.
///
/// This truncates names that contain periods before the extension
/// (`"Q1.Review-final.mp4"` becomes `"Q1"`). Stored names rely on it, so keep
/// it as is.
pub fn normalize_video_name(name: &str) -> String {
    let name = name.replace('-', " ");
    match name.split_once('.') {
        Some((head, _)) => head.to_string(),
        None => name,
    }
}

/// Format one match as the four-line block used in prompts.
pub fn format_match_block(m: &SearchMatch) -> String {
    format!(
        "Video: {}\nScore: {:.2}\nContent: {}\nLink: {}",
        normalize_video_name(&m.video_name()),
        m.score,
        m.content(),
        normalize_video_url(&m.url())
    )
}
