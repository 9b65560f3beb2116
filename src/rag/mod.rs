//! Retrieval-augmented answering over the video index.
//!
//! `format` cleans up raw matches, `context` turns them into prompt text,
//! `references` reads citations back out of replies and `assistant` runs the
//! whole interaction.

mod assistant;
pub mod context;
pub mod format;
pub mod references;

pub use assistant::{Answer, Assistant};
pub use context::{build_context, build_prompt, QueryContext, NO_MATCHES_SENTINEL};
pub use format::{normalize_video_name, normalize_video_url};
pub use references::{extract_video_urls, VideoReference};
