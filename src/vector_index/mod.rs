//! Vector index abstraction for vidqa.
//!
//! The index itself is hosted; this module defines the match model and the
//! trait the query pipeline talks to.

mod memory;
mod pinecone;

pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata keys attached to each indexed video segment.
pub mod keys {
    pub const TEXT_CONTENT: &str = "textContent";
    pub const URL: &str = "url";
    pub const VIDEO_NAME: &str = "videoName";
    pub const VIDEO_CREATED: &str = "videoCreated";
    pub const VIDEO_DURATION: &str = "videoDuration";
    pub const SUMMARY: &str = "summary";
}

/// Metadata attached to a match: string keys to string or number values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(pub HashMap<String, Value>);

impl Metadata {
    /// Get a value rendered as text. Strings come back verbatim, numbers and
    /// booleans are formatted; anything else counts as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Insert a value, returning the metadata for chaining.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }
}

/// A single match returned by the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Vector ID.
    pub id: String,
    /// Similarity score (higher is better).
    pub score: f32,
    /// Attached metadata. Empty when metadata was not requested.
    #[serde(default)]
    pub metadata: Metadata,
}

impl SearchMatch {
    /// Create a match with the given metadata.
    pub fn new(id: impl Into<String>, score: f32, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            score,
            metadata,
        }
    }

    /// Transcript excerpt for this segment.
    pub fn content(&self) -> String {
        self.metadata
            .text(keys::TEXT_CONTENT)
            .unwrap_or_else(|| "No content text provided.".to_string())
    }

    /// Source URL as stored, before normalization.
    pub fn url(&self) -> String {
        self.metadata.text(keys::URL).unwrap_or_default()
    }

    /// Video name as stored, before normalization.
    pub fn video_name(&self) -> String {
        self.metadata
            .text(keys::VIDEO_NAME)
            .unwrap_or_else(|| "Unnamed Video".to_string())
    }

    pub fn video_created(&self) -> String {
        self.metadata
            .text(keys::VIDEO_CREATED)
            .unwrap_or_else(|| "Unknown date".to_string())
    }

    pub fn video_duration(&self) -> String {
        self.metadata
            .text(keys::VIDEO_DURATION)
            .unwrap_or_else(|| "Unknown duration".to_string())
    }

    pub fn summary(&self) -> String {
        self.metadata.text(keys::SUMMARY).unwrap_or_default()
    }
}

/// Trait for vector index backends.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query the index. Results come back highest score first; no matches is
    /// an empty vector, not an error.
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<SearchMatch>>;

    /// Delete every vector in the index. Irreversible.
    async fn delete_all(&self) -> Result<()>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_match_defaults_for_missing_metadata() {
        let m = SearchMatch::new("seg-1", 0.9, Metadata::default());
        assert_eq!(m.content(), "No content text provided.");
        assert_eq!(m.url(), "");
        assert_eq!(m.video_name(), "Unnamed Video");
        assert_eq!(m.video_created(), "Unknown date");
        assert_eq!(m.video_duration(), "Unknown duration");
        assert_eq!(m.summary(), "");
    }

    #[test]
    fn test_numeric_metadata_renders_as_text() {
        let json = r#"{
            "id": "seg-2",
            "score": 0.71,
            "metadata": {
                "videoName": "Payroll-Basics.mp4",
                "videoDuration": 312,
                "videoCreated": "2024-03-01",
                "tags": ["hr"]
            }
        }"#;

        let m: SearchMatch = serde_json::from_str(json).unwrap();
        assert_eq!(m.video_duration(), "312");
        assert_eq!(m.video_created(), "2024-03-01");
        assert_eq!(m.metadata.text("tags"), None);
        assert!(m.metadata.0.contains_key("tags"));
    }

    #[test]
    fn test_match_without_metadata_deserializes() {
        let m: SearchMatch = serde_json::from_str(r#"{"id": "x", "score": 0.1}"#).unwrap();
        assert!(m.metadata.0.is_empty());
    }
}
