//! In-memory vector index.
//!
//! Stands in for the hosted index in tests and offline runs.

use super::{cosine_similarity, Metadata, SearchMatch, VectorIndex};
use crate::error::{Result, VidqaError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

struct Entry {
    values: Vec<f32>,
    metadata: Metadata,
}

/// In-memory vector index.
pub struct MemoryIndex {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a vector.
    pub fn upsert(&self, id: &str, values: Vec<f32>, metadata: Metadata) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| VidqaError::Search("index lock poisoned".to_string()))?;
        entries.insert(id.to_string(), Entry { values, metadata });
        Ok(())
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<SearchMatch>> {
        if top_k == 0 {
            return Err(VidqaError::InvalidInput("top_k must be at least 1".to_string()));
        }

        let entries = self
            .entries
            .read()
            .map_err(|_| VidqaError::Search("index lock poisoned".to_string()))?;

        let mut matches: Vec<SearchMatch> = entries
            .iter()
            .map(|(id, entry)| SearchMatch {
                id: id.clone(),
                score: cosine_similarity(vector, &entry.values),
                metadata: if include_metadata {
                    entry.metadata.clone()
                } else {
                    Metadata::default()
                },
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);

        Ok(matches)
    }

    async fn delete_all(&self) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| VidqaError::Search("index lock poisoned".to_string()))?;
        entries.clear();
        Ok(())
    }
}
