//! Configuration settings for vidqa.

use crate::error::{Result, VidqaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the Pinecone API key.
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";

/// Read a required secret from the environment.
pub fn require_secret(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(VidqaError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        Err(_) => Err(VidqaError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub pinecone: PineconeSettings,
    pub retrieval: RetrievalSettings,
    pub chat: ChatSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions. Must match the index.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Hosted vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    /// Index name.
    pub index_name: String,
    /// Region/environment the index lives in.
    pub environment: String,
    /// Data-plane host. Resolved from the control plane when unset.
    pub index_host: Option<String>,
    /// Namespace to query. The default namespace when unset.
    pub namespace: Option<String>,
    /// Control-plane base URL.
    pub control_plane_url: String,
    /// API version header value.
    pub api_version: String,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            index_name: String::new(),
            environment: "us-east-1-aws".to_string(),
            index_host: None,
            namespace: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
        }
    }
}

/// Retrieval policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of matches requested from the index.
    pub top_k: usize,
    /// Minimum score for a match to enter the prompt context.
    pub score_threshold: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: 0.5,
        }
    }
}

/// Chat completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Chat model used for answers.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply `PINECONE_*` overrides from the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = non_empty("PINECONE_INDEX_NAME") {
            self.pinecone.index_name = name;
        }
        if let Some(env) = non_empty("PINECONE_ENVIRONMENT") {
            self.pinecone.environment = env;
        }
        if let Some(host) = non_empty("PINECONE_INDEX_HOST") {
            self.pinecone.index_host = Some(host);
        }
    }

    /// Check values that every networked command needs.
    pub fn validate(&self) -> Result<()> {
        if self.pinecone.index_name.trim().is_empty() {
            return Err(VidqaError::Config(
                "pinecone.index_name is not set. Add it to the config file or export PINECONE_INDEX_NAME".to_string(),
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(VidqaError::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.retrieval.score_threshold) {
            return Err(VidqaError::Config(format!(
                "retrieval.score_threshold must be within 0.0..=1.0, got {}",
                self.retrieval.score_threshold
            )));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VidqaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The config file in effect: the given path (tilde-expanded) or the default.
    pub fn config_path(explicit: Option<&str>) -> PathBuf {
        explicit
            .map(Self::expand_path)
            .unwrap_or_else(Self::default_config_path)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidqa")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.retrieval.top_k, 5);
        assert!((settings.retrieval.score_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.embedding.model, "text-embedding-3-small");
        assert!(settings.pinecone.index_name.is_empty());
    }

    #[test]
    fn test_missing_index_name_fails_validation() {
        let settings = Settings::default();
        assert!(matches!(settings.validate(), Err(VidqaError::Config(_))));
    }

    #[test]
    fn test_threshold_out_of_range_fails_validation() {
        let mut settings = Settings::default();
        settings.pinecone.index_name = "training".to_string();
        settings.retrieval.score_threshold = 1.5;
        assert!(settings.validate().is_err());

        settings.retrieval.score_threshold = 0.5;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[pinecone]\nindex_name = \"training\"\n\n[retrieval]\ntop_k = 8\n",
        )
        .unwrap();

        let mut settings: Settings =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        settings.apply_env_overrides(|_| None);

        assert_eq!(settings.pinecone.index_name, "training");
        assert_eq!(settings.pinecone.environment, "us-east-1-aws");
        assert_eq!(settings.retrieval.top_k, 8);
        assert!((settings.retrieval.score_threshold - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PINECONE_INDEX_NAME", "from-env"),
            ("PINECONE_INDEX_HOST", "idx-abc.svc.pinecone.io"),
            ("PINECONE_ENVIRONMENT", "  "),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.pinecone.index_name, "from-env");
        assert_eq!(
            settings.pinecone.index_host.as_deref(),
            Some("idx-abc.svc.pinecone.io")
        );
        // Blank values do not override
        assert_eq!(settings.pinecone.environment, "us-east-1-aws");
    }

    #[test]
    fn test_config_path_prefers_explicit() {
        assert_eq!(
            Settings::config_path(Some("./team.toml")),
            PathBuf::from("./team.toml")
        );
        assert_eq!(Settings::config_path(None), Settings::default_config_path());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.pinecone.index_name = "training".to_string();
        settings.chat.temperature = 0.2;
        settings.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded: Settings = toml::from_str(&content).unwrap();
        assert_eq!(reloaded.pinecone.index_name, "training");
        assert!((reloaded.chat.temperature - 0.2).abs() < f32::EPSILON);
    }
}
