//! Configuration module for vidqa.
//!
//! Handles loading settings, environment secrets and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts};
pub use settings::{
    require_secret, ChatSettings, EmbeddingSettings, GeneralSettings, PineconeSettings,
    PromptSettings, RetrievalSettings, Settings, OPENAI_API_KEY_VAR, PINECONE_API_KEY_VAR,
};
