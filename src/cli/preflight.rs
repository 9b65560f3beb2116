//! Pre-flight checks before networked commands.
//!
//! Validates that secrets and index configuration are present so commands
//! fail at startup instead of halfway through an interaction.

use crate::config::{require_secret, Settings, OPENAI_API_KEY_VAR, PINECONE_API_KEY_VAR};
use crate::error::Result;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking or searching needs both services and the index.
    Query,
    /// Index administration needs only the vector database.
    Admin,
    /// Showing configuration needs nothing.
    Local,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Query => {
            require_secret(OPENAI_API_KEY_VAR)?;
            require_secret(PINECONE_API_KEY_VAR)?;
            settings.validate()?;
        }
        Operation::Admin => {
            require_secret(PINECONE_API_KEY_VAR)?;
            settings.validate()?;
        }
        Operation::Local => {}
    }
    Ok(())
}
