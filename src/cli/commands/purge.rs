//! Operator-only index purge.
//!
//! The only caller of [`VectorIndex::delete_all`]; nothing on the query path
//! reaches it.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_index::{PineconeIndex, VectorIndex};
use anyhow::Result;

/// Run the purge-index command.
pub async fn run_purge_index(yes: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Admin, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let index = PineconeIndex::from_env(&settings.pinecone)?;

    if !yes {
        Output::warning(&format!(
            "This deletes every vector in index '{}' and cannot be undone.",
            index.index_name()
        ));
        Output::info("Re-run with --yes to proceed.");
        return Ok(());
    }

    let spinner = Output::spinner("Deleting all vectors...");
    let result = index.delete_all().await;
    spinner.finish_and_clear();

    match result {
        Ok(()) => {
            Output::success(&format!(
                "All vectors deleted from '{}'.",
                index.index_name()
            ));
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Purge failed: {}", e));
            Err(e.into())
        }
    }
}
