//! CLI module for vidqa.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// vidqa - ask questions about your training videos
///
/// Retrieves relevant transcript segments from a hosted vector index and
/// answers with citations to the videos they came from.
#[derive(Parser, Debug)]
#[command(name = "vidqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "VIDQA_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and get an answer with cited videos
    Ask {
        /// The question to ask
        question: String,

        /// Number of segments to retrieve (overrides retrieval.top_k)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Minimum score for a segment to be used (overrides retrieval.score_threshold)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Print iframe markup for each cited video
        #[arg(long)]
        html: bool,
    },

    /// Start an interactive chat session
    Chat,

    /// Search for relevant video segments without asking the model
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (overrides retrieval.top_k)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print iframe markup for each result
        #[arg(long)]
        html: bool,
    },

    /// Start HTTP API server for a web front-end
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check secrets and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Delete every vector in the configured index (operator only, irreversible)
    #[command(name = "purge-index")]
    PurgeIndex {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
