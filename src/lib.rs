//! vidqa - conversational search over training videos
//!
//! Answers questions about a library of training videos whose transcript
//! segments live in a hosted vector index.
//!
//! # Overview
//!
//! For each question vidqa:
//! - embeds the question with a hosted embedding model
//! - fetches the closest transcript segments from the vector index
//! - builds a prompt from the segments that clear the score threshold
//! - asks a chat model for an answer that cites videos as `[VIDEO: <url>]`
//! - reads the cited videos back out of the answer for embedding
//!
//! # Architecture
//!
//! - `config` - Settings, secrets and prompt templates
//! - `embedding` - Embedding generation
//! - `vector_index` - Vector index abstraction and Pinecone client
//! - `chat` - Conversation state and chat completion
//! - `rag` - Formatting, prompt building, citation extraction and the pipeline
//! - `cli` - Command-line and HTTP front-ends
//!
//! # Example
//!
//! ```rust,no_run
//! use vidqa::config::Settings;
//! use vidqa::rag::Assistant;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let assistant = Assistant::from_settings(&settings)?;
//!     let mut conversation = assistant.new_conversation();
//!
//!     let answer = assistant
//!         .answer(&mut conversation, "How do I create an invoice?")
//!         .await?;
//!     println!("{}", answer.reply);
//!     for video in &answer.references {
//!         println!("{}", video.iframe_html());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod rag;
pub mod vector_index;

pub use error::{Result, VidqaError};
