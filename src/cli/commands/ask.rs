//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::Assistant;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    top_k: Option<usize>,
    threshold: Option<f32>,
    html: bool,
    mut settings: Settings,
) -> Result<()> {
    if question.trim().is_empty() {
        Output::warning("Please enter a question before searching.");
        return Ok(());
    }

    if let Some(k) = top_k {
        settings.retrieval.top_k = k;
    }
    if let Some(t) = threshold {
        settings.retrieval.score_threshold = t;
    }

    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let assistant = Assistant::from_settings(&settings)?;
    let mut conversation = assistant.new_conversation();

    let spinner = Output::spinner("Processing your query...");
    let result = assistant.answer(&mut conversation, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("\n{}\n", answer.reply);

            if !answer.references.is_empty() {
                Output::header("Videos");
                for reference in &answer.references {
                    Output::video_reference(reference, html);
                }
            } else if !answer.query.has_matches() {
                Output::info("No relevant video segments were found.");
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
