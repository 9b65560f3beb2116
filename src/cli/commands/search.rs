//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::{normalize_video_name, normalize_video_url, Assistant, VideoReference};
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: Option<usize>,
    html: bool,
    mut settings: Settings,
) -> Result<()> {
    if query.trim().is_empty() {
        Output::warning("Please enter a question before searching.");
        return Ok(());
    }

    if let Some(limit) = limit {
        settings.retrieval.top_k = limit;
    }

    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let assistant = Assistant::from_settings(&settings)?;

    let spinner = Output::spinner("Processing your query...");
    let results = assistant.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(matches) if matches.is_empty() => {
            Output::warning("No results found for your query.");
        }
        Ok(matches) => {
            Output::header("Results");
            for m in &matches {
                let url = normalize_video_url(&m.url());
                Output::search_result(
                    &normalize_video_name(&m.video_name()),
                    &m.video_created(),
                    &m.video_duration(),
                    m.score,
                    &m.content(),
                    &url,
                );
                if html && !url.is_empty() {
                    let reference = VideoReference {
                        url,
                        summary: m.summary(),
                    };
                    println!("   {}", reference.iframe_html());
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
