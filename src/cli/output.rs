//! CLI output formatting utilities.

use crate::rag::VideoReference;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one search result the way the results view lays it out.
    pub fn search_result(
        name: &str,
        created: &str,
        duration: &str,
        score: f32,
        content: &str,
        url: &str,
    ) {
        println!(
            "\n{} {} (score: {:.2})",
            style(">>").green(),
            style(name).bold(),
            score
        );
        println!(
            "   {} {} | {} {}",
            style("Created:").dim(),
            created,
            style("Duration:").dim(),
            duration
        );
        println!("   {}", content_preview(content, 300));
        if !url.is_empty() {
            println!("   {}", style(url).dim());
        }
    }

    /// Print a cited video.
    pub fn video_reference(reference: &VideoReference, html: bool) {
        println!("  {} {}", style("*").cyan(), style(&reference.url).underlined());
        if !reference.summary.is_empty() {
            println!("    {}", style(&reference.summary).dim());
        }
        if html {
            println!("    {}", reference.iframe_html());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Collapse newlines and truncate on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
