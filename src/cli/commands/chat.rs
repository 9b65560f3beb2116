//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::Assistant;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// What the user typed at the prompt.
#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    Clear,
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let input = line.trim();
    if input.is_empty() {
        ChatInput::Empty
    } else if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        ChatInput::Exit
    } else if input.eq_ignore_ascii_case("clear") {
        ChatInput::Clear
    } else {
        ChatInput::Question(input)
    }
}

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'vidqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let assistant = Assistant::from_settings(&settings)?;
    let mut conversation = assistant.new_conversation();

    println!("\n{}", style("Video Training Assistant").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ChatInput::Empty => {
                Output::warning("Please enter a question.");
            }
            ChatInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Clear => {
                conversation.reset();
                Output::info("Conversation history cleared.");
            }
            ChatInput::Question(question) => {
                let spinner = Output::spinner("Processing your query...");
                let result = assistant.answer(&mut conversation, question).await;
                spinner.finish_and_clear();

                match result {
                    Ok(answer) => {
                        println!("\n{} {}\n", style("Assistant:").cyan().bold(), answer.reply);
                        for reference in &answer.references {
                            Output::video_reference(reference, false);
                        }
                        debug!("Conversation has {} turns", conversation.len());
                    }
                    // The session survives a failed interaction
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}
