//! Doctor command - verify secrets and configuration.

use crate::cli::Output;
use crate::config::{Settings, OPENAI_API_KEY_VAR, PINECONE_API_KEY_VAR};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("vidqa Doctor");
    println!();
    println!("Checking secrets and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    for check in [
        check_secret(OPENAI_API_KEY_VAR, std::env::var(OPENAI_API_KEY_VAR).ok(), Some("sk-")),
        check_secret(PINECONE_API_KEY_VAR, std::env::var(PINECONE_API_KEY_VAR).ok(), None),
    ] {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Index").bold());
    for check in check_index(settings) {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using vidqa.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! vidqa is ready to use.");
    }

    Ok(())
}

/// Check a secret's presence, showing only a masked form.
fn check_secret(name: &str, value: Option<String>, expected_prefix: Option<&str>) -> CheckResult {
    let hint = format!("Set with: export {}='...'", name);
    match value {
        None => CheckResult::error(name, "not set", &hint),
        Some(v) if v.trim().is_empty() => CheckResult::error(name, "empty", &hint),
        Some(v) if expected_prefix.is_some_and(|p| !v.starts_with(p)) => CheckResult::warning(
            name,
            "set but format looks unusual",
            &format!("Expected a key starting with {}", expected_prefix.unwrap_or_default()),
        ),
        Some(v) => CheckResult::ok(name, &format!("configured ({})", mask(&v))),
    }
}

fn check_index(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let pinecone = &settings.pinecone;

    if pinecone.index_name.trim().is_empty() {
        results.push(CheckResult::error(
            "Index name",
            "not set",
            "Set pinecone.index_name in the config file or export PINECONE_INDEX_NAME",
        ));
    } else {
        results.push(CheckResult::ok(
            "Index name",
            &format!("{} ({})", pinecone.index_name, pinecone.environment),
        ));
    }

    match &pinecone.index_host {
        Some(host) => results.push(CheckResult::ok("Index host", host)),
        None => results.push(CheckResult::ok(
            "Index host",
            "resolved from the control plane on first query",
        )),
    }

    let retrieval = &settings.retrieval;
    if retrieval.top_k == 0 || !(0.0..=1.0).contains(&retrieval.score_threshold) {
        results.push(CheckResult::error(
            "Retrieval",
            &format!("top_k={}, score_threshold={}", retrieval.top_k, retrieval.score_threshold),
            "top_k must be at least 1 and score_threshold within 0.0..=1.0",
        ));
    } else {
        results.push(CheckResult::ok(
            "Retrieval",
            &format!("top_k={}, score_threshold={}", retrieval.top_k, retrieval.score_threshold),
        ));
    }

    results
}

/// Check that the config file in effect exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            &format!("{} not found, using defaults", config_path.display()),
            &format!("Create with: vidqa --config {} config edit", config_path.display()),
        )
    }
}

/// Keep the first and last few characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_ok() {
        let result = CheckResult::ok("test", "passed");
        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.hint.is_none());
    }

    #[test]
    fn test_check_secret() {
        assert_eq!(check_secret("K", None, None).status, CheckStatus::Error);
        assert_eq!(check_secret("K", Some("  ".into()), None).status, CheckStatus::Error);
        assert_eq!(
            check_secret("K", Some("abc-1234567890xyz".into()), Some("sk-")).status,
            CheckStatus::Warning
        );

        let ok = check_secret("K", Some("sk-proj-1234567890abcd".into()), Some("sk-"));
        assert_eq!(ok.status, CheckStatus::Ok);
        assert!(!ok.message.contains("1234567890"));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("pcsk_abcdefghijklmnop"), "pcsk_...mnop");
    }

    #[test]
    fn test_config_file_check_uses_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.toml");

        let missing = check_config_file(&path);
        assert_eq!(missing.status, CheckStatus::Warning);
        assert!(missing.message.contains("team.toml"));

        std::fs::write(&path, "").unwrap();
        let found = check_config_file(&path);
        assert_eq!(found.status, CheckStatus::Ok);
        assert_eq!(found.message, path.display().to_string());
    }

    #[test]
    fn test_missing_index_is_an_error() {
        let results = check_index(&Settings::default());
        assert_eq!(results[0].status, CheckStatus::Error);
    }
}
