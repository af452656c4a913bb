//! Shared CLI helpers — path expansion, result and error printing.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;

use hotprompt_core::error::DispatchError;
use hotprompt_core::types::Completion;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a completion to stdout and a delivery note to stderr.
///
/// Only the completion text goes to stdout so the output can be piped.
pub fn print_completion(completion: &Completion, pasted: bool) {
    if completion.text.is_empty() {
        eprintln!("{}", "(empty response)".dimmed());
    } else {
        println!("{}", completion.text);
    }
    eprintln!(
        "{} {}",
        "✓".green(),
        delivery_note(completion.provider.display_name(), &completion.model, pasted).dimmed()
    );
}

/// Print a failed invocation as `(kind, detail)` on stderr.
pub fn print_error(err: &DispatchError) {
    eprintln!(
        "{} {}",
        "✗".red().bold(),
        error_line(&err.kind().to_string(), &err.detail()).red()
    );
}

pub fn error_line(kind: &str, detail: &str) -> String {
    format!("({kind}, {detail})")
}

pub fn delivery_note(provider: &str, model: &str, pasted: bool) -> String {
    let action = if pasted { "pasted" } else { "copied to clipboard" };
    format!("{provider} · {model} · {action}")
}

/// Tell the user the process stays alive to serve the clipboard.
pub fn print_holding(hold: Duration) {
    eprintln!(
        "{}",
        format!(
            "Keeping the result on the clipboard for up to {}s (Ctrl-C to stop)",
            hold.as_secs()
        )
        .dimmed()
    );
}

/// Print the placeholder shown while a request is in flight.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
