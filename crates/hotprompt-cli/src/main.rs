//! Hotprompt CLI — entry point.
//!
//! # Commands
//!
//! - `hotprompt ask [-m TEXT] [--provider P] [--model M] [--template T]` — run one completion
//!   and paste it back
//! - `hotprompt models [--provider P]` — list the model catalog
//! - `hotprompt prompt show|set|templates` — view or edit the system prompt
//! - `hotprompt status` — show configuration and provider status
//! - `hotprompt onboard` — write the default config

mod ask;
mod helpers;
mod models;
mod onboard;
mod prompt_cmd;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use hotprompt_core::config::get_config_path;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Hotprompt — send selected text to an LLM and paste the answer back
#[derive(Parser)]
#[command(name = "hotprompt", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.hotprompt/config.json
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one completion and deliver it to the clipboard
    Ask {
        /// Text to send. Omit to read from the clipboard or stdin.
        #[arg(short, long)]
        message: Option<String>,

        /// Provider: groq, openai or local
        #[arg(short, long)]
        provider: Option<String>,

        /// Model name (defaults to the provider's first model)
        #[arg(long)]
        model: Option<String>,

        /// Predefined prompt, by name or number from `prompt templates`
        #[arg(short, long)]
        template: Option<String>,

        /// Take the input text from the clipboard
        #[arg(long, default_value_t = false)]
        clipboard: bool,

        /// Copy the result without sending a paste keystroke
        #[arg(long, default_value_t = false)]
        no_paste: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List available models
    Models {
        /// Only show this provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// View or edit the system prompt
    Prompt {
        #[command(subcommand)]
        action: prompt_cmd::PromptCommands,
    },

    /// Show configuration and provider status
    Status,

    /// Write the default configuration file
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Ask {
            message,
            provider,
            model,
            template,
            clipboard,
            no_paste,
            logs,
        } => {
            init_logging(logs);
            let args = ask::AskArgs {
                message,
                provider,
                model,
                template,
                clipboard,
                no_paste,
            };
            ask::run(&config_path, args).await
        }
        Commands::Models { provider } => {
            models::run(&config_path, provider.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Prompt { action } => {
            init_logging(false);
            prompt_cmd::dispatch(&config_path, action)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status => {
            status::run(&config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Onboard => {
            onboard::run(&config_path)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_config_path(flag: Option<&str>) -> PathBuf {
    match flag {
        Some(path) => helpers::expand_tilde(path),
        None => get_config_path(),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("hotprompt=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
