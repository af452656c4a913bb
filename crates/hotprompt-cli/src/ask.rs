//! `hotprompt ask` — run one invocation.
//!
//! Takes the selected text (flag, clipboard, or stdin), optionally prefixes
//! a predefined prompt, dispatches it, and delivers the answer through the
//! clipboard sink.

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use hotprompt_core::config::{load_config, Config};
use hotprompt_core::prompt_store::{ConfigPromptPersistence, PromptStore};
use hotprompt_core::types::Provider;
use hotprompt_delivery::{Clipboard, ClipboardSink, SystemClipboard};
use hotprompt_pipeline::{compose, Assistant, PromptTemplates};

use crate::helpers;

pub struct AskArgs {
    pub message: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub template: Option<String>,
    pub clipboard: bool,
    pub no_paste: bool,
}

/// Run the ask command. A failed invocation is printed and mapped to a
/// non-zero exit code; `Err` is reserved for setup problems.
pub async fn run(config_path: &Path, args: AskArgs) -> Result<ExitCode> {
    let mut config = load_config(Some(config_path));
    if args.no_paste {
        config.delivery.paste = false;
    }

    let provider = resolve_provider(args.provider.as_deref(), &config)?;
    let clipboard = Arc::new(SystemClipboard::new());

    let text = match (args.message, args.clipboard) {
        (Some(message), _) => message,
        (None, true) => clipboard.get_text()?,
        (None, false) => read_stdin()?,
    };
    let text = apply_template(&config, args.template.as_deref(), &text)?;

    // Seeded from the loaded config so env overrides apply to this run.
    let prompts = Arc::new(PromptStore::new(
        config.prompt.system.clone(),
        Arc::new(ConfigPromptPersistence::new(config_path)),
    ));
    let sink = Arc::new(ClipboardSink::from_config(&config.delivery, clipboard));
    let assistant = Assistant::from_config(&config, prompts, sink.clone())?;

    let model = match args.model {
        Some(model) => model,
        None => assistant.catalog().default_model(provider).to_string(),
    };
    debug!(provider = provider.name(), model = %model, "Resolved selection");

    helpers::print_thinking();
    let result = assistant.invoke(&text, provider, &model).await;
    helpers::clear_thinking();

    match result {
        Ok(invocation) => {
            helpers::print_completion(&invocation.completion, invocation.delivery.pasted);
            let hold = sink.hold_duration(invocation.delivery);
            if hold >= Duration::from_secs(1) {
                helpers::print_holding(hold);
            }
            sink.hold(invocation.delivery).await;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            helpers::print_error(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// The `--provider` flag, or the configured default.
fn resolve_provider(flag: Option<&str>, config: &Config) -> Result<Provider> {
    match flag {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.dispatch.default_provider),
    }
}

/// Prefix `text` with the template chosen by `selector`.
fn apply_template(config: &Config, selector: Option<&str>, text: &str) -> Result<String> {
    let Some(selector) = selector else {
        return Ok(text.to_string());
    };
    let templates = PromptTemplates::from_config(&config.prompt);
    let template = templates.resolve(selector).with_context(|| {
        format!("unknown template '{selector}' (see `hotprompt prompt templates`)")
    })?;
    Ok(compose(template, text))
}

fn read_stdin() -> Result<String> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Enter text, then Ctrl-D:");
    }
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
    Ok(text)
}
