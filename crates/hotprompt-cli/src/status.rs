//! `hotprompt status` — show configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use hotprompt_core::config::{load_config, Config};
use hotprompt_core::types::Provider;
use hotprompt_delivery::PasteCommand;
use hotprompt_providers::registry::PROVIDERS;

/// Run the status command.
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(Some(config_path));

    println!();
    println!("{}", "Hotprompt Status".cyan().bold());
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    println!(
        "  {:<18} {}",
        "Default provider:".bold(),
        config.dispatch.default_provider.display_name()
    );
    println!(
        "  {:<18} {}s",
        "Timeout:".bold(),
        config.dispatch.timeout_secs
    );
    println!("  {:<18} {}", "Delivery:".bold(), paste_mode(&config));

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let status = provider_status(&config, spec.provider);
        println!("    {:<20} {}", spec.provider.display_name(), status);
    }

    println!();
    Ok(())
}

fn provider_status(config: &Config, provider: Provider) -> String {
    match provider {
        Provider::Local => format!("{} {}", "·".dimmed(), config.providers.local.url),
        hosted if config.providers.is_ready(hosted) => format!("{} (key set)", "✓".green()),
        _ => format!("{}", "· not configured".dimmed()),
    }
}

fn paste_mode(config: &Config) -> String {
    let Some(command) = PasteCommand::from_config(&config.delivery) else {
        return "copy only".to_string();
    };
    format!("copy + paste via `{}`", command.argv().join(" "))
}
