//! `hotprompt onboard` — write the default configuration.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use hotprompt_core::config::{save_config, Config};

/// Run the onboard command.
pub fn run(config_path: &Path) -> Result<()> {
    println!();
    println!("{}", "Hotprompt — Setup".cyan().bold());
    println!();

    if write_default_config(config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "  Add an API key under {} or set {} / {}.",
        "providers.groq.apiKey".bold(),
        "GROQ_API_KEY".bold(),
        "OPENAI_API_KEY".bold()
    );
    println!(
        "{}",
        "  Setup complete! Try `echo hello | hotprompt ask --no-paste`.".green()
    );
    println!();

    Ok(())
}

/// Write the default config unless a file already exists. Returns whether
/// a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    // Plain defaults; keys taken from the environment stay out of the file.
    save_config(&Config::default(), Some(path))?;
    Ok(true)
}
