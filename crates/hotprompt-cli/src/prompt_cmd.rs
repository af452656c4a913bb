//! `hotprompt prompt` — system prompt and templates.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use hotprompt_core::config::load_config;
use hotprompt_core::prompt_store::{ConfigPromptPersistence, PromptStore};
use hotprompt_pipeline::PromptTemplates;

#[derive(Subcommand)]
pub enum PromptCommands {
    /// Print the active system prompt
    Show,

    /// Replace the system prompt and save it
    Set {
        /// New system prompt
        text: String,
    },

    /// List predefined prompts
    Templates,
}

pub fn dispatch(config_path: &Path, action: PromptCommands) -> Result<()> {
    match action {
        PromptCommands::Show => {
            println!("{}", open_store(config_path).current());
        }
        PromptCommands::Set { text } => {
            if open_store(config_path).set(text.trim())? {
                println!("{} system prompt saved", "✓".green());
            } else {
                println!("{} system prompt unchanged", "·".dimmed());
            }
        }
        PromptCommands::Templates => {
            let config = load_config(Some(config_path));
            let templates = PromptTemplates::from_config(&config.prompt);
            for (i, template) in templates.entries().iter().enumerate() {
                println!("  {:>2}  {}", i.to_string().dimmed(), template);
            }
        }
    }
    Ok(())
}

fn open_store(config_path: &Path) -> PromptStore {
    PromptStore::open(Arc::new(ConfigPromptPersistence::new(config_path)))
}
