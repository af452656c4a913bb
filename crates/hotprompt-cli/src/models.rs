//! `hotprompt models` — list the model catalog.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use hotprompt_core::config::load_config;
use hotprompt_core::types::Provider;
use hotprompt_providers::ModelCatalog;

pub fn run(config_path: &Path, provider: Option<&str>) -> Result<()> {
    let config = load_config(Some(config_path));
    let catalog = ModelCatalog::from_config(&config);

    let providers: Vec<Provider> = match provider {
        Some(name) => vec![name.parse()?],
        None => Provider::ALL.to_vec(),
    };

    println!();
    for provider in providers {
        println!("{}", provider.display_name().cyan().bold());
        for line in model_lines(&catalog, provider) {
            println!("  {line}");
        }
        println!();
    }
    Ok(())
}

fn model_lines(catalog: &ModelCatalog, provider: Provider) -> Vec<String> {
    let default = catalog.default_model(provider);
    catalog
        .models_for(provider)
        .iter()
        .map(|model| {
            if model == default {
                format!("{model} {}", "(default)".dimmed())
            } else {
                model.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_model_marked_default() {
        colored::control::set_override(false);
        let catalog = ModelCatalog::builtin();
        let lines = model_lines(&catalog, Provider::OpenAi);
        assert_eq!(lines[0], "gpt-4o-mini (default)");
        assert_eq!(lines.len(), catalog.models_for(Provider::OpenAi).len());
        assert!(lines[1..].iter().all(|l| !l.contains("default")));
    }
}
