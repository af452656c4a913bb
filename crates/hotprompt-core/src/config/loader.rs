//! Config loader — reads `~/.hotprompt/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.hotprompt/config.json`
//! 3. Environment variables `HOTPROMPT_<SECTION>__<FIELD>` (override JSON)
//! 4. `OPENAI_API_KEY` / `GROQ_API_KEY` for hosted keys still unset

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};
use crate::types::Provider;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    match read_config_file(path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            info!("No config file found at {}, using defaults", path.display());
            Config::default()
        }
        Err(e) => {
            warn!("Ignoring config file {}: {:#}", path.display(), e);
            Config::default()
        }
    }
}

/// Strictly read the config file. `Ok(None)` if it does not exist.
///
/// Env overrides are NOT applied, so the result is safe to write back.
pub fn read_config_file(path: &Path) -> anyhow::Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    debug!("Loading config from {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    // Parse JSON → Value first for migration
    let mut raw: serde_json::Value =
        serde_json::from_str(&content).context("config is not valid JSON")?;

    migrate_config(&mut raw);

    let config: Config =
        serde_json::from_value(raw).context("config does not match the expected schema")?;
    Ok(Some(config))
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json)
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Early versions kept flat `systemPrompt` and `localLlmUrl` keys at the root.
/// They move to `prompt.system` and `providers.local.url` unless those are set.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(root) = raw.as_object_mut() else {
        return;
    };

    if let Some(prompt) = root.remove("systemPrompt") {
        let section = root
            .entry("prompt")
            .or_insert_with(|| serde_json::json!({}));
        if let Some(section) = section.as_object_mut() {
            if !section.contains_key("system") {
                section.insert("system".into(), prompt);
                debug!("Migrated systemPrompt → prompt.system");
            }
        }
    }

    if let Some(url) = root.remove("localLlmUrl") {
        let providers = root
            .entry("providers")
            .or_insert_with(|| serde_json::json!({}));
        if let Some(providers) = providers.as_object_mut() {
            let local = providers
                .entry("local")
                .or_insert_with(|| serde_json::json!({}));
            if let Some(local) = local.as_object_mut() {
                if !local.contains_key("url") {
                    local.insert("url".into(), url);
                    debug!("Migrated localLlmUrl → providers.local.url");
                }
            }
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `HOTPROMPT_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `HOTPROMPT_PROVIDERS__OPENAI__API_KEY` / `__API_BASE`
/// - `HOTPROMPT_PROVIDERS__GROQ__API_KEY` / `__API_BASE`
/// - `HOTPROMPT_PROVIDERS__LOCAL__URL` / `__API_KEY`
/// - `HOTPROMPT_DISPATCH__DEFAULT_PROVIDER`
/// - `HOTPROMPT_DISPATCH__TIMEOUT_SECS`
/// - `HOTPROMPT_DELIVERY__PASTE`
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    apply_provider_env(&mut config.providers.openai, Provider::OpenAi, &var);
    apply_provider_env(&mut config.providers.groq, Provider::Groq, &var);

    if let Some(val) = var("HOTPROMPT_PROVIDERS__LOCAL__URL") {
        config.providers.local.url = val;
    }
    if let Some(val) = var("HOTPROMPT_PROVIDERS__LOCAL__API_KEY") {
        config.providers.local.api_key = Some(val);
    }

    if let Some(val) = var("HOTPROMPT_DISPATCH__DEFAULT_PROVIDER") {
        match val.parse::<Provider>() {
            Ok(p) => config.dispatch.default_provider = p,
            Err(e) => warn!("Ignoring HOTPROMPT_DISPATCH__DEFAULT_PROVIDER: {}", e),
        }
    }
    if let Some(val) = var("HOTPROMPT_DISPATCH__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.dispatch.timeout_secs = n;
        }
    }

    if let Some(val) = var("HOTPROMPT_DELIVERY__PASTE") {
        config.delivery.paste = val == "true" || val == "1";
    }

    config
}

/// Apply env var overrides for a single hosted provider.
fn apply_provider_env(
    config: &mut ProviderConfig,
    provider: Provider,
    var: &impl Fn(&str) -> Option<String>,
) {
    let name = provider.name().to_uppercase();
    if let Some(val) = var(&format!("HOTPROMPT_PROVIDERS__{name}__API_KEY")) {
        config.api_key = val;
    }
    if let Some(val) = var(&format!("HOTPROMPT_PROVIDERS__{name}__API_BASE")) {
        config.api_base = Some(val);
    }
    if !config.is_configured() {
        if let Some(val) = provider.api_key_env().and_then(|key| var(key)) {
            config.api_key = val;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::DEFAULT_SYSTEM_PROMPT;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.dispatch.timeout_secs, 30);
        assert_eq!(config.prompt.system, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "prompt": { "system": "Answer in French." },
            "dispatch": { "timeoutSecs": 12 }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.prompt.system, "Answer in French.");
        assert_eq!(config.dispatch.timeout_secs, 12);
        // Default preserved
        assert_eq!(config.prompt.templates.len(), 5);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.prompt.system, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_read_config_file_is_strict() {
        let file = write_temp_json("not valid json {{{");
        assert!(read_config_file(file.path()).is_err());
        assert!(read_config_file(Path::new("/nonexistent/config.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.prompt.system = "Be terse.".to_string();
        config.providers.groq.api_key = "gsk-test".to_string();

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert_eq!(reloaded.prompt.system, "Be terse.");
        assert_eq!(reloaded.providers.groq.api_key, "gsk-test");
    }

    #[test]
    fn test_migrate_flat_legacy_keys() {
        let file = write_temp_json(
            r#"{
            "systemPrompt": "Legacy prompt",
            "localLlmUrl": "http://10.0.0.5:8000/v1/chat/completions"
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.prompt.system, "Legacy prompt");
        assert_eq!(
            config.providers.local.url,
            "http://10.0.0.5:8000/v1/chat/completions"
        );
    }

    #[test]
    fn test_migrate_no_overwrite() {
        let file = write_temp_json(
            r#"{
            "systemPrompt": "Legacy prompt",
            "prompt": { "system": "Current prompt" }
        }"#,
        );

        let config = load_config_from_path(file.path());
        assert_eq!(config.prompt.system, "Current prompt");
    }

    #[test]
    fn test_env_override_provider_key() {
        let config = apply_overrides(
            Config::default(),
            env(&[("HOTPROMPT_PROVIDERS__OPENAI__API_KEY", "sk-env-key")]),
        );
        assert_eq!(config.providers.openai.api_key, "sk-env-key");
        assert!(!config.providers.groq.is_configured());
    }

    #[test]
    fn test_conventional_key_fallback() {
        let config = apply_overrides(Config::default(), env(&[("GROQ_API_KEY", "gsk-plain")]));
        assert_eq!(config.providers.groq.api_key, "gsk-plain");
    }

    #[test]
    fn test_conventional_key_does_not_override_file() {
        let mut base = Config::default();
        base.providers.openai.api_key = "sk-from-file".into();
        let config = apply_overrides(base, env(&[("OPENAI_API_KEY", "sk-plain")]));
        assert_eq!(config.providers.openai.api_key, "sk-from-file");
    }

    #[test]
    fn test_env_override_dispatch_and_delivery() {
        let config = apply_overrides(
            Config::default(),
            env(&[
                ("HOTPROMPT_DISPATCH__DEFAULT_PROVIDER", "local"),
                ("HOTPROMPT_DISPATCH__TIMEOUT_SECS", "5"),
                ("HOTPROMPT_DELIVERY__PASTE", "0"),
                ("HOTPROMPT_PROVIDERS__LOCAL__URL", "http://127.0.0.1:1234/v1/chat/completions"),
            ]),
        );
        assert_eq!(config.dispatch.default_provider, Provider::Local);
        assert_eq!(config.dispatch.timeout_secs, 5);
        assert!(!config.delivery.paste);
        assert_eq!(
            config.providers.local.url,
            "http://127.0.0.1:1234/v1/chat/completions"
        );
    }

    #[test]
    fn test_env_override_bad_provider_ignored() {
        let config = apply_overrides(
            Config::default(),
            env(&[("HOTPROMPT_DISPATCH__DEFAULT_PROVIDER", "mystery")]),
        );
        assert_eq!(config.dispatch.default_provider, Provider::Groq);
    }
}
