//! Predefined prompt templates.

use hotprompt_core::config::schema::PromptConfig;

/// The entry that leaves the user's text untouched.
pub const CUSTOM_PROMPT: &str = "Custom prompt";

/// Prefix `text` with `template`.
///
/// `"Summarize the following text"` + `"abc"` becomes
/// `"Summarize the following text:\nabc"`. The custom entry, blank
/// templates and blank text return `text` unchanged, so an empty selection
/// is still rejected as empty input.
pub fn compose(template: &str, text: &str) -> String {
    let template = template.trim();
    if template.is_empty() || template == CUSTOM_PROMPT || text.trim().is_empty() {
        return text.to_string();
    }
    format!("{template}:\n{text}")
}

/// The template list offered to the user, custom entry first.
#[derive(Clone, Debug, PartialEq)]
pub struct PromptTemplates {
    entries: Vec<String>,
}

impl PromptTemplates {
    pub fn new(templates: impl IntoIterator<Item = String>) -> Self {
        let mut entries = vec![CUSTOM_PROMPT.to_string()];
        for template in templates {
            let template = template.trim().to_string();
            if !template.is_empty() && !entries.contains(&template) {
                entries.push(template);
            }
        }
        Self { entries }
    }

    pub fn from_config(config: &PromptConfig) -> Self {
        Self::new(config.templates.iter().cloned())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Look up a template by 0-based position in [`entries`](Self::entries)
    /// or by name (case-insensitive).
    pub fn resolve(&self, selector: &str) -> Option<&str> {
        let selector = selector.trim();
        if let Ok(index) = selector.parse::<usize>() {
            return self.entries.get(index).map(String::as_str);
        }
        self.entries
            .iter()
            .find(|t| t.eq_ignore_ascii_case(selector))
            .map(String::as_str)
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}
