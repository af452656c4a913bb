//! Hotprompt pipeline — from selected text to a pasted completion.

pub mod assistant;
pub mod templates;

pub use assistant::{Assistant, Invocation};
pub use templates::{compose, PromptTemplates, CUSTOM_PROMPT};
