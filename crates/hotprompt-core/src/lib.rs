//! Hotprompt core — shared types, errors, configuration, and the system
//! instruction store.
//!
//! - [`types`] — `Provider`, chat messages, the OpenAI-compatible wire format
//! - [`error`] — `DispatchError` / `ErrorKind` and the `ChatResult` alias
//! - [`config`] — `~/.hotprompt/config.json` schema, loader, env overrides
//! - [`prompt_store`] — the process-wide system instruction

pub mod config;
pub mod error;
pub mod prompt_store;
pub mod types;
pub mod utils;

pub use error::{ChatResult, DispatchError, ErrorKind};
pub use prompt_store::{ConfigPromptPersistence, PromptPersistence, PromptStore};
pub use types::{Completion, Message, Provider};
