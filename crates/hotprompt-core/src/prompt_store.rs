//! System instruction store.
//!
//! Holds the active system instruction in memory and writes edits through a
//! host-supplied [`PromptPersistence`]. Reads and writes go through one
//! mutex, so a dispatch snapshots a consistent value at build time.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::config::loader::{read_config_file, save_config};
use crate::config::schema::DEFAULT_SYSTEM_PROMPT;

// ─────────────────────────────────────────────
// Persistence capability
// ─────────────────────────────────────────────

/// Durable storage for the system instruction, supplied by the host.
pub trait PromptPersistence: Send + Sync {
    /// Load the saved instruction. `Ok(None)` when nothing was saved yet.
    fn load(&self) -> anyhow::Result<Option<String>>;

    /// Durably record `value` as the active instruction.
    fn persist(&self, value: &str) -> anyhow::Result<()>;
}

/// Persists the instruction as `prompt.system` in the JSON config file.
///
/// Only that field is rewritten; every other setting in the file is kept.
#[derive(Clone, Debug)]
pub struct ConfigPromptPersistence {
    path: PathBuf,
}

impl ConfigPromptPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persistence over the default `~/.hotprompt/config.json`.
    pub fn default_location() -> Self {
        Self::new(crate::config::get_config_path())
    }
}

impl PromptPersistence for ConfigPromptPersistence {
    fn load(&self) -> anyhow::Result<Option<String>> {
        Ok(read_config_file(&self.path)?.map(|config| config.prompt.system))
    }

    fn persist(&self, value: &str) -> anyhow::Result<()> {
        let mut config = read_config_file(&self.path)?.unwrap_or_default();
        config.prompt.system = value.to_string();
        save_config(&config, Some(&self.path))
    }
}

// ─────────────────────────────────────────────
// PromptStore
// ─────────────────────────────────────────────

/// The process-wide system instruction.
pub struct PromptStore {
    current: Mutex<String>,
    persistence: Arc<dyn PromptPersistence>,
}

impl std::fmt::Debug for PromptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptStore")
            .field("current", &*self.lock())
            .finish()
    }
}

impl PromptStore {
    /// Create a store seeded with `initial`, without touching persistence.
    pub fn new(initial: impl Into<String>, persistence: Arc<dyn PromptPersistence>) -> Self {
        Self {
            current: Mutex::new(initial.into()),
            persistence,
        }
    }

    /// Create a store seeded from `persistence.load()`.
    ///
    /// Falls back to the default instruction if nothing is saved or the
    /// load fails; a broken store never prevents startup.
    pub fn open(persistence: Arc<dyn PromptPersistence>) -> Self {
        let initial = match persistence.load() {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                info!("No saved system prompt, using default");
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
            Err(e) => {
                warn!("Failed to load system prompt, using default: {:#}", e);
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
        };
        Self::new(initial, persistence)
    }

    /// Snapshot of the current instruction.
    pub fn current(&self) -> String {
        self.lock().clone()
    }

    /// Make `value` the active instruction and persist it.
    ///
    /// Returns `Ok(false)` without calling `persist` when `value` equals the
    /// current instruction. The in-memory value only changes once
    /// persistence succeeded.
    ///
    /// `persist` runs with the lock held and may do blocking file I/O, so
    /// async callers should go through `tokio::task::spawn_blocking`.
    pub fn set(&self, value: impl Into<String>) -> anyhow::Result<bool> {
        let value = value.into();
        let mut current = self.lock();
        if *current == value {
            debug!("System prompt unchanged, skipping persist");
            return Ok(false);
        }

        self.persistence.persist(&value)?;
        *current = value;
        info!(chars = current.chars().count(), "System prompt updated");
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        // A String cannot be left half-written, so a poisoned lock is still usable.
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
