//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use hotprompt_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Timeout: {}s", cfg.dispatch.timeout_secs);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, read_config_file, save_config};
pub use schema::Config;
