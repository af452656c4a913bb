//! Synthetic paste keystroke.
//!
//! The keystroke is sent by an external tool (`xdotool`, `osascript`,
//! PowerShell) so no input-injection code lives in this process. The
//! command is configurable for setups the defaults don't cover
//! (e.g. `wtype -M ctrl v -m ctrl` on Wayland).

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use hotprompt_core::config::schema::DeliveryConfig;

/// How long a paste command may run before it is abandoned.
const PASTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends "paste" to whatever currently has keyboard focus.
#[async_trait]
pub trait PasteKeystroke: Send + Sync {
    async fn paste(&self) -> anyhow::Result<()>;
}

/// Runs an external command that synthesizes the paste shortcut.
#[derive(Clone, Debug, PartialEq)]
pub struct PasteCommand {
    argv: Vec<String>,
}

impl PasteCommand {
    /// Use a custom argv. The first element is the program.
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// The paste command for the current platform.
    pub fn platform_default() -> Self {
        let argv: &[&str] = if cfg!(target_os = "macos") {
            &[
                "osascript",
                "-e",
                "tell application \"System Events\" to keystroke \"v\" using command down",
            ]
        } else if cfg!(target_os = "windows") {
            &[
                "powershell",
                "-NoProfile",
                "-Command",
                "(New-Object -ComObject WScript.Shell).SendKeys('^v')",
            ]
        } else {
            &["xdotool", "key", "--clearmodifiers", "ctrl+v"]
        };
        Self::new(argv.iter().map(|s| s.to_string()).collect())
    }

    /// The configured paste command, or `None` in copy-only mode.
    ///
    /// A missing or empty `pasteCommand` falls back to the platform default.
    pub fn from_config(config: &DeliveryConfig) -> Option<Self> {
        if !config.paste {
            return None;
        }
        Some(match &config.paste_command {
            Some(argv) if !argv.is_empty() => Self::new(argv.clone()),
            _ => Self::platform_default(),
        })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

#[async_trait]
impl PasteKeystroke for PasteCommand {
    async fn paste(&self) -> anyhow::Result<()> {
        let Some((program, args)) = self.argv.split_first() else {
            anyhow::bail!("paste command is empty");
        };

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(PASTE_TIMEOUT, child).await {
            Ok(result) => result.map_err(|e| anyhow::anyhow!("failed to run {program}: {e}"))?,
            Err(_) => anyhow::bail!("{program} did not finish within {}s", PASTE_TIMEOUT.as_secs()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{program} exited with {}: {}", output.status, stderr.trim());
        }

        debug!(program = %program, "Paste keystroke sent");
        Ok(())
    }
}
