//! Clipboard access.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

/// The shared system clipboard, or a stand-in for it.
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `text`.
    fn set_text(&self, text: &str) -> anyhow::Result<()>;

    /// Read the current clipboard text.
    fn get_text(&self) -> anyhow::Result<String>;

    /// Block until the last written text no longer depends on this process,
    /// or until `timeout` passes. A no-op where the OS owns copied data.
    fn hold(&self, _timeout: Duration) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The OS clipboard through `arboard`.
///
/// The handle is opened lazily and then kept for the life of the process.
/// On X11 the copied text is served by its owner, so a short-lived process
/// must call [`Clipboard::hold`] before exiting or the text is lost unless a
/// clipboard manager has taken it over.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
    last_written: Mutex<Option<String>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_handle<T>(
        &self,
        f: impl FnOnce(&mut arboard::Clipboard) -> Result<T, arboard::Error>,
    ) -> anyhow::Result<T> {
        let mut guard = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            *guard = Some(arboard::Clipboard::new().context("clipboard unavailable")?);
        }
        match guard.as_mut() {
            Some(clipboard) => f(clipboard).map_err(anyhow::Error::from),
            None => anyhow::bail!("clipboard unavailable"),
        }
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> anyhow::Result<()> {
        self.with_handle(|c| c.set_text(text.to_string()))
            .context("failed to write clipboard")?;
        *self.last_written.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.to_string());
        debug!(chars = text.chars().count(), "Clipboard written");
        Ok(())
    }

    fn get_text(&self) -> anyhow::Result<String> {
        self.with_handle(|c| c.get_text())
            .context("failed to read clipboard")
    }

    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    ))]
    fn hold(&self, timeout: Duration) -> anyhow::Result<()> {
        use arboard::SetExtLinux;

        let Some(text) = self
            .last_written
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        else {
            return Ok(());
        };

        // Re-set with a deadline: returns once a clipboard manager or another
        // copy takes ownership, or when the deadline passes.
        let deadline = std::time::Instant::now() + timeout;
        debug!(timeout = ?timeout, "Holding clipboard selection");
        self.with_handle(|c| c.set().wait_until(deadline).text(text))
            .context("failed to hold clipboard")
    }
}
