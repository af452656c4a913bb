//! Result delivery: copy to the clipboard, then try to paste.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use hotprompt_core::config::schema::DeliveryConfig;
use hotprompt_core::error::DispatchError;

use crate::clipboard::Clipboard;
use crate::keystroke::{PasteCommand, PasteKeystroke};

/// Upper bound on holding the clipboard after a successful paste; the
/// target application has already been asked to read it.
const PASTED_HOLD: Duration = Duration::from_millis(500);

/// What happened during a successful delivery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Whether the paste keystroke was sent. The text is on the clipboard
    /// either way.
    pub pasted: bool,
}

/// Destination for completion text.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<DeliveryReport, DispatchError>;
}

/// Writes the text to the clipboard and, when enabled, pastes it into the
/// focused application.
///
/// The clipboard write decides success. The paste is best effort: a failed
/// keystroke is logged and reported as `pasted: false`.
pub struct ClipboardSink {
    clipboard: Arc<dyn Clipboard>,
    keystroke: Option<Arc<dyn PasteKeystroke>>,
    settle_delay: Duration,
    hold: Duration,
}

impl ClipboardSink {
    pub fn new(
        clipboard: Arc<dyn Clipboard>,
        keystroke: Option<Arc<dyn PasteKeystroke>>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            clipboard,
            keystroke,
            settle_delay,
            hold: Duration::ZERO,
        }
    }

    /// How long [`hold`](Self::hold) may keep the clipboard after an
    /// unpasted delivery.
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Copy-only sink.
    pub fn copy_only(clipboard: Arc<dyn Clipboard>) -> Self {
        Self::new(clipboard, None, Duration::ZERO)
    }

    /// Build a sink on the system clipboard from the `delivery` config section.
    pub fn from_config(config: &DeliveryConfig, clipboard: Arc<dyn Clipboard>) -> Self {
        let hold = Duration::from_secs(config.clipboard_hold_secs);
        let Some(command) = PasteCommand::from_config(config) else {
            return Self::copy_only(clipboard).with_hold(hold);
        };
        debug!(argv = ?command.argv(), "Paste command");
        Self::new(
            clipboard,
            Some(Arc::new(command)),
            Duration::from_millis(config.settle_delay_ms),
        )
        .with_hold(hold)
    }

    pub fn pastes(&self) -> bool {
        self.keystroke.is_some()
    }

    /// How long [`hold`](Self::hold) waits after a delivery with `report`.
    pub fn hold_duration(&self, report: DeliveryReport) -> Duration {
        if report.pasted {
            self.hold.min(PASTED_HOLD)
        } else {
            self.hold
        }
    }

    /// Keep the delivered text on the clipboard before a short-lived
    /// process exits. Failures are logged; the delivery already succeeded.
    pub async fn hold(&self, report: DeliveryReport) {
        let timeout = self.hold_duration(report);
        if timeout.is_zero() {
            return;
        }
        let clipboard = Arc::clone(&self.clipboard);
        match tokio::task::spawn_blocking(move || clipboard.hold(timeout)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %format!("{e:#}"), "Could not hold clipboard"),
            Err(e) => warn!(error = %e, "Clipboard hold task failed"),
        }
    }
}

#[async_trait]
impl ResultSink for ClipboardSink {
    async fn deliver(&self, text: &str) -> Result<DeliveryReport, DispatchError> {
        self.clipboard
            .set_text(text)
            .map_err(|e| DispatchError::DeliveryFailure(format!("{e:#}")))?;

        let Some(keystroke) = &self.keystroke else {
            return Ok(DeliveryReport { pasted: false });
        };

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        match keystroke.paste().await {
            Ok(()) => Ok(DeliveryReport { pasted: true }),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Paste failed; result left on clipboard");
                Ok(DeliveryReport { pasted: false })
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
