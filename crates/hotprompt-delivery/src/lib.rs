//! Hotprompt delivery — puts completion text where the user is typing.

pub mod clipboard;
pub mod keystroke;
pub mod sink;

pub use clipboard::{Clipboard, SystemClipboard};
pub use keystroke::{PasteCommand, PasteKeystroke};
pub use sink::{ClipboardSink, DeliveryReport, ResultSink};
