//! Keystroke synthesis against an auto-formatting host editor
//!
//! Reproduces a block of text inside an editor that auto-indents new lines
//! and auto-closes brackets and quotes, using keystrokes only.
//!
//! # Pieces
//!
//! - **Emitter**: one regular character at a time with randomized delay,
//!   removing the closer the host adds after `{ ( [ " '`
//! - **Reconciler**: per-newline state machine that wipes the host's
//!   auto-indent and retypes the source indentation
//! - **Processor**: walks the document, dispatches characters, honours
//!   cancellation
//! - **Host**: a simulated editor for dry runs and tests

mod emitter;
mod host;
#[cfg(feature = "abort-hotkey")]
mod hotkey;
mod input;
mod processor;
mod reconcile;

pub use emitter::{AUTO_CLOSE_TRIGGERS, CharacterEmitter, Emission, is_auto_close_trigger};
pub use host::{AutoIndent, HostEvent, SimulatedEditor};
#[cfg(feature = "abort-hotkey")]
pub use hotkey::start_abort_listener;
#[cfg(feature = "desktop")]
pub use input::EnigoSynthesizer;
pub use input::{HostKey, InputSynthesizer, Modifier, line_start_chord};
pub use processor::{CancelFlag, TypingProcessor, TypingSession};
pub use reconcile::{
    IndentReconciler, ReconcileState, ReconcileStrategy, Reconciled, SelectBackspace,
    SentinelSelect, StrategyKind,
};
