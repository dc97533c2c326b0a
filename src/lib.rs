//! Types clipboard text into an auto-formatting editor, keystroke by keystroke,
//! so the editor ends up with exactly the original text.
//!
//! The binary in `main.rs` is thin glue; everything it drives lives here so
//! integration tests can run whole sessions against a simulated host.

pub mod clipboard;
pub mod config;
pub mod console;
pub mod error;
pub mod normalize;
pub mod stats;
pub mod timing;
pub mod typing;

pub use error::TypingError;
