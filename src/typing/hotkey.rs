//! Global abort hotkey
//!
//! While typing, focus sits in the host editor, so Ctrl+C in the terminal is
//! out of reach. Pressing Escape anywhere sets the same cancellation flag.

use super::processor::CancelFlag;
use rdev::{Event, EventType, Key, listen};
use std::sync::atomic::Ordering;
use std::thread;

/// Spawn a listener that sets `cancel` when Escape is pressed.
///
/// The listener thread lives until the process exits.
pub fn start_abort_listener(cancel: CancelFlag) {
    thread::spawn(move || {
        let callback = move |event: Event| {
            if let EventType::KeyPress(Key::Escape) = event.event_type {
                if !cancel.swap(true, Ordering::SeqCst) {
                    log::info!("abort hotkey pressed");
                }
            }
        };

        // Blocks until an error occurs
        if let Err(e) = listen(callback) {
            log::warn!("abort hotkey listener error: {:?}", e);
        }
    });
}
