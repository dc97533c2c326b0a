//! Keystroke primitives and the enigo-backed host adapter
//!
//! The core only ever talks to [`InputSynthesizer`]. Each call is blocking
//! and treated as atomic: a key press is indivisible, inserted text is taken
//! literally, and a held modifier stays down until released.

use crate::error::TypingError;

/// Non-text keys the core needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKey {
    Enter,
    Space,
    Delete,
    Backspace,
    Home,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    Shift,
    Meta,
}

/// Primitive keyboard capability of the host
pub trait InputSynthesizer {
    fn press_key(&mut self, key: HostKey) -> Result<(), TypingError>;
    fn hold_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError>;
    fn release_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError>;
    fn insert_text(&mut self, text: &str) -> Result<(), TypingError>;

    /// Press `key` with `modifiers` held. Modifiers are released in reverse
    /// order even if the key press fails.
    fn chord(&mut self, modifiers: &[Modifier], key: HostKey) -> Result<(), TypingError> {
        let mut held = 0;
        let mut result = Ok(());
        for modifier in modifiers {
            if let Err(e) = self.hold_modifier(*modifier) {
                result = Err(e);
                break;
            }
            held += 1;
        }
        if result.is_ok() {
            result = self.press_key(key);
        }
        for modifier in modifiers[..held].iter().rev() {
            let released = self.release_modifier(*modifier);
            if result.is_ok() {
                result = released;
            }
        }
        result
    }

    /// Extend the selection from the cursor back to the start of the line
    fn select_to_line_start(&mut self) -> Result<(), TypingError> {
        let (modifiers, key) = line_start_chord();
        self.chord(modifiers, key)
    }
}

/// Chord that selects to line start on this platform
pub fn line_start_chord() -> (&'static [Modifier], HostKey) {
    #[cfg(target_os = "macos")]
    {
        (&[Modifier::Meta, Modifier::Shift], HostKey::Left)
    }
    #[cfg(not(target_os = "macos"))]
    {
        (&[Modifier::Shift], HostKey::Home)
    }
}

#[cfg(feature = "desktop")]
pub use desktop::EnigoSynthesizer;

#[cfg(feature = "desktop")]
mod desktop {
    use super::{HostKey, InputSynthesizer, Modifier};
    use crate::error::TypingError;
    use enigo::{Direction, Enigo, Key, Keyboard, Settings};
    use std::thread;
    use std::time::Duration;

    /// Settle time for a modifier to register with the OS
    const MODIFIER_SETTLE: Duration = Duration::from_millis(10);

    /// Sends real keystrokes to the focused window
    pub struct EnigoSynthesizer {
        enigo: Enigo,
    }

    impl EnigoSynthesizer {
        pub fn new() -> Result<Self, TypingError> {
            let enigo = Enigo::new(&Settings::default()).map_err(|e| {
                TypingError::Synthesis(format!("Failed to initialize Enigo: {}", e))
            })?;
            Ok(Self { enigo })
        }

        fn key(&mut self, key: Key, direction: Direction) -> Result<(), TypingError> {
            self.enigo
                .key(key, direction)
                .map_err(|e| TypingError::Synthesis(format!("Failed to send {:?}: {}", key, e)))
        }
    }

    fn host_key(key: HostKey) -> Key {
        match key {
            HostKey::Enter => Key::Return,
            HostKey::Space => Key::Space,
            HostKey::Delete => Key::Delete,
            HostKey::Backspace => Key::Backspace,
            HostKey::Home => Key::Home,
            HostKey::Left => Key::LeftArrow,
        }
    }

    fn modifier_key(modifier: Modifier) -> Key {
        match modifier {
            Modifier::Shift => Key::Shift,
            Modifier::Meta => Key::Meta,
        }
    }

    impl InputSynthesizer for EnigoSynthesizer {
        fn press_key(&mut self, key: HostKey) -> Result<(), TypingError> {
            self.key(host_key(key), Direction::Click)
        }

        fn hold_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError> {
            self.key(modifier_key(modifier), Direction::Press)?;
            thread::sleep(MODIFIER_SETTLE);
            Ok(())
        }

        fn release_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError> {
            thread::sleep(MODIFIER_SETTLE);
            self.key(modifier_key(modifier), Direction::Release)
        }

        fn insert_text(&mut self, text: &str) -> Result<(), TypingError> {
            if text.is_empty() {
                return Ok(());
            }
            self.enigo
                .text(text)
                .map_err(|e| TypingError::Synthesis(format!("Failed to type text: {}", e)))
        }
    }
}
