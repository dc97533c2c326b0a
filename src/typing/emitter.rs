//! Single-character emission with human-like timing
//!
//! Newlines never come through here; they need look-ahead into the next
//! line and are handled by the indent reconciler.

use super::input::{HostKey, InputSynthesizer};
use crate::error::TypingError;
use crate::timing::{Clock, TimingProfile};
use rand::Rng;

/// Characters the host is expected to auto-close
pub const AUTO_CLOSE_TRIGGERS: [char; 5] = ['{', '(', '[', '"', '\''];

pub fn is_auto_close_trigger(c: char) -> bool {
    AUTO_CLOSE_TRIGGERS.contains(&c)
}

/// What the emitter did for one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Sent as a space key press
    SpaceKey,
    /// Inserted literally, then the host's auto-closer was deleted
    Neutralized,
    /// Inserted literally
    Literal,
}

/// Emits regular characters into the host
pub struct CharacterEmitter<'a, R> {
    profile: &'a TimingProfile,
    rng: R,
    neutralize_pairs: bool,
}

impl<'a, R: Rng> CharacterEmitter<'a, R> {
    pub fn new(profile: &'a TimingProfile, rng: R) -> Self {
        Self {
            profile,
            rng,
            neutralize_pairs: true,
        }
    }

    /// Disable delete-forward after openers, for hosts that never auto-pair
    pub fn with_auto_close(mut self, enabled: bool) -> Self {
        self.neutralize_pairs = enabled;
        self
    }

    /// The randomized wait before a keystroke that follows `prev`. Newlines
    /// take it too, before the reconciler presses Enter.
    pub fn pause(&mut self, clock: &dyn Clock, prev: Option<char>) {
        clock.sleep(self.profile.char_delay_after(prev, &mut self.rng));
    }

    /// Type `ch` after a randomized delay.
    ///
    /// `prev` is the previously typed source character and only affects the
    /// delay (a longer pause follows punctuation).
    pub fn emit(
        &mut self,
        synth: &mut dyn InputSynthesizer,
        clock: &dyn Clock,
        ch: char,
        prev: Option<char>,
    ) -> Result<Emission, TypingError> {
        debug_assert_ne!(ch, '\n', "newlines go through the indent reconciler");

        self.pause(clock, prev);

        if ch == ' ' {
            synth.press_key(HostKey::Space)?;
            return Ok(Emission::SpaceKey);
        }

        let mut buf = [0u8; 4];
        synth.insert_text(ch.encode_utf8(&mut buf))?;

        if self.neutralize_pairs && is_auto_close_trigger(ch) {
            clock.sleep(self.profile.auto_close_delay);
            synth.press_key(HostKey::Delete)?;
            return Ok(Emission::Neutralized);
        }

        Ok(Emission::Literal)
    }
}
