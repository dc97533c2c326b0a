//! Timing presets and the clock every delay goes through

use rand::Rng;
use serde::Deserialize;
use std::cell::Cell;
use std::fmt;
use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

/// Named timing presets, from fastest to most tolerant of a slow host
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimingMode {
    Fast,
    #[default]
    Normal,
    Safe,
    #[value(alias = "ultra_safe")]
    UltraSafe,
}

impl TimingMode {
    pub const ALL: [TimingMode; 4] = [
        TimingMode::Fast,
        TimingMode::Normal,
        TimingMode::Safe,
        TimingMode::UltraSafe,
    ];

    /// Menu choice `1`-`4`; anything else is `None`
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(TimingMode::Fast),
            "2" => Some(TimingMode::Normal),
            "3" => Some(TimingMode::Safe),
            "4" => Some(TimingMode::UltraSafe),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TimingMode::Fast => "responsive local editors",
            TimingMode::Normal => "most browser editors",
            TimingMode::Safe => "slow pages or remote desktops",
            TimingMode::UltraSafe => "heavily loaded hosts",
        }
    }

    pub fn profile(&self) -> TimingProfile {
        let ms = Duration::from_millis;
        match self {
            TimingMode::Fast => TimingProfile {
                mode: *self,
                char_delay: ms(10)..=ms(40),
                punctuation_pause: ms(30)..=ms(80),
                newline_settle: ms(60),
                auto_indent_settle: ms(80),
                selection_delay: ms(15),
                delete_delay: ms(15),
                indent_key_delay: ms(5),
                auto_close_delay: ms(15),
            },
            TimingMode::Normal => TimingProfile {
                mode: *self,
                char_delay: ms(50)..=ms(150),
                punctuation_pause: ms(100)..=ms(300),
                newline_settle: ms(100),
                auto_indent_settle: ms(120),
                selection_delay: ms(20),
                delete_delay: ms(20),
                indent_key_delay: ms(10),
                auto_close_delay: ms(20),
            },
            TimingMode::Safe => TimingProfile {
                mode: *self,
                char_delay: ms(80)..=ms(200),
                punctuation_pause: ms(150)..=ms(400),
                newline_settle: ms(200),
                auto_indent_settle: ms(250),
                selection_delay: ms(50),
                delete_delay: ms(50),
                indent_key_delay: ms(20),
                auto_close_delay: ms(40),
            },
            TimingMode::UltraSafe => TimingProfile {
                mode: *self,
                char_delay: ms(120)..=ms(300),
                punctuation_pause: ms(200)..=ms(500),
                newline_settle: ms(400),
                auto_indent_settle: ms(500),
                selection_delay: ms(100),
                delete_delay: ms(100),
                indent_key_delay: ms(40),
                auto_close_delay: ms(80),
            },
        }
    }
}

impl fmt::Display for TimingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingMode::Fast => write!(f, "fast"),
            TimingMode::Normal => write!(f, "normal"),
            TimingMode::Safe => write!(f, "safe"),
            TimingMode::UltraSafe => write!(f, "ultra_safe"),
        }
    }
}

/// Every delay used during a run. Built from a [`TimingMode`] and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingProfile {
    pub mode: TimingMode,
    /// Base delay before each character
    pub char_delay: RangeInclusive<Duration>,
    /// Extra delay after `. , ; : ! ?`
    pub punctuation_pause: RangeInclusive<Duration>,
    /// Wait for the host to echo a newline
    pub newline_settle: Duration,
    /// Additional wait for the host's auto-indent to finish
    pub auto_indent_settle: Duration,
    /// Wait after selecting to line start
    pub selection_delay: Duration,
    /// Wait after deleting the selection
    pub delete_delay: Duration,
    /// Gap between retyped indentation spaces
    pub indent_key_delay: Duration,
    /// Wait for the host to auto-insert a closer before removing it
    pub auto_close_delay: Duration,
}

impl Default for TimingProfile {
    fn default() -> Self {
        TimingMode::default().profile()
    }
}

impl TimingProfile {
    /// Randomized pre-keystroke delay for `ch` given the previous character.
    pub fn char_delay_after<R: Rng>(&self, prev: Option<char>, rng: &mut R) -> Duration {
        let mut delay = sample(&self.char_delay, rng);
        if prev.is_some_and(is_pause_punctuation) {
            delay += sample(&self.punctuation_pause, rng);
        }
        delay
    }
}

/// Characters after which a human would hesitate
pub fn is_pause_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?')
}

fn sample<R: Rng>(range: &RangeInclusive<Duration>, rng: &mut R) -> Duration {
    let lo = range.start().as_micros() as u64;
    let hi = range.end().as_micros() as u64;
    if hi <= lo {
        return *range.start();
    }
    Duration::from_micros(rng.gen_range(lo..=hi))
}

/// Source of blocking waits
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeps
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Clock that returns immediately and totals the time it was asked to wait.
/// Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingClock {
    elapsed: Cell<Duration>,
    sleeps: Cell<usize>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time waited
    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub fn sleep_count(&self) -> usize {
        self.sleeps.get()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
        self.sleeps.set(self.sleeps.get() + 1);
    }
}
