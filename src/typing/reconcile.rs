//! Newline handling and auto-indent correction
//!
//! After every newline the host may inject leading whitespace of unknown
//! width. The reconciler waits for it to settle, wipes it with a
//! [`ReconcileStrategy`], then retypes the source indentation one space key
//! at a time.

use super::input::{HostKey, InputSynthesizer};
use crate::error::TypingError;
use crate::timing::{Clock, TimingProfile};
use serde::Deserialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Removes whatever the host auto-indented on the current (new) line,
/// leaving the cursor at column 0 with the newline intact.
pub trait ReconcileStrategy {
    fn name(&self) -> &'static str;

    fn clear_auto_indent(
        &self,
        synth: &mut dyn InputSynthesizer,
        clock: &dyn Clock,
        profile: &TimingProfile,
        target_indent: usize,
    ) -> Result<(), TypingError>;
}

/// Insert a throwaway space so the selection is never empty, then select to
/// line start and delete. Correct for any auto-indent width.
#[derive(Debug, Default, Clone, Copy)]
pub struct SentinelSelect;

impl ReconcileStrategy for SentinelSelect {
    fn name(&self) -> &'static str {
        "sentinel"
    }

    fn clear_auto_indent(
        &self,
        synth: &mut dyn InputSynthesizer,
        clock: &dyn Clock,
        profile: &TimingProfile,
        _target_indent: usize,
    ) -> Result<(), TypingError> {
        synth.insert_text(" ")?;
        synth.select_to_line_start()?;
        clock.sleep(profile.selection_delay);
        synth.press_key(HostKey::Backspace)?;
        clock.sleep(profile.delete_delay);
        Ok(())
    }
}

/// Select to line start and backspace, only when the line needs indentation.
///
/// Leaves the host's indent in place when the target is zero, and deletes the
/// newline itself when the host did not indent. Only suitable for hosts that
/// always indent after a newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectBackspace;

impl ReconcileStrategy for SelectBackspace {
    fn name(&self) -> &'static str {
        "select_backspace"
    }

    fn clear_auto_indent(
        &self,
        synth: &mut dyn InputSynthesizer,
        clock: &dyn Clock,
        profile: &TimingProfile,
        target_indent: usize,
    ) -> Result<(), TypingError> {
        if target_indent == 0 {
            return Ok(());
        }
        synth.select_to_line_start()?;
        clock.sleep(profile.selection_delay);
        synth.press_key(HostKey::Backspace)?;
        clock.sleep(profile.delete_delay);
        Ok(())
    }
}

/// Strategy names accepted in config and on the command line
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Sentinel,
    #[value(alias = "select_backspace")]
    SelectBackspace,
}

impl StrategyKind {
    pub fn build(&self) -> Box<dyn ReconcileStrategy> {
        match self {
            StrategyKind::Sentinel => Box::new(SentinelSelect),
            StrategyKind::SelectBackspace => Box::new(SelectBackspace),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Sentinel => write!(f, "sentinel"),
            StrategyKind::SelectBackspace => write!(f, "select_backspace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    AwaitNewlineEcho,
    AwaitAutoIndentSettle,
    Correcting,
    Done,
}

/// Outcome of one reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    /// Indentation spaces typed after the correction
    pub indent_typed: usize,
    /// False when cancellation stopped the indent retype early
    pub complete: bool,
}

/// Per-newline state machine
pub struct IndentReconciler {
    strategy: Box<dyn ReconcileStrategy>,
    state: ReconcileState,
}

impl IndentReconciler {
    pub fn new(strategy: Box<dyn ReconcileStrategy>) -> Self {
        Self {
            strategy,
            state: ReconcileState::Done,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn state(&self) -> ReconcileState {
        self.state
    }

    /// Emit a newline and leave the new line indented by exactly
    /// `indent_count` spaces.
    ///
    /// The newline and the correction always run to completion. `cancel` is
    /// checked before each indentation space, so an interrupt can stop the
    /// retype part-way. `on_emit` fires once when the newline has settled and
    /// once per indentation space.
    pub fn reconcile(
        &mut self,
        synth: &mut dyn InputSynthesizer,
        clock: &dyn Clock,
        profile: &TimingProfile,
        indent_count: usize,
        cancel: &AtomicBool,
        mut on_emit: impl FnMut(),
    ) -> Result<Reconciled, TypingError> {
        let mut typed = 0;
        self.state = ReconcileState::AwaitNewlineEcho;

        loop {
            log::trace!("reconcile state {:?}", self.state);
            self.state = match self.state {
                ReconcileState::AwaitNewlineEcho => {
                    synth.press_key(HostKey::Enter)?;
                    clock.sleep(profile.newline_settle);
                    ReconcileState::AwaitAutoIndentSettle
                }
                ReconcileState::AwaitAutoIndentSettle => {
                    clock.sleep(profile.auto_indent_settle);
                    ReconcileState::Correcting
                }
                ReconcileState::Correcting => {
                    self.strategy
                        .clear_auto_indent(synth, clock, profile, indent_count)?;
                    on_emit();
                    ReconcileState::Done
                }
                ReconcileState::Done => {
                    while typed < indent_count {
                        if cancel.load(Ordering::SeqCst) {
                            log::debug!("cancelled after {} of {} indent spaces", typed, indent_count);
                            return Ok(Reconciled {
                                indent_typed: typed,
                                complete: false,
                            });
                        }
                        synth.press_key(HostKey::Space)?;
                        typed += 1;
                        on_emit();
                        clock.sleep(profile.indent_key_delay);
                    }
                    return Ok(Reconciled {
                        indent_typed: typed,
                        complete: true,
                    });
                }
            };
        }
    }
}
