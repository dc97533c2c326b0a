//! Sequential walk over the source text
//!
//! Regular characters go to the [`CharacterEmitter`]; each newline goes to
//! the [`IndentReconciler`] together with the width of the indentation that
//! follows it. Cancellation is checked between characters and never rolls
//! back what was already typed.

use super::emitter::{CharacterEmitter, Emission};
use super::input::InputSynthesizer;
use super::reconcile::{IndentReconciler, ReconcileStrategy};
use crate::error::TypingError;
use crate::normalize::leading_spaces;
use crate::stats::RunReport;
use crate::timing::{Clock, TimingProfile};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag, set from a signal handler or hotkey thread
pub type CancelFlag = Arc<AtomicBool>;

/// Transient state of one run
#[derive(Debug)]
pub struct TypingSession {
    offset: usize,
    cancel: CancelFlag,
}

impl TypingSession {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { offset: 0, cancel }
    }

    /// Number of source characters already typed
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    fn advance(&mut self, n: usize) {
        self.offset += n;
    }
}

/// Drives the emitter and reconciler over a normalized document
pub struct TypingProcessor<'a, R> {
    profile: &'a TimingProfile,
    emitter: CharacterEmitter<'a, R>,
    reconciler: IndentReconciler,
}

impl<'a, R: Rng> TypingProcessor<'a, R> {
    pub fn new(profile: &'a TimingProfile, strategy: Box<dyn ReconcileStrategy>, rng: R) -> Self {
        Self {
            profile,
            emitter: CharacterEmitter::new(profile, rng),
            reconciler: IndentReconciler::new(strategy),
        }
    }

    pub fn with_auto_close(mut self, enabled: bool) -> Self {
        self.emitter = self.emitter.with_auto_close(enabled);
        self
    }

    /// Type `text` from `session.offset()` to the end.
    ///
    /// `on_progress` receives the new offset after every source character
    /// lands. Returns [`TypingError::Cancelled`] as soon as the flag is seen,
    /// leaving the typed prefix in place.
    pub fn run(
        &mut self,
        text: &str,
        synth: &mut dyn InputSynthesizer,
        clock: &dyn Clock,
        session: &mut TypingSession,
        mut on_progress: impl FnMut(usize),
    ) -> Result<RunReport, TypingError> {
        let chars: Vec<char> = text.chars().collect();
        let profile = self.profile;
        let cancel = Arc::clone(session.cancel_flag());
        let mut report = RunReport::default();

        log::info!(
            "typing {} chars with {} timing, {} reconciliation",
            chars.len(),
            profile.mode,
            self.reconciler.strategy_name()
        );

        while session.offset() < chars.len() {
            if session.is_cancelled() {
                log::info!("cancelled at offset {}", session.offset());
                return Err(TypingError::Cancelled);
            }

            let offset = session.offset();
            let ch = chars[offset];

            if ch == '\n' {
                let indent = leading_spaces(&chars, offset + 1);
                log::debug!("newline at {} followed by {} spaces", offset, indent);
                self.emitter.pause(clock, offset.checked_sub(1).map(|i| chars[i]));

                let mut emitted = 0;
                let outcome = self.reconciler.reconcile(
                    synth,
                    clock,
                    profile,
                    indent,
                    &cancel,
                    || {
                        emitted += 1;
                        on_progress(offset + emitted);
                    },
                )?;
                session.advance(emitted);
                report.newlines += 1;
                report.indent_spaces += outcome.indent_typed;

                if !outcome.complete {
                    log::info!("cancelled at offset {}", session.offset());
                    return Err(TypingError::Cancelled);
                }
            } else {
                let prev = offset.checked_sub(1).map(|i| chars[i]);
                if self.emitter.emit(synth, clock, ch, prev)? == Emission::Neutralized {
                    report.pairs_neutralized += 1;
                }
                session.advance(1);
                on_progress(session.offset());
            }
        }

        report.chars_typed = session.offset();
        log::info!("typing finished: {}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::{RecordingClock, TimingMode};
    use crate::typing::host::{AutoIndent, SimulatedEditor};
    use crate::typing::input::{HostKey, Modifier};
    use crate::typing::reconcile::StrategyKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    /// Records the simulated time at which each Enter lands, and the time of
    /// the primitive before it.
    struct EnterTimes<'c> {
        host: SimulatedEditor,
        clock: &'c RecordingClock,
        last: Duration,
        gaps: Vec<Duration>,
    }

    impl EnterTimes<'_> {
        fn mark(&mut self) -> Duration {
            let gap = self.clock.elapsed() - self.last;
            self.last = self.clock.elapsed();
            gap
        }
    }

    impl InputSynthesizer for EnterTimes<'_> {
        fn press_key(&mut self, key: HostKey) -> Result<(), TypingError> {
            let gap = self.mark();
            if key == HostKey::Enter {
                self.gaps.push(gap);
            }
            self.host.press_key(key)
        }

        fn hold_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError> {
            self.host.hold_modifier(modifier)
        }

        fn release_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError> {
            self.host.release_modifier(modifier)
        }

        fn insert_text(&mut self, text: &str) -> Result<(), TypingError> {
            self.mark();
            self.host.insert_text(text)
        }
    }

    fn type_into(host: &mut SimulatedEditor, text: &str) -> Result<RunReport, TypingError> {
        let profile = TimingMode::Fast.profile();
        let clock = RecordingClock::new();
        let mut processor =
            TypingProcessor::new(&profile, StrategyKind::Sentinel.build(), StdRng::seed_from_u64(3));
        let mut session = TypingSession::new(CancelFlag::default());
        processor.run(text, host, &clock, &mut session, |_| {})
    }

    #[test]
    fn test_types_plain_text() {
        let mut host = SimulatedEditor::new(AutoIndent::None);
        let report = type_into(&mut host, "hello, world").unwrap();
        assert_eq!(host.text(), "hello, world");
        assert_eq!(report.chars_typed, 12);
        assert_eq!(report.newlines, 0);
    }

    #[test]
    fn test_counts_reconciliations_and_pairs() {
        let mut host = SimulatedEditor::new(AutoIndent::Mirror);
        let text = "fn f() {\n    g(\"a\");\n}\n";
        let report = type_into(&mut host, text).unwrap();
        assert_eq!(host.text(), text);
        assert_eq!(report.newlines, 3);
        assert_eq!(report.indent_spaces, 4);
        // ( { ( " "
        assert_eq!(report.pairs_neutralized, 5);
        assert_eq!(report.chars_typed, text.chars().count());
    }

    #[test]
    fn test_progress_is_monotonic_and_complete() {
        let profile = TimingMode::Fast.profile();
        let clock = RecordingClock::new();
        let mut host = SimulatedEditor::new(AutoIndent::Fixed(2));
        let mut processor =
            TypingProcessor::new(&profile, StrategyKind::Sentinel.build(), StdRng::seed_from_u64(3));
        let mut session = TypingSession::new(CancelFlag::default());
        let mut seen = Vec::new();
        processor
            .run("a\n  b", &mut host, &clock, &mut session, |o| seen.push(o))
            .unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_already_cancelled_sends_nothing() {
        let profile = TimingMode::Fast.profile();
        let clock = RecordingClock::new();
        let mut host = SimulatedEditor::new(AutoIndent::None);
        let mut processor =
            TypingProcessor::new(&profile, StrategyKind::Sentinel.build(), StdRng::seed_from_u64(3));
        let mut session = TypingSession::new(Arc::new(AtomicBool::new(true)));
        let result = processor.run("abc", &mut host, &clock, &mut session, |_| {});
        assert_eq!(result, Err(TypingError::Cancelled));
        assert_eq!(host.primitive_count(), 0);
        assert_eq!(session.offset(), 0);
    }

    #[test]
    fn test_synthesis_failure_propagates() {
        let mut host = SimulatedEditor::new(AutoIndent::None).with_failure_after(2);
        let result = type_into(&mut host, "abcdef");
        assert!(matches!(result, Err(TypingError::Synthesis(_))));
        assert_eq!(host.text(), "ab");
    }

    #[test]
    fn test_enter_waits_like_a_keystroke() {
        let profile = TimingMode::Normal.profile();
        let clock = RecordingClock::new();
        let mut synth = EnterTimes {
            host: SimulatedEditor::new(AutoIndent::None),
            clock: &clock,
            last: Duration::ZERO,
            gaps: Vec::new(),
        };
        let mut processor =
            TypingProcessor::new(&profile, StrategyKind::Sentinel.build(), StdRng::seed_from_u64(3));
        let mut session = TypingSession::new(CancelFlag::default());
        processor
            .run("x;\nf({\n", &mut synth, &clock, &mut session, |_| {})
            .unwrap();
        assert_eq!(synth.host.text(), "x;\nf({\n");

        let &[after_semicolon, after_brace] = synth.gaps.as_slice() else {
            panic!("expected two Enter presses, got {:?}", synth.gaps);
        };
        assert!(after_semicolon >= *profile.char_delay.start() + *profile.punctuation_pause.start());
        assert!(after_brace >= *profile.char_delay.start());
    }

    #[test]
    fn test_empty_text() {
        let mut host = SimulatedEditor::new(AutoIndent::Fixed(4));
        let report = type_into(&mut host, "").unwrap();
        assert_eq!(report, RunReport::default());
        assert_eq!(host.primitive_count(), 0);
    }
}
