//! Console prompts and status output
//!
//! Plain line-based I/O: nothing here feeds back into the core except the
//! chosen timing mode and the go/no-go answer.

use crate::error::TypingError;
use crate::normalize::line_count;
use crate::stats::RunReport;
use crate::timing::{Clock, TimingMode};
use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use std::time::Duration;

const RULE_WIDTH: usize = 50;

pub struct Console<R, W> {
    input: R,
    output: W,
    progress_error: Option<io::Error>,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

/// First `max_chars` characters of `text`, with `...` when cut
pub fn preview_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            progress_error: None,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_answer(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_lowercase())
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", "retype - clipboard to keystrokes".bold())?;
        writeln!(self.output, "{}", "=".repeat(RULE_WIDTH + 10))
    }

    pub fn reading_from(&mut self, source: &str) -> io::Result<()> {
        writeln!(self.output, "Reading from {}...", source)
    }

    pub fn preview(&mut self, text: &str, max_chars: usize) -> io::Result<()> {
        writeln!(self.output, "Content length: {} characters", text.chars().count())?;
        writeln!(self.output, "Number of lines: {}", line_count(text))?;
        writeln!(self.output, "\nPreview (first {} chars):", max_chars)?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(self.output, "{}", preview_excerpt(text, max_chars))?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))
    }

    /// Yes/no question; only `y` or `yes` counts as yes
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "\n{} (y/n): ", question)?;
        self.output.flush()?;
        let answer = self.read_answer()?;
        Ok(answer == "y" || answer == "yes")
    }

    /// Timing menu. Empty or unrecognized input picks the default preset.
    pub fn select_mode(&mut self) -> io::Result<TimingMode> {
        writeln!(self.output, "\nTiming mode:")?;
        for (i, mode) in TimingMode::ALL.iter().enumerate() {
            let marker = if *mode == TimingMode::default() {
                " (default)"
            } else {
                ""
            };
            writeln!(
                self.output,
                "  {}. {:<10} {}{}",
                i + 1,
                mode.to_string(),
                mode.description(),
                marker
            )?;
        }
        write!(self.output, "Choose 1-4 [Enter for default]: ")?;
        self.output.flush()?;

        let answer = self.read_answer()?;
        let mode = TimingMode::from_choice(&answer).unwrap_or_default();
        if !answer.is_empty() && TimingMode::from_choice(&answer).is_none() {
            writeln!(self.output, "Unrecognized choice, using {}", mode)?;
        }
        Ok(mode)
    }

    pub fn countdown(&mut self, secs: u64, clock: &dyn Clock) -> io::Result<()> {
        if secs == 0 {
            return Ok(());
        }
        writeln!(self.output, "Starting in {} seconds...", secs)?;
        for i in (1..=secs).rev() {
            write!(self.output, "{}... ", i)?;
            self.output.flush()?;
            clock.sleep(Duration::from_secs(1));
        }
        writeln!(
            self.output,
            "\n{}",
            "Typing started! Switch to your target window now.".yellow()
        )
    }

    pub fn progress(&mut self, typed: usize, total: usize) -> io::Result<()> {
        write!(self.output, "\r\x1b[K{}", format!("{}/{}", typed, total).dark_grey())?;
        self.output.flush()
    }

    /// Progress from inside a run, which cannot stop for the terminal. The
    /// first write error is kept and further updates are skipped.
    pub fn track_progress(&mut self, typed: usize, total: usize) {
        if self.progress_error.is_none() {
            self.progress_error = self.progress(typed, total).err();
        }
    }

    pub fn take_progress_error(&mut self) -> Option<io::Error> {
        self.progress_error.take()
    }

    /// Buffer left in the simulated editor. `estimate` is set only when the
    /// run finished, since a partial run has nothing to compare.
    pub fn dry_run_result(
        &mut self,
        source: &str,
        typed: &str,
        estimate: Option<Duration>,
    ) -> io::Result<()> {
        writeln!(self.output, "\nSimulated editor contents:")?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(self.output, "{}", typed)?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        if let Some(estimate) = estimate {
            if typed == source {
                writeln!(self.output, "{}", "Matches the source exactly.".green())?;
            } else {
                writeln!(self.output, "{}", "Differs from the source.".red())?;
            }
            writeln!(
                self.output,
                "Estimated typing time: {:.1}s",
                estimate.as_secs_f64()
            )?;
        }
        Ok(())
    }

    pub fn cancelled(&mut self) -> io::Result<()> {
        writeln!(self.output, "Cancelled.")
    }

    pub fn finished(&mut self, report: &RunReport) -> io::Result<()> {
        writeln!(self.output, "\n{}", "✓ Typing completed!".green())?;
        writeln!(self.output, "{}", report.summary().dark_grey())
    }

    /// Terminal status for a failed run
    pub fn failed(&mut self, error: &TypingError, typed: usize, total: usize) -> io::Result<()> {
        match error {
            TypingError::Cancelled => {
                writeln!(self.output, "\n\n{}", "Typing interrupted by user.".yellow())?;
            }
            TypingError::Synthesis(_) => {
                writeln!(self.output, "\n\n{}", format!("Error during typing: {}", error).red())?;
                writeln!(
                    self.output,
                    "Try again with a slower timing mode (--mode safe or --mode ultra-safe)."
                )?;
            }
            _ => {
                writeln!(self.output, "{}", error.to_string().red())?;
            }
        }
        if error.left_partial_output() {
            writeln!(
                self.output,
                "{} of {} characters were typed and remain in the editor.",
                typed, total
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::RecordingClock;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(c: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(c.into_output()).unwrap()
    }

    #[test]
    fn test_preview_excerpt() {
        assert_eq!(preview_excerpt("abc", 5), "abc");
        assert_eq!(preview_excerpt("abcdef", 3), "abc...");
        assert_eq!(preview_excerpt("äöü", 2), "äö...");
        assert_eq!(preview_excerpt("abc", 3), "abc");
    }

    #[test]
    fn test_preview_counts() {
        let mut c = console("");
        c.preview("a\nb\n", 200).unwrap();
        let out = output(c);
        assert!(out.contains("Content length: 4 characters"));
        assert!(out.contains("Number of lines: 3"));
    }

    #[test]
    fn test_confirm() {
        assert!(console("y\n").confirm("Go?").unwrap());
        assert!(console("YES\n").confirm("Go?").unwrap());
        assert!(!console("n\n").confirm("Go?").unwrap());
        assert!(!console("").confirm("Go?").unwrap());
    }

    #[test]
    fn test_select_mode() {
        assert_eq!(console("1\n").select_mode().unwrap(), TimingMode::Fast);
        assert_eq!(console("4\n").select_mode().unwrap(), TimingMode::UltraSafe);
        assert_eq!(console("\n").select_mode().unwrap(), TimingMode::Normal);

        let mut c = console("9\n");
        assert_eq!(c.select_mode().unwrap(), TimingMode::Normal);
        assert!(output(c).contains("Unrecognized choice"));
    }

    #[test]
    fn test_countdown_uses_clock() {
        let clock = RecordingClock::new();
        let mut c = console("");
        c.countdown(3, &clock).unwrap();
        assert_eq!(clock.elapsed(), Duration::from_secs(3));
        assert!(output(c).contains("3... 2... 1..."));
    }

    #[test]
    fn test_dry_run_result() {
        let mut c = console("");
        c.dry_run_result("a\n  b", "a\n  b", Some(Duration::from_millis(1500)))
            .unwrap();
        let out = output(c);
        assert!(out.contains("Matches the source exactly."));
        assert!(out.contains("Estimated typing time: 1.5s"));

        let mut c = console("");
        c.dry_run_result("abc", "ab", Some(Duration::ZERO)).unwrap();
        assert!(output(c).contains("Differs from the source."));

        let mut c = console("");
        c.dry_run_result("abc", "a", None).unwrap();
        let out = output(c);
        assert!(out.contains("Simulated editor contents:"));
        assert!(!out.contains("Estimated"));
    }

    /// Accepts `budget` bytes, then fails every write.
    struct Broken {
        budget: usize,
        writes: usize,
    }

    impl Write for Broken {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            if buf.len() > self.budget {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.budget -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_progress_error_is_kept_not_dropped() {
        let mut c = Console::new(io::empty(), Broken { budget: 0, writes: 0 });
        c.track_progress(1, 3);
        c.track_progress(2, 3);
        c.track_progress(3, 3);
        let err = c.take_progress_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(c.take_progress_error().is_none());
        assert_eq!(c.into_output().writes, 1);
    }

    #[test]
    fn test_progress_tracking_writes() {
        let mut c = console("");
        c.track_progress(2, 5);
        assert!(c.take_progress_error().is_none());
        assert!(output(c).contains("2/5"));
    }

    #[test]
    fn test_reading_from() {
        let mut c = console("");
        c.reading_from("clipboard").unwrap();
        assert_eq!(output(c), "Reading from clipboard...\n");
    }

    #[test]
    fn test_failure_messages() {
        let mut c = console("");
        c.failed(&TypingError::Cancelled, 5, 10).unwrap();
        let out = output(c);
        assert!(out.contains("interrupted"));
        assert!(out.contains("5 of 10"));

        let mut c = console("");
        c.failed(&TypingError::Synthesis("x".into()), 0, 10).unwrap();
        assert!(output(c).contains("slower timing mode"));

        let mut c = console("");
        c.failed(&TypingError::EmptyClipboard, 0, 0).unwrap();
        let out = output(c);
        assert!(out.contains("Clipboard is empty"));
        assert!(!out.contains("remain in the editor"));
    }
}
