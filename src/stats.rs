//! Summary of a typing run

use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    /// Source characters typed, newlines and indentation included
    pub chars_typed: usize,
    /// Newlines reconciled
    pub newlines: usize,
    /// Indentation spaces retyped after newlines
    pub indent_spaces: usize,
    /// Auto-closed pairs neutralized with delete-forward
    pub pairs_neutralized: usize,
    /// Time spent waiting on the clock (simulated in dry runs)
    pub elapsed: Duration,
}

impl RunReport {
    pub fn lines(&self) -> usize {
        self.newlines + 1
    }

    /// Characters per minute over `elapsed`
    pub fn cpm(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.chars_typed as f64 * 60.0 / secs
    }

    pub fn summary(&self) -> String {
        format!(
            "{} chars, {} lines, {} indent spaces retyped, {} pairs neutralized in {:.1}s (~{:.0} cpm)",
            self.chars_typed,
            self.lines(),
            self.indent_spaces,
            self.pairs_neutralized,
            self.elapsed.as_secs_f64(),
            self.cpm()
        )
    }
}
