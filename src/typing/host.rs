//! Simulated host editor
//!
//! A single-cursor text buffer that reacts to keystrokes the way browser code
//! editors do: it auto-indents after Enter and auto-closes brackets and
//! quotes. Used by `--dry-run` and by the tests, since a real host cannot be
//! read back.

use super::input::{HostKey, InputSynthesizer, Modifier};
use crate::error::TypingError;
use crate::normalize::TAB_WIDTH;

/// How many spaces the host injects after each Enter
#[derive(Debug, Clone, PartialEq)]
pub enum AutoIndent {
    /// Never indents
    None,
    /// Always indents by the same width
    Fixed(usize),
    /// Width for the n-th Enter; zero once the script runs out
    Script(Vec<usize>),
    /// Copies the current line's indentation, one level deeper after a
    /// line ending in `:` or an opening bracket
    Mirror,
}

/// One primitive received by the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Key(HostKey),
    Hold(Modifier),
    Release(Modifier),
    Text(String),
}

pub struct SimulatedEditor {
    buffer: Vec<char>,
    cursor: usize,
    anchor: Option<usize>,
    held: Vec<Modifier>,
    auto_indent: AutoIndent,
    auto_close: bool,
    enters: usize,
    events: Vec<HostEvent>,
    fail_after: Option<usize>,
}

fn closer_for(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}

impl SimulatedEditor {
    pub fn new(auto_indent: AutoIndent) -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
            anchor: None,
            held: Vec::new(),
            auto_indent,
            auto_close: true,
            enters: 0,
            events: Vec::new(),
            fail_after: None,
        }
    }

    pub fn with_auto_close(mut self, enabled: bool) -> Self {
        self.auto_close = enabled;
        self
    }

    /// Make every primitive after the first `n` fail
    pub fn with_failure_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn primitive_count(&self) -> usize {
        self.events.len()
    }

    pub fn key_presses(&self, key: HostKey) -> usize {
        self.events
            .iter()
            .filter(|e| **e == HostEvent::Key(key))
            .count()
    }

    fn record(&mut self, event: HostEvent) -> Result<(), TypingError> {
        if self.fail_after.is_some_and(|n| self.events.len() >= n) {
            return Err(TypingError::Synthesis(format!(
                "host rejected {:?}",
                event
            )));
        }
        self.events.push(event);
        Ok(())
    }

    fn holding(&self, modifier: Modifier) -> bool {
        self.held.contains(&modifier)
    }

    fn line_start(&self, pos: usize) -> usize {
        self.buffer[..pos]
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1)
    }

    /// Removes the active selection. Returns false when nothing was selected.
    fn delete_selection(&mut self) -> bool {
        match self.anchor.take() {
            Some(anchor) if anchor != self.cursor => {
                let (lo, hi) = (anchor.min(self.cursor), anchor.max(self.cursor));
                self.buffer.drain(lo..hi);
                self.cursor = lo;
                true
            }
            _ => false,
        }
    }

    fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn type_char(&mut self, c: char) {
        self.delete_selection();
        let next = self.buffer.get(self.cursor).copied();

        if self.auto_close {
            if matches!(c, ')' | ']' | '}' | '"' | '\'') && next == Some(c) {
                self.cursor += 1;
                return;
            }
            if let Some(closer) = closer_for(c) {
                self.insert_char(c);
                self.buffer.insert(self.cursor, closer);
                return;
            }
        }
        self.insert_char(c);
    }

    fn indent_width(&mut self) -> usize {
        let n = self.enters;
        self.enters += 1;
        match &self.auto_indent {
            AutoIndent::None => 0,
            AutoIndent::Fixed(w) => *w,
            AutoIndent::Script(widths) => widths.get(n).copied().unwrap_or(0),
            AutoIndent::Mirror => {
                let start = self.line_start(self.cursor);
                let line = &self.buffer[start..self.cursor];
                let current = line.iter().take_while(|&&c| c == ' ').count();
                let deeper = line
                    .iter()
                    .rev()
                    .find(|c| !c.is_whitespace())
                    .is_some_and(|c| matches!(c, ':' | '{' | '(' | '['));
                if deeper { current + TAB_WIDTH } else { current }
            }
        }
    }

    fn move_to(&mut self, target: usize) {
        if self.holding(Modifier::Shift) {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = target;
    }

    fn apply_key(&mut self, key: HostKey) {
        match key {
            HostKey::Enter => {
                self.delete_selection();
                let width = self.indent_width();
                self.insert_char('\n');
                for _ in 0..width {
                    self.insert_char(' ');
                }
            }
            HostKey::Space => {
                self.delete_selection();
                self.insert_char(' ');
            }
            HostKey::Delete => {
                if !self.delete_selection() && self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
            }
            HostKey::Backspace => {
                if !self.delete_selection() && self.cursor > 0 {
                    self.cursor -= 1;
                    self.buffer.remove(self.cursor);
                }
            }
            HostKey::Home => self.move_to(self.line_start(self.cursor)),
            HostKey::Left => {
                let target = if self.holding(Modifier::Meta) {
                    self.line_start(self.cursor)
                } else {
                    self.cursor.saturating_sub(1)
                };
                self.move_to(target);
            }
        }
    }
}

impl InputSynthesizer for SimulatedEditor {
    fn press_key(&mut self, key: HostKey) -> Result<(), TypingError> {
        self.record(HostEvent::Key(key))?;
        self.apply_key(key);
        Ok(())
    }

    fn hold_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError> {
        self.record(HostEvent::Hold(modifier))?;
        if !self.holding(modifier) {
            self.held.push(modifier);
        }
        Ok(())
    }

    fn release_modifier(&mut self, modifier: Modifier) -> Result<(), TypingError> {
        self.record(HostEvent::Release(modifier))?;
        self.held.retain(|m| *m != modifier);
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), TypingError> {
        self.record(HostEvent::Text(text.to_string()))?;
        for c in text.chars() {
            self.type_char(c);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_close_pairs() {
        let mut host = SimulatedEditor::new(AutoIndent::None);
        host.insert_text("(").unwrap();
        assert_eq!(host.text(), "()");
        assert_eq!(host.cursor(), 1);
        host.insert_text(")").unwrap();
        assert_eq!(host.text(), "()");
        assert_eq!(host.cursor(), 2);
    }

    #[test]
    fn test_mirror_indent() {
        let mut host = SimulatedEditor::new(AutoIndent::Mirror);
        host.insert_text("if x:").unwrap();
        host.press_key(HostKey::Enter).unwrap();
        assert_eq!(host.text(), "if x:\n    ");
        host.insert_text("y").unwrap();
        host.press_key(HostKey::Enter).unwrap();
        assert_eq!(host.text(), "if x:\n    y\n    ");
    }

    #[test]
    fn test_script_indent_runs_out() {
        let mut host = SimulatedEditor::new(AutoIndent::Script(vec![2]));
        host.press_key(HostKey::Enter).unwrap();
        host.press_key(HostKey::Enter).unwrap();
        assert_eq!(host.text(), "\n  \n");
    }

    #[test]
    fn test_shift_home_selects_to_line_start() {
        let mut host = SimulatedEditor::new(AutoIndent::Fixed(3));
        host.insert_text("a").unwrap();
        host.press_key(HostKey::Enter).unwrap();
        host.select_to_line_start().unwrap();
        host.press_key(HostKey::Backspace).unwrap();
        assert_eq!(host.text(), "a\n");
    }

    #[test]
    fn test_backspace_with_empty_selection_eats_newline() {
        let mut host = SimulatedEditor::new(AutoIndent::None);
        host.insert_text("a").unwrap();
        host.press_key(HostKey::Enter).unwrap();
        host.select_to_line_start().unwrap();
        host.press_key(HostKey::Backspace).unwrap();
        assert_eq!(host.text(), "a");
    }

    #[test]
    fn test_meta_left_selects_to_line_start() {
        let mut host = SimulatedEditor::new(AutoIndent::None);
        host.insert_text("ab").unwrap();
        host.chord(&[Modifier::Meta, Modifier::Shift], HostKey::Left)
            .unwrap();
        host.press_key(HostKey::Delete).unwrap();
        assert_eq!(host.text(), "");
    }

    #[test]
    fn test_plain_left_moves_one() {
        let mut host = SimulatedEditor::new(AutoIndent::None);
        host.insert_text("ab").unwrap();
        host.press_key(HostKey::Left).unwrap();
        host.press_key(HostKey::Delete).unwrap();
        assert_eq!(host.text(), "a");
    }

    #[test]
    fn test_failure_after() {
        let mut host = SimulatedEditor::new(AutoIndent::None).with_failure_after(1);
        assert!(host.insert_text("a").is_ok());
        assert!(matches!(
            host.press_key(HostKey::Space),
            Err(TypingError::Synthesis(_))
        ));
        assert_eq!(host.text(), "a");
    }
}
