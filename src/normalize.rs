//! Leading-whitespace normalization
//!
//! Every line's leading run of spaces and tabs is rewritten to spaces only,
//! with each tab expanding to [`TAB_WIDTH`] spaces. Whitespace after the
//! first non-blank character is left as-is. Windows line endings are folded
//! to `\n`: a `\r` typed before Enter would land in the editor as a literal
//! character.

/// Spaces substituted for each leading tab
pub const TAB_WIDTH: usize = 4;

/// Normalize the leading whitespace of every `\n`-separated line.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line = line.trim_end_matches('\r');
        let content = line.trim_start_matches([' ', '\t']);
        let leading = &line[..line.len() - content.len()];
        for c in leading.chars() {
            match c {
                '\t' => out.extend(std::iter::repeat_n(' ', TAB_WIDTH)),
                _ => out.push(c),
            }
        }
        out.push_str(content);
    }

    out
}

/// Number of leading spaces at `offset`, counting only `' '`.
pub fn leading_spaces(chars: &[char], offset: usize) -> usize {
    chars
        .get(offset..)
        .map(|rest| rest.iter().take_while(|&&c| c == ' ').count())
        .unwrap_or(0)
}

/// Line count as shown in the preview: one more than the number of `\n`.
pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}
