//! Fixed-budget word wrapping used for both rendering and height estimates.

use super::theme::ENTRY_PADDING;

/// Wraps `text` into lines of at most `max_chars` characters, breaking on
/// whitespace. Words longer than the budget get a line of their own and are
/// never hyphenated or truncated. Blank input yields no lines.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn line_count(text: &str, max_chars: usize) -> usize {
    wrap_text(text, max_chars).len()
}

/// Height of a block of `lines` lines plus the fixed entry padding.
pub fn block_height(lines: usize, line_height: f32) -> f32 {
    lines as f32 * line_height + ENTRY_PADDING
}

pub fn height_of(text: &str, max_chars: usize, line_height: f32) -> f32 {
    block_height(line_count(text, max_chars), line_height)
}
