//! Line reflow: re-wrap text so no line exceeds a fixed width
//!
//! Width is counted in characters (Unicode scalar values), not display
//! columns. Lines are only ever split, never merged: every input line break
//! survives, and a line already within the limit passes through verbatim.

/// Maximum output line width used for converted text
pub const LINE_WIDTH: usize = 40;

/// Reflow every line of `text` to at most `max_width` characters.
///
/// Long lines break at the last whitespace at or before `max_width`; when
/// there is none (or only at position 0) the line is hard-cut at
/// `max_width`. The remainder is trimmed before the next pass.
/// A `max_width` of 0 is treated as 1.
pub fn reflow(text: &str, max_width: usize) -> String {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for line in text.split('\n') {
        reflow_line(line, max_width, &mut lines);
    }

    lines.join("\n")
}

fn reflow_line(line: &str, max_width: usize, out: &mut Vec<String>) {
    let chars: Vec<char> = line.chars().collect();
    let mut start = 0;
    let mut end = chars.len();

    while end - start > max_width {
        // end - start > max_width, so start + max_width is in bounds
        let break_at = chars[start..=start + max_width]
            .iter()
            .rposition(|c| c.is_whitespace())
            .filter(|&pos| pos > 0)
            .unwrap_or(max_width);

        out.push(chars[start..start + break_at].iter().collect());
        start += break_at;

        // Remainder is trimmed on both ends
        while end > start && chars[end - 1].is_whitespace() {
            end -= 1;
        }
        while start < end && chars[start].is_whitespace() {
            start += 1;
        }
    }

    out.push(chars[start..end].iter().collect());
}

/// Whether every line of `text` already fits in `max_width` characters
pub fn fits_width(text: &str, max_width: usize) -> bool {
    text.split('\n').all(|line| line.chars().count() <= max_width)
}
