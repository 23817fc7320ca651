/// Nearest ATX heading at or above `line` (zero-based) in `content`.
/// An index past the last line scans the whole note.
pub fn nearest_heading(content: &str, line: usize) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return None;
    }

    let start = line.min(lines.len() - 1);
    lines[..=start].iter().rev().find_map(|candidate| heading_text(candidate))
}

/// Parse one line as an ATX heading: one or more `#` markers, whitespace,
/// then text. Returns the text with any embedded `#` characters removed.
/// `#tag` style lines have no whitespace after the markers and do not match.
fn heading_text(line: &str) -> Option<String> {
    let rest = line.trim_start_matches('#');
    if rest.len() == line.len() {
        return None;
    }
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }

    let text: String = rest.chars().filter(|&c| c != '#').collect();
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
