//! Summary extraction from rendered document bodies.

/// Default character budget of a brief.
pub const DEFAULT_BRIEF_LENGTH: usize = 512;

const PARAGRAPH_OPEN: &str = "<p>";
const PARAGRAPH_CLOSE: &str = "</p>";

/// Extract a summary of the first `<p>` paragraph of `html`.
///
/// At most `budget` characters are copied. A paragraph whose close tag is
/// reached before the budget is returned as is. Once the budget is reached
/// the text is cut back to the last whole word, loses one trailing period
/// and gets an ellipsis. Returns an empty string when the markup has no
/// paragraph.
pub fn brief(html: &str, budget: usize) -> String {
    let Some(start) = html.find(PARAGRAPH_OPEN) else {
        return String::new();
    };
    let body = &html[start + PARAGRAPH_OPEN.len()..];

    let mut captured = String::new();
    let mut count = 0;
    for (offset, ch) in body.char_indices() {
        if body[offset..].starts_with(PARAGRAPH_CLOSE) {
            return captured;
        }
        captured.push(ch);
        count += 1;
        if count >= budget {
            return cut_at_word(captured);
        }
    }

    // Unterminated paragraph
    captured
}

fn cut_at_word(mut text: String) -> String {
    match text.rfind(' ') {
        Some(pos) => text.truncate(pos),
        None => text.clear(),
    }
    if text.ends_with('.') {
        text.pop();
    }
    text.push('\u{2026}');
    text
}
