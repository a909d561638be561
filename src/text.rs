// ✂️ Label wrapping for chart tiles

/// Line-break marker understood by the chart renderers
pub const LINE_BREAK: &str = "<br>";

/// Greedily pack whitespace-delimited words into lines of at most `width`
/// characters. A word longer than `width` gets a line of its own, unsplit.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// `wrap_lines` joined with the line-break marker
pub fn wrap_text(text: &str, width: usize) -> String {
    wrap_lines(text, width).join(LINE_BREAK)
}
