/// Appended to a line that had to be cut short.
pub const PLACEHOLDER: &str = " [...]";

/// Collapses runs of whitespace and fits `text` into `width` characters.
///
/// Text that fits is returned collapsed but otherwise unchanged. Otherwise as many whole
/// words as fit are kept and [`PLACEHOLDER`] is appended. When not even the first word fits
/// next to the placeholder, the placeholder alone is returned, trimmed to `width`.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(PLACEHOLDER.chars().count());
    let mut line = String::new();
    let mut len = 0;
    for word in words {
        let word_len = word.chars().count();
        let needed = if line.is_empty() { word_len } else { word_len + 1 };
        if len + needed > budget {
            break;
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
        len += needed;
    }

    if line.is_empty() {
        return PLACEHOLDER.trim_start().chars().take(width).collect();
    }
    line.push_str(PLACEHOLDER);
    line
}
