//! Text normalisation helpers shared by checks and stores.

/// Collapses runs of whitespace to single spaces and trims both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalises text for case- and whitespace-insensitive comparison.
#[must_use]
pub fn normalize_key(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Returns true for text that is empty once whitespace is removed, or that
/// consists only of punctuation such as `---`, `___`, or `...`.
#[must_use]
pub fn is_placeholder_text(text: &str) -> bool {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .all(is_placeholder_char)
}

fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{2010}'..='\u{2027}' | '\u{00a0}' | '\u{00b7}' | '\u{00ab}' | '\u{00bb}'
        )
}

/// Counts whitespace-separated words containing at least one alphanumeric
/// character.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Truncates `text` to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_and_normalize() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(normalize_key("  A  Cat\n"), "a cat");
    }

    #[test]
    fn placeholders() {
        assert!(is_placeholder_text(""));
        assert!(is_placeholder_text("   "));
        assert!(is_placeholder_text("---"));
        assert!(is_placeholder_text("_ _ _"));
        assert!(is_placeholder_text("\u{2014}\u{2026}"));
        assert!(!is_placeholder_text("Go"));
        assert!(!is_placeholder_text("- 1 -"));
    }

    #[test]
    fn counts_words() {
        assert_eq!(word_count("one two  three -- four"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
