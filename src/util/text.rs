use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
/// Display width of the ellipsis (3 columns for ASCII "...")
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to at most `max_chars` characters, on a char boundary.
///
/// Used for the long-form content excerpt in the normalizer: raw `content`
/// fields can be full article bodies, so only a leading slice is kept for
/// display. No ellipsis is appended — the caller decides how the excerpt is
/// presented.
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((byte_end, _)) => Cow::Owned(s[..byte_end].to_string()),
        None => Cow::Borrowed(s),
    }
}

/// Builds an excerpt from the first `max_words` whitespace-separated words.
///
/// Appends "..." when words were dropped. Used as the last-resort description
/// fallback: a title-derived excerpt is better than an empty card body.
pub fn excerpt_words(s: &str, max_words: usize) -> String {
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    let mut excerpt = words[..max_words].join(" ");
    excerpt.push_str(ELLIPSIS);
    excerpt
}

/// Truncates a string to fit within a maximum display width, appending "..."
/// when text was cut off.
///
/// Unicode-aware: CJK characters and emoji count as 2 columns, zero-width
/// characters as 0. Render-path helper for list rows and the status line.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    // Width too narrow for content plus ellipsis: return what fits, bare.
    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut byte_end = 0;
    let mut current_width = 0;
    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
        if current_width + char_width > budget {
            break;
        }
        current_width += char_width;
        byte_end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..byte_end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..byte_end], ELLIPSIS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input_borrowed() {
        assert_eq!(truncate_chars("hello", 280), "hello");
        assert!(matches!(truncate_chars("hello", 280), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_chars_cuts_on_char_boundary() {
        // Multi-byte characters must not be split mid-sequence
        let s = "ανάλυση αγοράς";
        let cut = truncate_chars(s, 7);
        assert_eq!(cut, "ανάλυση");
    }

    #[test]
    fn test_truncate_chars_exact_length() {
        assert_eq!(truncate_chars("abcd", 4), "abcd");
        assert_eq!(truncate_chars("abcd", 3), "abc");
    }

    #[test]
    fn test_excerpt_words_no_truncation() {
        assert_eq!(excerpt_words("one two three", 28), "one two three");
    }

    #[test]
    fn test_excerpt_words_truncates_with_ellipsis() {
        assert_eq!(excerpt_words("one two three four", 2), "one two...");
    }

    #[test]
    fn test_excerpt_words_collapses_whitespace() {
        assert_eq!(excerpt_words("  one   two  ", 28), "one two");
    }

    #[test]
    fn test_excerpt_words_empty() {
        assert_eq!(excerpt_words("", 28), "");
    }

    #[test]
    fn test_truncate_to_width_fits() {
        assert_eq!(truncate_to_width("Short", 10), "Short");
    }

    #[test]
    fn test_truncate_to_width_appends_ellipsis() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_to_width_narrow() {
        assert_eq!(truncate_to_width("Test", 0), "");
        assert_eq!(truncate_to_width("Test", 1), "T");
        assert_eq!(truncate_to_width("Test", 3), "Tes");
    }

    #[test]
    fn test_truncate_to_width_cjk() {
        // Each CJK char is 2 columns wide
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
    }
}
