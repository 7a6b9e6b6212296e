//! Text helpers for prompt rendering.

/// Clip `s` to at most `max_chars` characters, appending a marker when cut.
///
/// Counts characters, not bytes, so multi-byte text is never split.
pub fn clip(s: &str, max_chars: usize) -> String {
    const MARKER: &str = " [...]";

    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(MARKER.chars().count());
    let mut out: String = s.chars().take(keep).collect();
    out.push_str(MARKER);
    out
}

/// Collapse all whitespace runs (including newlines) into single spaces
pub fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_short_text_untouched() {
        assert_eq!(clip("hello", 10), "hello");
    }

    #[test]
    fn test_clip_long_text() {
        let clipped = clip("abcdefghijklmnopqrstuvwxyz", 12);
        assert_eq!(clipped, "abcdef [...]");
        assert_eq!(clipped.chars().count(), 12);
    }

    #[test]
    fn test_clip_multibyte() {
        let clipped = clip("日本語のテキストです。とても長い", 10);
        assert!(clipped.starts_with("日本語の"));
        assert!(clipped.ends_with("[...]"));
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("a\n  b\tc \n"), "a b c");
    }
}
