//! Text escaping and truncation for markup output.

/// Escape markdown link/emphasis characters so titles render literally.
pub fn escape_markdown(s: &str) -> String {
    s.replace('[', "\\[")
        .replace(']', "\\]")
        .replace('*', "\\*")
        .replace('_', "\\_")
}

/// Truncate a title to `max` characters, marking the cut with an ellipsis.
pub fn truncate_title(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

/// Escape HTML special characters for safe rendering.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown_all_four() {
        // No bracket, asterisk, or underscore survives unescaped.
        let escaped = escape_markdown("[a]*b*_c_");
        assert_eq!(escaped, "\\[a\\]\\*b\\*\\_c\\_");
        for (i, c) in escaped.char_indices() {
            if matches!(c, '[' | ']' | '*' | '_') {
                assert_eq!(&escaped[i - 1..i], "\\");
            }
        }
    }

    #[test]
    fn test_escape_markdown_plain_text_untouched() {
        assert_eq!(escape_markdown("plain title"), "plain title");
    }

    #[test]
    fn test_truncate_short_title_untouched() {
        assert_eq!(truncate_title("short", 50), "short");
    }

    #[test]
    fn test_truncate_long_title() {
        let long = "x".repeat(80);
        let truncated = truncate_title(&long, 50);
        assert_eq!(truncated.chars().count(), 50);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_is_character_safe() {
        let long = "ö".repeat(60);
        let truncated = truncate_title(&long, 50);
        assert_eq!(truncated.chars().count(), 50);
    }

    #[test]
    fn test_html_escape_basic() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("\"quoted\""), "&quot;quoted&quot;");
    }
}
