use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use deckgene::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Strip characters that are not allowed anywhere in an XML 1.0 document.
///
/// Outline text comes from an external generator and may carry stray control
/// characters; a single one would make the whole part unreadable.
pub fn sanitize_text(s: &str) -> String {
    s.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_all_entities() {
        assert_eq!(escape_xml("'&'"), "&apos;&amp;&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_sanitize_drops_control_chars() {
        assert_eq!(sanitize_text("a\u{0}b\u{7}c\td"), "abc\td");
        assert_eq!(sanitize_text("ünï ✓"), "ünï ✓");
    }
}
