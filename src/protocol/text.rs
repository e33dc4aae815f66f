//! Decoding of text (`0:`) payloads.
//!
//! The backend writes text fragments as loosely JSON-quoted strings. Decoding
//! is best-effort: escapes are expanded, then matching outer quotes are
//! peeled off as long as doing so cannot split an embedded quoted phrase.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

static ESCAPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn escape_pattern() -> &'static Regex {
    ESCAPE_PATTERN.get_or_init(|| Regex::new(r#"\\[nrt"]"#).expect("escape pattern is valid"))
}

/// Decode one line of text payload into the text it carries.
pub fn decode_text_payload(raw: &str) -> String {
    let unescaped = unescape(raw);
    let unwrapped = unwrap_quotes(&unescaped);
    // A lone quote is how the backend encodes a bare line break.
    if unwrapped == "\"" {
        return "\n".to_string();
    }
    unwrapped.to_string()
}

/// Expand `\n`, `\r`, `\t` and `\"`. Borrows when nothing needs expanding.
pub fn unescape(raw: &str) -> Cow<'_, str> {
    if !escape_pattern().is_match(raw) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t")
            .replace("\\\"", "\""),
    )
}

/// Strip matching layers of outer double quotes.
///
/// A value made only of quotes collapses to half as many quotes. Otherwise a
/// layer is removed only while its interior holds an even number of quotes;
/// an odd count means the outer quotes belong to embedded quoted text.
pub fn unwrap_quotes(value: &str) -> Cow<'_, str> {
    if value.chars().all(|c| c == '"') {
        return Cow::Owned("\"".repeat(value.len() / 2));
    }

    let mut result = value;
    while result.len() >= 2 && result.starts_with('"') && result.ends_with('"') {
        let inner = &result[1..result.len() - 1];
        if inner.matches('"').count() % 2 != 0 {
            break;
        }
        result = inner;
    }
    Cow::Borrowed(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(decode_text_payload("Hello"), "Hello");
        assert_eq!(decode_text_payload(""), "");
    }

    #[test]
    fn unescapes_known_sequences() {
        assert_eq!(unescape(r"a\nb\tc\rd"), "a\nb\tc\rd");
        assert_eq!(unescape(r#"say \"hi\""#), r#"say "hi""#);
        assert!(matches!(unescape("no escapes"), Cow::Borrowed(_)));
    }

    #[test]
    fn unknown_escapes_are_left_alone() {
        assert_eq!(unescape(r"C:\path\x"), r"C:\path\x");
    }

    #[test]
    fn strips_one_wrapping_layer() {
        assert_eq!(decode_text_payload(r#""Hello""#), "Hello");
        assert_eq!(decode_text_payload(r#"" world""#), " world");
    }

    #[test]
    fn strips_nested_layers_while_balanced() {
        assert_eq!(unwrap_quotes(r#"""inner"""#), "inner");
    }

    #[test]
    fn keeps_outer_quotes_when_interior_is_unbalanced() {
        // interior `he said "hi` has one quote, so the outer pair stays
        assert_eq!(unwrap_quotes(r#""he said "hi""#), r#""he said "hi""#);
    }

    #[test]
    fn unwraps_escaped_quoted_speech_once() {
        let decoded = decode_text_payload(r#""he said \"hi\"""#);
        assert_eq!(decoded, r#"he said "hi""#);
    }

    #[test]
    fn all_quotes_collapse_to_half() {
        assert_eq!(unwrap_quotes(r#""""""#), r#""""#);
        assert_eq!(unwrap_quotes(r#""""#), r#"""#);
        assert_eq!(unwrap_quotes(r#"""""#), r#"""#);
    }

    #[test]
    fn lone_quote_becomes_newline() {
        assert_eq!(decode_text_payload(r#""""#), "\n");
        assert_eq!(decode_text_payload(r#"""""#), "\n");
        assert_eq!(decode_text_payload(r#"""#), "");
    }

    #[test]
    fn escaped_newline_inside_quotes() {
        assert_eq!(decode_text_payload(r#""line one\nline two""#), "line one\nline two");
    }
}
