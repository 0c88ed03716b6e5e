//! General string helpers.
//!
//! Descriptor names are compared either ordinally or with ASCII case folding
//! depending on the descriptor, so most helpers take a `case_sensitive` flag.

use compact_str::CompactString;

/// Compare two strings, ordinally or ignoring ASCII case.
#[inline]
pub fn str_eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

/// `s.starts_with(prefix)`, optionally ignoring ASCII case.
#[inline]
pub fn str_starts_with(s: &str, prefix: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        return s.starts_with(prefix);
    }
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// `s.ends_with(suffix)`, optionally ignoring ASCII case.
#[inline]
pub fn str_ends_with(s: &str, suffix: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        return s.ends_with(suffix);
    }
    s.len() >= suffix.len()
        && s.as_bytes()[s.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

/// Strip every leading and trailing `"`.
#[inline]
pub fn trim_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

/// Render `s` as a double-quoted target-language string literal.
pub fn to_string_literal(s: &str) -> CompactString {
    let mut out = CompactString::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_prefix() {
        assert!(str_starts_with("BIND-value", "bind-", false));
        assert!(!str_starts_with("BIND-value", "bind-", true));
        assert!(!str_starts_with("bi", "bind-", false));
    }

    #[test]
    fn test_suffix() {
        assert!(str_ends_with("form.css", ".CSS", false));
        assert!(!str_ends_with("form.css", ".CSS", true));
    }

    #[test]
    fn test_trim_quotes() {
        assert_eq!(trim_quotes("\"oninput\""), "oninput");
        assert_eq!(trim_quotes("oninput"), "oninput");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(to_string_literal("N2"), "\"N2\"");
        assert_eq!(to_string_literal(r#"a"b"#), r#""a\"b""#);
    }
}
