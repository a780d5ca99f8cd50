use crate::defaults::URI_ATTRIBUTES;
use crate::patterns::{attr_whitespace_regex, is_allowed_uri_regex, is_script_or_data_regex};
use crate::policy::Policy;

/// Whether `value` is an acceptable reference for attribute `lc_name` on `lc_tag`.
///
/// The value is compared with all whitespace-like characters removed, so `java\tscript:` is
/// judged as `javascript:`.
pub(crate) fn is_acceptable(policy: &Policy, lc_tag: &str, lc_name: &str, value: &str) -> bool {
    if URI_ATTRIBUTES.contains(&lc_name) && has_ambiguous_encoding(value) {
        tracing::trace!(attr = %lc_name, "rejecting ambiguously encoded uri");
        return false;
    }

    let compact = attr_whitespace_regex().replace_all(value, "");
    let scheme_ok = match &policy.allowed_uri_regexp {
        Some(pattern) => pattern.is_match(&compact),
        None => is_allowed_uri_regex().is_match(&compact),
    };
    if scheme_ok {
        return true;
    }

    if matches!(lc_name, "src" | "xlink:href" | "href")
        && lc_tag != "script"
        && value.starts_with("data:")
        && policy.data_uri_tags.contains(lc_tag)
    {
        return true;
    }

    if policy.allow_unknown_protocols && !is_script_or_data_regex().is_match(&compact) {
        return true;
    }

    value.is_empty()
}

/// Raw control characters (other than HTML whitespace), malformed `%` escapes and `%00`.
pub(crate) fn has_ambiguous_encoding(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\t' | b'\n' | b'\x0C' | b'\r' => {}
            0x00..=0x1F | 0x7F => return true,
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(from_hex_byte);
                let lo = bytes.get(i + 2).copied().and_then(from_hex_byte);
                match (hi, lo) {
                    (Some(0), Some(0)) => return true,
                    (Some(_), Some(_)) => i += 2,
                    _ => return true,
                }
            }
            _ => {}
        }
        i += 1;
    }
    false
}

fn from_hex_byte(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, UriPattern};

    fn check(policy: &Policy, tag: &str, name: &str, value: &str) -> bool {
        is_acceptable(policy, tag, name, value)
    }

    #[test]
    fn default_pattern_rejects_script_schemes_even_with_whitespace() {
        let policy = Config::default().resolve();
        assert!(check(&policy, "a", "href", "https://example.com"));
        assert!(check(&policy, "a", "href", "/relative?x=1"));
        assert!(!check(&policy, "a", "href", "javascript:alert(1)"));
        assert!(!check(&policy, "a", "href", " java\tscript:alert(1)"));
        assert!(!check(&policy, "a", "href", "JaVaScRiPt:alert(1)"));
        assert!(check(&policy, "a", "href", ""));
    }

    #[test]
    fn data_uris_are_limited_to_data_uri_tags() {
        let policy = Config::default().resolve();
        assert!(check(&policy, "img", "src", "data:image/png;base64,AAAA"));
        assert!(!check(&policy, "a", "href", "data:text/html,<b>x</b>"));
        assert!(!check(&policy, "script", "src", "data:text/javascript,x"));
    }

    #[test]
    fn unknown_protocols_are_opt_in_but_never_script() {
        let policy = Config {
            allow_unknown_protocols: true,
            ..Config::default()
        }
        .resolve();
        assert!(check(&policy, "a", "href", "myapp:open"));
        assert!(!check(&policy, "a", "href", "vbscript:x"));
        assert!(!check(&policy, "a", "href", "data:text/html,x"));
    }

    #[test]
    fn caller_pattern_replaces_the_default() {
        let policy = Config {
            allowed_uri_regexp: Some(UriPattern::new(r"^https:").unwrap()),
            ..Config::default()
        }
        .resolve();
        assert!(check(&policy, "a", "href", "https://a"));
        assert!(!check(&policy, "a", "href", "/relative"));
        assert!(!check(&policy, "a", "href", "mailto:x@y"));
    }

    #[test]
    fn ambiguous_encodings_are_rejected() {
        assert!(has_ambiguous_encoding("a%zzb"));
        assert!(has_ambiguous_encoding("trailing%"));
        assert!(has_ambiguous_encoding("nul%00byte"));
        assert!(has_ambiguous_encoding("bell\u{7}"));
        assert!(!has_ambiguous_encoding("a%20b%2Fc"));
        assert!(!has_ambiguous_encoding("line\nbreak"));

        let policy = Config::default().resolve();
        assert!(!check(&policy, "a", "href", "/path%0"));
        assert!(check(&policy, "a", "href", "/path%20x"));
    }
}
