use regex::Regex;
use std::sync::OnceLock;

pub(crate) fn data_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^data-[\-\w.\u{00B7}-\u{FFFF}]+$").expect("valid regex"))
}

pub(crate) fn aria_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^aria-[\-\w]+$").expect("valid regex"))
}

pub(crate) fn attr_whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\u{0000}-\u{0020}\u{00A0}\u{1680}\u{180E}\u{2000}-\u{2029}\u{205F}\u{3000}]")
            .expect("valid regex")
    })
}

pub(crate) fn is_allowed_uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:(?:(?:f|ht)tps?|mailto|tel|callto|sms|cid|xmpp):|[^a-z]|[a-z+.\-]+(?:[^a-z+.\-:]|$))")
            .expect("valid regex")
    })
}

pub(crate) fn is_script_or_data_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:\w+script|data):").expect("valid regex"))
}

pub(crate) fn custom_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[a-z][.\w]*(-[.\w]+)+$").expect("valid regex"))
}

/// Template expressions rewritten to a single space in template-safe mode.
pub(crate) fn template_expr_regexes() -> &'static [Regex; 3] {
    static RE: OnceLock<[Regex; 3]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"\{\{[\s\S]*|[\s\S]*\}\}").expect("valid regex"),
            Regex::new(r"<%[\s\S]*|[\s\S]*%>").expect("valid regex"),
            Regex::new(r"\$\{[\s\S]*").expect("valid regex"),
        ]
    })
}

pub(crate) fn doctype_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^html$").expect("valid regex"))
}

/// Markup-looking text: a tag, end tag or markup declaration opener.
pub(crate) fn markup_like_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[/\w!]").expect("valid regex"))
}

pub(crate) fn comment_markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[/\w]").expect("valid regex"))
}

pub(crate) fn fallback_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</no(script|embed|frames)").expect("valid regex"))
}

/// Attribute values that close a comment / CDATA section or a raw-text element.
pub(crate) fn attr_breakout_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)((--!?|\])>)|</(style|title)").expect("valid regex"))
}

pub(crate) fn self_close_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/>").expect("valid regex"))
}

pub(crate) fn leading_whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\r\n\t ]+").expect("valid regex"))
}

/// Replaces every template expression with a single space.
pub(crate) fn strip_template_exprs(input: &str) -> String {
    let mut out = input.to_string();
    for re in template_expr_regexes() {
        if re.is_match(&out) {
            out = re.replace_all(&out, " ").into_owned();
        }
    }
    out
}
