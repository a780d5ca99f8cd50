//! Sanitize inputs and result shapes.

use purify_dom::{Document, NodeId};
use std::fmt;

/// What to sanitize.
#[derive(Debug)]
pub enum Dirty<'a> {
    Markup(&'a str),
    /// A node of someone else's tree. It is deep-copied before sanitizing.
    Node(&'a Document, NodeId),
    /// A node of the caller's own tree. Sanitized in place when `IN_PLACE` is set, copied
    /// otherwise.
    Tree(&'a mut Document, NodeId),
}

impl<'a> From<&'a str> for Dirty<'a> {
    fn from(markup: &'a str) -> Self {
        Self::Markup(markup)
    }
}

impl<'a> From<&'a String> for Dirty<'a> {
    fn from(markup: &'a String) -> Self {
        Self::Markup(markup.as_str())
    }
}

/// An owned sanitized tree and the node the result refers to.
#[derive(Debug, Clone)]
pub struct Tree {
    pub document: Document,
    pub root: NodeId,
}

impl Tree {
    pub fn inner_html(&self) -> String {
        self.document.inner_html(self.root)
    }

    pub fn outer_html(&self) -> String {
        self.document.outer_html(self.root)
    }
}

/// Markup produced by a caller-supplied trusted-output factory.
///
/// Only the sanitizer constructs these, so holding one means the wrapped markup went through a
/// full sanitize pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedHtml {
    policy_name: String,
    html: String,
}

impl TrustedHtml {
    pub(crate) fn new(policy_name: impl Into<String>, html: String) -> Self {
        Self {
            policy_name: policy_name.into(),
            html,
        }
    }

    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

/// Result of a sanitize call. Exactly one shape is produced, chosen by the output precedence
/// (in place, fragment, DOM, trusted wrapper, string).
#[derive(Debug, Clone)]
pub enum Sanitized {
    /// The caller's tree was edited; this is the node that was passed in.
    InPlace(NodeId),
    /// A fragment holding the sanitized children.
    Fragment(Tree),
    /// The container element (`body`, or `html` for whole documents).
    Dom(Tree),
    Trusted(TrustedHtml),
    Html(String),
}

impl Sanitized {
    /// The markup for string-like results.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Html(html) => Some(html),
            Self::Trusted(trusted) => Some(trusted.as_str()),
            _ => None,
        }
    }

    /// Serializes any shape except `InPlace`, whose tree belongs to the caller.
    pub fn into_html(self) -> Option<String> {
        match self {
            Self::InPlace(_) => None,
            Self::Fragment(tree) | Self::Dom(tree) => Some(tree.inner_html()),
            Self::Trusted(trusted) => Some(trusted.into_string()),
            Self::Html(html) => Some(html),
        }
    }

    pub fn is_in_place(&self) -> bool {
        matches!(self, Self::InPlace(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purify_dom::parse_html;

    #[test]
    fn string_shapes_expose_their_markup() {
        let html = Sanitized::Html("<b>x</b>".to_string());
        assert_eq!(html.as_str(), Some("<b>x</b>"));
        let trusted = Sanitized::Trusted(TrustedHtml::new("app", "<i>y</i>".to_string()));
        assert_eq!(trusted.as_str(), Some("<i>y</i>"));
        assert_eq!(trusted.into_html().as_deref(), Some("<i>y</i>"));
        assert_eq!(Sanitized::InPlace(Document::default().root()).into_html(), None);
    }

    #[test]
    fn tree_shapes_serialize_their_children() {
        let document = parse_html("<p>a</p><p>b</p>");
        let root = document.body().unwrap();
        let dom = Sanitized::Dom(Tree { document, root });
        assert_eq!(dom.as_str(), None);
        assert_eq!(dom.into_html().as_deref(), Some("<p>a</p><p>b</p>"));
    }
}
