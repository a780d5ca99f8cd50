use std::fmt;

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Namespace of an element or attribute.
///
/// The well-known namespaces get their own variants so the hot paths can compare enums instead
/// of URIs. `None` is the null namespace (plain HTML attributes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    None,
    Html,
    Svg,
    MathMl,
    XLink,
    Xml,
    XmlNs,
    Other(String),
}

impl Namespace {
    pub fn from_uri(uri: &str) -> Self {
        match uri {
            "" => Self::None,
            HTML_NAMESPACE => Self::Html,
            SVG_NAMESPACE => Self::Svg,
            MATHML_NAMESPACE => Self::MathMl,
            XLINK_NAMESPACE => Self::XLink,
            XML_NAMESPACE => Self::Xml,
            XMLNS_NAMESPACE => Self::XmlNs,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Self::None => "",
            Self::Html => HTML_NAMESPACE,
            Self::Svg => SVG_NAMESPACE,
            Self::MathMl => MATHML_NAMESPACE,
            Self::XLink => XLINK_NAMESPACE,
            Self::Xml => XML_NAMESPACE,
            Self::XmlNs => XMLNS_NAMESPACE,
            Self::Other(uri) => uri,
        }
    }

    /// Conventional prefix used when serializing attributes in this namespace.
    pub fn conventional_prefix(&self) -> Option<&'static str> {
        match self {
            Self::XLink => Some("xlink"),
            Self::Xml => Some("xml"),
            Self::XmlNs => Some("xmlns"),
            _ => None,
        }
    }

    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::Svg | Self::MathMl)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

/// Qualified name of an element or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualName {
    pub prefix: Option<String>,
    pub ns: Namespace,
    pub local: String,
}

impl QualName {
    pub fn new(prefix: Option<String>, ns: Namespace, local: impl Into<String>) -> Self {
        Self {
            prefix,
            ns,
            local: local.into(),
        }
    }

    pub fn html(local: impl Into<String>) -> Self {
        Self::new(None, Namespace::Html, local)
    }

    /// Attribute name without a namespace.
    pub fn plain(local: impl Into<String>) -> Self {
        Self::new(None, Namespace::None, local)
    }

    /// `prefix:local`, or `local` when there is no prefix.
    ///
    /// This is what the DOM reports as `Attr.name` / `Element.tagName` (before case folding).
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    pub fn matches(&self, qualified: &str) -> bool {
        match &self.prefix {
            Some(prefix) => qualified
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|local| local == self.local),
            None => qualified == self.local,
        }
    }
}
