//! Caller-facing configuration.
//!
//! [`Config`] is the unresolved form: every recognised option as a public field with
//! DOMPurify-compatible defaults. [`Config::resolve`] turns it into an immutable
//! [`crate::Policy`].

use crate::error::{Error, Result};
use purify_dom::namespace::HTML_NAMESPACE;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Custom-element name check: a regular expression or a caller-supplied function.
#[derive(Clone)]
pub enum NamePredicate {
    Pattern(Regex),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl NamePredicate {
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(name),
            Self::Predicate(f) => f(name),
        }
    }
}

impl fmt::Debug for NamePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Replacement for the default URI scheme pattern.
#[derive(Debug, Clone)]
pub struct UriPattern(Regex);

impl UriPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Regex> for UriPattern {
    fn from(re: Regex) -> Self {
        Self(re)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CustomElementHandling {
    pub tag_name_check: Option<NamePredicate>,
    pub attribute_name_check: Option<NamePredicate>,
    pub allow_customized_built_in_elements: bool,
}

/// Named tag/attribute bundles. Any profile set replaces the allowed tag and attribute lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Profiles {
    pub html: bool,
    pub svg: bool,
    #[serde(rename = "svgFilters")]
    pub svg_filters: bool,
    #[serde(rename = "mathMl")]
    pub math_ml: bool,
}

/// Caller-supplied factory for trusted output.
pub trait TrustedTypesPolicy: Send + Sync {
    fn name(&self) -> &str;
    fn create_html(&self, html: &str) -> String;
}

impl fmt::Debug for dyn TrustedTypesPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedTypesPolicy")
            .field("name", &self.name())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Replaces the default allowed tags when set.
    pub allowed_tags: Option<Vec<String>>,
    pub add_tags: Vec<String>,
    pub forbid_tags: Vec<String>,
    /// Replaces the default allowed attributes when set.
    pub allowed_attr: Option<Vec<String>>,
    pub add_attr: Vec<String>,
    pub forbid_attr: Vec<String>,
    pub add_uri_safe_attr: Vec<String>,
    pub add_data_uri_tags: Vec<String>,
    /// Replaces the default forbid-contents list when set.
    pub forbid_contents: Option<Vec<String>>,
    pub add_forbid_contents: Vec<String>,
    /// Namespace URIs elements may live in. Defaults to HTML, SVG and MathML.
    pub allowed_namespaces: Option<Vec<String>>,
    /// Namespace of the context the sanitized markup is inserted into.
    pub namespace: String,
    pub html_integration_points: Option<Vec<String>>,
    pub mathml_text_integration_points: Option<Vec<String>>,
    pub allowed_uri_regexp: Option<UriPattern>,
    pub custom_element_handling: CustomElementHandling,
    pub use_profiles: Option<Profiles>,
    pub parser_media_type: String,

    pub allow_aria_attr: bool,
    pub allow_data_attr: bool,
    pub allow_unknown_protocols: bool,
    pub allow_self_close_in_attr: bool,
    pub safe_for_templates: bool,
    pub safe_for_xml: bool,
    pub whole_document: bool,
    pub force_body: bool,
    pub keep_content: bool,
    pub sanitize_dom: bool,
    pub sanitize_named_props: bool,
    pub in_place: bool,

    pub return_dom: bool,
    pub return_dom_fragment: bool,
    pub return_trusted_type: bool,
    pub trusted_types_policy: Option<Arc<dyn TrustedTypesPolicy>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_tags: None,
            add_tags: Vec::new(),
            forbid_tags: Vec::new(),
            allowed_attr: None,
            add_attr: Vec::new(),
            forbid_attr: Vec::new(),
            add_uri_safe_attr: Vec::new(),
            add_data_uri_tags: Vec::new(),
            forbid_contents: None,
            add_forbid_contents: Vec::new(),
            allowed_namespaces: None,
            namespace: HTML_NAMESPACE.to_string(),
            html_integration_points: None,
            mathml_text_integration_points: None,
            allowed_uri_regexp: None,
            custom_element_handling: CustomElementHandling::default(),
            use_profiles: None,
            parser_media_type: "text/html".to_string(),
            allow_aria_attr: true,
            allow_data_attr: true,
            allow_unknown_protocols: false,
            allow_self_close_in_attr: false,
            safe_for_templates: false,
            safe_for_xml: true,
            whole_document: false,
            force_body: false,
            keep_content: true,
            sanitize_dom: true,
            sanitize_named_props: false,
            in_place: false,
            return_dom: false,
            return_dom_fragment: false,
            return_trusted_type: false,
            trusted_types_policy: None,
        }
    }
}

fn string_list(obj: Option<&serde_json::Map<String, Value>>, key: &str) -> Option<Vec<String>> {
    obj.and_then(|o| o.get(key))
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|x| x.as_str())
                .map(str::to_string)
                .collect()
        })
}

fn name_predicate(obj: Option<&serde_json::Map<String, Value>>, key: &str) -> Option<NamePredicate> {
    let pattern = obj.and_then(|o| o.get(key)).and_then(|v| v.as_str())?;
    NamePredicate::pattern(pattern)
        .inspect_err(|err| tracing::warn!(key, %err, "ignoring invalid name pattern"))
        .ok()
}

impl Config {
    /// Builds a config from a DOMPurify-style JSON object (`ALLOWED_TAGS`, `ADD_ATTR`,
    /// `USE_PROFILES`, ...).
    ///
    /// Unknown keys and values of the wrong type are ignored; invalid patterns are dropped with a
    /// warning.
    pub fn from_json(value: &Value) -> Self {
        let obj = value.as_object();
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            obj.and_then(|o| o.get(key))
                .and_then(|v| v.as_bool())
                .unwrap_or(default)
        };
        let text = |key: &str| {
            obj.and_then(|o| o.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let custom = obj
            .and_then(|o| o.get("CUSTOM_ELEMENT_HANDLING"))
            .and_then(|v| v.as_object());
        let custom_element_handling = CustomElementHandling {
            tag_name_check: name_predicate(custom, "tagNameCheck"),
            attribute_name_check: name_predicate(custom, "attributeNameCheck"),
            allow_customized_built_in_elements: custom
                .and_then(|o| o.get("allowCustomizedBuiltInElements"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        };

        let allowed_uri_regexp = text("ALLOWED_URI_REGEXP").and_then(|pattern| {
            UriPattern::new(&pattern)
                .inspect_err(|err| tracing::warn!(%err, "ignoring invalid ALLOWED_URI_REGEXP"))
                .ok()
        });

        let use_profiles = obj
            .and_then(|o| o.get("USE_PROFILES"))
            .filter(|v| v.is_object())
            .and_then(|v| Profiles::deserialize(v).ok());

        Self {
            allowed_tags: string_list(obj, "ALLOWED_TAGS"),
            add_tags: string_list(obj, "ADD_TAGS").unwrap_or_default(),
            forbid_tags: string_list(obj, "FORBID_TAGS").unwrap_or_default(),
            allowed_attr: string_list(obj, "ALLOWED_ATTR"),
            add_attr: string_list(obj, "ADD_ATTR").unwrap_or_default(),
            forbid_attr: string_list(obj, "FORBID_ATTR").unwrap_or_default(),
            add_uri_safe_attr: string_list(obj, "ADD_URI_SAFE_ATTR").unwrap_or_default(),
            add_data_uri_tags: string_list(obj, "ADD_DATA_URI_TAGS").unwrap_or_default(),
            forbid_contents: string_list(obj, "FORBID_CONTENTS"),
            add_forbid_contents: string_list(obj, "ADD_FORBID_CONTENTS").unwrap_or_default(),
            allowed_namespaces: string_list(obj, "ALLOWED_NAMESPACES"),
            namespace: text("NAMESPACE").unwrap_or(defaults.namespace),
            html_integration_points: string_list(obj, "HTML_INTEGRATION_POINTS"),
            mathml_text_integration_points: string_list(obj, "MATHML_TEXT_INTEGRATION_POINTS"),
            allowed_uri_regexp,
            custom_element_handling,
            use_profiles,
            parser_media_type: text("PARSER_MEDIA_TYPE").unwrap_or(defaults.parser_media_type),
            allow_aria_attr: flag("ALLOW_ARIA_ATTR", defaults.allow_aria_attr),
            allow_data_attr: flag("ALLOW_DATA_ATTR", defaults.allow_data_attr),
            allow_unknown_protocols: flag(
                "ALLOW_UNKNOWN_PROTOCOLS",
                defaults.allow_unknown_protocols,
            ),
            allow_self_close_in_attr: flag(
                "ALLOW_SELF_CLOSE_IN_ATTR",
                defaults.allow_self_close_in_attr,
            ),
            safe_for_templates: flag("SAFE_FOR_TEMPLATES", defaults.safe_for_templates),
            safe_for_xml: flag("SAFE_FOR_XML", defaults.safe_for_xml),
            whole_document: flag("WHOLE_DOCUMENT", defaults.whole_document),
            force_body: flag("FORCE_BODY", defaults.force_body),
            keep_content: flag("KEEP_CONTENT", defaults.keep_content),
            sanitize_dom: flag("SANITIZE_DOM", defaults.sanitize_dom),
            sanitize_named_props: flag("SANITIZE_NAMED_PROPS", defaults.sanitize_named_props),
            in_place: flag("IN_PLACE", defaults.in_place),
            return_dom: flag("RETURN_DOM", defaults.return_dom),
            return_dom_fragment: flag("RETURN_DOM_FRAGMENT", defaults.return_dom_fragment),
            return_trusted_type: flag("RETURN_TRUSTED_TYPE", defaults.return_trusted_type),
            trusted_types_policy: None,
        }
    }
}
