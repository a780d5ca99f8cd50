//! Resolved configuration.

use crate::config::{Config, CustomElementHandling, TrustedTypesPolicy, UriPattern};
use crate::defaults;
use crate::guard;
use crate::patterns::{aria_attr_regex, data_attr_regex};
use crate::uri;
use purify_dom::namespace::{HTML_NAMESPACE, MATHML_NAMESPACE, SVG_NAMESPACE};
use purify_dom::{MediaType, Namespace};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// The immutable result of [`Config::resolve`].
///
/// Every set holds names already case-folded for the active media type, so lookups only need
/// [`Policy::fold_case`] on the probe.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Policy {
    pub allowed_tags: FxHashSet<String>,
    pub forbid_tags: FxHashSet<String>,
    pub allowed_attr: FxHashSet<String>,
    pub forbid_attr: FxHashSet<String>,
    pub uri_safe_attr: FxHashSet<String>,
    pub data_uri_tags: FxHashSet<String>,
    pub forbid_contents: FxHashSet<String>,
    /// Namespace URIs.
    pub allowed_namespaces: FxHashSet<String>,
    pub html_integration_points: FxHashSet<String>,
    pub mathml_text_integration_points: FxHashSet<String>,
    pub namespace: Namespace,
    pub media_type: MediaType,
    pub allowed_uri_regexp: Option<UriPattern>,
    pub custom_element_handling: CustomElementHandling,

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

impl Default for Policy {
    fn default() -> Self {
        Config::default().resolve()
    }
}

fn table(tables: &[&[&str]]) -> FxHashSet<String> {
    tables
        .iter()
        .flat_map(|t| t.iter())
        .map(|s| s.to_string())
        .collect()
}

fn fold_names(names: &[String], xhtml: bool) -> FxHashSet<String> {
    names.iter().map(|n| fold_case(n, xhtml)).collect()
}

fn fold_case(name: &str, xhtml: bool) -> String {
    if xhtml {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

impl Config {
    /// Resolves defaults, profiles and `ADD_*` lists into a [`Policy`]. Never fails: invalid
    /// values were already normalized away when the config was built.
    pub fn resolve(&self) -> Policy {
        let media_type = MediaType::from_mime(&self.parser_media_type).unwrap_or_else(|| {
            tracing::debug!(
                media_type = %self.parser_media_type,
                "unsupported parser media type; falling back to text/html"
            );
            MediaType::Html
        });
        let xhtml = media_type.is_xml();
        let fold = |names: &[String]| fold_names(names, xhtml);

        let mut allowed_tags = match &self.allowed_tags {
            Some(list) => fold(list),
            None => table(&[
                defaults::HTML_TAGS,
                defaults::SVG_TAGS,
                defaults::SVG_FILTER_TAGS,
                defaults::MATHML_TAGS,
                defaults::TEXT_TAGS,
            ]),
        };
        let mut allowed_attr = match &self.allowed_attr {
            Some(list) => fold(list),
            None => table(&[
                defaults::HTML_ATTRS,
                defaults::SVG_ATTRS,
                defaults::MATHML_ATTRS,
                defaults::XML_ATTRS,
            ]),
        };

        if let Some(profiles) = self.use_profiles {
            allowed_tags = table(&[defaults::TEXT_TAGS]);
            allowed_attr = FxHashSet::default();
            if profiles.html {
                allowed_tags.extend(table(&[defaults::HTML_TAGS]));
                allowed_attr.extend(table(&[defaults::HTML_ATTRS]));
            }
            if profiles.svg {
                allowed_tags.extend(table(&[defaults::SVG_TAGS]));
                allowed_attr.extend(table(&[defaults::SVG_ATTRS, defaults::XML_ATTRS]));
            }
            if profiles.svg_filters {
                allowed_tags.extend(table(&[defaults::SVG_FILTER_TAGS]));
                allowed_attr.extend(table(&[defaults::SVG_ATTRS, defaults::XML_ATTRS]));
            }
            if profiles.math_ml {
                allowed_tags.extend(table(&[defaults::MATHML_TAGS]));
                allowed_attr.extend(table(&[defaults::MATHML_ATTRS, defaults::XML_ATTRS]));
            }
        }

        allowed_tags.extend(fold(&self.add_tags));
        allowed_attr.extend(fold(&self.add_attr));

        let mut forbid_tags = fold(&self.forbid_tags);
        let forbid_attr = fold(&self.forbid_attr);

        let mut uri_safe_attr = table(&[defaults::URI_SAFE_ATTRIBUTES]);
        uri_safe_attr.extend(fold(&self.add_uri_safe_attr));
        let mut data_uri_tags = table(&[defaults::DATA_URI_TAGS]);
        data_uri_tags.extend(fold(&self.add_data_uri_tags));

        let mut forbid_contents = match &self.forbid_contents {
            Some(list) => fold(list),
            None => table(&[defaults::FORBID_CONTENTS]),
        };
        forbid_contents.extend(fold(&self.add_forbid_contents));

        if self.keep_content {
            allowed_tags.insert("#text".to_string());
        }
        if self.whole_document {
            for tag in ["html", "head", "body"] {
                allowed_tags.insert(tag.to_string());
            }
        }
        if allowed_tags.contains("table") {
            allowed_tags.insert("tbody".to_string());
            forbid_tags.remove("tbody");
        }

        let allowed_namespaces = match &self.allowed_namespaces {
            Some(list) => list.iter().cloned().collect(),
            None => [HTML_NAMESPACE, SVG_NAMESPACE, MATHML_NAMESPACE]
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        let integration_points = |list: &Option<Vec<String>>, default: &[&str]| match list {
            Some(list) => fold_names(list, false),
            None => table(&[default]),
        };

        let namespace = if self.namespace.is_empty() {
            Namespace::Html
        } else {
            Namespace::from_uri(&self.namespace)
        };

        Policy {
            allowed_tags,
            forbid_tags,
            allowed_attr,
            forbid_attr,
            uri_safe_attr,
            data_uri_tags,
            forbid_contents,
            allowed_namespaces,
            html_integration_points: integration_points(
                &self.html_integration_points,
                defaults::HTML_INTEGRATION_POINTS,
            ),
            mathml_text_integration_points: integration_points(
                &self.mathml_text_integration_points,
                defaults::MATHML_TEXT_INTEGRATION_POINTS,
            ),
            namespace,
            media_type,
            allowed_uri_regexp: self.allowed_uri_regexp.clone(),
            custom_element_handling: self.custom_element_handling.clone(),
            allow_aria_attr: self.allow_aria_attr,
            allow_data_attr: self.allow_data_attr && !self.safe_for_templates,
            allow_unknown_protocols: self.allow_unknown_protocols,
            allow_self_close_in_attr: self.allow_self_close_in_attr,
            safe_for_templates: self.safe_for_templates,
            safe_for_xml: self.safe_for_xml,
            whole_document: self.whole_document,
            force_body: self.force_body,
            keep_content: self.keep_content,
            sanitize_dom: self.sanitize_dom,
            sanitize_named_props: self.sanitize_named_props,
            in_place: self.in_place,
            return_dom: self.return_dom || self.return_dom_fragment,
            return_dom_fragment: self.return_dom_fragment,
            return_trusted_type: self.return_trusted_type,
            trusted_types_policy: self.trusted_types_policy.clone(),
        }
    }
}

impl Policy {
    pub fn is_xhtml(&self) -> bool {
        self.media_type.is_xml()
    }

    /// Lower-cases in HTML mode; XHTML names are case-sensitive.
    pub fn fold_case(&self, name: &str) -> String {
        fold_case(name, self.is_xhtml())
    }

    /// Allowed and not forbidden.
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag) && !self.forbid_tags.contains(tag)
    }

    pub fn forbids_contents(&self, tag: &str) -> bool {
        self.forbid_contents.contains(tag)
    }

    /// A disallowed tag that is still kept because it names a custom element accepted by the
    /// configured tag-name check.
    pub(crate) fn allows_custom_element(&self, tag: &str) -> bool {
        !self.forbid_tags.contains(tag)
            && guard::is_basic_custom_element(tag)
            && self
                .custom_element_handling
                .tag_name_check
                .as_ref()
                .is_some_and(|check| check.matches(tag))
    }

    fn allows_custom_attribute(&self, lc_tag: &str, lc_name: &str, value: &str) -> bool {
        let custom = &self.custom_element_handling;
        let Some(tag_check) = &custom.tag_name_check else {
            return false;
        };
        let custom_element_attr = guard::is_basic_custom_element(lc_tag)
            && tag_check.matches(lc_tag)
            && custom
                .attribute_name_check
                .as_ref()
                .is_some_and(|check| check.matches(lc_name));
        let customized_built_in =
            lc_name == "is" && custom.allow_customized_built_in_elements && tag_check.matches(value);
        custom_element_attr || customized_built_in
    }

    /// Whether attribute `lc_name="value"` may stay on element `lc_tag`. Both names must already
    /// be case-folded.
    pub fn is_valid_attribute(&self, lc_tag: &str, lc_name: &str, value: &str) -> bool {
        if self.sanitize_dom
            && matches!(lc_name, "id" | "name")
            && guard::is_clobbering_name(value)
        {
            return false;
        }
        if self.forbid_attr.contains(lc_name) {
            return false;
        }

        if self.allow_data_attr && data_attr_regex().is_match(lc_name) {
            return true;
        }
        if self.allow_aria_attr && aria_attr_regex().is_match(lc_name) {
            return true;
        }

        if !self.allowed_attr.contains(lc_name) {
            if !self.allows_custom_attribute(lc_tag, lc_name, value) {
                return false;
            }
        } else if self.uri_safe_attr.contains(lc_name) {
            return true;
        }

        uri::is_acceptable(self, lc_tag, lc_name, value)
    }
}
