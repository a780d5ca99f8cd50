//! Namespace confusion and DOM clobbering defenses.

use crate::defaults;
use crate::patterns::{comment_markup_regex, custom_element_regex, fallback_close_regex, markup_like_regex};
use crate::policy::Policy;
use purify_dom::{Document, MediaType, Namespace, NodeData, NodeId};
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

fn static_set(tables: &[&'static [&'static str]]) -> FxHashSet<&'static str> {
    tables.iter().flat_map(|t| t.iter().copied()).collect()
}

fn all_svg_tags() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        static_set(&[
            defaults::SVG_TAGS,
            defaults::SVG_FILTER_TAGS,
            defaults::SVG_DISALLOWED_TAGS,
        ])
    })
}

fn all_mathml_tags() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| static_set(&[defaults::MATHML_TAGS, defaults::MATHML_DISALLOWED_TAGS]))
}

fn clobberable_names() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| static_set(&[defaults::CLOBBERABLE_NAMES]))
}

/// Effective namespace of an element after the integration-point rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceState {
    Html,
    Svg,
    MathMl,
    /// Another allowed namespace (XHTML documents only).
    Custom,
    Rejected,
}

/// Call-scoped classification of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeClass {
    pub namespace: Namespace,
    /// Lower-cased local tag name.
    pub tag: String,
    pub html_integration_point: bool,
    pub mathml_text_integration_point: bool,
    pub custom_element: bool,
}

impl NodeClass {
    /// Classifies `node`. Non-element nodes (the document, fragments) classify as a `template`
    /// in the policy namespace, which is the context sanitized content gets inserted into.
    pub fn of(doc: &Document, policy: &Policy, node: NodeId) -> Self {
        let (namespace, tag) = match doc.element(node) {
            Some(el) => (el.name.ns.clone(), el.tag_name().to_lowercase()),
            None => (policy.namespace.clone(), "template".to_string()),
        };
        let html_integration_point = policy.html_integration_points.contains(&tag);
        let mathml_text_integration_point = policy.mathml_text_integration_points.contains(&tag);
        let custom_element = namespace == Namespace::Html && is_basic_custom_element(&tag);
        Self {
            namespace,
            tag,
            html_integration_point,
            mathml_text_integration_point,
            custom_element,
        }
    }
}

/// Derives the namespace state of `node` from its own namespace and its parent's class.
pub fn namespace_state(doc: &Document, policy: &Policy, node: NodeId) -> NamespaceState {
    if !doc.is_element(node) {
        return NamespaceState::Rejected;
    }
    let class = NodeClass::of(doc, policy, node);
    let parent = match doc.parent(node).filter(|&p| doc.is_element(p)) {
        Some(p) => NodeClass::of(doc, policy, p),
        None => NodeClass::of(doc, policy, doc.root()),
    };

    if !policy.allowed_namespaces.contains(class.namespace.uri()) {
        return NamespaceState::Rejected;
    }

    let tag = class.tag.as_str();
    let accepted = match class.namespace {
        Namespace::Svg => {
            let ok = match parent.namespace {
                Namespace::Html => tag == "svg",
                Namespace::MathMl => {
                    tag == "svg"
                        && (parent.tag == "annotation-xml" || parent.mathml_text_integration_point)
                }
                _ => all_svg_tags().contains(tag),
            };
            return if ok {
                NamespaceState::Svg
            } else {
                NamespaceState::Rejected
            };
        }
        Namespace::MathMl => {
            let ok = match parent.namespace {
                Namespace::Html => tag == "math",
                Namespace::Svg => tag == "math" && parent.html_integration_point,
                _ => all_mathml_tags().contains(tag),
            };
            return if ok {
                NamespaceState::MathMl
            } else {
                NamespaceState::Rejected
            };
        }
        Namespace::Html => {
            let parent_ok = match parent.namespace {
                Namespace::Svg => parent.html_integration_point,
                Namespace::MathMl => parent.mathml_text_integration_point,
                _ => true,
            };
            parent_ok
                && !all_mathml_tags().contains(tag)
                && (defaults::COMMON_SVG_AND_HTML_TAGS.contains(&tag)
                    || !all_svg_tags().contains(tag))
        }
        _ => {
            return if policy.media_type == MediaType::Xhtml {
                NamespaceState::Custom
            } else {
                NamespaceState::Rejected
            };
        }
    };
    if accepted {
        NamespaceState::Html
    } else {
        NamespaceState::Rejected
    }
}

/// A lower-case, dash-containing tag name that is not a reserved SVG/MathML name.
pub fn is_basic_custom_element(tag: &str) -> bool {
    tag != "annotation-xml" && custom_element_regex().is_match(tag)
}

/// Whether an `id` / `name` value would shadow a document or form property.
pub fn is_clobbering_name(value: &str) -> bool {
    clobberable_names().contains(value)
}

/// An element without element children whose markup and text both look like markup. Such
/// content only parses as text because of the current namespace and turns into markup when the
/// serialized string is parsed again elsewhere.
pub(crate) fn is_namespace_confused(doc: &Document, node: NodeId) -> bool {
    if !doc.is_element(node) || !doc.has_children(node) || doc.first_element_child(node).is_some()
    {
        return false;
    }
    markup_like_regex().is_match(&doc.inner_html(node))
        && markup_like_regex().is_match(&doc.text_content(node))
}

/// A comment whose data would re-parse as markup outside an HTML-only context.
pub(crate) fn is_unsafe_comment(doc: &Document, node: NodeId) -> bool {
    match doc.data(node) {
        NodeData::Comment(text) => comment_markup_regex().is_match(text),
        _ => false,
    }
}

/// `noscript` / `noembed` / `noframes` whose content closes the element early once scripting or
/// embedding is turned on by the consumer's parser.
pub(crate) fn is_fallback_breakout(doc: &Document, node: NodeId, tag: &str) -> bool {
    matches!(tag, "noscript" | "noembed" | "noframes")
        && fallback_close_regex().is_match(&doc.inner_html(node))
}

/// A `form` inside another `form`. Parsers never nest forms, so a second parse moves its
/// content to a different place in the tree.
pub(crate) fn is_nested_form(doc: &Document, node: NodeId) -> bool {
    let is_form = |n: NodeId| {
        doc.element(n)
            .is_some_and(|el| el.name.ns == Namespace::Html && el.local_name() == "form")
    };
    if !is_form(node) {
        return false;
    }
    let mut cur = doc.parent(node);
    while let Some(parent) = cur {
        if is_form(parent) {
            return true;
        }
        cur = doc.parent(parent);
    }
    false
}

/// Whether the tree below `root` holds any SVG or MathML element (template contents included).
pub(crate) fn has_foreign_content(doc: &Document, root: NodeId) -> bool {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if doc
            .element(node)
            .is_some_and(|el| el.name.ns.is_foreign())
        {
            return true;
        }
        stack.extend(doc.child_nodes(node));
        if let Some(contents) = doc.template_contents(node) {
            stack.push(contents);
        }
        if let Some(shadow) = doc.shadow_root(node) {
            stack.push(shadow);
        }
    }
    false
}
