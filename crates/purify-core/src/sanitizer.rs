//! The sanitizer instance: configuration lifecycle, document setup and output assembly.

use crate::config::Config;
use crate::hooks::{Hook, HookContext, HookPoint, HookRegistry};
use crate::output::{Dirty, Sanitized, Tree, TrustedHtml};
use crate::patterns::{doctype_name_regex, leading_whitespace_regex, strip_template_exprs};
use crate::policy::Policy;
use crate::removal::{Removal, RemovedNode};
use crate::walker::Walk;
use purify_dom::namespace::HTML_NAMESPACE;
use purify_dom::{DefaultParser, Document, MarkupParser, MediaType, Namespace, NodeData, NodeId};
use std::fmt;
use std::sync::{Arc, OnceLock};

fn default_policy() -> &'static Arc<Policy> {
    static POLICY: OnceLock<Arc<Policy>> = OnceLock::new();
    POLICY.get_or_init(|| Arc::new(Policy::default()))
}

/// An independent sanitizer: its own hooks, pinned configuration and removal log.
///
/// ```
/// use purify_core::Sanitizer;
///
/// let mut sanitizer = Sanitizer::new();
/// let clean = sanitizer.sanitize_to_string(r#"<img src="x" onerror="alert(1)">"#);
/// assert_eq!(clean, r#"<img src="x">"#);
/// assert_eq!(sanitizer.removed().len(), 1);
/// ```
pub struct Sanitizer {
    parser: Box<dyn MarkupParser>,
    supported: bool,
    hooks: HookRegistry,
    pinned: Option<Arc<Policy>>,
    last: Option<Arc<Policy>>,
    removed: Vec<Removal>,
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("supported", &self.supported)
            .field("hooks", &self.hooks)
            .field("pinned", &self.pinned.is_some())
            .field("removed", &self.removed.len())
            .finish()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::with_parser(DefaultParser)
    }

    /// Uses `parser` for markup input. Its capability probe is read once, here.
    pub fn with_parser(parser: impl MarkupParser + 'static) -> Self {
        let supported = parser.is_supported();
        if !supported {
            tracing::warn!("markup parser is not supported; every result will be empty");
        }
        Self {
            parser: Box::new(parser),
            supported,
            hooks: HookRegistry::default(),
            pinned: None,
            last: None,
            removed: Vec::new(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Pins `config` for every later call until [`Sanitizer::clear_config`]. While pinned,
    /// per-call configurations are ignored.
    pub fn set_config(&mut self, config: &Config) {
        let policy = Arc::new(config.resolve());
        self.last = Some(Arc::clone(&policy));
        self.pinned = Some(policy);
    }

    pub fn clear_config(&mut self) {
        self.pinned = None;
        self.last = None;
    }

    /// The policy the last call used (or the pinned one), defaults otherwise.
    pub fn policy(&self) -> Arc<Policy> {
        self.last
            .clone()
            .unwrap_or_else(|| Arc::clone(default_policy()))
    }

    /// Checks one attribute against the last resolved policy without walking a tree.
    pub fn is_valid_attribute(&self, tag: &str, attr: &str, value: &str) -> bool {
        let policy = self.policy();
        let lc_tag = policy.fold_case(tag);
        let lc_name = policy.fold_case(attr);
        policy.is_valid_attribute(&lc_tag, &lc_name, value)
    }

    pub fn add_hook(
        &mut self,
        point: HookPoint,
        hook: impl FnMut(&mut HookContext<'_>) + Send + 'static,
    ) {
        self.hooks.add(point, Box::new(hook));
    }

    /// Removes and returns the most recently added hook of `point`.
    pub fn remove_hook(&mut self, point: HookPoint) -> Option<Hook> {
        self.hooks.remove(point)
    }

    pub fn remove_hooks(&mut self, point: HookPoint) {
        self.hooks.clear(point);
    }

    pub fn remove_all_hooks(&mut self) {
        self.hooks.clear_all();
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Everything the last call removed, in removal order.
    pub fn removed(&self) -> &[Removal] {
        &self.removed
    }

    /// Sanitizes with the pinned configuration, or the defaults.
    pub fn sanitize<'d>(&mut self, dirty: impl Into<Dirty<'d>>) -> Sanitized {
        self.run(dirty.into(), None)
    }

    /// Sanitizes with `config` unless a configuration is pinned.
    pub fn sanitize_with<'d>(&mut self, dirty: impl Into<Dirty<'d>>, config: &Config) -> Sanitized {
        self.run(dirty.into(), Some(config))
    }

    /// Sanitizes markup and serializes whatever shape the policy asks for.
    pub fn sanitize_to_string(&mut self, markup: &str) -> String {
        self.sanitize(markup).into_html().unwrap_or_default()
    }

    fn run(&mut self, dirty: Dirty<'_>, config: Option<&Config>) -> Sanitized {
        self.removed.clear();
        let policy = match (&self.pinned, config) {
            (Some(pinned), _) => Arc::clone(pinned),
            (None, Some(config)) => Arc::new(config.resolve()),
            (None, None) => Arc::clone(default_policy()),
        };
        self.last = Some(Arc::clone(&policy));

        if !self.supported {
            return empty_result(dirty, &policy);
        }
        match dirty {
            Dirty::Markup(markup) => self.sanitize_markup(markup, &policy),
            Dirty::Node(doc, node) => self.sanitize_copy(doc, node, &policy),
            Dirty::Tree(doc, node) if policy.in_place => self.sanitize_in_place(doc, node, &policy),
            Dirty::Tree(doc, node) => self.sanitize_copy(doc, node, &policy),
        }
    }

    fn sanitize_markup(&mut self, markup: &str, policy: &Policy) -> Sanitized {
        if !policy.return_dom
            && !policy.safe_for_templates
            && !policy.whole_document
            && !markup.contains('<')
        {
            return finish_string(markup.to_string(), policy);
        }
        let Some((mut doc, root)) = self.init_document(markup, policy) else {
            return empty_shape(policy);
        };
        if !policy.whole_document {
            self.drop_head(&mut doc);
        }
        self.walk(&mut doc, root, policy);
        assemble(doc, root, policy)
    }

    /// Head content the parser hoisted out of the body never reaches the output; log it as removed.
    fn drop_head(&mut self, doc: &mut Document) {
        let Some(head) = doc.head().filter(|_| doc.is_html()) else {
            return;
        };
        for child in doc.children(head) {
            let entry = RemovedNode::capture(doc, child);
            tracing::debug!(tag = %entry.node_name, "dropped head content");
            self.removed.push(Removal::Element(entry));
            doc.detach(child);
        }
    }

    fn sanitize_copy(&mut self, src: &Document, node: NodeId, policy: &Policy) -> Sanitized {
        let (mut doc, body) = Document::with_body();
        let imported = doc.import(src, node);
        let is_container = doc.element(imported).is_some_and(|el| {
            el.name.ns == Namespace::Html && matches!(el.name.local.as_str(), "body" | "html")
        });
        let root = if is_container {
            imported
        } else {
            if matches!(doc.data(imported), NodeData::Fragment) {
                doc.reparent_children(imported, body);
            } else {
                doc.append_child(body, imported);
            }
            match doc.document_element() {
                Some(html) if policy.whole_document => html,
                _ => body,
            }
        };
        self.walk(&mut doc, root, policy);
        assemble(doc, root, policy)
    }

    fn sanitize_in_place(&mut self, doc: &mut Document, node: NodeId, policy: &Policy) -> Sanitized {
        if doc.is_element(node) {
            let tag = policy.fold_case(&doc.node_name(node));
            if !policy.allows_tag(&tag) {
                tracing::debug!(tag = %tag, "in-place root is not allowed; emptying it");
                self.removed
                    .push(Removal::Element(RemovedNode::capture(doc, node)));
                doc.detach(node);
                doc.remove_all_children(node);
                return Sanitized::InPlace(node);
            }
        }
        self.walk(doc, node, policy);
        Sanitized::InPlace(node)
    }

    fn walk(&mut self, doc: &mut Document, root: NodeId, policy: &Policy) {
        Walk::new(doc, policy, &mut self.hooks, &mut self.removed, root).run(root);
    }

    fn parse(&self, markup: &str, media_type: MediaType) -> Option<Document> {
        self.parser
            .parse(markup, media_type)
            .inspect_err(|err| tracing::debug!(%err, "markup could not be parsed; result is empty"))
            .ok()
    }

    /// Parses `markup` into a fresh document and returns it with the node to walk.
    fn init_document(&self, markup: &str, policy: &Policy) -> Option<(Document, NodeId)> {
        let mut leading = None;
        let payload = if policy.force_body {
            format!("<remove></remove>{markup}")
        } else {
            leading = leading_whitespace_regex().find(markup).map(|m| m.as_str());
            markup.to_string()
        };

        let mut doc = if policy.namespace == Namespace::Html {
            let payload = match policy.media_type {
                MediaType::Xhtml => format!(
                    r#"<html xmlns="{HTML_NAMESPACE}"><head></head><body>{payload}</body></html>"#
                ),
                MediaType::Html => payload,
            };
            self.parse(&payload, policy.media_type)?
        } else {
            let ns = policy.namespace.uri().replace('"', "&quot;");
            self.parse(
                &format!(r#"<template xmlns="{ns}">{payload}</template>"#),
                MediaType::Xhtml,
            )?
        };

        let body = doc.body().or_else(|| doc.document_element())?;
        if policy.force_body {
            let sentinel = doc.first_child(body).filter(|&first| {
                doc.element(first)
                    .is_some_and(|el| el.local_name() == "remove")
            });
            if let Some(sentinel) = sentinel {
                doc.detach(sentinel);
            }
        }
        if let Some(ws) = leading.filter(|_| doc.is_html()) {
            let text = doc.create_text(ws);
            let first = doc.first_child(body);
            doc.insert_before(body, text, first);
        }

        let root = if policy.whole_document {
            doc.document_element()?
        } else {
            body
        };
        Some((doc, root))
    }
}

fn assemble(mut doc: Document, root: NodeId, policy: &Policy) -> Sanitized {
    if policy.return_dom {
        if policy.return_dom_fragment {
            let fragment = doc.create_fragment();
            doc.reparent_children(root, fragment);
            return Sanitized::Fragment(Tree {
                document: doc,
                root: fragment,
            });
        }
        return Sanitized::Dom(Tree {
            document: doc,
            root,
        });
    }

    let mut html = if policy.whole_document {
        doc.outer_html(root)
    } else {
        doc.inner_html(root)
    };
    if policy.whole_document && policy.allowed_tags.contains("!doctype") {
        if let Some(doctype) = doc
            .doctype()
            .filter(|dt| doctype_name_regex().is_match(&dt.name))
        {
            html = format!("<!DOCTYPE {}>\n{html}", doctype.name);
        }
    }
    finish_string(html, policy)
}

fn finish_string(mut html: String, policy: &Policy) -> Sanitized {
    if policy.safe_for_templates {
        html = strip_template_exprs(&html);
    }
    match &policy.trusted_types_policy {
        Some(factory) if policy.return_trusted_type => {
            Sanitized::Trusted(TrustedHtml::new(factory.name(), factory.create_html(&html)))
        }
        _ => Sanitized::Html(html),
    }
}

/// What an unusable parser produces: nothing, in the shape that was asked for.
fn empty_result(dirty: Dirty<'_>, policy: &Policy) -> Sanitized {
    if let Dirty::Tree(doc, node) = dirty {
        if policy.in_place {
            doc.remove_all_children(node);
            if let Some(el) = doc.element_mut(node) {
                el.attrs.clear();
            }
            return Sanitized::InPlace(node);
        }
    }
    empty_shape(policy)
}

fn empty_shape(policy: &Policy) -> Sanitized {
    if policy.return_dom {
        let (mut document, body) = Document::with_body();
        if policy.return_dom_fragment {
            let root = document.create_fragment();
            return Sanitized::Fragment(Tree { document, root });
        }
        return Sanitized::Dom(Tree {
            document,
            root: body,
        });
    }
    finish_string(String::new(), policy)
}
