//! Depth-first filter over a working tree.
//!
//! The walk is a cursor over node ids rather than an iterator over child lists: every decision
//! may edit the tree (directly or through hooks), so the cursor re-reads parents and siblings
//! after each node instead of trusting anything it saw before the edit. Whatever the cursor
//! misses because a hook moved nodes around is picked up by a final sweep.

use crate::defaults::{MAX_NESTING_DEPTH, NAMED_PROPS_PREFIX};
use crate::guard::{self, NamespaceState};
use crate::hooks::{AttributeCheck, ElementCheck, HookData, HookPoint, HookRegistry};
use crate::patterns::{attr_breakout_regex, self_close_regex, strip_template_exprs};
use crate::policy::Policy;
use crate::removal::{Removal, RemovedAttribute, RemovedNode};
use purify_dom::{Document, NodeData, NodeId};
use rustc_hash::FxHashSet;

pub(crate) struct Walk<'a> {
    doc: &'a mut Document,
    policy: &'a Policy,
    hooks: &'a mut HookRegistry,
    removed: &'a mut Vec<Removal>,
    guard_comments: bool,
    visited: FxHashSet<NodeId>,
    fragment_depth: usize,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(
        doc: &'a mut Document,
        policy: &'a Policy,
        hooks: &'a mut HookRegistry,
        removed: &'a mut Vec<Removal>,
        root: NodeId,
    ) -> Self {
        let guard_comments = policy.safe_for_xml || guard::has_foreign_content(doc, root);
        Self {
            doc,
            policy,
            hooks,
            removed,
            guard_comments,
            visited: FxHashSet::default(),
            fragment_depth: 0,
        }
    }

    /// Sanitizes everything below `root`. The root is a container: hooks see it and its
    /// attributes are checked, but it is never removed or unwrapped.
    pub(crate) fn run(&mut self, root: NodeId) {
        self.visited.insert(root);
        self.sanitize_root(root);
        self.walk(root, false);
    }

    fn walk(&mut self, root: NodeId, in_shadow: bool) {
        let mut next = self.doc.first_child(root);
        while let Some(node) = next {
            next = self.step(root, node, in_shadow);
        }
        self.sweep(root, in_shadow);
    }

    fn step(&mut self, root: NodeId, node: NodeId, in_shadow: bool) -> Option<NodeId> {
        if !self.visited.insert(node) {
            return self
                .doc
                .first_child(node)
                .or_else(|| self.following(root, node));
        }
        let parent = self.doc.parent(node);
        let prev = self.doc.previous_sibling(node);
        if self.process(root, node, in_shadow) && self.is_attached(root, node) {
            return self
                .doc
                .first_child(node)
                .or_else(|| self.following(root, node));
        }
        self.resume(root, parent, prev)
    }

    /// Next node after a removal, found from where the removed node used to be. Unwrapped
    /// children now sit right there, so they are visited next.
    fn resume(
        &self,
        root: NodeId,
        parent: Option<NodeId>,
        prev: Option<NodeId>,
    ) -> Option<NodeId> {
        let parent = parent.filter(|&p| self.is_attached(root, p))?;
        match prev.filter(|&p| self.doc.parent(p) == Some(parent)) {
            Some(prev) => self
                .doc
                .next_sibling(prev)
                .or_else(|| self.following(root, parent)),
            None => self
                .doc
                .first_child(parent)
                .or_else(|| self.following(root, parent)),
        }
    }

    /// Next node in document order that is not inside `node`, bounded by `root`.
    fn following(&self, root: NodeId, node: NodeId) -> Option<NodeId> {
        let mut cur = node;
        while cur != root {
            if let Some(next) = self.doc.next_sibling(cur) {
                return Some(next);
            }
            cur = self.doc.parent(cur)?;
        }
        None
    }

    fn sweep(&mut self, root: NodeId, in_shadow: bool) {
        loop {
            let pending: Vec<NodeId> = self
                .doc
                .descendants(root)
                .into_iter()
                .filter(|n| !self.visited.contains(n))
                .collect();
            if pending.is_empty() {
                return;
            }
            tracing::trace!(count = pending.len(), "sweeping nodes moved by hooks");
            for node in pending {
                if self.is_attached(root, node) && self.visited.insert(node) {
                    self.process(root, node, in_shadow);
                }
            }
        }
    }

    fn is_attached(&self, root: NodeId, node: NodeId) -> bool {
        self.doc.is_inclusive_ancestor(root, node)
    }

    /// Returns whether the node is still in the tree.
    fn process(&mut self, root: NodeId, node: NodeId, in_shadow: bool) -> bool {
        if in_shadow {
            self.run_hook(HookPoint::UponSanitizeShadowNode, node, HookData::Node);
        }
        if self.sanitize_element(root, node) {
            return false;
        }
        self.sanitize_fragments(node);
        self.sanitize_attributes(node);
        true
    }

    fn run_hook(&mut self, point: HookPoint, node: NodeId, data: HookData) -> HookData {
        self.hooks.run(point, self.doc, node, data, self.policy)
    }

    fn tag_of(&self, node: NodeId) -> String {
        match self.doc.data(node) {
            NodeData::Doctype(_) => "!doctype".to_string(),
            _ => self.policy.fold_case(&self.doc.node_name(node)),
        }
    }

    fn element_stage(&mut self, node: NodeId, tag: &str) -> bool {
        let allowed = self.policy.allows_tag(tag);
        let check = HookData::Element(ElementCheck {
            tag_name: tag.to_string(),
            allowed,
        });
        match self.run_hook(HookPoint::UponSanitizeElement, node, check) {
            HookData::Element(check) => check.allowed,
            _ => allowed,
        }
    }

    fn sanitize_root(&mut self, root: NodeId) {
        if !self.doc.is_element(root) {
            return;
        }
        self.run_hook(HookPoint::BeforeSanitizeElements, root, HookData::Node);
        let tag = self.tag_of(root);
        let allowed = self.element_stage(root, &tag);
        self.run_hook(HookPoint::AfterSanitizeElements, root, HookData::Node);
        self.sanitize_fragments(root);
        if allowed {
            self.sanitize_attributes(root);
            return;
        }
        let attrs: Vec<(String, String)> = self
            .doc
            .element(root)
            .map(|el| {
                el.attrs
                    .iter()
                    .map(|a| (a.qualified_name(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        for (name, value) in attrs {
            self.drop_attribute(root, &name, &value);
        }
    }

    /// Element-level checks. Returns `true` when the node left the tree.
    fn sanitize_element(&mut self, root: NodeId, node: NodeId) -> bool {
        self.run_hook(HookPoint::BeforeSanitizeElements, node, HookData::Node);
        if !self.is_attached(root, node) {
            return true;
        }

        let tag = self.tag_of(node);
        let allowed = self.element_stage(node, &tag);
        if !self.is_attached(root, node) {
            return true;
        }

        if guard::is_namespace_confused(self.doc, node) {
            self.force_remove(node, "markup hidden in text content");
            return true;
        }
        let harmful = match self.doc.data(node) {
            NodeData::ProcessingInstruction { .. } => Some("processing instruction"),
            NodeData::Comment(_)
                if self.guard_comments && guard::is_unsafe_comment(self.doc, node) =>
            {
                Some("comment looks like markup")
            }
            _ => None,
        };
        if let Some(reason) = harmful {
            self.force_remove(node, reason);
            return true;
        }
        let depth = self.doc.depth(node).saturating_sub(self.doc.depth(root));
        if depth > MAX_NESTING_DEPTH {
            self.force_remove(node, "nesting too deep");
            return true;
        }

        if !allowed {
            if self.policy.allows_custom_element(&tag) {
                self.run_hook(HookPoint::AfterSanitizeElements, node, HookData::Node);
                return false;
            }
            if self.policy.keep_content && !self.policy.forbids_contents(&tag) {
                self.unwrap(node);
            } else {
                self.force_remove(node, "element not allowed");
            }
            return true;
        }

        if self.doc.is_element(node)
            && guard::namespace_state(self.doc, self.policy, node) == NamespaceState::Rejected
        {
            self.force_remove(node, "namespace not allowed here");
            return true;
        }
        if guard::is_nested_form(self.doc, node) {
            self.force_remove(node, "nested form");
            return true;
        }
        if guard::is_fallback_breakout(self.doc, node, &tag) {
            self.force_remove(node, "fallback content closes its element");
            return true;
        }

        if self.policy.safe_for_templates {
            if let NodeData::Text(text) = self.doc.data(node) {
                let cleaned = strip_template_exprs(text);
                if cleaned != *text {
                    self.removed
                        .push(Removal::Element(RemovedNode::capture(self.doc, node)));
                    self.doc.set_text_content(node, cleaned);
                }
            }
        }

        self.run_hook(HookPoint::AfterSanitizeElements, node, HookData::Node);
        false
    }

    fn force_remove(&mut self, node: NodeId, reason: &'static str) {
        let entry = RemovedNode::capture(self.doc, node);
        tracing::debug!(tag = %entry.node_name, reason, "removed node");
        self.removed.push(Removal::Element(entry));
        self.doc.detach(node);
    }

    /// Replaces `node` with its children.
    fn unwrap(&mut self, node: NodeId) {
        let entry = RemovedNode::capture(self.doc, node);
        tracing::debug!(tag = %entry.node_name, "unwrapped node");
        self.removed.push(Removal::Element(entry));
        if let Some(parent) = self.doc.parent(node) {
            let children = self.doc.children(node);
            let mut anchor = node;
            for child in children {
                self.doc.insert_after(parent, child, anchor);
                anchor = child;
            }
        }
        self.doc.detach(node);
    }

    fn sanitize_fragments(&mut self, node: NodeId) {
        let fragments = [self.doc.template_contents(node), self.doc.shadow_root(node)];
        for fragment in fragments.into_iter().flatten() {
            self.sanitize_shadow(fragment);
        }
    }

    fn sanitize_shadow(&mut self, fragment: NodeId) {
        if self.fragment_depth >= MAX_NESTING_DEPTH {
            tracing::debug!("fragment nesting too deep; dropping its content");
            for child in self.doc.children(fragment) {
                self.force_remove(child, "nesting too deep");
            }
            return;
        }
        self.fragment_depth += 1;
        self.visited.insert(fragment);
        self.run_hook(HookPoint::BeforeSanitizeShadowDom, fragment, HookData::Node);
        self.walk(fragment, true);
        self.run_hook(HookPoint::AfterSanitizeShadowDom, fragment, HookData::Node);
        self.fragment_depth -= 1;
    }

    fn sanitize_attributes(&mut self, node: NodeId) {
        if !self.doc.is_element(node) {
            return;
        }
        self.run_hook(HookPoint::BeforeSanitizeAttributes, node, HookData::Node);
        let snapshot = self.attributes(node);
        let mut seen = FxHashSet::default();
        for (name, value) in snapshot {
            self.sanitize_attribute(node, &name, &value);
            seen.insert(name);
        }

        let added: Vec<(String, String)> = self
            .attributes(node)
            .into_iter()
            .filter(|(name, _)| !seen.contains(name))
            .collect();
        if !added.is_empty() {
            let lc_tag = self.tag_of(node);
            for (name, value) in added {
                let lc_name = self.policy.fold_case(&name);
                if !self.policy.is_valid_attribute(&lc_tag, &lc_name, &value) {
                    self.drop_attribute(node, &name, &value);
                }
            }
        }

        self.run_hook(HookPoint::AfterSanitizeAttributes, node, HookData::Node);
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.doc
            .element(node)
            .map(|el| {
                el.attrs
                    .iter()
                    .map(|a| (a.qualified_name(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sanitize_attribute(&mut self, node: NodeId, name: &str, raw: &str) {
        let lc_name = self.policy.fold_case(name);
        let value = if lc_name == "value" { raw } else { raw.trim() };
        let initial = AttributeCheck {
            attr_name: lc_name.clone(),
            attr_value: value.to_string(),
            keep_attr: true,
            force_keep_attr: false,
        };
        let check = match self.run_hook(
            HookPoint::UponSanitizeAttribute,
            node,
            HookData::Attribute(initial.clone()),
        ) {
            HookData::Attribute(check) => check,
            _ => initial,
        };

        let mut value = check.attr_value;
        if self.policy.sanitize_named_props
            && matches!(lc_name.as_str(), "id" | "name")
            && !value.starts_with(NAMED_PROPS_PREFIX)
        {
            value = format!("{NAMED_PROPS_PREFIX}{value}");
        }
        if self.policy.safe_for_xml && attr_breakout_regex().is_match(&value) {
            self.drop_attribute(node, name, raw);
            return;
        }
        if check.force_keep_attr {
            self.doc.set_attribute(node, name, value);
            return;
        }
        if !check.keep_attr {
            self.drop_attribute(node, name, raw);
            return;
        }
        if !self.policy.allow_self_close_in_attr && self_close_regex().is_match(&value) {
            self.drop_attribute(node, name, raw);
            return;
        }
        if self.policy.safe_for_templates {
            value = strip_template_exprs(&value);
        }

        let lc_tag = self.tag_of(node);
        if !self.policy.is_valid_attribute(&lc_tag, &lc_name, &value) {
            self.drop_attribute(node, name, raw);
            return;
        }
        self.doc.set_attribute(node, name, value);
    }

    fn drop_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.doc.remove_attribute(node, name);
        let from = self.doc.node_name(node);
        tracing::trace!(attr = %name, tag = %from, "removed attribute");
        self.removed.push(Removal::Attribute(RemovedAttribute {
            name: name.to_string(),
            value: value.to_string(),
            from,
        }));
    }
}
