use crate::namespace::{Namespace, QualName};
use crate::node::{Attribute, Doctype, Element, NodeData, NodeId};

/// Which serializer and case rules apply to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    #[default]
    Html,
    Xml,
}

/// One arena slot. Children form a doubly linked list so sibling steps and edits are O(1).
#[derive(Debug, Clone)]
struct NodeEntry {
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    data: NodeData,
}

impl NodeEntry {
    fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            data,
        }
    }
}

/// Children of one node, front to back (or back to front with `rev`).
#[derive(Debug, Clone)]
pub struct ChildNodes<'a> {
    doc: &'a Document,
    front: Option<NodeId>,
    back: Option<NodeId>,
}

impl Iterator for ChildNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.front?;
        if self.back == Some(cur) {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.doc.next_sibling(cur);
        }
        Some(cur)
    }
}

impl DoubleEndedIterator for ChildNodes<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        let cur = self.back?;
        if self.front == Some(cur) {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.doc.previous_sibling(cur);
        }
        Some(cur)
    }
}

/// Arena-backed markup tree.
///
/// Every structural edit goes through `&mut self`, so callers that walk the tree while editing
/// it re-read children by id after each edit instead of holding live iterators.
#[derive(Debug, Clone)]
pub struct Document {
    kind: DocumentKind,
    nodes: Vec<NodeEntry>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DocumentKind::Html)
    }
}

impl Document {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            nodes: vec![NodeEntry::new(NodeData::Document)],
        }
    }

    /// An HTML document with an empty `html > (head, body)` skeleton. Returns the body.
    pub fn with_body() -> (Self, NodeId) {
        let mut doc = Self::new(DocumentKind::Html);
        let html = doc.create_element(QualName::html("html"));
        let head = doc.create_element(QualName::html("head"));
        let body = doc.create_element(QualName::html("body"));
        doc.append_child(doc.root(), html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        (doc, body)
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn is_html(&self) -> bool {
        self.kind == DocumentKind::Html
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1 && self.nodes[0].first_child.is_none()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry::new(data));
        id
    }

    pub fn create_element(&mut self, name: QualName) -> NodeId {
        self.push(NodeData::Element(Element::new(name)))
    }

    pub fn create_element_with_attrs(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut el = Element::new(name);
        el.attrs = attrs;
        self.push(NodeData::Element(el))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::Fragment)
    }

    pub fn create_doctype(&mut self, doctype: Doctype) -> NodeId {
        self.push(NodeData::Doctype(doctype))
    }

    pub fn create_processing_instruction(
        &mut self,
        target: impl Into<String>,
        data: impl Into<String>,
    ) -> NodeId {
        self.push(NodeData::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    pub fn data_mut(&mut self, node: NodeId) -> &mut NodeData {
        &mut self.nodes[node.0].data
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.data(node).as_element()
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.data_mut(node).as_element_mut()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.data(node).is_element()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn child_nodes(&self, node: NodeId) -> ChildNodes<'_> {
        ChildNodes {
            doc: self,
            front: self.first_child(node),
            back: self.last_child(node),
        }
    }

    /// A snapshot of the children of `node`.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.child_nodes(node).collect()
    }

    pub fn has_children(&self, node: NodeId) -> bool {
        self.nodes[node.0].first_child.is_some()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].first_child
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].last_child
    }

    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.child_nodes(node).find(|&c| self.is_element(c))
    }

    /// Position among the parent's children. Linear in the number of preceding siblings.
    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        self.parent(node)?;
        let mut idx = 0;
        let mut cur = self.previous_sibling(node);
        while let Some(prev) = cur {
            idx += 1;
            cur = self.previous_sibling(prev);
        }
        Some(idx)
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].next_sibling
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].prev_sibling
    }

    /// True when `node` is `ancestor` or sits somewhere below it.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// Number of ancestors of `node`.
    pub fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = self.parent(node);
        while let Some(n) = cur {
            depth += 1;
            cur = self.parent(n);
        }
        depth
    }

    /// Detaches `node` from its parent. The node keeps its own subtree.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        let prev = self.nodes[node.0].prev_sibling.take();
        let next = self.nodes[node.0].next_sibling.take();
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => self.nodes[parent.0].first_child = next,
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => self.nodes[parent.0].last_child = prev,
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Inserts `child` into `parent` before `reference`; appends when `reference` is `None` or is
    /// not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let reference = reference.filter(|&r| self.parent(r) == Some(parent));
        let prev = match reference {
            Some(r) => self.nodes[r.0].prev_sibling,
            None => self.nodes[parent.0].last_child,
        };
        {
            let entry = &mut self.nodes[child.0];
            entry.parent = Some(parent);
            entry.prev_sibling = prev;
            entry.next_sibling = reference;
        }
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        match reference {
            Some(r) => self.nodes[r.0].prev_sibling = Some(child),
            None => self.nodes[parent.0].last_child = Some(child),
        }
    }

    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let next = if self.parent(reference) == Some(parent) {
            self.next_sibling(reference)
        } else {
            None
        };
        self.insert_before(parent, child, next);
    }

    pub fn remove_all_children(&mut self, node: NodeId) {
        let mut cur = self.nodes[node.0].first_child.take();
        self.nodes[node.0].last_child = None;
        while let Some(child) = cur {
            let entry = &mut self.nodes[child.0];
            cur = entry.next_sibling.take();
            entry.prev_sibling = None;
            entry.parent = None;
        }
    }

    /// Moves every child of `from` to the end of `to`.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.children(from) {
            self.append_child(to, child);
        }
    }

    /// DOM `nodeName`: the qualified tag name for elements, `#text` / `#comment` / ... otherwise.
    pub fn node_name(&self, node: NodeId) -> String {
        match self.data(node) {
            NodeData::Document => "#document".to_string(),
            NodeData::Fragment => "#document-fragment".to_string(),
            NodeData::Doctype(dt) => dt.name.clone(),
            NodeData::Element(el) => el.tag_name(),
            NodeData::Text(_) => "#text".to_string(),
            NodeData::Comment(_) => "#comment".to_string(),
            NodeData::ProcessingInstruction { target, .. } => target.clone(),
        }
    }

    /// Concatenated text of all descendant text nodes (comments excluded).
    pub fn text_content(&self, node: NodeId) -> String {
        match self.data(node) {
            NodeData::Text(t) | NodeData::Comment(t) => return t.clone(),
            NodeData::ProcessingInstruction { data, .. } => return data.clone(),
            _ => {}
        }
        let mut out = String::new();
        let mut stack: Vec<NodeId> = self.child_nodes(node).rev().collect();
        while let Some(n) = stack.pop() {
            if let NodeData::Text(t) = self.data(n) {
                out.push_str(t);
            }
            stack.extend(self.child_nodes(n).rev());
        }
        out
    }

    /// Replaces the character data of a text/comment node, or every child of an element with a
    /// single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: impl Into<String>) {
        let text = text.into();
        if matches!(self.data(node), NodeData::Element(_) | NodeData::Fragment) {
            self.remove_all_children(node);
            if !text.is_empty() {
                let t = self.create_text(text);
                self.append_child(node, t);
            }
            return;
        }
        match self.data_mut(node) {
            NodeData::Text(t) | NodeData::Comment(t) => *t = text,
            NodeData::ProcessingInstruction { data, .. } => *data = text,
            _ => {}
        }
    }

    pub fn get_attribute(&self, node: NodeId, qualified: &str) -> Option<&str> {
        self.element(node)?
            .attr(qualified)
            .map(|a| a.value.as_str())
    }

    /// Sets an attribute by qualified name, creating it when missing.
    ///
    /// New attributes with a well-known prefix (`xlink:`, `xml:`, `xmlns:`) are placed in that
    /// namespace; everything else lands in the null namespace.
    pub fn set_attribute(&mut self, node: NodeId, qualified: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(el) = self.element_mut(node) else {
            return;
        };
        if let Some(attr) = el.attr_mut(qualified) {
            attr.value = value;
            return;
        }
        el.attrs.push(Attribute::new(attribute_qual_name(qualified), value));
    }

    pub fn remove_attribute(&mut self, node: NodeId, qualified: &str) -> Option<Attribute> {
        let el = self.element_mut(node)?;
        let pos = el.attrs.iter().position(|a| a.name.matches(qualified))?;
        Some(el.attrs.remove(pos))
    }

    pub fn attribute_names(&self, node: NodeId) -> Vec<String> {
        self.element(node)
            .map(|el| el.attrs.iter().map(Attribute::qualified_name).collect())
            .unwrap_or_default()
    }

    pub fn template_contents(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.template_contents
    }

    /// Returns the content fragment of a `template` element, creating it on first use.
    pub fn ensure_template_contents(&mut self, node: NodeId) -> Option<NodeId> {
        if let Some(existing) = self.template_contents(node) {
            return Some(existing);
        }
        self.element(node)?;
        let fragment = self.create_fragment();
        if let Some(el) = self.element_mut(node) {
            el.template_contents = Some(fragment);
        }
        Some(fragment)
    }

    pub fn shadow_root(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.shadow_root
    }

    /// Attaches (or returns the existing) shadow root fragment of an element.
    pub fn attach_shadow(&mut self, host: NodeId) -> Option<NodeId> {
        if let Some(existing) = self.shadow_root(host) {
            return Some(existing);
        }
        self.element(host)?;
        let fragment = self.create_fragment();
        if let Some(el) = self.element_mut(host) {
            el.shadow_root = Some(fragment);
        }
        Some(fragment)
    }

    /// Pre-order descendants of `node` (excluding `node`, template contents and shadow roots).
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_nodes(node).rev().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.child_nodes(n).rev());
        }
        out
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(self.root())
    }

    pub fn doctype(&self) -> Option<&Doctype> {
        self.child_nodes(self.root())
            .find_map(|c| match self.data(c) {
                NodeData::Doctype(dt) => Some(dt),
                _ => None,
            })
    }

    fn html_child(&self, parent: NodeId, local: &str) -> Option<NodeId> {
        self.child_nodes(parent).find(|&c| {
            self.element(c)
                .is_some_and(|el| el.name.ns == Namespace::Html && el.name.local == local)
        })
    }

    pub fn head(&self) -> Option<NodeId> {
        self.html_child(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.html_child(self.document_element()?, "body")
    }

    /// Deep-copies `node` from `other` into this arena. The copy is detached.
    pub fn import(&mut self, other: &Document, node: NodeId) -> NodeId {
        let top = self.copy_shallow(other, node);
        let mut stack = vec![(node, top)];
        while let Some((src, dst)) = stack.pop() {
            for child in other.child_nodes(src) {
                let copy = self.copy_shallow(other, child);
                self.append_child(dst, copy);
                stack.push((child, copy));
            }
            let extra = [
                (other.template_contents(src), true),
                (other.shadow_root(src), false),
            ];
            for (fragment, is_template) in extra {
                let Some(fragment) = fragment else {
                    continue;
                };
                let copy = if is_template {
                    self.ensure_template_contents(dst)
                } else {
                    self.attach_shadow(dst)
                };
                if let Some(copy) = copy {
                    stack.push((fragment, copy));
                }
            }
        }
        top
    }

    fn copy_shallow(&mut self, other: &Document, node: NodeId) -> NodeId {
        let data = match other.data(node) {
            NodeData::Element(el) => NodeData::Element(Element {
                name: el.name.clone(),
                attrs: el.attrs.clone(),
                template_contents: None,
                shadow_root: None,
            }),
            NodeData::Document => NodeData::Fragment,
            other => other.clone(),
        };
        self.push(data)
    }
}

pub(crate) fn attribute_qual_name(qualified: &str) -> QualName {
    if qualified == "xmlns" {
        return QualName::new(None, Namespace::XmlNs, "xmlns");
    }
    if let Some((prefix, local)) = qualified.split_once(':') {
        let ns = match prefix {
            "xlink" => Some(Namespace::XLink),
            "xml" => Some(Namespace::Xml),
            "xmlns" => Some(Namespace::XmlNs),
            _ => None,
        };
        if let Some(ns) = ns {
            return QualName::new(Some(prefix.to_string()), ns, local);
        }
    }
    QualName::plain(qualified)
}
