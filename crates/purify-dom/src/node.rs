use crate::namespace::{Namespace, QualName};

/// Index of a node inside a [`crate::Document`] arena.
///
/// Ids are only meaningful for the document that created them. Detached nodes keep their id
/// (the arena never shrinks), so an id stays valid for the lifetime of its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    pub fn new(name: QualName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        self.name.qualified()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QualName,
    pub attrs: Vec<Attribute>,
    pub(crate) template_contents: Option<NodeId>,
    pub(crate) shadow_root: Option<NodeId>,
}

impl Element {
    pub fn new(name: QualName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            template_contents: None,
            shadow_root: None,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.name.ns
    }

    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    /// DOM `tagName` before case folding.
    pub fn tag_name(&self) -> String {
        self.name.qualified()
    }

    pub fn attr(&self, qualified: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name.matches(qualified))
    }

    pub fn attr_mut(&mut self, qualified: &str) -> Option<&mut Attribute> {
        self.attrs.iter_mut().find(|a| a.name.matches(qualified))
    }

    pub fn has_attr(&self, qualified: &str) -> bool {
        self.attr(qualified).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Doctype {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Fragment,
    Doctype(Doctype),
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl NodeData {
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }
}
