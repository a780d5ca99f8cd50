//! Removal log records.

use purify_dom::{Document, NodeData, NodeId};
use serde::Serialize;

/// Snapshot of a node taken when it left the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedNode {
    pub node_name: String,
    /// Namespace URI; empty for non-elements.
    pub namespace: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl RemovedNode {
    pub(crate) fn capture(doc: &Document, node: NodeId) -> Self {
        let (namespace, attributes) = match doc.element(node) {
            Some(el) => (
                el.name.ns.uri().to_string(),
                el.attrs
                    .iter()
                    .map(|a| (a.qualified_name(), a.value.clone()))
                    .collect(),
            ),
            None => (String::new(), Vec::new()),
        };
        let text = match doc.data(node) {
            NodeData::Doctype(_) => String::new(),
            _ => doc.text_content(node),
        };
        Self {
            node_name: doc.node_name(node),
            namespace,
            attributes,
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedAttribute {
    pub name: String,
    pub value: String,
    /// Owning element's node name.
    pub from: String,
}

/// One entry of the removal log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Removal {
    Element(RemovedNode),
    Attribute(RemovedAttribute),
}

impl Removal {
    pub fn node_name(&self) -> &str {
        match self {
            Self::Element(node) => &node.node_name,
            Self::Attribute(attr) => &attr.from,
        }
    }

    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::Element(_) => None,
            Self::Attribute(attr) => Some(&attr.name),
        }
    }
}
