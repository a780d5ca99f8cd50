//! Parser adapters: HTML via html5ever, XML via roxmltree.
//!
//! Both adapters produce the same arena [`Document`] so the sanitizer never sees which parser
//! built the tree.

use crate::document::{Document, DocumentKind};
use crate::namespace::{Namespace, QualName};
use crate::node::{Attribute, Doctype, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
}

/// Media type handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaType {
    #[default]
    Html,
    Xhtml,
}

impl MediaType {
    pub const SUPPORTED: [&'static str; 2] = ["text/html", "application/xhtml+xml"];

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "text/html" => Some(Self::Html),
            "application/xhtml+xml" => Some(Self::Xhtml),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Xhtml => "application/xhtml+xml",
        }
    }

    pub fn is_xml(self) -> bool {
        self == Self::Xhtml
    }
}

/// Turns markup into a tree.
///
/// HTML parsing never fails (the HTML parser recovers from anything); XML parsing reports
/// well-formedness errors.
pub trait MarkupParser: Send + Sync {
    fn parse(&self, markup: &str, media_type: MediaType) -> Result<Document>;

    /// Whether this parser can produce trees at all. Checked once by the sanitizer.
    fn is_supported(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl MarkupParser for DefaultParser {
    fn parse(&self, markup: &str, media_type: MediaType) -> Result<Document> {
        match media_type {
            MediaType::Html => Ok(parse_html(markup)),
            MediaType::Xhtml => parse_xml(markup)
                .inspect_err(|err| tracing::debug!(%err, "xhtml input is not well-formed")),
        }
    }
}

/// Parses a full HTML document (scripting disabled, like a `DOMParser` document).
pub fn parse_html(markup: &str) -> Document {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), opts).one(markup);
    from_rcdom(&dom)
}

fn from_rcdom(dom: &RcDom) -> Document {
    let mut doc = Document::new(DocumentKind::Html);
    let mut stack: Vec<(Handle, NodeId)> = vec![(dom.document.clone(), doc.root())];
    while let Some((handle, parent)) = stack.pop() {
        for child in handle.children.borrow().iter() {
            let Some(id) = rc_node(&mut doc, child) else {
                continue;
            };
            doc.append_child(parent, id);
            stack.push((child.clone(), id));

            if let RcNodeData::Element {
                template_contents, ..
            } = &child.data
            {
                let contents = template_contents.borrow().clone();
                if let Some(contents) = contents {
                    if let Some(fragment) = doc.ensure_template_contents(id) {
                        stack.push((contents, fragment));
                    }
                }
            }
        }
    }
    doc
}

fn rc_node(doc: &mut Document, handle: &Handle) -> Option<NodeId> {
    let id = match &handle.data {
        RcNodeData::Document => return None,
        RcNodeData::Doctype {
            name,
            public_id,
            system_id,
        } => doc.create_doctype(Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }),
        RcNodeData::Text { contents } => doc.create_text(contents.borrow().to_string()),
        RcNodeData::Comment { contents } => doc.create_comment(contents.to_string()),
        RcNodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|a| Attribute::new(rc_qual_name(&a.name), a.value.to_string()))
                .collect();
            doc.create_element_with_attrs(rc_qual_name(name), attrs)
        }
        RcNodeData::ProcessingInstruction { target, contents } => {
            doc.create_processing_instruction(target.to_string(), contents.to_string())
        }
    };
    Some(id)
}

fn rc_qual_name(name: &html5ever::QualName) -> QualName {
    QualName::new(
        name.prefix.as_ref().map(|p| p.to_string()),
        Namespace::from_uri(&name.ns),
        name.local.to_string(),
    )
}

/// Parses a well-formed XML document. DTDs are rejected.
pub fn parse_xml(markup: &str) -> Result<Document> {
    let xml = roxmltree::Document::parse(markup)?;
    let mut doc = Document::new(DocumentKind::Xml);
    let mut stack = vec![(xml.root(), doc.root())];
    while let Some((node, parent)) = stack.pop() {
        for child in node.children() {
            let id = match child.node_type() {
                roxmltree::NodeType::Root => continue,
                roxmltree::NodeType::Element => {
                    let tag = child.tag_name();
                    let ns = tag.namespace().map(Namespace::from_uri).unwrap_or_default();
                    let attrs = child
                        .attributes()
                        .map(|a| {
                            let ns = a.namespace().map(Namespace::from_uri).unwrap_or_default();
                            let prefix = ns.conventional_prefix().map(str::to_string);
                            Attribute::new(QualName::new(prefix, ns, a.name()), a.value())
                        })
                        .collect();
                    doc.create_element_with_attrs(QualName::new(None, ns, tag.name()), attrs)
                }
                roxmltree::NodeType::Text => doc.create_text(child.text().unwrap_or_default()),
                roxmltree::NodeType::Comment => {
                    doc.create_comment(child.text().unwrap_or_default())
                }
                roxmltree::NodeType::PI => {
                    let Some(pi) = child.pi() else {
                        continue;
                    };
                    doc.create_processing_instruction(pi.target, pi.value.unwrap_or_default())
                }
            };
            doc.append_child(parent, id);
            stack.push((child, id));
        }
    }
    Ok(doc)
}
