#![forbid(unsafe_code)]

//! Markup tree used by `purify`.
//!
//! - an arena [`Document`] with stable [`NodeId`]s, so a walker can edit the tree it is walking
//! - parser adapters for `text/html` (html5ever) and `application/xhtml+xml` (roxmltree)
//! - an HTML / XML serializer (`inner_html`, `outer_html`)

mod document;
pub mod namespace;
mod node;
pub mod parse;
mod serialize;

pub use document::{ChildNodes, Document, DocumentKind};
pub use namespace::{Namespace, QualName};
pub use node::{Attribute, Doctype, Element, NodeData, NodeId};
pub use parse::{DefaultParser, MarkupParser, MediaType, ParseError, parse_html, parse_xml};
