use crate::document::Document;
use crate::namespace::{Namespace, XLINK_NAMESPACE};
use crate::node::{Attribute, Element, NodeData, NodeId};
use htmlize::{escape_attribute, escape_text};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// HTML parents whose text children are emitted verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
];

#[derive(Debug, Clone, Default)]
struct Scope {
    default_ns: Namespace,
    xlink_declared: bool,
}

enum Step {
    Visit { node: NodeId, scope: Scope },
    Close(String),
}

impl Document {
    /// Serializes the children of `node` (template contents for `template`).
    pub fn inner_html(&self, node: NodeId) -> String {
        let scope = self.scope_at(Some(node));
        let content = self.template_contents(node).unwrap_or(node);
        let mut stack = Vec::new();
        self.push_children(&mut stack, content, &scope);
        let mut out = String::new();
        self.drain(&mut stack, &mut out);
        out
    }

    /// Serializes `node` itself followed by its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let scope = self.scope_at(self.parent(node));
        let mut stack = vec![Step::Visit { node, scope }];
        let mut out = String::new();
        self.drain(&mut stack, &mut out);
        out
    }

    fn scope_at(&self, node: Option<NodeId>) -> Scope {
        let mut scope = Scope::default();
        let Some(node) = node else {
            return scope;
        };
        if let Some(el) = self.element(node) {
            scope.default_ns = el.name.ns.clone();
        }
        let mut cur = Some(node);
        while let Some(n) = cur {
            if self.element(n).is_some_and(|el| el.has_attr("xmlns:xlink")) {
                scope.xlink_declared = true;
                break;
            }
            cur = self.parent(n);
        }
        scope
    }

    fn push_children(&self, stack: &mut Vec<Step>, node: NodeId, scope: &Scope) {
        for child in self.child_nodes(node).rev() {
            stack.push(Step::Visit {
                node: child,
                scope: scope.clone(),
            });
        }
    }

    fn drain(&self, stack: &mut Vec<Step>, out: &mut String) {
        let xml = !self.is_html();
        while let Some(step) = stack.pop() {
            let (node, scope) = match step {
                Step::Close(tag) => {
                    out.push_str("</");
                    out.push_str(&tag);
                    out.push('>');
                    continue;
                }
                Step::Visit { node, scope } => (node, scope),
            };
            match self.data(node) {
                NodeData::Document | NodeData::Fragment => {
                    self.push_children(stack, node, &scope)
                }
                NodeData::Doctype(dt) => {
                    out.push_str("<!DOCTYPE ");
                    out.push_str(&dt.name);
                    out.push('>');
                }
                NodeData::Text(text) => {
                    if !xml && self.in_raw_text(node) {
                        out.push_str(text);
                    } else {
                        out.push_str(&escape_text(text.as_str()));
                    }
                }
                NodeData::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeData::ProcessingInstruction { target, data } => {
                    out.push_str("<?");
                    out.push_str(target);
                    if !data.is_empty() {
                        out.push(' ');
                        out.push_str(data);
                    }
                    out.push_str(if xml { "?>" } else { ">" });
                }
                NodeData::Element(el) => self.open_element(node, el, &scope, stack, out),
            }
        }
    }

    fn in_raw_text(&self, node: NodeId) -> bool {
        self.parent(node)
            .and_then(|p| self.element(p))
            .is_some_and(|el| {
                el.name.ns == Namespace::Html && RAW_TEXT_ELEMENTS.contains(&el.name.local.as_str())
            })
    }

    fn open_element(
        &self,
        node: NodeId,
        el: &Element,
        scope: &Scope,
        stack: &mut Vec<Step>,
        out: &mut String,
    ) {
        let xml = !self.is_html();
        let tag = if xml {
            el.name.qualified()
        } else {
            html_tag_name(el)
        };
        let mut inner = scope.clone();

        out.push('<');
        out.push_str(&tag);
        if xml {
            if el.name.prefix.is_none() {
                if el.name.ns != scope.default_ns && !el.has_attr("xmlns") {
                    push_attr(out, "xmlns", el.name.ns.uri());
                }
                inner.default_ns = el.name.ns.clone();
            }
            let uses_xlink = el.attrs.iter().any(|a| a.name.ns == Namespace::XLink);
            if uses_xlink && !scope.xlink_declared && !el.has_attr("xmlns:xlink") {
                push_attr(out, "xmlns:xlink", XLINK_NAMESPACE);
            }
            inner.xlink_declared |= uses_xlink || el.has_attr("xmlns:xlink");
        }
        for attr in &el.attrs {
            push_attr(out, &attr_name(attr), &attr.value);
        }

        let is_html_el = el.name.ns == Namespace::Html;
        let is_void = is_html_el && VOID_ELEMENTS.contains(&el.name.local.as_str());
        let content = self.template_contents(node).unwrap_or(node);

        if !xml {
            out.push('>');
            if !is_void {
                stack.push(Step::Close(tag));
                self.push_children(stack, content, &inner);
            }
            return;
        }

        if !self.has_children(content) {
            if is_void {
                out.push_str(" />");
            } else if is_html_el {
                out.push_str("></");
                out.push_str(&tag);
                out.push('>');
            } else {
                out.push_str("/>");
            }
            return;
        }
        out.push('>');
        stack.push(Step::Close(tag));
        self.push_children(stack, content, &inner);
    }
}

fn html_tag_name(el: &Element) -> String {
    match el.name.ns {
        Namespace::Html | Namespace::Svg | Namespace::MathMl => el.name.local.clone(),
        _ => el.name.qualified(),
    }
}

fn attr_name(attr: &Attribute) -> String {
    let local = &attr.name.local;
    match attr.name.ns {
        Namespace::None => local.clone(),
        Namespace::Xml => format!("xml:{local}"),
        Namespace::XmlNs if local == "xmlns" => local.clone(),
        Namespace::XmlNs => format!("xmlns:{local}"),
        Namespace::XLink => format!("xlink:{local}"),
        _ => attr.name.qualified(),
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use crate::parse::{parse_html, parse_xml};

    fn body_html(markup: &str) -> String {
        let doc = parse_html(markup);
        doc.inner_html(doc.body().unwrap())
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        assert_eq!(
            body_html(r#"<p title='a"b'>1 &lt; 2 &amp; 3</p>"#),
            r#"<p title="a&quot;b">1 &lt; 2 &amp; 3</p>"#
        );
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        assert_eq!(body_html("<br><img src=x>"), r#"<br><img src="x">"#);
    }

    #[test]
    fn raw_text_parents_keep_text_verbatim() {
        let doc = parse_html("<style>a > b { color: red }</style>");
        let head = doc.head().unwrap();
        assert_eq!(doc.inner_html(head), "<style>a > b { color: red }</style>");
    }

    #[test]
    fn foreign_elements_keep_adjusted_case_and_xlink_prefix() {
        assert_eq!(
            body_html(r##"<svg><clippath></clippath><a xlink:href="#x"></a></svg>"##),
            r##"<svg><clipPath></clipPath><a xlink:href="#x"></a></svg>"##
        );
    }

    #[test]
    fn template_serializes_its_contents() {
        let doc = parse_html("<template><b>x</b></template>");
        let head = doc.head().unwrap();
        assert_eq!(doc.inner_html(head), "<template><b>x</b></template>");
    }

    #[test]
    fn xml_serialization_self_closes_and_declares_namespaces() {
        let doc = parse_xml(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##,
        )
        .unwrap();
        let svg = doc.document_element().unwrap();
        assert_eq!(
            doc.outer_html(svg),
            r##"<svg xmlns="http://www.w3.org/2000/svg"><use xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="#a"/></svg>"##
        );
        assert_eq!(
            doc.inner_html(svg),
            r##"<use xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="#a"/>"##
        );
    }
}
