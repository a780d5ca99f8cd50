use crate::*;
use purify_dom::{Document, MarkupParser, MediaType, NodeId, parse_html};
use std::sync::Arc;

fn find(doc: &Document, name: &str) -> NodeId {
    doc.descendants(doc.root())
        .into_iter()
        .find(|&n| doc.node_name(n) == name)
        .unwrap()
}

struct AppPolicy;

impl TrustedTypesPolicy for AppPolicy {
    fn name(&self) -> &str {
        "app"
    }

    fn create_html(&self, html: &str) -> String {
        html.to_string()
    }
}

struct Unsupported;

impl MarkupParser for Unsupported {
    fn parse(&self, _markup: &str, _media_type: MediaType) -> purify_dom::parse::Result<Document> {
        Ok(Document::default())
    }

    fn is_supported(&self) -> bool {
        false
    }
}

#[test]
fn return_dom_hands_back_the_body() {
    let config = Config {
        return_dom: true,
        ..Config::default()
    };
    let out = Sanitizer::new().sanitize_with("<b onclick=\"x()\">x</b>", &config);
    let Sanitized::Dom(tree) = out else {
        panic!("expected a DOM result");
    };
    assert_eq!(tree.document.node_name(tree.root), "body");
    assert_eq!(tree.inner_html(), "<b>x</b>");
}

#[test]
fn return_dom_fragment_wins_over_return_dom() {
    let config = Config {
        return_dom: true,
        return_dom_fragment: true,
        ..Config::default()
    };
    let out = Sanitizer::new().sanitize_with("plain <i>text</i>", &config);
    let Sanitized::Fragment(tree) = out else {
        panic!("expected a fragment");
    };
    assert_eq!(tree.document.node_name(tree.root), "#document-fragment");
    assert_eq!(tree.inner_html(), "plain <i>text</i>");
}

#[test]
fn node_input_is_copied_before_sanitizing() {
    let doc = parse_html(r#"<div><p onclick="x()">t</p></div>"#);
    let p = find(&doc, "p");
    let mut sanitizer = Sanitizer::new();
    let out = sanitizer.sanitize(Dirty::Node(&doc, p));
    assert_eq!(out.as_str(), Some("<p>t</p>"));
    assert_eq!(doc.get_attribute(p, "onclick"), Some("x()"));
}

#[test]
fn in_place_edits_the_callers_tree() {
    let mut doc = parse_html(r#"<div id="host"><p onclick="x()">t</p><script>s()</script></div>"#);
    let div = find(&doc, "div");
    let config = Config {
        in_place: true,
        ..Config::default()
    };
    let out = Sanitizer::new().sanitize_with(Dirty::Tree(&mut doc, div), &config);
    assert!(matches!(out, Sanitized::InPlace(node) if node == div));
    assert_eq!(doc.outer_html(div), r#"<div id="host"><p>t</p></div>"#);
}

#[test]
fn forbidden_in_place_root_is_emptied_and_detached() {
    let mut doc = parse_html("<div><p>t</p></div>");
    let div = find(&doc, "div");
    let config = Config {
        in_place: true,
        forbid_tags: vec!["div".to_string()],
        ..Config::default()
    };
    let mut sanitizer = Sanitizer::new();
    let out = sanitizer.sanitize_with(Dirty::Tree(&mut doc, div), &config);
    assert!(out.is_in_place());
    assert!(doc.children(div).is_empty());
    assert_eq!(doc.parent(div), None);
    assert_eq!(sanitizer.removed()[0].node_name(), "div");
}

#[test]
fn in_place_only_applies_to_trees() {
    let config = Config {
        in_place: true,
        ..Config::default()
    };
    let out = Sanitizer::new().sanitize_with("<b>x</b>", &config);
    assert_eq!(out.as_str(), Some("<b>x</b>"));
}

#[test]
fn whole_document_keeps_the_wrapper_and_doctype() {
    let markup = "<!DOCTYPE html><p>x</p>";
    let config = Config {
        whole_document: true,
        ..Config::default()
    };
    let mut sanitizer = Sanitizer::new();
    assert_eq!(
        sanitizer.sanitize_with(markup, &config).as_str(),
        Some("<html><head></head><body><p>x</p></body></html>")
    );

    let with_doctype = Config {
        add_tags: vec!["!doctype".to_string()],
        ..config
    };
    assert_eq!(
        sanitizer.sanitize_with(markup, &with_doctype).as_str(),
        Some("<!DOCTYPE html>\n<html><head></head><body><p>x</p></body></html>")
    );
}

#[test]
fn trusted_output_needs_a_factory() {
    let config = Config {
        return_trusted_type: true,
        trusted_types_policy: Some(Arc::new(AppPolicy)),
        ..Config::default()
    };
    let mut sanitizer = Sanitizer::new();
    match sanitizer.sanitize_with("<b>x</b><script></script>", &config) {
        Sanitized::Trusted(trusted) => {
            assert_eq!(trusted.policy_name(), "app");
            assert_eq!(trusted.as_str(), "<b>x</b>");
        }
        other => panic!("expected trusted output, got {other:?}"),
    }
    assert!(matches!(
        sanitizer.sanitize_with("plain", &config),
        Sanitized::Trusted(_)
    ));

    let no_factory = Config {
        trusted_types_policy: None,
        ..config
    };
    assert!(matches!(
        sanitizer.sanitize_with("<b>x</b>", &no_factory),
        Sanitized::Html(_)
    ));
}

#[test]
fn unsupported_parser_fails_closed() {
    let mut sanitizer = Sanitizer::with_parser(Unsupported);
    assert!(!sanitizer.is_supported());
    assert_eq!(sanitizer.sanitize_to_string("<b>x</b>"), "");

    let mut doc = parse_html("<div><p>t</p></div>");
    let div = find(&doc, "div");
    let config = Config {
        in_place: true,
        ..Config::default()
    };
    sanitizer.sanitize_with(Dirty::Tree(&mut doc, div), &config);
    assert!(doc.children(div).is_empty());
}

#[test]
fn removal_log_resets_between_calls() {
    let mut sanitizer = Sanitizer::new();
    sanitizer.sanitize_to_string("<script>x</script><b>y</b>");
    assert_eq!(sanitizer.removed().len(), 1);
    assert_eq!(sanitizer.removed()[0].node_name(), "script");
    sanitizer.sanitize_to_string("<b>clean</b>");
    assert!(sanitizer.removed().is_empty());
}

#[test]
fn head_content_outside_the_body_is_logged() {
    let mut sanitizer = Sanitizer::new();
    let out = sanitizer.sanitize_to_string("<title>t</title><style>p{}</style><p>x</p>");
    assert_eq!(out, "<p>x</p>");
    let names: Vec<_> = sanitizer.removed().iter().map(|r| r.node_name()).collect();
    assert_eq!(names, ["title", "style"]);

    let config = Config {
        whole_document: true,
        ..Config::default()
    };
    sanitizer.sanitize_with("<title>t</title><p>x</p>", &config);
    assert!(sanitizer.removed().is_empty());
}
