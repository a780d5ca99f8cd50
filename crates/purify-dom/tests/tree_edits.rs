use purify_dom::{Document, Namespace, NodeData, QualName, parse_html};

#[test]
fn with_body_builds_the_html_skeleton() {
    let (doc, body) = Document::with_body();
    assert_eq!(doc.body(), Some(body));
    assert!(doc.head().is_some());
    assert_eq!(doc.outer_html(doc.document_element().unwrap()), "<html><head></head><body></body></html>");
}

#[test]
fn detach_and_insert_keep_sibling_order() {
    let (mut doc, body) = Document::with_body();
    let a = doc.create_element(QualName::html("a"));
    let b = doc.create_element(QualName::html("b"));
    let c = doc.create_element(QualName::html("c"));
    doc.append_child(body, a);
    doc.append_child(body, c);
    doc.insert_before(body, b, Some(c));
    assert_eq!(doc.children(body), &[a, b, c]);

    doc.detach(b);
    assert_eq!(doc.parent(b), None);
    assert_eq!(doc.next_sibling(a), Some(c));
    assert_eq!(doc.previous_sibling(c), Some(a));

    doc.insert_after(body, b, c);
    assert_eq!(doc.inner_html(body), "<a></a><c></c><b></b>");
}

#[test]
fn wide_sibling_lists_stay_linked_through_edits() {
    let (mut doc, body) = Document::with_body();
    let items: Vec<_> = (0..10_000)
        .map(|_| {
            let b = doc.create_element(QualName::html("b"));
            doc.append_child(body, b);
            b
        })
        .collect();
    assert_eq!(doc.index_in_parent(items[9_999]), Some(9_999));

    for &item in items.iter().step_by(2) {
        doc.detach(item);
    }
    assert_eq!(doc.children(body).len(), 5_000);
    assert_eq!(doc.first_child(body), Some(items[1]));
    assert_eq!(doc.last_child(body), Some(items[9_999]));
    assert_eq!(doc.next_sibling(items[1]), Some(items[3]));
    assert_eq!(doc.previous_sibling(items[3]), Some(items[1]));
    assert_eq!(doc.previous_sibling(items[1]), None);

    doc.insert_before(body, items[0], Some(items[1]));
    doc.append_child(body, items[2]);
    assert_eq!(doc.first_child(body), Some(items[0]));
    assert_eq!(doc.last_child(body), Some(items[2]));
    assert_eq!(doc.next_sibling(items[9_999]), Some(items[2]));

    let backwards: Vec<_> = doc.child_nodes(body).rev().take(2).collect();
    assert_eq!(backwards, [items[2], items[9_999]]);

    doc.remove_all_children(body);
    assert!(!doc.has_children(body));
    assert_eq!(doc.parent(items[1]), None);
    assert_eq!(doc.next_sibling(items[1]), None);
}

#[test]
fn attributes_are_set_in_the_namespace_of_their_prefix() {
    let (mut doc, body) = Document::with_body();
    doc.set_attribute(body, "xlink:href", "#a");
    doc.set_attribute(body, "title", "t");
    doc.set_attribute(body, "title", "u");

    let el = doc.element(body).unwrap();
    assert_eq!(el.attrs.len(), 2);
    assert_eq!(el.attr("xlink:href").unwrap().name.ns, Namespace::XLink);
    assert_eq!(doc.get_attribute(body, "title"), Some("u"));
    assert_eq!(doc.attribute_names(body), vec!["xlink:href", "title"]);

    let removed = doc.remove_attribute(body, "title").unwrap();
    assert_eq!(removed.value, "u");
    assert!(doc.remove_attribute(body, "title").is_none());
}

#[test]
fn text_content_skips_comments_and_set_text_content_replaces_children() {
    let mut doc = parse_html("<div>a<!--c--><b>b</b></div>");
    let body = doc.body().unwrap();
    let div = doc.first_child(body).unwrap();
    assert_eq!(doc.text_content(div), "ab");

    doc.set_text_content(div, "<x>");
    assert_eq!(doc.inner_html(body), "<div>&lt;x&gt;</div>");
}

#[test]
fn import_copies_template_contents() {
    let source = parse_html("<template><p>in</p></template>");
    let template = doc_first(&source);
    let (mut doc, body) = Document::with_body();
    let copy = doc.import(&source, template);
    doc.append_child(body, copy);
    assert_eq!(doc.inner_html(body), "<template><p>in</p></template>");
    assert!(matches!(
        doc.data(doc.template_contents(copy).unwrap()),
        NodeData::Fragment
    ));
}

#[test]
fn depth_and_ancestry_follow_parent_links() {
    let doc = parse_html("<div><p><i>x</i></p></div>");
    let body = doc.body().unwrap();
    let i = doc
        .descendants(body)
        .into_iter()
        .find(|&n| doc.node_name(n) == "i")
        .unwrap();
    assert!(doc.is_inclusive_ancestor(body, i));
    assert!(!doc.is_inclusive_ancestor(i, body));
    // document > html > body > div > p > i
    assert_eq!(doc.depth(i), 5);
}

fn doc_first(doc: &Document) -> purify_dom::NodeId {
    doc.first_child(doc.head().unwrap()).unwrap()
}
