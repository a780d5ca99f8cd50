use purify::dom::{Document, NodeId, parse_html};
use purify::{Config, HookPoint, Policy, Sanitizer};
use parking_lot::Mutex;
use std::sync::Arc;

const PAYLOADS: &[&str] = &[
    "<p>hello <b>world</b></p>",
    r#"<img src="x" onerror="alert(1)">"#,
    r#"<svg><g onload="x()"><circle r="1"></circle></g></svg>"#,
    r#"<a href="javascript:alert(1)">l</a><a href="https://ok.example/">m</a>"#,
    r#"<a href=" JaVaScRiPt:alert(1)">l</a>"#,
    "<math><mi><b>x</b></mi></math>",
    "<table><tr><td>x</td></tr></table>",
    "<ul><li>a<li>b</ul>",
    r#"<div id="cookie" name="x">t</div>"#,
    r#"<iframe src="https://a.example/"></iframe>text"#,
    "<style>p{}</style><p>x</p>",
    "<p>a<u2>b</u2>c</p>",
    r#"<form action="javascript:x()"><input value=" v " onfocus="x()"></form>"#,
    "<svg><foreignObject><script>alert(1)</script></foreignObject></svg>",
    r#"<object data="x"></object><embed src="y">"#,
    r#"<p title="a/>b" class="c">x</p>"#,
    "<noscript><p title=\"</noscript><img src=x onerror=alert(1)>\"></noscript>",
    "<form><math><mtext></form><form><mglyph><style></math><img src onerror=alert(1)>",
];

fn elements(doc: &Document) -> Vec<NodeId> {
    let Some(body) = doc.body() else {
        return Vec::new();
    };
    doc.descendants(body)
        .into_iter()
        .filter(|&n| doc.is_element(n))
        .collect()
}

fn looks_like_script_url(value: &str) -> bool {
    let squeezed: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();
    squeezed.starts_with("javascript:") || squeezed.starts_with("vbscript:")
}

#[test]
fn sanitizing_twice_changes_nothing() {
    let mut sanitizer = Sanitizer::new();
    for payload in PAYLOADS {
        let once = sanitizer.sanitize_to_string(payload);
        let twice = sanitizer.sanitize_to_string(&once);
        assert_eq!(once, twice, "{payload}");
    }
}

#[test]
fn output_only_holds_allowed_tags_and_attributes() {
    let policy = Policy::default();
    let mut sanitizer = Sanitizer::new();
    for payload in PAYLOADS {
        let out = sanitizer.sanitize_to_string(payload);
        let doc = parse_html(&out);
        for node in elements(&doc) {
            let Some(el) = doc.element(node) else {
                continue;
            };
            let tag = policy.fold_case(&el.tag_name());
            assert!(policy.allows_tag(&tag), "{payload}: <{tag}>");
            for attr in &el.attrs {
                let name = policy.fold_case(&attr.qualified_name());
                assert!(
                    policy.is_valid_attribute(&tag, &name, &attr.value),
                    "{payload}: {name}={:?}",
                    attr.value
                );
            }
        }
    }
}

#[test]
fn no_script_urls_or_event_handlers_survive() {
    let mut sanitizer = Sanitizer::new();
    for payload in PAYLOADS {
        let out = sanitizer.sanitize_to_string(payload);
        let doc = parse_html(&out);
        for node in elements(&doc) {
            for name in doc.attribute_names(node) {
                assert!(!name.to_lowercase().starts_with("on"), "{payload}: {name}");
                let value = doc.get_attribute(node, &name).unwrap_or_default();
                assert!(!looks_like_script_url(value), "{payload}: {name}={value}");
            }
        }
        assert!(!out.contains("<script"), "{payload}");
    }
}

#[test]
fn forbidden_contents_take_every_descendant_along() {
    let config = Config {
        forbid_tags: vec!["section".to_string()],
        add_forbid_contents: vec!["section".to_string()],
        ..Config::default()
    };
    let mut sanitizer = Sanitizer::new();
    let out = sanitizer
        .sanitize_with(
            "<section><p>a<b>b</b></p><svg><circle r=\"1\"></circle></svg></section><i>kept</i>",
            &config,
        )
        .into_html();
    assert_eq!(out.as_deref(), Some("<i>kept</i>"));
    assert_eq!(sanitizer.removed()[0].node_name(), "section");
}

#[test]
fn hooks_of_one_stage_run_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sanitizer = Sanitizer::new();
    for n in 0..4 {
        let log = Arc::clone(&log);
        sanitizer.add_hook(HookPoint::UponSanitizeAttribute, move |_| log.lock().push(n));
    }
    sanitizer.sanitize_to_string(r#"<p title="t">x</p>"#);
    assert_eq!(*log.lock(), vec![0, 1, 2, 3]);
}

#[test]
fn independent_sanitizers_do_not_share_state() {
    let mut strict = Sanitizer::new();
    strict.set_config(&Config {
        allowed_tags: Some(vec!["b".to_string()]),
        ..Config::default()
    });
    strict.add_hook(HookPoint::AfterSanitizeAttributes, |ctx| {
        ctx.document.set_attribute(ctx.node, "data-seen", "1");
    });
    let mut plain = Sanitizer::new();

    assert_eq!(strict.sanitize_to_string("<b>x</b><i>y</i>"), r#"<b data-seen="1">x</b>y"#);
    assert_eq!(plain.sanitize_to_string("<b>x</b><i>y</i>"), "<b>x</b><i>y</i>");
}
