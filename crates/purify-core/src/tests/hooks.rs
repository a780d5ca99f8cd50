use crate::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn element_hook_can_override_the_tag_decision() {
    let mut sanitizer = Sanitizer::new();
    sanitizer.add_hook(HookPoint::UponSanitizeElement, |ctx| {
        if let HookData::Element(check) = &mut ctx.data {
            if check.tag_name == "iframe" {
                check.allowed = true;
            }
        }
    });
    assert_eq!(
        sanitizer.sanitize_to_string(r#"<iframe src="https://a.example/"></iframe>"#),
        r#"<iframe src="https://a.example/"></iframe>"#
    );
}

#[test]
fn attribute_hook_can_force_keep_or_drop() {
    let mut sanitizer = Sanitizer::new();
    sanitizer.add_hook(HookPoint::UponSanitizeAttribute, |ctx| {
        if let HookData::Attribute(check) = &mut ctx.data {
            match check.attr_name.as_str() {
                "onclick" => check.force_keep_attr = true,
                "title" => check.keep_attr = false,
                "class" => check.attr_value = check.attr_value.to_uppercase(),
                _ => {}
            }
        }
    });
    let out =
        sanitizer.sanitize_to_string(r#"<p onclick="go()" title="t" class="note">x</p>"#);
    assert_eq!(out, r#"<p onclick="go()" class="NOTE">x</p>"#);
    assert_eq!(sanitizer.removed().len(), 1);
    assert_eq!(sanitizer.removed()[0].attribute_name(), Some("title"));
}

#[test]
fn attributes_added_by_attribute_hooks_are_validated() {
    let mut sanitizer = Sanitizer::new();
    sanitizer.add_hook(HookPoint::UponSanitizeAttribute, |ctx| {
        ctx.document.set_attribute(ctx.node, "onmouseover", "steal()");
        ctx.document.set_attribute(ctx.node, "lang", "en");
    });
    assert_eq!(
        sanitizer.sanitize_to_string(r#"<p title="t">x</p>"#),
        r#"<p title="t" lang="en">x</p>"#
    );
    assert!(
        sanitizer
            .removed()
            .iter()
            .any(|r| r.attribute_name() == Some("onmouseover"))
    );
}

#[test]
fn after_attribute_hooks_have_the_last_word() {
    let mut sanitizer = Sanitizer::new();
    sanitizer.add_hook(HookPoint::AfterSanitizeAttributes, |ctx| {
        if ctx.document.node_name(ctx.node) == "a" {
            ctx.document.set_attribute(ctx.node, "target", "_blank");
        }
    });
    assert_eq!(
        sanitizer.sanitize_to_string(r#"<a href="/x">x</a>"#),
        r#"<a href="/x" target="_blank">x</a>"#
    );
}

#[test]
fn hooks_fire_in_stage_order_and_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sanitizer = Sanitizer::new();
    for (point, label) in [
        (HookPoint::AfterSanitizeElements, "after-elements"),
        (HookPoint::BeforeSanitizeElements, "before-elements-1"),
        (HookPoint::BeforeSanitizeElements, "before-elements-2"),
        (HookPoint::BeforeSanitizeAttributes, "before-attributes"),
    ] {
        let log = Arc::clone(&log);
        sanitizer.add_hook(point, move |ctx| {
            if ctx.document.node_name(ctx.node) == "b" {
                log.lock().push(label);
            }
        });
    }
    sanitizer.sanitize_to_string("<b>x</b>");
    assert_eq!(
        *log.lock(),
        vec![
            "before-elements-1",
            "before-elements-2",
            "after-elements",
            "before-attributes",
        ]
    );
}

#[test]
fn remove_hook_pops_the_latest_registration() {
    let mut sanitizer = Sanitizer::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for label in ["a", "b"] {
        let log = Arc::clone(&log);
        sanitizer.add_hook(HookPoint::UponSanitizeElement, move |_| log.lock().push(label));
    }
    assert!(sanitizer.remove_hook(HookPoint::UponSanitizeElement).is_some());
    sanitizer.sanitize_to_string("<i>x</i>");
    assert!(log.lock().iter().all(|&l| l == "a"));
    assert!(!log.lock().is_empty());

    assert!(sanitizer.remove_hook(HookPoint::UponSanitizeElement).is_some());
    assert!(sanitizer.remove_hook(HookPoint::UponSanitizeElement).is_none());

    sanitizer.add_hook(HookPoint::AfterSanitizeElements, |_| {});
    sanitizer.remove_hooks(HookPoint::AfterSanitizeElements);
    assert_eq!(sanitizer.hooks().len(HookPoint::AfterSanitizeElements), 0);
    sanitizer.add_hook(HookPoint::AfterSanitizeElements, |_| {});
    sanitizer.remove_all_hooks();
    assert!(sanitizer.hooks().is_empty());
}

#[test]
fn hooks_may_restructure_the_tree_mid_walk() {
    let mut sanitizer = Sanitizer::new();
    sanitizer.add_hook(HookPoint::BeforeSanitizeElements, |ctx| {
        let doc = &mut *ctx.document;
        if doc.node_name(ctx.node) != "b" {
            return;
        }
        if let Some(next) = doc.next_sibling(ctx.node) {
            doc.detach(next);
        }
        if let Some(parent) = doc.parent(ctx.node) {
            let late = doc.create_element(purify_dom::QualName::html("i"));
            doc.set_attribute(late, "onclick", "x()");
            doc.append_child(parent, late);
        }
    });
    let out = sanitizer.sanitize_to_string("<b>1</b><u>2</u><s>3</s>");
    assert_eq!(out, "<b>1</b><s>3</s><i></i>");
}

#[test]
fn shadow_hooks_fire_for_template_contents() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut sanitizer = Sanitizer::new();
    for point in [
        HookPoint::BeforeSanitizeShadowDom,
        HookPoint::UponSanitizeShadowNode,
        HookPoint::AfterSanitizeShadowDom,
    ] {
        let log = Arc::clone(&log);
        sanitizer.add_hook(point, move |ctx| {
            log.lock()
                .push(format!("{point}:{}", ctx.document.node_name(ctx.node)));
        });
    }
    let out = sanitizer
        .sanitize_to_string(r#"<p>a</p><template><b onclick="x()">t</b></template>"#);
    assert_eq!(out, "<p>a</p><template><b>t</b></template>");
    assert_eq!(
        *log.lock(),
        vec![
            "beforeSanitizeShadowDOM:#document-fragment",
            "uponSanitizeShadowNode:b",
            "uponSanitizeShadowNode:#text",
            "afterSanitizeShadowDOM:#document-fragment",
        ]
    );
}

#[test]
fn hook_context_exposes_the_active_policy() {
    let seen = Arc::new(Mutex::new(None));
    let mut sanitizer = Sanitizer::new();
    let sink = Arc::clone(&seen);
    sanitizer.add_hook(HookPoint::BeforeSanitizeElements, move |ctx| {
        *sink.lock() = Some(ctx.policy.keep_content);
    });
    let config = Config {
        keep_content: false,
        ..Config::default()
    };
    sanitizer.sanitize_with("<b>x</b>", &config);
    assert_eq!(*seen.lock(), Some(false));
}
