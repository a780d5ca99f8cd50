use purify_core::{Config, Sanitizer};
use serde_json::json;

fn run(markup: &str, config: serde_json::Value) -> String {
    Sanitizer::new()
        .sanitize_with(markup, &Config::from_json(&config))
        .into_html()
        .unwrap_or_default()
}

#[test]
fn data_uris_follow_the_tag_list() {
    let markup = r#"<a href="data:text/plain,hi">x</a>"#;
    assert_eq!(run(markup, json!({})), "<a>x</a>");
    assert_eq!(run(markup, json!({ "ADD_DATA_URI_TAGS": ["a"] })), markup);
}

#[test]
fn uri_safe_attributes_skip_the_scheme_check() {
    let markup = r#"<p lang="javascript:x">t</p>"#;
    assert_eq!(run(markup, json!({})), "<p>t</p>");
    assert_eq!(run(markup, json!({ "ADD_URI_SAFE_ATTR": ["lang"] })), markup);
}

#[test]
fn forbid_contents_replaces_the_default_list() {
    let markup = "<p>a<noembed>b</noembed><custom>c</custom></p>";
    assert_eq!(run(markup, json!({})), "<p>ac</p>");
    assert_eq!(
        run(markup, json!({ "FORBID_CONTENTS": ["custom"] })),
        "<p>ab</p>"
    );
}

#[test]
fn invalid_patterns_are_ignored() {
    let config = json!({
        "ALLOWED_URI_REGEXP": "(unclosed",
        "CUSTOM_ELEMENT_HANDLING": { "tagNameCheck": "[bad" }
    });
    assert_eq!(
        run(r#"<a href="https://a.example/">a</a><x-y>b</x-y>"#, config),
        r#"<a href="https://a.example/">a</a>b"#
    );
}

#[test]
fn whole_document_with_templates_blanked() {
    let out = run(
        "<title>{{t}}</title><p>${x} y</p>",
        json!({ "WHOLE_DOCUMENT": true, "SAFE_FOR_TEMPLATES": true }),
    );
    assert_eq!(
        out,
        "<html><head><title> </title></head><body><p> </p></body></html>"
    );
}

#[test]
fn wrong_types_fall_back_to_defaults() {
    let config = json!({
        "KEEP_CONTENT": "no",
        "ALLOWED_TAGS": "p",
        "USE_PROFILES": [1, 2]
    });
    assert_eq!(run("<p>a<u2>b</u2></p>", config), "<p>ab</p>");
}
