use crate::*;
use purify_dom::namespace::{HTML_NAMESPACE, SVG_NAMESPACE};

fn run(markup: &str, config: Config) -> String {
    Sanitizer::new()
        .sanitize_with(markup, &config)
        .into_html()
        .unwrap_or_default()
}

#[test]
fn mathml_text_integration_points_keep_html() {
    let markup = "<math><mi><b>x</b></mi></math>";
    assert_eq!(run(markup, Config::default()), markup);
}

#[test]
fn allowed_integration_points_host_html_inside_svg() {
    let config = Config {
        add_tags: vec!["foreignObject".to_string()],
        ..Config::default()
    };
    let markup = "<svg><foreignObject><p>x</p></foreignObject></svg>";
    assert_eq!(run(markup, config), markup);
}

#[test]
fn html_below_a_non_integration_point_is_removed() {
    let config = Config {
        add_tags: vec!["foreignObject".to_string()],
        html_integration_points: Some(vec!["annotation-xml".to_string()]),
        ..Config::default()
    };
    assert_eq!(
        run("<svg><foreignObject><p>x</p></foreignObject></svg>", config),
        "<svg><foreignObject></foreignObject></svg>"
    );
}

#[test]
fn namespaces_outside_the_allowlist_are_removed_with_their_content() {
    let config = Config {
        allowed_namespaces: Some(vec![HTML_NAMESPACE.to_string()]),
        ..Config::default()
    };
    assert_eq!(
        run("<svg><circle r=\"1\"></circle></svg><p>x</p>", config),
        "<p>x</p>"
    );
}

#[test]
fn xhtml_input_is_parsed_as_xml() {
    let config = Config {
        parser_media_type: "application/xhtml+xml".to_string(),
        ..Config::default()
    };
    assert_eq!(run("<p>x<br/></p>", config.clone()), "<p>x<br /></p>");
    assert_eq!(run("<p>unclosed", config), "");
}

#[test]
fn xhtml_names_are_case_sensitive() {
    let config = Config {
        parser_media_type: "application/xhtml+xml".to_string(),
        ..Config::default()
    };
    assert_eq!(run("<P>x</P><b>y</b>", config), "x<b>y</b>");
}

#[test]
fn foreign_root_namespace_sanitizes_xml_fragments() {
    let config = Config {
        namespace: SVG_NAMESPACE.to_string(),
        ..Config::default()
    };
    assert_eq!(
        run(r#"<circle r="1" onload="x()"/><script>alert(1)</script>"#, config),
        r#"<circle r="1"/>"#
    );
}

#[test]
fn comments_with_markup_are_dropped_even_when_allowed_near_foreign_content() {
    let config = Config {
        add_tags: vec!["#comment".to_string()],
        safe_for_xml: false,
        ..Config::default()
    };
    assert_eq!(
        run("<p><!-- note --></p>", config.clone()),
        "<p><!-- note --></p>"
    );
    assert_eq!(
        run("<p><!--<img src=x>--></p>", config.clone()),
        "<p><!--<img src=x>--></p>"
    );
    assert_eq!(run("<svg></svg><p><!--<img src=x>--></p>", config), "<svg></svg><p></p>");
}

#[test]
fn markup_hidden_in_raw_text_is_removed() {
    let config = Config {
        force_body: true,
        ..Config::default()
    };
    assert_eq!(run("<style>&lt;/style&gt;<img src=x></style><p>y</p>", config), "<p>y</p>");
}

#[test]
fn form_nested_through_mathml_text_is_removed() {
    let mut sanitizer = Sanitizer::new();
    let out = sanitizer.sanitize_to_string(
        "<form><math><mtext></form><form><mglyph><style></math><img src onerror=alert(1)>",
    );
    assert_eq!(out, "<form><math><mtext></mtext></math></form>");
    assert_eq!(sanitizer.removed()[0].node_name(), "form");
    assert_eq!(sanitizer.sanitize_to_string(&out), out);
}
