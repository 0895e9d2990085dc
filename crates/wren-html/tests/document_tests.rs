//! Integration tests for document metadata and the top-level entry points.

use wren_common::LineCol;
use wren_dom::{ArenaError, NodeData, NodeId};
use wren_html::{
    BaseUrl, DocumentMode, HtmlError, ParseOptions, parse, parse_bytes, parse_with_options,
};

const CANONICAL: &str = "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>";

#[test]
fn test_empty_input_manufactures_everything() {
    let document = parse("").unwrap();
    let meta = document.metadata();
    assert!(meta.manufactured_html);
    assert!(meta.manufactured_head);
    assert!(meta.manufactured_body);
    assert!(!meta.duplicate_html_elements);
    assert!(!meta.duplicate_body_elements);
    assert_eq!(meta.html_src_bytes, 0);

    let tree = document.tree();
    assert!(tree.head().is_some());
    assert!(tree.body().is_some());
}

#[test]
fn test_canonical_document_sets_no_flags() {
    let document = parse(CANONICAL).unwrap();
    let meta = document.metadata();
    assert!(!meta.manufactured_html);
    assert!(!meta.manufactured_head);
    assert!(!meta.manufactured_body);
    assert!(!meta.duplicate_html_elements);
    assert!(!meta.duplicate_body_elements);
    assert_eq!(meta.duplicate_html_location, None);
    assert_eq!(meta.duplicate_body_location, None);
    assert!(!meta.quirks_mode());
    assert_eq!(meta.base_url, BaseUrl::default());
    assert_eq!(meta.canonical_url, None);
}

#[test]
fn test_only_missing_elements_are_manufactured() {
    let document = parse("<html><body>x").unwrap();
    let meta = document.metadata();
    assert!(!meta.manufactured_html);
    assert!(meta.manufactured_head);
    assert!(!meta.manufactured_body);
}

#[test]
fn test_duplicate_body_merges_attributes() {
    let document = parse("<body><body foo=bar>").unwrap();
    let meta = document.metadata();
    assert!(meta.duplicate_body_elements);
    assert_eq!(meta.duplicate_body_location, Some(LineCol::new(1, 7)));

    let tree = document.tree();
    let html = tree.document_element().unwrap();
    let bodies = tree
        .children(html)
        .filter(|&id| tree.tag_name(id) == Some("body"))
        .count();
    assert_eq!(bodies, 1);
    assert_eq!(tree.attribute(tree.body().unwrap(), "foo"), Some("bar"));
}

#[test]
fn test_duplicate_body_keeps_existing_attributes() {
    let document = parse("<body class=a><body class=b id=c>").unwrap();
    let tree = document.tree();
    let body = tree.body().unwrap();
    assert_eq!(tree.attribute(body, "class"), Some("a"));
    assert_eq!(tree.attribute(body, "id"), Some("c"));
}

#[test]
fn test_duplicate_html_records_first_location() {
    let document = parse("<html>\n<html lang=en>\n<html dir=rtl>").unwrap();
    let meta = document.metadata();
    assert!(meta.duplicate_html_elements);
    assert_eq!(meta.duplicate_html_location, Some(LineCol::new(2, 1)));

    let tree = document.tree();
    let html = tree.document_element().unwrap();
    assert_eq!(tree.attribute(html, "lang"), Some("en"));
    assert_eq!(tree.attribute(html, "dir"), Some("rtl"));
}

#[test]
fn test_document_end_location() {
    let document = parse("ab\ncd").unwrap();
    assert_eq!(
        document.metadata().document_end_location,
        LineCol::new(2, 3)
    );
}

#[test]
fn test_html_src_bytes_counts_bytes() {
    let document = parse("<p>é</p>").unwrap();
    assert_eq!(document.metadata().html_src_bytes, 9);
}

#[test]
fn test_base_url_uses_first_href_and_first_target() {
    let document = parse(
        "<head><base target=_top><base href=/a/><base href=/b/ target=_self></head>",
    )
    .unwrap();
    let base = &document.metadata().base_url;
    assert_eq!(base.url, "/a/");
    assert_eq!(base.target, "_top");
}

#[test]
fn test_canonical_url_from_link() {
    let document = parse(
        r#"<link rel="alternate" href="/alt"><link rel="Canonical stylesheet" href="/one"><link rel=canonical href="/two">"#,
    )
    .unwrap();
    assert_eq!(document.metadata().canonical_url.as_deref(), Some("/two"));
}

#[test]
fn test_missing_doctype_is_quirks() {
    let document = parse("<p>x</p>").unwrap();
    assert!(document.metadata().quirks_mode());
    assert_eq!(document.metadata().document_mode(), DocumentMode::Quirks);
}

#[test]
fn test_html5_doctype_is_no_quirks() {
    let document = parse("<!doctype html><p>x</p>").unwrap();
    assert!(!document.metadata().quirks_mode());
    assert_eq!(document.metadata().document_mode(), DocumentMode::NoQuirks);
}

#[test]
fn test_legacy_doctypes() {
    let quirky = parse(r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#)
        .unwrap();
    assert_eq!(quirky.metadata().document_mode(), DocumentMode::Quirks);

    let limited = parse(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#,
    )
    .unwrap();
    assert_eq!(
        limited.metadata().document_mode(),
        DocumentMode::LimitedQuirks
    );
    assert!(!limited.metadata().quirks_mode());

    let strict = parse(
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    )
    .unwrap();
    assert_eq!(strict.metadata().document_mode(), DocumentMode::NoQuirks);
}

#[test]
fn test_document_mode_display_is_kebab_case() {
    assert_eq!(DocumentMode::NoQuirks.to_string(), "no-quirks");
    assert_eq!(DocumentMode::LimitedQuirks.to_string(), "limited-quirks");
    assert_eq!(DocumentMode::Quirks.to_string(), "quirks");
}

#[test]
fn test_doctype_node() {
    let document = parse(r#"<!DOCTYPE html SYSTEM "about:legacy-compat">"#).unwrap();
    let tree = document.tree();
    let first = tree.first_child(NodeId::ROOT).unwrap();
    match &tree.get(first).unwrap().data {
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            assert_eq!(name, "html");
            assert_eq!(public_id, "");
            assert_eq!(system_id, "about:legacy-compat");
        }
        other => panic!("expected doctype, got {other:?}"),
    }
}

#[test]
fn test_document_is_not_a_fragment() {
    let document = parse("<p>x").unwrap();
    assert!(!document.is_fragment());
    assert!(document.fragment_nodes().is_empty());
    assert_eq!(document.root_node(), NodeId::ROOT);
}

// ========== parse_bytes ==========

#[test]
fn test_parse_bytes_strips_bom() {
    let bytes = b"\xEF\xBB\xBF<p>hi</p>";
    let document = parse_bytes(bytes, ParseOptions::default()).unwrap();
    let tree = document.tree();
    assert_eq!(tree.text_content(tree.body().unwrap()), "hi");
    assert_eq!(document.metadata().html_src_bytes, bytes.len());
}

#[test]
fn test_parse_bytes_rejects_invalid_utf8() {
    let result = parse_bytes(b"<p>\xFF\xFE</p>", ParseOptions::default());
    assert!(matches!(result, Err(HtmlError::UndecodableInput(_))));
}

// ========== Options ==========

#[test]
fn test_node_limit_aborts_parse() {
    let options = ParseOptions::default().with_node_limit(3);
    let result = parse_with_options("<p>x</p>", options);
    assert_eq!(
        result.unwrap_err(),
        HtmlError::Arena(ArenaError::CapacityExceeded { limit: 3 })
    );
}

#[test]
fn test_node_limit_large_enough() {
    let options = ParseOptions::default().with_node_limit(64);
    assert!(parse_with_options(CANONICAL, options).is_ok());
}

#[test]
fn test_record_locations_off() {
    let options = ParseOptions::default().with_record_locations(false);
    let document = parse_with_options(CANONICAL, options).unwrap();
    let tree = document.tree();
    let html = tree.document_element().unwrap();
    assert_eq!(tree.location(html), None);
    assert_eq!(tree.location(tree.body().unwrap()), None);
}

#[test]
fn test_record_locations_on() {
    let document = parse("<html>\n<body>").unwrap();
    let tree = document.tree();
    assert_eq!(tree.location(tree.body().unwrap()), Some(LineCol::new(2, 1)));
}

// ========== Editing the result ==========

#[test]
fn test_new_and_cloned_nodes_join_the_arena() {
    let mut document = parse("<p class=a>x</p>").unwrap();
    let p = document
        .tree()
        .children(document.tree().body().unwrap())
        .next()
        .unwrap();

    let comment = document
        .new_node(NodeData::Comment("added".to_string()))
        .unwrap();
    let copy = document.clone_node(p).unwrap();
    assert_eq!(document.tree().parent(comment), None);
    assert_eq!(document.tree().parent(copy), None);
    assert_eq!(document.tree().attribute(copy, "class"), Some("a"));
    assert_eq!(document.tree().first_child(copy), None);

    let body = document.tree().body().unwrap();
    document.tree_mut().append_child(body, comment);
    let tree = document.into_tree();
    assert_eq!(tree.last_child(body), Some(comment));
    assert_eq!(tree.as_comment(comment), Some("added"));
}
