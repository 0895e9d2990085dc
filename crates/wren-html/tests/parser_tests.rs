//! Integration tests for tree construction.

use std::time::{Duration, Instant};

use wren_dom::{DomTree, Namespace, NodeData, NodeId, NodeType};
use wren_html::{Document, ParseOptions, parse, parse_with_options};

/// Render a subtree compactly: elements as `name[children]`, text as a
/// quoted string, comments as `<!--data-->`.
fn outline(tree: &DomTree, id: NodeId) -> String {
    match tree.get(id).map(|n| &n.data) {
        Some(NodeData::Text(text)) => format!("{text:?}"),
        Some(NodeData::Comment(data)) => format!("<!--{data}-->"),
        Some(NodeData::Doctype { name, .. }) => format!("<!DOCTYPE {name}>"),
        Some(NodeData::Element(element)) => {
            let name = tree.resolve(element.name);
            let children: Vec<String> = tree.children(id).map(|c| outline(tree, c)).collect();
            if children.is_empty() {
                name.to_string()
            } else {
                format!("{name}[{}]", children.join(", "))
            }
        }
        Some(NodeData::Document) | None => "#document".to_string(),
    }
}

/// Parse and outline the body's children.
fn body_outline(html: &str) -> String {
    let document = parse(html).expect("parse failed");
    let tree = document.tree();
    let body = tree.body().expect("no body");
    tree.children(body)
        .map(|c| outline(tree, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// First element named `tag`, depth-first.
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if tree.tag_name(from) == Some(tag) {
        return Some(from);
    }
    tree.children(from)
        .find_map(|child| find_element(tree, child, tag))
}

fn find(document: &Document, tag: &str) -> NodeId {
    find_element(document.tree(), NodeId::ROOT, tag)
        .unwrap_or_else(|| panic!("no <{tag}> in document"))
}

// ========== Document structure ==========

#[test]
fn test_document_structure() {
    let document = parse("<!DOCTYPE html><html><head></head><body></body></html>").unwrap();
    let tree = document.tree();

    let children: Vec<NodeId> = tree.children(NodeId::ROOT).collect();
    assert_eq!(children.len(), 2);
    assert_eq!(tree.node_type(children[0]), Some(NodeType::Doctype));
    assert_eq!(outline(tree, children[1]), "html[head, body]");
}

#[test]
fn test_implied_structure() {
    let document = parse("Hello").unwrap();
    let tree = document.tree();
    let html = tree.document_element().unwrap();
    assert_eq!(outline(tree, html), r#"html[head, body["Hello"]]"#);
}

#[test]
fn test_whitespace_before_html_is_dropped() {
    let document = parse("  \n<html><body>x").unwrap();
    let tree = document.tree();
    assert_eq!(tree.children(NodeId::ROOT).count(), 1);
}

#[test]
fn test_comments_outside_html() {
    let document = parse("<!--a--><html><!--b--></html><!--c-->").unwrap();
    let tree = document.tree();
    let top: Vec<String> = tree
        .children(NodeId::ROOT)
        .map(|c| outline(tree, c))
        .collect();
    assert_eq!(top, vec!["<!--a-->", "html[<!--b-->, head, body]", "<!--c-->"]);
}

#[test]
fn test_adjacent_characters_merge_into_one_text_node() {
    let document = parse("<p>a&amp;b c</p>").unwrap();
    let tree = document.tree();
    let p = find(&document, "p");
    let kids: Vec<NodeId> = tree.children(p).collect();
    assert_eq!(kids.len(), 1);
    assert_eq!(tree.as_text(kids[0]), Some("a&b c"));
}

// ========== In body ==========

#[test]
fn test_misnested_formatting_without_furthest_block() {
    assert_eq!(
        body_outline("<p>1<b>2<i>3</b>4</i>5</p>"),
        r#"p["1", b["2", i["3"]], i["4"], "5"]"#
    );
}

#[test]
fn test_adoption_agency_with_furthest_block() {
    assert_eq!(
        body_outline("<b>1<p>2</b>3</p>"),
        r#"b["1"], p[b["2"], "3"]"#
    );
}

#[test]
fn test_nested_anchor_closes_previous() {
    assert_eq!(body_outline("<a>1<a>2"), r#"a["1"], a["2"]"#);
}

#[test]
fn test_noahs_ark_limits_reconstruction() {
    assert_eq!(
        body_outline("<p><b><b><b><b></p>x"),
        r#"p[b[b[b[b]]]], b[b[b["x"]]]"#
    );
}

#[test]
fn test_list_items_close_each_other() {
    assert_eq!(
        body_outline("<ul><li>a<li>b</ul>"),
        r#"ul[li["a"], li["b"]]"#
    );
    assert_eq!(
        body_outline("<dl><dt>a<dd>b<dt>c</dl>"),
        r#"dl[dt["a"], dd["b"], dt["c"]]"#
    );
}

#[test]
fn test_block_closes_open_paragraph() {
    assert_eq!(body_outline("<p>a<div>b</div>"), r#"p["a"], div["b"]"#);
}

#[test]
fn test_nested_headings() {
    assert_eq!(body_outline("<h1>a<h2>b"), r#"h1["a"], h2["b"]"#);
}

#[test]
fn test_stray_end_tags() {
    assert_eq!(body_outline("<body></p>x"), r#"p, "x""#);
    assert_eq!(body_outline("</p>x"), r#""x""#);
    assert_eq!(body_outline("a</br>b"), r#""a", br, "b""#);
    assert_eq!(body_outline("</span>x"), r#""x""#);
}

#[test]
fn test_image_becomes_img() {
    let document = parse("<image src=a.png>").unwrap();
    let img = find(&document, "img");
    assert_eq!(document.tree().attribute(img, "src"), Some("a.png"));
}

#[test]
fn test_void_elements_take_no_children() {
    assert_eq!(body_outline("<br>a<hr>b"), r#"br, "a", hr, "b""#);
}

#[test]
fn test_pre_drops_leading_newline() {
    let document = parse("<pre>\n\nx</pre>").unwrap();
    let pre = find(&document, "pre");
    assert_eq!(document.tree().text_content(pre), "\nx");
}

#[test]
fn test_textarea_is_rcdata() {
    let document = parse("<textarea>\n<b>&amp;</b></textarea>").unwrap();
    let textarea = find(&document, "textarea");
    assert_eq!(document.tree().text_content(textarea), "<b>&</b>");
}

#[test]
fn test_title_and_script_content() {
    let document = parse("<title>a<b>c</title><script>if (a<b) {}</script>").unwrap();
    let tree = document.tree();
    assert_eq!(tree.text_content(find(&document, "title")), "a<b>c");
    assert_eq!(tree.text_content(find(&document, "script")), "if (a<b) {}");
    let head = tree.head().unwrap();
    assert_eq!(tree.children(head).count(), 2);
}

#[test]
fn test_noscript_with_scripting_enabled_is_raw_text() {
    let document = parse("<body><noscript><p>x</p></noscript>").unwrap();
    let tree = document.tree();
    let noscript = find(&document, "noscript");
    assert_eq!(tree.text_content(noscript), "<p>x</p>");
    assert!(find_element(tree, NodeId::ROOT, "p").is_none());
}

#[test]
fn test_noscript_with_scripting_disabled_is_markup() {
    let options = ParseOptions::default().with_scripting_enabled(false);
    let document = parse_with_options("<body><noscript><p>x</p></noscript>", options).unwrap();
    let tree = document.tree();
    let noscript = find(&document, "noscript");
    assert_eq!(outline(tree, noscript), r#"noscript[p["x"]]"#);
}

#[test]
fn test_second_form_is_ignored() {
    assert_eq!(
        body_outline("<form><form><input></form>"),
        "form[input]"
    );
}

#[test]
fn test_select_options() {
    assert_eq!(
        body_outline("<select><option>a<option>b<optgroup><option>c</select>d"),
        r#"select[option["a"], option["b"], optgroup[option["c"]]], "d""#
    );
}

#[test]
fn test_input_closes_select() {
    assert_eq!(body_outline("<select><input>"), "select, input");
}

#[test]
fn test_ruby() {
    assert_eq!(
        body_outline("<ruby>a<rt>b<rp>c</ruby>"),
        r#"ruby["a", rt["b"], rp["c"]]"#
    );
}

// ========== Tables ==========

#[test]
fn test_table_foster_parenting() {
    assert_eq!(
        body_outline("<table><div>X</div></table>"),
        r#"div["X"], table"#
    );
}

#[test]
fn test_table_text_foster_parenting() {
    assert_eq!(
        body_outline("<table>A<tr><td>B</td></tr></table>"),
        r#""A", table[tbody[tr[td["B"]]]]"#
    );
}

#[test]
fn test_table_whitespace_stays_in_table() {
    assert_eq!(
        body_outline("<table> <tr><td>x</td></tr></table>"),
        r#"table[" ", tbody[tr[td["x"]]]]"#
    );
}

#[test]
fn test_implied_table_sections() {
    assert_eq!(
        body_outline("<table><td>a<td>b<tr><td>c</table>"),
        r#"table[tbody[tr[td["a"], td["b"]], tr[td["c"]]]]"#
    );
}

#[test]
fn test_caption_and_colgroup() {
    assert_eq!(
        body_outline("<table><caption>c</caption><col><tr><td>x</table>"),
        r#"table[caption["c"], colgroup[col], tbody[tr[td["x"]]]]"#
    );
}

#[test]
fn test_nested_table_start_closes_outer() {
    assert_eq!(body_outline("<table><table>"), "table, table");
}

#[test]
fn test_hidden_input_stays_in_table() {
    assert_eq!(
        body_outline("<table><input type=hidden><input></table>"),
        "input, table[input]"
    );
}

#[test]
fn test_formatting_inside_cell_does_not_leak() {
    assert_eq!(
        body_outline("<table><tr><td><b>x</td></tr></table>y"),
        r#"table[tbody[tr[td[b["x"]]]]], "y""#
    );
}

#[test]
fn test_select_in_table_closed_by_cell() {
    assert_eq!(
        body_outline("<table><tr><td><select><option>a<td>b</table>"),
        r#"table[tbody[tr[td[select[option["a"]]], td["b"]]]]"#
    );
}

#[test]
fn test_table_in_quirks_mode_stays_inside_paragraph() {
    assert_eq!(body_outline("<p><table></table>"), "p[table]");
    let document = parse("<!DOCTYPE html><p><table></table>").unwrap();
    let tree = document.tree();
    let body = tree.body().unwrap();
    let kids: Vec<String> = tree.children(body).map(|c| outline(tree, c)).collect();
    assert_eq!(kids, vec!["p", "table"]);
}

// ========== Templates ==========

#[test]
fn test_template_content_in_head() {
    let document = parse("<template><td>x</td></template>").unwrap();
    let tree = document.tree();
    let head = tree.head().unwrap();
    assert_eq!(outline(tree, head), r#"head[template[td["x"]]]"#);
}

#[test]
fn test_unclosed_template_at_eof() {
    let document = parse("<body><template><p>a").unwrap();
    let template = find(&document, "template");
    assert_eq!(outline(document.tree(), template), r#"template[p["a"]]"#);
    assert!(document.issues().iter().any(|i| i.code == "eof-in-template"));
}

// ========== Frameset ==========

#[test]
fn test_frameset_document() {
    let document = parse("<!DOCTYPE html><frameset><frame></frameset><!--x-->").unwrap();
    let tree = document.tree();
    let html = tree.document_element().unwrap();
    assert_eq!(outline(tree, html), "html[head, frameset[frame], <!--x-->]");
    assert!(!document.metadata().manufactured_body);
}

#[test]
fn test_frameset_after_content_is_ignored() {
    assert_eq!(body_outline("<p>x<frameset>"), r#"p["x"]"#);
}

// ========== Foreign content ==========

#[test]
fn test_svg_names_are_adjusted() {
    let document =
        parse(r#"<svg viewbox="0 0 1 1"><foreignobject><p>x</p></foreignobject></svg>"#).unwrap();
    let tree = document.tree();
    let svg = find(&document, "svg");
    assert_eq!(tree.namespace(svg), Some(Namespace::Svg));
    assert_eq!(tree.attribute(svg, "viewBox"), Some("0 0 1 1"));

    let foreign = find(&document, "foreignObject");
    assert_eq!(tree.namespace(foreign), Some(Namespace::Svg));
    let p = find(&document, "p");
    assert_eq!(tree.namespace(p), Some(Namespace::Html));
    assert_eq!(tree.parent(p), Some(foreign));
}

#[test]
fn test_html_breaks_out_of_svg() {
    assert_eq!(body_outline("<svg><g><p>x"), r#"svg[g], p["x"]"#);
}

#[test]
fn test_self_closing_foreign_element() {
    assert_eq!(body_outline("<svg><circle/>x</svg>"), r#"svg[circle, "x"]"#);
}

#[test]
fn test_mathml_text_integration_point() {
    let document = parse("<math><mi>x</mi><annotation-xml encoding=text/html><div>y</div></annotation-xml></math>").unwrap();
    let tree = document.tree();
    let mi = find(&document, "mi");
    assert_eq!(tree.namespace(mi), Some(Namespace::MathMl));
    assert_eq!(tree.text_content(mi), "x");
    let div = find(&document, "div");
    assert_eq!(tree.namespace(div), Some(Namespace::Html));
    assert_eq!(tree.tag_name(tree.parent(div).unwrap()), Some("annotation-xml"));
}

#[test]
fn test_cdata_in_svg() {
    assert_eq!(body_outline("<svg><![CDATA[a<b]]></svg>"), r#"svg["a<b"]"#);
}

// ========== Locations and issues ==========

#[test]
fn test_node_locations() {
    let document = parse("<p>\n  <b>x</b>").unwrap();
    let tree = document.tree();
    let b = find(&document, "b");
    let loc = tree.location(b).unwrap();
    assert_eq!((loc.line, loc.column), (2, 3));
}

#[test]
fn test_locations_can_be_disabled() {
    let options = ParseOptions::default().with_record_locations(false);
    let document = parse_with_options("<p>x</p>", options).unwrap();
    let p = find(&document, "p");
    assert_eq!(document.tree().location(p), None);
}

#[test]
fn test_issues_are_recorded() {
    let document = parse("<p></div>").unwrap();
    let codes: Vec<&str> = document.issues().iter().map(|i| i.code).collect();
    assert!(codes.contains(&"missing-doctype"));
    assert!(codes.contains(&"unexpected-end-tag"));

    let clean = parse("<!DOCTYPE html><html><head><title>t</title></head><body></body></html>")
        .unwrap();
    assert!(clean.issues().is_empty(), "{:?}", clean.issues());
}

// ========== Termination ==========

#[test]
fn test_malformed_inputs_terminate() {
    let inputs = [
        "<",
        "</",
        "<!",
        "<!--",
        "<table><table><table>",
        "<select><table><select>",
        "<svg><math><svg><p>",
        "<template><template><tr></template>",
        "<frameset><frameset></html>x",
        "<table><caption><table></caption>",
        "</html></body></head>",
        "<math><annotation-xml encoding=text/html><table><td>",
        "<a><table><a><tr><a></table></a>",
        "<plaintext></plaintext>",
        "<b><p><i><table><td></b>",
        "\0<\0>",
    ];
    for input in inputs {
        let document = parse(input).expect(input);
        assert!(document.tree().document_element().is_some(), "{input}");
    }
}

#[test]
fn test_deep_and_repetitive_input_terminates() {
    let nested = "<div>".repeat(2000);
    assert!(parse(&nested).is_ok());

    let anchors = "<a>x".repeat(300);
    assert!(parse(&anchors).is_ok());

    let misnested = "<b><i><u><p>x</b></i></u>".repeat(100);
    assert!(parse(&misnested).is_ok());
}

/// Follow last children down from `from` and return the deepest node.
fn deepest_last_child(tree: &DomTree, from: NodeId) -> NodeId {
    let mut node = from;
    while let Some(child) = tree.last_child(node) {
        node = child;
    }
    node
}

#[test]
fn test_deeply_nested_input_parses_in_linear_time() {
    let started = Instant::now();

    let spans = format!("{}x", "<span>".repeat(50_000));
    let document = parse(&spans).unwrap();
    let tree = document.tree();
    let text = deepest_last_child(tree, tree.body().unwrap());
    assert_eq!(tree.as_text(text), Some("x"));
    // html, body and 50,000 spans sit above the text, under the document.
    assert_eq!(tree.ancestors(text).count(), 50_003);

    let tables = "<table><tr><td>".repeat(10_000);
    let document = parse(&tables).unwrap();
    let tree = document.tree();
    let cell = deepest_last_child(tree, tree.body().unwrap());
    assert_eq!(tree.tag_name(cell), Some("td"));
    // Each repetition adds table, tbody, tr and td.
    assert_eq!(tree.ancestors(cell).count(), 3 + 4 * 10_000 - 1);

    assert!(
        started.elapsed() < Duration::from_secs(10),
        "took {:?}",
        started.elapsed()
    );
}
