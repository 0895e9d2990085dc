//! Integration tests for fragment parsing.

use wren_dom::{DomTree, Namespace, NodeData, NodeId};
use wren_html::{
    Document, DocumentMode, FragmentContext, HtmlError, ParseOptions, parse, parse_fragment,
    parse_fragment_with_options,
};

fn outline(tree: &DomTree, id: NodeId) -> String {
    match tree.get(id).map(|n| &n.data) {
        Some(NodeData::Text(text)) => format!("{text:?}"),
        Some(NodeData::Comment(data)) => format!("<!--{data}-->"),
        Some(NodeData::Element(element)) => {
            let name = tree.resolve(element.name);
            let children: Vec<String> = tree.children(id).map(|c| outline(tree, c)).collect();
            if children.is_empty() {
                name.to_string()
            } else {
                format!("{name}[{}]", children.join(", "))
            }
        }
        _ => "?".to_string(),
    }
}

fn fragment_outline(document: &Document) -> Vec<String> {
    document
        .fragment_nodes()
        .iter()
        .map(|&id| outline(document.tree(), id))
        .collect()
}

fn parse_in(html: &str, context: &str) -> Vec<String> {
    let document = parse_fragment(html, &FragmentContext::new(context)).unwrap();
    fragment_outline(&document)
}

#[test]
fn test_table_row_in_tbody() {
    assert_eq!(parse_in("<tr><td>1</td></tr>", "tbody"), vec![r#"tr[td["1"]]"#]);
}

#[test]
fn test_cells_in_tr() {
    assert_eq!(
        parse_in("<td>a<th>b", "tr"),
        vec![r#"td["a"]"#, r#"th["b"]"#]
    );
}

#[test]
fn test_body_context() {
    assert_eq!(
        parse_in("<p>a</p>b<!--c-->", "body"),
        vec![r#"p["a"]"#, r#""b""#, "<!--c-->"]
    );
}

#[test]
fn test_div_context_does_not_add_html_head_body() {
    let document = parse_fragment("text", &FragmentContext::new("div")).unwrap();
    assert!(document.is_fragment());
    assert_eq!(fragment_outline(&document), vec![r#""text""#]);
    let meta = document.metadata();
    assert!(!meta.manufactured_head);
    assert!(!meta.manufactured_body);
}

#[test]
fn test_fragment_nodes_are_detached() {
    let document = parse_fragment("<b>x</b><i>y</i>", &FragmentContext::new("div")).unwrap();
    let tree = document.tree();
    assert_eq!(document.fragment_nodes().len(), 2);
    for &node in document.fragment_nodes() {
        assert_eq!(tree.parent(node), None);
    }
    assert_eq!(tree.children(document.root_node()).count(), 0);
}

#[test]
fn test_textarea_context_is_rcdata() {
    assert_eq!(parse_in("<b>a&amp;b</b>", "textarea"), vec![r#""<b>a&b</b>""#]);
}

#[test]
fn test_title_context_is_rcdata() {
    assert_eq!(parse_in("x<p>y", "title"), vec![r#""x<p>y""#]);
}

#[test]
fn test_style_context_is_rawtext() {
    assert_eq!(parse_in("a &amp; <b>", "style"), vec![r#""a &amp; <b>""#]);
}

#[test]
fn test_context_name_is_case_insensitive_for_html() {
    assert_eq!(parse_in("<tr><td>1", "TBODY"), vec![r#"tr[td["1"]]"#]);
}

#[test]
fn test_template_context() {
    assert_eq!(parse_in("<td>x</td>", "template"), vec![r#"td["x"]"#]);
}

#[test]
fn test_select_context() {
    assert_eq!(
        parse_in("<option>a<option>b", "select"),
        vec![r#"option["a"]"#, r#"option["b"]"#]
    );
}

#[test]
fn test_svg_context() {
    let context = FragmentContext::new("svg").with_namespace(Namespace::Svg);
    let document = parse_fragment("<circle/><p>x", &context).unwrap();
    let tree = document.tree();
    let nodes = document.fragment_nodes();
    assert_eq!(fragment_outline(&document), vec!["circle", r#"p["x"]"#]);
    assert_eq!(tree.namespace(nodes[0]), Some(Namespace::Svg));
    assert_eq!(tree.namespace(nodes[1]), Some(Namespace::Html));
}

#[test]
fn test_fragment_inherits_document_mode() {
    let context = FragmentContext::new("body").with_document_mode(DocumentMode::Quirks);
    let document = parse_fragment("<p><table></table>", &context).unwrap();
    assert!(document.metadata().quirks_mode());
    assert_eq!(fragment_outline(&document), vec!["p[table]"]);

    let standards = parse_in("<p><table></table>", "body");
    assert_eq!(standards, vec!["p", "table"]);
}

#[test]
fn test_form_context_sets_form_pointer() {
    assert_eq!(parse_in("<form><input>", "form"), vec!["input"]);
}

#[test]
fn test_noscript_context_follows_scripting_flag() {
    assert_eq!(parse_in("<p>x</p>", "noscript"), vec![r#""<p>x</p>""#]);

    let options = ParseOptions::default().with_scripting_enabled(false);
    let document =
        parse_fragment_with_options("<p>x</p>", options, &FragmentContext::new("noscript"))
            .unwrap();
    assert_eq!(fragment_outline(&document), vec![r#"p["x"]"#]);
}

#[test]
fn test_invalid_context_names() {
    for name in ["", "1a", "a b", "a/b", "a>"] {
        let result = parse_fragment("x", &FragmentContext::new(name));
        assert!(
            matches!(result, Err(HtmlError::InvalidFragmentContext(_))),
            "{name:?}"
        );
    }
}

#[test]
fn test_context_from_element() {
    let source = parse("<table><tbody class=rows></tbody></table>").unwrap();
    let tbody = source
        .tree()
        .children(source.tree().body().unwrap())
        .flat_map(|table| source.tree().children(table).collect::<Vec<_>>())
        .next()
        .unwrap();

    let context = FragmentContext::from_element(source.tree(), tbody).unwrap();
    assert_eq!(context.tag_name(), "tbody");
    assert_eq!(context.namespace(), Namespace::Html);
    assert_eq!(
        context.attributes(),
        &[("class".to_string(), "rows".to_string())]
    );

    let document = parse_fragment("<tr><td>1", &context).unwrap();
    assert_eq!(fragment_outline(&document), vec![r#"tr[td["1"]]"#]);
}

#[test]
fn test_context_from_non_element() {
    let source = parse("<p>x").unwrap();
    let result = FragmentContext::from_element(source.tree(), source.root_node());
    assert!(matches!(result, Err(HtmlError::InvalidFragmentContext(_))));
}

#[test]
fn test_annotation_xml_context_attributes() {
    let context = FragmentContext::new("annotation-xml")
        .with_namespace(Namespace::MathMl)
        .with_attribute("encoding", "text/html");
    let document = parse_fragment("<div>x</div>", &context).unwrap();
    let tree = document.tree();
    let nodes = document.fragment_nodes();
    assert_eq!(fragment_outline(&document), vec![r#"div["x"]"#]);
    assert_eq!(tree.namespace(nodes[0]), Some(Namespace::Html));
}
