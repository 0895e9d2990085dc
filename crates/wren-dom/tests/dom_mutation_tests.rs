//! Tests for arena allocation and tree mutation: new_node, clone_node,
//! remove_child, insert_before, move_children.

use wren_common::LineCol;
use wren_dom::{ArenaError, AtomTable, DomTree, Namespace, NodeData, NodeId, NodeType, names};

/// Helper to create an HTML element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.new_element(tag, Namespace::Html, [], None).unwrap()
}

fn children(tree: &DomTree, id: NodeId) -> Vec<NodeId> {
    tree.children(id).collect()
}

// ========== allocation ==========

#[test]
fn test_new_tree_has_only_document() {
    let tree = DomTree::new();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node_type(NodeId::ROOT), Some(NodeType::Document));
    assert_eq!(tree.first_child(NodeId::ROOT), None);
}

#[test]
fn test_node_type_display_is_lowercase() {
    assert_eq!(NodeType::Document.to_string(), "document");
    assert_eq!(NodeType::Comment.to_string(), "comment");
    assert_eq!(Namespace::MathMl.to_string(), "math");
}

#[test]
fn test_new_node_is_detached() {
    let mut tree = DomTree::new();
    let text = tree
        .new_node(NodeData::Text("hi".to_string()), Some(LineCol::new(2, 5)))
        .unwrap();
    assert_eq!(tree.parent(text), None);
    assert_eq!(tree.as_text(text), Some("hi"));
    assert_eq!(tree.location(text), Some(LineCol::new(2, 5)));
}

#[test]
fn test_node_limit_is_fatal() {
    let mut tree = DomTree::with_node_limit(2);
    let _ = alloc_element(&mut tree, "p");
    let err = tree
        .new_node(NodeData::Comment(String::new()), None)
        .unwrap_err();
    assert_eq!(err, ArenaError::CapacityExceeded { limit: 2 });
}

#[test]
fn test_new_element_keeps_first_duplicate_attribute() {
    let mut tree = DomTree::new();
    let div = tree
        .new_element("div", Namespace::Html, [("id", "a"), ("id", "b")], None)
        .unwrap();
    assert_eq!(tree.attributes(div), vec![("id", "a")]);
}

#[test]
fn test_atoms_are_shared_within_tree() {
    let mut tree = DomTree::new();
    let a = alloc_element(&mut tree, "span");
    let b = alloc_element(&mut tree, "span");
    assert_eq!(
        tree.as_element(a).unwrap().name,
        tree.as_element(b).unwrap().name
    );
    assert_eq!(tree.tag_name(a), Some("span"));
}

#[test]
fn test_atom_tables_are_independent() {
    let mut first = DomTree::new();
    let mut second = DomTree::new();
    let _ = first.intern("div").unwrap();
    let span_second = second.intern("span").unwrap();
    assert_eq!(second.resolve(span_second), "span");
    assert_eq!(first.atoms().get("span"), None);
}

#[test]
fn test_intern_ascii_folded() {
    let mut tree = DomTree::new();
    let atom = tree.intern("div").unwrap();
    let mut table = tree.atoms().clone();
    assert_eq!(table.intern_ascii_folded("DiV").unwrap(), atom);
}

// ========== clone_node ==========

#[test]
fn test_clone_copies_name_namespace_and_attributes() {
    let mut tree = DomTree::new();
    let b = tree
        .new_element("b", Namespace::Html, [("class", "x")], None)
        .unwrap();
    tree.append_child(NodeId::ROOT, b);
    let text = tree.new_node(NodeData::Text("t".into()), None).unwrap();
    tree.append_child(b, text);

    let copy = tree.clone_node(b).unwrap();

    assert_ne!(copy, b);
    assert_eq!(tree.as_element(copy), tree.as_element(b));
    assert_eq!(tree.parent(copy), None);
    assert_eq!(tree.first_child(copy), None);
    assert_eq!(tree.next_sibling(copy), None);
}

#[test]
fn test_clone_unknown_node_is_an_error() {
    let mut tree = DomTree::new();
    let before = tree.len();

    let result = tree.clone_node(NodeId(42));

    assert_eq!(result, Err(ArenaError::UnknownNode { index: 42 }));
    assert_eq!(tree.len(), before);
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    assert_eq!(children(&tree, parent).len(), 1);

    tree.remove_child(parent, child);

    assert!(children(&tree, parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
    assert_eq!(tree.first_child(parent), None);
    assert_eq!(tree.last_child(parent), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b);

    // a and c are siblings now
    assert_eq!(children(&tree, parent), vec![a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_ignores_non_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let other = alloc_element(&mut tree, "span");
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    tree.remove_child(other, child);

    assert_eq!(tree.parent(child), Some(parent));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(parent, b);

    tree.insert_before(parent, a, Some(b));

    assert_eq!(children(&tree, parent), vec![a, b]);
    assert_eq!(tree.first_child(parent), Some(a));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.prev_sibling(a), None);
}

#[test]
fn test_insert_before_none_appends() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(parent, a);

    tree.insert_before(parent, b, None);

    assert_eq!(children(&tree, parent), vec![a, b]);
    assert_eq!(tree.last_child(parent), Some(b));
}

#[test]
fn test_insert_moves_attached_node() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "section");
    let child = alloc_element(&mut tree, "p");
    tree.append_child(first, child);

    tree.append_child(second, child);

    assert!(children(&tree, first).is_empty());
    assert_eq!(children(&tree, second), vec![child]);
}

#[test]
fn test_insert_refuses_cycles() {
    let mut tree = DomTree::new();
    let outer = alloc_element(&mut tree, "div");
    let inner = alloc_element(&mut tree, "p");
    tree.append_child(outer, inner);

    tree.append_child(inner, outer);

    assert_eq!(tree.parent(outer), None);
    assert_eq!(tree.parent(inner), Some(outer));
}

#[test]
fn test_insert_refuses_cycles_through_deep_chains() {
    let mut tree = DomTree::new();
    let top = alloc_element(&mut tree, "div");
    let mut bottom = top;
    for _ in 0..16 {
        let next = alloc_element(&mut tree, "div");
        tree.append_child(bottom, next);
        bottom = next;
    }

    tree.append_child(bottom, top);

    assert_eq!(tree.parent(top), None);
    assert_eq!(tree.first_child(bottom), None);
}

#[test]
fn test_appending_leaves_down_a_deep_chain() {
    let mut tree = DomTree::new();
    let mut parent = NodeId::ROOT;
    for _ in 0..20_000 {
        let next = alloc_element(&mut tree, "span");
        tree.append_child(parent, next);
        parent = next;
    }

    assert_eq!(tree.len(), 20_001);
    assert_eq!(tree.ancestors(parent).count(), 20_000);
}

// ========== move_children ==========

#[test]
fn test_move_children_preserves_order() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "section");
    let existing = alloc_element(&mut tree, "h1");
    tree.append_child(to, existing);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(from, a);
    tree.append_child(from, b);

    tree.move_children(from, to);

    assert!(children(&tree, from).is_empty());
    assert_eq!(children(&tree, to), vec![existing, a, b]);
    assert_eq!(tree.parent(a), Some(to));
}

// ========== queries ==========

#[test]
fn test_text_content_is_tree_order() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    let b = alloc_element(&mut tree, "b");
    let one = tree.new_node(NodeData::Text("1".into()), None).unwrap();
    let two = tree.new_node(NodeData::Text("2".into()), None).unwrap();
    let three = tree.new_node(NodeData::Text("3".into()), None).unwrap();
    tree.append_child(p, one);
    tree.append_child(p, b);
    tree.append_child(b, two);
    tree.append_child(p, three);

    assert_eq!(tree.text_content(p), "123");
}

#[test]
fn test_add_missing_attributes_keeps_existing() {
    let mut tree = DomTree::new();
    let body = tree
        .new_element("body", Namespace::Html, [("class", "a")], None)
        .unwrap();
    tree.add_missing_attributes(body, [("class", "b"), ("id", "x")])
        .unwrap();
    assert_eq!(tree.attribute(body, "class"), Some("a"));
    assert_eq!(tree.attribute(body, "id"), Some("x"));
}

#[test]
fn test_document_head_body_lookup() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, head);
    tree.append_child(html, body);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
    assert_eq!(tree.ancestors(body).collect::<Vec<_>>(), vec![html, NodeId::ROOT]);
}

// ========== well-known names ==========

#[test]
fn test_well_known_names_are_preinterned() {
    let table = AtomTable::new();
    assert_eq!(table.len(), names::ALL.len());
    assert_eq!(table.resolve(names::DIV), "div");
    assert_eq!(table.resolve(names::ANNOTATION_XML), "annotation-xml");
    assert_eq!(table.resolve(names::FOREIGN_OBJECT), "foreignObject");
    assert_eq!(table.resolve(names::XMP), "xmp");
    for (index, name) in names::ALL.iter().enumerate() {
        assert_eq!(table.get(name).map(|atom| atom.0 as usize), Some(index));
    }
}

#[test]
fn test_interning_a_well_known_name_returns_its_constant() {
    let mut tree = DomTree::new();
    assert_eq!(tree.intern("td").unwrap(), names::TD);
    let mut table = AtomTable::new();
    assert_eq!(table.intern_ascii_folded("TABLE").unwrap(), names::TABLE);
}

#[test]
fn test_is_html_atom_checks_namespace() {
    let mut tree = DomTree::new();
    let html_p = alloc_element(&mut tree, "p");
    let svg_title = tree.new_element("title", Namespace::Svg, [], None).unwrap();

    assert!(tree.is_html_atom(html_p, names::P));
    assert!(!tree.is_html_atom(html_p, names::DIV));
    assert!(!tree.is_html_atom(svg_title, names::TITLE));
    assert!(tree.is_html_atom_in(html_p, &[names::LI, names::P]));
    assert!(!tree.is_html_atom(NodeId::ROOT, names::HTML));
}
