//! Arena-backed DOM tree for the Wren HTML parser.
//!
//! This crate provides the node storage a parse builds into, following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//! Navigation links are plain indices; ownership lives only in the arena.
//! Nodes are never freed individually. Detaching a node unlinks it but
//! keeps it allocated until the whole [`DomTree`] is dropped.

pub mod atom;
pub mod error;

use strum_macros::Display;
use wren_common::LineCol;

pub use atom::{Atom, AtomTable, names};
pub use error::ArenaError;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// One concrete representation for every kind of node: a payload in
/// [`NodeData`] plus index links to its neighbours.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node's kind and kind-specific payload.
    pub data: NodeData,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-first-child)
    /// "The first child of an object is its first child or null if it has no children."
    pub first_child: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-last-child)
    /// "The last child of an object is its last child or null if it has no children."
    pub last_child: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    /// "An object A's next sibling is the object immediately following A
    /// in the children of A's parent."
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    /// "An object A's previous sibling is the object immediately preceding A
    /// in the children of A's parent."
    pub prev_sibling: Option<NodeId>,

    /// Where the token that created this node started, if recorded.
    pub location: Option<LineCol>,
}

impl Node {
    const fn detached(data: NodeData, location: Option<LineCol>) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
            location,
        }
    }
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NodeType {
    /// The document root.
    Document,
    /// A `<!DOCTYPE>` node.
    Doctype,
    /// An element.
    Element,
    /// A text node.
    Text,
    /// A comment.
    Comment,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    /// "Doctypes have an associated name, public ID, and system ID."
    Doctype {
        /// The doctype name (`html` for HTML5 documents).
        name: String,
        /// The public identifier, empty when absent.
        public_id: String,
        /// The system identifier, empty when absent.
        system_id: String,
    },
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

impl NodeData {
    /// The payload-free kind tag.
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Document => NodeType::Document,
            Self::Doctype { .. } => NodeType::Doctype,
            Self::Element(_) => NodeType::Element,
            Self::Text(_) => NodeType::Text,
            Self::Comment(_) => NodeType::Comment,
        }
    }
}

/// [§ 2.1.3 Namespaces](https://infra.spec.whatwg.org/#namespaces)
///
/// The three namespaces an HTML parser can create elements in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Namespace {
    /// `http://www.w3.org/1999/xhtml`
    #[default]
    #[strum(serialize = "html")]
    Html,
    /// `http://www.w3.org/2000/svg`
    #[strum(serialize = "svg")]
    Svg,
    /// `http://www.w3.org/1998/Math/MathML`
    #[strum(serialize = "math")]
    MathMl,
}

impl Namespace {
    /// The namespace URL.
    #[must_use]
    pub const fn url(self) -> &'static str {
        match self {
            Self::Html => "http://www.w3.org/1999/xhtml",
            Self::Svg => "http://www.w3.org/2000/svg",
            Self::MathMl => "http://www.w3.org/1998/Math/MathML",
        }
    }
}

/// A name/value pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Interned attribute name.
    pub name: Atom,
    /// Attribute value, with character references already decoded.
    pub value: String,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name, ..."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name", interned in the owning tree.
    pub name: Atom,
    /// "An element's namespace"
    pub namespace: Namespace,
    /// "An element has an associated attribute list", in source order.
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    /// The value of the attribute whose interned name is `name`.
    #[must_use]
    pub fn attribute(&self, name: Atom) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Whether an attribute with this interned name is present.
    #[must_use]
    pub fn has_attribute(&self, name: Atom) -> bool {
        self.attrs.iter().any(|a| a.name == name)
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// All nodes live in one vector. The Document node is always at
/// [`NodeId::ROOT`]. The tree also owns the [`AtomTable`] its element and
/// attribute names are interned in.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    atoms: AtomTable,
    node_limit: Option<usize>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeData::Document, None)],
            atoms: AtomTable::new(),
            node_limit: None,
        }
    }

    /// Create a tree that refuses to grow beyond `limit` nodes.
    ///
    /// The Document node counts towards the limit.
    #[must_use]
    pub fn with_node_limit(limit: usize) -> Self {
        Self {
            node_limit: Some(limit),
            ..Self::new()
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The name table shared by every element in this tree.
    #[must_use]
    pub const fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    /// Intern a name in this tree's atom table.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::AtomTableFull`] when the table is exhausted.
    pub fn intern(&mut self, name: &str) -> Result<Atom, ArenaError> {
        self.atoms.intern(name)
    }

    /// The string behind an atom of this tree.
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.atoms.resolve(atom)
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a new, unattached node and return its ID.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::CapacityExceeded`] when the node limit is
    /// reached and [`ArenaError::AllocationFailed`] when the allocator
    /// cannot grow the arena.
    pub fn new_node(
        &mut self,
        data: NodeData,
        location: Option<LineCol>,
    ) -> Result<NodeId, ArenaError> {
        if let Some(limit) = self.node_limit
            && self.nodes.len() >= limit
        {
            return Err(ArenaError::CapacityExceeded { limit });
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| ArenaError::AllocationFailed)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(data, location));
        Ok(id)
    }

    /// Allocate an element named `name` in `namespace`.
    ///
    /// Attribute names are interned as given; duplicate names keep the
    /// first occurrence.
    ///
    /// # Errors
    ///
    /// Propagates allocation and interning failures.
    pub fn new_element<'a, I>(
        &mut self,
        name: &str,
        namespace: Namespace,
        attrs: I,
        location: Option<LineCol>,
    ) -> Result<NodeId, ArenaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let name = self.atoms.intern(name)?;
        let mut interned: Vec<Attribute> = Vec::new();
        for (attr_name, value) in attrs {
            let attr_name = self.atoms.intern(attr_name)?;
            if interned.iter().all(|a| a.name != attr_name) {
                interned.push(Attribute {
                    name: attr_name,
                    value: value.to_string(),
                });
            }
        }
        self.new_node(
            NodeData::Element(ElementData {
                name,
                namespace,
                attrs: interned,
            }),
            location,
        )
    }

    /// [§ 4.5 Clone a node](https://dom.spec.whatwg.org/#concept-node-clone)
    ///
    /// "Let copy be a node that implements the same interfaces as node..."
    ///
    /// Allocates a shallow copy of `id`: same kind, name, namespace and
    /// attributes, no parent, children or siblings.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::UnknownNode`] when `id` is not in this arena,
    /// and propagates allocation failures.
    pub fn clone_node(&mut self, id: NodeId) -> Result<NodeId, ArenaError> {
        let node = self
            .get(id)
            .ok_or(ArenaError::UnknownNode { index: id.0 })?;
        let (data, location) = (node.data.clone(), node.location);
        self.new_node(data, location)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`. A child that is still
    /// attached elsewhere is detached first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// [§ 4.2.2 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Inserts `child` into `parent` immediately before `reference`, or at
    /// the end when `reference` is `None`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if parent == child || child.0 >= self.nodes.len() || parent.0 >= self.nodes.len() {
            return;
        }
        // A node cannot become its own descendant. Only a node with
        // children can have `parent` below it.
        if self.nodes[child.0].first_child.is_some() && self.is_descendant_of(parent, child) {
            return;
        }
        if self.nodes[child.0].parent.is_some() {
            self.detach(child);
        }
        let reference = reference.filter(|r| self.parent(*r) == Some(parent));

        let prev = match reference {
            Some(r) => self.nodes[r.0].prev_sibling,
            None => self.nodes[parent.0].last_child,
        };

        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = prev;
        self.nodes[child.0].next_sibling = reference;

        match prev {
            Some(p) => self.nodes[p.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        match reference {
            Some(r) => self.nodes[r.0].prev_sibling = Some(child),
            None => self.nodes[parent.0].last_child = Some(child),
        }
    }

    /// [§ 4.2.4 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Unlinks `child` from `parent`. The node stays allocated and can be
    /// reinserted anywhere. Does nothing if `child` is not a child of
    /// `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    /// Unlinks `id` from whatever parent it has.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(p) => self.nodes[p.0].next_sibling = next,
            None => self.nodes[parent.0].first_child = next,
        }
        match next {
            Some(n) => self.nodes[n.0].prev_sibling = prev,
            None => self.nodes[parent.0].last_child = prev,
        }

        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Moves every child of `from` to the end of `to`, keeping their order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let moved: Vec<NodeId> = self.children(from).collect();
        for child in moved {
            self.append_child(to, child);
        }
    }

    /// Appends `text` to the text node `id`. Does nothing for other kinds.
    pub fn append_text(&mut self, id: NodeId, text: &str) {
        if let Some(Node {
            data: NodeData::Text(existing),
            ..
        }) = self.nodes.get_mut(id.0)
        {
            existing.push_str(text);
        }
    }

    /// Adds each attribute in `attrs` to element `id` unless the element
    /// already has an attribute of that name.
    ///
    /// # Errors
    ///
    /// Propagates interning failures.
    pub fn add_missing_attributes<'a, I>(&mut self, id: NodeId, attrs: I) -> Result<(), ArenaError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in attrs {
            let name = self.atoms.intern(name)?;
            if let Some(Node {
                data: NodeData::Element(element),
                ..
            }) = self.nodes.get_mut(id.0)
                && !element.has_attribute(name)
            {
                element.attrs.push(Attribute {
                    name,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Iterate over the children of a node in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            current: self.first_child(id),
        }
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child)
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child)
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    /// The kind of node `id`.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(|n| n.data.node_type())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get comment data if this node is a comment.
    #[must_use]
    pub fn as_comment(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Comment(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The local name of element `id`.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| self.atoms.resolve(e.name))
    }

    /// The namespace of element `id`.
    #[must_use]
    pub fn namespace(&self, id: NodeId) -> Option<Namespace> {
        self.as_element(id).map(|e| e.namespace)
    }

    /// Whether `id` is an element with local name `name` in `namespace`.
    #[must_use]
    pub fn is_element(&self, id: NodeId, namespace: Namespace, name: &str) -> bool {
        self.as_element(id)
            .is_some_and(|e| e.namespace == namespace && self.atoms.resolve(e.name) == name)
    }

    /// Whether `id` is an HTML element with local name `name`.
    #[must_use]
    pub fn is_html_element(&self, id: NodeId, name: &str) -> bool {
        self.is_element(id, Namespace::Html, name)
    }

    /// Whether `id` is an HTML element whose local name is `name`.
    ///
    /// Compares atoms, so `name` is usually one of the [`names`] constants.
    #[must_use]
    pub fn is_html_atom(&self, id: NodeId, name: Atom) -> bool {
        self.as_element(id)
            .is_some_and(|e| e.namespace == Namespace::Html && e.name == name)
    }

    /// Whether `id` is an HTML element whose local name is any of `names`.
    #[must_use]
    pub fn is_html_atom_in(&self, id: NodeId, names: &[Atom]) -> bool {
        self.as_element(id)
            .is_some_and(|e| e.namespace == Namespace::Html && names.contains(&e.name))
    }

    /// The value of attribute `name` on element `id`.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let name = self.atoms.get(name)?;
        self.as_element(id)?.attribute(name)
    }

    /// The attributes of element `id` as resolved `(name, value)` pairs.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Vec<(&str, &str)> {
        self.as_element(id)
            .map(|e| {
                e.attrs
                    .iter()
                    .map(|a| (self.atoms.resolve(a.name), a.value.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The source location recorded for `id`.
    #[must_use]
    pub fn location(&self, id: NodeId) -> Option<LineCol> {
        self.get(id).and_then(|n| n.location)
    }

    /// [§ 4.4 Text content](https://dom.spec.whatwg.org/#concept-descendant-text-content)
    ///
    /// "The descendant text content of a node node is the concatenation of
    /// the data of all the Text node descendants of node, in tree order."
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.as_text(current) {
                out.push_str(text);
            }
            let children: Vec<NodeId> = self.children(current).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .find(|&id| self.as_element(id).is_some())
    }

    /// [§ 3.1.3 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .find(|&id| self.is_html_element(id, "head"))
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html).find(|&id| {
            self.is_html_element(id, "body") || self.is_html_element(id, "frameset")
        })
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
