//! The result of a parse: the node arena plus what was learned about the
//! input while building it.

use wren_common::LineCol;
use wren_dom::{ArenaError, DomTree, NodeData, NodeId};

use crate::error::ParseIssue;
use crate::parser::DocumentMode;

/// [§ 4.2.2 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
///
/// The `href` and `target` of the first `<base>` element. Both are empty
/// when the document has no `<base>`, or when that element lacks the
/// attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUrl {
    /// The `href` attribute, unresolved.
    pub url: String,
    /// The `target` attribute.
    pub target: String,
}

/// Facts about the source recorded while building the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// The parser created `<html>` without a start tag for it.
    pub manufactured_html: bool,
    /// The parser created `<head>` without a start tag for it.
    pub manufactured_head: bool,
    /// The parser created `<body>` without a start tag for it.
    pub manufactured_body: bool,

    /// A second `<html>` start tag was merged into the first.
    pub duplicate_html_elements: bool,
    /// Position of the first extra `<html>` start tag.
    pub duplicate_html_location: Option<LineCol>,
    /// A second `<body>` start tag was merged into the first.
    pub duplicate_body_elements: bool,
    /// Position of the first extra `<body>` start tag.
    pub duplicate_body_location: Option<LineCol>,

    /// Position of the end-of-file token.
    pub document_end_location: LineCol,
    /// Length of the input in bytes.
    pub html_src_bytes: usize,
    /// From the first `<base>` element.
    pub base_url: BaseUrl,
    /// `href` of the last `<link rel="canonical">`.
    pub canonical_url: Option<String>,

    mode: Option<DocumentMode>,
}

impl DocumentMetadata {
    /// Whether the document is in full quirks mode.
    #[must_use]
    pub fn quirks_mode(&self) -> bool {
        self.document_mode() == DocumentMode::Quirks
    }

    /// The document's mode. No-quirks until the parser decides otherwise.
    #[must_use]
    pub fn document_mode(&self) -> DocumentMode {
        self.mode.unwrap_or_default()
    }

    /// Record the document mode. Only the first call has an effect.
    ///
    /// Returns whether the mode was recorded.
    pub(crate) fn set_document_mode(&mut self, mode: DocumentMode) -> bool {
        if self.mode.is_some() {
            return false;
        }
        self.mode = Some(mode);
        true
    }

    /// Record a duplicate `<html>` start tag seen at `location`.
    pub(crate) fn note_duplicate_html(&mut self, location: LineCol) {
        if !self.duplicate_html_elements {
            self.duplicate_html_elements = true;
            self.duplicate_html_location = Some(location);
        }
    }

    /// Record a duplicate `<body>` start tag seen at `location`.
    pub(crate) fn note_duplicate_body(&mut self, location: LineCol) {
        if !self.duplicate_body_elements {
            self.duplicate_body_elements = true;
            self.duplicate_body_location = Some(location);
        }
    }
}

/// A parsed document or fragment.
///
/// Owns every node the parse allocated. [`NodeId`]s handed out by a
/// `Document` index into its arena and mean nothing elsewhere.
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    metadata: DocumentMetadata,
    issues: Vec<ParseIssue>,
    fragment_nodes: Option<Vec<NodeId>>,
}

impl Document {
    pub(crate) const fn new(
        tree: DomTree,
        metadata: DocumentMetadata,
        issues: Vec<ParseIssue>,
        fragment_nodes: Option<Vec<NodeId>>,
    ) -> Self {
        Self {
            tree,
            metadata,
            issues,
            fragment_nodes,
        }
    }

    /// What the parser recorded about the input.
    #[must_use]
    pub const fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// The Document node. For a fragment parse it has no children.
    #[must_use]
    pub const fn root_node(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The top-level nodes of a fragment parse, in order. Each has no
    /// parent. Empty for a full-document parse.
    #[must_use]
    pub fn fragment_nodes(&self) -> &[NodeId] {
        self.fragment_nodes.as_deref().unwrap_or_default()
    }

    /// Whether this came from one of the fragment entry points.
    #[must_use]
    pub const fn is_fragment(&self) -> bool {
        self.fragment_nodes.is_some()
    }

    /// The node arena, for navigation.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Recoverable parse errors, in the order they were found.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Allocate a detached node in this document's arena.
    ///
    /// # Errors
    ///
    /// Fails when the arena cannot grow.
    pub fn new_node(&mut self, data: NodeData) -> Result<NodeId, ArenaError> {
        self.tree.new_node(data, None)
    }

    /// Allocate a detached shallow copy of `id` in this document's arena.
    ///
    /// # Errors
    ///
    /// Fails when the arena cannot grow.
    pub fn clone_node(&mut self, id: NodeId) -> Result<NodeId, ArenaError> {
        self.tree.clone_node(id)
    }

    /// Mutable access to the arena, for callers that edit the result.
    pub const fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Give up the metadata and keep only the tree.
    #[must_use]
    pub fn into_tree(self) -> DomTree {
        self.tree
    }
}
