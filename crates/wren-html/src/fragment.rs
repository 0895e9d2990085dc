//! [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
//!
//! The context element a fragment is parsed as if it appeared inside.

use wren_dom::{DomTree, Namespace, NodeId};

use crate::error::HtmlError;
use crate::parser::DocumentMode;

/// The element a fragment's markup is parsed inside of.
///
/// "the context element, if any, for the fragment case"
///
/// The element itself never appears in the result. Its name and namespace
/// pick the starting tokenizer state and insertion mode; its attributes
/// matter for `annotation-xml` integration points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContext {
    tag_name: String,
    namespace: Namespace,
    attributes: Vec<(String, String)>,
    document_mode: DocumentMode,
}

impl FragmentContext {
    /// An HTML element context such as `body`, `tbody` or `textarea`.
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            namespace: Namespace::Html,
            attributes: Vec::new(),
            document_mode: DocumentMode::NoQuirks,
        }
    }

    /// Place the context element in `namespace`.
    #[must_use]
    pub const fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Add an attribute to the context element.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// "If the context element's node document is in quirks mode, then let
    /// the Document be in quirks mode. Otherwise, if the context element's
    /// node document is in limited-quirks mode, then let the Document be in
    /// limited-quirks mode."
    #[must_use]
    pub const fn with_document_mode(mut self, mode: DocumentMode) -> Self {
        self.document_mode = mode;
        self
    }

    /// Copy an element out of an existing tree to use as a context.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidFragmentContext`] if `id` is not an
    /// element of `tree`.
    pub fn from_element(tree: &DomTree, id: NodeId) -> Result<Self, HtmlError> {
        let element = tree.as_element(id).ok_or_else(|| {
            HtmlError::InvalidFragmentContext(format!("node {} is not an element", id.0))
        })?;
        let mut context =
            Self::new(tree.resolve(element.name)).with_namespace(element.namespace);
        for (name, value) in tree.attributes(id) {
            context = context.with_attribute(name, value);
        }
        Ok(context)
    }

    /// The context element's local name.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// The context element's namespace.
    #[must_use]
    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The context element's attributes as `(name, value)` pairs.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The mode of the document the context element belongs to.
    #[must_use]
    pub const fn document_mode(&self) -> DocumentMode {
        self.document_mode
    }

    /// Check that the name could be an element's local name: non-empty,
    /// starting with an ASCII letter, free of whitespace, `/` and `>`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidFragmentContext`] describing the problem.
    pub fn validate(&self) -> Result<(), HtmlError> {
        let name = self.tag_name.as_str();
        let Some(first) = name.chars().next() else {
            return Err(HtmlError::InvalidFragmentContext(
                "empty tag name".to_string(),
            ));
        };
        if !first.is_ascii_alphabetic() {
            return Err(HtmlError::InvalidFragmentContext(format!(
                "tag name {name:?} must start with an ASCII letter"
            )));
        }
        if name
            .chars()
            .any(|c| c.is_ascii_whitespace() || matches!(c, '/' | '>' | '\0'))
        {
            return Err(HtmlError::InvalidFragmentContext(format!(
                "tag name {name:?} contains a character not allowed in a tag name"
            )));
        }
        Ok(())
    }
}
