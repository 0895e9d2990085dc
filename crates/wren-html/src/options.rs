//! Per-parse configuration.

/// Settings read once when a parse starts.
///
/// ```
/// use wren_html::ParseOptions;
///
/// let options = ParseOptions::default().with_scripting_enabled(false);
/// assert!(!options.scripting_enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for
    /// the Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    ///
    /// When set, `<noscript>` content is raw text. When clear, it is parsed
    /// as markup.
    pub scripting_enabled: bool,

    /// Whether nodes remember the source position of the token that
    /// created them.
    pub record_locations: bool,

    /// Maximum number of nodes the arena may hold, Document node included.
    /// Exceeding it aborts the parse.
    pub node_limit: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            record_locations: true,
            node_limit: None,
        }
    }
}

impl ParseOptions {
    /// Set the scripting flag.
    #[must_use]
    pub const fn with_scripting_enabled(mut self, enabled: bool) -> Self {
        self.scripting_enabled = enabled;
        self
    }

    /// Turn source positions on nodes on or off.
    #[must_use]
    pub const fn with_record_locations(mut self, record: bool) -> Self {
        self.record_locations = record;
        self
    }

    /// Cap the number of nodes a parse may allocate.
    #[must_use]
    pub const fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }
}
