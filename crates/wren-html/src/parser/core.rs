use strum_macros::Display;

use wren_common::LineCol;
use wren_dom::{ArenaError, DomTree, Namespace, NodeId};

use crate::document::{Document, DocumentMetadata};
use crate::error::ParseIssue;
use crate::fragment::FragmentContext;
use crate::options::ParseOptions;
use crate::tokenizer::{HTMLTokenizer, PositionedToken, Token, TokenizerState};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// Entries in the list of active formatting elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFormattingElement {
    /// A formatting element. The element in the arena also serves as the
    /// template for clones ("the token for which the element was created").
    Element(NodeId),
    /// A marker entry.
    ///
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element."
    ///
    /// Markers are pushed when entering: applet, object, marquee, template,
    /// td, th, caption. They scope the list so that formatting elements from
    /// outside these elements don't affect content inside.
    Marker,
}

/// What a mode handler did with the token it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutcome {
    /// The token is fully handled; fetch the next one.
    Consumed,
    /// "Reprocess the token": hand the same token to the (new) current
    /// insertion mode.
    Reprocess,
}

/// Mode handlers either finish with a token or need it reprocessed. The
/// only failure is the arena running out of room.
pub(super) type ProcessResult = Result<TokenOutcome, ArenaError>;

/// Reprocess rounds allowed for a single token on top of the depth of the
/// stack of open elements. Every legitimate reprocess chain either pops an
/// element or changes to a mode that consumes the token, so a token that
/// hits the cap is dropped.
const REPROCESS_HEADROOM: usize = 32;

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// The HTML parser pulls tokens from an [`HTMLTokenizer`] and builds a
/// [`DomTree`] from them, recording [`DocumentMetadata`] on the way.
pub struct HTMLParser {
    /// Source of tokens. The parser switches its state for raw text elements.
    pub(super) tokenizer: HTMLTokenizer,

    /// DOM tree with parent/sibling pointers.
    /// `NodeId::ROOT` (index 0) is the Document node.
    pub(super) tree: DomTree,

    pub(super) options: ParseOptions,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    ///
    /// "When the insertion mode is switched to "text" or "in table text", the
    /// original insertion mode is also set. This is the insertion mode to
    /// which the tree construction stage will return."
    pub(super) original_insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    ///
    /// "The stack of template insertion modes"
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Stores `NodeId`s into the arena.
    pub(super) stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    ///
    /// "The list of active formatting elements... is used to handle mis-nested
    /// formatting element tags."
    pub(super) active_formatting_elements: Vec<ActiveFormattingElement>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#head-element-pointer)
    pub(super) head_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#form-element-pointer)
    ///
    /// "The form element pointer points to the last form element that was opened
    /// and whose end tag has not yet been seen."
    pub(super) form_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    ///
    /// The fragment parsing context element. It is allocated in the arena
    /// but never attached to the tree.
    pub(super) context_element: Option<NodeId>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    ///
    /// "The frameset-ok flag is set to "ok" when the parser is created."
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#concept-pending-table-char-tokens)
    ///
    /// "The pending table character tokens list"
    pub(super) pending_table_character_tokens: Vec<(char, LineCol)>,

    /// Set after `<pre>`, `<listing>` and `<textarea>`: "If the next token is
    /// a U+000A LINE FEED (LF) character token, then ignore that token".
    pub(super) skip_next_line_feed: bool,

    /// Position of the token being processed.
    pub(super) token_location: LineCol,

    /// [§ 13.2.7 Stop parsing](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    pub(super) stopped: bool,

    /// Parse issues encountered so far, tokenizer errors included.
    pub(super) issues: Vec<ParseIssue>,

    pub(super) metadata: DocumentMetadata,

    /// The `<html>` element a fragment is parsed into.
    pub(super) fragment_root: Option<NodeId>,
}

impl HTMLParser {
    /// Create a parser for a full document.
    #[must_use]
    pub fn new(tokenizer: HTMLTokenizer, options: ParseOptions) -> Self {
        let tree = options
            .node_limit
            .map_or_else(DomTree::new, DomTree::with_node_limit);

        Self {
            tokenizer,
            tree,
            options,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: InsertionMode::Initial,
            template_insertion_modes: Vec::new(),
            stack_of_open_elements: Vec::new(),
            active_formatting_elements: Vec::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            context_element: None,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_character_tokens: Vec::new(),
            skip_next_line_feed: false,
            token_location: LineCol::START,
            stopped: false,
            issues: Vec::new(),
            metadata: DocumentMetadata::default(),
            fragment_root: None,
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Create a parser for markup that appears inside `context`. The result
    /// of [`Self::run`] lists the parsed nodes in
    /// [`Document::fragment_nodes`].
    ///
    /// # Errors
    ///
    /// Fails if the arena cannot hold the synthetic root and context element.
    pub fn for_fragment(
        tokenizer: HTMLTokenizer,
        options: ParseOptions,
        context: &FragmentContext,
    ) -> Result<Self, ArenaError> {
        let mut parser = Self::new(tokenizer, options);
        let namespace = context.namespace();
        let name = if namespace == Namespace::Html {
            context.tag_name().to_ascii_lowercase()
        } else {
            context.tag_name().to_string()
        };

        // STEP 3: "If the context element's node document is in quirks mode,
        //          then let the Document be in quirks mode."
        let _ = parser.metadata.set_document_mode(context.document_mode());

        // STEP 5: "Set the state of the HTML parser's tokenization stage as
        //          follows, switching on the context element"
        if namespace == Namespace::Html {
            let state = match name.as_str() {
                "title" | "textarea" => Some(TokenizerState::RCDATA),
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                    Some(TokenizerState::RAWTEXT)
                }
                "script" => Some(TokenizerState::ScriptData),
                "noscript" if options.scripting_enabled => Some(TokenizerState::RAWTEXT),
                "plaintext" => Some(TokenizerState::PLAINTEXT),
                _ => None,
            };
            if let Some(state) = state {
                parser.tokenizer.set_state(state);
            }
            parser.tokenizer.set_last_start_tag(&name);
        }

        // STEP 7: "Let root be the result of creating an element given
        //          document, "html", and the HTML namespace. Append the element
        //          root to the Document node created above. Set up the HTML
        //          parser's stack of open elements so that it contains just the
        //          single element root."
        let root = parser
            .tree
            .new_element("html", Namespace::Html, std::iter::empty(), None)?;
        parser.tree.append_child(NodeId::ROOT, root);
        parser.stack_of_open_elements.push(root);
        parser.fragment_root = Some(root);

        // The context element lives in the arena but is never attached.
        let context_element = parser.tree.new_element(
            &name,
            namespace,
            context
                .attributes()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
            None,
        )?;
        parser.context_element = Some(context_element);

        // STEP 8: "If the context element is a template element, then push "in
        //          template" onto the stack of template insertion modes so that
        //          it is the new current template insertion mode."
        if namespace == Namespace::Html && name == "template" {
            parser.template_insertion_modes.push(InsertionMode::InTemplate);
        }

        // STEP 10: "Reset the parser's insertion mode appropriately."
        parser.reset_insertion_mode_appropriately();

        // STEP 11: "Set the HTML parser's form element pointer to the nearest
        //           node to the context element that is a form element (going
        //           straight up the ancestor chain, and including the element
        //           itself, if it is itself a form element), if any."
        if namespace == Namespace::Html && name == "form" {
            parser.form_element_pointer = Some(context_element);
        }

        Ok(parser)
    }

    /// Record the input size. Callers that have the raw bytes set this
    /// before [`Self::run`].
    pub const fn set_source_length(&mut self, bytes: usize) {
        self.metadata.html_src_bytes = bytes;
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// Run the parser to completion.
    ///
    /// # Errors
    ///
    /// Fails only when the node arena cannot grow. No partial document is
    /// returned in that case.
    pub fn run(mut self) -> Result<Document, ArenaError> {
        while !self.stopped {
            // [§ 13.2.5.42](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
            // CDATA sections are only recognised in foreign content.
            let foreign = self
                .adjusted_current_node()
                .and_then(|id| self.tree.namespace(id))
                .is_some_and(|ns| ns != Namespace::Html);
            self.tokenizer.set_allow_cdata(foreign);

            let PositionedToken { token, location } = self.tokenizer.next_token();
            self.issues.extend(self.tokenizer.take_errors());
            self.token_location = location;

            if std::mem::take(&mut self.skip_next_line_feed)
                && token == (Token::Character { data: '\n' })
            {
                continue;
            }

            let is_eof = token.is_eof();
            self.process_token(&token)?;
            if is_eof {
                // [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#the-end)
                // "Pop all the nodes off the stack of open elements."
                self.metadata.document_end_location = location;
                self.stack_of_open_elements.clear();
                self.stopped = true;
            }
        }

        Ok(self.finish())
    }

    /// Hand over the tree. For fragments, "return root's children, in tree
    /// order", detached from the synthetic root.
    fn finish(mut self) -> Document {
        let fragment_nodes = self.fragment_root.map(|root| {
            let nodes: Vec<NodeId> = self.tree.children(root).collect();
            for &node in &nodes {
                self.tree.detach(node);
            }
            self.tree.detach(root);
            nodes
        });
        Document::new(self.tree, self.metadata, self.issues, fragment_nodes)
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
    ///
    /// Runs the dispatcher until the token is consumed. "Reprocess the token"
    /// is a loop iteration here rather than a recursive call.
    pub(super) fn process_token(&mut self, token: &Token) -> Result<(), ArenaError> {
        let limit = self.stack_of_open_elements.len() + REPROCESS_HEADROOM;
        for _ in 0..limit {
            if self.dispatch(token)? == TokenOutcome::Consumed {
                return Ok(());
            }
        }
        self.parse_error("reprocess-limit-exceeded");
        if token.is_eof() {
            // Nothing will be pushed after end of file; close what is open.
            self.stack_of_open_elements.clear();
        }
        Ok(())
    }

    /// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// "As each token is emitted from the tokenizer, the user agent must
    /// follow the appropriate steps from the following list, known as the
    /// tree construction dispatcher"
    fn dispatch(&mut self, token: &Token) -> ProcessResult {
        if self.should_use_foreign_content_rules(token) {
            self.handle_foreign_content(token)
        } else {
            self.process_using_rules_for(self.insertion_mode, token)
        }
    }

    /// "Process the token using the rules for the X insertion mode", without
    /// switching to X.
    pub(super) fn process_using_rules_for(
        &mut self,
        mode: InsertionMode,
        token: &Token,
    ) -> ProcessResult {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),
            InsertionMode::InTemplate => self.handle_in_template_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// Switch to `mode` and ask for the token to be reprocessed there.
    pub(super) const fn reprocess_in(&mut self, mode: InsertionMode) -> ProcessResult {
        self.insertion_mode = mode;
        Ok(TokenOutcome::Reprocess)
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Record a recoverable tree construction error at the current token.
    pub(super) fn parse_error(&mut self, code: &'static str) {
        self.issues.push(ParseIssue::new(code, self.token_location));
    }

    /// Record a recoverable error that names the offending tag.
    pub(super) fn parse_error_for(&mut self, code: &'static str, tag: &str) {
        self.issues
            .push(ParseIssue::with_detail(code, tag, self.token_location));
    }

    /// The location to store on a node created for the current token.
    pub(super) const fn node_location(&self) -> Option<LineCol> {
        if self.options.record_locations {
            Some(self.token_location)
        } else {
            None
        }
    }
}

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
pub(super) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}
