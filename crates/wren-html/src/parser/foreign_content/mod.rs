//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::{adjust_mathml_attribute_name, is_mathml_text_integration_point_name};
pub use svg::{adjust_svg_attribute_name, adjust_svg_tag_name};

use wren_dom::{Namespace, NodeId};

use super::core::{HTMLParser, ProcessResult, TokenOutcome, is_whitespace};
use crate::tokenizer::Token;

/// "A start tag whose tag name is one of: ..." that breaks out of foreign
/// content back into HTML.
const BREAKOUT_START_TAGS: &[&str] = &[
    "b",
    "big",
    "blockquote",
    "body",
    "br",
    "center",
    "code",
    "dd",
    "div",
    "dl",
    "dt",
    "em",
    "embed",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "hr",
    "i",
    "img",
    "li",
    "listing",
    "menu",
    "meta",
    "nobr",
    "ol",
    "p",
    "pre",
    "ruby",
    "s",
    "small",
    "span",
    "strong",
    "strike",
    "sub",
    "sup",
    "table",
    "tt",
    "u",
    "ul",
    "var",
];

impl HTMLParser {
    /// [§ 13.2.6.1 MathML text integration point](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
    pub(in crate::parser) fn is_mathml_text_integration_point(&self, id: NodeId) -> bool {
        self.tree.as_element(id).is_some_and(|e| {
            e.namespace == Namespace::MathMl
                && is_mathml_text_integration_point_name(self.tree.resolve(e.name))
        })
    }

    /// [§ 13.2.6.1 HTML integration point](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
    ///
    /// "A node is an HTML integration point if it is one of the following
    /// elements: A MathML annotation-xml element whose start tag token had an
    /// attribute with the name "encoding" whose value was an ASCII
    /// case-insensitive match for the string "text/html"; [or]
    /// "application/xhtml+xml"; An SVG foreignObject element; An SVG desc
    /// element; An SVG title element"
    pub(in crate::parser) fn is_html_integration_point(&self, id: NodeId) -> bool {
        let Some(element) = self.tree.as_element(id) else {
            return false;
        };
        let name = self.tree.resolve(element.name);
        match element.namespace {
            Namespace::MathMl => {
                name == "annotation-xml"
                    && self.tree.attribute(id, "encoding").is_some_and(|enc| {
                        enc.eq_ignore_ascii_case("text/html")
                            || enc.eq_ignore_ascii_case("application/xhtml+xml")
                    })
            }
            Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
            Namespace::Html => false,
        }
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// Whether the token goes to "the rules for parsing tokens in foreign
    /// content" rather than the current insertion mode.
    pub(in crate::parser) fn should_use_foreign_content_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(node) = self.adjusted_current_node() else {
            return false;
        };
        // "If the adjusted current node is an element in the HTML namespace"
        if self.tree.namespace(node).is_none_or(|ns| ns == Namespace::Html) {
            return false;
        }
        let start_tag = match token {
            Token::StartTag { name, .. } => Some(name.as_str()),
            _ => None,
        };
        let is_character = matches!(token, Token::Character { .. });

        // "If the adjusted current node is a MathML text integration point and
        //  the token is a start tag whose tag name is neither "mglyph" nor
        //  "malignmark"" / "... and the token is a character token"
        if self.is_mathml_text_integration_point(node)
            && (is_character || start_tag.is_some_and(|n| n != "mglyph" && n != "malignmark"))
        {
            return false;
        }
        // "If the adjusted current node is a MathML annotation-xml element and
        //  the token is a start tag whose tag name is "svg""
        if self.tree.is_element(node, Namespace::MathMl, "annotation-xml")
            && start_tag == Some("svg")
        {
            return false;
        }
        // "If the adjusted current node is an HTML integration point and the
        //  token is a start tag" / "... and the token is a character token"
        if self.is_html_integration_point(node) && (is_character || start_tag.is_some()) {
            return false;
        }
        // "If the token is an end-of-file token"
        !token.is_eof()
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(in crate::parser) fn handle_foreign_content(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is U+0000 NULL"
            Token::Character { data: '\0' } => {
                self.parse_error("unexpected-null-character");
                self.insert_character('\u{FFFD}')?;
            }
            // "A character token that is one of U+0009 CHARACTER TABULATION, ..."
            Token::Character { data } if is_whitespace(*data) => {
                self.insert_character(*data)?;
            }
            // "Any other character token"
            Token::Character { data } => {
                self.insert_character(*data)?;
                self.frameset_ok = false;
            }
            Token::Comment { data } => self.insert_comment(data, None)?,
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            Token::StartTag {
                name, attributes, ..
            } if BREAKOUT_START_TAGS.contains(&name.as_str())
                || (name == "font"
                    && attributes
                        .iter()
                        .any(|a| matches!(a.name.as_str(), "color" | "face" | "size"))) =>
            {
                return self.break_out_of_foreign_content(token);
            }
            Token::EndTag { name, .. } if name == "br" || name == "p" => {
                return self.break_out_of_foreign_content(token);
            }

            // "Any other start tag"
            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                let namespace = self
                    .adjusted_current_node()
                    .and_then(|id| self.tree.namespace(id))
                    .unwrap_or(Namespace::Html);
                // "If the adjusted current node is an element in the SVG
                //  namespace, and the token's tag name is one of the ones in
                //  the first column of the following table, change the tag name"
                let name = if namespace == Namespace::Svg {
                    adjust_svg_tag_name(name)
                } else {
                    name.as_str()
                };
                let _ = self.insert_foreign_element(name, attributes, namespace)?;
                // "If the token has its self-closing flag set, then ...
                //  acknowledge the token's self-closing flag, and pop the
                //  current node off the stack of open elements"
                if *self_closing {
                    let _ = self.stack_of_open_elements.pop();
                }
            }

            // "An end tag whose tag name is "script", if the current node is
            //  an SVG script element"
            Token::EndTag { name, .. }
                if name == "script"
                    && self
                        .current_node()
                        .is_some_and(|id| self.tree.is_element(id, Namespace::Svg, "script")) =>
            {
                let _ = self.stack_of_open_elements.pop();
            }

            // "Any other end tag"
            Token::EndTag { name, .. } => return self.foreign_end_tag(name, token),

            Token::EndOfFile => {}
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "Parse error. While the current node is not a MathML text integration
    /// point, an HTML integration point, or an element in the HTML namespace,
    /// pop elements from the stack of open elements. Reprocess the token
    /// according to the rules given in the section corresponding to the
    /// current insertion mode in HTML content."
    fn break_out_of_foreign_content(&mut self, token: &Token) -> ProcessResult {
        self.parse_error_for("html-tag-in-foreign-content", token.tag_name().unwrap_or(""));
        while let Some(current) = self.current_node() {
            if self.is_mathml_text_integration_point(current)
                || self.is_html_integration_point(current)
                || self.tree.namespace(current) == Some(Namespace::Html)
            {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
        self.process_using_rules_for(self.insertion_mode, token)
    }

    /// "Any other end tag" in foreign content.
    fn foreign_end_tag(&mut self, name: &str, token: &Token) -> ProcessResult {
        let matches_token = |parser: &Self, id: NodeId| {
            parser
                .tree
                .tag_name(id)
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        };

        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        let Some(mut index) = self.stack_of_open_elements.len().checked_sub(1) else {
            return Ok(TokenOutcome::Consumed);
        };

        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
        //          same as the tag name of the token, then this is a parse error."
        if !matches_token(self, self.stack_of_open_elements[index]) {
            self.parse_error_for("unexpected-end-tag", name);
        }

        loop {
            let node = self.stack_of_open_elements[index];
            // STEP 3: "Loop: If node is the topmost element in the stack of
            //          open elements, then return. (fragment case)"
            if index == 0 {
                return Ok(TokenOutcome::Consumed);
            }
            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the
            //          same as the tag name of the token, pop elements from the
            //          stack of open elements until node has been popped from
            //          the stack, and then return."
            if matches_token(self, node) {
                self.pop_until_node(node);
                return Ok(TokenOutcome::Consumed);
            }
            // STEP 5: "Set node to the previous entry in the stack of open elements."
            index -= 1;
            // STEP 6: "If node is not an element in the HTML namespace, return
            //          to the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules given
            //          in the section corresponding to the current insertion mode
            //          in HTML content."
            if self.tree.namespace(self.stack_of_open_elements[index]) == Some(Namespace::Html) {
                return self.process_using_rules_for(self.insertion_mode, token);
            }
        }
    }
}
