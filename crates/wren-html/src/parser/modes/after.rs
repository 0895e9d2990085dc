//! Insertion modes after the body or frameset has been closed.

use wren_dom::NodeId;

use super::super::core::{HTMLParser, InsertionMode, ProcessResult, TokenOutcome, is_whitespace};
use crate::tokenizer::Token;

impl HTMLParser {
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(in crate::parser) fn handle_after_body_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is ASCII whitespace" / "A start tag whose
            //  tag name is "html"" - "Process the token using the rules for the
            //  "in body" insertion mode."
            Token::Character { data } if is_whitespace(*data) => {
                return self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            //  stack of open elements (the html element)."
            Token::Comment { data } => {
                let html = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment(data, Some((html, None)))?;
            }

            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "An end tag whose tag name is "html""
            Token::EndTag { name, .. } if name == "html" => {
                // "If the parser was created as part of the HTML fragment
                //  parsing algorithm, this is a parse error; ignore the token.
                //  (fragment case)"
                if self.context_element.is_some() {
                    self.parse_error_for("unexpected-end-tag", name);
                } else {
                    // "Otherwise, switch the insertion mode to "after after body"."
                    self.insertion_mode = InsertionMode::AfterAfterBody;
                }
            }

            // "An end-of-file token" - "Stop parsing."
            Token::EndOfFile => {}

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            //  reprocess the token."
            _ => {
                self.parse_error("content-after-body");
                return self.reprocess_in(InsertionMode::InBody);
            }
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(in crate::parser) fn handle_in_frameset_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is ASCII whitespace" - "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data)?,

            Token::Comment { data } => self.insert_comment(data, None)?,

            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "html" => return self.handle_in_body_mode(token),
                // "A start tag whose tag name is "frameset"" - "Insert an HTML
                //  element for the token."
                "frameset" => {
                    let _ = self.insert_html_element(name, attributes)?;
                }
                // "A start tag whose tag name is "frame""
                // "Insert an HTML element for the token. Immediately pop the
                //  current node off the stack of open elements."
                "frame" => {
                    let _ = self.insert_html_element(name, attributes)?;
                    let _ = self.stack_of_open_elements.pop();
                }
                "noframes" => return self.handle_in_head_mode(token),
                _ => self.parse_error_for("unexpected-start-tag-in-frameset", name),
            },

            // "An end tag whose tag name is "frameset""
            Token::EndTag { name, .. } if name == "frameset" => {
                // "If the current node is the root html element, then this is a
                //  parse error; ignore the token. (fragment case)"
                if self.stack_of_open_elements.len() <= 1 {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "Otherwise, pop the current node from the stack of open
                //  elements."
                let _ = self.stack_of_open_elements.pop();
                // "If the parser was not created as part of the HTML fragment
                //  parsing algorithm (fragment case), and the current node is no
                //  longer a frameset element, then switch the insertion mode to
                //  "after frameset"."
                if self.context_element.is_none() && !self.current_node_is("frameset") {
                    self.insertion_mode = InsertionMode::AfterFrameset;
                }
            }

            Token::EndTag { name, .. } => {
                self.parse_error_for("unexpected-end-tag-in-frameset", name);
            }

            // "An end-of-file token"
            // "If the current node is not the root html element, then this is a
            //  parse error. Note: The current node can only be the root html
            //  element in the fragment case. Stop parsing."
            Token::EndOfFile => {
                if self.stack_of_open_elements.len() > 1 {
                    self.parse_error("eof-in-frameset");
                }
            }

            Token::Character { .. } => self.parse_error("unexpected-character-in-frameset"),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(in crate::parser) fn handle_after_frameset_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data)?,
            Token::Comment { data } => self.insert_comment(data, None)?,
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }
            // "An end tag whose tag name is "html"" - "Switch the insertion
            //  mode to "after after frameset"."
            Token::EndTag { name, .. } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterFrameset;
            }
            Token::StartTag { name, .. } if name == "noframes" => {
                return self.handle_in_head_mode(token);
            }
            Token::EndOfFile => {}
            // "Anything else" - "Parse error. Ignore the token."
            _ => self.parse_error("content-after-frameset"),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(in crate::parser) fn handle_after_after_body_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A comment token" - "Insert a comment as the last child of the
            //  Document object."
            Token::Comment { data } => self.insert_comment_in_document(data)?,

            // "A DOCTYPE token" / "A character token that is ASCII whitespace"
            // / "A start tag whose tag name is "html"" - "Process the token
            // using the rules for the "in body" insertion mode."
            Token::Doctype { .. } => return self.handle_in_body_mode(token),
            Token::Character { data } if is_whitespace(*data) => {
                return self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }

            Token::EndOfFile => {}

            // "Anything else" - "Parse error. Switch the insertion mode to "in
            //  body" and reprocess the token."
            _ => {
                self.parse_error("content-after-html");
                return self.reprocess_in(InsertionMode::InBody);
            }
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(in crate::parser) fn handle_after_after_frameset_mode(
        &mut self,
        token: &Token,
    ) -> ProcessResult {
        match token {
            Token::Comment { data } => self.insert_comment_in_document(data)?,
            Token::Doctype { .. } => return self.handle_in_body_mode(token),
            Token::Character { data } if is_whitespace(*data) => {
                return self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "noframes" => {
                return self.handle_in_head_mode(token);
            }
            Token::EndOfFile => {}
            _ => self.parse_error("content-after-frameset"),
        }
        Ok(TokenOutcome::Consumed)
    }
}
