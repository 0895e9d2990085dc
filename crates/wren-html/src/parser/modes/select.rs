//! [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
//! and [§ 13.2.6.4.17 "in select in table"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)

use super::super::core::{HTMLParser, ProcessResult, TokenOutcome};
use super::super::stack::Scope;
use crate::tokenizer::Token;

/// Table structure tags that close an open select in a table.
const TABLE_TAGS: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

impl HTMLParser {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(in crate::parser) fn handle_in_select_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is U+0000 NULL" - "Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),

            // "Any other character token" - "Insert the token's character."
            Token::Character { data } => self.insert_character(*data)?,

            Token::Comment { data } => self.insert_comment(data, None)?,

            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            Token::StartTag {
                name, attributes, ..
            } => match name.as_str() {
                "html" => return self.handle_in_body_mode(token),

                // "A start tag whose tag name is "option""
                // "If the current node is an option element, pop that node from
                //  the stack of open elements. Insert an HTML element for the token."
                "option" => {
                    self.pop_if_current_is("option");
                    let _ = self.insert_html_element(name, attributes)?;
                }

                // "A start tag whose tag name is "optgroup""
                "optgroup" => {
                    self.pop_if_current_is("option");
                    self.pop_if_current_is("optgroup");
                    let _ = self.insert_html_element(name, attributes)?;
                }

                // "A start tag whose tag name is "hr""
                // "If the current node is an option element, pop that node from
                //  the stack of open elements. If the current node is an
                //  optgroup element, pop that node from the stack of open
                //  elements. Insert an HTML element for the token. Immediately
                //  pop the current node off the stack of open elements."
                "hr" => {
                    self.pop_if_current_is("option");
                    self.pop_if_current_is("optgroup");
                    let _ = self.insert_html_element(name, attributes)?;
                    let _ = self.stack_of_open_elements.pop();
                }

                // "A start tag whose tag name is "select""
                // "Parse error. If the stack of open elements does not have a
                //  select element in select scope, ignore the token. (fragment
                //  case) Otherwise: Pop elements from the stack of open elements
                //  until a select element has been popped from the stack. Reset
                //  the insertion mode appropriately."
                "select" => {
                    self.parse_error_for("nested-select", name);
                    if self.has_element_in_scope_of("select", Scope::Select) {
                        self.pop_until_named("select");
                        self.reset_insertion_mode_appropriately();
                    }
                }

                // "A start tag whose tag name is one of: "input", "keygen",
                //  "textarea""
                "input" | "keygen" | "textarea" => {
                    self.parse_error_for("unexpected-start-tag-in-select", name);
                    if !self.has_element_in_scope_of("select", Scope::Select) {
                        return Ok(TokenOutcome::Consumed);
                    }
                    self.pop_until_named("select");
                    self.reset_insertion_mode_appropriately();
                    return Ok(TokenOutcome::Reprocess);
                }

                // "A start tag whose tag name is one of: "script", "template""
                "script" | "template" => return self.handle_in_head_mode(token),

                _ => self.parse_error_for("unexpected-start-tag-in-select", name),
            },

            Token::EndTag { name, .. } => match name.as_str() {
                // "An end tag whose tag name is "optgroup""
                "optgroup" => {
                    // "First, if the current node is an option element, and the
                    //  node immediately before it in the stack of open elements
                    //  is an optgroup element, then pop the current node from
                    //  the stack of open elements."
                    let depth = self.stack_of_open_elements.len();
                    if self.current_node_is("option")
                        && depth >= 2
                        && self
                            .tree
                            .is_html_element(self.stack_of_open_elements[depth - 2], "optgroup")
                    {
                        let _ = self.stack_of_open_elements.pop();
                    }
                    // "If the current node is an optgroup element, then pop
                    //  that node from the stack of open elements. Otherwise,
                    //  this is a parse error; ignore the token."
                    if self.current_node_is("optgroup") {
                        let _ = self.stack_of_open_elements.pop();
                    } else {
                        self.parse_error_for("unexpected-end-tag", name);
                    }
                }

                // "An end tag whose tag name is "option""
                "option" => {
                    if self.current_node_is("option") {
                        let _ = self.stack_of_open_elements.pop();
                    } else {
                        self.parse_error_for("unexpected-end-tag", name);
                    }
                }

                // "An end tag whose tag name is "select""
                "select" => {
                    if self.has_element_in_scope_of("select", Scope::Select) {
                        self.pop_until_named("select");
                        self.reset_insertion_mode_appropriately();
                    } else {
                        self.parse_error_for("unexpected-end-tag", name);
                    }
                }

                "template" => return self.handle_in_head_mode(token),

                _ => self.parse_error_for("unexpected-end-tag-in-select", name),
            },

            // "An end-of-file token" - "Process the token using the rules for
            //  the "in body" insertion mode."
            Token::EndOfFile => return self.handle_in_body_mode(token),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(in crate::parser) fn handle_in_select_in_table_mode(
        &mut self,
        token: &Token,
    ) -> ProcessResult {
        match token {
            // "A start tag whose tag name is one of: "caption", "table",
            //  "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error. Pop elements from the stack of open elements until
            //  a select element has been popped from the stack. Reset the
            //  insertion mode appropriately. Reprocess the token."
            Token::StartTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                self.parse_error_for("unexpected-table-tag-in-select", name);
                self.pop_until_named("select");
                self.reset_insertion_mode_appropriately();
                Ok(TokenOutcome::Reprocess)
            }

            // "An end tag whose tag name is one of: "caption", "table",
            //  "tbody", "tfoot", "thead", "tr", "td", "th""
            Token::EndTag { name, .. } if TABLE_TAGS.contains(&name.as_str()) => {
                self.parse_error_for("unexpected-table-tag-in-select", name);
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name as
                //  that of the token, then ignore the token."
                if !self.has_element_in_table_scope(name) {
                    return Ok(TokenOutcome::Consumed);
                }
                self.pop_until_named("select");
                self.reset_insertion_mode_appropriately();
                Ok(TokenOutcome::Reprocess)
            }

            // "Anything else" - "Process the token using the rules for the "in
            //  select" insertion mode."
            _ => self.handle_in_select_mode(token),
        }
    }

    fn pop_if_current_is(&mut self, name: &str) {
        if self.current_node_is(name) {
            let _ = self.stack_of_open_elements.pop();
        }
    }
}
