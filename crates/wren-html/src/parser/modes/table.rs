//! Table insertion modes: "in table", "in table text", "in caption",
//! "in column group", "in table body", "in row" and "in cell".

use super::super::core::{HTMLParser, InsertionMode, ProcessResult, TokenOutcome, is_whitespace};
use super::super::stack::Scope;
use crate::tokenizer::Token;

/// "clear the stack back to a table context"
const TABLE_CONTEXT: &[&str] = &["table", "template"];

/// "clear the stack back to a table body context"
const TABLE_BODY_CONTEXT: &[&str] = &["tbody", "tfoot", "thead", "template"];

/// "clear the stack back to a table row context"
const TABLE_ROW_CONTEXT: &[&str] = &["tr", "template"];

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

impl HTMLParser {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    #[allow(clippy::too_many_lines)]
    pub(in crate::parser) fn handle_in_table_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token, if the current node is table, tbody,
            //  template, tfoot, thead, or tr element"
            Token::Character { .. }
                if self.current_node().is_some_and(|id| {
                    self.is_html_one_of(id, &["table", "tbody", "template", "tfoot", "thead", "tr"])
                }) =>
            {
                // "Let the pending table character tokens be an empty list of
                //  tokens. Let the original insertion mode be the current
                //  insertion mode. Switch the insertion mode to "in table text"
                //  and reprocess the token."
                self.pending_table_character_tokens.clear();
                self.original_insertion_mode = self.insertion_mode;
                return self.reprocess_in(InsertionMode::InTableText);
            }

            // "A comment token" - "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None)?,

            // "A DOCTYPE token" - "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            Token::StartTag {
                name,
                self_closing: _,
                attributes,
            } => match name.as_str() {
                // "A start tag whose tag name is "caption""
                "caption" => {
                    // "Clear the stack back to a table context. Insert a marker
                    //  at the end of the list of active formatting elements.
                    //  Insert an HTML element for the token, then switch the
                    //  insertion mode to "in caption"."
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    self.push_marker();
                    let _ = self.insert_html_element(name, attributes)?;
                    self.insertion_mode = InsertionMode::InCaption;
                }

                // "A start tag whose tag name is "colgroup""
                "colgroup" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element(name, attributes)?;
                    self.insertion_mode = InsertionMode::InColumnGroup;
                }

                // "A start tag whose tag name is "col""
                // "Clear the stack back to a table context. Insert an HTML
                //  element for a "colgroup" start tag token with no attributes,
                //  then switch the insertion mode to "in column group".
                //  Reprocess the current token."
                "col" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element("colgroup", &[])?;
                    return self.reprocess_in(InsertionMode::InColumnGroup);
                }

                // "A start tag whose tag name is one of: "tbody", "tfoot", "thead""
                "tbody" | "tfoot" | "thead" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element(name, attributes)?;
                    self.insertion_mode = InsertionMode::InTableBody;
                }

                // "A start tag whose tag name is one of: "td", "th", "tr""
                // "Clear the stack back to a table context. Insert an HTML
                //  element for a "tbody" start tag token with no attributes,
                //  then switch the insertion mode to "in table body".
                //  Reprocess the current token."
                "td" | "th" | "tr" => {
                    self.clear_stack_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element("tbody", &[])?;
                    return self.reprocess_in(InsertionMode::InTableBody);
                }

                // "A start tag whose tag name is "table""
                "table" => {
                    // "Parse error. If the stack of open elements does not have
                    //  a table element in table scope, ignore the token."
                    self.parse_error_for("unexpected-start-tag", name);
                    if self.has_element_in_table_scope("table") {
                        // "Otherwise: Pop elements from this stack until a
                        //  table element has been popped from the stack. Reset
                        //  the insertion mode appropriately. Reprocess the token."
                        self.pop_until_named("table");
                        self.reset_insertion_mode_appropriately();
                        return Ok(TokenOutcome::Reprocess);
                    }
                }

                // "A start tag whose tag name is one of: "style", "script",
                //  "template"" - "Process the token using the rules for the
                //  "in head" insertion mode."
                "style" | "script" | "template" => return self.handle_in_head_mode(token),

                // "A start tag whose tag name is "input""
                "input"
                    if token
                        .attribute("type")
                        .is_some_and(|t| t.eq_ignore_ascii_case("hidden")) =>
                {
                    // "Parse error. Insert an HTML element for the token. Pop
                    //  that input element off the stack of open elements.
                    //  Acknowledge the token's self-closing flag, if it is set."
                    self.parse_error_for("unexpected-start-tag", name);
                    let _ = self.insert_html_element(name, attributes)?;
                    let _ = self.stack_of_open_elements.pop();
                }

                // "A start tag whose tag name is "form""
                "form" => {
                    // "Parse error. If there is a template element on the stack
                    //  of open elements, or if the form element pointer is not
                    //  null, ignore the token."
                    self.parse_error_for("unexpected-start-tag", name);
                    if !self.stack_contains("template") && self.form_element_pointer.is_none() {
                        // "Otherwise: Insert an HTML element for the token, and
                        //  set the form element pointer to point to the element
                        //  created. Pop that form element off the stack of open
                        //  elements."
                        let form = self.insert_html_element(name, attributes)?;
                        self.form_element_pointer = Some(form);
                        let _ = self.stack_of_open_elements.pop();
                    }
                }

                _ => return self.in_table_anything_else(token),
            },

            Token::EndTag { name, .. } => match name.as_str() {
                // "An end tag whose tag name is "table""
                "table" => {
                    // "If the stack of open elements does not have a table
                    //  element in table scope, this is a parse error; ignore
                    //  the token."
                    if !self.has_element_in_table_scope("table") {
                        self.parse_error_for("unexpected-end-tag", name);
                        return Ok(TokenOutcome::Consumed);
                    }
                    // "Otherwise: Pop elements from this stack until a table
                    //  element has been popped from the stack. Reset the
                    //  insertion mode appropriately."
                    self.pop_until_named("table");
                    self.reset_insertion_mode_appropriately();
                }

                // "An end tag whose tag name is one of: "body", "caption",
                //  "col", "colgroup", "html", "tbody", "td", "tfoot", "th",
                //  "thead", "tr"" - "Parse error. Ignore the token."
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => self.parse_error_for("unexpected-end-tag", name),

                // "An end tag whose tag name is "template""
                "template" => return self.handle_in_head_mode(token),

                _ => return self.in_table_anything_else(token),
            },

            // "An end-of-file token" - "Process the token using the rules for
            //  the "in body" insertion mode."
            Token::EndOfFile => return self.handle_in_body_mode(token),

            Token::Character { .. } => return self.in_table_anything_else(token),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "Anything else" in the "in table" insertion mode.
    ///
    /// "Parse error. Enable foster parenting, process the token using the
    /// rules for the "in body" insertion mode, and then disable foster
    /// parenting."
    fn in_table_anything_else(&mut self, token: &Token) -> ProcessResult {
        self.parse_error_for("foster-parented-content", token.tag_name().unwrap_or("#text"));
        self.foster_parenting = true;
        let outcome = self.handle_in_body_mode(token);
        self.foster_parenting = false;
        outcome
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(in crate::parser) fn handle_in_table_text_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is U+0000 NULL" - "Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),

            // "Any other character token"
            // "Append the character token to the pending table character
            //  tokens list."
            Token::Character { data } => {
                self.pending_table_character_tokens
                    .push((*data, self.token_location));
            }

            // "Anything else"
            _ => {
                self.flush_pending_table_character_tokens()?;
                // "Switch the insertion mode to the original insertion mode and
                //  reprocess the token."
                return self.reprocess_in(self.original_insertion_mode);
            }
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "If any of the tokens in the pending table character tokens list are
    /// character tokens that are not ASCII whitespace, then this is a parse
    /// error: reprocess the character tokens in the pending table character
    /// tokens list using the rules given in the "anything else" entry in the
    /// "in table" insertion mode. Otherwise, insert the characters given by
    /// the pending table character tokens list."
    fn flush_pending_table_character_tokens(&mut self) -> Result<(), wren_dom::ArenaError> {
        let pending = std::mem::take(&mut self.pending_table_character_tokens);
        let foster = pending.iter().any(|&(c, _)| !is_whitespace(c));
        let location = self.token_location;
        if foster {
            self.parse_error("foster-parented-text");
        }
        for (data, at) in pending {
            self.token_location = at;
            if foster {
                self.foster_parenting = true;
                let outcome = self.handle_in_body_mode(&Token::Character { data });
                self.foster_parenting = false;
                let _ = outcome?;
            } else {
                self.insert_character(data)?;
            }
        }
        self.token_location = location;
        Ok(())
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(in crate::parser) fn handle_in_caption_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "An end tag whose tag name is "caption""
            Token::EndTag { name, .. } if name == "caption" => {
                let _ = self.close_caption();
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr"" / "An
            //  end tag whose tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if self.close_caption() {
                    return Ok(TokenOutcome::Reprocess);
                }
            }
            Token::EndTag { name, .. } if name == "table" => {
                if self.close_caption() {
                    return Ok(TokenOutcome::Reprocess);
                }
            }

            // "An end tag whose tag name is one of: "body", "col", "colgroup",
            //  "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                self.parse_error_for("unexpected-end-tag", name);
            }

            // "Anything else" - "Process the token using the rules for the "in
            //  body" insertion mode."
            _ => return self.handle_in_body_mode(token),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// Close the open caption and return to "in table". Returns `false` if
    /// there was no caption in table scope and the token was ignored.
    fn close_caption(&mut self) -> bool {
        // "If the stack of open elements does not have a caption element in
        //  table scope, this is a parse error; ignore the token. (fragment case)"
        if !self.has_element_in_table_scope("caption") {
            self.parse_error("no-caption-in-table-scope");
            return false;
        }
        // "Generate implied end tags. Now, if the current node is not a caption
        //  element, then this is a parse error. Pop elements from this stack
        //  until a caption element has been popped from the stack. Clear the
        //  list of active formatting elements up to the last marker. Switch the
        //  insertion mode to "in table"."
        self.generate_implied_end_tags(None);
        if !self.current_node_is("caption") {
            self.parse_error("unclosed-elements-in-caption");
        }
        self.pop_until_named("caption");
        self.clear_active_formatting_elements_to_last_marker();
        self.insertion_mode = InsertionMode::InTable;
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    pub(in crate::parser) fn handle_in_column_group_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is ASCII whitespace" - "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data)?,

            Token::Comment { data } => self.insert_comment(data, None)?,

            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "A start tag whose tag name is "html""
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the
            //  current node off the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if name == "col" => {
                let _ = self.insert_html_element(name, attributes)?;
                let _ = self.stack_of_open_elements.pop();
            }

            // "An end tag whose tag name is "colgroup""
            Token::EndTag { name, .. } if name == "colgroup" => {
                // "If the current node is not a colgroup element, then this is
                //  a parse error; ignore the token."
                if self.current_node_is("colgroup") {
                    let _ = self.stack_of_open_elements.pop();
                    self.insertion_mode = InsertionMode::InTable;
                } else {
                    self.parse_error_for("unexpected-end-tag", name);
                }
            }

            // "An end tag whose tag name is "col"" - "Parse error. Ignore the token."
            Token::EndTag { name, .. } if name == "col" => {
                self.parse_error_for("unexpected-end-tag", name);
            }

            // "A start tag whose tag name is "template"" / "An end tag whose
            //  tag name is "template""
            Token::StartTag { name, .. } | Token::EndTag { name, .. } if name == "template" => {
                return self.handle_in_head_mode(token);
            }

            Token::EndOfFile => return self.handle_in_body_mode(token),

            // "Anything else"
            _ => {
                // "If the current node is not a colgroup element, then this is
                //  a parse error; ignore the token."
                if !self.current_node_is("colgroup") {
                    self.parse_error("unexpected-token-in-column-group");
                    return Ok(TokenOutcome::Consumed);
                }
                // "Otherwise, pop the current node from the stack of open
                //  elements. Switch the insertion mode to "in table".
                //  Reprocess the token."
                let _ = self.stack_of_open_elements.pop();
                return self.reprocess_in(InsertionMode::InTable);
            }
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    pub(in crate::parser) fn handle_in_table_body_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A start tag whose tag name is "tr""
            Token::StartTag {
                name, attributes, ..
            } if name == "tr" => {
                // "Clear the stack back to a table body context. Insert an HTML
                //  element for the token, then switch the insertion mode to "in
                //  row"."
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.insert_html_element(name, attributes)?;
                self.insertion_mode = InsertionMode::InRow;
            }

            // "A start tag whose tag name is one of: "th", "td""
            Token::StartTag { name, .. } if name == "th" || name == "td" => {
                // "Parse error. Clear the stack back to a table body context.
                //  Insert an HTML element for a "tr" start tag token with no
                //  attributes, then switch the insertion mode to "in row".
                //  Reprocess the current token."
                self.parse_error_for("unexpected-cell-outside-row", name);
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.insert_html_element("tr", &[])?;
                return self.reprocess_in(InsertionMode::InRow);
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name as
                //  the token, this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "Otherwise: Clear the stack back to a table body context. Pop
                //  the current node from the stack of open elements. Switch the
                //  insertion mode to "in table"."
                self.clear_stack_back_to(TABLE_BODY_CONTEXT);
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = InsertionMode::InTable;
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "tfoot", "thead"" / "An end tag whose tag
            //  name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                return Ok(self.close_table_section());
            }
            Token::EndTag { name, .. } if name == "table" => {
                return Ok(self.close_table_section());
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            //  "colgroup", "html", "td", "th", "tr"" - "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.parse_error_for("unexpected-end-tag", name);
            }

            // "Anything else" - "Process the token using the rules for the "in
            //  table" insertion mode."
            _ => return self.handle_in_table_mode(token),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// Leave a table section so the token can be reprocessed "in table".
    fn close_table_section(&mut self) -> TokenOutcome {
        // "If the stack of open elements does not have a tbody, thead, or tfoot
        //  element in table scope, this is a parse error; ignore the token."
        if !self.has_any_in_scope(TABLE_SECTIONS, Scope::Table) {
            self.parse_error("no-table-section-in-scope");
            return TokenOutcome::Consumed;
        }
        // "Otherwise: Clear the stack back to a table body context. Pop the
        //  current node from the stack of open elements. Switch the insertion
        //  mode to "in table". Reprocess the token."
        self.clear_stack_back_to(TABLE_BODY_CONTEXT);
        let _ = self.stack_of_open_elements.pop();
        self.insertion_mode = InsertionMode::InTable;
        TokenOutcome::Reprocess
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    pub(in crate::parser) fn handle_in_row_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A start tag whose tag name is one of: "th", "td""
            Token::StartTag {
                name, attributes, ..
            } if name == "th" || name == "td" => {
                // "Clear the stack back to a table row context. Insert an HTML
                //  element for the token, then switch the insertion mode to "in
                //  cell". Insert a marker at the end of the list of active
                //  formatting elements."
                self.clear_stack_back_to(TABLE_ROW_CONTEXT);
                let _ = self.insert_html_element(name, attributes)?;
                self.insertion_mode = InsertionMode::InCell;
                self.push_marker();
            }

            // "An end tag whose tag name is "tr""
            Token::EndTag { name, .. } if name == "tr" => {
                let _ = self.close_table_row();
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "tfoot", "thead", "tr"" / "An end tag whose
            //  tag name is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                if self.close_table_row() {
                    return Ok(TokenOutcome::Reprocess);
                }
            }
            Token::EndTag { name, .. } if name == "table" => {
                if self.close_table_row() {
                    return Ok(TokenOutcome::Reprocess);
                }
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            Token::EndTag { name, .. } if TABLE_SECTIONS.contains(&name.as_str()) => {
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name as
                //  the token, this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "If the stack of open elements does not have a tr element in
                //  table scope, ignore the token."
                if self.close_table_row() {
                    return Ok(TokenOutcome::Reprocess);
                }
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            //  "colgroup", "html", "td", "th"" - "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.parse_error_for("unexpected-end-tag", name);
            }

            _ => return self.handle_in_table_mode(token),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// Pop the open `tr` and return to "in table body". Returns `false` when
    /// no `tr` is in table scope and the token was ignored.
    fn close_table_row(&mut self) -> bool {
        // "If the stack of open elements does not have a tr element in table
        //  scope, this is a parse error; ignore the token."
        if !self.has_element_in_table_scope("tr") {
            self.parse_error("no-table-row-in-scope");
            return false;
        }
        // "Otherwise: Clear the stack back to a table row context. Pop the
        //  current node (which will be a tr element) from the stack of open
        //  elements. Switch the insertion mode to "in table body"."
        self.clear_stack_back_to(TABLE_ROW_CONTEXT);
        let _ = self.stack_of_open_elements.pop();
        self.insertion_mode = InsertionMode::InTableBody;
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    pub(in crate::parser) fn handle_in_cell_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag { name, .. } if name == "td" || name == "th" => {
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name as
                //  that of the token, then this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "Generate implied end tags. Now, if the current node is not an
                //  HTML element with the same tag name as the token, then this is
                //  a parse error. Pop elements from the stack of open elements
                //  until an HTML element with the same tag name as the token has
                //  been popped from the stack. Clear the list of active
                //  formatting elements up to the last marker. Switch the
                //  insertion mode to "in row"."
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.parse_error_for("unclosed-elements-in-cell", name);
                }
                self.pop_until_named(name);
                self.clear_active_formatting_elements_to_last_marker();
                self.insertion_mode = InsertionMode::InRow;
            }

            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                // "Assert: The stack of open elements has a td or th element in
                //  table scope." Only the fragment case can get here without one.
                if !self.has_any_in_scope(&["td", "th"], Scope::Table) {
                    self.parse_error_for("unexpected-start-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "Close the cell and reprocess the token."
                self.close_the_cell();
                return Ok(TokenOutcome::Reprocess);
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            //  "colgroup", "html"" - "Parse error. Ignore the token."
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.parse_error_for("unexpected-end-tag", name);
            }

            // "An end tag whose tag name is one of: "table", "tbody", "tfoot",
            //  "thead", "tr""
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                // "If the stack of open elements does not have an element in
                //  table scope that is an HTML element with the same tag name as
                //  that of the token, this is a parse error; ignore the token."
                if !self.has_element_in_table_scope(name) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "Otherwise, close the cell and reprocess the token."
                self.close_the_cell();
                return Ok(TokenOutcome::Reprocess);
            }

            _ => return self.handle_in_body_mode(token),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// "Generate implied end tags. If the current node is not now a td element
    /// or a th element, then this is a parse error. Pop elements from the
    /// stack of open elements until a td element or a th element has been
    /// popped from the stack. Clear the list of active formatting elements up
    /// to the last marker. Switch the insertion mode to "in row"."
    fn close_the_cell(&mut self) {
        self.generate_implied_end_tags(None);
        if !self.current_node_is("td") && !self.current_node_is("th") {
            self.parse_error("unclosed-elements-in-cell");
        }
        self.pop_until_one_of(&["td", "th"]);
        self.clear_active_formatting_elements_to_last_marker();
        self.insertion_mode = InsertionMode::InRow;
    }
}
