//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use wren_dom::{ArenaError, Namespace};

use super::super::core::{
    ActiveFormattingElement, HTMLParser, InsertionMode, ProcessResult, TokenOutcome, is_whitespace,
};
use super::super::formatting::AdoptionOutcome;
use super::super::quirks::DocumentMode;
use super::super::stack::Scope;
use crate::tokenizer::{Attribute, Token, TokenizerState};

/// "A start tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main",
/// "menu", "nav", "ol", "p", "search", "section", "summary", "ul""
const BLOCK_START_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "search",
    "section",
    "summary",
    "ul",
];

/// "An end tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "button", "center", "details", "dialog", "dir", "div",
/// "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup",
/// "listing", "main", "menu", "nav", "ol", "pre", "search", "section",
/// "summary", "ul""
const BLOCK_END_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "button",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "header",
    "hgroup",
    "listing",
    "main",
    "menu",
    "nav",
    "ol",
    "pre",
    "search",
    "section",
    "summary",
    "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// [§ 13.2.4.3 Formatting](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The following HTML elements are those that end up in the list of active
/// formatting elements: a, b, big, code, em, font, i, nobr, s, small,
/// strike, strong, tt, and u."
const FORMATTING_ELEMENTS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// Start tags the "in body" mode hands to the "in head" rules.
const HEAD_CONTENT_START_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "template",
    "title",
];

/// "A start tag whose tag name is one of: "caption", "col", "colgroup",
/// "frame", "head", "tbody", "td", "tfoot", "th", "thead", "tr"" -
/// "Parse error. Ignore the token."
const IGNORED_START_TAGS: &[&str] = &[
    "caption", "col", "colgroup", "frame", "head", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// Elements that may legitimately still be open when the body ends.
///
/// "If there is a node in the stack of open elements that is not either a dd
/// element, a dt element, an li element, an optgroup element, an option
/// element, a p element, an rb element, an rp element, an rt element, an rtc
/// element, a tbody element, a td element, a tfoot element, a th element, a
/// thead element, a tr element, the body element, or the html element, then
/// this is a parse error."
const ALLOWED_OPEN_AT_BODY_END: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc", "tbody", "td", "tfoot",
    "th", "thead", "tr", "body", "html",
];

impl HTMLParser {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    #[allow(clippy::too_many_lines)]
    pub(in crate::parser) fn handle_in_body_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is U+0000 NULL" - "Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected-null-character"),

            // "A character token that is ASCII whitespace"
            // "Reconstruct the active formatting elements, if any. Insert the
            //  token's character."
            Token::Character { data } if is_whitespace(*data) => {
                self.reconstruct_active_formatting_elements()?;
                self.insert_character(*data)?;
            }

            // "Any other character token"
            // "Reconstruct the active formatting elements, if any. Insert the
            //  token's character. Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.reconstruct_active_formatting_elements()?;
                self.insert_character(*data)?;
                self.frameset_ok = false;
            }

            // "A comment token" - "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None)?,

            // "A DOCTYPE token" - "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            Token::StartTag {
                name,
                self_closing,
                attributes,
            } => return self.in_body_start_tag(token, name, *self_closing, attributes),

            Token::EndTag { name, .. } => return self.in_body_end_tag(token, name),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If the stack of template insertion modes is not empty, then
                //  process the token using the rules for the "in template"
                //  insertion mode."
                if !self.template_insertion_modes.is_empty() {
                    return self.handle_in_template_mode(token);
                }
                // "Otherwise, follow these steps: If there is a node in the
                //  stack of open elements that is not [allowed], then this is a
                //  parse error. Stop parsing."
                self.check_open_elements_at_body_end("eof-with-unclosed-elements");
            }
        }
        Ok(TokenOutcome::Consumed)
    }

    fn check_open_elements_at_body_end(&mut self, code: &'static str) {
        let unexpected = self
            .stack_of_open_elements
            .iter()
            .any(|&id| !self.is_html_one_of(id, ALLOWED_OPEN_AT_BODY_END));
        if unexpected {
            self.parse_error(code);
        }
    }

    #[allow(clippy::too_many_lines)]
    fn in_body_start_tag(
        &mut self,
        token: &Token,
        name: &str,
        self_closing: bool,
        attributes: &[Attribute],
    ) -> ProcessResult {
        match name {
            // "A start tag whose tag name is "html""
            "html" => {
                // "Parse error."
                self.parse_error_for("unexpected-start-tag", name);
                self.metadata.note_duplicate_html(self.token_location);
                // "If there is a template element on the stack of open
                //  elements, then ignore the token. Otherwise, for each
                //  attribute on the token, check to see if the attribute is
                //  already present on the top element of the stack of open
                //  elements. If it is not, add the attribute and its
                //  corresponding value to that element."
                if !self.stack_contains("template")
                    && let Some(&html) = self.stack_of_open_elements.first()
                {
                    self.tree.add_missing_attributes(
                        html,
                        attributes.iter().map(|a| (a.name.as_str(), a.value.as_str())),
                    )?;
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link", "meta", "noframes", "script", "style",
            //  "template", "title""
            // "Process the token using the rules for the "in head" insertion mode."
            _ if HEAD_CONTENT_START_TAGS.contains(&name) => {
                return self.handle_in_head_mode(token);
            }

            // "A start tag whose tag name is "body""
            "body" => {
                // "Parse error."
                self.parse_error_for("unexpected-start-tag", name);
                // "If the second element on the stack of open elements is not a
                //  body element, if the stack of open elements has only one node
                //  on it, or if there is a template element on the stack of open
                //  elements, then ignore the token. (fragment case or there is a
                //  template element on the stack)"
                let body = self
                    .stack_of_open_elements
                    .get(1)
                    .copied()
                    .filter(|&id| self.tree.is_html_element(id, "body"));
                if let Some(body) = body
                    && !self.stack_contains("template")
                {
                    // "Otherwise, set the frameset-ok flag to "not ok"; then,
                    //  for each attribute on the token, check to see if the
                    //  attribute is already present on the body element (the
                    //  second element) on the stack of open elements, and if it
                    //  is not, add the attribute and its corresponding value to
                    //  that element."
                    self.frameset_ok = false;
                    self.metadata.note_duplicate_body(self.token_location);
                    self.tree.add_missing_attributes(
                        body,
                        attributes.iter().map(|a| (a.name.as_str(), a.value.as_str())),
                    )?;
                }
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                // "Parse error."
                self.parse_error_for("unexpected-start-tag", name);
                // "If the stack of open elements has only one node on it, or if
                //  the second element on the stack of open elements is not a
                //  body element, then ignore the token. (fragment case or there
                //  is a template element on the stack)"
                // "If the frameset-ok flag is set to "not ok", ignore the token."
                let body = self
                    .stack_of_open_elements
                    .get(1)
                    .copied()
                    .filter(|&id| self.tree.is_html_element(id, "body"));
                if let Some(body) = body
                    && self.frameset_ok
                {
                    // "Otherwise, run the following steps: Remove the second
                    //  element on the stack of open elements from its parent
                    //  node, if it has one. Pop all the nodes from the bottom of
                    //  the stack of open elements, from the current node up to,
                    //  but not including, the root html element. Insert an HTML
                    //  element for the token. Switch the insertion mode to "in
                    //  frameset"."
                    self.tree.detach(body);
                    self.stack_of_open_elements.truncate(1);
                    let _ = self.insert_html_element(name, attributes)?;
                    self.insertion_mode = InsertionMode::InFrameset;
                }
            }

            _ if BLOCK_START_TAGS.contains(&name) => {
                // "If the stack of open elements has a p element in button
                //  scope, then close a p element. Insert an HTML element for
                //  the token."
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes)?;
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            //  "h5", "h6""
            _ if HEADINGS.contains(&name) => {
                self.close_p_if_in_button_scope();
                // "If the current node is an HTML element whose tag name is one
                //  of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a
                //  parse error; pop the current node off the stack of open
                //  elements."
                if self
                    .current_node()
                    .is_some_and(|id| self.is_html_one_of(id, HEADINGS))
                {
                    self.parse_error_for("nested-heading", name);
                    let _ = self.stack_of_open_elements.pop();
                }
                let _ = self.insert_html_element(name, attributes)?;
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            "pre" | "listing" => {
                // "If the stack of open elements has a p element in button
                //  scope, then close a p element. Insert an HTML element for the
                //  token. If the next token is a U+000A LINE FEED (LF) character
                //  token, then ignore that token and move on to the next one.
                //  (Newlines at the start of pre blocks are ignored as an
                //  authoring convenience.) Set the frameset-ok flag to "not ok"."
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes)?;
                self.skip_next_line_feed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            "form" => {
                // "If the form element pointer is not null, and there is no
                //  template element on the stack of open elements, then this is
                //  a parse error; ignore the token."
                let in_template = self.stack_contains("template");
                if self.form_element_pointer.is_some() && !in_template {
                    self.parse_error_for("nested-form", name);
                } else {
                    // "Otherwise: If the stack of open elements has a p element
                    //  in button scope, then close a p element. Insert an HTML
                    //  element for the token, and, if there is no template
                    //  element on the stack of open elements, set the form
                    //  element pointer to point to the element created."
                    self.close_p_if_in_button_scope();
                    let form = self.insert_html_element(name, attributes)?;
                    if !in_template {
                        self.form_element_pointer = Some(form);
                    }
                }
            }

            // "A start tag whose tag name is "li""
            "li" => {
                self.frameset_ok = false;
                self.close_list_item(&["li"]);
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes)?;
            }

            // "A start tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                self.frameset_ok = false;
                self.close_list_item(&["dd", "dt"]);
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes)?;
            }

            // "A start tag whose tag name is "plaintext""
            "plaintext" => {
                // "If the stack of open elements has a p element in button
                //  scope, then close a p element. Insert an HTML element for the
                //  token. Switch the tokenizer to the PLAINTEXT state."
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes)?;
                self.tokenizer.set_state(TokenizerState::PLAINTEXT);
            }

            // "A start tag whose tag name is "button""
            "button" => {
                // "If the stack of open elements has a button element in scope,
                //  then run these substeps: Parse error. Generate implied end
                //  tags. Pop elements from the stack of open elements until a
                //  button element has been popped from the stack."
                if self.has_element_in_scope("button") {
                    self.parse_error_for("nested-button", name);
                    self.generate_implied_end_tags(None);
                    self.pop_until_named("button");
                }
                // "Reconstruct the active formatting elements, if any. Insert
                //  an HTML element for the token. Set the frameset-ok flag to
                //  "not ok"."
                self.reconstruct_active_formatting_elements()?;
                let _ = self.insert_html_element(name, attributes)?;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "a""
            "a" => {
                // "If the list of active formatting elements contains an a
                //  element between the end of the list and the last marker on
                //  the list (or the start of the list if there is no marker on
                //  the list), then this is a parse error; run the adoption
                //  agency algorithm for the token, then remove that element from
                //  the list of active formatting elements and the stack of open
                //  elements if the adoption agency algorithm didn't already
                //  remove it (it might not have if the element is not in table
                //  scope)."
                let existing = self
                    .active_formatting_elements
                    .iter()
                    .rev()
                    .take_while(|e| **e != ActiveFormattingElement::Marker)
                    .find_map(|e| match *e {
                        ActiveFormattingElement::Element(id)
                            if self.tree.is_html_element(id, "a") =>
                        {
                            Some(id)
                        }
                        _ => None,
                    });
                if let Some(existing) = existing {
                    self.parse_error_for("nested-anchor", name);
                    let _ = self.run_adoption_agency("a")?;
                    if let Some(index) = self.afl_position(existing) {
                        let _ = self.active_formatting_elements.remove(index);
                    }
                    self.remove_from_stack(existing);
                }
                // "Reconstruct the active formatting elements, if any. Insert an
                //  HTML element for the token. Push onto the list of active
                //  formatting elements that element."
                self.insert_formatting_element(name, attributes)?;
            }

            // "A start tag whose tag name is "nobr""
            "nobr" => {
                // "Reconstruct the active formatting elements, if any. If the
                //  stack of open elements has a nobr element in scope, then
                //  this is a parse error; run the adoption agency algorithm for
                //  the token, then once again reconstruct the active formatting
                //  elements, if any."
                self.reconstruct_active_formatting_elements()?;
                if self.has_element_in_scope("nobr") {
                    self.parse_error_for("nested-nobr", name);
                    let _ = self.run_adoption_agency("nobr")?;
                }
                self.insert_formatting_element(name, attributes)?;
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em",
            //  "font", "i", "s", "small", "strike", "strong", "tt", "u""
            _ if FORMATTING_ELEMENTS.contains(&name) => {
                self.insert_formatting_element(name, attributes)?;
            }

            // "A start tag whose tag name is one of: "applet", "marquee", "object""
            "applet" | "marquee" | "object" => {
                // "Reconstruct the active formatting elements, if any. Insert an
                //  HTML element for the token. Insert a marker at the end of the
                //  list of active formatting elements. Set the frameset-ok flag
                //  to "not ok"."
                self.reconstruct_active_formatting_elements()?;
                let _ = self.insert_html_element(name, attributes)?;
                self.push_marker();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "table""
            "table" => {
                // "If the Document is not set to quirks mode, and the stack of
                //  open elements has a p element in button scope, then close a
                //  p element. Insert an HTML element for the token. Set the
                //  frameset-ok flag to "not ok". Switch the insertion mode to
                //  "in table"."
                if self.metadata.document_mode() != DocumentMode::Quirks {
                    self.close_p_if_in_button_scope();
                }
                let _ = self.insert_html_element(name, attributes)?;
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InTable;
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            //  "img", "keygen", "wbr""
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.insert_void_element(name, attributes)?;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "input""
            "input" => {
                // "If the token does not have an attribute with the name "type",
                //  or if it does, but that attribute's value is not an ASCII
                //  case-insensitive match for the string "hidden", then: set the
                //  frameset-ok flag to "not ok"."
                self.insert_void_element(name, attributes)?;
                let hidden = token
                    .attribute("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: "param", "source", "track""
            // "Insert an HTML element for the token. Immediately pop the
            //  current node off the stack of open elements."
            "param" | "source" | "track" => {
                let _ = self.insert_html_element(name, attributes)?;
                let _ = self.stack_of_open_elements.pop();
            }

            // "A start tag whose tag name is "hr""
            "hr" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(name, attributes)?;
                let _ = self.stack_of_open_elements.pop();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            //  it. (Don't ask.)"
            "image" => {
                self.parse_error_for("image-start-tag", name);
                let img = Token::StartTag {
                    name: "img".to_string(),
                    self_closing,
                    attributes: attributes.to_vec(),
                };
                return self.handle_in_body_mode(&img);
            }

            // "A start tag whose tag name is "textarea""
            "textarea" => {
                // "Insert an HTML element for the token. If the next token is a
                //  U+000A LINE FEED (LF) character token, then ignore that token
                //  and move on to the next one. Switch the tokenizer to the
                //  RCDATA state. Let the original insertion mode be the current
                //  insertion mode. Set the frameset-ok flag to "not ok". Switch
                //  the insertion mode to "text"."
                self.parse_text_element(name, attributes, TokenizerState::RCDATA)?;
                self.skip_next_line_feed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "xmp""
            "xmp" => {
                self.close_p_if_in_button_scope();
                self.reconstruct_active_formatting_elements()?;
                self.frameset_ok = false;
                self.parse_text_element(name, attributes, TokenizerState::RAWTEXT)?;
            }

            // "A start tag whose tag name is "iframe""
            "iframe" => {
                self.frameset_ok = false;
                self.parse_text_element(name, attributes, TokenizerState::RAWTEXT)?;
            }

            // "A start tag whose tag name is "noembed"" / "A start tag whose
            //  tag name is "noscript", if the scripting flag is enabled"
            // "Follow the generic raw text element parsing algorithm."
            "noembed" => self.parse_text_element(name, attributes, TokenizerState::RAWTEXT)?,
            "noscript" if self.options.scripting_enabled => {
                self.parse_text_element(name, attributes, TokenizerState::RAWTEXT)?;
            }

            // "A start tag whose tag name is "select""
            "select" => {
                self.reconstruct_active_formatting_elements()?;
                let _ = self.insert_html_element(name, attributes)?;
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption", "in
                //  table body", "in row", or "in cell", then switch the
                //  insertion mode to "in select in table". Otherwise, switch the
                //  insertion mode to "in select"."
                self.insertion_mode = match self.insertion_mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            "optgroup" | "option" => {
                // "If the current node is an option element, then pop the
                //  current node off the stack of open elements."
                if self.current_node_is("option") {
                    let _ = self.stack_of_open_elements.pop();
                }
                self.reconstruct_active_formatting_elements()?;
                let _ = self.insert_html_element(name, attributes)?;
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            "rb" | "rtc" => {
                // "If the stack of open elements has a ruby element in scope,
                //  then generate implied end tags. If the current node is not
                //  now a ruby element, this is a parse error."
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is("ruby") {
                        self.parse_error_for("misnested-ruby", name);
                    }
                }
                let _ = self.insert_html_element(name, attributes)?;
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            "rp" | "rt" => {
                // "If the stack of open elements has a ruby element in scope,
                //  then generate implied end tags, except for rtc elements. If
                //  the current node is not now a rtc element or a ruby element,
                //  this is a parse error."
                if self.has_element_in_scope("ruby") {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !self.current_node_is("rtc") && !self.current_node_is("ruby") {
                        self.parse_error_for("misnested-ruby", name);
                    }
                }
                let _ = self.insert_html_element(name, attributes)?;
            }

            // "A start tag whose tag name is "math"" / "A start tag whose tag
            //  name is "svg""
            // "Reconstruct the active formatting elements, if any. Adjust
            //  MathML attributes for the token. Adjust foreign attributes for
            //  the token. Insert a foreign element for the token, with MathML
            //  namespace. If the token has its self-closing flag set, pop the
            //  current node off the stack of open elements and acknowledge the
            //  token's self-closing flag."
            "math" | "svg" => {
                let namespace = if name == "math" {
                    Namespace::MathMl
                } else {
                    Namespace::Svg
                };
                self.reconstruct_active_formatting_elements()?;
                let _ = self.insert_foreign_element(name, attributes, namespace)?;
                if self_closing {
                    let _ = self.stack_of_open_elements.pop();
                }
            }

            _ if IGNORED_START_TAGS.contains(&name) => {
                self.parse_error_for("unexpected-start-tag", name);
            }

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any. Insert an
            //  HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements()?;
                let _ = self.insert_html_element(name, attributes)?;
            }
        }
        Ok(TokenOutcome::Consumed)
    }

    /// Shared steps of the "li", "dd" and "dt" start tags: close an open
    /// list item of the same kind unless a special element intervenes.
    fn close_list_item(&mut self, names: &[&str]) {
        // "Initialize node to be the current node (the bottommost node of the stack)."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            // "Loop: If node is an li element, then run these substeps:
            //  Generate implied end tags, except for li elements. If the
            //  current node is not an li element, then this is a parse error.
            //  Pop elements from the stack of open elements until an li element
            //  has been popped from the stack. Jump to the step labeled done."
            if let Some(name) = self.html_name(node)
                && names.contains(&name)
            {
                let name = name.to_string();
                self.generate_implied_end_tags(Some(&name));
                if !self.current_node_is(&name) {
                    self.parse_error_for("unclosed-list-item", &name);
                }
                self.pop_until_named(&name);
                return;
            }
            // "If node is in the special category, but is not an address, div,
            //  or p element, then jump to the step labeled done below."
            if self.is_special_element(node)
                && !self.is_html_one_of(node, &["address", "div", "p"])
            {
                return;
            }
            // "Otherwise, set node to the previous entry in the stack of open
            //  elements and return to the step labeled loop."
        }
    }

    /// "Reconstruct the active formatting elements, if any. Insert an HTML
    /// element for the token. Push onto the list of active formatting
    /// elements that element."
    fn insert_formatting_element(
        &mut self,
        name: &str,
        attributes: &[Attribute],
    ) -> Result<(), ArenaError> {
        self.reconstruct_active_formatting_elements()?;
        let element = self.insert_html_element(name, attributes)?;
        self.push_active_formatting_element(element);
        Ok(())
    }

    /// "Reconstruct the active formatting elements, if any. Insert an HTML
    /// element for the token. Immediately pop the current node off the stack
    /// of open elements. Acknowledge the token's self-closing flag, if it is set."
    fn insert_void_element(&mut self, name: &str, attributes: &[Attribute]) -> Result<(), ArenaError> {
        self.reconstruct_active_formatting_elements()?;
        let _ = self.insert_html_element(name, attributes)?;
        let _ = self.stack_of_open_elements.pop();
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn in_body_end_tag(&mut self, token: &Token, name: &str) -> ProcessResult {
        match name {
            // "An end tag whose tag name is "template""
            "template" => return self.handle_in_head_mode(token),

            // "An end tag whose tag name is "body""
            "body" => {
                // "If the stack of open elements does not have a body element
                //  in scope, this is a parse error; ignore the token."
                if !self.has_element_in_scope("body") {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                self.check_open_elements_at_body_end("end-body-with-unclosed-elements");
                // "Switch the insertion mode to "after body"."
                self.insertion_mode = InsertionMode::AfterBody;
            }

            // "An end tag whose tag name is "html""
            "html" => {
                if !self.has_element_in_scope("body") {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                self.check_open_elements_at_body_end("end-html-with-unclosed-elements");
                // "Switch the insertion mode to "after body". Reprocess the token."
                return self.reprocess_in(InsertionMode::AfterBody);
            }

            _ if BLOCK_END_TAGS.contains(&name) => {
                // "If the stack of open elements does not have an element in
                //  scope that is an HTML element with the same tag name as that
                //  of the token, then this is a parse error; ignore the token."
                if !self.has_element_in_scope(name) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "Otherwise, run these steps: Generate implied end tags. If the
                //  current node is not an HTML element with the same tag name as
                //  that of the token, then this is a parse error. Pop elements
                //  from the stack of open elements until an HTML element with the
                //  same tag name as the token has been popped from the stack."
                self.close_element_with_implied_end_tags(name, None);
            }

            // "An end tag whose tag name is "form""
            "form" => {
                if self.stack_contains("template") {
                    // "If there is a template element on the stack of open elements"
                    if !self.has_element_in_scope("form") {
                        self.parse_error_for("unexpected-end-tag", name);
                        return Ok(TokenOutcome::Consumed);
                    }
                    self.close_element_with_implied_end_tags(name, None);
                } else {
                    // "Let node be the element that the form element pointer is
                    //  set to, or null if it is not set to an element. Set the
                    //  form element pointer to null."
                    let node = self.form_element_pointer.take();
                    // "If node is null or if the stack of open elements does not
                    //  have node in scope, then this is a parse error; return
                    //  and ignore the token."
                    let Some(node) = node.filter(|&n| self.has_node_in_scope(n)) else {
                        self.parse_error_for("unexpected-end-tag", name);
                        return Ok(TokenOutcome::Consumed);
                    };
                    // "Generate implied end tags. If the current node is not
                    //  node, then this is a parse error. Remove node from the
                    //  stack of open elements."
                    self.generate_implied_end_tags(None);
                    if self.current_node() != Some(node) {
                        self.parse_error_for("unclosed-elements-in-form", name);
                    }
                    self.remove_from_stack(node);
                }
            }

            // "An end tag whose tag name is "p""
            "p" => {
                // "If the stack of open elements does not have a p element in
                //  button scope, then this is a parse error; insert an HTML
                //  element for a "p" start tag token with no attributes."
                if !self.has_element_in_button_scope("p") {
                    self.parse_error_for("unexpected-end-tag", name);
                    let _ = self.insert_html_element("p", &[])?;
                }
                // "Close a p element."
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            "li" => {
                // "If the stack of open elements does not have an li element in
                //  list item scope, then this is a parse error; ignore the token."
                if !self.has_element_in_scope_of("li", Scope::ListItem) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                self.close_element_with_implied_end_tags(name, Some(name));
            }

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => {
                if !self.has_element_in_scope(name) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                self.close_element_with_implied_end_tags(name, Some(name));
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            //  "h5", "h6""
            _ if HEADINGS.contains(&name) => {
                // "If the stack of open elements does not have an element in
                //  scope that is an HTML element and whose tag name is one of
                //  "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                //  error; ignore the token."
                if !self.has_any_in_scope(HEADINGS, Scope::Default) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.parse_error_for("misnested-heading", name);
                }
                self.pop_until_one_of(HEADINGS);
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            //  "em", "font", "i", "nobr", "s", "small", "strike", "strong",
            //  "tt", "u""
            // "Run the adoption agency algorithm for the token."
            _ if FORMATTING_ELEMENTS.contains(&name) => {
                if self.run_adoption_agency(name)? == AdoptionOutcome::AnyOtherEndTag {
                    self.any_other_end_tag(name);
                }
            }

            // "An end tag token whose tag name is one of: "applet", "marquee", "object""
            "applet" | "marquee" | "object" => {
                if !self.has_element_in_scope(name) {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                self.close_element_with_implied_end_tags(name, None);
                // "Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            //  described in the next entry; i.e. act as if this was a "br"
            //  start tag token with no attributes, rather than the end tag
            //  token that it actually is."
            "br" => {
                self.parse_error_for("unexpected-end-tag", name);
                self.insert_void_element("br", &[])?;
                self.frameset_ok = false;
            }

            _ => self.any_other_end_tag(name),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// Generate implied end tags (optionally except `except`), report a
    /// mismatch, and pop until an HTML element named `name` is gone.
    fn close_element_with_implied_end_tags(&mut self, name: &str, except: Option<&str>) {
        self.generate_implied_end_tags(except);
        if !self.current_node_is(name) {
            self.parse_error_for("end-tag-with-unclosed-elements", name);
        }
        self.pop_until_named(name);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag"
    pub(in crate::parser) fn any_other_end_tag(&mut self, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];

            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //          as the token, then: Generate implied end tags, except for
            //          HTML elements with the same tag name as the token. If node
            //          is not the current node, then this is a parse error. Pop
            //          all the nodes from the current node up to node, including
            //          node, then stop these steps."
            if self.tree.is_html_element(node, name) {
                self.generate_implied_end_tags(Some(name));
                if self.current_node() != Some(node) {
                    self.parse_error_for("end-tag-with-unclosed-elements", name);
                }
                self.pop_until_node(node);
                return;
            }

            // STEP 3: "Otherwise, if node is in the special category, then this
            //          is a parse error; ignore the token, and return."
            if self.is_special_element(node) {
                self.parse_error_for("unexpected-end-tag", name);
                return;
            }
            // STEP 4: "Set node to the previous entry in the stack of open
            //          elements. Return to the step labeled loop."
        }
    }
}
