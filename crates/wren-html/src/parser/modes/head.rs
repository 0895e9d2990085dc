//! Insertion modes from "initial" through "after head", plus "text".

use wren_dom::{ArenaError, Namespace, NodeData, NodeId};

use super::super::core::{HTMLParser, InsertionMode, ProcessResult, TokenOutcome, is_whitespace};
use super::super::quirks::{DocumentMode, document_mode_for_doctype, is_conforming_doctype};
use crate::tokenizer::{Attribute, Token, TokenizerState};

impl HTMLParser {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(in crate::parser) fn handle_initial_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => {}

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment_in_document(data)?,

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                let (name, public_id, system_id) = (
                    name.as_deref(),
                    public_identifier.as_deref(),
                    system_identifier.as_deref(),
                );
                if !is_conforming_doctype(name, public_id, system_id) {
                    self.parse_error("unexpected-doctype");
                }

                // "Append a DocumentType node to the Document node, with its
                //  name set to the name given in the DOCTYPE token, or the
                //  empty string if the name was missing; its public ID set to
                //  the public identifier given in the DOCTYPE token, or the
                //  empty string if the public identifier was missing; and its
                //  system ID set to the system identifier given in the DOCTYPE
                //  token, or the empty string if the system identifier was
                //  missing."
                let location = self.node_location();
                let doctype = self.tree.new_node(
                    NodeData::Doctype {
                        name: name.unwrap_or_default().to_string(),
                        public_id: public_id.unwrap_or_default().to_string(),
                        system_id: system_id.unwrap_or_default().to_string(),
                    },
                    location,
                )?;
                self.tree.append_child(NodeId::ROOT, doctype);

                // "Then, if the document is not an iframe srcdoc document, and
                //  the parser cannot change the mode flag is false, and the
                //  DOCTYPE token matches one of the conditions in the following
                //  list, then set the Document to quirks mode"
                let mode =
                    document_mode_for_doctype(name, public_id, system_id, *force_quirks);
                let _ = self.metadata.set_document_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this is a
            //  parse error; if the parser cannot change the mode flag is false,
            //  set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then
            //  reprocess the token."
            _ => {
                self.parse_error("missing-doctype");
                let _ = self.metadata.set_document_mode(DocumentMode::Quirks);
                return self.reprocess_in(InsertionMode::BeforeHtml);
            }
        }
        Ok(TokenOutcome::Consumed)
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(in crate::parser) fn handle_before_html_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "A comment token"
            Token::Comment { data } => self.insert_comment_in_document(data)?,

            // "A character token that is ASCII whitespace" - "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => {}

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with the
            //  Document as the intended parent. Append it to the Document
            //  object. Put this element in the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                self.insert_html_root(attributes)?;
                self.insertion_mode = InsertionMode::BeforeHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            // "Act as described in the "anything else" entry below."
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                return self.before_html_anything_else();
            }

            // "Any other end tag" - "Parse error. Ignore the token."
            Token::EndTag { name, .. } => self.parse_error_for("unexpected-end-tag", name),

            // "Anything else"
            _ => return self.before_html_anything_else(),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of open
    /// elements. Switch the insertion mode to "before head", then reprocess
    /// the token."
    fn before_html_anything_else(&mut self) -> ProcessResult {
        self.insert_html_root(&[])?;
        self.metadata.manufactured_html = true;
        self.reprocess_in(InsertionMode::BeforeHead)
    }

    fn insert_html_root(&mut self, attributes: &[Attribute]) -> Result<(), ArenaError> {
        let html = self.create_element_for_token("html", attributes, Namespace::Html)?;
        self.tree.append_child(NodeId::ROOT, html);
        self.stack_of_open_elements.push(html);
        Ok(())
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(in crate::parser) fn handle_before_head_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is ASCII whitespace" - "Ignore the token."
            Token::Character { data } if is_whitespace(*data) => {}

            // "A comment token" - "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None)?,

            // "A DOCTYPE token" - "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion mode."
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token. Set the head element
            //  pointer to the newly created head element. Switch the insertion
            //  mode to "in head"."
            Token::StartTag {
                name, attributes, ..
            } if name == "head" => {
                let head = self.insert_html_element(name, attributes)?;
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html", "br""
            Token::EndTag { name, .. }
                if matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                return self.before_head_anything_else();
            }

            // "Any other end tag" - "Parse error. Ignore the token."
            Token::EndTag { name, .. } => self.parse_error_for("unexpected-end-tag", name),

            _ => return self.before_head_anything_else(),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "Insert an HTML element for a "head" start tag token with no
    /// attributes. Set the head element pointer to the newly created head
    /// element. Switch the insertion mode to "in head". Reprocess the current
    /// token."
    fn before_head_anything_else(&mut self) -> ProcessResult {
        let head = self.insert_html_element("head", &[])?;
        self.head_element_pointer = Some(head);
        self.metadata.manufactured_head = true;
        self.reprocess_in(InsertionMode::InHead)
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(in crate::parser) fn handle_in_head_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is ASCII whitespace" - "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data)?,

            // "A comment token" - "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None)?,

            // "A DOCTYPE token" - "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "A start tag whose tag name is "html""
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link""
            // "Insert an HTML element for the token. Immediately pop the current
            //  node off the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "base" | "basefont" | "bgsound" | "link") => {
                let _ = self.insert_html_element(name, attributes)?;
                let _ = self.stack_of_open_elements.pop();
                match name.as_str() {
                    "base" => self.note_base_element(token),
                    "link" => self.note_link_element(token),
                    _ => {}
                }
            }

            // "A start tag whose tag name is "meta""
            Token::StartTag {
                name, attributes, ..
            } if name == "meta" => {
                let _ = self.insert_html_element(name, attributes)?;
                let _ = self.stack_of_open_elements.pop();
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            Token::StartTag {
                name, attributes, ..
            } if name == "title" => {
                self.parse_text_element(name, attributes, TokenizerState::RCDATA)?;
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            //  is enabled"
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            Token::StartTag {
                name, attributes, ..
            } if (name == "noscript" && self.options.scripting_enabled)
                || name == "noframes"
                || name == "style" =>
            {
                self.parse_text_element(name, attributes, TokenizerState::RAWTEXT)?;
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            //  is disabled"
            Token::StartTag {
                name, attributes, ..
            } if name == "noscript" => {
                let _ = self.insert_html_element(name, attributes)?;
                self.insertion_mode = InsertionMode::InHeadNoscript;
            }

            // "A start tag whose tag name is "script""
            // "Insert the newly created element at the adjusted insertion
            //  location. Push the element onto the stack of open elements.
            //  Switch the tokenizer to the script data state. Let the original
            //  insertion mode be the current insertion mode. Switch the
            //  insertion mode to "text"."
            Token::StartTag {
                name, attributes, ..
            } if name == "script" => {
                self.parse_text_element(name, attributes, TokenizerState::ScriptData)?;
            }

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            //  stack of open elements. Switch the insertion mode to "after head"."
            Token::EndTag { name, .. } if name == "head" => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = InsertionMode::AfterHead;
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                return self.in_head_anything_else();
            }

            // "A start tag whose tag name is "template""
            Token::StartTag {
                name, attributes, ..
            } if name == "template" => {
                // "Insert a marker at the end of the list of active formatting
                //  elements. Set the frameset-ok flag to "not ok". Switch the
                //  insertion mode to "in template". Push "in template" onto the
                //  stack of template insertion modes so that it is the new
                //  current template insertion mode."
                let _ = self.insert_html_element(name, attributes)?;
                self.push_marker();
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InTemplate;
                self.template_insertion_modes.push(InsertionMode::InTemplate);
            }

            // "An end tag whose tag name is "template""
            Token::EndTag { name, .. } if name == "template" => {
                // "If there is no template element on the stack of open
                //  elements, then this is a parse error; ignore the token."
                if !self.stack_contains("template") {
                    self.parse_error_for("unexpected-end-tag", name);
                    return Ok(TokenOutcome::Consumed);
                }
                // "Generate all implied end tags thoroughly."
                self.generate_all_implied_end_tags_thoroughly();
                // "If the current node is not a template element, then this is
                //  a parse error."
                if !self.current_node_is("template") {
                    self.parse_error("unclosed-elements-in-template");
                }
                // "Pop elements from the stack of open elements until a
                //  template element has been popped from the stack."
                self.pop_until_named("template");
                // "Clear the list of active formatting elements up to the last marker."
                self.clear_active_formatting_elements_to_last_marker();
                // "Pop the current template insertion mode off the stack of
                //  template insertion modes."
                let _ = self.template_insertion_modes.pop();
                // "Reset the insertion mode appropriately."
                self.reset_insertion_mode_appropriately();
            }

            // "A start tag whose tag name is "head"" / "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error_for("unexpected-start-tag", name);
            }
            Token::EndTag { name, .. } => self.parse_error_for("unexpected-end-tag", name),

            _ => return self.in_head_anything_else(),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements. Switch the insertion mode to "after head". Reprocess the
    /// token."
    fn in_head_anything_else(&mut self) -> ProcessResult {
        let _ = self.stack_of_open_elements.pop();
        self.reprocess_in(InsertionMode::AfterHead)
    }

    /// [§ 4.2.3 The base element](https://html.spec.whatwg.org/multipage/semantics.html#the-base-element)
    ///
    /// The document base URL comes from "the first base element that has an
    /// href attribute", the default target from the first one with a target.
    fn note_base_element(&mut self, token: &Token) {
        let base = &mut self.metadata.base_url;
        if base.url.is_empty()
            && let Some(href) = token.attribute("href")
        {
            base.url = href.to_string();
        }
        if base.target.is_empty()
            && let Some(target) = token.attribute("target")
        {
            base.target = target.to_string();
        }
    }

    /// Record `<link rel="canonical" href>`. The `rel` attribute is a set of
    /// space-separated, ASCII case-insensitive keywords. Later links replace
    /// earlier ones.
    fn note_link_element(&mut self, token: &Token) {
        let is_canonical = token.attribute("rel").is_some_and(|rel| {
            rel.split(is_whitespace)
                .any(|keyword| keyword.eq_ignore_ascii_case("canonical"))
        });
        if is_canonical && let Some(href) = token.attribute("href") {
            self.metadata.canonical_url = Some(href.to_string());
        }
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(in crate::parser) fn handle_in_head_noscript_mode(
        &mut self,
        token: &Token,
    ) -> ProcessResult {
        match token {
            // "A DOCTYPE token" - "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "A start tag whose tag name is "html""
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }

            // "An end tag whose tag name is "noscript""
            // "Pop the current node (which will be a noscript element) from the
            //  stack of open elements; the new current node will be a head
            //  element. Switch the insertion mode to "in head"."
            Token::EndTag { name, .. } if name == "noscript" => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = InsertionMode::InHead;
            }

            // "A character token that is ASCII whitespace", "A comment token",
            // "A start tag whose tag name is one of: "basefont", "bgsound",
            //  "link", "meta", "noframes", "style""
            // "Process the token using the rules for the "in head" insertion mode."
            Token::Character { data } if is_whitespace(*data) => {
                return self.handle_in_head_mode(token);
            }
            Token::Comment { .. } => return self.handle_in_head_mode(token),
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                return self.handle_in_head_mode(token);
            }

            // "An end tag whose tag name is "br"" - "Act as described in the
            //  "anything else" entry below."
            Token::EndTag { name, .. } if name == "br" => {
                return self.in_head_noscript_anything_else(token);
            }

            // "A start tag whose tag name is one of: "head", "noscript"" /
            // "Any other end tag" - "Parse error. Ignore the token."
            Token::StartTag { name, .. } if name == "head" || name == "noscript" => {
                self.parse_error_for("unexpected-start-tag", name);
            }
            Token::EndTag { name, .. } => self.parse_error_for("unexpected-end-tag", name),

            _ => return self.in_head_noscript_anything_else(token),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "Parse error. Pop the current node (which will be a noscript element)
    /// from the stack of open elements; the new current node will be a head
    /// element. Switch the insertion mode to "in head". Reprocess the token."
    fn in_head_noscript_anything_else(&mut self, token: &Token) -> ProcessResult {
        self.parse_error_for("unexpected-token-in-noscript", &token.to_string());
        let _ = self.stack_of_open_elements.pop();
        self.reprocess_in(InsertionMode::InHead)
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(in crate::parser) fn handle_after_head_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token that is ASCII whitespace" - "Insert the character."
            Token::Character { data } if is_whitespace(*data) => self.insert_character(*data)?,

            // "A comment token" - "Insert a comment."
            Token::Comment { data } => self.insert_comment(data, None)?,

            // "A DOCTYPE token" - "Parse error. Ignore the token."
            Token::Doctype { .. } => self.parse_error("unexpected-doctype"),

            // "A start tag whose tag name is "html""
            Token::StartTag { name, .. } if name == "html" => {
                return self.handle_in_body_mode(token);
            }

            // "A start tag whose tag name is "body""
            // "Insert an HTML element for the token. Set the frameset-ok flag to
            //  "not ok". Switch the insertion mode to "in body"."
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                let _ = self.insert_html_element(name, attributes)?;
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InBody;
            }

            // "A start tag whose tag name is "frameset""
            Token::StartTag {
                name, attributes, ..
            } if name == "frameset" => {
                let _ = self.insert_html_element(name, attributes)?;
                self.insertion_mode = InsertionMode::InFrameset;
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link", "meta", "noframes", "script", "style",
            //  "template", "title""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                // "Parse error. Push the node pointed to by the head element
                //  pointer onto the stack of open elements. Process the token
                //  using the rules for the "in head" insertion mode. Remove the
                //  node pointed to by the head element pointer from the stack of
                //  open elements. (It might not be the current node at this point.)"
                self.parse_error_for("unexpected-start-tag-after-head", name);
                let Some(head) = self.head_element_pointer else {
                    return self.handle_in_head_mode(token);
                };
                self.stack_of_open_elements.push(head);
                let outcome = self.handle_in_head_mode(token)?;
                self.remove_from_stack(head);
                return Ok(outcome);
            }

            // "An end tag whose tag name is "template""
            Token::EndTag { name, .. } if name == "template" => {
                return self.handle_in_head_mode(token);
            }

            // "An end tag whose tag name is one of: "body", "html", "br""
            Token::EndTag { name, .. } if matches!(name.as_str(), "body" | "html" | "br") => {
                return self.after_head_anything_else();
            }

            // "A start tag whose tag name is "head"" / "Any other end tag"
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error_for("unexpected-start-tag", name);
            }
            Token::EndTag { name, .. } => self.parse_error_for("unexpected-end-tag", name),

            _ => return self.after_head_anything_else(),
        }
        Ok(TokenOutcome::Consumed)
    }

    /// "Insert an HTML element for a "body" start tag token with no
    /// attributes. Switch the insertion mode to "in body". Reprocess the
    /// current token."
    fn after_head_anything_else(&mut self) -> ProcessResult {
        let _ = self.insert_html_element("body", &[])?;
        self.metadata.manufactured_body = true;
        self.reprocess_in(InsertionMode::InBody)
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(in crate::parser) fn handle_text_mode(&mut self, token: &Token) -> ProcessResult {
        match token {
            // "A character token" - "Insert the token's character."
            Token::Character { data } => self.insert_character(*data)?,

            // "An end-of-file token"
            // "Parse error. If the current node is a script element, then set
            //  its already started to true. Pop the current node off the stack
            //  of open elements. Switch the insertion mode to the original
            //  insertion mode and reprocess the token."
            Token::EndOfFile => {
                self.parse_error("eof-in-element-that-can-contain-only-text");
                let _ = self.stack_of_open_elements.pop();
                return self.reprocess_in(self.original_insertion_mode);
            }

            // "An end tag whose tag name is "script"" / "Any other end tag"
            // "Pop the current node off the stack of open elements. Switch the
            //  insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = self.original_insertion_mode;
            }

            // The tokenizer only produces characters and end tags in the text
            // states.
            Token::StartTag { .. } | Token::Comment { .. } | Token::Doctype { .. } => {}
        }
        Ok(TokenOutcome::Consumed)
    }
}
