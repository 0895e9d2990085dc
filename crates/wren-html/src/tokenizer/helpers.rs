//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Token emission ("Emit the current token")
//! - Current-token mutation
//! - Parse error recording

use super::core::{HTMLTokenizer, TokenizerState};
use super::token::{PositionedToken, Token};
use crate::error::ParseIssue;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Switch to the X state"
    ///
    /// The next character will be consumed on the next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Consume the next input character"
    ///
    /// Advances the cursor and the line/column position. Returns `None` at
    /// the end of input, without moving.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = *self.input.get(self.current_pos)?;
        self.current_pos += 1;
        self.current_char_location = self.position;
        self.position = self.position.advance(c);
        Some(c)
    }

    /// Peek at a codepoint at the given offset after the current input
    /// character without consuming it.
    #[must_use]
    pub(super) fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input.get(self.current_pos + offset).copied()
    }

    /// "If the next few characters are..."
    ///
    /// Compares `target` against the current input character followed by
    /// the unconsumed input.
    #[must_use]
    pub(super) fn next_few_characters_are(&self, target: &str) -> bool {
        self.lookahead_matches(target, |a, b| a == b)
    }

    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    #[must_use]
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.lookahead_matches(target, |a, b| a.eq_ignore_ascii_case(&b))
    }

    fn lookahead_matches(&self, target: &str, eq: impl Fn(char, char) -> bool) -> bool {
        let mut chars = target.chars();
        let (Some(first), Some(current)) = (chars.next(), self.current_input_character) else {
            return false;
        };
        if !eq(current, first) {
            return false;
        }
        chars
            .enumerate()
            .all(|(i, t)| self.peek_codepoint(i).is_some_and(|c| eq(c, t)))
    }

    /// Consume the remainder of a lookahead match whose first character is
    /// the current input character.
    pub(super) fn consume_rest_of(&mut self, target: &str) {
        for _ in target.chars().skip(1) {
            let _ = self.consume();
        }
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "U+0009 CHARACTER TABULATION (tab), U+000A LINE FEED (LF),
    /// U+000C FORM FEED (FF), U+0020 SPACE"
    ///
    /// CR never reaches the tokenizer; it is normalized away on input.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl HTMLTokenizer {
    /// "Emit the current token"
    pub(super) fn emit_token(&mut self) {
        let Some(token) = self.current_token.take() else {
            return;
        };
        match &token {
            // Tracked for "appropriate end tag token" checks.
            Token::StartTag { name, .. } => {
                self.last_start_tag_name = Some(name.clone());
            }
            // [§ 13.2.5.8](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
            // "When an end tag token is emitted with attributes, that is an
            // end-tag-with-attributes parse error. When an end tag token is emitted
            // with its self-closing flag set, that is an end-tag-with-trailing-solidus
            // parse error."
            Token::EndTag {
                self_closing,
                attributes,
                ..
            } => {
                if !attributes.is_empty() {
                    self.log_parse_error("end-tag-with-attributes");
                }
                if *self_closing {
                    self.log_parse_error("end-tag-with-trailing-solidus");
                }
            }
            _ => {}
        }
        self.pending.push_back(PositionedToken {
            token,
            location: self.token_start,
        });
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character_token(&mut self, c: char) {
        self.pending.push_back(PositionedToken {
            token: Token::new_character(c),
            location: self.token_start,
        });
    }

    /// "Emit an end-of-file token."
    ///
    /// Its location is the position just past the last input character.
    pub(super) fn emit_eof_token(&mut self) {
        self.pending.push_back(PositionedToken {
            token: Token::EndOfFile,
            location: self.position,
        });
        self.at_eof = true;
    }

    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        matches!(
            (&self.last_start_tag_name, &self.current_token),
            (Some(last), Some(Token::EndTag { name, .. })) if name == last
        )
    }

    /// The "anything else" branch of every raw text end tag name state:
    ///
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer (in the order they were added to the buffer). Reconsume in the ...
    /// state."
    pub(super) fn emit_end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        self.emit_character_token('<');
        self.emit_character_token('/');
        let buffer = std::mem::take(&mut self.temporary_buffer);
        for c in buffer.chars() {
            self.emit_character_token(c);
        }
        self.current_token = None;
        self.reconsume_in(text_state);
    }
}

// =============================================================================
// Current Token Helpers
// =============================================================================

impl HTMLTokenizer {
    pub(super) fn with_current_token(&mut self, f: impl FnOnce(&mut Token)) {
        if let Some(token) = self.current_token.as_mut() {
            f(token);
        }
    }

    pub(super) fn append_to_tag_name(&mut self, c: char) {
        self.with_current_token(|t| t.append_to_tag_name(c));
    }

    pub(super) fn start_new_attribute(&mut self) {
        self.with_current_token(Token::start_new_attribute);
    }

    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        self.with_current_token(|t| t.append_to_current_attribute_name(c));
    }

    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        self.with_current_token(|t| t.append_to_current_attribute_value(c));
    }

    pub(super) fn append_to_comment(&mut self, c: char) {
        self.with_current_token(|t| t.append_to_comment(c));
    }

    pub(super) fn append_str_to_comment(&mut self, s: &str) {
        self.with_current_token(|t| t.append_str_to_comment(s));
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "...if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    pub(super) fn check_duplicate_attribute(&mut self) {
        let is_duplicate = self
            .current_token
            .as_ref()
            .is_some_and(Token::current_attribute_name_is_duplicate);

        if is_duplicate {
            self.log_parse_error("duplicate-attribute");
            self.with_current_token(Token::remove_current_attribute);
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a parse error at the current input character. Parse errors
    /// are never fatal; the tokenizer recovers and continues.
    pub(super) fn log_parse_error(&mut self, code: &'static str) {
        self.errors
            .push(ParseIssue::new(code, self.current_char_location));
    }
}
