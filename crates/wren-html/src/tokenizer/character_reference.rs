//! Character reference states for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//! through [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)

use super::core::{HTMLTokenizer, TokenizerState};
use super::named_character_references::{LONGEST_ENTITY_NAME, any_entity_has_prefix, lookup_entity};

/// [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column."
const C1_REPLACEMENTS: [(u32, u32); 27] = [
    (0x80, 0x20AC),
    (0x82, 0x201A),
    (0x83, 0x0192),
    (0x84, 0x201E),
    (0x85, 0x2026),
    (0x86, 0x2020),
    (0x87, 0x2021),
    (0x88, 0x02C6),
    (0x89, 0x2030),
    (0x8A, 0x0160),
    (0x8B, 0x2039),
    (0x8C, 0x0152),
    (0x8E, 0x017D),
    (0x91, 0x2018),
    (0x92, 0x2019),
    (0x93, 0x201C),
    (0x94, 0x201D),
    (0x95, 0x2022),
    (0x96, 0x2013),
    (0x97, 0x2014),
    (0x98, 0x02DC),
    (0x99, 0x2122),
    (0x9A, 0x0161),
    (0x9B, 0x203A),
    (0x9C, 0x0153),
    (0x9E, 0x017E),
    (0x9F, 0x0178),
];

impl HTMLTokenizer {
    /// Returns true if the return state is an attribute value state.
    /// "consumed as part of an attribute"
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute, then
    /// append each character to the current attribute's value. Otherwise, emit
    /// each character as a character token."
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        if self.is_consumed_as_part_of_attribute() {
            for c in buffer.chars() {
                self.append_to_attribute_value(c);
            }
        } else {
            for c in buffer.chars() {
                self.emit_character_token(c);
            }
        }
    }

    /// Append or emit a single character the way the reference's return
    /// state would.
    fn emit_or_append(&mut self, c: char) {
        if self.is_consumed_as_part_of_attribute() {
            self.append_to_attribute_value(c);
        } else {
            self.emit_character_token(c);
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026
        // AMPERSAND (&) character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');

        match self.current_input_character {
            // "ASCII alphanumeric - Reconsume in the named character reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            // "U+0023 NUMBER SIGN (#) - Append the current input character to the
            // temporary buffer. Switch to the numeric character reference state."
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Anything else - Flush code points consumed as a character reference.
            // Reconsume in the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the first column of the named
    /// character references table."
    ///
    /// Entered by reconsuming, so the current input character is the first
    /// character of the candidate name. The longest match is found by
    /// lookahead and only the matched characters are consumed.
    pub(super) fn handle_named_character_reference_state(&mut self) {
        let Some(first) = self.current_input_character else {
            self.flush_code_points_consumed_as_character_reference();
            self.reconsume_in(self.return_state);
            return;
        };

        let mut candidate = String::from(first);
        let mut longest_match: Option<(usize, &'static str)> =
            lookup_entity(&candidate).map(|r| (1, r));
        let mut offset = 0;
        while candidate.len() < LONGEST_ENTITY_NAME
            && !candidate.ends_with(';')
            && any_entity_has_prefix(&candidate)
        {
            match self.peek_codepoint(offset) {
                Some(c) if c.is_ascii_alphanumeric() || c == ';' => {
                    candidate.push(c);
                    offset += 1;
                    if let Some(replacement) = lookup_entity(&candidate) {
                        longest_match = Some((candidate.len(), replacement));
                    }
                }
                _ => break,
            }
        }

        // "Otherwise: Flush code points consumed as a character reference.
        // Switch to the ambiguous ampersand state."
        let Some((match_len, replacement)) = longest_match else {
            self.flush_code_points_consumed_as_character_reference();
            self.reconsume_in(TokenizerState::AmbiguousAmpersand);
            return;
        };

        // Consume the matched name; the first character is already consumed.
        for _ in 1..match_len {
            let _ = self.consume();
        }
        let matched = &candidate[..match_len];
        self.temporary_buffer.push_str(matched);
        let ends_with_semicolon = matched.ends_with(';');

        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;), and
        // the next input character is either a U+003D EQUALS SIGN character (=) or
        // an ASCII alphanumeric, then, for historical reasons, flush code points
        // consumed as a character reference and switch to the return state."
        if self.is_consumed_as_part_of_attribute()
            && !ends_with_semicolon
            && self
                .peek_codepoint(0)
                .is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
        {
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(self.return_state);
            return;
        }

        // "If the last character matched is not a U+003B SEMICOLON character (;),
        // then this is a missing-semicolon-after-character-reference parse error."
        if !ends_with_semicolon {
            self.log_parse_error("missing-semicolon-after-character-reference");
        }

        // "Set the temporary buffer to the empty string. Append one or two characters
        // corresponding to the character reference name to the temporary buffer.
        // Flush code points consumed as a character reference. Switch to the return state."
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(replacement);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "If the character reference was consumed as part of an attribute, then
            // append the current input character to the current attribute's value.
            // Otherwise, emit the current input character as a character token."
            Some(c) if c.is_ascii_alphanumeric() => self.emit_or_append(c),
            // "This is an unknown-named-character-reference parse error.
            // Reconsume in the return state."
            Some(';') => {
                self.log_parse_error("unknown-named-character-reference");
                self.reconsume_in(self.return_state);
            }
            _ => self.reconsume_in(self.return_state),
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;
        match self.current_input_character {
            // "Append the current input character to the temporary buffer. Switch to
            // the hexadecimal character reference start state."
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76 Hexadecimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    pub(super) fn handle_hexadecimal_character_reference_start_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_hexdigit() => {
                self.reconsume_in(TokenizerState::HexadecimalCharacterReference);
            }
            _ => self.absence_of_digits(),
        }
    }

    /// [§ 13.2.5.77 Decimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    pub(super) fn handle_decimal_character_reference_start_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_digit() => {
                self.reconsume_in(TokenizerState::DecimalCharacterReference);
            }
            _ => self.absence_of_digits(),
        }
    }

    /// "This is an absence-of-digits-in-numeric-character-reference parse error.
    /// Flush code points consumed as a character reference. Reconsume in the
    /// return state."
    fn absence_of_digits(&mut self) {
        self.log_parse_error("absence-of-digits-in-numeric-character-reference");
        self.flush_code_points_consumed_as_character_reference();
        self.reconsume_in(self.return_state);
    }

    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    pub(super) fn handle_hexadecimal_character_reference_state(&mut self) {
        self.handle_digits(16);
    }

    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_decimal_character_reference_state(&mut self) {
        self.handle_digits(10);
    }

    fn handle_digits(&mut self, radix: u32) {
        match self.current_input_character {
            // "Multiply the character reference code by 16 (10). Add a numeric version
            // of the current input character to the character reference code."
            //
            // Saturates just above the Unicode range; anything that large is
            // reported as out of range regardless of further digits.
            Some(c) if c.is_digit(radix) => {
                let digit = c.to_digit(radix).unwrap_or(0);
                self.character_reference_code = self
                    .character_reference_code
                    .saturating_mul(radix)
                    .saturating_add(digit)
                    .min(0x11_0000);
            }
            // "Switch to the numeric character reference end state."
            Some(';') => {
                self.numeric_character_reference_end();
                self.switch_to(self.return_state);
            }
            // "This is a missing-semicolon-after-character-reference parse error.
            // Reconsume in the numeric character reference end state."
            _ => {
                self.log_parse_error("missing-semicolon-after-character-reference");
                self.numeric_character_reference_end();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// "Check the character reference code". This state consumes nothing,
    /// so it runs inline and the caller moves on to the return state.
    pub(super) fn numeric_character_reference_end(&mut self) {
        let mut code = self.character_reference_code;

        if code == 0 {
            // "If the number is 0x00, then this is a null-character-reference parse
            // error. Set the character reference code to 0xFFFD."
            self.log_parse_error("null-character-reference");
            code = 0xFFFD;
        } else if code > 0x10_FFFF {
            self.log_parse_error("character-reference-outside-unicode-range");
            code = 0xFFFD;
        } else if (0xD800..=0xDFFF).contains(&code) {
            self.log_parse_error("surrogate-character-reference");
            code = 0xFFFD;
        } else if is_noncharacter(code) {
            // "This is a noncharacter-character-reference parse error." The code
            // point is kept.
            self.log_parse_error("noncharacter-character-reference");
        } else if code == 0x0D || (is_control(code) && !is_ascii_whitespace(code)) {
            self.log_parse_error("control-character-reference");
            if let Some(&(_, replacement)) = C1_REPLACEMENTS.iter().find(|(from, _)| *from == code)
            {
                code = replacement;
            }
        }

        // "Set the temporary buffer to the empty string. Append a code point equal
        // to the character reference code to the temporary buffer. Flush code points
        // consumed as a character reference."
        self.temporary_buffer.clear();
        self.temporary_buffer
            .push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        self.flush_code_points_consumed_as_character_reference();
    }
}

/// [Infra § 4.5](https://infra.spec.whatwg.org/#noncharacter)
/// "A noncharacter is a code point that is in the range U+FDD0 to U+FDEF,
/// inclusive, or U+FFFE, U+FFFF, U+1FFFE, U+1FFFF, ..., U+10FFFE, or U+10FFFF."
fn is_noncharacter(code: u32) -> bool {
    (0xFDD0..=0xFDEF).contains(&code) || (code & 0xFFFE) == 0xFFFE
}

/// [Infra § 4.5](https://infra.spec.whatwg.org/#control)
/// "A control is a C0 control or a code point in the range U+007F DELETE to
/// U+009F APPLICATION PROGRAM COMMAND, inclusive."
fn is_control(code: u32) -> bool {
    code <= 0x1F || (0x7F..=0x9F).contains(&code)
}

const fn is_ascii_whitespace(code: u32) -> bool {
    matches!(code, 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}
