//! Integration tests for the HTML tokenizer.

use wren_common::LineCol;
use wren_html::tokenizer::TokenizerState;
use wren_html::{HTMLTokenizer, Token};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    HTMLTokenizer::new(input).into_tokens()
}

/// Tokenize `input` as the content of a raw text element named `tag`,
/// the way the tree builder sets the tokenizer up after its start tag.
fn tokenize_text_element(state: TokenizerState, tag: &str, input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input);
    tokenizer.set_state(state);
    tokenizer.set_last_start_tag(tag);
    tokenizer.into_tokens()
}

/// Concatenate the character tokens.
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| {
            if let Token::Character { data } = t {
                Some(*data)
            } else {
                None
            }
        })
        .collect()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens.len(), 6); // 5 chars + EOF
    assert!(matches!(tokens[0], Token::Character { data: 'H' }));
    assert!(matches!(tokens[4], Token::Character { data: 'o' }));
    assert!(matches!(tokens[5], Token::EndOfFile));
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2); // DOCTYPE + EOF
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(*public_identifier, None);
            assert_eq!(*system_identifier, None);
            assert!(!force_quirks);
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_with_public_and_system_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    match &tokens[0] {
        Token::Doctype {
            public_identifier,
            system_identifier,
            ..
        } => {
            assert_eq!(public_identifier.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE>");
    assert!(matches!(
        &tokens[0],
        Token::Doctype {
            name: None,
            force_quirks: true,
            ..
        }
    ));
}

#[test]
fn test_start_tag() {
    let tokens = tokenize("<div>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name,
            self_closing,
            attributes,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            assert!(attributes.is_empty());
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_tag_names_are_lowercased() {
    let tokens = tokenize("<DiV ClAsS=x></DIV>");
    assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "div"));
    assert_eq!(tokens[0].attribute("class"), Some("x"));
    assert!(matches!(&tokens[1], Token::EndTag { name, .. } if name == "div"));
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::EndTag { name, .. } => {
            assert_eq!(name, "div");
        }
        _ => panic!("Expected EndTag token"),
    }
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        _ => panic!("Expected self-closing StartTag token"),
    }
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Comment { data } => {
            assert_eq!(data, " hello ");
        }
        _ => panic!("Expected Comment token"),
    }
}

#[test]
fn test_bogus_comment_from_processing_instruction() {
    let tokens = tokenize("<?xml version=\"1.0\"?>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == "?xml version=\"1.0\"?"));
}

#[test]
fn test_cdata_is_a_bogus_comment_outside_foreign_content() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert!(matches!(&tokens[0], Token::Comment { data } if data == "[CDATA[x]]"));
}

#[test]
fn test_cdata_section_in_foreign_content() {
    let mut tokenizer = HTMLTokenizer::new("<![CDATA[a<b]]>");
    tokenizer.set_allow_cdata(true);
    assert_eq!(text_of(&tokenizer.into_tokens()), "a<b");
}

#[test]
fn test_attribute_double_quoted() {
    let tokens = tokenize(r#"<div class="foo">"#);
    match &tokens[0] {
        Token::StartTag {
            name, attributes, ..
        } => {
            assert_eq!(name, "div");
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].name, "class");
            assert_eq!(attributes[0].value, "foo");
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_attribute_single_quoted() {
    let tokens = tokenize("<div class='bar'>");
    assert_eq!(tokens[0].attribute("class"), Some("bar"));
}

#[test]
fn test_attribute_unquoted() {
    let tokens = tokenize("<div class=baz>");
    assert_eq!(tokens[0].attribute("class"), Some("baz"));
}

#[test]
fn test_boolean_attribute() {
    let tokens = tokenize("<input disabled>");
    match &tokens[0] {
        Token::StartTag {
            name, attributes, ..
        } => {
            assert_eq!(name, "input");
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].name, "disabled");
            assert_eq!(attributes[0].value, "");
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_multiple_attributes() {
    let tokens = tokenize(r#"<input type="text" id="name" disabled>"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            let pairs: Vec<(&str, &str)> = attributes
                .iter()
                .map(|a| (a.name.as_str(), a.value.as_str()))
                .collect();
            assert_eq!(
                pairs,
                vec![("type", "text"), ("id", "name"), ("disabled", "")]
            );
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let mut tokenizer = HTMLTokenizer::new("<p id=a id=b>");
    let tokens = tokenizer.run();
    assert_eq!(tokens[0].token.attribute("id"), Some("a"));
    let errors = tokenizer.take_errors();
    assert!(errors.iter().any(|e| e.code == "duplicate-attribute"));
}

#[test]
fn test_eof_inside_tag_drops_the_tag() {
    for input in ["<div class=\"x", "<div", "<div class", "</p"] {
        let mut tokenizer = HTMLTokenizer::new(input);
        let tokens = tokenizer.run();
        assert_eq!(tokens.len(), 1, "{input}");
        assert!(tokens[0].token.is_eof(), "{input}");
        let errors = tokenizer.take_errors();
        assert!(errors.iter().any(|e| e.code == "eof-in-tag"), "{input}");
    }
}

#[test]
fn test_tag_with_text_content() {
    let tokens = tokenize("<p>Hi</p>");
    assert_eq!(tokens.len(), 5); // <p>, H, i, </p>, EOF
    assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "p"));
    assert!(matches!(tokens[1], Token::Character { data: 'H' }));
    assert!(matches!(tokens[2], Token::Character { data: 'i' }));
    assert!(matches!(&tokens[3], Token::EndTag { name, .. } if name == "p"));
    assert!(matches!(tokens[4], Token::EndOfFile));
}

#[test]
fn test_simple_html_document() {
    let html = r"<!DOCTYPE html>
<html>
<head><div>Test</div></head>
<body>Hello</body>
</html>";
    let tokens = tokenize(html);

    assert!(matches!(&tokens[0], Token::Doctype { name: Some(n), .. } if n == "html"));
    assert!(matches!(tokens.last(), Some(Token::EndOfFile)));

    let start_tags = tokens
        .iter()
        .filter(|t| matches!(t, Token::StartTag { .. }))
        .count();
    let end_tags = tokens
        .iter()
        .filter(|t| matches!(t, Token::EndTag { .. }))
        .count();

    assert_eq!(start_tags, 4); // html, head, div, body
    assert_eq!(end_tags, 4); // /div, /head, /body, /html
}

#[test]
fn test_crlf_is_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(text_of(&tokens), "a\nb\nc");
}

#[test]
fn test_token_locations() {
    let positioned = HTMLTokenizer::new("<p>\n  <b>x").run();
    assert_eq!(positioned[0].location, LineCol::new(1, 1));
    // '\n' then two spaces, then <b> at line 2 column 3
    assert_eq!(positioned[1].location, LineCol::new(1, 4));
    assert!(matches!(&positioned[4].token, Token::StartTag { name, .. } if name == "b"));
    assert_eq!(positioned[4].location, LineCol::new(2, 3));
    assert_eq!(positioned[5].location, LineCol::new(2, 6));
}

#[test]
fn test_eof_repeats() {
    let mut tokenizer = HTMLTokenizer::new("");
    assert!(tokenizer.next_token().token.is_eof());
    assert!(tokenizer.next_token().token.is_eof());
}

// ========== Raw text element (RCDATA/RAWTEXT) tests ==========

#[test]
fn test_style_element_rawtext() {
    let tokens =
        tokenize_text_element(TokenizerState::RAWTEXT, "style", "body { color: red; }</style>");
    assert_eq!(text_of(&tokens), "body { color: red; }");
    assert!(matches!(&tokens[tokens.len() - 2], Token::EndTag { name, .. } if name == "style"));
    assert!(matches!(tokens.last(), Some(Token::EndOfFile)));
}

#[test]
fn test_title_element_rcdata() {
    let tokens = tokenize_text_element(TokenizerState::RCDATA, "title", "My &amp; Page</title>");
    // RCDATA decodes character references
    assert_eq!(text_of(&tokens), "My & Page");
    assert!(matches!(&tokens[tokens.len() - 2], Token::EndTag { name, .. } if name == "title"));
}

#[test]
fn test_rawtext_does_not_decode_references() {
    let tokens = tokenize_text_element(TokenizerState::RAWTEXT, "style", "a &amp; b</style>");
    assert_eq!(text_of(&tokens), "a &amp; b");
}

#[test]
fn test_style_with_fake_tags() {
    let tokens =
        tokenize_text_element(TokenizerState::RAWTEXT, "style", "<div>not a tag</div></style>");
    assert_eq!(text_of(&tokens), "<div>not a tag</div>");
    assert!(matches!(&tokens[tokens.len() - 2], Token::EndTag { name, .. } if name == "style"));
}

#[test]
fn test_title_with_less_than() {
    let tokens = tokenize_text_element(TokenizerState::RCDATA, "title", "a < b</title>");
    assert_eq!(text_of(&tokens), "a < b");
}

#[test]
fn test_style_with_wrong_end_tag() {
    // </notastyle> inside style should NOT close the style element
    let tokens =
        tokenize_text_element(TokenizerState::RAWTEXT, "style", "a</notastyle>b</style>");
    assert_eq!(text_of(&tokens), "a</notastyle>b");
}

#[test]
fn test_script_data_escapes() {
    let tokens = tokenize_text_element(
        TokenizerState::ScriptData,
        "script",
        "<!--<script>x</script>-->y</script>",
    );
    // The inner </script> is inside a double-escaped block.
    assert_eq!(text_of(&tokens), "<!--<script>x</script>-->y");
    let end_tags = tokens
        .iter()
        .filter(|t| matches!(t, Token::EndTag { .. }))
        .count();
    assert_eq!(end_tags, 1);
}

#[test]
fn test_plaintext_never_ends() {
    let tokens = tokenize_text_element(TokenizerState::PLAINTEXT, "plaintext", "</plaintext><b>");
    assert_eq!(text_of(&tokens), "</plaintext><b>");
}

// ========== Character references ==========

#[test]
fn test_character_reference_bare_ampersand() {
    // [§ 13.2.5.72 Character reference state]
    // Bare ampersand followed by non-alphanumeric should flush as literal '&'
    let tokens = tokenize("a & b");
    assert_eq!(tokens.len(), 6);
    assert!(matches!(tokens[2], Token::Character { data: '&' }));
    assert_eq!(text_of(&tokens), "a & b");
}

#[test]
fn test_named_character_reference_amp() {
    let tokens = tokenize("a &amp; b");
    assert_eq!(text_of(&tokens), "a & b");
}

#[test]
fn test_named_character_reference_lt_gt() {
    let tokens = tokenize("&lt;div&gt;");
    assert_eq!(text_of(&tokens), "<div>");
}

#[test]
fn test_named_character_reference_without_semicolon() {
    // Legacy entities without semicolon still match in text
    let tokens = tokenize("&amp is ok");
    assert_eq!(text_of(&tokens), "& is ok");
}

#[test]
fn test_legacy_prefix_matches_longest_entity() {
    // "not" is a legacy name; "notin;" is longer and wins.
    assert_eq!(text_of(&tokenize("&notin;")), "\u{2209}");
    assert_eq!(text_of(&tokenize("&notit;")), "\u{00AC}it;");
}

#[test]
fn test_named_character_reference_unknown() {
    let tokens = tokenize("&zzzz;");
    assert_eq!(text_of(&tokens), "&zzzz;");
}

#[test]
fn test_named_character_reference_in_attribute() {
    let tokens = tokenize(r#"<a href="?a=1&amp;b=2">"#);
    assert_eq!(tokens[0].attribute("href"), Some("?a=1&b=2"));
}

#[test]
fn test_legacy_reference_in_attribute_followed_by_equals() {
    // For historical reasons "&amp=" in an attribute stays as written.
    let tokens = tokenize(r#"<a href="?x&amp=1">"#);
    assert_eq!(tokens[0].attribute("href"), Some("?x&amp=1"));
}

#[test]
fn test_numeric_character_references() {
    assert_eq!(text_of(&tokenize("&#65;&#x42;&#X43;")), "ABC");
}

#[test]
fn test_numeric_character_reference_replacements() {
    // C1 controls map through the Windows-1252 table; zero and surrogates
    // become U+FFFD.
    assert_eq!(text_of(&tokenize("&#x80;")), "\u{20AC}");
    assert_eq!(text_of(&tokenize("&#0;")), "\u{FFFD}");
    assert_eq!(text_of(&tokenize("&#xD800;")), "\u{FFFD}");
    assert_eq!(text_of(&tokenize("&#x110000;")), "\u{FFFD}");
}
