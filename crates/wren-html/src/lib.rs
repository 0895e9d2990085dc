//! WHATWG HTML tokenizer and tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - All tokenizer states, script data escapes and CDATA sections included
//!   - Named and numeric character references
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All 23 insertion modes
//!   - Foster parenting, the adoption agency algorithm and Noah's Ark
//!   - SVG and MathML foreign content
//!   - DOCTYPE-based quirks mode selection
//!
//! - **Fragment parsing** ([WHATWG § 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!
//! Every input produces a tree. Malformed markup is recovered from the way
//! browsers recover from it and reported through [`Document::issues`].
//!
//! ```
//! let document = wren_html::parse("<p>Hello").unwrap();
//! let tree = document.tree();
//! let body = tree.body().unwrap();
//! assert_eq!(tree.text_content(body), "Hello");
//! assert!(document.metadata().manufactured_html);
//! ```

/// Parsed documents and fragments.
pub mod document;
/// Fatal errors and recoverable parse issues.
pub mod error;
/// Fragment parsing context.
pub mod fragment;
/// Per-parse configuration.
pub mod options;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use document::{BaseUrl, Document, DocumentMetadata};
pub use error::{HtmlError, ParseIssue};
pub use fragment::FragmentContext;
pub use options::ParseOptions;
pub use parser::{DocumentMode, HTMLParser, InsertionMode};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

/// UTF-8 byte order mark.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a complete document with default options.
///
/// # Errors
///
/// Fails only if the node arena cannot grow.
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    parse_with_options(html, ParseOptions::default())
}

/// Parse a complete document.
///
/// # Errors
///
/// Fails if the node arena cannot grow, including when
/// [`ParseOptions::node_limit`] is reached.
pub fn parse_with_options(html: &str, options: ParseOptions) -> Result<Document, HtmlError> {
    let mut parser = HTMLParser::new(HTMLTokenizer::new(html), options);
    parser.set_source_length(html.len());
    Ok(parser.run()?)
}

/// Decode `bytes` as UTF-8, dropping a leading byte order mark, and parse
/// the result as a document.
///
/// # Errors
///
/// Returns [`HtmlError::UndecodableInput`] for invalid UTF-8, otherwise
/// fails like [`parse_with_options`].
pub fn parse_bytes(bytes: &[u8], options: ParseOptions) -> Result<Document, HtmlError> {
    let body = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let html = std::str::from_utf8(body)?;
    let mut parser = HTMLParser::new(HTMLTokenizer::new(html), options);
    parser.set_source_length(bytes.len());
    Ok(parser.run()?)
}

/// Parse `html` as the contents of `context` with default options.
///
/// The parsed nodes are available from [`Document::fragment_nodes`].
///
/// # Errors
///
/// Returns [`HtmlError::InvalidFragmentContext`] if the context's tag name
/// is not a valid element name, or an arena error.
pub fn parse_fragment(html: &str, context: &FragmentContext) -> Result<Document, HtmlError> {
    parse_fragment_with_options(html, ParseOptions::default(), context)
}

/// Parse `html` as the contents of `context`.
///
/// # Errors
///
/// See [`parse_fragment`].
pub fn parse_fragment_with_options(
    html: &str,
    options: ParseOptions,
    context: &FragmentContext,
) -> Result<Document, HtmlError> {
    context.validate()?;
    let mut parser = HTMLParser::for_fragment(HTMLTokenizer::new(html), options, context)?;
    parser.set_source_length(html.len());
    Ok(parser.run()?)
}
