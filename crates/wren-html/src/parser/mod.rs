//! HTML tree construction.
//!
//! Implements [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//! of the WHATWG HTML Living Standard.

/// Parser state, the tree construction dispatcher and the driver loop.
mod core;
/// SVG and MathML handling.
pub mod foreign_content;
/// The list of active formatting elements and the adoption agency algorithm.
mod formatting;
/// Creating and inserting nodes.
mod insertion;
mod modes;
/// DOCTYPE-based document mode selection.
pub mod quirks;
/// The stack of open elements and its scope checks.
mod stack;

pub use self::core::{ActiveFormattingElement, HTMLParser, InsertionMode, TokenOutcome};
pub use quirks::DocumentMode;
