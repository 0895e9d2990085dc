//! Common utilities for the Wren HTML parser.
//!
//! This crate provides shared infrastructure used by all parser components:
//! - **Source locations** - 1-based line/column positions carried by tokens and nodes
//! - **Warning System** - colored terminal output for tooling built on the parser

pub mod location;
pub mod warning;

pub use location::LineCol;
