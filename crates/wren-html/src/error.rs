//! Parse failures and recoverable parse issues.

use std::fmt;
use std::str::Utf8Error;

use thiserror::Error;
use wren_common::LineCol;
use wren_dom::ArenaError;

/// A fatal parse failure. No partial document is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtmlError {
    /// The fragment context element is empty, malformed, or not an element.
    #[error("invalid fragment context: {0}")]
    InvalidFragmentContext(String),

    /// The node arena could not grow.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// The input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    UndecodableInput(#[from] Utf8Error),
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A recoverable anomaly. The parser has already applied the standard
/// recovery for it; the record only reports that it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Error code, e.g. `eof-in-tag` or `unexpected-start-tag`.
    pub code: &'static str,
    /// Extra context such as the offending tag name.
    pub detail: Option<String>,
    /// Where the anomaly was detected.
    pub location: LineCol,
}

impl ParseIssue {
    /// An issue with no extra detail.
    #[must_use]
    pub const fn new(code: &'static str, location: LineCol) -> Self {
        Self {
            code,
            detail: None,
            location,
        }
    }

    /// An issue naming the token or element involved.
    #[must_use]
    pub fn with_detail(code: &'static str, detail: impl Into<String>, location: LineCol) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
            location,
        }
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.code)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}
