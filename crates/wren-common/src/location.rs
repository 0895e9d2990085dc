//! Source positions.

use std::fmt;

/// A position in the (newline-normalized) input text.
///
/// Both fields are 1-based. Columns count characters, not bytes, so a
/// multi-byte character advances the column by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

impl LineCol {
    /// The position of the first character of any input.
    pub const START: Self = Self { line: 1, column: 1 };

    /// Create a position from explicit line and column numbers.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The position immediately after `c`.
    ///
    /// A line feed moves to column 1 of the next line; every other
    /// character advances the column.
    #[must_use]
    pub const fn advance(self, c: char) -> Self {
        if c == '\n' {
            Self {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Default for LineCol {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
