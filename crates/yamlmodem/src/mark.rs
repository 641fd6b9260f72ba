use core::fmt;

/// A position in the input stream.
///
/// `index` is a byte offset into the raw input, so a UTF-8 byte order mark
/// counts three bytes and every UTF-16 code unit counts two. `line` and
/// `column` are zero-based; `column` counts characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Mark {
    /// Byte offset from the start of the stream.
    pub index: u64,
    /// Zero-based line number.
    pub line: u64,
    /// Zero-based column, in characters.
    pub column: u64,
}

impl Mark {
    /// Creates a mark from its three coordinates.
    #[must_use]
    pub const fn new(index: u64, line: u64, column: u64) -> Self {
        Self {
            index,
            line,
            column,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}
