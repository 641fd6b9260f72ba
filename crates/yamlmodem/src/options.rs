use core::fmt;

/// Character encoding of a YAML stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum Encoding {
    /// Let the parser detect the encoding, or the emitter pick UTF-8.
    #[default]
    Any = 0,
    /// UTF-8.
    Utf8 = 1,
    /// UTF-16, little endian, with a byte order mark.
    Utf16Le = 2,
    /// UTF-16, big endian, with a byte order mark.
    Utf16Be = 3,
}

/// Line break style used by the emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LineBreak {
    /// Let the emitter choose; it uses [`LineBreak::Ln`].
    #[default]
    Any = 0,
    /// `\r`, classic Mac style.
    Cr = 1,
    /// `\n`, Unix style.
    Ln = 2,
    /// `\r\n`, DOS style.
    CrLn = 3,
}

/// Which step function a parser answers to.
///
/// A parser hands out either raw tokens or events over its whole lifetime,
/// never both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParsingMode {
    /// Not decided yet. The first call to `next_token` or `parse` fixes the mode.
    #[default]
    Any,
    /// Raw token mode (`Parser::next_token`).
    Scan,
    /// Event mode (`Parser::parse`).
    Parse,
}

impl ParsingMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ParsingMode::Any => "any",
            ParsingMode::Scan => "token",
            ParsingMode::Parse => "event",
        }
    }
}

impl fmt::Display for ParsingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration options for [`Parser`](crate::Parser).
///
/// # Default
///
/// Detect the encoding and lock the mode on first use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// Input encoding.
    ///
    /// With [`Encoding::Any`] the parser looks at the first bytes of the
    /// stream: a UTF-16 byte order mark selects UTF-16, anything else selects
    /// UTF-8. A UTF-8 byte order mark is skipped. A forced encoding skips the
    /// detection.
    ///
    /// # Default
    ///
    /// [`Encoding::Any`]
    pub encoding: Encoding,

    /// Fix the parsing mode up front instead of on the first call.
    ///
    /// # Default
    ///
    /// [`ParsingMode::Any`]
    pub mode: ParsingMode,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on stream errors instead of returning them.
    ///
    /// Enabled only in test builds to produce backtraces on parse failures.
    pub panic_on_error: bool,
}

/// Configuration options for [`Emitter`](crate::Emitter).
///
/// # Default
///
/// UTF-8, block layout with two-space indentation, 80 columns, ASCII-only
/// output, `\n` line breaks.
#[derive(Debug, Clone, Copy)]
pub struct EmitterOptions {
    /// Output encoding.
    ///
    /// [`Encoding::Any`] takes the encoding of the `STREAM-START` event, and
    /// falls back to UTF-8. UTF-16 output starts with a byte order mark.
    ///
    /// # Default
    ///
    /// [`Encoding::Any`]
    pub encoding: Encoding,

    /// Write the canonical form: explicit document markers, flow
    /// collections, explicit tags and double-quoted scalars.
    ///
    /// # Default
    ///
    /// `false`
    pub canonical: bool,

    /// Indentation step. Values outside `2..=9` fall back to 2.
    ///
    /// # Default
    ///
    /// `2`
    pub indent: i32,

    /// Preferred line width. Values not larger than twice the indentation
    /// fall back to 80; a negative value means unlimited.
    ///
    /// # Default
    ///
    /// `80`
    pub width: i32,

    /// Write printable non-ASCII characters as they are instead of escaping
    /// them in double-quoted scalars.
    ///
    /// # Default
    ///
    /// `false`
    pub unicode: bool,

    /// Line break style.
    ///
    /// # Default
    ///
    /// [`LineBreak::Any`], which writes `\n`.
    pub line_break: LineBreak,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Any,
            canonical: false,
            indent: 2,
            width: 80,
            unicode: false,
            line_break: LineBreak::Any,
        }
    }
}
