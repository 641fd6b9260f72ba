use alloc::string::String;

use crate::{event::ScalarStyle, mark::Mark, options::Encoding};

/// A lexical token with its span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Kind and payload.
    pub data: TokenData,
    /// Where the token starts.
    pub start_mark: Mark,
    /// Where the token ends.
    pub end_mark: Mark,
}

/// Token kinds and their payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenData {
    /// Start of the stream, with the detected encoding.
    StreamStart {
        /// Encoding of the input.
        encoding: Encoding,
    },
    /// End of the stream.
    StreamEnd,
    /// `%YAML major.minor`
    VersionDirective {
        /// Major version.
        major: u32,
        /// Minor version.
        minor: u32,
    },
    /// `%TAG handle prefix`
    TagDirective {
        /// Tag handle, e.g. `!e!`.
        handle: String,
        /// Tag prefix, e.g. `tag:example.com,2000:`.
        prefix: String,
    },
    /// `---`
    DocumentStart,
    /// `...`
    DocumentEnd,
    /// Start of an indented sequence.
    BlockSequenceStart,
    /// Start of an indented mapping.
    BlockMappingStart,
    /// End of an indented collection.
    BlockEnd,
    /// `[`
    FlowSequenceStart,
    /// `]`
    FlowSequenceEnd,
    /// `{`
    FlowMappingStart,
    /// `}`
    FlowMappingEnd,
    /// `-`
    BlockEntry,
    /// `,`
    FlowEntry,
    /// `?`, explicit or implied by a following `:`.
    Key,
    /// `:`
    Value,
    /// `*name`
    Alias {
        /// Alias name.
        value: String,
    },
    /// `&name`
    Anchor {
        /// Anchor name.
        value: String,
    },
    /// `!handle!suffix`, `!suffix`, `!` or `!<verbatim>`
    Tag {
        /// Tag handle; empty for verbatim tags and the bare `!` tag.
        handle: String,
        /// Tag suffix.
        suffix: String,
    },
    /// A scalar in any style.
    Scalar {
        /// Scalar content, with escapes and folding applied.
        value: String,
        /// Presentation style.
        style: ScalarStyle,
    },
}

impl TokenData {
    /// Short name of the token kind, for messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TokenData::StreamStart { .. } => "STREAM-START",
            TokenData::StreamEnd => "STREAM-END",
            TokenData::VersionDirective { .. } => "VERSION-DIRECTIVE",
            TokenData::TagDirective { .. } => "TAG-DIRECTIVE",
            TokenData::DocumentStart => "DOCUMENT-START",
            TokenData::DocumentEnd => "DOCUMENT-END",
            TokenData::BlockSequenceStart => "BLOCK-SEQUENCE-START",
            TokenData::BlockMappingStart => "BLOCK-MAPPING-START",
            TokenData::BlockEnd => "BLOCK-END",
            TokenData::FlowSequenceStart => "FLOW-SEQUENCE-START",
            TokenData::FlowSequenceEnd => "FLOW-SEQUENCE-END",
            TokenData::FlowMappingStart => "FLOW-MAPPING-START",
            TokenData::FlowMappingEnd => "FLOW-MAPPING-END",
            TokenData::BlockEntry => "BLOCK-ENTRY",
            TokenData::FlowEntry => "FLOW-ENTRY",
            TokenData::Key => "KEY",
            TokenData::Value => "VALUE",
            TokenData::Alias { .. } => "ALIAS",
            TokenData::Anchor { .. } => "ANCHOR",
            TokenData::Tag { .. } => "TAG",
            TokenData::Scalar { .. } => "SCALAR",
        }
    }
}
