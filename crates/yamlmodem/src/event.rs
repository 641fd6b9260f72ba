use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::{
    error::{EventError, UsageError},
    mark::Mark,
    options::Encoding,
};

/// Presentation style of a scalar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum ScalarStyle {
    /// Let the emitter choose.
    #[default]
    Any = 0,
    /// Unquoted.
    Plain = 1,
    /// `'...'`
    SingleQuoted = 2,
    /// `"..."`
    DoubleQuoted = 3,
    /// `|`
    Literal = 4,
    /// `>`
    Folded = 5,
}

/// Presentation style of a sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum SequenceStyle {
    /// Let the emitter choose.
    #[default]
    Any = 0,
    /// Indented `- ` entries.
    Block = 1,
    /// `[a, b]`
    Flow = 2,
}

/// Presentation style of a mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum MappingStyle {
    /// Let the emitter choose.
    #[default]
    Any = 0,
    /// Indented `key: value` pairs.
    Block = 1,
    /// `{a: b}`
    Flow = 2,
}

/// The style of whichever node an event starts, see [`Event::style`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStyle {
    /// Style of a scalar event.
    Scalar(ScalarStyle),
    /// Style of a sequence start event.
    Sequence(SequenceStyle),
    /// Style of a mapping start event.
    Mapping(MappingStyle),
}

/// `%YAML major.minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct VersionDirective {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl VersionDirective {
    /// Parses `"major.minor"`, e.g. `"1.2"`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (major, minor) = text.trim().split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl fmt::Display for VersionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// `%TAG handle prefix`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TagDirective {
    /// Tag handle, e.g. `!e!`.
    pub handle: String,
    /// Tag prefix, e.g. `tag:example.com,2000:`.
    pub prefix: String,
}

impl TagDirective {
    /// Creates a tag directive.
    pub fn new(handle: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            prefix: prefix.into(),
        }
    }
}

/// Event kinds, numbered as in libyaml. [`EventType::NoEvent`] is the type
/// of an empty [`EventSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    /// No event.
    NoEvent = 0,
    /// `STREAM-START`
    StreamStart = 1,
    /// `STREAM-END`
    StreamEnd = 2,
    /// `DOCUMENT-START`
    DocumentStart = 3,
    /// `DOCUMENT-END`
    DocumentEnd = 4,
    /// `ALIAS`
    Alias = 5,
    /// `SCALAR`
    Scalar = 6,
    /// `SEQUENCE-START`
    SequenceStart = 7,
    /// `SEQUENCE-END`
    SequenceEnd = 8,
    /// `MAPPING-START`
    MappingStart = 9,
    /// `MAPPING-END`
    MappingEnd = 10,
}

impl EventType {
    /// The libyaml-style name, e.g. `MAPPING-START`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::NoEvent => "NO-EVENT",
            EventType::StreamStart => "STREAM-START",
            EventType::StreamEnd => "STREAM-END",
            EventType::DocumentStart => "DOCUMENT-START",
            EventType::DocumentEnd => "DOCUMENT-END",
            EventType::Alias => "ALIAS",
            EventType::Scalar => "SCALAR",
            EventType::SequenceStart => "SEQUENCE-START",
            EventType::SequenceEnd => "SEQUENCE-END",
            EventType::MappingStart => "MAPPING-START",
            EventType::MappingEnd => "MAPPING-END",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsing or emitting event with its span.
///
/// Events built with the constructors below carry default (zero) marks;
/// the emitter ignores marks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Event {
    /// Kind and payload.
    pub data: EventData,
    /// Where the event starts in the input.
    pub start_mark: Mark,
    /// Where the event ends in the input.
    pub end_mark: Mark,
}

/// Event kinds and their payloads.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind")
)]
pub enum EventData {
    /// Start of the stream.
    StreamStart {
        /// Stream encoding.
        encoding: Encoding,
    },
    /// End of the stream.
    StreamEnd,
    /// Start of a document.
    DocumentStart {
        /// The `%YAML` directive, if any.
        version: Option<VersionDirective>,
        /// The `%TAG` directives, in order.
        tag_directives: Vec<TagDirective>,
        /// No `---` marker.
        implicit: bool,
    },
    /// End of a document.
    DocumentEnd {
        /// No `...` marker.
        implicit: bool,
    },
    /// `*anchor`
    Alias {
        /// Name of the referenced anchor.
        anchor: String,
    },
    /// A scalar node.
    Scalar {
        /// `&anchor`, if any.
        anchor: Option<String>,
        /// Resolved tag, if any.
        tag: Option<String>,
        /// Content.
        value: BString,
        /// The tag may be omitted when written plain.
        plain_implicit: bool,
        /// The tag may be omitted when written in any other style.
        quoted_implicit: bool,
        /// Presentation style.
        style: ScalarStyle,
    },
    /// Start of a sequence node.
    SequenceStart {
        /// `&anchor`, if any.
        anchor: Option<String>,
        /// Resolved tag, if any.
        tag: Option<String>,
        /// The tag may be omitted.
        implicit: bool,
        /// Presentation style.
        style: SequenceStyle,
    },
    /// End of a sequence node.
    SequenceEnd,
    /// Start of a mapping node.
    MappingStart {
        /// `&anchor`, if any.
        anchor: Option<String>,
        /// Resolved tag, if any.
        tag: Option<String>,
        /// The tag may be omitted.
        implicit: bool,
        /// Presentation style.
        style: MappingStyle,
    },
    /// End of a mapping node.
    MappingEnd,
}

fn checked_anchor(anchor: Option<&str>) -> Result<Option<String>, EventError> {
    match anchor {
        Some("") => Err(EventError::EmptyAnchor),
        other => Ok(other.map(ToString::to_string)),
    }
}

fn checked_tag(tag: Option<&str>) -> Result<Option<String>, EventError> {
    match tag {
        Some("") => Err(EventError::EmptyTag),
        other => Ok(other.map(ToString::to_string)),
    }
}

impl Event {
    fn new(data: EventData) -> Self {
        Self {
            data,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    /// Returns the event with the given span.
    #[must_use]
    pub fn with_marks(mut self, start_mark: Mark, end_mark: Mark) -> Self {
        self.start_mark = start_mark;
        self.end_mark = end_mark;
        self
    }

    /// `STREAM-START`
    #[must_use]
    pub fn stream_start(encoding: Encoding) -> Self {
        Self::new(EventData::StreamStart { encoding })
    }

    /// `STREAM-END`
    #[must_use]
    pub fn stream_end() -> Self {
        Self::new(EventData::StreamEnd)
    }

    /// `DOCUMENT-START`
    #[must_use]
    pub fn document_start(
        version: Option<VersionDirective>,
        tag_directives: Vec<TagDirective>,
        implicit: bool,
    ) -> Self {
        Self::new(EventData::DocumentStart {
            version,
            tag_directives,
            implicit,
        })
    }

    /// `DOCUMENT-END`
    #[must_use]
    pub fn document_end(implicit: bool) -> Self {
        Self::new(EventData::DocumentEnd { implicit })
    }

    /// `ALIAS`
    ///
    /// # Errors
    ///
    /// [`EventError::EmptyAnchor`] if `anchor` is empty.
    pub fn alias(anchor: &str) -> Result<Self, EventError> {
        if anchor.is_empty() {
            return Err(EventError::EmptyAnchor);
        }
        Ok(Self::new(EventData::Alias {
            anchor: anchor.to_string(),
        }))
    }

    /// `SCALAR`
    ///
    /// # Errors
    ///
    /// [`EventError::MissingTag`] if there is no tag and neither implicit
    /// flag is set, [`EventError::InvalidUtf8`] if `value` is not UTF-8, and
    /// [`EventError::EmptyAnchor`] / [`EventError::EmptyTag`] for empty names.
    pub fn scalar(
        anchor: Option<&str>,
        tag: Option<&str>,
        value: impl Into<BString>,
        plain_implicit: bool,
        quoted_implicit: bool,
        style: ScalarStyle,
    ) -> Result<Self, EventError> {
        if tag.is_none() && !plain_implicit && !quoted_implicit {
            return Err(EventError::MissingTag);
        }
        let value = value.into();
        if value.to_str().is_err() {
            return Err(EventError::InvalidUtf8);
        }
        Ok(Self::new(EventData::Scalar {
            anchor: checked_anchor(anchor)?,
            tag: checked_tag(tag)?,
            value,
            plain_implicit,
            quoted_implicit,
            style,
        }))
    }

    /// `SEQUENCE-START`
    ///
    /// # Errors
    ///
    /// [`EventError::MissingTag`] if there is no tag and `implicit` is unset,
    /// [`EventError::EmptyAnchor`] / [`EventError::EmptyTag`] for empty names.
    pub fn sequence_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: SequenceStyle,
    ) -> Result<Self, EventError> {
        if tag.is_none() && !implicit {
            return Err(EventError::MissingTag);
        }
        Ok(Self::new(EventData::SequenceStart {
            anchor: checked_anchor(anchor)?,
            tag: checked_tag(tag)?,
            implicit,
            style,
        }))
    }

    /// `SEQUENCE-END`
    #[must_use]
    pub fn sequence_end() -> Self {
        Self::new(EventData::SequenceEnd)
    }

    /// `MAPPING-START`
    ///
    /// # Errors
    ///
    /// [`EventError::MissingTag`] if there is no tag and `implicit` is unset,
    /// [`EventError::EmptyAnchor`] / [`EventError::EmptyTag`] for empty names.
    pub fn mapping_start(
        anchor: Option<&str>,
        tag: Option<&str>,
        implicit: bool,
        style: MappingStyle,
    ) -> Result<Self, EventError> {
        if tag.is_none() && !implicit {
            return Err(EventError::MissingTag);
        }
        Ok(Self::new(EventData::MappingStart {
            anchor: checked_anchor(anchor)?,
            tag: checked_tag(tag)?,
            implicit,
            style,
        }))
    }

    /// `MAPPING-END`
    #[must_use]
    pub fn mapping_end() -> Self {
        Self::new(EventData::MappingEnd)
    }

    /// The kind of this event.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self.data {
            EventData::StreamStart { .. } => EventType::StreamStart,
            EventData::StreamEnd => EventType::StreamEnd,
            EventData::DocumentStart { .. } => EventType::DocumentStart,
            EventData::DocumentEnd { .. } => EventType::DocumentEnd,
            EventData::Alias { .. } => EventType::Alias,
            EventData::Scalar { .. } => EventType::Scalar,
            EventData::SequenceStart { .. } => EventType::SequenceStart,
            EventData::SequenceEnd => EventType::SequenceEnd,
            EventData::MappingStart { .. } => EventType::MappingStart,
            EventData::MappingEnd => EventType::MappingEnd,
        }
    }

    fn no_field(&self, field: &'static str) -> UsageError {
        UsageError::NoSuchField {
            event_type: self.event_type(),
            field,
        }
    }

    /// The anchor of a node event, or the target of an alias.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for events that are not nodes.
    pub fn anchor(&self) -> Result<Option<&str>, UsageError> {
        match &self.data {
            EventData::Alias { anchor } => Ok(Some(anchor)),
            EventData::Scalar { anchor, .. }
            | EventData::SequenceStart { anchor, .. }
            | EventData::MappingStart { anchor, .. } => Ok(anchor.as_deref()),
            _ => Err(self.no_field("anchor")),
        }
    }

    /// The tag of a scalar or collection start.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn tag(&self) -> Result<Option<&str>, UsageError> {
        match &self.data {
            EventData::Scalar { tag, .. }
            | EventData::SequenceStart { tag, .. }
            | EventData::MappingStart { tag, .. } => Ok(tag.as_deref()),
            _ => Err(self.no_field("tag")),
        }
    }

    /// The content of a scalar.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn value(&self) -> Result<&BStr, UsageError> {
        match &self.data {
            EventData::Scalar { value, .. } => Ok(value.as_bstr()),
            _ => Err(self.no_field("value")),
        }
    }

    /// The length of a scalar's content, in bytes.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn length(&self) -> Result<usize, UsageError> {
        match &self.data {
            EventData::Scalar { value, .. } => Ok(value.len()),
            _ => Err(self.no_field("length")),
        }
    }

    /// The style of a scalar or collection start.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn style(&self) -> Result<NodeStyle, UsageError> {
        match &self.data {
            EventData::Scalar { style, .. } => Ok(NodeStyle::Scalar(*style)),
            EventData::SequenceStart { style, .. } => Ok(NodeStyle::Sequence(*style)),
            EventData::MappingStart { style, .. } => Ok(NodeStyle::Mapping(*style)),
            _ => Err(self.no_field("style")),
        }
    }

    /// Whether a document marker or a collection tag is implicit.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for scalars (see
    /// [`Event::plain_implicit`]), aliases, stream and collection end events.
    pub fn implicit(&self) -> Result<bool, UsageError> {
        match &self.data {
            EventData::DocumentStart { implicit, .. }
            | EventData::DocumentEnd { implicit }
            | EventData::SequenceStart { implicit, .. }
            | EventData::MappingStart { implicit, .. } => Ok(*implicit),
            _ => Err(self.no_field("implicit")),
        }
    }

    /// Whether a scalar's tag may be omitted in plain style.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn plain_implicit(&self) -> Result<bool, UsageError> {
        match &self.data {
            EventData::Scalar { plain_implicit, .. } => Ok(*plain_implicit),
            _ => Err(self.no_field("plain_implicit")),
        }
    }

    /// Whether a scalar's tag may be omitted in non-plain styles.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn quoted_implicit(&self) -> Result<bool, UsageError> {
        match &self.data {
            EventData::Scalar {
                quoted_implicit, ..
            } => Ok(*quoted_implicit),
            _ => Err(self.no_field("quoted_implicit")),
        }
    }

    /// The encoding of a stream start.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn encoding(&self) -> Result<Encoding, UsageError> {
        match &self.data {
            EventData::StreamStart { encoding } => Ok(*encoding),
            _ => Err(self.no_field("encoding")),
        }
    }

    /// The `%YAML` directive of a document start.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn version(&self) -> Result<Option<VersionDirective>, UsageError> {
        match &self.data {
            EventData::DocumentStart { version, .. } => Ok(*version),
            _ => Err(self.no_field("version")),
        }
    }

    /// The `%TAG` directives of a document start.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoSuchField`] for other events.
    pub fn tag_directives(&self) -> Result<&[TagDirective], UsageError> {
        match &self.data {
            EventData::DocumentStart { tag_directives, .. } => Ok(tag_directives),
            _ => Err(self.no_field("tag_directives")),
        }
    }
}

/// A reusable holder for one event.
///
/// An empty slot has type [`EventType::NoEvent`]. Parsing into a slot
/// replaces its event; emitting from a slot empties it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSlot {
    event: Option<Event>,
}

impl EventSlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Type of the held event, [`EventType::NoEvent`] when empty.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event
            .as_ref()
            .map_or(EventType::NoEvent, Event::event_type)
    }

    /// Whether the slot holds no event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event.is_none()
    }

    /// The held event.
    ///
    /// # Errors
    ///
    /// [`UsageError::EmptyEvent`] when the slot is empty.
    pub fn get(&self) -> Result<&Event, UsageError> {
        self.event.as_ref().ok_or(UsageError::EmptyEvent)
    }

    /// Stores `event`, dropping the previous one.
    pub fn set(&mut self, event: Event) {
        self.event = Some(event);
    }

    /// Takes the event out, leaving the slot empty.
    pub fn take(&mut self) -> Option<Event> {
        self.event.take()
    }
}

impl From<Event> for EventSlot {
    fn from(event: Event) -> Self {
        Self { event: Some(event) }
    }
}
