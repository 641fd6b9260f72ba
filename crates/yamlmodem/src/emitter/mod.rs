//! Event-driven YAML writer.
//!
//! The emitter consumes events by value and keeps a short queue of them: a
//! collection start is held back until enough of what follows is known to
//! choose between block and flow layout and between simple and explicit keys.

mod analysis;
mod scalar;
#[cfg(test)]
mod tests;

use alloc::{collections::VecDeque, string::String, vec::Vec};

use bstr::ByteSlice;

use self::analysis::{
    Analysis, TagAnalysis, analyze_anchor, analyze_scalar, analyze_tag, analyze_tag_directive,
    analyze_version_directive,
};
use crate::{
    error::{Error, UsageError},
    event::{Event, EventData, EventSlot, MappingStyle, ScalarStyle, SequenceStyle, TagDirective},
    io::Sink,
    macros::{log_debug, log_trace},
    options::{EmitterOptions, Encoding, LineBreak},
    writer::Writer,
};

/// Longest key, in bytes of anchor, tag and value, written in the `key: value`
/// form.
const MAX_SIMPLE_KEY_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitState {
    StreamStart,
    FirstDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    FlowSequenceFirstItem,
    FlowSequenceItem,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingSimpleValue,
    FlowMappingValue,
    BlockSequenceFirstItem,
    BlockSequenceItem,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingSimpleValue,
    BlockMappingValue,
    End,
}

/// Whether the last document needs an explicit `...` before what follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenEnded {
    Closed,
    /// The document ended without `...`; directives for the next one need it.
    Implicit,
    /// A kept trailing line break must be terminated before the stream ends.
    Open,
}

/// A streaming YAML emitter.
///
/// Events go in by value through [`Emitter::emit`], in stream order. Text is
/// buffered and handed to the sink at the end of each document, at the end of
/// the stream, and whenever the buffer grows large.
///
/// ```
/// use yamlmodem::{Emitter, Encoding, Event, ScalarStyle, SequenceStyle};
///
/// let mut emitter = Emitter::new(Vec::new());
/// emitter
///     .emit_all([
///         Event::stream_start(Encoding::Utf8),
///         Event::document_start(None, Vec::new(), true),
///         Event::sequence_start(None, None, true, SequenceStyle::Flow).unwrap(),
///         Event::scalar(None, None, "a", true, false, ScalarStyle::Plain).unwrap(),
///         Event::scalar(None, None, "b", true, false, ScalarStyle::Plain).unwrap(),
///         Event::sequence_end(),
///         Event::document_end(true),
///         Event::stream_end(),
///     ])
///     .unwrap();
/// assert_eq!(emitter.into_inner(), b"[a, b]\n");
/// ```
#[allow(clippy::struct_excessive_bools)]
pub struct Emitter<W> {
    writer: Writer<W>,
    options: EmitterOptions,

    canonical: bool,
    best_indent: i64,
    best_width: i64,
    unicode: bool,
    line_break: LineBreak,

    state: EmitState,
    states: Vec<EmitState>,
    events: VecDeque<Event>,
    indents: Vec<i64>,
    tag_directives: Vec<TagDirective>,
    indent: i64,
    flow_level: usize,

    root_context: bool,
    mapping_context: bool,
    simple_key_context: bool,

    column: i64,
    whitespace: bool,
    indention: bool,
    open_ended: OpenEnded,

    analysis: Analysis,
    failed: Option<Error>,
}

impl<W: Sink> Emitter<W> {
    /// Creates an emitter writing to `sink` with default options.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, EmitterOptions::default())
    }

    /// Creates an emitter writing to `sink`.
    pub fn with_options(sink: W, options: EmitterOptions) -> Self {
        Self {
            writer: Writer::new(sink),
            options,
            canonical: options.canonical,
            best_indent: 2,
            best_width: 80,
            unicode: options.unicode,
            line_break: LineBreak::Ln,
            state: EmitState::StreamStart,
            states: Vec::new(),
            events: VecDeque::new(),
            indents: Vec::new(),
            tag_directives: Vec::new(),
            indent: -1,
            flow_level: 0,
            root_context: false,
            mapping_context: false,
            simple_key_context: false,
            column: 0,
            whitespace: true,
            indention: true,
            open_ended: OpenEnded::Closed,
            analysis: Analysis::default(),
            failed: None,
        }
    }

    /// Emits one event.
    ///
    /// The event may be held back until the events after it are known.
    ///
    /// # Errors
    ///
    /// [`Error::Emitter`] when the event is out of order or carries data that
    /// cannot be written, [`Error::Writer`] when the sink fails. Either error
    /// is returned again by every later call.
    pub fn emit(&mut self, event: Event) -> Result<(), Error> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        self.events.push_back(event);
        self.drain().map_err(|error| {
            log_debug!("emitter failed: {error}");
            self.failed = Some(error.clone());
            error
        })
    }

    /// Emits every event of `events`, stopping at the first error.
    ///
    /// # Errors
    ///
    /// As [`Emitter::emit`].
    pub fn emit_all(&mut self, events: impl IntoIterator<Item = Event>) -> Result<(), Error> {
        events.into_iter().try_for_each(|event| self.emit(event))
    }

    /// Emits the event held by `slot`, leaving the slot empty.
    ///
    /// # Errors
    ///
    /// [`UsageError::EmptyEvent`] for an empty slot; otherwise as
    /// [`Emitter::emit`].
    pub fn emit_slot(&mut self, slot: &mut EventSlot) -> Result<(), Error> {
        let event = slot.take().ok_or(UsageError::EmptyEvent)?;
        self.emit(event)
    }

    /// Hands all buffered text to the sink and flushes it.
    ///
    /// # Errors
    ///
    /// [`Error::Writer`] when the sink fails.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.flush_writer()
    }

    /// Gives the sink back. Text buffered since the last flush is dropped;
    /// the stream end flushes everything.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn drain(&mut self) -> Result<(), Error> {
        while !self.need_more_events() {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            self.analyze_event(&event)?;
            log_trace!("emitter state {:?} on {}", self.state, event.event_type());
            self.state_machine(&event)?;
            self.writer.maybe_flush()?;
        }
        Ok(())
    }

    /// Whether the head of the queue still waits for look-ahead.
    fn need_more_events(&self) -> bool {
        let Some(head) = self.events.front() else {
            return true;
        };
        let accumulate = match head.data {
            EventData::DocumentStart { .. } => 1,
            EventData::SequenceStart { .. } => 2,
            EventData::MappingStart { .. } => 3,
            _ => return false,
        };
        if self.events.len() > accumulate {
            return false;
        }
        let mut level = 0i64;
        for event in &self.events {
            match event.data {
                EventData::StreamStart { .. }
                | EventData::DocumentStart { .. }
                | EventData::SequenceStart { .. }
                | EventData::MappingStart { .. } => level += 1,
                EventData::StreamEnd
                | EventData::DocumentEnd { .. }
                | EventData::SequenceEnd
                | EventData::MappingEnd => level -= 1,
                _ => {}
            }
            if level == 0 {
                return false;
            }
        }
        true
    }

    fn analyze_event(&mut self, event: &Event) -> Result<(), Error> {
        self.analysis = Analysis::default();
        match &event.data {
            EventData::Alias { anchor } => {
                self.analysis.anchor = Some(analyze_anchor(anchor, true)?);
            }
            EventData::Scalar {
                anchor,
                tag,
                value,
                plain_implicit,
                quoted_implicit,
                ..
            } => {
                if let Some(anchor) = anchor {
                    self.analysis.anchor = Some(analyze_anchor(anchor, false)?);
                }
                if let Some(tag) = tag
                    .as_deref()
                    .filter(|_| self.canonical || (!plain_implicit && !quoted_implicit))
                {
                    self.analysis.tag = Some(analyze_tag(tag, &self.tag_directives)?);
                }
                let value = value
                    .to_str()
                    .map_err(|_| Error::emitter("scalar value must be valid UTF-8"))?;
                self.analysis.scalar = Some(analyze_scalar(value, self.unicode));
            }
            EventData::SequenceStart {
                anchor,
                tag,
                implicit,
                ..
            }
            | EventData::MappingStart {
                anchor,
                tag,
                implicit,
                ..
            } => {
                if let Some(anchor) = anchor {
                    self.analysis.anchor = Some(analyze_anchor(anchor, false)?);
                }
                if let Some(tag) = tag
                    .as_deref()
                    .filter(|_| self.canonical || !implicit)
                {
                    self.analysis.tag = Some(analyze_tag(tag, &self.tag_directives)?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn state_machine(&mut self, event: &Event) -> Result<(), Error> {
        match self.state {
            EmitState::StreamStart => self.emit_stream_start(event),
            EmitState::FirstDocumentStart => self.emit_document_start(event, true),
            EmitState::DocumentStart => self.emit_document_start(event, false),
            EmitState::DocumentContent => self.emit_document_content(event),
            EmitState::DocumentEnd => self.emit_document_end(event),
            EmitState::FlowSequenceFirstItem => self.emit_flow_sequence_item(event, true),
            EmitState::FlowSequenceItem => self.emit_flow_sequence_item(event, false),
            EmitState::FlowMappingFirstKey => self.emit_flow_mapping_key(event, true),
            EmitState::FlowMappingKey => self.emit_flow_mapping_key(event, false),
            EmitState::FlowMappingSimpleValue => self.emit_flow_mapping_value(event, true),
            EmitState::FlowMappingValue => self.emit_flow_mapping_value(event, false),
            EmitState::BlockSequenceFirstItem => self.emit_block_sequence_item(event, true),
            EmitState::BlockSequenceItem => self.emit_block_sequence_item(event, false),
            EmitState::BlockMappingFirstKey => self.emit_block_mapping_key(event, true),
            EmitState::BlockMappingKey => self.emit_block_mapping_key(event, false),
            EmitState::BlockMappingSimpleValue => self.emit_block_mapping_value(event, true),
            EmitState::BlockMappingValue => self.emit_block_mapping_value(event, false),
            EmitState::End => Err(Error::emitter("expected nothing")),
        }
    }

    fn pop_state(&mut self) -> EmitState {
        self.states.pop().unwrap_or(EmitState::End)
    }

    fn pop_indent(&mut self) -> i64 {
        self.indents.pop().unwrap_or(-1)
    }

    fn emit_stream_start(&mut self, event: &Event) -> Result<(), Error> {
        let EventData::StreamStart { encoding } = event.data else {
            return Err(Error::emitter("expected STREAM-START"));
        };
        let encoding = match (self.options.encoding, encoding) {
            (Encoding::Any, Encoding::Any) => Encoding::Utf8,
            (Encoding::Any, from_event) => from_event,
            (from_options, _) => from_options,
        };
        self.writer.set_encoding(encoding);

        self.best_indent = match i64::from(self.options.indent) {
            indent @ 2..=9 => indent,
            _ => 2,
        };
        self.best_width = match i64::from(self.options.width) {
            width if width < 0 => i64::MAX,
            width if width <= self.best_indent * 2 => 80,
            width => width,
        };
        self.line_break = match self.options.line_break {
            LineBreak::Any => LineBreak::Ln,
            other => other,
        };

        self.indent = -1;
        self.column = 0;
        self.whitespace = true;
        self.indention = true;

        if encoding != Encoding::Utf8 {
            self.write_bom();
        }
        self.state = EmitState::FirstDocumentStart;
        Ok(())
    }

    fn emit_document_start(&mut self, event: &Event, first: bool) -> Result<(), Error> {
        match &event.data {
            EventData::DocumentStart {
                version,
                tag_directives,
                implicit,
            } => {
                if let Some(version) = version {
                    analyze_version_directive(*version)?;
                }
                for directive in tag_directives {
                    analyze_tag_directive(directive)?;
                    self.append_tag_directive(directive, false)?;
                }
                for (handle, prefix) in [("!", "!"), ("!!", "tag:yaml.org,2002:")] {
                    self.append_tag_directive(&TagDirective::new(handle, prefix), true)?;
                }

                let mut implicit = *implicit && first && !self.canonical;

                if (version.is_some() || !tag_directives.is_empty())
                    && self.open_ended != OpenEnded::Closed
                {
                    self.write_indicator("...", true, false, false);
                    self.write_indent();
                }
                self.open_ended = OpenEnded::Closed;

                if let Some(version) = version {
                    implicit = false;
                    self.write_indicator("%YAML", true, false, false);
                    self.write_indicator(
                        if version.minor == 1 { "1.1" } else { "1.2" },
                        true,
                        false,
                        false,
                    );
                    self.write_indent();
                }

                for directive in tag_directives {
                    implicit = false;
                    self.write_indicator("%TAG", true, false, false);
                    self.write_tag_handle(&directive.handle);
                    self.write_tag_content(&directive.prefix, true);
                    self.write_indent();
                }

                if self.check_empty_document() {
                    implicit = false;
                }

                if !implicit {
                    self.write_indent();
                    self.write_indicator("---", true, false, false);
                    if self.canonical {
                        self.write_indent();
                    }
                }
                self.state = EmitState::DocumentContent;
                Ok(())
            }
            EventData::StreamEnd => {
                if self.open_ended == OpenEnded::Open {
                    self.write_indicator("...", true, false, false);
                    self.open_ended = OpenEnded::Closed;
                    self.write_indent();
                }
                self.flush_writer()?;
                self.state = EmitState::End;
                Ok(())
            }
            _ => Err(Error::emitter("expected DOCUMENT-START or STREAM-END")),
        }
    }

    fn append_tag_directive(
        &mut self,
        directive: &TagDirective,
        allow_duplicates: bool,
    ) -> Result<(), Error> {
        if self
            .tag_directives
            .iter()
            .any(|existing| existing.handle == directive.handle)
        {
            if allow_duplicates {
                return Ok(());
            }
            return Err(Error::emitter("duplicate %TAG directive"));
        }
        self.tag_directives.push(directive.clone());
        Ok(())
    }

    fn emit_document_content(&mut self, event: &Event) -> Result<(), Error> {
        self.states.push(EmitState::DocumentEnd);
        self.emit_node(event, true, false, false)
    }

    fn emit_document_end(&mut self, event: &Event) -> Result<(), Error> {
        let EventData::DocumentEnd { implicit } = event.data else {
            return Err(Error::emitter("expected DOCUMENT-END"));
        };
        self.write_indent();
        if !implicit {
            self.write_indicator("...", true, false, false);
            self.open_ended = OpenEnded::Closed;
            self.write_indent();
        } else if self.open_ended == OpenEnded::Closed {
            self.open_ended = OpenEnded::Implicit;
        }
        self.flush_writer()?;
        self.state = EmitState::DocumentStart;
        self.tag_directives.clear();
        Ok(())
    }

    fn emit_flow_sequence_item(&mut self, event: &Event, first: bool) -> Result<(), Error> {
        if first {
            self.write_indicator("[", true, true, false);
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event.data, EventData::SequenceEnd) {
            self.flow_level -= 1;
            self.indent = self.pop_indent();
            if self.canonical && !first {
                self.write_indicator(",", false, false, false);
                self.write_indent();
            }
            self.write_indicator("]", false, false, false);
            self.state = self.pop_state();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false);
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent();
        }
        self.states.push(EmitState::FlowSequenceItem);
        self.emit_node(event, false, false, false)
    }

    fn emit_flow_mapping_key(&mut self, event: &Event, first: bool) -> Result<(), Error> {
        if first {
            self.write_indicator("{", true, true, false);
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event.data, EventData::MappingEnd) {
            self.flow_level -= 1;
            self.indent = self.pop_indent();
            if self.canonical && !first {
                self.write_indicator(",", false, false, false);
                self.write_indent();
            }
            self.write_indicator("}", false, false, false);
            self.state = self.pop_state();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false);
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent();
        }
        if !self.canonical && self.check_simple_key(event) {
            self.states.push(EmitState::FlowMappingSimpleValue);
            self.emit_node(event, false, true, true)
        } else {
            self.write_indicator("?", true, false, false);
            self.states.push(EmitState::FlowMappingValue);
            self.emit_node(event, false, true, false)
        }
    }

    fn emit_flow_mapping_value(&mut self, event: &Event, simple: bool) -> Result<(), Error> {
        if simple {
            self.write_indicator(":", false, false, false);
        } else {
            if self.canonical || self.column > self.best_width {
                self.write_indent();
            }
            self.write_indicator(":", true, false, false);
        }
        self.states.push(EmitState::FlowMappingKey);
        self.emit_node(event, false, true, false)
    }

    fn emit_block_sequence_item(&mut self, event: &Event, first: bool) -> Result<(), Error> {
        if first {
            self.increase_indent(false, self.mapping_context && !self.indention);
        }
        if matches!(event.data, EventData::SequenceEnd) {
            self.indent = self.pop_indent();
            self.state = self.pop_state();
            return Ok(());
        }
        self.write_indent();
        self.write_indicator("-", true, false, true);
        self.states.push(EmitState::BlockSequenceItem);
        self.emit_node(event, false, false, false)
    }

    fn emit_block_mapping_key(&mut self, event: &Event, first: bool) -> Result<(), Error> {
        if first {
            self.increase_indent(false, false);
        }
        if matches!(event.data, EventData::MappingEnd) {
            self.indent = self.pop_indent();
            self.state = self.pop_state();
            return Ok(());
        }
        self.write_indent();
        if self.check_simple_key(event) {
            self.states.push(EmitState::BlockMappingSimpleValue);
            self.emit_node(event, false, true, true)
        } else {
            self.write_indicator("?", true, false, true);
            self.states.push(EmitState::BlockMappingValue);
            self.emit_node(event, false, true, false)
        }
    }

    fn emit_block_mapping_value(&mut self, event: &Event, simple: bool) -> Result<(), Error> {
        if simple {
            self.write_indicator(":", false, false, false);
        } else {
            self.write_indent();
            self.write_indicator(":", true, false, true);
        }
        self.states.push(EmitState::BlockMappingKey);
        self.emit_node(event, false, true, false)
    }

    fn emit_node(
        &mut self,
        event: &Event,
        root: bool,
        mapping: bool,
        simple_key: bool,
    ) -> Result<(), Error> {
        self.root_context = root;
        self.mapping_context = mapping;
        self.simple_key_context = simple_key;

        match &event.data {
            EventData::Alias { .. } => self.emit_alias(),
            EventData::Scalar { .. } => self.emit_scalar(event),
            EventData::SequenceStart { style, .. } => {
                self.process_anchor();
                self.process_tag();
                self.state = if self.flow_level > 0
                    || self.canonical
                    || *style == SequenceStyle::Flow
                    || self.check_empty_sequence(event)
                {
                    EmitState::FlowSequenceFirstItem
                } else {
                    EmitState::BlockSequenceFirstItem
                };
                Ok(())
            }
            EventData::MappingStart { style, .. } => {
                self.process_anchor();
                self.process_tag();
                self.state = if self.flow_level > 0
                    || self.canonical
                    || *style == MappingStyle::Flow
                    || self.check_empty_mapping(event)
                {
                    EmitState::FlowMappingFirstKey
                } else {
                    EmitState::BlockMappingFirstKey
                };
                Ok(())
            }
            _ => Err(Error::emitter(
                "expected SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS",
            )),
        }
    }

    fn emit_alias(&mut self) -> Result<(), Error> {
        self.process_anchor();
        if self.simple_key_context {
            self.put(' ');
        }
        self.state = self.pop_state();
        Ok(())
    }

    fn emit_scalar(&mut self, event: &Event) -> Result<(), Error> {
        let style = self.select_scalar_style(event)?;
        self.process_anchor();
        self.process_tag();
        self.increase_indent(true, false);
        self.process_scalar(style);
        self.indent = self.pop_indent();
        self.state = self.pop_state();
        Ok(())
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        if self.indent < 0 {
            self.indent = if flow { self.best_indent } else { 0 };
        } else if !indentless {
            self.indent += self.best_indent;
        }
    }

    /// Whether the document body is a lone empty plain scalar, which would
    /// vanish without a `---` marker.
    fn check_empty_document(&self) -> bool {
        matches!(
            self.events.front().map(|next| &next.data),
            Some(EventData::Scalar {
                anchor: None,
                tag: None,
                value,
                plain_implicit: true,
                style: ScalarStyle::Any | ScalarStyle::Plain,
                ..
            }) if value.is_empty()
        )
    }

    fn check_empty_sequence(&self, event: &Event) -> bool {
        matches!(event.data, EventData::SequenceStart { .. })
            && matches!(
                self.events.front().map(|next| &next.data),
                Some(EventData::SequenceEnd)
            )
    }

    fn check_empty_mapping(&self, event: &Event) -> bool {
        matches!(event.data, EventData::MappingStart { .. })
            && matches!(
                self.events.front().map(|next| &next.data),
                Some(EventData::MappingEnd)
            )
    }

    /// Whether `event` can be written as a `key:` without the `?` indicator.
    fn check_simple_key(&self, event: &Event) -> bool {
        let properties = self.analysis.anchor.as_ref().map_or(0, |a| a.name.len())
            + self
                .analysis
                .tag
                .as_ref()
                .map_or(0, |t| t.handle.len() + t.suffix.len());
        let length = match &event.data {
            EventData::Alias { .. } => properties,
            EventData::Scalar { .. } => match &self.analysis.scalar {
                Some(scalar) if !scalar.multiline => properties + scalar.value.len(),
                _ => return false,
            },
            EventData::SequenceStart { .. } if self.check_empty_sequence(event) => properties,
            EventData::MappingStart { .. } if self.check_empty_mapping(event) => properties,
            _ => return false,
        };
        length <= MAX_SIMPLE_KEY_LENGTH
    }

    fn select_scalar_style(&mut self, event: &Event) -> Result<ScalarStyle, Error> {
        let EventData::Scalar {
            plain_implicit,
            quoted_implicit,
            style,
            ..
        } = event.data
        else {
            return Err(Error::emitter(
                "expected SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS",
            ));
        };
        let Some(scalar) = &self.analysis.scalar else {
            return Err(Error::emitter("scalar value must be valid UTF-8"));
        };
        let no_tag = self.analysis.tag.is_none();
        if no_tag && !plain_implicit && !quoted_implicit {
            return Err(Error::emitter(
                "neither tag nor implicit flags are specified",
            ));
        }

        let mut style = match style {
            ScalarStyle::Any => ScalarStyle::Plain,
            other => other,
        };
        if self.canonical {
            style = ScalarStyle::DoubleQuoted;
        }
        if self.simple_key_context && scalar.multiline {
            style = ScalarStyle::DoubleQuoted;
        }

        if style == ScalarStyle::Plain {
            let plain_allowed = if self.flow_level > 0 {
                scalar.flow_plain_allowed
            } else {
                scalar.block_plain_allowed
            };
            if !plain_allowed
                || (scalar.value.is_empty() && (self.flow_level > 0 || self.simple_key_context))
                || (no_tag && !plain_implicit)
            {
                style = ScalarStyle::SingleQuoted;
            }
        }
        if style == ScalarStyle::SingleQuoted && !scalar.single_quoted_allowed {
            style = ScalarStyle::DoubleQuoted;
        }
        if matches!(style, ScalarStyle::Literal | ScalarStyle::Folded)
            && (!scalar.block_allowed || self.flow_level > 0 || self.simple_key_context)
        {
            style = ScalarStyle::DoubleQuoted;
        }

        if no_tag && !quoted_implicit && style != ScalarStyle::Plain {
            self.analysis.tag = Some(TagAnalysis {
                handle: "!".into(),
                suffix: String::new(),
            });
        }
        Ok(style)
    }

    fn process_anchor(&mut self) {
        let Some(anchor) = self.analysis.anchor.take() else {
            return;
        };
        self.write_indicator(if anchor.alias { "*" } else { "&" }, true, false, false);
        self.write_anchor(&anchor.name);
    }

    fn process_tag(&mut self) {
        let Some(tag) = self.analysis.tag.take() else {
            return;
        };
        if tag.handle.is_empty() {
            self.write_indicator("!<", true, false, false);
            self.write_tag_content(&tag.suffix, false);
            self.write_indicator(">", false, false, false);
        } else {
            self.write_tag_handle(&tag.handle);
            if !tag.suffix.is_empty() {
                self.write_tag_content(&tag.suffix, false);
            }
        }
    }

    fn process_scalar(&mut self, style: ScalarStyle) {
        let Some(scalar) = self.analysis.scalar.take() else {
            return;
        };
        let allow_breaks = !self.simple_key_context;
        match style {
            ScalarStyle::Plain | ScalarStyle::Any => {
                self.write_plain_scalar(&scalar.value, allow_breaks);
            }
            ScalarStyle::SingleQuoted => self.write_single_quoted(&scalar.value, allow_breaks),
            ScalarStyle::DoubleQuoted => self.write_double_quoted(&scalar.value, allow_breaks),
            ScalarStyle::Literal => self.write_literal_scalar(&scalar.value),
            ScalarStyle::Folded => self.write_folded_scalar(&scalar.value),
        }
    }
}
