//! Pull parser turning tokens into events.
//!
//! The grammar is driven by an explicit state and a stack of states to
//! return to, so nesting depth costs heap, not call stack.


use alloc::{string::String, vec::Vec};
use core::mem;

use crate::{
    error::{Error, UsageError},
    event::{
        Event, EventData, EventSlot, MappingStyle, ScalarStyle, SequenceStyle, TagDirective,
        VersionDirective,
    },
    io::Source,
    macros::{log_debug, log_trace},
    mark::Mark,
    options::{ParserOptions, ParsingMode},
    scanner::Scanner,
    token::{Token, TokenData},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockNodeOrIndentlessSequence,
    FlowNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// A streaming YAML parser.
///
/// Each call to [`Parser::parse`] returns the next event, and each call to
/// [`Parser::next_token`] the next raw token. The parser is also an iterator
/// over `Result<Event, Error>` that stops after `STREAM-END` or after the
/// first error, usage errors included.
///
/// ```
/// use yamlmodem::{EventType, Parser};
///
/// let types: Vec<EventType> = Parser::new("key: value".as_bytes())
///     .map(|event| event.unwrap().event_type())
///     .collect();
/// assert_eq!(
///     types,
///     [
///         EventType::StreamStart,
///         EventType::DocumentStart,
///         EventType::MappingStart,
///         EventType::Scalar,
///         EventType::Scalar,
///         EventType::MappingEnd,
///         EventType::DocumentEnd,
///         EventType::StreamEnd,
///     ]
/// );
/// ```
pub struct Parser<S> {
    scanner: Scanner<S>,
    state: ParseState,
    states: Vec<ParseState>,
    /// Start marks of the open collections, for error context.
    marks: Vec<Mark>,
    tag_directives: Vec<TagDirective>,
    mode: ParsingMode,
    failed: Option<Error>,
    /// Set once the event iterator has yielded an error.
    events_done: bool,
    #[cfg(any(test, feature = "fuzzing"))]
    panic_on_error: bool,
}

impl<S: Source> Parser<S> {
    /// Creates a parser reading from `source` with default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    /// Creates a parser reading from `source`.
    pub fn with_options(source: S, options: ParserOptions) -> Self {
        Self {
            scanner: Scanner::new(source, options.encoding),
            state: ParseState::StreamStart,
            states: Vec::new(),
            marks: Vec::new(),
            tag_directives: Vec::new(),
            mode: options.mode,
            failed: None,
            events_done: false,
            #[cfg(any(test, feature = "fuzzing"))]
            panic_on_error: options.panic_on_error,
        }
    }

    /// The mode the parser is locked to, [`ParsingMode::Any`] before the
    /// first call.
    pub fn mode(&self) -> ParsingMode {
        self.mode
    }

    /// Gives the byte source back.
    pub fn into_inner(self) -> S {
        self.scanner.into_inner()
    }

    fn enter_mode(&mut self, requested: ParsingMode) -> Result<(), Error> {
        if self.mode == ParsingMode::Any {
            self.mode = requested;
        }
        if self.mode != requested {
            return Err(UsageError::ModeMismatch {
                active: self.mode,
                requested,
            }
            .into());
        }
        Ok(())
    }

    /// Records a stream error; the parser is dead afterwards.
    fn fail(&mut self, error: Error) -> Error {
        if matches!(error, Error::Usage(_)) {
            return error;
        }
        log_debug!("parser failed: {error}");
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(!self.panic_on_error, "{error}");
        self.failed = Some(error.clone());
        error
    }

    /// Returns the next raw token.
    ///
    /// # Errors
    ///
    /// Reader and scanner errors; [`UsageError::ModeMismatch`] if events were
    /// requested before; [`UsageError::Exhausted`] after `STREAM-END`.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.enter_mode(ParsingMode::Scan)?;
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        self.scanner.next_token().map_err(|e| self.fail(e))
    }

    /// An iterator over the remaining raw tokens.
    pub fn tokens(&mut self) -> Tokens<'_, S> {
        Tokens {
            parser: self,
            done: false,
        }
    }

    /// Returns the next event.
    ///
    /// # Errors
    ///
    /// Reader, scanner and parser errors, after which every call returns the
    /// same error; [`UsageError::ModeMismatch`] if tokens were requested
    /// before; [`UsageError::Exhausted`] after `STREAM-END`.
    pub fn parse(&mut self) -> Result<Event, Error> {
        self.enter_mode(ParsingMode::Parse)?;
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }
        if self.state == ParseState::End {
            return Err(UsageError::Exhausted.into());
        }
        log_trace!("parser state {:?}", self.state);
        self.dispatch_parse_state().map_err(|e| self.fail(e))
    }

    /// Parses the next event into `slot`, replacing what it held.
    ///
    /// # Errors
    ///
    /// As [`Parser::parse`]; the slot is left empty on error.
    pub fn parse_into(&mut self, slot: &mut EventSlot) -> Result<(), Error> {
        slot.take();
        slot.set(self.parse()?);
        Ok(())
    }

    fn dispatch_parse_state(&mut self) -> Result<Event, Error> {
        match self.state {
            ParseState::StreamStart => self.parse_stream_start(),
            ParseState::ImplicitDocumentStart => self.parse_document_start(true),
            ParseState::DocumentStart => self.parse_document_start(false),
            ParseState::DocumentContent => self.parse_document_content(),
            ParseState::DocumentEnd => self.parse_document_end(),
            ParseState::BlockNode => self.parse_node(true, false),
            ParseState::BlockNodeOrIndentlessSequence => self.parse_node(true, true),
            ParseState::FlowNode => self.parse_node(false, false),
            ParseState::BlockSequenceFirstEntry => self.parse_block_sequence_entry(true),
            ParseState::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            ParseState::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            ParseState::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            ParseState::BlockMappingKey => self.parse_block_mapping_key(false),
            ParseState::BlockMappingValue => self.parse_block_mapping_value(),
            ParseState::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            ParseState::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            ParseState::FlowSequenceEntryMappingKey => {
                self.parse_flow_sequence_entry_mapping_key()
            }
            ParseState::FlowSequenceEntryMappingValue => {
                self.parse_flow_sequence_entry_mapping_value()
            }
            ParseState::FlowSequenceEntryMappingEnd => {
                self.parse_flow_sequence_entry_mapping_end()
            }
            ParseState::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            ParseState::FlowMappingKey => self.parse_flow_mapping_key(false),
            ParseState::FlowMappingValue => self.parse_flow_mapping_value(false),
            ParseState::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            ParseState::End => Err(UsageError::Exhausted.into()),
        }
    }

    fn pop_state(&mut self) -> ParseState {
        self.states.pop().unwrap_or(ParseState::End)
    }

    fn pop_mark(&mut self) -> Mark {
        self.marks.pop().unwrap_or_default()
    }

    fn skip_token(&mut self) {
        self.scanner.skip_token();
    }

    fn parse_stream_start(&mut self) -> Result<Event, Error> {
        let token = self.scanner.peek()?;
        let TokenData::StreamStart { encoding } = token.data else {
            return Err(Error::parser(
                "did not find expected <stream-start>",
                token.start_mark,
            ));
        };
        let event = Event {
            data: EventData::StreamStart { encoding },
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        };
        self.state = ParseState::ImplicitDocumentStart;
        self.skip_token();
        Ok(event)
    }

    fn parse_document_start(&mut self, implicit: bool) -> Result<Event, Error> {
        let mut token = self.scanner.peek()?;
        if !implicit {
            while matches!(token.data, TokenData::DocumentEnd) {
                self.scanner.skip_token();
                token = self.scanner.peek()?;
            }
        }

        if implicit
            && !matches!(
                token.data,
                TokenData::VersionDirective { .. }
                    | TokenData::TagDirective { .. }
                    | TokenData::DocumentStart
                    | TokenData::StreamEnd
            )
        {
            let mark = token.start_mark;
            self.process_directives()?;
            self.states.push(ParseState::DocumentEnd);
            self.state = ParseState::BlockNode;
            return Ok(Event {
                data: EventData::DocumentStart {
                    version: None,
                    tag_directives: Vec::new(),
                    implicit: true,
                },
                start_mark: mark,
                end_mark: mark,
            });
        }

        if matches!(token.data, TokenData::StreamEnd) {
            let event = Event {
                data: EventData::StreamEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = ParseState::End;
            self.skip_token();
            return Ok(event);
        }

        let start_mark = token.start_mark;
        let (version, tag_directives) = self.process_directives()?;
        let token = self.scanner.peek()?;
        if !matches!(token.data, TokenData::DocumentStart) {
            return Err(Error::parser(
                "did not find expected <document start>",
                token.start_mark,
            ));
        }
        let end_mark = token.end_mark;
        self.states.push(ParseState::DocumentEnd);
        self.state = ParseState::DocumentContent;
        self.skip_token();
        Ok(Event {
            data: EventData::DocumentStart {
                version,
                tag_directives,
                implicit: false,
            },
            start_mark,
            end_mark,
        })
    }

    /// Reads the directives in front of a document and installs its tag
    /// handles, defaults included.
    fn process_directives(
        &mut self,
    ) -> Result<(Option<VersionDirective>, Vec<TagDirective>), Error> {
        let mut version: Option<VersionDirective> = None;
        let mut tag_directives: Vec<TagDirective> = Vec::new();
        self.tag_directives.clear();

        loop {
            let token = self.scanner.peek()?;
            match &mut token.data {
                TokenData::VersionDirective { major, minor } => {
                    if version.is_some() {
                        return Err(Error::parser(
                            "found duplicate %YAML directive",
                            token.start_mark,
                        ));
                    }
                    if *major != 1 || (*minor != 1 && *minor != 2) {
                        return Err(Error::parser(
                            "found incompatible YAML document",
                            token.start_mark,
                        ));
                    }
                    version = Some(VersionDirective {
                        major: *major,
                        minor: *minor,
                    });
                }
                TokenData::TagDirective { handle, prefix } => {
                    let directive = TagDirective {
                        handle: mem::take(handle),
                        prefix: mem::take(prefix),
                    };
                    let mark = token.start_mark;
                    self.append_tag_directive(directive.clone(), false, mark)?;
                    tag_directives.push(directive);
                }
                _ => break,
            }
            self.skip_token();
        }

        for (handle, prefix) in [("!", "!"), ("!!", "tag:yaml.org,2002:")] {
            let mark = self.scanner.peek()?.start_mark;
            self.append_tag_directive(TagDirective::new(handle, prefix), true, mark)?;
        }
        Ok((version, tag_directives))
    }

    fn append_tag_directive(
        &mut self,
        value: TagDirective,
        allow_duplicates: bool,
        mark: Mark,
    ) -> Result<(), Error> {
        if self
            .tag_directives
            .iter()
            .any(|existing| existing.handle == value.handle)
        {
            if allow_duplicates {
                return Ok(());
            }
            return Err(Error::parser("found duplicate %TAG directive", mark));
        }
        self.tag_directives.push(value);
        Ok(())
    }

    fn parse_document_content(&mut self) -> Result<Event, Error> {
        let token = self.scanner.peek()?;
        if matches!(
            token.data,
            TokenData::VersionDirective { .. }
                | TokenData::TagDirective { .. }
                | TokenData::DocumentStart
                | TokenData::DocumentEnd
                | TokenData::StreamEnd
        ) {
            let mark = token.start_mark;
            self.state = self.pop_state();
            Ok(empty_scalar(mark))
        } else {
            self.parse_node(true, false)
        }
    }

    fn parse_document_end(&mut self) -> Result<Event, Error> {
        let token = self.scanner.peek()?;
        let start_mark = token.start_mark;
        let mut end_mark = start_mark;
        let mut implicit = true;
        if matches!(token.data, TokenData::DocumentEnd) {
            end_mark = token.end_mark;
            self.skip_token();
            implicit = false;
        }
        self.tag_directives.clear();
        self.state = ParseState::DocumentStart;
        Ok(Event {
            data: EventData::DocumentEnd { implicit },
            start_mark,
            end_mark,
        })
    }

    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<Event, Error> {
        let token = self.scanner.peek()?;
        if let TokenData::Alias { value } = &mut token.data {
            let event = Event {
                data: EventData::Alias {
                    anchor: mem::take(value),
                },
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = self.pop_state();
            self.skip_token();
            return Ok(event);
        }

        let mut start_mark = token.start_mark;
        let mut end_mark = token.start_mark;
        let mut tag_mark = token.start_mark;
        let mut anchor: Option<String> = None;
        let mut tag_parts: Option<(String, String)> = None;

        // Anchor and tag, in either order.
        for _ in 0..2 {
            let token = self.scanner.peek()?;
            match &mut token.data {
                TokenData::Anchor { value } if anchor.is_none() => {
                    if tag_parts.is_none() {
                        start_mark = token.start_mark;
                    }
                    anchor = Some(mem::take(value));
                    end_mark = token.end_mark;
                }
                TokenData::Tag { handle, suffix } if tag_parts.is_none() => {
                    if anchor.is_none() {
                        start_mark = token.start_mark;
                    }
                    tag_mark = token.start_mark;
                    tag_parts = Some((mem::take(handle), mem::take(suffix)));
                    end_mark = token.end_mark;
                }
                _ => break,
            }
            self.skip_token();
        }

        let tag = match tag_parts {
            None => None,
            Some((handle, suffix)) if handle.is_empty() => Some(suffix),
            Some((handle, suffix)) => {
                let Some(directive) = self
                    .tag_directives
                    .iter()
                    .find(|directive| directive.handle == handle)
                else {
                    return Err(Error::parser_in(
                        "while parsing a node",
                        start_mark,
                        "found undefined tag handle",
                        tag_mark,
                    ));
                };
                let mut tag = directive.prefix.clone();
                tag.push_str(&suffix);
                Some(tag)
            }
        };

        let implicit = tag.as_deref().is_none_or(str::is_empty);
        let token = self.scanner.peek()?;

        if indentless_sequence && matches!(token.data, TokenData::BlockEntry) {
            end_mark = token.end_mark;
            self.state = ParseState::IndentlessSequenceEntry;
            return Ok(Event {
                data: EventData::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: SequenceStyle::Block,
                },
                start_mark,
                end_mark,
            });
        }

        if let TokenData::Scalar { value, style } = &mut token.data {
            let style = *style;
            let value = mem::take(value);
            end_mark = token.end_mark;
            let (plain_implicit, quoted_implicit) = match tag.as_deref() {
                None if style == ScalarStyle::Plain => (true, false),
                Some("!") => (true, false),
                None => (false, true),
                Some(_) => (false, false),
            };
            self.state = self.pop_state();
            self.skip_token();
            return Ok(Event {
                data: EventData::Scalar {
                    anchor,
                    tag,
                    value: value.into(),
                    plain_implicit,
                    quoted_implicit,
                    style,
                },
                start_mark,
                end_mark,
            });
        }

        let (next_state, data) = match token.data {
            TokenData::FlowSequenceStart => (
                ParseState::FlowSequenceFirstEntry,
                EventData::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: SequenceStyle::Flow,
                },
            ),
            TokenData::FlowMappingStart => (
                ParseState::FlowMappingFirstKey,
                EventData::MappingStart {
                    anchor,
                    tag,
                    implicit,
                    style: MappingStyle::Flow,
                },
            ),
            TokenData::BlockSequenceStart if block => (
                ParseState::BlockSequenceFirstEntry,
                EventData::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: SequenceStyle::Block,
                },
            ),
            TokenData::BlockMappingStart if block => (
                ParseState::BlockMappingFirstKey,
                EventData::MappingStart {
                    anchor,
                    tag,
                    implicit,
                    style: MappingStyle::Block,
                },
            ),
            _ if anchor.is_some() || tag.is_some() => {
                // A node with properties and no content is an empty scalar.
                self.state = self.pop_state();
                return Ok(Event {
                    data: EventData::Scalar {
                        anchor,
                        tag,
                        value: Default::default(),
                        plain_implicit: implicit,
                        quoted_implicit: false,
                        style: ScalarStyle::Plain,
                    },
                    start_mark,
                    end_mark,
                });
            }
            _ => {
                let context = if block {
                    "while parsing a block node"
                } else {
                    "while parsing a flow node"
                };
                return Err(Error::parser_in(
                    context,
                    start_mark,
                    "did not find expected node content",
                    token.start_mark,
                ));
            }
        };
        // The start token stays queued; the first-entry states consume it.
        end_mark = token.end_mark;
        self.state = next_state;
        Ok(Event {
            data,
            start_mark,
            end_mark,
        })
    }

    fn parse_block_sequence_entry(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            let mark = self.scanner.peek()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }
        let token = self.scanner.peek()?;
        match token.data {
            TokenData::BlockEntry => {
                let mark = token.end_mark;
                self.skip_token();
                let token = self.scanner.peek()?;
                if matches!(token.data, TokenData::BlockEntry | TokenData::BlockEnd) {
                    self.state = ParseState::BlockSequenceEntry;
                    Ok(empty_scalar(mark))
                } else {
                    self.states.push(ParseState::BlockSequenceEntry);
                    self.parse_node(true, false)
                }
            }
            TokenData::BlockEnd => {
                let event = Event {
                    data: EventData::SequenceEnd,
                    start_mark: token.start_mark,
                    end_mark: token.end_mark,
                };
                self.state = self.pop_state();
                self.pop_mark();
                self.skip_token();
                Ok(event)
            }
            _ => {
                let problem_mark = token.start_mark;
                Err(Error::parser_in(
                    "while parsing a block collection",
                    self.pop_mark(),
                    "did not find expected '-' indicator",
                    problem_mark,
                ))
            }
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<Event, Error> {
        let token = self.scanner.peek()?;
        if !matches!(token.data, TokenData::BlockEntry) {
            let mark = token.start_mark;
            self.state = self.pop_state();
            return Ok(Event {
                data: EventData::SequenceEnd,
                start_mark: mark,
                end_mark: mark,
            });
        }
        let mark = token.end_mark;
        self.skip_token();
        let token = self.scanner.peek()?;
        if matches!(
            token.data,
            TokenData::BlockEntry | TokenData::Key | TokenData::Value | TokenData::BlockEnd
        ) {
            self.state = ParseState::IndentlessSequenceEntry;
            Ok(empty_scalar(mark))
        } else {
            self.states.push(ParseState::IndentlessSequenceEntry);
            self.parse_node(true, false)
        }
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            let mark = self.scanner.peek()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }
        let token = self.scanner.peek()?;
        match token.data {
            TokenData::Key => {
                let mark = token.end_mark;
                self.skip_token();
                let token = self.scanner.peek()?;
                if matches!(
                    token.data,
                    TokenData::Key | TokenData::Value | TokenData::BlockEnd
                ) {
                    self.state = ParseState::BlockMappingValue;
                    Ok(empty_scalar(mark))
                } else {
                    self.states.push(ParseState::BlockMappingValue);
                    self.parse_node(true, true)
                }
            }
            TokenData::BlockEnd => {
                let event = Event {
                    data: EventData::MappingEnd,
                    start_mark: token.start_mark,
                    end_mark: token.end_mark,
                };
                self.state = self.pop_state();
                self.pop_mark();
                self.skip_token();
                Ok(event)
            }
            _ => {
                let problem_mark = token.start_mark;
                Err(Error::parser_in(
                    "while parsing a block mapping",
                    self.pop_mark(),
                    "did not find expected key",
                    problem_mark,
                ))
            }
        }
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event, Error> {
        let token = self.scanner.peek()?;
        if !matches!(token.data, TokenData::Value) {
            let mark = token.start_mark;
            self.state = ParseState::BlockMappingKey;
            return Ok(empty_scalar(mark));
        }
        let mark = token.end_mark;
        self.skip_token();
        let token = self.scanner.peek()?;
        if matches!(
            token.data,
            TokenData::Key | TokenData::Value | TokenData::BlockEnd
        ) {
            self.state = ParseState::BlockMappingKey;
            Ok(empty_scalar(mark))
        } else {
            self.states.push(ParseState::BlockMappingKey);
            self.parse_node(true, true)
        }
    }

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            let mark = self.scanner.peek()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }
        let mut token = self.scanner.peek()?;
        if !matches!(token.data, TokenData::FlowSequenceEnd) {
            if !first {
                if matches!(token.data, TokenData::FlowEntry) {
                    self.scanner.skip_token();
                    token = self.scanner.peek()?;
                } else {
                    let problem_mark = token.start_mark;
                    return Err(Error::parser_in(
                        "while parsing a flow sequence",
                        self.pop_mark(),
                        "did not find expected ',' or ']'",
                        problem_mark,
                    ));
                }
            }
            if matches!(token.data, TokenData::Key) {
                // `[a: b]`: a single-pair mapping inside the sequence.
                let event = Event {
                    data: EventData::MappingStart {
                        anchor: None,
                        tag: None,
                        implicit: true,
                        style: MappingStyle::Flow,
                    },
                    start_mark: token.start_mark,
                    end_mark: token.end_mark,
                };
                self.state = ParseState::FlowSequenceEntryMappingKey;
                self.skip_token();
                return Ok(event);
            }
            if !matches!(token.data, TokenData::FlowSequenceEnd) {
                self.states.push(ParseState::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }
        let event = Event {
            data: EventData::SequenceEnd,
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        };
        self.state = self.pop_state();
        self.pop_mark();
        self.skip_token();
        Ok(event)
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event, Error> {
        let token = self.scanner.peek()?;
        if matches!(
            token.data,
            TokenData::Value | TokenData::FlowEntry | TokenData::FlowSequenceEnd
        ) {
            let mark = token.start_mark;
            self.state = ParseState::FlowSequenceEntryMappingValue;
            Ok(empty_scalar(mark))
        } else {
            self.states.push(ParseState::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event, Error> {
        let mut token = self.scanner.peek()?;
        if matches!(token.data, TokenData::Value) {
            self.scanner.skip_token();
            token = self.scanner.peek()?;
            if !matches!(
                token.data,
                TokenData::FlowEntry | TokenData::FlowSequenceEnd
            ) {
                self.states.push(ParseState::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
        }
        let mark = token.start_mark;
        self.state = ParseState::FlowSequenceEntryMappingEnd;
        Ok(empty_scalar(mark))
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event, Error> {
        let mark = self.scanner.peek()?.start_mark;
        self.state = ParseState::FlowSequenceEntry;
        Ok(Event {
            data: EventData::MappingEnd,
            start_mark: mark,
            end_mark: mark,
        })
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<Event, Error> {
        if first {
            let mark = self.scanner.peek()?.start_mark;
            self.marks.push(mark);
            self.skip_token();
        }
        let mut token = self.scanner.peek()?;
        if !matches!(token.data, TokenData::FlowMappingEnd) {
            if !first {
                if matches!(token.data, TokenData::FlowEntry) {
                    self.scanner.skip_token();
                    token = self.scanner.peek()?;
                } else {
                    let problem_mark = token.start_mark;
                    return Err(Error::parser_in(
                        "while parsing a flow mapping",
                        self.pop_mark(),
                        "did not find expected ',' or '}'",
                        problem_mark,
                    ));
                }
            }
            if matches!(token.data, TokenData::Key) {
                self.scanner.skip_token();
                let token = self.scanner.peek()?;
                if matches!(
                    token.data,
                    TokenData::Value | TokenData::FlowEntry | TokenData::FlowMappingEnd
                ) {
                    let mark = token.start_mark;
                    self.state = ParseState::FlowMappingValue;
                    return Ok(empty_scalar(mark));
                }
                self.states.push(ParseState::FlowMappingValue);
                return self.parse_node(false, false);
            }
            if !matches!(token.data, TokenData::FlowMappingEnd) {
                self.states.push(ParseState::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }
        let event = Event {
            data: EventData::MappingEnd,
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        };
        self.state = self.pop_state();
        self.pop_mark();
        self.skip_token();
        Ok(event)
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> Result<Event, Error> {
        let mut token = self.scanner.peek()?;
        if empty {
            let mark = token.start_mark;
            self.state = ParseState::FlowMappingKey;
            return Ok(empty_scalar(mark));
        }
        if matches!(token.data, TokenData::Value) {
            self.scanner.skip_token();
            token = self.scanner.peek()?;
            if !matches!(
                token.data,
                TokenData::FlowEntry | TokenData::FlowMappingEnd
            ) {
                self.states.push(ParseState::FlowMappingKey);
                return self.parse_node(false, false);
            }
        }
        let mark = token.start_mark;
        self.state = ParseState::FlowMappingKey;
        Ok(empty_scalar(mark))
    }
}

/// The implicit empty plain scalar standing in for a missing node.
fn empty_scalar(mark: Mark) -> Event {
    Event {
        data: EventData::Scalar {
            anchor: None,
            tag: None,
            value: Default::default(),
            plain_implicit: true,
            quoted_implicit: false,
            style: ScalarStyle::Plain,
        },
        start_mark: mark,
        end_mark: mark,
    }
}

impl<S: Source> Iterator for Parser<S> {
    type Item = Result<Event, Error>;

    /// Yields events until `STREAM-END` or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.events_done || self.failed.is_some() || self.state == ParseState::End {
            return None;
        }
        let event = self.parse();
        self.events_done = event.is_err();
        Some(event)
    }
}

/// Iterator over raw tokens, see [`Parser::tokens`].
pub struct Tokens<'a, S> {
    parser: &'a mut Parser<S>,
    done: bool,
}

impl<S: Source> Iterator for Tokens<'_, S> {
    type Item = Result<Token, Error>;

    /// Yields tokens until `STREAM-END` or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done
            || self.parser.failed.is_some()
            || self.parser.scanner.stream_end_produced()
        {
            return None;
        }
        let token = self.parser.next_token();
        self.done = token.is_err();
        Some(token)
    }
}
