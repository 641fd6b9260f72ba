use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::{event::EventType, mark::Mark, options::ParsingMode};

/// Error category, numbered as in libyaml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    /// No stream error. Reported for API misuse, see [`UsageError`].
    None = 0,
    /// Allocation failure. Never produced: allocation failure aborts.
    Memory = 1,
    /// The input could not be read or decoded.
    Reader = 2,
    /// The input could not be split into tokens.
    Scanner = 3,
    /// The tokens do not form a valid event stream.
    Parser = 4,
    /// Document composition failure. Never produced: there is no composer.
    Composer = 5,
    /// The output could not be written.
    Writer = 6,
    /// The events do not form a valid stream, or carry invalid data.
    Emitter = 7,
}

/// A problem found at a position in the input, optionally inside a larger
/// construct that started elsewhere.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{}{problem} at {problem_mark}", ContextPrefix(.context, .context_mark))]
pub struct MarkedError {
    /// What was being processed, e.g. `while parsing a block mapping`.
    pub context: Option<&'static str>,
    /// Where the enclosing construct starts.
    pub context_mark: Mark,
    /// What went wrong.
    pub problem: &'static str,
    /// Where it went wrong.
    pub problem_mark: Mark,
}

/// `"{context} at {mark}: "`, or nothing without a context.
struct ContextPrefix<'a>(&'a Option<&'static str>, &'a Mark);

impl fmt::Display for ContextPrefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(context) => write!(f, "{context} at {}: ", self.1),
            None => Ok(()),
        }
    }
}

/// Any failure reported by the parser or the emitter.
///
/// Stream errors (everything except [`Error::Usage`]) are fatal: the instance
/// that reported one keeps returning it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The input could not be read or decoded.
    #[error("{problem} at byte {offset}")]
    Reader {
        /// What went wrong.
        problem: String,
        /// Raw byte offset of the offending input.
        offset: u64,
        /// The offending octet or code point, when there is one.
        value: Option<u32>,
    },
    /// The input could not be split into tokens.
    #[error("{0}")]
    Scanner(MarkedError),
    /// The tokens do not form a valid event stream.
    #[error("{0}")]
    Parser(MarkedError),
    /// The output could not be written.
    #[error("{problem}")]
    Writer {
        /// What went wrong.
        problem: String,
    },
    /// The events do not form a valid stream, or carry invalid data.
    #[error("{problem}")]
    Emitter {
        /// What went wrong.
        problem: &'static str,
    },
    /// The API was used out of protocol.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl Error {
    /// The wire-level category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Reader { .. } => ErrorKind::Reader,
            Error::Scanner(_) => ErrorKind::Scanner,
            Error::Parser(_) => ErrorKind::Parser,
            Error::Writer { .. } => ErrorKind::Writer,
            Error::Emitter { .. } => ErrorKind::Emitter,
            Error::Usage(_) => ErrorKind::None,
        }
    }

    /// The problem position, for errors tied to a position in the input.
    #[must_use]
    pub fn problem_mark(&self) -> Option<Mark> {
        match self {
            Error::Scanner(e) | Error::Parser(e) => Some(e.problem_mark),
            _ => None,
        }
    }

    pub(crate) fn scanner(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    ) -> Self {
        Error::Scanner(MarkedError {
            context: Some(context),
            context_mark,
            problem,
            problem_mark,
        })
    }

    pub(crate) fn parser(problem: &'static str, problem_mark: Mark) -> Self {
        Error::Parser(MarkedError {
            context: None,
            context_mark: Mark::default(),
            problem,
            problem_mark,
        })
    }

    pub(crate) fn parser_in(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    ) -> Self {
        Error::Parser(MarkedError {
            context: Some(context),
            context_mark,
            problem,
            problem_mark,
        })
    }

    pub(crate) fn emitter(problem: &'static str) -> Self {
        Error::Emitter { problem }
    }
}

/// Misuse of the API, as opposed to a problem in the stream.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageError {
    /// A token was requested from an event parser, or the reverse.
    #[error("parser is in {active} mode, {requested} mode calls are not allowed")]
    ModeMismatch {
        /// The mode the parser is locked to.
        active: ParsingMode,
        /// The mode of the rejected call.
        requested: ParsingMode,
    },
    /// The parser already handed out `STREAM-END`.
    #[error("the stream has already ended")]
    Exhausted,
    /// A field was read from, or emission attempted with, an empty event slot.
    #[error("event slot is empty")]
    EmptyEvent,
    /// The event does not carry the requested field.
    #[error("{event_type} event has no {field} field")]
    NoSuchField {
        /// Type of the event that was asked.
        event_type: EventType,
        /// Name of the missing field.
        field: &'static str,
    },
}

/// Invalid arguments to an event constructor.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    /// A node without a tag must be implicit.
    #[error("a node without a tag must have an implicit flag set")]
    MissingTag,
    /// Anchor and alias names must not be empty.
    #[error("anchor must not be empty")]
    EmptyAnchor,
    /// Tags must not be empty.
    #[error("tag must not be empty")]
    EmptyTag,
    /// Scalar values must be valid UTF-8.
    #[error("scalar value is not valid UTF-8")]
    InvalidUtf8,
}
