//! A streaming, pull-based YAML 1.1 parser and emitter.
//!
//! [`Parser`] turns a byte stream into [`Event`]s (or raw [`Token`]s), one
//! call at a time. [`Emitter`] takes events back and writes YAML text. The
//! two halves are independent; feeding a parser's events straight into an
//! emitter reformats a document.
//!
//! ```
//! use yamlmodem::{Emitter, Parser};
//!
//! let mut emitter = Emitter::new(Vec::new());
//! for event in Parser::new(b"{a: 1, b: [x, y]}".as_slice()) {
//!     emitter.emit(event?)?;
//! }
//! assert_eq!(emitter.into_inner(), b"{a: 1, b: [x, y]}\n");
//! # Ok::<(), yamlmodem::Error>(())
//! ```
//!
//! The crate is `no_std` with `alloc`. The default `std` feature lets any
//! `std::io::Read` be a [`Source`] and any `std::io::Write` a [`Sink`].

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod macros;

mod chars;
mod error;
mod event;
mod io;
mod mark;
mod numbers;
mod options;
mod reader;
mod token;
mod writer;

mod emitter;
mod parser;
mod scanner;

#[cfg(test)]
mod tests;

pub use emitter::Emitter;
pub use error::{Error, ErrorKind, EventError, MarkedError, UsageError};
pub use event::{
    Event, EventData, EventSlot, EventType, MappingStyle, NodeStyle, ScalarStyle, SequenceStyle,
    TagDirective, VersionDirective,
};
pub use io::{IoError, Sink, Source};
pub use mark::Mark;
pub use numbers::{Complex, ScalarText};
pub use options::{EmitterOptions, Encoding, LineBreak, ParserOptions, ParsingMode};
pub use parser::{Parser, Tokens};
pub use token::{Token, TokenData};
