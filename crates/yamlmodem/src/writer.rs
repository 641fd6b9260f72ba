//! Output buffering and encoding for the emitter.

use alloc::{string::String, vec::Vec};

use crate::{
    error::Error,
    io::{IoError, Sink},
    macros::log_trace,
    options::Encoding,
};

/// Text is handed to the sink once this many bytes are buffered.
const FLUSH_THRESHOLD: usize = 16 * 1024;

pub(crate) struct Writer<W> {
    sink: W,
    buffer: String,
    encoding: Encoding,
    scratch: Vec<u8>,
}

impl<W: Sink> Writer<W> {
    pub(crate) fn new(sink: W) -> Self {
        Self {
            sink,
            buffer: String::new(),
            encoding: Encoding::Utf8,
            scratch: Vec::new(),
        }
    }

    pub(crate) fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = match encoding {
            Encoding::Any => Encoding::Utf8,
            other => other,
        };
    }

    pub(crate) fn into_inner(self) -> W {
        self.sink
    }

    #[inline]
    pub(crate) fn push(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    #[inline]
    pub(crate) fn push_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Flushes when the buffer has grown past the threshold.
    pub(crate) fn maybe_flush(&mut self) -> Result<(), Error> {
        if self.buffer.len() >= FLUSH_THRESHOLD {
            self.write_out()?;
        }
        Ok(())
    }

    /// Writes out everything buffered and flushes the sink.
    pub(crate) fn flush(&mut self) -> Result<(), Error> {
        self.write_out()?;
        self.sink.flush().map_err(writer_error)
    }

    fn write_out(&mut self) -> Result<(), Error> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        log_trace!(
            "writing {} buffered bytes as {:?}",
            self.buffer.len(),
            self.encoding
        );
        let bytes = match self.encoding {
            Encoding::Utf16Le | Encoding::Utf16Be => {
                let little_endian = self.encoding == Encoding::Utf16Le;
                self.scratch.clear();
                for unit in self.buffer.encode_utf16() {
                    let pair = if little_endian {
                        unit.to_le_bytes()
                    } else {
                        unit.to_be_bytes()
                    };
                    self.scratch.extend_from_slice(&pair);
                }
                self.scratch.as_slice()
            }
            Encoding::Utf8 | Encoding::Any => self.buffer.as_bytes(),
        };
        self.sink.write_all(bytes).map_err(writer_error)?;
        self.buffer.clear();
        Ok(())
    }
}

fn writer_error(err: IoError) -> Error {
    Error::Writer {
        problem: String::from(err.message()),
    }
}
