//! Byte source and sink seams.
//!
//! With the `std` feature every [`std::io::Read`] is a [`Source`] and every
//! [`std::io::Write`] is a [`Sink`]. Without it, byte slices and `Vec<u8>`
//! fill the two roles.

use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use thiserror::Error;

/// An I/O failure reported by a [`Source`] or a [`Sink`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct IoError {
    message: String,
}

impl IoError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        use alloc::string::ToString;
        Self::new(err.to_string())
    }
}

/// Where the parser pulls its bytes from.
pub trait Source {
    /// Reads up to `buf.len()` bytes into `buf`, returning how many were
    /// read. `Ok(0)` means end of input.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying input.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError>;
}

/// Where the emitter pushes its bytes to.
pub trait Sink {
    /// Writes all of `buf`.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying output.
    fn write_all(&mut self, buf: &[u8]) -> Result<(), IoError>;

    /// Flushes buffered output, if the sink buffers.
    ///
    /// # Errors
    ///
    /// Any failure of the underlying output.
    fn flush(&mut self) -> Result<(), IoError> {
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read + ?Sized> Source for R {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        loop {
            match std::io::Read::read(self, buf) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                other => return other.map_err(IoError::from),
            }
        }
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write + ?Sized> Sink for W {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), IoError> {
        std::io::Write::write_all(self, buf).map_err(IoError::from)
    }

    fn flush(&mut self) -> Result<(), IoError> {
        std::io::Write::flush(self).map_err(IoError::from)
    }
}

#[cfg(not(feature = "std"))]
impl Source for &[u8] {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

#[cfg(not(feature = "std"))]
impl Sink for Vec<u8> {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), IoError> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

#[cfg(not(feature = "std"))]
impl<T: Sink + ?Sized> Sink for &mut T {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), IoError> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> Result<(), IoError> {
        (**self).flush()
    }
}
