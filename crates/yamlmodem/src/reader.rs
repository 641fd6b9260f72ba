use alloc::{collections::VecDeque, string::ToString, vec::Vec};

use crate::{
    error::Error,
    io::Source,
    macros::log_debug,
    options::Encoding,
};

const RAW_CHUNK: usize = 16 * 1024;

/// Decodes the raw input into a character lookahead buffer.
///
/// Past the end of input, every lookahead position reads as `'\0'`. A literal
/// NUL in the input is rejected as a control character, so the sentinel is
/// unambiguous.
pub(crate) struct Reader<S> {
    source: S,
    raw: Vec<u8>,
    raw_pos: usize,
    source_eof: bool,
    encoding: Encoding,
    bom_len: u64,
    chars: VecDeque<char>,
    /// Raw bytes decoded so far.
    offset: u64,
}

impl<S: Source> Reader<S> {
    pub(crate) fn new(source: S, encoding: Encoding) -> Self {
        Self {
            source,
            raw: Vec::new(),
            raw_pos: 0,
            source_eof: false,
            encoding,
            bom_len: 0,
            chars: VecDeque::new(),
            offset: 0,
        }
    }

    pub(crate) fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Length of the byte order mark skipped during detection.
    pub(crate) fn bom_len(&self) -> u64 {
        self.bom_len
    }

    pub(crate) fn into_inner(self) -> S {
        self.source
    }

    /// Character at lookahead position `k`, `'\0'` past the end.
    #[inline]
    pub(crate) fn peek(&self, k: usize) -> char {
        self.chars.get(k).copied().unwrap_or('\0')
    }

    /// Removes the first buffered character.
    #[inline]
    pub(crate) fn advance(&mut self) -> Option<char> {
        self.chars.pop_front()
    }

    /// Number of raw bytes `ch` occupied in the input.
    #[inline]
    pub(crate) fn width(&self, ch: char) -> u64 {
        match self.encoding {
            Encoding::Utf16Le | Encoding::Utf16Be => 2 * ch.len_utf16() as u64,
            Encoding::Any | Encoding::Utf8 => ch.len_utf8() as u64,
        }
    }

    /// Makes at least `length` characters available, unless the input ends
    /// first.
    pub(crate) fn ensure(&mut self, length: usize) -> Result<(), Error> {
        if self.chars.len() >= length {
            return Ok(());
        }
        if self.encoding == Encoding::Any {
            self.determine_encoding()?;
        }
        while self.chars.len() < length {
            match self.decode()? {
                Some(ch) => self.chars.push_back(ch),
                None => break,
            }
        }
        Ok(())
    }

    fn available(&self) -> &[u8] {
        &self.raw[self.raw_pos..]
    }

    fn fill(&mut self) -> Result<(), Error> {
        if self.source_eof {
            return Ok(());
        }
        if self.raw_pos > 0 {
            self.raw.drain(..self.raw_pos);
            self.raw_pos = 0;
        }
        let len = self.raw.len();
        self.raw.resize(len + RAW_CHUNK, 0);
        let read = self.source.read(&mut self.raw[len..]);
        match read {
            Ok(n) => {
                self.raw.truncate(len + n);
                if n == 0 {
                    self.source_eof = true;
                }
                Ok(())
            }
            Err(e) => {
                self.raw.truncate(len);
                Err(Error::Reader {
                    problem: e.message().to_string(),
                    offset: self.offset,
                    value: None,
                })
            }
        }
    }

    fn determine_encoding(&mut self) -> Result<(), Error> {
        while !self.source_eof && self.available().len() < 3 {
            self.fill()?;
        }
        let raw = self.available();
        let (encoding, bom) = if raw.starts_with(&[0xFF, 0xFE]) {
            (Encoding::Utf16Le, 2)
        } else if raw.starts_with(&[0xFE, 0xFF]) {
            (Encoding::Utf16Be, 2)
        } else if raw.starts_with(&[0xEF, 0xBB, 0xBF]) {
            (Encoding::Utf8, 3)
        } else {
            (Encoding::Utf8, 0)
        };
        log_debug!("detected input encoding {encoding:?}, bom of {bom} bytes");
        self.encoding = encoding;
        self.raw_pos += bom;
        self.bom_len = bom as u64;
        self.offset += bom as u64;
        Ok(())
    }

    fn error(&self, problem: &'static str, value: Option<u32>) -> Error {
        Error::Reader {
            problem: problem.to_string(),
            offset: self.offset,
            value,
        }
    }

    /// Decodes one character, or returns `None` at the end of input.
    fn decode(&mut self) -> Result<Option<char>, Error> {
        loop {
            let avail = self.available();
            if avail.is_empty() {
                if self.source_eof {
                    return Ok(None);
                }
                self.fill()?;
                continue;
            }
            let decoded = match self.encoding {
                Encoding::Utf16Le | Encoding::Utf16Be => self.decode_utf16()?,
                Encoding::Any | Encoding::Utf8 => self.decode_utf8()?,
            };
            let Some((value, width)) = decoded else {
                // Incomplete sequence with more input to come.
                self.fill()?;
                continue;
            };
            let allowed = matches!(
                value,
                0x09 | 0x0A | 0x0D | 0x20..=0x7E | 0x85 | 0xA0..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF
            );
            if !allowed {
                return Err(self.error("control characters are not allowed", Some(value)));
            }
            let ch = char::from_u32(value)
                .ok_or_else(|| self.error("invalid Unicode character", Some(value)))?;
            self.raw_pos += width;
            self.offset += width as u64;
            return Ok(Some(ch));
        }
    }

    /// Returns `None` if the sequence is cut short and more input may follow.
    fn decode_utf8(&self) -> Result<Option<(u32, usize)>, Error> {
        let raw = self.available();
        let octet = raw[0];
        let width = match octet {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(self.error("invalid leading UTF-8 octet", Some(u32::from(octet)))),
        };
        if raw.len() < width {
            if self.source_eof {
                return Err(self.error("incomplete UTF-8 octet sequence", None));
            }
            return Ok(None);
        }
        let mut value = match width {
            1 => u32::from(octet & 0x7F),
            2 => u32::from(octet & 0x1F),
            3 => u32::from(octet & 0x0F),
            _ => u32::from(octet & 0x07),
        };
        for &trailing in &raw[1..width] {
            if trailing & 0xC0 != 0x80 {
                return Err(self.error("invalid trailing UTF-8 octet", Some(u32::from(trailing))));
            }
            value = (value << 6) + u32::from(trailing & 0x3F);
        }
        let shortest = match value {
            0..=0x7F => 1,
            0x80..=0x7FF => 2,
            0x800..=0xFFFF => 3,
            _ => 4,
        };
        if shortest != width {
            return Err(self.error("invalid length of a UTF-8 sequence", None));
        }
        if (0xD800..=0xDFFF).contains(&value) || value > 0x10_FFFF {
            return Err(self.error("invalid Unicode character", Some(value)));
        }
        Ok(Some((value, width)))
    }

    fn decode_utf16(&self) -> Result<Option<(u32, usize)>, Error> {
        let raw = self.available();
        let unit = |at: usize| -> u32 {
            let (lo, hi) = if self.encoding == Encoding::Utf16Le {
                (raw[at], raw[at + 1])
            } else {
                (raw[at + 1], raw[at])
            };
            u32::from(lo) | (u32::from(hi) << 8)
        };
        if raw.len() < 2 {
            if self.source_eof {
                return Err(self.error("incomplete UTF-16 character", None));
            }
            return Ok(None);
        }
        let value = unit(0);
        if (0xDC00..=0xDFFF).contains(&value) {
            return Err(self.error("unexpected low surrogate area", Some(value)));
        }
        if !(0xD800..=0xDBFF).contains(&value) {
            return Ok(Some((value, 2)));
        }
        if raw.len() < 4 {
            if self.source_eof {
                return Err(self.error("incomplete UTF-16 surrogate pair", None));
            }
            return Ok(None);
        }
        let low = unit(2);
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(self.error("expected low surrogate area", Some(low)));
        }
        Ok(Some((0x1_0000 + ((value & 0x3FF) << 10) + (low & 0x3FF), 4)))
    }
}
