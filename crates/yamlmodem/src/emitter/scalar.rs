//! Low-level output: indicators, indentation, tags and the five scalar
//! styles.

use alloc::vec::Vec;

use super::{Emitter, OpenEnded};
use crate::{
    chars::{is_alpha, is_blankz, is_bom, is_break, is_printable},
    error::Error,
    io::Sink,
    options::LineBreak,
};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

impl<W: Sink> Emitter<W> {
    pub(super) fn put(&mut self, ch: char) {
        self.writer.push(ch);
        self.column += 1;
    }

    pub(super) fn put_break(&mut self) {
        match self.line_break {
            LineBreak::Cr => self.writer.push('\r'),
            LineBreak::CrLn => self.writer.push_str("\r\n"),
            LineBreak::Ln | LineBreak::Any => self.writer.push('\n'),
        }
        self.column = 0;
    }

    /// Copies a line break from scalar content. `\n` follows the configured
    /// line break style, other breaks are written as they are.
    fn write_break(&mut self, ch: char) {
        if ch == '\n' {
            self.put_break();
        } else {
            self.writer.push(ch);
            self.column = 0;
        }
    }

    fn write_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.put(ch);
        }
    }

    pub(super) fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        is_whitespace: bool,
        is_indention: bool,
    ) {
        if need_whitespace && !self.whitespace {
            self.put(' ');
        }
        self.write_str(indicator);
        self.whitespace = is_whitespace;
        self.indention = self.indention && is_indention;
    }

    pub(super) fn write_indent(&mut self) {
        let indent = self.indent.max(0);
        if !self.indention || self.column > indent || (self.column == indent && !self.whitespace) {
            self.put_break();
        }
        while self.column < indent {
            self.put(' ');
        }
        self.whitespace = true;
        self.indention = true;
    }

    pub(super) fn write_anchor(&mut self, name: &str) {
        self.write_str(name);
        self.whitespace = false;
        self.indention = false;
    }

    pub(super) fn write_tag_handle(&mut self, handle: &str) {
        if !self.whitespace {
            self.put(' ');
        }
        self.write_str(handle);
        self.whitespace = false;
        self.indention = false;
    }

    /// Writes a tag suffix or prefix, percent-encoding what is not a URI
    /// character.
    pub(super) fn write_tag_content(&mut self, value: &str, need_whitespace: bool) {
        if need_whitespace && !self.whitespace {
            self.put(' ');
        }
        for ch in value.chars() {
            if is_alpha(ch)
                || matches!(
                    ch,
                    ';' | '/'
                        | '?'
                        | ':'
                        | '@'
                        | '&'
                        | '='
                        | '+'
                        | '$'
                        | ','
                        | '_'
                        | '.'
                        | '~'
                        | '*'
                        | '\''
                        | '('
                        | ')'
                        | '['
                        | ']'
                )
            {
                self.put(ch);
            } else {
                let mut buf = [0; 4];
                for octet in ch.encode_utf8(&mut buf).bytes() {
                    self.put('%');
                    self.put(char::from(HEX_DIGITS[usize::from(octet >> 4)]));
                    self.put(char::from(HEX_DIGITS[usize::from(octet & 0x0F)]));
                }
            }
        }
        self.whitespace = false;
        self.indention = false;
    }

    pub(super) fn write_plain_scalar(&mut self, value: &str, allow_breaks: bool) {
        // No trailing space after a block key or entry whose value is empty.
        if !self.whitespace && (!value.is_empty() || self.flow_level > 0) {
            self.put(' ');
        }
        let chars: Vec<char> = value.chars().collect();
        let mut spaces = false;
        let mut breaks = false;
        for (i, &ch) in chars.iter().enumerate() {
            let next = chars.get(i + 1).copied().unwrap_or('\0');
            if ch == ' ' {
                if allow_breaks && !spaces && self.column > self.best_width && next != ' ' {
                    self.write_indent();
                } else {
                    self.put(ch);
                }
                spaces = true;
            } else if is_break(ch) {
                if !breaks && ch == '\n' {
                    self.put_break();
                }
                self.write_break(ch);
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent();
                }
                self.put(ch);
                self.indention = false;
                spaces = false;
                breaks = false;
            }
        }
        self.whitespace = false;
        self.indention = false;
        if self.root_context {
            self.open_ended = OpenEnded::Implicit;
        }
    }

    pub(super) fn write_single_quoted(&mut self, value: &str, allow_breaks: bool) {
        self.write_indicator("'", true, false, false);
        let chars: Vec<char> = value.chars().collect();
        let mut spaces = false;
        let mut breaks = false;
        for (i, &ch) in chars.iter().enumerate() {
            let next = chars.get(i + 1).copied().unwrap_or('\0');
            if ch == ' ' {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && i != 0
                    && i != chars.len() - 1
                    && next != ' '
                {
                    self.write_indent();
                } else {
                    self.put(ch);
                }
                spaces = true;
            } else if is_break(ch) {
                if !breaks && ch == '\n' {
                    self.put_break();
                }
                self.write_break(ch);
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent();
                }
                if ch == '\'' {
                    self.put('\'');
                }
                self.put(ch);
                self.indention = false;
                spaces = false;
                breaks = false;
            }
        }
        if breaks {
            self.write_indent();
        }
        self.write_indicator("'", false, false, false);
        self.whitespace = false;
        self.indention = false;
    }

    pub(super) fn write_double_quoted(&mut self, value: &str, allow_breaks: bool) {
        self.write_indicator("\"", true, false, false);
        let chars: Vec<char> = value.chars().collect();
        let mut spaces = false;
        for (i, &ch) in chars.iter().enumerate() {
            if !is_printable(ch)
                || (!self.unicode && !ch.is_ascii())
                || is_bom(ch)
                || is_break(ch)
                || ch == '"'
                || ch == '\\'
            {
                self.write_escape(ch);
                spaces = false;
            } else if ch == ' ' {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && i != 0
                    && i != chars.len() - 1
                {
                    self.write_indent();
                    if chars.get(i + 1) == Some(&' ') {
                        self.put('\\');
                    }
                } else {
                    self.put(ch);
                }
                spaces = true;
            } else {
                self.put(ch);
                spaces = false;
            }
        }
        self.write_indicator("\"", false, false, false);
        self.whitespace = false;
        self.indention = false;
    }

    fn write_escape(&mut self, ch: char) {
        self.put('\\');
        let short = match ch {
            '\0' => Some('0'),
            '\u{07}' => Some('a'),
            '\u{08}' => Some('b'),
            '\t' => Some('t'),
            '\n' => Some('n'),
            '\u{0B}' => Some('v'),
            '\u{0C}' => Some('f'),
            '\r' => Some('r'),
            '\u{1B}' => Some('e'),
            '"' => Some('"'),
            '\\' => Some('\\'),
            '\u{85}' => Some('N'),
            '\u{A0}' => Some('_'),
            '\u{2028}' => Some('L'),
            '\u{2029}' => Some('P'),
            _ => None,
        };
        if let Some(short) = short {
            self.put(short);
            return;
        }
        let code = u32::from(ch);
        let (prefix, digits) = if code <= 0xFF {
            ('x', 2)
        } else if code <= 0xFFFF {
            ('u', 4)
        } else {
            ('U', 8)
        };
        self.put(prefix);
        for shift in (0..digits).rev() {
            let nibble = (code >> (shift * 4)) & 0x0F;
            self.put(char::from(HEX_DIGITS[nibble as usize]));
        }
    }

    /// Writes the indentation and chomping indicators of a block scalar.
    fn write_block_scalar_hints(&mut self, chars: &[char]) {
        if chars.first().is_some_and(|&c| c == ' ' || is_break(c)) {
            let hint = char::from_digit(u32::try_from(self.best_indent).unwrap_or(2), 10)
                .unwrap_or('2');
            let mut buf = [0; 4];
            self.write_indicator(hint.encode_utf8(&mut buf), false, false, false);
        }

        self.open_ended = OpenEnded::Closed;
        let chomp_hint = match chars {
            [] => Some("-"),
            [.., last] if !is_break(*last) => Some("-"),
            [_] => {
                self.open_ended = OpenEnded::Open;
                Some("+")
            }
            [.., before, _] if is_break(*before) => {
                self.open_ended = OpenEnded::Open;
                Some("+")
            }
            _ => None,
        };
        if let Some(hint) = chomp_hint {
            self.write_indicator(hint, false, false, false);
        }
    }

    pub(super) fn write_literal_scalar(&mut self, value: &str) {
        let chars: Vec<char> = value.chars().collect();
        self.write_indicator("|", true, false, false);
        self.write_block_scalar_hints(&chars);
        self.put_break();
        self.indention = true;
        self.whitespace = true;
        let mut breaks = true;
        for &ch in &chars {
            if is_break(ch) {
                self.write_break(ch);
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent();
                }
                self.put(ch);
                self.indention = false;
                breaks = false;
            }
        }
    }

    pub(super) fn write_folded_scalar(&mut self, value: &str) {
        let chars: Vec<char> = value.chars().collect();
        self.write_indicator(">", true, false, false);
        self.write_block_scalar_hints(&chars);
        self.put_break();
        self.indention = true;
        self.whitespace = true;
        let mut breaks = true;
        let mut leading_spaces = true;
        for (i, &ch) in chars.iter().enumerate() {
            let next = chars.get(i + 1).copied().unwrap_or('\0');
            if is_break(ch) {
                if !breaks && !leading_spaces && ch == '\n' {
                    // A single folded break would read back as a space.
                    let k = chars[i..]
                        .iter()
                        .position(|&c| !is_break(c))
                        .map_or(chars.len(), |p| i + p);
                    if !is_blankz(chars.get(k).copied().unwrap_or('\0')) {
                        self.put_break();
                    }
                }
                self.write_break(ch);
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent();
                    leading_spaces = ch == ' ' || ch == '\t';
                }
                if !breaks && ch == ' ' && next != ' ' && self.column > self.best_width {
                    self.write_indent();
                } else {
                    self.put(ch);
                }
                self.indention = false;
                breaks = false;
            }
        }
    }

    pub(super) fn write_bom(&mut self) {
        self.writer.push('\u{FEFF}');
    }

    pub(super) fn flush_writer(&mut self) -> Result<(), Error> {
        self.writer.flush()
    }
}
