//! Splits the character stream into tokens.
//!
//! Indentation is turned into explicit `BLOCK-SEQUENCE-START`,
//! `BLOCK-MAPPING-START` and `BLOCK-END` tokens. A node that may turn out to
//! be a mapping key is remembered as a *simple key candidate*; when the `:`
//! shows up, a `KEY` token (and, if needed, a `BLOCK-MAPPING-START`) is
//! inserted back in the queue in front of it. The queue is therefore only
//! handed out while no candidate could still claim its head.

#[cfg(test)]
mod tests;

use alloc::{collections::VecDeque, string::String, vec::Vec};

use crate::{
    chars::{
        hex_value, is_alpha, is_blank, is_blankz, is_bom, is_break, is_breakz, is_uri_char,
    },
    error::{Error, UsageError},
    event::ScalarStyle,
    io::Source,
    mark::Mark,
    options::Encoding,
    reader::Reader,
    token::{Token, TokenData},
};

/// A simple key candidate is dropped once it is this many bytes behind.
const MAX_SIMPLE_KEY_LENGTH: u64 = 1024;

#[derive(Debug, Clone, Copy, Default)]
struct SimpleKey {
    possible: bool,
    required: bool,
    token_number: usize,
    mark: Mark,
}

pub(crate) struct Scanner<S> {
    reader: Reader<S>,
    mark: Mark,
    stream_start_produced: bool,
    stream_end_produced: bool,
    flow_level: usize,
    tokens: VecDeque<Token>,
    /// Tokens handed out so far.
    tokens_parsed: usize,
    token_available: bool,
    indent: i64,
    indents: Vec<i64>,
    simple_key_allowed: bool,
    /// One candidate slot per flow level, plus one for block context.
    simple_keys: Vec<SimpleKey>,
}

impl<S: Source> Scanner<S> {
    pub(crate) fn new(source: S, encoding: Encoding) -> Self {
        Self {
            reader: Reader::new(source, encoding),
            mark: Mark::default(),
            stream_start_produced: false,
            stream_end_produced: false,
            flow_level: 0,
            tokens: VecDeque::new(),
            tokens_parsed: 0,
            token_available: false,
            indent: -1,
            indents: Vec::new(),
            simple_key_allowed: false,
            simple_keys: Vec::new(),
        }
    }

    pub(crate) fn into_inner(self) -> S {
        self.reader.into_inner()
    }

    pub(crate) fn stream_end_produced(&self) -> bool {
        self.stream_end_produced
    }

    /// The next token, left in the queue.
    pub(crate) fn peek(&mut self) -> Result<&mut Token, Error> {
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        self.tokens
            .front_mut()
            .ok_or(Error::Usage(UsageError::Exhausted))
    }

    /// Removes the token returned by the last [`Scanner::peek`].
    pub(crate) fn skip_token(&mut self) -> Option<Token> {
        self.token_available = false;
        self.tokens_parsed += 1;
        let token = self.tokens.pop_front();
        if let Some(Token {
            data: TokenData::StreamEnd,
            ..
        }) = &token
        {
            self.stream_end_produced = true;
        }
        token
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, Error> {
        if self.stream_end_produced {
            return Err(Error::Usage(UsageError::Exhausted));
        }
        self.peek()?;
        self.skip_token()
            .ok_or(Error::Usage(UsageError::Exhausted))
    }

    fn fetch_more_tokens(&mut self) -> Result<(), Error> {
        loop {
            let need_more = if self.tokens.is_empty() {
                true
            } else {
                self.stale_simple_keys()?;
                self.simple_keys
                    .iter()
                    .any(|key| key.possible && key.token_number == self.tokens_parsed)
            };
            if !need_more {
                break;
            }
            self.fetch_next_token()?;
        }
        self.token_available = true;
        Ok(())
    }

    // Character access.

    #[inline]
    fn cache(&mut self, length: usize) -> Result<(), Error> {
        self.reader.ensure(length)
    }

    #[inline]
    fn ch(&self) -> char {
        self.reader.peek(0)
    }

    #[inline]
    fn ch_at(&self, k: usize) -> char {
        self.reader.peek(k)
    }

    #[inline]
    fn column(&self) -> i64 {
        i64::try_from(self.mark.column).unwrap_or(i64::MAX)
    }

    fn skip(&mut self) {
        if let Some(ch) = self.reader.advance() {
            self.mark.index += self.reader.width(ch);
            self.mark.column += 1;
        }
    }

    fn skip_line(&mut self) {
        if self.ch() == '\r' && self.ch_at(1) == '\n' {
            self.advance_break(2);
        } else if is_break(self.ch()) {
            self.advance_break(1);
        }
    }

    fn advance_break(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(ch) = self.reader.advance() {
                self.mark.index += self.reader.width(ch);
            }
        }
        self.mark.column = 0;
        self.mark.line += 1;
    }

    fn read(&mut self, string: &mut String) {
        string.push(self.ch());
        self.skip();
    }

    /// Copies a line break, normalizing CR, LF, CRLF and NEL to `\n`.
    fn read_line(&mut self, string: &mut String) {
        match (self.ch(), self.ch_at(1)) {
            ('\r', '\n') => {
                string.push('\n');
                self.advance_break(2);
            }
            ('\r' | '\n' | '\u{85}', _) => {
                string.push('\n');
                self.advance_break(1);
            }
            (ch @ ('\u{2028}' | '\u{2029}'), _) => {
                string.push(ch);
                self.advance_break(1);
            }
            _ => {}
        }
    }

    fn at_document_indicator(&self) -> Option<TokenData> {
        if self.mark.column != 0 || !is_blankz(self.ch_at(3)) {
            return None;
        }
        match (self.ch(), self.ch_at(1), self.ch_at(2)) {
            ('-', '-', '-') => Some(TokenData::DocumentStart),
            ('.', '.', '.') => Some(TokenData::DocumentEnd),
            _ => None,
        }
    }

    fn push(&mut self, data: TokenData, start_mark: Mark, end_mark: Mark) {
        self.tokens.push_back(Token {
            data,
            start_mark,
            end_mark,
        });
    }

    fn fetch_next_token(&mut self) -> Result<(), Error> {
        self.cache(1)?;
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        self.unroll_indent(self.column());
        self.cache(4)?;

        let ch = self.ch();
        if ch == '\0' {
            return self.fetch_stream_end();
        }
        if self.mark.column == 0 && ch == '%' {
            return self.fetch_directive();
        }
        if let Some(data) = self.at_document_indicator() {
            return self.fetch_document_indicator(data);
        }
        let next = self.ch_at(1);
        match ch {
            '[' => return self.fetch_flow_collection_start(TokenData::FlowSequenceStart),
            '{' => return self.fetch_flow_collection_start(TokenData::FlowMappingStart),
            ']' => return self.fetch_flow_collection_end(TokenData::FlowSequenceEnd),
            '}' => return self.fetch_flow_collection_end(TokenData::FlowMappingEnd),
            ',' => return self.fetch_flow_entry(),
            '-' if is_blankz(next) => return self.fetch_block_entry(),
            '?' if self.flow_level > 0 || is_blankz(next) => return self.fetch_key(),
            ':' if self.flow_level > 0 || is_blankz(next) => return self.fetch_value(),
            '*' => return self.fetch_anchor(true),
            '&' => return self.fetch_anchor(false),
            '!' => return self.fetch_tag(),
            '|' if self.flow_level == 0 => return self.fetch_block_scalar(true),
            '>' if self.flow_level == 0 => return self.fetch_block_scalar(false),
            '\'' => return self.fetch_flow_scalar(true),
            '"' => return self.fetch_flow_scalar(false),
            _ => {}
        }

        let indicator = is_blankz(ch)
            || matches!(
                ch,
                '-' | '?'
                    | ':'
                    | ','
                    | '['
                    | ']'
                    | '{'
                    | '}'
                    | '#'
                    | '&'
                    | '*'
                    | '!'
                    | '|'
                    | '>'
                    | '\''
                    | '"'
                    | '%'
                    | '@'
                    | '`'
            );
        if !indicator
            || (ch == '-' && !is_blank(next))
            || (self.flow_level == 0 && (ch == '?' || ch == ':') && !is_blankz(next))
        {
            return self.fetch_plain_scalar();
        }

        let problem = if ch == '\t' {
            "found a tab character that violates indentation"
        } else {
            "found character that cannot start any token"
        };
        Err(Error::scanner(
            "while scanning for the next token",
            self.mark,
            problem,
            self.mark,
        ))
    }

    /// Drops candidates that can no longer be keys: a simple key fits on one
    /// line and in [`MAX_SIMPLE_KEY_LENGTH`] bytes.
    fn stale_simple_keys(&mut self) -> Result<(), Error> {
        let mark = self.mark;
        for key in &mut self.simple_keys {
            if key.possible
                && (key.mark.line < mark.line || key.mark.index + MAX_SIMPLE_KEY_LENGTH < mark.index)
            {
                if key.required {
                    return Err(Error::scanner(
                        "while scanning a simple key",
                        key.mark,
                        "could not find expected ':'",
                        mark,
                    ));
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> Result<(), Error> {
        // A key at the current block indentation is required to be one.
        let required = self.flow_level == 0 && self.indent == self.column();
        if self.simple_key_allowed {
            let key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };
            self.remove_simple_key()?;
            if let Some(top) = self.simple_keys.last_mut() {
                *top = key;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), Error> {
        if let Some(key) = self.simple_keys.last_mut() {
            if key.possible && key.required {
                return Err(Error::scanner(
                    "while scanning a simple key",
                    key.mark,
                    "could not find expected ':'",
                    self.mark,
                ));
            }
            key.possible = false;
        }
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Opens a block collection if `column` is deeper than the current
    /// indentation. With `number`, the start token goes in front of that
    /// (already queued) token instead of at the back.
    fn roll_indent(&mut self, column: i64, number: Option<usize>, data: TokenData, mark: Mark) {
        if self.flow_level > 0 || self.indent >= column {
            return;
        }
        self.indents.push(self.indent);
        self.indent = column;
        let token = Token {
            data,
            start_mark: mark,
            end_mark: mark,
        };
        match number {
            Some(number) => self.tokens.insert(number - self.tokens_parsed, token),
            None => self.tokens.push_back(token),
        }
    }

    /// Closes every block collection deeper than `column`.
    fn unroll_indent(&mut self, column: i64) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            self.push(TokenData::BlockEnd, self.mark, self.mark);
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    fn fetch_stream_start(&mut self) {
        self.indent = -1;
        self.simple_keys.push(SimpleKey::default());
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        let start_mark = self.mark;
        self.mark.index = self.reader.bom_len();
        let encoding = self.reader.encoding();
        self.push(TokenData::StreamStart { encoding }, start_mark, self.mark);
    }

    fn fetch_stream_end(&mut self) -> Result<(), Error> {
        // Force a new line.
        if self.mark.column != 0 {
            self.mark.column = 0;
            self.mark.line += 1;
        }
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.push(TokenData::StreamEnd, self.mark, self.mark);
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<(), Error> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_directive()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, data: TokenData) -> Result<(), Error> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        self.skip();
        self.skip();
        self.push(data, start_mark, self.mark);
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, data: TokenData) -> Result<(), Error> {
        self.save_simple_key()?;
        self.increase_flow_level();
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.push(data, start_mark, self.mark);
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, data: TokenData) -> Result<(), Error> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;
        let start_mark = self.mark;
        self.skip();
        self.push(data, start_mark, self.mark);
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), Error> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.push(TokenData::FlowEntry, start_mark, self.mark);
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), Error> {
        // In flow context the parser reports the stray `-`, with better
        // context than the scanner has.
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(Error::scanner(
                    "while scanning a block entry",
                    self.mark,
                    "block sequence entries are not allowed in this context",
                    self.mark,
                ));
            }
            self.roll_indent(
                self.column(),
                None,
                TokenData::BlockSequenceStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start_mark = self.mark;
        self.skip();
        self.push(TokenData::BlockEntry, start_mark, self.mark);
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), Error> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(Error::scanner(
                    "while scanning a mapping key",
                    self.mark,
                    "mapping keys are not allowed in this context",
                    self.mark,
                ));
            }
            self.roll_indent(
                self.column(),
                None,
                TokenData::BlockMappingStart,
                self.mark,
            );
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start_mark = self.mark;
        self.skip();
        self.push(TokenData::Key, start_mark, self.mark);
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), Error> {
        let candidate = self.simple_keys.last().copied().unwrap_or_default();
        if candidate.possible {
            self.tokens.insert(
                candidate.token_number - self.tokens_parsed,
                Token {
                    data: TokenData::Key,
                    start_mark: candidate.mark,
                    end_mark: candidate.mark,
                },
            );
            self.roll_indent(
                i64::try_from(candidate.mark.column).unwrap_or(i64::MAX),
                Some(candidate.token_number),
                TokenData::BlockMappingStart,
                candidate.mark,
            );
            if let Some(top) = self.simple_keys.last_mut() {
                top.possible = false;
            }
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(Error::scanner(
                        "while scanning a mapping value",
                        self.mark,
                        "mapping values are not allowed in this context",
                        self.mark,
                    ));
                }
                self.roll_indent(
                    self.column(),
                    None,
                    TokenData::BlockMappingStart,
                    self.mark,
                );
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start_mark = self.mark;
        self.skip();
        self.push(TokenData::Value, start_mark, self.mark);
        Ok(())
    }

    fn fetch_anchor(&mut self, alias: bool) -> Result<(), Error> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_anchor(alias)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), Error> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_tag()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> Result<(), Error> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let token = self.scan_block_scalar(literal)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), Error> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_flow_scalar(single)?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn fetch_plain_scalar(&mut self) -> Result<(), Error> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let token = self.scan_plain_scalar()?;
        self.tokens.push_back(token);
        Ok(())
    }

    fn scan_to_next_token(&mut self) -> Result<(), Error> {
        loop {
            self.cache(1)?;
            if self.mark.column == 0 && is_bom(self.ch()) {
                self.skip();
            }
            self.cache(1)?;
            // Tabs separate tokens anywhere except in block indentation.
            let indentation = self.mark.column == 0;
            while self.ch() == ' '
                || (self.ch() == '\t'
                    && (self.flow_level > 0 || !self.simple_key_allowed || !indentation))
            {
                self.skip();
                self.cache(1)?;
            }
            if self.ch() == '#' {
                while !is_breakz(self.ch()) {
                    self.skip();
                    self.cache(1)?;
                }
            }
            if !is_break(self.ch()) {
                break;
            }
            self.cache(2)?;
            self.skip_line();
            if self.flow_level == 0 {
                self.simple_key_allowed = true;
            }
        }
        Ok(())
    }

    /// Skips blanks and a comment, then expects the end of the line.
    fn skip_line_tail(&mut self, context: &'static str, start_mark: Mark) -> Result<(), Error> {
        self.cache(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.cache(1)?;
        }
        if self.ch() == '#' {
            while !is_breakz(self.ch()) {
                self.skip();
                self.cache(1)?;
            }
        }
        if !is_breakz(self.ch()) {
            return Err(Error::scanner(
                context,
                start_mark,
                "did not find expected comment or line break",
                self.mark,
            ));
        }
        if is_break(self.ch()) {
            self.cache(2)?;
            self.skip_line();
        }
        Ok(())
    }

    fn skip_blanks(&mut self) -> Result<(), Error> {
        self.cache(1)?;
        while is_blank(self.ch()) {
            self.skip();
            self.cache(1)?;
        }
        Ok(())
    }

    fn scan_directive(&mut self) -> Result<Token, Error> {
        let start_mark = self.mark;
        self.skip();
        let name = self.scan_directive_name(start_mark)?;
        let data = match name.as_str() {
            "YAML" => {
                self.skip_blanks()?;
                let major = self.scan_version_directive_number(start_mark)?;
                if self.ch() != '.' {
                    return Err(Error::scanner(
                        "while scanning a %YAML directive",
                        start_mark,
                        "did not find expected digit or '.' character",
                        self.mark,
                    ));
                }
                self.skip();
                let minor = self.scan_version_directive_number(start_mark)?;
                TokenData::VersionDirective { major, minor }
            }
            "TAG" => {
                self.skip_blanks()?;
                let handle = self.scan_tag_handle(true, start_mark)?;
                self.cache(1)?;
                if !is_blank(self.ch()) {
                    return Err(Error::scanner(
                        "while scanning a %TAG directive",
                        start_mark,
                        "did not find expected whitespace",
                        self.mark,
                    ));
                }
                self.skip_blanks()?;
                let prefix = self.scan_tag_uri(true, true, None, start_mark)?;
                self.cache(1)?;
                if !is_blankz(self.ch()) {
                    return Err(Error::scanner(
                        "while scanning a %TAG directive",
                        start_mark,
                        "did not find expected whitespace or line break",
                        self.mark,
                    ));
                }
                TokenData::TagDirective { handle, prefix }
            }
            _ => {
                return Err(Error::scanner(
                    "while scanning a directive",
                    start_mark,
                    "found unknown directive name",
                    self.mark,
                ));
            }
        };
        let end_mark = self.mark;
        self.skip_line_tail("while scanning a directive", start_mark)?;
        Ok(Token {
            data,
            start_mark,
            end_mark,
        })
    }

    fn scan_directive_name(&mut self, start_mark: Mark) -> Result<String, Error> {
        let mut name = String::new();
        self.cache(1)?;
        while is_alpha(self.ch()) {
            self.read(&mut name);
            self.cache(1)?;
        }
        if name.is_empty() {
            return Err(Error::scanner(
                "while scanning a directive",
                start_mark,
                "could not find expected directive name",
                self.mark,
            ));
        }
        if !is_blankz(self.ch()) {
            return Err(Error::scanner(
                "while scanning a directive",
                start_mark,
                "found unexpected non-alphabetical character",
                self.mark,
            ));
        }
        Ok(name)
    }

    fn scan_version_directive_number(&mut self, start_mark: Mark) -> Result<u32, Error> {
        let mut value: u32 = 0;
        let mut length = 0;
        self.cache(1)?;
        while let Some(digit) = self.ch().to_digit(10) {
            length += 1;
            if length > 9 {
                return Err(Error::scanner(
                    "while scanning a %YAML directive",
                    start_mark,
                    "found extremely long version number",
                    self.mark,
                ));
            }
            value = value * 10 + digit;
            self.skip();
            self.cache(1)?;
        }
        if length == 0 {
            return Err(Error::scanner(
                "while scanning a %YAML directive",
                start_mark,
                "did not find expected version number",
                self.mark,
            ));
        }
        Ok(value)
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, Error> {
        let start_mark = self.mark;
        let mut value = String::new();
        self.skip();
        self.cache(1)?;
        while is_alpha(self.ch()) {
            self.read(&mut value);
            self.cache(1)?;
        }
        let end_mark = self.mark;
        // An anchor name must be followed by something that can end a node.
        let terminated = is_blankz(self.ch())
            || matches!(self.ch(), '?' | ':' | ',' | ']' | '}' | '%' | '@' | '`');
        if value.is_empty() || !terminated {
            let context = if alias {
                "while scanning an alias"
            } else {
                "while scanning an anchor"
            };
            return Err(Error::scanner(
                context,
                start_mark,
                "did not find expected alphabetic or numeric character",
                self.mark,
            ));
        }
        let data = if alias {
            TokenData::Alias { value }
        } else {
            TokenData::Anchor { value }
        };
        Ok(Token {
            data,
            start_mark,
            end_mark,
        })
    }

    fn scan_tag(&mut self) -> Result<Token, Error> {
        let start_mark = self.mark;
        self.cache(2)?;
        let (handle, suffix) = if self.ch_at(1) == '<' {
            // Verbatim: `!<uri>`.
            self.skip();
            self.skip();
            let suffix = self.scan_tag_uri(true, false, None, start_mark)?;
            if self.ch() != '>' {
                return Err(Error::scanner(
                    "while scanning a tag",
                    start_mark,
                    "did not find the expected '>'",
                    self.mark,
                ));
            }
            self.skip();
            (String::new(), suffix)
        } else {
            let handle = self.scan_tag_handle(false, start_mark)?;
            if handle.len() > 1 && handle.ends_with('!') {
                // `!handle!suffix`
                let suffix = self.scan_tag_uri(false, false, None, start_mark)?;
                (handle, suffix)
            } else {
                // `!suffix`, where the scanned "handle" is part of the suffix.
                let suffix = self.scan_tag_uri(false, false, Some(&handle), start_mark)?;
                if suffix.is_empty() {
                    // The bare `!` tag.
                    (String::new(), String::from("!"))
                } else {
                    (String::from("!"), suffix)
                }
            }
        };
        self.cache(1)?;
        if !is_blankz(self.ch()) && !(self.flow_level > 0 && self.ch() == ',') {
            return Err(Error::scanner(
                "while scanning a tag",
                start_mark,
                "did not find expected whitespace or line break",
                self.mark,
            ));
        }
        Ok(Token {
            data: TokenData::Tag { handle, suffix },
            start_mark,
            end_mark: self.mark,
        })
    }

    fn scan_tag_handle(&mut self, directive: bool, start_mark: Mark) -> Result<String, Error> {
        let context = if directive {
            "while scanning a tag directive"
        } else {
            "while scanning a tag"
        };
        self.cache(1)?;
        if self.ch() != '!' {
            return Err(Error::scanner(
                context,
                start_mark,
                "did not find expected '!'",
                self.mark,
            ));
        }
        let mut handle = String::new();
        self.read(&mut handle);
        self.cache(1)?;
        while is_alpha(self.ch()) {
            self.read(&mut handle);
            self.cache(1)?;
        }
        if self.ch() == '!' {
            self.read(&mut handle);
        } else if directive && handle != "!" {
            // In a tag token this is the start of a URI; in a directive it
            // is a malformed handle.
            return Err(Error::scanner(
                context,
                start_mark,
                "did not find expected '!'",
                self.mark,
            ));
        }
        Ok(handle)
    }

    /// Scans a tag URI. `head` is a handle-looking prefix already consumed
    /// that belongs to the URI, minus its leading `!`.
    fn scan_tag_uri(
        &mut self,
        flow_indicators: bool,
        directive: bool,
        head: Option<&str>,
        start_mark: Mark,
    ) -> Result<String, Error> {
        let context = if directive {
            "while parsing a %TAG directive"
        } else {
            "while parsing a tag"
        };
        let head = head.unwrap_or("");
        let mut bytes = Vec::new();
        if head.len() > 1 {
            bytes.extend_from_slice(&head.as_bytes()[1..]);
        }
        let mut length = head.len();
        self.cache(1)?;
        while is_uri_char(self.ch(), flow_indicators) {
            if self.ch() == '%' {
                self.scan_uri_escapes(context, start_mark, &mut bytes)?;
            } else {
                let mut buf = [0; 4];
                bytes.extend_from_slice(self.ch().encode_utf8(&mut buf).as_bytes());
                self.skip();
            }
            length += 1;
            self.cache(1)?;
        }
        if length == 0 {
            return Err(Error::scanner(
                context,
                start_mark,
                "did not find expected tag URI",
                self.mark,
            ));
        }
        String::from_utf8(bytes).map_err(|_| {
            Error::scanner(
                context,
                start_mark,
                "found an invalid UTF-8 escape sequence",
                self.mark,
            )
        })
    }

    fn scan_uri_escapes(
        &mut self,
        context: &'static str,
        start_mark: Mark,
        bytes: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let mut width = 0usize;
        loop {
            self.cache(3)?;
            if !(self.ch() == '%'
                && self.ch_at(1).is_ascii_hexdigit()
                && self.ch_at(2).is_ascii_hexdigit())
            {
                return Err(Error::scanner(
                    context,
                    start_mark,
                    "did not find URI escaped octet",
                    self.mark,
                ));
            }
            // Two hex digits always fit in a byte.
            let octet = u8::try_from((hex_value(self.ch_at(1)) << 4) + hex_value(self.ch_at(2)))
                .unwrap_or(0xFF);
            if width == 0 {
                width = match octet {
                    0x00..=0x7F => 1,
                    0xC0..=0xDF => 2,
                    0xE0..=0xEF => 3,
                    0xF0..=0xF7 => 4,
                    _ => {
                        return Err(Error::scanner(
                            context,
                            start_mark,
                            "found an incorrect leading UTF-8 octet",
                            self.mark,
                        ));
                    }
                };
            } else if octet & 0xC0 != 0x80 {
                return Err(Error::scanner(
                    context,
                    start_mark,
                    "found an incorrect trailing UTF-8 octet",
                    self.mark,
                ));
            }
            bytes.push(octet);
            self.skip();
            self.skip();
            self.skip();
            width -= 1;
            if width == 0 {
                return Ok(());
            }
        }
    }

    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, Error> {
        let start_mark = self.mark;
        self.skip();
        self.cache(1)?;

        // Header: chomping (`+`/`-`) and indentation (`1`-`9`) in any order.
        let mut chomping = 0i8;
        let mut increment = 0i64;
        for _ in 0..2 {
            match self.ch() {
                '+' | '-' if chomping == 0 => {
                    chomping = if self.ch() == '+' { 1 } else { -1 };
                    self.skip();
                }
                '0' if increment == 0 => {
                    return Err(Error::scanner(
                        "while scanning a block scalar",
                        start_mark,
                        "found an indentation indicator equal to 0",
                        self.mark,
                    ));
                }
                digit @ '1'..='9' if increment == 0 => {
                    increment = i64::from(hex_value(digit));
                    self.skip();
                }
                _ => break,
            }
            self.cache(1)?;
        }
        self.skip_line_tail("while scanning a block scalar", start_mark)?;

        let mut end_mark = self.mark;
        let mut indent = 0i64;
        if increment > 0 {
            indent = if self.indent >= 0 {
                self.indent + increment
            } else {
                increment
            };
        }

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        self.scan_block_scalar_breaks(&mut indent, &mut trailing_breaks, start_mark, &mut end_mark)?;

        self.cache(1)?;
        let mut leading_blank = false;
        while self.column() == indent && self.ch() != '\0' {
            // At the start of a non-empty line.
            let trailing_blank = is_blank(self.ch());
            if !literal && leading_break.starts_with('\n') && !leading_blank && !trailing_blank {
                // Fold the line break into a space, unless empty lines follow.
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
                leading_break.clear();
            } else {
                string.push_str(&leading_break);
                leading_break.clear();
            }
            string.push_str(&trailing_breaks);
            trailing_breaks.clear();
            leading_blank = is_blank(self.ch());

            while !is_breakz(self.ch()) {
                self.read(&mut string);
                self.cache(1)?;
            }
            self.cache(2)?;
            self.read_line(&mut leading_break);
            self.scan_block_scalar_breaks(
                &mut indent,
                &mut trailing_breaks,
                start_mark,
                &mut end_mark,
            )?;
        }

        if chomping != -1 {
            string.push_str(&leading_break);
        }
        if chomping == 1 {
            string.push_str(&trailing_breaks);
        }

        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style,
            },
            start_mark,
            end_mark,
        })
    }

    /// Eats indentation and empty lines of a block scalar. With `indent`
    /// still 0, settles it from the deepest empty line seen.
    fn scan_block_scalar_breaks(
        &mut self,
        indent: &mut i64,
        breaks: &mut String,
        start_mark: Mark,
        end_mark: &mut Mark,
    ) -> Result<(), Error> {
        let mut max_indent = 0i64;
        *end_mark = self.mark;
        loop {
            self.cache(1)?;
            while (*indent == 0 || self.column() < *indent) && self.ch() == ' ' {
                self.skip();
                self.cache(1)?;
            }
            max_indent = max_indent.max(self.column());
            if (*indent == 0 || self.column() < *indent) && self.ch() == '\t' {
                return Err(Error::scanner(
                    "while scanning a block scalar",
                    start_mark,
                    "found a tab character where an indentation space is expected",
                    self.mark,
                ));
            }
            if !is_break(self.ch()) {
                break;
            }
            self.cache(2)?;
            self.read_line(breaks);
            *end_mark = self.mark;
        }
        if *indent == 0 {
            *indent = max_indent.max(self.indent + 1).max(1);
        }
        Ok(())
    }

    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, Error> {
        let start_mark = self.mark;
        let quote = if single { '\'' } else { '"' };
        self.skip();

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();

        loop {
            self.cache(4)?;
            if self.at_document_indicator().is_some() {
                return Err(Error::scanner(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected document indicator",
                    self.mark,
                ));
            }
            if self.ch() == '\0' {
                return Err(Error::scanner(
                    "while scanning a quoted scalar",
                    start_mark,
                    "found unexpected end of stream",
                    self.mark,
                ));
            }

            self.cache(2)?;
            let mut leading_blanks = false;
            while !is_blankz(self.ch()) {
                let ch = self.ch();
                let next = self.ch_at(1);
                if single && ch == '\'' && next == '\'' {
                    string.push('\'');
                    self.skip();
                    self.skip();
                } else if ch == quote {
                    break;
                } else if !single && ch == '\\' && is_break(next) {
                    // Escaped line break: join without a space.
                    self.cache(3)?;
                    self.skip();
                    self.skip_line();
                    leading_blanks = true;
                    break;
                } else if !single && ch == '\\' {
                    self.scan_escape(start_mark, &mut string)?;
                } else {
                    self.read(&mut string);
                }
                self.cache(2)?;
            }

            self.cache(1)?;
            if self.ch() == quote {
                break;
            }

            // Blanks and line breaks inside the scalar.
            self.cache(1)?;
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read(&mut whitespaces);
                    }
                } else {
                    self.cache(2)?;
                    if leading_blanks {
                        self.read_line(&mut trailing_breaks);
                    } else {
                        whitespaces.clear();
                        self.read_line(&mut leading_break);
                        leading_blanks = true;
                    }
                }
                self.cache(1)?;
            }

            if leading_blanks {
                fold_breaks(&mut string, &mut leading_break, &mut trailing_breaks);
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        self.skip();
        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style,
            },
            start_mark,
            end_mark: self.mark,
        })
    }

    /// Decodes the escape sequence at `\`.
    fn scan_escape(&mut self, start_mark: Mark, string: &mut String) -> Result<(), Error> {
        let code_length = match self.ch_at(1) {
            '0' => {
                string.push('\0');
                0
            }
            'a' => {
                string.push('\x07');
                0
            }
            'b' => {
                string.push('\x08');
                0
            }
            't' | '\t' => {
                string.push('\t');
                0
            }
            'n' => {
                string.push('\n');
                0
            }
            'v' => {
                string.push('\x0B');
                0
            }
            'f' => {
                string.push('\x0C');
                0
            }
            'r' => {
                string.push('\r');
                0
            }
            'e' => {
                string.push('\x1B');
                0
            }
            ch @ (' ' | '"' | '/' | '\'' | '\\') => {
                string.push(ch);
                0
            }
            'N' => {
                string.push('\u{85}');
                0
            }
            '_' => {
                string.push('\u{A0}');
                0
            }
            'L' => {
                string.push('\u{2028}');
                0
            }
            'P' => {
                string.push('\u{2029}');
                0
            }
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => {
                return Err(Error::scanner(
                    "while parsing a quoted scalar",
                    start_mark,
                    "found unknown escape character",
                    self.mark,
                ));
            }
        };
        self.skip();
        self.skip();
        if code_length > 0 {
            self.cache(code_length)?;
            let mut value: u32 = 0;
            for k in 0..code_length {
                let ch = self.ch_at(k);
                if !ch.is_ascii_hexdigit() {
                    return Err(Error::scanner(
                        "while parsing a quoted scalar",
                        start_mark,
                        "did not find expected hexdecimal number",
                        self.mark,
                    ));
                }
                value = (value << 4) + hex_value(ch);
            }
            let Some(ch) = char::from_u32(value) else {
                return Err(Error::scanner(
                    "while parsing a quoted scalar",
                    start_mark,
                    "found invalid Unicode character escape code",
                    self.mark,
                ));
            };
            string.push(ch);
            for _ in 0..code_length {
                self.skip();
            }
        }
        Ok(())
    }

    fn scan_plain_scalar(&mut self) -> Result<Token, Error> {
        let start_mark = self.mark;
        let mut end_mark = self.mark;
        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks = false;
        let indent = self.indent + 1;

        loop {
            self.cache(4)?;
            if self.at_document_indicator().is_some() || self.ch() == '#' {
                break;
            }

            while !is_blankz(self.ch()) {
                let ch = self.ch();
                let next = self.ch_at(1);
                if ch == ':'
                    && (is_blankz(next)
                        || (self.flow_level > 0 && matches!(next, ',' | '[' | ']' | '{' | '}')))
                {
                    break;
                }
                if self.flow_level > 0 && matches!(ch, ',' | '[' | ']' | '{' | '}') {
                    break;
                }

                if leading_blanks || !whitespaces.is_empty() {
                    if leading_blanks {
                        fold_breaks(&mut string, &mut leading_break, &mut trailing_breaks);
                        leading_blanks = false;
                    } else {
                        string.push_str(&whitespaces);
                        whitespaces.clear();
                    }
                }

                self.read(&mut string);
                end_mark = self.mark;
                self.cache(2)?;
            }

            if !(is_blank(self.ch()) || is_break(self.ch())) {
                break;
            }

            self.cache(1)?;
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if leading_blanks && self.column() < indent && self.ch() == '\t' {
                        return Err(Error::scanner(
                            "while scanning a plain scalar",
                            start_mark,
                            "found a tab character that violates indentation",
                            self.mark,
                        ));
                    }
                    if leading_blanks {
                        self.skip();
                    } else {
                        self.read(&mut whitespaces);
                    }
                } else {
                    self.cache(2)?;
                    if leading_blanks {
                        self.read_line(&mut trailing_breaks);
                    } else {
                        whitespaces.clear();
                        self.read_line(&mut leading_break);
                        leading_blanks = true;
                    }
                }
                self.cache(1)?;
            }

            if self.flow_level == 0 && self.column() < indent {
                break;
            }
        }

        // A plain scalar that ended on a new line may be followed by a key.
        if leading_blanks {
            self.simple_key_allowed = true;
        }

        Ok(Token {
            data: TokenData::Scalar {
                value: string,
                style: ScalarStyle::Plain,
            },
            start_mark,
            end_mark,
        })
    }
}

/// Joins the line breaks collected inside a flow or plain scalar: a single
/// `\n` folds to a space, further breaks are kept, other break characters
/// are kept as they are.
fn fold_breaks(string: &mut String, leading_break: &mut String, trailing_breaks: &mut String) {
    if leading_break.starts_with('\n') {
        if trailing_breaks.is_empty() {
            string.push(' ');
        } else {
            string.push_str(trailing_breaks);
            trailing_breaks.clear();
        }
        leading_break.clear();
    } else {
        string.push_str(leading_break);
        string.push_str(trailing_breaks);
        leading_break.clear();
        trailing_breaks.clear();
    }
}

impl<S: Source> Iterator for Scanner<S> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stream_end_produced {
            return None;
        }
        Some(self.next_token())
    }
}
