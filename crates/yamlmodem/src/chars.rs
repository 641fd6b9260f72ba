//! Character classes shared by the scanner and the emitter.

/// `[0-9A-Za-z_-]`, the characters of anchors, directive names and tag
/// handles.
#[inline]
pub(crate) fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

#[inline]
pub(crate) fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

#[inline]
pub(crate) fn is_break(ch: char) -> bool {
    matches!(ch, '\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[inline]
pub(crate) fn is_breakz(ch: char) -> bool {
    is_break(ch) || ch == '\0'
}

#[inline]
pub(crate) fn is_blankz(ch: char) -> bool {
    is_blank(ch) || is_breakz(ch)
}

#[inline]
pub(crate) fn is_bom(ch: char) -> bool {
    ch == '\u{FEFF}'
}

/// Characters that may appear in a tag URI without escaping.
#[inline]
pub(crate) fn is_uri_char(ch: char, flow_indicators: bool) -> bool {
    is_alpha(ch)
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
                | '.'
                | '%'
                | '!'
                | '~'
                | '*'
                | '\''
                | '('
                | ')'
        )
        || (flow_indicators && matches!(ch, ',' | '[' | ']'))
}

/// Characters the emitter can write unescaped.
#[inline]
pub(crate) fn is_printable(ch: char) -> bool {
    matches!(
        ch,
        '\n' | ' '..='~' | '\u{A0}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    ) && !is_bom(ch)
}

#[inline]
pub(crate) fn hex_value(ch: char) -> u32 {
    ch.to_digit(16).unwrap_or(0)
}
