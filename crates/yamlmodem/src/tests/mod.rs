mod parse_good;

use alloc::{string::String, vec::Vec};
use bstr::ByteSlice as _;
use core::fmt::Write as _;

use crate::{
    Emitter, EmitterOptions, Error, Event, EventData, MappingStyle, Parser, ScalarStyle,
    SequenceStyle,
};

/// One line per event, in the notation of the YAML test suite.
pub(crate) fn event_line(event: &Event) -> String {
    let mut line = String::new();
    match &event.data {
        EventData::StreamStart { .. } => line.push_str("+STR"),
        EventData::StreamEnd => line.push_str("-STR"),
        EventData::DocumentStart { implicit, .. } => {
            line.push_str("+DOC");
            if !implicit {
                line.push_str(" ---");
            }
        }
        EventData::DocumentEnd { implicit } => {
            line.push_str("-DOC");
            if !implicit {
                line.push_str(" ...");
            }
        }
        EventData::Alias { anchor } => {
            let _ = write!(line, "=ALI *{anchor}");
        }
        EventData::Scalar {
            anchor,
            tag,
            value,
            style,
            ..
        } => {
            line.push_str("=VAL");
            properties(&mut line, anchor.as_deref(), tag.as_deref());
            line.push(' ');
            line.push(match style {
                ScalarStyle::SingleQuoted => '\'',
                ScalarStyle::DoubleQuoted => '"',
                ScalarStyle::Literal => '|',
                ScalarStyle::Folded => '>',
                ScalarStyle::Plain | ScalarStyle::Any => ':',
            });
            for ch in value.to_str_lossy().chars() {
                match ch {
                    '\\' => line.push_str("\\\\"),
                    '\n' => line.push_str("\\n"),
                    '\t' => line.push_str("\\t"),
                    '\r' => line.push_str("\\r"),
                    _ => line.push(ch),
                }
            }
        }
        EventData::SequenceStart {
            anchor, tag, style, ..
        } => {
            line.push_str("+SEQ");
            if *style == SequenceStyle::Flow {
                line.push_str(" []");
            }
            properties(&mut line, anchor.as_deref(), tag.as_deref());
        }
        EventData::SequenceEnd => line.push_str("-SEQ"),
        EventData::MappingStart {
            anchor, tag, style, ..
        } => {
            line.push_str("+MAP");
            if *style == MappingStyle::Flow {
                line.push_str(" {}");
            }
            properties(&mut line, anchor.as_deref(), tag.as_deref());
        }
        EventData::MappingEnd => line.push_str("-MAP"),
    }
    line
}

fn properties(line: &mut String, anchor: Option<&str>, tag: Option<&str>) {
    if let Some(anchor) = anchor {
        let _ = write!(line, " &{anchor}");
    }
    if let Some(tag) = tag {
        let _ = write!(line, " <{tag}>");
    }
}

/// Parses `input` to the end and renders the events, one per line.
pub(crate) fn parse_to_lines(input: &str) -> Result<String, Error> {
    let mut out = String::new();
    for event in Parser::new(input.as_bytes()) {
        out.push_str(&event_line(&event?));
        out.push('\n');
    }
    Ok(out)
}

pub(crate) fn parse_all(input: &[u8]) -> Result<Vec<Event>, Error> {
    Parser::new(input).collect()
}

/// Emits `events` into a byte buffer.
pub(crate) fn emit_all(
    events: impl IntoIterator<Item = Event>,
    options: EmitterOptions,
) -> Result<Vec<u8>, Error> {
    let mut emitter = Emitter::with_options(Vec::new(), options);
    for event in events {
        emitter.emit(event)?;
    }
    Ok(emitter.into_inner())
}

/// Emits `events` with default options and returns the text.
pub(crate) fn emit_text(events: impl IntoIterator<Item = Event>) -> Result<String, Error> {
    let bytes = emit_all(events, EmitterOptions::default())?;
    Ok(String::from_utf8(bytes).unwrap())
}
