use alloc::{
    format,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use bstr::BString;
use rstest::rstest;

use super::*;
use crate::{
    event::VersionDirective,
    io::IoError,
    mark::Mark,
};

fn scalar(value: &str) -> Event {
    Event::scalar(None, None, value, true, true, ScalarStyle::Any).unwrap()
}

fn styled(value: &str, style: ScalarStyle) -> Event {
    Event::scalar(None, None, value, true, true, style).unwrap()
}

fn block_map() -> Event {
    Event::mapping_start(None, None, true, MappingStyle::Block).unwrap()
}

fn block_seq() -> Event {
    Event::sequence_start(None, None, true, SequenceStyle::Block).unwrap()
}

fn flow_seq() -> Event {
    Event::sequence_start(None, None, true, SequenceStyle::Flow).unwrap()
}

fn document(body: Vec<Event>) -> Vec<Event> {
    let mut events = vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(None, Vec::new(), true),
    ];
    events.extend(body);
    events.push(Event::document_end(true));
    events.push(Event::stream_end());
    events
}

fn emit_bytes(events: Vec<Event>, options: EmitterOptions) -> Vec<u8> {
    let mut emitter = Emitter::with_options(Vec::new(), options);
    emitter.emit_all(events).unwrap();
    emitter.into_inner()
}

fn emit_with(events: Vec<Event>, options: EmitterOptions) -> String {
    String::from_utf8(emit_bytes(events, options)).unwrap()
}

fn emit(events: Vec<Event>) -> String {
    emit_with(events, EmitterOptions::default())
}

fn emit_err(events: Vec<Event>) -> Error {
    let mut emitter = Emitter::new(Vec::new());
    emitter.emit_all(events).unwrap_err()
}

#[test]
fn flow_sequence() {
    let out = emit(document(vec![
        flow_seq(),
        scalar("a"),
        scalar("b"),
        Event::sequence_end(),
    ]));
    assert_eq!(out, "[a, b]\n");
}

#[test]
fn block_mapping() {
    let out = emit(document(vec![
        block_map(),
        scalar("key"),
        scalar("value"),
        Event::mapping_end(),
    ]));
    assert_eq!(out, "key: value\n");
}

#[test]
fn block_sequence() {
    let out = emit(document(vec![
        block_seq(),
        scalar("1"),
        scalar("2"),
        Event::sequence_end(),
    ]));
    assert_eq!(out, "- 1\n- 2\n");
}

#[test]
fn sequence_in_mapping_is_indentless() {
    let out = emit(document(vec![
        block_map(),
        scalar("seq"),
        block_seq(),
        scalar("a"),
        scalar("b"),
        Event::sequence_end(),
        Event::mapping_end(),
    ]));
    assert_eq!(out, "seq:\n- a\n- b\n");
}

#[test]
fn nested_mappings_are_indented() {
    let out = emit(document(vec![
        block_map(),
        scalar("outer"),
        block_map(),
        scalar("inner"),
        scalar("x"),
        Event::mapping_end(),
        Event::mapping_end(),
    ]));
    assert_eq!(out, "outer:\n  inner: x\n");
}

#[test]
fn mapping_in_sequence_starts_on_the_dash_line() {
    let out = emit(document(vec![
        block_seq(),
        block_map(),
        scalar("a"),
        scalar("1"),
        scalar("b"),
        scalar("2"),
        Event::mapping_end(),
        Event::sequence_end(),
    ]));
    assert_eq!(out, "- a: 1\n  b: 2\n");
}

#[test]
fn empty_collections_are_written_in_flow_style() {
    let out = emit(document(vec![
        block_map(),
        scalar("a"),
        block_seq(),
        Event::sequence_end(),
        scalar("b"),
        block_map(),
        Event::mapping_end(),
        Event::mapping_end(),
    ]));
    assert_eq!(out, "a: []\nb: {}\n");
}

#[rstest]
#[case::plain("plain", ScalarStyle::Plain, "plain\n")]
#[case::single("a'b", ScalarStyle::SingleQuoted, "'a''b'\n")]
#[case::double_escapes("a\tb", ScalarStyle::DoubleQuoted, "\"a\\tb\"\n")]
#[case::needs_quotes("- x", ScalarStyle::Plain, "'- x'\n")]
#[case::comment_like("a #b", ScalarStyle::Any, "'a #b'\n")]
#[case::leading_space(" x", ScalarStyle::Plain, "' x'\n")]
#[case::non_ascii("\u{e9}", ScalarStyle::Plain, "\"\\xE9\"\n")]
#[case::control("\u{1}", ScalarStyle::SingleQuoted, "\"\\x01\"\n")]
#[case::four_digit_escape("\u{3b1}", ScalarStyle::Plain, "\"\\u03B1\"\n")]
#[case::eight_digit_escape("\u{1f600}", ScalarStyle::Plain, "\"\\U0001F600\"\n")]
#[case::line_separator("\u{2028}", ScalarStyle::Plain, "\"\\L\"\n")]
fn scalar_styles(#[case] value: &str, #[case] style: ScalarStyle, #[case] expected: &str) {
    assert_eq!(emit(document(vec![styled(value, style)])), expected);
}

#[test]
fn unicode_output_keeps_printable_characters() {
    let out = emit_with(
        document(vec![scalar("caf\u{e9}")]),
        EmitterOptions {
            unicode: true,
            ..Default::default()
        },
    );
    assert_eq!(out, "caf\u{e9}\n");
}

#[test]
fn quoted_scalar_that_is_not_quoted_implicit_gets_a_tag() {
    let event = Event::scalar(None, None, "- x", true, false, ScalarStyle::Plain).unwrap();
    assert_eq!(emit(document(vec![event])), "! '- x'\n");
}

#[test]
fn literal_block_scalar() {
    let out = emit(document(vec![
        block_map(),
        scalar("text"),
        styled("line1\nline2\n", ScalarStyle::Literal),
        Event::mapping_end(),
    ]));
    assert_eq!(out, "text: |\n  line1\n  line2\n");
}

#[test]
fn literal_without_trailing_break_strips() {
    let out = emit(document(vec![styled("a", ScalarStyle::Literal)]));
    assert_eq!(out, "|-\n  a\n");
}

#[test]
fn kept_trailing_breaks_close_the_stream() {
    let out = emit(document(vec![styled("a\n\n", ScalarStyle::Literal)]));
    assert_eq!(out, "|+\n  a\n\n...\n");
}

#[test]
fn block_styles_fall_back_to_double_quotes_in_flow() {
    let out = emit(document(vec![
        flow_seq(),
        styled("a", ScalarStyle::Folded),
        Event::sequence_end(),
    ]));
    assert_eq!(out, "[\"a\"]\n");
}

#[test]
fn long_plain_scalars_fold_at_the_width() {
    let out = emit_with(
        document(vec![scalar("aaaa bbbb cccc dddd eeee ffff")]),
        EmitterOptions {
            width: 20,
            ..Default::default()
        },
    );
    assert_eq!(out, "aaaa bbbb cccc dddd eeee\n  ffff\n");
}

#[test]
fn long_keys_use_the_explicit_indicator() {
    let key = "k".repeat(200);
    let out = emit(document(vec![
        block_map(),
        scalar(&key),
        scalar("v"),
        Event::mapping_end(),
    ]));
    assert_eq!(out, format!("? {key}\n: v\n"));
}

#[test]
fn multi_line_keys_use_the_explicit_indicator() {
    let out = emit(document(vec![
        block_map(),
        scalar("a\nb"),
        scalar("v"),
        Event::mapping_end(),
    ]));
    assert_eq!(out, "? 'a\n\n  b'\n: v\n");
}

#[test]
fn anchors_and_aliases() {
    let out = emit(document(vec![
        block_seq(),
        Event::scalar(Some("a"), None, "x", true, true, ScalarStyle::Any).unwrap(),
        Event::alias("a").unwrap(),
        Event::sequence_end(),
    ]));
    assert_eq!(out, "- &a x\n- *a\n");
}

#[test]
fn alias_as_a_simple_key_is_followed_by_a_space() {
    let out = emit(document(vec![
        block_map(),
        Event::alias("a").unwrap(),
        scalar("b"),
        Event::mapping_end(),
    ]));
    assert_eq!(out, "*a : b\n");
}

#[test]
fn directives_and_shortened_tags() {
    let events = vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(
            Some(VersionDirective { major: 1, minor: 1 }),
            vec![TagDirective::new("!e!", "tag:e.com:")],
            true,
        ),
        Event::scalar(None, Some("tag:e.com:foo"), "x", false, false, ScalarStyle::Any).unwrap(),
        Event::document_end(true),
        Event::stream_end(),
    ];
    assert_eq!(emit(events), "%YAML 1.1\n%TAG !e! tag:e.com:\n--- !e!foo x\n");
}

#[rstest]
#[case::core("tag:yaml.org,2002:str", "!!str x\n")]
#[case::local("!local", "!local x\n")]
#[case::verbatim("tag:other.org:t", "!<tag:other.org:t> x\n")]
#[case::escaped("!a b", "!a%20b x\n")]
fn tag_shorthands(#[case] tag: &str, #[case] expected: &str) {
    let event = Event::scalar(None, Some(tag), "x", false, false, ScalarStyle::Any).unwrap();
    assert_eq!(emit(document(vec![event])), expected);
}

#[test]
fn later_documents_are_explicit() {
    let events = vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(None, Vec::new(), true),
        scalar("a"),
        Event::document_end(true),
        Event::document_start(None, Vec::new(), true),
        scalar("b"),
        Event::document_end(false),
        Event::stream_end(),
    ];
    assert_eq!(emit(events), "a\n--- b\n...\n");
}

#[test]
fn empty_document_keeps_its_marker() {
    assert_eq!(emit(document(vec![scalar("")])), "---\n");
}

#[test]
fn canonical_output() {
    let out = emit_with(
        document(vec![
            block_map(),
            scalar("a"),
            scalar("b"),
            Event::mapping_end(),
        ]),
        EmitterOptions {
            canonical: true,
            ..Default::default()
        },
    );
    assert_eq!(out, "---\n{\n  ? \"a\"\n  : \"b\",\n}\n");
}

#[test]
fn utf16_output_starts_with_a_bom() {
    let out = emit_bytes(
        document(vec![scalar("a")]),
        EmitterOptions {
            encoding: Encoding::Utf16Le,
            ..Default::default()
        },
    );
    assert_eq!(out, vec![0xFF, 0xFE, b'a', 0x00, b'\n', 0x00]);
}

#[test]
fn stream_start_encoding_applies_when_unset() {
    let mut events = document(vec![scalar("a")]);
    events[0] = Event::stream_start(Encoding::Utf16Be);
    let out = emit_bytes(events, EmitterOptions::default());
    assert_eq!(out, vec![0xFE, 0xFF, 0x00, b'a', 0x00, b'\n']);
}

#[rstest]
#[case(LineBreak::Any, "- 1\n- 2\n")]
#[case(LineBreak::Ln, "- 1\n- 2\n")]
#[case(LineBreak::Cr, "- 1\r- 2\r")]
#[case(LineBreak::CrLn, "- 1\r\n- 2\r\n")]
fn line_breaks(#[case] line_break: LineBreak, #[case] expected: &str) {
    let out = emit_with(
        document(vec![block_seq(), scalar("1"), scalar("2"), Event::sequence_end()]),
        EmitterOptions {
            line_break,
            ..Default::default()
        },
    );
    assert_eq!(out, expected);
}

#[test]
fn indent_option() {
    let out = emit_with(
        document(vec![
            block_map(),
            scalar("a"),
            block_map(),
            scalar("b"),
            scalar("c"),
            Event::mapping_end(),
            Event::mapping_end(),
        ]),
        EmitterOptions {
            indent: 4,
            ..Default::default()
        },
    );
    assert_eq!(out, "a:\n    b: c\n");
}

#[rstest]
#[case::not_stream_start(vec![scalar("a")], "expected STREAM-START")]
#[case::not_document_start(
    vec![Event::stream_start(Encoding::Utf8), scalar("a")],
    "expected DOCUMENT-START or STREAM-END"
)]
#[case::not_document_end(
    vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(None, Vec::new(), true),
        scalar("a"),
        scalar("b"),
    ],
    "expected DOCUMENT-END"
)]
#[case::not_a_node(
    vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(None, Vec::new(), true),
        Event::document_end(true),
    ],
    "expected SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS"
)]
#[case::after_stream_end(
    vec![Event::stream_start(Encoding::Utf8), Event::stream_end(), scalar("a")],
    "expected nothing"
)]
#[case::bad_anchor(
    document(vec![Event::scalar(Some("a b"), None, "x", true, true, ScalarStyle::Any).unwrap()]),
    "anchor value must contain alphanumerical characters only"
)]
#[case::bad_version(
    vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(Some(VersionDirective { major: 2, minor: 0 }), Vec::new(), false),
        scalar("a"),
    ],
    "incompatible %YAML directive"
)]
#[case::duplicate_tag_directive(
    vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(
            None,
            vec![TagDirective::new("!e!", "a:"), TagDirective::new("!e!", "b:")],
            false,
        ),
        scalar("a"),
    ],
    "duplicate %TAG directive"
)]
#[case::bad_tag_handle(
    vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(None, vec![TagDirective::new("e!", "a:")], false),
        scalar("a"),
    ],
    "tag handle must start with '!'"
)]
fn emitter_errors(#[case] events: Vec<Event>, #[case] problem: &str) {
    let err = emit_err(events);
    assert_eq!(err.kind(), crate::ErrorKind::Emitter);
    assert_eq!(err.to_string(), problem);
}

fn raw_scalar(tag: Option<&str>, value: BString, plain_implicit: bool) -> Event {
    Event {
        data: EventData::Scalar {
            anchor: None,
            tag: tag.map(ToString::to_string),
            value,
            plain_implicit,
            quoted_implicit: false,
            style: ScalarStyle::Any,
        },
        start_mark: Mark::default(),
        end_mark: Mark::default(),
    }
}

#[test]
fn hand_built_events_are_still_checked() {
    let err = emit_err(document(vec![raw_scalar(None, "x".into(), false)]));
    assert_eq!(
        err,
        Error::emitter("neither tag nor implicit flags are specified")
    );

    let err = emit_err(document(vec![raw_scalar(None, BString::from(vec![0xFF]), true)]));
    assert_eq!(err, Error::emitter("scalar value must be valid UTF-8"));
}

#[test]
fn errors_are_sticky() {
    let mut emitter = Emitter::new(Vec::new());
    let err = emitter.emit(scalar("a")).unwrap_err();
    assert_eq!(emitter.emit(Event::stream_start(Encoding::Utf8)), Err(err.clone()));
    assert_eq!(emitter.emit(scalar("b")), Err(err));
}

#[test]
fn collection_start_waits_for_look_ahead() {
    let mut emitter = Emitter::new(Vec::new());
    emitter.emit(Event::stream_start(Encoding::Utf8)).unwrap();
    emitter.emit(Event::document_start(None, Vec::new(), true)).unwrap();
    emitter.emit(block_seq()).unwrap();
    emitter.flush().unwrap();
    assert_eq!(emitter.events.len(), 1);
    emitter.emit(Event::sequence_end()).unwrap();
    emitter.flush().unwrap();
    assert!(emitter.events.is_empty());
    assert_eq!(emitter.into_inner(), b"[]");
}

#[test]
fn flush_hands_over_a_partial_document() {
    let mut emitter = Emitter::new(Vec::new());
    emitter
        .emit_all([
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, Vec::new(), true),
            scalar("a"),
        ])
        .unwrap();
    emitter.flush().unwrap();
    assert_eq!(emitter.into_inner(), b"a");
}

#[test]
fn emit_slot_takes_the_event() {
    let mut emitter = Emitter::new(Vec::new());
    let mut slot = EventSlot::from(Event::stream_start(Encoding::Utf8));
    emitter.emit_slot(&mut slot).unwrap();
    assert!(slot.is_empty());
    assert_eq!(
        emitter.emit_slot(&mut slot),
        Err(Error::Usage(UsageError::EmptyEvent))
    );
    // Usage errors leave the emitter usable.
    emitter.emit(Event::stream_end()).unwrap();
}

struct FailingSink;

impl Sink for FailingSink {
    fn write_all(&mut self, _buf: &[u8]) -> Result<(), IoError> {
        Err(IoError::new("broken pipe"))
    }
}

#[test]
fn sink_failures_surface_at_document_end() {
    let mut emitter = Emitter::new(FailingSink);
    let events = document(vec![scalar("a")]);
    let err = emitter.emit_all(events).unwrap_err();
    assert_eq!(
        err,
        Error::Writer {
            problem: "broken pipe".into()
        }
    );
    assert_eq!(emitter.emit(Event::stream_end()), Err(err));
}
