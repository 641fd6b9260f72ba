use alloc::{string::String, vec, vec::Vec};

use rstest::rstest;

use super::*;
use crate::error::MarkedError;

fn scan(input: &str) -> Vec<Token> {
    Scanner::new(input.as_bytes(), Encoding::Any)
        .collect::<Result<_, _>>()
        .unwrap()
}

fn kinds(input: &str) -> Vec<TokenData> {
    scan(input).into_iter().map(|token| token.data).collect()
}

fn scan_err(input: &str) -> MarkedError {
    let err = Scanner::new(input.as_bytes(), Encoding::Any)
        .find_map(Result::err)
        .expect("expected a scanner error");
    match err {
        Error::Scanner(err) => err,
        other => panic!("expected a scanner error, got {other:?}"),
    }
}

fn plain(value: &str) -> TokenData {
    scalar(value, ScalarStyle::Plain)
}

fn scalar(value: &str, style: ScalarStyle) -> TokenData {
    TokenData::Scalar {
        value: value.into(),
        style,
    }
}

const START: TokenData = TokenData::StreamStart {
    encoding: Encoding::Utf8,
};

#[test]
fn block_mapping_tokens_and_marks() {
    let tokens = scan("key: value");
    let summary: Vec<(&str, Mark, Mark)> = tokens
        .iter()
        .map(|t| (t.data.name(), t.start_mark, t.end_mark))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("STREAM-START", Mark::new(0, 0, 0), Mark::new(0, 0, 0)),
            ("BLOCK-MAPPING-START", Mark::new(0, 0, 0), Mark::new(0, 0, 0)),
            ("KEY", Mark::new(0, 0, 0), Mark::new(0, 0, 0)),
            ("SCALAR", Mark::new(0, 0, 0), Mark::new(3, 0, 3)),
            ("VALUE", Mark::new(3, 0, 3), Mark::new(4, 0, 4)),
            ("SCALAR", Mark::new(5, 0, 5), Mark::new(10, 0, 10)),
            ("BLOCK-END", Mark::new(10, 1, 0), Mark::new(10, 1, 0)),
            ("STREAM-END", Mark::new(10, 1, 0), Mark::new(10, 1, 0)),
        ]
    );
}

#[test]
fn block_sequence() {
    assert_eq!(
        kinds("- a\n- b\n"),
        vec![
            START,
            TokenData::BlockSequenceStart,
            TokenData::BlockEntry,
            plain("a"),
            TokenData::BlockEntry,
            plain("b"),
            TokenData::BlockEnd,
            TokenData::StreamEnd,
        ]
    );
}

#[test]
fn nested_flow_collections() {
    assert_eq!(
        kinds("[a, {b: c}]"),
        vec![
            START,
            TokenData::FlowSequenceStart,
            plain("a"),
            TokenData::FlowEntry,
            TokenData::FlowMappingStart,
            TokenData::Key,
            plain("b"),
            TokenData::Value,
            plain("c"),
            TokenData::FlowMappingEnd,
            TokenData::FlowSequenceEnd,
            TokenData::StreamEnd,
        ]
    );
}

#[test]
fn directives_and_document_markers() {
    let input = "%YAML 1.2\n%TAG !e! tag:example.com,2000:\n--- !e!foo \"bar\"\n...\n";
    assert_eq!(
        kinds(input),
        vec![
            START,
            TokenData::VersionDirective { major: 1, minor: 2 },
            TokenData::TagDirective {
                handle: "!e!".into(),
                prefix: "tag:example.com,2000:".into(),
            },
            TokenData::DocumentStart,
            TokenData::Tag {
                handle: "!e!".into(),
                suffix: "foo".into(),
            },
            scalar("bar", ScalarStyle::DoubleQuoted),
            TokenData::DocumentEnd,
            TokenData::StreamEnd,
        ]
    );
}

#[test]
fn anchors_and_aliases() {
    assert_eq!(
        kinds("- &a x\n- *a\n"),
        vec![
            START,
            TokenData::BlockSequenceStart,
            TokenData::BlockEntry,
            TokenData::Anchor { value: "a".into() },
            plain("x"),
            TokenData::BlockEntry,
            TokenData::Alias { value: "a".into() },
            TokenData::BlockEnd,
            TokenData::StreamEnd,
        ]
    );
}

#[rstest]
#[case("!<tag:yaml.org,2002:str> a", "", "tag:yaml.org,2002:str")]
#[case("! a", "", "!")]
#[case("!local a", "!", "local")]
#[case("!!int 1", "!!", "int")]
#[case("!e!%21x a", "!e!", "!x")]
fn tag_shapes(#[case] input: &str, #[case] handle: &str, #[case] suffix: &str) {
    let tokens = kinds(input);
    assert_eq!(
        tokens[1],
        TokenData::Tag {
            handle: handle.into(),
            suffix: suffix.into(),
        }
    );
}

#[rstest]
#[case("|\n  line1\n  line2\n", "line1\nline2\n", ScalarStyle::Literal)]
#[case("|-\n  x\n", "x", ScalarStyle::Literal)]
#[case("|+\n  x\n\n", "x\n\n", ScalarStyle::Literal)]
#[case("|2\n   x\n", " x\n", ScalarStyle::Literal)]
#[case(">\n  a\n  b\n\n  c\n", "a b\nc\n", ScalarStyle::Folded)]
#[case(">\n  a\n    b\n  c\n", "a\n  b\nc\n", ScalarStyle::Folded)]
#[case("'it''s'", "it's", ScalarStyle::SingleQuoted)]
#[case("'a\n\n  b'", "a\nb", ScalarStyle::SingleQuoted)]
#[case("\"a\\tb\\u00e9\\n\"", "a\tb\u{e9}\n", ScalarStyle::DoubleQuoted)]
#[case("\"a\n  b\"", "a b", ScalarStyle::DoubleQuoted)]
#[case("\"a\\\n  b\"", "ab", ScalarStyle::DoubleQuoted)]
#[case("\"\\x41\\U0001F600\\_\"", "A\u{1F600}\u{A0}", ScalarStyle::DoubleQuoted)]
#[case("a\n b\n\n c", "a b\nc", ScalarStyle::Plain)]
#[case("a #comment", "a", ScalarStyle::Plain)]
#[case("-5", "-5", ScalarStyle::Plain)]
#[case("key:\tvalue", "key", ScalarStyle::Plain)]
fn scalar_content(#[case] input: &str, #[case] value: &str, #[case] style: ScalarStyle) {
    let first_scalar = kinds(input)
        .into_iter()
        .find(|token| matches!(token, TokenData::Scalar { .. }))
        .unwrap();
    assert_eq!(first_scalar, scalar(value, style));
}

#[test]
fn tab_separates_key_and_value() {
    let tokens = kinds("key:\tvalue");
    assert_eq!(tokens[5], plain("value"));
}

#[test]
fn plain_scalar_in_flow_stops_at_indicators() {
    assert_eq!(
        kinds("{a: b,c}"),
        vec![
            START,
            TokenData::FlowMappingStart,
            TokenData::Key,
            plain("a"),
            TokenData::Value,
            plain("b"),
            TokenData::FlowEntry,
            plain("c"),
            TokenData::FlowMappingEnd,
            TokenData::StreamEnd,
        ]
    );
}

#[test]
fn comments_and_blank_lines_produce_no_tokens() {
    assert_eq!(
        kinds("# only a comment\n\n   \n"),
        vec![START, TokenData::StreamEnd]
    );
}

#[test]
fn empty_input() {
    let tokens = scan("");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].start_mark, Mark::new(0, 0, 0));
}

#[rstest]
#[case("\"abc", "while scanning a quoted scalar", "found unexpected end of stream")]
#[case("\"\\q\"", "while parsing a quoted scalar", "found unknown escape character")]
#[case("\"\\xZZ\"", "while parsing a quoted scalar", "did not find expected hexdecimal number")]
#[case("\"\\uD800\"", "while parsing a quoted scalar", "found invalid Unicode character escape code")]
#[case("@foo", "while scanning for the next token", "found character that cannot start any token")]
#[case("%FOO bar\n", "while scanning a directive", "found unknown directive name")]
#[case("%YAML 1.1234567890\n", "while scanning a %YAML directive", "found extremely long version number")]
#[case("|0\n", "while scanning a block scalar", "found an indentation indicator equal to 0")]
#[case("a: b: c", "while scanning a mapping value", "mapping values are not allowed in this context")]
#[case("!<foo bar", "while scanning a tag", "did not find the expected '>'")]
#[case("\tkey: value", "while scanning for the next token", "found a tab character that violates indentation")]
fn scanner_errors(#[case] input: &str, #[case] context: &str, #[case] problem: &str) {
    let err = scan_err(input);
    assert_eq!(err.context, Some(context));
    assert_eq!(err.problem, problem);
}

#[test]
fn error_marks_point_at_the_problem() {
    let err = scan_err("a: b: c");
    assert_eq!(err.problem_mark, Mark::new(4, 0, 4));

    let err = scan_err("ok: 1\nbad: @\n");
    assert_eq!(err.problem_mark, Mark::new(11, 1, 5));
}

#[test]
fn keys_longer_than_the_limit_are_not_keys() {
    let mut input: String = core::iter::repeat_n('a', 1100).collect();
    input.push_str(": b");
    let err = scan_err(&input);
    assert_eq!(err.problem, "mapping values are not allowed in this context");
}

#[test]
fn utf8_bom_is_part_of_stream_start() {
    let tokens = scan("\u{FEFF}a");
    assert_eq!(tokens[0].end_mark, Mark::new(3, 0, 0));
    assert_eq!(tokens[1].start_mark, Mark::new(3, 0, 0));
}

#[test]
fn utf16le_input() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "a: b".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let tokens: Vec<Token> = Scanner::new(bytes.as_slice(), Encoding::Any)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        tokens[0].data,
        TokenData::StreamStart {
            encoding: Encoding::Utf16Le
        }
    );
    assert_eq!(tokens[0].end_mark.index, 2);
    assert_eq!(tokens[3].data, plain("a"));
    assert_eq!(tokens[3].start_mark, Mark::new(2, 0, 0));
    assert_eq!(tokens[5].data, plain("b"));
    assert_eq!(tokens[5].start_mark, Mark::new(8, 0, 3));
}

#[test]
fn exhausted_after_stream_end() {
    let mut scanner = Scanner::new("a".as_bytes(), Encoding::Any);
    while !scanner.stream_end_produced() {
        scanner.next_token().unwrap();
    }
    assert_eq!(
        scanner.next_token(),
        Err(Error::Usage(UsageError::Exhausted))
    );
    assert!(scanner.next().is_none());
}
