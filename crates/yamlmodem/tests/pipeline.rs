#![expect(missing_docs)]
#![expect(clippy::needless_raw_string_hashes)]

use std::io::{BufReader, Cursor};

use yamlmodem::{
    Complex, Emitter, EmitterOptions, Encoding, Error, Event, Parser, ScalarStyle, ScalarText,
    SequenceStyle,
};

fn reformat_with(input: &[u8], options: EmitterOptions) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut emitter = Emitter::with_options(&mut out, options);
    for event in Parser::new(BufReader::new(Cursor::new(input))) {
        emitter.emit(event?)?;
    }
    drop(emitter);
    Ok(out)
}

fn reformat(input: &str) -> String {
    let bytes = reformat_with(input.as_bytes(), EmitterOptions::default()).expect("reformat");
    String::from_utf8(bytes).expect("utf-8 output")
}

#[test]
fn block_document_is_normalized() {
    let input = r#"
# config
name:   demo
items: [1, 2,   3]
nested:
    key: value
    list:
    - a
    - b
"#;
    insta::assert_snapshot!(reformat(input), @r#"
    name: demo
    items: [1, 2, 3]
    nested:
      key: value
      list:
      - a
      - b
    "#);
}

#[test]
fn directives_anchors_and_documents() {
    let input = "%YAML 1.1\n---\nbase: &b {x: 1}\ncopy: *b\n...\n--- 'quoted'\n";
    insta::assert_snapshot!(reformat(input), @r#"
    %YAML 1.1
    ---
    base: &b {x: 1}
    copy: *b
    ...
    --- 'quoted'
    "#);
}

#[test]
fn block_scalars_keep_their_style() {
    let input = "text: |\n  line one\n  line two\nfolded: >\n  a\n  b\n";
    insta::assert_snapshot!(reformat(input), @r#"
    text: |
      line one
      line two
    folded: >
      a b
    "#);
}

#[test]
fn canonical_form() {
    let bytes = reformat_with(
        b"a: [1, 2]",
        EmitterOptions {
            canonical: true,
            ..Default::default()
        },
    )
    .unwrap();
    insta::assert_snapshot!(String::from_utf8(bytes).unwrap(), @r#"
    ---
    {
      ? "a"
      : [
        "1",
        "2",
      ],
    }
    "#);
}

#[test]
fn wider_indentation() {
    let bytes = reformat_with(
        b"a:\n  b:\n  - c\n",
        EmitterOptions {
            indent: 4,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(bytes, b"a:\n    b:\n    - c\n");
}

fn utf16le(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

#[test]
fn input_encoding_carries_over_to_the_output() {
    let input = utf16le("a: b\n");
    assert_eq!(reformat_with(&input, EmitterOptions::default()).unwrap(), input);

    let forced = reformat_with(
        &input,
        EmitterOptions {
            encoding: Encoding::Utf8,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(forced, b"a: b\n");
}

#[test]
fn parse_errors_stop_the_pipeline() {
    let err = reformat_with(b"a: [b\n", EmitterOptions::default()).unwrap_err();
    insta::assert_snapshot!(err, @"while parsing a flow sequence at line 1, column 4: did not find expected ',' or ']' at line 2, column 1");
}

#[test]
fn numbers_as_scalars() {
    let values = [
        1i64.to_scalar_text(),
        2.5f64.to_scalar_text(),
        f64::NAN.to_scalar_text(),
        f64::NEG_INFINITY.to_scalar_text(),
        Complex { re: 1.5, im: 2.0 }.to_scalar_text(),
    ];
    let mut events = vec![
        Event::stream_start(Encoding::Utf8),
        Event::document_start(None, Vec::new(), true),
        Event::sequence_start(None, None, true, SequenceStyle::Flow).unwrap(),
    ];
    for value in values {
        events.push(Event::scalar(None, None, value, true, false, ScalarStyle::Plain).unwrap());
    }
    events.extend([
        Event::sequence_end(),
        Event::document_end(true),
        Event::stream_end(),
    ]);
    let mut emitter = Emitter::new(Vec::new());
    emitter.emit_all(events).unwrap();
    insta::assert_snapshot!(
        String::from_utf8(emitter.into_inner()).unwrap(),
        @"[1, 2.5, .nan, -.inf, 1.5 + 2.0im]"
    );
}
