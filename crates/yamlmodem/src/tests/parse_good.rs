use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use rstest::rstest;

use super::parse_to_lines;

fn check(input: &str, body: &[&str]) {
    let mut expected: Vec<&str> = Vec::with_capacity(body.len() + 2);
    expected.push("+STR");
    expected.extend_from_slice(body);
    expected.push("-STR");
    let mut expected = expected.join("\n");
    expected.push('\n');
    let actual: String = parse_to_lines(input).unwrap();
    assert_eq!(actual, expected, "input: {input:?}");
}

#[rstest]
#[case::empty("", &[])]
#[case::comment_only("# nothing here\n", &[])]
#[case::block_mapping(
    "key: value\n",
    &["+DOC", "+MAP", "=VAL :key", "=VAL :value", "-MAP", "-DOC"],
)]
#[case::block_sequence(
    "- 1\n- 2\n- 3\n",
    &["+DOC", "+SEQ", "=VAL :1", "=VAL :2", "=VAL :3", "-SEQ", "-DOC"],
)]
#[case::flow_sequence("[a, b]", &["+DOC", "+SEQ []", "=VAL :a", "=VAL :b", "-SEQ", "-DOC"])]
#[case::flow_sequence_trailing_comma(
    "[a, b, ]",
    &["+DOC", "+SEQ []", "=VAL :a", "=VAL :b", "-SEQ", "-DOC"],
)]
#[case::flow_mapping_missing_value(
    "{a: 1, b}",
    &["+DOC", "+MAP {}", "=VAL :a", "=VAL :1", "=VAL :b", "=VAL :", "-MAP", "-DOC"],
)]
#[case::single_pair_in_flow_sequence(
    "[a: b, c]",
    &["+DOC", "+SEQ []", "+MAP {}", "=VAL :a", "=VAL :b", "-MAP", "=VAL :c", "-SEQ", "-DOC"],
)]
#[case::indentless_sequence(
    "key:\n- a\n- b\n",
    &["+DOC", "+MAP", "=VAL :key", "+SEQ", "=VAL :a", "=VAL :b", "-SEQ", "-MAP", "-DOC"],
)]
#[case::nested_block_sequences(
    "- - a\n  - b\n- c\n",
    &["+DOC", "+SEQ", "+SEQ", "=VAL :a", "=VAL :b", "-SEQ", "=VAL :c", "-SEQ", "-DOC"],
)]
#[case::empty_sequence_entries(
    "-\n- \n",
    &["+DOC", "+SEQ", "=VAL :", "=VAL :", "-SEQ", "-DOC"],
)]
#[case::explicit_key(
    "? a\n: b\n",
    &["+DOC", "+MAP", "=VAL :a", "=VAL :b", "-MAP", "-DOC"],
)]
#[case::explicit_key_without_value(
    "? a\n",
    &["+DOC", "+MAP", "=VAL :a", "=VAL :", "-MAP", "-DOC"],
)]
#[case::nested_flow_in_block(
    "a: [1, {b: c}]\n",
    &[
        "+DOC", "+MAP", "=VAL :a", "+SEQ []", "=VAL :1", "+MAP {}", "=VAL :b", "=VAL :c",
        "-MAP", "-SEQ", "-MAP", "-DOC",
    ],
)]
#[case::anchor_and_alias(
    "a: &x 1\nb: *x\n",
    &["+DOC", "+MAP", "=VAL :a", "=VAL &x :1", "=VAL :b", "=ALI *x", "-MAP", "-DOC"],
)]
#[case::properties_on_empty_nodes(
    "a: !!null\nb: &anchor\n",
    &[
        "+DOC", "+MAP", "=VAL :a", "=VAL <tag:yaml.org,2002:null> :", "=VAL :b",
        "=VAL &anchor :", "-MAP", "-DOC",
    ],
)]
#[case::tag_before_anchor(
    "!!str &a x",
    &["+DOC", "=VAL &a <tag:yaml.org,2002:str> :x", "-DOC"],
)]
#[case::anchor_before_tag(
    "&a !!str x",
    &["+DOC", "=VAL &a <tag:yaml.org,2002:str> :x", "-DOC"],
)]
#[case::non_specific_tag("! a", &["+DOC", "=VAL <!> :a", "-DOC"])]
#[case::local_tag("!foo a", &["+DOC", "=VAL <!foo> :a", "-DOC"])]
#[case::verbatim_tag_on_collection(
    "!<tag:x> [a]",
    &["+DOC", "+SEQ [] <tag:x>", "=VAL :a", "-SEQ", "-DOC"],
)]
#[case::tagged_mapping(
    "!!map\na: b\n",
    &["+DOC", "+MAP <tag:yaml.org,2002:map>", "=VAL :a", "=VAL :b", "-MAP", "-DOC"],
)]
#[case::scalar_styles(
    "- 'single'\n- \"double\"\n- |\n  literal\n- >\n  folded\n  text\n",
    &[
        "+DOC", "+SEQ", "=VAL 'single", "=VAL \"double", "=VAL |literal\\n",
        "=VAL >folded text\\n", "-SEQ", "-DOC",
    ],
)]
#[case::explicit_empty_document("---\n", &["+DOC ---", "=VAL :", "-DOC"])]
#[case::explicit_document_end(
    "a\n...\n...\n",
    &["+DOC", "=VAL :a", "-DOC ..."],
)]
#[case::multiple_documents(
    "--- a\n--- b\n...\n",
    &["+DOC ---", "=VAL :a", "-DOC", "+DOC ---", "=VAL :b", "-DOC ..."],
)]
#[case::directives(
    "%YAML 1.1\n%TAG !e! tag:e.com,2000:\n--- !e!x a\n...\n",
    &["+DOC ---", "=VAL <tag:e.com,2000:x> :a", "-DOC ..."],
)]
#[case::tag_directive_overrides_default(
    "%TAG !! tag:other:\n--- !!x a\n",
    &["+DOC ---", "=VAL <tag:other:x> :a", "-DOC"],
)]
#[case::yaml_1_2_accepted("%YAML 1.2\n--- a\n", &["+DOC ---", "=VAL :a", "-DOC"])]
#[case::multi_line_plain(
    "a\n b\n\n c\n",
    &["+DOC", "=VAL :a b\\nc", "-DOC"],
)]
fn parses(#[case] input: &str, #[case] body: &[&str]) {
    check(input, body);
}

#[test]
fn tag_handles_do_not_leak_between_documents() {
    let err = parse_to_lines("%TAG !e! tag:e.com:\n--- !e!a x\n--- !e!b y\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "while parsing a node at line 3, column 5: found undefined tag handle at line 3, column 5"
    );
}

#[test]
fn crlf_line_breaks() {
    check(
        "a: 1\r\nb: |\r\n  x\r\n",
        &["+DOC", "+MAP", "=VAL :a", "=VAL :1", "=VAL :b", "=VAL |x\\n", "-MAP", "-DOC"],
    );
}
