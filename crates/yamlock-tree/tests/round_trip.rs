//! Byte-exact round trips of unmodified documents.

use yamlock_tree::{parse, serialize};

fn assert_round_trip(text: &str) {
    let doc = parse(text).unwrap_or_else(|err| panic!("failed to parse:\n{text}\n{err}"));
    assert_eq!(serialize(&doc), text);
}

#[test]
fn test_empty_and_trivia_only_documents() {
    assert_round_trip("");
    assert_round_trip("\n");
    assert_round_trip("\n\n");
    assert_round_trip("# only a comment\n");
    assert_round_trip("# one\n\n# two\n");
    assert_round_trip("---\n");
    assert_round_trip("---\n# after the marker\n");
}

#[test]
fn test_missing_final_newline() {
    assert_round_trip("a: 1");
    assert_round_trip("a:\n  b: 1 # note");
}

#[test]
fn test_crlf_line_endings() {
    assert_round_trip("key: value\r\nlist:\r\n  - a\r\n  - b\r\n");
    assert_round_trip("# c\r\n\r\na: 1\r\n");
}

#[test]
fn test_byte_order_mark() {
    assert_round_trip("\u{feff}a: 1\n");
}

#[test]
fn test_document_markers() {
    assert_round_trip("# header\n---\na: 1\n");
    assert_round_trip("--- # start\na: 1\n...\n# trailer\n\n");
}

#[test]
fn test_indented_root() {
    assert_round_trip("  a: 1\n  b:\n    c: 2\n");
}

#[test]
fn test_scalar_roots() {
    assert_round_trip("just text\n");
    assert_round_trip("# lead\n\"quoted\" # trailing\n");
    assert_round_trip("|\n  literal\n  root\n");
}

#[test]
fn test_full_document() {
    assert_round_trip(
        r#"# Deployment settings

## lock
replicas: 3   # pinned
image:
  name: app
  tag: "1.2"   # quoted
  # trailing note

ports:
- 80
-   443
env: {A: 1, B: [x, y]}
empty:
also_empty:   # nothing here
script: |
  echo hi

  echo bye
folded: >-
    long
    text
nested:
  - name: a
    value: 1
  - - deep
    - deeper
  -
    k: v
single: 'it''s'
...
# trailer
"#,
    );
}

#[test]
fn test_comment_placement_variants() {
    assert_round_trip(
        "a:\n  # head of b\n  b: 1\n    # deeper than b\n  # foot of a\n# head of c\nc:\n    - x\n    # foot of list\n",
    );
    assert_round_trip("a: # on key\n  b: 1\n");
    assert_round_trip("list:\n  - # on dash\n    k: v\n");
    assert_round_trip("a: 1\n\n\n# separated\n\nb: 2\n");
}

#[test]
fn test_block_scalar_variants() {
    assert_round_trip("a: |+\n  keep\n\n\nb: 1\n");
    assert_round_trip("a: >2\n   indented first\n  rest\n");
    assert_round_trip("a: |-\n  strip\nb: |\nc: x\n");
    assert_round_trip("- |\n  in a list\n- >\n  folded\n");
}

#[test]
fn test_flow_collections() {
    assert_round_trip("a: []\nb: {}\nc: [ ]\nd: {  }\n");
    assert_round_trip("a: [1,2,  3]   # spaced\n");
    assert_round_trip("a: {\"k\":v, 'q' : [x]}\n");
    assert_round_trip("a:\n  [on, next, line]\n");
}

#[test]
fn test_quoted_keys_and_spacing() {
    assert_round_trip("\"quoted key\": 1\n'single' : 2\nplain   :    3\n");
    assert_round_trip("url: http://example.com/a#frag\n");
}
