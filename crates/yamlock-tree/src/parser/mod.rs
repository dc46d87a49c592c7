//! YAML parser that builds comment-preserving [`Node`] trees.
//!
//! Parsing happens in two passes. yaml-rust2 first validates the input and
//! reports decoded scalar values; a line-oriented parser then rebuilds the
//! document with its comments and layout, and the two results are aligned.

mod block;
mod events;
mod inline;
mod lines;

use crate::error::{Error, Result, SourceLocation};
use crate::node::Node;

/// Default limit on collection nesting.
///
/// Parsing and every later traversal recurse once per level, so the limit
/// is kept low enough for a default 2 MiB thread stack in debug builds.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Deepest collection nesting accepted. Deeper input is rejected with
    /// a parse error; every later traversal relies on this bound.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse a YAML document into a [`Node::document`] tree.
///
/// # Example
///
/// ```rust
/// use yamlock_tree::{parse, serialize};
///
/// let text = "# settings\nreplicas: 3 # scaled by ops\n";
/// let doc = parse(text).unwrap();
/// assert_eq!(serialize(&doc), text);
/// ```
///
/// # Errors
///
/// Returns [`Error::ParseError`] for malformed YAML and for constructs the
/// tree cannot represent (anchors, tags, multi-line flow collections, ...).
pub fn parse(content: &str) -> Result<Node> {
    parse_with_options(content, &ParseOptions::default())
}

/// Parse raw bytes, which must be UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> Result<Node> {
    let content = std::str::from_utf8(bytes).map_err(|err| {
        let offset = err.valid_up_to();
        let prefix = &bytes[..offset];
        let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = prefix
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Error::parse(
            "input is not valid UTF-8",
            SourceLocation {
                offset,
                line,
                column: offset - line_start + 1,
            },
        )
    })?;
    parse(content)
}

/// Parse with explicit options.
pub fn parse_with_options(content: &str, options: &ParseOptions) -> Result<Node> {
    let (body, bom) = lines::strip_bom(content);
    let events = events::collect(body)?;
    let (source_lines, frame) = lines::split(body, bom)?;
    let line_count = source_lines.len();

    let mut document = block::BlockParser::new(source_lines, options.max_depth)
        .parse_document(frame)?;
    let empty_root = document
        .layout
        .frame
        .as_ref()
        .is_some_and(|frame| frame.empty_root);
    if !empty_root {
        let end = SourceLocation {
            offset: content.len(),
            line: line_count.max(1),
            column: 1,
        };
        events::apply(&mut document, events, end)?;
    }

    tracing::trace!(lines = line_count, "parsed YAML document");
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Style;

    #[test]
    fn test_decoded_values_come_from_events() {
        let doc = parse("a: \"x\\ty\"\nb: >\n  folded\n  text\n").unwrap();
        let root = doc.document_root().unwrap();
        assert_eq!(root.get("a").and_then(Node::scalar_value), Some("x\ty"));
        let b = root.get("b").unwrap();
        assert_eq!(b.style(), Style::Folded);
        assert_eq!(b.scalar_value(), Some("folded text\n"));
    }

    #[test]
    fn test_empty_input() {
        let doc = parse("").unwrap();
        assert_eq!(doc.document_root().and_then(Node::scalar_value), Some(""));
        let doc = parse("# only a comment\n").unwrap();
        assert!(doc.foot_comment().has_text());
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        let err = parse_bytes(b"a: 1\nb: \xff\n").unwrap_err();
        let location = err.location().unwrap();
        assert_eq!((location.line, location.column), (2, 4));
    }

    #[test]
    fn test_max_depth_option() {
        let options = ParseOptions { max_depth: 1 };
        assert!(parse_with_options("a:\n  b: 1\n", &options).is_ok());
        assert!(parse_with_options("a:\n  b:\n    c: 1\n", &options).is_err());
    }
}
