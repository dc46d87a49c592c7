/*
 * emitter.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Serialization of node trees back to YAML text.
 */

//! Serialization of [`Node`] trees.
//!
//! Parsed trees keep enough layout to reproduce their source exactly.
//! Nodes built or changed in code fall back to two-space block indentation
//! and single-space separators.

use crate::node::{Comment, CommentLine, Frame, Node, NodeKind, Style};
use crate::scalar::{BlockLine, Repr, double_quote};

const DEFAULT_INDENT: usize = 2;

/// Render a node as YAML text.
///
/// Documents are rendered with their markers, line endings and byte order
/// mark. Any other node is rendered as a top-level value with `\n` line
/// endings.
pub fn serialize(node: &Node) -> String {
    let default_frame = Frame::default();
    let frame = node.layout.frame.as_deref().unwrap_or(&default_frame);
    let mut emitter = Emitter::default();
    match node.kind() {
        NodeKind::Document(root) => emitter.document(node, root, frame),
        _ => emitter.top_level(node, 0),
    }
    emitter.finish(frame)
}

fn spaces(count: usize) -> String {
    " ".repeat(count)
}

fn is_block_collection(node: &Node) -> bool {
    node.style() != Style::Flow
        && match node.kind() {
            NodeKind::Mapping(pairs) => !pairs.is_empty(),
            NodeKind::Sequence(items) => !items.is_empty(),
            _ => false,
        }
}

fn is_block_scalar(node: &Node) -> bool {
    matches!(
        node.as_scalar().map(|scalar| &scalar.repr),
        Some(Repr::Block { .. })
    )
}

/// Separator between an indicator and the text that follows it.
fn separator<'a>(lead: &'a str, text: &str) -> &'a str {
    if lead.is_empty() && !text.is_empty() {
        " "
    } else {
        lead
    }
}

/// Trailing part of a line: the gap and the node's line comment.
fn line_end(node: &Node) -> String {
    match node.line_comment() {
        Some(comment) => {
            let gap = if node.layout.eol_gap.is_empty() {
                " "
            } else {
                &node.layout.eol_gap
            };
            format!("{gap}{comment}")
        }
        None => node.layout.eol_gap.clone(),
    }
}

/// Line end for `key: value` lines, where either side may own the comment.
fn entry_end(key: &Node, value: &Node) -> String {
    match (value.line_comment(), key.line_comment()) {
        (None, Some(comment)) => {
            let gap = if value.layout.eol_gap.is_empty() {
                " "
            } else {
                &value.layout.eol_gap
            };
            format!("{gap}{comment}")
        }
        _ => line_end(value),
    }
}

/// A node written on one line: the source text of a scalar (or the header
/// of a block scalar) and flow syntax for collections.
fn inline_text(node: &Node) -> String {
    match node.kind() {
        NodeKind::Scalar(scalar) => match &scalar.repr {
            Repr::Inline(raw) => raw.clone(),
            Repr::Block { header, .. } => header.clone(),
        },
        _ => flow_text(node),
    }
}

fn flow_text(node: &Node) -> String {
    match node.kind() {
        NodeKind::Document(root) => flow_text(root),
        NodeKind::Scalar(scalar) => match &scalar.repr {
            Repr::Inline(raw) => raw.clone(),
            Repr::Block { .. } => double_quote(scalar.value()),
        },
        NodeKind::Sequence(items) => {
            if items.is_empty() {
                return format!("[{}]", node.layout.inner);
            }
            let body: Vec<String> = items
                .iter()
                .map(|item| format!("{}{}{}", item.layout.lead, flow_text(item), item.layout.trail))
                .collect();
            format!("[{}]", body.join(","))
        }
        NodeKind::Mapping(pairs) => {
            if pairs.is_empty() {
                return format!("{{{}}}", node.layout.inner);
            }
            let body: Vec<String> = pairs
                .iter()
                .map(|pair| {
                    let key = flow_text(&pair.key);
                    let value = flow_text(&pair.value);
                    let lead = if pair.value.layout.lead.is_empty()
                        && pair.key.style() == Style::Plain
                        && !value.is_empty()
                    {
                        " "
                    } else {
                        &pair.value.layout.lead
                    };
                    format!(
                        "{}{}{}:{}{}{}",
                        pair.key.layout.lead,
                        key,
                        pair.key.layout.trail,
                        lead,
                        value,
                        pair.value.layout.trail
                    )
                })
                .collect();
            format!("{{{}}}", body.join(","))
        }
    }
}

#[derive(Default)]
struct Emitter {
    lines: Vec<String>,
}

impl Emitter {
    fn finish(self, frame: &Frame) -> String {
        let ending = frame.line_ending.as_str();
        let mut out = String::new();
        if frame.bom {
            out.push('\u{feff}');
        }
        out.push_str(&self.lines.join(ending));
        if frame.final_newline && !self.lines.is_empty() {
            out.push_str(ending);
        }
        out
    }

    fn comment(&mut self, comment: &Comment, column: usize) {
        for entry in comment.entries() {
            match entry {
                CommentLine::Blank(raw) => self.lines.push(raw.clone()),
                CommentLine::Text { offset, text } => {
                    let indent = (column as isize + offset).max(0) as usize;
                    self.lines.push(format!("{}{}", spaces(indent), text));
                }
            }
        }
    }

    fn document(&mut self, document: &Node, root: &Node, frame: &Frame) {
        self.comment(document.head_comment(), 0);
        if let Some(marker) = &frame.start_marker {
            self.lines.push(marker.clone());
        }
        let placeholder = frame.empty_root
            && root.as_scalar().and_then(|s| s.source_text()) == Some("")
            && !root.head_comment().has_text()
            && root.line_comment().is_none();
        if !placeholder {
            self.top_level(root, frame.root_column);
        }
        self.comment(document.foot_comment(), 0);
        if let Some(marker) = &frame.end_marker {
            self.lines.push(marker.clone());
        }
        self.lines.extend(frame.trailer.iter().cloned());
    }

    fn top_level(&mut self, node: &Node, column: usize) {
        self.comment(node.head_comment(), column);
        if is_block_collection(node) {
            self.collection(node, column, None);
            return;
        }
        let line = format!("{}{}{}", spaces(column), inline_text(node), line_end(node));
        self.lines.push(line);
        if is_block_scalar(node) {
            self.block_body(node, 0);
        }
        self.comment(node.foot_comment(), column);
    }

    fn collection(&mut self, node: &Node, column: usize, prefix: Option<String>) {
        match node.kind() {
            NodeKind::Mapping(_) => self.mapping(node, column, prefix),
            NodeKind::Sequence(_) => self.sequence(node, column, prefix),
            _ => {}
        }
    }

    /// Content lines of a block scalar owned by a collection at `base`.
    fn block_body(&mut self, node: &Node, base: usize) {
        let Some(Repr::Block { lines, .. }) = node.as_scalar().map(|s| &s.repr) else {
            return;
        };
        let column = base + node.layout.indent.unwrap_or(DEFAULT_INDENT);
        for line in lines {
            match line {
                BlockLine::Text(text) => self.lines.push(format!("{}{}", spaces(column), text)),
                BlockLine::Blank(raw) => self.lines.push(raw.clone()),
            }
        }
    }

    /// A collection value starting on the line after its key. Only
    /// sequences may sit at the key's own column.
    fn nested(&mut self, node: &Node, column: usize) {
        let indent = node.layout.indent.unwrap_or(DEFAULT_INDENT);
        let indent = if indent == 0 && !node.is_sequence() {
            DEFAULT_INDENT
        } else {
            indent
        };
        let child = column + indent;
        self.comment(node.head_comment(), child);
        self.collection(node, child, None);
    }

    fn mapping(&mut self, node: &Node, column: usize, mut prefix: Option<String>) {
        let Some(pairs) = node.as_mapping() else {
            return;
        };
        for pair in pairs {
            let (key, value) = (&pair.key, &pair.value);
            self.comment(key.head_comment(), column);
            let mut line = prefix.take().unwrap_or_else(|| spaces(column));
            line.push_str(&inline_text(key));
            line.push_str(&key.layout.trail);
            line.push(':');

            if is_block_collection(value) {
                if key.line_comment().is_none() && value.line_comment().is_some() {
                    line.push_str(&line_end(value));
                } else {
                    line.push_str(&line_end(key));
                }
                self.lines.push(line);
                self.nested(value, column);
                continue;
            }

            if is_block_scalar(value) {
                let header = inline_text(value);
                line.push_str(separator(&value.layout.lead, &header));
                line.push_str(&header);
                line.push_str(&entry_end(key, value));
                self.lines.push(line);
                self.block_body(value, column);
            } else if value.layout.next_line {
                line.push_str(&line_end(key));
                self.lines.push(line);
                let child = column + value.layout.indent.unwrap_or(DEFAULT_INDENT).max(1);
                self.comment(value.head_comment(), child);
                self.lines.push(format!(
                    "{}{}{}",
                    spaces(child),
                    inline_text(value),
                    line_end(value)
                ));
            } else {
                let text = inline_text(value);
                line.push_str(separator(&value.layout.lead, &text));
                line.push_str(&text);
                line.push_str(&entry_end(key, value));
                self.lines.push(line);
            }
            self.comment(value.foot_comment(), column);
        }
        self.comment(node.foot_comment(), column);
    }

    fn sequence(&mut self, node: &Node, column: usize, mut prefix: Option<String>) {
        let Some(items) = node.as_sequence() else {
            return;
        };
        for item in items {
            self.comment(item.head_comment(), column);
            let mut line = prefix.take().unwrap_or_else(|| spaces(column));
            line.push('-');

            if is_block_collection(item) && !item.layout.next_line {
                let lead = if item.layout.lead.is_empty() {
                    " "
                } else {
                    &item.layout.lead
                };
                line.push_str(lead);
                let child = line.len();
                self.collection(item, child, Some(line));
            } else if is_block_collection(item) {
                line.push_str(&line_end(item));
                self.lines.push(line);
                let child = column + item.layout.indent.unwrap_or(DEFAULT_INDENT).max(1);
                self.collection(item, child, None);
            } else {
                let text = inline_text(item);
                line.push_str(separator(&item.layout.lead, &text));
                line.push_str(&text);
                line.push_str(&line_end(item));
                self.lines.push(line);
                if is_block_scalar(item) {
                    self.block_body(item, column);
                }
                self.comment(item.foot_comment(), column);
            }
        }
        self.comment(node.foot_comment(), column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Pair;
    use insta::assert_snapshot;

    #[test]
    fn test_serialize_built_tree() {
        let tree = Node::mapping(vec![
            Pair::new(
                Node::scalar("server").with_head_comment("## lock"),
                Node::mapping(vec![
                    Pair::new(Node::scalar("host"), Node::scalar("localhost")),
                    Pair::new(
                        Node::scalar("ports"),
                        Node::sequence(vec![Node::scalar("80"), Node::scalar("443")]),
                    ),
                ]),
            ),
            Pair::new(
                Node::scalar("name"),
                Node::scalar("a: b").with_line_comment("quoted"),
            ),
        ]);
        assert_snapshot!(serialize(&tree), @r#"
        ## lock
        server:
          host: localhost
          ports:
            - 80
            - 443
        name: "a: b" # quoted
        "#);
    }

    #[test]
    fn test_serialize_nested_sequence_items() {
        let tree = Node::sequence(vec![
            Node::mapping(vec![
                Pair::new(Node::scalar("a"), Node::scalar("1")),
                Pair::new(Node::scalar("b"), Node::scalar("2")),
            ]),
            Node::sequence(vec![Node::scalar("x")]),
        ]);
        assert_snapshot!(serialize(&tree), @r"
        - a: 1
          b: 2
        - - x
        ");
    }

    #[test]
    fn test_flow_rendering_of_empty_and_flow_nodes() {
        let tree = Node::mapping(vec![
            Pair::new(Node::scalar("empty"), Node::mapping(vec![])),
            Pair::new(
                Node::scalar("flow"),
                Node::sequence(vec![Node::scalar("a"), Node::scalar("b")]).with_style(Style::Flow),
            ),
        ]);
        assert_eq!(serialize(&tree), "empty: {}\nflow: [a,b]\n");
    }
}
