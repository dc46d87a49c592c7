//! Scanning of single-line values: plain and quoted scalars, block scalar
//! headers, mapping keys, and flow collections.
//!
//! Errors are reported as byte offsets into the scanned text; the block
//! parser turns them into source locations.

use crate::node::{Node, NodeKind, Pair, Style};
use crate::scalar::{Repr, Scalar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InlineError {
    pub(crate) offset: usize,
    pub(crate) message: String,
}

impl InlineError {
    fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

pub(crate) type InlineResult<T> = std::result::Result<T, InlineError>;

/// A block mapping key found at the start of a line.
#[derive(Debug)]
pub(crate) struct KeyScan {
    pub(crate) node: Node,
    /// Byte length up to and including the `:` indicator.
    pub(crate) consumed: usize,
}

fn is_blank(c: Option<char>) -> bool {
    matches!(c, None | Some(' ') | Some('\t'))
}

fn scalar_node(value: String, raw: &str, style: Style) -> Node {
    Node::with_kind(
        NodeKind::Scalar(Scalar::new(value, Repr::Inline(raw.to_string()))),
        style,
    )
}

fn reject_node_properties(text: &str, offset: usize) -> InlineResult<()> {
    match text.chars().next() {
        Some('&') => Err(InlineError::new(offset, "anchors are not supported")),
        Some('*') => Err(InlineError::new(offset, "aliases are not supported")),
        Some('!') => Err(InlineError::new(offset, "tags are not supported")),
        Some('?') if is_blank(text.chars().nth(1)) => Err(InlineError::new(
            offset,
            "complex mapping keys are not supported",
        )),
        _ => Ok(()),
    }
}

/// Length of a quoted scalar starting at the beginning of `text`, including
/// both quotes.
fn quoted_len(text: &str) -> InlineResult<usize> {
    let mut chars = text.char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(InlineError::new(0, "expected a quoted scalar"));
    };
    if quote == '"' {
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => return Ok(i + 1),
                _ => {}
            }
        }
    } else {
        let mut rest = text[1..].char_indices().peekable();
        while let Some((i, c)) = rest.next() {
            if c == '\'' {
                if matches!(rest.peek(), Some((_, '\''))) {
                    rest.next();
                } else {
                    return Ok(i + 2);
                }
            }
        }
    }
    Err(InlineError::new(
        0,
        "multi-line quoted scalars are not supported",
    ))
}

fn quoted_scalar(raw: &str) -> Node {
    if raw.starts_with('\'') {
        let value = raw[1..raw.len() - 1].replace("''", "'");
        scalar_node(value, raw, Style::SingleQuoted)
    } else {
        // Escapes are decoded from the event stream after parsing.
        scalar_node(raw[1..raw.len() - 1].to_string(), raw, Style::DoubleQuoted)
    }
}

/// Try to read `key:` at the start of `text`.
///
/// Returns `Ok(None)` when the text is not a mapping entry.
pub(crate) fn scan_key(text: &str) -> InlineResult<Option<KeyScan>> {
    reject_node_properties(text, 0)?;
    match text.chars().next() {
        None | Some('[') | Some('{') | Some('|') | Some('>') | Some('#') => Ok(None),
        Some('-') if is_blank(text.chars().nth(1)) => Ok(None),
        Some('"') | Some('\'') => {
            let len = quoted_len(text)?;
            let after = &text[len..];
            let gap = after.len() - after.trim_start_matches([' ', '\t']).len();
            let rest = &after[gap..];
            if rest.starts_with(':') && is_blank(rest[1..].chars().next()) {
                let mut node = quoted_scalar(&text[..len]);
                node.layout.trail = after[..gap].to_string();
                Ok(Some(KeyScan {
                    node,
                    consumed: len + gap + 1,
                }))
            } else {
                Ok(None)
            }
        }
        Some(_) => {
            let mut prev = None;
            for (i, c) in text.char_indices() {
                if c == '#' && matches!(prev, Some(' ') | Some('\t')) {
                    return Ok(None);
                }
                if c == ':' && is_blank(text[i + 1..].chars().next()) {
                    let raw = text[..i].trim_end_matches([' ', '\t']);
                    if raw.is_empty() {
                        return Ok(None);
                    }
                    let mut node = scalar_node(raw.to_string(), raw, Style::Plain);
                    node.layout.trail = text[raw.len()..i].to_string();
                    return Ok(Some(KeyScan {
                        node,
                        consumed: i + 1,
                    }));
                }
                prev = Some(c);
            }
            Ok(None)
        }
    }
}

/// Read a value in block context at the start of `text`.
///
/// Returns the node and the byte length it occupies. Block scalars come
/// back with their header only; the caller collects the content lines.
pub(crate) fn scan_value(
    text: &str,
    depth: usize,
    max_depth: usize,
) -> InlineResult<(Node, usize)> {
    reject_node_properties(text, 0)?;
    match text.chars().next() {
        Some('"') | Some('\'') => {
            let len = quoted_len(text)?;
            Ok((quoted_scalar(&text[..len]), len))
        }
        Some('[') | Some('{') => {
            let mut cursor = FlowCursor {
                text,
                pos: 0,
                max_depth,
            };
            let node = cursor.collection(depth)?;
            Ok((node, cursor.pos))
        }
        Some('|') | Some('>') => {
            let len = text.find([' ', '\t']).unwrap_or(text.len());
            let header = &text[..len];
            validate_block_header(header)?;
            let style = if header.starts_with('|') {
                Style::Literal
            } else {
                Style::Folded
            };
            let scalar = Scalar::new(
                String::new(),
                Repr::Block {
                    header: header.to_string(),
                    lines: Vec::new(),
                },
            );
            Ok((Node::with_kind(NodeKind::Scalar(scalar), style), len))
        }
        Some('%') | Some('@') | Some('`') => Err(InlineError::new(
            0,
            "reserved indicators cannot start a plain scalar",
        )),
        _ => {
            let mut end = text.len();
            let mut prev = None;
            for (i, c) in text.char_indices() {
                if c == '#' && matches!(prev, Some(' ') | Some('\t')) {
                    end = i;
                    break;
                }
                prev = Some(c);
            }
            let raw = text[..end].trim_end_matches([' ', '\t']);
            Ok((scalar_node(raw.to_string(), raw, Style::Plain), raw.len()))
        }
    }
}

/// Indentation digit and keep-chomping flag of a block scalar header.
pub(crate) fn block_header_indicators(header: &str) -> (Option<usize>, bool) {
    let digit = header[1..]
        .chars()
        .find_map(|c| c.to_digit(10))
        .map(|d| d as usize);
    (digit, header.contains('+'))
}

fn validate_block_header(header: &str) -> InlineResult<()> {
    let mut chomp = 0;
    let mut digits = 0;
    for c in header[1..].chars() {
        match c {
            '+' | '-' => chomp += 1,
            '1'..='9' => digits += 1,
            _ => {
                return Err(InlineError::new(0, "invalid block scalar header"));
            }
        }
    }
    if chomp > 1 || digits > 1 {
        return Err(InlineError::new(0, "invalid block scalar header"));
    }
    Ok(())
}

struct FlowCursor<'a> {
    text: &'a str,
    pos: usize,
    max_depth: usize,
}

impl FlowCursor<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn error(&self, message: impl Into<String>) -> InlineError {
        InlineError::new(self.pos, message)
    }

    fn take_ws(&mut self) -> String {
        let rest = self.rest();
        let len = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let ws = rest[..len].to_string();
        self.pos += len;
        ws
    }

    fn collection(&mut self, depth: usize) -> InlineResult<Node> {
        if depth > self.max_depth {
            return Err(self.error(format!(
                "nesting exceeds the maximum depth of {}",
                self.max_depth
            )));
        }
        let open = self.peek();
        let (close, is_map) = match open {
            Some('[') => (']', false),
            Some('{') => ('}', true),
            _ => return Err(self.error("expected a flow collection")),
        };
        self.pos += 1;

        let ws = self.take_ws();
        if self.peek() == Some(close) {
            self.pos += 1;
            let kind = if is_map {
                NodeKind::Mapping(Vec::new())
            } else {
                NodeKind::Sequence(Vec::new())
            };
            let mut node = Node::with_kind(kind, Style::Flow);
            node.layout.inner = ws;
            return Ok(node);
        }

        let mut pairs = Vec::new();
        let mut items = Vec::new();
        let mut lead = ws;
        loop {
            if is_map {
                let mut key = self.key()?;
                key.layout.lead = lead;
                key.layout.trail = self.take_ws();
                if self.peek() != Some(':') {
                    return Err(self.error("flow mapping entries must have a value"));
                }
                self.pos += 1;
                let value_lead = self.take_ws();
                let mut value = match self.peek() {
                    Some(',') | Some('}') => Node::empty_scalar(),
                    _ => self.value(depth + 1)?,
                };
                value.layout.lead = value_lead;
                value.layout.trail = self.take_ws();
                pairs.push(Pair::new(key, value));
            } else {
                let mut item = self.value(depth + 1)?;
                item.layout.lead = lead;
                item.layout.trail = self.take_ws();
                items.push(item);
            }

            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    lead = self.take_ws();
                    if self.peek() == Some(close) {
                        return Err(self.error("trailing commas are not supported"));
                    }
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                None => {
                    return Err(self.error("flow collections must close on the same line"));
                }
                Some(_) => return Err(self.error(format!("expected ',' or '{close}'"))),
            }
        }

        let kind = if is_map {
            NodeKind::Mapping(pairs)
        } else {
            NodeKind::Sequence(items)
        };
        Ok(Node::with_kind(kind, Style::Flow))
    }

    fn key(&mut self) -> InlineResult<Node> {
        reject_node_properties(self.rest(), self.pos)?;
        match self.peek() {
            Some('"') | Some('\'') => self.quoted(),
            Some('[') | Some('{') => Err(self.error("collection keys are not supported")),
            Some(',') | Some('}') | Some(':') | None => Err(self.error("expected a mapping key")),
            _ => Ok(self.plain()),
        }
    }

    fn value(&mut self, depth: usize) -> InlineResult<Node> {
        reject_node_properties(self.rest(), self.pos)?;
        match self.peek() {
            Some('"') | Some('\'') => self.quoted(),
            Some('[') | Some('{') => self.collection(depth),
            Some(',') | Some(']') | Some('}') | None => Err(self.error("expected a value")),
            _ => Ok(self.plain()),
        }
    }

    fn quoted(&mut self) -> InlineResult<Node> {
        let len = quoted_len(self.rest()).map_err(|e| InlineError::new(self.pos, e.message))?;
        let node = quoted_scalar(&self.text[self.pos..self.pos + len]);
        self.pos += len;
        Ok(node)
    }

    fn plain(&mut self) -> Node {
        let rest = self.rest();
        let mut end = rest.len();
        let mut prev = None;
        for (i, c) in rest.char_indices() {
            let next = rest[i + c.len_utf8()..].chars().next();
            let stop = match c {
                ',' | '[' | ']' | '{' | '}' => true,
                ':' => is_blank(next) || matches!(next, Some(',' | '[' | ']' | '{' | '}')),
                '#' => matches!(prev, Some(' ') | Some('\t')),
                _ => false,
            };
            if stop {
                end = i;
                break;
            }
            prev = Some(c);
        }
        let raw = rest[..end].trim_end_matches([' ', '\t']);
        let node = scalar_node(raw.to_string(), raw, Style::Plain);
        self.pos += raw.len();
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_plain_key() {
        let scan = scan_key("name : value").unwrap().unwrap();
        assert_eq!(scan.node.scalar_value(), Some("name"));
        assert_eq!(scan.node.layout.trail, " ");
        assert_eq!(scan.consumed, 6);
    }

    #[test]
    fn test_scan_key_ignores_urls_and_comments() {
        assert!(scan_key("http://example.com").unwrap().is_none());
        assert!(scan_key("value # a: b").unwrap().is_none());
        assert!(scan_key("- item").unwrap().is_none());
    }

    #[test]
    fn test_scan_quoted_key() {
        let scan = scan_key("'it''s': 1").unwrap().unwrap();
        assert_eq!(scan.node.scalar_value(), Some("it's"));
        assert_eq!(scan.node.style(), Style::SingleQuoted);
        assert_eq!(scan.consumed, 8);
    }

    #[test]
    fn test_complex_key_rejected() {
        let err = scan_key("? complex").unwrap_err();
        assert_eq!(err.message, "complex mapping keys are not supported");
    }

    #[test]
    fn test_plain_value_stops_at_comment() {
        let (node, len) = scan_value("a#b  # note", 0, 8).unwrap();
        assert_eq!(node.scalar_value(), Some("a#b"));
        assert_eq!(len, 3);
    }

    #[test]
    fn test_flow_collection_layout() {
        let (node, len) = scan_value("{ a: 1, b: [x,  y] } # c", 0, 8).unwrap();
        assert_eq!(len, 20);
        let pairs = node.as_mapping().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].key.layout.lead, " ");
        let items = pairs[1].value.as_sequence().unwrap();
        assert_eq!(items[1].layout.lead, "  ");
        assert_eq!(pairs[1].value.layout.trail, " ");
    }

    #[test]
    fn test_flow_errors() {
        assert_eq!(
            scan_value("[a, b,]", 0, 8).unwrap_err().message,
            "trailing commas are not supported"
        );
        assert_eq!(
            scan_value("[a, b", 0, 8).unwrap_err().message,
            "flow collections must close on the same line"
        );
        assert!(scan_value("[[[x]]]", 0, 2).is_err());
    }

    #[test]
    fn test_block_header() {
        let (node, len) = scan_value("|+2 # keep", 0, 8).unwrap();
        assert_eq!(node.style(), Style::Literal);
        assert_eq!(len, 3);
        assert_eq!(block_header_indicators("|+2"), (Some(2), true));
        assert!(scan_value("|x", 0, 8).is_err());
    }
}
