//! Indentation-driven structure parser.
//!
//! Walks classified lines and builds the node tree, attaching comment and
//! blank lines to nodes as it goes:
//!
//! - trivia before an entry or item becomes that entry's head comment
//! - trivia after the last entry of a collection becomes the collection's
//!   foot comment when it is indented at least as deep as the collection
//!   and deeper than whatever follows
//! - everything else is left for the enclosing level

use std::ops::Range;

use super::inline::{self, InlineError};
use super::lines::{Line, LineKind};
use crate::error::{Error, Result, SourceLocation};
use crate::node::{Comment, Frame, Node, NodeKind, Pair, Style};
use crate::scalar::{BlockLine, Repr};

pub(crate) struct BlockParser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    max_depth: usize,
}

fn is_dash_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ") || text.starts_with("-\t")
}

fn is_marker(text: &str, marker: &str) -> bool {
    text.strip_prefix(marker)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
}

fn is_document_marker(line: &Line<'_>) -> bool {
    is_marker(line.text, "---") || is_marker(line.text, "...")
}

fn split_ws(text: &str) -> (&str, &str) {
    let len = text.len() - text.trim_start_matches([' ', '\t']).len();
    text.split_at(len)
}

impl<'a> BlockParser<'a> {
    pub(crate) fn new(lines: Vec<Line<'a>>, max_depth: usize) -> Self {
        Self {
            lines,
            pos: 0,
            max_depth,
        }
    }

    fn current(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn text(&self, line: usize) -> &'a str {
        self.lines[line].text
    }

    fn location(&self, line: usize, column: usize) -> SourceLocation {
        let offset = self.lines.get(line).map_or(0, |l| l.offset) + column;
        SourceLocation {
            offset,
            line: line + 1,
            column: column + 1,
        }
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> Error {
        Error::parse(message, self.location(line, column))
    }

    fn inline_error(&self, line: usize, column: usize, err: InlineError) -> Error {
        self.error(line, column + err.offset, err.message)
    }

    fn check_depth(&self, line: usize, column: usize, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(self.error(
                line,
                column,
                format!("nesting exceeds the maximum depth of {}", self.max_depth),
            ));
        }
        Ok(())
    }

    /// Consume blank and comment lines.
    fn take_trivia(&mut self) -> Range<usize> {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|line| line.kind != LineKind::Content)
        {
            self.pos += 1;
        }
        start..self.pos
    }

    fn append_comment(&self, comment: &mut Comment, range: Range<usize>, column: usize) {
        for line in &self.lines[range] {
            match line.kind {
                LineKind::Comment => comment.push_text(
                    line.indent as isize - column as isize,
                    line.text[line.indent..].to_string(),
                ),
                _ => comment.push_blank(line.text.to_string()),
            }
        }
    }

    fn comment(&self, range: Range<usize>, column: usize) -> Comment {
        let mut comment = Comment::new();
        self.append_comment(&mut comment, range, column);
        comment
    }

    /// Claim the part of `trivia` that belongs to a collection at `column`
    /// as its foot, rewinding to the first unclaimed line.
    fn split_foot(&mut self, trivia: Range<usize>, column: usize) -> Comment {
        let next_indent = self.lines.get(trivia.end).map(|line| line.indent);
        let mut end = trivia.start;
        for index in trivia.clone() {
            let line = &self.lines[index];
            if line.kind != LineKind::Comment {
                continue;
            }
            if line.indent >= column && next_indent.is_none_or(|next| line.indent > next) {
                end = index + 1;
            } else {
                break;
            }
        }
        self.pos = end;
        self.comment(trivia.start..end, column)
    }

    /// After the last entry of a collection at `column`: `Ok(true)` when the
    /// current line starts another entry, `Ok(false)` when the collection
    /// ends here.
    fn continues(&self, column: usize, dash: bool) -> Result<bool> {
        let Some(line) = self.current() else {
            return Ok(false);
        };
        if is_document_marker(&line) || line.indent < column {
            return Ok(false);
        }
        if line.indent > column {
            return Err(self.error(self.pos, line.indent, "unexpected indentation"));
        }
        Ok(is_dash_item(&line.text[column..]) == dash)
    }

    pub(crate) fn parse_document(mut self, mut frame: Frame) -> Result<Node> {
        let leading = self.take_trivia();
        let (doc_head, first_head) = match self.current() {
            Some(line) if is_marker(line.text, "---") => {
                let rest = line.text[3..].trim_start_matches([' ', '\t']);
                if !rest.is_empty() && !rest.starts_with('#') {
                    return Err(self.error(
                        self.pos,
                        3,
                        "content on the '---' line is not supported",
                    ));
                }
                frame.start_marker = Some(line.text.to_string());
                self.pos += 1;
                (leading, self.take_trivia())
            }
            _ => {
                let last_blank = leading
                    .clone()
                    .rev()
                    .find(|&i| self.lines[i].kind == LineKind::Blank);
                match last_blank {
                    Some(blank) => (leading.start..blank + 1, blank + 1..leading.end),
                    None => (leading.start..leading.start, leading),
                }
            }
        };
        let head = self.comment(doc_head, 0);
        let mut foot = Comment::new();

        let root = match self.current() {
            Some(line) if !is_marker(line.text, "...") => {
                if line.text.starts_with('%') {
                    return Err(self.error(self.pos, 0, "directives are not supported"));
                }
                frame.root_column = line.indent;
                self.parse_block_node(line.indent, first_head, 0)?
            }
            _ => {
                frame.empty_root = true;
                self.append_comment(&mut foot, first_head, 0);
                Node::empty_scalar()
            }
        };

        let trailing = self.take_trivia();
        self.append_comment(&mut foot, trailing, 0);
        if let Some(line) = self.current() {
            if !is_marker(line.text, "...") {
                return Err(self.error(self.pos, line.indent, "unexpected content"));
            }
            frame.end_marker = Some(line.text.to_string());
            self.pos += 1;
            while let Some(line) = self.current() {
                if line.kind == LineKind::Content {
                    return Err(self.error(
                        self.pos,
                        line.indent,
                        "only one document is supported",
                    ));
                }
                frame.trailer.push(line.text.to_string());
                self.pos += 1;
            }
        }

        let mut document = Node::document(root);
        *document.head_comment_mut() = head;
        *document.foot_comment_mut() = foot;
        document.layout.frame = Some(Box::new(frame));
        Ok(document)
    }

    /// Parse the node whose first line is the current line, at `column`.
    fn parse_block_node(
        &mut self,
        column: usize,
        head: Range<usize>,
        depth: usize,
    ) -> Result<Node> {
        let line_index = self.pos;
        let text = &self.text(line_index)[column..];

        if is_dash_item(text) {
            return self.parse_sequence(line_index, column, head, depth);
        }
        let is_key = inline::scan_key(text)
            .map_err(|e| self.inline_error(line_index, column, e))?
            .is_some();
        if is_key {
            return self.parse_mapping(line_index, column, head, depth);
        }

        let mut node = self.parse_inline(line_index, column, None, depth)?;
        if node.style().is_block_scalar() && depth > 0 {
            return Err(self.error(
                line_index,
                column,
                "block scalars must start on the line of their key or dash",
            ));
        }
        *node.head_comment_mut() = self.comment(head, column);
        Ok(node)
    }

    /// Parse a single-line value starting at byte `start` and the rest of
    /// its line. `owner` is the column of the collection the value belongs
    /// to; block scalar content must be indented past it.
    fn parse_inline(
        &mut self,
        line_index: usize,
        start: usize,
        owner: Option<usize>,
        depth: usize,
    ) -> Result<Node> {
        let text = self.text(line_index);
        let (mut node, len) = inline::scan_value(&text[start..], depth, self.max_depth)
            .map_err(|e| self.inline_error(line_index, start, e))?;

        let (gap, tail) = split_ws(&text[start + len..]);
        if !tail.is_empty() && !tail.starts_with('#') {
            return Err(self.error(
                line_index,
                start + len + gap.len(),
                "unexpected content after value",
            ));
        }
        if !tail.is_empty() && gap.is_empty() {
            return Err(self.error(
                line_index,
                start + len,
                "comments must be separated from values by whitespace",
            ));
        }
        node.layout.eol_gap = gap.to_string();
        node.set_line_comment((!tail.is_empty()).then(|| tail.to_string()));
        self.pos = line_index + 1;

        if node.style().is_block_scalar() {
            self.collect_block_scalar(&mut node, owner);
        }
        Ok(node)
    }

    fn collect_block_scalar(&mut self, node: &mut Node, owner: Option<usize>) {
        let base = owner.unwrap_or(0);
        let min_indent = owner.map_or(1, |column| column + 1);
        let start = self.pos;

        let content_indent = {
            let NodeKind::Scalar(scalar) = node.kind() else {
                return;
            };
            let Repr::Block { header, .. } = &scalar.repr else {
                return;
            };
            match inline::block_header_indicators(header) {
                (Some(digit), _) => Some(base + digit),
                (None, _) => self.lines[start..]
                    .iter()
                    .find(|line| line.kind != LineKind::Blank)
                    .map(|line| line.indent)
                    .filter(|&indent| indent >= min_indent),
            }
        };
        let keep = match node.as_scalar().map(|s| &s.repr) {
            Some(Repr::Block { header, .. }) => header.contains('+'),
            _ => false,
        };

        let mut end = start;
        let mut index = start;
        while let Some(line) = self.lines.get(index) {
            if line.kind == LineKind::Blank {
                index += 1;
                continue;
            }
            match content_indent {
                Some(indent) if line.indent >= indent => {
                    index += 1;
                    end = index;
                }
                _ => break,
            }
        }
        if keep {
            end = index;
        }

        let collected: Vec<BlockLine> = self.lines[start..end]
            .iter()
            .map(|line| match (line.kind, content_indent) {
                (LineKind::Blank, _) | (_, None) => BlockLine::Blank(line.text.to_string()),
                (_, Some(indent)) => BlockLine::Text(line.text[indent..].to_string()),
            })
            .collect();
        if let NodeKind::Scalar(scalar) = node.kind_mut() {
            if let Repr::Block { lines, .. } = &mut scalar.repr {
                *lines = collected;
            }
        }
        node.layout.indent = content_indent.map(|indent| indent - base);
        self.pos = end;
    }

    fn parse_mapping(
        &mut self,
        first_line: usize,
        column: usize,
        first_head: Range<usize>,
        depth: usize,
    ) -> Result<Node> {
        self.check_depth(first_line, column, depth)?;
        let mut pairs = Vec::new();
        let mut head = first_head;
        let mut line_index = first_line;

        let foot = loop {
            let text = &self.text(line_index)[column..];
            let scan = inline::scan_key(text)
                .map_err(|e| self.inline_error(line_index, column, e))?
                .ok_or_else(|| self.error(line_index, column, "expected a mapping entry"))?;
            let mut key = scan.node;
            *key.head_comment_mut() = self.comment(head, column);
            let start = column + scan.consumed;
            let value = self.parse_entry_value(line_index, column, start, &mut key, depth)?;
            pairs.push(Pair::new(key, value));

            let trivia = self.take_trivia();
            if self.continues(column, false)? {
                head = trivia;
                line_index = self.pos;
            } else {
                break self.split_foot(trivia, column);
            }
        };

        let mut node = Node::mapping(pairs);
        *node.foot_comment_mut() = foot;
        Ok(node)
    }

    /// Parse what follows `key:` on `line_index`, starting at byte `start`.
    fn parse_entry_value(
        &mut self,
        line_index: usize,
        column: usize,
        start: usize,
        key: &mut Node,
        depth: usize,
    ) -> Result<Node> {
        let (lead, content) = split_ws(&self.text(line_index)[start..]);
        if !content.is_empty() && !content.starts_with('#') {
            let mut value =
                self.parse_inline(line_index, start + lead.len(), Some(column), depth + 1)?;
            value.layout.lead = lead.to_string();
            return Ok(value);
        }

        let comment = (!content.is_empty()).then(|| content.to_string());
        self.pos = line_index + 1;
        let trivia = self.take_trivia();
        let next = self
            .current()
            .filter(|line| !is_document_marker(line))
            .map(|line| (line.indent, is_dash_item(&line.text[line.indent..])));

        match next {
            Some((indent, _)) if indent > column => {
                key.layout.eol_gap = lead.to_string();
                key.set_line_comment(comment);
                let mut value = self.parse_block_node(indent, trivia, depth + 1)?;
                value.layout.next_line = true;
                value.layout.indent = Some(indent - column);
                Ok(value)
            }
            Some((indent, true)) if indent == column => {
                key.layout.eol_gap = lead.to_string();
                key.set_line_comment(comment);
                let first = self.pos;
                let mut value = self.parse_sequence(first, column, trivia, depth + 1)?;
                value.layout.next_line = true;
                value.layout.indent = Some(0);
                Ok(value)
            }
            _ => {
                self.pos = trivia.start;
                let mut value = Node::empty_scalar();
                value.layout.eol_gap = lead.to_string();
                value.set_line_comment(comment);
                Ok(value)
            }
        }
    }

    fn parse_sequence(
        &mut self,
        first_line: usize,
        column: usize,
        first_head: Range<usize>,
        depth: usize,
    ) -> Result<Node> {
        self.check_depth(first_line, column, depth)?;
        let mut items = Vec::new();
        let mut head = first_head;
        let mut line_index = first_line;

        let foot = loop {
            let after_dash = &self.text(line_index)[column + 1..];
            let gap_len = after_dash.len() - after_dash.trim_start_matches(' ').len();
            let (gap, content) = after_dash.split_at(gap_len);
            let content_column = column + 1 + gap_len;
            if content.starts_with('\t') {
                return Err(self.error(
                    line_index,
                    content_column,
                    "tabs after '-' are not supported",
                ));
            }

            let starts_mapping = !content.starts_with('#')
                && inline::scan_key(content)
                    .map_err(|e| self.inline_error(line_index, content_column, e))?
                    .is_some();
            let inline_start = line_index..line_index;
            let mut item = if content.is_empty() || content.starts_with('#') {
                self.parse_item_on_next_lines(line_index, column, gap, content, depth)?
            } else {
                let mut item = if is_dash_item(content) {
                    self.parse_sequence(line_index, content_column, inline_start, depth + 1)?
                } else if starts_mapping {
                    self.parse_mapping(line_index, content_column, inline_start, depth + 1)?
                } else {
                    self.parse_inline(line_index, content_column, Some(column), depth + 1)?
                };
                item.layout.lead = gap.to_string();
                item
            };
            *item.head_comment_mut() = self.comment(head, column);
            items.push(item);

            let trivia = self.take_trivia();
            if self.continues(column, true)? {
                head = trivia;
                line_index = self.pos;
            } else {
                break self.split_foot(trivia, column);
            }
        };

        let mut node = Node::sequence(items);
        *node.foot_comment_mut() = foot;
        Ok(node)
    }

    /// An item whose dash line holds nothing but an optional comment: either
    /// a block collection on the following lines or an empty scalar.
    fn parse_item_on_next_lines(
        &mut self,
        line_index: usize,
        column: usize,
        gap: &str,
        comment: &str,
        depth: usize,
    ) -> Result<Node> {
        let comment = (!comment.is_empty()).then(|| comment.to_string());
        self.pos = line_index + 1;
        let trivia = self.take_trivia();
        let next = self
            .current()
            .filter(|line| line.indent > column && !is_document_marker(line))
            .map(|line| line.indent);

        let mut item = match next {
            Some(indent) => {
                let value_line = self.pos;
                let mut item = self.parse_block_node(indent, trivia, depth + 1)?;
                let is_block_collection = item.style() == Style::Block
                    && matches!(item.kind(), NodeKind::Mapping(_) | NodeKind::Sequence(_));
                if !is_block_collection {
                    return Err(self.error(
                        value_line,
                        indent,
                        "sequence item values must start on the line of their dash",
                    ));
                }
                item.layout.next_line = true;
                item.layout.indent = Some(indent - column);
                item
            }
            None => {
                self.pos = trivia.start;
                Node::empty_scalar()
            }
        };
        item.layout.eol_gap = gap.to_string();
        item.set_line_comment(comment);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines;

    fn parse(text: &str) -> Node {
        let (lines, frame) = lines::split(text, false).unwrap();
        BlockParser::new(lines, 16).parse_document(frame).unwrap()
    }

    fn parse_err(text: &str) -> Error {
        let (lines, frame) = lines::split(text, false).unwrap();
        BlockParser::new(lines, 16).parse_document(frame).unwrap_err()
    }

    #[test]
    fn test_head_comment_attaches_to_key() {
        let doc = parse("a: 1\n## lock\nb: 2\n");
        let root = doc.document_root().unwrap();
        let pairs = root.as_mapping().unwrap();
        assert_eq!(pairs[1].key.head_comment().text(), "## lock");
    }

    #[test]
    fn test_leading_comment_split_at_blank_line() {
        let doc = parse("# file header\n\n## lock\nkey: v\n");
        assert_eq!(doc.head_comment().text(), "# file header");
        let root = doc.document_root().unwrap();
        assert_eq!(root.as_mapping().unwrap()[0].key.head_comment().text(), "## lock");
    }

    #[test]
    fn test_foot_comment_of_nested_mapping() {
        let doc = parse("a:\n  b: 1\n  # inner\n# outer\nc: 2\n");
        let root = doc.document_root().unwrap();
        let a = root.get("a").unwrap();
        assert_eq!(a.foot_comment().text(), "# inner");
        assert_eq!(root.as_mapping().unwrap()[1].key.head_comment().text(), "# outer");
    }

    #[test]
    fn test_line_comments() {
        let doc = parse("a: 1 ## lock\nb: # note\n  c: 2\n");
        let root = doc.document_root().unwrap();
        let pairs = root.as_mapping().unwrap();
        assert_eq!(pairs[0].value.line_comment(), Some("## lock"));
        assert_eq!(pairs[1].key.line_comment(), Some("# note"));
        assert!(pairs[1].value.is_mapping());
    }

    #[test]
    fn test_sequences() {
        let doc = parse("list:\n- a\n- b: 1\n  c: 2\n-\n  - nested\n");
        let list = doc.document_root().unwrap().get("list").unwrap();
        let items = list.as_sequence().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].scalar_value(), Some("a"));
        assert_eq!(items[1].len(), 2);
        assert!(items[2].is_sequence());
    }

    #[test]
    fn test_block_scalar_lines() {
        let doc = parse("text: |\n  one\n\n  two\nnext: x\n");
        let root = doc.document_root().unwrap();
        let text = root.get("text").unwrap();
        let Some(Repr::Block { lines, .. }) = text.as_scalar().map(|s| &s.repr) else {
            panic!("expected block scalar");
        };
        assert_eq!(lines.len(), 3);
        assert_eq!(text.layout.indent, Some(2));
        assert_eq!(root.get("next").and_then(Node::scalar_value), Some("x"));
    }

    #[test]
    fn test_empty_values() {
        let doc = parse("a:\nb: # nothing\n");
        let root = doc.document_root().unwrap();
        assert_eq!(root.get("a").and_then(Node::scalar_value), Some(""));
        assert_eq!(root.get("b").unwrap().line_comment(), Some("# nothing"));
    }

    #[test]
    fn test_structure_errors() {
        let err = parse_err("a: 1\n   b: 2\n");
        assert_eq!(err.location().map(|l| l.line), Some(2));
        let err = parse_err("a: |\n  x\nb:\n  |\n    y\n");
        assert!(err.to_string().contains("block scalars"));
        let err = parse_err("a: 1\n...\nb: 2\n");
        assert!(err.to_string().contains("only one document"));
    }

    #[test]
    fn test_depth_limit() {
        let (lines, frame) = lines::split("a:\n b:\n  c:\n   d: 1\n", false).unwrap();
        let err = BlockParser::new(lines, 2).parse_document(frame).unwrap_err();
        assert!(err.to_string().contains("maximum depth of 2"));
    }
}
