/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Lossless YAML node model.
 *
 * Every node owns its children exclusively and carries the comments and
 * layout it was parsed with, so that emitting an unmodified tree reproduces
 * the source byte for byte.
 */

use crate::scalar::{self, Scalar};

/// Presentation style of a node.
///
/// Collections are `Block` or `Flow`; scalars use one of the five YAML
/// scalar styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// Indentation-based collection (`key: value` lines, `- item` lines).
    #[default]
    Block,
    /// Bracketed collection on a single line (`[a, b]`, `{k: v}`).
    Flow,
    /// Unquoted scalar.
    Plain,
    /// `'quoted'` scalar.
    SingleQuoted,
    /// `"quoted"` scalar with escapes.
    DoubleQuoted,
    /// `|` block scalar.
    Literal,
    /// `>` block scalar.
    Folded,
}

impl Style {
    /// True for the two block scalar styles.
    pub fn is_block_scalar(self) -> bool {
        matches!(self, Style::Literal | Style::Folded)
    }
}

/// The structural variant of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root wrapper around the single top-level value.
    Document(Box<Node>),
    /// Ordered key/value pairs. Duplicate keys are kept as they appear.
    Mapping(Vec<Pair>),
    /// Ordered items.
    Sequence(Vec<Node>),
    /// A leaf text value.
    Scalar(Scalar),
}

/// A key/value pair of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: Node,
    pub value: Node,
}

impl Pair {
    pub fn new(key: Node, value: Node) -> Self {
        Self { key, value }
    }

    /// Text of the key when the key is a scalar.
    pub fn key_text(&self) -> Option<&str> {
        self.key.scalar_value()
    }
}

/// One line of a comment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommentLine {
    /// An empty or whitespace-only line, kept verbatim.
    Blank(String),
    /// A `#` comment. `offset` is its column relative to the owning node.
    Text { offset: isize, text: String },
}

/// A block of comment lines attached to a node.
///
/// Comment text is stored without indentation; blank lines interleaved with
/// the comments are kept so the block re-emits exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    entries: Vec<CommentLine>,
}

impl Comment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a comment block from text. Empty lines become blank lines,
    /// other lines are trimmed and prefixed with `# ` unless they already
    /// start with `#`.
    pub fn from_text(text: &str) -> Self {
        let mut comment = Comment::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                comment.push_blank(String::new());
            } else if trimmed.starts_with('#') {
                comment.push_text(0, trimmed.to_string());
            } else {
                comment.push_text(0, format!("# {trimmed}"));
            }
        }
        comment
    }

    /// True when the block has no lines at all, not even blank ones.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when at least one line is an actual `#` comment.
    pub fn has_text(&self) -> bool {
        self.lines().next().is_some()
    }

    /// The `#` lines of the block, without indentation.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            CommentLine::Text { text, .. } => Some(text.as_str()),
            CommentLine::Blank(_) => None,
        })
    }

    /// The `#` lines joined with newlines.
    pub fn text(&self) -> String {
        self.lines().collect::<Vec<_>>().join("\n")
    }

    pub(crate) fn entries(&self) -> &[CommentLine] {
        &self.entries
    }

    pub(crate) fn push_blank(&mut self, raw: String) {
        self.entries.push(CommentLine::Blank(raw));
    }

    pub(crate) fn push_text(&mut self, offset: isize, text: String) {
        self.entries.push(CommentLine::Text { offset, text });
    }
}

/// Line ending used by a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Framing of a document: markers and byte-level details outside the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) bom: bool,
    pub(crate) line_ending: LineEnding,
    pub(crate) final_newline: bool,
    /// The `---` line, verbatim.
    pub(crate) start_marker: Option<String>,
    /// The `...` line, verbatim.
    pub(crate) end_marker: Option<String>,
    /// Column of the root node's first line.
    pub(crate) root_column: usize,
    /// Comment and blank lines after the end marker, verbatim.
    pub(crate) trailer: Vec<String>,
    /// The document had no content line; its root is a placeholder.
    pub(crate) empty_root: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            bom: false,
            line_ending: LineEnding::Lf,
            final_newline: true,
            start_marker: None,
            end_marker: None,
            root_column: 0,
            trailer: Vec::new(),
            empty_root: false,
        }
    }
}

/// Whitespace and placement details that are not part of the data model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Layout {
    /// Whitespace between the introducing indicator (`:`, `-`, `[`, `{`, `,`)
    /// and the node.
    pub(crate) lead: String,
    /// Whitespace between the node and the following indicator (`:` after a
    /// key, `,`/`]`/`}` inside flow collections).
    pub(crate) trail: String,
    /// Column of the node's block content relative to its owner's column.
    pub(crate) indent: Option<usize>,
    /// Block content starts on the line after its introducer.
    pub(crate) next_line: bool,
    /// Whitespace before the line comment, or trailing whitespace.
    pub(crate) eol_gap: String,
    /// Whitespace inside an empty flow collection.
    pub(crate) inner: String,
    /// Present on document nodes only.
    pub(crate) frame: Option<Box<Frame>>,
}

/// A node of a comment-preserving YAML tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    style: Style,
    head_comment: Comment,
    line_comment: Option<String>,
    foot_comment: Comment,
    pub(crate) layout: Layout,
}

impl Node {
    pub(crate) fn with_kind(kind: NodeKind, style: Style) -> Self {
        Self {
            kind,
            style,
            head_comment: Comment::default(),
            line_comment: None,
            foot_comment: Comment::default(),
            layout: Layout::default(),
        }
    }

    /// Wrap a root value in a document.
    pub fn document(root: Node) -> Self {
        let mut node = Self::with_kind(NodeKind::Document(Box::new(root)), Style::Block);
        node.layout.frame = Some(Box::default());
        node
    }

    /// A block mapping with the given pairs.
    pub fn mapping(pairs: Vec<Pair>) -> Self {
        Self::with_kind(NodeKind::Mapping(pairs), Style::Block)
    }

    /// A block sequence with the given items.
    pub fn sequence(items: Vec<Node>) -> Self {
        Self::with_kind(NodeKind::Sequence(items), Style::Block)
    }

    /// A scalar, plain when the text allows it and double-quoted otherwise.
    pub fn scalar(value: impl Into<String>) -> Self {
        let value = value.into();
        let (repr, style) = scalar::encode(&value, Style::Plain);
        Self::with_kind(NodeKind::Scalar(Scalar::new(value, repr)), style)
    }

    /// A plain scalar with no text, as parsed from `key:` or `- `.
    pub(crate) fn empty_scalar() -> Self {
        Self::with_kind(
            NodeKind::Scalar(Scalar::new(String::new(), scalar::Repr::Inline(String::new()))),
            Style::Plain,
        )
    }

    pub fn with_head_comment(mut self, text: &str) -> Self {
        self.head_comment = Comment::from_text(text);
        self
    }

    pub fn with_line_comment(mut self, text: &str) -> Self {
        let text = text.trim();
        self.line_comment = Some(if text.starts_with('#') {
            text.to_string()
        } else {
            format!("# {text}")
        });
        if self.layout.eol_gap.is_empty() {
            self.layout.eol_gap = " ".to_string();
        }
        self
    }

    pub fn with_foot_comment(mut self, text: &str) -> Self {
        self.foot_comment = Comment::from_text(text);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn into_kind(self) -> NodeKind {
        self.kind
    }

    /// Lowercase name of the node's variant, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Document(_) => "document",
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Scalar(_) => "scalar",
        }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn head_comment(&self) -> &Comment {
        &self.head_comment
    }

    pub fn line_comment(&self) -> Option<&str> {
        self.line_comment.as_deref()
    }

    pub fn foot_comment(&self) -> &Comment {
        &self.foot_comment
    }

    pub(crate) fn head_comment_mut(&mut self) -> &mut Comment {
        &mut self.head_comment
    }

    pub(crate) fn foot_comment_mut(&mut self) -> &mut Comment {
        &mut self.foot_comment
    }

    pub(crate) fn set_line_comment(&mut self, comment: Option<String>) {
        self.line_comment = comment;
    }

    /// Copy head, line and foot comments from `other`, replacing this
    /// node's own.
    pub fn copy_comments_from(&mut self, other: &Node) {
        self.head_comment = other.head_comment.clone();
        self.line_comment = other.line_comment.clone();
        self.foot_comment = other.foot_comment.clone();
        self.layout.eol_gap = other.layout.eol_gap.clone();
    }

    /// Copy the presentation style of `other`, including its block
    /// indentation.
    pub fn copy_style_from(&mut self, other: &Node) {
        self.style = other.style;
        self.layout.indent = other.layout.indent;
        self.layout.next_line = other.layout.next_line;
    }

    pub fn is_document(&self) -> bool {
        matches!(self.kind, NodeKind::Document(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    /// The root value of a document node.
    pub fn document_root(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Document(root) => Some(root),
            _ => None,
        }
    }

    pub fn document_root_mut(&mut self) -> Option<&mut Node> {
        match &mut self.kind {
            NodeKind::Document(root) => Some(root),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[Pair]> {
        match &self.kind {
            NodeKind::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Vec<Pair>> {
        match &mut self.kind {
            NodeKind::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.kind {
            NodeKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Text of a scalar node.
    pub fn scalar_value(&self) -> Option<&str> {
        self.as_scalar().map(Scalar::value)
    }

    /// Index of the first pair whose key text equals `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.as_mapping()?
            .iter()
            .position(|pair| pair.key_text() == Some(key))
    }

    /// Value of the first pair whose key text equals `key`.
    pub fn get(&self, key: &str) -> Option<&Node> {
        let index = self.position(key)?;
        self.as_mapping().map(|pairs| &pairs[index].value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        let index = self.position(key)?;
        self.as_mapping_mut().map(|pairs| &mut pairs[index].value)
    }

    /// Replace the text of a scalar, re-encoding it in the node's style.
    ///
    /// Comments and surrounding layout are kept. Returns `false` (and does
    /// nothing) when the node is not a scalar.
    pub fn set_scalar_value(&mut self, value: impl Into<String>) -> bool {
        let NodeKind::Scalar(current) = &mut self.kind else {
            return false;
        };
        let value = value.into();
        let (repr, style) = scalar::encode(&value, self.style);
        *current = Scalar::new(value, repr);
        self.style = style;
        true
    }

    /// Number of children: pairs, items, or 1 for a document.
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Document(_) => 1,
            NodeKind::Mapping(pairs) => pairs.len(),
            NodeKind::Sequence(items) => items.len(),
            NodeKind::Scalar(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_constructor_picks_style() {
        assert_eq!(Node::scalar("hello").style(), Style::Plain);
        assert_eq!(Node::scalar("a: b").style(), Style::DoubleQuoted);
        assert_eq!(Node::scalar("").style(), Style::DoubleQuoted);
    }

    #[test]
    fn test_get_returns_first_duplicate() {
        let node = Node::mapping(vec![
            Pair::new(Node::scalar("a"), Node::scalar("1")),
            Pair::new(Node::scalar("a"), Node::scalar("2")),
        ]);
        assert_eq!(node.get("a").and_then(Node::scalar_value), Some("1"));
        assert_eq!(node.position("a"), Some(0));
        assert!(node.get("b").is_none());
    }

    #[test]
    fn test_get_mut_edits_first_duplicate() {
        let mut node = Node::mapping(vec![
            Pair::new(Node::scalar("a"), Node::scalar("1")),
            Pair::new(Node::scalar("a"), Node::scalar("2")),
        ]);
        assert!(node.get_mut("a").unwrap().set_scalar_value("9"));
        assert_eq!(node.get("a").and_then(Node::scalar_value), Some("9"));
        assert_eq!(node.as_mapping().unwrap()[1].value.scalar_value(), Some("2"));
        assert!(node.get_mut("b").is_none());
        assert!(Node::scalar("a").get_mut("a").is_none());
    }

    #[test]
    fn test_set_scalar_value_on_collection_is_rejected() {
        let mut node = Node::sequence(vec![Node::scalar("x")]);
        assert!(!node.set_scalar_value("y"));
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_comment_from_text() {
        let comment = Comment::from_text("## lock\n\nplain words");
        let lines: Vec<_> = comment.lines().collect();
        assert_eq!(lines, vec!["## lock", "# plain words"]);
        assert_eq!(comment.text(), "## lock\n# plain words");
        assert!(comment.has_text());
        assert!(!Comment::new().has_text());
    }

    #[test]
    fn test_copy_comments_and_style() {
        let src = Node::mapping(vec![])
            .with_head_comment("# head")
            .with_line_comment("## lock")
            .with_foot_comment("end of section")
            .with_style(Style::Flow);
        let mut dest = Node::mapping(vec![]);
        dest.copy_comments_from(&src);
        assert_eq!(dest.head_comment().text(), "# head");
        assert_eq!(dest.line_comment(), Some("## lock"));
        assert_eq!(dest.foot_comment().text(), "# end of section");
        assert_eq!(dest.style(), Style::Block);
        dest.copy_style_from(&src);
        assert_eq!(dest.style(), Style::Flow);
    }
}
