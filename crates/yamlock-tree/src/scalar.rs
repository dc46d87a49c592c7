/*
 * scalar.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Scalar values and their source representation.
 */

use crate::node::Style;
use std::fmt::Write;

/// A scalar's text together with the exact source text that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    value: String,
    pub(crate) repr: Repr,
}

/// How a scalar is written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Repr {
    /// Plain or quoted text on a single line, including quotes.
    Inline(String),
    /// A `|` or `>` block scalar: the header (`|-`, `>2`, ...) and content
    /// lines relative to the content indentation.
    Block { header: String, lines: Vec<BlockLine> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockLine {
    Text(String),
    /// Empty or whitespace-only line, verbatim.
    Blank(String),
}

impl Scalar {
    pub(crate) fn new(value: String, repr: Repr) -> Self {
        Self { value, repr }
    }

    /// The decoded text of the scalar.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The scalar as written in the source, for single-line scalars.
    pub fn source_text(&self) -> Option<&str> {
        match &self.repr {
            Repr::Inline(raw) => Some(raw),
            Repr::Block { .. } => None,
        }
    }

    pub(crate) fn set_decoded(&mut self, value: String) {
        self.value = value;
    }
}

/// Encode `value` in `style`, falling back to double quotes when the style
/// cannot represent it. Folded scalars are rewritten as literal ones.
pub(crate) fn encode(value: &str, style: Style) -> (Repr, Style) {
    match style {
        Style::Plain | Style::Block | Style::Flow if is_plain_safe(value) => {
            (Repr::Inline(value.to_string()), Style::Plain)
        }
        Style::SingleQuoted if is_single_quotable(value) => {
            (Repr::Inline(single_quote(value)), Style::SingleQuoted)
        }
        Style::Literal | Style::Folded if is_literal_safe(value) => {
            (literal(value), Style::Literal)
        }
        _ => (Repr::Inline(double_quote(value)), Style::DoubleQuoted),
    }
}

/// Whether `value` can be written as a plain scalar in any context,
/// including inside a flow collection.
pub(crate) fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if value.trim() != value || value.chars().any(|c| c.is_control()) {
        return false;
    }
    if matches!(
        first,
        '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    ) {
        return false;
    }
    if matches!(first, '-' | '?' | ':') {
        match value.chars().nth(1) {
            Some(second) if !second.is_whitespace() => {}
            _ => return false,
        }
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }
    if value.chars().any(|c| matches!(c, ',' | '[' | ']' | '{' | '}')) {
        return false;
    }
    !matches!(value, "---" | "...")
}

fn is_single_quotable(value: &str) -> bool {
    !value.chars().any(|c| c.is_control() && c != '\t')
}

fn is_literal_safe(value: &str) -> bool {
    if value.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return false;
    }
    match value.lines().find(|line| !line.is_empty()) {
        Some(line) => !line.starts_with(' '),
        None => true,
    }
}

fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn literal(value: &str) -> Repr {
    let body = value.trim_end_matches('\n');
    let trailing = value.len() - body.len();
    let chomp = match trailing {
        0 => "-",
        1 => "",
        _ => "+",
    };
    let mut lines: Vec<BlockLine> = if body.is_empty() {
        Vec::new()
    } else {
        body.split('\n')
            .map(|line| {
                if line.is_empty() {
                    BlockLine::Blank(String::new())
                } else {
                    BlockLine::Text(line.to_string())
                }
            })
            .collect()
    };
    for _ in 1..trailing {
        lines.push(BlockLine::Blank(String::new()));
    }
    Repr::Block {
        header: format!("|{chomp}"),
        lines,
    }
}
