/*
 * lines.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Splitting source text into classified physical lines.
 */

use crate::error::{Error, Result, SourceLocation};
use crate::node::{Frame, LineEnding};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    /// Empty or whitespace-only.
    Blank,
    /// First non-blank character is `#`.
    Comment,
    Content,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    /// Line text without its terminator.
    pub(crate) text: &'a str,
    /// Number of leading spaces.
    pub(crate) indent: usize,
    pub(crate) kind: LineKind,
    /// Byte offset of the line start in the original input.
    pub(crate) offset: usize,
}

/// Strip an optional byte order mark.
pub(crate) fn strip_bom(content: &str) -> (&str, bool) {
    match content.strip_prefix('\u{feff}') {
        Some(rest) => (rest, true),
        None => (content, false),
    }
}

/// Split `content` (BOM already removed) into lines and record the
/// byte-level framing needed to reproduce it.
pub(crate) fn split(content: &str, bom: bool) -> Result<(Vec<Line<'_>>, Frame)> {
    let line_ending = if content.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };
    let final_newline = content.ends_with('\n');
    let frame = Frame {
        bom,
        line_ending,
        final_newline,
        ..Frame::default()
    };

    if content.is_empty() {
        return Ok((Vec::new(), frame));
    }

    let body = if final_newline {
        &content[..content.len() - 1]
    } else {
        content
    };
    let base = if bom { '\u{feff}'.len_utf8() } else { 0 };

    let raw_lines: Vec<&str> = body.split('\n').collect();
    let last = raw_lines.len() - 1;
    let mut lines = Vec::with_capacity(raw_lines.len());
    let mut offset = base;

    for (index, raw) in raw_lines.into_iter().enumerate() {
        let location = SourceLocation {
            offset,
            line: index + 1,
            column: 1,
        };
        let text = match line_ending {
            LineEnding::CrLf => match raw.strip_suffix('\r') {
                Some(text) => text,
                None if index == last && !final_newline => raw,
                None => {
                    return Err(Error::parse("mixed line endings are not supported", location));
                }
            },
            LineEnding::Lf => raw,
        };
        if text.contains('\r') {
            return Err(Error::parse(
                "carriage returns inside a line are not supported",
                location,
            ));
        }
        lines.push(classify(text, offset, location)?);
        offset += raw.len() + 1;
    }

    Ok((lines, frame))
}

fn classify(text: &str, offset: usize, location: SourceLocation) -> Result<Line<'_>> {
    let indent = text.len() - text.trim_start_matches(' ').len();
    let rest = text.trim_start_matches([' ', '\t']);
    let kind = if rest.is_empty() {
        LineKind::Blank
    } else if rest.starts_with('#') {
        LineKind::Comment
    } else {
        LineKind::Content
    };
    if kind == LineKind::Content && text[indent..].starts_with('\t') {
        return Err(Error::parse(
            "tabs are not allowed in indentation",
            SourceLocation {
                column: indent + 1,
                offset: offset + indent,
                ..location
            },
        ));
    }
    Ok(Line {
        text,
        indent,
        kind,
        offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tracks_final_newline() {
        let (lines, frame) = split("a: 1\n", false).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(frame.final_newline);

        let (lines, frame) = split("a: 1", false).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(!frame.final_newline);

        let (lines, _) = split("", false).unwrap();
        assert!(lines.is_empty());

        let (lines, _) = split("\n", false).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, LineKind::Blank);
    }

    #[test]
    fn test_classify_lines() {
        let (lines, _) = split("a:\n  # note\n   \n  b: 1\n", false).unwrap();
        let kinds: Vec<_> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Content,
                LineKind::Comment,
                LineKind::Blank,
                LineKind::Content
            ]
        );
        assert_eq!(lines[1].indent, 2);
        assert_eq!(lines[3].offset, 15);
    }

    #[test]
    fn test_crlf_detection() {
        let (lines, frame) = split("a: 1\r\nb: 2\r\n", false).unwrap();
        assert_eq!(frame.line_ending, LineEnding::CrLf);
        assert_eq!(lines[1].text, "b: 2");

        let err = split("a: 1\r\nb: 2\n", false).unwrap_err();
        assert!(err.to_string().contains("mixed line endings"));
    }

    #[test]
    fn test_tab_indentation_rejected() {
        let err = split("a:\n\tb: 1\n", false).unwrap_err();
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }
}
