//! Error types for parsing and path lookup.

use std::fmt;
use thiserror::Error;

/// Result type alias for yamlock-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A position in the source text.
///
/// `line` and `column` are 1-based. `offset` counts from the start of the
/// document body and is informational: the scanner reports characters while
/// the layout pass reports bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Why a path segment could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFailure {
    /// The node reached before the segment is not a mapping.
    NotAMapping,
    /// The mapping has no key with the segment's text.
    MissingKey,
}

/// Errors that can occur while parsing or navigating a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed or unsupported input.
    #[error("Parse error: {message} ({location})")]
    ParseError {
        message: String,
        location: SourceLocation,
    },

    /// A path segment could not be resolved.
    #[error("{}", describe_missing(path, segment, parent, reason))]
    PathNotFound {
        /// The full path as given by the caller.
        path: String,
        /// The segment that failed.
        segment: String,
        /// The segments resolved before the failing one, joined with `.`.
        parent: String,
        reason: PathFailure,
    },

    /// The path resolved to a collection where a scalar was required.
    #[error("value at '{path}' is a {kind}, not a scalar")]
    NotAScalar { path: String, kind: &'static str },
}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, location: SourceLocation) -> Self {
        Error::ParseError {
            message: message.into(),
            location,
        }
    }

    /// Source location of a parse error.
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Error::ParseError { location, .. } => Some(*location),
            _ => None,
        }
    }
}

fn describe_missing(path: &str, segment: &str, parent: &str, reason: &PathFailure) -> String {
    let parent = if parent.is_empty() { "<root>" } else { parent };
    match reason {
        PathFailure::NotAMapping => format!(
            "path '{path}': key '{segment}' does not exist ('{parent}' is not a mapping)"
        ),
        PathFailure::MissingKey => {
            format!("path '{path}': key '{segment}' does not exist in '{parent}'")
        }
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let marker = err.marker();
        Error::ParseError {
            message: err.to_string(),
            location: SourceLocation {
                offset: marker.index(),
                line: marker.line(),
                column: marker.col() + 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_not_found_message_names_segment() {
        let err = Error::PathNotFound {
            path: "a.b.c".into(),
            segment: "b".into(),
            parent: "a".into(),
            reason: PathFailure::MissingKey,
        };
        assert_eq!(err.to_string(), "path 'a.b.c': key 'b' does not exist in 'a'");
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::parse(
            "tabs are not allowed in indentation",
            SourceLocation {
                offset: 4,
                line: 2,
                column: 1,
            },
        );
        assert_eq!(
            err.to_string(),
            "Parse error: tabs are not allowed in indentation (line 2, column 1)"
        );
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }
}
