//! Rendering parse errors against the source text.

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// A document that failed to parse, with the text it was read from.
#[derive(Debug, Error)]
#[error("{path}: {error}")]
pub struct SourceError {
    pub path: String,
    pub content: String,
    #[source]
    pub error: yamlock_tree::Error,
}

/// Character offset of a 1-based line and column, clamped to the text.
fn char_offset(content: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in content.split('\n').enumerate() {
        let width = text.chars().count();
        if index + 1 == line {
            return offset + column.saturating_sub(1).min(width);
        }
        offset += width + 1;
    }
    content.chars().count()
}

/// Render `err` as a source snippet with the failing position labelled.
/// Errors without a location fall back to a single line.
pub fn render(err: &SourceError, color: bool) -> String {
    let Some(location) = err.error.location() else {
        return format!("Error: {err}\n");
    };
    let message = match &err.error {
        yamlock_tree::Error::ParseError { message, .. } => message.clone(),
        other => other.to_string(),
    };

    let start = char_offset(&err.content, location.line, location.column);
    let end = (start + 1).min(err.content.chars().count()).max(start);

    let report = Report::build(ReportKind::Error, err.path.clone(), start)
        .with_config(Config::default().with_color(color))
        .with_message("could not parse YAML document")
        .with_label(
            Label::new((err.path.clone(), start..end))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish();

    let mut output = Vec::new();
    match report.write(
        (err.path.clone(), Source::from(err.content.as_str())),
        &mut output,
    ) {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => format!("Error: {err}\n"),
    }
}
