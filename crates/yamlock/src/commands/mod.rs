//! Command implementations for the yamlock CLI
//!
//! Each command reads its inputs, delegates to yamlock-tree or
//! yamlock-merge, and writes the result.

pub mod get;
pub mod hash;
pub mod locks;
pub mod merge;
pub mod set;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use yamlock_tree::{Node, parse_bytes};

use crate::diagnostics::SourceError;

/// Where a command writes the document it produces.
#[derive(Debug, Default, Args)]
pub struct OutputArgs {
    /// Write the result to FILE instead of stdout
    #[arg(short, long, value_name = "FILE", conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file with the result
    #[arg(long)]
    pub in_place: bool,
}

/// Read and parse a document, keeping the text for error rendering.
pub(crate) fn load(path: &Path) -> Result<Node> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_bytes(&bytes).map_err(|error| {
        SourceError {
            path: path.display().to_string(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
            error,
        }
        .into()
    })
}

/// Write `text` according to `output`; `input` is the file `--in-place`
/// overwrites.
pub(crate) fn write(text: &str, input: &Path, output: &OutputArgs) -> Result<()> {
    let target = if output.in_place {
        Some(input)
    } else {
        output.output.as_deref()
    };
    match target {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "wrote document");
        }
        None => print!("{text}"),
    }
    Ok(())
}
