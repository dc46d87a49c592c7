//! Set command implementation

use std::path::Path;

use anyhow::{Context, Result};
use yamlock_tree::{serialize, set_scalar};

use super::{OutputArgs, load, write};

pub fn execute(file: &Path, path: &str, value: &str, output: &OutputArgs) -> Result<()> {
    let mut doc = load(file)?;
    set_scalar(&mut doc, path, value)
        .with_context(|| format!("cannot set '{path}' in {}", file.display()))?;
    tracing::info!(path, value, "updated value");
    write(&serialize(&doc), file, output)
}
