//! Get command implementation

use std::path::Path;

use anyhow::Result;
use yamlock_tree::{find_node, serialize};

use super::load;

/// Print a scalar's value, or the YAML text of a collection.
pub fn execute(file: &Path, path: &str) -> Result<()> {
    let doc = load(file)?;
    let node = find_node(&doc, path)?;
    match node.scalar_value() {
        Some(value) => println!("{value}"),
        None => print!("{}", serialize(node)),
    }
    Ok(())
}
