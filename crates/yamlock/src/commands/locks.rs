//! Locks command implementation

use std::path::Path;

use anyhow::Result;
use yamlock_merge::locked_paths;

use super::load;

pub fn execute(file: &Path) -> Result<()> {
    let doc = load(file)?;
    for path in locked_paths(&doc) {
        println!("{path}");
    }
    Ok(())
}
