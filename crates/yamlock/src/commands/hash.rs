//! Hash command implementation

use std::path::PathBuf;

use anyhow::Result;
use yamlock_merge::content_hash;

use super::load;

pub fn execute(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let doc = load(file)?;
        println!("{}  {}", content_hash(&doc), file.display());
    }
    Ok(())
}
