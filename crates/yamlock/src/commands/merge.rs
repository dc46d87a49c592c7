//! Merge command implementation

use std::path::Path;

use anyhow::Result;
use yamlock_merge::{MergeOptions, merge_with_options};
use yamlock_tree::serialize;

use super::{OutputArgs, load, write};

pub fn execute(dest_path: &Path, src_path: &Path, scrub: bool, output: &OutputArgs) -> Result<()> {
    let mut dest = load(dest_path)?;
    let src = load(src_path)?;

    let options = MergeOptions {
        scrub_stale_locks: scrub,
    };
    let report = merge_with_options(&mut dest, src, &options);
    for path in &report.carried {
        tracing::info!(path = %path, "carried locked value");
    }
    if report.scrubbed > 0 {
        tracing::info!(
            count = report.scrubbed,
            "replaced locked values not refreshed by the merge with TODO"
        );
    }

    write(&serialize(&dest), dest_path, output)
}
