//! Locked-subtree merging for comment-preserving YAML documents.
//!
//! Operators tag a key with a `## lock` comment to say "keep my value when
//! this document is regenerated". This crate carries those tagged subtrees
//! from an existing document into a freshly generated one:
//!
//! - [`is_locked`] decides whether a key/value pair carries the marker
//! - [`mark_locked_as_todo`] replaces stale locked values with `TODO`
//! - [`merge`] overlays every locked pair of the source onto the destination
//! - [`content_hash`] hashes a document while ignoring locked pairs
//!
//! # Example
//!
//! ```rust
//! use yamlock_merge::merge;
//! use yamlock_tree::{parse, serialize};
//!
//! let previous = parse("## lock\nreplicas: 5\nimage: app:1.0\n").unwrap();
//! let mut generated = parse("replicas: 3\nimage: app:2.0\n").unwrap();
//!
//! let report = merge(&mut generated, previous);
//! assert_eq!(report.carried, vec!["replicas"]);
//! assert_eq!(serialize(&generated), "## lock\nreplicas: 5\nimage: app:2.0\n");
//! ```

mod hash;
mod lock;
mod merge;
mod todo;

pub use hash::{ContentHash, content_hash};
pub use lock::{contains_lock, is_lock_comment, is_locked, locked_paths};
pub use merge::{MergeOptions, MergeReport, MergeWarning, merge, merge_with_options};
pub use todo::{PLACEHOLDER, mark_locked_as_todo};
