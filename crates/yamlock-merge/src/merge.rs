/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Overlaying locked subtrees of one document onto another.
 */

use std::fmt;

use crate::lock::{contains_lock, is_locked};
use crate::todo::mark_locked_as_todo;
use yamlock_tree::{Node, NodeKind, Pair};

/// Options for [`merge_with_options`].
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Replace scalars under the destination's existing locks with the
    /// placeholder before overlaying (default: true).
    pub scrub_stale_locks: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            scrub_stale_locks: true,
        }
    }
}

/// Something the merge tolerated but a caller may want to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    /// Locked content in the source sits under a mapping, but the
    /// destination has some other kind of node at that key, so the locked
    /// content was not carried over.
    ShapeMismatch {
        path: String,
        dest_kind: &'static str,
        src_kind: &'static str,
    },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeWarning::ShapeMismatch {
                path,
                dest_kind,
                src_kind,
            } => write!(
                f,
                "locked content under '{path}' was dropped: the destination has a {dest_kind} where the source has a {src_kind}"
            ),
        }
    }
}

/// What a merge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Dotted paths of the locked pairs carried into the destination.
    pub carried: Vec<String>,
    /// Number of destination scalars replaced with the placeholder.
    pub scrubbed: usize,
    pub warnings: Vec<MergeWarning>,
}

impl MergeReport {
    /// True when at least one locked pair was carried over.
    pub fn carried_any(&self) -> bool {
        !self.carried.is_empty()
    }
}

/// Merge the locked subtrees of `src` into `dest` with default options.
///
/// See [`merge_with_options`].
pub fn merge(dest: &mut Node, src: Node) -> MergeReport {
    merge_with_options(dest, src, &MergeOptions::default())
}

/// Merge the locked subtrees of `src` into `dest`.
///
/// Both nodes must be documents; otherwise nothing happens. The
/// destination's stale locked scalars are first replaced with the
/// placeholder (unless disabled in `options`). Then every locked pair
/// reachable through the source's mappings is copied over the pair with
/// the same key in the destination, creating intermediate mappings as
/// needed. Everything else in the destination is left as it was.
///
/// `src` is consumed: locked subtrees are moved, comments and layout
/// included, into `dest`.
pub fn merge_with_options(dest: &mut Node, src: Node, options: &MergeOptions) -> MergeReport {
    let mut report = MergeReport::default();
    let Some(dest_root) = dest.document_root_mut() else {
        tracing::debug!("destination is not a document, skipping merge");
        return report;
    };
    let NodeKind::Document(src_root) = src.into_kind() else {
        tracing::debug!("source is not a document, skipping merge");
        return report;
    };

    if options.scrub_stale_locks {
        report.scrubbed = mark_locked_as_todo(dest_root);
    }

    let mut merger = Merger {
        path: Vec::new(),
        report: &mut report,
    };
    merger.merge_subtrees(dest_root, *src_root);

    tracing::debug!(
        carried = report.carried.len(),
        scrubbed = report.scrubbed,
        warnings = report.warnings.len(),
        "merge finished"
    );
    report
}

struct Merger<'r> {
    path: Vec<String>,
    report: &'r mut MergeReport,
}

impl Merger<'_> {
    fn dotted_path(&self) -> String {
        if self.path.is_empty() {
            ".".to_string()
        } else {
            self.path.join(".")
        }
    }

    /// Overlay the locked pairs found under `src` onto `dest`.
    ///
    /// Returns true when anything locked was found, in which case `dest`
    /// has been updated and takes `src`'s style.
    fn merge_subtrees(&mut self, dest: &mut Node, mut src: Node) -> bool {
        if !dest.is_mapping() || !src.is_mapping() {
            if src.is_mapping() && contains_lock(&src) {
                let warning = MergeWarning::ShapeMismatch {
                    path: self.dotted_path(),
                    dest_kind: dest.kind_name(),
                    src_kind: src.kind_name(),
                };
                tracing::warn!("{warning}");
                self.report.warnings.push(warning);
            }
            return false;
        }

        let pairs = src.as_mapping_mut().map(std::mem::take).unwrap_or_default();
        let mut found = false;
        for Pair { key, value } in pairs {
            self.path.push(key.scalar_value().unwrap_or_default().to_string());
            if self.merge_pair(dest, key, value) {
                found = true;
            }
            self.path.pop();
        }

        if found {
            dest.copy_style_from(&src);
        }
        found
    }

    fn merge_pair(&mut self, dest: &mut Node, key: Node, value: Node) -> bool {
        let index = key.scalar_value().and_then(|name| dest.position(name));
        let Some(pairs) = dest.as_mapping_mut() else {
            return false;
        };

        if is_locked(&key, &value) {
            let path = self.dotted_path();
            tracing::debug!(path = %path, "carrying locked subtree");
            self.report.carried.push(path);
            let pair = Pair::new(key, value);
            match index {
                Some(index) => pairs[index] = pair,
                None => pairs.push(pair),
            }
            return true;
        }

        match index {
            Some(index) => {
                let found = self.merge_subtrees(&mut pairs[index].value, value);
                if found {
                    pairs[index].key = key;
                }
                found
            }
            None => {
                let mut seed = Node::mapping(Vec::new());
                seed.copy_comments_from(&value);
                let found = self.merge_subtrees(&mut seed, value);
                if found {
                    pairs.push(Pair::new(key, seed));
                }
                found
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use yamlock_tree::{parse, serialize};

    fn merged(dest: &str, src: &str) -> (String, MergeReport) {
        let mut dest = parse(dest).unwrap();
        let report = merge(&mut dest, parse(src).unwrap());
        (serialize(&dest), report)
    }

    #[test]
    fn test_overlay_locked_scalar() {
        let (text, report) = merged("replicas: 3\n", "replicas: 5  ## lock\n");
        assert_eq!(text, "replicas: 5  ## lock\n");
        assert_eq!(report.carried, vec!["replicas"]);
    }

    #[test]
    fn test_append_missing_locked_key() {
        let (text, _) = merged("a: 1\n", "a: 1\nb: 2  ## lock\n");
        assert_eq!(text, "a: 1\nb: 2  ## lock\n");
    }

    #[test]
    fn test_nested_lock_creates_structure() {
        let (text, report) = merged(
            "name: app\n",
            "name: generated\ndb:\n  ## lock\n  host: db.internal\n  port: 5432\n",
        );
        assert_eq!(report.carried, vec!["db.host"]);
        assert_snapshot!(text, @r"
        name: app
        db:
          ## lock
          host: db.internal
        ");
    }

    #[test]
    fn test_nested_lock_into_existing_mapping() {
        let (text, _) = merged(
            "db:\n  host: localhost\n  port: 5432\n",
            "db:\n  host: db.internal ## lock\n  port: 6000\n",
        );
        assert_eq!(text, "db:\n  host: db.internal ## lock\n  port: 5432\n");
    }

    #[test]
    fn test_locked_sequence_is_carried_whole() {
        let (text, _) = merged(
            "ports:\n  - 80\n",
            "## lock\nports:\n  - 8080\n  - 8443\n",
        );
        assert_eq!(text, "## lock\nports:\n  - 8080\n  - 8443\n");
    }

    #[test]
    fn test_stale_lock_becomes_placeholder() {
        let (text, report) = merged("## lock\nx: 9\n", "x: 5\n");
        assert_eq!(text, "## lock\nx: TODO\n");
        assert_eq!(report.scrubbed, 1);
        assert!(!report.carried_any());
    }

    #[test]
    fn test_refreshed_lock_replaces_placeholder() {
        let (text, report) = merged("## lock\nx: 9\ny: 1\n", "y: 2\n## lock\nx: 10\n");
        assert_eq!(text, "## lock\nx: 10\ny: 1\n");
        assert_eq!(report.scrubbed, 1);
    }

    #[test]
    fn test_scrub_can_be_disabled() {
        let mut dest = parse("## lock\nx: 9\n").unwrap();
        let options = MergeOptions {
            scrub_stale_locks: false,
        };
        let report = merge_with_options(&mut dest, parse("x: 5\n").unwrap(), &options);
        assert_eq!(serialize(&dest), "## lock\nx: 9\n");
        assert_eq!(report.scrubbed, 0);
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let (text, report) = merged("db: none\n", "db:\n  host: x ## lock\n");
        assert_eq!(text, "db: none\n");
        assert_eq!(
            report.warnings,
            vec![MergeWarning::ShapeMismatch {
                path: "db".to_string(),
                dest_kind: "scalar",
                src_kind: "mapping",
            }]
        );
        assert_eq!(
            report.warnings[0].to_string(),
            "locked content under 'db' was dropped: the destination has a scalar where the source has a mapping"
        );
    }

    #[test]
    fn test_non_documents_are_ignored() {
        let mut dest = Node::mapping(Vec::new());
        let src = parse("a: 1 ## lock\n").unwrap();
        assert_eq!(merge(&mut dest, src), MergeReport::default());
        assert!(dest.is_empty());
    }

    #[test]
    fn test_duplicate_keys_use_first_match() {
        let (text, _) = merged("a: 1\na: 2\n", "a: 3 ## lock\n");
        assert_eq!(text, "a: 3 ## lock\na: 2\n");
    }

    #[test]
    fn test_unlocked_source_only_keys_are_ignored() {
        let (text, report) = merged("a: 1\n", "b: 2\nc:\n  d: 3\n");
        assert_eq!(text, "a: 1\n");
        assert_eq!(report, MergeReport::default());
    }
}
