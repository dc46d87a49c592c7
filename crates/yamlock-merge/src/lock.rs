/*
 * lock.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Detection of `## lock` markers in comments.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use yamlock_tree::{Node, NodeKind};

static LOCK_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s*lock\s*$").expect("lock marker pattern is valid"));

/// True when a single comment line is a lock marker.
///
/// The match is case-sensitive and covers the whole line: `## lock` and
/// `##lock` match, `## Lock` and `## lock this` do not.
pub fn is_lock_comment(line: &str) -> bool {
    LOCK_MARKER.is_match(line.trim())
}

/// True when the pair `key: value` is locked.
///
/// Three placements are recognized: a line of the key's head comment, the
/// key's line comment, or the line comment of a scalar value.
pub fn is_locked(key: &Node, value: &Node) -> bool {
    key.head_comment().lines().any(is_lock_comment)
        || key.line_comment().is_some_and(is_lock_comment)
        || (value.is_scalar() && value.line_comment().is_some_and(is_lock_comment))
}

/// True when a locked pair is reachable from `node` through mappings.
pub fn contains_lock(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Document(root) => contains_lock(root),
        NodeKind::Mapping(pairs) => pairs
            .iter()
            .any(|pair| is_locked(&pair.key, &pair.value) || contains_lock(&pair.value)),
        NodeKind::Sequence(_) | NodeKind::Scalar(_) => false,
    }
}

/// Dotted paths of every locked pair reachable through mappings, in
/// document order. Pairs nested inside a locked pair are not listed
/// separately.
pub fn locked_paths(root: &Node) -> Vec<String> {
    let mut paths = Vec::new();
    let mut prefix = Vec::new();
    collect_locked(root, &mut prefix, &mut paths);
    paths
}

fn collect_locked<'a>(node: &'a Node, prefix: &mut Vec<&'a str>, paths: &mut Vec<String>) {
    match node.kind() {
        NodeKind::Document(root) => collect_locked(root, prefix, paths),
        NodeKind::Mapping(pairs) => {
            for pair in pairs {
                prefix.push(pair.key_text().unwrap_or_default());
                if is_locked(&pair.key, &pair.value) {
                    paths.push(prefix.join("."));
                } else {
                    collect_locked(&pair.value, prefix, paths);
                }
                prefix.pop();
            }
        }
        NodeKind::Sequence(_) | NodeKind::Scalar(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yamlock_tree::parse;

    fn first_pair_locked(text: &str) -> bool {
        let doc = parse(text).unwrap();
        let pair = &doc.document_root().unwrap().as_mapping().unwrap()[0];
        is_locked(&pair.key, &pair.value)
    }

    #[test]
    fn test_marker_variants() {
        assert!(is_lock_comment("## lock"));
        assert!(is_lock_comment("##lock"));
        assert!(is_lock_comment("##   lock   "));
        assert!(!is_lock_comment("## Lock"));
        assert!(!is_lock_comment("# lock"));
        assert!(!is_lock_comment("### lock"));
        assert!(!is_lock_comment("## lock it"));
        assert!(!is_lock_comment("## locked"));
    }

    #[test]
    fn test_head_comment_placement() {
        assert!(first_pair_locked("## lock\nreplicas: 3\n"));
        assert!(first_pair_locked("# pinned for prod\n## lock\nreplicas: 3\n"));
        assert!(!first_pair_locked("## Lock\nreplicas: 3\n"));
    }

    #[test]
    fn test_line_comment_placements() {
        assert!(first_pair_locked("replicas: 3  ## lock\n"));
        assert!(first_pair_locked("db:  ## lock\n  host: x\n"));
        assert!(!first_pair_locked("replicas: 3  # lock\n"));
    }

    #[test]
    fn test_collection_value_line_comment_does_not_lock() {
        assert!(!first_pair_locked("ports: [80, 443]  ## lock\n"));
    }

    #[test]
    fn test_locked_paths() {
        let doc = parse(
            "a: 1\n## lock\nb:\n  ## lock\n  inner: 1\nc:\n  d:\n    e: 1 ## lock\n  f: 2\nlist:\n  - x: 1 ## lock\n",
        )
        .unwrap();
        assert_eq!(locked_paths(&doc), vec!["b", "c.d.e"]);
        assert!(contains_lock(&doc));
        assert!(!contains_lock(&parse("list:\n  - x: 1 ## lock\n").unwrap()));
    }
}
