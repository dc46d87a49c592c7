/*
 * todo.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Neutralizing previously locked values before a merge.
 */

use crate::lock::is_locked;
use yamlock_tree::{Node, NodeKind};

/// Text written over every scalar inside a locked pair.
pub const PLACEHOLDER: &str = "TODO";

/// Overwrite every scalar inside a locked pair with [`PLACEHOLDER`].
///
/// Mappings are searched for locked pairs; once inside one, mappings and
/// sequences are descended fully and each scalar is replaced, keys of
/// nested mappings included. The key of the locked pair itself keeps its
/// text, as do comments and structure. Sequences outside any lock are not
/// searched, matching how merging reaches locks.
///
/// Returns the number of scalars replaced.
pub fn mark_locked_as_todo(root: &mut Node) -> usize {
    let count = mark(root, false);
    if count > 0 {
        tracing::debug!(count, "replaced stale locked scalars with placeholder");
    }
    count
}

fn mark(node: &mut Node, locked: bool) -> usize {
    if node.is_scalar() {
        return if locked {
            usize::from(node.set_scalar_value(PLACEHOLDER))
        } else {
            0
        };
    }
    match node.kind_mut() {
        NodeKind::Document(root) => mark(root, locked),
        NodeKind::Mapping(pairs) => pairs
            .iter_mut()
            .map(|pair| {
                let keys = if locked { mark(&mut pair.key, true) } else { 0 };
                let inside = locked || is_locked(&pair.key, &pair.value);
                keys + mark(&mut pair.value, inside)
            })
            .sum(),
        NodeKind::Sequence(items) if locked => items.iter_mut().map(|item| mark(item, true)).sum(),
        NodeKind::Sequence(_) | NodeKind::Scalar(_) => 0,
    }
}
