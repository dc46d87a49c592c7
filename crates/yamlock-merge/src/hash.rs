/*
 * hash.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Order-sensitive content hashing that ignores locked pairs.
 *
 * The hash detects drift in the generated part of a document. It covers
 * mapping keys, scalar text and structure in order, and skips locked pairs
 * entirely, so editing locked values never changes it. Comments and layout
 * are not part of the hash.
 */

use std::fmt;
use std::hash::Hasher;

use crate::lock::is_locked;
use rustc_hash::FxHasher;
use yamlock_tree::{Node, NodeKind};

const MAPPING_TAG: u8 = 1;
const SEQUENCE_TAG: u8 = 2;

/// A 64-bit content hash. Displays as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub u64);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Hash `root`, skipping locked pairs. A document hashes like its root value.
pub fn content_hash(root: &Node) -> ContentHash {
    let mut hasher = FxHasher::default();
    feed(root, &mut hasher);
    ContentHash(hasher.finish())
}

fn feed(node: &Node, hasher: &mut FxHasher) {
    match node.kind() {
        NodeKind::Document(root) => feed(root, hasher),
        NodeKind::Mapping(pairs) => {
            hasher.write_u8(MAPPING_TAG);
            for pair in pairs {
                if is_locked(&pair.key, &pair.value) {
                    continue;
                }
                feed(&pair.key, hasher);
                feed(&pair.value, hasher);
            }
        }
        NodeKind::Sequence(items) => {
            hasher.write_u8(SEQUENCE_TAG);
            for item in items {
                feed(item, hasher);
            }
        }
        NodeKind::Scalar(scalar) => hasher.write(scalar.value().as_bytes()),
    }
}
