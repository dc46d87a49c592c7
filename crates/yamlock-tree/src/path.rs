//! Dotted-path lookup and scalar updates.
//!
//! A path such as `server.tls.cert` names nested mapping keys. A leading
//! `.` is ignored and the empty path names the root. Keys are compared by
//! exact scalar text; when a mapping repeats a key, the first one wins.

use crate::error::{Error, PathFailure, Result};
use crate::node::{Node, NodeKind};

/// Split a dotted path into key segments.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('.').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

fn missing(path: &str, segments: &[&str], index: usize, reason: PathFailure) -> Error {
    Error::PathNotFound {
        path: path.to_string(),
        segment: segments[index].to_string(),
        parent: segments[..index].join("."),
        reason,
    }
}

fn unwrap_document_mut(node: &mut Node) -> &mut Node {
    if node.is_document() {
        match node.kind_mut() {
            NodeKind::Document(root) => root,
            _ => unreachable!("checked to be a document"),
        }
    } else {
        node
    }
}

/// Find the node at `path` below `root`. A document is searched from its
/// root value.
///
/// # Errors
///
/// [`Error::PathNotFound`] naming the first segment that could not be
/// resolved.
pub fn find_node<'a>(root: &'a Node, path: &str) -> Result<&'a Node> {
    let segments = split_path(path);
    let mut current = root.document_root().unwrap_or(root);
    for (index, segment) in segments.iter().enumerate() {
        if !current.is_mapping() {
            return Err(missing(path, &segments, index, PathFailure::NotAMapping));
        }
        current = current
            .get(segment)
            .ok_or_else(|| missing(path, &segments, index, PathFailure::MissingKey))?;
    }
    Ok(current)
}

/// Mutable counterpart of [`find_node`].
pub fn find_node_mut<'a>(root: &'a mut Node, path: &str) -> Result<&'a mut Node> {
    let segments = split_path(path);
    let mut current = unwrap_document_mut(root);
    for (index, segment) in segments.iter().enumerate() {
        let Some(pairs) = current.as_mapping_mut() else {
            return Err(missing(path, &segments, index, PathFailure::NotAMapping));
        };
        let Some(pair) = pairs
            .iter_mut()
            .find(|pair| pair.key_text() == Some(*segment))
        else {
            return Err(missing(path, &segments, index, PathFailure::MissingKey));
        };
        current = &mut pair.value;
    }
    Ok(current)
}

/// Replace the text of the scalar at `path`, keeping its comments and, when
/// the new text allows it, its quoting style.
///
/// # Errors
///
/// [`Error::PathNotFound`] when the path does not resolve and
/// [`Error::NotAScalar`] when it resolves to a collection.
pub fn set_scalar(root: &mut Node, path: &str, value: &str) -> Result<()> {
    let node = find_node_mut(root, path)?;
    let kind = node.kind_name();
    if node.set_scalar_value(value) {
        Ok(())
    } else {
        Err(Error::NotAScalar {
            path: path.to_string(),
            kind,
        })
    }
}
