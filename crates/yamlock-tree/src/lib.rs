//! # yamlock-tree
//!
//! Comment-preserving YAML trees.
//!
//! This crate parses a YAML document into a [`Node`] tree that keeps every
//! comment, blank line and layout detail of the source, so that
//! [`serialize`] reproduces an unmodified document byte for byte. Nodes can
//! be looked up by dotted path, edited, moved between documents, and built
//! from scratch.
//!
//! ## Design
//!
//! Each node owns its children and its comments: a head comment (lines
//! above it), a line comment (end of its line) and a foot comment (lines
//! after its last child). Moving a subtree moves its comments with it.
//!
//! yaml-rust2 validates the input and supplies decoded scalar values; the
//! layout is recovered by a line-oriented parser over a deliberately
//! restricted block-style dialect. Input outside that dialect is rejected
//! with a [`Error::ParseError`] rather than silently reformatted.
//!
//! ## Example
//!
//! ```rust
//! use yamlock_tree::{parse, serialize, set_scalar};
//!
//! let mut doc = parse("## lock\nreplicas: 3 # tuned\n").unwrap();
//! set_scalar(&mut doc, "replicas", "5").unwrap();
//! assert_eq!(serialize(&doc), "## lock\nreplicas: 5 # tuned\n");
//! ```

mod emitter;
mod error;
mod node;
mod parser;
mod path;
mod scalar;

pub use emitter::serialize;
pub use error::{Error, PathFailure, Result, SourceLocation};
pub use node::{Comment, Node, NodeKind, Pair, Style};
pub use parser::{DEFAULT_MAX_DEPTH, ParseOptions, parse, parse_bytes, parse_with_options};
pub use path::{find_node, find_node_mut, set_scalar, split_path};
pub use scalar::Scalar;
