//! In-memory filesystem tree.
//!
//! This module provides the tree the shell operates on: directories and
//! files are plain entries distinguished by kind, every structural link is
//! a `NodeId` rather than a reference, and the tree owns all nodes in one
//! insertion-ordered arena that doubles as the lookup registry.

mod node;
mod tree;

pub use node::{Node, NodeId, NodeKind};
pub use tree::{FileTree, FilesystemError, ROOT_NAME};
