//! # B+Tree Implementation
//!
//! The on-disk B+-tree holding the table's rows. All rows live in leaf
//! nodes; internal nodes hold separator keys and child page numbers used
//! to route lookups. Leaves are chained through `next_leaf` so an ordered
//! scan never revisits the upper tree.
//!
//! ## Node Kinds
//!
//! Both kinds share the 10-byte common header (`crate::storage`) and are
//! modeled as view pairs over the same page buffer — an immutable view for
//! reads and a mutable view for in-place edits — selected by the header's
//! kind tag. There is no node object that owns memory; the page buffer is
//! the single source of truth, which keeps flushing a plain byte write.
//!
//! ## Module Organization
//!
//! - `leaf`: leaf layout constants and views, in-leaf search and insert
//! - `internal`: internal-node layout and views, child routing
//! - `tree`: descent, split-and-promote, root creation, tree rendering
//! - `cursor`: the `(page, cell, end)` position abstraction over scans
//!   and inserts

mod cursor;
mod internal;
mod leaf;
mod tree;

pub use cursor::Cursor;
pub use internal::{
    InternalCell, InternalNode, InternalNodeMut, INTERNAL_CELL_SIZE, INTERNAL_HEADER_SIZE,
    INTERNAL_MAX_KEYS,
};
pub use leaf::{
    LeafCell, LeafNode, LeafNodeMut, LEAF_CELL_SIZE, LEAF_HEADER_SIZE, LEAF_LEFT_SPLIT_COUNT,
    LEAF_MAX_CELLS, LEAF_RIGHT_SPLIT_COUNT, LEAF_SPACE_FOR_CELLS,
};
pub use tree::{find, max_key, render_tree};
