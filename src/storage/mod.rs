//! # Storage Module
//!
//! The storage layer for TupleDB: fixed-size pages cached in memory by an
//! explicit pager and persisted to a single file.
//!
//! ## Architecture Overview
//!
//! The database file is a plain concatenation of 4096-byte pages. Page 0 is
//! always the table's root node; every other page is a leaf or internal node
//! in allocation order. There is no file header, no checksums, and no free
//! list — the file only ever grows, one page at a time.
//!
//! The pager is a demand-loading buffer cache:
//!
//! - `get_page(n)` loads page `n` from disk on first touch (or hands out a
//!   zeroed buffer past EOF) and returns the same in-memory buffer on every
//!   subsequent call, so mutations made through one access are visible to
//!   the next.
//! - Nothing is written back until `close`, which flushes every loaded page
//!   and syncs the file. A crash before `close` loses all mutations since
//!   the previous close; that is a documented limitation, not a bug.
//!
//! ## Page Header Layout (10 bytes)
//!
//! ```text
//! Offset  Size  Field        Description
//! ------  ----  -----------  ----------------------------------------
//! 0       1     node_kind    0 = leaf, 1 = internal
//! 1       1     is_root      1 if this page is the tree root
//! 2       4     parent       Parent page number (meaningless on root)
//! 6       4     num_cells    Cell count (leaf) / key count (internal)
//! ```
//!
//! Node-kind-specific layouts live with the node views in `crate::btree`.
//!
//! ## Byte Order
//!
//! All multi-byte on-disk integers are little-endian, enforced structurally
//! through `zerocopy::byteorder` field types rather than by conversion at
//! call sites. A file written on one architecture reads back identically on
//! any other.
//!
//! ## Thread Safety
//!
//! The engine is single-threaded and synchronous. `Pager` is `Send` but not
//! `Sync`; nothing in this crate needs interior mutability or locking.

mod node;
mod pager;

pub use node::{NodeHeader, NodeKind, COMMON_NODE_HEADER_SIZE};
pub use pager::{PageBuf, Pager, TABLE_MAX_PAGES};

/// Size of every database page, on disk and in memory.
pub const PAGE_SIZE: usize = 4096;
