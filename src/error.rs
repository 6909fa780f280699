//! # Error Taxonomy
//!
//! TupleDB reports failures through `eyre::Result` like the rest of the
//! codebase, but a handful of engine failures carry behavioral meaning for
//! callers and are therefore typed. They are raised as `DbError` values
//! inside an `eyre::Report` and recovered with `downcast_ref` where the kind
//! matters:
//!
//! - `DuplicateKey` is the only recoverable engine error. The REPL prints
//!   `Error: Duplicate key.` and keeps going; the tree is untouched because
//!   the duplicate is detected before any mutation.
//! - Every other variant is fatal. The process exits nonzero without
//!   flushing, since persisting a half-finished structural mutation would be
//!   worse than losing the session.
//!
//! Incidental I/O failures (seek, read, write, sync) stay untyped and flow
//! through `eyre` with `wrap_err` context; they are always fatal, so nothing
//! branches on them.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DbError {
    /// An insert found an existing row with the same id.
    #[error("duplicate key {0}")]
    DuplicateKey(u32),

    /// A page number at or beyond the fixed pager capacity was requested.
    #[error("page number {page_num} out of range (limit {limit})")]
    PageOutOfRange { page_num: u32, limit: u32 },

    /// The database file length is not a whole number of pages.
    #[error("database file size {0} is not a whole number of pages")]
    CorruptFile(u64),

    /// A flush was requested for a page slot that was never loaded.
    #[error("tried to flush page {0}, which was never loaded")]
    FlushNullPage(u32),

    /// An internal node overflowed. Splitting internal nodes is not
    /// implemented; the fan-out limit is a documented engine bound.
    #[error("internal node {0} is full; splitting internal nodes is not supported")]
    InternalNodeFull(u32),
}
