//! # TupleDB - Embedded Key-Value Database
//!
//! TupleDB is a single-file, single-table embedded database: fixed-width
//! 291-byte rows keyed by a `u32`, stored in a disk-backed B+-tree whose
//! nodes are 4096-byte pages, fronted by a tiny SQL-like REPL.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tupledb::{Row, Table};
//!
//! let mut table = Table::open("./my.db")?;
//! table.insert(&Row::new(1, "alice", "alice@example.com")?)?;
//!
//! for row in table.select_all()? {
//!     println!("{}", row);
//! }
//! table.close()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         REPL (cli, bin)             │
//! ├─────────────────────────────────────┤
//! │         Table facade                │
//! ├──────────────────┬──────────────────┤
//! │   B+Tree ops     │     Cursor       │
//! ├──────────────────┴──────────────────┤
//! │   Node views (leaf / internal)      │
//! ├─────────────────────────────────────┤
//! │   Pager (page cache over one file)  │
//! └─────────────────────────────────────┘
//! ```
//!
//! Pages are the unit of everything: 4096 bytes on disk and in memory,
//! demand-loaded by the pager, mutated in place through typed views, and
//! written back when the table closes. Page 0 is always the tree root, so
//! a root split rebuilds page 0 in place rather than moving the root.
//!
//! ## Scope
//!
//! Deliberately not here: transactions, concurrency, crash recovery,
//! secondary indexes, deletes, updates, variable-length rows, multiple
//! tables. The engine is synchronous and single-threaded throughout.
//!
//! ## Module Overview
//!
//! - [`storage`]: pager and the common page header
//! - [`btree`]: node views, tree operations, cursor
//! - [`row`]: the fixed-width row codec
//! - [`table`]: the open/insert/scan/close facade
//! - [`cli`]: REPL, statement parser, dot commands
//! - [`error`]: the typed engine error taxonomy

pub mod btree;
pub mod cli;
pub mod error;
pub mod row;
pub mod storage;
pub mod table;

pub use error::DbError;
pub use row::Row;
pub use table::Table;
