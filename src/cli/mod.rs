//! # TupleDB CLI Module
//!
//! The interactive front end: a `db > ` prompt reading one line at a
//! time, in the style of the sqlite shell.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLI Entry Point                        │
//! │                     (bin/tupledb.rs)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                         REPL Loop                           │
//! │  - Reads input via rustyline                                │
//! │  - Dispatches to command handler or statement executor      │
//! │  - Prints results                                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │     Commands          │     Statements        │   History   │
//! │  (.exit, .constants,  │  insert / select      │  Persistent │
//! │   .btree)             │  prepare + execute    │  ~/.tupledb │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dot Commands
//!
//! | Command      | Description                                 |
//! |--------------|---------------------------------------------|
//! | `.exit`      | Flush, close and exit                       |
//! | `.constants` | Print row and node layout constants         |
//! | `.btree`     | Pretty-print the B+-tree                    |
//!
//! ## History
//!
//! Command history is persisted to `~/.tupledb_history` by default,
//! overridable with the `TUPLEDB_HISTORY` environment variable (an empty
//! value disables persistence).
//!
//! ## Module Organization
//!
//! - `repl`: the read-eval-print loop, history handling, and the
//!   testable line processor
//! - `commands`: dot command parsing and execution
//! - `statement`: statement tokenizer/parser and prepare errors

pub mod commands;
pub mod repl;
pub mod statement;

pub use repl::{process_line, LineResult, Repl};
