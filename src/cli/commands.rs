//! # Meta Command Handler
//!
//! Parses and executes the dot commands for introspection and REPL
//! control. Dot commands start with a period and are not statements.
//!
//! | Command      | Description                                    |
//! |--------------|------------------------------------------------|
//! | `.exit`      | Flush, close and leave the REPL                |
//! | `.constants` | Print the row and node layout constants        |
//! | `.btree`     | Pretty-print the tree, one node per line       |
//!
//! Each command produces a `CommandResult`: text to display, an exit
//! signal, or an error message for unrecognized input. Engine failures
//! while rendering the tree propagate as fatal.

use eyre::Result;

use crate::btree::{LEAF_CELL_SIZE, LEAF_HEADER_SIZE, LEAF_MAX_CELLS, LEAF_SPACE_FOR_CELLS};
use crate::row::ROW_SIZE;
use crate::storage::COMMON_NODE_HEADER_SIZE;
use crate::table::Table;

#[derive(Debug, PartialEq)]
pub enum CommandResult {
    Output(String),
    Exit,
    Error(String),
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn is_command(input: &str) -> bool {
        input.trim().starts_with('.')
    }

    pub fn execute(input: &str, table: &mut Table) -> Result<CommandResult> {
        match input.trim() {
            ".exit" => Ok(CommandResult::Exit),
            ".constants" => Ok(CommandResult::Output(constants_text())),
            ".btree" => {
                let tree = table.render_tree()?;
                Ok(CommandResult::Output(format!("Tree:\n{}", tree.trim_end())))
            }
            other => Ok(CommandResult::Error(format!(
                "Unrecognized command '{}'",
                other
            ))),
        }
    }
}

fn constants_text() -> String {
    format!(
        "Constants:\n\
         ROW_SIZE: {}\n\
         COMMON_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_HEADER_SIZE: {}\n\
         LEAF_NODE_CELL_SIZE: {}\n\
         LEAF_NODE_SPACE_FOR_CELLS: {}\n\
         LEAF_NODE_MAX_CELLS: {}",
        ROW_SIZE,
        COMMON_NODE_HEADER_SIZE,
        LEAF_HEADER_SIZE,
        LEAF_CELL_SIZE,
        LEAF_SPACE_FOR_CELLS,
        LEAF_MAX_CELLS
    )
}
