//! # REPL - Read-Eval-Print Loop
//!
//! The interactive loop for the TupleDB CLI. Each line is either a dot
//! command (executed immediately) or a statement (prepared, then run
//! against the table). Preparation failures and duplicate keys print a
//! message and keep the session alive; every other engine failure is
//! fatal and propagates to the caller, which exits nonzero without
//! flushing.
//!
//! `process_line` is the complete line → output function; the `Repl`
//! struct wraps it with rustyline input handling so tests can drive whole
//! sessions without a terminal.
//!
//! Input history lives in `~/.tupledb_history`; setting `TUPLEDB_HISTORY`
//! relocates it, and setting it to an empty string turns persistence off.
//! The path is resolved once when the REPL starts.

use std::env;
use std::path::PathBuf;

use eyre::{Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::commands::{CommandHandler, CommandResult};
use crate::cli::statement::{self, Statement};
use crate::error::DbError;
use crate::table::Table;

const PROMPT: &str = "db > ";
const HISTORY_ENV_VAR: &str = "TUPLEDB_HISTORY";
const HISTORY_FILE_NAME: &str = ".tupledb_history";

/// Outcome of one REPL line: text to print, or the signal to leave.
#[derive(Debug, PartialEq)]
pub enum LineResult {
    Output(String),
    Exit,
}

/// Runs one line against the table. `.exit` closes the table and returns
/// `Exit`; recoverable problems come back as printable output; fatal
/// engine errors propagate.
pub fn process_line(table: &mut Table, line: &str) -> Result<LineResult> {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return Ok(LineResult::Output(String::new()));
    }

    if CommandHandler::is_command(trimmed) {
        return match CommandHandler::execute(trimmed, table)? {
            CommandResult::Exit => {
                table.close()?;
                Ok(LineResult::Exit)
            }
            CommandResult::Output(text) => Ok(LineResult::Output(text)),
            CommandResult::Error(text) => Ok(LineResult::Output(text)),
        };
    }

    let statement = match statement::prepare(trimmed) {
        Ok(statement) => statement,
        Err(err) => return Ok(LineResult::Output(err.to_string())),
    };

    execute_statement(table, statement)
}

fn execute_statement(table: &mut Table, statement: Statement) -> Result<LineResult> {
    match statement {
        Statement::Insert(row) => match table.insert(&row) {
            Ok(()) => Ok(LineResult::Output("Executed.".to_string())),
            Err(err) if matches!(err.downcast_ref::<DbError>(), Some(DbError::DuplicateKey(_))) => {
                Ok(LineResult::Output("Error: Duplicate key.".to_string()))
            }
            Err(err) => Err(err),
        },
        Statement::Select => {
            let rows = table.select_all()?;
            let text = rows
                .iter()
                .map(|row| row.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            Ok(LineResult::Output(text))
        }
    }
}

pub struct Repl {
    table: Table,
    editor: DefaultEditor,
    history_file: Option<PathBuf>,
}

/// Where this session's history lives: `TUPLEDB_HISTORY` wins when set
/// (empty means no persistence), otherwise `.tupledb_history` in the
/// user's home directory.
fn resolve_history_file() -> Option<PathBuf> {
    match env::var(HISTORY_ENV_VAR) {
        Ok(path) if path.is_empty() => None,
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => {
            let home = env::var("HOME").ok()?;
            Some(PathBuf::from(home).join(HISTORY_FILE_NAME))
        }
    }
}

impl Repl {
    pub fn new(table: Table) -> Result<Self> {
        let mut editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;

        let history_file = resolve_history_file();
        if let Some(path) = &history_file {
            let _ = editor.load_history(path);
        }

        Ok(Self {
            table,
            editor,
            history_file,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        self.editor.add_history_entry(trimmed).ok();
                    }

                    match process_line(&mut self.table, &line)? {
                        LineResult::Exit => break,
                        LineResult::Output(text) => {
                            if !text.is_empty() {
                                println!("{}", text);
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    self.table.close()?;
                    break;
                }
                Err(err) => {
                    return Err(err).wrap_err("failed to read input");
                }
            }
        }

        self.save_history();
        Ok(())
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.editor.save_history(path) {
                eprintln!("Warning: could not save history: {}", e);
            }
        }
    }
}
