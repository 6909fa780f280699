//! # Statement Preparation
//!
//! Tokenizes and validates the two statement verbs (`insert`, `select`)
//! before anything reaches the storage engine. Preparation failures are a
//! `PrepareError`, whose display strings are exactly what the REPL prints;
//! the engine only ever sees fully validated rows.

use thiserror::Error;

use crate::row::Row;

#[derive(Debug)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("String is too long.")]
    StringTooLong,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("Unrecognized keyword at start of '{0}'.")]
    UnrecognizedStatement(String),
}

/// Parses one REPL line into a statement.
pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
    let mut tokens = input.split_whitespace();

    match tokens.next() {
        Some("insert") => prepare_insert(tokens),
        Some("select") => Ok(Statement::Select),
        _ => Err(PrepareError::UnrecognizedStatement(input.to_string())),
    }
}

fn prepare_insert<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<Statement, PrepareError> {
    let id_token = tokens.next().ok_or(PrepareError::SyntaxError)?;
    let username = tokens.next().ok_or(PrepareError::SyntaxError)?;
    let email = tokens.next().ok_or(PrepareError::SyntaxError)?;
    if tokens.next().is_some() {
        return Err(PrepareError::SyntaxError);
    }

    let id: i64 = id_token.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    let row = Row::new(id, username, email).map_err(|_| PrepareError::StringTooLong)?;
    Ok(Statement::Insert(row))
}
