//! # TupleDB CLI Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Open (or create) a database file and start the REPL
//! tupledb ./my.db
//!
//! # Show version
//! tupledb --version
//!
//! # Show help
//! tupledb --help
//! ```

use eyre::{bail, Result, WrapErr};
use std::env;
use std::path::PathBuf;
use tupledb::cli::Repl;
use tupledb::Table;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut db_path: Option<PathBuf> = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("tupledb {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            arg if arg.starts_with('-') => {
                bail!("Unknown option: {}", arg);
            }
            path => {
                if db_path.is_some() {
                    bail!("Multiple database paths specified");
                }
                db_path = Some(PathBuf::from(path));
            }
        }
    }

    let db_path = match db_path {
        Some(p) => p,
        None => bail!("Must supply a database filename."),
    };

    let table = Table::open(&db_path)
        .wrap_err_with(|| format!("failed to open database at {:?}", db_path))?;

    let mut repl = Repl::new(table)?;
    repl.run()
}

fn print_usage() {
    println!("TupleDB - single-file embedded key-value database");
    println!();
    println!("USAGE:");
    println!("    tupledb [OPTIONS] <DATABASE_PATH>");
    println!();
    println!("ARGS:");
    println!("    <DATABASE_PATH>    Path to the database file (created if absent)");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help         Print help information");
    println!("    -v, --version      Print version information");
    println!();
    println!("EXAMPLES:");
    println!("    tupledb ./my.db        Open or create the database at ./my.db");
}
