//! End-to-end REPL scenarios driven through the line processor, covering
//! the full dialect: inserts, ordered selects, duplicate handling, tree
//! introspection, and persistence across close/reopen.

use tupledb::cli::{process_line, LineResult};
use tupledb::Table;

/// Runs each line against a fresh-or-existing table at `path` and returns
/// one output string per line. `.exit` closes the table like the REPL.
fn run_session(path: &std::path::Path, lines: &[&str]) -> Vec<String> {
    let mut table = Table::open(path).unwrap();
    let mut outputs = Vec::new();

    for line in lines {
        match process_line(&mut table, line).unwrap() {
            LineResult::Output(text) => outputs.push(text),
            LineResult::Exit => {
                outputs.push(String::new());
                break;
            }
        }
    }

    outputs
}

#[test]
fn empty_table_select_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();

    let outputs = run_session(&dir.path().join("test.db"), &["select", ".exit"]);

    assert_eq!(outputs, vec!["", ""]);
}

#[test]
fn single_insert_and_select() {
    let dir = tempfile::tempdir().unwrap();

    let outputs = run_session(
        &dir.path().join("test.db"),
        &["insert 1 user1 a@b", "select", ".exit"],
    );

    assert_eq!(outputs, vec!["Executed.", "(1, user1, a@b)", ""]);
}

#[test]
fn duplicate_id_is_rejected_and_the_row_survives() {
    let dir = tempfile::tempdir().unwrap();

    let outputs = run_session(
        &dir.path().join("test.db"),
        &[
            "insert 1 user1 a@b",
            "insert 1 user1 a@b",
            "select",
            ".exit",
        ],
    );

    assert_eq!(
        outputs,
        vec!["Executed.", "Error: Duplicate key.", "(1, user1, a@b)", ""]
    );
}

#[test]
fn rows_persist_across_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let first = run_session(
        &path,
        &[
            "insert 1 user1 person1@example.com",
            "insert 2 user2 person2@example.com",
            "insert 3 user3 person3@example.com",
            ".exit",
        ],
    );
    assert_eq!(first, vec!["Executed.", "Executed.", "Executed.", ""]);

    let second = run_session(&path, &["select", ".exit"]);
    assert_eq!(
        second,
        vec![
            "(1, user1, person1@example.com)\n\
             (2, user2, person2@example.com)\n\
             (3, user3, person3@example.com)",
            ""
        ]
    );
}

#[test]
fn fourteen_inserts_split_the_root_leaf() {
    let dir = tempfile::tempdir().unwrap();

    let mut lines: Vec<String> = (1..=14)
        .map(|i| format!("insert {} user{} person{}@example.com", i, i, i))
        .collect();
    lines.push(".btree".to_string());
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let outputs = run_session(&dir.path().join("test.db"), &line_refs);

    let mut expected_tree = String::from("Tree:\n- internal (size 1)\n  - leaf (size 7)\n");
    for key in 1..=7 {
        expected_tree.push_str(&format!("    - {}\n", key));
    }
    expected_tree.push_str("  - key 7\n  - leaf (size 7)\n");
    for key in 8..=14 {
        expected_tree.push_str(&format!("    - {}\n", key));
    }
    let expected_tree = expected_tree.trim_end().to_string();

    assert_eq!(outputs[14], expected_tree);
}

#[test]
fn ordered_scan_spans_both_leaves_after_a_split() {
    let dir = tempfile::tempdir().unwrap();

    let mut lines: Vec<String> = (1..=14)
        .map(|i| format!("insert {} user{} person{}@example.com", i, i, i))
        .collect();
    lines.push("select".to_string());
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let outputs = run_session(&dir.path().join("test.db"), &line_refs);

    let expected: Vec<String> = (1..=14)
        .map(|i| format!("({}, user{}, person{}@example.com)", i, i, i))
        .collect();
    assert_eq!(outputs[14], expected.join("\n"));
}

#[test]
fn split_tree_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let mut lines: Vec<String> = (1..=14)
        .map(|i| format!("insert {} user{} person{}@example.com", i, i, i))
        .collect();
    lines.push(".exit".to_string());
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    run_session(&path, &line_refs);

    let outputs = run_session(&path, &["select", ".exit"]);

    let expected: Vec<String> = (1..=14)
        .map(|i| format!("({}, user{}, person{}@example.com)", i, i, i))
        .collect();
    assert_eq!(outputs[0], expected.join("\n"));
}

#[test]
fn descending_inserts_come_back_ascending() {
    let dir = tempfile::tempdir().unwrap();

    let mut lines: Vec<String> = (1..=20)
        .rev()
        .map(|i| format!("insert {} user{} person{}@example.com", i, i, i))
        .collect();
    lines.push("select".to_string());
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let outputs = run_session(&dir.path().join("test.db"), &line_refs);

    let expected: Vec<String> = (1..=20)
        .map(|i| format!("({}, user{}, person{}@example.com)", i, i, i))
        .collect();
    assert_eq!(outputs[20], expected.join("\n"));
}

#[test]
fn constants_report_the_on_disk_layout() {
    let dir = tempfile::tempdir().unwrap();

    let outputs = run_session(&dir.path().join("test.db"), &[".constants", ".exit"]);

    assert_eq!(
        outputs[0],
        "Constants:\n\
         ROW_SIZE: 291\n\
         COMMON_NODE_HEADER_SIZE: 10\n\
         LEAF_NODE_HEADER_SIZE: 14\n\
         LEAF_NODE_CELL_SIZE: 295\n\
         LEAF_NODE_SPACE_FOR_CELLS: 4082\n\
         LEAF_NODE_MAX_CELLS: 13"
    );
}

#[test]
fn maximum_length_strings_roundtrip_through_the_dialect() {
    let dir = tempfile::tempdir().unwrap();
    let username = "u".repeat(32);
    let email = "e".repeat(255);

    let insert = format!("insert 1 {} {}", username, email);
    let outputs = run_session(
        &dir.path().join("test.db"),
        &[insert.as_str(), "select", ".exit"],
    );

    assert_eq!(outputs[0], "Executed.");
    assert_eq!(outputs[1], format!("(1, {}, {})", username, email));
}

#[test]
fn preparation_errors_keep_the_session_alive() {
    let dir = tempfile::tempdir().unwrap();

    let overlong = format!("insert 1 {} a@b", "u".repeat(33));
    let outputs = run_session(
        &dir.path().join("test.db"),
        &[
            "insert -1 user1 a@b",
            overlong.as_str(),
            "insert 1 user1",
            "hello world",
            ".foo",
            "insert 1 user1 a@b",
            "select",
            ".exit",
        ],
    );

    assert_eq!(
        outputs,
        vec![
            "ID must be positive.",
            "String is too long.",
            "Syntax error. Could not parse statement.",
            "Unrecognized keyword at start of 'hello world'.",
            "Unrecognized command '.foo'",
            "Executed.",
            "(1, user1, a@b)",
            ""
        ]
    );
}
