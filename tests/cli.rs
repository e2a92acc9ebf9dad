use std::fs;
use std::process::{Command, Output};

fn compare_trees(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_compare-trees"))
        .args(args)
        .output()
        .expect("failed to run compare-trees")
}

fn summarize_results(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_summarize-results"))
        .args(args)
        .output()
        .expect("failed to run summarize-results")
}

#[test]
fn compare_trees_wrong_arity_exits_1_with_usage() {
    let out = compare_trees(&["est.tre", "true.tre"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn compare_trees_help_exits_0() {
    let out = compare_trees(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn compare_trees_exits_0_when_comparison_fails() {
    let dir = tempfile::tempdir().unwrap();
    let est = dir.path().join("est.tre");
    let output = dir.path().join("nj_comparison.txt");
    fs::write(&est, "(A,B)C,D);").unwrap();

    let missing = dir.path().join("absent.tre");
    let out = compare_trees(&[
        est.to_str().unwrap(),
        missing.to_str().unwrap(),
        output.to_str().unwrap(),
        "-q",
    ]);

    assert_eq!(out.status.code(), Some(0));
    let report = fs::read_to_string(&output).unwrap();
    assert!(report.starts_with("Tree comparison error:"));
}

#[test]
fn compare_trees_exits_4_when_report_cannot_be_written() {
    let dir = tempfile::tempdir().unwrap();
    let tree = dir.path().join("t.tre");
    fs::write(&tree, "((A,B),(C,D),E);").unwrap();
    let output = dir.path().join("no_such_dir").join("out.txt");

    let out = compare_trees(&[
        tree.to_str().unwrap(),
        tree.to_str().unwrap(),
        output.to_str().unwrap(),
        "-q",
    ]);
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn summarize_results_without_directory_exits_1_with_usage() {
    let out = summarize_results(&[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn summarize_results_missing_directory_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    let out = summarize_results(&[missing.to_str().unwrap(), "-q"]);
    assert_eq!(out.status.code(), Some(1));
}
