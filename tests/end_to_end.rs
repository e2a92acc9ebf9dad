use std::fs;
use std::path::Path;

use rust_python_tree_compare::compare::{CompareOptions, compare_tree_files};
use rust_python_tree_compare::config::{MethodLabel, SummaryConfig};
use rust_python_tree_compare::report::Report;
use rust_python_tree_compare::summary::{collect_records, summarize_results};

const TRUE_TREE: &str = "((A:0.1,B:0.1):0.2,(C:0.1,D:0.1):0.2,(E:0.1,F:0.1):0.2);\n";

fn run_comparator(estimated: &str, reference: &Path, output: &Path) {
    let est_path = output.with_extension("tre");
    fs::write(&est_path, estimated).unwrap();
    let result = compare_tree_files(&est_path, reference, &CompareOptions::default());
    Report::from_result(&result).write_to(output).unwrap();
}

#[test]
fn comparator_reports_feed_the_summarizer() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let reference = root.join("true.tre");
    fs::write(&reference, TRUE_TREE).unwrap();

    let layout = [
        ("R1", "((A,B),(C,D),(E,F));"),
        ("R2", "((A,B),(C,E),(D,F));"),
        // shares only A and B with the true tree
        ("R3", "((A,B),(X,Y),(Z,W));"),
    ];
    for (rep, newick) in layout {
        let rep_dir = root.join("M1").join(rep);
        fs::create_dir_all(&rep_dir).unwrap();
        run_comparator(newick, &reference, &rep_dir.join("nj_comparison.txt"));
    }

    let r1 = fs::read_to_string(root.join("M1/R1/nj_comparison.txt")).unwrap();
    assert_eq!(r1, "Tree comparison results:\nRF distance: 0\nFN rate: 0.0\nFP rate: 0.0\n");
    let r3 = fs::read_to_string(root.join("M1/R3/nj_comparison.txt")).unwrap();
    assert!(r3.contains("WARNING: Less than 3 common taxa found. Comparison not valid."));
    assert!(r3.contains("Common taxa: 2"));

    let config = SummaryConfig {
        models: vec!["M1".to_string()],
        methods: vec![MethodLabel::new("nj", "NJ")],
    };
    let records = collect_records(root, &config);
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].rf, Some(4.0));
    assert_eq!(records[2].fn_rate, None);

    let outputs = summarize_results(root, &config, false).unwrap();
    let summary = fs::read_to_string(outputs.summary_csv).unwrap();
    let row: Vec<&str> = summary.lines().nth(1).unwrap().split(',').collect();
    // FN over R1 (0) and R2 (2/3); R3 is N/A and must not count as 0
    let fn_mean: f64 = row[2].parse().unwrap();
    assert!((fn_mean - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn unparsable_tree_still_writes_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("true.tre");
    fs::write(&reference, TRUE_TREE).unwrap();
    let output = dir.path().join("bad_comparison.txt");

    run_comparator("this is not a tree", &reference, &output);

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.starts_with("Tree comparison error: could not parse"));
    assert_eq!(report.lines().count(), 1);
}

#[test]
fn unbalanced_newick_writes_an_error_report() {
    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("true.tre");
    fs::write(&reference, TRUE_TREE).unwrap();
    let output = dir.path().join("nj_comparison.txt");

    run_comparator("(A,B)C,D);", &reference, &output);

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.starts_with("Tree comparison error: could not parse"));
    assert!(report.contains("unbalanced parentheses"));
    assert_eq!(report.lines().count(), 1);
}

#[test]
fn missing_true_tree_still_writes_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nj_comparison.txt");

    run_comparator("((A,B),(C,D));", &dir.path().join("absent.tre"), &output);

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.starts_with("Tree comparison error: failed to read"));
}
