//! Python binding layer for tree comparison and result summarization.
//!
//! Exposes the comparator and the summarizer so both can be driven from a
//! notebook without shelling out to the binaries.

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::compare::{CompareOptions, ComparisonOutcome, compare_tree_files};
use crate::config::{MethodLabel, SummaryConfig};
use crate::report::Report;
use crate::snapshot::SplitMode;
use crate::summary::summarize_results;

/// Compare an estimated tree file against a true tree file.
///
/// Args:
///     estimated: Path to the estimated tree (Newick or NEXUS)
///     true_tree: Path to the true tree
///     rooted: Compare rooted clusters instead of unrooted bipartitions (default: False)
///     output: Optional report path; the report is written exactly as the CLI writes it
///
/// Returns:
///     A tuple (rf, fn_rate, fp_rate). All three are None when fewer than
///     three taxa are shared.
///
/// Raises:
///     ValueError: If a tree cannot be read or parsed
#[pyfunction]
#[pyo3(signature = (estimated, true_tree, rooted=false, output=None))]
fn compare_trees(
    estimated: String,
    true_tree: String,
    rooted: bool,
    output: Option<String>,
) -> PyResult<(Option<usize>, Option<f64>, Option<f64>)> {
    let options = CompareOptions {
        split_mode: if rooted { SplitMode::Rooted } else { SplitMode::Unrooted },
        ..Default::default()
    };

    let result = compare_tree_files(&estimated, &true_tree, &options);

    if let Some(path) = output {
        let report = Report::from_result(&result);
        report
            .write_to(&path)
            .map_err(|e| PyIOError::new_err(format!("Failed to write '{path}': {e}")))?;
    }

    match result {
        Ok(ComparisonOutcome::Compared(c)) => Ok((Some(c.rf), Some(c.fn_rate), Some(c.fp_rate))),
        Ok(ComparisonOutcome::InsufficientTaxa(_)) => Ok((None, None, None)),
        Err(e) => Err(PyValueError::new_err(e.to_string())),
    }
}

/// Summarize a results directory into CSV tables and plots.
///
/// Args:
///     results_dir: Root directory laid out as <model>/<replicate>/<method>_comparison.txt
///     models: Model condition names (default: the 1000M1/1000M4 study)
///     methods: List of (key, label) pairs (default: the study's five methods)
///     plots: Render the PNG charts (default: True)
///
/// Returns:
///     The number of report files collected.
#[pyfunction]
#[pyo3(signature = (results_dir, models=None, methods=None, plots=true))]
fn summarize(
    results_dir: String,
    models: Option<Vec<String>>,
    methods: Option<Vec<(String, String)>>,
    plots: bool,
) -> PyResult<usize> {
    let mut config = SummaryConfig::default();
    if let Some(models) = models {
        config.models = models;
    }
    if let Some(methods) = methods {
        config.methods = methods
            .into_iter()
            .map(|(key, label)| MethodLabel { key, label })
            .collect();
    }

    let outputs = summarize_results(&PathBuf::from(results_dir), &config, plots)
        .map_err(|e| PyIOError::new_err(e.to_string()))?;
    Ok(outputs.records)
}

/// Python module definition
#[pymodule]
fn rust_python_tree_compare(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compare_trees, m)?)?;
    m.add_function(wrap_pyfunction!(summarize, m)?)?;
    Ok(())
}
