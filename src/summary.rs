//! Aggregation of comparison reports across replicates.
//!
//! Expected layout: `<results>/<model>/<replicate>/<method>_comparison.txt`.
//! Collection is best effort: missing files are skipped and unreadable or
//! malformed reports become rows of missing values.

use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Serialize;

use crate::config::SummaryConfig;
use crate::error::{SummaryError, SummaryResult};
use crate::plot::{RateMetric, render_rate_chart};
use crate::report::{ReportMetrics, describe_metrics, parse_report};

pub const RAW_RESULTS_FILE: &str = "raw_results.csv";
pub const SUMMARY_RESULTS_FILE: &str = "summary_results.csv";

const RAW_COLUMNS: [&str; 6] = ["Model", "Method", "Replicate", "RF", "FN", "FP"];
const SUMMARY_COLUMNS: [&str; 6] = ["Model", "Method", "FN_mean", "FN_std", "FP_mean", "FP_std"];

/// One report file: a row of `raw_results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub model: String,
    /// Display label of the method
    pub method: String,
    pub replicate: String,
    pub rf: Option<f64>,
    pub fn_rate: Option<f64>,
    pub fp_rate: Option<f64>,
}

/// Per (model, method) statistics: a row of `summary_results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub model: String,
    pub method: String,
    pub fn_mean: Option<f64>,
    pub fn_std: Option<f64>,
    pub fp_mean: Option<f64>,
    pub fp_std: Option<f64>,
}

/// Paths written by [`summarize_results`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutputs {
    pub raw_csv: PathBuf,
    pub summary_csv: PathBuf,
    pub plots: Vec<PathBuf>,
    pub records: usize,
}

/// Read a report, degrading to all-missing values if it cannot be read or
/// parsed.
pub fn read_report_metrics(path: &Path) -> ReportMetrics {
    let content = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Error parsing {}: {e}", path.display());
            return ReportMetrics::default();
        }
    };
    match parse_report(&content) {
        Ok(metrics) => {
            log::debug!("{}: {}", path.display(), describe_metrics(&metrics));
            metrics
        }
        Err(e) => {
            log::warn!("Error parsing {}: {e}", path.display());
            ReportMetrics::default()
        }
    }
}

/// Sorted subdirectory names of `dir`. Plain files are ignored.
fn replicate_dirs(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot list {}: {e}", dir.display());
            return Vec::new();
        }
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .sorted()
        .collect()
}

/// Walk every configured (model, replicate, method) combination under
/// `results_dir` and collect one record per report file found.
pub fn collect_records(results_dir: &Path, config: &SummaryConfig) -> Vec<ResultRecord> {
    let mut records = Vec::new();

    for model in &config.models {
        let model_dir = results_dir.join(model);
        if !model_dir.is_dir() {
            log::warn!("Model directory {} does not exist", model_dir.display());
            continue;
        }

        for replicate in replicate_dirs(&model_dir) {
            let rep_dir = model_dir.join(&replicate);
            for method in &config.methods {
                let report = rep_dir.join(method.report_file_name());
                if !report.is_file() {
                    continue;
                }
                let metrics = read_report_metrics(&report);
                records.push(ResultRecord {
                    model: model.clone(),
                    method: method.label.clone(),
                    replicate: replicate.clone(),
                    rf: metrics.rf,
                    fn_rate: metrics.fn_rate,
                    fp_rate: metrics.fp_rate,
                });
            }
        }
    }

    records
}

/// Mean and sample standard deviation (n - 1) of the present values.
///
/// No values gives no mean; fewer than two values gives no deviation.
pub fn mean_std<I: IntoIterator<Item = Option<f64>>>(values: I) -> (Option<f64>, Option<f64>) {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return (None, None);
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    if present.len() < 2 {
        return (Some(mean), None);
    }
    let var = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (Some(mean), Some(var.sqrt()))
}

/// Group records by (model, method), in sorted key order, and summarize FN
/// and FP. RF is only carried in the raw table.
pub fn summarize(records: &[ResultRecord]) -> Vec<SummaryRow> {
    let groups = records
        .iter()
        .sorted_by(|a, b| (&a.model, &a.method).cmp(&(&b.model, &b.method)))
        .chunk_by(|r| (r.model.clone(), r.method.clone()));

    let mut rows = Vec::new();
    for ((model, method), group) in &groups {
        let group: Vec<&ResultRecord> = group.collect();
        let (fn_mean, fn_std) = mean_std(group.iter().map(|r| r.fn_rate));
        let (fp_mean, fp_std) = mean_std(group.iter().map(|r| r.fp_rate));
        rows.push(SummaryRow { model, method, fn_mean, fn_std, fp_mean, fp_std });
    }
    rows
}

/// Write `rows` under an explicit header so an empty table still gets one.
fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> SummaryResult<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| SummaryError::Io { path: path.to_path_buf(), source })
}

pub fn write_raw_results(path: &Path, records: &[ResultRecord]) -> SummaryResult<()> {
    write_csv(path, &RAW_COLUMNS, records)
}

pub fn write_summary_results(path: &Path, rows: &[SummaryRow]) -> SummaryResult<()> {
    write_csv(path, &SUMMARY_COLUMNS, rows)
}

/// Collect, tabulate and plot every report under `results_dir`.
///
/// Outputs land in `results_dir`. A chart that fails to render is logged and
/// left out; the CSV files are always written.
pub fn summarize_results(
    results_dir: &Path,
    config: &SummaryConfig,
    render_plots: bool,
) -> SummaryResult<SummaryOutputs> {
    let records = collect_records(results_dir, config);
    log::info!("Collected {} comparison reports", records.len());

    let raw_csv = results_dir.join(RAW_RESULTS_FILE);
    write_raw_results(&raw_csv, &records)?;
    log::info!("Raw results saved to {}", raw_csv.display());

    let rows = summarize(&records);
    let summary_csv = results_dir.join(SUMMARY_RESULTS_FILE);
    write_summary_results(&summary_csv, &rows)?;
    log::info!("Summary results saved to {}", summary_csv.display());

    let mut plots = Vec::new();
    if render_plots {
        for metric in [RateMetric::FalseNegative, RateMetric::FalsePositive] {
            let path = results_dir.join(metric.file_name());
            match render_rate_chart(&path, metric, &rows) {
                Ok(true) => {
                    log::info!("Plot saved to {}", path.display());
                    plots.push(path);
                }
                Ok(false) => log::warn!("Not enough valid data for plotting {}", metric.file_name()),
                Err(e) => log::warn!("Skipping {}: {e}", path.display()),
            }
        }
    }

    Ok(SummaryOutputs { raw_csv, summary_csv, plots, records: records.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MethodLabel;

    fn record(model: &str, method: &str, rep: &str, fn_rate: Option<f64>) -> ResultRecord {
        ResultRecord {
            model: model.to_string(),
            method: method.to_string(),
            replicate: rep.to_string(),
            rf: fn_rate.map(|v| v * 10.0),
            fn_rate,
            fp_rate: fn_rate.map(|v| v / 2.0),
        }
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn metrics_report(rf: &str, fn_rate: &str, fp_rate: &str) -> String {
        format!(
            "Tree comparison results:\nRF distance: {rf}\nFN rate: {fn_rate}\nFP rate: {fp_rate}\n"
        )
    }

    fn small_config() -> SummaryConfig {
        SummaryConfig {
            models: vec!["M1".to_string(), "M2".to_string()],
            methods: vec![MethodLabel::new("nj", "NJ"), MethodLabel::new("ft", "FastTree")],
        }
    }

    #[test]
    fn mean_std_skips_missing() {
        let (mean, std) = mean_std([Some(0.1), Some(0.2), None]);
        assert!((mean.unwrap() - 0.15).abs() < 1e-12);
        assert!((std.unwrap() - 0.070_710_678_118_654_75).abs() < 1e-12);

        assert_eq!(mean_std([None, None]), (None, None));
        assert_eq!(mean_std([Some(0.4)]), (Some(0.4), None));
    }

    #[test]
    fn summarize_groups_sorted_by_model_and_method() {
        let records = vec![
            record("M2", "NJ", "R1", Some(0.5)),
            record("M1", "NJ", "R1", Some(0.1)),
            record("M1", "FastTree", "R1", None),
            record("M1", "NJ", "R2", Some(0.2)),
            record("M1", "NJ", "R3", None),
        ];
        let rows = summarize(&records);
        let keys: Vec<_> = rows.iter().map(|r| (r.model.as_str(), r.method.as_str())).collect();
        assert_eq!(keys, vec![("M1", "FastTree"), ("M1", "NJ"), ("M2", "NJ")]);

        assert_eq!(rows[0].fn_mean, None);
        assert!((rows[1].fn_mean.unwrap() - 0.15).abs() < 1e-12);
        assert!((rows[1].fp_mean.unwrap() - 0.075).abs() < 1e-12);
        assert_eq!(rows[2].fn_std, None);
    }

    #[test]
    fn collects_reports_and_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("M1/R2/nj_comparison.txt"), &metrics_report("4", "0.2", "0.1"));
        write(&root.join("M1/R1/nj_comparison.txt"), &metrics_report("2", "0.1", "0.0"));
        write(&root.join("M1/R1/ft_comparison.txt"), &metrics_report("N/A", "N/A", "N/A"));
        write(&root.join("M1/R3/unrelated.txt"), "RF distance: 9\n");
        write(&root.join("M1/notes.txt"), "not a replicate");

        let records = collect_records(root, &small_config());
        assert_eq!(
            records,
            vec![
                ResultRecord {
                    model: "M1".into(),
                    method: "NJ".into(),
                    replicate: "R1".into(),
                    rf: Some(2.0),
                    fn_rate: Some(0.1),
                    fp_rate: Some(0.0),
                },
                ResultRecord {
                    model: "M1".into(),
                    method: "FastTree".into(),
                    replicate: "R1".into(),
                    rf: None,
                    fn_rate: None,
                    fp_rate: None,
                },
                ResultRecord {
                    model: "M1".into(),
                    method: "NJ".into(),
                    replicate: "R2".into(),
                    rf: Some(4.0),
                    fn_rate: Some(0.2),
                    fp_rate: Some(0.1),
                },
            ]
        );
    }

    #[test]
    fn malformed_report_becomes_missing_row() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("M2/R1/ft_comparison.txt"), "RF distance: two\nFN rate: 0.5\n");
        write(&root.join("M2/R1/nj_comparison.txt"), "Tree comparison error: bad newick\n");

        let records = collect_records(root, &small_config());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.rf.is_none() && r.fn_rate.is_none()));
    }

    /// FN values 0.1, 0.2 and N/A for one (model, method): the mean is 0.15.
    #[test]
    fn na_is_ignored_in_summary_mean() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("M1/R1/nj_comparison.txt"), &metrics_report("2", "0.1", "0.1"));
        write(&root.join("M1/R2/nj_comparison.txt"), &metrics_report("4", "0.2", "0.3"));
        write(&root.join("M1/R3/nj_comparison.txt"), &metrics_report("N/A", "N/A", "N/A"));

        let outputs = summarize_results(root, &small_config(), false).unwrap();
        assert_eq!(outputs.records, 3);

        let summary = fs::read_to_string(&outputs.summary_csv).unwrap();
        let mut lines = summary.lines();
        assert_eq!(lines.next(), Some("Model,Method,FN_mean,FN_std,FP_mean,FP_std"));
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(&row[..2], &["M1", "NJ"]);
        assert!((row[2].parse::<f64>().unwrap() - 0.15).abs() < 1e-12);
        assert!((row[4].parse::<f64>().unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(lines.next(), None);

        let raw = fs::read_to_string(&outputs.raw_csv).unwrap();
        assert_eq!(raw.lines().next(), Some("Model,Method,Replicate,RF,FN,FP"));
        assert_eq!(raw.lines().nth(3), Some("M1,NJ,R3,,,"));
    }

    #[test]
    fn renders_only_charts_with_values() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("M1/R1/nj_comparison.txt"), &metrics_report("2", "0.1", "N/A"));
        write(&root.join("M1/R2/nj_comparison.txt"), &metrics_report("4", "0.3", "N/A"));

        let outputs = summarize_results(root, &small_config(), true).unwrap();

        let fn_chart = root.join(RateMetric::FalseNegative.file_name());
        assert_eq!(outputs.plots, vec![fn_chart.clone()]);
        assert!(fs::metadata(&fn_chart).unwrap().len() > 0);
        assert!(!root.join(RateMetric::FalsePositive.file_name()).exists());
    }

    #[test]
    fn empty_results_dir_gives_header_only_csvs_and_no_plots() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = summarize_results(dir.path(), &SummaryConfig::default(), true).unwrap();

        assert_eq!(outputs.records, 0);
        assert!(outputs.plots.is_empty());
        assert_eq!(
            fs::read_to_string(&outputs.raw_csv).unwrap(),
            "Model,Method,Replicate,RF,FN,FP\n"
        );
        assert_eq!(
            fs::read_to_string(&outputs.summary_csv).unwrap(),
            "Model,Method,FN_mean,FN_std,FP_mean,FP_std\n"
        );
        assert!(!dir.path().join("fn_rates_by_method.png").exists());
        assert!(!dir.path().join("fp_rates_by_method.png").exists());
    }
}
