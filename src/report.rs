//! Flat-text comparison reports.
//!
//! The comparator writes one report per (estimated, true) pair and the
//! summarizer reads them back. Only the three metric lines are parsed; every
//! other line is diagnostic.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::compare::{ComparisonOutcome, MIN_COMMON_TAXA};
use crate::error::{CompareError, ReportParseError};

pub const HEADER: &str = "Tree comparison results:";
pub const RF_LABEL: &str = "RF distance:";
pub const FN_LABEL: &str = "FN rate:";
pub const FP_LABEL: &str = "FP rate:";
pub const NOT_APPLICABLE: &str = "N/A";
pub const ERROR_PREFIX: &str = "Tree comparison error:";

/// Everything a comparator run can write.
#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    Outcome(ComparisonOutcome),
    Error(String),
}

impl Report {
    pub fn from_result(result: &Result<ComparisonOutcome, CompareError>) -> Self {
        match result {
            Ok(outcome) => Report::Outcome(outcome.clone()),
            // the error report is a single line
            Err(e) => Report::Error(e.to_string().replace(['\r', '\n'], " ")),
        }
    }

    /// Write the report to `path`, replacing any previous content.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        fs::write(path, self.to_string())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Error(message) => writeln!(f, "{ERROR_PREFIX} {message}"),
            Report::Outcome(ComparisonOutcome::Compared(c)) => {
                writeln!(f, "{HEADER}")?;
                writeln!(f, "{RF_LABEL} {}", c.rf)?;
                writeln!(f, "{FN_LABEL} {:?}", c.fn_rate)?;
                writeln!(f, "{FP_LABEL} {:?}", c.fp_rate)
            }
            Report::Outcome(ComparisonOutcome::InsufficientTaxa(counts)) => {
                writeln!(f, "{HEADER}")?;
                writeln!(
                    f,
                    "WARNING: Less than {MIN_COMMON_TAXA} common taxa found. Comparison not valid."
                )?;
                writeln!(f, "Trees have different taxon sets.")?;
                writeln!(f, "True tree taxa: {}", counts.true_taxa)?;
                writeln!(f, "Estimated tree taxa: {}", counts.estimated_taxa)?;
                writeln!(f, "Common taxa: {}", counts.common_taxa)?;
                writeln!(f, "{RF_LABEL} {NOT_APPLICABLE}")?;
                writeln!(f, "{FN_LABEL} {NOT_APPLICABLE}")?;
                writeln!(f, "{FP_LABEL} {NOT_APPLICABLE}")
            }
        }
    }
}

/// Metric values read back from a report. `None` means missing: the line was
/// absent or read `N/A`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ReportMetrics {
    pub rf: Option<f64>,
    pub fn_rate: Option<f64>,
    pub fp_rate: Option<f64>,
}

/// Scan `content` for the three metric lines.
///
/// A value that is neither a number nor `N/A` fails the whole report; the
/// caller decides how to degrade.
pub fn parse_report(content: &str) -> Result<ReportMetrics, ReportParseError> {
    let mut metrics = ReportMetrics::default();

    for line in content.lines() {
        for (label, slot) in [
            (RF_LABEL, &mut metrics.rf),
            (FN_LABEL, &mut metrics.fn_rate),
            (FP_LABEL, &mut metrics.fp_rate),
        ] {
            if let Some(pos) = line.find(label) {
                *slot = parse_value(label, &line[pos + label.len()..])?;
            }
        }
    }

    Ok(metrics)
}

fn parse_value(label: &str, raw: &str) -> Result<Option<f64>, ReportParseError> {
    let value = raw.trim();
    if value == NOT_APPLICABLE {
        return Ok(None);
    }
    value.parse::<f64>().map(Some).map_err(|_| ReportParseError {
        label: label.trim_end_matches(':').to_string(),
        value: value.to_string(),
    })
}

/// Render metrics back in report order; used in log lines.
pub fn describe_metrics(m: &ReportMetrics) -> String {
    [("RF", m.rf), ("FN", m.fn_rate), ("FP", m.fp_rate)]
        .iter()
        .map(|(name, value)| match value {
            Some(v) => format!("{name}={v}"),
            None => format!("{name}={NOT_APPLICABLE}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
