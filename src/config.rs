//! Summarizer configuration: which model conditions and methods to collect.
//!
//! ```toml
//! models = ["1000M1", "1000M4"]
//!
//! [[methods]]
//! key = "fasttree_gtr"
//! label = "FastTree (GTR)"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{SummaryError, SummaryResult};

/// Reports are named `<method key>_comparison.txt`.
pub const REPORT_SUFFIX: &str = "_comparison.txt";

/// A method key as found in report file names, and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MethodLabel {
    pub key: String,
    pub label: String,
}

impl MethodLabel {
    pub fn new(key: &str, label: &str) -> Self {
        MethodLabel { key: key.to_string(), label: label.to_string() }
    }

    pub fn report_file_name(&self) -> String {
        format!("{}{REPORT_SUFFIX}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    /// Model condition directory names under the results root
    pub models: Vec<String>,
    /// Methods in display order
    pub methods: Vec<MethodLabel>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        SummaryConfig {
            models: vec!["1000M1".to_string(), "1000M4".to_string()],
            methods: vec![
                MethodLabel::new("fasttree_gtr", "FastTree (GTR)"),
                MethodLabel::new("fasttree_jc", "FastTree (JC)"),
                MethodLabel::new("nj_jc", "NJ (JC)"),
                MethodLabel::new("nj_logdet", "NJ (LogDet)"),
                MethodLabel::new("nj_pdist", "NJ (p-distance)"),
            ],
        }
    }
}

impl SummaryConfig {
    pub fn from_toml_str(content: &str) -> SummaryResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> SummaryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SummaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}
