//! Error types for tree comparison and result summarization.

use std::path::PathBuf;

use thiserror::Error;

use crate::io::TreeFormat;

/// Errors raised while reading or comparing two trees.
///
/// The comparator never propagates these to the process exit code; they are
/// rendered into the report as `Tree comparison error: <message>`.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {} ({})", path.display(), format_attempts(attempts))]
    Parse {
        path: PathBuf,
        attempts: Vec<(TreeFormat, String)>,
    },

    /// A single format rejected the input; collected into [`CompareError::Parse`].
    #[error("{0}")]
    Format(String),

    #[error("tree contains a leaf without a label")]
    UnnamedLeaf,

    #[error("duplicate leaf label '{0}'")]
    DuplicateLabel(String),

    #[error("malformed tree: {0}")]
    Tree(String),
}

fn format_attempts(attempts: &[(TreeFormat, String)]) -> String {
    if attempts.is_empty() {
        return "no formats attempted".to_string();
    }
    attempts
        .iter()
        .map(|(format, msg)| format!("{format}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A metric line in a comparison report carried a value that is neither a
/// number nor `N/A`.
#[derive(Debug, Error)]
#[error("invalid value '{value}' for '{label}'")]
pub struct ReportParseError {
    pub label: String,
    pub value: String,
}

/// Errors raised by the results summarizer.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid summary configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("plot rendering failed: {0}")]
    Plot(String),
}

pub type CompareResult<T> = Result<T, CompareError>;
pub type SummaryResult<T> = Result<T, SummaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_lists_every_attempt() {
        let err = CompareError::Parse {
            path: PathBuf::from("est.tre"),
            attempts: vec![
                (TreeFormat::Newick, "unexpected token".to_string()),
                (TreeFormat::Nexus, "missing #NEXUS header".to_string()),
            ],
        };
        assert_eq!(
            err.to_string(),
            "could not parse est.tre (newick: unexpected token; nexus: missing #NEXUS header)"
        );
    }
}
