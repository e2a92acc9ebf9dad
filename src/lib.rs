//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Modules:
//! - `io`: reading Newick / NEXUS tree files with an ordered format fallback.
//! - `taxa`: taxon namespace and reconciliation of two trees' leaf sets.
//! - `bitset`: compact bitset representation for splits.
//! - `snapshot`: split sets of a tree restricted to a namespace.
//! - `distances`: RF distance and FN / FP split rates.
//! - `compare`: estimated vs true tree comparison.
//! - `report`: the flat-text comparison report, written and parsed.
//! - `config`: model / method layout for the summarizer.
//! - `summary`: replicate aggregation and CSV output.
//! - `plot`: grouped bar charts of mean rates.
//! - `api`: Python bindings via `pyo3` (gated behind "python" feature).

pub mod bitset;
pub mod compare;
pub mod config;
pub mod distances;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod snapshot;
pub mod summary;
pub mod taxa;

#[cfg(feature = "python")]
pub mod api;

// Re-export frequently used types & functions
pub use bitset::Bitset;
pub use compare::{CompareOptions, ComparisonOutcome, compare_tree_files, compare_trees};
pub use config::SummaryConfig;
pub use io::{TreeFormat, read_tree};
pub use report::Report;
pub use snapshot::{SplitMode, TreeSnapshot};
pub use summary::summarize_results;
