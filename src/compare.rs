//! Comparison of an estimated tree against a true tree.
//!
//! Taxa are reconciled first. With fewer than [`MIN_COMMON_TAXA`] shared
//! taxa no internal split can exist and the comparison is reported as
//! invalid; otherwise both trees are pruned to the shared taxa and their
//! split sets are compared.

use std::path::Path;

use phylotree::tree::Tree as PhyloTree;

use crate::distances::{EmptySplitPolicy, rf_from_snapshots, split_rates};
use crate::error::CompareResult;
use crate::io::{TreeFormat, read_tree};
use crate::snapshot::{SplitMode, TreeSnapshot};
use crate::taxa::{TaxonReconciliation, leaf_labels};

/// A tree needs at least three leaves to have an internal edge.
pub const MIN_COMMON_TAXA: usize = 3;

#[derive(Clone, Debug)]
pub struct CompareOptions {
    /// Formats tried, in order, for each input file
    pub formats: Vec<TreeFormat>,
    pub split_mode: SplitMode,
    pub empty_splits: EmptySplitPolicy,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            formats: TreeFormat::DEFAULT_ORDER.to_vec(),
            split_mode: SplitMode::default(),
            empty_splits: EmptySplitPolicy::default(),
        }
    }
}

/// Metrics of a valid comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitComparison {
    pub rf: usize,
    pub fn_rate: f64,
    pub fp_rate: f64,
    pub true_splits: usize,
    pub estimated_splits: usize,
    pub common_taxa: usize,
    /// Whether taxa outside the common set were pruned away
    pub pruned: bool,
}

/// Taxon counts of a comparison that could not be made.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TaxonCounts {
    pub true_taxa: usize,
    pub estimated_taxa: usize,
    pub common_taxa: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComparisonOutcome {
    Compared(SplitComparison),
    /// Fewer than [`MIN_COMMON_TAXA`] shared taxa; every metric is N/A.
    InsufficientTaxa(TaxonCounts),
}

/// Compare two already parsed trees.
pub fn compare_trees(
    estimated: &PhyloTree,
    reference: &PhyloTree,
    options: &CompareOptions,
) -> CompareResult<ComparisonOutcome> {
    let reference_labels = leaf_labels(reference)?;
    let estimated_labels = leaf_labels(estimated)?;
    log::info!("True tree has {} taxa", reference_labels.len());
    log::info!("Estimated tree has {} taxa", estimated_labels.len());

    let taxa = TaxonReconciliation::reconcile(&estimated_labels, &reference_labels);
    log::info!("Trees share {} taxa in common", taxa.common_taxa());

    if taxa.common_taxa() < MIN_COMMON_TAXA {
        log::warn!(
            "Less than {MIN_COMMON_TAXA} common taxa found. Tree comparison is not valid."
        );
        return Ok(ComparisonOutcome::InsufficientTaxa(TaxonCounts {
            true_taxa: taxa.true_taxa,
            estimated_taxa: taxa.estimated_taxa,
            common_taxa: taxa.common_taxa(),
        }));
    }

    let pruned = taxa.needs_pruning();
    if pruned {
        log::info!("Pruning trees to common taxa set");
    }

    let true_snap = TreeSnapshot::from_tree(reference, &taxa.common, options.split_mode)?;
    let est_snap = TreeSnapshot::from_tree(estimated, &taxa.common, options.split_mode)?;
    log::debug!(
        "True tree splits: {:?}; estimated tree splits: {:?}",
        true_snap.describe(&taxa.common),
        est_snap.describe(&taxa.common)
    );

    let rates = split_rates(&est_snap, &true_snap, options.empty_splits);

    Ok(ComparisonOutcome::Compared(SplitComparison {
        rf: rf_from_snapshots(&true_snap, &est_snap),
        fn_rate: rates.fn_rate,
        fp_rate: rates.fp_rate,
        true_splits: true_snap.len(),
        estimated_splits: est_snap.len(),
        common_taxa: taxa.common_taxa(),
        pruned,
    }))
}

/// Read both tree files with the configured format chain and compare them.
pub fn compare_tree_files<P: AsRef<Path>, Q: AsRef<Path>>(
    estimated_path: P,
    true_path: Q,
    options: &CompareOptions,
) -> CompareResult<ComparisonOutcome> {
    let reference = read_tree(true_path, &options.formats)?;
    let estimated = read_tree(estimated_path, &options.formats)?;
    compare_trees(&estimated, &reference, options)
}
