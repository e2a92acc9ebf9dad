//! Tree distance metrics over split snapshots.
//!
//! 1. **Robinson-Foulds (RF)**: number of splits present in exactly one of
//!    the two trees. Range: [0, 2n-6] for unrooted binary trees on n taxa.
//!
//! 2. **FN / FP rates**: the fraction of true-tree splits missing from the
//!    estimated tree, and the fraction of estimated-tree splits absent from the
//!    true tree.

use phylotree::tree::Tree as PhyloTree;

use crate::error::CompareResult;
use crate::snapshot::{SplitMode, TreeSnapshot};
use crate::taxa::{TaxonReconciliation, leaf_labels};

/// What a rate becomes when its denominator (the split count of one tree) is
/// zero, e.g. for a star tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EmptySplitPolicy {
    /// Divide by 1 instead. The numerator is necessarily 0, so the rate is 0.
    #[default]
    DivideByOne,
    /// Report the worst case, 1.0.
    WorstCase,
}

/// False-negative and false-positive split rates of an estimated tree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitRates {
    pub fn_rate: f64,
    pub fp_rate: f64,
}

/// Compute Robinson-Foulds distance between two trees over their shared taxa.
///
/// # Example
/// ```text
/// Tree 1:  ((A,B),(C,D),E)     Splits: AB|CDE, CD|ABE
/// Tree 2:  ((A,C),(B,D),E)     Splits: AC|BDE, BD|ACE
///
/// Intersection: 0 splits match
/// RF = 2 + 2 - 2*0 = 4
/// ```
///
/// # Errors
/// Returns an error if a tree has unlabeled or duplicated leaves.
pub fn robinson_foulds(tree_a: &PhyloTree, tree_b: &PhyloTree, mode: SplitMode) -> CompareResult<usize> {
    let taxa = TaxonReconciliation::reconcile(&leaf_labels(tree_a)?, &leaf_labels(tree_b)?);
    let snap_a = TreeSnapshot::from_tree(tree_a, &taxa.common, mode)?;
    let snap_b = TreeSnapshot::from_tree(tree_b, &taxa.common, mode)?;

    Ok(rf_from_snapshots(&snap_a, &snap_b))
}

/// Compute Robinson-Foulds distance from two pre-computed snapshots.
///
/// ```text
/// intersection = A.parts ∩ B.parts
/// RF = len(A) + len(B) - 2 * len(intersection)
/// ```
pub fn rf_from_snapshots(a: &TreeSnapshot, b: &TreeSnapshot) -> usize {
    let inter = a.parts.intersection(&b.parts).count();
    a.parts.len() + b.parts.len() - 2 * inter
}

/// FN and FP rates of `estimated` measured against `reference`.
///
/// ```text
/// FN = |reference \ estimated| / |reference|
/// FP = |estimated \ reference| / |estimated|
/// ```
pub fn split_rates(
    estimated: &TreeSnapshot,
    reference: &TreeSnapshot,
    policy: EmptySplitPolicy,
) -> SplitRates {
    let missing = reference.parts.difference(&estimated.parts).count();
    let extra = estimated.parts.difference(&reference.parts).count();

    SplitRates {
        fn_rate: rate(missing, reference.parts.len(), policy),
        fp_rate: rate(extra, estimated.parts.len(), policy),
    }
}

fn rate(numerator: usize, denominator: usize, policy: EmptySplitPolicy) -> f64 {
    match (denominator, policy) {
        (0, EmptySplitPolicy::DivideByOne) => numerator as f64,
        (0, EmptySplitPolicy::WorstCase) => 1.0,
        _ => numerator as f64 / denominator as f64,
    }
}
