//! Taxon namespace and reconciliation of two trees' leaf sets.
//!
//! Two trees are parsed independently, so their node ids say nothing about
//! each other. Taxa are matched by label only, and the sorted label order of
//! the shared taxa decides which bit each taxon occupies in a split.

use std::collections::{BTreeSet, HashMap, HashSet};

use phylotree::tree::Tree as PhyloTree;

use crate::error::{CompareError, CompareResult};

/// Sorted set of taxon labels with a label → bit index lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonNamespace {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl TaxonNamespace {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let index = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), idx))
            .collect();
        TaxonNamespace { labels, index }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Bit index of `label`, or `None` if the taxon is outside the namespace.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of u64 words a bitset over this namespace needs.
    pub fn words(&self) -> usize {
        self.labels.len().div_ceil(64).max(1)
    }
}

/// Collect the leaf labels of `tree`, checking that every leaf is labeled
/// and that no label repeats.
pub fn leaf_labels(tree: &PhyloTree) -> CompareResult<Vec<String>> {
    let leaves = tree.get_leaves();
    let mut seen = HashSet::with_capacity(leaves.len());
    let mut labels = Vec::with_capacity(leaves.len());

    for leaf_id in leaves {
        let node = tree
            .get(&leaf_id)
            .map_err(|e| CompareError::Tree(e.to_string()))?;
        let label = match node.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(CompareError::UnnamedLeaf),
        };
        if !seen.insert(label) {
            return Err(CompareError::DuplicateLabel(label.to_string()));
        }
        labels.push(label.to_string());
    }

    Ok(labels)
}

/// Taxon counts of both trees and the namespace of their shared taxa.
#[derive(Debug, Clone)]
pub struct TaxonReconciliation {
    pub true_taxa: usize,
    pub estimated_taxa: usize,
    pub common: TaxonNamespace,
}

impl TaxonReconciliation {
    pub fn reconcile(estimated: &[String], reference: &[String]) -> Self {
        let reference_set: HashSet<&str> = reference.iter().map(String::as_str).collect();
        let common = TaxonNamespace::new(
            estimated
                .iter()
                .filter(|label| reference_set.contains(label.as_str()))
                .cloned(),
        );

        TaxonReconciliation {
            true_taxa: reference.len(),
            estimated_taxa: estimated.len(),
            common,
        }
    }

    pub fn common_taxa(&self) -> usize {
        self.common.len()
    }

    /// True when at least one tree carries taxa the other lacks.
    pub fn needs_pruning(&self) -> bool {
        self.common.len() < self.true_taxa || self.common.len() < self.estimated_taxa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn namespace_is_sorted_and_deduplicated() {
        let ns = TaxonNamespace::new(["Human", "Chimp", "Gorilla", "Chimp"]);
        assert_eq!(ns.labels(), &["Chimp", "Gorilla", "Human"]);
        assert_eq!(ns.index_of("Chimp"), Some(0));
        assert_eq!(ns.index_of("Human"), Some(2));
        assert_eq!(ns.index_of("Orangutan"), None);
        assert_eq!(ns.words(), 1);
    }

    /// Labels are compared literally: case and underscores matter.
    #[test]
    fn namespace_does_not_fold_labels() {
        let ns = TaxonNamespace::new(["taxon_a", "Taxon_A", "taxon a"]);
        assert_eq!(ns.len(), 3);
    }

    #[test]
    fn reconcile_identical_sets() {
        let r = TaxonReconciliation::reconcile(&labels(&["A", "B", "C"]), &labels(&["C", "B", "A"]));
        assert_eq!(r.common_taxa(), 3);
        assert!(!r.needs_pruning());
    }

    #[test]
    fn reconcile_partial_overlap() {
        let r = TaxonReconciliation::reconcile(
            &labels(&["A", "B", "C", "D", "X"]),
            &labels(&["A", "B", "C", "D", "Y", "Z"]),
        );
        assert_eq!(r.estimated_taxa, 5);
        assert_eq!(r.true_taxa, 6);
        assert_eq!(r.common.labels(), &["A", "B", "C", "D"]);
        assert!(r.needs_pruning());
    }

    #[test]
    fn leaf_labels_rejects_duplicates() {
        let tree = PhyloTree::from_newick("((A,B),(A,C));").unwrap();
        assert!(matches!(leaf_labels(&tree), Err(CompareError::DuplicateLabel(l)) if l == "A"));
    }
}
