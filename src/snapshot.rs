//! Extract split snapshots from phylogenetic trees.
//!
//! # Overview
//! A TreeSnapshot captures the non-trivial splits of a tree over a fixed
//! [`TaxonNamespace`]. Snapshots of two trees built on the same namespace can
//! be compared directly with set operations.
//!
//! # What is a bipartition?
//! Each internal branch in a tree divides the leaves into two groups.
//! ```text
//!      root
//!     /    \
//!   {A,B}  {C,D}  ← this branch creates the split AB|CD
//! ```
//!
//! # Pruning
//! Leaves whose label is not in the namespace contribute no bits. An internal
//! node left with a single contributing child then has the same leaf set as
//! that child, and the set-based storage merges the two. The result is exactly
//! the split set of the tree pruned to the namespace with its degree-2 nodes
//! collapsed.
//!
//! # Why taxon NAMES and not node ids
//! Node ids are assigned during parsing and differ across files. Bit positions
//! come from the sorted labels of the namespace, so identical taxa map to the
//! same bit in both trees.

use std::collections::HashSet;

use phylotree::tree::Tree as PhyloTree;

use crate::bitset::Bitset;
use crate::error::{CompareError, CompareResult};
use crate::taxa::TaxonNamespace;

/// How tree edges are turned into comparable splits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SplitMode {
    /// Bipartitions of the unrooted tree. The root position is ignored.
    #[default]
    Unrooted,
    /// Clusters (leaf sets below each node) of the rooted tree.
    Rooted,
}

/// An immutable snapshot of all non-trivial splits in a tree.
///
/// # Canonicalization
/// In [`SplitMode::Unrooted`] a split {A,B}|{C,D} could be stored as either
/// side. We always store the side that does NOT contain taxon index 0, so the
/// same split has the same bitset whichever way the tree was drawn.
///
/// In [`SplitMode::Rooted`] clusters are stored as-is.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    /// Canonical splits (HashSet for O(1) lookup)
    pub parts: HashSet<Bitset>,

    /// Number of taxa in the namespace the snapshot was built on
    pub num_leaves: usize,

    pub mode: SplitMode,
}

impl TreeSnapshot {
    /// Extract a snapshot from a phylogenetic tree.
    ///
    /// # Algorithm
    /// 1. DFS from the root, building bitsets bottom-up; a leaf sets the bit of
    ///    its label in `namespace`, or nothing if the label is outside it
    /// 2. Every non-root node yields a candidate split (its leaf set)
    /// 3. Canonicalize (unrooted mode only) and drop trivial splits
    ///
    /// # Errors
    /// Returns `CompareError::Tree` if the tree has no root or a dangling node id.
    pub fn from_tree(
        tree: &PhyloTree,
        namespace: &TaxonNamespace,
        mode: SplitMode,
    ) -> CompareResult<Self> {
        let root_id = tree
            .get_root()
            .map_err(|e| CompareError::Tree(e.to_string()))?;

        let mut clusters = Vec::new();
        Self::compute_bitsets(root_id, tree, namespace, &mut clusters)?;

        let num_leaves = namespace.len();
        let parts = clusters
            .into_iter()
            .filter(|(node_id, _)| *node_id != root_id)
            .filter_map(|(_, bitset)| Self::canonicalize(bitset, num_leaves, mode))
            .collect();

        Ok(TreeSnapshot { parts, num_leaves, mode })
    }

    /// Recursively compute the leaf bitset of every node via DFS.
    ///
    /// - **Leaf node**: single bit set, or empty if pruned away
    /// - **Internal node**: OR of all child bitsets
    fn compute_bitsets(
        node_id: usize,
        tree: &PhyloTree,
        namespace: &TaxonNamespace,
        out: &mut Vec<(usize, Bitset)>,
    ) -> CompareResult<Bitset> {
        let node = tree
            .get(&node_id)
            .map_err(|e| CompareError::Tree(e.to_string()))?;
        let mut bitset = Bitset::zeros(namespace.words());

        if node.children.is_empty() {
            if let Some(idx) = node.name.as_deref().and_then(|n| namespace.index_of(n)) {
                bitset.set(idx);
            }
        } else {
            for &child_id in &node.children {
                let child = Self::compute_bitsets(child_id, tree, namespace, out)?;
                bitset.or_assign(&child);
            }
        }

        out.push((node_id, bitset.clone()));
        Ok(bitset)
    }

    /// Map a node's leaf set to its canonical split, or `None` if trivial.
    ///
    /// Unrooted: flip to the side without taxon 0; both sides need at least
    /// two taxa. Rooted: at least two taxa and not the full namespace.
    fn canonicalize(bitset: Bitset, num_leaves: usize, mode: SplitMode) -> Option<Bitset> {
        let size = bitset.count_ones();
        match mode {
            SplitMode::Unrooted => {
                if size < 2 || num_leaves - size < 2 {
                    return None;
                }
                if bitset.contains(0) {
                    Some(bitset.complement(num_leaves))
                } else {
                    Some(bitset)
                }
            }
            SplitMode::Rooted => (size >= 2 && size < num_leaves).then_some(bitset),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Render splits as sorted label lists, e.g. `["C,D,E", "D,E"]`.
    /// Handy for logs and assertions.
    pub fn describe(&self, namespace: &TaxonNamespace) -> Vec<String> {
        let mut out: Vec<String> = self
            .parts
            .iter()
            .map(|bits| {
                namespace
                    .labels()
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| bits.contains(*idx))
                    .map(|(_, label)| label.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        out.sort();
        out
    }
}
