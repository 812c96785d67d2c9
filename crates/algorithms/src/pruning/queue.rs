//! Deterministic leaf priority queue

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement};

/// A queued leaf, ordered so that `BinaryHeap` pops the next leaf to remove
#[derive(Debug, Clone, Copy)]
struct Entry {
    key: f64,
    node: NodeId,
    largest_first: bool,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_key = if self.largest_first {
            self.key.total_cmp(&other.key)
        } else {
            other.key.total_cmp(&self.key)
        };
        // Equal keys: lower arena index first
        by_key.then_with(|| other.node.cmp(&self.node))
    }
}

/// Leaves keyed by one attribute slot.
///
/// Pops the smallest attribute first, or the largest with `largest_first`.
/// Ties go to the lowest node id, so runs are reproducible.
#[derive(Debug, Clone)]
pub struct LeafQueue {
    heap: BinaryHeap<Entry>,
    slot: AttributeSlot,
    largest_first: bool,
}

impl LeafQueue {
    pub fn new(slot: AttributeSlot, largest_first: bool) -> Self {
        Self {
            heap: BinaryHeap::new(),
            slot,
            largest_first,
        }
    }

    /// Queue holding every leaf of `tree` except a childless root
    pub fn from_leaves<T: RasterElement>(
        tree: &ComponentTree<T>,
        slot: AttributeSlot,
        largest_first: bool,
    ) -> Self {
        let mut queue = Self::new(slot, largest_first);
        for leaf in tree.leaves() {
            if !tree[leaf].is_root() {
                queue.push(tree, leaf);
            }
        }
        queue
    }

    /// Queue `node` keyed by its current attribute
    pub fn push<T: RasterElement>(&mut self, tree: &ComponentTree<T>, node: NodeId) {
        self.heap.push(Entry {
            key: tree[node].attribute(self.slot),
            node,
            largest_first: self.largest_first,
        });
    }

    /// Next leaf and its attribute
    pub fn pop(&mut self) -> Option<(NodeId, f64)> {
        self.heap.pop().map(|e| (e.node, e.key))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Merge leaf `id` into its parent. Returns the parent when it became a
/// leaf, `None` when it still has children.
pub(crate) fn prune_leaf<T: RasterElement>(
    tree: &mut ComponentTree<T>,
    id: NodeId,
) -> Option<NodeId> {
    let parent = tree[id].parent()?;
    tree.merge(parent, id).ok()?;
    tree[parent].is_leaf().then_some(parent)
}
