//! Pruning policies

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, Raster, RasterElement, Result};
use tracing::debug;

use crate::attribute::walk::level;
use crate::reconstruct::raster_from;
use crate::transform::TreeTransform;

/// What removing a node does to its subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PruningPolicy {
    /// Merge each matching node into its parent; children are reparented
    /// with their values unchanged
    #[default]
    Direct,
    /// As `Direct`, but every survivor below a removed node is lowered
    /// (raised in a min-tree) by the grey-level steps that were removed
    Subtract,
    /// Remove a node only when its whole subtree matches
    Minimum,
    /// Remove a matching node together with its whole subtree
    Maximum,
}

/// Parameters for attribute filtering
#[derive(Debug, Clone, Copy)]
pub struct AttributeFilterParams {
    /// Attribute compared against the threshold
    pub slot: AttributeSlot,
    pub threshold: f64,
    pub policy: PruningPolicy,
    /// Remove nodes whose attribute is above the threshold instead of below
    pub reverse_ordering: bool,
}

impl Default for AttributeFilterParams {
    fn default() -> Self {
        Self {
            slot: AttributeSlot::default(),
            threshold: 0.0,
            policy: PruningPolicy::Direct,
            reverse_ordering: false,
        }
    }
}

impl AttributeFilterParams {
    /// Whether an attribute value marks its node for removal
    pub fn matches(&self, value: f64) -> bool {
        if self.reverse_ordering {
            value > self.threshold
        } else {
            value < self.threshold
        }
    }

    fn node_matches<T: RasterElement>(&self, tree: &ComponentTree<T>, id: NodeId) -> bool {
        !tree[id].is_root() && self.matches(tree[id].attribute(self.slot))
    }
}

impl TreeTransform for AttributeFilterParams {
    fn name(&self) -> &'static str {
        "AttributeFilter"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        attribute_filter(tree, self);
        Ok(())
    }
}

/// Filter `tree` by the attribute in `params.slot`; returns the number of
/// removed nodes. The root is never removed.
pub fn attribute_filter<T: RasterElement>(
    tree: &mut ComponentTree<T>,
    params: &AttributeFilterParams,
) -> usize {
    let before = tree.len();
    match params.policy {
        PruningPolicy::Direct => direct(tree, params),
        PruningPolicy::Subtract => subtract(tree, params),
        PruningPolicy::Minimum => minimum(tree, params),
        PruningPolicy::Maximum => maximum(tree, params),
    }
    let removed = before - tree.len();
    debug!(
        "{:?} filter (threshold {}): removed {} of {} nodes",
        params.policy, params.threshold, removed, before
    );
    removed
}

/// Merge each of `ids` into its current parent, children before parents
pub(crate) fn merge_into_parents<T: RasterElement>(tree: &mut ComponentTree<T>, ids: &[NodeId]) {
    for &id in ids {
        if let Some(parent) = tree.node(id).ok().and_then(|n| n.parent()) {
            let merged = tree.merge(parent, id);
            debug_assert!(merged.is_ok(), "node {} failed to merge into {}", id, parent);
        }
    }
}

fn direct<T: RasterElement>(tree: &mut ComponentTree<T>, params: &AttributeFilterParams) {
    let doomed: Vec<NodeId> = tree
        .post_order()
        .filter(|&id| params.node_matches(tree, id))
        .collect();
    merge_into_parents(tree, &doomed);
}

fn subtract<T: RasterElement>(tree: &mut ComponentTree<T>, params: &AttributeFilterParams) {
    // Shift accumulated from removed ancestors, computed on the original levels
    let mut shift = vec![0.0f64; tree.slot_count()];
    let mut doomed = Vec::new();
    let order: Vec<NodeId> = tree.pre_order().collect();
    for &id in &order {
        let Some(parent) = tree[id].parent() else {
            continue;
        };
        let inherited = shift[parent];
        shift[id] = if params.node_matches(tree, parent) {
            let grand = tree[parent].parent().map_or(0.0, |g| level(tree[g].value()));
            inherited + level(tree[parent].value()) - grand
        } else {
            inherited
        };
        if params.node_matches(tree, id) {
            doomed.push(id);
        }
    }

    for &id in &order {
        if shift[id] != 0.0 {
            let shifted = level(tree[id].value()) - shift[id];
            tree[id].set_value(T::saturating_from_f64(shifted));
        }
    }

    doomed.reverse();
    merge_into_parents(tree, &doomed);
}

fn minimum<T: RasterElement>(tree: &mut ComponentTree<T>, params: &AttributeFilterParams) {
    let mut removable = vec![false; tree.slot_count()];
    let mut doomed = Vec::new();
    for id in tree.post_order() {
        let ok = params.node_matches(tree, id)
            && tree[id].children().iter().all(|&c| removable[c]);
        removable[id] = ok;
        if ok {
            doomed.push(id);
        }
    }
    merge_into_parents(tree, &doomed);
}

fn maximum<T: RasterElement>(tree: &mut ComponentTree<T>, params: &AttributeFilterParams) {
    let order: Vec<NodeId> = tree.pre_order().collect();
    for id in order {
        if !tree.contains(id) || !params.node_matches(tree, id) {
            continue;
        }
        if tree.flatten(id).is_ok() {
            merge_into_parents(tree, &[id]);
        }
    }
}

/// The image a `Direct` filter would reconstruct, computed without touching
/// the tree: pixels of removed nodes take the level of their nearest
/// surviving ancestor.
pub fn filtered_image<T: RasterElement>(
    tree: &ComponentTree<T>,
    slot: AttributeSlot,
    threshold: f64,
    reverse_ordering: bool,
) -> Result<Raster<T>> {
    let params = AttributeFilterParams {
        slot,
        threshold,
        reverse_ordering,
        ..Default::default()
    };
    let mut levels: Vec<T> = vec![T::zero(); tree.slot_count()];
    let mut data = vec![T::zero(); tree.pixel_count()];
    for id in tree.pre_order() {
        let value = match tree[id].parent() {
            Some(parent) if params.node_matches(tree, id) => levels[parent],
            _ => tree[id].value(),
        };
        levels[id] = value;
        for pixel in tree.indexes(id)? {
            data[pixel] = value;
        }
    }
    raster_from(tree, data)
}
