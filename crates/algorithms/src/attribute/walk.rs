//! Generic attribute walkers
//!
//! Each walker visits the live tree once without recursion and writes one
//! attribute slot. Concrete attributes are thin wrappers that supply the
//! per-node rule.

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement};

/// Children before parents: `slot = fold(children's slot, own(node), combine)`
pub fn accumulate<T, F, C>(tree: &mut ComponentTree<T>, slot: AttributeSlot, own: F, combine: C)
where
    T: RasterElement,
    F: Fn(&ComponentTree<T>, NodeId) -> f64,
    C: Fn(f64, f64) -> f64,
{
    let order: Vec<NodeId> = tree.post_order().collect();
    for id in order {
        let acc = tree[id]
            .children()
            .iter()
            .fold(own(tree, id), |acc, &c| combine(acc, tree[c].attribute(slot)));
        tree[id].set_attribute(slot, acc);
    }
}

/// Parents before children: the root gets `root_value`, every other node
/// `rule(tree, node, parent)`; the parent's slot is already final when read
pub fn propagate<T, F>(tree: &mut ComponentTree<T>, slot: AttributeSlot, root_value: f64, rule: F)
where
    T: RasterElement,
    F: Fn(&ComponentTree<T>, NodeId, NodeId) -> f64,
{
    let order: Vec<NodeId> = tree.pre_order().collect();
    for id in order {
        let value = match tree[id].parent() {
            None => root_value,
            Some(parent) => rule(tree, id, parent),
        };
        tree[id].set_attribute(slot, value);
    }
}

/// Independent per-node rule
pub fn per_node<T, F>(tree: &mut ComponentTree<T>, slot: AttributeSlot, rule: F)
where
    T: RasterElement,
    F: Fn(&ComponentTree<T>, NodeId) -> f64,
{
    let ids: Vec<NodeId> = tree.ids().collect();
    for id in ids {
        let value = rule(tree, id);
        tree[id].set_attribute(slot, value);
    }
}

/// `f64` view of a pixel value; every `RasterElement` converts
pub(crate) fn level<T: RasterElement>(value: T) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
