//! Contrast attributes measured against ancestors

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement};

use super::walk::{level, per_node, propagate};

/// Step in level between a node and its parent; the root gets 0
pub fn gradient<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    propagate(tree, slot, 0.0, |t, id, parent| {
        (level(t[id].value()) - level(t[parent].value())).abs()
    });
}

/// Contrast between a node and the nearest ancestor where another branch
/// joins its own (the saddle the node's lobe merges at).
///
/// Nodes on the root's single chain are measured against the root. With
/// `use_zero_leaves`, leaves get 0 so that only inner nodes rank.
pub fn local_gradient<T: RasterElement>(
    tree: &mut ComponentTree<T>,
    slot: AttributeSlot,
    use_zero_leaves: bool,
) {
    let mut saddle = vec![0.0; tree.slot_count()];
    let order: Vec<NodeId> = tree.pre_order().collect();
    for &id in &order {
        let node = &tree[id];
        saddle[id] = match node.parent() {
            None => level(node.value()),
            Some(p) if tree[p].children().len() > 1 => level(tree[p].value()),
            Some(p) => saddle[p],
        };
    }

    per_node(tree, slot, |t, id| {
        if use_zero_leaves && t[id].is_leaf() {
            0.0
        } else {
            (level(t[id].value()) - saddle[id]).abs()
        }
    });
}

/// Distance in level from the root; the root gets 0
pub fn intensity_variation<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    let base = level(tree[tree.root()].value());
    per_node(tree, slot, |t, id| (level(t[id].value()) - base).abs());
}
