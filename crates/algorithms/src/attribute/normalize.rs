//! Attribute normalisation

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement, Result};
use tracing::debug;

use crate::transform::TreeTransform;

/// Divide `slot` by its maximum over the tree and return that maximum.
///
/// Left unchanged when the maximum is zero, negative or not finite.
pub fn normalize<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) -> f64 {
    let max = tree
        .iter()
        .map(|(_, n)| n.attribute(slot))
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() || max <= 0.0 {
        return max;
    }
    let ids: Vec<NodeId> = tree.ids().collect();
    for id in ids {
        let v = tree[id].attribute(slot);
        tree[id].set_attribute(slot, v / max);
    }
    max
}

/// Parameters for [`normalize`]
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeParams {
    pub slot: AttributeSlot,
}

impl TreeTransform for NormalizeParams {
    fn name(&self) -> &'static str {
        "Normalize"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        let max = normalize(tree, self.slot);
        debug!("Normalized slot {} by {}", self.slot.index(), max);
        Ok(())
    }
}
