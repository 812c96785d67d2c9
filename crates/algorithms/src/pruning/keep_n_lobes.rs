//! Keep the N most prominent lobes

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, Error, RasterElement, Result};
use tracing::debug;

use super::queue::{prune_leaf, LeafQueue};
use crate::transform::TreeTransform;

/// Parameters for lobe selection
#[derive(Debug, Clone, Copy)]
pub struct KeepNLobesParams {
    /// Attribute ranking the leaves
    pub slot: AttributeSlot,
    /// Number of leaves to keep (at least 1)
    pub lobes: usize,
    /// Drop the largest attribute first instead of the smallest
    pub reverse_ordering: bool,
    /// Queue parents that become leaves during pruning
    pub add_new_leaves_to_queue: bool,
}

impl Default for KeepNLobesParams {
    fn default() -> Self {
        Self {
            slot: AttributeSlot::default(),
            lobes: 1,
            reverse_ordering: false,
            add_new_leaves_to_queue: true,
        }
    }
}

impl TreeTransform for KeepNLobesParams {
    fn name(&self) -> &'static str {
        "KeepNLobes"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        keep_n_lobes(tree, self).map(|_| ())
    }
}

/// Merge the weakest leaves into their parents until `params.lobes` leaves
/// remain; returns the number of merged nodes.
///
/// Removing a leaf whose parent then has no children leaves the leaf count
/// unchanged. Without `add_new_leaves_to_queue` such parents are never
/// removed, so more than `lobes` leaves can survive.
pub fn keep_n_lobes<T: RasterElement>(
    tree: &mut ComponentTree<T>,
    params: &KeepNLobesParams,
) -> Result<usize> {
    if params.lobes == 0 {
        return Err(Error::InvalidParameter {
            name: "lobes",
            value: "0".into(),
            reason: "at least one lobe must be kept".into(),
        });
    }

    let mut queue = LeafQueue::from_leaves(tree, params.slot, params.reverse_ordering);
    let mut leaves = tree.leaves().count();
    let mut removed = 0;

    while leaves > params.lobes {
        let Some((leaf, _)) = queue.pop() else {
            break;
        };
        removed += 1;
        match prune_leaf(tree, leaf) {
            Some(parent) => {
                if params.add_new_leaves_to_queue && !tree[parent].is_root() {
                    queue.push(tree, parent);
                }
            }
            None => leaves -= 1,
        }
    }

    debug!(
        "KeepNLobes({}): merged {} nodes, {} leaves remain",
        params.lobes, removed, leaves
    );
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{intensity, size};
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, NodeId, Raster};

    fn slot() -> AttributeSlot {
        AttributeSlot::new(0).unwrap()
    }

    fn leaf_values(tree: &ComponentTree<u8>) -> Vec<u8> {
        let mut values: Vec<u8> = tree.leaves().map(|id| tree[id].value()).collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn test_keeps_two_strongest() {
        let raster = Raster::from_vec(vec![10u8, 0, 7, 0, 5, 0, 3, 0, 1], &[9]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        intensity(&mut tree, slot());
        let params = KeepNLobesParams {
            slot: slot(),
            lobes: 2,
            ..Default::default()
        };
        let removed = keep_n_lobes(&mut tree, &params).unwrap();
        assert_eq!(removed, 3);
        assert_eq!(leaf_values(&tree), vec![7, 10]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_ties_favor_lower_ids() {
        let raster = Raster::from_vec(vec![4u8, 0, 4, 0, 4], &[5]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        intensity(&mut tree, slot());
        let mut leaves: Vec<NodeId> = tree.leaves().collect();
        leaves.sort_unstable();
        let params = KeepNLobesParams {
            slot: slot(),
            lobes: 1,
            ..Default::default()
        };
        keep_n_lobes(&mut tree, &params).unwrap();
        let survivors: Vec<NodeId> = tree.leaves().collect();
        assert_eq!(survivors, vec![leaves[2]]);
    }

    #[test]
    fn test_exposed_parent_is_queued() {
        // a small peak on a shoulder, next to a bigger peak
        let raster = Raster::from_vec(vec![0u8, 2, 3, 2, 0, 6, 6, 6, 6, 0], &[10]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        size(&mut tree, slot());
        let params = KeepNLobesParams {
            slot: slot(),
            lobes: 1,
            ..Default::default()
        };
        keep_n_lobes(&mut tree, &params).unwrap();
        // the shoulder (size 3) is queued once its peak is gone and goes
        // before the plateau (size 4)
        assert_eq!(leaf_values(&tree), vec![6]);
        assert_eq!(tree.len(), 2);

        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        size(&mut tree, slot());
        let params = KeepNLobesParams {
            add_new_leaves_to_queue: false,
            ..params
        };
        keep_n_lobes(&mut tree, &params).unwrap();
        // the bare shoulder is never queued, so the plateau is taken instead
        assert_eq!(leaf_values(&tree), vec![2]);
    }

    #[test]
    fn test_zero_lobes_rejected() {
        let raster = Raster::from_vec(vec![1u8, 0, 1], &[3]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        let before = tree.len();
        let params = KeepNLobesParams {
            lobes: 0,
            ..Default::default()
        };
        assert!(matches!(
            keep_n_lobes(&mut tree, &params),
            Err(Error::InvalidParameter { .. })
        ));
        assert_eq!(tree.len(), before);
    }
}
