//! Volume levelling

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement};

use super::walk::level;

/// Volume of each component above the level at which it merges into its
/// parent: `sum over the subtree of |pixel - parent level|`.
///
/// This combines the subtree size with the cumulated intensity variation:
/// `|integrated intensity - size * parent level|`. A component holds its
/// largest extent just before the merge, so the parent's level is the base.
/// The root is measured from its own level.
pub fn volume_levelling<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    let n = tree.slot_count();
    let mut sum = vec![0.0; n];
    let mut size = vec![0.0; n];

    let order: Vec<NodeId> = tree.post_order().collect();
    for &id in &order {
        let node = &tree[id];
        let own = node.pixel_count() as f64;
        sum[id] = own * level(node.value()) + node.children().iter().map(|&c| sum[c]).sum::<f64>();
        size[id] = own + node.children().iter().map(|&c| size[c]).sum::<f64>();
    }

    for id in order {
        let base = match tree[id].parent() {
            Some(p) => level(tree[p].value()),
            None => level(tree[id].value()),
        };
        tree[id].set_attribute(slot, (sum[id] - size[id] * base).abs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{max_tree, min_tree};
    use morphtree_core::{Connectivity, Raster};

    fn slot() -> AttributeSlot {
        AttributeSlot::new(2).unwrap()
    }

    #[test]
    fn test_volume_of_peaks() {
        let raster = Raster::from_vec(vec![1u8, 3, 2, 3, 1], &[5]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        volume_levelling(&mut tree, slot());
        let v: Vec<f64> = tree.iter().map(|(_, n)| n.attribute(slot())).collect();
        // root: 10 - 5*1; the 2-plateau: (3+2+3) - 3*1; each peak: 3 - 2
        assert_eq!(v, vec![5.0, 5.0, 1.0, 1.0]);
    }

    #[test]
    fn test_volume_min_tree() {
        let raster = Raster::from_vec(vec![5u8, 1, 1, 5], &[4]).unwrap();
        let mut tree = min_tree(&raster, Connectivity::Face).unwrap();
        volume_levelling(&mut tree, slot());
        let basin = tree.leaves().next().unwrap();
        assert_eq!(tree[basin].attribute(slot()), 8.0);
    }
}
