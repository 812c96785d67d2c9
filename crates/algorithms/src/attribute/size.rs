//! Counting and intensity attributes

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, RasterElement, TreeOrdering};

use super::walk::{accumulate, level, per_node};

/// Number of pixels in each node's subtree
pub fn size<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    accumulate(tree, slot, |t, id| t[id].pixel_count() as f64, |a, b| a + b);
}

/// Subtree size in physical units: pixel count times the volume of one pixel
pub fn physical_size<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    let pixel_volume = tree.spacing().pixel_volume();
    accumulate(
        tree,
        slot,
        |t, id| t[id].pixel_count() as f64 * pixel_volume,
        |a, b| a + b,
    );
}

/// Sum of pixel values over each node's subtree.
///
/// Pixels attached to a node all carry the node's value, so the own term is
/// `pixel_count * value`.
pub fn integrated_intensity<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    accumulate(
        tree,
        slot,
        |t, id| t[id].pixel_count() as f64 * level(t[id].value()),
        |a, b| a + b,
    );
}

/// The node's own intensity level
pub fn intensity<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    per_node(tree, slot, |t, id| level(t[id].value()));
}

/// 1 for leaves, 0 for inner nodes
pub fn leaf_flag<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    per_node(tree, slot, |t, id| if t[id].is_leaf() { 1.0 } else { 0.0 });
}

/// Most extreme level reached inside each subtree (the regional extremum
/// for leaves, the highest peak below an inner node for a max-tree)
pub fn peak_intensity<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot) {
    let combine: fn(f64, f64) -> f64 = match tree.ordering() {
        TreeOrdering::Max => f64::max,
        TreeOrdering::Min => f64::min,
    };
    accumulate(tree, slot, |t, id| level(t[id].value()), combine);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, Raster, Spacing};

    fn ridge() -> ComponentTree<u8> {
        let raster = Raster::from_vec(vec![1u8, 3, 2, 3, 1], &[5]).unwrap();
        max_tree(&raster, Connectivity::Face).unwrap()
    }

    fn slot(i: usize) -> AttributeSlot {
        AttributeSlot::new(i).unwrap()
    }

    #[test]
    fn test_size() {
        let mut tree = ridge();
        size(&mut tree, slot(0));
        let sizes: Vec<f64> = tree.iter().map(|(_, n)| n.attribute(slot(0))).collect();
        assert_eq!(sizes, vec![5.0, 3.0, 1.0, 1.0]);
    }

    #[test]
    fn test_integrated_intensity() {
        let mut tree = ridge();
        integrated_intensity(&mut tree, slot(1));
        // root: 1+3+2+3+1
        assert_eq!(tree[tree.root()].attribute(slot(1)), 10.0);
        assert_eq!(tree[1].attribute(slot(1)), 8.0);
    }

    #[test]
    fn test_physical_size_uses_spacing() {
        let mut raster = Raster::filled(&[2, 2], 7u8);
        raster.set_spacing(Spacing::new(vec![0.5, 3.0]).unwrap()).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        physical_size(&mut tree, slot(0));
        assert!((tree[tree.root()].attribute(slot(0)) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut tree = ridge();
        size(&mut tree, slot(0));
        leaf_flag(&mut tree, slot(1));
        intensity(&mut tree, slot(2));
        peak_intensity(&mut tree, slot(3));
        let root = &tree[tree.root()];
        assert_eq!(root.attribute(slot(0)), 5.0);
        assert_eq!(root.attribute(slot(1)), 0.0);
        assert_eq!(root.attribute(slot(2)), 1.0);
        assert_eq!(root.attribute(slot(3)), 3.0);
        assert_eq!(tree[2].attribute(slot(1)), 1.0);
    }
}
