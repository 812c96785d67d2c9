//! Granulometry by successive leaf removal

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement, Result};
use serde::Serialize;
use tracing::debug;

use super::queue::{prune_leaf, LeafQueue};
use crate::transform::{TreeSource, TreeTransform};

/// Parameters for granulometry
#[derive(Debug, Clone, Copy, Default)]
pub struct GranulometryParams {
    /// Attribute that orders the leaves
    pub slot: AttributeSlot,
    /// Remove the largest attribute first instead of the smallest
    pub reverse_ordering: bool,
}

/// One leaf removal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GranulometryStep {
    /// Removed leaf
    pub node: NodeId,
    /// Its attribute when it was removed
    pub attribute: f64,
    /// Pixels handed to the parent
    pub pixels: usize,
    /// Pixels moved so far, this step included
    pub cumulative_pixels: usize,
}

/// The granulometric curve: every removal in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GranulometryCurve {
    pub steps: Vec<GranulometryStep>,
}

impl GranulometryCurve {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Pixels moved over the whole run
    pub fn total_pixels(&self) -> usize {
        self.steps.last().map_or(0, |s| s.cumulative_pixels)
    }

    /// Pattern spectrum: pixels moved per distinct attribute value, in
    /// removal order
    pub fn spectrum(&self) -> Vec<(f64, usize)> {
        let mut out: Vec<(f64, usize)> = Vec::new();
        for step in &self.steps {
            match out.last_mut() {
                Some((attribute, pixels)) if *attribute == step.attribute => *pixels += step.pixels,
                _ => out.push((step.attribute, step.pixels)),
            }
        }
        out
    }
}

impl GranulometryParams {
    /// Like [`TreeTransform::transform`], but also returns the curve that
    /// `apply` discards
    pub fn transform_with_curve<'a, T: RasterElement>(
        &self,
        source: impl Into<TreeSource<'a, T>>,
    ) -> (ComponentTree<T>, GranulometryCurve) {
        let mut tree = source.into().into_tree();
        let curve = granulometry(&mut tree, self);
        (tree, curve)
    }
}

/// Reduces the tree to its root; use
/// [`transform_with_curve`](GranulometryParams::transform_with_curve) to keep
/// the curve.
impl TreeTransform for GranulometryParams {
    fn name(&self) -> &'static str {
        "Granulometry"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        granulometry(tree, self);
        Ok(())
    }
}

/// Remove leaves in attribute order until only the root remains.
///
/// A parent left without children joins the queue with its own attribute.
/// Attributes are not recomputed as pixels move.
pub fn granulometry<T: RasterElement>(
    tree: &mut ComponentTree<T>,
    params: &GranulometryParams,
) -> GranulometryCurve {
    let mut queue = LeafQueue::from_leaves(tree, params.slot, params.reverse_ordering);
    let mut curve = GranulometryCurve::default();
    let mut cumulative = 0;

    while tree.len() > 1 {
        let Some((leaf, attribute)) = queue.pop() else {
            break;
        };
        let pixels = tree[leaf].pixel_count();
        let exposed = prune_leaf(tree, leaf);
        cumulative += pixels;
        curve.steps.push(GranulometryStep {
            node: leaf,
            attribute,
            pixels,
            cumulative_pixels: cumulative,
        });
        if let Some(parent) = exposed.filter(|&p| !tree[p].is_root()) {
            queue.push(tree, parent);
        }
    }

    debug!(
        "Granulometry: {} removals, {} pixels moved",
        curve.len(),
        curve.total_pixels()
    );
    curve
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::size;
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, Raster};

    fn slot() -> AttributeSlot {
        AttributeSlot::new(0).unwrap()
    }

    #[test]
    fn test_runs_to_single_node() {
        let raster = Raster::from_vec(vec![0u8, 2, 5, 2, 3, 3, 2, 0, 4, 0], &[10]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        size(&mut tree, slot());
        let curve = granulometry(&mut tree, &GranulometryParams { slot: slot(), reverse_ordering: false });

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.count_indexes(tree.root()).unwrap(), 10);
        // peaks of size 1, 1 and 2, then the hill of size 6
        let sizes: Vec<f64> = curve.steps.iter().map(|s| s.attribute).collect();
        assert_eq!(sizes, vec![1.0, 1.0, 2.0, 6.0]);
        // the hill hands over its own pixels plus the peaks it absorbed
        assert_eq!(curve.steps[3].pixels, 6);
        assert_eq!(curve.total_pixels(), 1 + 1 + 2 + 6);
        assert_eq!(curve.spectrum(), vec![(1.0, 2), (2.0, 2), (6.0, 6)]);
    }

    #[test]
    fn test_reverse_takes_largest_leaf_first() {
        let raster = Raster::from_vec(vec![0u8, 2, 2, 0, 4, 0], &[6]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        size(&mut tree, slot());
        let curve = granulometry(&mut tree, &GranulometryParams { slot: slot(), reverse_ordering: true });
        assert_eq!(curve.steps[0].attribute, 2.0);
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn test_flat_image_is_empty_curve() {
        let raster = Raster::filled(&[3, 3], 7u8);
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        let curve = granulometry(&mut tree, &GranulometryParams::default());
        assert!(curve.is_empty());
        assert_eq!(curve.total_pixels(), 0);
    }

    #[test]
    fn test_curve_from_borrowed_tree() {
        let raster = Raster::from_vec(vec![0u8, 2, 2, 0, 4, 0], &[6]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        size(&mut tree, slot());
        let before = tree.len();

        let params = GranulometryParams { slot: slot(), reverse_ordering: false };
        let (pruned, curve) = params.transform_with_curve(&tree);
        assert_eq!(pruned.len(), 1);
        assert_eq!(curve.len(), 2);
        assert_eq!(tree.len(), before, "borrowed tree must not change");

        let mut in_place = tree.clone();
        assert_eq!(granulometry(&mut in_place, &params), curve);
    }
}
