//! Attribute computation
//!
//! Every node carries a fixed array of `f64` attribute slots. Each algorithm
//! here writes one [`AttributeSlot`], so several attributes can be computed
//! on the same tree and combined afterwards.
//!
//! | Attribute | Direction | Rule |
//! |---|---|---|
//! | size / physical size | bottom-up | own pixels + children |
//! | integrated intensity | bottom-up | own pixels x level + children |
//! | compactness | bottom-up | min/max covariance eigenvalue ratio |
//! | volume levelling | bottom-up | subtree volume above the parent level |
//! | gradient | per node | step to the parent level |
//! | local gradient | top-down | step to the nearest branching ancestor |
//! | intensity variation | per node | step to the root level |

mod compactness;
mod gradient;
mod math;
mod monotone;
mod normalize;
mod size;
mod volume;
pub mod walk;

pub use compactness::compactness;
pub use gradient::{gradient, intensity_variation, local_gradient};
pub use math::{binary, combine_slots, recursive, BinaryParams, CombineParams, MathOp, MathParams};
pub use monotone::{monotone, MonotoneParams, Propagation};
pub use normalize::{normalize, NormalizeParams};
pub use size::{integrated_intensity, intensity, leaf_flag, peak_intensity, physical_size, size};
pub use volume::volume_levelling;
pub use walk::{accumulate, per_node, propagate};

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, RasterElement, Result};
use tracing::debug;

use crate::transform::TreeTransform;

/// Runtime selection of a single-slot attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attribute {
    /// Subtree pixel count
    #[default]
    Size,
    /// Subtree size times pixel volume
    PhysicalSize,
    /// Sum of pixel values over the subtree
    IntegratedIntensity,
    /// The node's own level
    Intensity,
    /// Most extreme level in the subtree
    PeakIntensity,
    /// 1 for leaves
    Leaf,
    Gradient,
    LocalGradient { use_zero_leaves: bool },
    IntensityVariation,
    Compactness { weighted: bool },
    VolumeLevelling,
}

impl Attribute {
    /// Whether the attribute never decreases from a child to its parent
    /// (integrated intensity only on non-negative images)
    pub fn is_increasing(&self) -> bool {
        matches!(
            self,
            Attribute::Size | Attribute::PhysicalSize | Attribute::IntegratedIntensity
        )
    }

    /// Compute this attribute into `slot`
    pub fn compute<T: RasterElement>(&self, tree: &mut ComponentTree<T>, slot: AttributeSlot) {
        match *self {
            Attribute::Size => size(tree, slot),
            Attribute::PhysicalSize => physical_size(tree, slot),
            Attribute::IntegratedIntensity => integrated_intensity(tree, slot),
            Attribute::Intensity => intensity(tree, slot),
            Attribute::PeakIntensity => peak_intensity(tree, slot),
            Attribute::Leaf => leaf_flag(tree, slot),
            Attribute::Gradient => gradient(tree, slot),
            Attribute::LocalGradient { use_zero_leaves } => {
                local_gradient(tree, slot, use_zero_leaves)
            }
            Attribute::IntensityVariation => intensity_variation(tree, slot),
            Attribute::Compactness { weighted } => compactness(tree, slot, weighted),
            Attribute::VolumeLevelling => volume_levelling(tree, slot),
        }
    }
}

/// Parameters for computing one attribute
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeParams {
    pub attribute: Attribute,
    pub slot: AttributeSlot,
}

impl TreeTransform for AttributeParams {
    fn name(&self) -> &'static str {
        "Attribute"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        debug!("Computing {:?} into slot {}", self.attribute, self.slot.index());
        self.attribute.compute(tree, self.slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::max_tree;
    use crate::transform::is_monotone;
    use morphtree_core::{Connectivity, Raster};

    #[test]
    fn test_increasing_attributes_are_monotone() {
        let raster = Raster::from_vec(vec![2u8, 7, 3, 9, 9, 1, 5, 4, 8], &[3, 3]).unwrap();
        let tree = max_tree(&raster, Connectivity::Face).unwrap();
        let slot = AttributeSlot::new(3).unwrap();
        for attribute in [
            Attribute::Size,
            Attribute::PhysicalSize,
            Attribute::IntegratedIntensity,
        ] {
            assert!(attribute.is_increasing());
            let params = AttributeParams { attribute, slot };
            let t = params.transform(&tree).unwrap();
            assert!(is_monotone(&t, slot, true, false), "{:?}", attribute);
        }
        assert!(!Attribute::Gradient.is_increasing());
        assert!(!Attribute::Leaf.is_increasing());
    }
}
