//! # morphtree algorithms
//!
//! Construction, attribute computation, filtering and reconstruction of
//! max-trees and min-trees.
//!
//! ## Modules
//!
//! - **build**: union-find tree construction with face or full connectivity
//! - **transform**: in-place or cloned tree-to-tree contract, monotonicity check
//! - **attribute**: size, intensity, compactness, gradients, volume, math ops
//! - **filtering**: attribute filters (Direct, Subtract, Minimum, Maximum), size opening
//! - **pruning**: granulometry and keep-N-lobes driven by a leaf queue
//! - **reconstruct**: images, attribute maps, leaf images and attribute tables

pub mod attribute;
pub mod build;
pub mod filtering;
pub(crate) mod maybe_rayon;
pub mod pruning;
pub mod reconstruct;
pub mod transform;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attribute::{
        binary, compactness, gradient, integrated_intensity, intensity, intensity_variation,
        leaf_flag, local_gradient, monotone, normalize, peak_intensity, physical_size, recursive,
        size, volume_levelling, Attribute, AttributeParams, BinaryParams, CombineParams, MathOp,
        MathParams, MonotoneParams, NormalizeParams, Propagation,
    };
    pub use crate::build::{build_tree, max_tree, min_tree, TreeBuilder, TreeBuilderParams};
    pub use crate::filtering::{
        attribute_filter, filtered_image, size_opening, AttributeFilterParams, PruningPolicy,
        SizeOpeningParams,
    };
    pub use crate::pruning::{
        granulometry, keep_n_lobes, GranulometryCurve, GranulometryParams, KeepNLobesParams,
    };
    pub use crate::reconstruct::{
        attribute_histogram, attribute_table, attribute_to_image, leaves_to_binary,
        leaves_to_labels, tree_to_image, AttributeHistogram, AttributeRecord, HistogramParams,
        HistogramWeight,
    };
    pub use crate::transform::{is_monotone, TreeSource, TreeTransform};
    pub use morphtree_core::prelude::*;
}
