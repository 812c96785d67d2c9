//! Tree to image reconstruction
//!
//! Every image output keeps the tree's shape and spacing. The attribute
//! table and histogram export node values directly.

mod histogram;
mod image;
mod table;

pub use histogram::{
    attribute_histogram, AttributeHistogram, HistogramBin, HistogramParams, HistogramWeight,
};
pub use image::{attribute_to_image, leaves_to_binary, leaves_to_labels, tree_to_image};
pub use table::{attribute_table, AttributeRecord};

use morphtree_core::{ComponentTree, Raster, RasterElement, Result};

/// Wrap per-pixel data in a raster shaped like `tree`'s image
pub(crate) fn raster_from<T: RasterElement, U: RasterElement>(
    tree: &ComponentTree<T>,
    data: Vec<U>,
) -> Result<Raster<U>> {
    let mut raster = Raster::from_vec(data, tree.shape())?;
    raster.set_spacing(tree.spacing().clone())?;
    Ok(raster)
}
