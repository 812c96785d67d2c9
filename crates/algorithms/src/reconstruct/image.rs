//! Image outputs

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, Error, Raster, RasterElement, Result};
use num_traits::NumCast;

use super::raster_from;
use crate::maybe_rayon::*;

/// Full reconstruction: every pixel takes the level of the node owning it
pub fn tree_to_image<T: RasterElement>(tree: &ComponentTree<T>) -> Result<Raster<T>> {
    let mut data = vec![T::zero(); tree.pixel_count()];
    for id in tree.pre_order() {
        let value = tree[id].value();
        for pixel in tree.indexes(id)? {
            data[pixel] = value;
        }
    }
    raster_from(tree, data)
}

/// Attribute map: every pixel takes the attribute of the node owning it,
/// cast with saturation to `U`.
///
/// With `rescale = Some((lo, hi))` the attribute range over the tree is
/// first mapped linearly onto `lo..=hi`; a constant attribute maps to `lo`.
pub fn attribute_to_image<T: RasterElement, U: RasterElement>(
    tree: &ComponentTree<T>,
    slot: AttributeSlot,
    rescale: Option<(f64, f64)>,
) -> Result<Raster<U>> {
    let mut values = vec![0.0f64; tree.slot_count()];
    for (id, node) in tree.iter() {
        values[id] = node.attribute(slot);
    }

    if let Some((lo, hi)) = rescale {
        let (min, max) = tree
            .iter()
            .map(|(_, n)| n.attribute(slot))
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), v| (a.min(v), b.max(v)));
        let span = max - min;
        for (id, _) in tree.iter() {
            values[id] = if span > 0.0 {
                lo + (values[id] - min) / span * (hi - lo)
            } else {
                lo
            };
        }
    }

    let owners = tree.pixel_owner_map();
    let data: Vec<U> = owners
        .into_par_iter()
        .map(|owner| owner.map_or(U::zero(), |id| U::saturating_from_f64(values[id])))
        .collect();
    raster_from(tree, data)
}

/// Binary leaves image: pixels owned by leaves get `foreground`, the rest
/// `background`
pub fn leaves_to_binary<T: RasterElement, U: RasterElement>(
    tree: &ComponentTree<T>,
    foreground: U,
    background: U,
) -> Result<Raster<U>> {
    let mut data = vec![background; tree.pixel_count()];
    for leaf in tree.leaves() {
        for pixel in tree.indexes(leaf)? {
            data[pixel] = foreground;
        }
    }
    raster_from(tree, data)
}

/// Label image: each leaf gets its own label, counting from 1 in pre-order
/// and skipping `background`; non-leaf pixels get `background`.
///
/// Fails when the leaves outnumber the labels `U` can hold.
pub fn leaves_to_labels<T: RasterElement, U: RasterElement>(
    tree: &ComponentTree<T>,
    background: U,
) -> Result<Raster<U>> {
    let mut data = vec![background; tree.pixel_count()];
    let mut next: u64 = 1;
    for id in tree.pre_order().filter(|&id| tree[id].is_leaf()) {
        let mut label = to_label::<U>(next)?;
        if label == background {
            next += 1;
            label = to_label::<U>(next)?;
        }
        next += 1;
        for pixel in tree.indexes(id)? {
            data[pixel] = label;
        }
    }
    raster_from(tree, data)
}

fn to_label<U: RasterElement>(n: u64) -> Result<U> {
    <U as NumCast>::from(n).ok_or_else(|| {
        Error::Algorithm(format!("label {} does not fit the output pixel type", n))
    })
}
