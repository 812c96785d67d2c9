//! Attribute histogram
//!
//! Equal-width bins spanning the finite range of one attribute slot.

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, Error, RasterElement, Result};
use serde::Serialize;

/// What each node contributes to its bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HistogramWeight {
    /// One count per node
    #[default]
    Nodes,
    /// The node's own pixels, so the counts sum to the image size
    Pixels,
}

/// Parameters for [`attribute_histogram`]
#[derive(Debug, Clone, Copy)]
pub struct HistogramParams {
    pub slot: AttributeSlot,
    /// Number of bins (default 16)
    pub bins: usize,
    pub weight: HistogramWeight,
}

impl Default for HistogramParams {
    fn default() -> Self {
        Self {
            slot: AttributeSlot::default(),
            bins: 16,
            weight: HistogramWeight::default(),
        }
    }
}

/// One bin; the last bin is closed on the right
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeHistogram {
    pub weight: HistogramWeight,
    pub bins: Vec<HistogramBin>,
    /// Nodes whose value was NaN or infinite
    pub skipped: usize,
}

impl AttributeHistogram {
    /// Sum of all bin counts
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// `(bin center, count)` pairs
    pub fn centers(&self) -> Vec<(f64, usize)> {
        self.bins
            .iter()
            .map(|b| ((b.lower + b.upper) / 2.0, b.count))
            .collect()
    }
}

/// Histogram of `params.slot` over all live nodes.
///
/// When every finite value is equal, all of them land in the first bin and
/// every bin collapses onto that value.
pub fn attribute_histogram<T: RasterElement>(
    tree: &ComponentTree<T>,
    params: &HistogramParams,
) -> Result<AttributeHistogram> {
    if params.bins == 0 {
        return Err(Error::InvalidParameter {
            name: "bins",
            value: "0".into(),
            reason: "a histogram needs at least one bin".into(),
        });
    }

    let mut values = Vec::with_capacity(tree.len());
    let mut skipped = 0;
    for (_, node) in tree.iter() {
        let v = node.attribute(params.slot);
        if !v.is_finite() {
            skipped += 1;
            continue;
        }
        let w = match params.weight {
            HistogramWeight::Nodes => 1,
            HistogramWeight::Pixels => node.pixel_count(),
        };
        values.push((v, w));
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(v, _)| {
            (lo.min(v), hi.max(v))
        });
    let (min, width) = if values.is_empty() {
        (0.0, 0.0)
    } else {
        (min, (max - min) / params.bins as f64)
    };

    let mut bins: Vec<HistogramBin> = (0..params.bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for (v, w) in values {
        let index = if width > 0.0 {
            (((v - min) / width).floor() as usize).min(params.bins - 1)
        } else {
            0
        };
        bins[index].count += w;
    }

    Ok(AttributeHistogram {
        weight: params.weight,
        bins,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{gradient, size};
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, Raster};

    fn ridge() -> ComponentTree<u8> {
        let raster = Raster::from_vec(vec![1u8, 3, 2, 3, 1], &[5]).unwrap();
        max_tree(&raster, Connectivity::Face).unwrap()
    }

    #[test]
    fn test_node_and_pixel_weights() {
        let mut tree = ridge();
        let slot = AttributeSlot::new(0).unwrap();
        size(&mut tree, slot);

        // sizes 1, 1 | 3, 5 over [1, 5]
        let mut params = HistogramParams {
            slot,
            bins: 2,
            weight: HistogramWeight::Nodes,
        };
        let hist = attribute_histogram(&tree, &params).unwrap();
        assert_eq!(hist.bins.len(), 2);
        assert_eq!(hist.bins[0].lower, 1.0);
        assert_eq!(hist.bins[1].upper, 5.0);
        assert_eq!(hist.bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 2]);
        assert_eq!(hist.centers()[0], (2.0, 2));

        params.weight = HistogramWeight::Pixels;
        let hist = attribute_histogram(&tree, &params).unwrap();
        assert_eq!(hist.bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(hist.total(), 5);
    }

    #[test]
    fn test_constant_and_non_finite_values() {
        let mut tree = ridge();
        let slot = AttributeSlot::new(0).unwrap();
        gradient(&mut tree, slot);
        let root = tree.root();
        tree[root].set_attribute(slot, f64::NAN);

        let hist = attribute_histogram(
            &tree,
            &HistogramParams {
                slot,
                bins: 4,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(hist.skipped, 1);
        assert_eq!(hist.bins[0].count, 3);
        assert_eq!(hist.total(), 3);
        assert!(hist.bins.iter().all(|b| b.lower == 1.0 && b.upper == 1.0));
    }

    #[test]
    fn test_zero_bins_rejected() {
        let tree = ridge();
        let params = HistogramParams {
            bins: 0,
            ..Default::default()
        };
        assert!(matches!(
            attribute_histogram(&tree, &params),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
