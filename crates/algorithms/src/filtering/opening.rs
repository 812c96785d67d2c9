//! Size opening

use morphtree_core::{ComponentTree, NodeId, RasterElement, Result};
use tracing::debug;

use super::policy::merge_into_parents;
use crate::transform::TreeTransform;

/// Parameters for size opening
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeOpeningParams {
    /// Components with fewer pixels than this are removed
    pub min_size: usize,
}

impl TreeTransform for SizeOpeningParams {
    fn name(&self) -> &'static str {
        "SizeOpening"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        size_opening(tree, self.min_size);
        Ok(())
    }
}

/// Remove every component smaller than `min_size` pixels, sweeping from the
/// leaves upwards; returns the number of removed nodes.
///
/// Subtree size never decreases towards the root, so a node only goes when
/// its whole subtree does. No attribute slot is touched.
pub fn size_opening<T: RasterElement>(tree: &mut ComponentTree<T>, min_size: usize) -> usize {
    let sizes = tree.subtree_pixel_counts();
    let root = tree.root();
    let doomed: Vec<NodeId> = tree
        .post_order()
        .filter(|&id| id != root && sizes[id] < min_size)
        .collect();
    merge_into_parents(tree, &doomed);
    debug!(
        "Size opening ({} px): removed {} nodes, {} remain",
        min_size,
        doomed.len(),
        tree.len()
    );
    doomed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::max_tree;
    use crate::reconstruct::tree_to_image;
    use morphtree_core::{Connectivity, Raster};

    #[test]
    fn test_removes_only_small_sibling() {
        // a one-pixel peak and a three-pixel plateau under the same parent
        let raster = Raster::from_vec(vec![0u8, 4, 1, 6, 6, 6, 1, 0], &[8]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        assert_eq!(tree.len(), 4);

        let removed = size_opening(&mut tree, 2);
        assert_eq!(removed, 1);
        assert_eq!(tree.len(), 3);
        let image = tree_to_image(&tree).unwrap();
        assert_eq!(image.to_vec(), vec![0, 1, 1, 6, 6, 6, 1, 0]);
    }

    #[test]
    fn test_large_threshold_collapses_to_root() {
        let raster = Raster::from_vec(vec![3u8, 1, 4, 1, 5, 9, 2, 6], &[2, 4]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        size_opening(&mut tree, 100);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.count_indexes(tree.root()).unwrap(), 8);
    }

    #[test]
    fn test_zero_threshold_is_identity() {
        let raster = Raster::from_vec(vec![3u8, 1, 4, 1, 5, 9, 2, 6], &[2, 4]).unwrap();
        let tree = max_tree(&raster, Connectivity::Face).unwrap();
        let opened = SizeOpeningParams { min_size: 0 }.transform(&tree).unwrap();
        assert_eq!(opened.len(), tree.len());
    }
}
