//! Raw attribute export

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement};
use serde::Serialize;

use crate::attribute::walk::level;

/// One node's row in an attribute table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRecord {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Grey level of the node
    pub value: f64,
    /// Pixels owned by the node itself
    pub pixel_count: usize,
    /// Pixels in the node's subtree
    pub subtree_pixel_count: usize,
    /// Requested slots, in request order
    pub attributes: Vec<f64>,
}

/// One record per live node, parents before children
pub fn attribute_table<T: RasterElement>(
    tree: &ComponentTree<T>,
    slots: &[AttributeSlot],
) -> Vec<AttributeRecord> {
    let subtree = tree.subtree_pixel_counts();
    tree.pre_order()
        .map(|id| {
            let node = &tree[id];
            AttributeRecord {
                id,
                parent: node.parent(),
                value: level(node.value()),
                pixel_count: node.pixel_count(),
                subtree_pixel_count: subtree[id],
                attributes: slots.iter().map(|&s| node.attribute(s)).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{gradient, size};
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, Raster};

    #[test]
    fn test_table_rows() {
        let raster = Raster::from_vec(vec![1u8, 3, 2, 3, 1], &[5]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        let (a, b) = (AttributeSlot::new(0).unwrap(), AttributeSlot::new(1).unwrap());
        size(&mut tree, a);
        gradient(&mut tree, b);

        let table = attribute_table(&tree, &[b, a]);
        assert_eq!(table.len(), 4);
        let root = &table[0];
        assert_eq!(root.parent, None);
        assert_eq!(root.subtree_pixel_count, 5);
        assert_eq!(root.pixel_count, 2);
        assert_eq!(root.attributes, vec![0.0, 5.0]);

        let mid = table.iter().find(|r| r.value == 2.0).unwrap();
        assert_eq!(mid.attributes, vec![1.0, 3.0]);
        assert_eq!(
            table.iter().filter(|r| r.parent == Some(mid.id)).count(),
            2
        );
    }
}
