//! Monotone enforcement
//!
//! Makes an attribute monotone along every root-to-leaf path, either by
//! rewriting values or by merging the offending nodes into their parents.

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement, Result};
use tracing::debug;

use crate::transform::TreeTransform;

/// Direction in which values are rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Parents absorb their children's values (raise or lower parents)
    #[default]
    BottomUp,
    /// Children are clamped to their parent's value
    TopDown,
}

/// Parameters for monotone enforcement
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotoneParams {
    /// Attribute to make monotone
    pub slot: AttributeSlot,
    /// `false`: values must not decrease from the leaves to the root
    /// (parent >= child). `true`: the reverse (parent <= child).
    pub reverse_ordering: bool,
    /// Equal parent and child values count as a violation when removing
    pub strict: bool,
    /// Merge violating nodes into their parent instead of rewriting values
    pub remove_nodes: bool,
    /// How values are rewritten when `remove_nodes` is off
    pub propagation: Propagation,
}

impl MonotoneParams {
    /// Whether the edge `parent -> child` breaks the target relation
    fn violates(&self, parent: f64, child: f64) -> bool {
        match (self.reverse_ordering, self.strict) {
            (false, false) => parent < child,
            (false, true) => parent <= child,
            (true, false) => parent > child,
            (true, true) => parent >= child,
        }
    }

    /// The value that restores the relation between two values
    fn dominant(&self, a: f64, b: f64) -> f64 {
        if self.reverse_ordering {
            a.min(b)
        } else {
            a.max(b)
        }
    }
}

impl TreeTransform for MonotoneParams {
    fn name(&self) -> &'static str {
        "Monotone"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        monotone(tree, self);
        Ok(())
    }
}

/// Enforce monotonicity of `params.slot`; returns the number of merged nodes.
///
/// Rewriting yields a non-strict monotone attribute. With `remove_nodes`,
/// a top-down sweep merges every child that violates the relation with its
/// surviving ancestor, re-examining the grandchildren it hands over, so the
/// result satisfies the relation (strict or not) on every edge.
pub fn monotone<T: RasterElement>(tree: &mut ComponentTree<T>, params: &MonotoneParams) -> usize {
    let slot = params.slot;

    if !params.remove_nodes {
        match params.propagation {
            Propagation::BottomUp => {
                let order: Vec<NodeId> = tree.post_order().collect();
                for id in order {
                    let value = tree[id]
                        .children()
                        .iter()
                        .fold(tree[id].attribute(slot), |acc, &c| {
                            params.dominant(acc, tree[c].attribute(slot))
                        });
                    tree[id].set_attribute(slot, value);
                }
            }
            Propagation::TopDown => {
                let order: Vec<NodeId> = tree.pre_order().collect();
                for id in order {
                    if let Some(p) = tree[id].parent() {
                        let bound = tree[p].attribute(slot);
                        let own = tree[id].attribute(slot);
                        let value = if params.reverse_ordering {
                            own.max(bound)
                        } else {
                            own.min(bound)
                        };
                        tree[id].set_attribute(slot, value);
                    }
                }
            }
        }
        return 0;
    }

    let mut removed = 0;
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let keep = tree[id].attribute(slot);
        let mut pending: Vec<NodeId> = tree[id].children().to_vec();
        while let Some(child) = pending.pop() {
            if params.violates(keep, tree[child].attribute(slot)) {
                pending.extend_from_slice(tree[child].children());
                let merged = tree.merge(id, child);
                debug_assert!(merged.is_ok(), "node {} failed to merge into {}", child, id);
                if merged.is_ok() {
                    removed += 1;
                }
            } else {
                stack.push(child);
            }
        }
    }
    debug!("Monotone: merged {} nodes, {} remain", removed, tree.len());
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::max_tree;
    use crate::transform::is_monotone;
    use morphtree_core::{Connectivity, Raster};

    fn slot() -> AttributeSlot {
        AttributeSlot::new(0).unwrap()
    }

    /// Ridge tree with attribute values root 2, mid 1, peaks 3 and 0
    fn tree_with_dip() -> ComponentTree<u8> {
        let raster = Raster::from_vec(vec![1u8, 3, 2, 3, 1], &[5]).unwrap();
        let mut tree = max_tree(&raster, Connectivity::Face).unwrap();
        for (id, v) in [(0, 2.0), (1, 1.0), (2, 3.0), (3, 0.0)] {
            tree[id].set_attribute(slot(), v);
        }
        tree
    }

    #[test]
    fn test_bottom_up_rewrite() {
        let mut tree = tree_with_dip();
        let params = MonotoneParams {
            slot: slot(),
            ..Default::default()
        };
        assert_eq!(monotone(&mut tree, &params), 0);
        assert!(is_monotone(&tree, slot(), true, false));
        assert_eq!(tree[1].attribute(slot()), 3.0);
        assert_eq!(tree[0].attribute(slot()), 3.0);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_top_down_rewrite() {
        let mut tree = tree_with_dip();
        let params = MonotoneParams {
            slot: slot(),
            propagation: Propagation::TopDown,
            ..Default::default()
        };
        monotone(&mut tree, &params);
        assert!(is_monotone(&tree, slot(), true, false));
        assert_eq!(tree[0].attribute(slot()), 2.0);
        assert_eq!(tree[2].attribute(slot()), 1.0);
        assert_eq!(tree[3].attribute(slot()), 0.0);
    }

    #[test]
    fn test_remove_nodes() {
        let mut tree = tree_with_dip();
        let params = MonotoneParams {
            slot: slot(),
            remove_nodes: true,
            ..Default::default()
        };
        // 1 <= 2 keeps node 1; 3 > 1 merges node 2
        assert_eq!(monotone(&mut tree, &params), 1);
        assert!(!tree.contains(2));
        assert!(is_monotone(&tree, slot(), true, false));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_remove_nodes_strict_reverse() {
        let mut tree = tree_with_dip();
        let params = MonotoneParams {
            slot: slot(),
            reverse_ordering: true,
            strict: true,
            remove_nodes: true,
            ..Default::default()
        };
        monotone(&mut tree, &params);
        assert!(is_monotone(&tree, slot(), false, true));
    }
}
