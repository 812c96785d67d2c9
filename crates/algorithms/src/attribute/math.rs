//! Arithmetic on attribute slots
//!
//! Unary operations fold a node's own value with its children's results,
//! bottom-up. Binary operations combine co-located nodes of two trees of
//! identical topology (typically a tree and its clone carrying a different
//! attribute), writing into the first tree.

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, NodeId, RasterElement, Result};

use tracing::debug;

use super::walk::accumulate;
use crate::maybe_rayon::*;
use crate::transform::TreeTransform;

/// Combining function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathOp {
    #[default]
    Add,
    Subtract,
    Multiply,
    /// IEEE division: a zero divisor yields an infinity or NaN
    Divide,
    Max,
    Min,
}

impl MathOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            MathOp::Add => a + b,
            MathOp::Subtract => a - b,
            MathOp::Multiply => a * b,
            MathOp::Divide => a / b,
            MathOp::Max => a.max(b),
            MathOp::Min => a.min(b),
        }
    }
}

/// Replace each node's value by `own op child_1 op child_2 ...`, where the
/// children's values are their own recursive results.
///
/// `Add` gives subtree sums, `Max`/`Min` subtree extrema.
pub fn recursive<T: RasterElement>(tree: &mut ComponentTree<T>, slot: AttributeSlot, op: MathOp) {
    accumulate(tree, slot, |t, id| t[id].attribute(slot), |acc, c| op.apply(acc, c));
}

/// `tree[id].slot = tree[id].slot op other[id].slot` for every node.
///
/// Fails with `TopologyMismatch`, leaving `tree` untouched, unless both
/// trees have the same live ids and parent links.
pub fn binary<T, U>(
    tree: &mut ComponentTree<T>,
    other: &ComponentTree<U>,
    slot: AttributeSlot,
    op: MathOp,
) -> Result<()>
where
    T: RasterElement,
    U: RasterElement,
{
    tree.check_same_topology(other)?;

    let lhs: &ComponentTree<T> = tree;
    let values: Vec<Option<f64>> = (0..lhs.slot_count())
        .into_par_iter()
        .map(|id| match (lhs.node(id), other.node(id)) {
            (Ok(a), Ok(b)) => Some(op.apply(a.attribute(slot), b.attribute(slot))),
            _ => None,
        })
        .collect();

    for (id, value) in values.into_iter().enumerate() {
        if let Some(v) = value {
            tree[id].set_attribute(slot, v);
        }
    }
    Ok(())
}

/// `out = a op b` on every node of one tree
pub fn combine_slots<T: RasterElement>(
    tree: &mut ComponentTree<T>,
    a: AttributeSlot,
    b: AttributeSlot,
    out: AttributeSlot,
    op: MathOp,
) {
    let ids: Vec<NodeId> = tree.ids().collect();
    for id in ids {
        let node = &mut tree[id];
        let v = op.apply(node.attribute(a), node.attribute(b));
        node.set_attribute(out, v);
    }
}

/// Parameters for [`recursive`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MathParams {
    pub slot: AttributeSlot,
    pub op: MathOp,
}

impl TreeTransform for MathParams {
    fn name(&self) -> &'static str {
        "RecursiveMath"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        debug!("Recursive {:?} on slot {}", self.op, self.slot.index());
        recursive(tree, self.slot, self.op);
        Ok(())
    }
}

/// Parameters for [`binary`]: the right-hand tree is borrowed, the left-hand
/// tree is the one being transformed
#[derive(Debug, Clone, Copy)]
pub struct BinaryParams<'o, U: RasterElement> {
    pub other: &'o ComponentTree<U>,
    pub slot: AttributeSlot,
    pub op: MathOp,
}

impl<U: RasterElement> TreeTransform for BinaryParams<'_, U> {
    fn name(&self) -> &'static str {
        "BinaryMath"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        debug!("Binary {:?} on slot {}", self.op, self.slot.index());
        binary(tree, self.other, self.slot, self.op)
    }
}

/// Parameters for [`combine_slots`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineParams {
    pub a: AttributeSlot,
    pub b: AttributeSlot,
    pub out: AttributeSlot,
    pub op: MathOp,
}

impl TreeTransform for CombineParams {
    fn name(&self) -> &'static str {
        "CombineSlots"
    }

    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
        combine_slots(tree, self.a, self.b, self.out, self.op);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{gradient, size};
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, Error, Raster};

    fn ridge() -> ComponentTree<u8> {
        let raster = Raster::from_vec(vec![1u8, 3, 2, 3, 1], &[5]).unwrap();
        max_tree(&raster, Connectivity::Face).unwrap()
    }

    fn slot(i: usize) -> AttributeSlot {
        AttributeSlot::new(i).unwrap()
    }

    #[test]
    fn test_recursive_sum_of_gradient() {
        let mut tree = ridge();
        gradient(&mut tree, slot(0));
        recursive(&mut tree, slot(0), MathOp::Add);
        // root 0 + (1 + 1 + 1)
        assert_eq!(tree[tree.root()].attribute(slot(0)), 3.0);
        assert_eq!(tree[1].attribute(slot(0)), 3.0);
    }

    #[test]
    fn test_recursive_max_and_subtract() {
        let mut tree = ridge();
        size(&mut tree, slot(0));
        let mut maxed = tree.clone();
        recursive(&mut maxed, slot(0), MathOp::Max);
        assert_eq!(maxed[tree.root()].attribute(slot(0)), 5.0);

        recursive(&mut tree, slot(0), MathOp::Subtract);
        // node 1: 3 - 1 - 1; root: 5 - 1
        assert_eq!(tree[1].attribute(slot(0)), 1.0);
        assert_eq!(tree[tree.root()].attribute(slot(0)), 4.0);
    }

    #[test]
    fn test_binary_divide() {
        let mut a = ridge();
        size(&mut a, slot(0));
        let mut b = a.clone();
        gradient(&mut b, slot(0));
        binary(&mut a, &b, slot(0), MathOp::Divide).unwrap();
        assert_eq!(a[1].attribute(slot(0)), 3.0);
        assert!(a[a.root()].attribute(slot(0)).is_infinite());
    }

    #[test]
    fn test_binary_topology_mismatch() {
        let mut a = ridge();
        size(&mut a, slot(0));
        let mut b = a.clone();
        b.merge(1, 2).unwrap();
        let err = binary(&mut a, &b, slot(0), MathOp::Add).unwrap_err();
        assert!(matches!(err, Error::TopologyMismatch(_)));
        assert_eq!(a[1].attribute(slot(0)), 3.0, "failed op must not write");
    }

    #[test]
    fn test_combine_slots() {
        let mut tree = ridge();
        size(&mut tree, slot(0));
        gradient(&mut tree, slot(1));
        combine_slots(&mut tree, slot(0), slot(1), slot(2), MathOp::Multiply);
        assert_eq!(tree[1].attribute(slot(2)), 3.0);
        assert_eq!(tree[tree.root()].attribute(slot(2)), 0.0);
    }

    #[test]
    fn test_binary_params_on_clone() {
        let mut a = ridge();
        size(&mut a, slot(0));
        let mut b = a.clone();
        gradient(&mut b, slot(0));

        let params = BinaryParams {
            other: &b,
            slot: slot(0),
            op: MathOp::Subtract,
        };
        let out = params.transform(&a).unwrap();
        // node 1: size 3, gradient 1
        assert_eq!(out[1].attribute(slot(0)), 2.0);
        assert_eq!(a[1].attribute(slot(0)), 3.0, "borrowed tree must not change");

        let moved = params.transform(a).unwrap();
        assert_eq!(moved[1].attribute(slot(0)), 2.0);
    }

    #[test]
    fn test_binary_params_mismatch_keeps_tree() {
        let mut a = ridge();
        size(&mut a, slot(0));
        let mut b = a.clone();
        b.merge(1, 2).unwrap();
        let params = BinaryParams {
            other: &b,
            slot: slot(0),
            op: MathOp::Add,
        };
        assert!(matches!(params.transform(&a), Err(Error::TopologyMismatch(_))));
        assert_eq!(a[1].attribute(slot(0)), 3.0);
    }

    #[test]
    fn test_math_and_combine_params_on_clone() {
        let mut tree = ridge();
        gradient(&mut tree, slot(0));
        size(&mut tree, slot(1));

        let summed = MathParams {
            slot: slot(0),
            op: MathOp::Add,
        }
        .transform(&tree)
        .unwrap();
        assert_eq!(summed[tree.root()].attribute(slot(0)), 3.0);
        assert_eq!(tree[tree.root()].attribute(slot(0)), 0.0);

        let combined = CombineParams {
            a: slot(1),
            b: slot(0),
            out: slot(2),
            op: MathOp::Max,
        }
        .transform(&tree)
        .unwrap();
        assert_eq!(combined[1].attribute(slot(2)), 3.0);
        assert_eq!(tree[1].attribute(slot(2)), 0.0);
    }
}
