//! Non-recursive traversals of a component tree
//!
//! Trees built from smooth images can be as deep as they have grey levels,
//! so none of the walks use the call stack.

use super::{ComponentTree, NodeId};
use crate::raster::RasterElement;

/// Iterator for pre-order traversal (parents before children).
///
/// Yields node ids. Each node is visited before any of its descendants.
pub struct PreOrderIter<'a, T: RasterElement> {
    tree: &'a ComponentTree<T>,
    stack: Vec<NodeId>,
}

impl<'a, T: RasterElement> PreOrderIter<'a, T> {
    pub(crate) fn new(tree: &'a ComponentTree<T>, start: Option<NodeId>) -> Self {
        PreOrderIter {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<T: RasterElement> Iterator for PreOrderIter<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Reverse so the first child is visited first
        self.stack
            .extend(self.tree[id].children().iter().rev().copied());
        Some(id)
    }
}

/// Iterator for post-order traversal (children before parents).
pub struct PostOrderIter<'a, T: RasterElement> {
    tree: &'a ComponentTree<T>,
    stack: Vec<(NodeId, bool)>, // (id, children_visited)
}

impl<'a, T: RasterElement> PostOrderIter<'a, T> {
    pub(crate) fn new(tree: &'a ComponentTree<T>, start: Option<NodeId>) -> Self {
        PostOrderIter {
            tree,
            stack: start.map(|id| (id, false)).into_iter().collect(),
        }
    }
}

impl<T: RasterElement> Iterator for PostOrderIter<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some((id, children_visited)) = self.stack.pop() {
            let node = &self.tree[id];
            if children_visited || node.is_leaf() {
                return Some(id);
            }
            self.stack.push((id, true));
            self.stack
                .extend(node.children().iter().rev().map(|&c| (c, false)));
        }
        None
    }
}
