//! Arena-backed component tree

use std::ops::{Index, IndexMut};

use super::iter::{PostOrderIter, PreOrderIter};
use super::pixel_links::{PixelIter, PixelLinks};
use super::{Node, NodeId, TreeOrdering};
use crate::error::{Error, Result};
use crate::raster::{RasterElement, Spacing};

/// A max-tree or min-tree over an n-dimensional image.
///
/// Nodes live in an arena addressed by [`NodeId`]. Merging a node frees its
/// slot; ids of the remaining nodes never change, so a tree and its clone
/// can be walked in lockstep by id. Accessors taking an id return
/// [`Error::InvalidIndex`] for ids that are out of range or were merged away.
///
/// The own pixel lists of all live nodes partition the image: every linear
/// pixel index belongs to exactly one node.
#[derive(Debug, Clone)]
pub struct ComponentTree<T: RasterElement> {
    nodes: Vec<Option<Node<T>>>,
    links: PixelLinks,
    root: NodeId,
    live: usize,
    ordering: TreeOrdering,
    shape: Vec<usize>,
    spacing: Spacing,
}

impl<T: RasterElement> ComponentTree<T> {
    /// Assemble a tree from per-node values and parents plus the owning node
    /// of every pixel.
    ///
    /// `owners[p]` is the node whose own list receives pixel `p`; lists are
    /// filled in ascending pixel order. The result is checked for a single
    /// root, acyclic links and the ordering between parents and children.
    pub fn from_parts(
        shape: &[usize],
        spacing: Spacing,
        ordering: TreeOrdering,
        values: Vec<T>,
        parents: Vec<Option<NodeId>>,
        owners: &[NodeId],
    ) -> Result<Self> {
        let pixel_count = if shape.is_empty() {
            0
        } else {
            shape.iter().product()
        };
        if pixel_count == 0 {
            return Err(Error::EmptyInput);
        }
        if spacing.ndim() != shape.len() {
            return Err(Error::InvalidParameter {
                name: "spacing",
                value: format!("{:?}", spacing.as_slice()),
                reason: format!("expected {} axes", shape.len()),
            });
        }
        if owners.len() != pixel_count {
            return Err(Error::SizeMismatch {
                expected: pixel_count,
                actual: owners.len(),
            });
        }
        if values.len() != parents.len() {
            return Err(Error::InvalidTree(format!(
                "{} node values for {} parent links",
                values.len(),
                parents.len()
            )));
        }

        let n = values.len();
        let mut nodes: Vec<Option<Node<T>>> = values.into_iter().map(|v| Some(Node::new(v))).collect();

        let mut root = None;
        for (id, parent) in parents.iter().enumerate() {
            match *parent {
                None if root.is_some() => {
                    return Err(Error::InvalidTree("more than one root".into()));
                }
                None => root = Some(id),
                Some(p) if p >= n || p == id => {
                    return Err(Error::InvalidTree(format!("node {} has invalid parent {}", id, p)));
                }
                Some(p) => {
                    if let Some(node) = nodes[id].as_mut() {
                        node.parent = Some(p);
                    }
                    if let Some(parent_node) = nodes[p].as_mut() {
                        parent_node.children.push(id);
                    }
                }
            }
        }
        let root = root.ok_or_else(|| Error::InvalidTree("no root".into()))?;

        let mut tree = Self {
            nodes,
            links: PixelLinks::new(pixel_count),
            root,
            live: n,
            ordering,
            shape: shape.to_vec(),
            spacing,
        };

        for (pixel, &owner) in owners.iter().enumerate() {
            if owner >= n {
                return Err(Error::InvalidTree(format!(
                    "pixel {} assigned to missing node {}",
                    pixel, owner
                )));
            }
            tree.append_pixel(owner, pixel);
        }

        // Every node hangs below the root exactly when there is no cycle
        let reached = tree.pre_order().count();
        if reached != n {
            return Err(Error::InvalidTree(format!(
                "{} of {} nodes are not reachable from the root",
                n - reached,
                n
            )));
        }
        tree.check_ordering()?;

        Ok(tree)
    }

    // Metadata

    /// Max-tree or min-tree
    pub fn ordering(&self) -> TreeOrdering {
        self.ordering
    }

    /// Shape of the image the tree was built from
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Pixel spacing of the image the tree was built from
    pub fn spacing(&self) -> &Spacing {
        &self.spacing
    }

    /// Number of image pixels
    pub fn pixel_count(&self) -> usize {
        self.links.len()
    }

    /// Shared per-pixel link storage
    pub fn links(&self) -> &PixelLinks {
        &self.links
    }

    // Nodes

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// A tree always holds its root, so this is `false` for any built tree
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Arena length, including slots freed by merges
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `id` names a live node
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id), Some(Some(_)))
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(Error::InvalidIndex {
                index: id,
                len: self.nodes.len(),
            })
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<T>> {
        let len = self.nodes.len();
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidIndex { index: id, len })
    }

    /// Mutable access to a node's value and attributes
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<T>> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidIndex { index: id, len })
    }

    /// Live node ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    /// Live nodes in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|node| (id, node)))
    }

    /// Ids of nodes without children, ascending
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id)
    }

    /// Parents before children, starting at the root
    pub fn pre_order(&self) -> PreOrderIter<'_, T> {
        PreOrderIter::new(self, Some(self.root))
    }

    /// Pre-order walk of the subtree rooted at `id`
    pub fn pre_order_from(&self, id: NodeId) -> Result<PreOrderIter<'_, T>> {
        self.check(id)?;
        Ok(PreOrderIter::new(self, Some(id)))
    }

    /// Children before parents, ending at the root
    pub fn post_order(&self) -> PostOrderIter<'_, T> {
        PostOrderIter::new(self, Some(self.root))
    }

    /// Post-order walk of the subtree rooted at `id`
    pub fn post_order_from(&self, id: NodeId) -> Result<PostOrderIter<'_, T>> {
        self.check(id)?;
        Ok(PostOrderIter::new(self, Some(id)))
    }

    /// Whether `ancestor` lies on the path from `id` to the root (inclusive)
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes.get(c).and_then(Option::as_ref).and_then(|n| n.parent);
        }
        false
    }

    // Pixels

    /// Own pixels of a node
    pub fn indexes(&self, id: NodeId) -> Result<PixelIter<'_>> {
        let node = self.node(id)?;
        Ok(self.links.iter(node.first_pixel))
    }

    /// Number of pixels in the subtree of `id` (own plus all descendants')
    pub fn count_indexes(&self, id: NodeId) -> Result<usize> {
        Ok(self
            .post_order_from(id)?
            .map(|n| self[n].pixel_count)
            .sum())
    }

    /// Subtree pixel count of every arena slot (zero for freed slots)
    pub fn subtree_pixel_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for id in self.post_order() {
            let node = &self[id];
            counts[id] = node.pixel_count + node.children.iter().map(|&c| counts[c]).sum::<usize>();
        }
        counts
    }

    /// Attach a pixel that currently belongs to no node
    pub fn add_index(&mut self, id: NodeId, pixel: usize) -> Result<()> {
        self.check(id)?;
        if pixel >= self.pixel_count() {
            return Err(Error::IndexOutOfBounds {
                index: vec![pixel],
                shape: vec![self.pixel_count()],
            });
        }
        if self.links.is_linked(pixel) {
            return Err(Error::InvalidParameter {
                name: "pixel",
                value: pixel.to_string(),
                reason: "already belongs to a node".into(),
            });
        }
        self.append_pixel(id, pixel);
        Ok(())
    }

    /// Detach one of the node's own pixels; O(k) in the node's pixel count
    pub fn remove_index(&mut self, id: NodeId, pixel: usize) -> Result<()> {
        let mut prev = None;
        let mut found = false;
        for p in self.indexes(id)? {
            if p == pixel {
                found = true;
                break;
            }
            prev = Some(p);
        }
        if !found {
            return Err(Error::InvalidParameter {
                name: "pixel",
                value: pixel.to_string(),
                reason: format!("not an own pixel of node {}", id),
            });
        }

        let next = self.links.next(pixel);
        match (prev, next) {
            (Some(before), Some(after)) => self.links.join(before, after),
            (Some(before), None) => self.links.set_end(before),
            _ => {}
        }
        self.links.unlink(pixel);

        let node = &mut self[id];
        if prev.is_none() {
            node.first_pixel = next;
        }
        if next.is_none() {
            node.last_pixel = prev;
        }
        node.pixel_count -= 1;
        Ok(())
    }

    /// Whether `pixel` is one of the node's own pixels
    pub fn has_index(&self, id: NodeId, pixel: usize) -> Result<bool> {
        Ok(self.indexes(id)?.any(|p| p == pixel))
    }

    fn append_pixel(&mut self, id: NodeId, pixel: usize) {
        self.links.set_end(pixel);
        if let Some(node) = self.nodes[id].as_mut() {
            match node.last_pixel {
                Some(tail) => self.links.join(tail, pixel),
                None => node.first_pixel = Some(pixel),
            }
            node.last_pixel = Some(pixel);
            node.pixel_count += 1;
        }
    }

    /// Owning node of every pixel; `None` for pixels detached by `remove_index`
    pub fn pixel_owner_map(&self) -> Vec<Option<NodeId>> {
        let mut owners = vec![None; self.pixel_count()];
        for (id, node) in self.iter() {
            for p in self.links.iter(node.first_pixel) {
                owners[p] = Some(id);
            }
        }
        owners
    }

    // Structure

    /// Fold `obsolete` into `keep`.
    ///
    /// `obsolete`'s own pixels are spliced onto `keep`'s list in O(1), its
    /// children are reparented onto `keep` and its slot is freed. `keep`'s
    /// value is unchanged. Fails without touching the tree if either id is
    /// invalid, the two are equal, `obsolete` is the root or an ancestor of
    /// `keep`.
    pub fn merge(&mut self, keep: NodeId, obsolete: NodeId) -> Result<()> {
        self.check(keep)?;
        self.check(obsolete)?;
        if keep == obsolete {
            return Err(Error::InvalidTree(format!("cannot merge node {} into itself", keep)));
        }
        if obsolete == self.root {
            return Err(Error::InvalidTree("the root cannot be merged away".into()));
        }
        if self[obsolete].parent != Some(keep) && self.is_ancestor(obsolete, keep) {
            return Err(Error::InvalidTree(format!(
                "node {} is an ancestor of node {}",
                obsolete, keep
            )));
        }
        self.merge_unchecked(keep, obsolete);
        Ok(())
    }

    /// Merge without validation; callers guarantee both ids are live and
    /// `obsolete` is neither the root nor an ancestor of `keep`.
    pub(crate) fn merge_unchecked(&mut self, keep: NodeId, obsolete: NodeId) {
        let Some(old) = self.nodes[obsolete].take() else {
            return;
        };
        self.live -= 1;

        if let Some(p) = old.parent {
            if let Some(parent) = self.nodes[p].as_mut() {
                if let Some(pos) = parent.children.iter().position(|&c| c == obsolete) {
                    parent.children.remove(pos);
                }
            }
        }
        for &c in &old.children {
            if let Some(child) = self.nodes[c].as_mut() {
                child.parent = Some(keep);
            }
        }

        if let Some(target) = self.nodes[keep].as_mut() {
            target.children.extend_from_slice(&old.children);
            if let (Some(first), Some(last)) = (old.first_pixel, old.last_pixel) {
                match target.last_pixel {
                    Some(tail) => self.links.join(tail, first),
                    None => target.first_pixel = Some(first),
                }
                target.last_pixel = Some(last);
                target.pixel_count += old.pixel_count;
            }
        }
    }

    /// Merge every descendant of `id` into it, leaving `id` a leaf that owns
    /// the whole subtree's pixels
    pub fn flatten(&mut self, id: NodeId) -> Result<()> {
        let descendants: Vec<NodeId> = self.post_order_from(id)?.filter(|&d| d != id).collect();
        for d in descendants {
            self.merge_unchecked(id, d);
        }
        Ok(())
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut deepest = 0;
        for id in self.pre_order() {
            let d = depths[id];
            deepest = deepest.max(d);
            for &c in &self[id].children {
                depths[c] = d + 1;
            }
        }
        deepest
    }

    /// Check that `other` has the same live ids, root and parent links
    pub fn check_same_topology<U: RasterElement>(&self, other: &ComponentTree<U>) -> Result<()> {
        if self.nodes.len() != other.nodes.len() {
            return Err(Error::TopologyMismatch(format!(
                "arena sizes differ: {} vs {}",
                self.nodes.len(),
                other.nodes.len()
            )));
        }
        if self.root != other.root {
            return Err(Error::TopologyMismatch(format!(
                "roots differ: {} vs {}",
                self.root, other.root
            )));
        }
        for (id, (a, b)) in self.nodes.iter().zip(&other.nodes).enumerate() {
            match (a, b) {
                (None, None) => {}
                (Some(a), Some(b)) if a.parent == b.parent => {}
                (Some(_), Some(_)) => {
                    return Err(Error::TopologyMismatch(format!("node {} has different parents", id)));
                }
                _ => {
                    return Err(Error::TopologyMismatch(format!(
                        "node {} exists in only one tree",
                        id
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_ordering(&self) -> Result<()> {
        for (id, node) in self.iter() {
            if let Some(p) = node.parent {
                let parent_value = self[p].value;
                if !self.ordering.is_more_extreme(node.value, parent_value) {
                    return Err(Error::InvalidTree(format!(
                        "node {} ({:?}) is not beyond its parent {} ({:?})",
                        id, node.value, p, parent_value
                    )));
                }
            }
        }
        Ok(())
    }

    /// Check every structural invariant.
    ///
    /// Single root, consistent parent/child links, no cycles, strictly
    /// ordered values along every edge and own pixel lists that partition
    /// the image.
    pub fn validate(&self) -> Result<()> {
        let root = self.node(self.root).map_err(|_| Error::InvalidTree("root is not live".into()))?;
        if root.parent.is_some() {
            return Err(Error::InvalidTree("root has a parent".into()));
        }

        let mut live = 0;
        for (id, node) in self.iter() {
            live += 1;
            match node.parent {
                None if id != self.root => {
                    return Err(Error::InvalidTree(format!("node {} has no parent", id)));
                }
                Some(p) => match self.nodes.get(p).and_then(Option::as_ref) {
                    Some(parent) if parent.children.contains(&id) => {}
                    Some(_) => {
                        return Err(Error::InvalidTree(format!(
                            "parent {} does not list child {}",
                            p, id
                        )))
                    }
                    None => {
                        return Err(Error::InvalidTree(format!("node {} has a dead parent {}", id, p)))
                    }
                },
                None => {}
            }
            for &c in &node.children {
                match self.nodes.get(c).and_then(Option::as_ref) {
                    Some(child) if child.parent == Some(id) => {}
                    _ => {
                        return Err(Error::InvalidTree(format!(
                            "child {} of node {} does not point back",
                            c, id
                        )))
                    }
                }
            }
        }
        if live != self.live {
            return Err(Error::InvalidTree(format!(
                "{} live nodes but {} recorded",
                live, self.live
            )));
        }

        if self.pre_order().take(live + 1).count() != live {
            return Err(Error::InvalidTree("nodes unreachable from the root".into()));
        }
        self.check_ordering()?;

        let n = self.pixel_count();
        let mut seen = vec![false; n];
        let mut total = 0;
        for (id, node) in self.iter() {
            let mut count = 0;
            let mut last = None;
            for p in self.links.iter(node.first_pixel).take(n + 1) {
                if seen[p] {
                    return Err(Error::InvalidTree(format!("pixel {} owned twice", p)));
                }
                seen[p] = true;
                count += 1;
                last = Some(p);
            }
            if count != node.pixel_count || last != node.last_pixel {
                return Err(Error::InvalidTree(format!(
                    "pixel list of node {} is inconsistent",
                    id
                )));
            }
            total += count;
        }
        if total != n {
            return Err(Error::InvalidTree(format!(
                "{} of {} pixels are not owned by any node",
                n - total,
                n
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl<T: RasterElement> Index<NodeId> for ComponentTree<T> {
    type Output = Node<T>;

    /// Panics if `id` is not a live node; use [`ComponentTree::node`] to check.
    fn index(&self, id: NodeId) -> &Node<T> {
        match self.nodes.get(id) {
            Some(Some(node)) => node,
            _ => panic!("node {} is not live", id),
        }
    }
}

impl<T: RasterElement> IndexMut<NodeId> for ComponentTree<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.nodes.get_mut(id) {
            Some(Some(node)) => node,
            _ => panic!("node {} is not live", id),
        }
    }
}
