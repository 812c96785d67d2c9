//! Component tree nodes and attribute slots

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::raster::RasterElement;

/// Arena index of a node
pub type NodeId = usize;

/// Number of independent attribute values each node carries
pub const ATTRIBUTE_SLOTS: usize = 8;

/// Which way the tree is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeOrdering {
    /// Children are brighter than their parent (upper level sets)
    #[default]
    Max,
    /// Children are darker than their parent (lower level sets)
    Min,
}

impl TreeOrdering {
    /// Compare two values so that `Greater` means "closer to the leaves"
    pub fn compare<T: PartialOrd>(&self, a: T, b: T) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            TreeOrdering::Max => ord,
            TreeOrdering::Min => ord.reverse(),
        }
    }

    /// Whether `a` lies strictly on the leaf side of `b`
    pub fn is_more_extreme<T: PartialOrd>(&self, a: T, b: T) -> bool {
        self.compare(a, b) == Ordering::Greater
    }

    /// The tree ordering of the dual filter
    pub fn dual(&self) -> Self {
        match self {
            TreeOrdering::Max => TreeOrdering::Min,
            TreeOrdering::Min => TreeOrdering::Max,
        }
    }
}

/// Selects one of the [`ATTRIBUTE_SLOTS`] values stored on every node.
///
/// Algorithms read and write through a slot so that several attributes
/// (size, gradient, compactness...) can live side by side on one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttributeSlot(usize);

impl AttributeSlot {
    /// Slot `index`, rejected when outside `0..ATTRIBUTE_SLOTS`
    pub fn new(index: usize) -> Result<Self> {
        if index >= ATTRIBUTE_SLOTS {
            return Err(Error::InvalidParameter {
                name: "slot",
                value: index.to_string(),
                reason: format!("nodes carry {} attribute slots", ATTRIBUTE_SLOTS),
            });
        }
        Ok(Self(index))
    }

    pub fn index(&self) -> usize {
        self.0
    }

    /// Read this slot from a node
    pub fn get<T>(&self, node: &Node<T>) -> f64 {
        node.attributes[self.0]
    }

    /// Write this slot on a node
    pub fn set<T>(&self, node: &mut Node<T>, value: f64) {
        node.attributes[self.0] = value;
    }
}

/// One connected component at one intensity level.
///
/// Structural fields are only changed through [`ComponentTree`](super::ComponentTree)
/// so that parent and child links stay consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) first_pixel: Option<usize>,
    pub(crate) last_pixel: Option<usize>,
    pub(crate) pixel_count: usize,
    pub(crate) attributes: [f64; ATTRIBUTE_SLOTS],
}

impl<T: RasterElement> Node<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            value,
            parent: None,
            children: Vec::new(),
            first_pixel: None,
            last_pixel: None,
            pixel_count: 0,
            attributes: [0.0; ATTRIBUTE_SLOTS],
        }
    }

    /// Intensity level of the component
    pub fn value(&self) -> T {
        self.value
    }

    /// Overwrite the intensity level
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Head of the node's own pixel list
    pub fn first_pixel(&self) -> Option<usize> {
        self.first_pixel
    }

    /// Tail of the node's own pixel list
    pub fn last_pixel(&self) -> Option<usize> {
        self.last_pixel
    }

    /// Number of pixels attached directly to this node
    pub fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    pub fn attribute(&self, slot: AttributeSlot) -> f64 {
        slot.get(self)
    }

    pub fn set_attribute(&mut self, slot: AttributeSlot, value: f64) {
        slot.set(self, value);
    }

    /// All attribute slots
    pub fn attributes(&self) -> &[f64; ATTRIBUTE_SLOTS] {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_compare() {
        assert!(TreeOrdering::Max.is_more_extreme(5, 3));
        assert!(!TreeOrdering::Max.is_more_extreme(3, 3));
        assert!(TreeOrdering::Min.is_more_extreme(3, 5));
        assert_eq!(TreeOrdering::Max.dual(), TreeOrdering::Min);
    }

    #[test]
    fn test_attribute_slots() {
        let mut node = Node::new(7u8);
        let a = AttributeSlot::new(0).unwrap();
        let b = AttributeSlot::new(3).unwrap();
        node.set_attribute(a, 1.5);
        node.set_attribute(b, -2.0);
        assert_eq!(node.attribute(a), 1.5);
        assert_eq!(node.attribute(b), -2.0);
        assert!(AttributeSlot::new(ATTRIBUTE_SLOTS).is_err());
    }
}
