//! Component tree data model
//!
//! - [`PixelLinks`]: per-pixel "next" array behind every node's own pixel list
//! - [`Node`]: one connected component at one intensity level
//! - [`ComponentTree`]: arena of nodes plus the pixel links and the root

mod component_tree;
mod iter;
mod node;
mod pixel_links;

pub use component_tree::ComponentTree;
pub use iter::{PostOrderIter, PreOrderIter};
pub use node::{AttributeSlot, Node, NodeId, TreeOrdering, ATTRIBUTE_SLOTS};
pub use pixel_links::{PixelIter, PixelLinks};
