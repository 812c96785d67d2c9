//! Ownership contract shared by every tree-to-tree algorithm
//!
//! A transform either rewrites the caller's tree (the tree moves into the
//! result and the caller's binding is gone) or rewrites a deep clone and
//! leaves the borrowed tree untouched.

use morphtree_core::tree::AttributeSlot;
use morphtree_core::{ComponentTree, RasterElement, Result};

/// Where a transform gets the tree it rewrites
#[derive(Debug)]
pub enum TreeSource<'a, T: RasterElement> {
    /// Reuse the caller's storage; ownership passes to the result
    InPlace(ComponentTree<T>),
    /// Work on a structural clone; the borrowed tree stays valid
    Cloned(&'a ComponentTree<T>),
}

impl<T: RasterElement> TreeSource<'_, T> {
    /// Whether the caller's tree is reused
    pub fn in_place(&self) -> bool {
        matches!(self, TreeSource::InPlace(_))
    }

    /// The tree to rewrite
    pub fn into_tree(self) -> ComponentTree<T> {
        match self {
            TreeSource::InPlace(tree) => tree,
            TreeSource::Cloned(tree) => tree.clone(),
        }
    }
}

impl<T: RasterElement> From<ComponentTree<T>> for TreeSource<'_, T> {
    fn from(tree: ComponentTree<T>) -> Self {
        TreeSource::InPlace(tree)
    }
}

impl<'a, T: RasterElement> From<&'a ComponentTree<T>> for TreeSource<'a, T> {
    fn from(tree: &'a ComponentTree<T>) -> Self {
        TreeSource::Cloned(tree)
    }
}

/// A configured tree-to-tree algorithm.
///
/// Implementors only provide [`apply`](TreeTransform::apply); it validates
/// its preconditions before changing anything, so an `Err` leaves the tree
/// as it was.
pub trait TreeTransform {
    /// Short algorithm name, used in log lines
    fn name(&self) -> &'static str;

    /// Rewrite `tree` in place
    fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()>;

    /// Run on an owned tree (in place) or a borrowed one (cloned first)
    fn transform<'a, T: RasterElement>(
        &self,
        source: impl Into<TreeSource<'a, T>>,
    ) -> Result<ComponentTree<T>> {
        let mut tree = source.into().into_tree();
        self.apply(&mut tree)?;
        Ok(tree)
    }
}

/// Whether `slot` is monotone along every parent-child edge.
///
/// With `increasing`, values grow (or stay equal unless `strict`) from the
/// leaves towards the root: every parent is `>=` (`>` when strict) each of
/// its children. Without `increasing` the relation is reversed.
pub fn is_monotone<T: RasterElement>(
    tree: &ComponentTree<T>,
    slot: AttributeSlot,
    increasing: bool,
    strict: bool,
) -> bool {
    tree.iter().all(|(_, node)| {
        let Some(parent) = node.parent() else {
            return true;
        };
        let (p, c) = (tree[parent].attribute(slot), node.attribute(slot));
        match (increasing, strict) {
            (true, false) => p >= c,
            (true, true) => p > c,
            (false, false) => p <= c,
            (false, true) => p < c,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::size;
    use crate::build::max_tree;
    use morphtree_core::{Connectivity, Raster};

    fn ridge() -> ComponentTree<u8> {
        let raster = Raster::from_vec(vec![1u8, 3, 2, 3, 1], &[5]).unwrap();
        max_tree(&raster, Connectivity::Face).unwrap()
    }

    struct FlattenRoot;

    impl TreeTransform for FlattenRoot {
        fn name(&self) -> &'static str {
            "FlattenRoot"
        }

        fn apply<T: RasterElement>(&self, tree: &mut ComponentTree<T>) -> Result<()> {
            let root = tree.root();
            tree.flatten(root)
        }
    }

    #[test]
    fn test_cloned_source_is_untouched() {
        let tree = ridge();
        let flat = FlattenRoot.transform(&tree).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(tree.len(), 4, "borrowed tree must not change");
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_in_place_source_moves() {
        let tree = ridge();
        let source = TreeSource::from(tree);
        assert!(source.in_place());
        let flat = FlattenRoot.transform(source).unwrap();
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn test_is_monotone_size() {
        let mut tree = ridge();
        let slot = AttributeSlot::new(0).unwrap();
        size(&mut tree, slot);
        assert!(is_monotone(&tree, slot, true, true));
        assert!(!is_monotone(&tree, slot, false, false));
    }
}
