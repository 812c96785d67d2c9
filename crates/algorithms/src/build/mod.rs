//! Max-tree and min-tree construction
//!
//! Builds a [`ComponentTree`] from any [`Image`] by union-find flooding.

mod flooding;

use std::marker::PhantomData;

use morphtree_core::{Algorithm, ComponentTree, Connectivity, Error, Image, Result, TreeOrdering};
use tracing::debug;

/// Parameters for tree construction
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilderParams {
    /// `Max` for a max-tree (bright components), `Min` for a min-tree
    pub ordering: TreeOrdering,
    /// Face-only or full adjacency
    pub connectivity: Connectivity,
}

/// Tree construction algorithm
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<I> {
    _image: PhantomData<I>,
}

impl<I> Default for TreeBuilder<I> {
    fn default() -> Self {
        Self {
            _image: PhantomData,
        }
    }
}

impl<I: Image> Algorithm for TreeBuilder<I> {
    type Input = I;
    type Output = ComponentTree<I::Pixel>;
    type Params = TreeBuilderParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "TreeBuilder"
    }

    fn description(&self) -> &'static str {
        "Build a max-tree or min-tree of an n-dimensional image"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        build_tree(&input, params)
    }
}

/// Build the component tree of `image`.
///
/// Returns [`Error::EmptyInput`] when the image has no pixels.
pub fn build_tree<I: Image>(image: &I, params: TreeBuilderParams) -> Result<ComponentTree<I::Pixel>> {
    let n = image.pixel_count();
    if n == 0 {
        return Err(Error::EmptyInput);
    }

    let values: Vec<I::Pixel> = (0..n).map(|i| image.value_at(i)).collect();
    let tree = flooding::flood(
        &values,
        image.shape(),
        image.spacing().clone(),
        params.ordering,
        params.connectivity,
    )?;

    debug!(
        "Built {:?}-tree: {} nodes from {} pixels ({:?} connectivity)",
        params.ordering,
        tree.len(),
        n,
        params.connectivity
    );
    Ok(tree)
}

/// Max-tree of `image`
pub fn max_tree<I: Image>(image: &I, connectivity: Connectivity) -> Result<ComponentTree<I::Pixel>> {
    build_tree(
        image,
        TreeBuilderParams {
            ordering: TreeOrdering::Max,
            connectivity,
        },
    )
}

/// Min-tree of `image`
pub fn min_tree<I: Image>(image: &I, connectivity: Connectivity) -> Result<ComponentTree<I::Pixel>> {
    build_tree(
        image,
        TreeBuilderParams {
            ordering: TreeOrdering::Min,
            connectivity,
        },
    )
}
