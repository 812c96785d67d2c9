//! # morphtree core
//!
//! Core types, traits and I/O for the morphtree component tree library.
//!
//! This crate provides:
//! - `Raster<T>`: n-dimensional image with per-axis physical spacing
//! - `Image`: the read-only pixel access the tree builder consumes
//! - `ComponentTree<T>`: arena-backed max-tree / min-tree
//! - Algorithm traits for consistent API
//! - TIFF I/O for 2-D images

pub mod error;
pub mod io;
pub mod raster;
pub mod tree;

pub use error::{Error, Result};
pub use raster::{Connectivity, Image, Raster, RasterElement, Spacing};
pub use tree::{ComponentTree, Node, NodeId, TreeOrdering};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Connectivity, Image, Raster, RasterElement, Spacing};
    pub use crate::tree::{AttributeSlot, ComponentTree, Node, NodeId, TreeOrdering};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in morphtree.
///
/// Algorithms transform input data according to parameters. Tree-to-tree
/// algorithms take the tree by value and hand it back rewritten.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
