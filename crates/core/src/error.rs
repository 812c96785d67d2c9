//! Error types for morphtree

use thiserror::Error;

/// Main error type for morphtree operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {shape:?}")]
    InvalidDimensions { shape: Vec<usize> },

    #[error("Index out of bounds: {index:?} in raster of shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    #[error("Size mismatch: expected {expected} elements, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A structural invariant of a component tree does not hold.
    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    /// A tree was requested from an image with no pixels.
    #[error("Empty input: the image has no pixels")]
    EmptyInput,

    /// Two trees combined node by node do not share the same structure.
    #[error("Topology mismatch: {0}")]
    TopologyMismatch(String),

    /// A node id is out of range or refers to a node that was merged away.
    #[error("Invalid node index {index} (arena of {len} slots)")]
    InvalidIndex { index: usize, len: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for morphtree operations
pub type Result<T> = std::result::Result<T, Error>;
