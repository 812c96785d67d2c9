//! Leaf-queue pruning
//!
//! Both algorithms repeatedly take the leaf with the most extreme attribute
//! from a priority queue and merge it into its parent. A parent left without
//! children becomes a leaf itself and can be queued in turn.

mod granulometry;
mod keep_n_lobes;
mod queue;

pub use granulometry::{granulometry, GranulometryCurve, GranulometryParams, GranulometryStep};
pub use keep_n_lobes::{keep_n_lobes, KeepNLobesParams};
pub use queue::LeafQueue;
