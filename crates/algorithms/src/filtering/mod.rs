//! Attribute filtering
//!
//! Removes nodes whose attribute fails a threshold test. The
//! [`PruningPolicy`] decides what happens to the removed node's descendants
//! and to the grey levels of the survivors.

mod opening;
mod policy;

pub use opening::{size_opening, SizeOpeningParams};
pub use policy::{attribute_filter, filtered_image, AttributeFilterParams, PruningPolicy};
