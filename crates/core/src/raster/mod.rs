//! Image data structures and pixel addressing

mod element;
mod grid;
mod image;
mod neighborhood;
mod spacing;

pub use element::RasterElement;
pub use grid::{Raster, RasterStatistics};
pub use image::{strides_of, unravel_index, Image};
pub use neighborhood::{Connectivity, Neighborhood, NeighborhoodIterator};
pub use spacing::Spacing;
