//! Read-only pixel access used by tree construction

use super::{Connectivity, Neighborhood, RasterElement, Spacing};

/// Row-major strides for `shape` (last axis varies fastest)
pub fn strides_of(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Write the row-major coordinate of `index` into `coord`
pub fn unravel_index(mut index: usize, shape: &[usize], coord: &mut [usize]) {
    for axis in (0..shape.len()).rev() {
        coord[axis] = index % shape[axis];
        index /= shape[axis];
    }
}

/// An n-dimensional image addressed by row-major linear pixel index.
///
/// Implementors only supply the shape, the spacing and a value lookup;
/// coordinate conversion and neighbor enumeration are derived from the shape.
pub trait Image {
    /// Pixel value type
    type Pixel: RasterElement;

    /// Extent along each axis
    fn shape(&self) -> &[usize];

    /// Value at a linear index. Panics if `index >= pixel_count()`.
    fn value_at(&self, index: usize) -> Self::Pixel;

    /// Physical pixel spacing
    fn spacing(&self) -> &Spacing;

    /// Number of pixels (zero for an image without axes)
    fn pixel_count(&self) -> usize {
        let shape = self.shape();
        if shape.is_empty() {
            0
        } else {
            shape.iter().product()
        }
    }

    /// n-D coordinate of a linear index
    fn coordinate_of(&self, index: usize) -> Vec<usize> {
        let shape = self.shape();
        let mut coord = vec![0; shape.len()];
        unravel_index(index, shape, &mut coord);
        coord
    }

    /// Linear index of an n-D coordinate, `None` when outside the image
    fn index_of(&self, coord: &[usize]) -> Option<usize> {
        let shape = self.shape();
        if coord.len() != shape.len() || coord.iter().zip(shape).any(|(c, s)| c >= s) {
            return None;
        }
        Some(
            coord
                .iter()
                .zip(strides_of(shape))
                .map(|(c, stride)| c * stride)
                .sum(),
        )
    }

    /// Linear indexes of the in-bounds neighbors of `index`
    ///
    /// Builds the offset table on each call; loops over many pixels should
    /// construct a [`Neighborhood`] once instead.
    fn neighbors_of(&self, index: usize, connectivity: Connectivity) -> Vec<usize> {
        let neighborhood = Neighborhood::new(self.shape(), connectivity);
        let coord = self.coordinate_of(index);
        neighborhood.neighbors(&coord, index).collect()
    }
}
