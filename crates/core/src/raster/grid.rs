//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{Image, RasterElement, Spacing};
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, IxDyn};

/// An n-dimensional image with per-axis physical spacing.
///
/// `Raster<T>` stores values of type `T` in a row-major array of any
/// dimensionality. Linear pixel indexes used by the component tree are
/// row-major offsets into that array.
///
/// # Example
///
/// ```ignore
/// use morphtree_core::Raster;
///
/// // Create a 100x100 raster filled with zeros
/// let mut raster: Raster<u8> = Raster::new(&[100, 100]);
///
/// raster.set(&[10, 20], 42)?;
/// let value = raster.get(&[10, 20])?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Pixel data, always in standard (row-major) layout
    data: ArrayD<T>,
    /// Physical size of one pixel along each axis
    spacing: Spacing,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
            spacing: Spacing::unit(shape.len()),
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(shape: &[usize], value: T) -> Self {
        Self {
            data: ArrayD::from_elem(IxDyn(shape), value),
            spacing: Spacing::unit(shape.len()),
        }
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        if shape.is_empty() {
            return Err(Error::InvalidDimensions {
                shape: shape.to_vec(),
            });
        }
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let array =
            ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            spacing: Spacing::unit(shape.len()),
            data: array,
        })
    }

    /// Create a raster from an ndarray of any dimensionality
    pub fn from_array<D: ndarray::Dimension>(data: ndarray::Array<T, D>) -> Self {
        let data = data.into_dyn();
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self {
            spacing: Spacing::unit(data.ndim()),
            data,
        }
    }

    /// Create a zero-filled raster of another pixel type with the same shape and spacing
    pub fn with_same_meta<U: RasterElement>(&self) -> Raster<U> {
        Raster {
            data: ArrayD::zeros(self.data.raw_dim()),
            spacing: self.spacing.clone(),
        }
    }

    /// Create a raster with the same shape and spacing, filled with a value
    pub fn like(&self, fill_value: T) -> Self {
        Self {
            data: ArrayD::from_elem(self.data.raw_dim(), fill_value),
            spacing: self.spacing.clone(),
        }
    }

    // Dimensions

    /// Extent along each axis
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster has no pixels
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at an n-D coordinate
    pub fn get(&self, index: &[usize]) -> Result<T> {
        self.data
            .get(IxDyn(index))
            .copied()
            .ok_or_else(|| Error::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape().to_vec(),
            })
    }

    /// Set value at an n-D coordinate
    pub fn set(&mut self, index: &[usize], value: T) -> Result<()> {
        let shape = self.shape().to_vec();
        match self.data.get_mut(IxDyn(index)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                index: index.to_vec(),
                shape,
            }),
        }
    }

    /// Get value at a row-major linear index
    pub fn get_linear(&self, index: usize) -> Result<T> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index: vec![index],
                shape: vec![self.len()],
            });
        }
        Ok(self.value_at(index))
    }

    /// Set value at a row-major linear index
    pub fn set_linear(&mut self, index: usize, value: T) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index: vec![index],
                shape: vec![self.len()],
            });
        }
        match self.data.as_slice_mut() {
            Some(pixels) => pixels[index] = value,
            None => {
                let coord = self.coordinate_of(index);
                self.data[IxDyn(&coord)] = value;
            }
        }
        Ok(())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayViewD<'_, T> {
        self.data.view()
    }

    /// Get a mutable view of the underlying data
    pub fn view_mut(&mut self) -> ArrayViewMutD<'_, T> {
        self.data.view_mut()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Consume the raster and return the underlying array
    pub fn into_array(self) -> ArrayD<T> {
        self.data
    }

    /// Pixel values in row-major order
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().copied().collect()
    }

    // Metadata

    /// Get the pixel spacing
    pub fn spacing(&self) -> &Spacing {
        &self.spacing
    }

    /// Set the pixel spacing; it must have one step per axis
    pub fn set_spacing(&mut self, spacing: Spacing) -> Result<()> {
        if spacing.ndim() != self.ndim() {
            return Err(Error::InvalidParameter {
                name: "spacing",
                value: format!("{:?}", spacing.as_slice()),
                reason: format!("expected {} axes", self.ndim()),
            });
        }
        self.spacing = spacing;
        Ok(())
    }

    // Statistics

    /// Calculate basic statistics (min, max, mean)
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum: f64 = 0.0;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        let mean = if count > 0 {
            Some(sum / count as f64)
        } else {
            None
        };

        RasterStatistics {
            min,
            max,
            mean,
            count: self.len(),
        }
    }
}

impl<T: RasterElement> Image for Raster<T> {
    type Pixel = T;

    fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    fn value_at(&self, index: usize) -> T {
        match self.data.as_slice() {
            Some(pixels) => pixels[index],
            None => self.data[IxDyn(&self.coordinate_of(index))],
        }
    }

    fn spacing(&self) -> &Spacing {
        &self.spacing
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::new(&[100, 200]);
        assert_eq!(raster.shape(), &[100, 200]);
        assert_eq!(raster.len(), 20_000);
        assert_eq!(raster.spacing().ndim(), 2);
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<u16> = Raster::new(&[4, 5, 6]);
        raster.set(&[1, 2, 3], 42).unwrap();
        assert_eq!(raster.get(&[1, 2, 3]).unwrap(), 42);
        // row-major: 1*30 + 2*6 + 3
        assert_eq!(raster.get_linear(45).unwrap(), 42);
        assert!(raster.get(&[4, 0, 0]).is_err());
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let err = Raster::from_vec(vec![1u8, 2, 3], &[2, 2]).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_from_array_non_standard_layout() {
        let a = ndarray::Array2::from_shape_vec((2, 3), vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        let raster = Raster::from_array(a.reversed_axes());
        assert_eq!(raster.shape(), &[3, 2]);
        assert_eq!(raster.to_vec(), vec![0, 3, 1, 4, 2, 5]);
        assert_eq!(raster.value_at(1), 3);
    }

    #[test]
    fn test_raster_statistics() {
        let data: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let raster = Raster::from_vec(data, &[10, 10]).unwrap();
        let stats = raster.statistics();
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(99.0));
        assert_eq!(stats.count, 100);
    }
}
