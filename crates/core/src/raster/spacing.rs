//! Per-axis physical pixel spacing

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Physical extent of one pixel along each axis.
///
/// Axis order follows the array shape (slowest-varying axis first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spacing(Vec<f64>);

impl Spacing {
    /// Create a spacing, rejecting non-positive or non-finite steps
    pub fn new(steps: Vec<f64>) -> Result<Self> {
        if let Some(bad) = steps.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(Error::InvalidParameter {
                name: "spacing",
                value: bad.to_string(),
                reason: "each step must be finite and strictly positive".into(),
            });
        }
        Ok(Self(steps))
    }

    /// Unit spacing for an image with `ndim` axes
    pub fn unit(ndim: usize) -> Self {
        Self(vec![1.0; ndim])
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Step along `axis`
    pub fn axis(&self, axis: usize) -> Option<f64> {
        self.0.get(axis).copied()
    }

    /// Physical volume (area in 2-D) of a single pixel
    pub fn pixel_volume(&self) -> f64 {
        self.0.iter().product()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}
