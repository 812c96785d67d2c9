//! Pixel element trait for generic image values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in an image pixel.
///
/// Bounds the types usable as pixel values: totally ordered in practice
/// (NaN is not a valid pixel value for tree construction), copyable and
/// convertible to and from `f64`.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Minimum value representable by this type
    fn min_value() -> Self;

    /// Maximum value representable by this type
    fn max_value() -> Self;

    /// Whether this type is a floating point type
    fn is_float() -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Convert from f64, clamping to the representable range.
    ///
    /// Integer targets round to the nearest value; NaN maps to zero.
    fn saturating_from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::zero();
        }
        let v = if Self::is_float() { value } else { value.round() };
        match NumCast::from(v) {
            Some(out) => out,
            None if v > 0.0 => Self::max_value(),
            None => Self::min_value(),
        }
    }
}

macro_rules! impl_raster_element_int {
    ($t:ty) => {
        impl RasterElement for $t {
            fn min_value() -> Self {
                <$t>::MIN
            }

            fn max_value() -> Self {
                <$t>::MAX
            }

            fn is_float() -> bool {
                false
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn min_value() -> Self {
                <$t>::MIN
            }

            fn max_value() -> Self {
                <$t>::MAX
            }

            fn is_float() -> bool {
                true
            }
        }
    };
}

impl_raster_element_int!(i8);
impl_raster_element_int!(i16);
impl_raster_element_int!(i32);
impl_raster_element_int!(i64);
impl_raster_element_int!(u8);
impl_raster_element_int!(u16);
impl_raster_element_int!(u32);
impl_raster_element_int!(u64);
impl_raster_element_float!(f32);
impl_raster_element_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_from_f64() {
        assert_eq!(u8::saturating_from_f64(300.0), 255);
        assert_eq!(u8::saturating_from_f64(-4.0), 0);
        assert_eq!(u8::saturating_from_f64(41.6), 42);
        assert_eq!(i16::saturating_from_f64(f64::NAN), 0);
        assert!((f32::saturating_from_f64(0.25) - 0.25).abs() < 1e-7);
    }
}
