//! Numeric component types that can be stored in a sparse vector image.

use num_traits::{Bounded, NumCast, Zero};
use std::fmt::Debug;

/// A scalar component of a vector pixel.
///
/// Interpolation is carried out in `f64`; `to_real` and `cast_with_bounds`
/// convert in and out of that representation.
pub trait PixelComponent:
    Copy + Debug + PartialEq + PartialOrd + Send + Sync + Zero + NumCast + Bounded + 'static
{
    /// Convert to the real type used for interpolation.
    fn to_real(self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    /// Cast a real value into this type, clamping to `[min_value, max_value]`.
    ///
    /// For floating point types the lower bound is the most negative finite
    /// value. NaN maps to zero.
    fn cast_with_bounds(value: f64) -> Self {
        if value.is_nan() {
            return Self::zero();
        }
        let min = Self::min_value();
        let max = Self::max_value();
        if value <= min.to_real() {
            return min;
        }
        if value >= max.to_real() {
            return max;
        }
        <Self as NumCast>::from(value).unwrap_or_else(Self::zero)
    }
}

macro_rules! impl_pixel_component {
    ($($t:ty),*) => {
        $(impl PixelComponent for $t {})*
    };
}

impl_pixel_component!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);
