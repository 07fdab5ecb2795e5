//! Interpolation types and operations.
//!
//! This module provides the interpolator trait, nearest and linear
//! implementations, and the image binding used to evaluate them.

pub mod augmented;
pub mod function;
pub mod kind;
pub mod linear;
pub mod nearest;
pub mod trait_;

pub use augmented::AugmentedIndex;
pub use function::BoundInterpolator;
pub use kind::InterpolatorKind;
pub use linear::LinearInterpolator;
pub use nearest::NearestNeighborInterpolator;
pub use trait_::Interpolator;
