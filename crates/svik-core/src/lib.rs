//! Sparse vector images with interpolation, parallel resampling and shrinking.

pub mod error;
pub mod filter;
pub mod image;
pub mod interpolation;
pub mod spatial;
pub mod transform;

pub use error::{ImageError, Result};
pub use image::{ImageMetadata, ImageRegion, PixelComponent, SparseVectorImage};
pub use spatial::{Direction, Point, Spacing, Vector};
