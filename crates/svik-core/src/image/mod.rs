//! Sparse vector image types.
//!
//! This module provides the [`SparseVectorImage`] type, its storage
//! container and accessors, grid regions, and dense tensor interchange.

pub mod accessor;
pub mod container;
pub mod dense;
pub mod metadata;
pub mod pixel;
pub mod region;
pub mod sparse_image;

pub use accessor::{SparseVectorPixelAccessor, SparseVectorPixelAccessorMut};
pub use container::{ElementIdentifier, PixelMap, SparseVectorImageContainer};
pub use metadata::ImageMetadata;
pub use pixel::PixelComponent;
pub use region::{ContinuousIndex, ImageRegion, Index, OffsetTable, RegionIndexIter};
pub use sparse_image::SparseVectorImage;
