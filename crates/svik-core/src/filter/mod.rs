//! Image filters.
//!
//! Resampling onto a new grid, shrinking, and the worker partitioning and
//! progress reporting they share.

pub mod progress;
pub mod resample;
pub mod shrink;
pub mod splitter;

pub use progress::{
    ConsoleProgressCallback, HistoryCallback, ProgressCallback, ProgressInfo, ProgressReporter,
};
pub use resample::ResampleSparseVectorImageFilter;
pub use shrink::{ShrinkGeometry, ShrinkSparseVectorImageFilter, DEFAULT_MIN_SIZE};
pub use splitter::SlowDimensionSplitter;
