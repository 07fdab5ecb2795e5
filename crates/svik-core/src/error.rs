//! Error types for sparse image operations.
//!
//! Configuration problems are reported at the call that detects them; no
//! operation retries on its own.

use thiserror::Error;

/// Main error type for image, interpolation and filter operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// The resample filter was run without a transform.
    #[error("Transform not set")]
    TransformNotSet,

    /// The resample filter was run without an interpolator.
    #[error("Interpolator not set")]
    InterpolatorNotSet,

    /// A per-axis setter received an axis outside the image dimension.
    #[error("Invalid axis {axis} for a {dimension}-dimensional image")]
    InvalidAxis { axis: usize, dimension: usize },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A pixel or default value has the wrong number of components.
    #[error("Vector length mismatch: expected {expected}, got {actual}")]
    VectorLengthMismatch { expected: usize, actual: usize },

    /// A write addressed a cell outside the image region.
    #[error("Index {index:?} is outside the image region")]
    IndexOutOfRegion { index: Vec<i64> },

    /// An element identifier does not address any component of the image.
    #[error("Element identifier {id} out of range for {capacity} components")]
    ElementOutOfRange { id: u64, capacity: u64 },

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The direction matrix has no inverse.
    #[error("Direction matrix is not invertible")]
    SingularDirection,

    /// A progress callback asked the operation to stop.
    #[error("Aborted after {completed} of {total} pixels")]
    Aborted { completed: usize, total: usize },

    /// The worker pool could not be built.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Tensor data could not be converted.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

impl ImageError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Check an axis against the image dimension.
    pub fn check_axis(axis: usize, dimension: usize) -> Result<()> {
        if axis >= dimension {
            return Err(Self::InvalidAxis { axis, dimension });
        }
        Ok(())
    }

    /// Check a vector length against the expected one.
    pub fn check_vector_length(expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(Self::VectorLengthMismatch { expected, actual });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ImageError::TransformNotSet.to_string(), "Transform not set");
        let err = ImageError::invalid_configuration("bad size");
        assert_eq!(err.to_string(), "Invalid configuration: bad size");
    }

    #[test]
    fn test_check_axis() {
        assert!(ImageError::check_axis(2, 3).is_ok());
        assert_eq!(
            ImageError::check_axis(3, 3),
            Err(ImageError::InvalidAxis { axis: 3, dimension: 3 })
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let err = ImageError::ShapeMismatch {
            expected: vec![10, 2],
            actual: vec![5, 2],
        };
        let err_str = err.to_string();
        assert!(err_str.contains("expected"));
        assert!(err_str.contains("got"));
    }
}
