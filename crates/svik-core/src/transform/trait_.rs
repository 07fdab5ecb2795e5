//! Transform trait for spatial coordinate transformations.
//!
//! Transforms map output physical points to input physical points during
//! resampling.

use crate::spatial::Point;

/// Spatial coordinate transformation.
///
/// Implementations are plain data and are shared read-only between
/// resampling workers.
///
/// # Type Parameters
/// * `D` - The spatial dimensionality
pub trait Transform<const D: usize>: Send + Sync + std::fmt::Debug {
    /// Map a single point.
    fn transform_point(&self, point: &Point<D>) -> Point<D>;

    /// Map a batch of points.
    fn transform_points(&self, points: &[Point<D>]) -> Vec<Point<D>> {
        points.iter().map(|p| self.transform_point(p)).collect()
    }

    /// Get the inverse transform (if available).
    ///
    /// Not all transforms are invertible, so this returns an Option.
    fn inverse(&self) -> Option<Box<dyn Transform<D>>> {
        None
    }

    /// Whether the transform maps every point to itself.
    fn is_identity(&self) -> bool {
        false
    }
}
