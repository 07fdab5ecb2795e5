//! Interpolator trait for sampling sparse vector images at continuous indices.
//!
//! An interpolator only decides which neighbours contribute and with what
//! weight. Reading the image and accumulating vectors is done by
//! [`BoundInterpolator`](super::BoundInterpolator).

use super::function::BoundInterpolator;
use crate::image::{ContinuousIndex, Index, PixelComponent, SparseVectorImage};

/// Neighbour weighting strategy.
pub trait Interpolator: Send + Sync {
    /// Visit the neighbours of `index` that contribute to the interpolated value.
    ///
    /// `visit` receives each neighbour inside the buffer (as decided by
    /// `is_inside`) together with its weight, in a fixed order. Neighbours
    /// outside the buffer are skipped without renormalising the others.
    fn for_each_neighbor<const D: usize>(
        &self,
        index: &ContinuousIndex<D>,
        is_inside: impl Fn(&Index<D>) -> bool,
        visit: impl FnMut(&Index<D>, f64),
    );

    /// Bind this interpolator to an image for an evaluation session.
    ///
    /// The binding borrows both and ends when it is dropped.
    fn bind<'a, T: PixelComponent, const D: usize>(
        &'a self,
        image: &'a SparseVectorImage<T, D>,
    ) -> BoundInterpolator<'a, Self, T, D>
    where
        Self: Sized,
    {
        BoundInterpolator::new(self, image)
    }
}
