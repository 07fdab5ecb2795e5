//! Interpolation bound to one image for an evaluation session.
//!
//! The binding precomputes the continuous buffer bounds of the image. It
//! borrows the image immutably, so the image cannot change while any
//! evaluation is running, and it is shared read-only between workers.

use super::augmented::AugmentedIndex;
use super::trait_::Interpolator;
use crate::image::{ContinuousIndex, Index, PixelComponent, SparseVectorImage};
use crate::spatial::Point;

/// An interpolator bound to a source image.
#[derive(Debug)]
pub struct BoundInterpolator<'a, I, T: PixelComponent, const D: usize> {
    interpolator: &'a I,
    image: &'a SparseVectorImage<T, D>,
    start_continuous_index: ContinuousIndex<D>,
    end_continuous_index: ContinuousIndex<D>,
}

impl<'a, I: Interpolator, T: PixelComponent, const D: usize> BoundInterpolator<'a, I, T, D> {
    pub fn new(interpolator: &'a I, image: &'a SparseVectorImage<T, D>) -> Self {
        let start = image.start_index();
        let size = image.shape();
        Self {
            interpolator,
            image,
            start_continuous_index: std::array::from_fn(|i| start[i] as f64 - 0.5),
            end_continuous_index: std::array::from_fn(|i| (start[i] + size[i] as i64) as f64 - 0.5),
        }
    }

    pub fn image(&self) -> &'a SparseVectorImage<T, D> {
        self.image
    }

    pub fn interpolator(&self) -> &'a I {
        self.interpolator
    }

    /// Components of the bound image.
    pub fn vector_length(&self) -> usize {
        self.image.vector_length()
    }

    /// Whether a continuous index lies in `[start - 0.5, start + size - 0.5)` on every axis.
    pub fn is_inside_buffer(&self, index: &ContinuousIndex<D>) -> bool {
        (0..D).all(|i| {
            index[i] >= self.start_continuous_index[i] && index[i] < self.end_continuous_index[i]
        })
    }

    /// Whether a discrete index lies in the image region.
    pub fn is_inside_buffer_index(&self, index: &Index<D>) -> bool {
        self.image.is_inside_buffer(index)
    }

    /// Interpolate the whole vector at a continuous index into `out`.
    ///
    /// `out` must hold `K` values. Callers check [`Self::is_inside_buffer`]
    /// first; neighbours outside the buffer contribute nothing.
    pub fn evaluate_into(&self, index: &ContinuousIndex<D>, out: &mut [f64]) {
        out.iter_mut().for_each(|v| *v = 0.0);
        let accessor = self.image.pixel_accessor();
        let k_len = self.vector_length();
        self.interpolator.for_each_neighbor(
            index,
            |n| self.is_inside_buffer_index(n),
            |n, weight| {
                let offset = self.image.compute_offset(n);
                for (k, slot) in out.iter_mut().take(k_len).enumerate() {
                    *slot += weight * accessor.get_component(offset, k).to_real();
                }
            },
        );
    }

    pub fn evaluate_at_continuous_index(&self, index: &ContinuousIndex<D>) -> Vec<f64> {
        let mut out = vec![0.0; self.vector_length()];
        self.evaluate_into(index, &mut out);
        out
    }

    pub fn evaluate_at_index(&self, index: &Index<D>) -> Vec<f64> {
        let cindex: ContinuousIndex<D> = std::array::from_fn(|i| index[i] as f64);
        self.evaluate_at_continuous_index(&cindex)
    }

    /// Interpolate at a physical point; `None` outside the buffer.
    pub fn evaluate(&self, point: &Point<D>) -> Option<Vec<f64>> {
        let cindex = self.image.transform_physical_point_to_continuous_index(point);
        if !self.is_inside_buffer(&cindex) {
            return None;
        }
        Some(self.evaluate_at_continuous_index(&cindex))
    }

    /// Augmented-index variant of [`Self::evaluate_into`].
    ///
    /// The components are read as the leading axis of a scalar grid,
    /// addressing `(k, n[0], ..., n[D-1])` for each contributing neighbour `n`.
    pub fn vector_evaluate_into(&self, index: &ContinuousIndex<D>, out: &mut [f64]) {
        out.iter_mut().for_each(|v| *v = 0.0);
        let k_len = self.vector_length();
        self.interpolator.for_each_neighbor(
            index,
            |n| self.is_inside_buffer_index(n),
            |n, weight| {
                for (k, slot) in out.iter_mut().take(k_len).enumerate() {
                    let augmented = AugmentedIndex::new(k, *n);
                    *slot += weight * augmented.read(self.image).to_real();
                }
            },
        );
    }

    pub fn vector_evaluate_at_continuous_index(&self, index: &ContinuousIndex<D>) -> Vec<f64> {
        let mut out = vec![0.0; self.vector_length()];
        self.vector_evaluate_into(index, &mut out);
        out
    }

    pub fn vector_evaluate_at_index(&self, index: &Index<D>) -> Vec<f64> {
        let cindex: ContinuousIndex<D> = std::array::from_fn(|i| index[i] as f64);
        self.vector_evaluate_at_continuous_index(&cindex)
    }

    pub fn vector_evaluate(&self, point: &Point<D>) -> Option<Vec<f64>> {
        let cindex = self.image.transform_physical_point_to_continuous_index(point);
        if !self.is_inside_buffer(&cindex) {
            return None;
        }
        Some(self.vector_evaluate_at_continuous_index(&cindex))
    }
}
