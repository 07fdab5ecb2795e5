//! Shrink sparse vector image filter.
//!
//! Derives a smaller grid from real-valued per-axis shrink factors, keeping
//! the physical center of the volume, and resamples the input onto it with
//! linear interpolation.

use super::progress::ProgressCallback;
use super::resample::ResampleSparseVectorImageFilter;
use crate::error::{ImageError, Result};
use crate::image::{ContinuousIndex, ImageMetadata, Index, PixelComponent, SparseVectorImage};
use crate::interpolation::LinearInterpolator;
use crate::spatial::{Direction, Point, Spacing, Vector};
use crate::transform::IdentityTransform;
use nalgebra::SVector;
use std::sync::Arc;

/// Default per-axis minimum output size.
pub const DEFAULT_MIN_SIZE: usize = 5;

/// Output grid derived by the shrink filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkGeometry<const D: usize> {
    pub size: [usize; D],
    pub start_index: Index<D>,
    pub spacing: Spacing<D>,
    pub origin: Point<D>,
    pub direction: Direction<D>,
    /// Factors after clamping to the minimum size.
    pub shrink_factors: [f64; D],
}

/// Shrink sparse vector image filter.
#[derive(Clone)]
pub struct ShrinkSparseVectorImageFilter<const D: usize> {
    shrink_factors: [f64; D],
    min_size: [usize; D],
    number_of_workers: Option<usize>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl<const D: usize> Default for ShrinkSparseVectorImageFilter<D> {
    fn default() -> Self {
        Self {
            shrink_factors: [1.0; D],
            min_size: [DEFAULT_MIN_SIZE; D],
            number_of_workers: None,
            progress: None,
        }
    }
}

impl<const D: usize> ShrinkSparseVectorImageFilter<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the same factor on every axis. Factors below 1 become 1.
    pub fn set_shrink_factors(&mut self, factor: f64) {
        self.shrink_factors = [factor.max(1.0); D];
    }

    /// Set the factor of one axis. Factors below 1 become 1.
    pub fn set_shrink_factor(&mut self, axis: usize, factor: f64) -> Result<()> {
        ImageError::check_axis(axis, D)?;
        self.shrink_factors[axis] = factor.max(1.0);
        Ok(())
    }

    /// Set the same minimum output size on every axis; at least 1.
    pub fn set_min_size(&mut self, width: usize) {
        self.min_size = [width.max(1); D];
    }

    /// Set the minimum output size of one axis; at least 1.
    pub fn set_min_size_axis(&mut self, axis: usize, width: usize) -> Result<()> {
        ImageError::check_axis(axis, D)?;
        self.min_size[axis] = width.max(1);
        Ok(())
    }

    pub fn with_shrink_factors(mut self, factor: f64) -> Self {
        self.set_shrink_factors(factor);
        self
    }

    pub fn with_min_size(mut self, width: usize) -> Self {
        self.set_min_size(width);
        self
    }

    pub fn with_number_of_workers(mut self, workers: usize) -> Self {
        self.number_of_workers = Some(workers.max(1));
        self
    }

    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn shrink_factors(&self) -> [f64; D] {
        self.shrink_factors
    }

    pub fn min_size(&self) -> [usize; D] {
        self.min_size
    }

    /// Compute the output grid for `input`.
    ///
    /// A factor larger than `size / min_size` is clamped with a warning and
    /// the axis gets exactly `min_size` cells.
    pub fn output_geometry<T: PixelComponent>(
        &self,
        input: &SparseVectorImage<T, D>,
    ) -> ShrinkGeometry<D> {
        let input_size = input.shape();
        let input_start = input.start_index();
        let input_spacing = input.spacing();

        let mut factors = self.shrink_factors;
        let mut size = [0usize; D];
        let mut spacing = Spacing::<D>::zeros();
        for i in 0..D {
            let max_factor = input_size[i] as f64 / self.min_size[i] as f64;
            if factors[i] > max_factor {
                tracing::warn!(
                    "Shrink factor {} on axis {} is too large, using {} instead",
                    factors[i],
                    i,
                    max_factor
                );
                factors[i] = max_factor;
                size[i] = self.min_size[i];
            } else {
                size[i] = (input_size[i] as f64 / factors[i]).floor() as usize;
            }
            spacing[i] = input_spacing[i] * input_size[i] as f64 / size[i] as f64;
        }

        let start_index = [0i64; D];
        let input_center: ContinuousIndex<D> =
            std::array::from_fn(|i| input_start[i] as f64 + (input_size[i] as f64 - 1.0) / 2.0);
        let output_center: ContinuousIndex<D> =
            std::array::from_fn(|i| start_index[i] as f64 + (size[i] as f64 - 1.0) / 2.0);

        let direction = *input.direction();
        let provisional = ImageMetadata::new(*input.origin(), spacing, direction);
        let input_center_point = input.transform_continuous_index_to_physical_point(&input_center);
        let output_center = SVector::<f64, D>::from(output_center);
        let output_center_point =
            *provisional.origin() + Vector(provisional.index_to_physical_matrix() * output_center);
        let origin = *input.origin() + (input_center_point - output_center_point);

        ShrinkGeometry {
            size,
            start_index,
            spacing,
            origin,
            direction,
            shrink_factors: factors,
        }
    }

    /// Shrink `input`.
    pub fn update<T: PixelComponent>(
        &self,
        input: &SparseVectorImage<T, D>,
    ) -> Result<SparseVectorImage<T, D>> {
        let geometry = self.output_geometry(input);
        tracing::debug!(
            "Shrinking {:?} to {:?} with factors {:?}",
            input.shape(),
            geometry.size,
            geometry.shrink_factors
        );

        let mut resample = ResampleSparseVectorImageFilter::new(
            geometry.size,
            geometry.origin,
            geometry.spacing,
            geometry.direction,
            Box::new(IdentityTransform),
            LinearInterpolator,
        )
        .with_output_start_index(geometry.start_index);
        if let Some(workers) = self.number_of_workers {
            resample = resample.with_number_of_workers(workers);
        }
        if let Some(progress) = &self.progress {
            resample = resample.with_progress_callback(progress.clone());
        }
        resample.update(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageRegion;

    #[test]
    fn test_factor_and_min_size_clamping() {
        let mut filter = ShrinkSparseVectorImageFilter::<3>::new();
        assert_eq!(filter.shrink_factors(), [1.0; 3]);
        assert_eq!(filter.min_size(), [DEFAULT_MIN_SIZE; 3]);

        filter.set_shrink_factors(0.5);
        assert_eq!(filter.shrink_factors(), [1.0; 3]);
        filter.set_shrink_factor(1, 2.5).unwrap();
        assert_eq!(filter.shrink_factors(), [1.0, 2.5, 1.0]);

        filter.set_min_size(0);
        assert_eq!(filter.min_size(), [1; 3]);
        filter.set_min_size_axis(2, 7).unwrap();
        assert_eq!(filter.min_size(), [1, 1, 7]);
    }

    #[test]
    fn test_invalid_axis() {
        let mut filter = ShrinkSparseVectorImageFilter::<2>::new();
        assert_eq!(
            filter.set_shrink_factor(2, 2.0),
            Err(ImageError::InvalidAxis {
                axis: 2,
                dimension: 2
            })
        );
        assert!(filter.set_min_size_axis(5, 2).is_err());
    }

    #[test]
    fn test_geometry_halving() {
        let input = SparseVectorImage::<f32, 3>::from_size([4, 4, 4], 1).unwrap();
        let filter = ShrinkSparseVectorImageFilter::<3>::new()
            .with_shrink_factors(2.0)
            .with_min_size(1);
        let geometry = filter.output_geometry(&input);
        assert_eq!(geometry.size, [2, 2, 2]);
        assert_eq!(geometry.start_index, [0, 0, 0]);
        for i in 0..3 {
            assert!((geometry.spacing[i] - 2.0).abs() < 1e-12);
            assert!((geometry.origin[i] - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_geometry_clamps_to_min_size() {
        let input = SparseVectorImage::<f32, 2>::from_size([10, 20], 1).unwrap();
        let filter = ShrinkSparseVectorImageFilter::<2>::new().with_shrink_factors(4.0);
        let geometry = filter.output_geometry(&input);
        // 10 / 5 = 2 < 4, so axis 0 is clamped; 20 / 4 = 5 is fine
        assert_eq!(geometry.size, [5, 5]);
        assert_eq!(geometry.shrink_factors, [2.0, 4.0]);
    }

    #[test]
    fn test_geometry_non_integer_factor() {
        let input = SparseVectorImage::<f32, 1>::from_size([10], 1).unwrap();
        let filter = ShrinkSparseVectorImageFilter::<1>::new()
            .with_shrink_factors(3.0)
            .with_min_size(1);
        let geometry = filter.output_geometry(&input);
        assert_eq!(geometry.size, [3]);
        assert!((geometry.spacing[0] - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_geometry_preserves_center() {
        let metadata = ImageMetadata::new(
            Point::new([-3.0, 7.0]),
            Spacing::new([0.7, 1.3]),
            Direction::from_row_slice(&[0.0, 1.0, -1.0, 0.0]).unwrap(),
        );
        let input =
            SparseVectorImage::<f32, 2>::new(ImageRegion::new([2, -1], [11, 9]), metadata, 1)
                .unwrap();
        let filter = ShrinkSparseVectorImageFilter::<2>::new()
            .with_shrink_factors(1.5)
            .with_min_size(2);
        let geometry = filter.output_geometry(&input);
        let output = SparseVectorImage::<f32, 2>::new(
            ImageRegion::new(geometry.start_index, geometry.size),
            ImageMetadata::new(geometry.origin, geometry.spacing, geometry.direction),
            1,
        )
        .unwrap();

        let in_center =
            input.transform_continuous_index_to_physical_point(&[2.0 + 5.0, -1.0 + 4.0]);
        let out_center = output.transform_continuous_index_to_physical_point(&[
            (geometry.size[0] as f64 - 1.0) / 2.0,
            (geometry.size[1] as f64 - 1.0) / 2.0,
        ]);
        assert!((in_center[0] - out_center[0]).abs() < 1e-9);
        assert!((in_center[1] - out_center[1]).abs() < 1e-9);
    }

    #[test]
    fn test_shrink_constant_image() {
        let mut input = SparseVectorImage::<f32, 2>::from_size([8, 8], 2).unwrap();
        for index in ImageRegion::from_size([8, 8]).iter() {
            input.set_pixel(&index, &[4.0, -1.0]).unwrap();
        }
        let output = ShrinkSparseVectorImageFilter::<2>::new()
            .with_shrink_factors(2.0)
            .with_min_size(1)
            .with_number_of_workers(2)
            .update(&input)
            .unwrap();
        assert_eq!(output.shape(), [4, 4]);
        for index in output.region().iter() {
            let pixel = output.get_pixel(&index);
            assert!((pixel[0] - 4.0).abs() < 1e-6);
            assert!((pixel[1] + 1.0).abs() < 1e-6);
        }
    }
}
