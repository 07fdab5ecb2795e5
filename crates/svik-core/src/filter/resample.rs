//! Resample sparse vector image filter.
//!
//! This module provides ResampleSparseVectorImageFilter which resamples a
//! sparse vector image into a new grid using a transform and an interpolator.
//!
//! The output region is split into contiguous pieces. Every piece is written
//! into a private intermediate image by one worker; the pieces are merged
//! into the output once all workers have joined.

use super::progress::{ProgressCallback, ProgressReporter};
use super::splitter::SlowDimensionSplitter;
use crate::error::{ImageError, Result};
use crate::image::{ImageMetadata, ImageRegion, Index, PixelComponent, SparseVectorImage};
use crate::interpolation::{BoundInterpolator, Interpolator};
use crate::spatial::{Direction, Point, Spacing};
use crate::transform::{IdentityTransform, Transform};
use rayon::prelude::*;
use std::sync::Arc;

/// Resample sparse vector image filter.
///
/// The transform maps Output Physical Space -> Input Physical Space. Output
/// cells whose mapped position falls outside the input buffer receive the
/// default pixel value.
///
/// # Type Parameters
/// * `I` - The interpolator type
/// * `D` - The dimensionality
pub struct ResampleSparseVectorImageFilter<I: Interpolator, const D: usize> {
    size: [usize; D],
    output_start_index: Index<D>,
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
    transform: Option<Box<dyn Transform<D>>>,
    interpolator: Option<I>,
    default_pixel_value: Option<Vec<f64>>,
    number_of_workers: usize,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl<I: Interpolator, const D: usize> ResampleSparseVectorImageFilter<I, D> {
    /// Create a new resample filter.
    ///
    /// # Arguments
    /// * `size` - Output image size (cells)
    /// * `origin` - Output image origin (physical)
    /// * `spacing` - Output image spacing (physical)
    /// * `direction` - Output image direction (matrix)
    /// * `transform` - Transform from output space to input space
    /// * `interpolator` - Interpolator for input image sampling
    pub fn new(
        size: [usize; D],
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
        transform: Box<dyn Transform<D>>,
        interpolator: I,
    ) -> Self {
        Self {
            size,
            output_start_index: [0; D],
            origin,
            spacing,
            direction,
            transform: Some(transform),
            interpolator: Some(interpolator),
            default_pixel_value: None,
            number_of_workers: rayon::current_num_threads(),
            progress: None,
        }
    }

    /// Create from a reference image.
    ///
    /// Uses the geometry (size, start index, origin, spacing, direction) of
    /// the reference image.
    pub fn new_from_reference<T: PixelComponent>(
        reference: &SparseVectorImage<T, D>,
        transform: Box<dyn Transform<D>>,
        interpolator: I,
    ) -> Self {
        Self::new(
            reference.shape(),
            *reference.origin(),
            *reference.spacing(),
            *reference.direction(),
            transform,
            interpolator,
        )
        .with_output_start_index(reference.start_index())
    }

    /// Set default pixel value for outside the field of view.
    ///
    /// Defaults to zeros of the input vector length.
    pub fn with_default_pixel_value(mut self, value: Vec<f64>) -> Self {
        self.default_pixel_value = Some(value);
        self
    }

    pub fn with_output_start_index(mut self, index: Index<D>) -> Self {
        self.output_start_index = index;
        self
    }

    /// Number of workers; at least one.
    pub fn with_number_of_workers(mut self, workers: usize) -> Self {
        self.number_of_workers = workers.max(1);
        self
    }

    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn set_transform(&mut self, transform: Option<Box<dyn Transform<D>>>) {
        self.transform = transform;
    }

    pub fn set_interpolator(&mut self, interpolator: Option<I>) {
        self.interpolator = interpolator;
    }

    pub fn set_size(&mut self, size: [usize; D]) {
        self.size = size;
    }

    pub fn set_origin(&mut self, origin: Point<D>) {
        self.origin = origin;
    }

    pub fn set_spacing(&mut self, spacing: Spacing<D>) {
        self.spacing = spacing;
    }

    pub fn set_direction(&mut self, direction: Direction<D>) {
        self.direction = direction;
    }

    pub fn size(&self) -> [usize; D] {
        self.size
    }

    pub fn output_start_index(&self) -> Index<D> {
        self.output_start_index
    }

    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    pub fn number_of_workers(&self) -> usize {
        self.number_of_workers
    }

    pub fn default_pixel_value(&self) -> Option<&[f64]> {
        self.default_pixel_value.as_deref()
    }

    /// Region of the output image.
    pub fn output_region(&self) -> ImageRegion<D> {
        ImageRegion::new(self.output_start_index, self.size)
    }

    /// Resample `input` into an image of the same component type.
    pub fn update<T: PixelComponent>(
        &self,
        input: &SparseVectorImage<T, D>,
    ) -> Result<SparseVectorImage<T, D>> {
        self.update_as::<T, T>(input)
    }

    /// Resample `input` into an image with component type `U`.
    ///
    /// Interpolated values are clamped to the range of `U`.
    ///
    /// # Errors
    /// - `TransformNotSet` / `InterpolatorNotSet` before any work starts
    /// - `VectorLengthMismatch` if the default pixel value has the wrong length
    /// - `Aborted` if the progress callback requests it
    pub fn update_as<T: PixelComponent, U: PixelComponent>(
        &self,
        input: &SparseVectorImage<T, D>,
    ) -> Result<SparseVectorImage<U, D>> {
        let transform = self.transform.as_deref().ok_or(ImageError::TransformNotSet)?;
        let interpolator = self
            .interpolator
            .as_ref()
            .ok_or(ImageError::InterpolatorNotSet)?;

        let k_len = input.vector_length();
        let default_value: Vec<U> = match &self.default_pixel_value {
            Some(value) => {
                ImageError::check_vector_length(k_len, value.len())?;
                value.iter().map(|v| U::cast_with_bounds(*v)).collect()
            }
            None => vec![U::zero(); k_len],
        };

        let output_region = self.output_region();
        let metadata = ImageMetadata::new(self.origin, self.spacing, self.direction);
        let mut output = SparseVectorImage::<U, D>::new(output_region, metadata, k_len)?;

        // Binding happens once, before any worker starts.
        let bound = interpolator.bind(input);
        let regions = SlowDimensionSplitter.split(&output_region, self.number_of_workers);
        tracing::debug!(
            "Resampling {} cells with {} workers over {} regions",
            output_region.number_of_pixels(),
            self.number_of_workers,
            regions.len()
        );

        let reporter =
            ProgressReporter::new(self.progress.clone(), output_region.number_of_pixels());
        reporter.start();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.number_of_workers)
            .build()
            .map_err(|e| ImageError::WorkerPool(e.to_string()))?;

        let template = &output;
        let result: Result<Vec<SparseVectorImage<U, D>>> = pool.install(|| {
            regions
                .par_iter()
                .map(|region| {
                    Self::resample_region(
                        &bound,
                        transform,
                        template,
                        region,
                        &default_value,
                        &reporter,
                    )
                })
                .collect()
        });

        let intermediates = match result {
            Ok(images) => images,
            Err(e) => {
                reporter.fail(&e);
                return Err(e);
            }
        };

        // Merge in region order; regions are disjoint so the order only
        // matters for reproducibility.
        for intermediate in intermediates {
            output.absorb(intermediate);
        }
        tracing::debug!("Merged output holds {} explicit entries", output.entry_count());

        drop(bound);
        reporter.finish();
        Ok(output)
    }

    fn resample_region<T: PixelComponent, U: PixelComponent>(
        bound: &BoundInterpolator<'_, I, T, D>,
        transform: &dyn Transform<D>,
        template: &SparseVectorImage<U, D>,
        region: &ImageRegion<D>,
        default_value: &[U],
        reporter: &ProgressReporter,
    ) -> Result<SparseVectorImage<U, D>> {
        let input = bound.image();
        let mut intermediate = template.empty_like();
        let mut value = vec![0.0f64; input.vector_length()];
        let mut pixel = vec![U::zero(); input.vector_length()];

        for index in region.iter() {
            let output_point = intermediate.transform_index_to_physical_point(&index);
            let input_point = transform.transform_point(&output_point);
            let input_index = input.transform_physical_point_to_continuous_index(&input_point);

            if bound.is_inside_buffer(&input_index) {
                bound.evaluate_into(&input_index, &mut value);
                for (p, v) in pixel.iter_mut().zip(&value) {
                    *p = U::cast_with_bounds(*v);
                }
                intermediate.set_pixel(&index, &pixel)?;
            } else {
                intermediate.set_pixel(&index, default_value)?;
            }

            reporter.completed_pixel()?;
        }
        Ok(intermediate)
    }
}

impl<I: Interpolator + Default, const D: usize> Default for ResampleSparseVectorImageFilter<I, D> {
    fn default() -> Self {
        Self::new(
            [0; D],
            Point::origin(),
            Spacing::uniform(1.0),
            Direction::identity(),
            Box::new(IdentityTransform),
            I::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::progress::{HistoryCallback, ProgressInfo};
    use crate::interpolation::{LinearInterpolator, NearestNeighborInterpolator};
    use crate::spatial::Vector;
    use crate::transform::TranslationTransform;

    fn source() -> SparseVectorImage<f32, 2> {
        let mut image = SparseVectorImage::<f32, 2>::from_size([6, 6], 2).unwrap();
        for y in 0..6 {
            for x in 0..6 {
                let v = (x * 10 + y) as f32;
                image.set_pixel(&[x, y], &[v, 1.0]).unwrap();
            }
        }
        image
    }

    #[test]
    fn test_missing_transform_or_interpolator() {
        let input = source();
        let mut filter = ResampleSparseVectorImageFilter::<LinearInterpolator, 2>::default();
        filter.set_size([2, 2]);
        filter.set_transform(None);
        assert_eq!(filter.update(&input).unwrap_err(), ImageError::TransformNotSet);

        filter.set_transform(Some(Box::new(IdentityTransform)));
        filter.set_interpolator(None);
        assert_eq!(filter.update(&input).unwrap_err(), ImageError::InterpolatorNotSet);
    }

    #[test]
    fn test_identity_resample_reproduces_input() {
        let input = source();
        let filter = ResampleSparseVectorImageFilter::new_from_reference(
            &input,
            Box::new(IdentityTransform),
            LinearInterpolator,
        )
        .with_number_of_workers(3);
        let output = filter.update(&input).unwrap();
        for index in input.region().iter() {
            assert_eq!(output.get_pixel(&index), input.get_pixel(&index));
        }
        assert_eq!(output.entry_count(), input.entry_count());
    }

    #[test]
    fn test_translation_and_default_value() {
        let input = source();
        let filter = ResampleSparseVectorImageFilter::new_from_reference(
            &input,
            Box::new(TranslationTransform::new(Vector::new([2.0, 0.0]))),
            NearestNeighborInterpolator,
        )
        .with_default_pixel_value(vec![-1.0, -1.0]);
        let output = filter.update(&input).unwrap();
        assert_eq!(output.get_pixel(&[0, 3]), input.get_pixel(&[2, 3]));
        assert_eq!(output.get_pixel(&[3, 5]), input.get_pixel(&[5, 5]));
        assert_eq!(output.get_pixel(&[4, 0]), vec![-1.0, -1.0]);
        assert_eq!(output.get_pixel(&[5, 2]), vec![-1.0, -1.0]);
    }

    #[test]
    fn test_default_value_length_checked() {
        let input = source();
        let filter = ResampleSparseVectorImageFilter::new_from_reference(
            &input,
            Box::new(IdentityTransform),
            LinearInterpolator,
        )
        .with_default_pixel_value(vec![0.0]);
        assert_eq!(
            filter.update(&input).unwrap_err(),
            ImageError::VectorLengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_output_is_clamped() {
        let input = source();
        let filter = ResampleSparseVectorImageFilter::new_from_reference(
            &input,
            Box::new(IdentityTransform),
            NearestNeighborInterpolator,
        )
        .with_default_pixel_value(vec![-5.0, 300.0]);
        let output: SparseVectorImage<u8, 2> = filter.update_as(&input).unwrap();
        assert_eq!(output.get_pixel(&[5, 5]), vec![55, 1]);

        let mut negative = SparseVectorImage::<f32, 2>::from_size([2, 2], 1).unwrap();
        negative.set_pixel(&[0, 0], &[-7.5]).unwrap();
        negative.set_pixel(&[1, 0], &[1000.0]).unwrap();
        let filter = ResampleSparseVectorImageFilter::new_from_reference(
            &negative,
            Box::new(IdentityTransform),
            NearestNeighborInterpolator,
        );
        let clamped: SparseVectorImage<u8, 2> = filter.update_as(&negative).unwrap();
        assert_eq!(clamped.get_pixel(&[0, 0]), vec![0]);
        assert_eq!(clamped.get_pixel(&[1, 0]), vec![255]);
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let input = source();
        let run = |workers| {
            ResampleSparseVectorImageFilter::new(
                [5, 5],
                Point::new([0.3, 0.6]),
                Spacing::new([1.1, 0.9]),
                Direction::identity(),
                Box::new(IdentityTransform),
                LinearInterpolator,
            )
            .with_number_of_workers(workers)
            .update(&input)
            .unwrap()
        };
        let single = run(1);
        let many = run(4);
        for index in single.region().iter() {
            assert_eq!(single.get_pixel(&index), many.get_pixel(&index));
        }
        assert_eq!(single.entry_count(), many.entry_count());
    }

    #[test]
    fn test_progress_reported() {
        let input = source();
        let history = Arc::new(HistoryCallback::new());
        let callback: Arc<dyn ProgressCallback> = history.clone();
        let filter = ResampleSparseVectorImageFilter::new_from_reference(
            &input,
            Box::new(IdentityTransform),
            LinearInterpolator,
        )
        .with_progress_callback(callback);
        filter.update(&input).unwrap();
        let records = history.get_history();
        assert_eq!(records.len(), 36);
        assert!(records.iter().any(|r| r.completed_pixels == 36));
    }

    struct StopImmediately;

    impl ProgressCallback for StopImmediately {
        fn on_progress(&self, _info: &ProgressInfo) {}

        fn should_abort(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_abort_through_callback() {
        let input = source();
        let filter = ResampleSparseVectorImageFilter::new_from_reference(
            &input,
            Box::new(IdentityTransform),
            LinearInterpolator,
        )
        .with_number_of_workers(2)
        .with_progress_callback(Arc::new(StopImmediately));
        let err = filter.update(&input).unwrap_err();
        assert!(matches!(err, ImageError::Aborted { total: 36, .. }));
    }
}
