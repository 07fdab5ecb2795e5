use std::sync::Arc;
use svik_core::filter::{
    ConsoleProgressCallback, ResampleSparseVectorImageFilter, ShrinkSparseVectorImageFilter,
};
use svik_core::image::{ImageMetadata, ImageRegion, SparseVectorImage};
use svik_core::interpolation::{
    Interpolator, InterpolatorKind, LinearInterpolator, NearestNeighborInterpolator,
};
use svik_core::spatial::{Direction, Point, Spacing, Vector};
use svik_core::transform::{AffineTransform, IdentityTransform, TranslationTransform};

fn single_spike() -> SparseVectorImage<f32, 3> {
    let mut image = SparseVectorImage::<f32, 3>::from_size([4, 4, 4], 1).unwrap();
    image.set_pixel(&[1, 1, 1], &[10.0]).unwrap();
    image
}

#[test]
fn test_nearest_downsample_keeps_spike() {
    let input = single_spike();
    let filter = ResampleSparseVectorImageFilter::new(
        [2, 2, 2],
        Point::new([0.5, 0.5, 0.5]),
        Spacing::uniform(2.0),
        Direction::identity(),
        Box::new(IdentityTransform),
        NearestNeighborInterpolator,
    );
    let output = filter.update(&input).unwrap();

    for index in output.region().iter() {
        let value = output.get_pixel(&index)[0];
        if index == [0, 0, 0] {
            assert!((value - 10.0).abs() < 1e-6);
        } else {
            assert_eq!(value, 0.0);
        }
    }
    assert_eq!(output.entry_count(), 1);
}

#[test]
fn test_shrink_geometry_matches_manual_grid() {
    let input = single_spike();
    let geometry = ShrinkSparseVectorImageFilter::<3>::new()
        .with_shrink_factors(2.0)
        .with_min_size(1)
        .output_geometry(&input);
    assert_eq!(geometry.size, [2, 2, 2]);
    assert_eq!(geometry.origin, Point::new([0.5, 0.5, 0.5]));
    assert_eq!(geometry.spacing, Spacing::uniform(2.0));
}

#[test]
fn test_shrink_clamps_to_min_size() {
    let input = SparseVectorImage::<f32, 3>::from_size([12, 12, 40], 1).unwrap();
    let mut filter = ShrinkSparseVectorImageFilter::<3>::new();
    filter.set_shrink_factors(4.0);
    filter.set_min_size_axis(0, 4).unwrap();
    filter.set_min_size_axis(1, 5).unwrap();
    filter.set_min_size_axis(2, 5).unwrap();
    let output = filter.update(&input).unwrap();
    // 12 / 4 = 3 < 4 and 12 / 4 = 3 < 5 are clamped; 40 / 4 = 10 is not
    assert_eq!(output.shape(), [4, 5, 10]);
}

#[test]
fn test_linear_at_exact_coordinates() {
    let mut input = SparseVectorImage::<f64, 2>::from_size([5, 5], 2).unwrap();
    input.fill_buffer(&[0.5, -0.5]).unwrap();
    input.set_pixel(&[2, 3], &[7.25, 1.0]).unwrap();
    let interpolator = LinearInterpolator;
    let bound = interpolator.bind(&input);
    for index in input.region().iter() {
        assert_eq!(bound.evaluate_at_index(&index), input.get_pixel(&index));
        assert_eq!(bound.vector_evaluate_at_index(&index), input.get_pixel(&index));
    }
}

#[test]
fn test_nearest_half_cell_threshold() {
    let mut input = SparseVectorImage::<i32, 3>::from_size([3, 3, 3], 1).unwrap();
    input.set_pixel(&[1, 1, 1], &[4]).unwrap();
    input.set_pixel(&[2, 1, 1], &[9]).unwrap();
    input.set_pixel(&[1, 2, 1], &[6]).unwrap();
    let interpolator = NearestNeighborInterpolator;
    let bound = interpolator.bind(&input);
    assert_eq!(bound.evaluate_at_continuous_index(&[1.49, 1.0, 1.0]), vec![4.0]);
    assert_eq!(bound.evaluate_at_continuous_index(&[1.51, 1.0, 1.0]), vec![9.0]);
    assert_eq!(bound.evaluate_at_continuous_index(&[1.0, 1.49, 1.0]), vec![4.0]);
    assert_eq!(bound.evaluate_at_continuous_index(&[1.0, 1.51, 1.0]), vec![6.0]);
}

#[test]
fn test_augmented_path_matches_for_all_kinds() {
    let mut input = SparseVectorImage::<f32, 3>::from_size([5, 4, 3], 3).unwrap();
    for (i, index) in input.region().iter().enumerate().collect::<Vec<_>>() {
        if i % 3 != 0 {
            let v = i as f32 * 0.37;
            input.set_pixel(&index, &[v, -v, v * v]).unwrap();
        }
    }
    let samples = [
        [0.1, 0.2, 0.3],
        [3.7, 2.2, 1.9],
        [-0.45, 3.45, 2.45],
        [4.49, 0.0, 0.5],
    ];
    for kind in [InterpolatorKind::Linear, InterpolatorKind::NearestNeighbor] {
        let bound = kind.bind(&input);
        for cindex in &samples {
            assert_eq!(
                bound.evaluate_at_continuous_index(cindex),
                bound.vector_evaluate_at_continuous_index(cindex)
            );
        }
    }
}

#[test]
fn test_translation_resample_with_start_index() {
    let mut input = SparseVectorImage::<u16, 2>::new(
        ImageRegion::new([5, 5], [4, 4]),
        ImageMetadata::default(),
        1,
    )
    .unwrap();
    input.set_pixel(&[6, 7], &[300]).unwrap();

    let filter = ResampleSparseVectorImageFilter::new_from_reference(
        &input,
        Box::new(TranslationTransform::new(Vector::new([1.0, 0.0]))),
        NearestNeighborInterpolator,
    )
    .with_number_of_workers(2)
    .with_progress_callback(Arc::new(ConsoleProgressCallback::default()));
    let output = filter.update(&input).unwrap();
    assert_eq!(output.start_index(), [5, 5]);
    assert_eq!(output.get_pixel(&[5, 7]), vec![300]);
    assert_eq!(output.get_pixel(&[6, 7]), vec![0]);
}

#[test]
fn test_affine_scaling_resample() {
    let mut input = SparseVectorImage::<f32, 2>::from_size([8, 8], 1).unwrap();
    for index in input.region().iter().collect::<Vec<_>>() {
        input.set_pixel(&index, &[index[0] as f32]).unwrap();
    }
    // output x maps to input 2x, so a linear ramp doubles
    let filter = ResampleSparseVectorImageFilter::new(
        [4, 4],
        Point::origin(),
        Spacing::uniform(1.0),
        Direction::identity(),
        Box::new(AffineTransform::scaling([2.0, 1.0], Point::origin())),
        LinearInterpolator,
    );
    let output = filter.update(&input).unwrap();
    for index in output.region().iter() {
        let value = output.get_pixel(&index)[0];
        assert!((value - 2.0 * index[0] as f32).abs() < 1e-6);
    }
}
