use proptest::prelude::*;
use svik_core::image::{ImageRegion, SparseVectorImage};

fn image() -> SparseVectorImage<f32, 3> {
    SparseVectorImage::from_size([4, 4, 4], 3).unwrap()
}

#[test]
fn test_unset_cells_read_default_everywhere() {
    let mut img = image();
    img.set_pixel(&[1, 1, 1], &[1.0, 2.0, 3.0]).unwrap();
    img.fill_buffer(&[0.5, 0.25, -1.0]).unwrap();
    for index in ImageRegion::from_size([4, 4, 4]).iter() {
        assert_eq!(img.get_pixel(&index), vec![0.5, 0.25, -1.0]);
    }
    assert_eq!(img.entry_count(), 0);
}

#[test]
fn test_fill_buffer_then_set() {
    let mut img = image();
    img.fill_buffer(&[1.0, 1.0, 1.0]).unwrap();
    // components equal to the default stay implicit
    img.set_pixel(&[0, 0, 0], &[1.0, 0.0, 2.0]).unwrap();
    assert_eq!(img.entry_count(), 2);
    assert_eq!(img.get_pixel(&[0, 0, 0]), vec![1.0, 0.0, 2.0]);
    assert_eq!(img.get_pixel(&[0, 0, 1]), vec![1.0, 1.0, 1.0]);
}

#[test]
fn test_zero_overwrite_deletes_stale_entry() {
    let mut img = SparseVectorImage::<f32, 3>::from_size([4, 4, 4], 1).unwrap();
    img.set_pixel(&[3, 2, 1], &[5.0]).unwrap();
    assert_eq!(img.get_pixel(&[3, 2, 1]), vec![5.0]);
    img.set_pixel(&[3, 2, 1], &[0.0]).unwrap();
    assert_eq!(img.get_pixel(&[3, 2, 1]), vec![0.0]);
    assert_eq!(img.entry_count(), 0);
}

#[test]
fn test_keys_stay_in_range() {
    let mut img = image();
    let region = *img.region();
    for (i, index) in region.iter().enumerate() {
        if i % 7 == 0 {
            img.set_pixel(&index, &[1.0, 2.0, 3.0]).unwrap();
        }
    }
    let limit = (img.number_of_pixels() * img.vector_length()) as u64;
    assert!(img.container().iter().all(|(key, _)| key < limit));
}

proptest! {
    #[test]
    fn test_set_nonzero_then_get(
        x in 0i64..4, y in 0i64..4, z in 0i64..4,
        a in 1.0f32..100.0, b in -100.0f32..-1.0, c in 0.5f32..2.0,
    ) {
        let mut img = image();
        img.set_pixel(&[x, y, z], &[a, b, c]).unwrap();
        prop_assert_eq!(img.get_pixel(&[x, y, z]), vec![a, b, c]);
        prop_assert_eq!(img.entry_count(), 3);
        for k in 0..3 {
            prop_assert_eq!(img.get_component(&[x, y, z], k), [a, b, c][k]);
        }
    }
}
