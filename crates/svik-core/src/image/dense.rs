//! Conversion between sparse vector images and dense burn tensors.
//!
//! Dense layouts follow the cell offset order: axis 0 varies fastest, so a
//! per-component volume has shape `[size[D-1], ..., size[0]]`.

use super::metadata::ImageMetadata;
use super::pixel::PixelComponent;
use super::region::ImageRegion;
use super::sparse_image::SparseVectorImage;
use crate::error::{ImageError, Result};
use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};

impl<T: PixelComponent, const D: usize> SparseVectorImage<T, D> {
    /// Dense copy of every cell as a `[cells, K]` tensor.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let n = self.number_of_pixels();
        let k_len = self.vector_length();
        let accessor = self.pixel_accessor();
        let mut values = Vec::with_capacity(n * k_len);
        for offset in 0..n {
            for k in 0..k_len {
                values.push(accessor.get_component(offset, k).to_real() as f32);
            }
        }
        Tensor::from_data(TensorData::new(values, Shape::new([n, k_len])), device)
    }

    /// Dense volume of component `k`, slowest axis first.
    pub fn component_volume<B: Backend>(
        &self,
        k: usize,
        device: &B::Device,
    ) -> Result<Tensor<B, D>> {
        if k >= self.vector_length() {
            return Err(ImageError::invalid_configuration(format!(
                "component {} out of range for vector length {}",
                k,
                self.vector_length()
            )));
        }
        let accessor = self.pixel_accessor();
        let values: Vec<f32> = (0..self.number_of_pixels())
            .map(|offset| accessor.get_component(offset, k).to_real() as f32)
            .collect();
        let size = self.shape();
        let dims: [usize; D] = std::array::from_fn(|i| size[D - 1 - i]);
        Ok(Tensor::from_data(
            TensorData::new(values, Shape::new(dims)),
            device,
        ))
    }

    /// Build a sparse image from a `[cells, K]` tensor.
    ///
    /// Values are cast with clamping; components equal to zero stay implicit.
    pub fn from_tensor<B: Backend>(
        tensor: Tensor<B, 2>,
        region: ImageRegion<D>,
        metadata: ImageMetadata<D>,
    ) -> Result<Self> {
        let [n, k_len] = tensor.dims();
        if n != region.number_of_pixels() {
            return Err(ImageError::ShapeMismatch {
                expected: vec![region.number_of_pixels(), k_len],
                actual: vec![n, k_len],
            });
        }
        let mut image = Self::new(region, metadata, k_len)?;

        let data = tensor.into_data().convert::<f32>();
        let values = data
            .as_slice::<f32>()
            .map_err(|e| ImageError::TensorData(format!("{:?}", e)))?;

        let mut pixel = vec![T::zero(); k_len];
        let mut accessor = image.pixel_accessor_mut();
        for (offset, chunk) in values.chunks_exact(k_len).enumerate() {
            for (slot, v) in pixel.iter_mut().zip(chunk) {
                *slot = T::cast_with_bounds(*v as f64);
            }
            accessor.set(offset, &pixel);
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_to_tensor_layout() {
        let device = Default::default();
        let mut image = SparseVectorImage::<f32, 2>::from_size([3, 2], 2).unwrap();
        image.set_pixel(&[1, 1], &[5.0, -1.0]).unwrap();
        let tensor = image.to_tensor::<B>(&device);
        assert_eq!(tensor.dims(), [6, 2]);
        let data = tensor.into_data();
        let values = data.as_slice::<f32>().unwrap();
        // offset of (1, 1) is 4
        assert_eq!(values[8], 5.0);
        assert_eq!(values[9], -1.0);
        assert_eq!(values.iter().filter(|v| **v != 0.0).count(), 2);
    }

    #[test]
    fn test_from_tensor_keeps_zeros_implicit() {
        let device = Default::default();
        let values = vec![0.0f32, 1.0, 0.0, 0.0, 2.0, 3.0];
        let tensor =
            Tensor::<B, 2>::from_data(TensorData::new(values, Shape::new([3, 2])), &device);
        let image = SparseVectorImage::<f32, 1>::from_tensor(
            tensor,
            ImageRegion::from_size([3]),
            ImageMetadata::default(),
        )
        .unwrap();
        assert_eq!(image.entry_count(), 3);
        assert_eq!(image.get_pixel(&[0]), vec![0.0, 1.0]);
        assert_eq!(image.get_pixel(&[2]), vec![2.0, 3.0]);
    }

    #[test]
    fn test_from_tensor_shape_mismatch() {
        let device = Default::default();
        let tensor = Tensor::<B, 2>::zeros([5, 1], &device);
        let result = SparseVectorImage::<f32, 2>::from_tensor(
            tensor,
            ImageRegion::from_size([2, 2]),
            ImageMetadata::default(),
        );
        assert!(matches!(result, Err(ImageError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_component_volume_shape() {
        let device = Default::default();
        let mut image = SparseVectorImage::<u8, 3>::from_size([4, 3, 2], 2).unwrap();
        image.set_pixel(&[3, 0, 1], &[0, 200]).unwrap();
        let volume = image.component_volume::<B>(1, &device).unwrap();
        assert_eq!(volume.dims(), [2, 3, 4]);
        let data = volume.into_data();
        let values = data.as_slice::<f32>().unwrap();
        assert_eq!(values[12 + 3], 200.0);
        assert!(image.component_volume::<B>(2, &device).is_err());
    }
}
