//! Affine transform implementation.
//!
//! This module provides an affine transform (linear transformation + translation).

use super::trait_::Transform;
use crate::spatial::{Point, Vector};
use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

/// Affine Transform (Linear transformation + Translation).
///
/// Represents a general affine transformation with a fixed center:
/// T(x) = A(x - c) + c + t
///
/// where:
/// * A is a D×D matrix (linear transformation: rotation, scale, shear)
/// * t is a D-dimensional translation vector
/// * c is a D-dimensional fixed center of rotation/scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform<const D: usize> {
    matrix: SMatrix<f64, D, D>,
    translation: Vector<D>,
    center: Point<D>,
}

impl<const D: usize> AffineTransform<D> {
    pub fn new(matrix: SMatrix<f64, D, D>, translation: Vector<D>, center: Point<D>) -> Self {
        Self {
            matrix,
            translation,
            center,
        }
    }

    /// Create an identity affine transform centered at `center` (origin if None).
    pub fn identity(center: Option<Point<D>>) -> Self {
        Self::new(
            SMatrix::identity(),
            Vector::zeros(),
            center.unwrap_or_else(Point::origin),
        )
    }

    /// Pure scaling about `center`.
    pub fn scaling(factors: [f64; D], center: Point<D>) -> Self {
        let diag = nalgebra::SVector::<f64, D>::from(factors);
        Self::new(SMatrix::from_diagonal(&diag), Vector::zeros(), center)
    }

    pub fn matrix(&self) -> &SMatrix<f64, D, D> {
        &self.matrix
    }

    pub fn translation(&self) -> &Vector<D> {
        &self.translation
    }

    pub fn center(&self) -> &Point<D> {
        &self.center
    }

    /// Offset `c + t - A c`, so that `T(x) = A x + offset`.
    pub fn offset(&self) -> Vector<D> {
        let c = self.center.0.coords;
        Vector(c + self.translation.0 - self.matrix * c)
    }

    /// Apply the transform to a `[Batch, D]` tensor of points.
    pub fn transform_tensor<B: Backend>(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = points.device();
        let to_row = |v: Vec<f64>| {
            let values: Vec<f32> = v.into_iter().map(|x| x as f32).collect();
            Tensor::<B, 2>::from_data(TensorData::new(values, Shape::new([1, D])), &device)
        };
        let mut a_values = Vec::with_capacity(D * D);
        for r in 0..D {
            for c in 0..D {
                a_values.push(self.matrix[(r, c)] as f32);
            }
        }
        let a = Tensor::<B, 2>::from_data(TensorData::new(a_values, Shape::new([D, D])), &device);
        let c = to_row(self.center.to_vec());
        let t = to_row(self.translation.to_vec());

        // Row vectors: y = (x - c) A^T + c + t
        (points - c.clone()).matmul(a.transpose()) + c + t
    }
}

impl<const D: usize> Transform<D> for AffineTransform<D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        let centered = point.0.coords - self.center.0.coords;
        let mapped = self.matrix * centered + self.center.0.coords + self.translation.0;
        Point(mapped.into())
    }

    fn inverse(&self) -> Option<Box<dyn Transform<D>>> {
        let inv = self.matrix.try_inverse()?;
        let translation = Vector(-(inv * self.translation.0));
        Some(Box::new(Self::new(inv, translation, self.center)))
    }

    fn is_identity(&self) -> bool {
        self.matrix == SMatrix::<f64, D, D>::identity()
            && (0..D).all(|i| self.translation[i] == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn rotation_90() -> SMatrix<f64, 2, 2> {
        SMatrix::<f64, 2, 2>::from_row_slice(&[0.0, -1.0, 1.0, 0.0])
    }

    #[test]
    fn test_affine_transform_identity() {
        let transform = AffineTransform::<3>::identity(None);
        let p = Point::new([1.0, 2.0, 3.0]);
        assert_eq!(transform.transform_point(&p), p);
        assert!(transform.is_identity());
        assert!(!AffineTransform::scaling([2.0, 1.0, 1.0], Point::origin()).is_identity());
    }

    #[test]
    fn test_affine_rotation_about_center() {
        let transform = AffineTransform::new(
            rotation_90(),
            Vector::new([0.0, 0.0]),
            Point::new([1.0, 1.0]),
        );
        let p = transform.transform_point(&Point::new([2.0, 1.0]));
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_affine_inverse() {
        let transform = AffineTransform::new(
            rotation_90() * 2.0,
            Vector::new([0.5, -1.5]),
            Point::new([3.0, -1.0]),
        );
        let p = Point::new([0.25, 7.0]);
        let q = transform.transform_point(&p);
        let back = transform.inverse().unwrap().transform_point(&q);
        assert!((back[0] - p[0]).abs() < 1e-12);
        assert!((back[1] - p[1]).abs() < 1e-12);

        let singular =
            AffineTransform::<2>::new(SMatrix::zeros(), Vector::zeros(), Point::origin());
        assert!(singular.inverse().is_none());
    }

    #[test]
    fn test_affine_offset_form() {
        let transform = AffineTransform::scaling([2.0, 0.5], Point::new([1.0, 4.0]));
        let p = Point::new([3.0, 2.0]);
        let q = transform.transform_point(&p);
        let offset = transform.offset();
        let r = transform.matrix() * p.0.coords + offset.0;
        assert!((q[0] - r[0]).abs() < 1e-12);
        assert!((q[1] - r[1]).abs() < 1e-12);
    }

    #[test]
    fn test_affine_tensor_matches_points() {
        let device = Default::default();
        let transform = AffineTransform::new(
            rotation_90(),
            Vector::new([1.0, 1.0]),
            Point::new([0.5, 0.5]),
        );
        let points = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0], [-3.0, 0.0]], &device);
        let out = transform.transform_tensor(points);
        let data = out.into_data();
        let slice = data.as_slice::<f32>().unwrap();

        let expected = [
            transform.transform_point(&Point::new([1.0, 2.0])),
            transform.transform_point(&Point::new([-3.0, 0.0])),
        ];
        for (i, p) in expected.iter().enumerate() {
            assert!((slice[2 * i] as f64 - p[0]).abs() < 1e-5);
            assert!((slice[2 * i + 1] as f64 - p[1]).abs() < 1e-5);
        }
    }
}
