//! Image metadata types.
//!
//! Metadata describes how grid indices map to physical coordinates:
//! `point = origin + direction * (spacing ⊙ index)`.

use crate::error::{ImageError, Result};
use crate::spatial::{Direction, Point, Spacing};
use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

/// Physical space information shared by every image of the crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata<const D: usize> {
    /// Physical coordinate of the cell at index 0.
    origin: Point<D>,
    /// Physical distance between cells along each axis.
    spacing: Spacing<D>,
    /// Orientation of the image axes.
    direction: Direction<D>,
}

impl<const D: usize> ImageMetadata<D> {
    pub fn new(origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        Self {
            origin,
            spacing,
            direction,
        }
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

    pub fn set_origin(&mut self, origin: Point<D>) {
        self.origin = origin;
    }

    pub fn set_spacing(&mut self, spacing: Spacing<D>) {
        self.spacing = spacing;
    }

    pub fn set_direction(&mut self, direction: Direction<D>) {
        self.direction = direction;
    }

    /// Builder-style origin override.
    pub fn with_origin(mut self, origin: Point<D>) -> Self {
        self.origin = origin;
        self
    }

    /// Builder-style spacing override.
    pub fn with_spacing(mut self, spacing: Spacing<D>) -> Self {
        self.spacing = spacing;
        self
    }

    /// Builder-style direction override.
    pub fn with_direction(mut self, direction: Direction<D>) -> Self {
        self.direction = direction;
        self
    }

    /// Matrix taking index offsets to physical offsets: `direction * diag(spacing)`.
    pub fn index_to_physical_matrix(&self) -> SMatrix<f64, D, D> {
        self.direction.0 * SMatrix::from_diagonal(&self.spacing.0)
    }

    /// Inverse of [`Self::index_to_physical_matrix`].
    ///
    /// Fails with `InvalidConfiguration` for non-positive spacing and with
    /// `SingularDirection` when the direction has no inverse.
    pub fn physical_to_index_matrix(&self) -> Result<SMatrix<f64, D, D>> {
        if !self.spacing.is_valid() {
            return Err(ImageError::invalid_configuration(format!(
                "spacing must be positive and finite, got {:?}",
                self.spacing.to_vec()
            )));
        }
        self.index_to_physical_matrix()
            .try_inverse()
            .ok_or(ImageError::SingularDirection)
    }
}

impl<const D: usize> Default for ImageMetadata<D> {
    fn default() -> Self {
        Self {
            origin: Point::origin(),
            spacing: Spacing::uniform(1.0),
            direction: Direction::identity(),
        }
    }
}
