//! Identity transform.

use super::trait_::Transform;
use crate::spatial::Point;
use serde::{Deserialize, Serialize};

/// Maps every point to itself. This is the resampler's default transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityTransform;

impl IdentityTransform {
    pub fn new() -> Self {
        Self
    }
}

impl<const D: usize> Transform<D> for IdentityTransform {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        *point
    }

    fn inverse(&self) -> Option<Box<dyn Transform<D>>> {
        Some(Box::new(IdentityTransform))
    }

    fn is_identity(&self) -> bool {
        true
    }
}
