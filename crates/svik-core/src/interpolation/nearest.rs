//! Nearest neighbor interpolation.

use super::trait_::Interpolator;
use crate::image::{ContinuousIndex, Index};
use serde::{Deserialize, Serialize};

/// Nearest Neighbor Interpolator.
///
/// Rounds every coordinate half up (`floor(x + 0.5)`) and reads that cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearestNeighborInterpolator;

impl NearestNeighborInterpolator {
    pub fn new() -> Self {
        Self
    }

    /// Nearest discrete index of a continuous index.
    pub fn round<const D: usize>(index: &ContinuousIndex<D>) -> Index<D> {
        std::array::from_fn(|i| (index[i] + 0.5).floor() as i64)
    }
}

impl Interpolator for NearestNeighborInterpolator {
    fn for_each_neighbor<const D: usize>(
        &self,
        index: &ContinuousIndex<D>,
        is_inside: impl Fn(&Index<D>) -> bool,
        mut visit: impl FnMut(&Index<D>, f64),
    ) {
        let nearest = Self::round(index);
        if is_inside(&nearest) {
            visit(&nearest, 1.0);
        }
    }
}
