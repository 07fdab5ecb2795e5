//! Multilinear interpolation.
//!
//! The `2^D` corners around a continuous index are enumerated with a bit
//! pattern: bit `b` of the counter selects the upper neighbour along axis `b`.

use super::trait_::Interpolator;
use crate::image::{ContinuousIndex, Index};
use serde::{Deserialize, Serialize};

/// Linear Interpolator.
///
/// Performs linear interpolation (bilinear for 2D, trilinear for 3D, and so
/// on for any dimension). Corners outside the buffer are skipped, so values
/// near the border are under-weighted rather than renormalised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearInterpolator;

impl LinearInterpolator {
    pub fn new() -> Self {
        Self
    }

    /// Number of corner neighbours in `D` dimensions.
    pub const fn neighbor_count<const D: usize>() -> usize {
        1 << D
    }
}

impl Interpolator for LinearInterpolator {
    fn for_each_neighbor<const D: usize>(
        &self,
        index: &ContinuousIndex<D>,
        is_inside: impl Fn(&Index<D>) -> bool,
        mut visit: impl FnMut(&Index<D>, f64),
    ) {
        let mut base = [0i64; D];
        let mut distance = [0.0f64; D];
        for dim in 0..D {
            let floor = index[dim].floor();
            base[dim] = floor as i64;
            distance[dim] = index[dim] - floor;
        }

        let mut total_overlap = 0.0;
        for counter in 0..Self::neighbor_count::<D>() {
            let mut overlap = 1.0;
            let mut upper = counter;
            let mut neighbor = base;
            for dim in 0..D {
                if upper & 1 == 1 {
                    neighbor[dim] = base[dim] + 1;
                    overlap *= distance[dim];
                } else {
                    overlap *= 1.0 - distance[dim];
                }
                upper >>= 1;
            }

            // Zero-overlap corners neither read nor count.
            if overlap != 0.0 {
                if is_inside(&neighbor) {
                    visit(&neighbor, overlap);
                }
                total_overlap += overlap;
            }

            if total_overlap == 1.0 {
                break;
            }
        }
    }
}
