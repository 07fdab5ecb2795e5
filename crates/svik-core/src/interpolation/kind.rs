//! Runtime selection of an interpolator.

use super::linear::LinearInterpolator;
use super::nearest::NearestNeighborInterpolator;
use super::trait_::Interpolator;
use crate::image::{ContinuousIndex, Index};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interpolation method chosen from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolatorKind {
    NearestNeighbor,
    #[default]
    Linear,
}

impl Interpolator for InterpolatorKind {
    fn for_each_neighbor<const D: usize>(
        &self,
        index: &ContinuousIndex<D>,
        is_inside: impl Fn(&Index<D>) -> bool,
        visit: impl FnMut(&Index<D>, f64),
    ) {
        match self {
            Self::NearestNeighbor => {
                NearestNeighborInterpolator.for_each_neighbor(index, is_inside, visit)
            }
            Self::Linear => LinearInterpolator.for_each_neighbor(index, is_inside, visit),
        }
    }
}

impl fmt::Display for InterpolatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NearestNeighbor => write!(f, "nearest_neighbor"),
            Self::Linear => write!(f, "linear"),
        }
    }
}

impl FromStr for InterpolatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nearest_neighbor" => Ok(Self::NearestNeighbor),
            "linear" => Ok(Self::Linear),
            other => Err(format!("unknown interpolator '{}'", other)),
        }
    }
}
