//! Partitioning of an output region into contiguous pieces for workers.

use crate::image::ImageRegion;

/// Splits a region along its slowest axis with extent greater than one.
///
/// Pieces are contiguous in offset order, so each covers a disjoint,
/// contiguous range of cell offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlowDimensionSplitter;

impl SlowDimensionSplitter {
    pub fn new() -> Self {
        Self
    }

    fn split_axis<const D: usize>(region: &ImageRegion<D>) -> Option<usize> {
        let size = region.size();
        (0..D).rev().find(|&axis| size[axis] > 1)
    }

    /// Number of pieces [`Self::split`] will produce.
    pub fn number_of_splits<const D: usize>(
        &self,
        region: &ImageRegion<D>,
        requested: usize,
    ) -> usize {
        let Some(axis) = Self::split_axis(region) else {
            return 1;
        };
        let extent = region.size()[axis];
        let n = requested.clamp(1, extent);
        let chunk = extent.div_ceil(n);
        extent.div_ceil(chunk)
    }

    /// Split `region` into at most `requested` pieces.
    pub fn split<const D: usize>(
        &self,
        region: &ImageRegion<D>,
        requested: usize,
    ) -> Vec<ImageRegion<D>> {
        let Some(axis) = Self::split_axis(region) else {
            return vec![*region];
        };
        let extent = region.size()[axis];
        let n = requested.clamp(1, extent);
        let chunk = extent.div_ceil(n);

        let mut pieces = Vec::with_capacity(extent.div_ceil(chunk));
        let mut start = 0usize;
        while start < extent {
            let len = chunk.min(extent - start);
            let mut index = region.index();
            let mut size = region.size();
            index[axis] += start as i64;
            size[axis] = len;
            pieces.push(ImageRegion::new(index, size));
            start += len;
        }
        tracing::debug!(
            "Split region of {} pixels into {} pieces along axis {}",
            region.number_of_pixels(),
            pieces.len(),
            axis
        );
        pieces
    }
}
