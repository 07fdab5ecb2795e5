//! Rectangular grid regions and linear offsets.
//!
//! A region is a start index plus a per-axis extent. Cells are linearised
//! with axis 0 varying fastest; offsets are relative to the region start.

/// Discrete grid index.
pub type Index<const D: usize> = [i64; D];

/// Real-valued grid coordinate.
pub type ContinuousIndex<const D: usize> = [f64; D];

/// Rectangular block of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRegion<const D: usize> {
    index: Index<D>,
    size: [usize; D],
}

impl<const D: usize> ImageRegion<D> {
    pub fn new(index: Index<D>, size: [usize; D]) -> Self {
        Self { index, size }
    }

    /// Region starting at the zero index.
    pub fn from_size(size: [usize; D]) -> Self {
        Self {
            index: [0; D],
            size,
        }
    }

    /// Start index.
    pub fn index(&self) -> Index<D> {
        self.index
    }

    /// Per-axis extent.
    pub fn size(&self) -> [usize; D] {
        self.size
    }

    /// Cell count; saturates at `usize::MAX`.
    pub fn number_of_pixels(&self) -> usize {
        self.checked_number_of_pixels().unwrap_or(usize::MAX)
    }

    /// Cell count, or `None` if it does not fit in `usize`.
    pub fn checked_number_of_pixels(&self) -> Option<usize> {
        if self.is_empty() {
            return Some(0);
        }
        self.size.iter().try_fold(1usize, |acc, &s| acc.checked_mul(s))
    }

    pub fn is_empty(&self) -> bool {
        self.size.contains(&0)
    }

    /// Whether a discrete index lies inside the region.
    pub fn is_inside(&self, index: &Index<D>) -> bool {
        (0..D).all(|i| {
            let rel = index[i] - self.index[i];
            rel >= 0 && (rel as u64) < self.size[i] as u64
        })
    }

    /// Whether `other` lies completely inside this region.
    pub fn contains_region(&self, other: &ImageRegion<D>) -> bool {
        if other.is_empty() {
            return true;
        }
        (0..D).all(|i| {
            let start = other.index[i] - self.index[i];
            start >= 0 && start as usize + other.size[i] <= self.size[i]
        })
    }

    /// Stride table for this region's extent.
    pub fn offset_table(&self) -> OffsetTable<D> {
        OffsetTable::new(self.size)
    }

    /// Iterate over every index of the region, axis 0 fastest.
    pub fn iter(&self) -> RegionIndexIter<D> {
        RegionIndexIter {
            region: *self,
            current: self.index,
            remaining: self.number_of_pixels(),
        }
    }
}

impl<const D: usize> IntoIterator for &ImageRegion<D> {
    type Item = Index<D>;
    type IntoIter = RegionIndexIter<D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the indices of a region.
#[derive(Debug, Clone)]
pub struct RegionIndexIter<const D: usize> {
    region: ImageRegion<D>,
    current: Index<D>,
    remaining: usize,
}

impl<const D: usize> Iterator for RegionIndexIter<D> {
    type Item = Index<D>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let out = self.current;
        self.remaining -= 1;
        for axis in 0..D {
            self.current[axis] += 1;
            if self.current[axis] < self.region.index[axis] + self.region.size[axis] as i64 {
                break;
            }
            self.current[axis] = self.region.index[axis];
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const D: usize> ExactSizeIterator for RegionIndexIter<D> {}

/// Per-axis strides of a grid, built once when its extent is known.
///
/// `strides[0] == 1` and `strides[i] == strides[i - 1] * size[i - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTable<const D: usize> {
    strides: [usize; D],
    total: usize,
}

impl<const D: usize> OffsetTable<D> {
    /// Strides saturate at `usize::MAX` when the extent is too large;
    /// [`Self::try_new`] reports that case instead.
    pub fn new(size: [usize; D]) -> Self {
        let mut strides = [0usize; D];
        let mut acc = 1usize;
        for i in 0..D {
            strides[i] = acc;
            acc = acc.saturating_mul(size[i]);
        }
        Self {
            strides,
            total: acc,
        }
    }

    /// Stride table, or `None` if the cell count overflows `usize`.
    pub fn try_new(size: [usize; D]) -> Option<Self> {
        let mut strides = [0usize; D];
        let mut acc = 1usize;
        for i in 0..D {
            strides[i] = acc;
            acc = acc.checked_mul(size[i])?;
        }
        Some(Self {
            strides,
            total: acc,
        })
    }

    pub fn strides(&self) -> [usize; D] {
        self.strides
    }

    /// Number of cells covered by the table.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Linear offset of `index` relative to `start`.
    ///
    /// The index must lie inside the region the table was built for.
    pub fn compute_offset(&self, start: &Index<D>, index: &Index<D>) -> usize {
        let mut offset = 0usize;
        for i in 0..D {
            offset += (index[i] - start[i]) as usize * self.strides[i];
        }
        offset
    }

    /// Inverse of [`Self::compute_offset`].
    pub fn compute_index(&self, start: &Index<D>, offset: usize) -> Index<D> {
        let mut index = *start;
        let mut rest = offset;
        for i in (0..D).rev() {
            let stride = self.strides[i].max(1);
            index[i] += (rest / stride) as i64;
            rest %= stride;
        }
        index
    }
}
