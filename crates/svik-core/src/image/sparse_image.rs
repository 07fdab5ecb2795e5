//! Sparse vector image.
//!
//! Every cell holds a vector of `K` components. Only components that differ
//! from the fill value are stored; everything else reads as the fill value.

use super::accessor::{SparseVectorPixelAccessor, SparseVectorPixelAccessorMut};
use super::container::{ElementIdentifier, SparseVectorImageContainer};
use super::metadata::ImageMetadata;
use super::pixel::PixelComponent;
use super::region::{ContinuousIndex, ImageRegion, Index, OffsetTable};
use crate::error::{ImageError, Result};
use crate::spatial::{Direction, Point, Spacing, Vector};
use nalgebra::{SMatrix, SVector};

/// N-dimensional image of fixed-length vectors with sparse storage.
///
/// Geometry (region, origin, spacing, direction) and the vector length are
/// fixed at construction. The pixel map starts empty.
#[derive(Debug, Clone)]
pub struct SparseVectorImage<T: PixelComponent, const D: usize> {
    region: ImageRegion<D>,
    metadata: ImageMetadata<D>,
    vector_length: usize,
    offset_table: OffsetTable<D>,
    index_to_physical: SMatrix<f64, D, D>,
    physical_to_index: SMatrix<f64, D, D>,
    fill_value: Vec<T>,
    container: SparseVectorImageContainer<T>,
}

impl<T: PixelComponent, const D: usize> SparseVectorImage<T, D> {
    /// Create an allocated, empty image filled with zeros.
    ///
    /// # Errors
    /// - `InvalidConfiguration` if `vector_length` is zero, spacing is not
    ///   positive, or `cells * vector_length` does not fit in `usize`
    /// - `SingularDirection` if the direction matrix has no inverse
    pub fn new(
        region: ImageRegion<D>,
        metadata: ImageMetadata<D>,
        vector_length: usize,
    ) -> Result<Self> {
        if vector_length == 0 {
            return Err(ImageError::invalid_configuration(
                "vector length must be at least 1",
            ));
        }
        let offset_table = Self::checked_offset_table(&region, vector_length)?;
        let physical_to_index = metadata.physical_to_index_matrix()?;
        let mut image = Self {
            region,
            index_to_physical: metadata.index_to_physical_matrix(),
            physical_to_index,
            metadata,
            vector_length,
            offset_table,
            fill_value: vec![T::zero(); vector_length],
            container: SparseVectorImageContainer::new(),
        };
        image.allocate();
        Ok(image)
    }

    fn checked_offset_table(
        region: &ImageRegion<D>,
        vector_length: usize,
    ) -> Result<OffsetTable<D>> {
        let too_large = || {
            ImageError::invalid_configuration(format!(
                "region of size {:?} with {} components is too large",
                region.size(),
                vector_length
            ))
        };
        if region.size().iter().any(|&s| s > i64::MAX as usize) {
            return Err(too_large());
        }
        let table = OffsetTable::try_new(region.size()).ok_or_else(too_large)?;
        table.total().checked_mul(vector_length).ok_or_else(too_large)?;
        Ok(table)
    }

    /// Image at the zero index with unit spacing, zero origin and identity direction.
    pub fn from_size(size: [usize; D], vector_length: usize) -> Result<Self> {
        Self::new(
            ImageRegion::from_size(size),
            ImageMetadata::default(),
            vector_length,
        )
    }

    /// Empty image sharing this image's geometry, vector length and fill value.
    pub fn empty_like(&self) -> Self {
        Self {
            region: self.region,
            metadata: self.metadata.clone(),
            vector_length: self.vector_length,
            offset_table: self.offset_table,
            index_to_physical: self.index_to_physical,
            physical_to_index: self.physical_to_index,
            fill_value: self.fill_value.clone(),
            container: SparseVectorImageContainer::new(),
        }
    }

    /// Finalise the stride table for the current region.
    ///
    /// The pixel map is not pre-populated.
    pub fn allocate(&mut self) {
        self.offset_table = self.region.offset_table();
        self.container.reserve();
    }

    /// Replace the container with a fresh, empty one.
    pub fn initialize(&mut self) {
        self.container = SparseVectorImageContainer::new();
    }

    /// Change the region and reallocate. Stored entries are dropped.
    pub fn set_region(&mut self, region: ImageRegion<D>) -> Result<()> {
        Self::checked_offset_table(&region, self.vector_length)?;
        self.region = region;
        self.initialize();
        self.allocate();
        Ok(())
    }

    pub fn region(&self) -> &ImageRegion<D> {
        &self.region
    }

    /// Per-axis extent.
    pub fn shape(&self) -> [usize; D] {
        self.region.size()
    }

    pub fn start_index(&self) -> Index<D> {
        self.region.index()
    }

    pub fn metadata(&self) -> &ImageMetadata<D> {
        &self.metadata
    }

    pub fn origin(&self) -> &Point<D> {
        self.metadata.origin()
    }

    pub fn spacing(&self) -> &Spacing<D> {
        self.metadata.spacing()
    }

    pub fn direction(&self) -> &Direction<D> {
        self.metadata.direction()
    }

    /// Components per cell (`K`).
    pub fn vector_length(&self) -> usize {
        self.vector_length
    }

    /// Number of addressable cells.
    pub fn number_of_pixels(&self) -> usize {
        self.offset_table.total()
    }

    pub fn offset_table(&self) -> &OffsetTable<D> {
        &self.offset_table
    }

    /// Value returned for components without an explicit entry.
    pub fn fill_value(&self) -> &[T] {
        &self.fill_value
    }

    pub fn container(&self) -> &SparseVectorImageContainer<T> {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut SparseVectorImageContainer<T> {
        &mut self.container
    }

    /// Number of explicitly stored components, not the number of cells.
    pub fn entry_count(&self) -> usize {
        self.container.size()
    }

    pub fn pixel_accessor(&self) -> SparseVectorPixelAccessor<'_, T> {
        SparseVectorPixelAccessor::new(self.container.pixel_map(), &self.fill_value)
    }

    pub fn pixel_accessor_mut(&mut self) -> SparseVectorPixelAccessorMut<'_, T> {
        SparseVectorPixelAccessorMut::new(self.container.pixel_map_mut(), &self.fill_value)
    }

    /// Linear offset of an index inside the region.
    pub fn compute_offset(&self, index: &Index<D>) -> usize {
        self.offset_table.compute_offset(&self.region.index(), index)
    }

    pub fn compute_index(&self, offset: usize) -> Index<D> {
        self.offset_table.compute_index(&self.region.index(), offset)
    }

    pub fn is_inside_buffer(&self, index: &Index<D>) -> bool {
        self.region.is_inside(index)
    }

    /// Pixel at `index`. Indices outside the region read as the fill value.
    pub fn get_pixel(&self, index: &Index<D>) -> Vec<T> {
        let mut out = vec![T::zero(); self.vector_length];
        self.get_pixel_into(index, &mut out);
        out
    }

    /// Write the pixel at `index` into `out`, which must hold `K` components.
    pub fn get_pixel_into(&self, index: &Index<D>, out: &mut [T]) {
        if !self.region.is_inside(index) {
            for (slot, fill) in out.iter_mut().zip(&self.fill_value) {
                *slot = *fill;
            }
            return;
        }
        self.pixel_accessor().get(self.compute_offset(index), out);
    }

    /// Component `k` of the pixel at `index`.
    ///
    /// Panics if `k >= K`.
    pub fn get_component(&self, index: &Index<D>, k: usize) -> T {
        if !self.region.is_inside(index) {
            return self.fill_value[k];
        }
        self.pixel_accessor().get_component(self.compute_offset(index), k)
    }

    /// Store a pixel.
    ///
    /// Components equal to the current fill value remove their entry, so
    /// writing the default over an explicit value restores the default.
    pub fn set_pixel(&mut self, index: &Index<D>, pixel: &[T]) -> Result<()> {
        ImageError::check_vector_length(self.vector_length, pixel.len())?;
        if !self.region.is_inside(index) {
            return Err(ImageError::IndexOutOfRegion {
                index: index.to_vec(),
            });
        }
        let offset = self.compute_offset(index);
        self.pixel_accessor_mut().set(offset, pixel);
        Ok(())
    }

    /// Set the fill value and drop every explicit entry.
    pub fn fill_buffer(&mut self, value: &[T]) -> Result<()> {
        ImageError::check_vector_length(self.vector_length, value.len())?;
        self.fill_value.clear();
        self.fill_value.extend_from_slice(value);
        self.container.initialize();
        Ok(())
    }

    /// Insert a raw entry under its element identifier.
    ///
    /// Used when restoring a pixel map from storage.
    pub fn insert_element(&mut self, id: ElementIdentifier, value: T) -> Result<()> {
        let capacity = self
            .number_of_pixels()
            .checked_mul(self.vector_length)
            .map_or(u64::MAX, |c| c as u64);
        if id >= capacity {
            return Err(ImageError::ElementOutOfRange { id, capacity });
        }
        self.container.insert(id, value);
        Ok(())
    }

    /// Move every explicit entry of `other` into this image.
    pub(crate) fn absorb(&mut self, other: SparseVectorImage<T, D>) {
        self.container.absorb(other.container);
    }

    /// Physical location of a discrete index.
    pub fn transform_index_to_physical_point(&self, index: &Index<D>) -> Point<D> {
        let cindex: ContinuousIndex<D> = std::array::from_fn(|i| index[i] as f64);
        self.transform_continuous_index_to_physical_point(&cindex)
    }

    /// `origin + direction * (spacing ⊙ index)`.
    pub fn transform_continuous_index_to_physical_point(
        &self,
        index: &ContinuousIndex<D>,
    ) -> Point<D> {
        let offset = self.index_to_physical * SVector::<f64, D>::from(*index);
        *self.origin() + Vector(offset)
    }

    pub fn transform_physical_point_to_continuous_index(
        &self,
        point: &Point<D>,
    ) -> ContinuousIndex<D> {
        let diff = *point - *self.origin();
        let cindex = self.physical_to_index * diff.0;
        std::array::from_fn(|i| cindex[i])
    }

    /// Nearest discrete index of a physical point, rounding halves up.
    pub fn transform_physical_point_to_index(&self, point: &Point<D>) -> Index<D> {
        let cindex = self.transform_physical_point_to_continuous_index(point);
        std::array::from_fn(|i| (cindex[i] + 0.5).floor() as i64)
    }
}
