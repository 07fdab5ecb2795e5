//! Augmented indices: the vector component as a leading grid axis.
//!
//! A `K`-component image of dimension `D` is addressed as a scalar grid of
//! dimension `D + 1` whose axis 0 has extent `K`. Since axis 0 varies
//! fastest, `(k, c)` linearises to `offset(c) * K + k`, the element
//! identifier of component `k` at cell `c`.

use crate::image::{ElementIdentifier, Index, PixelComponent, SparseVectorImage};

/// A component index paired with a spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AugmentedIndex<const D: usize> {
    pub component: usize,
    pub spatial: Index<D>,
}

impl<const D: usize> AugmentedIndex<D> {
    pub fn new(component: usize, spatial: Index<D>) -> Self {
        Self { component, spatial }
    }

    /// Whether the index addresses a component of a cell inside the image.
    pub fn is_inside<T: PixelComponent>(&self, image: &SparseVectorImage<T, D>) -> bool {
        self.component < image.vector_length() && image.is_inside_buffer(&self.spatial)
    }

    /// Element identifier of this index in `image`.
    pub fn element_identifier<T: PixelComponent>(
        &self,
        image: &SparseVectorImage<T, D>,
    ) -> ElementIdentifier {
        let offset = image.compute_offset(&self.spatial) as ElementIdentifier;
        offset * image.vector_length() as ElementIdentifier + self.component as ElementIdentifier
    }

    /// Scalar value at this index, looked up by element identifier.
    ///
    /// Indices outside the image read as the fill value (zero for a
    /// component past `K`).
    pub fn read<T: PixelComponent>(&self, image: &SparseVectorImage<T, D>) -> T {
        let fill = image
            .fill_value()
            .get(self.component)
            .copied()
            .unwrap_or_else(T::zero);
        if !self.is_inside(image) {
            return fill;
        }
        image
            .container()
            .get(self.element_identifier(image))
            .unwrap_or(fill)
    }
}
