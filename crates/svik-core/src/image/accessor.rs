//! Pixel accessors translating cell offsets into element identifiers.
//!
//! Component `k` of the cell at offset `o` lives under `o * K + k`. A missing
//! entry reads as component `k` of the fill value.

use super::container::{ElementIdentifier, PixelMap};
use super::pixel::PixelComponent;

#[inline]
fn element_id(offset: usize, vector_length: usize, k: usize) -> ElementIdentifier {
    (offset as ElementIdentifier) * vector_length as ElementIdentifier + k as ElementIdentifier
}

/// Read-only view over a pixel map and its fill value.
#[derive(Debug, Clone, Copy)]
pub struct SparseVectorPixelAccessor<'a, T> {
    pixel_map: &'a PixelMap<T>,
    fill_value: &'a [T],
}

impl<'a, T: PixelComponent> SparseVectorPixelAccessor<'a, T> {
    pub fn new(pixel_map: &'a PixelMap<T>, fill_value: &'a [T]) -> Self {
        Self {
            pixel_map,
            fill_value,
        }
    }

    pub fn vector_length(&self) -> usize {
        self.fill_value.len()
    }

    /// Write the pixel at `offset` into `out`.
    ///
    /// `out` must hold at least `K` components.
    pub fn get(&self, offset: usize, out: &mut [T]) {
        let k_len = self.vector_length();
        for (k, slot) in out.iter_mut().take(k_len).enumerate() {
            *slot = self.get_component(offset, k);
        }
    }

    /// Component `k` of the pixel at `offset`.
    #[inline]
    pub fn get_component(&self, offset: usize, k: usize) -> T {
        let id = element_id(offset, self.vector_length(), k);
        match self.pixel_map.get(&id) {
            Some(v) => *v,
            None => self.fill_value[k],
        }
    }
}

/// Mutable view over a pixel map.
#[derive(Debug)]
pub struct SparseVectorPixelAccessorMut<'a, T> {
    pixel_map: &'a mut PixelMap<T>,
    fill_value: &'a [T],
}

impl<'a, T: PixelComponent> SparseVectorPixelAccessorMut<'a, T> {
    pub fn new(pixel_map: &'a mut PixelMap<T>, fill_value: &'a [T]) -> Self {
        Self {
            pixel_map,
            fill_value,
        }
    }

    /// Store `pixel` at `offset`.
    ///
    /// Components equal to the fill value drop their entry so the map only
    /// holds components that differ from the default.
    pub fn set(&mut self, offset: usize, pixel: &[T]) {
        let k_len = self.fill_value.len();
        for (k, value) in pixel.iter().take(k_len).enumerate() {
            self.set_component(offset, k, *value);
        }
    }

    pub fn set_component(&mut self, offset: usize, k: usize, value: T) {
        let id = element_id(offset, self.fill_value.len(), k);
        if value == self.fill_value[k] {
            self.pixel_map.remove(&id);
        } else {
            self.pixel_map.insert(id, value);
        }
    }
}
