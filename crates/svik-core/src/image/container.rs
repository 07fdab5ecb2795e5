//! Storage for the explicitly stored components of a sparse vector image.
//!
//! Keys are "element identifiers": `cell_offset * K + k` for component `k`
//! of the cell at linear offset `cell_offset`.

use ahash::AHashMap;

/// Identifier of one component of one cell.
pub type ElementIdentifier = u64;

/// Map from element identifier to stored component value.
pub type PixelMap<T> = AHashMap<ElementIdentifier, T>;

/// Owner of the pixel map.
#[derive(Debug, Clone, Default)]
pub struct SparseVectorImageContainer<T> {
    pixel_map: PixelMap<T>,
}

impl<T: Copy> SparseVectorImageContainer<T> {
    pub fn new() -> Self {
        Self {
            pixel_map: PixelMap::default(),
        }
    }

    /// Number of explicitly stored components.
    pub fn size(&self) -> usize {
        self.pixel_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_map.is_empty()
    }

    /// No-op; the map grows on demand.
    pub fn reserve(&mut self) {}

    /// No-op; the map is never shrunk explicitly.
    pub fn squeeze(&mut self) {}

    /// Drop every stored entry.
    pub fn initialize(&mut self) {
        self.pixel_map.clear();
    }

    pub fn pixel_map(&self) -> &PixelMap<T> {
        &self.pixel_map
    }

    pub fn pixel_map_mut(&mut self) -> &mut PixelMap<T> {
        &mut self.pixel_map
    }

    pub fn get(&self, id: ElementIdentifier) -> Option<T> {
        self.pixel_map.get(&id).copied()
    }

    pub fn insert(&mut self, id: ElementIdentifier, value: T) {
        self.pixel_map.insert(id, value);
    }

    pub fn remove(&mut self, id: ElementIdentifier) -> Option<T> {
        self.pixel_map.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementIdentifier, T)> + '_ {
        self.pixel_map.iter().map(|(k, v)| (*k, *v))
    }

    /// Entries in ascending identifier order.
    pub fn sorted_entries(&self) -> Vec<(ElementIdentifier, T)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries
    }

    /// Move every entry of `other` into this container.
    ///
    /// Entries of `other` overwrite entries with the same identifier.
    pub fn absorb(&mut self, other: SparseVectorImageContainer<T>) {
        self.pixel_map.extend(other.pixel_map);
    }
}
