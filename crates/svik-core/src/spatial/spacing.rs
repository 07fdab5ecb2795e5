//! Spacing type for representing physical distances between grid cells.

use super::Vector;

/// Spacing between adjacent cells along each axis.
///
/// This is a type alias to Vector for semantic clarity.
pub type Spacing<const D: usize> = Vector<D>;

impl<const D: usize> Spacing<D> {
    /// Create uniform spacing (same value for all dimensions).
    pub fn uniform(value: f64) -> Self {
        Self::new([value; D])
    }

    /// Check that every component is strictly positive and finite.
    pub fn is_valid(&self) -> bool {
        (0..D).all(|i| self[i].is_finite() && self[i] > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Spacing3 = Spacing<3>;

    #[test]
    fn test_spacing_uniform() {
        assert_eq!(Spacing3::uniform(1.0), Spacing3::new([1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_spacing_validity() {
        assert!(Spacing3::new([0.5, 1.0, 2.0]).is_valid());
        assert!(!Spacing3::new([0.0, 1.0, 2.0]).is_valid());
        assert!(!Spacing3::new([1.0, f64::NAN, 2.0]).is_valid());
    }
}
