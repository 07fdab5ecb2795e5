//! Transform types and operations.
//!
//! This module provides the transform trait and the identity, translation
//! and affine implementations used by the resample filter.

pub mod affine;
pub mod identity;
pub mod trait_;
pub mod translation;

pub use affine::AffineTransform;
pub use identity::IdentityTransform;
pub use trait_::Transform;
pub use translation::TranslationTransform;
