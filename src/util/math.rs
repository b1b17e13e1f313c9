//! Math type re-exports and small float helpers.
//!
//! Positions and rotations in the archive are plain `f32` triples; they are
//! held as `glam::Vec3`. Equality and hashing of stored values go through the
//! bit pattern so that pooled values compare the same way they encode.

pub use glam::Vec3;

use std::hash::{Hash, Hasher};

/// Bitwise float equality (`NaN == NaN`, `0.0 != -0.0`).
#[inline]
pub fn f32_bits_eq(a: f32, b: f32) -> bool {
    a.to_bits() == b.to_bits()
}

/// Bitwise equality of two vectors.
#[inline]
pub fn vec3_bits_eq(a: Vec3, b: Vec3) -> bool {
    f32_bits_eq(a.x, b.x) && f32_bits_eq(a.y, b.y) && f32_bits_eq(a.z, b.z)
}

/// Hash a vector by its bit pattern.
#[inline]
pub fn hash_vec3<H: Hasher>(v: Vec3, state: &mut H) {
    v.x.to_bits().hash(state);
    v.y.to_bits().hash(state);
    v.z.to_bits().hash(state);
}
