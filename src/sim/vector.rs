//! 2D vector primitives used by the physics
//!
//! Thin wrappers over `glam::Vec2` with the zero-safe semantics the
//! simulation relies on.

use glam::Vec2;

#[inline]
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    a + b
}

#[inline]
pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

#[inline]
pub fn scale(v: Vec2, k: f32) -> Vec2 {
    v * k
}

#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.dot(b)
}

#[inline]
pub fn magnitude(v: Vec2) -> f32 {
    v.length()
}

/// Unit vector along `v`, or zero when `v` has exactly zero length.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let mag = v.length();
    if mag == 0.0 { Vec2::ZERO } else { v / mag }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(normalize(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_normalize_unit_length() {
        let n = normalize(Vec2::new(3.0, 4.0));
        assert!((magnitude(n) - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_distance_and_ops() {
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(4.0, 5.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-6);
        assert_eq!(add(a, b), Vec2::new(5.0, 6.0));
        assert_eq!(sub(b, a), Vec2::new(3.0, 4.0));
        assert_eq!(scale(a, 2.5), Vec2::new(2.5, 2.5));
        assert!((dot(a, b) - 9.0).abs() < 1e-6);
    }
}
