use crate::{geometry::Ray, Pos};

/// Tolerance for parallel-ray rejection and the minimum accepted hit
/// distance.
pub const EPSILON: f32 = 1e-7;

/// Möller-Trumbore ray/triangle intersection. Returns the distance along
/// the ray, required to be strictly positive beyond [`EPSILON`] so hits at
/// or behind the origin are rejected. Degenerate (zero-area) triangles fall
/// out through the determinant check.
pub fn intersect(ray: &Ray, v0: Pos, v1: Pos, v2: Pos) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(&edge2);
    let det = edge1.dot(&h);
    if det.abs() < EPSILON {
        return None; // ray parallel to the triangle plane
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    (t > EPSILON).then_some(t)
}

/// Squared distance from `point` to the segment `a..b`. The projection
/// parameter is clamped to [0, 1], so this measures to the segment, not the
/// infinite line through it.
pub fn segment_distance_squared(point: Pos, a: Pos, b: Pos) -> f32 {
    let ab = b - a;
    let length_squared = ab.norm_squared();
    if length_squared == 0.0 {
        return (point - a).norm_squared();
    }

    let t = ((point - a).dot(&ab) / length_squared).clamp(0.0, 1.0);
    (point - (a + t * ab)).norm_squared()
}
