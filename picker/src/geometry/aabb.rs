use std::mem;

use nalgebra::Matrix4;

use crate::{geometry::Ray, Pos};

/// An axis-aligned bounding box. The empty box has an inverted extent so
/// that unions with it are identities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Pos,
    pub max: Pos,
}

impl Aabb {
    pub fn new(min: Pos, max: Pos) -> Self {
        Self { min, max }
    }

    /// The identity element for `union`: min at +inf, max at -inf.
    pub fn empty() -> Self {
        Self {
            min: Pos::repeat(f32::INFINITY),
            max: Pos::repeat(f32::NEG_INFINITY),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Pos>) -> Self {
        points.into_iter().fold(Self::empty(), |acc, point| Self {
            min: acc.min.inf(&point),
            max: acc.max.sup(&point),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn union_all(boxes: impl IntoIterator<Item = Self>) -> Self {
        boxes.into_iter().fold(Self::empty(), |acc, b| acc.union(&b))
    }

    pub fn center(&self) -> Pos {
        (self.min + self.max) * 0.5
    }

    pub fn diagonal_length(&self) -> f32 {
        (self.max - self.min).norm()
    }

    /// Axis of largest extent. x wins only when strictly largest; equal
    /// extents fall through to the later axis.
    pub fn max_axis(&self) -> usize {
        let extent = self.max - self.min;
        if extent.x > extent.y && extent.x > extent.z {
            return 0;
        }
        if extent.y > extent.z {
            return 1;
        }
        2
    }

    pub fn corners(&self) -> [Pos; 8] {
        let (min, max) = (self.min, self.max);
        [
            Pos::new(min.x, min.y, min.z),
            Pos::new(min.x, min.y, max.z),
            Pos::new(min.x, max.y, min.z),
            Pos::new(min.x, max.y, max.z),
            Pos::new(max.x, min.y, min.z),
            Pos::new(max.x, min.y, max.z),
            Pos::new(max.x, max.y, min.z),
            Pos::new(max.x, max.y, max.z),
        ]
    }

    /// Pairs of `corners()` indices forming the 12 box edges, for wireframe
    /// rendering.
    #[rustfmt::skip]
    pub const EDGE_INDICES: [usize; 24] = [
        0, 1, 1, 3, 3, 2, 2, 0,
        4, 5, 5, 7, 7, 6, 6, 4,
        0, 4, 1, 5, 3, 7, 2, 6,
    ];

    /// Outward normal of the box face `point` lies on, or zeros when the
    /// point is not within epsilon of any face (edges and corners resolve to
    /// whichever face matches first).
    pub fn normal_at(&self, point: Pos) -> Pos {
        const EPS: f32 = 1e-4;

        if (point.x - self.min.x).abs() < EPS {
            return Pos::new(-1.0, 0.0, 0.0);
        }
        if (point.x - self.max.x).abs() < EPS {
            return Pos::new(1.0, 0.0, 0.0);
        }
        if (point.y - self.min.y).abs() < EPS {
            return Pos::new(0.0, -1.0, 0.0);
        }
        if (point.y - self.max.y).abs() < EPS {
            return Pos::new(0.0, 1.0, 0.0);
        }
        if (point.z - self.min.z).abs() < EPS {
            return Pos::new(0.0, 0.0, -1.0);
        }
        if (point.z - self.max.z).abs() < EPS {
            return Pos::new(0.0, 0.0, 1.0);
        }

        Pos::zeros()
    }

    /// Corner-transform-and-refit, for callers holding a world transform.
    pub fn transformed(&self, transform: &Matrix4<f32>) -> Self {
        Self::from_points(
            self.corners()
                .into_iter()
                .map(|corner| (transform * corner.push(1.0)).xyz()),
        )
    }

    /// Slab test. Returns the entry distance along the ray, or `None` when
    /// the ray misses. Zero direction components produce infinite slopes per
    /// IEEE and fall out of the interval math without special casing. The
    /// far bound is widened by `1 + 2ε` each axis so rays grazing a corner
    /// or edge still report a hit.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let (mut t0, mut t1) = (0.0_f32, f32::MAX);
        for axis in 0..3 {
            let inv_dir = 1.0 / ray.direction[axis];
            let mut t_near = (self.min[axis] - ray.origin[axis]) * inv_dir;
            let mut t_far = (self.max[axis] - ray.origin[axis]) * inv_dir;
            if t_near > t_far {
                mem::swap(&mut t_near, &mut t_far);
            }
            t_far *= 1.0 + 2.0 * f32::EPSILON;

            t0 = t0.max(t_near);
            t1 = t1.min(t_far);
            if t0 > t1 {
                return None;
            }
        }
        Some(t0)
    }
}
