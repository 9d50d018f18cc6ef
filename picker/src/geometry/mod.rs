use nalgebra::Matrix4;

use crate::Pos;

pub mod aabb;
pub mod triangle;

pub use aabb::Aabb;

/// A parametric ray, evaluated as `origin + t * direction`. The direction
/// is not required to be unit length.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Pos,
    pub direction: Pos,
}

impl Ray {
    pub fn new(origin: Pos, direction: Pos) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Pos {
        self.origin + t * self.direction
    }

    /// Transforms the ray from world space into the local space of a model.
    /// The origin moves as a homogeneous point, the direction as a vector,
    /// renormalized. Model matrices are assumed affine.
    pub fn world_to_local(&self, model_matrix: &Matrix4<f32>) -> Self {
        let inverse = model_matrix.try_inverse().unwrap();
        let origin = (inverse * self.origin.push(1.0)).xyz();
        let direction = (inverse * self.direction.push(0.0)).xyz().normalize();
        Self { origin, direction }
    }
}

/// Result of a nearest-face query: where the ray landed and on which face.
#[derive(Clone, Copy, Debug)]
pub struct Hit {
    pub position: Pos,
    pub t: f32,
    pub face: usize,
}

impl Hit {
    pub fn is_hit(&self) -> bool {
        self.face != usize::MAX
    }
}

impl Default for Hit {
    fn default() -> Self {
        Self {
            position: Pos::repeat(f32::NAN),
            t: f32::MAX,
            face: usize::MAX,
        }
    }
}
