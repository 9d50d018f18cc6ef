//! Spatial-query core for interactive mesh picking: an arena BVH over
//! per-face bounding boxes plus the nearest face/vertex/edge queries built
//! on top of it. The UI layer turns pointer positions into world-space rays
//! and hands them to [`mesh::Mesh`]; element handles come back out.

use nalgebra::Vector3;

pub mod bvh;
pub mod element;
pub mod format;
pub mod geometry;
pub mod half_edge;
pub mod mesh;
pub mod pick;

pub type Pos = Vector3<f32>;
