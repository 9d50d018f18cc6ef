//! The element-picking queries layered on [`Mesh`]: nearest intersecting
//! face under a ray, and vertex/edge picks restricted to that face's
//! neighborhood. A global nearest-vertex-to-ray search would happily pick
//! geometry behind or beside the surface the user is pointing at, so the
//! vertex and edge picks only consider the winning face.

use ordered_float::OrderedFloat;

use crate::{
    element::MeshElement,
    geometry::{triangle, Hit, Ray},
    mesh::Mesh,
    Pos,
};

impl Mesh {
    /// Exact ray/face test. The face is fan-triangulated around its first
    /// vertex and each triangle tested with Möller-Trumbore; the smallest
    /// hit distance on the face wins. Faces with fewer than three vertices
    /// never intersect.
    pub fn intersect_face(&self, ray: &Ray, face: usize) -> Option<f32> {
        let corners = self.face(face);
        if corners.len() < 3 {
            return None;
        }
        let pivot = self.vertices()[corners[0] as usize];

        let mut nearest: Option<f32> = None;
        for pair in corners[1..].windows(2) {
            let v1 = self.vertices()[pair[0] as usize];
            let v2 = self.vertices()[pair[1] as usize];
            if let Some(t) = triangle::intersect(ray, pivot, v1, v2) {
                nearest = Some(nearest.map_or(t, |n| n.min(t)));
            }
        }

        nearest
    }

    /// Nearest face the ray hits, with the hit point on it. The BVH
    /// callback never accepts, so traversal visits every candidate leaf and
    /// the true minimum is tracked here rather than by traversal order.
    pub fn find_nearest_intersecting_face(&self, ray: &Ray) -> Option<Hit> {
        let mut best = Hit::default();
        self.bvh().intersect(ray, |face| {
            if let Some(t) = self.intersect_face(ray, face) {
                if t < best.t {
                    best = Hit {
                        position: ray.at(t),
                        t,
                        face,
                    };
                }
            }
            false
        });

        best.is_hit().then_some(best)
    }

    /// Smallest hit distance over the whole mesh, or `None`.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.find_nearest_intersecting_face(ray).map(|hit| hit.t)
    }

    /// Existence check only: stops at the first face the ray hits, which
    /// need not be the nearest.
    pub fn ray_intersects(&self, ray: &Ray) -> bool {
        self.bvh()
            .intersect(ray, |face| self.intersect_face(ray, face).is_some())
            .is_some()
    }

    /// Vertex pick: of the vertices incident to the face under the ray,
    /// the one closest to the hit point.
    pub fn find_nearest_vertex(&self, ray: &Ray) -> MeshElement {
        let Some(hit) = self.find_nearest_intersecting_face(ray) else {
            return MeshElement::None;
        };

        self.half_edge()
            .face_vertices(hit.face)
            .min_by_key(|&v| OrderedFloat((self.vertices()[v as usize] - hit.position).norm_squared()))
            .map_or(MeshElement::None, |v| MeshElement::Vertex(v as usize))
    }

    /// Point form of the vertex pick: a plain linear scan over every
    /// vertex, for callers that have a reference point but no ray.
    pub fn nearest_vertex_to_point(&self, point: Pos) -> MeshElement {
        (0..self.vertex_count())
            .min_by_key(|&v| OrderedFloat((self.vertices()[v] - point).norm_squared()))
            .map_or(MeshElement::None, MeshElement::Vertex)
    }

    /// Edge pick: of the boundary edges of the face under the ray, the one
    /// closest to the hit point. Distance is measured to the clamped
    /// segment, not the infinite line through it.
    pub fn find_nearest_edge(&self, ray: &Ray) -> MeshElement {
        let Some(hit) = self.find_nearest_intersecting_face(ray) else {
            return MeshElement::None;
        };

        self.half_edge()
            .face_edges(hit.face)
            .min_by_key(|&(_, [a, b])| {
                OrderedFloat(triangle::segment_distance_squared(
                    hit.position,
                    self.vertices()[a as usize],
                    self.vertices()[b as usize],
                ))
            })
            .map_or(MeshElement::None, |(edge, _)| MeshElement::Edge(edge as usize))
    }
}
