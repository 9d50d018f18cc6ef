use std::collections::HashMap;

use nalgebra::{Matrix4, Vector3};
use tracing::info;

use crate::{bvh::Bvh, geometry::Aabb, half_edge::HalfEdgeMesh, Pos};

/// A polygon mesh with deduplicated vertices, its model transform, and the
/// spatial structures built once at load: per-face bounding boxes, a BVH
/// keyed by face index, and half-edge adjacency. Faces keep their original
/// vertex counts; nothing is triangulated at load.
///
/// All geometry and both spatial structures live in local space. World
/// rays are brought in through [`Ray::world_to_local`].
///
/// [`Ray::world_to_local`]: crate::geometry::Ray::world_to_local
pub struct Mesh {
    vertices: Box<[Pos]>,
    faces: Box<[Vec<u32>]>,

    half_edge: HalfEdgeMesh,
    bvh: Bvh,

    transformation_matrix: Matrix4<f32>,
    inv_transformation_matrix: Matrix4<f32>,

    position: Pos,
    scale: Pos,
    rotation: Pos,
}

impl Mesh {
    /// Builds a mesh from raw vertex and polygon-face arrays. Coincident
    /// vertex positions are merged (exact bit equality) before adjacency
    /// and the BVH are built, so no two vertex ids share a position.
    pub fn new(vertices: Vec<Pos>, faces: Vec<Vec<u32>>) -> Self {
        let (vertices, faces) = deduplicate_vertices(vertices, faces);
        let half_edge = HalfEdgeMesh::build(&faces, vertices.len());
        let bvh = Bvh::new(face_bounding_boxes(&vertices, &faces));

        info!(
            "Loaded mesh {{ vert: {}, face: {}, edge: {} }}",
            vertices.len(),
            faces.len(),
            half_edge.edge_count()
        );

        Self {
            vertices: vertices.into_boxed_slice(),
            faces: faces.into_boxed_slice(),
            half_edge,
            bvh,
            transformation_matrix: Matrix4::identity(),
            inv_transformation_matrix: Matrix4::identity(),
            position: Pos::zeros(),
            scale: Pos::repeat(1.0),
            rotation: Pos::zeros(),
        }
    }

    pub fn vertices(&self) -> &[Pos] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    pub fn face(&self, index: usize) -> &[u32] {
        &self.faces[index]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.half_edge.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    pub fn half_edge(&self) -> &HalfEdgeMesh {
        &self.half_edge
    }

    /// World-space bounding box of the whole mesh.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| self.transform(v)))
    }
}

impl Mesh {
    pub fn transformation_matrix(&self) -> &Matrix4<f32> {
        &self.transformation_matrix
    }

    pub fn inv_transformation_matrix(&self) -> &Matrix4<f32> {
        &self.inv_transformation_matrix
    }

    /// Changes the position of the model, updating the cached matrices.
    pub fn set_position(&mut self, position: Pos) {
        self.position = position;
        self.update_transformation_matrix();
    }

    pub fn position(&self) -> Pos {
        self.position
    }

    /// Changes the scale of the model, updating the cached matrices.
    pub fn set_scale(&mut self, scale: Pos) {
        self.scale = scale;
        self.update_transformation_matrix();
    }

    pub fn scale(&self) -> Pos {
        self.scale
    }

    /// Changes the rotation of the model ([Euler
    /// angles](https://en.wikipedia.org/wiki/Euler_angles), radians),
    /// updating the cached matrices.
    pub fn set_rotation(&mut self, rotation: Pos) {
        self.rotation = rotation;
        self.update_transformation_matrix();
    }

    pub fn rotation(&self) -> Pos {
        self.rotation
    }

    fn update_transformation_matrix(&mut self) {
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);
        let rotation =
            Matrix4::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z);
        let translation = Matrix4::new_translation(&self.position);

        self.transformation_matrix = translation * scale * rotation;
        self.inv_transformation_matrix = self.transformation_matrix.try_inverse().unwrap();
    }

    /// Transforms a local point into world space.
    pub fn transform(&self, pos: &Pos) -> Pos {
        (self.transformation_matrix * pos.push(1.0)).xyz()
    }

    /// Transforms a world point into local space.
    pub fn inv_transform(&self, pos: &Pos) -> Pos {
        (self.inv_transformation_matrix * pos.push(1.0)).xyz()
    }
}

/// One bounding box per face, in face-index order. This ordering is the
/// contract between the mesh and its BVH: leaf box `i` is face `i`.
fn face_bounding_boxes(vertices: &[Pos], faces: &[Vec<u32>]) -> Vec<Aabb> {
    faces
        .iter()
        .map(|face| Aabb::from_points(face.iter().map(|&v| vertices[v as usize])))
        .collect()
}

/// Merges vertices with bit-identical positions and remaps face indices.
fn deduplicate_vertices(vertices: Vec<Pos>, faces: Vec<Vec<u32>>) -> (Vec<Pos>, Vec<Vec<u32>>) {
    let mut ids = HashMap::<Vector3<u32>, u32>::new();
    let mut unique = Vec::new();
    let mut remap = Vec::with_capacity(vertices.len());

    for vertex in &vertices {
        let size = unique.len() as u32;
        let id = *ids.entry(vertex.map(f32::to_bits)).or_insert_with(|| {
            unique.push(*vertex);
            size
        });
        remap.push(id);
    }

    let faces = faces
        .into_iter()
        .map(|face| face.into_iter().map(|v| remap[v as usize]).collect())
        .collect();

    (unique, faces)
}
