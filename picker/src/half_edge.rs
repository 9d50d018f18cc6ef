use std::collections::{HashMap, HashSet};

/// Half-edge connectivity over polygon faces: one half-edge per face
/// corner, cyclic `next`/`prev` within the face, `twin` across it. Each
/// unordered vertex pair also gets a stable undirected edge index, assigned
/// in first-encounter order.
///
/// All adjacency queries are O(valence), not O(mesh size).
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh {
    half_edges: Vec<HalfEdge>,
    edges: Vec<[u32; 2]>,
    /// First half-edge of each face, one extra entry for the end.
    face_start: Vec<u32>,
    /// One outgoing half-edge per vertex, if any face uses it.
    vertex_edge: Vec<Option<u32>>,
}

#[derive(Debug, Clone)]
pub struct HalfEdge {
    pub origin: u32,
    pub target: u32,
    pub face: u32,
    /// Undirected edge id, shared with the twin.
    pub edge: u32,
    pub next: u32,
    pub prev: u32,
    /// Missing on boundary edges and on non-manifold input.
    pub twin: Option<u32>,
}

impl HalfEdgeMesh {
    pub fn build(faces: &[Vec<u32>], vertex_count: usize) -> Self {
        let mut half_edges = Vec::new();
        let mut edges = Vec::new();
        let mut edge_ids: HashMap<(u32, u32), u32> = HashMap::new();
        let mut twin_map: HashMap<(u32, u32), u32> = HashMap::new();
        let mut face_start = Vec::with_capacity(faces.len() + 1);
        let mut vertex_edge = vec![None; vertex_count];

        for (face_idx, face) in faces.iter().enumerate() {
            let n = face.len() as u32;
            let first = half_edges.len() as u32;
            face_start.push(first);

            for (i, &origin) in face.iter().enumerate() {
                let target = face[(i + 1) % face.len()];
                let key = (origin.min(target), origin.max(target));
                let edge = *edge_ids.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edges.len() as u32 - 1
                });

                let idx = first + i as u32;
                half_edges.push(HalfEdge {
                    origin,
                    target,
                    face: face_idx as u32,
                    edge,
                    next: first + (i as u32 + 1) % n,
                    prev: first + (i as u32 + n - 1) % n,
                    twin: None,
                });
                twin_map.insert((origin, target), idx);
                if vertex_edge[origin as usize].is_none() {
                    vertex_edge[origin as usize] = Some(idx);
                }
            }
        }

        for half_edge in half_edges.iter_mut() {
            half_edge.twin = twin_map.get(&(half_edge.target, half_edge.origin)).copied();
        }
        face_start.push(half_edges.len() as u32);

        Self {
            half_edges,
            edges,
            face_start,
            vertex_edge,
        }
    }

    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.half_edges
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_endpoints(&self, edge: usize) -> [u32; 2] {
        self.edges[edge]
    }

    pub fn face_half_edges(&self, face: usize) -> std::ops::Range<u32> {
        self.face_start[face]..self.face_start[face + 1]
    }

    /// Vertex ids around `face`, in winding order.
    pub fn face_vertices(&self, face: usize) -> impl Iterator<Item = u32> + '_ {
        self.face_half_edges(face)
            .map(|he| self.half_edges[he as usize].origin)
    }

    /// Undirected edge ids with their endpoints around `face`.
    pub fn face_edges(&self, face: usize) -> impl Iterator<Item = (u32, [u32; 2])> + '_ {
        self.face_half_edges(face).map(|he| {
            let half_edge = &self.half_edges[he as usize];
            (half_edge.edge, [half_edge.origin, half_edge.target])
        })
    }

    /// Outgoing half-edges around `vertex`, walking twins. The walk stops
    /// at a boundary (missing twin) instead of panicking, so non-manifold
    /// input degrades to a partial fan.
    pub fn vertex_half_edges(&self, vertex: usize) -> Vec<u32> {
        let Some(start) = self.vertex_edge[vertex] else {
            return Vec::new();
        };

        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut current = start;
        loop {
            if !seen.insert(current) {
                break;
            }
            out.push(current);

            // The previous half-edge in the face ends at `vertex`; its twin
            // starts there again, giving the next spoke of the fan.
            let prev = self.half_edges[current as usize].prev;
            let Some(twin) = self.half_edges[prev as usize].twin else {
                break;
            };
            if twin == start {
                break;
            }
            current = twin;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed cube: 8 vertices, 6 quad faces.
    fn cube_faces() -> Vec<Vec<u32>> {
        vec![
            vec![0, 1, 2, 3], // -z
            vec![7, 6, 5, 4], // +z
            vec![0, 4, 5, 1], // -y
            vec![1, 5, 6, 2], // +x
            vec![2, 6, 7, 3], // +y
            vec![3, 7, 4, 0], // -x
        ]
    }

    #[test]
    fn cube_counts() {
        let mesh = HalfEdgeMesh::build(&cube_faces(), 8);
        assert_eq!(mesh.half_edge_count(), 24);
        assert_eq!(mesh.edge_count(), 12);
    }

    #[test]
    fn twins_are_symmetric() {
        let mesh = HalfEdgeMesh::build(&cube_faces(), 8);
        for (idx, half_edge) in mesh.half_edges().iter().enumerate() {
            let twin_idx = half_edge.twin.expect("closed mesh has no boundary");
            let twin = &mesh.half_edges()[twin_idx as usize];
            assert_eq!(twin.twin, Some(idx as u32));
            assert_eq!(twin.origin, half_edge.target);
            assert_eq!(twin.edge, half_edge.edge, "twins share an edge id");
        }
    }

    #[test]
    fn face_adjacency_matches_input() {
        let faces = cube_faces();
        let mesh = HalfEdgeMesh::build(&faces, 8);
        for (face_idx, face) in faces.iter().enumerate() {
            let verts = mesh.face_vertices(face_idx).collect::<Vec<_>>();
            assert_eq!(&verts, face);

            let edges = mesh.face_edges(face_idx).collect::<Vec<_>>();
            assert_eq!(edges.len(), face.len());
        }
    }

    #[test]
    fn vertex_fan_on_cube_corner() {
        let mesh = HalfEdgeMesh::build(&cube_faces(), 8);
        for vertex in 0..8 {
            let spokes = mesh.vertex_half_edges(vertex);
            assert_eq!(spokes.len(), 3, "every cube corner touches 3 faces");
            for he in spokes {
                assert_eq!(mesh.half_edges()[he as usize].origin, vertex as u32);
            }
        }
    }

    #[test]
    fn open_fan_stops_at_boundary() {
        // Two triangles sharing edge 0-1; vertex 0 has a boundary.
        let faces = vec![vec![0, 1, 2], vec![1, 0, 3]];
        let mesh = HalfEdgeMesh::build(&faces, 4);

        assert_eq!(mesh.edge_count(), 5);
        let spokes = mesh.vertex_half_edges(0);
        assert!(!spokes.is_empty());
        assert!(spokes.len() <= 2);

        // A vertex used by no face has no fan at all.
        let lone = HalfEdgeMesh::build(&faces, 5);
        assert!(lone.vertex_half_edges(4).is_empty());
    }
}
