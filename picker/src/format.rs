//! Mesh file loading: STL (binary/ASCII, autodetected) and OBJ. Both
//! parsers deduplicate vertices as they read, so identical corner positions
//! from separate records collapse to one vertex id before the mesh is
//! built.

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read, Seek, SeekFrom},
};

use anyhow::{bail, Context, Result};
use nalgebra::Vector3;

use crate::{mesh::Mesh, Pos};

/// Loads a mesh in a blocking manner. Supported formats are `stl` and
/// `obj` (case-insensitive).
pub fn load_mesh<T: Read + Seek>(reader: T, format: &str) -> Result<Mesh> {
    let format = format.to_ascii_lowercase();
    let (vertices, faces) = match format.as_str() {
        "stl" => stl::parse(reader)?,
        "obj" => obj::parse(reader)?,
        _ => bail!("Unsupported format: {format}"),
    };

    Ok(Mesh::new(vertices, faces))
}

mod stl {
    use super::*;

    pub fn parse<T: Read + Seek>(mut reader: T) -> Result<(Vec<Pos>, Vec<Vec<u32>>)> {
        // `read` may return short even mid-stream, so keep going until the
        // probe is full or the file ends.
        let mut probe = [0u8; 5];
        let mut filled = 0;
        while filled < probe.len() {
            let read = reader.read(&mut probe[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        reader.seek(SeekFrom::Start(0))?;

        if &probe[..filled] == b"solid" {
            ascii(reader)
        } else {
            binary(reader)
        }
    }

    /// ```text
    /// UINT8[80]    - Header                 - 80 bytes
    /// UINT32       - Number of triangles    - 04 bytes
    /// foreach triangle                      - 50 bytes
    ///     REAL32[3] - Normal vector         - 12 bytes
    ///     REAL32[3] - Vertex 1              - 12 bytes
    ///     REAL32[3] - Vertex 2              - 12 bytes
    ///     REAL32[3] - Vertex 3              - 12 bytes
    ///     UINT16    - Attribute byte count  - 02 bytes
    /// end
    /// ```
    fn binary<T: Read>(mut reader: T) -> Result<(Vec<Pos>, Vec<Vec<u32>>)> {
        let mut header = [0u8; 84];
        reader.read_exact(&mut header).context("stl header truncated")?;
        let tri_count = u32::from_le_bytes([header[80], header[81], header[82], header[83]]);

        // The count comes from the file and may lie; don't preallocate from
        // it, let a truncated stream surface as a read error instead.
        let mut verts = HashMap::new();
        let mut faces = Vec::new();
        let mut record = [0u8; 50];
        for _ in 0..tri_count {
            reader.read_exact(&mut record).context("stl record truncated")?;
            faces.push(vec![
                vert_idx(&mut verts, vec3_at(&record, 12)),
                vert_idx(&mut verts, vec3_at(&record, 24)),
                vert_idx(&mut verts, vec3_at(&record, 36)),
            ]);
        }

        Ok((finish(verts), faces))
    }

    /// ```text
    /// solid name
    /// facet normal ni nj nk
    ///     outer loop
    ///         vertex v1x v1y v1z
    ///         vertex v2x v2y v2z
    ///         vertex v3x v3y v3z
    ///     endloop
    /// endfacet
    /// endsolid name
    /// ```
    fn ascii<T: Read>(mut reader: T) -> Result<(Vec<Pos>, Vec<Vec<u32>>)> {
        let mut text = String::new();
        reader.read_to_string(&mut text).context("stl is not utf-8")?;

        let mut verts = HashMap::new();
        let mut faces = Vec::new();

        // Collects nine floats per facet; keywords between them fail the
        // float parse and are skipped until the counter wraps.
        let mut builder = [Pos::zeros(); 3];
        let mut component = 9;

        for token in text.split_ascii_whitespace() {
            if component < 9 {
                if let Ok(value) = token.parse::<f32>() {
                    builder[component / 3][component % 3] = value;
                    component += 1;
                }
                continue;
            }

            match token {
                "vertex" => component = 0,
                "endloop" => faces.push(vec![
                    vert_idx(&mut verts, builder[0]),
                    vert_idx(&mut verts, builder[1]),
                    vert_idx(&mut verts, builder[2]),
                ]),
                _ => {}
            }
        }

        Ok((finish(verts), faces))
    }

    fn vec3_at(bytes: &[u8], offset: usize) -> Pos {
        let f32_at = |o: usize| {
            f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]])
        };
        Pos::new(f32_at(offset), f32_at(offset + 4), f32_at(offset + 8))
    }

    fn vert_idx(verts: &mut HashMap<Vector3<u32>, u32>, vert: Pos) -> u32 {
        let size = verts.len() as u32;
        *verts.entry(vert.map(f32::to_bits)).or_insert(size)
    }

    fn finish(verts: HashMap<Vector3<u32>, u32>) -> Vec<Pos> {
        let mut verts = verts.into_iter().collect::<Vec<_>>();
        verts.sort_by_key(|(_vert, idx)| *idx);
        (verts.into_iter())
            .map(|(vert, _idx)| vert.map(f32::from_bits))
            .collect()
    }
}

mod obj {
    use super::*;

    pub fn parse<T: Read>(reader: T) -> Result<(Vec<Pos>, Vec<Vec<u32>>)> {
        let reader = BufReader::new(reader);
        let mut verts: Vec<Pos> = Vec::new();
        let mut faces = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let mut vert = Pos::zeros();
                    for component in vert.iter_mut() {
                        *component = tokens
                            .next()
                            .context("missing obj vertex component")?
                            .parse()?;
                    }
                    verts.push(vert);
                }
                Some("f") => {
                    let mut face = Vec::new();
                    for token in tokens {
                        // `f v`, `f v/vt`, and `f v/vt/vn` all start with
                        // the position index.
                        let index = token.split('/').next().unwrap_or(token);
                        let index: i64 = index.parse().context("bad obj face index")?;

                        // Negative indices count back from the latest vertex.
                        let resolved = if index < 0 {
                            verts.len() as i64 + index
                        } else {
                            index - 1
                        };
                        if resolved < 0 || resolved >= verts.len() as i64 {
                            bail!("obj face index {index} out of range");
                        }
                        face.push(resolved as u32);
                    }

                    if face.len() >= 3 {
                        faces.push(face);
                    }
                }
                _ => {} // vn, vt, usemtl, comments, ...
            }
        }

        Ok((verts, faces))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn binary_stl(triangles: &[[Pos; 3]]) -> Vec<u8> {
        let mut out = vec![0u8; 80];
        out.extend((triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            out.extend([0u8; 12]); // normal, ignored
            for vertex in triangle {
                for component in vertex.iter() {
                    out.extend(component.to_le_bytes());
                }
            }
            out.extend([0u8; 2]); // attribute byte count
        }
        out
    }

    #[test]
    fn binary_stl_round_trip() {
        let a = Pos::new(0.0, 0.0, 0.0);
        let b = Pos::new(1.0, 0.0, 0.0);
        let c = Pos::new(0.0, 1.0, 0.0);
        let d = Pos::new(1.0, 1.0, 0.0);
        let data = binary_stl(&[[a, b, c], [b, d, c]]);

        let mesh = load_mesh(Cursor::new(data), "stl").unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex_count(), 4, "shared corners are deduplicated");
        assert_eq!(mesh.edge_count(), 5);
    }

    #[test]
    fn ascii_stl_round_trip() {
        let data = "\
solid tri
facet normal 0 0 1
    outer loop
        vertex 0 0 0
        vertex 1 0 0
        vertex 0 1 0
    endloop
endfacet
endsolid tri
";
        let mesh = load_mesh(Cursor::new(data), "stl").unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices()[1], Pos::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn obj_polygons_and_negative_indices() {
        let data = "\
# a quad and a triangle
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
f -2 -1 1
";
        let mesh = load_mesh(Cursor::new(data), "obj").unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.face(0), &[0, 1, 2, 3][..], "quad kept as a polygon");
        assert_eq!(mesh.face(1), &[2, 3, 0][..]);
    }

    #[test]
    fn lying_triangle_count_is_an_error() {
        // Header claims u32::MAX triangles but the stream ends right after
        // it. Must come back as a parse error, not an allocation blowup.
        let mut data = vec![0u8; 80];
        data.extend(u32::MAX.to_le_bytes());
        assert!(load_mesh(Cursor::new(data), "stl").is_err());
    }

    #[test]
    fn truncated_binary_stl_is_an_error() {
        let a = Pos::new(0.0, 0.0, 0.0);
        let b = Pos::new(1.0, 0.0, 0.0);
        let c = Pos::new(0.0, 1.0, 0.0);
        let mut data = binary_stl(&[[a, b, c]]);
        data.truncate(data.len() - 10);
        assert!(load_mesh(Cursor::new(data), "stl").is_err());
    }

    #[test]
    fn stl_detection_survives_short_reads() {
        // A reader that hands out one byte at a time: the format probe must
        // still see the full `solid` prefix and pick the ascii parser.
        struct Trickle<T>(T);

        impl<T: Read> Read for Trickle<T> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                let len = buf.len().min(1);
                self.0.read(&mut buf[..len])
            }
        }

        impl<T: Seek> Seek for Trickle<T> {
            fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
                self.0.seek(pos)
            }
        }

        let data = "\
solid tri
facet normal 0 0 1
    outer loop
        vertex 0 0 0
        vertex 1 0 0
        vertex 0 1 0
    endloop
endfacet
endsolid tri
";
        let mesh = load_mesh(Trickle(Cursor::new(data)), "stl").unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn unknown_format_is_an_error() {
        assert!(load_mesh(Cursor::new(Vec::new()), "ply").is_err());
    }

    #[test]
    fn out_of_range_obj_index_is_an_error() {
        let data = "v 0 0 0\nf 1 2 3\n";
        assert!(load_mesh(Cursor::new(data), "obj").is_err());
    }
}
