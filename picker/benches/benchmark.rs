use std::f32::consts::PI;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::Vector3;

use picker::{geometry::Ray, mesh::Mesh};

/// UV sphere with quad faces between the rings and triangle fans at the
/// poles, so both face arities get exercised.
fn uv_sphere(rings: usize, segments: usize) -> (Vec<Vector3<f32>>, Vec<Vec<u32>>) {
    let mut verts = vec![Vector3::new(0.0, 0.0, 1.0)];
    for r in 1..rings {
        let phi = PI * r as f32 / rings as f32;
        for s in 0..segments {
            let theta = 2.0 * PI * s as f32 / segments as f32;
            verts.push(Vector3::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            ));
        }
    }
    verts.push(Vector3::new(0.0, 0.0, -1.0));

    let ring = |r: usize, s: usize| (1 + (r - 1) * segments + s % segments) as u32;
    let mut faces = Vec::new();
    for s in 0..segments {
        faces.push(vec![0, ring(1, s), ring(1, s + 1)]);
    }
    for r in 1..rings - 1 {
        for s in 0..segments {
            faces.push(vec![
                ring(r, s),
                ring(r + 1, s),
                ring(r + 1, s + 1),
                ring(r, s + 1),
            ]);
        }
    }
    let bottom = (verts.len() - 1) as u32;
    for s in 0..segments {
        faces.push(vec![bottom, ring(rings - 1, s + 1), ring(rings - 1, s)]);
    }

    (verts, faces)
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mesh Picking");

    for segments in [16usize, 64, 192] {
        let (verts, faces) = uv_sphere(segments / 2, segments);

        group.bench_with_input(
            BenchmarkId::new("Build", segments),
            &(&verts, &faces),
            |b, (verts, faces)| b.iter(|| Mesh::new((*verts).clone(), (*faces).clone())),
        );

        let mesh = Mesh::new(verts, faces);
        let ray = Ray::new(Vector3::new(0.1, 0.05, 5.0), Vector3::new(0.0, 0.0, -1.0));
        group.bench_with_input(BenchmarkId::new("Nearest face", segments), &mesh, |b, m| {
            b.iter(|| m.find_nearest_intersecting_face(&ray))
        });
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);
