use std::{fs::File, io::BufReader};

use anyhow::{Context, Result};
use clap::Parser;

use args::{Args, PickMode};
use picker::{element::MeshElement, format::load_mesh, geometry::Ray};

mod args;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let ext = (args.mesh.extension())
        .context("Mesh path has no extension")?
        .to_string_lossy()
        .to_string();
    let file = BufReader::new(File::open(&args.mesh)?);
    let mut mesh = load_mesh(file, &ext)?;

    mesh.set_position(args.position);
    mesh.set_rotation(args.rotation.map(f32::to_radians));
    mesh.set_scale(args.scale);

    println!(
        "Loaded `{}`. {{ vert: {}, face: {}, edge: {} }}",
        args.mesh.file_name().unwrap_or_default().to_string_lossy(),
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.edge_count()
    );

    // The BVH and all query math live in the mesh's local space.
    let ray = Ray::new(args.origin, args.direction).world_to_local(mesh.transformation_matrix());

    match args.pick {
        PickMode::Distance => match mesh.intersect(&ray) {
            Some(t) => println!("Hit at distance {t}"),
            None => println!("no hit"),
        },
        PickMode::Face => match mesh.find_nearest_intersecting_face(&ray) {
            Some(hit) => {
                let world = mesh.transform(&hit.position);
                println!(
                    "{:?} at ({:.4}, {:.4}, {:.4})",
                    MeshElement::Face(hit.face),
                    world.x,
                    world.y,
                    world.z
                );
            }
            None => println!("no hit"),
        },
        PickMode::Vertex => report(mesh.find_nearest_vertex(&ray)),
        PickMode::Edge => report(mesh.find_nearest_edge(&ray)),
    }

    Ok(())
}

fn report(element: MeshElement) {
    match element.is_valid() {
        true => println!("{element:?}"),
        false => println!("no hit"),
    }
}
