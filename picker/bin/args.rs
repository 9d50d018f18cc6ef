use std::{path::PathBuf, str::FromStr};

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use nalgebra::{ArrayStorage, Const, Matrix, Scalar, Vector3, U1};
use num_traits::Zero;

#[derive(Debug, Parser)]
/// Casts a pick ray at a mesh and reports the element under it.
pub struct Args {
    /// Path to a .stl or .obj file.
    pub mesh: PathBuf,

    #[arg(long, default_value = "0, 0, 0", value_parser = vector_value_parser::<f32, 3>)]
    /// Position of the model in world space.
    pub position: Vector3<f32>,

    #[arg(long, default_value = "0, 0, 0", value_parser = vector_value_parser::<f32, 3>)]
    /// Rotation of the model in degrees, pitch, roll, yaw.
    pub rotation: Vector3<f32>,

    #[arg(long, default_value = "1, 1, 1", value_parser = scale_value_parser)]
    /// Scale of the model along the X, Y, and Z axes. Components must be
    /// non-zero so the model matrix stays invertible.
    pub scale: Vector3<f32>,

    #[arg(long, value_parser = vector_value_parser::<f32, 3>)]
    /// World-space origin of the pick ray.
    pub origin: Vector3<f32>,

    #[arg(long, value_parser = vector_value_parser::<f32, 3>)]
    /// World-space direction of the pick ray.
    pub direction: Vector3<f32>,

    #[arg(long, value_enum, default_value_t = PickMode::Face)]
    /// Which query to run with the ray.
    pub pick: PickMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PickMode {
    Face,
    Vertex,
    Edge,
    Distance,
}

fn scale_value_parser(raw: &str) -> Result<Vector3<f32>> {
    let scale = vector_value_parser::<f32, 3>(raw)?;
    ensure!(
        scale.iter().all(|&component| component != 0.0),
        "Scale components must be non-zero"
    );
    Ok(scale)
}

fn vector_value_parser<T, const N: usize>(
    raw: &str,
) -> Result<Matrix<T, Const<N>, U1, ArrayStorage<T, N, 1>>>
where
    T: FromStr + Scalar + Zero,
    T::Err: Send + Sync + std::error::Error + 'static,
{
    let mut vec = Matrix::<T, Const<N>, U1, ArrayStorage<T, N, 1>>::zeros();

    let mut parts = raw.splitn(N, ',');
    for i in 0..N {
        let element = parts.next().context("Missing vector element")?.trim();
        vec[i] = element
            .parse()
            .context("Can't convert element from string")?;
    }

    Ok(vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_parsing() {
        let parsed = vector_value_parser::<f32, 3>("1, -2.5,3").unwrap();
        assert_eq!(parsed, Vector3::new(1.0, -2.5, 3.0));

        assert!(vector_value_parser::<f32, 3>("1, 2").is_err());
        assert!(vector_value_parser::<f32, 3>("1, 2, x").is_err());
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(scale_value_parser("2, 1, 0.5").is_ok());
        assert!(scale_value_parser("1, 0, 1").is_err());
        assert!(scale_value_parser("0, 0, 0").is_err());
    }
}
