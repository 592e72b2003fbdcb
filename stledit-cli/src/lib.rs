//! Command-line front end for stledit: load an ASCII STL, edit it, write it.
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use stledit_core::{Axis, Mesh, Point3, StlResult, Transform, Vector3, VolumeMode};
use tracing::info;

/// Scale, translate and rotate ASCII STL meshes.
///
/// Operations run in a fixed order: scale, translate, then rotations about
/// X, Y and Z. Rotations turn the mesh about its own centroid.
#[derive(Debug, Parser)]
#[command(name = "stledit", version)]
pub struct Cli {
    /// ASCII STL file to read
    pub input: PathBuf,

    /// Write the edited mesh here
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file with the edited mesh
    #[arg(long)]
    pub in_place: bool,

    /// Uniform scale factor
    #[arg(long, allow_negative_numbers = true)]
    pub scale: Option<f64>,

    /// Offset as X,Y,Z
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    pub translate: Option<Vector3<f64>>,

    /// Rotation about the X axis, in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub rotate_x: Option<f64>,

    /// Rotation about the Y axis, in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub rotate_y: Option<f64>,

    /// Rotation about the Z axis, in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub rotate_z: Option<f64>,

    /// Weight the centroid by signed tetrahedron volume
    #[arg(long)]
    pub signed_volume: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn plan(&self) -> EditPlan {
        let rotations = [
            (Axis::X, self.rotate_x),
            (Axis::Y, self.rotate_y),
            (Axis::Z, self.rotate_z),
        ]
        .into_iter()
        .filter_map(|(axis, degrees)| degrees.map(|d| (axis, d)))
        .collect();

        EditPlan {
            scale: self.scale,
            translate: self.translate,
            rotations,
        }
    }

    fn volume_mode(&self) -> VolumeMode {
        if self.signed_volume {
            VolumeMode::Signed
        } else {
            VolumeMode::Absolute
        }
    }
}

fn parse_vector(s: &str) -> std::result::Result<Vector3<f64>, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate in `{s}`: {e}"))?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected X,Y,Z, got {} values", parts.len())),
    }
}

/// Ordered list of edits to apply to a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditPlan {
    pub scale: Option<f64>,
    pub translate: Option<Vector3<f64>>,
    /// Axis and angle in degrees, applied in order
    pub rotations: Vec<(Axis, f64)>,
}

impl EditPlan {
    pub fn is_empty(&self) -> bool {
        self.scale.is_none() && self.translate.is_none() && self.rotations.is_empty()
    }

    /// Apply every edit to `mesh` in order.
    ///
    /// # Errors
    ///
    /// Fails if a rotation is requested on a mesh without a defined centroid.
    pub fn apply(&self, mesh: &mut Mesh) -> StlResult<()> {
        if let Some(factor) = self.scale {
            mesh.scale(factor);
        }
        if let Some(offset) = &self.translate {
            mesh.translate(offset);
        }
        for &(axis, degrees) in &self.rotations {
            mesh.rotate(&Transform::degrees(axis, degrees))?;
        }
        Ok(())
    }
}

/// Summary of a run, printed by the binary
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub name: String,
    pub triangles: usize,
    pub volume: Option<f64>,
    pub centroid: Option<Point3<f64>>,
    pub written: Option<PathBuf>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "solid:     {}", self.name)?;
        writeln!(f, "triangles: {}", self.triangles)?;
        match (self.volume, self.centroid) {
            (Some(volume), Some(c)) => {
                writeln!(f, "volume:    {volume}")?;
                write!(f, "centroid:  ({}, {}, {})", c.x, c.y, c.z)?;
            }
            _ => write!(f, "volume:    undefined (degenerate mesh)")?,
        }
        if let Some(path) = &self.written {
            write!(f, "\nwritten:   {}", path.display())?;
        }
        Ok(())
    }
}

/// Load, edit, optionally write, and summarize.
///
/// # Errors
///
/// Returns an error if loading, editing or writing fails.
pub fn run(cli: &Cli) -> Result<Report> {
    let mut mesh = Mesh::from_file(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    mesh.set_volume_mode(cli.volume_mode());

    let plan = cli.plan();
    plan.apply(&mut mesh)
        .with_context(|| format!("failed to edit {}", cli.input.display()))?;
    if !plan.is_empty() {
        info!(?plan, "applied edits");
    }

    let written = if cli.in_place {
        mesh.save()
            .with_context(|| format!("failed to write {}", cli.input.display()))?;
        Some(cli.input.clone())
    } else if let Some(output) = &cli.output {
        mesh.to_file(output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        Some(output.clone())
    } else {
        None
    };

    let props = mesh.mass_properties().ok().cloned();
    Ok(Report {
        name: mesh.name().to_string(),
        triangles: mesh.triangle_count(),
        volume: props.as_ref().map(|p| p.volume),
        centroid: props.map(|p| p.centroid),
        written,
    })
}
