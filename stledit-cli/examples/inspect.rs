//! Example: Load an STL file and print its mass properties
//!
//! Usage: cargo run --example inspect -- path/to/file.stl
use std::env;

use anyhow::{Context, Result};
use stledit_core::{Mesh, VolumeMode};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut mesh = if let Some(path) = args.get(1) {
        println!("Loading STL file: {path}");
        Mesh::from_file(path).with_context(|| format!("failed to load {path}"))?
    } else {
        eprintln!("Usage: {} <stl-file>", args[0]);
        eprintln!("\nNo STL file provided, using default cube...");
        Mesh::cube(2.0)
    };

    println!("Loaded {} triangles from solid {:?}", mesh.triangle_count(), mesh.name());

    for mode in [VolumeMode::Absolute, VolumeMode::Signed] {
        mesh.set_volume_mode(mode);
        match mesh.mass_properties() {
            Ok(props) => println!(
                "{mode:?}: volume {:.6}, centroid ({:.6}, {:.6}, {:.6})",
                props.volume, props.centroid.x, props.centroid.y, props.centroid.z
            ),
            Err(e) => println!("{mode:?}: {e}"),
        }
    }

    Ok(())
}
