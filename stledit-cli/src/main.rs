//! stledit - edit ASCII STL meshes from the command line
//!
//! Examples:
//!   stledit part.stl                          report name, volume and centroid
//!   stledit part.stl --rotate-y 90 -o out.stl rotate about the centroid
//!   stledit part.stl --scale 0.5 --in-place   shrink and overwrite
use anyhow::Result;
use clap::Parser;
use stledit_cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let report = run(&cli)?;
    println!("{report}");

    Ok(())
}
