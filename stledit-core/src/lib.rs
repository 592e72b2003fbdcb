//! stledit core library - STL meshes and rigid-body edits
//!
//! Parses and writes ASCII STL, computes volume and centroid by tetrahedral
//! decomposition, and applies scale, translation and rotation about the
//! mesh centroid.

pub mod error;
pub mod geometry;
pub mod mesh;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use error::{StlError, StlResult};
pub use geometry::Triangle;
pub use mesh::{MassProperties, Mesh, VolumeMode, DEFAULT_NAME};
pub use transform::{Axis, Transform};

pub use nalgebra::{Matrix3, Point3, Vector3};
