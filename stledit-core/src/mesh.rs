//! Triangle-soup mesh with cached mass properties.
//!
//! Volume and centroid come from a tetrahedral decomposition: every triangle
//! forms a tetrahedron with the origin, and the mesh centroid is the
//! volume-weighted average of the tetrahedron centroids.
//!
//! The cached [`MassProperties`] are dropped by every operation that moves
//! or adds vertices and are recomputed lazily on the next access.

use std::path::{Path, PathBuf};

use nalgebra::{Matrix3, Point3, Vector3};
use tracing::{debug, info};

use crate::error::{StlError, StlResult};
use crate::geometry::Triangle;
use crate::stl;

/// Name used when the `solid` header carries none.
pub const DEFAULT_NAME: &str = "Unnamed";

/// How per-triangle tetrahedron volumes are weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VolumeMode {
    /// `|p1 · (p2 × p3)| / 6` per triangle.
    ///
    /// Exact only for convex meshes enclosing the origin; over-estimates the
    /// volume of non-convex or inconsistently wound meshes.
    #[default]
    Absolute,
    /// `p1 · (p2 × p3) / 6` per triangle.
    ///
    /// Exact for any closed mesh wound consistently outward.
    Signed,
}

/// Volume and centroid of a mesh, plus the per-triangle volumes they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MassProperties {
    /// Tetrahedron volume for each triangle, in triangle order.
    pub volumes: Vec<f64>,
    /// Sum of `volumes`.
    pub volume: f64,
    /// Volume-weighted centroid.
    pub centroid: Point3<f64>,
}

/// A named STL solid: an ordered sequence of independently owned triangles.
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    triangles: Vec<Triangle>,
    source: Option<PathBuf>,
    volume_mode: VolumeMode,
    mass: Option<MassProperties>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            triangles: Vec::with_capacity(capacity),
            source: None,
            volume_mode: VolumeMode::default(),
            mass: None,
        }
    }

    /// Build a mesh named [`DEFAULT_NAME`] from in-memory triangles
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            ..Self::new()
        }
    }

    /// Load an ASCII STL file.
    ///
    /// The returned mesh remembers `path` for [`Mesh::save`] and, unless it is
    /// empty, already carries fresh mass properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid ASCII STL.
    pub fn from_file<P: AsRef<Path>>(path: P) -> StlResult<Self> {
        stl::load_ascii(path)
    }

    /// Write the mesh as ASCII STL to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> StlResult<()> {
        stl::save_ascii(self, path)
    }

    /// Write the mesh back to the file it was loaded from.
    ///
    /// # Errors
    ///
    /// Returns [`StlError::NoSourcePath`] for meshes not loaded from a file,
    /// or an I/O error if writing fails.
    pub fn save(&self) -> StlResult<()> {
        let path = self.source.as_deref().ok_or(StlError::NoSourcePath)?;
        self.to_file(path)
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub(crate) fn set_source_path(&mut self, path: PathBuf) {
        self.source = Some(path);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the solid.
    ///
    /// The `solid` header keeps only its first token, so names must be a
    /// single non-empty token.
    ///
    /// # Errors
    ///
    /// Returns [`StlError::InvalidName`] if `name` is empty or contains
    /// whitespace.
    pub fn set_name(&mut self, name: impl Into<String>) -> StlResult<()> {
        let name = name.into();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(StlError::InvalidName { name });
        }
        self.name = name;
        Ok(())
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Mutable access to the triangles.
    ///
    /// Drops the cached mass properties. Normals are not touched; callers
    /// that move vertices must call [`Triangle::recompute_normal`].
    pub fn triangles_mut(&mut self) -> &mut [Triangle] {
        self.invalidate();
        &mut self.triangles
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.invalidate();
        self.triangles.push(triangle);
    }

    pub fn volume_mode(&self) -> VolumeMode {
        self.volume_mode
    }

    pub fn set_volume_mode(&mut self, mode: VolumeMode) {
        if mode != self.volume_mode {
            self.volume_mode = mode;
            self.invalidate();
        }
    }

    /// Recompute volume and centroid from the current vertices.
    ///
    /// # Errors
    ///
    /// Returns [`StlError::DegenerateMesh`] if the mesh has no triangles or
    /// the total tetrahedron volume is zero.
    pub fn calc_centroid_and_volume(&mut self) -> StlResult<&MassProperties> {
        let props = compute_mass_properties(&self.triangles, self.volume_mode)?;
        Ok(&*self.mass.insert(props))
    }

    /// Cached mass properties, computed first if unset.
    ///
    /// # Errors
    ///
    /// Same as [`Mesh::calc_centroid_and_volume`].
    pub fn mass_properties(&mut self) -> StlResult<&MassProperties> {
        let props = match self.mass.take() {
            Some(props) => props,
            None => compute_mass_properties(&self.triangles, self.volume_mode)?,
        };
        Ok(&*self.mass.insert(props))
    }

    /// Cached mass properties without recomputing.
    pub fn cached_mass_properties(&self) -> Option<&MassProperties> {
        self.mass.as_ref()
    }

    /// Total volume, computed first if the cache is unset.
    ///
    /// # Errors
    ///
    /// Same as [`Mesh::calc_centroid_and_volume`].
    pub fn volume(&mut self) -> StlResult<f64> {
        Ok(self.mass_properties()?.volume)
    }

    /// Volume-weighted centroid, computed first if the cache is unset.
    ///
    /// # Errors
    ///
    /// Same as [`Mesh::calc_centroid_and_volume`].
    pub fn centroid(&mut self) -> StlResult<Point3<f64>> {
        Ok(self.mass_properties()?.centroid)
    }

    /// Multiply every vertex coordinate by `factor`.
    ///
    /// Normals keep their direction under a uniform scale and are left as is.
    pub fn scale(&mut self, factor: f64) {
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                vertex.coords *= factor;
            }
        }
        self.invalidate();
        debug!(factor, "scaled mesh");
    }

    /// Add `offset` to every vertex.
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                vertex.coords += offset;
            }
        }
        self.invalidate();
        debug!(x = offset.x, y = offset.y, z = offset.z, "translated mesh");
    }

    /// Rotate the mesh about its own centroid and recompute every normal.
    ///
    /// The centroid is captured once before any vertex moves, and normals are
    /// only recomputed after all vertices have been rotated.
    ///
    /// # Errors
    ///
    /// Returns [`StlError::DegenerateMesh`] if the centroid is undefined.
    pub fn rotate(&mut self, rotation: &Matrix3<f64>) -> StlResult<()> {
        let centroid = self.centroid()?;

        for triangle in &mut self.triangles {
            for vertex in &mut triangle.vertices {
                *vertex = centroid + rotation * (*vertex - centroid);
            }
        }
        for triangle in &mut self.triangles {
            triangle.recompute_normal();
        }

        self.invalidate();
        info!(
            name = %self.name,
            triangles = self.triangles.len(),
            "rotated mesh about its centroid"
        );
        Ok(())
    }

    fn invalidate(&mut self) {
        if self.mass.take().is_some() {
            debug!(name = %self.name, "mass properties invalidated");
        }
    }

    /// Create an origin-centred cube with outward winding
    pub fn cube(size: f64) -> Self {
        let h = size / 2.0;
        let p = Point3::new;
        let faces = [
            // Front (+z)
            [p(-h, -h, h), p(h, -h, h), p(h, h, h), p(-h, h, h)],
            // Back (-z)
            [p(-h, -h, -h), p(-h, h, -h), p(h, h, -h), p(h, -h, -h)],
            // Top (+y)
            [p(-h, h, -h), p(-h, h, h), p(h, h, h), p(h, h, -h)],
            // Bottom (-y)
            [p(-h, -h, -h), p(h, -h, -h), p(h, -h, h), p(-h, -h, h)],
            // Right (+x)
            [p(h, -h, -h), p(h, h, -h), p(h, h, h), p(h, -h, h)],
            // Left (-x)
            [p(-h, -h, -h), p(-h, -h, h), p(-h, h, h), p(-h, h, -h)],
        ];

        let mut mesh = Self::with_capacity(faces.len() * 2);
        mesh.name = "cube".to_string();
        for [a, b, c, d] in faces {
            mesh.triangles.push(Triangle::new(a, b, c));
            mesh.triangles.push(Triangle::new(a, c, d));
        }
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_mass_properties(triangles: &[Triangle], mode: VolumeMode) -> StlResult<MassProperties> {
    let mut volumes = Vec::with_capacity(triangles.len());
    let mut volume = 0.0;
    let mut weighted = Vector3::zeros();

    for triangle in triangles {
        let tetra = match mode {
            VolumeMode::Absolute => triangle.signed_volume().abs(),
            VolumeMode::Signed => triangle.signed_volume(),
        };
        volume += tetra;
        weighted += triangle.tetrahedron_centroid().coords * tetra;
        volumes.push(tetra);
    }

    if volume == 0.0 || !volume.is_finite() {
        return Err(StlError::DegenerateMesh {
            triangles: triangles.len(),
        });
    }

    let centroid = Point3::from(weighted / volume);
    debug!(
        volume,
        cx = centroid.x,
        cy = centroid.y,
        cz = centroid.z,
        ?mode,
        "computed mass properties"
    );

    Ok(MassProperties {
        volumes,
        volume,
        centroid,
    })
}
