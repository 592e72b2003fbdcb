//! Triangle primitive for triangle-soup meshes
use nalgebra::{Point3, Vector3};

/// A triangle face defined by three vertices and a normal.
///
/// Winding order matters: it fixes the sign of the normal and of the
/// tetrahedron volume. The normal is never normalized; when derived it is the
/// raw cross product, whose length is twice the triangle's area. Callers that
/// need unit normals normalize explicitly.
///
/// Mutating `vertices` directly does not update `normal`; call
/// [`Triangle::recompute_normal`] afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f64>; 3],
    pub normal: Vector3<f64>,
}

impl Triangle {
    /// Create a triangle and derive its normal from the winding
    pub fn new(p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>) -> Self {
        Self {
            vertices: [p1, p2, p3],
            normal: cross_normal(&p1, &p2, &p3),
        }
    }

    /// Create a triangle with a normal taken verbatim from the source
    pub fn with_normal(
        p1: Point3<f64>,
        p2: Point3<f64>,
        p3: Point3<f64>,
        normal: Vector3<f64>,
    ) -> Self {
        Self {
            vertices: [p1, p2, p3],
            normal,
        }
    }

    /// Calculate the face normal from the triangle's current vertices
    pub fn compute_normal(&self) -> Vector3<f64> {
        let [p1, p2, p3] = &self.vertices;
        cross_normal(p1, p2, p3)
    }

    pub fn recompute_normal(&mut self) {
        self.normal = self.compute_normal();
    }

    /// Signed volume of the tetrahedron spanned by the origin and this triangle.
    ///
    /// Positive when the winding faces away from the origin.
    pub fn signed_volume(&self) -> f64 {
        let [p1, p2, p3] = &self.vertices;
        p1.coords.dot(&p2.coords.cross(&p3.coords)) / 6.0
    }

    /// Centroid of the tetrahedron spanned by the origin and this triangle
    pub fn tetrahedron_centroid(&self) -> Point3<f64> {
        let [p1, p2, p3] = &self.vertices;
        Point3::from((p1.coords + p2.coords + p3.coords) / 4.0)
    }
}

fn cross_normal(p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> Vector3<f64> {
    let edge1 = p2 - p1;
    let edge2 = p3 - p1;

    edge1.cross(&edge2)
}
