//! Rotation matrix builders
use nalgebra::{Matrix3, Rotation3, Vector3};

/// Coordinate axis to rotate about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Transform builder for mesh rotations.
///
/// All matrices follow the right-handed convention: a positive angle turns
/// counter-clockwise when looking down the positive axis towards the origin.
pub struct Transform;

impl Transform {
    /// Rotation matrix about `axis` by `angle` radians
    pub fn rotation_matrix(axis: Axis, angle: f64) -> Matrix3<f64> {
        Rotation3::new(axis.unit() * angle).into_inner()
    }

    /// Rotation matrix about the X axis by `angle` radians
    pub fn rotation_x(angle: f64) -> Matrix3<f64> {
        Self::rotation_matrix(Axis::X, angle)
    }

    /// Rotation matrix about the Y axis by `angle` radians
    pub fn rotation_y(angle: f64) -> Matrix3<f64> {
        Self::rotation_matrix(Axis::Y, angle)
    }

    /// Rotation matrix about the Z axis by `angle` radians
    pub fn rotation_z(angle: f64) -> Matrix3<f64> {
        Self::rotation_matrix(Axis::Z, angle)
    }

    /// Same as [`Transform::rotation_matrix`] with the angle in degrees
    pub fn degrees(axis: Axis, degrees: f64) -> Matrix3<f64> {
        Self::rotation_matrix(axis, degrees.to_radians())
    }
}
