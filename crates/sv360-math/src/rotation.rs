//! Yaw/pitch/roll rotation of sphere points.
//!
//! Angles are kept in hundredths of a degree ([`ROT_PRECISION`]) so that a
//! rotation read from a configuration file is reproduced exactly on every call.
//!
//! # Order
//!
//! The forward rotation applies, in this order:
//!
//! 1. roll about the X axis
//! 2. pitch about the Z axis (positive pitch tilts +X toward -Y)
//! 3. yaw about the Y axis
//!
//! The inverse applies the negated elementary rotations in reverse order, so
//! `inverse_rotate(rotate(p)) == p` up to floating point rounding.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Fixed-point scale of stored angles (hundredths of a degree).
pub const ROT_PRECISION: i32 = 100;

/// A 3D rotation in fixed-point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RotationDegrees", into = "RotationDegrees")]
pub struct SphereRotation {
    /// Rotation about Y, hundredths of a degree.
    pub yaw: i32,
    /// Rotation about Z, hundredths of a degree.
    pub pitch: i32,
    /// Rotation about X, hundredths of a degree.
    pub roll: i32,
}

/// Serialized form of [`SphereRotation`], plain degrees.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct RotationDegrees {
    yaw: f64,
    pitch: f64,
    roll: f64,
}

impl From<RotationDegrees> for SphereRotation {
    fn from(d: RotationDegrees) -> Self {
        Self::from_degrees(d.yaw, d.pitch, d.roll)
    }
}

impl From<SphereRotation> for RotationDegrees {
    fn from(r: SphereRotation) -> Self {
        let (yaw, pitch, roll) = r.degrees();
        Self { yaw, pitch, roll }
    }
}

impl SphereRotation {
    /// No rotation.
    pub const IDENTITY: Self = Self {
        yaw: 0,
        pitch: 0,
        roll: 0,
    };

    /// Builds a rotation from degrees, rounding to hundredths.
    pub fn from_degrees(yaw: f64, pitch: f64, roll: f64) -> Self {
        let fix = |d: f64| (d * ROT_PRECISION as f64).round() as i32;
        Self {
            yaw: fix(yaw),
            pitch: fix(pitch),
            roll: fix(roll),
        }
    }

    /// Angles in degrees `(yaw, pitch, roll)`.
    pub fn degrees(&self) -> (f64, f64, f64) {
        let p = ROT_PRECISION as f64;
        (self.yaw as f64 / p, self.pitch as f64 / p, self.roll as f64 / p)
    }

    /// Returns `true` if all three angles are zero.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.yaw == 0 && self.pitch == 0 && self.roll == 0
    }

    /// Forward rotation matrix.
    pub fn matrix(&self) -> DMat3 {
        let (yaw, pitch, roll) = self.radians();
        DMat3::from_rotation_y(yaw) * DMat3::from_rotation_z(-pitch) * DMat3::from_rotation_x(roll)
    }

    /// Inverse rotation matrix.
    pub fn inverse_matrix(&self) -> DMat3 {
        let (yaw, pitch, roll) = self.radians();
        DMat3::from_rotation_x(-roll) * DMat3::from_rotation_z(pitch) * DMat3::from_rotation_y(-yaw)
    }

    /// Rotates a point (rotate3D).
    pub fn rotate(&self, p: DVec3) -> DVec3 {
        self.matrix() * p
    }

    /// Undoes [`rotate`](Self::rotate) (invRotate3D).
    pub fn inverse_rotate(&self, p: DVec3) -> DVec3 {
        self.inverse_matrix() * p
    }

    fn radians(&self) -> (f64, f64, f64) {
        let (y, p, r) = self.degrees();
        (y.to_radians(), p.to_radians(), r.to_radians())
    }
}

/// Direction in which a [`Rotator`] is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    /// Apply the rotation.
    Forward,
    /// Undo the rotation.
    Inverse,
}

/// A rotation with its matrix precomputed, for per-sample use.
#[derive(Debug, Clone, Copy)]
pub struct Rotator {
    matrix: DMat3,
    identity: bool,
}

impl Rotator {
    /// Precomputes `rotation` in the given direction.
    pub fn new(rotation: SphereRotation, direction: RotationDirection) -> Self {
        let matrix = match direction {
            RotationDirection::Forward => rotation.matrix(),
            RotationDirection::Inverse => rotation.inverse_matrix(),
        };
        Self {
            matrix,
            identity: rotation.is_identity(),
        }
    }

    /// Applies the rotation.
    #[inline]
    pub fn apply(&self, p: DVec3) -> DVec3 {
        if self.identity { p } else { self.matrix * p }
    }
}
