//! Equirectangular and cylindrical equal-area projections.
//!
//! Both are single-face cylindrical projections: the horizontal axis is linear
//! in yaw over `[-180, 180)`. Equirectangular is linear in pitch too, the
//! equal-area variant linear in `sin(pitch)`.

use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use sv360_math::sphere::{angles_from_direction, direction_from_angles};

use super::{SPos, SphereProjection};
use crate::ProjectionKind;

/// Equirectangular (ERP) or equal-area (EAP) projection.
#[derive(Debug, Clone)]
pub struct Equirect {
    width: usize,
    height: usize,
    equal_area: bool,
}

impl Equirect {
    /// Equirectangular projection.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            equal_area: false,
        }
    }

    /// Cylindrical equal-area projection.
    pub fn equal_area(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            equal_area: true,
        }
    }

    /// Pitch of the (fractional) row `y`, radians.
    pub fn row_pitch(&self, y: f64) -> f64 {
        let v = (y + 0.5) / self.height as f64;
        if self.equal_area {
            (1.0 - 2.0 * v).clamp(-1.0, 1.0).asin()
        } else {
            FRAC_PI_2 - v * PI
        }
    }
}

impl SphereProjection for Equirect {
    fn kind(&self) -> ProjectionKind {
        if self.equal_area {
            ProjectionKind::EqualArea
        } else {
            ProjectionKind::Equirectangular
        }
    }

    fn num_faces(&self) -> usize {
        1
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, _face: usize, x: f64, y: f64) -> DVec3 {
        let yaw = (x + 0.5) / self.width as f64 * TAU - PI;
        direction_from_angles(yaw, self.row_pitch(y))
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let (yaw, pitch) = angles_from_direction(p);
        let x = (yaw + PI) / TAU * self.width as f64 - 0.5;
        let v = if self.equal_area {
            (1.0 - pitch.sin()) / 2.0
        } else {
            (FRAC_PI_2 - pitch) / PI
        };
        SPos::new(0, x, v * self.height as f64 - 0.5)
    }
}
