//! Rotated sphere projection (RSP).
//!
//! Two faces, each an equirectangular segment spanning 270 degrees of yaw and
//! 90 degrees of pitch. Face 0 is centred on `+X`. Face 1 is the same segment
//! in a rotated frame, `q = (-x, z, y)`, so it covers the back and both poles.
//! Together the segments cover the sphere like the two halves of a tennis
//! ball; where they overlap, a direction belongs to the segment it lies
//! deeper inside, so faces are not full rectangles.

use glam::DVec3;
use std::f64::consts::FRAC_PI_4;
use sv360_math::sphere::{angles_from_direction, direction_from_angles};

use super::{SPos, SphereProjection};
use crate::ProjectionKind;

const HALF_YAW: f64 = 3.0 * FRAC_PI_4;
const HALF_PITCH: f64 = FRAC_PI_4;

/// Rotated sphere projection.
#[derive(Debug, Clone)]
pub struct RotatedSphere {
    width: usize,
    height: usize,
}

/// Frame change between the two segments; its own inverse.
#[inline]
fn swap_frame(p: DVec3) -> DVec3 {
    DVec3::new(-p.x, p.z, p.y)
}

/// Angular distance of a segment-local direction to the segment border,
/// negative outside.
fn margin(local: DVec3) -> f64 {
    let (yaw, pitch) = angles_from_direction(local);
    (HALF_PITCH - pitch.abs()).min(HALF_YAW - yaw.abs())
}

impl RotatedSphere {
    /// Creates the projection. Faces are `3:1` for square samples.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Segment a direction belongs to.
    fn owner(p: DVec3) -> usize {
        usize::from(margin(p) < margin(swap_frame(p)))
    }
}

impl SphereProjection for RotatedSphere {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::RotatedSphere
    }

    fn num_faces(&self) -> usize {
        2
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        let yaw = ((x + 0.5) / self.width as f64 * 2.0 - 1.0) * HALF_YAW;
        let pitch = (1.0 - (y + 0.5) / self.height as f64 * 2.0) * HALF_PITCH;
        let local = direction_from_angles(yaw, pitch);
        if face == 0 { local } else { swap_frame(local) }
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let face = Self::owner(p);
        let local = if face == 0 { p } else { swap_frame(p) };
        let (yaw, pitch) = angles_from_direction(local);
        let x = (yaw / HALF_YAW + 1.0) / 2.0 * self.width as f64 - 0.5;
        let y = (1.0 - pitch / HALF_PITCH) / 2.0 * self.height as f64 - 0.5;
        SPos::new(face, x, y)
    }

    fn inside_face(&self, face: usize, x: i32, y: i32) -> bool {
        let (w, h) = self.face_size();
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            return false;
        }
        Self::owner(self.map_2d_to_3d(face, x as f64, y as f64)) == face
    }

    fn has_rectangular_faces(&self) -> bool {
        false
    }
}
