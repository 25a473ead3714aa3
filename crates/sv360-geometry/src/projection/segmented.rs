//! Segmented sphere projection (SSP).
//!
//! Faces 0 and 1 are polar caps above 45 and below -45 degrees of latitude,
//! stored as disks inscribed in their face (latitude linear in radius). Faces
//! 2 to 5 split the equatorial band into four 90 degree segments, each stored
//! equirectangularly.

use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use sv360_math::sphere::{angles_from_direction, direction_from_angles};

use super::{SPos, SphereProjection};
use crate::ProjectionKind;

/// Segmented sphere projection.
#[derive(Debug, Clone)]
pub struct SegmentedSphere {
    width: usize,
    height: usize,
}

impl SegmentedSphere {
    /// Creates the projection.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Disk coordinates `(dx, dy)` in `[-1, 1]` of a continuous position.
    fn disk(&self, px: f64, py: f64) -> (f64, f64) {
        let (hw, hh) = (self.width as f64 / 2.0, self.height as f64 / 2.0);
        ((px - hw) / hw, (py - hh) / hh)
    }
}

impl SphereProjection for SegmentedSphere {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::SegmentedSphere
    }

    fn num_faces(&self) -> usize {
        6
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        let (w, h) = (self.width as f64, self.height as f64);
        match face {
            0 | 1 => {
                let (dx, dy) = self.disk(x + 0.5, y + 0.5);
                let r = dx.hypot(dy);
                let yaw = dy.atan2(dx);
                let pitch = if face == 0 {
                    FRAC_PI_2 - FRAC_PI_4 * r
                } else {
                    -FRAC_PI_2 + FRAC_PI_4 * r
                };
                direction_from_angles(yaw, pitch)
            }
            _ => {
                let yaw = -PI + (face - 2) as f64 * FRAC_PI_2 + (x + 0.5) / w * FRAC_PI_2;
                let pitch = FRAC_PI_4 - (y + 0.5) / h * FRAC_PI_2;
                direction_from_angles(yaw, pitch)
            }
        }
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let (w, h) = (self.width as f64, self.height as f64);
        let (yaw, pitch) = angles_from_direction(p);
        if pitch > FRAC_PI_4 || pitch < -FRAC_PI_4 {
            let (face, r) = if pitch > 0.0 {
                (0, (FRAC_PI_2 - pitch) / FRAC_PI_4)
            } else {
                (1, (pitch + FRAC_PI_2) / FRAC_PI_4)
            };
            let (s, c) = yaw.sin_cos();
            return SPos::new(face, (1.0 + r * c) * w / 2.0 - 0.5, (1.0 + r * s) * h / 2.0 - 0.5);
        }
        let seg = (((yaw + PI) / FRAC_PI_2).floor() as i64).clamp(0, 3);
        let local = yaw + PI - seg as f64 * FRAC_PI_2;
        SPos::new(
            2 + seg as usize,
            local / FRAC_PI_2 * w - 0.5,
            (FRAC_PI_4 - pitch) / FRAC_PI_2 * h - 0.5,
        )
    }

    fn inside_face(&self, face: usize, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        if face >= 2 {
            return true;
        }
        let (dx, dy) = self.disk(x as f64 + 0.5, y as f64 + 0.5);
        dx.hypot(dy) < 1.0
    }

    fn has_rectangular_faces(&self) -> bool {
        false
    }
}
