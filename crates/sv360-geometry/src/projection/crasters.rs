//! Craster parabolic projection (CPP).
//!
//! An equal-area pseudo-cylindrical projection used for cross-format quality
//! measurement. Meridians are parabolas, so the picture corners outside the
//! outline belong to no face.

use glam::DVec3;
use std::f64::consts::PI;
use sv360_math::sphere::{angles_from_direction, direction_from_angles};

use super::{SPos, SphereProjection};
use crate::ProjectionKind;

/// Craster parabolic projection.
#[derive(Debug, Clone)]
pub struct CrastersParabolic {
    width: usize,
    height: usize,
}

impl CrastersParabolic {
    /// Creates the projection.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Normalized picture coordinates in `[-1, 1]` (`Y` up).
    fn normalized(&self, x: f64, y: f64) -> (f64, f64) {
        (
            2.0 * (x + 0.5) / self.width as f64 - 1.0,
            1.0 - 2.0 * (y + 0.5) / self.height as f64,
        )
    }

    /// Half-width of the outline at latitude `phi`, normalized.
    fn half_width(phi: f64) -> f64 {
        2.0 * (2.0 * phi / 3.0).cos() - 1.0
    }
}

impl SphereProjection for CrastersParabolic {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::CrastersParabolic
    }

    fn num_faces(&self) -> usize {
        1
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, _face: usize, x: f64, y: f64) -> DVec3 {
        let (nx, ny) = self.normalized(x, y);
        let phi = 3.0 * (ny / 2.0).clamp(-1.0, 1.0).asin();
        let denom = Self::half_width(phi);
        let lambda = if denom.abs() < 1e-12 { 0.0 } else { PI * nx / denom };
        direction_from_angles(lambda, phi)
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let (lambda, phi) = angles_from_direction(p);
        let ny = 2.0 * (phi / 3.0).sin();
        let nx = lambda * Self::half_width(phi) / PI;
        SPos::new(
            0,
            (nx + 1.0) * self.width as f64 / 2.0 - 0.5,
            (1.0 - ny) * self.height as f64 / 2.0 - 0.5,
        )
    }

    fn inside_face(&self, _face: usize, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        let (nx, ny) = self.normalized(x as f64, y as f64);
        let phi = 3.0 * (ny / 2.0).asin();
        nx.abs() <= Self::half_width(phi)
    }

    fn has_rectangular_faces(&self) -> bool {
        false
    }
}
