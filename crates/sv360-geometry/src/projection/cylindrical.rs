//! Equatorial cylindrical projection (ECP).
//!
//! Six faces. Faces 0 to 3 split the equatorial band `|sin(pitch)| <= 2/3`
//! into four 90 degree yaw segments, equal-area vertically like EAP. Faces 4
//! (north) and 5 (south) hold the polar caps: the square face is mapped onto
//! the cap disk with the concentric square-to-disk map, radius linear in
//! colatitude. Cap faces are oriented like the top and bottom cube faces.

use glam::DVec3;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use sv360_math::sphere::{angles_from_direction, direction_from_angles};

use super::{SPos, SphereProjection};
use crate::ProjectionKind;

/// `sin(pitch)` at the border between the band and the caps.
pub const BAND_LIMIT: f64 = 2.0 / 3.0;

/// Equatorial cylindrical projection.
#[derive(Debug, Clone)]
pub struct EquatorialCylindrical {
    width: usize,
    height: usize,
    /// Colatitude of the cap border, radians.
    cap: f64,
}

/// Concentric map from the square `[-1, 1]^2` to the unit disk.
fn square_to_disk(a: f64, b: f64) -> (f64, f64) {
    if a == 0.0 && b == 0.0 {
        (0.0, 0.0)
    } else if a.abs() > b.abs() {
        let phi = FRAC_PI_4 * b / a;
        (a * phi.cos(), a * phi.sin())
    } else {
        let phi = FRAC_PI_4 * a / b;
        (b * phi.sin(), b * phi.cos())
    }
}

fn disk_to_square(dx: f64, dy: f64) -> (f64, f64) {
    let r = dx.hypot(dy);
    if r == 0.0 {
        (0.0, 0.0)
    } else if dx.abs() > dy.abs() {
        let a = r.copysign(dx);
        (a, a * (dy / dx).atan() / FRAC_PI_4)
    } else {
        let b = r.copysign(dy);
        (b * (dx / dy).atan() / FRAC_PI_4, b)
    }
}

impl EquatorialCylindrical {
    /// Creates the projection with `width x height` faces.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cap: BAND_LIMIT.acos(),
        }
    }

    fn cap_point(&self, face: usize, a: f64, b: f64) -> DVec3 {
        let (dx, dy) = square_to_disk(a, b);
        let r = dx.hypot(dy);
        let theta = r * self.cap;
        let (s, c) = theta.sin_cos();
        let (hx, hz) = if r > 0.0 { (dx / r * s, dy / r * s) } else { (0.0, 0.0) };
        if face == 4 {
            DVec3::new(hx, c, hz)
        } else {
            DVec3::new(hx, -c, -hz)
        }
    }
}

impl SphereProjection for EquatorialCylindrical {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::EquatorialCylindrical
    }

    fn num_faces(&self) -> usize {
        6
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        let u = (x + 0.5) / self.width as f64;
        let v = (y + 0.5) / self.height as f64;
        if face >= 4 {
            return self.cap_point(face, 2.0 * u - 1.0, 2.0 * v - 1.0);
        }
        let yaw = (face as f64 + u) * FRAC_PI_2 - PI;
        let sin_pitch = (BAND_LIMIT * (1.0 - 2.0 * v)).clamp(-1.0, 1.0);
        direction_from_angles(yaw, sin_pitch.asin())
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let (w, h) = (self.width as f64, self.height as f64);
        if p.y.abs() > BAND_LIMIT {
            let face = if p.y > 0.0 { 4 } else { 5 };
            let theta = p.y.abs().clamp(0.0, 1.0).acos();
            let r = p.x.hypot(p.z);
            let rho = theta / self.cap;
            let (dx, dy) = if r > 0.0 { (rho * p.x / r, rho * p.z / r) } else { (0.0, 0.0) };
            let dy = if face == 4 { dy } else { -dy };
            let (a, b) = disk_to_square(dx, dy);
            return SPos::new(face, (a + 1.0) / 2.0 * w - 0.5, (b + 1.0) / 2.0 * h - 0.5);
        }
        let (yaw, _) = angles_from_direction(p);
        let seg = (yaw + PI) / FRAC_PI_2;
        let face = (seg.floor().max(0.0) as usize).min(3);
        let x = (seg - face as f64) * w - 0.5;
        let y = (1.0 - p.y / BAND_LIMIT) / 2.0 * h - 0.5;
        SPos::new(face, x, y)
    }
}
