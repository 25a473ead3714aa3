//! Circular fisheye (equidistant) projection.
//!
//! The optical axis looks along `+X`. The angle from the axis grows linearly
//! with the distance from the circle centre, reaching `fov / 2` at the radius.
//! Samples outside the circle hold no picture content.

use glam::DVec3;

use super::{SPos, SphereProjection};
use crate::{FisheyeParams, ProjectionKind};

/// Circular fisheye projection.
#[derive(Debug, Clone)]
pub struct Fisheye {
    width: usize,
    height: usize,
    /// Half field of view, radians.
    half_fov: f64,
    cx: f64,
    cy: f64,
    radius: f64,
}

impl Fisheye {
    /// Creates the projection, resolving unset parameters to the face centre
    /// and the inscribed circle.
    pub fn new(width: usize, height: usize, params: &FisheyeParams) -> Self {
        Self {
            width,
            height,
            half_fov: params.fov.to_radians() / 2.0,
            cx: params.center_x.unwrap_or(width as f64 / 2.0),
            cy: params.center_y.unwrap_or(height as f64 / 2.0),
            radius: params.radius.unwrap_or(width.min(height) as f64 / 2.0),
        }
    }
}

impl SphereProjection for Fisheye {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::FisheyeCircular
    }

    fn num_faces(&self) -> usize {
        1
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, _face: usize, x: f64, y: f64) -> DVec3 {
        let (dx, dy) = (x + 0.5 - self.cx, y + 0.5 - self.cy);
        let r = dx.hypot(dy);
        if r < 1e-12 {
            return DVec3::X;
        }
        let theta = r / self.radius * self.half_fov;
        let (s, c) = theta.sin_cos();
        DVec3::new(c, -s * dy / r, -s * dx / r)
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let theta = p.x.clamp(-1.0, 1.0).acos();
        let s = p.y.hypot(p.z);
        let r = theta / self.half_fov * self.radius;
        let (dx, dy) = if s < 1e-12 { (0.0, 0.0) } else { (-p.z / s * r, -p.y / s * r) };
        let clamp = |v: f64, size: usize| v.clamp(-0.5, size as f64 - 0.5);
        SPos::new(
            0,
            clamp(self.cx + dx - 0.5, self.width),
            clamp(self.cy + dy - 0.5, self.height),
        )
    }

    fn outside_image(&self, _face: usize, x: i32, y: i32) -> bool {
        let (dx, dy) = (x as f64 + 0.5 - self.cx, y as f64 + 0.5 - self.cy);
        dx.hypot(dy) >= self.radius - 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::testing::assert_roundtrip;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_axis_and_rim() {
        let fe = Fisheye::new(64, 64, &FisheyeParams::default());
        let p = fe.map_2d_to_3d(0, 31.5, 31.5);
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-12);
        // right rim of a 180 degree lens looks along -Z (yaw 90)
        let p = fe.map_2d_to_3d(0, 63.5, 31.5);
        assert_abs_diff_eq!(p.z, -1.0, epsilon = 1e-12);
        let pos = fe.map_3d_to_2d(DVec3::NEG_X);
        assert!(pos.x >= -0.5 && pos.x <= 63.5);
    }

    #[test]
    fn test_outside_circle() {
        let fe = Fisheye::new(64, 64, &FisheyeParams::default());
        assert!(fe.outside_image(0, 0, 0));
        assert!(!fe.outside_image(0, 32, 32));
        assert!(!fe.outside_image(0, 2, 31));
    }

    #[test]
    fn test_roundtrip_custom_lens() {
        let params = FisheyeParams {
            fov: 200.0,
            center_x: Some(30.0),
            center_y: Some(20.0),
            radius: Some(18.0),
        };
        assert_roundtrip(&Fisheye::new(60, 40, &params), 1, 1e-9);
        assert_roundtrip(&Fisheye::new(48, 48, &FisheyeParams::default()), 1, 1e-9);
    }
}
