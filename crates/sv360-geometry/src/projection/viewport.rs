//! Rectilinear viewport.
//!
//! A pinhole camera with the given horizontal and vertical field of view,
//! looking in the direction `(yaw, pitch)`. Directions behind the camera are
//! clamped onto the picture border.

use glam::{DMat3, DVec3};

use super::{SPos, SphereProjection};
use crate::{ProjectionKind, ViewportParams};

/// Viewport projection.
#[derive(Debug, Clone)]
pub struct Viewport {
    width: usize,
    height: usize,
    fx: f64,
    fy: f64,
    to_world: DMat3,
}

impl Viewport {
    /// Creates the projection.
    pub fn new(width: usize, height: usize, params: &ViewportParams) -> Self {
        let fx = width as f64 / 2.0 / (params.hfov.to_radians() / 2.0).tan();
        let fy = height as f64 / 2.0 / (params.vfov.to_radians() / 2.0).tan();
        let to_world =
            DMat3::from_rotation_y(params.yaw.to_radians()) * DMat3::from_rotation_z(params.pitch.to_radians());
        Self {
            width,
            height,
            fx,
            fy,
            to_world,
        }
    }
}

impl SphereProjection for Viewport {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::Viewport
    }

    fn num_faces(&self) -> usize {
        1
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, _face: usize, x: f64, y: f64) -> DVec3 {
        let xn = (x + 0.5 - self.width as f64 / 2.0) / self.fx;
        let yn = (y + 0.5 - self.height as f64 / 2.0) / self.fy;
        self.to_world * DVec3::new(1.0, -yn, -xn).normalize()
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let c = self.to_world.transpose() * p;
        let depth = c.x.max(1e-9);
        let x = -c.z / depth * self.fx + self.width as f64 / 2.0 - 0.5;
        let y = -c.y / depth * self.fy + self.height as f64 / 2.0 - 0.5;
        SPos::new(
            0,
            x.clamp(-0.5, self.width as f64 - 0.5),
            y.clamp(-0.5, self.height as f64 - 0.5),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::testing::assert_roundtrip;
    use approx::assert_abs_diff_eq;
    use sv360_math::sphere::angles_deg_from_direction;

    #[test]
    fn test_viewing_direction() {
        let params = ViewportParams {
            hfov: 90.0,
            vfov: 60.0,
            yaw: 45.0,
            pitch: 30.0,
        };
        let vp = Viewport::new(64, 48, &params);
        let (yaw, pitch) = angles_deg_from_direction(vp.map_2d_to_3d(0, 31.5, 23.5));
        assert_abs_diff_eq!(yaw, 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pitch, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fov_edges() {
        let vp = Viewport::new(64, 64, &ViewportParams::default());
        let (yaw, _) = angles_deg_from_direction(vp.map_2d_to_3d(0, 63.5, 31.5));
        assert_abs_diff_eq!(yaw, 45.0, epsilon = 1e-9);
        let behind = vp.map_3d_to_2d(DVec3::NEG_X);
        assert!(behind.x >= -0.5 && behind.x <= 63.5);
    }

    #[test]
    fn test_roundtrip() {
        let params = ViewportParams {
            hfov: 75.0,
            vfov: 50.0,
            yaw: -120.0,
            pitch: -10.0,
        };
        assert_roundtrip(&Viewport::new(40, 30, &params), 1, 1e-9);
    }
}
