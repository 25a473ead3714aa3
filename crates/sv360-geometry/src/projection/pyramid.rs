//! Truncated square pyramid (TSP).
//!
//! Two square faces. Face 0 is the front (`+X`) cube face at full resolution.
//! Face 1 holds the rest of the sphere: the back face shrunk to the centre
//! half of the face, surrounded by four trapezoids that fold the side faces
//! back to the face border. The border of face 1 meets the border of face 0,
//! so both faces are continuous charts.
//!
//! ```text
//! face 1, s and t in [-1, 1], d = max(|s|, |t|)
//!
//!   d <= 1/2 : back face,   (-1, -2t, -2s)
//!   d >  1/2 : side faces,  (4d - 3, -t/d, -s/d)
//! ```

use glam::DVec3;

use super::{SPos, SphereProjection};
use crate::ProjectionKind;

/// Truncated square pyramid projection.
#[derive(Debug, Clone)]
pub struct TruncatedPyramid {
    width: usize,
    height: usize,
}

impl TruncatedPyramid {
    /// Creates the projection with `width x height` faces.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    fn to_unit(&self, x: f64, y: f64) -> (f64, f64) {
        (
            2.0 * (x + 0.5) / self.width as f64 - 1.0,
            2.0 * (y + 0.5) / self.height as f64 - 1.0,
        )
    }

    fn from_unit(&self, face: usize, s: f64, t: f64) -> SPos {
        SPos::new(
            face,
            (s + 1.0) / 2.0 * self.width as f64 - 0.5,
            (t + 1.0) / 2.0 * self.height as f64 - 0.5,
        )
    }
}

impl SphereProjection for TruncatedPyramid {
    fn kind(&self) -> ProjectionKind {
        ProjectionKind::TruncatedSquarePyramid
    }

    fn num_faces(&self) -> usize {
        2
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        let (s, t) = self.to_unit(x, y);
        if face == 0 {
            return DVec3::new(1.0, -t, -s).normalize();
        }
        let d = s.abs().max(t.abs());
        if d <= 0.5 {
            DVec3::new(-1.0, -2.0 * t, -2.0 * s).normalize()
        } else {
            DVec3::new(4.0 * d - 3.0, -t / d, -s / d).normalize()
        }
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let m = p.y.abs().max(p.z.abs());
        if p.x >= m {
            return self.from_unit(0, -p.z / p.x, -p.y / p.x);
        }
        if -p.x >= m {
            let k = -2.0 * p.x;
            return self.from_unit(1, -p.z / k, -p.y / k);
        }
        // 0 < m here: the side faces
        let d = (p.x / m + 3.0) / 4.0;
        self.from_unit(1, -p.z / m * d, -p.y / m * d)
    }
}
