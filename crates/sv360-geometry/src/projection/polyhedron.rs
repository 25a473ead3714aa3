//! Triangular-face polyhedra: octahedron (OHP) and icosahedron (ISP).
//!
//! Each face buffer holds one triangle with its apex at the top centre and its
//! base along the bottom edge:
//!
//! ```text
//!  (0,0)        apex (W/2, 0)
//!    +------------*------------+
//!    |          /   \          |
//!    |        /       \        |
//!    |      /           \      |
//!    +----*---------------*----+
//!   left (0, H)       right (W, H)
//! ```
//!
//! A face position is turned into barycentric coordinates of that triangle and
//! placed on the polyhedron face, then normalized onto the sphere (gnomonic
//! projection). The inverse picks the face whose normal is closest to the
//! direction, scales the direction onto that face plane and solves for the
//! barycentric coordinates. Positions outside the triangle extend the same
//! plane, which is what sphere padding relies on.

use glam::DVec3;
use sv360_math::sphere::direction_from_angles;

use super::{SPos, SphereProjection};
use crate::ProjectionKind;

#[derive(Debug, Clone, Copy)]
struct TriFace {
    apex: DVec3,
    left: DVec3,
    right: DVec3,
    normal: DVec3,
    /// Distance of the face plane from the centre.
    dist: f64,
}

impl TriFace {
    fn new(apex: DVec3, left: DVec3, right: DVec3) -> Self {
        let normal = (apex + left + right).normalize();
        Self {
            apex,
            left,
            right,
            normal,
            dist: normal.dot(apex),
        }
    }
}

/// Octahedron or icosahedron projection.
#[derive(Debug, Clone)]
pub struct Polyhedron {
    kind: ProjectionKind,
    width: usize,
    height: usize,
    faces: Vec<TriFace>,
}

impl Polyhedron {
    /// Octahedron with faces 0, 2, 4, 6 around the north pole and their
    /// lower neighbours at the odd ids.
    pub fn octahedron(width: usize, height: usize) -> Self {
        let upper = [
            (DVec3::Z, DVec3::X),
            (DVec3::NEG_Z, DVec3::NEG_X),
            (DVec3::NEG_X, DVec3::Z),
            (DVec3::X, DVec3::NEG_Z),
        ];
        let mut faces = Vec::with_capacity(8);
        for (left, right) in upper {
            faces.push(TriFace::new(DVec3::Y, left, right));
            faces.push(TriFace::new(DVec3::NEG_Y, right, left));
        }
        Self {
            kind: ProjectionKind::Octahedron,
            width,
            height,
            faces,
        }
    }

    /// Icosahedron with five faces around each pole and ten around the equator.
    ///
    /// | ids | apex | base |
    /// |-----|------|------|
    /// | `2k` | north pole | upper ring `k`, `k+1` |
    /// | `2k+1` | lower ring `k` | upper ring `k+1`, `k` |
    /// | `11+2k` | upper ring `k+1` | lower ring `k`, `k+1` |
    /// | `10+2k` | south pole | lower ring `k+1`, `k` |
    pub fn icosahedron(width: usize, height: usize) -> Self {
        let lat = 0.5f64.atan();
        let upper: Vec<DVec3> = (0..5)
            .map(|k| direction_from_angles((72.0 * k as f64).to_radians(), lat))
            .collect();
        let lower: Vec<DVec3> = (0..5)
            .map(|k| direction_from_angles((72.0 * k as f64 + 36.0).to_radians(), -lat))
            .collect();
        let faces = (0..20)
            .map(|id| {
                let k = (id % 10) / 2;
                let k1 = (k + 1) % 5;
                match (id >= 10, id % 2 == 1) {
                    (false, false) => TriFace::new(DVec3::Y, upper[k], upper[k1]),
                    (false, true) => TriFace::new(lower[k], upper[k1], upper[k]),
                    (true, true) => TriFace::new(upper[k1], lower[k], lower[k1]),
                    (true, false) => TriFace::new(DVec3::NEG_Y, lower[k1], lower[k]),
                }
            })
            .collect();
        Self {
            kind: ProjectionKind::Icosahedron,
            width,
            height,
            faces,
        }
    }

    /// Barycentric weights `(s, t)` of the left and right base vertices for a
    /// continuous face position (pixel centres at `+0.5`).
    fn barycentric(&self, px: f64, py: f64) -> (f64, f64) {
        let (w, h) = (self.width as f64, self.height as f64);
        let along = py / h;
        let across = (2.0 * px - w) / w;
        ((along - across) / 2.0, (along + across) / 2.0)
    }
}

impl SphereProjection for Polyhedron {
    fn kind(&self) -> ProjectionKind {
        self.kind
    }

    fn num_faces(&self) -> usize {
        self.faces.len()
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        let f = &self.faces[face];
        let (s, t) = self.barycentric(x + 0.5, y + 0.5);
        (f.apex + s * (f.left - f.apex) + t * (f.right - f.apex)).normalize()
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let (face, f) = self
            .faces
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.normal.dot(p).total_cmp(&b.1.normal.dot(p)))
            .map(|(i, f)| (i, *f))
            .unwrap_or((0, self.faces[0]));
        let q = p * (f.dist / f.normal.dot(p));
        let (e1, e2, r) = (f.left - f.apex, f.right - f.apex, q - f.apex);
        let (a, b, c) = (e1.dot(e1), e1.dot(e2), e2.dot(e2));
        let (d1, d2) = (r.dot(e1), r.dot(e2));
        let det = a * c - b * b;
        let s = (d1 * c - d2 * b) / det;
        let t = (d2 * a - d1 * b) / det;
        let (w, h) = (self.width as f64, self.height as f64);
        SPos::new(face, w / 2.0 + (t - s) * w / 2.0 - 0.5, (s + t) * h - 0.5)
    }

    fn inside_face(&self, _face: usize, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        let (s, t) = self.barycentric(x as f64 + 0.5, y as f64 + 0.5);
        s >= 0.0 && t >= 0.0 && s + t <= 1.0
    }

    fn has_rectangular_faces(&self) -> bool {
        false
    }
}
