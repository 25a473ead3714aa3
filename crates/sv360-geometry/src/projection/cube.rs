//! Cubemap family.
//!
//! All cube variants share the face orientation below and differ only in the
//! per-axis warp between the face sample grid and the cube face plane.
//!
//! ```text
//! face  centre   right (+u)   down (+v)
//!  0     +X        -Z           -Y
//!  1     -X        +Z           -Y
//!  2     +Y        +X           +Z
//!  3     -Y        +X           -Z
//!  4     +Z        +X           -Y
//!  5     -Z        -X           -Y
//! ```
//!
//! | kind | warp |
//! |------|------|
//! | CMP | linear |
//! | EAC | `c = tan(pi t / 4)` |
//! | ACP | quadratic adjustment |
//! | HEC | equi-angular horizontally, hybrid (`k = 0.4`) vertically |
//! | GCMP | per-face coefficient, optionally depending on the other axis |
//!
//! The hemisphere variants keep faces 0, 2, 3, 4 and 5 of a cube and drop the
//! back face; points behind the viewer map to [`HIDDEN_FACE`].

use glam::DVec3;
use std::f64::consts::PI;

use super::{SPos, SphereProjection, HIDDEN_FACE};
use crate::{GeometryError, GeometryResult, ProjectionDescriptor, ProjectionKind};

/// Vertical coefficient of the hybrid equi-angular cubemap.
pub const HEC_COEFF: f64 = 0.4;

/// Mapping of one axis between face samples (`t`) and the cube plane (`c`).
///
/// Both coordinates are normalized to `[-1, 1]` over the face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisWarp {
    /// `c = t`.
    Linear,
    /// `c = tan(pi t / 4)`.
    Equiangular,
    /// Quadratic adjustment, `t = sgn(c) (1.36 |c| - 0.36 c^2)`.
    Adjusted,
    /// `c = t / (1 + k (1 - t^2))`.
    Hybrid(f64),
    /// `c = t / (1 + a (1 - |s|))`, where `s` is this axis' `t`, or the other
    /// axis' `t` when `cross` is set.
    Gcmp {
        /// Warp coefficient `a`.
        coeff: f64,
        /// Depend on the other axis.
        cross: bool,
    },
}

impl AxisWarp {
    /// Face coordinate to cube plane.
    pub fn to_cube(self, t: f64, other_t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Equiangular => (PI * t / 4.0).tan(),
            Self::Adjusted => t.signum() * (1.36 - (1.8496 - 1.44 * t.abs()).max(0.0).sqrt()) / 0.72,
            Self::Hybrid(k) => t / (1.0 + k * (1.0 - t * t)),
            Self::Gcmp { coeff, cross } => {
                let s = if cross { other_t.abs() } else { t.abs() };
                t / (1.0 + coeff * (1.0 - s))
            }
        }
    }

    /// Cube plane to face coordinate. `other_t` is only read by cross warps.
    pub fn to_plane(self, c: f64, other_t: f64) -> f64 {
        match self {
            Self::Linear => c,
            Self::Equiangular => 4.0 / PI * c.atan(),
            Self::Adjusted => c.signum() * (1.36 * c.abs() - 0.36 * c * c),
            Self::Hybrid(k) => {
                if c == 0.0 || k == 0.0 {
                    c
                } else {
                    (-1.0 + (1.0 + 4.0 * c * c * k * (1.0 + k)).sqrt()) / (2.0 * c * k)
                }
            }
            Self::Gcmp { coeff, cross: false } => c * (1.0 + coeff) / (1.0 + coeff * c.abs()),
            Self::Gcmp { coeff, cross: true } => c * (1.0 + coeff * (1.0 - other_t.abs())),
        }
    }

    fn is_cross(self) -> bool {
        matches!(self, Self::Gcmp { cross: true, .. })
    }
}

/// Warps of both axes of one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceWarp {
    /// Horizontal warp.
    pub u: AxisWarp,
    /// Vertical warp.
    pub v: AxisWarp,
}

impl FaceWarp {
    /// Same warp on both axes.
    pub const fn uniform(w: AxisWarp) -> Self {
        Self { u: w, v: w }
    }

    fn to_cube(&self, tu: f64, tv: f64) -> (f64, f64) {
        (self.u.to_cube(tu, tv), self.v.to_cube(tv, tu))
    }

    fn to_plane(&self, cu: f64, cv: f64) -> (f64, f64) {
        if self.u.is_cross() {
            let tv = self.v.to_plane(cv, 0.0);
            (self.u.to_plane(cu, tv), tv)
        } else {
            let tu = self.u.to_plane(cu, 0.0);
            (tu, self.v.to_plane(cv, tu))
        }
    }
}

/// Cube face of a direction and its cube plane coordinates.
fn cube_face_of(p: DVec3) -> (usize, f64, f64) {
    let (ax, ay, az) = (p.x.abs(), p.y.abs(), p.z.abs());
    if ax >= ay && ax >= az {
        if p.x > 0.0 {
            (0, -p.z / ax, -p.y / ax)
        } else {
            (1, p.z / ax, -p.y / ax)
        }
    } else if ay >= az {
        if p.y > 0.0 {
            (2, p.x / ay, p.z / ay)
        } else {
            (3, p.x / ay, -p.z / ay)
        }
    } else if p.z > 0.0 {
        (4, p.x / az, -p.y / az)
    } else {
        (5, -p.x / az, -p.y / az)
    }
}

/// Direction of cube plane coordinates `(u, v)` on `face`, not normalized.
fn cube_point(face: usize, u: f64, v: f64) -> DVec3 {
    match face {
        0 => DVec3::new(1.0, -v, -u),
        1 => DVec3::new(-1.0, -v, u),
        2 => DVec3::new(u, 1.0, v),
        3 => DVec3::new(u, -1.0, -v),
        4 => DVec3::new(u, -v, 1.0),
        _ => DVec3::new(-u, -v, -1.0),
    }
}

/// Six-face cube projection.
#[derive(Debug, Clone)]
pub struct Cube {
    kind: ProjectionKind,
    width: usize,
    height: usize,
    warps: [FaceWarp; 6],
}

impl Cube {
    /// Cube with the same warp on every face.
    pub fn new(kind: ProjectionKind, width: usize, height: usize, warp: FaceWarp) -> Self {
        Self {
            kind,
            width,
            height,
            warps: [warp; 6],
        }
    }

    /// Cube of a cube-family descriptor.
    pub fn from_descriptor(desc: &ProjectionDescriptor) -> GeometryResult<Self> {
        let (w, h) = (desc.face_width, desc.face_height);
        let uniform = |warp| Self::new(desc.kind, w, h, warp);
        let cube = match desc.kind {
            ProjectionKind::Cubemap | ProjectionKind::HemisphereCubemap => {
                uniform(FaceWarp::uniform(AxisWarp::Linear))
            }
            ProjectionKind::EquiangularCubemap | ProjectionKind::HemisphereEquiangular => {
                uniform(FaceWarp::uniform(AxisWarp::Equiangular))
            }
            ProjectionKind::AdjustedCubemap => uniform(FaceWarp::uniform(AxisWarp::Adjusted)),
            ProjectionKind::HybridEquiangularCubemap => uniform(FaceWarp {
                u: AxisWarp::Equiangular,
                v: AxisWarp::Hybrid(HEC_COEFF),
            }),
            ProjectionKind::GeneralizedCubemap => {
                let mut cube = uniform(FaceWarp::uniform(AxisWarp::Linear));
                for (warp, p) in cube.warps.iter_mut().zip(&desc.params.gcmp.faces) {
                    if p.u_affected_by_v && p.v_affected_by_u {
                        return Err(GeometryError::Unsupported(
                            "generalized cubemap warp with both axes cross-dependent".into(),
                        ));
                    }
                    *warp = FaceWarp {
                        u: AxisWarp::Gcmp {
                            coeff: p.coeff_u,
                            cross: p.u_affected_by_v,
                        },
                        v: AxisWarp::Gcmp {
                            coeff: p.coeff_v,
                            cross: p.v_affected_by_u,
                        },
                    };
                }
                cube
            }
            other => {
                return Err(GeometryError::Unsupported(format!("{other} is not a cube projection")));
            }
        };
        Ok(cube)
    }

    /// Warp of a face.
    pub fn warp(&self, face: usize) -> &FaceWarp {
        &self.warps[face]
    }
}

impl SphereProjection for Cube {
    fn kind(&self) -> ProjectionKind {
        self.kind
    }

    fn num_faces(&self) -> usize {
        6
    }

    fn face_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        let tu = 2.0 * (x + 0.5) / self.width as f64 - 1.0;
        let tv = 2.0 * (y + 0.5) / self.height as f64 - 1.0;
        let (cu, cv) = self.warps[face].to_cube(tu, tv);
        cube_point(face, cu, cv).normalize()
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let (face, cu, cv) = cube_face_of(p);
        let (tu, tv) = self.warps[face].to_plane(cu, cv);
        let (tu, tv) = (tu.clamp(-1.0, 1.0), tv.clamp(-1.0, 1.0));
        SPos::new(
            face,
            (tu + 1.0) * self.width as f64 / 2.0 - 0.5,
            (tv + 1.0) * self.height as f64 / 2.0 - 0.5,
        )
    }
}

/// Cube face held by each hemisphere face.
const HEMISPHERE_FACES: [usize; 5] = [0, 2, 3, 4, 5];

/// Front hemisphere of a cube (HCMP / HEAC).
///
/// Face 0 is the full front face; faces 1 to 4 are half faces whose covered
/// half is the one adjacent to the front.
#[derive(Debug, Clone)]
pub struct Hemisphere {
    cube: Cube,
}

impl Hemisphere {
    /// Hemisphere of an HCMP / HEAC descriptor.
    pub fn from_descriptor(desc: &ProjectionDescriptor) -> GeometryResult<Self> {
        Ok(Self {
            cube: Cube::from_descriptor(desc)?,
        })
    }
}

impl SphereProjection for Hemisphere {
    fn kind(&self) -> ProjectionKind {
        self.cube.kind
    }

    fn num_faces(&self) -> usize {
        HEMISPHERE_FACES.len()
    }

    fn face_size(&self) -> (usize, usize) {
        self.cube.face_size()
    }

    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        self.cube.map_2d_to_3d(HEMISPHERE_FACES[face], x, y)
    }

    fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        let pos = self.cube.map_3d_to_2d(p);
        let face = HEMISPHERE_FACES
            .iter()
            .position(|&f| f == pos.face)
            .unwrap_or(HIDDEN_FACE);
        SPos { face, ..pos }
    }

    fn inside_face(&self, face: usize, x: i32, y: i32) -> bool {
        let (w, h) = self.cube.face_size();
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            return false;
        }
        let half = (w / 2) as i32;
        match face {
            0 => true,
            1..=3 => x >= half,
            _ => x < half,
        }
    }

    fn inside_face_for_padding(&self, face: usize, x: i32, y: i32) -> bool {
        let _ = face;
        let (w, h) = self.cube.face_size();
        x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h
    }

    fn has_rectangular_faces(&self) -> bool {
        false
    }
}
