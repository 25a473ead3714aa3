//! Sphere projections.
//!
//! Every projection kind implements [`SphereProjection`]: the mapping between
//! face sample positions and unit vectors, plus the face-shape predicates used
//! by the mapping cache and by sphere padding.
//!
//! # Coordinates
//!
//! Face positions are in luma samples. [`SphereProjection::map_2d_to_3d`] takes
//! the integer-or-fractional index of a sample and adds `0.5` to reach its
//! centre; [`SphereProjection::map_3d_to_2d`] returns positions in the same
//! index convention (the centre of sample `i` is `i`), so the two are inverse.
//!
//! # Variants
//!
//! | module | kinds |
//! |--------|-------|
//! | [`equirect`] | ERP, EAP |
//! | [`crasters`] | CPP |
//! | [`cube`] | CMP, EAC, ACP, HEC, GCMP, HCMP, HEAC |
//! | [`polyhedron`] | OHP, ISP |
//! | [`segmented`] | SSP |
//! | [`pyramid`] | TSP |
//! | [`rotated`] | RSP |
//! | [`cylindrical`] | ECP |
//! | [`fisheye`] | circular fisheye |
//! | [`viewport`] | viewport |

pub mod crasters;
pub mod cube;
pub mod cylindrical;
pub mod equirect;
pub mod fisheye;
pub mod polyhedron;
pub mod pyramid;
pub mod rotated;
pub mod segmented;
pub mod viewport;

use glam::DVec3;
use std::fmt;

use crate::{GeometryResult, ProjectionDescriptor, ProjectionKind};

/// Face id returned for points a projection does not cover.
pub const HIDDEN_FACE: usize = usize::MAX;

/// A position on a face, in luma samples unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SPos {
    /// Face id, [`HIDDEN_FACE`] for uncovered points.
    pub face: usize,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl SPos {
    /// Creates a position.
    #[inline]
    pub fn new(face: usize, x: f64, y: f64) -> Self {
        Self { face, x, y }
    }

    /// Returns `true` for a point outside the covered part of the sphere.
    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.face == HIDDEN_FACE
    }
}

impl fmt::Display for SPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hidden() {
            write!(f, "(hidden, {:.3}, {:.3})", self.x, self.y)
        } else {
            write!(f, "({}, {:.3}, {:.3})", self.face, self.x, self.y)
        }
    }
}

/// The 2D/3D contract of one projection kind.
pub trait SphereProjection: fmt::Debug + Send + Sync {
    /// Projection kind.
    fn kind(&self) -> ProjectionKind;

    /// Number of faces.
    fn num_faces(&self) -> usize;

    /// Face size in luma samples.
    fn face_size(&self) -> (usize, usize);

    /// Unit vector of face position `(x, y)`.
    fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3;

    /// Face position of unit vector `p`.
    fn map_3d_to_2d(&self, p: DVec3) -> SPos;

    /// Returns `true` if the luma sample `(x, y)` belongs to `face`.
    fn inside_face(&self, face: usize, x: i32, y: i32) -> bool {
        let _ = face;
        let (w, h) = self.face_size();
        x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h
    }

    /// Predicate used to decide which samples sphere padding leaves alone.
    fn inside_face_for_padding(&self, face: usize, x: i32, y: i32) -> bool {
        self.inside_face(face, x, y)
    }

    /// Returns `false` when some faces are not full rectangles.
    fn has_rectangular_faces(&self) -> bool {
        true
    }

    /// Returns `true` for samples that carry no picture content (e.g. the
    /// corners around a fisheye circle), which conversion writes as mid-gray.
    fn outside_image(&self, face: usize, x: i32, y: i32) -> bool {
        let _ = (face, x, y);
        false
    }
}

/// Builds the projection of a normalized descriptor.
pub fn create(desc: &ProjectionDescriptor) -> GeometryResult<Box<dyn SphereProjection>> {
    let (w, h) = (desc.face_width, desc.face_height);
    let proj: Box<dyn SphereProjection> = match desc.kind {
        ProjectionKind::Equirectangular => Box::new(equirect::Equirect::new(w, h)),
        ProjectionKind::EqualArea => Box::new(equirect::Equirect::equal_area(w, h)),
        ProjectionKind::CrastersParabolic => Box::new(crasters::CrastersParabolic::new(w, h)),
        ProjectionKind::Cubemap
        | ProjectionKind::EquiangularCubemap
        | ProjectionKind::AdjustedCubemap
        | ProjectionKind::HybridEquiangularCubemap
        | ProjectionKind::GeneralizedCubemap => Box::new(cube::Cube::from_descriptor(desc)?),
        ProjectionKind::HemisphereCubemap | ProjectionKind::HemisphereEquiangular => {
            Box::new(cube::Hemisphere::from_descriptor(desc)?)
        }
        ProjectionKind::Octahedron => Box::new(polyhedron::Polyhedron::octahedron(w, h)),
        ProjectionKind::Icosahedron => Box::new(polyhedron::Polyhedron::icosahedron(w, h)),
        ProjectionKind::SegmentedSphere => Box::new(segmented::SegmentedSphere::new(w, h)),
        ProjectionKind::FisheyeCircular => Box::new(fisheye::Fisheye::new(w, h, &desc.params.fisheye)),
        ProjectionKind::Viewport => Box::new(viewport::Viewport::new(w, h, &desc.params.viewport)),
        ProjectionKind::TruncatedSquarePyramid => Box::new(pyramid::TruncatedPyramid::new(w, h)),
        ProjectionKind::RotatedSphere => Box::new(rotated::RotatedSphere::new(w, h)),
        ProjectionKind::EquatorialCylindrical => Box::new(cylindrical::EquatorialCylindrical::new(w, h)),
    };
    Ok(proj)
}

/// Clamps a position to `[0, size - 1]`.
#[inline]
pub(crate) fn clamp_to_face(v: f64, size: usize) -> f64 {
    v.clamp(0.0, size as f64 - 1.0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_every_kind() {
        for kind in ProjectionKind::ALL {
            let mut d = ProjectionDescriptor::new(kind, 32, 32);
            d.normalize().unwrap();
            let p = create(&d).unwrap();
            assert_eq!(p.kind(), kind);
            assert_eq!(p.num_faces(), kind.num_faces());
            assert_eq!(p.face_size(), (32, 32));
        }
    }

    #[test]
    fn test_roundtrip_every_kind() {
        for kind in ProjectionKind::ALL {
            let mut d = ProjectionDescriptor::new(kind, 48, 48);
            d.normalize().unwrap();
            let p = create(&d).unwrap();
            testing::assert_roundtrip(p.as_ref(), 3, 1e-6);
        }
    }

    #[test]
    fn test_spos_display() {
        assert_eq!(SPos::new(2, 1.0, 0.5).to_string(), "(2, 1.000, 0.500)");
        assert!(SPos::new(HIDDEN_FACE, 0.0, 0.0).is_hidden());
    }
}
