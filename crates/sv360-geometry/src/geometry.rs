//! The geometry handle.
//!
//! A [`Geometry`] owns everything needed to hold one frame in one projection:
//! the normalized descriptor, the projection math, the per-face buffers and the
//! two lazily built caches (the resampling map against a source geometry and
//! the sphere-padding map against itself).
//!
//! # Lifecycle
//!
//! ```text
//!   new() ──> Uninitialized ──build_mapping()──> MappingBuilt
//!                  │                                  │
//!                  └──────── sphere_padding() ────────┴──> Padded
//! ```
//!
//! The resampling map is built once; asking for it against a different source
//! is an error. Padding is cleared whenever the face buffers are rewritten
//! (unpacking or conversion) and recomputed on demand.
//!
//! The conversion, padding and packing operations live in their own modules
//! as further `impl Geometry` blocks.

use glam::DVec3;
use std::fmt;
use sv360_core::{ChannelType, ChromaFormat, Sample};
use sv360_math::sphere::angles_deg_from_direction;
use tracing::debug;

use crate::mapping::GeometryMap;
use crate::padding::PaddingMap;
use crate::projection::{self, SPos, SphereProjection};
use crate::{
    FaceStore, FramePacking, GeometryError, GeometryResult, InterpolationConfig, Interpolator,
    ProjectionDescriptor,
};

/// Cache state of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryState {
    /// No cache built.
    Uninitialized,
    /// Resampling map against a source built.
    MappingBuilt,
    /// Face margins hold sphere padding.
    Padded,
}

impl fmt::Display for GeometryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "Uninitialized",
            Self::MappingBuilt => "MappingBuilt",
            Self::Padded => "Padded",
        };
        f.write_str(s)
    }
}

/// Yaw/pitch of one face sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpherePoint {
    /// Face id.
    pub face: usize,
    /// Sample column.
    pub x: usize,
    /// Sample row.
    pub y: usize,
    /// Yaw in degrees.
    pub yaw: f64,
    /// Pitch in degrees.
    pub pitch: f64,
}

/// One projection instance with its face buffers and caches.
#[derive(Debug)]
pub struct Geometry {
    pub(crate) desc: ProjectionDescriptor,
    pub(crate) interp: InterpolationConfig,
    pub(crate) projection: Box<dyn SphereProjection>,
    pub(crate) packing: FramePacking,
    pub(crate) faces: FaceStore,
    pub(crate) filters: [Interpolator; 2],
    pub(crate) virtual_face: Option<usize>,
    pub(crate) output_padding_needed: bool,
    pub(crate) mapping: Option<GeometryMap>,
    pub(crate) padding_map: Option<PaddingMap>,
    pub(crate) padded: bool,
}

impl Geometry {
    /// Creates a geometry (geoInit).
    ///
    /// The descriptor is normalized first, see [`ProjectionDescriptor::normalize`].
    ///
    /// # Errors
    ///
    /// Invalid or unsupported descriptors, bit depths outside `8..=16`, and odd
    /// face sizes with 4:2:0 face buffers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sv360_geometry::{Geometry, GeometryState, InterpolationConfig, ProjectionDescriptor, ProjectionKind};
    ///
    /// let desc = ProjectionDescriptor::new(ProjectionKind::Cubemap, 64, 64);
    /// let geo = Geometry::new(desc, InterpolationConfig::default()).unwrap();
    /// assert_eq!(geo.num_faces(), 6);
    /// assert_eq!(geo.state(), GeometryState::Uninitialized);
    /// ```
    pub fn new(mut desc: ProjectionDescriptor, interp: InterpolationConfig) -> GeometryResult<Self> {
        desc.normalize()?;
        interp.validate()?;
        let format = interp.internal_chroma_format;
        if format.is_subsampled() && (desc.face_width % 2 != 0 || desc.face_height % 2 != 0) {
            return Err(GeometryError::InvalidDescriptor(format!(
                "{}x{} faces need even sizes with {format} face buffers",
                desc.face_width, desc.face_height
            )));
        }
        let projection = projection::create(&desc)?;
        let packing = desc.packing();
        let faces = FaceStore::new(projection.num_faces(), desc.face_width, desc.face_height, format);
        let output_padding_needed =
            desc.packed_chroma_format == ChromaFormat::Yuv420 && format == ChromaFormat::Yuv444;
        debug!(
            kind = %desc.kind,
            faces = projection.num_faces(),
            width = desc.face_width,
            height = desc.face_height,
            layout = %packing,
            internal = %format,
            luma = %interp.luma,
            chroma = %interp.chroma,
            "geometry created"
        );
        Ok(Self {
            virtual_face: desc.virtual_face(),
            filters: [Interpolator::new(interp.luma), Interpolator::new(interp.chroma)],
            desc,
            interp,
            projection,
            packing,
            faces,
            output_padding_needed,
            mapping: None,
            padding_map: None,
            padded: false,
        })
    }

    /// Normalized descriptor.
    #[inline]
    pub fn descriptor(&self) -> &ProjectionDescriptor {
        &self.desc
    }

    /// Interpolation settings.
    #[inline]
    pub fn interp(&self) -> &InterpolationConfig {
        &self.interp
    }

    /// Projection math.
    #[inline]
    pub fn projection(&self) -> &dyn SphereProjection {
        self.projection.as_ref()
    }

    /// Resolved frame-packing layout.
    #[inline]
    pub fn packing(&self) -> &FramePacking {
        &self.packing
    }

    /// Face buffers.
    #[inline]
    pub fn faces(&self) -> &FaceStore {
        &self.faces
    }

    /// Mutable face buffers. Writing to them clears the padded state.
    #[inline]
    pub fn faces_mut(&mut self) -> &mut FaceStore {
        self.padded = false;
        &mut self.faces
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.num_faces()
    }

    /// Number of components of the face buffers.
    #[inline]
    pub fn num_components(&self) -> usize {
        self.faces.num_components()
    }

    /// Face size of component `comp`.
    #[inline]
    pub fn face_size(&self, comp: usize) -> (usize, usize) {
        self.faces.face_size(comp)
    }

    /// Chroma format of the face buffers.
    #[inline]
    pub fn internal_format(&self) -> ChromaFormat {
        self.interp.internal_chroma_format
    }

    /// Bit depth of the face buffers.
    #[inline]
    pub fn bit_depth(&self) -> u8 {
        self.interp.bit_depth
    }

    /// Face missing from a five-cell generalized-cubemap layout.
    #[inline]
    pub fn virtual_face(&self) -> Option<usize> {
        self.virtual_face
    }

    /// Returns `true` when conversions into this geometry also fill the face
    /// margins (4:4:4 faces packed as 4:2:0, whose downsampler reads them).
    #[inline]
    pub fn output_padding_needed(&self) -> bool {
        self.output_padding_needed
    }

    /// Interpolator of a channel.
    #[inline]
    pub fn filter(&self, channel: ChannelType) -> &Interpolator {
        &self.filters[channel.index()]
    }

    /// Cache state.
    pub fn state(&self) -> GeometryState {
        if self.padded {
            GeometryState::Padded
        } else if self.mapping.is_some() {
            GeometryState::MappingBuilt
        } else {
            GeometryState::Uninitialized
        }
    }

    /// Returns `true` once a resampling map has been built.
    #[inline]
    pub fn has_mapping(&self) -> bool {
        self.mapping.is_some()
    }

    /// Returns `true` while the margins hold valid sphere padding.
    #[inline]
    pub fn is_padded(&self) -> bool {
        self.padded
    }

    /// Unit vector of a face position in luma samples.
    #[inline]
    pub fn map_2d_to_3d(&self, face: usize, x: f64, y: f64) -> DVec3 {
        self.projection.map_2d_to_3d(face, x, y)
    }

    /// Face position in luma samples of a unit vector.
    #[inline]
    pub fn map_3d_to_2d(&self, p: DVec3) -> SPos {
        self.projection.map_3d_to_2d(p)
    }

    /// Returns `true` if luma sample `(x, y)` belongs to `face`.
    #[inline]
    pub fn inside_face(&self, face: usize, x: i32, y: i32) -> bool {
        self.projection.inside_face(face, x, y)
    }

    /// Clamps a luma position to its face rectangle.
    pub fn clamp(&self, pos: &mut SPos) {
        let (w, h) = self.face_size(0);
        pos.x = projection::clamp_to_face(pos.x, w);
        pos.y = projection::clamp_to_face(pos.y, h);
    }

    /// Sub-sample offset `(x, y)`, in luma samples, of chroma sample `(0, 0)`
    /// of `face` relative to luma sample `(0, 0)`.
    ///
    /// Non-zero only for chroma of 4:2:0 face buffers: the packed chroma
    /// location, turned into face orientation.
    pub fn face_chroma_offset(&self, face: usize, comp: usize) -> (f64, f64) {
        if comp == 0 || !self.internal_format().is_subsampled() {
            return (0.0, 0.0);
        }
        let phase = self.interp.chroma_location.phase();
        match self.packing.locate(face) {
            Some((r, c)) => self.packing.cell(r, c).transform.chroma_phase(phase),
            None => phase,
        }
    }

    /// Converts a luma-space position of this geometry into component sample units.
    pub(crate) fn to_component(&self, pos: SPos, comp: usize) -> SPos {
        let (ox, oy) = self.face_chroma_offset(pos.face, comp);
        let format = self.internal_format();
        SPos::new(
            pos.face,
            (pos.x - ox) / (1u32 << format.scale_x(comp)) as f64,
            (pos.y - oy) / (1u32 << format.scale_y(comp)) as f64,
        )
    }

    /// Interpolated sample at `pos` (component sample units) (getPelValue).
    ///
    /// # Panics
    ///
    /// Panics if the face id is out of range or the interpolation window leaves
    /// the face buffer including its margin.
    pub fn pel_value(&self, comp: usize, pos: &SPos) -> Sample {
        assert!(pos.face < self.num_faces(), "face {} out of range", pos.face);
        let filter = self.filter(ChannelType::of(comp));
        let plane = self.faces.plane(pos.face, comp);
        let entry = filter.weight(plane, pos.face, pos.x, pos.y);
        filter.apply(plane, &entry, self.bit_depth())
    }

    /// Interpolated sample in direction `p`.
    ///
    /// Directions this projection does not cover read sample `(0, 0)` of face 0.
    ///
    /// # Errors
    ///
    /// [`GeometryError::InvalidState`] unless the geometry is sphere-padded.
    pub fn pel_value_at(&self, comp: usize, p: DVec3) -> GeometryResult<Sample> {
        if !self.padded {
            return Err(GeometryError::invalid_state("pel_value_at", self.state()));
        }
        let pos = self.map_3d_to_2d(p);
        let pos = if pos.is_hidden() {
            SPos::new(0, 0.0, 0.0)
        } else {
            self.to_component(pos, comp)
        };
        Ok(self.pel_value(comp, &pos))
    }

    /// Yaw/pitch of every in-face sample of component `comp`.
    pub fn sphere_points(&self, comp: usize) -> Vec<SpherePoint> {
        let (w, h) = self.face_size(comp);
        let format = self.internal_format();
        let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
        let mut points = Vec::new();
        for face in 0..self.num_faces() {
            if Some(face) == self.virtual_face {
                continue;
            }
            let (ox, oy) = self.face_chroma_offset(face, comp);
            for y in 0..h {
                for x in 0..w {
                    let (lx, ly) = ((x << sx) as i32, (y << sy) as i32);
                    if !self.inside_face(face, lx, ly) || self.projection.outside_image(face, lx, ly) {
                        continue;
                    }
                    let p = self.map_2d_to_3d(face, lx as f64 + ox, ly as f64 + oy);
                    let (yaw, pitch) = angles_deg_from_direction(p);
                    points.push(SpherePoint {
                        face,
                        x,
                        y,
                        yaw,
                        pitch,
                    });
                }
            }
        }
        points
    }

    /// Returns `true` when converting into `dst` is a plain copy (isGeoConvertSkipped).
    ///
    /// Requires identical kind, face size, layout, variant parameters and
    /// sampling formats, and no rotation on either side.
    pub fn is_geo_convert_skipped(&self, dst: &Geometry) -> bool {
        let (a, b) = (&self.desc, &dst.desc);
        a.kind == b.kind
            && a.face_width == b.face_width
            && a.face_height == b.face_height
            && self.num_faces() == dst.num_faces()
            && a.params == b.params
            && a.rotation.is_identity()
            && b.rotation.is_identity()
            && self.packing == dst.packing
            && a.guard_band == b.guard_band
            && a.packed_chroma_format == b.packed_chroma_format
            && self.interp.internal_chroma_format == dst.interp.internal_chroma_format
            && self.interp.bit_depth == dst.interp.bit_depth
            && self.interp.chroma_location == dst.interp.chroma_location
    }

    pub(crate) fn check_same_format(&self, other: &Geometry, op: &str) -> GeometryResult<()> {
        if self.internal_format() != other.internal_format() || self.bit_depth() != other.bit_depth() {
            return Err(GeometryError::FormatMismatch(format!(
                "{op}: {} {}-bit vs {} {}-bit face buffers",
                self.internal_format(),
                self.bit_depth(),
                other.internal_format(),
                other.bit_depth()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InterpKind, ProjectionKind};
    use approx::assert_abs_diff_eq;
    use sv360_core::ChromaLocation;
    use sv360_math::SphereRotation;

    fn geo(kind: ProjectionKind, w: usize, h: usize, format: ChromaFormat) -> Geometry {
        let desc = ProjectionDescriptor::new(kind, w, h);
        let interp = InterpolationConfig::new(InterpKind::Bilinear, InterpKind::Bilinear).with_format(format);
        Geometry::new(desc, interp).unwrap()
    }

    #[test]
    fn test_new_rejects_odd_420_faces() {
        let desc = ProjectionDescriptor::new(ProjectionKind::Equirectangular, 33, 16);
        assert!(Geometry::new(desc.clone(), InterpolationConfig::default()).is_err());
        let interp = InterpolationConfig::default().with_format(ChromaFormat::Yuv444);
        assert!(Geometry::new(desc, interp).is_ok());
    }

    #[test]
    fn test_output_padding_needed() {
        assert!(geo(ProjectionKind::Cubemap, 16, 16, ChromaFormat::Yuv444).output_padding_needed());
        assert!(!geo(ProjectionKind::Cubemap, 16, 16, ChromaFormat::Yuv420).output_padding_needed());
    }

    #[test]
    fn test_chroma_offset_follows_face_rotation() {
        let g = geo(ProjectionKind::Cubemap, 16, 16, ChromaFormat::Yuv420);
        // default layout: face 4 upright, face 3 at 180, face 1 at 270
        assert_eq!(g.face_chroma_offset(4, 1), (0.0, 0.5));
        assert_eq!(g.face_chroma_offset(3, 1), (1.0, 0.5));
        assert_eq!(g.face_chroma_offset(1, 2), (0.5, 1.0));
        assert_eq!(g.face_chroma_offset(1, 0), (0.0, 0.0));

        let g = geo(ProjectionKind::Cubemap, 16, 16, ChromaFormat::Yuv444);
        assert_eq!(g.face_chroma_offset(3, 1), (0.0, 0.0));

        let desc = ProjectionDescriptor::new(ProjectionKind::Equirectangular, 16, 8);
        let interp = InterpolationConfig::default().with_chroma_location(ChromaLocation::Type2);
        let g = Geometry::new(desc, interp).unwrap();
        assert_eq!(g.face_chroma_offset(0, 1), (0.0, 0.0));
    }

    #[test]
    fn test_pel_value_at_requires_padding() {
        let g = geo(ProjectionKind::Equirectangular, 32, 16, ChromaFormat::Yuv420);
        let err = g.pel_value_at(0, DVec3::X).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidState { op: "pel_value_at", .. }));
    }

    #[test]
    fn test_pel_value() {
        let mut g = geo(ProjectionKind::Equirectangular, 32, 16, ChromaFormat::Yuv400);
        let plane = g.faces_mut().plane_mut(0, 0);
        plane.set(4, 2, 100);
        plane.set(5, 2, 200);
        assert_eq!(g.pel_value(0, &SPos::new(0, 4.0, 2.0)), 100);
        assert_eq!(g.pel_value(0, &SPos::new(0, 4.5, 2.0)), 150);
    }

    #[test]
    fn test_clamp() {
        let g = geo(ProjectionKind::Cubemap, 16, 16, ChromaFormat::Yuv420);
        let mut pos = SPos::new(2, -3.0, 17.2);
        g.clamp(&mut pos);
        assert_eq!((pos.x, pos.y), (0.0, 15.0));
    }

    #[test]
    fn test_sphere_points() {
        let g = geo(ProjectionKind::Equirectangular, 8, 4, ChromaFormat::Yuv420);
        let luma = g.sphere_points(0);
        assert_eq!(luma.len(), 32);
        assert_abs_diff_eq!(luma[0].yaw, -157.5, epsilon = 1e-9);
        assert_abs_diff_eq!(luma[0].pitch, 67.5, epsilon = 1e-9);
        assert_eq!(g.sphere_points(1).len(), 8);

        let ohp = geo(ProjectionKind::Octahedron, 16, 16, ChromaFormat::Yuv420);
        let n = ohp.sphere_points(0).len();
        assert!(n > 8 * 100 && n < 8 * 160);
    }

    #[test]
    fn test_geo_convert_skipped() {
        let a = geo(ProjectionKind::Cubemap, 16, 16, ChromaFormat::Yuv420);
        let b = geo(ProjectionKind::Cubemap, 16, 16, ChromaFormat::Yuv420);
        assert!(a.is_geo_convert_skipped(&b));
        assert!(!a.is_geo_convert_skipped(&geo(ProjectionKind::Cubemap, 32, 32, ChromaFormat::Yuv420)));
        assert!(!a.is_geo_convert_skipped(&geo(ProjectionKind::EquiangularCubemap, 16, 16, ChromaFormat::Yuv420)));

        let desc = ProjectionDescriptor::new(ProjectionKind::Cubemap, 16, 16)
            .with_rotation(SphereRotation::from_degrees(10.0, 0.0, 0.0));
        let interp = InterpolationConfig::new(InterpKind::Bilinear, InterpKind::Bilinear);
        let rotated = Geometry::new(desc, interp).unwrap();
        assert!(!a.is_geo_convert_skipped(&rotated));
    }
}
