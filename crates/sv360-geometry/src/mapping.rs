//! Resampling maps between geometries (geometryMapping).
//!
//! A destination geometry caches, for every sample of every face (margins
//! included), where that sample comes from in a source geometry: a
//! [`WeightEntry`] of the source's interpolation filter, or a marker for
//! samples that are skipped or written as mid-gray.
//!
//! # Algorithm
//!
//! For each destination face and sample `(i, j)` of a component:
//!
//! 1. Skip samples outside the face shape unless the destination also needs
//!    its margins (4:4:4 faces packed as 4:2:0).
//! 2. Samples without picture content (fisheye corners) become mid-gray.
//! 3. Map the luma position `(i << sx, j << sy)` plus the destination chroma
//!    offset to the sphere.
//! 4. Rotate: forward by the destination's rotation, or inverse by the
//!    source's rotation.
//! 5. Map into the source, subtract the source chroma offset and scale down to
//!    the component grid. Directions the source does not cover read sample
//!    `(0, 0)` of face 0.
//! 6. Store the source filter's weight entry.
//!
//! One map serves all components when the components share their grid and
//! kernel, otherwise luma and chroma get one map each.

use sv360_core::{ChannelType, ChromaFormat};
use sv360_math::{RotationDirection, Rotator};
use tracing::{debug, trace};

use crate::projection::SPos;
use crate::rows::for_each_row;
use crate::{Geometry, GeometryError, GeometryResult, InterpolationConfig, ProjectionDescriptor, WeightEntry};

/// What to write into one destination sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tap {
    /// Leave the sample untouched.
    #[default]
    Skip,
    /// Write mid-gray.
    MidGray,
    /// Interpolate from the source.
    Sample(WeightEntry),
}

/// Taps of one face over its buffer including margins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceMap {
    margin_x: usize,
    margin_y: usize,
    row_len: usize,
    taps: Vec<Tap>,
}

impl FaceMap {
    pub(crate) fn new(width: usize, height: usize, margin_x: usize, margin_y: usize) -> Self {
        let row_len = width + 2 * margin_x;
        Self {
            margin_x,
            margin_y,
            row_len,
            taps: vec![Tap::Skip; row_len * (height + 2 * margin_y)],
        }
    }

    /// Tap of sample `(x, y)`, margin coordinates negative.
    #[inline]
    pub fn tap(&self, x: isize, y: isize) -> Tap {
        let row = (y + self.margin_y as isize) as usize;
        let col = (x + self.margin_x as isize) as usize;
        self.taps[row * self.row_len + col]
    }

    /// All taps, row-major from `(-margin_x, -margin_y)`.
    #[inline]
    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    pub(crate) fn rows_mut(&mut self) -> (&mut [Tap], usize) {
        (&mut self.taps, self.row_len)
    }

    pub(crate) fn row_len(&self) -> usize {
        self.row_len
    }

    pub(crate) fn margins(&self) -> (usize, usize) {
        (self.margin_x, self.margin_y)
    }

    /// Number of taps that read the source.
    pub fn num_samples(&self) -> usize {
        self.taps.iter().filter(|t| matches!(t, Tap::Sample(_))).count()
    }
}

/// Identity of the source a map was built against.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SourceKey {
    desc: ProjectionDescriptor,
    interp: InterpolationConfig,
    direction: RotationDirection,
}

impl SourceKey {
    fn of(src: &Geometry, direction: RotationDirection) -> Self {
        Self {
            desc: src.desc.clone(),
            interp: src.interp,
            direction,
        }
    }
}

/// Per-face maps of a destination geometry against one source.
#[derive(Debug, Clone)]
pub struct GeometryMap {
    pub(crate) key: SourceKey,
    /// `maps[map][face]`.
    maps: Vec<Vec<FaceMap>>,
}

impl GeometryMap {
    /// Number of maps (1 or 2).
    #[inline]
    pub fn num_maps(&self) -> usize {
        self.maps.len()
    }

    /// Map index serving component `comp`.
    #[inline]
    pub fn map_for(&self, comp: usize) -> usize {
        if self.maps.len() == 1 { 0 } else { comp.min(1) }
    }

    /// Map of `face` for component `comp`.
    #[inline]
    pub fn face(&self, comp: usize, face: usize) -> &FaceMap {
        &self.maps[self.map_for(comp)][face]
    }
}

/// Number of maps a destination needs against a source.
fn num_maps(dst: &Geometry, src: &Geometry) -> usize {
    match dst.internal_format() {
        ChromaFormat::Yuv400 => 1,
        ChromaFormat::Yuv444 if src.interp.luma == src.interp.chroma => 1,
        _ => 2,
    }
}

impl Geometry {
    /// Builds the resampling map of this (destination) geometry against `src`.
    ///
    /// # Errors
    ///
    /// [`GeometryError::InvalidState`] if a map already exists, and
    /// [`GeometryError::FormatMismatch`] if the face buffer formats differ.
    pub fn build_mapping(&mut self, src: &Geometry, direction: RotationDirection) -> GeometryResult<()> {
        if self.mapping.is_some() {
            return Err(GeometryError::invalid_state("build_mapping", self.state()));
        }
        src.check_same_format(self, "build_mapping")?;
        let map = compute_map(self, src, direction);
        self.mapping = Some(map);
        Ok(())
    }

    /// Builds the map against `src` unless it already exists.
    ///
    /// # Errors
    ///
    /// [`GeometryError::InvalidState`] if the existing map was built against
    /// another source or rotation direction.
    pub fn ensure_mapping(&mut self, src: &Geometry, direction: RotationDirection) -> GeometryResult<()> {
        match &self.mapping {
            None => self.build_mapping(src, direction),
            Some(map) if map.key == SourceKey::of(src, direction) => Ok(()),
            Some(map) => Err(GeometryError::InvalidState {
                op: "ensure_mapping",
                state: format!(
                    "{} (built against {} {:?})",
                    self.state(),
                    map.key.desc.kind,
                    map.key.direction
                ),
            }),
        }
    }

    /// The resampling map, if built.
    #[inline]
    pub fn mapping(&self) -> Option<&GeometryMap> {
        self.mapping.as_ref()
    }
}

fn compute_map(dst: &Geometry, src: &Geometry, direction: RotationDirection) -> GeometryMap {
    let rotator = match direction {
        RotationDirection::Forward => Rotator::new(dst.desc.rotation, RotationDirection::Forward),
        RotationDirection::Inverse => Rotator::new(src.desc.rotation, RotationDirection::Inverse),
    };
    let n = num_maps(dst, src);
    debug!(
        src = %src.desc.kind,
        dst = %dst.desc.kind,
        maps = n,
        ?direction,
        "building geometry mapping"
    );
    let maps = (0..n)
        .map(|comp| {
            (0..dst.num_faces())
                .map(|face| face_map(dst, src, &rotator, face, comp))
                .collect()
        })
        .collect();
    GeometryMap {
        key: SourceKey::of(src, direction),
        maps,
    }
}

fn face_map(dst: &Geometry, src: &Geometry, rotator: &Rotator, face: usize, comp: usize) -> FaceMap {
    let plane = dst.faces.plane(face, comp);
    let mut map = FaceMap::new(plane.width(), plane.height(), plane.margin_x(), plane.margin_y());
    if Some(face) == dst.virtual_face {
        trace!(face, "virtual face skipped");
        return map;
    }
    let format = dst.internal_format();
    let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
    let (ox, oy) = dst.face_chroma_offset(face, comp);
    let (mx, my) = map.margins();
    let filter = src.filter(ChannelType::of(comp));
    let (taps, row_len) = map.rows_mut();
    for_each_row(taps, row_len, |r, row| {
        let j = r as isize - my as isize;
        for (c, tap) in row.iter_mut().enumerate() {
            let i = c as isize - mx as isize;
            let (lx, ly) = ((i << sx) as i32, (j << sy) as i32);
            if !dst.output_padding_needed && !dst.projection.inside_face(face, lx, ly) {
                continue;
            }
            if dst.projection.outside_image(face, lx, ly) {
                *tap = Tap::MidGray;
                continue;
            }
            let p = dst.projection.map_2d_to_3d(face, lx as f64 + ox, ly as f64 + oy);
            let pos = src.projection.map_3d_to_2d(rotator.apply(p));
            let pos = if pos.is_hidden() {
                SPos::new(0, 0.0, 0.0)
            } else {
                src.to_component(pos, comp)
            };
            *tap = Tap::Sample(filter.weight(src.faces.plane(pos.face, comp), pos.face, pos.x, pos.y));
        }
    });
    trace!(face, comp, samples = map.num_samples(), "face mapped");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FramePacking, InterpKind, ProjectionKind};

    fn geo(kind: ProjectionKind, w: usize, h: usize, interp: InterpolationConfig) -> Geometry {
        Geometry::new(ProjectionDescriptor::new(kind, w, h), interp).unwrap()
    }

    #[test]
    fn test_num_maps() {
        let cases = [
            (ChromaFormat::Yuv420, InterpKind::Bilinear, 2),
            (ChromaFormat::Yuv444, InterpKind::Bilinear, 1),
            (ChromaFormat::Yuv444, InterpKind::Lanczos2, 2),
            (ChromaFormat::Yuv400, InterpKind::Lanczos2, 1),
        ];
        for (format, chroma, expected) in cases {
            let interp = InterpolationConfig::new(InterpKind::Bilinear, chroma).with_format(format);
            let src = geo(ProjectionKind::Equirectangular, 64, 32, interp);
            let mut dst = geo(ProjectionKind::Cubemap, 16, 16, interp);
            dst.build_mapping(&src, RotationDirection::Forward).unwrap();
            let map = dst.mapping().unwrap();
            assert_eq!(map.num_maps(), expected, "{format}");
            assert_eq!(map.map_for(2), expected - 1);
        }
    }

    #[test]
    fn test_build_once() {
        let interp = InterpolationConfig::default();
        let src = geo(ProjectionKind::Equirectangular, 64, 32, interp);
        let mut dst = geo(ProjectionKind::Cubemap, 16, 16, interp);
        assert_eq!(dst.state(), crate::GeometryState::Uninitialized);
        dst.build_mapping(&src, RotationDirection::Forward).unwrap();
        assert_eq!(dst.state(), crate::GeometryState::MappingBuilt);
        assert!(matches!(
            dst.build_mapping(&src, RotationDirection::Forward),
            Err(GeometryError::InvalidState { .. })
        ));
        assert!(dst.ensure_mapping(&src, RotationDirection::Forward).is_ok());
        assert!(dst.ensure_mapping(&src, RotationDirection::Inverse).is_err());
    }

    #[test]
    fn test_margins_only_when_needed() {
        let interp = InterpolationConfig::default();
        let src = geo(ProjectionKind::Equirectangular, 64, 32, interp);
        let mut dst = geo(ProjectionKind::Cubemap, 16, 16, interp);
        dst.build_mapping(&src, RotationDirection::Forward).unwrap();
        let fm = dst.mapping().unwrap().face(0, 0);
        assert_eq!(fm.tap(-1, -1), Tap::Skip);
        assert!(matches!(fm.tap(0, 0), Tap::Sample(_)));
        assert_eq!(fm.num_samples(), 16 * 16);

        let interp = interp.with_format(ChromaFormat::Yuv444);
        let src = geo(ProjectionKind::Equirectangular, 64, 32, interp);
        let mut dst = geo(ProjectionKind::Cubemap, 16, 16, interp);
        assert!(dst.output_padding_needed());
        dst.build_mapping(&src, RotationDirection::Forward).unwrap();
        let fm = dst.mapping().unwrap().face(1, 0);
        assert!(matches!(fm.tap(-1, -1), Tap::Sample(_)));
        assert_eq!(fm.num_samples(), fm.taps().len());
    }

    #[test]
    fn test_virtual_face_skipped() {
        let interp = InterpolationConfig::default();
        let packing: FramePacking = "4 0 5 3 1".parse().unwrap();
        let desc = ProjectionDescriptor::new(ProjectionKind::GeneralizedCubemap, 16, 16).with_packing(packing);
        let mut dst = Geometry::new(desc, interp).unwrap();
        assert_eq!(dst.virtual_face(), Some(2));
        let src = geo(ProjectionKind::Equirectangular, 64, 32, interp);
        dst.build_mapping(&src, RotationDirection::Forward).unwrap();
        let map = dst.mapping().unwrap();
        assert_eq!(map.face(0, 2).num_samples(), 0);
        assert_eq!(map.face(0, 3).num_samples(), 16 * 16);
    }

    #[test]
    fn test_sample_targets_source_face() {
        // the centre of cube face 0 looks along +X, the centre of the ERP picture
        let interp = InterpolationConfig::new(InterpKind::Nearest, InterpKind::Nearest);
        let src = geo(ProjectionKind::Equirectangular, 64, 32, interp);
        let mut dst = geo(ProjectionKind::Cubemap, 16, 16, interp);
        dst.build_mapping(&src, RotationDirection::Forward).unwrap();
        let Tap::Sample(e) = dst.mapping().unwrap().face(0, 0).tap(8, 8) else {
            panic!("centre not mapped");
        };
        let plane = src.faces().plane(0, 0);
        let offset = e.offset as usize;
        let (x, y) = (
            (offset % plane.stride()) as isize - plane.margin_x() as isize,
            (offset / plane.stride()) as isize - plane.margin_y() as isize,
        );
        assert!((31..=33).contains(&x), "x = {x}");
        assert!((15..=17).contains(&y), "y = {y}");
    }
}
