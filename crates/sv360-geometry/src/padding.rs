//! Sphere padding (spherePadding).
//!
//! Fills every sample of a face buffer that lies outside the face (the margins,
//! plus the corners around triangular and circular faces) with the content the
//! sphere has there, taken from whichever face actually covers that direction.
//! Interpolation windows can then run past face edges without reading stale
//! data.
//!
//! # Order
//!
//! Faces are padded in id order. A position landing on a face that was padded
//! earlier may read that face's margins; otherwise it must be interpolable from
//! the target face interior alone, or it falls back to the nearest in-face
//! sample. This makes the result independent of how often padding runs.
//!
//! # Hemisphere Faces
//!
//! Hemisphere cubemap faces keep the whole cube face in their buffers, so the
//! full face rectangle counts as interior and only the margins are padded.
//! Margin directions go through the full cube face mapping; directions behind
//! the viewer fall back to the nearest sample of the face being padded.

use sv360_core::{ChannelType, ChromaFormat, Sample};
use tracing::{debug, trace};

use crate::mapping::{FaceMap, Tap};
use crate::rows::for_each_row;
use crate::Geometry;

/// Padding taps of every face, built once per geometry against itself.
#[derive(Debug, Clone)]
pub struct PaddingMap {
    /// `maps[map][face]`.
    maps: Vec<Vec<FaceMap>>,
}

impl PaddingMap {
    /// Number of maps (1 or 2).
    #[inline]
    pub fn num_maps(&self) -> usize {
        self.maps.len()
    }

    /// Map of `face` for component `comp`.
    #[inline]
    pub fn face(&self, comp: usize, face: usize) -> &FaceMap {
        let m = if self.maps.len() == 1 { 0 } else { comp.min(1) };
        &self.maps[m][face]
    }
}

impl Geometry {
    /// Fills all face margins from the sphere.
    ///
    /// A no-op while the geometry is already padded, unless `forced`.
    pub fn sphere_padding(&mut self, forced: bool) {
        if self.padded && !forced {
            return;
        }
        if self.padding_map.is_none() {
            self.padding_map = Some(build_padding_map(self));
        }
        self.apply_padding();
        self.padded = true;
    }

    /// The padding map, if built.
    #[inline]
    pub fn padding_map(&self) -> Option<&PaddingMap> {
        self.padding_map.as_ref()
    }

    fn apply_padding(&mut self) {
        let Some(map) = self.padding_map.take() else {
            return;
        };
        let bd = self.bit_depth();
        for face in 0..self.num_faces() {
            if Some(face) == self.virtual_face {
                continue;
            }
            for comp in 0..self.num_components() {
                let fm = map.face(comp, face);
                let filter = *self.filter(ChannelType::of(comp));
                let mut values: Vec<Sample> = vec![0; fm.taps().len()];
                let (mx, my) = fm.margins();
                let row_len = fm.row_len();
                let faces = &self.faces;
                for_each_row(&mut values, row_len, |r, row| {
                    for (c, v) in row.iter_mut().enumerate() {
                        if let Tap::Sample(e) = fm.tap(c as isize - mx as isize, r as isize - my as isize) {
                            *v = filter.apply(faces.plane(e.face as usize, comp), &e, bd);
                        }
                    }
                });
                let plane = self.faces.plane_mut(face, comp);
                for (idx, (tap, v)) in fm.taps().iter().zip(&values).enumerate() {
                    if matches!(tap, Tap::Sample(_)) {
                        let (x, y) = ((idx % row_len) as isize - mx as isize, (idx / row_len) as isize - my as isize);
                        plane.set(x, y, *v);
                    }
                }
            }
        }
        self.padding_map = Some(map);
        trace!(kind = %self.desc.kind, "sphere padding applied");
    }
}

fn build_padding_map(geo: &Geometry) -> PaddingMap {
    let num_maps = match geo.internal_format() {
        ChromaFormat::Yuv400 => 1,
        ChromaFormat::Yuv444 if geo.interp.luma == geo.interp.chroma => 1,
        _ => 2,
    };
    debug!(kind = %geo.desc.kind, maps = num_maps, "building sphere padding map");
    let n = geo.num_faces();
    let mut maps: Vec<Vec<FaceMap>> = (0..num_maps).map(|_| Vec::with_capacity(n)).collect();
    let mut padded = vec![false; n];
    for face in 0..n {
        for (comp, face_maps) in maps.iter_mut().enumerate() {
            let fm = if Some(face) == geo.virtual_face {
                let p = geo.faces.plane(face, comp);
                FaceMap::new(p.width(), p.height(), p.margin_x(), p.margin_y())
            } else {
                padding_face_map(geo, face, comp, &padded)
            };
            face_maps.push(fm);
        }
        padded[face] = true;
    }
    PaddingMap { maps }
}

fn padding_face_map(geo: &Geometry, face: usize, comp: usize, padded: &[bool]) -> FaceMap {
    let plane = geo.faces.plane(face, comp);
    let mut map = FaceMap::new(plane.width(), plane.height(), plane.margin_x(), plane.margin_y());
    let format = geo.internal_format();
    let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
    let (ox, oy) = geo.face_chroma_offset(face, comp);
    let (mx, my) = map.margins();
    let (w, h) = geo.face_size(comp);
    let filter = geo.filter(ChannelType::of(comp));
    let proj = geo.projection();
    let (taps, row_len) = map.rows_mut();
    for_each_row(taps, row_len, |r, row| {
        let j = r as isize - my as isize;
        for (c, tap) in row.iter_mut().enumerate() {
            let i = c as isize - mx as isize;
            let (lx, ly) = ((i << sx) as i32, (j << sy) as i32);
            if proj.inside_face_for_padding(face, lx, ly) {
                continue;
            }
            let p = proj.map_2d_to_3d(face, lx as f64 + ox, ly as f64 + oy);
            let mut pos = proj.map_3d_to_2d(p);
            if pos.is_hidden() {
                pos.face = face;
            }
            let pos = geo.to_component(pos, comp);
            let target = geo.faces.plane(pos.face, comp);
            *tap = if padded[pos.face] || valid_in_face(geo, comp, pos.face, pos.x, pos.y) {
                Tap::Sample(filter.weight(target, pos.face, pos.x, pos.y))
            } else {
                let x = pos.x.clamp(0.0, w as f64 - 1.0).round() as isize;
                let y = pos.y.clamp(0.0, h as f64 - 1.0).round() as isize;
                Tap::Sample(filter.anchored(target, pos.face, x, y))
            };
        }
    });
    map
}

/// Returns `true` if `(x, y)` (component units) can be interpolated from the
/// samples of `face` alone (validPosition4Interp).
pub(crate) fn valid_in_face(geo: &Geometry, comp: usize, face: usize, x: f64, y: f64) -> bool {
    let filter = geo.filter(ChannelType::of(comp));
    let (w, h) = geo.face_size(comp);
    if !filter.valid_position(x, y, w, h) {
        return false;
    }
    let proj = geo.projection();
    if proj.has_rectangular_faces() {
        return true;
    }
    let format = geo.internal_format();
    let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
    let (x0, y0, x1, y1) = filter.window(x, y);
    [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
        .into_iter()
        .all(|(cx, cy)| proj.inside_face_for_padding(face, (cx << sx) as i32, (cy << sy) as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InterpKind, InterpolationConfig, ProjectionDescriptor, ProjectionKind};

    fn filled(kind: ProjectionKind, size: usize, luma: InterpKind) -> Geometry {
        let desc = ProjectionDescriptor::new(kind, size, size);
        let interp = InterpolationConfig::new(luma, InterpKind::Bilinear);
        let mut g = Geometry::new(desc, interp).unwrap();
        for face in 0..g.num_faces() {
            for comp in 0..g.num_components() {
                let plane = g.faces_mut().plane_mut(face, comp);
                for y in 0..plane.height() {
                    for (x, v) in plane.row_mut(y).iter_mut().enumerate() {
                        *v = ((face * 37 + x * 5 + y * 3 + comp * 11) % 256) as Sample;
                    }
                }
            }
        }
        g
    }

    #[test]
    fn test_state_transitions() {
        let mut g = filled(ProjectionKind::Cubemap, 16, InterpKind::Bilinear);
        assert!(!g.is_padded());
        g.sphere_padding(false);
        assert!(g.is_padded());
        assert!(g.padding_map().is_some());
        g.faces_mut();
        assert!(!g.is_padded());
    }

    #[test]
    fn test_padding_leaves_interior() {
        let mut g = filled(ProjectionKind::Octahedron, 16, InterpKind::Lanczos3);
        let before = g.faces().clone();
        g.sphere_padding(false);
        for face in 0..g.num_faces() {
            for y in 0..16 {
                for x in 0..16 {
                    if g.inside_face(face, x, y) {
                        assert_eq!(
                            g.faces().plane(face, 0).get(x as isize, y as isize),
                            before.plane(face, 0).get(x as isize, y as isize)
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_padding_idempotent() {
        for kind in [ProjectionKind::Cubemap, ProjectionKind::Equirectangular, ProjectionKind::Icosahedron] {
            let mut g = filled(kind, 16, InterpKind::Lanczos2);
            g.sphere_padding(false);
            let once = g.faces().clone();
            g.sphere_padding(false);
            assert_eq!(g.faces(), &once);
            g.sphere_padding(true);
            assert_eq!(g.faces(), &once, "{kind}");
        }
    }

    #[test]
    fn test_erp_wraps_horizontally() {
        let mut g = filled(ProjectionKind::Equirectangular, 32, InterpKind::Nearest);
        g.sphere_padding(false);
        let plane = g.faces().plane(0, 0);
        // column -1 continues from the right edge, 32 from the left edge
        assert_eq!(plane.get(-1, 10), plane.get(31, 10));
        assert_eq!(plane.get(32, 10), plane.get(0, 10));
    }

    /// Checks every padded luma sample against a direct nearest lookup in the
    /// face that covers it, where that lookup stays inside the target face.
    fn assert_seams_continuous(kind: ProjectionKind) {
        let mut g = filled(kind, 16, InterpKind::Nearest);
        g.sphere_padding(false);
        let filter = *g.filter(ChannelType::Luma);
        let mut checked = 0;
        for face in 0..g.num_faces() {
            let plane = g.faces().plane(face, 0);
            let m = plane.margin_x() as isize;
            for y in -m..16 + m {
                for x in -m..16 + m {
                    if g.projection().inside_face_for_padding(face, x as i32, y as i32) {
                        continue;
                    }
                    let pos = g.map_3d_to_2d(g.map_2d_to_3d(face, x as f64, y as f64));
                    if pos.is_hidden() || !filter.valid_position(pos.x, pos.y, 16, 16) {
                        continue;
                    }
                    let (tx, ty) = (pos.x.round() as i32, pos.y.round() as i32);
                    if !g.projection().inside_face_for_padding(pos.face, tx, ty) {
                        continue;
                    }
                    let expected = g.faces().plane(pos.face, 0).get(tx as isize, ty as isize);
                    assert_eq!(plane.get(x, y), expected, "{kind} face {face} ({x}, {y})");
                    checked += 1;
                }
            }
        }
        assert!(checked > g.num_faces() * 16 * 8, "{kind}: only {checked} samples checked");
    }

    #[test]
    fn test_cubemap_seams_continuous() {
        assert_seams_continuous(ProjectionKind::Cubemap);
    }

    #[test]
    fn test_octahedron_seams_continuous() {
        assert_seams_continuous(ProjectionKind::Octahedron);
    }

    #[test]
    fn test_hemisphere_seams_continuous() {
        assert_seams_continuous(ProjectionKind::HemisphereCubemap);
        // the half faces behind the viewer are interior, not padding
        let mut g = filled(ProjectionKind::HemisphereCubemap, 16, InterpKind::Nearest);
        let before = g.faces().clone();
        g.sphere_padding(false);
        assert!(!g.inside_face(1, 2, 8));
        assert_eq!(g.faces().plane(1, 0).get(2, 8), before.plane(1, 0).get(2, 8));
    }

    /// Checks every padded luma sample against the interpolated value at the
    /// position it maps to, or against the nearest in-face sample where the
    /// interpolation window would read unpadded margins. Returns the number of
    /// samples checked each way.
    fn assert_margins_interpolated(kind: ProjectionKind, luma: InterpKind) -> (usize, usize) {
        let mut g = filled(kind, 16, luma);
        g.sphere_padding(false);
        let (mut interpolated, mut nearest) = (0, 0);
        for face in 0..g.num_faces() {
            let plane = g.faces().plane(face, 0);
            let m = plane.margin_x() as isize;
            for y in -m..16 + m {
                for x in -m..16 + m {
                    if g.projection().inside_face_for_padding(face, x as i32, y as i32) {
                        continue;
                    }
                    let mut pos = g.map_3d_to_2d(g.map_2d_to_3d(face, x as f64, y as f64));
                    if pos.is_hidden() {
                        pos.face = face;
                    }
                    // faces before this one were already padded
                    let expected = if pos.face < face || valid_in_face(&g, 0, pos.face, pos.x, pos.y) {
                        interpolated += 1;
                        g.pel_value(0, &pos)
                    } else {
                        nearest += 1;
                        let tx = pos.x.clamp(0.0, 15.0).round() as isize;
                        let ty = pos.y.clamp(0.0, 15.0).round() as isize;
                        g.faces().plane(pos.face, 0).get(tx, ty)
                    };
                    assert_eq!(plane.get(x, y), expected, "{kind} {luma} face {face} ({x}, {y}) -> {pos}");
                }
            }
        }
        (interpolated, nearest)
    }

    #[test]
    fn test_cubemap_margins_bilinear() {
        let (interpolated, nearest) = assert_margins_interpolated(ProjectionKind::Cubemap, InterpKind::Bilinear);
        assert!(interpolated > 0, "{interpolated}");
        assert!(nearest > 0);
    }

    #[test]
    fn test_cubemap_margins_lanczos2() {
        let (interpolated, nearest) = assert_margins_interpolated(ProjectionKind::Cubemap, InterpKind::Lanczos2);
        assert!(interpolated > 0, "{interpolated}");
        assert!(nearest > 0);
    }

    #[test]
    fn test_octahedron_margins_bilinear() {
        let (interpolated, nearest) = assert_margins_interpolated(ProjectionKind::Octahedron, InterpKind::Bilinear);
        assert!(interpolated > 0 && nearest > 0);
    }
}
