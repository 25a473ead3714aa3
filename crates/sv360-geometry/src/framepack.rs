//! Frame packing and unpacking (framePack / convertYuv).
//!
//! A packed picture is a `rows x cols` grid of equal cells. Each cell holds one
//! face, rotated and optionally flipped, surrounded by a guard band of
//! `guard_band` samples. Unused cells are mid-gray.
//!
//! # Guard Bands
//!
//! | fill | band sample |
//! |------|-------------|
//! | geometry | sphere-padded margin, interpolated |
//! | repetitive | nearest face edge sample |
//! | neighbour | nearest sample of the face covering the direction |
//!
//! Without the exterior band the picture is cropped by `guard_band` on every
//! side, leaving bands only between cells.
//!
//! # Compact Layouts
//!
//! Triangles of neighbouring cells share columns, so only samples inside a
//! triangle are written; the gaps between triangles stay mid-gray. Unpacking
//! reads the full rectangle of a face, and whatever lands outside its triangle
//! is replaced by sphere padding.
//!
//! # Chroma
//!
//! | face buffers | packed | pack | unpack |
//! |--------------|--------|------|--------|
//! | same format | same | copy | copy |
//! | 4:4:4 | 4:2:0 | downsample per cell | upsample whole picture |
//! | 4:0:0 | any | luma, chroma mid-gray | luma only |
//! | 4:2:0 | 4:4:4 | unsupported | unsupported |
//!
//! Downsampling runs in cell orientation on a 4:4:4 copy of the cell that
//! includes a little of the padded margin, so the packed chroma phase is the
//! one the location type declares for every face orientation.

use sv360_core::{mid_value, ChromaFormat, Picture, Plane, Sample};
use tracing::trace;

use crate::chroma::{downsample, rescale, upsample};
use crate::{FaceTransform, Geometry, GeometryError, GeometryResult, GuardBandFill};

/// Extra 4:4:4 samples around a cell read by the downsampler.
const DOWN_CONTEXT: usize = 2;

/// Fills a luma-unit rectangle of every component with mid-gray, clipped to
/// the picture.
pub fn fill_region(pic: &mut Picture, x: isize, y: isize, w: usize, h: usize) {
    let (x1, y1) = (
        (x + w as isize).min(pic.width() as isize),
        (y + h as isize).min(pic.height() as isize),
    );
    let (x0, y0) = (x.max(0), y.max(0));
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let mid = mid_value(pic.bit_depth());
    let format = pic.format();
    for comp in 0..pic.num_components() {
        let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
        pic.plane_mut(comp).fill_rect(
            x0 >> sx,
            y0 >> sy,
            ((x1 - x0) as usize) >> sx,
            ((y1 - y0) as usize) >> sy,
            mid,
        );
    }
}

/// Writes `value` unless `(x, y)` lies outside the picture plane.
#[inline]
fn put(dst: &mut Plane, x: isize, y: isize, value: Sample) {
    if x >= 0 && y >= 0 && (x as usize) < dst.width() && (y as usize) < dst.height() {
        dst.set(x, y, value);
    }
}

impl Geometry {
    /// Position in the packed picture of face sample `(u, v)` of component
    /// `comp`, in that component's packed sample units.
    ///
    /// `u` and `v` may reach into the guard band (`-guard_band..`). Returns
    /// `None` for faces not placed in the layout and for band samples cropped
    /// at the picture border. In compact layouts, positions outside a
    /// triangle hold a neighbour's samples.
    pub fn geo_to_frame_pack(&self, face: usize, u: isize, v: isize, comp: usize) -> Option<(usize, usize)> {
        let (row, col) = self.packing.locate(face)?;
        let format = self.desc.packed_chroma_format;
        let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
        let (w, h) = (self.desc.face_width >> sx, self.desc.face_height >> sy);
        let (gx, gy) = (self.desc.guard_band >> sx, self.desc.guard_band >> sy);
        let (ue, ve) = (u + gx as isize, v + gy as isize);
        let (ew, eh) = (w + 2 * gx, h + 2 * gy);
        if ue < 0 || ve < 0 || ue as usize >= ew || ve as usize >= eh {
            return None;
        }
        let t = self.packing.cell(row, col).transform;
        let (a, b) = t.face_to_cell(ue as usize, ve as usize, ew, eh);
        let (ox, oy) = self.desc.cell_origin(row, col);
        let (x, y) = ((ox >> sx) + a as isize, (oy >> sy) + b as isize);
        let (pw, ph) = self.desc.packed_size();
        if x < 0 || y < 0 || x as usize >= pw >> sx || y as usize >= ph >> sy {
            return None;
        }
        Some((x as usize, y as usize))
    }

    fn check_packed(&self, pic: &Picture, op: &str, any_format: bool) -> GeometryResult<()> {
        let (w, h) = self.desc.packed_size();
        if (pic.width(), pic.height()) != (w, h) {
            return Err(GeometryError::SizeMismatch(format!(
                "{op}: picture {}x{}, layout {w}x{h}",
                pic.width(),
                pic.height()
            )));
        }
        let packed = self.desc.packed_chroma_format;
        if pic.format() != packed && !any_format {
            return Err(GeometryError::FormatMismatch(format!(
                "{op}: picture {}, layout {packed}",
                pic.format()
            )));
        }
        if self.internal_format() == ChromaFormat::Yuv420 && packed == ChromaFormat::Yuv444 {
            return Err(GeometryError::Unsupported(format!(
                "{op}: 4:2:0 face buffers with 4:4:4 packing"
            )));
        }
        Ok(())
    }

    /// Writes the faces into `pic` (framePack).
    ///
    /// `pic` must have the packed size, chroma format and the output bit depth.
    /// Pads the faces first when guard bands or chroma downsampling read the
    /// margins.
    ///
    /// # Errors
    ///
    /// Size, format and bit depth mismatches, and 4:2:0 faces packed as 4:4:4.
    pub fn frame_pack(&mut self, pic: &mut Picture) -> GeometryResult<()> {
        self.check_packed(pic, "frame_pack", false)?;
        let out_bd = self.interp.output_bit_depth;
        if pic.bit_depth() != out_bd {
            return Err(GeometryError::FormatMismatch(format!(
                "frame_pack: {}-bit picture, {out_bd}-bit output",
                pic.bit_depth()
            )));
        }
        let internal = self.internal_format();
        let downsampling = internal == ChromaFormat::Yuv444 && pic.format() == ChromaFormat::Yuv420;
        if self.desc.guard_band > 0 || downsampling {
            self.sphere_padding(false);
        }
        if self.desc.compact {
            let (w, h) = (pic.width(), pic.height());
            fill_region(pic, 0, 0, w, h);
        }

        let (cw, ch) = self.desc.cell_size();
        let packing = self.packing.clone();
        for row in 0..packing.rows {
            for col in 0..packing.cols {
                let cell = packing.cell(row, col);
                let origin = self.desc.cell_origin(row, col);
                let Some(face) = cell.face else {
                    fill_region(pic, origin.0, origin.1, cw, ch);
                    continue;
                };
                for comp in 0..pic.num_components() {
                    if comp > 0 && internal == ChromaFormat::Yuv400 {
                        fill_region_component(pic, comp, origin, (cw, ch));
                    } else if comp > 0 && downsampling {
                        self.pack_downsampled(pic, face, comp, cell.transform, origin);
                    } else {
                        self.pack_direct(pic, face, comp, cell.transform, origin);
                    }
                }
                trace!(face, row, col, "face packed");
            }
        }
        Ok(())
    }

    fn pack_direct(&self, pic: &mut Picture, face: usize, comp: usize, t: FaceTransform, origin: (isize, isize)) {
        let format = self.internal_format();
        let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
        let (w, h) = self.face_size(comp);
        let (gx, gy) = (self.desc.guard_band >> sx, self.desc.guard_band >> sy);
        let (ox, oy) = (origin.0 >> sx, origin.1 >> sy);
        let (bd, out_bd) = (self.bit_depth(), self.interp.output_bit_depth);
        let mid = mid_value(out_bd);
        let dst = pic.plane_mut(comp);
        for ve in 0..h + 2 * gy {
            for ue in 0..w + 2 * gx {
                let (u, v) = (ue as isize - gx as isize, ve as isize - gy as isize);
                let value = if self.in_rect_outside_face(face, comp, u, v) {
                    if self.desc.compact {
                        continue;
                    }
                    mid
                } else {
                    rescale(self.band_sample(face, comp, u, v), bd, out_bd)
                };
                let (a, b) = t.face_to_cell(ue, ve, w + 2 * gx, h + 2 * gy);
                put(dst, ox + a as isize, oy + b as isize, value);
            }
        }
    }

    /// Sample `(u, v)` of `face`, filled per [`GuardBandFill`] outside the
    /// face rectangle.
    fn band_sample(&self, face: usize, comp: usize, u: isize, v: isize) -> Sample {
        let (w, h) = self.face_size(comp);
        let src = self.faces.plane(face, comp);
        let (wi, hi) = (w as isize, h as isize);
        if (0..wi).contains(&u) && (0..hi).contains(&v) {
            return src.get(u, v);
        }
        match self.desc.guard_band_fill {
            GuardBandFill::Geometry => src.get(u, v),
            GuardBandFill::Repetitive => src.get(u.clamp(0, wi - 1), v.clamp(0, hi - 1)),
            GuardBandFill::Neighbour => self.neighbour_sample(face, comp, u, v),
        }
    }

    /// Nearest sample, without interpolation, of the face that covers the
    /// direction of `(u, v)` on `face`.
    fn neighbour_sample(&self, face: usize, comp: usize, u: isize, v: isize) -> Sample {
        let format = self.internal_format();
        let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
        let (cx, cy) = self.face_chroma_offset(face, comp);
        let p = self
            .projection
            .map_2d_to_3d(face, (u << sx) as f64 + cx, (v << sy) as f64 + cy);
        let mut pos = self.projection.map_3d_to_2d(p);
        if pos.is_hidden() {
            pos.face = face;
        }
        let pos = self.to_component(pos, comp);
        let (w, h) = self.face_size(comp);
        let x = pos.x.round().clamp(0.0, w as f64 - 1.0) as isize;
        let y = pos.y.round().clamp(0.0, h as f64 - 1.0) as isize;
        self.faces.plane(pos.face, comp).get(x, y)
    }

    /// Packs 4:4:4 chroma of `face` as 4:2:0 through a cell-oriented copy.
    fn pack_downsampled(&self, pic: &mut Picture, face: usize, comp: usize, t: FaceTransform, origin: (isize, isize)) {
        let (w, h) = self.face_size(comp);
        let g = self.desc.guard_band;
        let e = g + DOWN_CONTEXT;
        let (ew, eh) = (w + 2 * e, h + 2 * e);
        let (cw, ch) = t.cell_size(w + 2 * g, h + 2 * g);
        let bd = self.bit_depth();
        let mid = mid_value(bd);
        let mut cell = Plane::with_margin(cw, ch, DOWN_CONTEXT, DOWN_CONTEXT);
        for ve in 0..eh {
            for ue in 0..ew {
                let (u, v) = (ue as isize - e as isize, ve as isize - e as isize);
                let value = if self.in_rect_outside_face(face, comp, u, v) {
                    mid
                } else {
                    self.band_sample(face, comp, u, v)
                };
                let (a, b) = t.face_to_cell(ue, ve, ew, eh);
                cell.set(a as isize - DOWN_CONTEXT as isize, b as isize - DOWN_CONTEXT as isize, value);
            }
        }
        let down = downsample(&cell, self.interp.chroma_location, 0, bd, self.interp.output_bit_depth);
        let (ox, oy) = (origin.0 >> 1, origin.1 >> 1);
        let (dw, dh) = (down.width(), down.height());
        let dst = pic.plane_mut(comp);
        for b in 0..dh {
            for a in 0..dw {
                if self.desc.compact {
                    let (u, v) = t.cell_to_face(a, b, dw, dh);
                    if !self.covers(face, (2 * u) as i32, (2 * v) as i32) {
                        continue;
                    }
                }
                put(dst, ox + a as isize, oy + b as isize, down.get(a as isize, b as isize));
            }
        }
    }

    /// Returns `true` if luma sample `(x, y)` of `face` carries picture content.
    #[inline]
    fn covers(&self, face: usize, x: i32, y: i32) -> bool {
        self.projection.inside_face(face, x, y) && !self.projection.outside_image(face, x, y)
    }

    /// Returns `true` for samples inside the face rectangle that the face does
    /// not cover (triangle corners, half faces, outside a fisheye circle).
    fn in_rect_outside_face(&self, face: usize, comp: usize, u: isize, v: isize) -> bool {
        let (w, h) = self.face_size(comp);
        if u < 0 || v < 0 || u as usize >= w || v as usize >= h {
            return false;
        }
        let format = self.internal_format();
        let (lx, ly) = ((u << format.scale_x(comp)) as i32, (v << format.scale_y(comp)) as i32);
        !self.covers(face, lx, ly)
    }

    /// Reads the faces from a packed picture (convertYuv).
    ///
    /// Samples are rescaled from the picture's bit depth to the face buffer
    /// bit depth. Guard bands are ignored. Clears the padded state.
    ///
    /// # Errors
    ///
    /// Size and format mismatches, and 4:2:0 faces read from 4:4:4 pictures.
    pub fn convert_yuv(&mut self, pic: &Picture) -> GeometryResult<()> {
        self.check_packed(pic, "convert_yuv", self.internal_format() == ChromaFormat::Yuv400)?;
        let internal = self.internal_format();
        let pic_bd = pic.bit_depth();
        let bd = self.bit_depth();
        let upsampled: Vec<Plane> = if internal == ChromaFormat::Yuv444 && pic.format() == ChromaFormat::Yuv420 {
            (1..3)
                .map(|c| upsample(pic.plane(c), self.interp.chroma_location, pic_bd, bd))
                .collect()
        } else {
            Vec::new()
        };

        for row in 0..self.packing.rows {
            for col in 0..self.packing.cols {
                let cell = *self.packing.cell(row, col);
                let Some(face) = cell.face else { continue };
                let origin = self.desc.cell_origin(row, col);
                for comp in 0..self.num_components() {
                    let (src, src_bd) = if comp > 0 && !upsampled.is_empty() {
                        (&upsampled[comp - 1], bd)
                    } else {
                        (pic.plane(comp), pic_bd)
                    };
                    self.unpack_face(src, src_bd, face, comp, cell.transform, origin);
                }
            }
        }
        if let Some(face) = self.virtual_face {
            let mid = mid_value(bd);
            for comp in 0..self.num_components() {
                self.faces.plane_mut(face, comp).fill(mid);
            }
        }
        self.padded = false;
        trace!(kind = %self.desc.kind, "picture unpacked");
        Ok(())
    }

    fn unpack_face(
        &mut self,
        src: &Plane,
        src_bd: u8,
        face: usize,
        comp: usize,
        t: FaceTransform,
        origin: (isize, isize),
    ) {
        // `src` is sampled like the face buffers: 4:4:4 chroma was upsampled
        let format = self.internal_format();
        let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
        let (w, h) = self.face_size(comp);
        let (gx, gy) = (self.desc.guard_band >> sx, self.desc.guard_band >> sy);
        let (ox, oy) = (origin.0 >> sx, origin.1 >> sy);
        let bd = self.bit_depth();
        let dst = self.faces.plane_mut(face, comp);
        for v in 0..h {
            let row = dst.row_mut(v);
            for (u, out) in row.iter_mut().enumerate() {
                let (a, b) = t.face_to_cell(u + gx, v + gy, w + 2 * gx, h + 2 * gy);
                *out = rescale(src.get(ox + a as isize, oy + b as isize), src_bd, bd);
            }
        }
    }
}

fn fill_region_component(pic: &mut Picture, comp: usize, origin: (isize, isize), size: (usize, usize)) {
    let format = pic.format();
    let (sx, sy) = (format.scale_x(comp), format.scale_y(comp));
    let mid: Sample = mid_value(pic.bit_depth());
    let plane = pic.plane_mut(comp);
    let (x0, y0) = ((origin.0 >> sx).max(0), (origin.1 >> sy).max(0));
    let x1 = ((origin.0 >> sx) + (size.0 >> sx) as isize).min(plane.width() as isize);
    let y1 = ((origin.1 >> sy) + (size.1 >> sy) as isize).min(plane.height() as isize);
    if x1 > x0 && y1 > y0 {
        plane.fill_rect(x0, y0, (x1 - x0) as usize, (y1 - y0) as usize, mid);
    }
}
