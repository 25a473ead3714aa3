//! Fixed-point interpolation through precomputed weight tables.
//!
//! Every interpolation kind owns one [`WeightTable`]: `(LUT_SCALE + 1)^2` rows,
//! one per quantised fractional offset `(fx, fy)`, each holding `taps x taps`
//! integer coefficients that sum exactly to `1 << INTERP_PRECISION_BITS`. The
//! last coefficient of a row is the remainder of the others, so rounding never
//! breaks normalisation.
//!
//! # Kernels
//!
//! | kind | taps | kernel |
//! |------|------|--------|
//! | [`InterpKind::Nearest`] | 1 | - |
//! | [`InterpKind::Bilinear`] | 2 | `1 - t` |
//! | [`InterpKind::Bicubic`] | 4 | cubic Hermite (Catmull-Rom) |
//! | [`InterpKind::Lanczos2`] | 4 | `sinc(x) sinc(x / 2)` |
//! | [`InterpKind::Lanczos3`] | 6 | `sinc(x) sinc(x / 3)` |
//!
//! Tables are built on first use and shared by every geometry.
//!
//! # Sampling
//!
//! [`Interpolator::weight`] turns a fractional position into a [`WeightEntry`]:
//! the linear offset of the top-left tap inside a face plane plus the table row.
//! [`Interpolator::apply`] evaluates the entry against the plane samples. A window
//! that would leave the allocated plane is a caller bug and panics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use sv360_core::{clip_bd, ChannelType, Plane, Sample};
use sv360_math::fixed::{round_pos, split_pos};
use sv360_math::sphere::sinc;
use tracing::warn;

use crate::{GeometryError, GeometryResult};

/// Precision of weight table coefficients in bits.
pub const INTERP_PRECISION_BITS: u32 = 14;

/// Fractional-offset grid resolution of the weight tables.
pub const LUT_SCALE: usize = 100;

/// Sub-sample resolution of the 1D Lanczos kernel table.
pub const LANCZOS_LUT_SCALE: usize = 100;

const WEIGHT_ONE: i32 = 1 << INTERP_PRECISION_BITS;
const ROUNDING: i64 = 1 << (INTERP_PRECISION_BITS - 1);

/// Interpolation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpKind {
    /// Nearest neighbour (id 1).
    #[serde(alias = "nn")]
    Nearest,
    /// Bilinear (id 2).
    #[serde(alias = "linear")]
    Bilinear,
    /// Bicubic (id 3).
    #[serde(alias = "cubic")]
    Bicubic,
    /// Lanczos with `a = 2` (id 4).
    Lanczos2,
    /// Lanczos with `a = 3` (id 5).
    Lanczos3,
}

impl InterpKind {
    /// All kinds in id order.
    pub const ALL: [InterpKind; 5] = [
        Self::Nearest,
        Self::Bilinear,
        Self::Bicubic,
        Self::Lanczos2,
        Self::Lanczos3,
    ];

    /// Numeric id (1..=5).
    pub fn id(self) -> u8 {
        match self {
            Self::Nearest => 1,
            Self::Bilinear => 2,
            Self::Bicubic => 3,
            Self::Lanczos2 => 4,
            Self::Lanczos3 => 5,
        }
    }

    /// Kind for a valid id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Default kind of a channel: Lanczos-3 for luma, Lanczos-2 for chroma.
    pub fn default_for(channel: ChannelType) -> Self {
        match channel {
            ChannelType::Luma => Self::Lanczos3,
            ChannelType::Chroma => Self::Lanczos2,
        }
    }

    /// Kind for an id, falling back to the channel default with a warning.
    pub fn from_id_or_default(id: u8, channel: ChannelType) -> Self {
        Self::from_id(id).unwrap_or_else(|| {
            let kind = Self::default_for(channel);
            warn!(id, ?channel, fallback = %kind, "interpolation id out of range");
            kind
        })
    }

    /// Parses a name or numeric id, falling back to the channel default.
    pub fn parse_or_default(s: &str, channel: ChannelType) -> Self {
        match s.trim().parse::<u8>() {
            Ok(id) => Self::from_id_or_default(id, channel),
            Err(_) => s.parse().unwrap_or_else(|_| {
                let kind = Self::default_for(channel);
                warn!(name = s, ?channel, fallback = %kind, "unknown interpolation kind");
                kind
            }),
        }
    }

    /// Taps per dimension.
    #[inline]
    pub fn taps(self) -> usize {
        match self {
            Self::Nearest => 1,
            Self::Bilinear => 2,
            Self::Bicubic | Self::Lanczos2 => 4,
            Self::Lanczos3 => 6,
        }
    }

    /// Distance a position may lie outside `[0, size - 1]` and still be
    /// interpolated from in-face samples only.
    #[inline]
    pub fn valid_limit(self) -> f64 {
        match self {
            Self::Nearest => 0.499,
            Self::Bilinear => 0.0,
            Self::Bicubic | Self::Lanczos2 => -1.0,
            Self::Lanczos3 => -2.0,
        }
    }

    /// Offset of the top-left tap from the anchor sample.
    #[inline]
    pub fn half_taps(self) -> isize {
        ((self.taps() - 1) >> 1) as isize
    }
}

impl fmt::Display for InterpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Lanczos2 => "lanczos2",
            Self::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

impl FromStr for InterpKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> GeometryResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nn" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            "bicubic" | "cubic" => Ok(Self::Bicubic),
            "lanczos2" => Ok(Self::Lanczos2),
            "lanczos3" => Ok(Self::Lanczos3),
            other => Err(GeometryError::InvalidDescriptor(format!(
                "unknown interpolation kind '{other}'"
            ))),
        }
    }
}

/// Precomputed integer weights of one kernel.
#[derive(Debug, Clone)]
pub struct WeightTable {
    kind: InterpKind,
    taps: usize,
    weights: Vec<i32>,
}

impl WeightTable {
    /// Shared table of `kind`, built on first use.
    pub fn get(kind: InterpKind) -> &'static WeightTable {
        static TABLES: [OnceLock<WeightTable>; 5] = [const { OnceLock::new() }; 5];
        TABLES[kind.id() as usize - 1].get_or_init(|| Self::build(kind))
    }

    fn build(kind: InterpKind) -> Self {
        let taps = kind.taps();
        let side = LUT_SCALE + 1;
        let mut weights = Vec::with_capacity(side * side * taps * taps);
        let lanczos = match kind {
            InterpKind::Lanczos2 => Some(LanczosKernel::new(2)),
            InterpKind::Lanczos3 => Some(LanczosKernel::new(3)),
            _ => None,
        };
        for iy in 0..side {
            let fy = iy as f64 / LUT_SCALE as f64;
            for ix in 0..side {
                let fx = ix as f64 / LUT_SCALE as f64;
                match kind {
                    InterpKind::Nearest => weights.push(WEIGHT_ONE),
                    InterpKind::Bilinear => push_normalized(
                        &mut weights,
                        &[(1.0 - fx) * (1.0 - fy), fx * (1.0 - fy), (1.0 - fx) * fy, fx * fy],
                    ),
                    InterpKind::Bicubic => {
                        push_separable(&mut weights, &cubic_weights(fx), &cubic_weights(fy), 1.0)
                    }
                    InterpKind::Lanczos2 | InterpKind::Lanczos3 => {
                        let Some(k) = &lanczos else { unreachable!() };
                        let (wx, wy) = (k.weights(fx), k.weights(fy));
                        let sum: f64 = wy.iter().map(|y| wx.iter().map(|x| x * y).sum::<f64>()).sum();
                        push_separable(&mut weights, &wx, &wy, sum);
                    }
                }
            }
        }
        Self {
            kind,
            taps,
            weights,
        }
    }

    /// Kernel of the table.
    #[inline]
    pub fn kind(&self) -> InterpKind {
        self.kind
    }

    /// Taps per dimension.
    #[inline]
    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Number of rows, `(LUT_SCALE + 1)^2`.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.weights.len() / (self.taps * self.taps)
    }

    /// Coefficients of row `idx`, row-major over the tap window.
    #[inline]
    pub fn row(&self, idx: usize) -> &[i32] {
        let n = self.taps * self.taps;
        &self.weights[idx * n..(idx + 1) * n]
    }

    /// Row index of fractional offset `(fx, fy)`, both in `[0, 1]`.
    #[inline]
    pub fn row_index(fx: f64, fy: f64) -> usize {
        let q = |f: f64| (f * LUT_SCALE as f64).round() as usize;
        q(fy) * (LUT_SCALE + 1) + q(fx)
    }
}

/// Rounds `w * WEIGHT_ONE` and makes the last entry the remainder.
fn push_normalized(out: &mut Vec<i32>, w: &[f64]) {
    let mut sum = 0;
    for &v in &w[..w.len() - 1] {
        let q = (v * WEIGHT_ONE as f64).round() as i32;
        sum += q;
        out.push(q);
    }
    out.push(WEIGHT_ONE - sum);
}

fn push_separable(out: &mut Vec<i32>, wx: &[f64], wy: &[f64], norm: f64) {
    let products: Vec<f64> = wy
        .iter()
        .flat_map(|y| wx.iter().map(move |x| x * y / norm))
        .collect();
    push_normalized(out, &products);
}

/// Catmull-Rom weights for taps at `-1, 0, 1, 2` relative to the floor sample.
fn cubic_weights(t: f64) -> [f64; 4] {
    let (t2, t3) = (t * t, t * t * t);
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}

/// Sampled 1D Lanczos kernel over `[-a, a]`.
struct LanczosKernel {
    a: usize,
    coef: Vec<f64>,
}

impl LanczosKernel {
    fn new(a: usize) -> Self {
        let s = LANCZOS_LUT_SCALE;
        let n = 2 * a * s + 1;
        let af = a as f64;
        let coef = (0..n)
            .map(|i| {
                if i + 1 == n {
                    0.0
                } else {
                    let x = i as f64 / s as f64 - af;
                    sinc(x) * sinc(x / af)
                }
            })
            .collect();
        Self { a, coef }
    }

    /// Weights of taps `k + 1` for `k` in `[-a, a)`, relative to the floor sample.
    fn weights(&self, t: f64) -> Vec<f64> {
        let a = self.a as i64;
        (-a..a)
            .map(|k| {
                let d = (t - k as f64 - 1.0).abs();
                let i = ((d + a as f64) * LANCZOS_LUT_SCALE as f64 + 0.5) as usize;
                self.coef[i.min(self.coef.len() - 1)]
            })
            .collect()
    }
}

/// Location of one interpolation window inside a face plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeightEntry {
    /// Source face.
    pub face: u16,
    /// Weight table row.
    pub weight_idx: u16,
    /// Linear offset of the top-left tap in the face plane data.
    pub offset: u32,
}

/// One kernel bound to its weight table.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    kind: InterpKind,
    table: &'static WeightTable,
}

impl Interpolator {
    /// Interpolator for `kind`.
    pub fn new(kind: InterpKind) -> Self {
        Self {
            kind,
            table: WeightTable::get(kind),
        }
    }

    /// Kernel.
    #[inline]
    pub fn kind(&self) -> InterpKind {
        self.kind
    }

    /// Weight table.
    #[inline]
    pub fn table(&self) -> &'static WeightTable {
        self.table
    }

    /// Anchor sample and table row of position `(x, y)`.
    #[inline]
    pub fn anchor(&self, x: f64, y: f64) -> (isize, isize, usize) {
        if self.kind == InterpKind::Nearest {
            (round_pos(x) as isize, round_pos(y) as isize, 0)
        } else {
            let (ix, fx) = split_pos(x);
            let (iy, fy) = split_pos(y);
            (ix as isize, iy as isize, WeightTable::row_index(fx, fy))
        }
    }

    /// Inclusive tap window `(x0, y0, x1, y1)` of position `(x, y)`.
    #[inline]
    pub fn window(&self, x: f64, y: f64) -> (isize, isize, isize, isize) {
        let (ix, iy, _) = self.anchor(x, y);
        self.window_at(ix, iy)
    }

    #[inline]
    fn window_at(&self, ix: isize, iy: isize) -> (isize, isize, isize, isize) {
        let half = self.kind.half_taps();
        let last = self.kind.taps() as isize - 1;
        (ix - half, iy - half, ix - half + last, iy - half + last)
    }

    /// Returns `true` when `(x, y)` can be interpolated from samples of a
    /// `width x height` rectangle alone.
    #[inline]
    pub fn valid_position(&self, x: f64, y: f64, width: usize, height: usize) -> bool {
        let lim = self.kind.valid_limit();
        x >= -lim && x < width as f64 - 1.0 + lim && y >= -lim && y < height as f64 - 1.0 + lim
    }

    /// Weight entry for fractional position `(x, y)` in `plane`.
    ///
    /// # Panics
    ///
    /// Panics if the tap window leaves the allocated plane.
    pub fn weight(&self, plane: &Plane, face: usize, x: f64, y: f64) -> WeightEntry {
        let (ix, iy, idx) = self.anchor(x, y);
        self.entry(plane, face, ix, iy, idx)
    }

    /// Entry that reproduces sample `(x, y)` exactly, through the table's row 0.
    pub fn anchored(&self, plane: &Plane, face: usize, x: isize, y: isize) -> WeightEntry {
        self.entry(plane, face, x, y, 0)
    }

    fn entry(&self, plane: &Plane, face: usize, ix: isize, iy: isize, idx: usize) -> WeightEntry {
        let (x0, y0, x1, y1) = self.window_at(ix, iy);
        assert!(
            plane.contains(x0, y0) && plane.contains(x1, y1),
            "{} window ({x0}, {y0})..({x1}, {y1}) leaves {}x{} face {face} with margin {}",
            self.kind,
            plane.width(),
            plane.height(),
            plane.margin_x()
        );
        WeightEntry {
            face: face as u16,
            weight_idx: idx as u16,
            offset: plane.index(x0, y0) as u32,
        }
    }

    /// Fixed-point weighted sum of the window of `entry` (not yet normalised).
    #[inline]
    pub fn sum(&self, plane: &Plane, entry: &WeightEntry) -> i64 {
        let taps = self.table.taps;
        let stride = plane.stride();
        let data = plane.data();
        let w = self.table.row(entry.weight_idx as usize);
        let mut sum = 0i64;
        for (ky, wrow) in w.chunks_exact(taps).enumerate() {
            let start = entry.offset as usize + ky * stride;
            let samples = &data[start..start + taps];
            for (&s, &c) in samples.iter().zip(wrow) {
                sum += s as i64 * c as i64;
            }
        }
        sum
    }

    /// Interpolated sample, rounded and clipped to `bit_depth`.
    #[inline]
    pub fn apply(&self, plane: &Plane, entry: &WeightEntry, bit_depth: u8) -> Sample {
        clip_bd((self.sum(plane, entry) + ROUNDING) >> INTERP_PRECISION_BITS, bit_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_plane(w: usize, h: usize, margin: usize) -> Plane {
        let mut p = Plane::with_margin(w, h, margin, margin);
        let m = margin as isize;
        for y in -m..h as isize + m {
            for x in -m..w as isize + m {
                p.set(x, y, (100 + 3 * x + 5 * y) as Sample);
            }
        }
        p
    }

    #[test]
    fn test_lut_rows_sum_to_one() {
        for kind in InterpKind::ALL {
            let t = WeightTable::get(kind);
            assert_eq!(t.num_rows(), (LUT_SCALE + 1) * (LUT_SCALE + 1));
            for r in 0..t.num_rows() {
                let s: i32 = t.row(r).iter().sum();
                assert_eq!(s, WEIGHT_ONE, "{kind} row {r}");
            }
        }
    }

    #[test]
    fn test_row_zero_is_identity() {
        for kind in InterpKind::ALL {
            let t = WeightTable::get(kind);
            let row = t.row(0);
            let half = kind.half_taps() as usize;
            let centre = half * kind.taps() + half;
            for (i, &w) in row.iter().enumerate() {
                assert_eq!(w, if i == centre { WEIGHT_ONE } else { 0 }, "{kind} tap {i}");
            }
        }
    }

    #[test]
    fn test_bilinear_half() {
        let t = WeightTable::get(InterpKind::Bilinear);
        let row = t.row(WeightTable::row_index(0.5, 0.5));
        assert_eq!(row, &[4096, 4096, 4096, 4096]);
    }

    #[test]
    fn test_kind_ids() {
        for k in InterpKind::ALL {
            assert_eq!(InterpKind::from_id(k.id()), Some(k));
            assert_eq!(k.to_string().parse::<InterpKind>().unwrap(), k);
        }
        assert_eq!(InterpKind::from_id_or_default(9, ChannelType::Luma), InterpKind::Lanczos3);
        assert_eq!(InterpKind::from_id_or_default(0, ChannelType::Chroma), InterpKind::Lanczos2);
        assert_eq!(InterpKind::parse_or_default("2", ChannelType::Luma), InterpKind::Bilinear);
        assert_eq!(InterpKind::parse_or_default("cubic", ChannelType::Luma), InterpKind::Bicubic);
    }

    #[test]
    fn test_interpolate_linear_ramp() {
        // all kernels reproduce a linear ramp at integer positions
        let plane = ramp_plane(16, 16, 4);
        for kind in InterpKind::ALL {
            let interp = Interpolator::new(kind);
            let e = interp.weight(&plane, 0, 5.0, 7.0);
            assert_eq!(interp.apply(&plane, &e, 10), 100 + 15 + 35, "{kind}");
        }
        // bilinear is exact in between
        let interp = Interpolator::new(InterpKind::Bilinear);
        let e = interp.weight(&plane, 0, 5.5, 7.5);
        assert_eq!(interp.apply(&plane, &e, 10), 154);
    }

    #[test]
    fn test_nearest_rounds() {
        let plane = ramp_plane(8, 8, 2);
        let interp = Interpolator::new(InterpKind::Nearest);
        let e = interp.weight(&plane, 0, 2.6, 3.4);
        assert_eq!(interp.apply(&plane, &e, 10), 100 + 9 + 15);
    }

    #[test]
    fn test_window_and_validity() {
        let interp = Interpolator::new(InterpKind::Lanczos3);
        assert_eq!(interp.window(4.3, 2.0), (2, 0, 7, 5));
        assert!(interp.valid_position(2.0, 2.0, 8, 8));
        assert!(!interp.valid_position(1.9, 2.0, 8, 8));
        assert!(!interp.valid_position(5.0, 2.0, 8, 8));

        let nn = Interpolator::new(InterpKind::Nearest);
        assert!(nn.valid_position(-0.4, 7.4, 8, 8));
        assert!(!nn.valid_position(-0.5, 0.0, 8, 8));
    }

    #[test]
    #[should_panic]
    fn test_window_outside_margin_panics() {
        let plane = ramp_plane(8, 8, 2);
        Interpolator::new(InterpKind::Lanczos3).weight(&plane, 0, 8.5, 0.0);
    }

    #[test]
    fn test_anchored_entry_reproduces_sample() {
        let plane = ramp_plane(8, 8, 3);
        for kind in InterpKind::ALL {
            let interp = Interpolator::new(kind);
            let e = interp.anchored(&plane, 0, 0, 7);
            assert_eq!(interp.apply(&plane, &e, 10), plane.get(0, 7));
        }
    }

    #[test]
    fn test_clipping() {
        let mut plane = Plane::with_margin(8, 8, 4, 4);
        plane.fill(0);
        plane.set(3, 3, 1023);
        let interp = Interpolator::new(InterpKind::Lanczos3);
        // negative lobes clip to zero rather than wrapping
        let e = interp.weight(&plane, 0, 4.5, 3.0);
        assert!(interp.sum(&plane, &e) < ROUNDING * 2 * 1023);
        let e = interp.weight(&plane, 0, 1.5, 3.0);
        assert_eq!(interp.apply(&plane, &e, 10), 0);
    }
}
