//! Fixed chroma resampling between 4:4:4 and 4:2:0.
//!
//! Both directions are separable integer filters chosen by the chroma sample
//! location type, so that chroma sample `(i, j)` of a 4:2:0 plane lands on the
//! phase the location type declares:
//!
//! | type | phase (luma units) | down H | down V | up H | up V |
//! |------|--------------------|--------|--------|------|------|
//! | 0 | (0, 0.5) | `[1 6 1]` | `[1 1]` | copy / 8-tap | 8-tap pair |
//! | 1 | (0.5, 0.5) | `[1 1]` | `[1 1]` | 4-tap pair | 4-tap pair |
//! | 2 | (0, 0) | `[1]` | `[1]` | copy / 8-tap | copy / 8-tap |
//! | 3 | (0.5, 0) | `[1 1]` | `[1 6 1]` | 4-tap pair | copy / 4-tap |
//!
//! Upsampling coefficients are normalised to 64 per pass.

use std::cmp::Ordering;
use sv360_core::{clip_bd, ChromaLocation, Plane, Sample};

use crate::rows::for_each_row;

/// Downsampling taps of one axis and their normalisation shift.
#[derive(Debug, Clone, Copy)]
struct DownTaps {
    taps: &'static [i32],
    shift: u32,
}

const DOWN_121: DownTaps = DownTaps { taps: &[1, 6, 1], shift: 3 };
const DOWN_11: DownTaps = DownTaps { taps: &[1, 1], shift: 1 };
const DOWN_1: DownTaps = DownTaps { taps: &[1], shift: 0 };

fn down_taps(loc: ChromaLocation) -> (DownTaps, DownTaps) {
    match loc {
        ChromaLocation::Type0 => (DOWN_121, DOWN_11),
        ChromaLocation::Type1 => (DOWN_11, DOWN_11),
        ChromaLocation::Type2 => (DOWN_1, DOWN_1),
        ChromaLocation::Type3 => (DOWN_11, DOWN_121),
    }
}

const UP_SHIFT: u32 = 12;
const UP_COPY: &[i32] = &[64];
const UP_HALF8: &[i32] = &[-1, 4, -11, 40, 40, -11, 4, -1];
const UP_QUARTER_A: &[i32] = &[-2, 16, 54, -4];
const UP_QUARTER_B: &[i32] = &[-4, 54, 16, -2];
const UP_HALF4: &[i32] = &[-4, 36, 36, -4];
const UP_V0_TYPE0: &[i32] = &[0, 1, -5, 17, 58, -10, 4, -1];
const UP_V1_TYPE0: &[i32] = &[-1, 4, -10, 58, 17, -5, 1, 0];

/// Upsampling taps `[even, odd]` for the horizontal and vertical pass.
fn up_taps(loc: ChromaLocation) -> ([&'static [i32]; 2], [&'static [i32]; 2]) {
    match loc {
        ChromaLocation::Type0 => ([UP_COPY, UP_HALF8], [UP_V0_TYPE0, UP_V1_TYPE0]),
        ChromaLocation::Type1 => ([UP_QUARTER_A, UP_QUARTER_B], [UP_QUARTER_A, UP_QUARTER_B]),
        ChromaLocation::Type2 => ([UP_COPY, UP_HALF8], [UP_COPY, UP_HALF8]),
        ChromaLocation::Type3 => ([UP_QUARTER_A, UP_QUARTER_B], [UP_COPY, UP_HALF4]),
    }
}

/// First source index read for output sample `2i + odd`, relative to `i`.
#[inline]
fn up_offset(n: usize, odd: bool) -> isize {
    let n = n as isize;
    let centre = (n - 1) >> 1;
    if odd { -centre } else { -(isize::from(n > 1)) - centre }
}

/// Normalises a weighted sum by `shift` bits with rounding; negative shifts scale up.
#[inline]
fn normalize(sum: i64, shift: i32) -> i64 {
    match shift.cmp(&0) {
        Ordering::Greater => (sum + (1 << (shift - 1))) >> shift,
        Ordering::Less => sum << -shift,
        Ordering::Equal => sum,
    }
}

/// Converts a sample between bit depths, rounding when reducing.
#[inline]
pub(crate) fn rescale(value: Sample, from: u8, to: u8) -> Sample {
    clip_bd(normalize(value as i64, from as i32 - to as i32), to)
}

/// Halves `src` in both directions (4:4:4 to 4:2:0 chroma).
///
/// The result has the given margin, which is computed as well; `src` must
/// carry `2 * margin + 2` valid samples of margin on each side.
pub fn downsample(src: &Plane, loc: ChromaLocation, margin: usize, in_bd: u8, out_bd: u8) -> Plane {
    let (fh, fv) = down_taps(loc);
    let (w, h) = (src.width() / 2, src.height() / 2);
    let m = margin as isize;
    let h_off = (fh.taps.len() as isize - 1) >> 1;
    let v_off = (fv.taps.len() as isize - 1) >> 1;

    let row0 = -2 * m - v_off;
    let rows = (2 * (h as isize + 2 * m) + fv.taps.len() as isize) as usize;
    let cols = w + 2 * margin;
    let mut tmp = vec![0i64; cols * rows];
    for_each_row(&mut tmp, cols, |r, row| {
        let y = row0 + r as isize;
        for (c, t) in row.iter_mut().enumerate() {
            let x0 = 2 * (c as isize - m) - h_off;
            *t = fh
                .taps
                .iter()
                .enumerate()
                .map(|(k, &cf)| cf as i64 * src.get(x0 + k as isize, y) as i64)
                .sum();
        }
    });

    let shift = (fh.shift + fv.shift) as i32 + in_bd as i32 - out_bd as i32;
    let mut out = Plane::with_margin(w, h, margin, margin);
    let stride = out.stride();
    let tmp = &tmp;
    for_each_row(out.data_mut(), stride, |r, row| {
        let y0 = 2 * (r as isize - m) - v_off - row0;
        for (c, v) in row.iter_mut().enumerate() {
            let sum: i64 = fv
                .taps
                .iter()
                .enumerate()
                .map(|(k, &cf)| cf as i64 * tmp[(y0 + k as isize) as usize * cols + c])
                .sum();
            *v = clip_bd(normalize(sum, shift), out_bd);
        }
    });
    out
}

/// Doubles `src` in both directions (4:2:0 to 4:4:4 chroma).
///
/// Edge samples are replicated outwards; the result has no margin.
pub fn upsample(src: &Plane, loc: ChromaLocation, in_bd: u8, out_bd: u8) -> Plane {
    const EDGE: usize = 4;
    let (hf, vf) = up_taps(loc);
    let (w, h) = (src.width(), src.height());
    let mut ext = Plane::with_margin(w, h, EDGE, EDGE);
    for y in 0..h {
        ext.row_mut(y).copy_from_slice(src.row(y));
    }
    ext.extend_edges();

    let cols = w + 2 * EDGE;
    let mut vert = vec![0i64; cols * 2 * h];
    let ext = &ext;
    for_each_row(&mut vert, cols, |r, row| {
        let odd = r % 2 == 1;
        let taps = vf[usize::from(odd)];
        let y0 = (r / 2) as isize + up_offset(taps.len(), odd);
        for (c, t) in row.iter_mut().enumerate() {
            let x = c as isize - EDGE as isize;
            *t = taps
                .iter()
                .enumerate()
                .map(|(k, &cf)| cf as i64 * ext.get(x, y0 + k as isize) as i64)
                .sum();
        }
    });

    let shift = UP_SHIFT as i32 + in_bd as i32 - out_bd as i32;
    let mut out = Plane::new(2 * w, 2 * h);
    let vert = &vert;
    for_each_row(out.data_mut(), 2 * w, |r, row| {
        let line = &vert[r * cols..(r + 1) * cols];
        for (c, v) in row.iter_mut().enumerate() {
            let odd = c % 2 == 1;
            let taps = hf[usize::from(odd)];
            let x0 = (c / 2) as isize + up_offset(taps.len(), odd) + EDGE as isize;
            let sum: i64 = taps
                .iter()
                .enumerate()
                .map(|(k, &cf)| cf as i64 * line[(x0 + k as isize) as usize])
                .sum();
            *v = clip_bd(normalize(sum, shift), out_bd);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATIONS: [ChromaLocation; 4] = [
        ChromaLocation::Type0,
        ChromaLocation::Type1,
        ChromaLocation::Type2,
        ChromaLocation::Type3,
    ];

    fn constant(w: usize, h: usize, margin: usize, v: Sample) -> Plane {
        let mut p = Plane::with_margin(w, h, margin, margin);
        p.fill(v);
        p
    }

    #[test]
    fn test_filters_normalised() {
        for loc in LOCATIONS {
            let (h, v) = down_taps(loc);
            assert_eq!(h.taps.iter().sum::<i32>(), 1 << h.shift);
            assert_eq!(v.taps.iter().sum::<i32>(), 1 << v.shift);
            let (h, v) = up_taps(loc);
            for taps in h.iter().chain(v.iter()) {
                assert_eq!(taps.iter().sum::<i32>(), 64, "{loc:?}");
            }
        }
    }

    #[test]
    fn test_constant_preserved() {
        for loc in LOCATIONS {
            let down = downsample(&constant(16, 8, 8, 300), loc, 2, 10, 10);
            assert_eq!((down.width(), down.height()), (8, 4));
            assert!(down.data().iter().all(|&v| v == 300), "{loc:?}");

            let up = upsample(&constant(8, 4, 0, 77), loc, 8, 8);
            assert_eq!((up.width(), up.height()), (16, 8));
            assert!(up.data().iter().all(|&v| v == 77), "{loc:?}");
        }
    }

    #[test]
    fn test_bit_depth_change() {
        let down = downsample(&constant(4, 4, 4, 1023), ChromaLocation::Type0, 0, 10, 8);
        assert!(down.data().iter().all(|&v| v == 255));
        let up = upsample(&constant(2, 2, 0, 200), ChromaLocation::Type1, 8, 10);
        assert!(up.data().iter().all(|&v| v == 800));
    }

    #[test]
    fn test_cosited_copy() {
        // type 2 keeps even samples of both passes unchanged
        let mut src = Plane::with_margin(8, 8, 4, 4);
        for y in -4..12 {
            for x in -4..12 {
                src.set(x, y, (x * 10 + y + 50) as Sample);
            }
        }
        let down = downsample(&src, ChromaLocation::Type2, 0, 8, 8);
        let up = upsample(&down, ChromaLocation::Type2, 8, 8);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(down.get(x, y), src.get(2 * x, 2 * y));
                assert_eq!(up.get(2 * x, 2 * y), down.get(x, y));
            }
        }
    }

    #[test]
    fn test_rescale() {
        assert_eq!(rescale(255, 8, 10), 1020);
        assert_eq!(rescale(1023, 10, 8), 255);
        assert_eq!(rescale(513, 10, 8), 128);
        assert_eq!(rescale(42, 8, 8), 42);
    }
}
