//! Fixed-point split of sample positions.
//!
//! Fractional sample positions are quantised to `1 / (1 << POS_PRECISION_BITS)`
//! before being split into an integer sample index and a fraction in `[0, 1)`.
//! Quantising first keeps positions that differ only by floating point noise on
//! the same weight table row.

/// Sub-sample precision of positions, in bits.
pub const POS_PRECISION_BITS: u32 = 12;

/// Splits `x` into `(floor, fraction)` after quantisation.
///
/// ```rust
/// use sv360_math::fixed::split_pos;
///
/// assert_eq!(split_pos(2.25), (2, 0.25));
/// assert_eq!(split_pos(-0.25), (-1, 0.75));
/// ```
#[inline]
pub fn split_pos(x: f64) -> (i32, f64) {
    let q = (x * (1i64 << POS_PRECISION_BITS) as f64).round() as i64;
    let int = q >> POS_PRECISION_BITS;
    let frac = (q - (int << POS_PRECISION_BITS)) as f64 / (1i64 << POS_PRECISION_BITS) as f64;
    (int as i32, frac)
}

/// Rounds half away from zero to an integer sample index.
#[inline]
pub fn round_pos(x: f64) -> i32 {
    x.round() as i32
}
