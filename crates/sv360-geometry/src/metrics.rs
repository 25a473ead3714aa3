//! Quality metrics on packed pictures and on the sphere.
//!
//! - [`psnr`] - plain PSNR of one component of two packed pictures
//! - [`ws_psnr`] - weighted-to-spherically-uniform PSNR of equirectangular pictures
//! - [`SpherePsnr`] - S-PSNR-NN on a uniform point set of the sphere
//!
//! All of them report [`PSNR_IDENTICAL`] when the inputs agree exactly.

use std::f64::consts::PI;
use sv360_core::{Picture, Plane};
use sv360_math::sphere::fibonacci_sphere;
use sv360_math::{DVec3, RotationDirection, Rotator};
use tracing::debug;

use crate::{Geometry, GeometryError, GeometryResult};

/// Value reported for identical inputs.
pub const PSNR_IDENTICAL: f64 = 999.99;

/// Default number of S-PSNR sample points.
pub const DEFAULT_SPHERE_POINTS: usize = 655_362;

/// Peak sample value used for PSNR at `bit_depth` (`255 << (bd - 8)`).
#[inline]
pub fn peak_value(bit_depth: u8) -> f64 {
    if bit_depth >= 8 {
        (255u32 << (bit_depth - 8)) as f64
    } else {
        ((1u32 << bit_depth) - 1) as f64
    }
}

fn to_db(sum_weights: f64, peak: f64, ssd: f64) -> f64 {
    if ssd <= 0.0 {
        PSNR_IDENTICAL
    } else {
        10.0 * (sum_weights * peak * peak / ssd).log10()
    }
}

fn check_pair(reference: &Picture, test: &Picture, comp: usize) -> GeometryResult<()> {
    reference.check_compatible(test)?;
    if comp >= reference.num_components() {
        return Err(GeometryError::FormatMismatch(format!(
            "component {comp} of a {} picture",
            reference.format()
        )));
    }
    Ok(())
}

fn row_ssd(a: &Plane, b: &Plane, y: usize) -> f64 {
    a.row(y)
        .iter()
        .zip(b.row(y))
        .map(|(&p, &q)| {
            let d = p as f64 - q as f64;
            d * d
        })
        .sum()
}

/// PSNR of component `comp`.
///
/// # Errors
///
/// Pictures of different size, format or bit depth.
pub fn psnr(reference: &Picture, test: &Picture, comp: usize) -> GeometryResult<f64> {
    check_pair(reference, test, comp)?;
    let (a, b) = (reference.plane(comp), test.plane(comp));
    let ssd: f64 = (0..a.height()).map(|y| row_ssd(a, b, y)).sum();
    let n = (a.width() * a.height()) as f64;
    Ok(to_db(n, peak_value(reference.bit_depth()), ssd))
}

/// WS-PSNR of component `comp` of two equirectangular pictures.
///
/// Row `j` of an `h` row plane is weighted by the cosine of its latitude,
/// `cos((j + 0.5 - h / 2) * pi / h)`.
///
/// # Errors
///
/// Pictures of different size, format or bit depth.
pub fn ws_psnr(reference: &Picture, test: &Picture, comp: usize) -> GeometryResult<f64> {
    check_pair(reference, test, comp)?;
    let (a, b) = (reference.plane(comp), test.plane(comp));
    let h = a.height() as f64;
    let (mut ssd, mut weights) = (0.0, 0.0);
    for y in 0..a.height() {
        let w = ((y as f64 + 0.5 - h / 2.0) * PI / h).cos();
        ssd += w * row_ssd(a, b, y);
        weights += w * a.width() as f64;
    }
    Ok(to_db(weights, peak_value(reference.bit_depth()), ssd))
}

/// S-PSNR with nearest-sample lookup on a fixed set of sphere points.
#[derive(Debug, Clone)]
pub struct SpherePsnr {
    points: Vec<DVec3>,
}

impl SpherePsnr {
    /// Uses `n` points of a Fibonacci lattice.
    pub fn new(n: usize) -> Self {
        Self::from_points(fibonacci_sphere(n))
    }

    /// Uses the given unit directions.
    pub fn from_points(points: Vec<DVec3>) -> Self {
        Self { points }
    }

    /// Sample points.
    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// S-PSNR of component `comp` between the face buffers of two geometries.
    ///
    /// Each geometry is looked up in its own orientation: a geometry rotated
    /// by `R` shows world direction `q` at `R^-1 q`. Points either geometry
    /// does not cover are ignored.
    ///
    /// # Errors
    ///
    /// [`GeometryError::FormatMismatch`] when the bit depths differ or a
    /// geometry lacks the component.
    pub fn compute(&self, reference: &Geometry, test: &Geometry, comp: usize) -> GeometryResult<f64> {
        if reference.bit_depth() != test.bit_depth()
            || comp >= reference.num_components()
            || comp >= test.num_components()
        {
            return Err(GeometryError::FormatMismatch(format!(
                "component {comp}: {} {}-bit vs {} {}-bit",
                reference.internal_format(),
                reference.bit_depth(),
                test.internal_format(),
                test.bit_depth()
            )));
        }
        let to_ref = Rotator::new(reference.descriptor().rotation, RotationDirection::Inverse);
        let to_test = Rotator::new(test.descriptor().rotation, RotationDirection::Inverse);
        let (mut ssd, mut n) = (0.0, 0usize);
        for &q in &self.points {
            let (Some(a), Some(b)) = (
                nearest_sample(reference, comp, to_ref.apply(q)),
                nearest_sample(test, comp, to_test.apply(q)),
            ) else {
                continue;
            };
            let d = a - b;
            ssd += d * d;
            n += 1;
        }
        debug!(points = n, ssd, "sphere psnr");
        Ok(to_db(n as f64, peak_value(reference.bit_depth()), ssd))
    }
}

/// Nearest in-face sample of `geo` in direction `p`.
fn nearest_sample(geo: &Geometry, comp: usize, p: DVec3) -> Option<f64> {
    let pos = geo.map_3d_to_2d(p);
    if pos.is_hidden() {
        return None;
    }
    let pos = geo.to_component(pos, comp);
    let (w, h) = geo.face_size(comp);
    let x = pos.x.round().clamp(0.0, w as f64 - 1.0) as isize;
    let y = pos.y.round().clamp(0.0, h as f64 - 1.0) as isize;
    Some(geo.faces().plane(pos.face, comp).get(x, y) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InterpolationConfig, ProjectionDescriptor, ProjectionKind};
    use approx::assert_abs_diff_eq;
    use sv360_core::ChromaFormat;

    fn picture(v: u16) -> Picture {
        let mut p = Picture::new(16, 8, ChromaFormat::Yuv420, 8).unwrap();
        p.fill(v);
        p
    }

    #[test]
    fn test_psnr_identical() {
        let a = picture(10);
        assert_eq!(psnr(&a, &a, 0).unwrap(), PSNR_IDENTICAL);
        assert_eq!(ws_psnr(&a, &a, 2).unwrap(), PSNR_IDENTICAL);
    }

    #[test]
    fn test_psnr_constant_error() {
        let (a, b) = (picture(10), picture(11));
        let expected = 10.0 * (255.0f64 * 255.0).log10();
        assert_abs_diff_eq!(psnr(&a, &b, 0).unwrap(), expected, epsilon = 1e-9);
        // uniform error is weight independent
        assert_abs_diff_eq!(ws_psnr(&a, &b, 1).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_psnr_mismatch() {
        let a = picture(10);
        let b = Picture::new(16, 8, ChromaFormat::Yuv444, 8).unwrap();
        assert!(psnr(&a, &b, 0).is_err());
        assert!(psnr(&a, &a, 3).is_err());
    }

    #[test]
    fn test_peak_value() {
        assert_eq!(peak_value(8), 255.0);
        assert_eq!(peak_value(10), 1020.0);
    }

    #[test]
    fn test_sphere_psnr_across_projections() {
        let interp = InterpolationConfig::default();
        let mut erp = Geometry::new(ProjectionDescriptor::new(ProjectionKind::Equirectangular, 64, 32), interp).unwrap();
        let mut cmp = Geometry::new(ProjectionDescriptor::new(ProjectionKind::Cubemap, 16, 16), interp).unwrap();
        erp.faces_mut().fill(50);
        cmp.faces_mut().fill(50);
        let metric = SpherePsnr::new(1000);
        assert_eq!(metric.points().len(), 1000);
        assert_eq!(metric.compute(&erp, &cmp, 0).unwrap(), PSNR_IDENTICAL);

        cmp.faces_mut().fill(52);
        let expected = 10.0 * (255.0f64 * 255.0 / 4.0).log10();
        assert_abs_diff_eq!(metric.compute(&erp, &cmp, 1).unwrap(), expected, epsilon = 1e-9);
    }
}
