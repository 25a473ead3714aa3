//! Conversions between sphere directions and yaw/pitch angles.
//!
//! Yaw grows to the right of `+X` (toward `-Z`), pitch grows upward (toward `+Y`).
//! All angles are in radians unless a function name says otherwise.

use glam::DVec3;
use std::f64::consts::PI;

/// Unit direction for a yaw/pitch pair.
#[inline]
pub fn direction_from_angles(yaw: f64, pitch: f64) -> DVec3 {
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();
    DVec3::new(cp * cy, sp, -cp * sy)
}

/// Yaw/pitch of a (not necessarily unit) direction.
///
/// The zero vector maps to `(0, 0)`.
#[inline]
pub fn angles_from_direction(p: DVec3) -> (f64, f64) {
    let len = p.length();
    if len == 0.0 {
        return (0.0, 0.0);
    }
    let yaw = -p.z.atan2(p.x);
    let pitch = (p.y / len).clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

/// Yaw/pitch in degrees.
pub fn angles_deg_from_direction(p: DVec3) -> (f64, f64) {
    let (yaw, pitch) = angles_from_direction(p);
    (yaw.to_degrees(), pitch.to_degrees())
}

/// Normalized sinc, `sin(pi x) / (pi x)`.
///
/// A short Taylor series replaces the quotient close to zero.
#[inline]
pub fn sinc(x: f64) -> f64 {
    let x = x * PI;
    if x.abs() < 1e-4 {
        let x2 = x * x;
        1.0 + x2 * (-1.0 / 6.0 + x2 / 120.0)
    } else {
        x.sin() / x
    }
}

/// `n` nearly uniform directions on the unit sphere (Fibonacci lattice).
pub fn fibonacci_sphere(n: usize) -> Vec<DVec3> {
    let golden = PI * (3.0 - 5f64.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let (s, c) = (golden * i as f64).sin_cos();
            DVec3::new(r * c, y, r * s)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_axes() {
        let p = direction_from_angles(0.0, 0.0);
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-12);
        let p = direction_from_angles(PI / 2.0, 0.0);
        assert_abs_diff_eq!(p.z, -1.0, epsilon = 1e-12);
        let p = direction_from_angles(0.0, PI / 2.0);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angles_roundtrip() {
        for &(yaw, pitch) in &[(0.3, 0.2), (-2.9, -1.1), (3.0, 1.4), (-0.01, 0.0)] {
            let (y, p) = angles_from_direction(direction_from_angles(yaw, pitch));
            assert_abs_diff_eq!(y, yaw, epsilon = 1e-12);
            assert_abs_diff_eq!(p, pitch, epsilon = 1e-12);
        }
        assert_eq!(angles_from_direction(DVec3::ZERO), (0.0, 0.0));
    }

    #[test]
    fn test_sinc() {
        assert_abs_diff_eq!(sinc(0.0), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(sinc(1.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sinc(0.5), 2.0 / PI, epsilon = 1e-12);
        assert_abs_diff_eq!(sinc(1e-6), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fibonacci_sphere() {
        let pts = fibonacci_sphere(500);
        assert_eq!(pts.len(), 500);
        for p in &pts {
            assert_abs_diff_eq!(p.length(), 1.0, epsilon = 1e-12);
        }
        let mean = pts.iter().fold(DVec3::ZERO, |a, &p| a + p) / 500.0;
        assert!(mean.length() < 0.01);
    }
}
