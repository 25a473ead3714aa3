//! # sv360-math
//!
//! Sphere math used by the projection engine.
//!
//! - [`SphereRotation`] / [`Rotator`] - yaw/pitch/roll rotation of sphere points
//! - [`sphere`] - direction <-> yaw/pitch conversion, sinc, point lattices
//! - [`fixed`] - fixed-point split of sample positions into integer and fraction
//!
//! # Design
//!
//! This crate wraps [`glam`] double precision types. Points on the sphere are
//! [`DVec3`] with the conventions
//!
//! ```text
//! +X : yaw 0, pitch 0 (centre of an equirectangular picture)
//! +Y : up (pitch +90)
//! -Z : yaw +90 (to the right in an equirectangular picture)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use sv360_math::{DVec3, SphereRotation};
//!
//! let rot = SphereRotation::from_degrees(90.0, 0.0, 0.0);
//! let p = rot.rotate(DVec3::X);
//! assert!((p - DVec3::NEG_Z).length() < 1e-12);
//! ```
//!
//! # Used By
//!
//! - `sv360-geometry` - Projection variants, mapping cache, metrics

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod fixed;
mod rotation;
pub mod sphere;

pub use glam::{DMat3, DVec3};
pub use rotation::*;
