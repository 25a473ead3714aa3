//! # sv360-core
//!
//! Core types for omnidirectional video conversion.
//!
//! This crate provides the foundational types used throughout the workspace:
//!
//! - [`Plane`] - One component of one face (or picture) with symmetric margins
//! - [`Picture`] - A packed planar YUV picture as read from / written to a file
//! - [`ChromaFormat`], [`ChannelType`], [`ChromaLocation`] - Sampling descriptions
//! - [`io`] - Raw planar YUV frame reading and writing
//!
//! ## Crate Structure
//!
//! ```text
//! sv360-core (this crate)
//!    ^
//!    |
//!    +-- sv360-math (rotation, sphere angles)
//!    +-- sv360-geometry (projection engine)
//!    +-- sv360-cli
//! ```
//!
//! ## Samples
//!
//! All samples are stored as [`Sample`] (`u16`) regardless of the bit depth, which
//! is carried alongside the buffers and ranges from 1 to 16 bits.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod io;
pub mod picture;
pub mod plane;

pub use error::*;
pub use format::*;
pub use picture::Picture;
pub use plane::Plane;

/// Storage type of a single sample.
pub type Sample = u16;

/// Largest supported bit depth.
pub const MAX_BIT_DEPTH: u8 = 16;

/// Clips a value to the range of the given bit depth.
#[inline]
pub fn clip_bd(value: i64, bit_depth: u8) -> Sample {
    let max = (1i64 << bit_depth) - 1;
    value.clamp(0, max) as Sample
}

/// Mid-gray value for the given bit depth (`1 << (bd - 1)`).
#[inline]
pub fn mid_value(bit_depth: u8) -> Sample {
    1 << (bit_depth - 1)
}

/// Prelude module for convenient imports.
///
/// ```
/// use sv360_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{ChannelType, ChromaFormat, ChromaLocation};
    pub use crate::picture::Picture;
    pub use crate::plane::Plane;
    pub use crate::{clip_bd, mid_value, Sample};
}
