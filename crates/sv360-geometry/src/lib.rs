//! # sv360-geometry
//!
//! Sphere projection engine for omnidirectional video.
//!
//! A [`Geometry`] represents one projection of the sphere into 2D faces. It
//! maps face samples to unit vectors and back, caches a per-sample resampling
//! map against a source geometry, fills face margins from neighbouring faces
//! (sphere padding), resamples faces between geometries, and packs faces into
//! a single picture and back.
//!
//! # Modules
//!
//! - [`descriptor`] - Projection kinds, frame-packing layouts, variant parameters
//! - [`filter`] - Interpolation kernels and their fixed-point weight tables
//! - [`projection`] - The [`SphereProjection`] variants
//! - [`mapping`] - Resampling maps between geometries
//! - [`padding`] - Sphere padding of face margins
//! - [`chroma`] - Fixed 4:4:4 / 4:2:0 chroma resampling
//! - [`framepack`] - Packing faces into pictures and back
//! - [`metrics`] - PSNR, WS-PSNR and S-PSNR
//!
//! # Design
//!
//! ```text
//!  Picture ──convert_yuv──> Geometry (src) ──sphere_padding──┐
//!                                                            │
//!                                            geo_convert ────┤ build_mapping (once)
//!                                                            v
//!  Picture <──frame_pack─── Geometry (dst) <─────────────────┘
//! ```
//!
//! Every phase processes rows independently; with the `parallel` feature the
//! rows are spread over the rayon pool.
//!
//! # Usage
//!
//! ```rust
//! use sv360_core::{ChromaFormat, Picture};
//! use sv360_geometry::{Geometry, InterpolationConfig, ProjectionDescriptor, ProjectionKind};
//!
//! let interp = InterpolationConfig::default();
//! let mut erp = Geometry::new(ProjectionDescriptor::new(ProjectionKind::Equirectangular, 128, 64), interp)?;
//! let mut cmp = Geometry::new(ProjectionDescriptor::new(ProjectionKind::Cubemap, 32, 32), interp)?;
//!
//! let mut input = Picture::new(128, 64, ChromaFormat::Yuv420, 8)?;
//! input.fill_mid_gray();
//! erp.convert_yuv(&input)?;
//! erp.geo_convert(&mut cmp)?;
//!
//! let (w, h) = cmp.descriptor().packed_size();
//! let mut output = Picture::new(w, h, ChromaFormat::Yuv420, 8)?;
//! cmp.frame_pack(&mut output)?;
//! assert_eq!((w, h), (96, 64));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Dependencies
//!
//! - [`sv360_core`] - Planes, pictures, chroma formats
//! - [`sv360_math`] - Rotation and sphere helpers
//! - `glam` - Vector math
//! - `serde` - Configuration types
//! - `tracing` - Diagnostics
//! - `rayon` - Row parallelism (`parallel` feature)
//!
//! # Used By
//!
//! - `sv360-cli` - Conversion and metric tool
//! - `sv360-tests` - End-to-end scenarios

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod chroma;
mod config;
mod convert;
pub mod descriptor;
mod error;
mod face;
pub mod filter;
pub mod framepack;
mod geometry;
pub mod mapping;
pub mod metrics;
pub mod padding;
pub mod projection;
mod rows;

pub use config::InterpolationConfig;
pub use descriptor::{
    FaceCell, FaceTransform, FisheyeParams, FramePacking, GcmpFaceWarp, GcmpParams, GuardBandFill,
    ProjectionDescriptor, ProjectionKind, VariantParams, ViewportParams,
};
pub use error::{GeometryError, GeometryResult};
pub use face::FaceStore;
pub use filter::{InterpKind, Interpolator, WeightEntry, WeightTable};
pub use framepack::fill_region;
pub use geometry::{Geometry, GeometryState, SpherePoint};
pub use mapping::{FaceMap, GeometryMap, Tap};
pub use padding::PaddingMap;
pub use projection::{SPos, SphereProjection, HIDDEN_FACE};

/// Luma samples of margin on each side of every face buffer.
pub const PAD_MARGIN: usize = 16;

/// Largest guard band, in luma samples, around a packed face.
pub const MAX_GUARD_BAND: usize = 8;

/// Horizontal gap, in luma samples, between interlocked triangles of a
/// compact layout.
pub const COMPACT_GAP: usize = 2;
