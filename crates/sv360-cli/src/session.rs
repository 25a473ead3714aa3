//! YAML session files.
//!
//! A session names the input and output geometries and the interpolation
//! settings:
//!
//! ```yaml
//! input:
//!   projection: erp
//!   width: 3840
//!   height: 1920
//!   chroma_format: 420
//!   bit_depth: 8
//! output:
//!   projection: cmp
//!   face_width: 960
//!   face_height: 960
//!   packing: "4 0 5 / 3@180 1@270 2"
//!   rotation: { yaw: 90, pitch: 0, roll: 0 }
//! interpolation:
//!   luma: bilinear
//!   chroma: lanczos2
//!   chroma_location: 0
//! ```
//!
//! Command-line flags override file values afterwards.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use sv360_core::{ChannelType, ChromaFormat, ChromaLocation, Picture};
use sv360_geometry::{
    FramePacking, Geometry, GuardBandFill, InterpKind, InterpolationConfig, ProjectionDescriptor, ProjectionKind, VariantParams,
};
use sv360_math::SphereRotation;
use tracing::debug;

/// One side of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometryConfig {
    /// Projection kind.
    pub projection: ProjectionKind,
    /// Packed picture width, used to infer the face size.
    #[serde(default)]
    pub width: Option<usize>,
    /// Packed picture height.
    #[serde(default)]
    pub height: Option<usize>,
    /// Face width.
    #[serde(default)]
    pub face_width: Option<usize>,
    /// Face height.
    #[serde(default)]
    pub face_height: Option<usize>,
    /// Frame-packing layout, e.g. `"4 0 5 / 3@180 1@270 2"`.
    #[serde(default)]
    pub packing: Option<String>,
    /// Compact octahedron / icosahedron layout.
    #[serde(default)]
    pub compact: bool,
    /// Sphere rotation in degrees.
    #[serde(default)]
    pub rotation: SphereRotation,
    /// Guard band around packed faces.
    #[serde(default)]
    pub guard_band: usize,
    /// How guard bands are filled.
    #[serde(default)]
    pub guard_band_fill: GuardBandFill,
    /// Keep guard bands along the picture border.
    #[serde(default = "default_exterior")]
    pub guard_band_exterior: bool,
    /// Chroma format of the file.
    #[serde(default)]
    pub chroma_format: ChromaFormat,
    /// Bit depth of the file.
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u8,
    /// Variant parameters.
    #[serde(default)]
    pub params: VariantParams,
}

fn default_bit_depth() -> u8 {
    8
}

fn default_exterior() -> bool {
    true
}

impl GeometryConfig {
    /// Config of a projection with every other field defaulted.
    pub fn new(projection: ProjectionKind) -> Self {
        Self {
            projection,
            width: None,
            height: None,
            face_width: None,
            face_height: None,
            packing: None,
            compact: false,
            rotation: SphereRotation::IDENTITY,
            guard_band: 0,
            guard_band_fill: GuardBandFill::Geometry,
            guard_band_exterior: true,
            chroma_format: ChromaFormat::Yuv420,
            bit_depth: 8,
            params: VariantParams::default(),
        }
    }

    /// Builds the descriptor, inferring the face size from the picture size
    /// when it is not given.
    pub fn descriptor(&self) -> Result<ProjectionDescriptor> {
        let mut desc = ProjectionDescriptor::new(self.projection, self.face_width.unwrap_or(0), self.face_height.unwrap_or(0))
            .with_rotation(self.rotation)
            .with_guard_band(self.guard_band)
            .with_guard_band_fill(self.guard_band_fill, self.guard_band_exterior)
            .with_packed_format(self.chroma_format)
            .with_params(self.params.clone());
        desc.compact = self.compact;
        if let Some(layout) = &self.packing {
            let packing: FramePacking = layout
                .parse()
                .with_context(|| format!("bad packing '{layout}'"))?;
            desc = desc.with_packing(packing);
        }
        match (self.face_width, self.face_height, self.width, self.height) {
            (Some(_), Some(_), _, _) => {}
            (_, _, Some(w), Some(h)) => desc.infer_face_size(w, h)?,
            _ => bail!(
                "{}: give either face_width/face_height or width/height",
                self.projection
            ),
        }
        Ok(desc)
    }
}

/// Interpolation settings as written in a session file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpSection {
    /// Luma kernel name or id (1..=5).
    pub luma: Option<String>,
    /// Chroma kernel name or id.
    pub chroma: Option<String>,
    /// Chroma sample location type (0..=3).
    pub chroma_location: u8,
    /// Chroma format of the face buffers, forced by the file formats.
    pub internal_chroma_format: Option<ChromaFormat>,
    /// Bit depth of the face buffers, the output bit depth by default.
    pub internal_bit_depth: Option<u8>,
}

/// A whole session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Source geometry.
    pub input: GeometryConfig,
    /// Coding geometry.
    pub output: GeometryConfig,
    /// Interpolation.
    #[serde(default)]
    pub interpolation: InterpSection,
    /// Frames to convert, all by default.
    #[serde(default)]
    pub frames: Option<usize>,
    /// Frames to skip at the start of the input.
    #[serde(default)]
    pub skip: usize,
}

impl SessionConfig {
    /// Reads a session file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse: {}", path.display()))
    }

    /// Parses session YAML.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Resolved interpolation config of the face buffers.
    pub fn interpolation(&self) -> InterpolationConfig {
        let s = &self.interpolation;
        let luma = s.luma.as_deref().map_or(InterpKind::default_for(ChannelType::Luma), |v| {
            InterpKind::parse_or_default(v, ChannelType::Luma)
        });
        let chroma = s.chroma.as_deref().map_or(InterpKind::default_for(ChannelType::Chroma), |v| {
            InterpKind::parse_or_default(v, ChannelType::Chroma)
        });
        let mut interp = InterpolationConfig::new(luma, chroma)
            .with_chroma_location(ChromaLocation::from_index_or_default(s.chroma_location))
            .with_format(s.internal_chroma_format.unwrap_or(ChromaFormat::Yuv420))
            .with_bit_depth(s.internal_bit_depth.unwrap_or(self.output.bit_depth));
        interp.resolve_internal_format(self.input.chroma_format, self.output.chroma_format);
        interp
    }

    /// Builds geometries and pictures.
    pub fn build(&self) -> Result<Session> {
        let interp = self.interpolation();
        let src_interp = InterpolationConfig {
            output_bit_depth: self.input.bit_depth,
            ..interp
        };
        let dst_interp = InterpolationConfig {
            output_bit_depth: self.output.bit_depth,
            ..interp
        };
        let src = Geometry::new(self.input.descriptor()?, src_interp).context("input geometry")?;
        let dst = Geometry::new(self.output.descriptor()?, dst_interp).context("output geometry")?;
        let input = packed_picture(&src)?;
        let output = packed_picture(&dst)?;
        debug!(
            input = %src.descriptor().kind,
            output = %dst.descriptor().kind,
            internal = %interp.internal_chroma_format,
            bit_depth = interp.bit_depth,
            "session built"
        );
        Ok(Session { src, dst, input, output })
    }
}

/// Picture matching a geometry's packed layout.
pub fn packed_picture(geo: &Geometry) -> Result<Picture> {
    let desc = geo.descriptor();
    let (w, h) = desc.packed_size();
    Ok(Picture::new(w, h, desc.packed_chroma_format, geo.interp().output_bit_depth)?)
}

/// Live geometries and frame buffers of a conversion.
#[derive(Debug)]
pub struct Session {
    /// Source geometry.
    pub src: Geometry,
    /// Coding geometry.
    pub dst: Geometry,
    /// Input frame buffer.
    pub input: Picture,
    /// Output frame buffer.
    pub output: Picture,
}
