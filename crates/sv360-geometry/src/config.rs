//! Interpolation and sampling configuration of a geometry.

use serde::{Deserialize, Serialize};
use sv360_core::{ChannelType, ChromaFormat, ChromaLocation, MAX_BIT_DEPTH};
use tracing::warn;

use crate::{GeometryError, GeometryResult, InterpKind};

/// Sampling settings shared by the face buffers of one geometry.
///
/// `internal_chroma_format` and `bit_depth` describe the face buffers,
/// `output_bit_depth` the packed picture written by `frame_pack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Kernel for luma.
    pub luma: InterpKind,
    /// Kernel for chroma.
    pub chroma: InterpKind,
    /// Chroma format of the face buffers.
    pub internal_chroma_format: ChromaFormat,
    /// Chroma sample location of packed 4:2:0 pictures.
    pub chroma_location: ChromaLocation,
    /// Bit depth of the face buffers.
    pub bit_depth: u8,
    /// Bit depth of packed output pictures.
    pub output_bit_depth: u8,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            luma: InterpKind::Lanczos3,
            chroma: InterpKind::Lanczos2,
            internal_chroma_format: ChromaFormat::Yuv420,
            chroma_location: ChromaLocation::Type0,
            bit_depth: 8,
            output_bit_depth: 8,
        }
    }
}

impl InterpolationConfig {
    /// Config with the given kernels and defaults elsewhere.
    pub fn new(luma: InterpKind, chroma: InterpKind) -> Self {
        Self {
            luma,
            chroma,
            ..Self::default()
        }
    }

    /// Sets the internal chroma format.
    pub fn with_format(mut self, format: ChromaFormat) -> Self {
        self.internal_chroma_format = format;
        self
    }

    /// Sets internal and output bit depth.
    pub fn with_bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = bit_depth;
        self.output_bit_depth = bit_depth;
        self
    }

    /// Sets the chroma sample location.
    pub fn with_chroma_location(mut self, location: ChromaLocation) -> Self {
        self.chroma_location = location;
        self
    }

    /// Kernel of a channel.
    #[inline]
    pub fn kind(&self, channel: ChannelType) -> InterpKind {
        match channel {
            ChannelType::Luma => self.luma,
            ChannelType::Chroma => self.chroma,
        }
    }

    /// Forces the internal format implied by the input and output formats.
    ///
    /// 4:0:0 on either side forces 4:0:0, otherwise 4:4:4 on either side
    /// forces 4:4:4. Changes are logged.
    pub fn resolve_internal_format(&mut self, input: ChromaFormat, output: ChromaFormat) {
        let forced = if input == ChromaFormat::Yuv400 || output == ChromaFormat::Yuv400 {
            ChromaFormat::Yuv400
        } else if input == ChromaFormat::Yuv444 || output == ChromaFormat::Yuv444 {
            ChromaFormat::Yuv444
        } else {
            self.internal_chroma_format
        };
        if forced != self.internal_chroma_format {
            warn!(
                requested = %self.internal_chroma_format,
                forced = %forced,
                %input,
                %output,
                "internal chroma format forced"
            );
            self.internal_chroma_format = forced;
        }
    }

    /// Checks bit depths.
    pub fn validate(&self) -> GeometryResult<()> {
        for (name, bd) in [("bit_depth", self.bit_depth), ("output_bit_depth", self.output_bit_depth)] {
            if bd < 8 || bd > MAX_BIT_DEPTH {
                return Err(GeometryError::InvalidDescriptor(format!(
                    "{name} {bd} outside 8..={MAX_BIT_DEPTH}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_internal_format() {
        let mut c = InterpolationConfig::default();
        c.resolve_internal_format(ChromaFormat::Yuv420, ChromaFormat::Yuv420);
        assert_eq!(c.internal_chroma_format, ChromaFormat::Yuv420);

        c.resolve_internal_format(ChromaFormat::Yuv420, ChromaFormat::Yuv444);
        assert_eq!(c.internal_chroma_format, ChromaFormat::Yuv444);

        c.resolve_internal_format(ChromaFormat::Yuv400, ChromaFormat::Yuv444);
        assert_eq!(c.internal_chroma_format, ChromaFormat::Yuv400);
    }

    #[test]
    fn test_kind_per_channel() {
        let c = InterpolationConfig::new(InterpKind::Bilinear, InterpKind::Lanczos2);
        assert_eq!(c.kind(ChannelType::Luma), InterpKind::Bilinear);
        assert_eq!(c.kind(ChannelType::Chroma), InterpKind::Lanczos2);
    }

    #[test]
    fn test_yaml() {
        let c: InterpolationConfig = serde_yaml::from_str(
            "luma: nn\nchroma: lanczos3\ninternal_chroma_format: 444\nchroma_location: 9\nbit_depth: 10\n",
        )
        .unwrap();
        assert_eq!(c.luma, InterpKind::Nearest);
        assert_eq!(c.internal_chroma_format, ChromaFormat::Yuv444);
        assert_eq!(c.chroma_location, ChromaLocation::Type0);
        assert_eq!(c.bit_depth, 10);
        assert_eq!(c.output_bit_depth, 8);
        assert!(c.validate().is_ok());
        assert!(InterpolationConfig::default().with_bit_depth(17).validate().is_err());
    }
}
