//! Sampling format descriptions.
//!
//! - [`ChromaFormat`] - 4:0:0, 4:2:0 or 4:4:4 component layout
//! - [`ChannelType`] - Luma or chroma, selects interpolation settings
//! - [`ChromaLocation`] - Phase of chroma samples relative to luma
//!
//! Component indices follow the usual YUV order: 0 = Y, 1 = Cb, 2 = Cr.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Chroma subsampling layout of a picture or of a geometry's face buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ChromaFormat {
    /// Luma only.
    Yuv400,
    /// Chroma halved horizontally and vertically.
    #[default]
    Yuv420,
    /// Full resolution chroma.
    Yuv444,
}

impl ChromaFormat {
    /// Parses the conventional numeric id (400, 420, 444).
    ///
    /// # Example
    ///
    /// ```rust
    /// use sv360_core::ChromaFormat;
    ///
    /// assert_eq!(ChromaFormat::from_idc(420).unwrap(), ChromaFormat::Yuv420);
    /// assert!(ChromaFormat::from_idc(422).is_err());
    /// ```
    pub fn from_idc(idc: u32) -> Result<Self> {
        match idc {
            400 => Ok(Self::Yuv400),
            420 => Ok(Self::Yuv420),
            444 => Ok(Self::Yuv444),
            other => Err(Error::unsupported_format(format!("chroma format {other}"))),
        }
    }

    /// Numeric id of the format.
    #[inline]
    pub fn idc(self) -> u32 {
        match self {
            Self::Yuv400 => 400,
            Self::Yuv420 => 420,
            Self::Yuv444 => 444,
        }
    }

    /// Number of components (1 or 3).
    #[inline]
    pub fn num_components(self) -> usize {
        match self {
            Self::Yuv400 => 1,
            _ => 3,
        }
    }

    /// Horizontal log2 subsampling of a component.
    #[inline]
    pub fn scale_x(self, comp: usize) -> u32 {
        match (self, comp) {
            (_, 0) => 0,
            (Self::Yuv420, _) => 1,
            _ => 0,
        }
    }

    /// Vertical log2 subsampling of a component.
    #[inline]
    pub fn scale_y(self, comp: usize) -> u32 {
        self.scale_x(comp)
    }

    /// Returns `true` when chroma planes are smaller than luma.
    #[inline]
    pub fn is_subsampled(self) -> bool {
        self == Self::Yuv420
    }
}

impl TryFrom<u32> for ChromaFormat {
    type Error = Error;

    fn try_from(idc: u32) -> Result<Self> {
        Self::from_idc(idc)
    }
}

impl From<ChromaFormat> for u32 {
    fn from(format: ChromaFormat) -> u32 {
        format.idc()
    }
}

impl fmt::Display for ChromaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yuv400 => write!(f, "4:0:0"),
            Self::Yuv420 => write!(f, "4:2:0"),
            Self::Yuv444 => write!(f, "4:4:4"),
        }
    }
}

/// Luma or chroma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// Component 0.
    Luma,
    /// Components 1 and 2.
    Chroma,
}

impl ChannelType {
    /// Channel type of a component index.
    #[inline]
    pub fn of(comp: usize) -> Self {
        if comp == 0 { Self::Luma } else { Self::Chroma }
    }

    /// Dense index (0 = luma, 1 = chroma).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Luma => 0,
            Self::Chroma => 1,
        }
    }
}

/// Chroma sample location type.
///
/// | type | horizontal phase | vertical phase |
/// |------|------------------|----------------|
/// | 0    | 0                | 0.5            |
/// | 1    | 0.5              | 0.5            |
/// | 2    | 0                | 0              |
/// | 3    | 0.5              | 0              |
///
/// Phases are in luma samples. Out-of-range values are reset to type 0 with a
/// warning when deserialized or converted with [`ChromaLocation::from_index_or_default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChromaLocation {
    /// Vertical half-sample shift (the common 4:2:0 default).
    #[default]
    Type0,
    /// Half-sample shift in both directions.
    Type1,
    /// Co-sited with luma.
    Type2,
    /// Horizontal half-sample shift.
    Type3,
}

impl ChromaLocation {
    /// Returns the location for a valid index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Type0),
            1 => Some(Self::Type1),
            2 => Some(Self::Type2),
            3 => Some(Self::Type3),
            _ => None,
        }
    }

    /// Returns the location for an index, resetting invalid values to type 0.
    pub fn from_index_or_default(index: u8) -> Self {
        Self::from_index(index).unwrap_or_else(|| {
            warn!(index, "chroma sample location type must be in [0, 3], reset to 0");
            Self::Type0
        })
    }

    /// Numeric type.
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            Self::Type0 => 0,
            Self::Type1 => 1,
            Self::Type2 => 2,
            Self::Type3 => 3,
        }
    }

    /// Sub-sample phase `(x, y)` in luma samples.
    #[inline]
    pub fn phase(self) -> (f64, f64) {
        let x = match self {
            Self::Type0 | Self::Type2 => 0.0,
            Self::Type1 | Self::Type3 => 0.5,
        };
        let y = match self {
            Self::Type2 | Self::Type3 => 0.0,
            Self::Type0 | Self::Type1 => 0.5,
        };
        (x, y)
    }
}

impl From<u8> for ChromaLocation {
    fn from(index: u8) -> Self {
        Self::from_index_or_default(index)
    }
}

impl From<ChromaLocation> for u8 {
    fn from(loc: ChromaLocation) -> u8 {
        loc.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chroma_format_idc() {
        for f in [ChromaFormat::Yuv400, ChromaFormat::Yuv420, ChromaFormat::Yuv444] {
            assert_eq!(ChromaFormat::from_idc(f.idc()).unwrap(), f);
        }
        assert!(ChromaFormat::from_idc(422).is_err());
    }

    #[test]
    fn test_chroma_format_scales() {
        assert_eq!(ChromaFormat::Yuv420.scale_x(0), 0);
        assert_eq!(ChromaFormat::Yuv420.scale_x(1), 1);
        assert_eq!(ChromaFormat::Yuv420.scale_y(2), 1);
        assert_eq!(ChromaFormat::Yuv444.scale_x(2), 0);
        assert_eq!(ChromaFormat::Yuv400.num_components(), 1);
        assert_eq!(ChromaFormat::Yuv444.num_components(), 3);
    }

    #[test]
    fn test_channel_type() {
        assert_eq!(ChannelType::of(0), ChannelType::Luma);
        assert_eq!(ChannelType::of(2), ChannelType::Chroma);
        assert_eq!(ChannelType::Chroma.index(), 1);
    }

    #[test]
    fn test_chroma_location_phase() {
        assert_eq!(ChromaLocation::Type0.phase(), (0.0, 0.5));
        assert_eq!(ChromaLocation::Type1.phase(), (0.5, 0.5));
        assert_eq!(ChromaLocation::Type2.phase(), (0.0, 0.0));
        assert_eq!(ChromaLocation::Type3.phase(), (0.5, 0.0));
    }

    #[test]
    fn test_chroma_location_reset() {
        assert_eq!(ChromaLocation::from(7u8), ChromaLocation::Type0);
        assert_eq!(ChromaLocation::from(3u8), ChromaLocation::Type3);
    }
}
