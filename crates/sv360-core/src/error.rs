//! Error types for sv360-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of the buffer layer:
//! - Plane and picture allocation (dimensions, bit depth)
//! - Format compatibility between pictures
//! - Raw frame I/O
//!
//! # Usage
//!
//! ```rust
//! use sv360_core::{Error, Result};
//!
//! fn check_even(width: usize, height: usize) -> Result<()> {
//!     if width % 2 != 0 || height % 2 != 0 {
//!         return Err(Error::invalid_dimensions(width, height, "4:2:0 needs even sizes"));
//!     }
//!     Ok(())
//! }
//! assert!(check_even(3, 2).is_err());
//! ```
//!
//! # Used By
//!
//! - [`crate::picture::Picture`] - Allocation checks
//! - [`crate::io`] - Frame reading/writing
//! - `sv360-geometry` - Wrapped into `GeometryError::Core`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by planes, pictures and raw frame I/O.
///
/// # Categories
///
/// - **Dimension errors**: [`InvalidDimensions`](Error::InvalidDimensions), [`DimensionMismatch`](Error::DimensionMismatch)
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat), [`FormatMismatch`](Error::FormatMismatch), [`InvalidBitDepth`](Error::InvalidBitDepth)
/// - **I/O errors**: [`Io`](Error::Io), [`TruncatedFrame`](Error::TruncatedFrame)
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid plane or picture dimensions.
    ///
    /// Returned when width or height is zero, or when the chroma format
    /// requires even dimensions.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Two buffers that must agree in size do not.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First buffer width
        a_width: usize,
        /// First buffer height
        a_height: usize,
        /// Second buffer width
        b_width: usize,
        /// Second buffer height
        b_height: usize,
    },

    /// Chroma format is not supported.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// Format name or description
        format: String,
    },

    /// Two pictures have incompatible sampling formats.
    #[error("format mismatch: expected {expected}, got {got}")]
    FormatMismatch {
        /// Expected format
        expected: String,
        /// Actual format
        got: String,
    },

    /// Bit depth outside `1..=16`.
    #[error("invalid bit depth: {0}")]
    InvalidBitDepth(u8),

    /// The input ended in the middle of a frame.
    #[error("truncated frame: expected {expected} bytes, got {got}")]
    TruncatedFrame {
        /// Bytes in a full frame
        expected: usize,
        /// Bytes actually read
        got: usize,
    },

    /// I/O error during raw frame reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: usize, height: usize, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::FormatMismatch`] error.
    #[inline]
    pub fn format_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::FormatMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is a dimension-related error.
    #[inline]
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. } | Self::DimensionMismatch { .. }
        )
    }

    /// Returns `true` if this is a format-related error.
    #[inline]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::FormatMismatch { .. } | Self::InvalidBitDepth(_)
        )
    }

    /// Returns `true` if this is an I/O error.
    #[inline]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_) | Self::TruncatedFrame { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(0, 64, "zero width");
        let msg = err.to_string();
        assert!(msg.contains("0x64"));
        assert!(msg.contains("zero width"));
        assert!(err.is_dimension_error());
        assert!(!err.is_io_error());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((1920, 1080), (1280, 720));
        let msg = err.to_string();
        assert!(msg.contains("1920x1080"));
        assert!(msg.contains("1280x720"));
    }

    #[test]
    fn test_format_errors() {
        assert!(Error::unsupported_format("4:2:2").is_format_error());
        assert!(Error::format_mismatch("420", "444").is_format_error());
        assert!(Error::InvalidBitDepth(17).is_format_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.yuv");
        let err: Error = io_err.into();
        assert!(err.is_io_error());
        assert!(err.to_string().contains("missing.yuv"));
    }

    #[test]
    fn test_truncated_frame() {
        let err = Error::TruncatedFrame {
            expected: 100,
            got: 40,
        };
        assert!(err.is_io_error());
        assert!(err.to_string().contains("40"));
    }
}
