//! Packed planar pictures.
//!
//! A [`Picture`] is one frame as it exists outside the geometry engine: the
//! frame-packed layout of all faces, one margin-free [`Plane`] per component.

use crate::{mid_value, ChromaFormat, Error, Plane, Result, Sample, MAX_BIT_DEPTH};

/// A planar YUV picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    width: usize,
    height: usize,
    format: ChromaFormat,
    bit_depth: u8,
    planes: Vec<Plane>,
}

impl Picture {
    /// Allocates a zero-filled picture.
    ///
    /// # Errors
    ///
    /// Fails for zero sizes, odd sizes with 4:2:0, or a bit depth outside `1..=16`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sv360_core::{ChromaFormat, Picture};
    ///
    /// let pic = Picture::new(64, 32, ChromaFormat::Yuv420, 8).unwrap();
    /// assert_eq!(pic.plane(1).width(), 32);
    /// assert!(Picture::new(63, 32, ChromaFormat::Yuv420, 8).is_err());
    /// ```
    pub fn new(width: usize, height: usize, format: ChromaFormat, bit_depth: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height, "zero size"));
        }
        if format.is_subsampled() && (width % 2 != 0 || height % 2 != 0) {
            return Err(Error::invalid_dimensions(
                width,
                height,
                "4:2:0 requires even dimensions",
            ));
        }
        if bit_depth == 0 || bit_depth > MAX_BIT_DEPTH {
            return Err(Error::InvalidBitDepth(bit_depth));
        }
        let planes = (0..format.num_components())
            .map(|c| Plane::new(width >> format.scale_x(c), height >> format.scale_y(c)))
            .collect();
        Ok(Self {
            width,
            height,
            format,
            bit_depth,
            planes,
        })
    }

    /// Luma width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Luma height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Chroma format.
    #[inline]
    pub fn format(&self) -> ChromaFormat {
        self.format
    }

    /// Sample bit depth.
    #[inline]
    pub fn bit_depth(&self) -> u8 {
        self.bit_depth
    }

    /// Number of planes.
    #[inline]
    pub fn num_components(&self) -> usize {
        self.planes.len()
    }

    /// Plane of component `comp`.
    #[inline]
    pub fn plane(&self, comp: usize) -> &Plane {
        &self.planes[comp]
    }

    /// Mutable plane of component `comp`.
    #[inline]
    pub fn plane_mut(&mut self, comp: usize) -> &mut Plane {
        &mut self.planes[comp]
    }

    /// All planes.
    #[inline]
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Fills every plane with mid-gray.
    pub fn fill_mid_gray(&mut self) {
        let v = mid_value(self.bit_depth);
        for plane in &mut self.planes {
            plane.fill(v);
        }
    }

    /// Fills every plane with `value`.
    pub fn fill(&mut self, value: Sample) {
        for plane in &mut self.planes {
            plane.fill(value);
        }
    }

    /// Checks that `other` has the same size, format and bit depth.
    pub fn check_compatible(&self, other: &Picture) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::dimension_mismatch(
                (self.width, self.height),
                (other.width, other.height),
            ));
        }
        if self.format != other.format {
            return Err(Error::format_mismatch(
                self.format.to_string(),
                other.format.to_string(),
            ));
        }
        if self.bit_depth != other.bit_depth {
            return Err(Error::format_mismatch(
                format!("{}-bit", self.bit_depth),
                format!("{}-bit", other.bit_depth),
            ));
        }
        Ok(())
    }
}
