//! Sample planes with symmetric margins.
//!
//! A [`Plane`] holds `width x height` samples surrounded by `margin_x` columns on
//! the left and right and `margin_y` rows above and below. Coordinates are signed:
//! `(0, 0)` is the first interior sample, `(-margin_x, -margin_y)` the first
//! margin sample.
//!
//! # Memory Layout
//!
//! ```text
//!            margin_x      width        margin_x
//!          +---------+----------------+---------+
//! margin_y |         |                |         |
//!          +---------+----------------+---------+  <- origin row
//!   height |         |  interior      |         |
//!          +---------+----------------+---------+
//! margin_y |         |                |         |
//!          +---------+----------------+---------+
//!          <------------- stride --------------->
//! ```
//!
//! The linear offset of `(x, y)` is `origin + y * stride + x`, which is what the
//! geometry engine stores in its weight-table entries.
//!
//! # Example
//!
//! ```rust
//! use sv360_core::Plane;
//!
//! let mut plane = Plane::with_margin(8, 4, 2, 2);
//! plane.set(-2, -1, 7);
//! assert_eq!(plane.get(-2, -1), 7);
//! assert_eq!(plane.stride(), 12);
//! ```

use crate::{Error, Result, Sample};

/// A 2D sample grid with margins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: usize,
    height: usize,
    margin_x: usize,
    margin_y: usize,
    stride: usize,
    data: Vec<Sample>,
}

impl Plane {
    /// Creates a plane without margins.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_margin(width, height, 0, 0)
    }

    /// Creates a zero-filled plane with the given margins.
    pub fn with_margin(width: usize, height: usize, margin_x: usize, margin_y: usize) -> Self {
        let stride = width + 2 * margin_x;
        let rows = height + 2 * margin_y;
        Self {
            width,
            height,
            margin_x,
            margin_y,
            stride,
            data: vec![0; stride * rows],
        }
    }

    /// Interior width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Interior height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Margin columns on each side.
    #[inline]
    pub fn margin_x(&self) -> usize {
        self.margin_x
    }

    /// Margin rows on each side.
    #[inline]
    pub fn margin_y(&self) -> usize {
        self.margin_y
    }

    /// Samples per row including margins.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Linear offset of interior sample `(0, 0)`.
    #[inline]
    pub fn origin(&self) -> usize {
        self.margin_y * self.stride + self.margin_x
    }

    /// Returns `true` if `(x, y)` lies inside the allocated area (interior or margin).
    #[inline]
    pub fn contains(&self, x: isize, y: isize) -> bool {
        let mx = self.margin_x as isize;
        let my = self.margin_y as isize;
        x >= -mx && x < self.width as isize + mx && y >= -my && y < self.height as isize + my
    }

    /// Linear offset of `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the allocated area.
    #[inline]
    pub fn index(&self, x: isize, y: isize) -> usize {
        assert!(
            self.contains(x, y),
            "({x}, {y}) outside {}x{} plane with margins {}x{}",
            self.width,
            self.height,
            self.margin_x,
            self.margin_y
        );
        (self.origin() as isize + y * self.stride as isize + x) as usize
    }

    /// Sample at `(x, y)`.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> Sample {
        self.data[self.index(x, y)]
    }

    /// Sets the sample at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: isize, y: isize, value: Sample) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Raw storage including margins.
    #[inline]
    pub fn data(&self) -> &[Sample] {
        &self.data
    }

    /// Mutable raw storage including margins.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [Sample] {
        &mut self.data
    }

    /// Interior samples of row `y` (`0 <= y < height`).
    #[inline]
    pub fn row(&self, y: usize) -> &[Sample] {
        let start = self.index(0, y as isize);
        &self.data[start..start + self.width]
    }

    /// Mutable interior samples of row `y`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [Sample] {
        let start = self.index(0, y as isize);
        let width = self.width;
        &mut self.data[start..start + width]
    }

    /// Fills the whole allocation, margins included.
    pub fn fill(&mut self, value: Sample) {
        self.data.fill(value);
    }

    /// Fills a rectangle given in signed plane coordinates.
    ///
    /// The rectangle must lie inside the allocated area.
    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, value: Sample) {
        for row in 0..h as isize {
            let start = self.index(x, y + row);
            self.data[start..start + w].fill(value);
        }
    }

    /// Replicates the outermost interior samples into the margins.
    pub fn extend_edges(&mut self) {
        let (w, h) = (self.width as isize, self.height as isize);
        let (mx, my) = (self.margin_x as isize, self.margin_y as isize);
        for y in 0..h {
            let left = self.get(0, y);
            let right = self.get(w - 1, y);
            for x in 1..=mx {
                self.set(-x, y, left);
                self.set(w - 1 + x, y, right);
            }
        }
        let stride = self.stride;
        let top = self.index(-mx, 0);
        let bottom = self.index(-mx, h - 1);
        for y in 1..=my {
            let dst = self.index(-mx, -y);
            self.data.copy_within(top..top + stride, dst);
            let dst = self.index(-mx, h - 1 + y);
            self.data.copy_within(bottom..bottom + stride, dst);
        }
    }

    /// Copies the interior of `src` into this plane.
    pub fn copy_interior_from(&mut self, src: &Plane) -> Result<()> {
        if src.width != self.width || src.height != self.height {
            return Err(Error::dimension_mismatch(
                (self.width, self.height),
                (src.width, src.height),
            ));
        }
        for y in 0..self.height {
            self.row_mut(y).copy_from_slice(src.row(y));
        }
        Ok(())
    }

    /// Returns `true` if both interiors hold identical samples.
    pub fn interior_eq(&self, other: &Plane) -> bool {
        self.width == other.width
            && self.height == other.height
            && (0..self.height).all(|y| self.row(y) == other.row(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_layout() {
        let plane = Plane::with_margin(10, 6, 3, 2);
        assert_eq!(plane.stride(), 16);
        assert_eq!(plane.origin(), 2 * 16 + 3);
        assert_eq!(plane.data().len(), 16 * 10);
        assert_eq!(plane.index(0, 0), plane.origin());
        assert_eq!(plane.index(-3, -2), 0);
        assert_eq!(plane.index(12, 7), plane.data().len() - 1);
    }

    #[test]
    fn test_plane_contains() {
        let plane = Plane::with_margin(4, 4, 1, 1);
        assert!(plane.contains(-1, -1));
        assert!(plane.contains(4, 4));
        assert!(!plane.contains(5, 0));
        assert!(!plane.contains(0, -2));
    }

    #[test]
    #[should_panic]
    fn test_plane_out_of_bounds_panics() {
        let plane = Plane::with_margin(4, 4, 1, 1);
        plane.get(6, 0);
    }

    #[test]
    fn test_plane_rows() {
        let mut plane = Plane::with_margin(3, 2, 2, 1);
        plane.row_mut(1).copy_from_slice(&[1, 2, 3]);
        assert_eq!(plane.row(1), &[1, 2, 3]);
        assert_eq!(plane.get(2, 1), 3);
        assert_eq!(plane.get(-1, 1), 0);
    }

    #[test]
    fn test_plane_extend_edges() {
        let mut plane = Plane::with_margin(3, 2, 2, 2);
        plane.row_mut(0).copy_from_slice(&[1, 2, 3]);
        plane.row_mut(1).copy_from_slice(&[4, 5, 6]);
        plane.extend_edges();
        assert_eq!(plane.get(-2, 0), 1);
        assert_eq!(plane.get(4, 1), 6);
        assert_eq!(plane.get(-2, -2), 1);
        assert_eq!(plane.get(1, -1), 2);
        assert_eq!(plane.get(4, 3), 6);
        assert_eq!(plane.get(0, 3), 4);
    }

    #[test]
    fn test_plane_fill_rect() {
        let mut plane = Plane::with_margin(4, 4, 1, 1);
        plane.fill_rect(-1, -1, 2, 2, 9);
        assert_eq!(plane.get(-1, -1), 9);
        assert_eq!(plane.get(0, 0), 9);
        assert_eq!(plane.get(1, 0), 0);
    }

    #[test]
    fn test_plane_copy_interior() {
        let mut a = Plane::with_margin(2, 2, 1, 1);
        let mut b = Plane::new(2, 2);
        b.row_mut(0).copy_from_slice(&[1, 2]);
        b.row_mut(1).copy_from_slice(&[3, 4]);
        a.copy_interior_from(&b).unwrap();
        assert!(a.interior_eq(&b));
        assert_eq!(a.get(-1, -1), 0);
        assert!(a.copy_interior_from(&Plane::new(3, 2)).is_err());
    }
}
