//! Per-face sample buffers.

use sv360_core::{ChromaFormat, Plane, Sample};

use crate::{GeometryError, GeometryResult, PAD_MARGIN};

/// One [`Plane`] per face and component, each with a padding margin of
/// [`PAD_MARGIN`] luma samples (scaled down for subsampled chroma).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceStore {
    format: ChromaFormat,
    width: usize,
    height: usize,
    planes: Vec<Vec<Plane>>,
}

impl FaceStore {
    /// Allocates zeroed buffers for `num_faces` faces of `width x height` luma samples.
    pub fn new(num_faces: usize, width: usize, height: usize, format: ChromaFormat) -> Self {
        let planes = (0..num_faces)
            .map(|_| {
                (0..format.num_components())
                    .map(|c| {
                        let (sx, sy) = (format.scale_x(c), format.scale_y(c));
                        Plane::with_margin(width >> sx, height >> sy, PAD_MARGIN >> sx, PAD_MARGIN >> sy)
                    })
                    .collect()
            })
            .collect();
        Self {
            format,
            width,
            height,
            planes,
        }
    }

    /// Chroma format of the buffers.
    #[inline]
    pub fn format(&self) -> ChromaFormat {
        self.format
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.planes.len()
    }

    /// Number of components.
    #[inline]
    pub fn num_components(&self) -> usize {
        self.format.num_components()
    }

    /// Face size of component `comp`.
    #[inline]
    pub fn face_size(&self, comp: usize) -> (usize, usize) {
        (
            self.width >> self.format.scale_x(comp),
            self.height >> self.format.scale_y(comp),
        )
    }

    /// Buffer of `face`, component `comp`.
    #[inline]
    pub fn plane(&self, face: usize, comp: usize) -> &Plane {
        &self.planes[face][comp]
    }

    /// Mutable buffer of `face`, component `comp`.
    #[inline]
    pub fn plane_mut(&mut self, face: usize, comp: usize) -> &mut Plane {
        &mut self.planes[face][comp]
    }

    /// Buffers of every face for component `comp`.
    pub fn component(&self, comp: usize) -> impl Iterator<Item = &Plane> {
        self.planes.iter().map(move |f| &f[comp])
    }

    /// Fills every buffer, margins included.
    pub fn fill(&mut self, value: Sample) {
        for p in self.planes.iter_mut().flatten() {
            p.fill(value);
        }
    }

    /// Copies the interiors of `src`, which must have the same layout.
    pub fn copy_interiors_from(&mut self, src: &FaceStore) -> GeometryResult<()> {
        if src.num_faces() != self.num_faces() || src.format != self.format {
            return Err(GeometryError::SizeMismatch(format!(
                "{} faces {} vs {} faces {}",
                self.num_faces(),
                self.format,
                src.num_faces(),
                src.format
            )));
        }
        for (dst, src) in self.planes.iter_mut().flatten().zip(src.planes.iter().flatten()) {
            dst.copy_interior_from(src)?;
        }
        Ok(())
    }

    /// Returns `true` if every face interior matches `other`.
    pub fn interiors_eq(&self, other: &FaceStore) -> bool {
        self.num_faces() == other.num_faces()
            && self.format == other.format
            && self
                .planes
                .iter()
                .flatten()
                .zip(other.planes.iter().flatten())
                .all(|(a, b)| a.interior_eq(b))
    }
}
