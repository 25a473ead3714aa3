//! Geometry conversion (geoConvert).
//!
//! Resamples the face buffers of a source geometry into a destination
//! geometry through the destination's resampling map. The source is padded
//! first so every interpolation window reads sphere content.

use sv360_core::{mid_value, ChannelType};
use sv360_math::RotationDirection;
use tracing::debug;

use crate::mapping::Tap;
use crate::rows::for_each_row;
use crate::{Geometry, GeometryResult};

impl Geometry {
    /// Converts this geometry's faces into `dst`, rotating by `dst`'s rotation.
    ///
    /// Identical geometries (see [`Geometry::is_geo_convert_skipped`]) are
    /// copied bit-exactly.
    ///
    /// # Errors
    ///
    /// [`GeometryError::FormatMismatch`](crate::GeometryError::FormatMismatch)
    /// when the face buffers differ in chroma format or bit depth, and
    /// [`GeometryError::InvalidState`](crate::GeometryError::InvalidState) when
    /// `dst` already holds a map against another source.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sv360_geometry::{Geometry, InterpolationConfig, ProjectionDescriptor, ProjectionKind};
    ///
    /// let interp = InterpolationConfig::default();
    /// let mut erp = Geometry::new(ProjectionDescriptor::new(ProjectionKind::Equirectangular, 64, 32), interp).unwrap();
    /// let mut cmp = Geometry::new(ProjectionDescriptor::new(ProjectionKind::Cubemap, 16, 16), interp).unwrap();
    /// erp.faces_mut().fill(100);
    /// erp.geo_convert(&mut cmp).unwrap();
    /// assert_eq!(cmp.faces().plane(3, 0).get(8, 8), 100);
    /// ```
    pub fn geo_convert(&mut self, dst: &mut Geometry) -> GeometryResult<()> {
        self.convert_into(dst, RotationDirection::Forward)
    }

    /// Converts into `dst` undoing this geometry's own rotation.
    ///
    /// # Errors
    ///
    /// As [`Geometry::geo_convert`].
    pub fn geo_convert_inverse(&mut self, dst: &mut Geometry) -> GeometryResult<()> {
        self.convert_into(dst, RotationDirection::Inverse)
    }

    fn convert_into(&mut self, dst: &mut Geometry, direction: RotationDirection) -> GeometryResult<()> {
        self.check_same_format(dst, "geo_convert")?;
        if self.is_geo_convert_skipped(dst) {
            debug!(kind = %self.desc.kind, "identical geometries, copying faces");
            dst.faces.copy_interiors_from(&self.faces)?;
            dst.padded = false;
            return Ok(());
        }
        self.sphere_padding(false);
        dst.ensure_mapping(self, direction)?;
        resample(self, dst);
        dst.padded = dst.output_padding_needed;
        Ok(())
    }
}

/// Applies `dst`'s map, reading `src`.
fn resample(src: &Geometry, dst: &mut Geometry) {
    let Some(map) = dst.mapping.as_ref() else {
        return;
    };
    let bd = dst.interp.bit_depth;
    let mid = mid_value(bd);
    for comp in 0..dst.faces.num_components() {
        let filter = *src.filter(ChannelType::of(comp));
        for face in 0..dst.faces.num_faces() {
            if Some(face) == dst.virtual_face {
                continue;
            }
            let fm = map.face(comp, face);
            let plane = dst.faces.plane_mut(face, comp);
            let stride = plane.stride();
            for_each_row(plane.data_mut(), stride, |r, row| {
                let taps = &fm.taps()[r * stride..(r + 1) * stride];
                for (v, tap) in row.iter_mut().zip(taps) {
                    match tap {
                        Tap::Skip => {}
                        Tap::MidGray => *v = mid,
                        Tap::Sample(e) => *v = filter.apply(src.faces.plane(e.face as usize, comp), e, bd),
                    }
                }
            });
        }
    }
}
