//! Projection descriptors and frame-packing layouts.
//!
//! A [`ProjectionDescriptor`] fully describes one geometry instance: the
//! projection kind, face size, the frame-packing layout that places faces in
//! the packed picture, the 3D rotation and variant-specific parameters.
//!
//! # Frame Packing
//!
//! A [`FramePacking`] is a `rows x cols` grid of [`FaceCell`]s. Each cell names
//! a face and the [`FaceTransform`] (rotation in 90 degree steps plus optional
//! horizontal flip) applied when the face is written into the packed picture.
//! Layouts can be written compactly:
//!
//! ```rust
//! use sv360_geometry::FramePacking;
//!
//! let p: FramePacking = "4 0 5 / 3@180 1@270 2".parse().unwrap();
//! assert_eq!((p.rows, p.cols), (2, 3));
//! assert_eq!(p.cell(1, 1).face, Some(1));
//! assert_eq!(p.cell(1, 1).transform.rotation, 270);
//! ```
//!
//! A trailing `f` marks a horizontal flip (`2@90f`), `-` marks an unused cell.
//!
//! # Compact Layouts
//!
//! Octahedron and icosahedron triangles can interlock: in a compact layout
//! each row alternates upright (`0`) and inverted (`180`) triangles, and every
//! cell starts `face_width / 2 + COMPACT_GAP` samples after the previous one,
//! so neighbouring triangles share the rectangle between them.
//!
//! ```text
//!      /\  ________  /\
//!     /  \ \      / /  \
//!    / 0  \ \ 1  / / 2  \
//!   /______\ \  / /______\
//!             \/
//! ```

use crate::{GeometryError, GeometryResult, COMPACT_GAP, MAX_GUARD_BAND};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use sv360_core::ChromaFormat;
use sv360_math::SphereRotation;
use tracing::warn;

/// Projection kind of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Equirectangular (ERP).
    #[serde(alias = "erp")]
    Equirectangular,
    /// Cylindrical equal-area (EAP).
    #[serde(alias = "eap")]
    EqualArea,
    /// Craster parabolic (CPP), used by metrics.
    #[serde(alias = "cpp")]
    CrastersParabolic,
    /// Cubemap (CMP).
    #[serde(alias = "cmp")]
    Cubemap,
    /// Equi-angular cubemap (EAC).
    #[serde(alias = "eac")]
    EquiangularCubemap,
    /// Adjusted cubemap (ACP).
    #[serde(alias = "acp")]
    AdjustedCubemap,
    /// Hybrid equi-angular cubemap (HEC).
    #[serde(alias = "hec")]
    HybridEquiangularCubemap,
    /// Generalized cubemap with per-face warp coefficients (GCMP).
    #[serde(alias = "gcmp")]
    GeneralizedCubemap,
    /// Front hemisphere of a cubemap (HCMP).
    #[serde(alias = "hcmp")]
    HemisphereCubemap,
    /// Front hemisphere of an equi-angular cubemap (HEAC).
    #[serde(alias = "heac")]
    HemisphereEquiangular,
    /// Octahedron (OHP).
    #[serde(alias = "ohp")]
    Octahedron,
    /// Icosahedron (ISP).
    #[serde(alias = "isp")]
    Icosahedron,
    /// Segmented sphere (SSP).
    #[serde(alias = "ssp")]
    SegmentedSphere,
    /// Circular fisheye (equidistant).
    #[serde(alias = "fisheye")]
    FisheyeCircular,
    /// Rectilinear viewport.
    #[serde(alias = "vp")]
    Viewport,
    /// Truncated square pyramid (TSP).
    #[serde(alias = "tsp")]
    TruncatedSquarePyramid,
    /// Rotated sphere (RSP).
    #[serde(alias = "rsp")]
    RotatedSphere,
    /// Equatorial cylindrical (ECP).
    #[serde(alias = "ecp")]
    EquatorialCylindrical,
}

impl ProjectionKind {
    /// Every kind.
    pub const ALL: [ProjectionKind; 18] = [
        Self::Equirectangular,
        Self::EqualArea,
        Self::CrastersParabolic,
        Self::Cubemap,
        Self::EquiangularCubemap,
        Self::AdjustedCubemap,
        Self::HybridEquiangularCubemap,
        Self::GeneralizedCubemap,
        Self::HemisphereCubemap,
        Self::HemisphereEquiangular,
        Self::Octahedron,
        Self::Icosahedron,
        Self::SegmentedSphere,
        Self::FisheyeCircular,
        Self::Viewport,
        Self::TruncatedSquarePyramid,
        Self::RotatedSphere,
        Self::EquatorialCylindrical,
    ];

    /// Short name, e.g. `"erp"`.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Equirectangular => "erp",
            Self::EqualArea => "eap",
            Self::CrastersParabolic => "cpp",
            Self::Cubemap => "cmp",
            Self::EquiangularCubemap => "eac",
            Self::AdjustedCubemap => "acp",
            Self::HybridEquiangularCubemap => "hec",
            Self::GeneralizedCubemap => "gcmp",
            Self::HemisphereCubemap => "hcmp",
            Self::HemisphereEquiangular => "heac",
            Self::Octahedron => "ohp",
            Self::Icosahedron => "isp",
            Self::SegmentedSphere => "ssp",
            Self::FisheyeCircular => "fisheye",
            Self::Viewport => "vp",
            Self::TruncatedSquarePyramid => "tsp",
            Self::RotatedSphere => "rsp",
            Self::EquatorialCylindrical => "ecp",
        }
    }

    /// Number of faces of the projection.
    pub fn num_faces(self) -> usize {
        match self {
            Self::Cubemap
            | Self::EquiangularCubemap
            | Self::AdjustedCubemap
            | Self::HybridEquiangularCubemap
            | Self::GeneralizedCubemap
            | Self::SegmentedSphere
            | Self::EquatorialCylindrical => 6,
            Self::HemisphereCubemap | Self::HemisphereEquiangular => 5,
            Self::Octahedron => 8,
            Self::Icosahedron => 20,
            Self::TruncatedSquarePyramid | Self::RotatedSphere => 2,
            Self::Equirectangular
            | Self::EqualArea
            | Self::CrastersParabolic
            | Self::FisheyeCircular
            | Self::Viewport => 1,
        }
    }

    /// Returns `true` for the six-face cube variants.
    pub fn is_cube_family(self) -> bool {
        matches!(
            self,
            Self::Cubemap
                | Self::EquiangularCubemap
                | Self::AdjustedCubemap
                | Self::HybridEquiangularCubemap
                | Self::GeneralizedCubemap
        )
    }

    /// Returns `true` for projections covering only the front hemisphere.
    pub fn is_hemisphere(self) -> bool {
        matches!(self, Self::HemisphereCubemap | Self::HemisphereEquiangular)
    }

    /// Returns `true` if a compact packing exists for this kind.
    pub fn has_compact_layout(self) -> bool {
        matches!(self, Self::Octahedron | Self::Icosahedron)
    }

    /// Returns `true` if faces must be square.
    pub fn needs_square_faces(self) -> bool {
        self.is_cube_family()
            || self.is_hemisphere()
            || matches!(self, Self::SegmentedSphere | Self::TruncatedSquarePyramid)
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ProjectionKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> GeometryResult<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.short_name() == lower || format!("{k:?}").to_ascii_lowercase() == lower)
            .ok_or_else(|| GeometryError::InvalidDescriptor(format!("unknown projection kind '{s}'")))
    }
}

/// Orientation of a face inside its packed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceTransform {
    /// Counter-clockwise rotation: 0, 90, 180 or 270.
    #[serde(rename = "rot")]
    pub rotation: u16,
    /// Horizontal flip applied before the rotation.
    #[serde(rename = "flip")]
    pub hflip: bool,
}

impl FaceTransform {
    /// No rotation, no flip.
    pub const IDENTITY: Self = Self {
        rotation: 0,
        hflip: false,
    };

    /// Creates a transform, rejecting rotations that are not a multiple of 90.
    pub fn new(rotation: u16, hflip: bool) -> GeometryResult<Self> {
        let t = Self { rotation, hflip };
        t.validate()?;
        Ok(t)
    }

    /// Rotation without flip.
    pub fn rotated(rotation: u16) -> Self {
        Self {
            rotation,
            hflip: false,
        }
    }

    fn validate(&self) -> GeometryResult<()> {
        if matches!(self.rotation, 0 | 90 | 180 | 270) {
            Ok(())
        } else {
            Err(GeometryError::InvalidLayout(format!(
                "face rotation {} is not one of 0, 90, 180, 270",
                self.rotation
            )))
        }
    }

    /// Returns `true` when width and height trade places in the packed cell.
    #[inline]
    pub fn swaps_axes(&self) -> bool {
        self.rotation == 90 || self.rotation == 270
    }

    /// Position of face sample `(u, v)` inside a cell holding a `w x h` face.
    ///
    /// `w` and `h` are the face dimensions, not the cell's.
    #[inline]
    pub fn face_to_cell(&self, u: usize, v: usize, w: usize, h: usize) -> (usize, usize) {
        match (self.hflip, self.rotation) {
            (false, 90) => (v, w - 1 - u),
            (false, 180) => (w - 1 - u, h - 1 - v),
            (false, 270) => (h - 1 - v, u),
            (true, 0) => (w - 1 - u, v),
            (true, 90) => (v, u),
            (true, 180) => (u, h - 1 - v),
            (true, 270) => (h - 1 - v, w - 1 - u),
            _ => (u, v),
        }
    }

    /// Face sample of cell position `(a, b)`, the inverse of
    /// [`FaceTransform::face_to_cell`].
    #[inline]
    pub fn cell_to_face(&self, a: usize, b: usize, w: usize, h: usize) -> (usize, usize) {
        match (self.hflip, self.rotation) {
            (false, 90) => (w - 1 - b, a),
            (false, 270) => (b, h - 1 - a),
            (true, 90) => (b, a),
            (true, 270) => (w - 1 - b, h - 1 - a),
            _ => self.face_to_cell(a, b, w, h),
        }
    }

    /// Cell dimensions for a `w x h` face.
    #[inline]
    pub fn cell_size(&self, w: usize, h: usize) -> (usize, usize) {
        if self.swaps_axes() { (h, w) } else { (w, h) }
    }

    /// Chroma sample phase `(x, y)` after the face is rotated back from the cell.
    pub fn chroma_phase(&self, phase: (f64, f64)) -> (f64, f64) {
        let (x, y) = phase;
        match (self.hflip, self.rotation) {
            (false, 90) => (1.0 - y, x),
            (false, 180) => (1.0 - x, 1.0 - y),
            (false, 270) => (y, 1.0 - x),
            (true, 0) => (1.0 - x, y),
            (true, 90) => (y, x),
            (true, 180) => (x, 1.0 - y),
            (true, 270) => (1.0 - y, 1.0 - x),
            _ => (x, y),
        }
    }
}

impl fmt::Display for FaceTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rotation, if self.hflip { "f" } else { "" })
    }
}

/// One cell of a frame-packing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FaceCell {
    /// Face placed in this cell, `None` for an unused cell.
    #[serde(default)]
    pub face: Option<usize>,
    /// Orientation of the face inside the cell.
    #[serde(flatten)]
    pub transform: FaceTransform,
}

impl FaceCell {
    /// Cell holding `face` with the given rotation.
    pub fn new(face: usize, rotation: u16) -> Self {
        Self {
            face: Some(face),
            transform: FaceTransform::rotated(rotation),
        }
    }

    /// Cell without a face.
    pub fn unused() -> Self {
        Self::default()
    }
}

/// Grid layout of faces in a packed picture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramePacking {
    /// Number of cell rows.
    pub rows: usize,
    /// Number of cell columns.
    pub cols: usize,
    /// Cells in row-major order.
    pub cells: Vec<FaceCell>,
}

impl FramePacking {
    /// Creates a layout, checking the cell count.
    pub fn new(rows: usize, cols: usize, cells: Vec<FaceCell>) -> GeometryResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(GeometryError::InvalidLayout("empty grid".into()));
        }
        if cells.len() != rows * cols {
            return Err(GeometryError::InvalidLayout(format!(
                "{rows}x{cols} grid needs {} cells, got {}",
                rows * cols,
                cells.len()
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    /// `1 x 1` layout holding face 0.
    pub fn single() -> Self {
        Self {
            rows: 1,
            cols: 1,
            cells: vec![FaceCell::new(0, 0)],
        }
    }

    /// Default layout of a projection kind.
    ///
    /// | kind | grid | cells |
    /// |------|------|-------|
    /// | single face | 1x1 | `0` |
    /// | cube family | 3x2 | `4 0 5 / 3@180 1@270 2` |
    /// | hemisphere cube | 5x1 | `0 1 2 3 4` |
    /// | octahedron | 4x2 | `4 0 6 2 / 5@180 1@180 7@180 3@180` |
    /// | icosahedron | 5x4 | upper cap, upper band, lower band, lower cap |
    /// | segmented sphere | 6x1 | `0 1 2 3 4 5` |
    /// | truncated pyramid | 2x1 | `0 1` |
    /// | rotated sphere | 1x2 | `0 / 1` |
    /// | equatorial cylindrical | 3x2 | `0 1 2 / 3 4 5` |
    pub fn default_for(kind: ProjectionKind) -> Self {
        let row = |ids: &[(usize, u16)]| ids.iter().map(|&(f, r)| FaceCell::new(f, r)).collect::<Vec<_>>();
        match kind {
            k if k.is_cube_family() => Self {
                rows: 2,
                cols: 3,
                cells: [
                    row(&[(4, 0), (0, 0), (5, 0)]),
                    row(&[(3, 180), (1, 270), (2, 0)]),
                ]
                .concat(),
            },
            ProjectionKind::HemisphereCubemap | ProjectionKind::HemisphereEquiangular => Self {
                rows: 1,
                cols: 5,
                cells: (0..5).map(|f| FaceCell::new(f, 0)).collect(),
            },
            ProjectionKind::Octahedron => Self {
                rows: 2,
                cols: 4,
                cells: [
                    row(&[(4, 0), (0, 0), (6, 0), (2, 0)]),
                    row(&[(5, 180), (1, 180), (7, 180), (3, 180)]),
                ]
                .concat(),
            },
            ProjectionKind::Icosahedron => {
                let cells = (0..4)
                    .flat_map(|r| {
                        (0..5).map(move |c| match r {
                            0 => FaceCell::new(2 * c, 0),
                            1 => FaceCell::new(2 * c + 1, 180),
                            2 => FaceCell::new(10 + 2 * c + 1, 0),
                            _ => FaceCell::new(10 + 2 * c, 180),
                        })
                    })
                    .collect();
                Self {
                    rows: 4,
                    cols: 5,
                    cells,
                }
            }
            ProjectionKind::SegmentedSphere => Self {
                rows: 1,
                cols: 6,
                cells: (0..6).map(|f| FaceCell::new(f, 0)).collect(),
            },
            ProjectionKind::TruncatedSquarePyramid => Self {
                rows: 1,
                cols: 2,
                cells: row(&[(0, 0), (1, 0)]),
            },
            ProjectionKind::RotatedSphere => Self {
                rows: 2,
                cols: 1,
                cells: row(&[(0, 0), (1, 0)]),
            },
            ProjectionKind::EquatorialCylindrical => Self {
                rows: 2,
                cols: 3,
                cells: (0..6).map(|f| FaceCell::new(f, 0)).collect(),
            },
            _ => Self::single(),
        }
    }

    /// Default compact layout, falling back to [`FramePacking::default_for`]
    /// for kinds without one.
    ///
    /// | kind | grid | cells |
    /// |------|------|-------|
    /// | octahedron | 4x2 | `0 1@180 2 3@180 / 4 5@180 6 7@180` |
    /// | icosahedron | 10x2 | `0 1@180 .. 8 9@180 / 11 10@180 .. 19 18@180` |
    pub fn compact_for(kind: ProjectionKind) -> Self {
        // upright even faces interlock with the inverted odd faces
        let pairs = |rows: usize, cols: usize, first: fn(usize, usize) -> (usize, usize)| {
            let cells = (0..rows)
                .flat_map(move |r| {
                    (0..cols / 2).flat_map(move |p| {
                        let (up, down) = first(r, p);
                        [FaceCell::new(up, 0), FaceCell::new(down, 180)]
                    })
                })
                .collect();
            Self { rows, cols, cells }
        };
        match kind {
            ProjectionKind::Octahedron => pairs(2, 4, |r, p| (4 * r + 2 * p, 4 * r + 2 * p + 1)),
            ProjectionKind::Icosahedron => pairs(2, 10, |r, p| match r {
                0 => (2 * p, 2 * p + 1),
                _ => (10 + 2 * p + 1, 10 + 2 * p),
            }),
            _ => Self::default_for(kind),
        }
    }

    /// Cell at `(row, col)`.
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &FaceCell {
        &self.cells[row * self.cols + col]
    }

    /// Grid position of `face`, if it is placed.
    pub fn locate(&self, face: usize) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|c| c.face == Some(face))
            .map(|i| (i / self.cols, i % self.cols))
    }

    /// Faces present in the layout.
    pub fn faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().filter_map(|c| c.face)
    }
}

impl FromStr for FramePacking {
    type Err = GeometryError;

    fn from_str(s: &str) -> GeometryResult<Self> {
        let mut rows = Vec::new();
        for line in s.split('/') {
            let mut row = Vec::new();
            for tok in line.split_whitespace() {
                row.push(parse_cell(tok)?);
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(GeometryError::InvalidLayout(format!("ragged layout '{s}'")));
        }
        Self::new(rows.len(), cols, rows.concat())
    }
}

fn parse_cell(tok: &str) -> GeometryResult<FaceCell> {
    let bad = || GeometryError::InvalidLayout(format!("bad cell '{tok}'"));
    if tok == "-" || tok == "x" {
        return Ok(FaceCell::unused());
    }
    let (id, rest) = tok.split_once('@').unwrap_or((tok, "0"));
    let (rot, hflip) = match rest.strip_suffix('f') {
        Some(r) => (r, true),
        None => (rest, false),
    };
    let face = id.parse().map_err(|_| bad())?;
    let rotation = rot.parse().map_err(|_| bad())?;
    Ok(FaceCell {
        face: Some(face),
        transform: FaceTransform::new(rotation, hflip)?,
    })
}

impl fmt::Display for FramePacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r > 0 {
                f.write_str(" / ")?;
            }
            for c in 0..self.cols {
                if c > 0 {
                    f.write_str(" ")?;
                }
                let cell = self.cell(r, c);
                match cell.face {
                    None => f.write_str("-")?,
                    Some(id) if cell.transform == FaceTransform::IDENTITY => write!(f, "{id}")?,
                    Some(id) => write!(f, "{id}@{}", cell.transform)?,
                }
            }
        }
        Ok(())
    }
}

/// Warp coefficients of one generalized-cubemap face.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GcmpFaceWarp {
    /// Horizontal coefficient (`> -0.5`, 0 is a plain cubemap).
    pub coeff_u: f64,
    /// Vertical coefficient.
    pub coeff_v: f64,
    /// The horizontal warp depends on the vertical position.
    pub u_affected_by_v: bool,
    /// The vertical warp depends on the horizontal position.
    pub v_affected_by_u: bool,
}

/// Generalized-cubemap parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GcmpParams {
    /// Per-face warps. Empty means a plain cubemap; otherwise one entry per face.
    pub faces: Vec<GcmpFaceWarp>,
}

/// Circular fisheye parameters. Unset values default to the face centre and
/// the inscribed circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FisheyeParams {
    /// Field of view in degrees.
    pub fov: f64,
    /// Circle centre, luma samples.
    pub center_x: Option<f64>,
    /// Circle centre, luma samples.
    pub center_y: Option<f64>,
    /// Circle radius, luma samples.
    pub radius: Option<f64>,
}

impl Default for FisheyeParams {
    fn default() -> Self {
        Self {
            fov: 180.0,
            center_x: None,
            center_y: None,
            radius: None,
        }
    }
}

/// Viewport parameters, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportParams {
    /// Horizontal field of view.
    pub hfov: f64,
    /// Vertical field of view.
    pub vfov: f64,
    /// Viewing direction, yaw.
    pub yaw: f64,
    /// Viewing direction, pitch.
    pub pitch: f64,
}

impl Default for ViewportParams {
    fn default() -> Self {
        Self {
            hfov: 90.0,
            vfov: 90.0,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

/// Projection-specific parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantParams {
    /// Generalized cubemap.
    pub gcmp: GcmpParams,
    /// Circular fisheye.
    pub fisheye: FisheyeParams,
    /// Viewport.
    pub viewport: ViewportParams,
}

/// How the guard band around a packed face is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardBandFill {
    /// Resampled from the sphere through the padded face margins.
    #[default]
    Geometry,
    /// The nearest face edge sample, repeated outward.
    Repetitive,
    /// The nearest sample of whichever face covers the direction, copied
    /// without interpolation.
    #[serde(alias = "copy")]
    Neighbour,
}

impl fmt::Display for GuardBandFill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Geometry => "geometry",
            Self::Repetitive => "repetitive",
            Self::Neighbour => "neighbour",
        })
    }
}

impl FromStr for GuardBandFill {
    type Err = GeometryError;

    fn from_str(s: &str) -> GeometryResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geometry" | "3" => Ok(Self::Geometry),
            "repetitive" | "1" => Ok(Self::Repetitive),
            "neighbour" | "copy" | "2" => Ok(Self::Neighbour),
            _ => Err(GeometryError::InvalidDescriptor(format!("unknown guard band fill '{s}'"))),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Immutable description of one geometry instance.
///
/// # Example
///
/// ```rust
/// use sv360_geometry::{ProjectionDescriptor, ProjectionKind};
///
/// let mut d = ProjectionDescriptor::new(ProjectionKind::Cubemap, 256, 256);
/// d.normalize().unwrap();
/// assert_eq!(d.packed_size(), (768, 512));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDescriptor {
    /// Projection kind.
    pub kind: ProjectionKind,
    /// Face width in luma samples.
    pub face_width: usize,
    /// Face height in luma samples.
    pub face_height: usize,
    /// Frame-packing layout; the kind's default when absent.
    #[serde(default)]
    pub packing: Option<FramePacking>,
    /// Compact packing (octahedron / icosahedron only).
    #[serde(default)]
    pub compact: bool,
    /// 3D rotation applied when this geometry is a conversion target.
    #[serde(default)]
    pub rotation: SphereRotation,
    /// Guard band around each packed face, luma samples.
    #[serde(default)]
    pub guard_band: usize,
    /// How guard bands are filled.
    #[serde(default)]
    pub guard_band_fill: GuardBandFill,
    /// Keep guard bands along the picture border. When unset the packed
    /// picture is cropped by `guard_band` on every side.
    #[serde(default = "default_true")]
    pub guard_band_exterior: bool,
    /// Chroma format of the packed picture.
    #[serde(default)]
    pub packed_chroma_format: ChromaFormat,
    /// Variant-specific parameters.
    #[serde(default)]
    pub params: VariantParams,
}

impl ProjectionDescriptor {
    /// Descriptor with default layout, no rotation and 4:2:0 packing.
    pub fn new(kind: ProjectionKind, face_width: usize, face_height: usize) -> Self {
        Self {
            kind,
            face_width,
            face_height,
            packing: None,
            compact: false,
            rotation: SphereRotation::IDENTITY,
            guard_band: 0,
            guard_band_fill: GuardBandFill::Geometry,
            guard_band_exterior: true,
            packed_chroma_format: ChromaFormat::Yuv420,
            params: VariantParams::default(),
        }
    }

    /// Sets the frame-packing layout.
    pub fn with_packing(mut self, packing: FramePacking) -> Self {
        self.packing = Some(packing);
        self
    }

    /// Sets the 3D rotation.
    pub fn with_rotation(mut self, rotation: SphereRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the packed chroma format.
    pub fn with_packed_format(mut self, format: ChromaFormat) -> Self {
        self.packed_chroma_format = format;
        self
    }

    /// Sets the guard band.
    pub fn with_guard_band(mut self, guard_band: usize) -> Self {
        self.guard_band = guard_band;
        self
    }

    /// Sets how guard bands are filled and whether they line the picture border.
    pub fn with_guard_band_fill(mut self, fill: GuardBandFill, exterior: bool) -> Self {
        self.guard_band_fill = fill;
        self.guard_band_exterior = exterior;
        self
    }

    /// Uses the compact triangle layout.
    pub fn with_compact(mut self) -> Self {
        self.compact = true;
        self
    }

    /// Sets the variant parameters.
    pub fn with_params(mut self, params: VariantParams) -> Self {
        self.params = params;
        self
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.kind.num_faces()
    }

    /// Resolved frame-packing layout.
    pub fn packing(&self) -> FramePacking {
        self.packing.clone().unwrap_or_else(|| {
            if self.compact {
                FramePacking::compact_for(self.kind)
            } else {
                FramePacking::default_for(self.kind)
            }
        })
    }

    /// Size of one packed cell including guard bands.
    pub fn cell_size(&self) -> (usize, usize) {
        (
            self.face_width + 2 * self.guard_band,
            self.face_height + 2 * self.guard_band,
        )
    }

    /// Guard band cropped from each side of the packed picture.
    #[inline]
    fn border_trim(&self) -> usize {
        if self.guard_band_exterior { 0 } else { self.guard_band }
    }

    /// Horizontal distance between neighbouring cells of a compact layout.
    #[inline]
    fn compact_step(&self) -> usize {
        self.face_width / 2 + COMPACT_GAP
    }

    /// Top-left corner of cell `(row, col)` in the packed picture, luma
    /// samples. Negative when the guard band is cropped at the border.
    pub fn cell_origin(&self, row: usize, col: usize) -> (isize, isize) {
        if self.compact {
            return ((col * self.compact_step()) as isize, (row * self.face_height) as isize);
        }
        let (cw, ch) = self.cell_size();
        let trim = self.border_trim() as isize;
        ((col * cw) as isize - trim, (row * ch) as isize - trim)
    }

    /// Size of the packed picture.
    pub fn packed_size(&self) -> (usize, usize) {
        let p = self.packing();
        if self.compact {
            let w = p.cols * self.compact_step() + self.face_width / 2 - COMPACT_GAP;
            return (w, p.rows * self.face_height);
        }
        let (cw, ch) = self.cell_size();
        let trim = 2 * self.border_trim();
        (p.cols * cw - trim, p.rows * ch - trim)
    }

    /// Face size that makes the packed picture `width x height`.
    pub fn infer_face_size(&mut self, width: usize, height: usize) -> GeometryResult<()> {
        let p = self.packing();
        if self.compact {
            let gaps = (p.cols - 1) * COMPACT_GAP;
            let halves = 2 * width.saturating_sub(gaps);
            if width <= gaps || halves % (p.cols + 1) != 0 || height % p.rows != 0 {
                return Err(GeometryError::InvalidDescriptor(format!(
                    "{width}x{height} picture does not fit a compact {}x{} layout",
                    p.cols, p.rows
                )));
            }
            self.face_width = halves / (p.cols + 1);
            self.face_height = height / p.rows;
            return Ok(());
        }
        let trim = 2 * self.border_trim();
        let (full_w, full_h) = (width + trim, height + trim);
        if full_w % p.cols != 0 || full_h % p.rows != 0 {
            return Err(GeometryError::InvalidDescriptor(format!(
                "{width}x{height} picture is not divisible into a {}x{} grid",
                p.cols, p.rows
            )));
        }
        let g2 = 2 * self.guard_band;
        let (cw, ch) = (full_w / p.cols, full_h / p.rows);
        if cw <= g2 || ch <= g2 {
            return Err(GeometryError::InvalidDescriptor(format!(
                "cell {cw}x{ch} is too small for guard band {}",
                self.guard_band
            )));
        }
        self.face_width = cw - g2;
        self.face_height = ch - g2;
        Ok(())
    }

    /// Face of a generalized cubemap missing from a five-cell layout.
    pub fn virtual_face(&self) -> Option<usize> {
        if self.kind != ProjectionKind::GeneralizedCubemap {
            return None;
        }
        let p = self.packing();
        if p.rows * p.cols != 5 {
            return None;
        }
        let sum: usize = p.faces().sum();
        15usize.checked_sub(sum).filter(|&f| f < 6)
    }

    /// Applies the documented corrections and validates the descriptor.
    ///
    /// Corrections (each logged with `warn!`):
    /// - compact layout on a kind without one: disabled
    /// - odd guard band with 4:2:0 packing: rounded up
    /// - guard band above [`MAX_GUARD_BAND`]: clamped
    ///
    /// # Errors
    ///
    /// Guard bands on compact layouts, zero or non-square faces where squares
    /// are required, and invalid layouts.
    pub fn normalize(&mut self) -> GeometryResult<()> {
        if self.compact && !self.kind.has_compact_layout() {
            warn!(kind = %self.kind, "compact layout only exists for octahedron and icosahedron, disabled");
            self.compact = false;
        }
        if self.guard_band > MAX_GUARD_BAND {
            warn!(guard_band = self.guard_band, max = MAX_GUARD_BAND, "guard band too large, clamped");
            self.guard_band = MAX_GUARD_BAND;
        }
        if self.packed_chroma_format.is_subsampled() && self.guard_band % 2 != 0 {
            warn!(guard_band = self.guard_band, "guard band must be even with 4:2:0, rounded up");
            self.guard_band += 1;
        }
        if self.face_width == 0 || self.face_height == 0 {
            return Err(GeometryError::InvalidDescriptor(format!(
                "face size {}x{}",
                self.face_width, self.face_height
            )));
        }
        if self.kind.needs_square_faces() && self.face_width != self.face_height {
            return Err(GeometryError::InvalidDescriptor(format!(
                "{} faces must be square, got {}x{}",
                self.kind, self.face_width, self.face_height
            )));
        }
        if self.compact && self.guard_band > 0 {
            return Err(GeometryError::Unsupported(format!(
                "guard band with compact {} layout",
                self.kind
            )));
        }
        if self.packing.is_none() {
            self.packing = Some(self.packing());
        }
        self.validate_packing()?;
        if self.compact {
            self.validate_compact()?;
        }
        self.validate_params()
    }

    fn validate_compact(&self) -> GeometryResult<()> {
        let quantum = if self.packed_chroma_format.is_subsampled() { 4 } else { 2 };
        if self.face_width % quantum != 0 {
            return Err(GeometryError::InvalidDescriptor(format!(
                "compact layout needs a face width divisible by {quantum}, got {}",
                self.face_width
            )));
        }
        let p = self.packing();
        for r in 0..p.rows {
            let mut prev = None;
            for c in 0..p.cols {
                let cell = p.cell(r, c);
                let inverted = match (cell.face, cell.transform.rotation) {
                    (Some(_), 0) => false,
                    (Some(_), 180) => true,
                    _ => {
                        return Err(GeometryError::InvalidLayout(format!(
                            "compact cell ({r}, {c}) must hold a face rotated by 0 or 180"
                        )));
                    }
                };
                if prev == Some(inverted) {
                    return Err(GeometryError::InvalidLayout(format!(
                        "compact row {r}: cells {} and {c} do not alternate orientation",
                        c - 1
                    )));
                }
                prev = Some(inverted);
            }
        }
        Ok(())
    }

    fn validate_packing(&self) -> GeometryResult<()> {
        let p = self.packing();
        let n = self.num_faces();
        let virtual_face = self.virtual_face();
        if p.cells.len() != p.rows * p.cols {
            return Err(GeometryError::InvalidLayout("cell count does not match grid".into()));
        }
        let placed = n - usize::from(virtual_face.is_some());
        if p.rows * p.cols < placed {
            return Err(GeometryError::InvalidLayout(format!(
                "{}x{} grid cannot hold {placed} faces",
                p.rows, p.cols
            )));
        }
        let mut seen = vec![false; n];
        for cell in &p.cells {
            cell.transform.validate()?;
            let Some(face) = cell.face else { continue };
            if face >= n {
                return Err(GeometryError::InvalidLayout(format!(
                    "face id {face} out of range for {} faces",
                    n
                )));
            }
            if std::mem::replace(&mut seen[face], true) {
                return Err(GeometryError::InvalidLayout(format!("face id {face} placed twice")));
            }
            if cell.transform.swaps_axes() && self.face_width != self.face_height {
                return Err(GeometryError::InvalidLayout(format!(
                    "face {face} rotated by {} needs a square face",
                    cell.transform.rotation
                )));
            }
        }
        if let Some(missing) = (0..n).find(|&f| !seen[f] && Some(f) != virtual_face) {
            return Err(GeometryError::InvalidLayout(format!("face {missing} not placed")));
        }
        Ok(())
    }

    fn validate_params(&self) -> GeometryResult<()> {
        if self.kind == ProjectionKind::GeneralizedCubemap {
            let faces = &self.params.gcmp.faces;
            if !faces.is_empty() && faces.len() != 6 {
                return Err(GeometryError::InvalidDescriptor(format!(
                    "generalized cubemap needs 6 face warps, got {}",
                    faces.len()
                )));
            }
            for (i, w) in faces.iter().enumerate() {
                if w.coeff_u <= -0.5 || w.coeff_v <= -0.5 {
                    return Err(GeometryError::InvalidDescriptor(format!(
                        "face {i}: warp coefficients must be > -0.5"
                    )));
                }
                if w.u_affected_by_v && w.v_affected_by_u {
                    return Err(GeometryError::Unsupported(format!(
                        "face {i}: both warp axes depend on each other"
                    )));
                }
            }
        }
        if self.kind == ProjectionKind::FisheyeCircular {
            let f = &self.params.fisheye;
            if !(f.fov > 0.0 && f.fov <= 360.0) || f.radius.is_some_and(|r| r <= 0.0) {
                return Err(GeometryError::InvalidDescriptor(format!(
                    "fisheye fov {} / radius {:?}",
                    f.fov, f.radius
                )));
            }
        }
        if self.kind == ProjectionKind::Viewport {
            let v = &self.params.viewport;
            if !(v.hfov > 0.0 && v.hfov < 180.0 && v.vfov > 0.0 && v.vfov < 180.0) {
                return Err(GeometryError::InvalidDescriptor(format!(
                    "viewport fov {}x{} must be in (0, 180)",
                    v.hfov, v.vfov
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
    fn test_kind_parse() {
        assert_eq!("erp".parse::<ProjectionKind>().unwrap(), ProjectionKind::Equirectangular);
        assert_eq!("Octahedron".parse::<ProjectionKind>().unwrap(), ProjectionKind::Octahedron);
        assert!("xyz".parse::<ProjectionKind>().is_err());
        for k in ProjectionKind::ALL {
            assert_eq!(k.short_name().parse::<ProjectionKind>().unwrap(), k);
        }
    }

    #[test]
    fn test_kind_serde_alias() {
        let k: ProjectionKind = serde_yaml::from_str("cmp").unwrap();
        assert_eq!(k, ProjectionKind::Cubemap);
        let k: ProjectionKind = serde_yaml::from_str("segmented_sphere").unwrap();
        assert_eq!(k, ProjectionKind::SegmentedSphere);
    }

    #[test]
    fn test_face_to_cell_all_orientations() {
        let (w, h) = (4, 4);
        for rotation in [0, 90, 180, 270] {
            for hflip in [false, true] {
                let t = FaceTransform { rotation, hflip };
                let mut hit = vec![false; w * h];
                for v in 0..h {
                    for u in 0..w {
                        let (x, y) = t.face_to_cell(u, v, w, h);
                        assert!(!std::mem::replace(&mut hit[y * w + x], true));
                    }
                }
                assert!(hit.iter().all(|&b| b));
            }
        }
    }

    #[test]
    fn test_cell_to_face_inverts() {
        let (w, h) = (6, 6);
        for rotation in [0, 90, 180, 270] {
            for hflip in [false, true] {
                let t = FaceTransform { rotation, hflip };
                for v in 0..h {
                    for u in 0..w {
                        let (a, b) = t.face_to_cell(u, v, w, h);
                        assert_eq!(t.cell_to_face(a, b, w, h), (u, v), "{t}");
                    }
                }
            }
        }
        let t = FaceTransform::rotated(180);
        assert_eq!(t.cell_to_face(5, 2, 6, 3), (0, 0));
    }

    #[test]
    fn test_face_to_cell_rectangular() {
        let t = FaceTransform::rotated(180);
        assert_eq!(t.face_to_cell(0, 0, 6, 3), (5, 2));
        let t = FaceTransform::rotated(90);
        assert_eq!(t.face_to_cell(0, 0, 4, 4), (0, 3));
        assert_eq!(t.cell_size(6, 3), (3, 6));
    }

    #[test]
    fn test_chroma_phase() {
        let p = (0.0, 0.5);
        assert_eq!(FaceTransform::IDENTITY.chroma_phase(p), (0.0, 0.5));
        assert_eq!(FaceTransform::rotated(90).chroma_phase(p), (0.5, 0.0));
        assert_eq!(FaceTransform::rotated(180).chroma_phase(p), (1.0, 0.5));
        assert_eq!(FaceTransform::rotated(270).chroma_phase(p), (0.5, 1.0));
        let flip = FaceTransform { rotation: 270, hflip: true };
        assert_eq!(flip.chroma_phase(p), (0.5, 1.0));
    }

    #[test]
    fn test_packing_parse_roundtrip() {
        let p: FramePacking = "4 0 5 / 3@180 1@270 2@90f".parse().unwrap();
        assert_eq!(p.cell(1, 2).transform, FaceTransform { rotation: 90, hflip: true });
        assert_eq!(p.to_string(), "4 0 5 / 3@180 1@270 2@90f");
        assert_eq!(p.locate(3), Some((1, 0)));
        assert!("0 1 / 2".parse::<FramePacking>().is_err());
        assert!("0@45".parse::<FramePacking>().is_err());
        let p: FramePacking = "0 - 1".parse().unwrap();
        assert_eq!(p.cell(0, 1).face, None);
    }

    #[test]
    fn test_default_packings_valid() {
        for kind in ProjectionKind::ALL {
            let mut d = ProjectionDescriptor::new(kind, 32, 32);
            d.normalize().unwrap();
            let p = d.packing();
            assert!(p.rows * p.cols >= kind.num_faces(), "{kind}");
        }
    }

    #[test]
    fn test_icosahedron_default() {
        let p = FramePacking::default_for(ProjectionKind::Icosahedron);
        assert_eq!((p.rows, p.cols), (4, 5));
        assert_eq!(p.cell(0, 1).face, Some(2));
        assert_eq!(p.cell(1, 0).face, Some(1));
        assert_eq!(p.cell(2, 0).face, Some(11));
        assert_eq!(p.cell(3, 4).face, Some(18));
        assert_eq!(p.cell(3, 4).transform.rotation, 180);
    }

    #[test]
    fn test_normalize_errors() {
        let mut d = ProjectionDescriptor::new(ProjectionKind::Cubemap, 32, 16);
        assert!(matches!(d.normalize(), Err(GeometryError::InvalidDescriptor(_))));

        let mut d = ProjectionDescriptor::new(ProjectionKind::TruncatedSquarePyramid, 32, 16);
        assert!(matches!(d.normalize(), Err(GeometryError::InvalidDescriptor(_))));

        let mut d = ProjectionDescriptor::new(ProjectionKind::Octahedron, 32, 32)
            .with_compact()
            .with_guard_band(2);
        assert!(matches!(d.normalize(), Err(GeometryError::Unsupported(_))));

        let mut d = ProjectionDescriptor::new(ProjectionKind::Cubemap, 32, 32)
            .with_packing("0 1 2 / 3 4 4".parse().unwrap());
        assert!(matches!(d.normalize(), Err(GeometryError::InvalidLayout(_))));

        let mut d = ProjectionDescriptor::new(ProjectionKind::Equirectangular, 64, 32)
            .with_packing("0@90".parse().unwrap());
        assert!(matches!(d.normalize(), Err(GeometryError::InvalidLayout(_))));
    }

    #[test]
    fn test_normalize_corrections() {
        let mut d = ProjectionDescriptor::new(ProjectionKind::Equirectangular, 64, 32);
        d.compact = true;
        d.guard_band = 3;
        d.normalize().unwrap();
        assert!(!d.compact);
        assert_eq!(d.guard_band, 4);

        let mut d = ProjectionDescriptor::new(ProjectionKind::Cubemap, 32, 32).with_guard_band(20);
        d.normalize().unwrap();
        assert_eq!(d.guard_band, MAX_GUARD_BAND);
        assert_eq!(d.packed_size(), (3 * 48, 2 * 48));
    }

    #[test]
    fn test_new_kind_layouts() {
        let mut d = ProjectionDescriptor::new(ProjectionKind::TruncatedSquarePyramid, 64, 64);
        d.normalize().unwrap();
        assert_eq!(d.packed_size(), (128, 64));
        let mut d = ProjectionDescriptor::new(ProjectionKind::RotatedSphere, 192, 64);
        d.normalize().unwrap();
        assert_eq!(d.packed_size(), (192, 128));
        let mut d = ProjectionDescriptor::new(ProjectionKind::EquatorialCylindrical, 64, 48);
        d.normalize().unwrap();
        assert_eq!(d.packed_size(), (192, 96));
        assert_eq!(d.num_faces(), 6);
    }

    #[test]
    fn test_compact_layouts() {
        let mut d = ProjectionDescriptor::new(ProjectionKind::Octahedron, 32, 32).with_compact();
        d.normalize().unwrap();
        assert_eq!(d.packing().to_string(), "0 1@180 2 3@180 / 4 5@180 6 7@180");
        // 4 interlocked triangles: 2.5 face widths plus 3 gaps
        assert_eq!(d.packed_size(), (4 * 18 + 16 - 2, 64));
        assert_eq!(d.cell_origin(1, 3), (54, 32));

        let mut d = ProjectionDescriptor::new(ProjectionKind::Icosahedron, 16, 16).with_compact();
        d.normalize().unwrap();
        let p = d.packing();
        assert_eq!((p.rows, p.cols), (2, 10));
        assert_eq!(p.cell(1, 0).face, Some(11));
        assert_eq!(p.cell(1, 1).face, Some(10));
        assert_eq!(d.packed_size(), (10 * 10 + 6, 32));

        let mut back = ProjectionDescriptor::new(ProjectionKind::Icosahedron, 0, 0).with_compact();
        back.infer_face_size(106, 32).unwrap();
        assert_eq!((back.face_width, back.face_height), (16, 16));
        assert!(back.infer_face_size(107, 32).is_err());
    }

    #[test]
    fn test_compact_layout_errors() {
        let mut d = ProjectionDescriptor::new(ProjectionKind::Octahedron, 32, 32)
            .with_compact()
            .with_packing("0 2 1@180 3@180 / 4 5@180 6 7@180".parse().unwrap());
        assert!(matches!(d.normalize(), Err(GeometryError::InvalidLayout(_))));

        let mut d = ProjectionDescriptor::new(ProjectionKind::Octahedron, 32, 32)
            .with_compact()
            .with_packing("0 1@90 2 3@180 / 4 5@180 6 7@180".parse().unwrap());
        assert!(matches!(d.normalize(), Err(GeometryError::InvalidLayout(_))));

        let mut d = ProjectionDescriptor::new(ProjectionKind::Octahedron, 30, 30).with_compact();
        assert!(matches!(d.normalize(), Err(GeometryError::InvalidDescriptor(_))));
    }

    #[test]
    fn test_interior_guard_band() {
        let mut d = ProjectionDescriptor::new(ProjectionKind::Cubemap, 32, 32)
            .with_guard_band(4)
            .with_guard_band_fill(GuardBandFill::Repetitive, false);
        d.normalize().unwrap();
        // bands only between cells: 3 x 40 - 8 by 2 x 40 - 8
        assert_eq!(d.packed_size(), (112, 72));
        assert_eq!(d.cell_origin(0, 0), (-4, -4));
        assert_eq!(d.cell_origin(1, 2), (76, 36));

        let mut back = ProjectionDescriptor::new(ProjectionKind::Cubemap, 0, 0)
            .with_guard_band(4)
            .with_guard_band_fill(GuardBandFill::Repetitive, false);
        back.infer_face_size(112, 72).unwrap();
        assert_eq!((back.face_width, back.face_height), (32, 32));
    }

    #[test]
    fn test_guard_band_fill_parse() {
        assert_eq!("copy".parse::<GuardBandFill>().unwrap(), GuardBandFill::Neighbour);
        assert_eq!("1".parse::<GuardBandFill>().unwrap(), GuardBandFill::Repetitive);
        assert_eq!(GuardBandFill::Neighbour.to_string(), "neighbour");
        assert!("mirror".parse::<GuardBandFill>().is_err());
        let d: ProjectionDescriptor =
            serde_yaml::from_str("kind: erp\nface_width: 64\nface_height: 32\nguard_band_fill: repetitive\n").unwrap();
        assert_eq!(d.guard_band_fill, GuardBandFill::Repetitive);
        assert!(d.guard_band_exterior);
    }

    #[test]
    fn test_virtual_face() {
        let d = ProjectionDescriptor::new(ProjectionKind::GeneralizedCubemap, 16, 16)
            .with_packing("4 0 5 3 2".parse().unwrap());
        assert_eq!(d.virtual_face(), Some(1));
        let mut d = d;
        d.normalize().unwrap();

        let d = ProjectionDescriptor::new(ProjectionKind::Cubemap, 16, 16)
            .with_packing("4 0 5 3 2".parse().unwrap());
        assert_eq!(d.virtual_face(), None);
    }

    #[test]
    fn test_gcmp_params() {
        let mut params = VariantParams::default();
        params.gcmp.faces = vec![
            GcmpFaceWarp {
                coeff_u: 0.2,
                coeff_v: 0.1,
                u_affected_by_v: true,
                v_affected_by_u: true,
            };
            6
        ];
        let mut d = ProjectionDescriptor::new(ProjectionKind::GeneralizedCubemap, 16, 16).with_params(params);
        assert!(matches!(d.normalize(), Err(GeometryError::Unsupported(_))));
    }

    #[test]
    fn test_infer_face_size() {
        let mut d = ProjectionDescriptor::new(ProjectionKind::Cubemap, 0, 0);
        d.infer_face_size(768, 512).unwrap();
        assert_eq!((d.face_width, d.face_height), (256, 256));
        assert!(d.infer_face_size(770, 512).is_err());
    }

    #[test]
    fn test_descriptor_yaml() {
        let yaml = r#"
kind: cmp
face_width: 64
face_height: 64
packing: { rows: 1, cols: 6, cells: [ {face: 0}, {face: 1, rot: 90}, {face: 2}, {face: 3}, {face: 4}, {face: 5, flip: true} ] }
rotation: { yaw: 90.0, pitch: 0.0, roll: 0.0 }
packed_chroma_format: 444
"#;
        let d: ProjectionDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(d.kind, ProjectionKind::Cubemap);
        assert_eq!(d.rotation.yaw, 9000);
        assert_eq!(d.packed_chroma_format, ChromaFormat::Yuv444);
        let p = d.packing();
        assert_eq!(p.cell(0, 1).transform.rotation, 90);
        assert!(p.cell(0, 5).transform.hflip);
    }
}
