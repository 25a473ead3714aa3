//! Error types for the geometry engine.

use thiserror::Error;

/// Error type for geometry construction and conversion.
#[derive(Error, Debug)]
pub enum GeometryError {
    /// A descriptor field is out of range or inconsistent.
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// The frame-packing layout does not fit the projection.
    #[error("invalid frame packing: {0}")]
    InvalidLayout(String),

    /// The projection kind or format combination is not implemented.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// An operation was requested in a state that does not allow it.
    #[error("{op} not allowed in state {state}")]
    InvalidState {
        /// Operation name.
        op: &'static str,
        /// Current state.
        state: String,
    },

    /// Picture or face sizes do not match.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Chroma format or bit depth do not match.
    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    /// Error from the core crate.
    #[error(transparent)]
    Core(#[from] sv360_core::Error),
}

impl GeometryError {
    /// Creates an [`InvalidState`](Self::InvalidState) error.
    pub fn invalid_state(op: &'static str, state: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            op,
            state: state.to_string(),
        }
    }
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
