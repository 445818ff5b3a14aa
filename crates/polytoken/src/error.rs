//! Error types for tokenization and geometry.
//!
//! Every public operation returns [`Result`]. Callers that need to branch on
//! the failure category use [`PolytokenError::kind`] instead of matching on
//! message text.

use thiserror::Error;

/// Failures raised by the geometry primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The two infinite lines share a slope (parallel or coincident).
    #[error("can't get intersect of lines with the same slope")]
    ParallelLines,

    /// Empty ring, zero-length segment, or non-finite coordinate.
    #[error("invalid geometry input: {0}")]
    InvalidInput(String),

    /// Ray perturbation never produced a clean crossing count.
    #[error("ray casting did not settle after {0} attempts")]
    RayCastingDiverged(usize),
}

/// Tokenization errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolytokenError {
    /// Malformed configuration (step config, registry lookups, polytype shape).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Range failed dimension-specific validation.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Point failed dimension-specific validation.
    #[error("invalid point: {0}")]
    InvalidPoint(String),

    /// A dimension was asked for an operation it does not provide.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Coarse error category, stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidRange,
    InvalidPoint,
    UnsupportedOperation,
    ParallelLines,
    InvalidGeometry,
    RayCastingDiverged,
}

impl PolytokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolytokenError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PolytokenError::InvalidRange(_) => ErrorKind::InvalidRange,
            PolytokenError::InvalidPoint(_) => ErrorKind::InvalidPoint,
            PolytokenError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            PolytokenError::Geometry(GeometryError::ParallelLines) => ErrorKind::ParallelLines,
            PolytokenError::Geometry(GeometryError::InvalidInput(_)) => ErrorKind::InvalidGeometry,
            PolytokenError::Geometry(GeometryError::RayCastingDiverged(_)) => {
                ErrorKind::RayCastingDiverged
            }
        }
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        PolytokenError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_range(msg: impl Into<String>) -> Self {
        PolytokenError::InvalidRange(msg.into())
    }

    pub(crate) fn invalid_point(msg: impl Into<String>) -> Self {
        PolytokenError::InvalidPoint(msg.into())
    }
}

/// Result type for tokenization.
pub type Result<T> = std::result::Result<T, PolytokenError>;

/// Result type for the geometry primitives.
pub type GeometryResult<T> = std::result::Result<T, GeometryError>;
