//! Error types shared by the fabrication crates
//!
//! - Unit errors (parsing user-entered lengths)
//! - Geometry errors (entities that cannot be flattened into panels)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::units::Length;
use thiserror::Error;

/// Errors raised while parsing or converting lengths.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// No value was supplied
    #[error("Empty length value")]
    Empty,

    /// The value is not a finite number
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// A fraction had a zero denominator
    #[error("Division by zero in fractional length")]
    DivisionByZero,

    /// A fraction was malformed (e.g. "1/2/3")
    #[error("Invalid fraction: {0}")]
    InvalidFraction(String),

    /// The unit name is not recognised
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}

/// Reason an entity could not be turned into a panel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryErrorKind {
    /// A loop has fewer than three distinct vertices
    #[error("outline has {count} vertices, at least 3 are required")]
    TooFewVertices {
        /// Number of distinct vertices found.
        count: usize,
    },

    /// Vertices do not lie on a common plane
    #[error("face is not planar (deviation {deviation})")]
    NonPlanar {
        /// Largest distance from a vertex to the fitted plane.
        deviation: Length,
    },

    /// Face thickness does not match the configured sheet depth
    #[error("thickness {actual} does not match sheet depth {expected}")]
    ThicknessMismatch {
        /// Configured sheet depth.
        expected: Length,
        /// Thickness reported by the entity.
        actual: Length,
    },

    /// Outline encloses no area
    #[error("outline encloses zero area")]
    ZeroArea,

    /// Outline edges cross each other
    #[error("outline is self-intersecting")]
    SelfIntersecting,

    /// An inner cut-out is not contained by the outline
    #[error("inner loop {index} lies outside the outline")]
    LoopOutsideOutline {
        /// Index of the offending inner loop.
        index: usize,
    },

    /// A coordinate or transform entry is NaN or infinite
    #[error("geometry contains non-finite values")]
    NonFinite,

    /// The accumulated transform cannot be inverted
    #[error("transform is singular")]
    SingularTransform,
}

/// A geometry failure attributed to one entity of the source model.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("entity '{entity}': {kind}")]
pub struct GeometryError {
    /// Slash-separated path of the entity in the model tree.
    pub entity: String,
    /// What went wrong.
    pub kind: GeometryErrorKind,
}

impl GeometryError {
    pub fn new(entity: impl Into<String>, kind: GeometryErrorKind) -> Self {
        Self {
            entity: entity.into(),
            kind,
        }
    }
}

/// Result type for geometry operations that are not yet tied to an entity
pub type GeometryResult<T> = std::result::Result<T, GeometryErrorKind>;
