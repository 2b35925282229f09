//! # WikiHouse Core
//!
//! Core types shared by the fabrication crates: typed lengths with explicit
//! unit conversion, 2D/3D geometry primitives and the error types raised when
//! model geometry cannot be fabricated.

pub mod error;
pub mod geometry;
pub mod plane;
pub mod units;

pub use error::{GeometryError, GeometryErrorKind, GeometryResult, UnitError};
pub use geometry::{Bounds, Point2, EPSILON};
pub use plane::PlaneFrame;
pub use units::{format_length, parse_length, DisplayUnit, Length, LengthExt, MM_PER_INCH};

// Re-exported so downstream crates name 3D types through one path
pub use nalgebra::{Matrix4, Point3, Vector3};
