//! Error types for the fabrication pipeline.
//!
//! Layout and writer failures are reported with enough context (panel label,
//! dimensions, sheet index) for the user to find the offending part in the
//! model. [`FabricationError`] unifies every failure a run can produce.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use wikihouse_core::{GeometryError, Length};
use wikihouse_settings::SettingsError;

/// A panel too large for the usable area of a sheet in every allowed orientation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "panel {label} ({width} x {height}) does not fit the usable sheet area ({inner_width} x {inner_height})"
)]
pub struct UnplaceablePanelError {
    /// Identity label of the panel.
    pub label: String,
    /// Bounding box width of the panel, without padding.
    pub width: Length,
    /// Bounding box height of the panel, without padding.
    pub height: Length,
    /// Width inside the sheet margins.
    pub inner_width: Length,
    /// Height inside the sheet margins.
    pub inner_height: Length,
}

/// Errors raised while serialising a drawing.
#[derive(Error, Debug)]
pub enum WriterError {
    /// A polygon has fewer than three vertices.
    #[error("sheet {sheet}: polygon for panel {label} has {vertices} vertices, at least 3 are required")]
    DegeneratePolygon {
        sheet: usize,
        label: String,
        vertices: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("sheet {sheet}: non-finite coordinate in {element}")]
    NonFiniteCoordinate { sheet: usize, element: String },

    /// A label has no text.
    #[error("sheet {sheet}: label text is empty")]
    EmptyLabel { sheet: usize },

    /// Formatting into the output buffer failed.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// The DXF document could not be serialised.
    #[error("DXF error: {0}")]
    Dxf(#[from] dxf::DxfError),
}

/// Result type alias for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;

/// Any failure of a fabrication run.
#[derive(Error, Debug)]
pub enum FabricationError {
    /// One or more entities could not be turned into panels.
    #[error("{} could not be converted to panels: {}", entity_count(.0), join_errors(.0))]
    Extraction(Vec<GeometryError>),

    /// A panel does not fit on a sheet.
    #[error(transparent)]
    Unplaceable(#[from] UnplaceablePanelError),

    /// The drawing could not be serialised.
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// The settings are unusable.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The model file could not be parsed.
    #[error("Invalid model: {0}")]
    Model(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn entity_count(errors: &[GeometryError]) -> String {
    match errors.len() {
        1 => "1 entity".to_string(),
        n => format!("{n} entities"),
    }
}

fn join_errors(errors: &[GeometryError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for fabrication runs.
pub type FabricationResult<T> = Result<T, FabricationError>;
