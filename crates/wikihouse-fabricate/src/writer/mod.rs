//! Drawing writers
//!
//! A writer serialises a [`Drawing`] into the bytes of one vector format.
//! Writers share the validation in [`validate`] so a bad drawing is rejected
//! the same way whatever the output format.

pub mod dxf;
pub mod svg;

pub use self::dxf::DxfWriter;
pub use self::svg::SvgWriter;

use crate::drawing::Drawing;
use crate::error::{WriterError, WriterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use wikihouse_core::MM_PER_INCH;

/// Space left between consecutive sheets in multi-sheet output, in millimetres
pub const SHEET_GAP_MM: f64 = 100.0;

/// Drawing coordinates are inches, output is millimetres
pub(crate) fn to_mm(inches: f64) -> f64 {
    inches * MM_PER_INCH
}

/// Left edge of each sheet in millimetres
///
/// Both writers lay sheets out left to right along X, bottom edges aligned,
/// with [`SHEET_GAP_MM`] between neighbours.
pub fn sheet_offsets(drawing: &Drawing) -> Vec<f64> {
    let mut offset = 0.0;
    drawing
        .sheets
        .iter()
        .map(|sheet| {
            let left = offset;
            offset += to_mm(sheet.width) + SHEET_GAP_MM;
            left
        })
        .collect()
}

/// Overall width and height of the arranged sheets in millimetres
pub fn extent_mm(drawing: &Drawing) -> (f64, f64) {
    let gaps = drawing.sheets.len().saturating_sub(1) as f64 * SHEET_GAP_MM;
    let width = drawing.sheets.iter().map(|s| to_mm(s.width)).sum::<f64>() + gaps;
    let height = drawing
        .sheets
        .iter()
        .map(|s| to_mm(s.height))
        .fold(0.0, f64::max);
    (width, height)
}

/// Serialiser for one vector format
pub trait Writer {
    fn format(&self) -> OutputFormat;

    fn write(&self, drawing: &Drawing) -> WriterResult<Vec<u8>>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Dxf,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Svg, OutputFormat::Dxf];

    /// File extension without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Dxf => "dxf",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(extension))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim().trim_start_matches('.'))
            .ok_or_else(|| format!("unsupported output format: {s}"))
    }
}

/// Writer for `format`
pub fn writer_for(format: OutputFormat) -> Box<dyn Writer> {
    match format {
        OutputFormat::Svg => Box::new(SvgWriter::new()),
        OutputFormat::Dxf => Box::new(DxfWriter::new()),
    }
}

/// Reject drawings no format can represent
pub fn validate(drawing: &Drawing) -> WriterResult<()> {
    for sheet in &drawing.sheets {
        if !(sheet.width.is_finite() && sheet.height.is_finite()) {
            return Err(WriterError::NonFiniteCoordinate {
                sheet: sheet.index,
                element: "sheet border".to_string(),
            });
        }
        for polygon in &sheet.polygons {
            if polygon.points.len() < 3 {
                return Err(WriterError::DegeneratePolygon {
                    sheet: sheet.index,
                    label: polygon.panel.clone(),
                    vertices: polygon.points.len(),
                });
            }
            if !polygon.points.iter().all(|p| p.is_finite()) {
                return Err(WriterError::NonFiniteCoordinate {
                    sheet: sheet.index,
                    element: format!("outline of panel {}", polygon.panel),
                });
            }
        }
        for label in &sheet.labels {
            if label.text.trim().is_empty() {
                return Err(WriterError::EmptyLabel { sheet: sheet.index });
            }
            if !(label.position.is_finite() && label.height.is_finite()) {
                return Err(WriterError::NonFiniteCoordinate {
                    sheet: sheet.index,
                    element: format!("label {}", label.text),
                });
            }
        }
    }
    Ok(())
}
