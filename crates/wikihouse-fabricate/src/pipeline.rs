//! Fabrication pipeline
//!
//! One run takes a model, a settings snapshot, an output format and a mode,
//! and goes extraction → labels → layout → drawing → writer. A run either
//! produces its whole output or fails with nothing written.

use crate::drawing::Drawing;
use crate::error::{FabricationError, FabricationResult};
use crate::extract::extract_panels;
use crate::identity::assign_labels;
use crate::layout::{Layout, LayoutEngine, LayoutStats, RotationPolicy};
use crate::model::ModelEntity;
use crate::writer::{writer_for, OutputFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wikihouse_core::GeometryError;
use wikihouse_settings::Settings;

/// File name used when the model has no title
pub const UNTITLED: &str = "Untitled";

/// What to do with entities that cannot be flattened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryPolicy {
    /// Fail the run, listing every rejected entity
    #[default]
    Abort,
    /// Log and leave rejected entities out
    Skip,
}

/// Where the output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Return the bytes to the caller
    Preview,
    /// Write a file; the extension is replaced with the format's
    Save { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// Summary of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FabricationReport {
    pub format: OutputFormat,
    pub panels: usize,
    pub sheets: usize,
    /// Panel area over total sheet area, between 0 and 1
    pub utilisation: f64,
    /// Entities left out under [`GeometryPolicy::Skip`]
    #[serde(skip)]
    pub skipped: Vec<GeometryError>,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct Fabrication {
    pub output: Output,
    pub report: FabricationReport,
    pub layout: Layout,
}

impl Fabrication {
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.output {
            Output::Bytes(bytes) => Some(bytes),
            Output::File(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.output {
            Output::File(path) => Some(path),
            Output::Bytes(_) => None,
        }
    }
}

/// Configured fabrication run
#[derive(Debug, Clone)]
pub struct Fabricator {
    settings: Settings,
    format: OutputFormat,
    rotation: RotationPolicy,
    geometry_policy: GeometryPolicy,
}

impl Fabricator {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            format: OutputFormat::default(),
            rotation: RotationPolicy::default(),
            geometry_policy: GeometryPolicy::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_geometry_policy(mut self, policy: GeometryPolicy) -> Self {
        self.geometry_policy = policy;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn run(&self, entities: &[ModelEntity], mode: Mode) -> FabricationResult<Fabrication> {
        self.settings.validate()?;

        let report = extract_panels(entities, &self.settings);
        let skipped = match (self.geometry_policy, report.failures.is_empty()) {
            (_, true) => Vec::new(),
            (GeometryPolicy::Abort, false) => {
                return Err(FabricationError::Extraction(report.failures));
            }
            (GeometryPolicy::Skip, false) => {
                for failure in &report.failures {
                    warn!(%failure, "Skipping entity");
                }
                report.failures
            }
        };
        let mut panels = report.panels;
        assign_labels(&mut panels);

        let layout = LayoutEngine::new(&self.settings)
            .with_rotation(self.rotation)
            .layout(&panels)?;
        let drawing = Drawing::from_layout(&layout);
        let bytes = writer_for(self.format).write(&drawing)?;

        let output = match mode {
            Mode::Preview => Output::Bytes(bytes),
            Mode::Save { path } => {
                let path = path.with_extension(self.format.extension());
                write_file(&path, &bytes)?;
                Output::File(path)
            }
        };

        let LayoutStats {
            sheets,
            panels: placed,
            utilisation,
        } = layout.stats();
        info!(
            format = %self.format,
            panels = placed,
            sheets,
            utilisation = format_args!("{:.1}%", utilisation * 100.0),
            skipped = skipped.len(),
            "Fabrication complete"
        );

        Ok(Fabrication {
            output,
            report: FabricationReport {
                format: self.format,
                panels: placed,
                sheets,
                utilisation,
                skipped,
            },
            layout,
        })
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> FabricationResult<()> {
    let io_error = |source| FabricationError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, bytes).map_err(io_error)
}

/// Output file beside the model, named after the model title
pub fn default_output_path(model_path: &Path, title: &str, format: OutputFormat) -> PathBuf {
    let name: String = title
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    let name = if name.is_empty() { UNTITLED } else { &name };
    let dir = model_path.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{name}.{}", format.extension()))
}
