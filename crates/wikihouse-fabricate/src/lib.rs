//! WikiHouse Fabrication Crate
//!
//! Turns a WikiHouse model into cutting sheets:
//!
//! 1. **extract** - flatten faces of the model tree into panels
//! 2. **identity** - label panels `A`, `B`, ..., `AA`, ...
//! 3. **layout** - shelf-pack panels onto stock sheets
//! 4. **drawing** - format-neutral scene of cuts and labels
//! 5. **writer** - SVG and DXF serialisation
//!
//! [`Fabricator`] runs the whole chain.

pub mod drawing;
pub mod error;
pub mod extract;
pub mod identity;
pub mod layout;
pub mod model;
pub mod panel;
pub mod pipeline;
pub mod writer;

pub use drawing::{Drawing, Label, Layer, Polygon, SheetDrawing};
pub use error::{
    FabricationError, FabricationResult, UnplaceablePanelError, WriterError, WriterResult,
};
pub use extract::{extract_panels, ExtractionReport, PLANARITY_TOLERANCE, THICKNESS_TOLERANCE};
pub use identity::{assign_labels, panel_label, LabelSequence};
pub use layout::{
    Layout, LayoutEngine, LayoutStats, LayoutViolation, Placement, Rotation, RotationPolicy,
    Sheet,
};
pub use model::{Face, Group, ModelDocument, ModelEntity};
pub use panel::Panel;
pub use pipeline::{
    default_output_path, Fabrication, FabricationReport, Fabricator, GeometryPolicy, Mode,
    Output,
};
pub use writer::{writer_for, DxfWriter, OutputFormat, SvgWriter, Writer};
