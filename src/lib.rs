//! # WikiHouse
//!
//! Lays the flat panels of a WikiHouse model out on plywood sheets and writes
//! cutting sheets for CNC routers.
//!
//! ## Architecture
//!
//! The project is a workspace with three library crates and this binary:
//!
//! 1. **wikihouse-core** - lengths and units, 2D/3D geometry, geometry errors
//! 2. **wikihouse-settings** - sheet/margin/padding settings and their persistence
//! 3. **wikihouse-fabricate** - extraction, labelling, layout, SVG and DXF writers
//! 4. **wikihouse** - command line front end
//!
//! ## Pipeline
//!
//! model tree → panels → labels → sheet layout → drawing → SVG/DXF

pub mod cli;

pub use wikihouse_core::{DisplayUnit, GeometryError, GeometryErrorKind, Length, LengthExt};
pub use wikihouse_fabricate::{
    default_output_path, Fabrication, FabricationError, FabricationReport, Fabricator,
    GeometryPolicy, Mode, ModelDocument, ModelEntity, OutputFormat, RotationPolicy,
};
pub use wikihouse_settings::{Settings, SettingsController, SettingsError, SettingsSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, leaving stdout for preview bytes
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
