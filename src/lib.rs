//! # MPRKit
//!
//! A Rust-based WoodWOP MPR post processor for HOMAG-class CNC
//! woodworking machines. Converts toolpath motion commands into:
//! - An MPR 4.0 machine program (contours, drilling, routing, pockets)
//! - A parallel standard G-code rendering of the same commands
//!
//! ## Architecture
//!
//! MPRKit is organized as a workspace with multiple crates:
//!
//! 1. **mprkit-core** - Data model, errors, options, export events
//! 2. **mprkit-post** - Normalization, arc resolution, serialization
//! 3. **mprkit** - Main binary that reads a job description and writes
//!    the `.mpr` and `.nc` files

pub use mprkit_core::{
    ArcDirection, ConfigError, Contour, ContourElement, CoordinateOffset, Error, EventSink,
    ExportEvent, Fixture, JobDescription, JobError, MotionCommand, MotionKind, NullSink,
    Operation, PathOperation, Point3, PostOptions, RecordingSink, RenderError, Result,
    SerializeError, StockDimensions, WorkpieceDimensions,
};

pub use mprkit_post::{
    arc_angles, classify, line_angles, part_minimum, resolve_arc, resolve_tool, CommandNormalizer,
    ExportContext, ExportOutput, Exporter, FallbackGcodeRenderer, GcodeRenderer, MprSerializer,
    NormalizedPath, OperationKind, ResolvedArc,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output
/// - RUST_LOG environment variable support
/// - A raised default level when verbose mode is requested
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(default_level.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    Ok(())
}
