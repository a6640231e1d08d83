//! # MPRKit Post
//!
//! The WoodWOP MPR post-processing pipeline. Converts an ordered stream
//! of toolpath motion commands into an MPR 4.0 machine program plus a
//! parallel standard G-code rendering.
//!
//! Pipeline, leaves first:
//! - [`normalizer`]: motion commands → contour elements
//! - [`classifier`]: operation kind + drilling extraction
//! - [`extent`]: part minimum for the coordinate-system offset
//! - [`arc`]: arc angle/radius resolution and direction codes
//! - [`mpr`]: fixed-schema MPR serialization
//! - [`gcode`]: standard-format rendering with fallback
//! - [`export`]: one-call orchestration over a per-run [`context`]

pub mod arc;
pub mod classifier;
pub mod context;
pub mod export;
pub mod extent;
pub mod gcode;
pub mod mpr;
pub mod normalizer;

pub use arc::{arc_angles, line_angles, resolve_arc, ResolvedArc};
pub use classifier::{classify, extract_drill_operations, resolve_tool, OperationKind};
pub use context::ExportContext;
pub use export::{ExportOutput, Exporter};
pub use extent::{context_minimum, part_minimum};
pub use gcode::{FallbackGcodeRenderer, GcodeRenderer};
pub use mpr::MprSerializer;
pub use normalizer::{CommandNormalizer, NormalizedPath};
