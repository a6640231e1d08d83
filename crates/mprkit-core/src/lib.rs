//! # MPRKit Core
//!
//! Core types, errors, and export events for MPRKit.
//! Provides the data model shared by the post-processing pipeline:
//! motion commands, contours, operations, job descriptions, options,
//! and the structured event sink.

pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod format;
pub mod job;

pub use config::PostOptions;

pub use data::{
    ArcDirection, Contour, ContourElement, CoordinateOffset, MotionCommand, MotionKind, Operation,
    Point3, WorkpieceDimensions, CONTOUR_MILL_SCHEMA_ID, DEFAULT_TOOL, DRILL_SCHEMA_ID,
    POCKET_MILL_SCHEMA_ID, TOLERANCE,
};

pub use error::{ConfigError, Error, JobError, RenderError, Result, SerializeError};

pub use events::{EventSink, ExportEvent, NullSink, RecordingSink};

pub use job::{Fixture, JobDescription, PathOperation, StockDimensions};
