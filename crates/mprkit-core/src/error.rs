//! Error handling for MPRKit
//!
//! Provides error types for all layers of the export pipeline:
//! - Configuration errors (post-processor arguments)
//! - Job errors (invalid host-supplied job descriptions)
//! - Serialization errors (MPR output integrity)
//! - Render errors (standard-format collaborator failures)
//!
//! All error types use `thiserror` for ergonomic error handling.
//! Geometric anomalies are deliberately not errors: they are corrected in
//! place and reported through the event sink.

use thiserror::Error;

/// Configuration error type
///
/// Represents errors in the post-processor argument surface.
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// Argument value could not be parsed
    #[error("Invalid value for {flag}: {value}")]
    InvalidValue {
        /// The flag carrying the bad value.
        flag: String,
        /// The unparsable value.
        value: String,
    },

    /// Precision outside the supported range
    #[error("Precision {precision} out of range (0..=9)")]
    PrecisionOutOfRange {
        /// The requested precision.
        precision: usize,
    },
}

/// Job description error type
#[derive(Error, Debug, Clone)]
pub enum JobError {
    /// Unknown fixture selector
    #[error("Unsupported fixture: {fixture} (only G54-G59 supported)")]
    UnsupportedFixture {
        /// The fixture string from the job.
        fixture: String,
    },

    /// Generic job error
    #[error("Invalid job description: {reason}")]
    Invalid {
        /// The reason the job is invalid.
        reason: String,
    },
}

/// MPR serialization error type
#[derive(Error, Debug, Clone)]
pub enum SerializeError {
    /// The serializer produced no output at all. A minimally valid
    /// program (header + terminator) is guaranteed even for empty jobs,
    /// so an empty result is an integrity fault.
    #[error("MPR serializer produced no output")]
    EmptyOutput,
}

/// Standard-format renderer error type
///
/// Failures of the parallel G-code collaborator. These never abort the
/// export on their own: the caller falls back to the built-in renderer.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    /// The collaborator returned an empty document
    #[error("Renderer returned empty output")]
    EmptyOutput,

    /// The collaborator failed outright
    #[error("Renderer failed: {reason}")]
    Failed {
        /// The reason the renderer failed.
        reason: String,
    },
}

/// Main error type for MPRKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Job description error
    #[error(transparent)]
    Job(#[from] JobError),

    /// MPR serialization error
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Renderer error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a serialization integrity fault
    pub fn is_integrity_fault(&self) -> bool {
        matches!(self, Error::Serialize(SerializeError::EmptyOutput))
    }

    /// Check if this is a renderer error
    pub fn is_render_error(&self) -> bool {
        matches!(self, Error::Render(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
