//! Post-processor configuration
//!
//! Mirrors the argument surface of the legacy post processor: comment
//! suppression, precision, workpiece overrides, the legacy G54 flag, the
//! Z-offset passthrough toggle, and verbose logging. Flags accept both
//! `--flag` and `/flag` spellings.

use crate::error::ConfigError;
use crate::job::Fixture;
use serde::{Deserialize, Serialize};

/// Options consumed once per export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostOptions {
    /// Decimal places for coordinate fields
    pub precision: usize,
    /// Emit comment records and comment lines
    pub comments: bool,
    /// Override for workpiece length in X (mm)
    pub workpiece_length: Option<f64>,
    /// Override for workpiece width in Y (mm)
    pub workpiece_width: Option<f64>,
    /// Override for workpiece thickness in Z (mm)
    pub workpiece_thickness: Option<f64>,
    /// Legacy coordinate-system flag; the job's fixture list takes
    /// precedence when non-empty
    pub fixture: Option<Fixture>,
    /// Apply only the X/Y components of the coordinate offset, keeping
    /// the machine's Z reference
    pub keep_z_reference: bool,
    /// Verbose logging requested
    pub verbose: bool,
}

impl Default for PostOptions {
    fn default() -> Self {
        Self {
            precision: 3,
            comments: true,
            workpiece_length: None,
            workpiece_width: None,
            workpiece_thickness: None,
            fixture: None,
            keep_z_reference: false,
            verbose: false,
        }
    }
}

impl PostOptions {
    /// Parse a space-separated argument string.
    ///
    /// Unknown flags are ignored so newer hosts can pass extra switches;
    /// malformed values are errors.
    pub fn parse_args(argstring: &str) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        for arg in argstring.split_whitespace() {
            let flag = arg.trim_start_matches('-').trim_start_matches('/');

            if flag == "no-comments" {
                options.comments = false;
            } else if flag == "no-z-offset" {
                options.keep_z_reference = true;
            } else if flag == "log" {
                options.verbose = true;
            } else if flag.eq_ignore_ascii_case("g54") {
                options.fixture = Some(Fixture::G54);
            } else if let Some(value) = flag.strip_prefix("precision=") {
                let precision =
                    value
                        .parse::<usize>()
                        .map_err(|_| ConfigError::InvalidValue {
                            flag: "precision".to_string(),
                            value: value.to_string(),
                        })?;
                if precision > 9 {
                    return Err(ConfigError::PrecisionOutOfRange { precision });
                }
                options.precision = precision;
            } else if let Some(value) = flag.strip_prefix("workpiece-length=") {
                options.workpiece_length = Some(parse_dimension("workpiece-length", value)?);
            } else if let Some(value) = flag.strip_prefix("workpiece-width=") {
                options.workpiece_width = Some(parse_dimension("workpiece-width", value)?);
            } else if let Some(value) = flag.strip_prefix("workpiece-thickness=") {
                options.workpiece_thickness = Some(parse_dimension("workpiece-thickness", value)?);
            }
        }

        Ok(options)
    }
}

fn parse_dimension(flag: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}
