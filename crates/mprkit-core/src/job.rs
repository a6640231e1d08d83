//! Host-facing job description
//!
//! The host application hands the post processor an ordered list of
//! operations plus job-level metadata. Values the host may or may not
//! supply are modeled as `Option`s and resolved through explicit fallback
//! chains rather than reflective property probing.

use crate::data::MotionCommand;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Work coordinate system selector. G54 (and its siblings) mean "shift
/// the output so the part's minimum point becomes the origin".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fixture {
    /// First work coordinate system
    G54,
    /// Second work coordinate system
    G55,
    /// Third work coordinate system
    G56,
    /// Fourth work coordinate system
    G57,
    /// Fifth work coordinate system
    G58,
    /// Sixth work coordinate system
    G59,
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fixture::G54 => write!(f, "G54"),
            Fixture::G55 => write!(f, "G55"),
            Fixture::G56 => write!(f, "G56"),
            Fixture::G57 => write!(f, "G57"),
            Fixture::G58 => write!(f, "G58"),
            Fixture::G59 => write!(f, "G59"),
        }
    }
}

impl FromStr for Fixture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "G54" => Ok(Fixture::G54),
            "G55" => Ok(Fixture::G55),
            "G56" => Ok(Fixture::G56),
            "G57" => Ok(Fixture::G57),
            "G58" => Ok(Fixture::G58),
            "G59" => Ok(Fixture::G59),
            _ => Err(format!("Unknown fixture: {}", s)),
        }
    }
}

/// Stock dimensions and related job-level settings as supplied by the
/// host. All fields are optional; defaults apply downstream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StockDimensions {
    /// Stock length in X (mm)
    pub length: Option<f64>,
    /// Stock width in Y (mm)
    pub width: Option<f64>,
    /// Stock thickness in Z (mm)
    pub thickness: Option<f64>,
    /// Oversize per edge in X (mm)
    pub extent_x: Option<f64>,
    /// Oversize per edge in Y (mm)
    pub extent_y: Option<f64>,
    /// Clearance height (mm)
    pub clearance: Option<f64>,
}

/// One machining operation as supplied by the host: an optional declared
/// kind, the motion commands with placement pre-applied, and optional
/// tool and label
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathOperation {
    /// Declared operation kind, e.g. "Profile", "Drilling", "Pocket"
    pub kind: Option<String>,
    /// Human-readable label
    pub label: Option<String>,
    /// Declared tool number
    pub tool: Option<u32>,
    /// Ordered motion commands
    pub commands: Vec<MotionCommand>,
}

impl PathOperation {
    /// Label, or a fallback when the host supplied none
    pub fn label_or(&self, fallback: &str) -> String {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// The complete job handed to the post processor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobDescription {
    /// Output file configured in the job settings, possibly with a path
    pub output_file: Option<String>,
    /// User-defined model name
    pub model: Option<String>,
    /// Label of the part/body being machined
    pub part_label: Option<String>,
    /// Work coordinate systems enabled in the job settings
    pub fixtures: Vec<String>,
    /// Stock dimensions
    pub stock: Option<StockDimensions>,
    /// Program offset vector applied by the host (informational)
    pub program_offset: Option<(f64, f64, f64)>,
    /// Machining operations in execution order
    pub operations: Vec<PathOperation>,
}

impl JobDescription {
    /// Resolve the base name for output files.
    ///
    /// Ordered fallback chain, first present value wins:
    /// 1. output-file stem, when the setting carries a directory
    /// 2. model name
    /// 3. part label
    /// 4. output-file stem without a directory
    /// 5. `"export"`
    pub fn base_name(&self) -> String {
        let output = self
            .output_file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(file) = output {
            let path = Path::new(file);
            let has_dir = path
                .parent()
                .is_some_and(|p| !p.as_os_str().is_empty() && p != Path::new("/"));
            if has_dir {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    return stem.to_string();
                }
            }
        }

        if let Some(model) = self.model.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return model.to_string();
        }

        if let Some(part) = self
            .part_label
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return part.to_string();
        }

        if let Some(file) = output {
            if let Some(stem) = Path::new(file).file_stem().and_then(|s| s.to_str()) {
                return stem.to_string();
            }
        }

        "export".to_string()
    }

    /// Resolve the active fixture from the job's coordinate-system list.
    ///
    /// G54 wins when present; otherwise the first entry that parses as a
    /// supported fixture. Unsupported entries are skipped with a warning.
    pub fn fixture(&self) -> Option<Fixture> {
        if self.fixtures.iter().any(|f| f.eq_ignore_ascii_case("G54")) {
            return Some(Fixture::G54);
        }
        for name in &self.fixtures {
            match name.parse::<Fixture>() {
                Ok(fixture) => return Some(fixture),
                Err(_) => {
                    tracing::warn!("Fixture '{}' not supported, skipping", name);
                }
            }
        }
        None
    }
}
