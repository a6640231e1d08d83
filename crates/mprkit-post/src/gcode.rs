//! Standard-format (G-code) rendering
//!
//! The parallel G-code output is normally produced by an external
//! renderer behind the [`GcodeRenderer`] trait. When that collaborator
//! fails or returns an empty document, the built-in fallback re-walks
//! the same motion commands directly so the export never fails solely
//! because of the secondary output.
//!
//! G-code is never adjusted by the coordinate-system offset, and keeps
//! LF line endings regardless of the MPR side's CRLF convention.

use crate::classifier::resolve_tool;
use mprkit_core::format::coord;
use mprkit_core::{JobDescription, PostOptions, RenderError};

/// Seam for the external standard-format renderer
pub trait GcodeRenderer {
    /// Render the job's motion commands as G-code text
    fn render(&self, job: &JobDescription) -> Result<String, RenderError>;
}

/// Built-in renderer used when no collaborator is supplied or the
/// collaborator fails
pub struct FallbackGcodeRenderer<'a> {
    options: &'a PostOptions,
}

impl<'a> FallbackGcodeRenderer<'a> {
    /// Create a fallback renderer with the run's options
    pub fn new(options: &'a PostOptions) -> Self {
        Self { options }
    }

    /// Render directly from the raw commands. Cannot fail.
    pub fn render_direct(&self, job: &JobDescription) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("(Generated by MPRKit)".to_string());
        lines.push(format!(
            "(Date: {})",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(String::new());
        lines.push("G21".to_string());
        lines.push("G90".to_string());
        lines.push("G40".to_string());
        lines.push(String::new());

        for op in &job.operations {
            if self.options.comments {
                lines.push(format!("(Operation: {})", op.label_or("Unknown")));
            }

            let tool = resolve_tool(op);
            for cmd in &op.commands {
                let mut line = cmd.name.clone();

                if matches!(cmd.name.as_str(), "G41" | "G41.1" | "G42" | "G42.1") {
                    // Cutter compensation needs a D word; fall back to
                    // the operation's tool number when none is given.
                    let d = cmd
                        .params
                        .get(&'D')
                        .map(|v| *v as i64)
                        .unwrap_or(tool as i64);
                    line.push_str(&format!(" D{}", d));
                    for (letter, value) in &cmd.params {
                        if *letter != 'D' {
                            line.push_str(&format!(
                                " {}{}",
                                letter,
                                coord(*value, self.options.precision)
                            ));
                        }
                    }
                } else {
                    for (letter, value) in &cmd.params {
                        line.push_str(&format!(
                            " {}{}",
                            letter,
                            coord(*value, self.options.precision)
                        ));
                    }
                }

                lines.push(line);
            }

            if self.options.comments {
                lines.push("(End operation)".to_string());
                lines.push(String::new());
            }
        }

        lines.push("M2".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

impl GcodeRenderer for FallbackGcodeRenderer<'_> {
    fn render(&self, job: &JobDescription) -> Result<String, RenderError> {
        Ok(self.render_direct(job))
    }
}
