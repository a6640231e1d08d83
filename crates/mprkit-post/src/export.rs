//! Export orchestration
//!
//! One call runs the whole pipeline: normalize and classify every host
//! operation into a fresh [`ExportContext`], resolve the fixture offset
//! from the part minimum, serialize the MPR program, and render the
//! parallel G-code through the collaborator (falling back to the
//! built-in renderer when it misbehaves).

use crate::classifier::{classify, extract_drill_operations, resolve_tool, OperationKind};
use crate::context::ExportContext;
use crate::extent::part_minimum;
use crate::gcode::{FallbackGcodeRenderer, GcodeRenderer};
use crate::mpr::MprSerializer;
use crate::normalizer::CommandNormalizer;
use mprkit_core::{
    Contour, CoordinateOffset, Error, EventSink, ExportEvent, JobDescription, Operation,
    PostOptions, SerializeError, WorkpieceDimensions,
};
use tracing::{debug, info, warn};

/// The two text blobs produced by one export run
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    /// MPR program (CRLF line endings)
    pub mpr: String,
    /// Standard-format G-code (LF line endings, never offset-adjusted)
    pub gcode: String,
}

/// Runs the export pipeline for one job
pub struct Exporter<'a> {
    options: &'a PostOptions,
    renderer: Option<&'a dyn GcodeRenderer>,
}

impl<'a> Exporter<'a> {
    /// Create an exporter using the built-in G-code renderer
    pub fn new(options: &'a PostOptions) -> Self {
        Self {
            options,
            renderer: None,
        }
    }

    /// Use an external standard-format renderer, keeping the built-in
    /// one as fallback
    pub fn with_renderer(mut self, renderer: &'a dyn GcodeRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Run the export. Geometric anomalies are corrected and reported
    /// through the sink; only an empty primary output is a hard failure.
    pub fn export(
        &self,
        job: &JobDescription,
        sink: &mut dyn EventSink,
    ) -> Result<ExportOutput, Error> {
        let mut ctx = ExportContext::new();

        self.collect(job, &mut ctx, sink);

        if ctx.is_empty() {
            warn!("No contours or operations found; exporting a minimal program");
        }

        let fixture = job.fixture().or(self.options.fixture);
        let offset = match fixture {
            Some(fixture) => {
                let minimum = part_minimum(&ctx.contours, &ctx.operations);
                debug!(
                    "{} active, part minimum {} becomes the output origin",
                    fixture, minimum
                );
                CoordinateOffset::to_origin(minimum)
            }
            None => CoordinateOffset::default(),
        };

        let workpiece = self.resolve_workpiece(job);

        let serializer = MprSerializer::new(self.options, offset);
        let mpr = serializer.generate(&ctx, &workpiece, fixture, sink);
        if mpr.trim().is_empty() {
            return Err(SerializeError::EmptyOutput.into());
        }

        let gcode = self.render_gcode(job, sink);

        info!(
            "Exported {} contours and {} operations ({} tools)",
            ctx.contours.len(),
            ctx.operations.len(),
            ctx.tools_used.len()
        );

        Ok(ExportOutput { mpr, gcode })
    }

    fn collect(&self, job: &JobDescription, ctx: &mut ExportContext, sink: &mut dyn EventSink) {
        for (index, op) in job.operations.iter().enumerate() {
            let kind = classify(op);
            match kind {
                OperationKind::Profile | OperationKind::Pocket => {
                    let path = CommandNormalizer::normalize(&op.commands, sink);
                    if path.elements.is_empty() {
                        let label = op.label_or(&format!("Operation{}", index + 1));
                        warn!("Operation '{}' produced no contour elements", label);
                        sink.record(ExportEvent::EmptyOperation { label });
                        continue;
                    }

                    let id = ctx.next_contour_id();
                    let tool = resolve_tool(op);
                    ctx.tools_used.insert(tool);

                    let label = op.label_or(&format!("Contour{}", id));
                    ctx.contours.push(Contour {
                        id,
                        elements: path.elements,
                        start_pos: path.start_pos,
                        label: label.clone(),
                    });

                    ctx.operations.push(match kind {
                        OperationKind::Profile => Operation::ContourMill {
                            contour_id: id,
                            tool,
                            label,
                        },
                        _ => Operation::PocketMill {
                            contour_id: id,
                            tool,
                        },
                    });
                }
                OperationKind::Drilling => {
                    let drills = extract_drill_operations(op);
                    if drills.is_empty() {
                        let label = op.label_or(&format!("Operation{}", index + 1));
                        warn!("Drilling operation '{}' has no drill cycles", label);
                        sink.record(ExportEvent::EmptyOperation { label });
                        continue;
                    }
                    ctx.tools_used.insert(resolve_tool(op));
                    ctx.operations.extend(drills);
                }
            }
        }
    }

    fn resolve_workpiece(&self, job: &JobDescription) -> WorkpieceDimensions {
        let stock = job.stock.unwrap_or_default();
        let defaults = WorkpieceDimensions::default();

        WorkpieceDimensions {
            length: self
                .options
                .workpiece_length
                .or(stock.length)
                .unwrap_or(defaults.length),
            width: self
                .options
                .workpiece_width
                .or(stock.width)
                .unwrap_or(defaults.width),
            thickness: self
                .options
                .workpiece_thickness
                .or(stock.thickness)
                .unwrap_or(defaults.thickness),
            extent_x: stock.extent_x.unwrap_or(0.0),
            extent_y: stock.extent_y.unwrap_or(0.0),
            clearance: stock.clearance.unwrap_or(defaults.clearance),
        }
    }

    fn render_gcode(&self, job: &JobDescription, sink: &mut dyn EventSink) -> String {
        if let Some(renderer) = self.renderer {
            match renderer.render(job) {
                Ok(text) if !text.trim().is_empty() => return text,
                Ok(_) => {
                    warn!("G-code renderer returned empty output, using fallback");
                    sink.record(ExportEvent::RendererFallback {
                        reason: "empty output".to_string(),
                    });
                }
                Err(e) => {
                    warn!("G-code renderer failed ({}), using fallback", e);
                    sink.record(ExportEvent::RendererFallback {
                        reason: e.to_string(),
                    });
                }
            }
        }

        FallbackGcodeRenderer::new(self.options).render_direct(job)
    }
}
