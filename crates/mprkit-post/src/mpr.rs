//! MPR 4.0 serialization
//!
//! Renders the export context plus workpiece metadata into the
//! fixed-schema MPR text: `[H` header, `]n` contour blocks, `[001`
//! variables, `<100 \WerkStck\` workpiece record, operation records, and
//! the `!` terminator. The schema is fixed by the destination format.
//!
//! The coordinate offset is applied here and only here; stored geometry
//! is never mutated, so re-serializing with a different offset produces
//! the same program rigidly shifted.

use crate::arc::{line_angles, resolve_arc};
use crate::context::ExportContext;
use mprkit_core::format::{coord, extent};
use mprkit_core::{
    Contour, ContourElement, CoordinateOffset, EventSink, Fixture, Operation, Point3, PostOptions,
    WorkpieceDimensions,
};

/// Fixed header settings, verbatim from the MPR 4.0 schema
const HEADER_FIELDS: &[&str] = &[
    "VERSION=\"4.0 Alpha\"",
    "WW=\"9.0.152\"",
    "OP=\"1\"",
    "WRK2=\"0\"",
    "SCHN=\"0\"",
    "CVR=\"0\"",
    "POI=\"0\"",
    "HSP=\"0\"",
    "O2=\"0\"",
    "O4=\"0\"",
    "O3=\"0\"",
    "O5=\"0\"",
    "SR=\"0\"",
    "FM=\"1\"",
    "ML=\"2000\"",
    "UF=\"20\"",
    "ZS=\"20\"",
    "DN=\"STANDARD\"",
    "DST=\"0\"",
    "GP=\"0\"",
    "GY=\"0\"",
    "GXY=\"0\"",
    "NP=\"1\"",
    "NE=\"0\"",
    "NA=\"0\"",
    "BFS=\"0\"",
    "US=\"0\"",
    "CB=\"0\"",
    "UP=\"0\"",
    "DW=\"0\"",
    "MAT=\"HOMAG\"",
    "HP_A_O=\"STANDARD\"",
    "OVD_U=\"1\"",
    "OVD=\"0\"",
    "OHD_U=\"0\"",
    "OHD=\"2\"",
    "OOMD_U=\"0\"",
    "EWL=\"1\"",
    "INCH=\"0\"",
    "VIEW=\"NOMIRROR\"",
    "ANZ=\"1\"",
    "BES=\"0\"",
    "ENT=\"0\"",
    "MATERIAL=\"\"",
    "CUSTOMER=\"\"",
    "ORDER=\"\"",
    "ARTICLE=\"\"",
    "PARTID=\"\"",
    "PARTTYPE=\"\"",
    "MPRCOUNT=\"1\"",
    "MPRNUMBER=\"1\"",
    "INFO1=\"\"",
    "INFO2=\"\"",
    "INFO3=\"\"",
    "INFO4=\"\"",
    "INFO5=\"\"",
];

/// Serializer for the MPR destination format
pub struct MprSerializer<'a> {
    options: &'a PostOptions,
    offset: CoordinateOffset,
}

impl<'a> MprSerializer<'a> {
    /// Create a serializer with the run's options and coordinate offset
    pub fn new(options: &'a PostOptions, offset: CoordinateOffset) -> Self {
        Self { options, offset }
    }

    /// Render the complete MPR program. Lines are joined with CRLF as
    /// required by the destination controllers.
    pub fn generate(
        &self,
        ctx: &ExportContext,
        workpiece: &WorkpieceDimensions,
        fixture: Option<Fixture>,
        sink: &mut dyn EventSink,
    ) -> String {
        let mut lines: Vec<String> = Vec::new();

        self.write_header(&mut lines, workpiece);
        self.write_contours(&mut lines, &ctx.contours, sink);
        self.write_variables(&mut lines, workpiece);
        self.write_workpiece(&mut lines);
        self.write_comment(&mut lines, fixture);
        self.write_operations(&mut lines, &ctx.operations);

        lines.push("!".to_string());

        lines.join("\r\n")
    }

    /// Z component of the offset, honoring the passthrough toggle
    fn dz(&self) -> f64 {
        if self.options.keep_z_reference {
            0.0
        } else {
            self.offset.dz
        }
    }

    fn shift(&self, point: Point3) -> Point3 {
        Point3::new(
            point.x + self.offset.dx,
            point.y + self.offset.dy,
            point.z + self.dz(),
        )
    }

    fn fmt(&self, value: f64) -> String {
        coord(value, self.options.precision)
    }

    fn write_header(&self, lines: &mut Vec<String>, wp: &WorkpieceDimensions) {
        lines.push("[H".to_string());
        for field in HEADER_FIELDS {
            lines.push((*field).to_string());
        }
        lines.push(format!("_BSX={}", extent(wp.length)));
        lines.push(format!("_BSY={}", extent(wp.width)));
        lines.push(format!("_BSZ={}", extent(wp.thickness)));
        lines.push(format!("_FNX={}", extent(wp.extent_x)));
        lines.push(format!("_FNY={}", extent(wp.extent_y)));
        lines.push("_RNX=0.000000".to_string());
        lines.push("_RNY=0.000000".to_string());
        lines.push("_RNZ=0.000000".to_string());
        lines.push(format!("_RX={}", extent(wp.length + 2.0 * wp.extent_x)));
        lines.push(format!("_RY={}", extent(wp.width + 2.0 * wp.extent_y)));
        lines.push(String::new());
    }

    fn write_contours(&self, lines: &mut Vec<String>, contours: &[Contour], sink: &mut dyn EventSink) {
        for contour in contours {
            lines.push(format!("]{}", contour.id));

            let start = self.shift(contour.start_pos);
            lines.push("$E0".to_string());
            lines.push("KP ".to_string());
            lines.push(format!("X={}", self.fmt(start.x)));
            lines.push(format!("Y={}", self.fmt(start.y)));
            lines.push(format!("Z={}", self.fmt(start.z)));
            lines.push("KO=00".to_string());
            lines.push(".X=0.000000".to_string());
            lines.push(".Y=0.000000".to_string());
            lines.push(".Z=0.000000".to_string());
            lines.push(".KO=00".to_string());
            lines.push(String::new());

            let mut prev = start;
            let mut elem_num = 0;

            for elem in &contour.elements {
                match elem {
                    ContourElement::Line { end } => {
                        let end = self.shift(*end);
                        let (wi, wz) = line_angles(prev, end);

                        elem_num += 1;
                        lines.push(format!("$E{}", elem_num));
                        lines.push("KL ".to_string());
                        lines.push(format!("X={}", self.fmt(end.x)));
                        lines.push(format!("Y={}", self.fmt(end.y)));
                        lines.push(format!("Z={}", self.fmt(end.z)));
                        lines.push(format!(".X={}", self.fmt(end.x)));
                        lines.push(format!(".Y={}", self.fmt(end.y)));
                        lines.push(format!(".Z={}", self.fmt(end.z)));
                        lines.push(format!(".WI={}", self.fmt(wi)));
                        lines.push(format!(".WZ={}", self.fmt(wz)));
                        lines.push(String::new());

                        prev = end;
                    }
                    ContourElement::Arc {
                        end,
                        center_offset,
                        radius,
                        direction,
                    } => {
                        let end = self.shift(*end);

                        // The center offset is relative to the previous
                        // point, so resolving against the shifted prev
                        // keeps the center in the output frame.
                        let Some(arc) =
                            resolve_arc(prev, end, *center_offset, *radius, *direction, sink)
                        else {
                            prev = end;
                            continue;
                        };

                        let code = arc.direction_code();
                        elem_num += 1;
                        lines.push(format!("$E{}", elem_num));
                        lines.push("KA ".to_string());
                        lines.push(format!("X={}", self.fmt(end.x)));
                        lines.push(format!("Y={}", self.fmt(end.y)));
                        lines.push(format!("Z={}", self.fmt(end.z)));
                        lines.push(format!("DS={}", code));
                        lines.push(format!("R={}", self.fmt(arc.radius)));
                        lines.push(format!(".X={}", self.fmt(end.x)));
                        lines.push(format!(".Y={}", self.fmt(end.y)));
                        lines.push(format!(".Z={}", self.fmt(end.z)));
                        lines.push(format!(".I={}", self.fmt(arc.center.0)));
                        lines.push(format!(".J={}", self.fmt(arc.center.1)));
                        lines.push(format!(".DS={}", code));
                        lines.push(format!(".R={}", self.fmt(arc.radius)));
                        lines.push(format!(".WI={}", self.fmt(arc.start_angle)));
                        lines.push(format!(".WO={}", self.fmt(arc.end_angle)));
                        lines.push(format!(".WAZ={}", self.fmt(0.0)));
                        lines.push(String::new());

                        prev = end;
                    }
                }
            }

            lines.push(String::new());
        }
    }

    fn write_variables(&self, lines: &mut Vec<String>, wp: &WorkpieceDimensions) {
        lines.push("[001".to_string());
        lines.push(format!("l=\"{}\"", self.fmt(wp.length)));
        if self.options.comments {
            lines.push("KM=\"Länge in X\"".to_string());
        }
        lines.push(format!("w=\"{}\"", self.fmt(wp.width)));
        if self.options.comments {
            lines.push("KM=\"Breite in Y\"".to_string());
        }
        lines.push(format!("th=\"{}\"", self.fmt(wp.thickness)));
        if self.options.comments {
            lines.push("KM=\"Dicke in Z\"".to_string());
        }
        lines.push(format!("fnx=\"{}\"", self.fmt(wp.extent_x)));
        if self.options.comments {
            lines.push("KM=\"Aufmaß in X\"".to_string());
        }
        lines.push(format!("fny=\"{}\"", self.fmt(wp.extent_y)));
        if self.options.comments {
            lines.push("KM=\"Aufmaß in Y\"".to_string());
        }
        lines.push(format!("zs=\"{}\"", self.fmt(wp.clearance)));
        if self.options.comments {
            lines.push("KM=\"Sicherheitshöhe in Z\"".to_string());
        }
        lines.push(String::new());
    }

    fn write_workpiece(&self, lines: &mut Vec<String>) {
        // Dimensions are referenced through the [001 variables so the
        // destination application keeps them user-editable.
        lines.push("<100 \\WerkStck\\".to_string());
        lines.push("LA=\"l\"".to_string());
        lines.push("BR=\"w\"".to_string());
        lines.push("DI=\"th\"".to_string());
        lines.push("FNX=\"fnx\"".to_string());
        lines.push("FNY=\"fny\"".to_string());
        lines.push("AX=\"0\"".to_string());
        lines.push("AY=\"0\"".to_string());
        lines.push(String::new());
    }

    fn write_comment(&self, lines: &mut Vec<String>, fixture: Option<Fixture>) {
        if !self.options.comments {
            return;
        }

        lines.push("<101 \\Comment\\".to_string());
        lines.push("KM=\"Generated by MPRKit\"".to_string());
        lines.push(format!(
            "KM=\"Date: {}\"",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        if let Some(fixture) = fixture {
            lines.push(format!(
                "KM=\"Coordinate System: {} (offset: X={:.3}, Y={:.3}, Z={:.3})\"",
                fixture, self.offset.dx, self.offset.dy, self.offset.dz
            ));
            lines.push(
                "KM=\"NOTE: G-code output is not affected by the coordinate system offset\""
                    .to_string(),
            );
        }
        lines.push(String::new());
    }

    fn write_operations(&self, lines: &mut Vec<String>, operations: &[Operation]) {
        for op in operations {
            match op {
                Operation::Drill { x, y, depth, tool } => {
                    lines.push(format!("<{} \\BohrVert\\", op.schema_id()));
                    lines.push(format!("XA=\"{}\"", self.fmt(x + self.offset.dx)));
                    lines.push(format!("YA=\"{}\"", self.fmt(y + self.offset.dy)));
                    lines.push(format!("TI=\"{}\"", self.fmt(*depth)));
                    lines.push(format!("TNO=\"{}\"", tool));
                    lines.push("BM=\"SS\"".to_string());
                    lines.push(String::new());
                }
                Operation::ContourMill {
                    contour_id, tool, ..
                } => {
                    lines.push(format!("<{} \\Contourfraesen\\", op.schema_id()));
                    lines.push(format!("EA=\"{}:0\"", contour_id));
                    lines.push("MDA=\"TAN\"".to_string());
                    lines.push("RK=\"WRKL\"".to_string());
                    lines.push(format!("EE=\"{}:1\"", contour_id));
                    lines.push("MDE=\"TAN_AB\"".to_string());
                    lines.push("EM=\"1\"".to_string());
                    lines.push("RI=\"1\"".to_string());
                    lines.push(format!("TNO=\"{}\"", tool));
                    lines.push("SM=\"0\"".to_string());
                    lines.push(String::new());
                }
                Operation::PocketMill { contour_id, tool } => {
                    lines.push(format!("<{} \\Pocket\\", op.schema_id()));
                    lines.push(format!("EA=\"{}:0\"", contour_id));
                    lines.push(format!("TNO=\"{}\"", tool));
                    lines.push(String::new());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mprkit_core::{ArcDirection, NullSink};

    fn empty_context() -> ExportContext {
        ExportContext::new()
    }

    #[test]
    fn test_empty_model_still_valid() {
        let options = PostOptions::default();
        let serializer = MprSerializer::new(&options, CoordinateOffset::default());
        let mpr = serializer.generate(
            &empty_context(),
            &WorkpieceDimensions::default(),
            None,
            &mut NullSink,
        );

        assert!(mpr.starts_with("[H\r\n"));
        assert!(mpr.ends_with("\r\n!"));
        assert!(mpr.contains("<100 \\WerkStck\\"));
        assert!(mpr.contains("_BSX=800.000000"));
        assert!(!mpr.contains("\\BohrVert\\"));
        assert!(!mpr.contains("$E"));
    }

    #[test]
    fn test_crlf_only_line_endings() {
        let options = PostOptions::default();
        let serializer = MprSerializer::new(&options, CoordinateOffset::default());
        let mpr = serializer.generate(
            &empty_context(),
            &WorkpieceDimensions::default(),
            None,
            &mut NullSink,
        );

        assert!(!mpr.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_contour_block_layout() {
        let mut ctx = ExportContext::new();
        let id = ctx.next_contour_id();
        ctx.contours.push(Contour {
            id,
            elements: vec![
                ContourElement::Line {
                    end: Point3::new(10.0, 0.0, 0.0),
                },
                ContourElement::Arc {
                    end: Point3::new(20.0, 10.0, 0.0),
                    center_offset: (10.0, 0.0),
                    radius: 10.0,
                    direction: ArcDirection::Cw,
                },
            ],
            start_pos: Point3::default(),
            label: "Profile".to_string(),
        });

        let options = PostOptions::default();
        let serializer = MprSerializer::new(&options, CoordinateOffset::default());
        let mpr = serializer.generate(
            &ctx,
            &WorkpieceDimensions::default(),
            None,
            &mut NullSink,
        );

        assert!(mpr.contains("]1\r\n$E0\r\nKP "));
        assert!(mpr.contains("$E1\r\nKL \r\nX=10.000"));
        assert!(mpr.contains("$E2\r\nKA \r\nX=20.000"));
        // Absolute center of the arc: (10,0) + (10,0).
        assert!(mpr.contains(".I=20.000"));
        assert!(mpr.contains(".J=0.000"));
        assert!(mpr.contains("DS=0"));
        assert!(mpr.contains("R=10.000"));
    }

    #[test]
    fn test_comment_toggle() {
        let mut options = PostOptions::default();
        options.comments = false;
        let serializer = MprSerializer::new(&options, CoordinateOffset::default());
        let mpr = serializer.generate(
            &empty_context(),
            &WorkpieceDimensions::default(),
            None,
            &mut NullSink,
        );

        assert!(!mpr.contains("\\Comment\\"));
        assert!(!mpr.contains("KM="));
    }

    #[test]
    fn test_drill_record_offset_applied() {
        let mut ctx = ExportContext::new();
        ctx.operations.push(Operation::Drill {
            x: 10.0,
            y: 20.0,
            depth: 12.0,
            tool: 5,
        });

        let options = PostOptions::default();
        let offset = CoordinateOffset {
            dx: 3.0,
            dy: -2.0,
            dz: 0.0,
        };
        let serializer = MprSerializer::new(&options, offset);
        let mpr = serializer.generate(
            &ctx,
            &WorkpieceDimensions::default(),
            None,
            &mut NullSink,
        );

        assert!(mpr.contains("<102 \\BohrVert\\"));
        assert!(mpr.contains("XA=\"13.000\""));
        assert!(mpr.contains("YA=\"18.000\""));
        assert!(mpr.contains("TI=\"12.000\""));
        assert!(mpr.contains("TNO=\"5\""));
    }

    #[test]
    fn test_z_offset_suppression() {
        let mut ctx = ExportContext::new();
        let id = ctx.next_contour_id();
        ctx.contours.push(Contour {
            id,
            elements: vec![ContourElement::Line {
                end: Point3::new(10.0, 0.0, -4.0),
            }],
            start_pos: Point3::default(),
            label: "Plunge".to_string(),
        });

        let mut options = PostOptions::default();
        options.keep_z_reference = true;
        let offset = CoordinateOffset {
            dx: 1.0,
            dy: 1.0,
            dz: 4.0,
        };
        let serializer = MprSerializer::new(&options, offset);
        let mpr = serializer.generate(
            &ctx,
            &WorkpieceDimensions::default(),
            None,
            &mut NullSink,
        );

        // X/Y shifted, Z untouched.
        assert!(mpr.contains("X=11.000"));
        assert!(mpr.contains("Z=-4.000"));
        assert!(!mpr.contains("Z=0.000\r\n.X=11.000"));
    }
}
