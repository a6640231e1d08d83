//! Command normalization
//!
//! Walks the motion commands of one operation, tracking the cursor
//! position, and converts them into contour elements. Commands carry
//! absolute coordinates; letters missing from a command default to the
//! cursor value. Arcs that change Z mid-sweep are not representable in
//! the MPR format and get discretized into short line segments.

use crate::arc::arc_angles;
use mprkit_core::{
    ArcDirection, ContourElement, EventSink, ExportEvent, MotionCommand, MotionKind, Point3,
    TOLERANCE,
};
use tracing::{debug, warn};

/// Degrees of sweep per discretization segment
const DEGREES_PER_SEGMENT: f64 = 5.0;

/// Minimum number of segments when discretizing an arc
const MIN_SEGMENTS: usize = 8;

/// Result of normalizing one operation's command stream
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPath {
    /// Contour elements in path order
    pub elements: Vec<ContourElement>,
    /// Cursor position before the first movement command
    pub start_pos: Point3,
    /// Cursor position after the last command
    pub end_pos: Point3,
}

/// Stateful walker over one operation's motion commands
#[derive(Debug, Default)]
pub struct CommandNormalizer {
    cursor: Point3,
    start: Option<Point3>,
    elements: Vec<ContourElement>,
}

impl CommandNormalizer {
    /// Create a normalizer with the cursor at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a full command sequence
    pub fn normalize(commands: &[MotionCommand], sink: &mut dyn EventSink) -> NormalizedPath {
        let mut normalizer = Self::new();
        for cmd in commands {
            normalizer.feed(cmd, sink);
        }
        normalizer.finish()
    }

    /// Current cursor position
    pub fn cursor(&self) -> Point3 {
        self.cursor
    }

    /// Process one command. The cursor advances to the command's
    /// resolved position whether or not an element was emitted.
    pub fn feed(&mut self, cmd: &MotionCommand, sink: &mut dyn EventSink) {
        let target = Point3::new(
            cmd.param_or('X', self.cursor.x),
            cmd.param_or('Y', self.cursor.y),
            cmd.param_or('Z', self.cursor.z),
        );

        match cmd.motion_kind() {
            Some(MotionKind::Rapid) | Some(MotionKind::Linear) => {
                if self.start.is_none() {
                    self.start = Some(self.cursor);
                }
                if self.displaces(target) {
                    self.elements.push(ContourElement::Line { end: target });
                }
            }
            Some(MotionKind::Arc(direction)) => {
                if self.start.is_none() {
                    self.start = Some(self.cursor);
                }
                self.feed_arc(cmd, target, direction, sink);
            }
            // Drill cycles are extracted separately; other commands
            // (tool changes, compensation) carry no contour geometry.
            _ => {}
        }

        self.cursor = target;
    }

    /// Consume the normalizer, yielding the collected path
    pub fn finish(self) -> NormalizedPath {
        NormalizedPath {
            elements: self.elements,
            start_pos: self.start.unwrap_or_default(),
            end_pos: self.cursor,
        }
    }

    fn displaces(&self, target: Point3) -> bool {
        (target.x - self.cursor.x).abs() > TOLERANCE
            || (target.y - self.cursor.y).abs() > TOLERANCE
            || (target.z - self.cursor.z).abs() > TOLERANCE
    }

    fn feed_arc(
        &mut self,
        cmd: &MotionCommand,
        target: Point3,
        direction: ArcDirection,
        sink: &mut dyn EventSink,
    ) {
        let i = cmd.param_or('I', 0.0);
        let j = cmd.param_or('J', 0.0);
        let radius = (i * i + j * j).sqrt();

        if radius < TOLERANCE {
            if self.displaces(target) {
                warn!(
                    "Arc command without usable center offset to X{:.3} Y{:.3}, dropped",
                    target.x, target.y
                );
                sink.record(ExportEvent::DegenerateArcDropped {
                    x: target.x,
                    y: target.y,
                });
            }
            return;
        }

        if (target.z - self.cursor.z).abs() > TOLERANCE {
            self.discretize_arc(target, (i, j), radius, direction, sink);
        } else {
            self.elements.push(ContourElement::Arc {
                end: target,
                center_offset: (i, j),
                radius,
                direction,
            });
        }
    }

    /// Out-of-plane arcs become line segments with linearly interpolated Z
    fn discretize_arc(
        &mut self,
        target: Point3,
        offset: (f64, f64),
        radius: f64,
        direction: ArcDirection,
        sink: &mut dyn EventSink,
    ) {
        let center = (self.cursor.x + offset.0, self.cursor.y + offset.1);
        let (start_angle, end_angle) = arc_angles(self.cursor, center, target, direction);
        let sweep = end_angle - start_angle;

        let segments = ((sweep.abs().to_degrees() / DEGREES_PER_SEGMENT).round() as usize)
            .max(MIN_SEGMENTS);

        for seg in 1..=segments {
            let t = seg as f64 / segments as f64;
            let angle = start_angle + sweep * t;
            let end = Point3::new(
                center.0 + radius * angle.cos(),
                center.1 + radius * angle.sin(),
                self.cursor.z + (target.z - self.cursor.z) * t,
            );
            self.elements.push(ContourElement::Line { end });
        }

        debug!(
            "Arc with Z change ({:.3} -> {:.3}) split into {} segments",
            self.cursor.z, target.z, segments
        );
        sink.record(ExportEvent::ArcDiscretized { segments });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mprkit_core::{NullSink, RecordingSink};

    fn normalize(commands: &[MotionCommand]) -> NormalizedPath {
        CommandNormalizer::normalize(commands, &mut NullSink)
    }

    #[test]
    fn test_start_position_is_pre_move_cursor() {
        let path = normalize(&[
            MotionCommand::new("G0", &[('X', 5.0), ('Y', 5.0), ('Z', 2.0)]),
            MotionCommand::new("G1", &[('X', 15.0)]),
        ]);
        assert_eq!(path.start_pos, Point3::default());
        assert_eq!(path.elements.len(), 2);
    }

    #[test]
    fn test_missing_letters_default_to_cursor() {
        let path = normalize(&[
            MotionCommand::new("G1", &[('X', 10.0)]),
            MotionCommand::new("G1", &[('Y', 4.0)]),
        ]);
        assert_eq!(
            path.elements[1].end(),
            Point3::new(10.0, 4.0, 0.0),
        );
    }

    #[test]
    fn test_sub_tolerance_moves_emit_nothing_but_advance() {
        let path = normalize(&[
            MotionCommand::new("G1", &[('X', 0.0005)]),
            MotionCommand::new("G1", &[('X', 0.0009), ('Y', 0.0004)]),
        ]);
        assert!(path.elements.is_empty());
        assert_eq!(path.end_pos, Point3::new(0.0009, 0.0004, 0.0));
    }

    #[test]
    fn test_planar_arc_kept_as_arc() {
        let path = normalize(&[
            MotionCommand::new("G1", &[('X', 10.0)]),
            MotionCommand::new("G2", &[('X', 20.0), ('Y', 10.0), ('I', 10.0), ('J', 0.0)]),
        ]);

        assert_eq!(path.elements.len(), 2);
        match &path.elements[1] {
            ContourElement::Arc {
                end,
                center_offset,
                radius,
                direction,
            } => {
                assert_eq!(*end, Point3::new(20.0, 10.0, 0.0));
                assert_eq!(*center_offset, (10.0, 0.0));
                assert!((radius - 10.0).abs() < 1e-9);
                assert_eq!(*direction, ArcDirection::Cw);
            }
            other => panic!("expected arc, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_plane_arc_discretized() {
        let mut sink = RecordingSink::new();
        let path = CommandNormalizer::normalize(
            &[
                MotionCommand::new("G1", &[('X', 10.0)]),
                // Quarter arc descending 2mm: 90° / 5° = 18 segments.
                MotionCommand::new(
                    "G3",
                    &[('X', 0.0), ('Y', 10.0), ('Z', -2.0), ('I', -10.0), ('J', 0.0)],
                ),
            ],
            &mut sink,
        );

        let lines = path
            .elements
            .iter()
            .filter(|e| matches!(e, ContourElement::Line { .. }))
            .count();
        assert_eq!(lines, path.elements.len());
        assert_eq!(path.elements.len(), 1 + 18);

        // Z interpolates linearly down to the arc end.
        let last = path.elements.last().unwrap().end();
        assert!((last.x - 0.0).abs() < 1e-9);
        assert!((last.y - 10.0).abs() < 1e-9);
        assert!((last.z + 2.0).abs() < 1e-9);

        assert_eq!(
            sink.count_matching(|e| matches!(e, ExportEvent::ArcDiscretized { segments: 18 })),
            1
        );
    }

    #[test]
    fn test_small_out_of_plane_arc_gets_minimum_segments() {
        // A 20° sweep would only be 4 segments at 5°/segment; the floor
        // of 8 applies.
        let path = normalize(&[MotionCommand::new(
            "G2",
            &[
                ('X', 0.060307),
                ('Y', 0.342020),
                ('Z', -0.5),
                ('I', 1.0),
                ('J', 0.0),
            ],
        )]);
        assert_eq!(path.elements.len(), MIN_SEGMENTS);
    }

    #[test]
    fn test_degenerate_arc_dropped_with_event() {
        let mut sink = RecordingSink::new();
        let path = CommandNormalizer::normalize(
            &[MotionCommand::new(
                "G2",
                &[('X', 10.0), ('Y', 0.0), ('I', 0.0), ('J', 0.0)],
            )],
            &mut sink,
        );

        assert!(path.elements.is_empty());
        // Cursor still advanced past the dropped arc.
        assert_eq!(path.end_pos, Point3::new(10.0, 0.0, 0.0));
        assert_eq!(
            sink.count_matching(|e| matches!(e, ExportEvent::DegenerateArcDropped { .. })),
            1
        );
    }

    #[test]
    fn test_empty_commands_yield_origin_start() {
        let path = normalize(&[]);
        assert!(path.elements.is_empty());
        assert_eq!(path.start_pos, Point3::default());
    }

    #[test]
    fn test_non_motion_commands_ignored() {
        let path = normalize(&[
            MotionCommand::new("T3", &[]),
            MotionCommand::new("G41", &[('D', 3.0)]),
            MotionCommand::new("G1", &[('X', 10.0)]),
        ]);
        assert_eq!(path.elements.len(), 1);
        assert_eq!(path.start_pos, Point3::default());
    }
}
