//! Operation classification and drilling extraction
//!
//! Buckets a host operation into profile/drilling/pocket, preferring the
//! declared kind string and falling back to command inspection. The
//! fallback precedence is deliberate: a drill cycle anywhere in the
//! stream wins over arcs, which win over the plain-contour default.

use mprkit_core::{MotionCommand, MotionKind, Operation, PathOperation, Point3, DEFAULT_TOOL};

/// Classified operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Profile/contour routing along a path
    Profile,
    /// Vertical drilling positions
    Drilling,
    /// Pocket clearing bounded by a path
    Pocket,
}

/// Classify a host operation
pub fn classify(op: &PathOperation) -> OperationKind {
    if let Some(kind) = &op.kind {
        let kind = kind.to_lowercase();
        if kind.contains("profile") || kind.contains("contour") {
            return OperationKind::Profile;
        }
        if kind.contains("drill") {
            return OperationKind::Drilling;
        }
        if kind.contains("pocket") {
            return OperationKind::Pocket;
        }
    }

    let has_drilling = op
        .commands
        .iter()
        .any(|c| matches!(c.motion_kind(), Some(MotionKind::DrillCycle)));
    if has_drilling {
        return OperationKind::Drilling;
    }

    let has_arcs = op
        .commands
        .iter()
        .any(|c| matches!(c.motion_kind(), Some(MotionKind::Arc(_))));
    if has_arcs {
        return OperationKind::Profile;
    }

    OperationKind::Profile
}

/// Resolve the tool number for an operation: declared tool, else the
/// first tool-change command in the stream, else the default.
pub fn resolve_tool(op: &PathOperation) -> u32 {
    op.tool
        .or_else(|| op.commands.iter().find_map(MotionCommand::tool_number))
        .unwrap_or(DEFAULT_TOOL)
}

/// Extract drilling operations from a drilling-classified command stream.
///
/// Each drill cycle contributes one operation at its resolved position.
/// Depth is measured from the retract plane when an R word is present,
/// otherwise from the surface.
pub fn extract_drill_operations(op: &PathOperation) -> Vec<Operation> {
    let tool = resolve_tool(op);
    let mut cursor = Point3::default();
    let mut operations = Vec::new();

    for cmd in &op.commands {
        match cmd.motion_kind() {
            Some(MotionKind::DrillCycle) => {
                let x = cmd.param_or('X', cursor.x);
                let y = cmd.param_or('Y', cursor.y);
                let z = cmd.param_or('Z', cursor.z);
                let retract = cmd.param_or('R', 0.0);

                let depth = if retract != 0.0 {
                    (z - retract).abs()
                } else {
                    z.abs()
                };

                operations.push(Operation::Drill { x, y, depth, tool });
                cursor.x = x;
                cursor.y = y;
            }
            Some(MotionKind::Rapid) | Some(MotionKind::Linear) => {
                cursor = Point3::new(
                    cmd.param_or('X', cursor.x),
                    cmd.param_or('Y', cursor.y),
                    cmd.param_or('Z', cursor.z),
                );
            }
            _ => {}
        }
    }

    operations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_kind_wins() {
        let op = PathOperation {
            kind: Some("Profile".to_string()),
            // Drill cycle present, but the declared kind decides.
            commands: vec![MotionCommand::new("G81", &[('X', 1.0), ('Z', -5.0)])],
            ..Default::default()
        };
        assert_eq!(classify(&op), OperationKind::Profile);

        let op = PathOperation {
            kind: Some("PocketShape".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(&op), OperationKind::Pocket);
    }

    #[test]
    fn test_command_fallback_precedence() {
        // Drill cycle beats arcs.
        let op = PathOperation {
            commands: vec![
                MotionCommand::new("G2", &[('X', 1.0), ('I', 1.0)]),
                MotionCommand::new("G81", &[('X', 1.0), ('Z', -5.0)]),
            ],
            ..Default::default()
        };
        assert_eq!(classify(&op), OperationKind::Drilling);

        // Arcs without drilling classify as profile.
        let op = PathOperation {
            commands: vec![MotionCommand::new("G3", &[('X', 1.0), ('I', 1.0)])],
            ..Default::default()
        };
        assert_eq!(classify(&op), OperationKind::Profile);

        // Lines only: plain contour, also profile.
        let op = PathOperation {
            commands: vec![MotionCommand::new("G1", &[('X', 1.0)])],
            ..Default::default()
        };
        assert_eq!(classify(&op), OperationKind::Profile);
    }

    #[test]
    fn test_tool_resolution_chain() {
        let op = PathOperation {
            tool: Some(7),
            commands: vec![MotionCommand::new("T3", &[])],
            ..Default::default()
        };
        assert_eq!(resolve_tool(&op), 7);

        let op = PathOperation {
            commands: vec![MotionCommand::new("T3", &[])],
            ..Default::default()
        };
        assert_eq!(resolve_tool(&op), 3);

        assert_eq!(resolve_tool(&PathOperation::default()), DEFAULT_TOOL);
    }

    #[test]
    fn test_drill_extraction_depth_and_position() {
        let op = PathOperation {
            tool: Some(5),
            commands: vec![
                MotionCommand::new("G0", &[('X', 10.0), ('Y', 20.0)]),
                MotionCommand::new("G81", &[('Z', -12.0), ('R', 2.0)]),
                MotionCommand::new("G83", &[('X', 30.0), ('Y', 40.0), ('Z', -8.0)]),
            ],
            ..Default::default()
        };

        let ops = extract_drill_operations(&op);
        assert_eq!(ops.len(), 2);

        // First cycle inherits the rapid position; depth from R plane.
        assert_eq!(
            ops[0],
            Operation::Drill {
                x: 10.0,
                y: 20.0,
                depth: 14.0,
                tool: 5,
            }
        );
        // Second cycle has explicit position; depth from surface.
        assert_eq!(
            ops[1],
            Operation::Drill {
                x: 30.0,
                y: 40.0,
                depth: 8.0,
                tool: 5,
            }
        );
    }

    #[test]
    fn test_no_drill_cycles_yield_nothing() {
        let op = PathOperation {
            commands: vec![MotionCommand::new("G1", &[('X', 5.0)])],
            ..Default::default()
        };
        assert!(extract_drill_operations(&op).is_empty());
    }
}
