//! Data model for the MPR export pipeline
//!
//! This module provides:
//! - Motion commands as delivered by the host application
//! - Contour elements (lines, arcs) reconstructed from the command stream
//! - Operations (drilling, contour milling, pocket milling)
//! - Workpiece dimensions and the serialization-time coordinate offset

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Movement tolerance in millimeters. Displacements at or below this
/// threshold do not produce contour elements; radii below it are degenerate.
pub const TOLERANCE: f64 = 0.001;

/// Default tool number when the host supplies none.
pub const DEFAULT_TOOL: u32 = 101;

/// A point in 3D machine space (millimeters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Point3 {
    /// Create a new point
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite() && z.is_finite(),
            "Point3 axes must be finite: x={x}, y={y}, z={z}"
        );
        Self { x, y, z }
    }

    /// Distance to another point in the XY plane
    pub fn xy_distance_to(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
    }
}

/// Arc sweep direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    /// Clockwise (G2)
    Cw,
    /// Counter-clockwise (G3)
    Ccw,
}

impl fmt::Display for ArcDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcDirection::Cw => write!(f, "CW"),
            ArcDirection::Ccw => write!(f, "CCW"),
        }
    }
}

/// Broad classification of a motion command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// Rapid positioning move (G0)
    Rapid,
    /// Linear feed move (G1)
    Linear,
    /// Circular arc (G2/G3)
    Arc(ArcDirection),
    /// Canned drilling cycle (G81/G82/G83)
    DrillCycle,
}

/// A single motion command from the host's toolpath, with placement
/// already applied. Parameters map axis/parameter letters to values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    /// Command name, e.g. "G0", "G1", "G2", "G81", "T3"
    pub name: String,
    /// Parameter letter to value, e.g. X, Y, Z, I, J, R, D
    pub params: BTreeMap<char, f64>,
}

impl MotionCommand {
    /// Create a command from a name and parameter pairs
    pub fn new(name: &str, params: &[(char, f64)]) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().copied().collect(),
        }
    }

    /// Get a parameter value, or a default when the letter is absent
    pub fn param_or(&self, letter: char, default: f64) -> f64 {
        self.params.get(&letter).copied().unwrap_or(default)
    }

    /// Classify the command name into a motion kind, if it is one the
    /// contour pipeline understands
    pub fn motion_kind(&self) -> Option<MotionKind> {
        match self.name.as_str() {
            "G0" | "G00" => Some(MotionKind::Rapid),
            "G1" | "G01" => Some(MotionKind::Linear),
            "G2" | "G02" => Some(MotionKind::Arc(ArcDirection::Cw)),
            "G3" | "G03" => Some(MotionKind::Arc(ArcDirection::Ccw)),
            "G81" | "G82" | "G83" => Some(MotionKind::DrillCycle),
            _ => None,
        }
    }

    /// Tool number when this is a tool-change command ("T3" -> 3)
    pub fn tool_number(&self) -> Option<u32> {
        self.name.strip_prefix('T').and_then(|n| n.parse().ok())
    }
}

/// One element of a contour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContourElement {
    /// Straight segment to an absolute end point
    Line {
        /// Absolute end point
        end: Point3,
    },
    /// Circular arc to an absolute end point. The center is expressed as
    /// an offset from the previous element's end point (or the contour
    /// start), in the same pre-offset frame as that point.
    Arc {
        /// Absolute end point
        end: Point3,
        /// Center offset (I, J) from the previous point
        center_offset: (f64, f64),
        /// Radius as declared by the command (`sqrt(i*i + j*j)`)
        radius: f64,
        /// Sweep direction
        direction: ArcDirection,
    },
}

impl ContourElement {
    /// Absolute end point of the element
    pub fn end(&self) -> Point3 {
        match self {
            ContourElement::Line { end } => *end,
            ContourElement::Arc { end, .. } => *end,
        }
    }
}

/// An ordered, named sequence of line/arc elements describing a 2.5D
/// toolpath boundary for one milling or routing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Sequential id, starting at 1 within one export run
    pub id: u32,
    /// Ordered elements; `elements[0]` follows `start_pos`
    pub elements: Vec<ContourElement>,
    /// Position of the cursor before the first movement command
    pub start_pos: Point3,
    /// Human-readable label from the host operation
    pub label: String,
}

/// MPR schema tag for vertical drilling records
pub const DRILL_SCHEMA_ID: u32 = 102;
/// MPR schema tag for contour milling records
pub const CONTOUR_MILL_SCHEMA_ID: u32 = 105;
/// MPR schema tag for pocket milling records
pub const POCKET_MILL_SCHEMA_ID: u32 = 107;

/// A machining operation record. The schema id is a per-kind tag in the
/// output format, not a unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Vertical drilling at a position
    Drill {
        /// Hole center X
        x: f64,
        /// Hole center Y
        y: f64,
        /// Drilling depth (positive, surface-referenced)
        depth: f64,
        /// Tool number
        tool: u32,
    },
    /// Milling along a contour
    ContourMill {
        /// Referenced contour id
        contour_id: u32,
        /// Tool number
        tool: u32,
        /// Operation label
        label: String,
    },
    /// Pocket clearing bounded by a contour
    PocketMill {
        /// Referenced contour id
        contour_id: u32,
        /// Tool number
        tool: u32,
    },
}

impl Operation {
    /// Schema tag used in the MPR record header
    pub fn schema_id(&self) -> u32 {
        match self {
            Operation::Drill { .. } => DRILL_SCHEMA_ID,
            Operation::ContourMill { .. } => CONTOUR_MILL_SCHEMA_ID,
            Operation::PocketMill { .. } => POCKET_MILL_SCHEMA_ID,
        }
    }

    /// Tool number used by the operation
    pub fn tool(&self) -> u32 {
        match self {
            Operation::Drill { tool, .. }
            | Operation::ContourMill { tool, .. }
            | Operation::PocketMill { tool, .. } => *tool,
        }
    }
}

/// Rigid translation applied to absolute coordinates at serialization
/// time only. Stored geometry is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoordinateOffset {
    /// X translation
    pub dx: f64,
    /// Y translation
    pub dy: f64,
    /// Z translation
    pub dz: f64,
}

impl CoordinateOffset {
    /// Offset that moves `minimum` onto the origin
    pub fn to_origin(minimum: Point3) -> Self {
        Self {
            dx: -minimum.x,
            dy: -minimum.y,
            dz: -minimum.z,
        }
    }

    /// True when all components are zero
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.dz == 0.0
    }
}

/// Workpiece dimensions and stock oversizes used by the MPR header and
/// workpiece record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkpieceDimensions {
    /// Length in X (mm)
    pub length: f64,
    /// Width in Y (mm)
    pub width: f64,
    /// Thickness in Z (mm)
    pub thickness: f64,
    /// Stock oversize per edge in X (front null X)
    pub extent_x: f64,
    /// Stock oversize per edge in Y (front null Y)
    pub extent_y: f64,
    /// Clearance height above the part (mm)
    pub clearance: f64,
}

impl Default for WorkpieceDimensions {
    fn default() -> Self {
        Self {
            length: 800.0,
            width: 600.0,
            thickness: 20.0,
            extent_x: 0.0,
            extent_y: 0.0,
            clearance: 20.0,
        }
    }
}
