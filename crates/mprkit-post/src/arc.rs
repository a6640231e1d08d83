//! Arc geometry resolution
//!
//! Derives start/end angles from raw arc parameters, validates the
//! declared radius against the actual chord geometry, guards the 180°
//! feasibility case, and classifies arcs as CW/CCW × small/large for the
//! 2-bit MPR direction code.

use mprkit_core::{ArcDirection, EventSink, ExportEvent, Point3, TOLERANCE};
use std::f64::consts::PI;
use tracing::warn;

/// Angular window around π treated as a semicircle
pub const SEMICIRCLE_EPSILON: f64 = 0.001;

/// Bound on radius-correction passes for infeasible semicircles
const MAX_RADIUS_CORRECTIONS: usize = 8;

/// Compute start/end angles around a center and normalize the end angle
/// so the sweep matches the declared direction: CCW sweeps are
/// non-negative, CW sweeps non-positive.
pub fn arc_angles(
    start: Point3,
    center: (f64, f64),
    end: Point3,
    direction: ArcDirection,
) -> (f64, f64) {
    let start_angle = (start.y - center.1).atan2(start.x - center.0);
    let mut end_angle = (end.y - center.1).atan2(end.x - center.0);

    match direction {
        ArcDirection::Ccw if end_angle < start_angle => end_angle += 2.0 * PI,
        ArcDirection::Cw if end_angle > start_angle => end_angle -= 2.0 * PI,
        _ => {}
    }

    (start_angle, end_angle)
}

/// Angles of a straight segment: in-plane angle (WI) and the angle to
/// the XY plane (WZ), both in radians
pub fn line_angles(from: Point3, to: Point3) -> (f64, f64) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dz = to.z - from.z;

    let wi = if dx.abs() > TOLERANCE || dy.abs() > TOLERANCE {
        dy.atan2(dx)
    } else {
        0.0
    };

    let xy_length = (dx * dx + dy * dy).sqrt();
    let wz = if xy_length > TOLERANCE {
        dz.atan2(xy_length)
    } else {
        0.0
    };

    (wi, wz)
}

/// An arc with fully derived geometry, ready for serialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedArc {
    /// Absolute center in the same frame as the arc's endpoints
    pub center: (f64, f64),
    /// Angle from center to the start point
    pub start_angle: f64,
    /// Angle from center to the end point, direction-normalized
    pub end_angle: f64,
    /// Validated radius
    pub radius: f64,
    /// Sweep direction
    pub direction: ArcDirection,
}

impl ResolvedArc {
    /// Magnitude of the angular sweep
    pub fn sweep(&self) -> f64 {
        (self.end_angle - self.start_angle).abs()
    }

    /// True when the sweep does not exceed a half turn
    pub fn is_small(&self) -> bool {
        self.sweep() <= PI + SEMICIRCLE_EPSILON
    }

    /// MPR direction code: CW-small=0, CCW-small=1, CW-large=2, CCW-large=3
    pub fn direction_code(&self) -> u8 {
        match (self.direction, self.is_small()) {
            (ArcDirection::Cw, true) => 0,
            (ArcDirection::Ccw, true) => 1,
            (ArcDirection::Cw, false) => 2,
            (ArcDirection::Ccw, false) => 3,
        }
    }
}

/// Resolve an arc from its previous point, end point, and center offset.
///
/// `prev` and `end` must be in the same coordinate frame; the center is
/// reconstructed as `prev + offset` and therefore tracks that frame.
/// Returns `None` for degenerate arcs whose resolved radius stays below
/// tolerance; the caller must still advance its cursor.
pub fn resolve_arc(
    prev: Point3,
    end: Point3,
    center_offset: (f64, f64),
    declared_radius: f64,
    direction: ArcDirection,
    sink: &mut dyn EventSink,
) -> Option<ResolvedArc> {
    let center = (prev.x + center_offset.0, prev.y + center_offset.1);

    let d_start = ((prev.x - center.0).powi(2) + (prev.y - center.1).powi(2)).sqrt();
    let d_end = ((end.x - center.0).powi(2) + (end.y - center.1).powi(2)).sqrt();

    let mut radius = if declared_radius > TOLERANCE {
        if (declared_radius - d_start).abs() > TOLERANCE
            || (declared_radius - d_end).abs() > TOLERANCE
        {
            let corrected = (d_start + d_end) / 2.0;
            warn!(
                "Arc radius {:.3} disagrees with chord geometry ({:.3}/{:.3}), using {:.3}",
                declared_radius, d_start, d_end, corrected
            );
            sink.record(ExportEvent::RadiusCorrected {
                declared: declared_radius,
                corrected,
            });
            corrected
        } else {
            declared_radius
        }
    } else {
        (d_start * d_end).sqrt()
    };

    let (start_angle, end_angle) = arc_angles(prev, center, end, direction);
    let sweep = (end_angle - start_angle).abs();

    // A semicircle's chord is its diameter. Infeasible combinations get
    // the radius raised rather than failing the export.
    if (sweep - PI).abs() <= SEMICIRCLE_EPSILON {
        let chord = prev.xy_distance_to(&end);
        let mut attempts = 0;
        while chord > 2.0 * radius && attempts < MAX_RADIUS_CORRECTIONS {
            radius = chord / 2.0 + SEMICIRCLE_EPSILON;
            attempts += 1;
        }
        if attempts > 0 {
            warn!(
                "Semicircle chord {:.3} exceeded diameter, radius raised to {:.3}",
                chord, radius
            );
            sink.record(ExportEvent::SemicircleAdjusted { chord, radius });
        }
    }

    if radius < TOLERANCE {
        warn!("Dropping degenerate arc to X{:.3} Y{:.3}", end.x, end.y);
        sink.record(ExportEvent::DegenerateArcDropped { x: end.x, y: end.y });
        return None;
    }

    Some(ResolvedArc {
        center,
        start_angle,
        end_angle,
        radius,
        direction,
    })
}
