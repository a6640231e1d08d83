//! Minimum-point location
//!
//! Finds the minimum (X, Y, Z) touched by any point in the model. Arc
//! endpoints are not enough: the true minimum of an arc can lie strictly
//! between them, so the fold also covers reconstructed centers and the
//! axis-aligned extrema `center ± radius` in X and Y.

use crate::context::ExportContext;
use mprkit_core::{Contour, ContourElement, Operation, Point3, TOLERANCE};

fn fold_min(slot: &mut Option<f64>, value: f64) {
    match slot {
        Some(current) if *current <= value => {}
        _ => *slot = Some(value),
    }
}

/// Minimum coordinates over all contours and operations, `(0,0,0)` when
/// the model holds no geometry
pub fn part_minimum(contours: &[Contour], operations: &[Operation]) -> Point3 {
    let mut min_x: Option<f64> = None;
    let mut min_y: Option<f64> = None;
    let mut min_z: Option<f64> = None;

    for contour in contours {
        fold_min(&mut min_x, contour.start_pos.x);
        fold_min(&mut min_y, contour.start_pos.y);
        fold_min(&mut min_z, contour.start_pos.z);

        let mut prev = contour.start_pos;
        for elem in &contour.elements {
            let end = elem.end();
            fold_min(&mut min_x, end.x);
            fold_min(&mut min_y, end.y);
            fold_min(&mut min_z, end.z);

            if let ContourElement::Arc {
                center_offset,
                radius,
                ..
            } = elem
            {
                let center_x = prev.x + center_offset.0;
                let center_y = prev.y + center_offset.1;
                fold_min(&mut min_x, center_x);
                fold_min(&mut min_y, center_y);

                // Arcs are planar: the radius widens X/Y only.
                if *radius > TOLERANCE {
                    fold_min(&mut min_x, center_x - radius);
                    fold_min(&mut min_y, center_y - radius);
                }
            }

            prev = end;
        }
    }

    for op in operations {
        if let Operation::Drill { x, y, depth, .. } = op {
            fold_min(&mut min_x, *x);
            fold_min(&mut min_y, *y);
            // Drilling depth is surface-referenced, pointing down.
            fold_min(&mut min_z, -depth);
        }
    }

    Point3::new(
        min_x.unwrap_or(0.0),
        min_y.unwrap_or(0.0),
        min_z.unwrap_or(0.0),
    )
}

/// Minimum over a full export context
pub fn context_minimum(ctx: &ExportContext) -> Point3 {
    part_minimum(&ctx.contours, &ctx.operations)
}
