//! Pixel→screen mapping from identified fiducials.
//!
//! The reticle's physical geometry makes the screen position of a lattice
//! identity piecewise-quadratic in the index (the step between marks grows
//! by 6 units per index, with the slightly different 45/48-unit base on the
//! two sides of the missing central row), plus a cross-axis shear term. The
//! mapping itself is a per-axis affine fit from pixel coordinates to those
//! screen positions.

use crate::math::fit_line;
use crate::types::{CoordList, FiducialId, PixelPoint, ScreenPoint};

/// Screen position (micrometers) of a lattice identity.
pub fn fiducial_id_to_screen(col: i32, row: i32) -> ScreenPoint {
    let quad = |v: i32| -> i32 {
        if v >= 0 {
            45 * v + 3 * v * (v - 1)
        } else {
            48 * v - 3 * v * (v + 1)
        }
    };
    ScreenPoint::new(
        (6 * (quad(col) - 15 * row)) as f32,
        (6 * (quad(row) + 15 * col)) as f32,
    )
}

/// Per-axis affine mapping `[intercept_x, slope_x, intercept_y, slope_y]`
/// with the condition numbers of the two fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MappingFit {
    pub mapping: [f32; 4],
    pub condition: [f32; 2],
}

/// Fit the pixel→screen mapping from fiducials valid on both axes.
pub(crate) fn fit_mapping(fiducials: &CoordList, ids: &[FiducialId]) -> MappingFit {
    debug_assert_eq!(fiducials.len(), ids.len());
    let mut fit = MappingFit {
        mapping: [0.0; 4],
        condition: [0.0; 2],
    };

    let mut x: Vec<f64> = Vec::new();
    let mut y: Vec<f64> = Vec::new();
    for axis in 0..2usize {
        x.clear();
        y.clear();
        for (p, id) in fiducials.iter().zip(ids) {
            let (col, row) = match (id.col.known(), id.row.known()) {
                (Some(col), Some(row)) => (col, row),
                _ => continue,
            };
            let screen = fiducial_id_to_screen(col, row);
            if axis == 0 {
                x.push(p.x as f64);
                y.push(screen.x as f64);
            } else {
                x.push(p.y as f64);
                y.push(screen.y as f64);
            }
        }
        let line = fit_line(&x, &y);
        fit.mapping[2 * axis] = line.intercept as f32;
        fit.mapping[2 * axis + 1] = line.slope as f32;
        fit.condition[axis] = line.condition as f32;
    }

    tracing::debug!(
        points = x.len(),
        mapping = ?fit.mapping,
        condition = ?fit.condition,
        "mapping fit"
    );
    fit
}

/// Evaluate the per-axis affine mapping at a pixel position.
pub fn pixel_to_screen(mapping: &[f32; 4], p: PixelPoint) -> ScreenPoint {
    ScreenPoint::new(mapping[0] + mapping[1] * p.x, mapping[2] + mapping[3] * p.y)
}
