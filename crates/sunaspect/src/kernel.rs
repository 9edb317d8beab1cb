//! Matched-filter template for the fiducial cross marks.
//!
//! An ideal cross is drawn at the configured arm length and width, and every
//! cell gets a signed Gaussian-of-distance to the nearest cell of the
//! opposite class:
//!
//! ```text
//! k(m,n) = sign(on(m,n)) · (−d²/2) · exp(−d · nearest_distance),  d = 20
//! ```
//!
//! after which the template is normalized to [−1, 1]. The result responds
//! sharply at the inside/outside boundary of a cross-shaped shadow and is
//! near zero elsewhere.

use crate::roi::safe_range;

const EDGE: i64 = 1;
const DECAY: f32 = 20.0;

/// Square matched-filter template, regenerated when the cross geometry
/// parameters change.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FiducialKernel {
    /// Side length in pixels.
    pub side: usize,
    /// Row-major cell values in [−1, 1].
    pub data: Vec<f32>,
    /// Geometry this template was generated for: (length, width).
    pub key: (i32, i32),
}

impl FiducialKernel {
    #[inline]
    pub fn get(&self, m: usize, n: usize) -> f32 {
        self.data[m * self.side + n]
    }

    /// Half-side used to convert correlation coordinates to image coordinates.
    pub fn half(&self) -> usize {
        self.side / 2
    }
}

/// Generate the template for the given cross arm length and width.
pub(crate) fn generate_kernel(length: i32, width: i32) -> FiducialKernel {
    let side = (2 * (length as i64 / 2 + EDGE) + 1) as usize;

    // Ideal cross: vertical and horizontal bars of the configured width,
    // inset by one cell from the template border.
    let arm = safe_range(EDGE, side as i64 - EDGE, side);
    let bar = safe_range(
        length as i64 / 2 + 1 - width as i64 / 2,
        length as i64 / 2 + 1 + width as i64 / 2 + 1,
        side,
    );
    let on = |m: usize, n: usize| -> bool {
        (arm.contains(&m) && bar.contains(&n)) || (bar.contains(&m) && arm.contains(&n))
    };

    let mut data = vec![0.0f32; side * side];
    for m in 0..side {
        for n in 0..side {
            let inside = on(m, n);
            let mut nearest = f32::INFINITY;
            for p in 0..side {
                for q in 0..side {
                    if on(p, q) != inside {
                        let dm = m as f32 - p as f32;
                        let dn = n as f32 - q as f32;
                        let dist = (dm * dm + dn * dn).sqrt();
                        if dist < nearest {
                            nearest = dist;
                        }
                    }
                }
            }
            let sign = if inside { 1.0 } else { -1.0 };
            data[m * side + n] = sign * (-DECAY * DECAY / 2.0) * (-DECAY * nearest).exp();
        }
    }

    // Normalize to [−1, 1].
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in &data {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let span = hi - lo;
    for v in &mut data {
        *v = 2.0 * (*v - lo) / span - 1.0;
    }

    FiducialKernel {
        side,
        data,
        key: (length, width),
    }
}
