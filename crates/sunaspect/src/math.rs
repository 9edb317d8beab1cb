//! Numeric primitives: line fitting, mode over small bags, rotation, moments.

use nalgebra::{Matrix2, Vector2};

use crate::types::{CoordList, PixelPoint};

/// Result of a straight-line least-squares fit.
#[derive(Debug, Clone, Copy)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
    /// Condition number of the 2×2 normal matrix (larger over smaller
    /// eigenvalue). Infinite for a singular system.
    pub condition: f64,
}

/// Fit `y = intercept + slope · x` by solving the 2×2 normal equations on
/// abscissae centered about their mean.
///
/// Centering decouples the normal matrix, so its condition number measures
/// the geometry of the sample spread rather than the distance of the data
/// from the origin; that is what makes a fixed condition gate usable on
/// frame coordinates. A singular or empty system yields non-finite
/// coefficients.
pub fn fit_line(x: &[f64], y: &[f64]) -> LineFit {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len() as f64;
    let x_bar = x.iter().sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut sy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let xc = xi - x_bar;
        sxx += xc * xc;
        sxy += xc * yi;
        sy += yi;
    }

    // Centered abscissae zero the off-diagonal terms analytically.
    let a = Matrix2::new(sxx, 0.0, 0.0, n);
    let eig = a.symmetric_eigenvalues();
    let (lo, hi) = if eig[0].abs() < eig[1].abs() {
        (eig[0].abs(), eig[1].abs())
    } else {
        (eig[1].abs(), eig[0].abs())
    };
    let condition = hi / lo;

    match a.lu().solve(&Vector2::new(sxy, sy)) {
        Some(sol) => {
            let slope = sol[0];
            let mean_y = sol[1];
            LineFit {
                intercept: mean_y - slope * x_bar,
                slope,
                condition,
            }
        }
        None => LineFit {
            intercept: f64::NAN,
            slope: f64::NAN,
            condition,
        },
    }
}

/// Values with maximum frequency in `bag`. More than one entry means a tie;
/// order within the result is unspecified. Empty input gives an empty result.
///
/// A flat scan beats any hash structure at the bag sizes seen here (≤ ~28).
pub fn mode(bag: &[i32]) -> Vec<i32> {
    let mut best: Vec<i32> = Vec::new();
    let mut best_count = 0usize;
    for (i, &v) in bag.iter().enumerate() {
        if bag[..i].contains(&v) {
            continue;
        }
        let count = bag[i..].iter().filter(|&&w| w == v).count();
        if count > best_count {
            best.clear();
            best.push(v);
            best_count = count;
        } else if count == best_count {
            best.push(v);
        }
    }
    best
}

/// Rotate `p` by `angle_deg` degrees about the origin.
pub fn rotate_deg(angle_deg: f32, p: PixelPoint) -> PixelPoint {
    let (s, c) = angle_deg.to_radians().sin_cos();
    PixelPoint::new(c * p.x - s * p.y, s * p.x + c * p.y)
}

/// Rotate every point by `angle_deg` degrees about the origin.
pub fn rotate_all(angle_deg: f32, points: &[PixelPoint]) -> CoordList {
    points.iter().map(|&p| rotate_deg(angle_deg, p)).collect()
}

/// Arithmetic mean; NaN on empty input (callers gate on emptiness).
pub fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation about `mean`; NaN on empty input.
pub fn population_std(values: &[f32], mean: f32) -> f32 {
    let ss: f32 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / values.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_line_recovers_exact_line() {
        let x = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let y: Vec<f64> = x.iter().map(|v| 3.5 - 2.0 * v).collect();
        let fit = fit_line(&x, &y);
        assert!((fit.intercept - 3.5).abs() < 1e-9);
        assert!((fit.slope + 2.0).abs() < 1e-9);
        assert!(fit.condition.is_finite());
    }

    #[test]
    fn fit_line_condition_blows_up_for_degenerate_abscissae() {
        // All samples at the same x: the normal matrix is singular.
        let x = [4.0, 4.0, 4.0];
        let y = [1.0, 2.0, 3.0];
        let fit = fit_line(&x, &y);
        assert!(fit.condition > 1e12);
    }

    #[test]
    fn fit_line_single_point_is_non_finite() {
        let fit = fit_line(&[1.0], &[5.0]);
        assert!(!fit.slope.is_finite() || !fit.intercept.is_finite() || fit.condition > 1e12);
    }

    #[test]
    fn mode_unique_tie_and_empty() {
        assert_eq!(mode(&[3, 1, 3, 2]), vec![3]);
        let tie = mode(&[1, 2, 1, 2]);
        assert_eq!(tie.len(), 2);
        assert!(tie.contains(&1) && tie.contains(&2));
        assert!(mode(&[]).is_empty());
        assert_eq!(mode(&[-4]), vec![-4]);
    }

    #[test]
    fn rotation_quarter_turn() {
        let p = rotate_deg(90.0, PixelPoint::new(1.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn moments_of_constant_sequence() {
        let xs = [7.0_f32; 4];
        let m = mean(&xs);
        assert!((m - 7.0).abs() < 1e-6);
        assert!(population_std(&xs, m).abs() < 1e-6);
        assert!(mean(&[]).is_nan());
    }
}
