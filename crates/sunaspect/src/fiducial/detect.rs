//! Matched-filter fiducial detection within the solar sub-image.
//!
//! 1. Clip the sub-image at the robust frame maximum to suppress glint.
//! 2. Cross-correlate with the cross template (valid mode, unnormalized).
//! 3. Threshold at μ + kσ of the correlation and keep 4-connected strict
//!    local maxima.
//! 4. Reduce: merge candidates closer than two arm lengths (keep the
//!    stronger), cap the population at `num_fiducials` by evicting the
//!    weakest.
//! 5. Refine each survivor to sub-pixel with a thresholded centroid over the
//!    correlation neighborhood, then shift into frame coordinates.

use crate::config::AspectConfig;
use crate::kernel::FiducialKernel;
use crate::roi::{safe_range, SubFrame};
use crate::types::{CoordList, PixelPoint};

/// Integer-resolution candidate in correlation coordinates.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    m: usize,
    n: usize,
    value: f32,
}

/// Detect fiducial cross marks; returns sub-pixel positions in frame
/// coordinates.
pub(crate) fn find_pixel_fiducials(
    sub: &SubFrame<'_>,
    kernel: &FiducialKernel,
    frame_max: u8,
    config: &AspectConfig,
) -> CoordList {
    let side = kernel.side;
    if sub.width() < side || sub.height() < side {
        return CoordList::new();
    }

    // Clipped float copy of the sub-image: saturated glint above the robust
    // maximum would otherwise dominate the correlation.
    let clip = frame_max as f32;
    let w = sub.width();
    let h = sub.height();
    let mut input = vec![0.0f32; w * h];
    for y in 0..h {
        let row = sub.row(y);
        for x in 0..w {
            input[y * w + x] = (row[x] as f32).min(clip);
        }
    }

    // Valid-mode cross-correlation.
    let ch = h - side + 1;
    let cw = w - side + 1;
    let mut correlation = vec![0.0f32; ch * cw];
    for m in 0..ch {
        for n in 0..cw {
            let mut acc = 0.0f32;
            for i in 0..side {
                let row = &input[(m + i) * w + n..(m + i) * w + n + side];
                for (j, &px) in row.iter().enumerate() {
                    acc += px * kernel.get(i, j);
                }
            }
            correlation[m * cw + n] = acc;
        }
    }

    let count = (ch * cw) as f32;
    let mu = correlation.iter().sum::<f32>() / count;
    let sigma = (correlation.iter().map(|v| (v - mu) * (v - mu)).sum::<f32>() / count).sqrt();
    let primary = mu + config.fiducial_threshold * sigma;

    // Collect every 4-connected strict local maximum above the primary
    // threshold, then reduce; interleaving dedup with the scan is how the
    // heritage code grew delicate.
    let mut candidates: Vec<Candidate> = Vec::new();
    for m in 1..ch.saturating_sub(1) {
        for n in 1..cw.saturating_sub(1) {
            let v = correlation[m * cw + n];
            if v > primary
                && v > correlation[m * cw + n + 1]
                && v > correlation[m * cw + n - 1]
                && v > correlation[(m + 1) * cw + n]
                && v > correlation[(m - 1) * cw + n]
            {
                candidates.push(Candidate { m, n, value: v });
            }
        }
    }

    let cap = config.num_fiducials.max(0) as usize;
    let merge_dist = (2 * config.fiducial_length) as i64;
    let mut accepted: Vec<Candidate> = Vec::new();
    for cand in candidates {
        // Within two arm lengths (per axis) of an accepted mark: keep the
        // stronger of the two.
        let mut redundant = false;
        for acc in &mut accepted {
            if (acc.m as i64 - cand.m as i64).abs() < merge_dist
                && (acc.n as i64 - cand.n as i64).abs() < merge_dist
            {
                redundant = true;
                if cand.value > acc.value {
                    *acc = cand;
                }
                break;
            }
        }
        if redundant {
            continue;
        }
        if accepted.len() < cap {
            accepted.push(cand);
        } else if let Some(weakest) = accepted
            .iter_mut()
            .min_by(|a, b| a.value.total_cmp(&b.value))
        {
            if cand.value > weakest.value {
                *weakest = cand;
            }
        }
    }

    tracing::debug!(
        candidates = accepted.len(),
        mean = mu,
        std = sigma,
        "fiducial correlation"
    );

    // Sub-pixel refinement: centroid of correlation values above the
    // secondary threshold around each peak, then shift into frame
    // coordinates (sub-image origin plus template half-side).
    let secondary = mu + (config.fiducial_threshold / 2.0) * sigma;
    let window = config.fiducial_width as i64;
    let off_x = (sub.roi().x0 + kernel.half()) as f32;
    let off_y = (sub.roi().y0 + kernel.half()) as f32;

    let mut fiducials = CoordList::new();
    for acc in &accepted {
        let rows = safe_range(acc.m as i64 - window, acc.m as i64 + window + 1, ch);
        let cols = safe_range(acc.n as i64 - window, acc.n as i64 + window + 1, cw);
        let mut cm = 0.0f32;
        let mut cn = 0.0f32;
        let mut total = 0.0f32;
        for m in rows.clone() {
            for n in cols.clone() {
                let v = correlation[m * cw + n];
                if v > secondary {
                    cm += m as f32 * v;
                    cn += n as f32 * v;
                    total += v;
                }
            }
        }
        fiducials.push(PixelPoint::new(cn / total + off_x, cm / total + off_y));
    }

    // A zero-weight centroid divides out to NaN; drop it.
    fiducials.retain(|p| p.x.is_finite() && p.y.is_finite());
    fiducials
}
