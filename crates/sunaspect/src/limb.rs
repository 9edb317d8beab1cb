//! Per-chord limb crossing detection.
//!
//! A chord is a full row or column of the search region. Each chord is
//! walked once to record threshold crossings, pruned of crossing pairs too
//! close together to be the solar disk (fiducial shadows, dust), and the
//! surviving pair of edges is refined to sub-pixel by a local linear fit.

use crate::config::AspectConfig;
use crate::math::fit_line;
use crate::roi::safe_range;

/// Frame-wide intensity thresholds derived from the robust min/max.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// Limb crossing level: min + limb_threshold · (max − min).
    pub lower: f32,
    /// Disk presence level: min + disk_threshold · (max − min).
    pub upper: f32,
}

impl Thresholds {
    /// Derive both thresholds from the robust extrema.
    pub fn from_min_max(min: u8, max: u8, config: &AspectConfig) -> Thresholds {
        let span = (max as f32) - (min as f32);
        Thresholds {
            lower: min as f32 + config.limb_threshold * span,
            upper: min as f32 + config.disk_threshold * span,
        }
    }
}

/// Why a chord produced no crossing pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordError {
    /// Too dim, no edges, or no single clean rising/falling pair.
    Unusable,
    /// Sub-pixel refinement produced a non-finite value.
    NonFinite,
    /// Sub-pixel refinement left its fit window.
    OutOfWindow,
}

/// One rising/falling crossing pair along a chord, in chord coordinates.
///
/// A virtual member stands in for the Sun running off the sensor: it is
/// reported verbatim as −1 (leading) or the chord length (trailing) with no
/// fitting, and flagged so the caller can apply the sensor-edge rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordPair {
    /// Rising crossing position.
    pub first: f32,
    /// Falling crossing position.
    pub second: f32,
    /// The rising member was synthesized at the chord start.
    pub first_virtual: bool,
    /// The falling member was synthesized at the chord end.
    pub second_virtual: bool,
}

impl ChordPair {
    /// Midpoint of the pair. Meaningful as a diameter midpoint only when
    /// neither member is virtual.
    pub fn midpoint(self) -> f32 {
        0.5 * (self.first + self.second)
    }

    /// True when either member was synthesized at a sensor edge.
    pub fn has_virtual(self) -> bool {
        self.first_virtual || self.second_virtual
    }
}

/// Find the limb crossing pair along one chord.
///
/// `slopes` collects |slope| of every accepted real-edge fit; steeper limbs
/// mean better focus, and the magnitudes double as a frame focus report.
pub fn find_limb_crossings(
    chord: &[u8],
    thresholds: Thresholds,
    config: &AspectConfig,
    slopes: &mut Vec<f32>,
) -> Result<ChordPair, ChordError> {
    let k_len = chord.len() as i64;
    if k_len < 2 {
        return Err(ChordError::Unusable);
    }
    let px_lower = thresholds.lower as u8;

    // Walk the chord once: rising crossings stored as +k (first index above
    // threshold), falling crossings as −(k−1) (last index above threshold).
    let mut edges: Vec<i64> = Vec::new();
    let mut last = chord[0];
    let mut chord_max = chord[0];
    for (k, &value) in chord.iter().enumerate().skip(1) {
        if value > chord_max {
            chord_max = value;
        }
        if last <= px_lower && value > px_lower {
            edges.push(k as i64);
        } else if last > px_lower && value <= px_lower {
            edges.push(-(k as i64 - 1));
        }
        last = value;
    }

    // A chord that never reaches the disk level cannot be crossing the Sun.
    if (chord_max as f32) < thresholds.upper {
        return Err(ChordError::Unusable);
    }

    if edges.is_empty() {
        return Err(ChordError::Unusable);
    } else if edges.len() == 1 {
        // A single transition is plausible only when the Sun is cut off at a
        // sensor edge: a lone falling edge within a solar diameter of the
        // chord start, or a lone rising edge within one of the chord end.
        // Synthesize the missing member at the edge.
        let e = edges[0];
        if e < 0 && e.abs() < 2 * config.solar_radius as i64 {
            edges = vec![-1, e];
        } else if e > 0 && e > k_len - 2 * config.solar_radius as i64 {
            edges = vec![e, -k_len];
        } else {
            return Err(ChordError::Unusable);
        }
    } else {
        // Flag both members of any pair spaced at most min_limb_width apart;
        // fiducial shadows and dust produce such pairs, the limb does not.
        let mut flagged = vec![false; edges.len()];
        for k in 1..edges.len() {
            let spread = (edges[k].abs() - edges[k - 1].abs()).abs();
            if spread <= config.min_limb_width as i64 {
                flagged[k - 1] = true;
                flagged[k] = true;
            }
        }
        let mut keep = flagged.iter().map(|&f| !f);
        edges.retain(|_| keep.next().unwrap());
    }

    // Exactly one surviving pair, rising then falling.
    if !(edges.len() == 2 && edges[0] >= -1 && edges[1] < 0) {
        return Err(ChordError::Unusable);
    }

    let lower = thresholds.lower as f64;
    let mut pair = ChordPair {
        first: 0.0,
        second: 0.0,
        first_virtual: false,
        second_virtual: false,
    };
    let mut x: Vec<f64> = Vec::new();
    let mut y: Vec<f64> = Vec::new();
    for (k, &signed_edge) in edges.iter().enumerate() {
        // Virtual members are reported verbatim with no fitting.
        if k == 0 && signed_edge == -1 {
            pair.first = -1.0;
            pair.first_virtual = true;
            continue;
        }
        if k == 1 && signed_edge == -k_len {
            pair.second = k_len as f32;
            pair.second_virtual = true;
            continue;
        }

        let edge = signed_edge.abs();
        let window = safe_range(
            edge - config.limb_fit_width as i64,
            edge + config.limb_fit_width as i64 + 1,
            chord.len(),
        );
        if window.len() < 2 {
            return Err(ChordError::Unusable);
        }
        x.clear();
        y.clear();
        for l in window.clone() {
            x.push(l as f64 - edge as f64);
            y.push(chord[l] as f64);
        }
        let fit = fit_line(&x, &y);
        let refined = (lower - fit.intercept) / fit.slope + edge as f64;
        if !refined.is_finite() {
            return Err(ChordError::NonFinite);
        }
        if refined < window.start as f64 || refined > (window.end - 1) as f64 {
            return Err(ChordError::OutOfWindow);
        }
        if k == 0 {
            pair.first = refined as f32;
        } else {
            pair.second = refined as f32;
        }
        slopes.push(fit.slope.abs() as f32);
    }

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        // Robust min 10, max 210 with default fractions: lower 60, upper 160.
        Thresholds::from_min_max(10, 210, &AspectConfig::default())
    }

    /// Chord with a disk span of `[lo, hi)` at intensity 210 over background 10.
    fn disk_chord(len: usize, lo: usize, hi: usize) -> Vec<u8> {
        let mut chord = vec![10u8; len];
        for v in &mut chord[lo..hi] {
            *v = 210;
        }
        chord
    }

    #[test]
    fn uniform_chord_is_too_dim() {
        let chord = vec![10u8; 400];
        let mut slopes = Vec::new();
        let res = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes);
        assert_eq!(res, Err(ChordError::Unusable));
        assert!(slopes.is_empty());
    }

    #[test]
    fn bright_chord_without_edges_is_rejected() {
        let chord = vec![210u8; 400];
        let mut slopes = Vec::new();
        let res = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes);
        assert_eq!(res, Err(ChordError::Unusable));
    }

    #[test]
    fn clean_disk_chord_yields_subpixel_pair() {
        let chord = disk_chord(400, 100, 300);
        let mut slopes = Vec::new();
        let pair = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes)
            .expect("clean pair");
        assert!(!pair.has_virtual());
        // Hard step edges bias the 5-point fit by about a pixel, low on the
        // rising side and high on the falling side; the midpoint cancels it.
        assert!(pair.first > 98.0 && pair.first < 100.5, "first = {}", pair.first);
        assert!(pair.second > 298.5 && pair.second < 301.5, "second = {}", pair.second);
        assert!((pair.midpoint() - 199.5).abs() < 1.0);
        assert_eq!(slopes.len(), 2);
        assert!(slopes.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn lone_falling_edge_near_start_synthesizes_leading_member() {
        // Disk runs off the chord start: only the trailing limb is visible at
        // index 150, well within a solar diameter of the start.
        let chord = disk_chord(500, 0, 150);
        let mut slopes = Vec::new();
        let pair = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes)
            .expect("virtual leading pair");
        assert!(pair.first_virtual);
        assert_eq!(pair.first, -1.0);
        assert!(!pair.second_virtual);
        assert!((pair.second - 150.0).abs() < 1.5, "second = {}", pair.second);
        assert_eq!(slopes.len(), 1);
    }

    #[test]
    fn lone_rising_edge_near_end_synthesizes_trailing_member() {
        let chord = disk_chord(500, 400, 500);
        let mut slopes = Vec::new();
        let pair = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes)
            .expect("virtual trailing pair");
        assert!(!pair.first_virtual);
        assert!((pair.first - 399.5).abs() < 1.0);
        assert!(pair.second_virtual);
        assert_eq!(pair.second, 500.0);
    }

    #[test]
    fn lone_edge_far_from_sensor_edge_is_rejected() {
        // A falling edge two solar diameters into the chord cannot be a
        // cut-off Sun.
        let chord = disk_chord(1200, 0, 500);
        let mut slopes = Vec::new();
        let res = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes);
        assert_eq!(res, Err(ChordError::Unusable));
    }

    #[test]
    fn narrow_shadow_pair_inside_disk_is_pruned() {
        // Disk [100, 300) with a 4-pixel dark notch at 200: the notch's two
        // crossings are closer than min_limb_width and must both be dropped,
        // leaving the true limb pair.
        let mut chord = disk_chord(400, 100, 300);
        for v in &mut chord[200..204] {
            *v = 10;
        }
        let mut slopes = Vec::new();
        let pair = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes)
            .expect("limb pair survives notch pruning");
        assert!(!pair.has_virtual());
        assert!((pair.midpoint() - 199.5).abs() < 1.0, "midpoint = {}", pair.midpoint());
    }

    #[test]
    fn two_wide_gaps_leave_no_unique_pair() {
        // Two bright spans separated by a gap wider than min_limb_width: four
        // surviving edges, no unique pair.
        let mut chord = disk_chord(400, 50, 150);
        for v in &mut chord[250..350] {
            *v = 210;
        }
        let mut slopes = Vec::new();
        let res = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes);
        assert_eq!(res, Err(ChordError::Unusable));
    }

    #[test]
    fn gradual_limb_is_refined_between_samples() {
        // Linear ramps at both limbs; the refined crossing must sit where the
        // ramp passes the lower threshold (60), at sub-pixel precision.
        let mut chord = vec![10u8; 400];
        for k in 0..20 {
            chord[100 + k] = (10.0 + 10.0 * k as f32) as u8; // crosses 60 at k=5
        }
        for v in &mut chord[120..280] {
            *v = 210;
        }
        for k in 0..20 {
            chord[280 + k] = (210.0 - 10.0 * k as f32) as u8; // crosses 60 at k=15
        }
        let mut slopes = Vec::new();
        let pair = find_limb_crossings(&chord, thresholds(), &AspectConfig::default(), &mut slopes)
            .expect("ramped pair");
        assert!((pair.first - 105.0).abs() < 0.6, "first = {}", pair.first);
        assert!((pair.second - 295.0).abs() < 0.6, "second = {}", pair.second);
        // Ramp slope is 10 intensity/pixel.
        for s in &slopes {
            assert!((s - 10.0).abs() < 2.5, "slope = {s}");
        }
    }
}
