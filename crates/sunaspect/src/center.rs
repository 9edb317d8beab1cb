//! Solar center estimation from chord limb crossings.
//!
//! Sweeps a grid of horizontal and vertical chords across the search region
//! (the full frame when searching, the solar sub-image when refining around
//! a previous center), finds the limb crossing pair on each chord, and takes
//! the per-axis center as the mean of pair midpoints with the population
//! standard deviation as the per-axis error.

use image::GrayImage;

use crate::config::AspectConfig;
use crate::limb::{find_limb_crossings, ChordError, Thresholds};
use crate::math::{mean, population_std};
use crate::roi::{Roi, SubFrame};
use crate::types::{CoordList, PixelPoint};

/// Per-run counters from the chord sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CenterStats {
    /// Chords walked across both axes.
    pub chords_scanned: usize,
    /// Chords rejected as too dim or without a clean crossing pair.
    pub chords_unusable: usize,
    /// Chords whose refinement produced a non-finite crossing.
    pub non_finite: usize,
    /// Chords whose refinement left its fit window.
    pub out_of_window: usize,
    /// Chords discarded by the sensor-edge rule on a virtual crossing.
    pub edge_rule_rejected: usize,
    /// Chords that contributed a crossing pair.
    pub accepted: usize,
}

/// Everything the chord sweep produces.
#[derive(Debug, Clone)]
pub(crate) struct CenterOutput {
    /// Estimated center in frame coordinates.
    pub center: PixelPoint,
    /// Per-axis midpoint scatter (population standard deviation).
    pub error: PixelPoint,
    /// All accepted limb crossings in frame coordinates, in pair order.
    pub crossings: CoordList,
    /// |slope| of every accepted real-edge fit.
    pub slopes: Vec<f32>,
    pub stats: CenterStats,
}

/// Locate the solar center.
///
/// When `previous_center` is finite, inside the frame, and a solar region
/// from the previous frame exists, the chord grid is placed on that region
/// with `chords_per_axis` chords; otherwise the full frame is swept with
/// `initial_num_chords`. Chords land at `k·step + step/2`.
pub(crate) fn find_pixel_center(
    frame: &GrayImage,
    previous_center: PixelPoint,
    solar_roi: Option<Roi>,
    thresholds: Thresholds,
    config: &AspectConfig,
) -> CenterOutput {
    let frame_w = frame.width() as usize;
    let frame_h = frame.height() as usize;

    let search = previous_center.x < 0.0
        || previous_center.x >= frame_w as f32
        || previous_center.y < 0.0
        || previous_center.y >= frame_h as f32
        || !previous_center.x.is_finite()
        || !previous_center.y.is_finite()
        || solar_roi.map_or(true, Roi::is_empty);

    let (input, limit) = if search {
        (SubFrame::new(frame, Roi::full(frame)), config.initial_num_chords.max(0) as usize)
    } else {
        (
            SubFrame::new(frame, solar_roi.expect("checked above")),
            config.chords_per_axis.max(0) as usize,
        )
    };
    let offset = (input.roi().x0, input.roi().y0);

    tracing::debug!(
        search,
        chords = limit,
        width = input.width(),
        height = input.height(),
        "chord sweep"
    );

    // Chord positions: evenly spaced with a half-step offset.
    let row_step = if limit > 0 { input.height() / limit } else { 0 };
    let col_step = if limit > 0 { input.width() / limit } else { 0 };
    let rows: Vec<usize> = (0..limit).map(|k| row_step / 2 + k * row_step).collect();
    let cols: Vec<usize> = (0..limit).map(|k| col_step / 2 + k * col_step).collect();

    let mut out = CenterOutput {
        center: PixelPoint::new(0.0, 0.0),
        error: PixelPoint::new(0.0, 0.0),
        crossings: CoordList::new(),
        slopes: Vec::new(),
        stats: CenterStats::default(),
    };

    let mut scratch: Vec<u8> = Vec::new();
    let mut midpoints: Vec<f32> = Vec::new();

    // Axis 0 sweeps vertical chords (fixed column) and yields the y center;
    // axis 1 sweeps horizontal chords (fixed row) and yields the x center.
    for axis in 0..2usize {
        midpoints.clear();
        let positions = if axis == 1 { &rows } else { &cols };

        for &pos in positions {
            if (axis == 1 && pos >= input.height()) || (axis == 0 && pos >= input.width()) {
                continue;
            }
            out.stats.chords_scanned += 1;

            let result = if axis == 1 {
                find_limb_crossings(input.row(pos), thresholds, config, &mut out.slopes)
            } else {
                input.col_into(pos, &mut scratch);
                find_limb_crossings(&scratch, thresholds, config, &mut out.slopes)
            };
            let pair = match result {
                Ok(pair) => pair,
                Err(ChordError::Unusable) => {
                    out.stats.chords_unusable += 1;
                    continue;
                }
                Err(ChordError::NonFinite) => {
                    out.stats.non_finite += 1;
                    continue;
                }
                Err(ChordError::OutOfWindow) => {
                    out.stats.out_of_window += 1;
                    continue;
                }
            };

            // A synthetic crossing is only believable when the search region
            // actually abuts that sensor edge. Note the strict `<` on the far
            // edge: a region ending exactly at the frame edge qualifies.
            let chord_extent = if axis == 1 { input.width() } else { input.height() };
            let frame_extent = if axis == 1 { frame_w } else { frame_h };
            let near_offset = if search {
                0
            } else if axis == 1 {
                offset.0
            } else {
                offset.1
            };
            if pair.first_virtual && near_offset > 0 {
                out.stats.edge_rule_rejected += 1;
                continue;
            }
            if pair.second_virtual && near_offset + chord_extent < frame_extent {
                out.stats.edge_rule_rejected += 1;
                continue;
            }

            if axis == 1 {
                out.crossings.push(PixelPoint::new(pair.first, pos as f32));
                out.crossings.push(PixelPoint::new(pair.second, pos as f32));
            } else {
                out.crossings.push(PixelPoint::new(pos as f32, pair.first));
                out.crossings.push(PixelPoint::new(pos as f32, pair.second));
            }
            // A virtual member marks the sensor edge, not the limb, so its
            // pair midpoint is no diameter midpoint; it still counts toward
            // the crossing total.
            if !pair.has_virtual() {
                midpoints.push(pair.midpoint());
            }
            out.stats.accepted += 1;
        }

        let m = mean(&midpoints);
        let s = population_std(&midpoints, m);
        if axis == 1 {
            out.center.x = m;
            out.error.x = s;
        } else {
            out.center.y = m;
            out.error.y = s;
        }
    }

    // Everything above ran in region coordinates; translate back.
    if !search {
        out.center.x += offset.0 as f32;
        out.center.y += offset.1 as f32;
        for c in &mut out.crossings {
            c.x += offset.0 as f32;
            c.y += offset.1 as f32;
        }
    }

    tracing::debug!(
        center_x = out.center.x,
        center_y = out.center.y,
        crossings = out.crossings.len(),
        stats = ?out.stats,
        "chord sweep done"
    );

    out
}
