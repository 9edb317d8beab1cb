//! Lattice identification by pairwise distance voting.
//!
//! The reticle is a regular lattice with one missing row near its center,
//! which makes the inter-fiducial distances along an axis asymmetric: seven
//! shrinking steps (84 → 48 units) below the gap and seven growing steps
//! (45 → 81 units) above it, all scaled by `fiducial_spacing / 15`. Matching
//! a measured pair distance against the table pins the pair to a specific
//! place on the lattice; every match is a vote, and the mode of each mark's
//! vote bag is its identity.
//!
//! A second pass fills marks that received no votes on an axis from partners
//! whose identity on that axis is already definite: members of a row pair
//! share a column and differ by one in row (and symmetrically for column
//! pairs).

use crate::config::AspectConfig;
use crate::math::{mode, rotate_all};
use crate::types::{AxisId, CoordList, FiducialId};

/// Expected between-fiducial distances along one axis, in pixels.
///
/// Index k ∈ [0, 6] holds successive 6-unit jumps shrinking from 84 to 48;
/// k ∈ [7, 13] jumps growing from 45 to 81.
pub(crate) fn lattice_distances(spacing: f32) -> [f32; 14] {
    let mut table = [0.0f32; 14];
    for (k, slot) in table.iter_mut().enumerate() {
        let units = if k < 7 {
            (84 - 6 * k as i32) as f32
        } else {
            (45 + 6 * (k as i32 - 7)) as f32
        };
        *slot = units * spacing / 15.0;
    }
    table
}

/// Identities plus the pair lists that produced them.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdentifyOutput {
    /// One identity per input fiducial.
    pub ids: Vec<FiducialId>,
    /// Index pairs spaced like lattice row neighbors.
    pub row_pairs: Vec<(usize, usize)>,
    /// Index pairs spaced like lattice column neighbors.
    pub col_pairs: Vec<(usize, usize)>,
}

fn tally(bag: &[i32]) -> AxisId {
    let modes = mode(bag);
    match modes.len() {
        0 => AxisId::Unknown,
        1 => AxisId::Known(modes[0]),
        _ => AxisId::Ambiguous,
    }
}

/// Assign lattice identities to the detected fiducials.
pub(crate) fn identify_fiducials(fiducials: &CoordList, config: &AspectConfig) -> IdentifyOutput {
    let count = fiducials.len();
    let mut out = IdentifyOutput {
        ids: vec![FiducialId::UNKNOWN; count],
        row_pairs: Vec::new(),
        col_pairs: Vec::new(),
    };

    let m_dist = lattice_distances(config.fiducial_spacing);
    let n_dist = lattice_distances(config.fiducial_spacing);
    let tol = config.fiducial_spacing_tol;
    let spacing = config.fiducial_spacing;

    // Align with the reticle before measuring anything.
    let rotated = rotate_all(config.fiducial_twist, fiducials);

    // Classify pairs. A column pair is two marks in adjacent lattice
    // columns: one short step apart in y, one table entry apart in x. A row
    // pair is the transpose.
    for k in 0..count {
        for l in k + 1..count {
            let row_diff = rotated[k].y - rotated[l].y;
            let col_diff = rotated[k].x - rotated[l].x;
            if (row_diff.abs() - spacing).abs() < tol
                && col_diff.abs() > n_dist[7] - tol
                && col_diff.abs() < n_dist[0] + tol
            {
                out.col_pairs.push((k, l));
            } else if (col_diff.abs() - spacing).abs() < tol
                && row_diff.abs() > m_dist[7] - tol
                && row_diff.abs() < m_dist[0] + tol
            {
                out.row_pairs.push((k, l));
            }
        }
    }

    tracing::debug!(
        fiducials = count,
        row_pairs = out.row_pairs.len(),
        col_pairs = out.col_pairs.len(),
        "fiducial pair classification"
    );

    // First pass: every table entry within tolerance of a pair's long-side
    // distance casts a vote for the two lattice indices it straddles, signed
    // by the pair orientation.
    let mut row_votes: Vec<Vec<i32>> = vec![Vec::new(); count];
    let mut col_votes: Vec<Vec<i32>> = vec![Vec::new(); count];

    for &(k, l) in &out.row_pairs {
        let row_diff = rotated[l].y - rotated[k].y;
        for (d, &dist) in m_dist.iter().enumerate() {
            if (row_diff.abs() - dist).abs() < tol {
                let d = d as i32;
                if row_diff > 0.0 {
                    row_votes[k].push(d - 7);
                    row_votes[l].push(d + 1 - 7);
                } else {
                    row_votes[k].push(d + 1 - 7);
                    row_votes[l].push(d - 7);
                }
            }
        }
    }
    for &(k, l) in &out.col_pairs {
        let col_diff = rotated[k].x - rotated[l].x;
        for (d, &dist) in n_dist.iter().enumerate() {
            if (col_diff.abs() - dist).abs() < tol {
                let d = d as i32;
                if col_diff > 0.0 {
                    col_votes[k].push(d - 7);
                    col_votes[l].push(d + 1 - 7);
                } else {
                    col_votes[k].push(d + 1 - 7);
                    col_votes[l].push(d - 7);
                }
            }
        }
    }

    for k in 0..count {
        out.ids[k].row = tally(&row_votes[k]);
        out.ids[k].col = tally(&col_votes[k]);
    }

    // Second pass: marks still unknown on an axis inherit from partners with
    // a definite value. Row-pair members share a column and differ by one in
    // row; column-pair members share a row and differ by one in column.
    for votes in row_votes.iter_mut() {
        votes.clear();
    }
    for votes in col_votes.iter_mut() {
        votes.clear();
    }

    for &(k, l) in &out.row_pairs {
        let row_diff = rotated[l].y - rotated[k].y;

        match (out.ids[k].col, out.ids[l].col) {
            (AxisId::Unknown, AxisId::Known(v)) => col_votes[k].push(v),
            (AxisId::Known(v), AxisId::Unknown) => col_votes[l].push(v),
            _ => {}
        }
        match (out.ids[k].row, out.ids[l].row) {
            (AxisId::Unknown, AxisId::Known(v)) => {
                row_votes[k].push(if row_diff >= 0.0 { v - 1 } else { v + 1 });
            }
            (AxisId::Known(v), AxisId::Unknown) => {
                row_votes[l].push(if row_diff >= 0.0 { v + 1 } else { v - 1 });
            }
            _ => {}
        }
    }
    for &(k, l) in &out.col_pairs {
        let col_diff = rotated[k].x - rotated[l].x;

        match (out.ids[k].row, out.ids[l].row) {
            (AxisId::Unknown, AxisId::Known(v)) => row_votes[k].push(v),
            (AxisId::Known(v), AxisId::Unknown) => row_votes[l].push(v),
            _ => {}
        }
        match (out.ids[k].col, out.ids[l].col) {
            (AxisId::Unknown, AxisId::Known(v)) => {
                col_votes[k].push(if col_diff >= 0.0 { v - 1 } else { v + 1 });
            }
            (AxisId::Known(v), AxisId::Unknown) => {
                col_votes[l].push(if col_diff >= 0.0 { v + 1 } else { v - 1 });
            }
            _ => {}
        }
    }

    // Second tally only overwrites where new votes arrived.
    for k in 0..count {
        if !row_votes[k].is_empty() {
            out.ids[k].row = tally(&row_votes[k]);
        }
        if !col_votes[k].is_empty() {
            out.ids[k].col = tally(&col_votes[k]);
        }
    }

    out
}
