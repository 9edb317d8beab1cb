//! Core value types shared across the pipeline.

use nalgebra::Point2;

/// Sub-pixel position in frame coordinates (x right, y down).
pub type PixelPoint = Point2<f32>;

/// Position in the instrument-fixed screen coordinate system (micrometers).
pub type ScreenPoint = Point2<f32>;

/// Ordered list of pixel positions.
pub type CoordList = Vec<PixelPoint>;

/// Lattice index of a fiducial along one reticle axis.
///
/// The flight heritage encoded these as sentinels (−100 unknown, −200
/// ambiguous); here the three cases are a tagged type and the sentinel
/// encoding survives only through [`AxisId::sentinel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    /// No votes received on this axis.
    Unknown,
    /// Votes tied between distinct lattice indices.
    Ambiguous,
    /// Unique winning lattice index.
    Known(i32),
}

impl AxisId {
    /// Returns the lattice index if this axis resolved uniquely.
    pub fn known(self) -> Option<i32> {
        match self {
            AxisId::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` when this axis resolved uniquely.
    pub fn is_known(self) -> bool {
        matches!(self, AxisId::Known(_))
    }

    /// Heritage sentinel encoding: −100 unknown, −200 ambiguous, else the index.
    pub fn sentinel(self) -> i32 {
        match self {
            AxisId::Unknown => -100,
            AxisId::Ambiguous => -200,
            AxisId::Known(v) => v,
        }
    }
}

/// Integer lattice identity of a detected fiducial: `(col, row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FiducialId {
    /// Lattice column index.
    pub col: AxisId,
    /// Lattice row index.
    pub row: AxisId,
}

impl FiducialId {
    /// Identity with no votes on either axis.
    pub const UNKNOWN: FiducialId = FiducialId {
        col: AxisId::Unknown,
        row: AxisId::Unknown,
    };

    /// Valid for the mapping fit only when both axes resolved uniquely.
    pub fn is_valid(self) -> bool {
        self.col.is_known() && self.row.is_known()
    }
}

impl Default for FiducialId {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_id_sentinels_match_heritage_encoding() {
        assert_eq!(AxisId::Unknown.sentinel(), -100);
        assert_eq!(AxisId::Ambiguous.sentinel(), -200);
        assert_eq!(AxisId::Known(-3).sentinel(), -3);
    }

    #[test]
    fn fiducial_id_valid_requires_both_axes() {
        let half = FiducialId {
            col: AxisId::Known(2),
            row: AxisId::Ambiguous,
        };
        assert!(!half.is_valid());
        let full = FiducialId {
            col: AxisId::Known(2),
            row: AxisId::Known(-1),
        };
        assert!(full.is_valid());
        assert!(!FiducialId::UNKNOWN.is_valid());
    }
}
