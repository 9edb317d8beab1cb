//! Pipeline progression state.
//!
//! Errors are values: a single monotone enum is the entire error channel.
//! Lower is better; each stage's getters check the state against the first
//! failure of the stage that produces their data.

/// Outcome of the most recent pipeline run, ordered by severity.
///
/// `NoError` means every stage completed. Each failure variant names the
/// first stage that could not produce its data product; everything computed
/// before that stage remains available through the getters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Every stage completed.
    NoError,
    /// Robust max − min below 32 intensity levels.
    DynamicRangeLow,
    /// Robust min ≥ robust max.
    MinMaxBad,
    /// No frame, or a frame with a zero dimension.
    FrameEmpty,
    /// No chord produced a limb crossing pair.
    NoLimbCrossings,
    /// Fewer than 4 limb crossings.
    FewLimbCrossings,
    /// Estimated center outside the frame or non-finite.
    CenterOutOfBounds,
    /// Per-axis midpoint scatter above the error limit.
    CenterErrorLarge,
    /// Solar sub-image degenerated to zero size.
    SolarImageEmpty,
    /// Solar sub-image too small to hold a fiducial neighborhood.
    SolarImageSmall,
    /// Solar sub-image offset inconsistent with the frame.
    SolarImageOffsetOutOfBounds,
    /// No fiducial candidates survived detection.
    NoFiducials,
    /// Fewer than 3 fiducials.
    FewFiducials,
    /// No fiducial received a valid lattice identity.
    NoIds,
    /// Fewer than 3 valid lattice identities.
    FewIds,
    /// A mapping axis fit had condition number above the limit.
    MappingIllConditioned,
    /// No frame has been processed yet.
    StaleData,
}

impl PipelineState {
    /// True when this is a failure of `boundary`'s stage or a later one,
    /// meaning every earlier stage completed.
    fn failed_after(self, boundary: PipelineState) -> bool {
        self >= boundary && self < PipelineState::StaleData
    }

    /// Robust min/max are available. They are computed even when flagged
    /// degenerate, so only a missing frame withholds them.
    pub fn min_max_available(self) -> bool {
        self != PipelineState::FrameEmpty && self != PipelineState::StaleData
    }

    /// Limb crossings and slopes are available: the chord sweep ran and
    /// passed its gates.
    pub fn limb_available(self) -> bool {
        self == PipelineState::NoError || self.failed_after(PipelineState::CenterOutOfBounds)
    }

    /// Pixel center and error are available.
    pub fn center_available(self) -> bool {
        self == PipelineState::NoError || self.failed_after(PipelineState::SolarImageEmpty)
    }

    /// Fiducial pixel positions are available.
    pub fn fiducials_available(self) -> bool {
        self == PipelineState::NoError || self.failed_after(PipelineState::NoIds)
    }

    /// Fiducial pair lists and lattice identities are available.
    pub fn ids_available(self) -> bool {
        self == PipelineState::NoError
            || self.failed_after(PipelineState::MappingIllConditioned)
    }

    /// The pixel→screen mapping is available only on full success.
    pub fn mapping_available(self) -> bool {
        self == PipelineState::NoError
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::NoError => "no error",
            Self::DynamicRangeLow => "dynamic range low",
            Self::MinMaxBad => "robust min/max bad",
            Self::FrameEmpty => "frame empty",
            Self::NoLimbCrossings => "no limb crossings",
            Self::FewLimbCrossings => "too few limb crossings",
            Self::CenterOutOfBounds => "center out of bounds",
            Self::CenterErrorLarge => "center error large",
            Self::SolarImageEmpty => "solar image empty",
            Self::SolarImageSmall => "solar image small",
            Self::SolarImageOffsetOutOfBounds => "solar image offset out of bounds",
            Self::NoFiducials => "no fiducials",
            Self::FewFiducials => "too few fiducials",
            Self::NoIds => "no fiducial ids",
            Self::FewIds => "too few fiducial ids",
            Self::MappingIllConditioned => "mapping ill-conditioned",
            Self::StaleData => "stale data",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for PipelineState {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_is_monotone() {
        use PipelineState::*;
        let ordered = [
            NoError,
            DynamicRangeLow,
            MinMaxBad,
            FrameEmpty,
            NoLimbCrossings,
            FewLimbCrossings,
            CenterOutOfBounds,
            CenterErrorLarge,
            SolarImageEmpty,
            SolarImageSmall,
            SolarImageOffsetOutOfBounds,
            NoFiducials,
            FewFiducials,
            NoIds,
            FewIds,
            MappingIllConditioned,
            StaleData,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1], "{:?} must be less severe than {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn stage_gates_follow_progression() {
        use PipelineState::*;
        assert!(NoError.mapping_available());
        // A min/max failure still exposes the (bad) extrema, nothing later.
        assert!(MinMaxBad.min_max_available());
        assert!(DynamicRangeLow.min_max_available());
        assert!(!MinMaxBad.limb_available());
        // A limb failure withholds the crossings that did not pair up.
        assert!(FewLimbCrossings.min_max_available());
        assert!(!FewLimbCrossings.limb_available());
        // A fiducial failure still exposes the center computed before it.
        assert!(NoFiducials.center_available());
        assert!(NoFiducials.limb_available());
        assert!(!NoFiducials.fiducials_available());
        // An ID failure still exposes the fiducials.
        assert!(FewIds.fiducials_available());
        assert!(!FewIds.ids_available());
        // An ill-conditioned mapping exposes IDs but not the mapping.
        assert!(MappingIllConditioned.ids_available());
        assert!(!MappingIllConditioned.mapping_available());
        // Center failures withhold the center but not the crossings.
        assert!(CenterErrorLarge.limb_available());
        assert!(!CenterErrorLarge.center_available());
        assert!(!FrameEmpty.min_max_available());
        assert!(!StaleData.min_max_available());
    }
}
