//! Pipeline configuration.
//!
//! All tunables persist across frames; per-frame data products do not.
//! Defaults are the values flown on the instrument.

/// Aspect pipeline tunables.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AspectConfig {
    /// Chords per axis when searching the full frame for the Sun.
    pub initial_num_chords: i32,
    /// Chords per axis when refining within the solar sub-image.
    pub chords_per_axis: i32,
    /// Fractional limb threshold between robust min and max, in [0, 1].
    pub limb_threshold: f32,
    /// Fractional disk threshold between robust min and max, in [0, 1].
    ///
    /// A chord must exceed this level somewhere to count as crossing the disk.
    pub disk_threshold: f32,
    /// Expected solar radius in pixels.
    pub solar_radius: i32,
    /// Sub-image half-size margin: half-size = radius · (1 + margin).
    pub radius_margin: f32,
    /// Reject centers whose per-axis midpoint scatter exceeds this (pixels).
    pub error_limit: f32,
    /// Half-width of the linear refinement window around a coarse limb edge.
    pub limb_fit_width: i32,
    /// Fiducial cross arm length in pixels.
    pub fiducial_length: i32,
    /// Fiducial cross arm width in pixels.
    pub fiducial_width: i32,
    /// Detection threshold in standard deviations above the correlation mean.
    pub fiducial_threshold: f32,
    /// Short-side distance of a fiducial pair in pixels.
    ///
    /// Lab measurement was 15.7; 15.6 is the compromise that fits all
    /// collected test data through Sun Test 4.
    pub fiducial_spacing: f32,
    /// Slack allowed on fiducial pair distances (pixels).
    pub fiducial_spacing_tol: f32,
    /// Pre-rotation applied to fiducial coordinates before identification (degrees).
    pub fiducial_twist: f32,
    /// Cap on accepted fiducials.
    pub num_fiducials: i32,
    /// Required gap between paired limb edges (pixels); rejects fiducial shadows.
    pub min_limb_width: i32,
    /// Mapping fits with condition number above this raise the ill-conditioned gate.
    pub condition_limit: f32,
}

impl Default for AspectConfig {
    fn default() -> Self {
        Self {
            initial_num_chords: 30,
            chords_per_axis: 10,
            limb_threshold: 0.25,
            disk_threshold: 0.75,
            solar_radius: 98,
            radius_margin: 0.25,
            error_limit: 50.0,
            limb_fit_width: 2,
            fiducial_length: 15,
            fiducial_width: 2,
            fiducial_threshold: 5.0,
            fiducial_spacing: 15.6,
            fiducial_spacing_tol: 1.5,
            fiducial_twist: 0.0,
            num_fiducials: 12,
            min_limb_width: 15,
            condition_limit: 1.0e6,
        }
    }
}

/// Float-valued parameter selector for the generic get/set surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatParam {
    LimbThreshold,
    DiskThreshold,
    ErrorLimit,
    RadiusMargin,
    FiducialThreshold,
    FiducialSpacing,
    FiducialSpacingTol,
    FiducialTwist,
    ConditionLimit,
}

/// Integer-valued parameter selector for the generic get/set surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntParam {
    NumChordsSearching,
    NumChordsOperating,
    MinLimbWidth,
    LimbFitWidth,
    SolarRadius,
    FiducialLength,
    FiducialWidth,
    NumFiducials,
}

impl AspectConfig {
    /// Read a float parameter.
    pub fn get_float(&self, param: FloatParam) -> f32 {
        match param {
            FloatParam::LimbThreshold => self.limb_threshold,
            FloatParam::DiskThreshold => self.disk_threshold,
            FloatParam::ErrorLimit => self.error_limit,
            FloatParam::RadiusMargin => self.radius_margin,
            FloatParam::FiducialThreshold => self.fiducial_threshold,
            FloatParam::FiducialSpacing => self.fiducial_spacing,
            FloatParam::FiducialSpacingTol => self.fiducial_spacing_tol,
            FloatParam::FiducialTwist => self.fiducial_twist,
            FloatParam::ConditionLimit => self.condition_limit,
        }
    }

    /// Write a float parameter.
    pub fn set_float(&mut self, param: FloatParam, value: f32) {
        match param {
            FloatParam::LimbThreshold => self.limb_threshold = value,
            FloatParam::DiskThreshold => self.disk_threshold = value,
            FloatParam::ErrorLimit => self.error_limit = value,
            FloatParam::RadiusMargin => self.radius_margin = value,
            FloatParam::FiducialThreshold => self.fiducial_threshold = value,
            FloatParam::FiducialSpacing => self.fiducial_spacing = value,
            FloatParam::FiducialSpacingTol => self.fiducial_spacing_tol = value,
            FloatParam::FiducialTwist => self.fiducial_twist = value,
            FloatParam::ConditionLimit => self.condition_limit = value,
        }
    }

    /// Read an integer parameter.
    pub fn get_integer(&self, param: IntParam) -> i32 {
        match param {
            IntParam::NumChordsSearching => self.initial_num_chords,
            IntParam::NumChordsOperating => self.chords_per_axis,
            IntParam::MinLimbWidth => self.min_limb_width,
            IntParam::LimbFitWidth => self.limb_fit_width,
            IntParam::SolarRadius => self.solar_radius,
            IntParam::FiducialLength => self.fiducial_length,
            IntParam::FiducialWidth => self.fiducial_width,
            IntParam::NumFiducials => self.num_fiducials,
        }
    }

    /// Write an integer parameter.
    pub fn set_integer(&mut self, param: IntParam, value: i32) {
        match param {
            IntParam::NumChordsSearching => self.initial_num_chords = value,
            IntParam::NumChordsOperating => self.chords_per_axis = value,
            IntParam::MinLimbWidth => self.min_limb_width = value,
            IntParam::LimbFitWidth => self.limb_fit_width = value,
            IntParam::SolarRadius => self.solar_radius = value,
            IntParam::FiducialLength => self.fiducial_length = value,
            IntParam::FiducialWidth => self.fiducial_width = value,
            IntParam::NumFiducials => self.num_fiducials = value,
        }
    }
}
