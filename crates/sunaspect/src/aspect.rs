//! The aspect pipeline state machine.
//!
//! `load_frame` hands a frame to the pipeline; `run` advances through the
//! stages (robust min/max → chord center → solar sub-image → fiducial
//! detection → lattice identification → mapping fit), recording the first
//! failure in [`PipelineState`] and returning early. Every getter compares
//! the state against the stage that produces its data and returns either
//! the value or the state.
//!
//! One piece of state survives between frames besides the configuration:
//! the previous pixel center, used as a hint to place the refining chord
//! grid on the solar sub-image instead of sweeping the whole frame.

use image::GrayImage;

use crate::center::{find_pixel_center, CenterStats};
use crate::config::{AspectConfig, FloatParam, IntParam};
use crate::fiducial::{find_pixel_fiducials, identify_fiducials};
use crate::histogram::robust_min_max;
use crate::kernel::{generate_kernel, FiducialKernel};
use crate::limb::Thresholds;
use crate::mapping::{fit_mapping, pixel_to_screen};
use crate::roi::{safe_range, Roi, SubFrame};
use crate::state::PipelineState;
use crate::types::{CoordList, FiducialId, PixelPoint, ScreenPoint};

/// Solar aspect pipeline.
///
/// One instance processes one frame at a time; instances share nothing, so
/// thread safety across instances holds by construction.
#[derive(Debug)]
pub struct Aspect {
    config: AspectConfig,
    kernel: Option<FiducialKernel>,

    frame: Option<GrayImage>,
    state: PipelineState,

    frame_min: u8,
    frame_max: u8,
    pixel_center: PixelPoint,
    pixel_error: PixelPoint,
    limb_crossings: CoordList,
    limb_slopes: Vec<f32>,
    center_stats: CenterStats,
    solar_roi: Option<Roi>,
    pixel_fiducials: CoordList,
    fiducial_ids: Vec<FiducialId>,
    row_pairs: Vec<(usize, usize)>,
    col_pairs: Vec<(usize, usize)>,
    mapping: [f32; 4],
    condition_numbers: [f32; 2],
}

impl Default for Aspect {
    fn default() -> Self {
        Self::new(AspectConfig::default())
    }
}

impl Aspect {
    /// Pipeline with the given configuration and no frame loaded.
    pub fn new(config: AspectConfig) -> Aspect {
        Aspect {
            config,
            kernel: None,
            frame: None,
            state: PipelineState::StaleData,
            frame_min: 255,
            frame_max: 0,
            pixel_center: PixelPoint::new(-1.0, -1.0),
            pixel_error: PixelPoint::new(0.0, 0.0),
            limb_crossings: CoordList::new(),
            limb_slopes: Vec::new(),
            center_stats: CenterStats::default(),
            solar_roi: None,
            pixel_fiducials: CoordList::new(),
            fiducial_ids: Vec::new(),
            row_pairs: Vec::new(),
            col_pairs: Vec::new(),
            mapping: [0.0; 4],
            condition_numbers: [0.0; 2],
        }
    }

    /// Current pipeline state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Load the next frame. Rejects zero-sized frames.
    pub fn load_frame(&mut self, frame: GrayImage) -> PipelineState {
        if frame.width() == 0 || frame.height() == 0 {
            self.frame = None;
            self.state = PipelineState::FrameEmpty;
        } else {
            self.frame = Some(frame);
            self.state = PipelineState::NoError;
        }
        self.state
    }

    fn clear_products(&mut self) {
        self.limb_crossings.clear();
        self.limb_slopes.clear();
        self.center_stats = CenterStats::default();
        self.pixel_fiducials.clear();
        self.fiducial_ids.clear();
        self.row_pairs.clear();
        self.col_pairs.clear();
        self.mapping = [0.0; 4];
        self.condition_numbers = [0.0; 2];
    }

    /// Matched-filter template for the current cross geometry, regenerated
    /// after a geometry parameter write.
    fn kernel(&mut self) -> &FiducialKernel {
        let key = (self.config.fiducial_length, self.config.fiducial_width);
        if self.kernel.as_ref().map(|k| k.key) != Some(key) {
            self.kernel = Some(generate_kernel(key.0, key.1));
        }
        self.kernel.as_ref().expect("kernel generated above")
    }

    /// Robust min/max gate shared by both run modes. Returns thresholds on
    /// success.
    fn min_max_stage(&mut self) -> Result<Thresholds, PipelineState> {
        let frame = self.frame.as_ref().expect("frame checked by caller");
        let (min, max) = robust_min_max(frame);
        self.frame_min = min;
        self.frame_max = max;
        if min >= max {
            tracing::warn!(min, max, "robust min/max degenerate");
            return Err(PipelineState::MinMaxBad);
        }
        if max - min < 32 {
            tracing::warn!(min, max, "dynamic range low");
            return Err(PipelineState::DynamicRangeLow);
        }
        Ok(Thresholds::from_min_max(min, max, &self.config))
    }

    /// Check the sub-image against the minimum fiducial neighborhood and the
    /// frame bounds.
    fn check_solar_roi(&self, roi: Roi) -> Result<(), PipelineState> {
        let frame = self.frame.as_ref().expect("frame checked by caller");
        if roi.is_empty() {
            return Err(PipelineState::SolarImageEmpty);
        }
        let min_extent = (self.config.fiducial_spacing as i64) + 2 * self.config.fiducial_length as i64;
        if (roi.width as i64) < min_extent || (roi.height as i64) < min_extent {
            return Err(PipelineState::SolarImageSmall);
        }
        let fw = frame.width() as i64;
        let fh = frame.height() as i64;
        if (roi.x0 as i64) >= fw - roi.width as i64 + 1 || (roi.y0 as i64) >= fh - roi.height as i64 + 1
        {
            return Err(PipelineState::SolarImageOffsetOutOfBounds);
        }
        Ok(())
    }

    /// Fiducial detection, identification, and mapping: the tail shared by
    /// `run` and `fiducial_run`. The sub-image must have been validated.
    fn fiducial_stages(&mut self, roi: Roi) -> PipelineState {
        self.kernel();
        self.pixel_fiducials = {
            let kernel = self.kernel.as_ref().expect("kernel generated above");
            let frame = self.frame.as_ref().expect("frame checked by caller");
            let sub = SubFrame::new(frame, roi);
            find_pixel_fiducials(&sub, kernel, self.frame_max, &self.config)
        };
        if self.pixel_fiducials.is_empty() {
            return PipelineState::NoFiducials;
        } else if self.pixel_fiducials.len() < 3 {
            return PipelineState::FewFiducials;
        }

        let identified = identify_fiducials(&self.pixel_fiducials, &self.config);
        self.fiducial_ids = identified.ids;
        self.row_pairs = identified.row_pairs;
        self.col_pairs = identified.col_pairs;

        let valid = self.fiducial_ids.iter().filter(|id| id.is_valid()).count();
        if valid == 0 {
            return PipelineState::NoIds;
        } else if valid < 3 {
            return PipelineState::FewIds;
        }

        let fit = fit_mapping(&self.pixel_fiducials, &self.fiducial_ids);
        self.mapping = fit.mapping;
        self.condition_numbers = fit.condition;
        if self
            .condition_numbers
            .iter()
            .any(|c| !c.is_finite() || *c > self.config.condition_limit)
        {
            tracing::warn!(condition = ?self.condition_numbers, "mapping ill-conditioned");
            return PipelineState::MappingIllConditioned;
        }

        tracing::info!(
            fiducials = self.pixel_fiducials.len(),
            valid_ids = valid,
            "aspect solution complete"
        );
        PipelineState::NoError
    }

    /// Process the loaded frame through the full pipeline.
    pub fn run(&mut self) -> PipelineState {
        self.clear_products();
        if self.frame.is_none() {
            self.state = if self.state == PipelineState::FrameEmpty {
                PipelineState::FrameEmpty
            } else {
                PipelineState::StaleData
            };
            return self.state;
        }

        let thresholds = match self.min_max_stage() {
            Ok(t) => t,
            Err(state) => {
                self.state = state;
                return self.state;
            }
        };

        let (frame_w, frame_h) = {
            let frame = self.frame.as_ref().expect("frame checked above");
            (frame.width() as usize, frame.height() as usize)
        };
        let out = find_pixel_center(
            self.frame.as_ref().expect("frame checked above"),
            self.pixel_center,
            self.solar_roi,
            thresholds,
            &self.config,
        );
        self.pixel_center = out.center;
        self.pixel_error = out.error;
        self.limb_crossings = out.crossings;
        self.limb_slopes = out.slopes;
        self.center_stats = out.stats;

        if self.limb_crossings.is_empty() {
            self.pixel_center = PixelPoint::new(-1.0, -1.0);
            self.state = PipelineState::NoLimbCrossings;
            return self.state;
        } else if self.limb_crossings.len() < 4 {
            self.pixel_center = PixelPoint::new(-1.0, -1.0);
            self.state = PipelineState::FewLimbCrossings;
            return self.state;
        }

        let (fw, fh) = (frame_w as f32, frame_h as f32);
        if !(self.pixel_center.x.is_finite() && self.pixel_center.y.is_finite())
            || self.pixel_center.x < 0.0
            || self.pixel_center.x >= fw
            || self.pixel_center.y < 0.0
            || self.pixel_center.y >= fh
        {
            self.pixel_center = PixelPoint::new(-1.0, -1.0);
            self.state = PipelineState::CenterOutOfBounds;
            return self.state;
        }
        if !(self.pixel_error.x.is_finite() && self.pixel_error.y.is_finite())
            || self.pixel_error.x > self.config.error_limit
            || self.pixel_error.y > self.config.error_limit
        {
            self.pixel_center = PixelPoint::new(-1.0, -1.0);
            self.state = PipelineState::CenterErrorLarge;
            return self.state;
        }

        // Solar sub-image around the center, clamped into the frame.
        let half = (self.config.solar_radius as f32 * (1.0 + self.config.radius_margin)) as i64;
        let cols = safe_range(
            self.pixel_center.x as i64 - half,
            self.pixel_center.x as i64 + half,
            frame_w,
        );
        let rows = safe_range(
            self.pixel_center.y as i64 - half,
            self.pixel_center.y as i64 + half,
            frame_h,
        );
        let roi = Roi::from_ranges(cols, rows);
        if let Err(state) = self.check_solar_roi(roi) {
            self.solar_roi = None;
            self.state = state;
            return self.state;
        }
        self.solar_roi = Some(roi);

        self.state = self.fiducial_stages(roi);
        self.state
    }

    /// Process the loaded frame as a calibration scene: the whole frame is
    /// taken as the sub-image (offset explicitly zero) and the limb/center
    /// stages are skipped. For reticle illumination tests without the Sun.
    pub fn fiducial_run(&mut self) -> PipelineState {
        self.clear_products();
        if self.frame.is_none() {
            self.state = if self.state == PipelineState::FrameEmpty {
                PipelineState::FrameEmpty
            } else {
                PipelineState::StaleData
            };
            return self.state;
        }

        if let Err(state) = self.min_max_stage() {
            self.state = state;
            return self.state;
        }

        let roi = Roi::full(self.frame.as_ref().expect("frame checked above"));
        if let Err(state) = self.check_solar_roi(roi) {
            self.solar_roi = None;
            self.state = state;
            return self.state;
        }
        self.solar_roi = Some(roi);

        self.state = self.fiducial_stages(roi);
        self.state
    }

    // ── Data product getters ─────────────────────────────────────────────

    /// Robust (min, max) frame intensities.
    pub fn pixel_min_max(&self) -> Result<(u8, u8), PipelineState> {
        if self.state.min_max_available() {
            Ok((self.frame_min, self.frame_max))
        } else {
            Err(self.state)
        }
    }

    /// All accepted limb crossings in frame coordinates.
    pub fn pixel_crossings(&self) -> Result<&[PixelPoint], PipelineState> {
        if self.state.limb_available() {
            Ok(&self.limb_crossings)
        } else {
            Err(self.state)
        }
    }

    /// |slope| of every accepted limb fit, steepest first. A qualitative
    /// focus report: sharper focus means steeper limbs.
    pub fn limb_slopes(&self) -> Result<Vec<f32>, PipelineState> {
        if self.state.limb_available() {
            let mut slopes = self.limb_slopes.clone();
            slopes.sort_by(|a, b| b.total_cmp(a));
            Ok(slopes)
        } else {
            Err(self.state)
        }
    }

    /// Chord sweep counters for the last run.
    pub fn center_stats(&self) -> Result<CenterStats, PipelineState> {
        if self.state.limb_available() {
            Ok(self.center_stats)
        } else {
            Err(self.state)
        }
    }

    /// Sub-pixel solar center in frame coordinates.
    pub fn pixel_center(&self) -> Result<PixelPoint, PipelineState> {
        if self.state.center_available() {
            Ok(self.pixel_center)
        } else {
            Err(self.state)
        }
    }

    /// Per-axis scatter of the chord midpoints behind the center.
    pub fn pixel_error(&self) -> Result<PixelPoint, PipelineState> {
        if self.state.center_available() {
            Ok(self.pixel_error)
        } else {
            Err(self.state)
        }
    }

    /// Sub-pixel fiducial positions in frame coordinates.
    pub fn pixel_fiducials(&self) -> Result<&[PixelPoint], PipelineState> {
        if self.state.fiducials_available() {
            Ok(&self.pixel_fiducials)
        } else {
            Err(self.state)
        }
    }

    /// Index pairs used by the identifier: `(row_pairs, col_pairs)`.
    pub fn fiducial_pairs(
        &self,
    ) -> Result<(&[(usize, usize)], &[(usize, usize)]), PipelineState> {
        if self.state.ids_available() {
            Ok((&self.row_pairs, &self.col_pairs))
        } else {
            Err(self.state)
        }
    }

    /// Lattice identity of each detected fiducial.
    pub fn fiducial_ids(&self) -> Result<&[FiducialId], PipelineState> {
        if self.state.ids_available() {
            Ok(&self.fiducial_ids)
        } else {
            Err(self.state)
        }
    }

    /// Per-axis affine mapping `[intercept_x, slope_x, intercept_y, slope_y]`.
    pub fn mapping(&self) -> Result<[f32; 4], PipelineState> {
        if self.state.mapping_available() {
            Ok(self.mapping)
        } else {
            Err(self.state)
        }
    }

    /// Condition numbers of the two mapping axis fits.
    pub fn mapping_condition(&self) -> Result<[f32; 2], PipelineState> {
        if self.state.mapping_available() {
            Ok(self.condition_numbers)
        } else {
            Err(self.state)
        }
    }

    /// Solar center mapped to screen coordinates.
    pub fn screen_center(&self) -> Result<ScreenPoint, PipelineState> {
        if self.state.mapping_available() {
            Ok(pixel_to_screen(&self.mapping, self.pixel_center))
        } else {
            Err(self.state)
        }
    }

    /// Fiducial positions mapped to screen coordinates.
    pub fn screen_fiducials(&self) -> Result<CoordList, PipelineState> {
        if self.state.mapping_available() {
            Ok(self
                .pixel_fiducials
                .iter()
                .map(|&p| pixel_to_screen(&self.mapping, p))
                .collect())
        } else {
            Err(self.state)
        }
    }

    // ── Parameter surface ────────────────────────────────────────────────

    /// Current configuration.
    pub fn config(&self) -> &AspectConfig {
        &self.config
    }

    /// Read a float parameter.
    pub fn get_float(&self, param: FloatParam) -> f32 {
        self.config.get_float(param)
    }

    /// Write a float parameter.
    pub fn set_float(&mut self, param: FloatParam, value: f32) {
        self.config.set_float(param, value);
    }

    /// Read an integer parameter.
    pub fn get_integer(&self, param: IntParam) -> i32 {
        self.config.get_integer(param)
    }

    /// Write an integer parameter. Cross geometry writes invalidate the
    /// cached matched-filter template.
    pub fn set_integer(&mut self, param: IntParam, value: i32) {
        self.config.set_integer(param, value);
        if matches!(param, IntParam::FiducialLength | IntParam::FiducialWidth) {
            self.kernel = None;
        }
    }
}
