//! sunaspect — solar aspect from a coarse-alignment camera.
//!
//! Computes the sub-pixel location of the Sun's center in a monochrome
//! frame and, from the reticle of cross-shaped fiducial marks etched into
//! the optical path, a per-axis affine mapping from pixel coordinates to
//! the instrument-fixed screen coordinate system. The mapping is the
//! payload: it turns any pixel into an offset relative to boresight.
//!
//! The pipeline stages are:
//!
//! 1. **Histogram** – robust frame min/max at the 0.5 %/99.5 % percentiles.
//! 2. **Limb** – per-chord threshold crossings with sub-pixel refinement.
//! 3. **Center** – chord-grid sweep, per-axis midpoint statistics.
//! 4. **Fiducials** – matched-filter correlation over the solar sub-image,
//!    local-maxima pruning, centroid refinement.
//! 5. **Identify** – pairwise distance voting onto the reticle lattice.
//! 6. **Mapping** – per-axis least-squares pixel→screen fit.
//!
//! [`Aspect`] sequences the stages as a state machine: every failure is a
//! value of [`PipelineState`], never a panic, and each getter returns either
//! its data product or the state that blocked it.
//!
//! # Example
//!
//! ```no_run
//! use sunaspect::{Aspect, AspectConfig};
//!
//! let mut aspect = Aspect::new(AspectConfig::default());
//! let frame = image::GrayImage::new(1296, 966);
//! aspect.load_frame(frame);
//! aspect.run();
//! match aspect.screen_center() {
//!     Ok(center) => println!("boresight offset: ({:.1}, {:.1}) um", center.x, center.y),
//!     Err(state) => eprintln!("no solution this frame: {state}"),
//! }
//! ```

mod aspect;
mod center;
mod config;
mod fiducial;
mod histogram;
mod kernel;
mod limb;
mod mapping;
mod math;
mod roi;
mod source;
mod state;
mod sync;
#[cfg(test)]
mod test_utils;
mod types;

pub use aspect::Aspect;
pub use center::CenterStats;
pub use config::{AspectConfig, FloatParam, IntParam};
pub use histogram::robust_min_max;
pub use limb::{find_limb_crossings, ChordError, ChordPair, Thresholds};
pub use mapping::{fiducial_id_to_screen, pixel_to_screen};
pub use roi::{safe_range, Roi, SubFrame};
pub use source::{AcquireError, FrameSource};
pub use state::PipelineState;
pub use sync::FrameMailbox;
pub use types::{AxisId, CoordList, FiducialId, PixelPoint, ScreenPoint};
