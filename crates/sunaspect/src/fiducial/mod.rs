//! Fiducial detection and lattice identification.
//!
//! `detect` turns the solar sub-image into sub-pixel cross-mark positions by
//! matched-filter correlation; `identify` assigns each mark an integer
//! lattice identity by pairwise distance voting.

pub(crate) mod detect;
pub(crate) mod identify;

pub(crate) use detect::find_pixel_fiducials;
pub(crate) use identify::identify_fiducials;
