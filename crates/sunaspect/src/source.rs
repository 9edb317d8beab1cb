//! Frame acquisition interface.
//!
//! The pipeline consumes already-acquired frames; everything about the
//! camera (streaming, ROI, exposure) lives behind this trait.

use image::GrayImage;

/// Why a frame could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireError {
    /// No frame arrived within the source's deadline.
    Timeout,
    /// A frame arrived but failed the source's integrity checks.
    Damaged,
}

impl std::fmt::Display for AcquireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("frame acquisition timed out"),
            Self::Damaged => f.write_str("acquired frame was damaged"),
        }
    }
}

impl std::error::Error for AcquireError {}

/// Producer of single-channel 8-bit frames.
pub trait FrameSource {
    /// Acquire the next frame.
    fn acquire(&mut self) -> Result<GrayImage, AcquireError>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Result<GrayImage, AcquireError>,
{
    fn acquire(&mut self) -> Result<GrayImage, AcquireError> {
        self()
    }
}
