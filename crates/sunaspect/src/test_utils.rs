//! Shared helpers for image-based unit tests: synthetic solar frames with a
//! softened limb, hard-edged fiducial cross shadows, and reticle lattice
//! placement consistent with the identification geometry.

use image::{GrayImage, Luma};

use crate::mapping::fiducial_id_to_screen;
use crate::types::PixelPoint;

/// Render a solar disk with a ~3-pixel linear limb ramp.
///
/// The soft limb keeps the matched filter quiet along the limb ring (as the
/// real optics do) while the chord fitter still gets a clean monotone
/// crossing to refine.
pub(crate) fn draw_disk(
    w: u32,
    h: u32,
    center: [f32; 2],
    radius: f32,
    disk_pix: u8,
    bg_pix: u8,
) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    let span = disk_pix as f32 - bg_pix as f32;
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - center[0];
            let dy = y as f32 - center[1];
            let d = (dx * dx + dy * dy).sqrt();
            let coverage = ((radius - d) / 3.0 + 0.5).clamp(0.0, 1.0);
            img.put_pixel(x, y, Luma([(bg_pix as f32 + span * coverage).round() as u8]));
        }
    }
    img
}

/// Paint a cross-shaped shadow (two centered bars) over the frame.
///
/// Edges are blended over one pixel so the painted mass centers on the
/// requested sub-pixel position instead of snapping to the grid.
pub(crate) fn draw_cross(
    frame: &mut GrayImage,
    center: [f32; 2],
    arm_length: f32,
    arm_width: f32,
    level: u8,
) {
    let (w, h) = frame.dimensions();
    let half_l = arm_length / 2.0;
    let half_w = arm_width / 2.0;
    let band = |half: f32, d: f32| -> f32 { (half - d.abs() + 0.5).clamp(0.0, 1.0) };
    let reach = half_l.ceil() as i64 + 1;
    for oy in -reach..=reach {
        for ox in -reach..=reach {
            let x = center[0].round() as i64 + ox;
            let y = center[1].round() as i64 + oy;
            if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
                continue;
            }
            let dx = x as f32 - center[0];
            let dy = y as f32 - center[1];
            let vertical = band(half_w, dx) * band(half_l, dy);
            let horizontal = band(half_l, dx) * band(half_w, dy);
            let coverage = vertical.max(horizontal);
            if coverage > 0.0 {
                let current = frame.get_pixel(x as u32, y as u32)[0] as f32;
                let blended = current * (1.0 - coverage) + level as f32 * coverage;
                frame.put_pixel(x as u32, y as u32, Luma([blended.round() as u8]));
            }
        }
    }
}

/// Pixel position of the reticle mark with lattice identity `(col, row)`.
///
/// The lattice runs against pixel x in column index and with pixel y in row
/// index, with the cross-axis shear that makes adjacent lattice columns sit
/// one `spacing` apart in y (and rows in x).
pub(crate) fn lattice_point(col: i32, row: i32, center: [f32; 2], spacing: f32) -> PixelPoint {
    let screen = fiducial_id_to_screen(col, row);
    PixelPoint::new(
        center[0] - screen.x * spacing / 90.0,
        center[1] + screen.y * spacing / 90.0,
    )
}
