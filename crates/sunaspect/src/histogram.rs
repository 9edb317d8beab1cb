//! Histogram-based robust intensity extrema.

use image::GrayImage;

/// Robust minimum and maximum of a frame via a 256-bin histogram.
///
/// The minimum is the smallest intensity whose cumulative count reaches
/// 0.5 % of all pixels; the maximum the smallest reaching 99.5 %. Hot pixels
/// and dead pixels (up to half a percent each way) therefore cannot drag the
/// thresholds derived from these.
///
/// A frame with min ≥ max signals a degenerate exposure; the caller gates on
/// that.
pub fn robust_min_max(frame: &GrayImage) -> (u8, u8) {
    let mut hist = [0u64; 256];
    for &v in frame.as_raw() {
        hist[v as usize] += 1;
    }
    let len = frame.as_raw().len() as f64;

    let mut min = 255u8;
    let mut max = 0u8;
    let mut min_found = false;
    let mut max_found = false;
    let mut total = 0u64;
    for (j, &count) in hist.iter().enumerate() {
        total += count;
        if !min_found && total as f64 >= 0.005 * len {
            min = j as u8;
            min_found = true;
        }
        if !max_found && total as f64 >= 0.995 * len {
            max = j as u8;
            max_found = true;
        }
        if min_found && max_found {
            break;
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn uniform_frame_collapses_to_one_level() {
        let frame = GrayImage::from_pixel(64, 48, Luma([128]));
        let (min, max) = robust_min_max(&frame);
        assert_eq!((min, max), (128, 128));
    }

    #[test]
    fn all_zero_frame_is_degenerate() {
        let frame = GrayImage::new(64, 48);
        let (min, max) = robust_min_max(&frame);
        assert!(min >= max);
    }

    #[test]
    fn sparse_outliers_are_ignored() {
        // 100×100 frame: background 10, disk-like block at 200, one hot and
        // one dead pixel. The extremes must come from the bulk populations.
        let mut frame = GrayImage::from_pixel(100, 100, Luma([10]));
        for y in 20..60u32 {
            for x in 20..60u32 {
                frame.put_pixel(x, y, Luma([200]));
            }
        }
        frame.put_pixel(0, 0, Luma([255]));
        frame.put_pixel(99, 99, Luma([0]));
        let (min, max) = robust_min_max(&frame);
        assert_eq!((min, max), (10, 200));
    }

    #[test]
    fn half_percent_tail_is_clipped() {
        // 4 of 1000 pixels (0.4 %) sit at 250, the rest at 50: the 99.5 %
        // cumulative point falls inside the 50 bin, so the bright tail is
        // clipped away.
        let mut frame = GrayImage::from_pixel(100, 10, Luma([50]));
        for x in 0..4u32 {
            frame.put_pixel(x, 0, Luma([250]));
        }
        let (_, max) = robust_min_max(&frame);
        assert_eq!(max, 50);
    }
}
