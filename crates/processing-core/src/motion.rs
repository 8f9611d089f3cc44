//! Frame-difference motion scoring.
//!
//! Each frame is reduced to luminance (`Y = 0.299R + 0.587G + 0.114B`).
//! The visual score is the mean of `sqrt(|Y - Yprev|)` over all pixels:
//! the square root lifts small per-pixel differences so subtle repetitive
//! motion is not drowned out by a few large changes.
//!
//! Flat frames (fades, blank screens, solid colors) have near-zero
//! luminance variance and are forced to a score of zero.

use loopscan_analysis_model::frame::PixelBuffer;

/// Luminance variance below which a frame counts as flat (0-255 domain).
pub const FLAT_FRAME_VARIANCE: f64 = 10.0;

/// Motion statistics for one sample instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionScore {
    /// Mean square-rooted luminance difference to the previous frame.
    pub visual_score: f64,
    /// Luminance variance of the current frame.
    pub variance: f64,
    /// Mean luminance of the current frame.
    pub mean_luma: f64,
}

impl MotionScore {
    pub fn is_flat(&self) -> bool {
        self.variance < FLAT_FRAME_VARIANCE
    }
}

/// Rec. 601 luma of one RGB pixel.
pub fn luminance(rgb: &[u8; 3]) -> f64 {
    0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64
}

/// Score `current` against the frame sampled just before it.
///
/// `previous` is `None` for the first instant, which always scores zero.
/// A previous frame of a different shape is treated the same way.
pub fn score_frame(current: &PixelBuffer, previous: Option<&PixelBuffer>) -> MotionScore {
    let pixel_count = current.pixel_count().max(1) as f64;

    let previous = previous.filter(|prev| {
        let same = prev.same_shape(current);
        if !same {
            tracing::debug!(
                current = %format!("{}x{}", current.width(), current.height()),
                previous = %format!("{}x{}", prev.width(), prev.height()),
                "Frame shape changed; skipping difference"
            );
        }
        same
    });

    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut diff_sum = 0.0;

    match previous {
        Some(prev) => {
            for (px, prev_px) in current.pixels().zip(prev.pixels()) {
                let y = luminance(&px);
                sum += y;
                sum_sq += y * y;
                diff_sum += (y - luminance(&prev_px)).abs().sqrt();
            }
        }
        None => {
            for px in current.pixels() {
                let y = luminance(&px);
                sum += y;
                sum_sq += y * y;
            }
        }
    }

    let mean_luma = sum / pixel_count;
    let variance = sum_sq / pixel_count - mean_luma * mean_luma;

    let mut score = MotionScore {
        visual_score: diff_sum / pixel_count,
        variance,
        mean_luma,
    };
    if score.is_flat() {
        score.visual_score = 0.0;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(size: u32, offset: u32) -> PixelBuffer {
        PixelBuffer::from_fn(size, size, |x, y| {
            if ((x + offset) / 4 + y / 4) % 2 == 0 {
                [220, 220, 220]
            } else {
                [20, 20, 20]
            }
        })
    }

    #[test]
    fn test_luminance_weights() {
        assert!((luminance(&[255, 255, 255]) - 255.0).abs() < 1e-9);
        assert!((luminance(&[100, 0, 0]) - 29.9).abs() < 1e-9);
    }

    #[test]
    fn test_first_frame_scores_zero() {
        let frame = checkerboard(48, 0);
        let score = score_frame(&frame, None);
        assert_eq!(score.visual_score, 0.0);
        assert!(score.variance > FLAT_FRAME_VARIANCE);
    }

    #[test]
    fn test_identical_frames_score_zero() {
        let frame = checkerboard(48, 0);
        let score = score_frame(&frame, Some(&frame));
        assert_eq!(score.visual_score, 0.0);
    }

    #[test]
    fn test_moving_pattern_scores_positive() {
        let a = checkerboard(48, 0);
        let b = checkerboard(48, 4);
        let score = score_frame(&b, Some(&a));
        // Every pixel flips between 20 and 220 luma: sqrt(200) per pixel.
        assert!((score.visual_score - 200f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_flat_frame_is_suppressed() {
        let dark = PixelBuffer::solid(48, 48, [10, 10, 10]);
        let bright = PixelBuffer::solid(48, 48, [240, 240, 240]);
        let score = score_frame(&bright, Some(&dark));
        assert!(score.is_flat());
        assert_eq!(score.visual_score, 0.0);
    }

    #[test]
    fn test_square_root_boosts_small_differences() {
        let base = checkerboard(48, 0);
        let nudged = PixelBuffer::from_fn(48, 48, |x, y| {
            let v = if (x / 4 + y / 4) % 2 == 0 { 224 } else { 24 };
            [v, v, v]
        });
        let score = score_frame(&nudged, Some(&base));
        // A 4-level shift everywhere scores sqrt(4) = 2, not 4.
        assert!((score.visual_score - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_shape_mismatch_treated_as_first_frame() {
        let small = checkerboard(24, 0);
        let large = checkerboard(48, 4);
        let score = score_frame(&large, Some(&small));
        assert_eq!(score.visual_score, 0.0);
    }
}
