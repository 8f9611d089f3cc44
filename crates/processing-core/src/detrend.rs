//! Steady-motion suppression.
//!
//! Subtracts a slow local trend from the fused signal. Pans, zooms and
//! camera drift raise the trend along with the signal and cancel out;
//! repetitions oscillate faster than the trend window and survive.

use crate::smoothing::moving_average;

/// Half-width of the trend window, in seconds.
pub const TREND_WINDOW_SECS: f64 = 1.5;

/// Trend half-width in samples: `floor(sampling_rate × 1.5)`.
pub fn trend_half_width(sampling_rate: u32) -> usize {
    (sampling_rate as f64 * TREND_WINDOW_SECS).floor() as usize
}

/// `max(0, value - local_trend)` for every instant.
pub fn detrend(values: &[f64], sampling_rate: u32) -> Vec<f64> {
    let trend = moving_average(values, trend_half_width(sampling_rate));
    values
        .iter()
        .zip(trend)
        .map(|(v, t)| (v - t).max(0.0))
        .collect()
}
