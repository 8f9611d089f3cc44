//! Peak picking on the smoothed activity signal.
//!
//! # Threshold
//!
//! `threshold = mean(smoothed) × (1 + sensitivity / 50)`. A larger
//! sensitivity raises the bar: the value reads as "how strong a relative
//! excursion must be" rather than "how easily peaks register".
//!
//! # Peak rule
//!
//! An interior index is a peak when it is strictly greater than both
//! neighbors and strictly above the threshold. Flat-topped plateaus never
//! register.

use loopscan_analysis_model::sample::Peak;

use crate::smoothing::moving_average;

/// Default half-width of the pre-peak smoothing window.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 2;

/// Smoothing and threshold parameters for peak picking.
#[derive(Debug, Clone, Copy)]
pub struct PeakDetector {
    /// Half-width of the moving average applied before comparison.
    pub smoothing_window: usize,
    /// Threshold strictness in `[1, 100]`.
    pub sensitivity: u32,
}

/// Everything produced while picking peaks from one signal.
#[derive(Debug, Clone)]
pub struct PeakDetection {
    pub smoothed: Vec<f64>,
    pub threshold: f64,
    pub peaks: Vec<Peak>,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self {
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            sensitivity: 50,
        }
    }
}

impl PeakDetector {
    pub fn new(smoothing_window: usize, sensitivity: u32) -> Self {
        Self {
            smoothing_window,
            sensitivity,
        }
    }

    /// Smooth `signal` and pick its peaks. `times[i]` is the time of `signal[i]`.
    pub fn detect(&self, signal: &[f64], times: &[f64]) -> PeakDetection {
        let smoothed = moving_average(signal, self.smoothing_window);
        let threshold = peak_threshold(&smoothed, self.sensitivity);
        let peaks = find_peaks(&smoothed, times, threshold);

        tracing::debug!(
            threshold,
            peaks = peaks.len(),
            samples = smoothed.len(),
            "Peak detection complete"
        );

        PeakDetection {
            smoothed,
            threshold,
            peaks,
        }
    }
}

/// `mean(smoothed) × (1 + sensitivity / 50)`. Zero for an empty signal.
pub fn peak_threshold(smoothed: &[f64], sensitivity: u32) -> f64 {
    if smoothed.is_empty() {
        return 0.0;
    }
    let mean = smoothed.iter().sum::<f64>() / smoothed.len() as f64;
    mean * (1.0 + sensitivity as f64 / 50.0)
}

/// Strict local maxima of `smoothed` above `threshold`, in time order.
pub fn find_peaks(smoothed: &[f64], times: &[f64], threshold: f64) -> Vec<Peak> {
    let len = smoothed.len().min(times.len());
    if len < 3 {
        return vec![];
    }

    (1..len - 1)
        .filter(|&i| {
            let v = smoothed[i];
            v > smoothed[i - 1] && v > smoothed[i + 1] && v > threshold
        })
        .map(|i| Peak {
            time_secs: times[i],
            value: smoothed[i],
            source_index: i,
        })
        .collect()
}
