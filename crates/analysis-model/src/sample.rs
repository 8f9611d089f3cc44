//! Per-instant activity samples and the peaks derived from them.
//!
//! Samples are produced in strictly increasing time order, one per
//! sampling instant, and are never reordered. Later stages derive new
//! sequences from them instead of mutating them in place.

use serde::{Deserialize, Serialize};

/// Raw scores collected for one instant before any global normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Seconds from the start of the video.
    pub time_secs: f64,

    /// Visual activity. Zero for the first frame and for flat frames.
    pub visual_score: f64,

    /// Scaled windowed RMS energy. Zero when audio is disabled or undecodable.
    pub audio_score: f64,
}

impl RawSample {
    pub fn new(time_secs: f64, visual_score: f64, audio_score: f64) -> Self {
        Self {
            time_secs,
            visual_score,
            audio_score,
        }
    }

    /// A video-only sample.
    pub fn visual(time_secs: f64, visual_score: f64) -> Self {
        Self::new(time_secs, visual_score, 0.0)
    }
}

/// One analyzed instant, as reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time_secs: f64,
    pub visual_score: f64,
    pub audio_score: f64,

    /// Weighted fusion of normalized visual and audio activity, on a 0-255 scale.
    pub fused_value: f64,

    /// Signal fed to peak detection: the detrended fused value when steady
    /// motion is ignored, otherwise identical to `fused_value`.
    pub activity: f64,

    /// Whether this instant was flagged as a hard visual discontinuity.
    #[serde(default)]
    pub is_scene_cut: bool,
}

/// A local maximum of the smoothed activity signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub time_secs: f64,
    pub value: f64,
    /// Position of the peak in the sample sequence.
    pub source_index: usize,
}
