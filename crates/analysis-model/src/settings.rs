//! User-facing analysis settings and their validation.

use std::path::Path;

use loopscan_common::error::{LoopscanError, LoopscanResult};
use serde::{Deserialize, Serialize};

use crate::loops::DetectionMode;

/// Every knob of one analysis run. Validated once at the call boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Peak strictness in `[1, 100]`. Larger values raise the peak threshold.
    pub sensitivity: u32,

    /// Shortest accepted loop, seconds (inclusive).
    pub min_loop_duration: f64,

    /// Longest accepted loop, seconds (inclusive).
    pub max_loop_duration: f64,

    /// Sample instants per second, `[2, 30]`.
    pub sampling_rate: u32,

    /// Half-width of the pre-peak smoothing window, in samples.
    pub smoothing_window: usize,

    pub detection_mode: DetectionMode,

    /// Flag visual discontinuities and refuse to bridge them.
    pub detect_scene_changes: bool,

    /// Subtract a local trend to suppress pans and drift.
    pub ignore_steady_motion: bool,

    /// Audio share of the fused signal, percent `[0, 100]`.
    pub audio_weight: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            sensitivity: 50,
            min_loop_duration: 0.4,
            max_loop_duration: 6.0,
            sampling_rate: 10,
            smoothing_window: 2,
            detection_mode: DetectionMode::Sets,
            detect_scene_changes: true,
            ignore_steady_motion: false,
            audio_weight: 30,
        }
    }
}

impl AnalysisSettings {
    pub const SENSITIVITY_RANGE: (u32, u32) = (1, 100);
    pub const SAMPLING_RATE_RANGE: (u32, u32) = (2, 30);
    pub const MAX_AUDIO_WEIGHT: u32 = 100;

    /// Reject settings outside their documented ranges.
    pub fn validate(&self) -> LoopscanResult<()> {
        let (min_s, max_s) = Self::SENSITIVITY_RANGE;
        if !(min_s..=max_s).contains(&self.sensitivity) {
            return Err(LoopscanError::config(format!(
                "sensitivity must be in [{min_s}, {max_s}], got {}",
                self.sensitivity
            )));
        }

        if !self.min_loop_duration.is_finite() || self.min_loop_duration <= 0.0 {
            return Err(LoopscanError::config(format!(
                "min_loop_duration must be > 0, got {}",
                self.min_loop_duration
            )));
        }

        if !self.max_loop_duration.is_finite() || self.max_loop_duration < self.min_loop_duration
        {
            return Err(LoopscanError::config(format!(
                "max_loop_duration must be >= min_loop_duration ({}), got {}",
                self.min_loop_duration, self.max_loop_duration
            )));
        }

        let (min_r, max_r) = Self::SAMPLING_RATE_RANGE;
        if !(min_r..=max_r).contains(&self.sampling_rate) {
            return Err(LoopscanError::config(format!(
                "sampling_rate must be in [{min_r}, {max_r}] fps, got {}",
                self.sampling_rate
            )));
        }

        if self.audio_weight > Self::MAX_AUDIO_WEIGHT {
            return Err(LoopscanError::config(format!(
                "audio_weight must be in [0, {}], got {}",
                Self::MAX_AUDIO_WEIGHT,
                self.audio_weight
            )));
        }

        Ok(())
    }

    /// Audio weight as a fraction in `[0, 1]`.
    pub fn audio_fraction(&self) -> f64 {
        self.audio_weight.min(Self::MAX_AUDIO_WEIGHT) as f64 / 100.0
    }

    /// Whether the audio path should run at all.
    pub fn uses_audio(&self) -> bool {
        self.audio_weight > 0
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> LoopscanResult<Self> {
        if !path.exists() {
            return Err(LoopscanError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }
}
