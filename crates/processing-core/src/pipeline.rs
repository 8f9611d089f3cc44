//! The full signal pipeline from raw per-instant scores to loop records.
//!
//! # Stages
//!
//! 1. **Fuse** raw visual/audio scores into one 0-255 activity value.
//! 2. **Flag** scene cuts from raw visual scores (optional).
//! 3. **Detrend** the fused signal to drop steady motion (optional).
//! 4. **Pick peaks** on the smoothed signal.
//! 5. **Assemble** atomic loops into reps or sets.
//!
//! Every stage consumes a complete sequence and returns a new one; nothing
//! is mutated in place.

use loopscan_analysis_model::loops::{AtomicLoop, LoopRecord};
use loopscan_analysis_model::sample::{Peak, RawSample, Sample};
use loopscan_analysis_model::settings::AnalysisSettings;
use loopscan_common::error::LoopscanResult;

use crate::assembler::{AssemblerConfig, LoopAssembler};
use crate::detrend::detrend;
use crate::fusion::{fuse, FusionWeights};
use crate::peaks::PeakDetector;
use crate::scene_cut::detect_scene_cuts;

/// The caller-facing output of the pipeline.
#[derive(Debug, Clone)]
pub struct SignalAnalysis {
    pub samples: Vec<Sample>,
    pub loops: Vec<LoopRecord>,
}

/// Intermediate sequences, kept for inspection and visualization.
#[derive(Debug, Clone)]
pub struct SignalDiagnostics {
    pub smoothed: Vec<f64>,
    pub peak_threshold: f64,
    pub peaks: Vec<Peak>,
    pub atomic_loops: Vec<AtomicLoop>,
}

/// Runs the whole pipeline for one set of analysis settings.
pub struct LoopDetector {
    settings: AnalysisSettings,
}

impl LoopDetector {
    /// Create a detector. Settings are assumed to be validated already.
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    /// Create a detector after validating `settings`.
    pub fn try_new(settings: AnalysisSettings) -> LoopscanResult<Self> {
        settings.validate()?;
        Ok(Self::new(settings))
    }

    /// Create a detector with default settings.
    pub fn with_defaults() -> Self {
        Self::new(AnalysisSettings::default())
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Analyze raw samples and return samples plus loop records.
    pub fn analyze(&self, raw: &[RawSample]) -> SignalAnalysis {
        let (analysis, _) = self.analyze_with_diagnostics(raw);
        analysis
    }

    /// Analyze raw samples and also return the intermediate sequences.
    pub fn analyze_with_diagnostics(&self, raw: &[RawSample]) -> (SignalAnalysis, SignalDiagnostics) {
        let settings = &self.settings;
        let weights = FusionWeights::from_audio_fraction(settings.audio_fraction());

        let fused = fuse(raw, weights);
        let scene_cuts = if settings.detect_scene_changes {
            detect_scene_cuts(raw)
        } else {
            vec![false; raw.len()]
        };
        let activity = if settings.ignore_steady_motion {
            detrend(&fused, settings.sampling_rate)
        } else {
            fused.clone()
        };

        let times: Vec<f64> = raw.iter().map(|s| s.time_secs).collect();
        let detection = PeakDetector::new(settings.smoothing_window, settings.sensitivity)
            .detect(&activity, &times);

        let assembler = LoopAssembler::new(AssemblerConfig::from(settings));
        let atomic_loops = assembler.atomic_loops(&detection.peaks, &scene_cuts);
        let loops = assembler.assemble(&atomic_loops, &scene_cuts);

        tracing::info!(
            samples = raw.len(),
            peaks = detection.peaks.len(),
            atomic_loops = atomic_loops.len(),
            loops = loops.len(),
            mode = ?settings.detection_mode,
            "Loop detection complete"
        );

        let samples = raw
            .iter()
            .zip(fused.iter().zip(activity.iter()))
            .zip(scene_cuts.iter())
            .map(|((s, (&fused_value, &activity)), &is_scene_cut)| Sample {
                time_secs: s.time_secs,
                visual_score: s.visual_score,
                audio_score: s.audio_score,
                fused_value,
                activity,
                is_scene_cut,
            })
            .collect();

        (
            SignalAnalysis { samples, loops },
            SignalDiagnostics {
                smoothed: detection.smoothed,
                peak_threshold: detection.threshold,
                peaks: detection.peaks,
                atomic_loops,
            },
        )
    }
}
