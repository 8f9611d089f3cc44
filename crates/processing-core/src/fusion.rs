//! Two-pass fusion of visual and audio activity.
//!
//! The first pass collects raw scores for the whole clip and computes the
//! per-channel means. The second pass normalizes every instant against
//! twice its channel mean, clamps to `[0, 1]` and mixes the two channels
//! into a single 0-255 activity value. Gain is relative to the clip's own
//! average activity, so quiet and busy clips end up on the same scale.

use loopscan_analysis_model::sample::RawSample;

/// Scale of the fused signal.
pub const FUSED_SCALE: f64 = 255.0;

/// Relative weights of the two channels. Always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub video: f64,
    pub audio: f64,
}

impl FusionWeights {
    /// Weights from an audio share in `[0, 1]`; video takes the rest.
    pub fn from_audio_fraction(audio: f64) -> Self {
        let audio = audio.clamp(0.0, 1.0);
        Self {
            video: 1.0 - audio,
            audio,
        }
    }

    pub fn video_only() -> Self {
        Self::from_audio_fraction(0.0)
    }
}

/// Per-channel means used as the normalization reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityMeans {
    pub visual: f64,
    pub audio: f64,
}

impl ActivityMeans {
    /// Arithmetic means over the clip. An empty clip or a silent/still
    /// channel falls back to 1 so normalization never divides by zero.
    pub fn from_samples(raw: &[RawSample]) -> Self {
        if raw.is_empty() {
            return Self {
                visual: 1.0,
                audio: 1.0,
            };
        }
        let n = raw.len() as f64;
        let visual = raw.iter().map(|s| s.visual_score).sum::<f64>() / n;
        let audio = raw.iter().map(|s| s.audio_score).sum::<f64>() / n;
        Self {
            visual: non_zero_or_one(visual),
            audio: non_zero_or_one(audio),
        }
    }
}

fn non_zero_or_one(mean: f64) -> f64 {
    if mean > 0.0 && mean.is_finite() {
        mean
    } else {
        1.0
    }
}

/// Normalize one score against its channel mean, clamped to `[0, 1]`.
pub fn normalize(score: f64, mean: f64) -> f64 {
    (score / (2.0 * mean)).clamp(0.0, 1.0)
}

/// Fused activity for every instant, on the 0-255 scale.
pub fn fuse(raw: &[RawSample], weights: FusionWeights) -> Vec<f64> {
    let means = ActivityMeans::from_samples(raw);
    raw.iter()
        .map(|s| {
            let norm_v = normalize(s.visual_score, means.visual);
            let norm_a = normalize(s.audio_score, means.audio);
            (norm_v * weights.video + norm_a * weights.audio) * FUSED_SCALE
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_weights_sum_to_one() {
        let w = FusionWeights::from_audio_fraction(0.3);
        assert!((w.video + w.audio - 1.0).abs() < 1e-12);
        assert_eq!(FusionWeights::from_audio_fraction(2.0).audio, 1.0);
    }

    #[test]
    fn test_score_at_twice_mean_saturates() {
        let raw = vec![RawSample::visual(0.0, 0.0), RawSample::visual(0.1, 4.0)];
        // mean = 2, so 4 / (2 * 2) = 1
        let fused = fuse(&raw, FusionWeights::video_only());
        assert_eq!(fused[0], 0.0);
        assert!((fused[1] - 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_audio_weight_mixes_channels() {
        let raw = vec![
            RawSample::new(0.0, 2.0, 0.0),
            RawSample::new(0.1, 2.0, 10.0),
        ];
        // visual: mean 2 -> norm 0.5 everywhere; audio: mean 5 -> 0 and 1
        let fused = fuse(&raw, FusionWeights::from_audio_fraction(0.5));
        assert!((fused[0] - 0.25 * 255.0).abs() < 1e-9);
        assert!((fused[1] - 0.75 * 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_clip_fuses_to_zero() {
        let raw: Vec<RawSample> = (0..10).map(|i| RawSample::visual(i as f64 * 0.1, 0.0)).collect();
        let fused = fuse(&raw, FusionWeights::from_audio_fraction(0.3));
        assert!(fused.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_empty_clip_means_fall_back_to_one() {
        let means = ActivityMeans::from_samples(&[]);
        assert_eq!(means.visual, 1.0);
        assert_eq!(means.audio, 1.0);
        assert!(fuse(&[], FusionWeights::video_only()).is_empty());
    }

    proptest! {
        #[test]
        fn normalized_scores_stay_in_unit_range(
            scores in prop::collection::vec((0.0f64..1e6, 0.0f64..1e6), 1..200),
        ) {
            let raw: Vec<RawSample> = scores
                .iter()
                .enumerate()
                .map(|(i, (v, a))| RawSample::new(i as f64 * 0.1, *v, *a))
                .collect();
            let means = ActivityMeans::from_samples(&raw);
            for s in &raw {
                let nv = normalize(s.visual_score, means.visual);
                let na = normalize(s.audio_score, means.audio);
                prop_assert!((0.0..=1.0).contains(&nv));
                prop_assert!((0.0..=1.0).contains(&na));
            }
        }

        #[test]
        fn fused_values_stay_on_scale(
            scores in prop::collection::vec((0.0f64..1e4, 0.0f64..1e4), 1..200),
            audio_weight in 0u32..=100,
        ) {
            let raw: Vec<RawSample> = scores
                .iter()
                .enumerate()
                .map(|(i, (v, a))| RawSample::new(i as f64 * 0.1, *v, *a))
                .collect();
            let fused = fuse(&raw, FusionWeights::from_audio_fraction(audio_weight as f64 / 100.0));
            for v in fused {
                prop_assert!(v >= 0.0 && v <= FUSED_SCALE + 1e-9);
            }
        }
    }
}
