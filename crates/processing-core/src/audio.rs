//! Windowed RMS audio energy.

use loopscan_analysis_model::audio::DecodedAudio;

/// Scale applied to raw RMS so it lands near the range of visual scores.
pub const AUDIO_SCALE: f64 = 1000.0;

/// RMS of the samples in `[time, time + window)`, clipped to the track.
///
/// Returns 0 when the window holds no samples.
pub fn windowed_rms(audio: &DecodedAudio, time_secs: f64, window_secs: f64) -> f64 {
    if audio.is_empty() || window_secs <= 0.0 || time_secs < 0.0 {
        return 0.0;
    }

    let rate = audio.sample_rate as f64;
    let len = audio.samples.len();
    let start = ((time_secs * rate).floor() as usize).min(len);
    let end = (((time_secs + window_secs) * rate).floor() as usize).min(len);
    if start >= end {
        return 0.0;
    }

    let window = &audio.samples[start..end];
    let sum_sq: f64 = window.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / window.len() as f64).sqrt()
}

/// Audio score for one sample instant: scaled windowed RMS.
pub fn audio_score(audio: &DecodedAudio, time_secs: f64, window_secs: f64) -> f64 {
    windowed_rms(audio, time_secs, window_secs) * AUDIO_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_amplitude_rms() {
        let audio = DecodedAudio::new(100, vec![0.5; 1000]);
        assert!((windowed_rms(&audio, 1.0, 0.1) - 0.5).abs() < 1e-9);
        assert!((audio_score(&audio, 1.0, 0.1) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_alternating_sign_uses_magnitude() {
        let samples: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 0.25 } else { -0.25 }).collect();
        let audio = DecodedAudio::new(100, samples);
        assert!((windowed_rms(&audio, 0.0, 0.5) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_window_is_clipped_to_track() {
        let audio = DecodedAudio::new(10, vec![1.0; 10]);
        // Only the last two samples fall inside the track.
        assert!((windowed_rms(&audio, 0.8, 1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_past_end_is_zero() {
        let audio = DecodedAudio::new(10, vec![1.0; 10]);
        assert_eq!(audio_score(&audio, 5.0, 0.1), 0.0);
    }

    #[test]
    fn test_empty_track_is_zero() {
        let audio = DecodedAudio::default();
        assert_eq!(audio_score(&audio, 0.0, 0.1), 0.0);
    }
}
