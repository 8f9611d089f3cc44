//! Scene-cut flagging from raw visual scores.

use loopscan_analysis_model::sample::RawSample;

/// A raw visual score this many times the clip mean marks a hard cut.
pub const SCENE_CUT_FACTOR: f64 = 6.0;

/// Flag every instant whose raw visual score exceeds `6 × mean`.
///
/// Flags only gate loop and set assembly; they never alter the fused signal.
pub fn detect_scene_cuts(raw: &[RawSample]) -> Vec<bool> {
    if raw.is_empty() {
        return vec![];
    }
    let mean = raw.iter().map(|s| s.visual_score).sum::<f64>() / raw.len() as f64;
    let threshold = SCENE_CUT_FACTOR * mean;

    let flags: Vec<bool> = raw.iter().map(|s| s.visual_score > threshold).collect();
    tracing::debug!(
        threshold,
        cuts = flags.iter().filter(|f| **f).count(),
        "Scene-cut detection complete"
    );
    flags
}

/// Whether any flagged instant lies strictly between two sample indices.
pub fn cut_between(flags: &[bool], from_index: usize, to_index: usize) -> bool {
    if to_index <= from_index + 1 {
        return false;
    }
    let end = to_index.min(flags.len());
    flags
        .get(from_index + 1..end)
        .map(|window| window.iter().any(|f| *f))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spike_is_flagged() {
        let mut raw: Vec<RawSample> = (0..20).map(|i| RawSample::visual(i as f64 * 0.1, 1.0)).collect();
        raw[10].visual_score = 100.0;
        // mean = (19 + 100) / 20 = 5.95, threshold = 35.7
        let flags = detect_scene_cuts(&raw);
        assert!(flags[10]);
        assert_eq!(flags.iter().filter(|f| **f).count(), 1);
    }

    #[test]
    fn test_still_clip_has_no_cuts() {
        let raw: Vec<RawSample> = (0..10).map(|i| RawSample::visual(i as f64, 0.0)).collect();
        assert!(detect_scene_cuts(&raw).iter().all(|f| !*f));
    }

    #[test]
    fn test_cut_between_is_exclusive() {
        let mut flags = vec![false; 10];
        flags[5] = true;
        assert!(cut_between(&flags, 2, 8));
        assert!(!cut_between(&flags, 5, 8));
        assert!(!cut_between(&flags, 2, 5));
        assert!(!cut_between(&flags, 4, 5));
    }

    #[test]
    fn test_cut_between_tolerates_short_flags() {
        assert!(!cut_between(&[], 0, 10));
    }
}
