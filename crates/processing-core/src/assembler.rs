//! Loop assembly: peaks → atomic loops → reps or sets.
//!
//! # Atomic loops
//!
//! Each consecutive peak pair is a candidate. It is discarded when its
//! duration falls outside `[min, max]` (inclusive) or, with scene-cut
//! detection on, when a flagged instant lies strictly between the peaks.
//!
//! # Sets
//!
//! Atomic loops are walked in time order with one open group. A loop joins
//! the group when the gap since the group's last loop is shorter than
//! `max(2.0, last.duration × 3.0)` and no scene cut falls inside that gap;
//! otherwise the group is closed and a new one starts.

use loopscan_analysis_model::loops::{AtomicLoop, DetectionMode, LoopRecord};
use loopscan_analysis_model::sample::Peak;
use loopscan_analysis_model::settings::AnalysisSettings;

use crate::fusion::FUSED_SCALE;
use crate::scene_cut::cut_between;

/// Multiplier mapping typical peak magnitudes close to a confidence of 1.
///
/// Heuristic, not a calibrated probability.
pub const CONFIDENCE_SCALE: f64 = 5.0;

/// Slack on the duration bounds so `i / rate` rounding never rejects an exact fit.
pub const DURATION_TOLERANCE_SECS: f64 = 1e-9;

/// Gaps shorter than this always keep a set open, in seconds.
pub const MIN_SET_GAP_SECS: f64 = 2.0;

/// Gaps shorter than this many previous-loop durations keep a set open.
pub const SET_GAP_FACTOR: f64 = 3.0;

/// Parameters for loop assembly.
#[derive(Debug, Clone, Copy)]
pub struct AssemblerConfig {
    pub min_loop_duration: f64,
    pub max_loop_duration: f64,
    pub mode: DetectionMode,
    /// Refuse loops and set merges that span a flagged scene cut.
    pub respect_scene_cuts: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig::from(&AnalysisSettings::default())
    }
}

impl From<&AnalysisSettings> for AssemblerConfig {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            min_loop_duration: settings.min_loop_duration,
            max_loop_duration: settings.max_loop_duration,
            mode: settings.detection_mode,
            respect_scene_cuts: settings.detect_scene_changes,
        }
    }
}

/// Turns peaks into final loop records.
pub struct LoopAssembler {
    config: AssemblerConfig,
}

impl LoopAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Validate every consecutive peak pair as an atomic loop.
    ///
    /// `scene_cuts[i]` flags sample `i`; it is ignored unless scene cuts are respected.
    pub fn atomic_loops(&self, peaks: &[Peak], scene_cuts: &[bool]) -> Vec<AtomicLoop> {
        peaks
            .windows(2)
            .filter_map(|pair| {
                let (a, b) = (&pair[0], &pair[1]);
                let duration = b.time_secs - a.time_secs;

                if duration < self.config.min_loop_duration - DURATION_TOLERANCE_SECS
                    || duration > self.config.max_loop_duration + DURATION_TOLERANCE_SECS
                {
                    return None;
                }
                if self.config.respect_scene_cuts
                    && cut_between(scene_cuts, a.source_index, b.source_index)
                {
                    tracing::debug!(
                        start = a.time_secs,
                        end = b.time_secs,
                        "Dropping loop across scene cut"
                    );
                    return None;
                }

                Some(AtomicLoop {
                    start_secs: a.time_secs,
                    end_secs: b.time_secs,
                    start_index: a.source_index,
                    end_index: b.source_index,
                    bpm: bpm_for(duration),
                    confidence: loop_confidence(a.value, b.value),
                })
            })
            .collect()
    }

    /// Report atomic loops according to the configured mode.
    pub fn assemble(&self, atomic: &[AtomicLoop], scene_cuts: &[bool]) -> Vec<LoopRecord> {
        match self.config.mode {
            DetectionMode::Reps => atomic
                .iter()
                .enumerate()
                .map(|(i, l)| LoopRecord::from_atomic(l, format!("Repetition {}", i + 1)))
                .collect(),
            DetectionMode::Sets => self
                .group_sets(atomic, scene_cuts)
                .iter()
                .filter_map(|group| merge_set(group))
                .collect(),
        }
    }

    /// Split time-ordered atomic loops into runs that belong to one set.
    pub fn group_sets(&self, atomic: &[AtomicLoop], scene_cuts: &[bool]) -> Vec<Vec<AtomicLoop>> {
        let mut groups: Vec<Vec<AtomicLoop>> = vec![];
        let mut current: Vec<AtomicLoop> = vec![];

        for next in atomic {
            let joins = current
                .last()
                .map(|last| self.continues_set(last, next, scene_cuts))
                .unwrap_or(true);

            if !joins {
                groups.push(std::mem::take(&mut current));
            }
            current.push(*next);
        }

        if !current.is_empty() {
            groups.push(current);
        }
        groups
    }

    fn continues_set(&self, last: &AtomicLoop, next: &AtomicLoop, scene_cuts: &[bool]) -> bool {
        let gap = next.start_secs - last.end_secs;
        let allowed = MIN_SET_GAP_SECS.max(last.duration_secs() * SET_GAP_FACTOR);
        if gap >= allowed {
            return false;
        }
        !(self.config.respect_scene_cuts
            && cut_between(scene_cuts, last.end_index, next.start_index))
    }
}

/// `round(60 / duration)`.
pub fn bpm_for(duration_secs: f64) -> u32 {
    if duration_secs <= 0.0 {
        return 0;
    }
    (60.0 / duration_secs).round() as u32
}

/// `min(1, (a + b) / (2 × 255) × 5)` from the two bounding peak values.
pub fn loop_confidence(start_peak: f64, end_peak: f64) -> f64 {
    ((start_peak + end_peak) / (2.0 * FUSED_SCALE) * CONFIDENCE_SCALE).min(1.0)
}

/// Merge a time-ordered group into one set record. `None` for an empty group.
pub fn merge_set(members: &[AtomicLoop]) -> Option<LoopRecord> {
    let n = members.len();
    let (first, last) = (members.first()?, members.last()?);

    let mean_bpm = members.iter().map(|l| l.bpm as f64).sum::<f64>() / n as f64;
    let mean_confidence = members.iter().map(|l| l.confidence).sum::<f64>() / n as f64;

    Some(LoopRecord {
        start_secs: first.start_secs,
        end_secs: last.end_secs,
        duration_secs: last.end_secs - first.start_secs,
        bpm: mean_bpm.round() as u32,
        confidence: mean_confidence,
        rep_count: n,
        label: format!("Set of {n} Reps"),
        thumbnail: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use loopscan_common::clock::SampleClock;
    use proptest::prelude::*;

    fn peak(time_secs: f64, value: f64, rate: f64) -> Peak {
        Peak {
            time_secs,
            value,
            source_index: (time_secs * rate).round() as usize,
        }
    }

    fn atomic(start_secs: f64, end_secs: f64, rate: f64) -> AtomicLoop {
        AtomicLoop {
            start_secs,
            end_secs,
            start_index: (start_secs * rate).round() as usize,
            end_index: (end_secs * rate).round() as usize,
            bpm: bpm_for(end_secs - start_secs),
            confidence: 0.5,
        }
    }

    fn assembler(mode: DetectionMode, respect_scene_cuts: bool) -> LoopAssembler {
        LoopAssembler::new(AssemblerConfig {
            min_loop_duration: 0.5,
            max_loop_duration: 3.0,
            mode,
            respect_scene_cuts,
        })
    }

    #[test]
    fn test_confidence_heuristic() {
        // (25.5 + 25.5) / 510 * 5 = 0.5
        assert!((loop_confidence(25.5, 25.5) - 0.5).abs() < 1e-12);
        assert_eq!(loop_confidence(200.0, 255.0), 1.0);
    }

    #[test]
    fn test_bpm_rounds() {
        assert_eq!(bpm_for(1.0), 60);
        assert_eq!(bpm_for(0.7), 86); // 85.71
        assert_eq!(bpm_for(0.0), 0);
    }

    #[test]
    fn test_duration_bounds_are_inclusive() {
        let a = assembler(DetectionMode::Reps, false);
        // Gaps of exactly 0.5 (min) and 3.0 (max), then 3.5 (too long).
        let peaks = vec![
            peak(0.0, 100.0, 10.0),
            peak(0.5, 100.0, 10.0),
            peak(3.5, 100.0, 10.0),
            peak(7.0, 100.0, 10.0),
        ];
        let loops = a.atomic_loops(&peaks, &[]);
        assert_eq!(loops.len(), 2);
        assert!((loops[0].duration_secs() - 0.5).abs() < 1e-9);
        assert!((loops[1].duration_secs() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_bounds_hold_at_every_clock_position() {
        let clock = SampleClock::new(10, 12.0);
        let a = LoopAssembler::new(AssemblerConfig {
            min_loop_duration: 0.4,
            max_loop_duration: 0.7,
            mode: DetectionMode::Reps,
            respect_scene_cuts: false,
        });
        let at = |i: usize| Peak {
            time_secs: clock.time_at(i),
            value: 100.0,
            source_index: i,
        };

        for start in 0..clock.sample_count() - 8 {
            // 4 samples is exactly min, 7 exactly max; 3 and 8 fall outside.
            for (span, kept) in [(3, false), (4, true), (7, true), (8, false)] {
                let loops = a.atomic_loops(&[at(start), at(start + span)], &[]);
                assert_eq!(loops.len() == 1, kept, "start {start}, span {span}");
            }
        }
    }

    #[test]
    fn test_short_loop_is_rejected() {
        let a = assembler(DetectionMode::Reps, false);
        let peaks = vec![peak(1.0, 100.0, 10.0), peak(1.3, 100.0, 10.0)];
        assert!(a.atomic_loops(&peaks, &[]).is_empty());
    }

    #[test]
    fn test_scene_cut_between_peaks_blocks_loop() {
        // Peaks at 2.0 s and 3.0 s, cut flagged at 2.5 s (index 25 at 10 Hz).
        let mut flags = vec![false; 40];
        flags[25] = true;
        let peaks = vec![peak(2.0, 100.0, 10.0), peak(3.0, 100.0, 10.0)];

        assert!(assembler(DetectionMode::Reps, true)
            .atomic_loops(&peaks, &flags)
            .is_empty());
        assert_eq!(
            assembler(DetectionMode::Reps, false)
                .atomic_loops(&peaks, &flags)
                .len(),
            1
        );
    }

    #[test]
    fn test_set_gap_rule_boundary() {
        let a = assembler(DetectionMode::Sets, false);
        let loops = vec![
            atomic(0.0, 1.0, 10.0),
            atomic(1.2, 2.1, 10.0),
            atomic(5.0, 5.9, 10.0),
        ];

        // gap1 = 0.2 < max(2.0, 1.0 * 3.0) = 3.0: merge.
        // gap2 = 2.9 vs max(2.0, 0.9 * 3.0) = 2.7: 2.9 is not < 2.7, split.
        let gap2 = loops[2].start_secs - loops[1].end_secs;
        let allowed = MIN_SET_GAP_SECS.max(loops[1].duration_secs() * SET_GAP_FACTOR);
        assert!((gap2 - 2.9).abs() < 1e-9);
        assert!((allowed - 2.7).abs() < 1e-9);
        assert!(gap2 >= allowed);

        let groups = a.group_sets(&loops, &[]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);

        let sets = a.assemble(&loops, &[]);
        assert_eq!(sets[0].rep_count, 2);
        assert_eq!(sets[0].start_secs, 0.0);
        assert!((sets[0].end_secs - 2.1).abs() < 1e-9);
        assert_eq!(sets[0].label, "Set of 2 Reps");
        assert_eq!(sets[1].rep_count, 1);
        assert_eq!(sets[1].label, "Set of 1 Reps");
    }

    #[test]
    fn test_scene_cut_in_gap_splits_set() {
        let loops = vec![atomic(0.0, 1.0, 10.0), atomic(1.5, 2.5, 10.0)];
        let mut flags = vec![false; 30];
        flags[12] = true;

        assert_eq!(assembler(DetectionMode::Sets, true).group_sets(&loops, &flags).len(), 2);
        assert_eq!(assembler(DetectionMode::Sets, false).group_sets(&loops, &flags).len(), 1);
    }

    #[test]
    fn test_merge_averages_members() {
        let mut a = atomic(0.0, 1.0, 10.0);
        let mut b = atomic(1.0, 1.8, 10.0);
        a.confidence = 0.4;
        b.confidence = 0.8;
        // bpm 60 and 75 -> mean 67.5 -> 68
        let set = merge_set(&[a, b]).unwrap();
        assert!(merge_set(&[]).is_none());
        assert_eq!(set.bpm, 68);
        assert!((set.confidence - 0.6).abs() < 1e-12);
        assert!((set.duration_secs - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_reps_are_labelled_sequentially() {
        let loops = vec![atomic(0.0, 1.0, 10.0), atomic(1.0, 2.0, 10.0)];
        let reps = assembler(DetectionMode::Reps, false).assemble(&loops, &[]);
        assert_eq!(reps[0].label, "Repetition 1");
        assert_eq!(reps[1].label, "Repetition 2");
        assert!(reps.iter().all(|r| r.rep_count == 1));
    }

    #[test]
    fn test_no_peaks_no_loops() {
        let a = assembler(DetectionMode::Sets, true);
        let loops = a.atomic_loops(&[], &[]);
        assert!(loops.is_empty());
        assert!(a.assemble(&loops, &[]).is_empty());
    }

    proptest! {
        #[test]
        fn sets_partition_reps(
            gaps in prop::collection::vec((0.0f64..5.0, 0.5f64..3.0), 0..40),
        ) {
            let mut loops = vec![];
            let mut t = 0.0;
            for (gap, duration) in gaps {
                let start = t + gap;
                let end = start + duration;
                loops.push(atomic(start, end, 10.0));
                t = end;
            }

            let reps = assembler(DetectionMode::Reps, false).assemble(&loops, &[]);
            let sets = assembler(DetectionMode::Sets, false).assemble(&loops, &[]);

            prop_assert_eq!(reps.len(), loops.len());
            prop_assert!(reps.iter().all(|r| r.rep_count == 1));
            prop_assert!(sets.len() <= loops.len());
            prop_assert_eq!(sets.iter().map(|s| s.rep_count).sum::<usize>(), loops.len());
        }
    }
}
