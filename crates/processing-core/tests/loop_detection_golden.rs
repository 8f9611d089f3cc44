use loopscan_analysis_model::frame::PixelBuffer;
use loopscan_analysis_model::loops::DetectionMode;
use loopscan_analysis_model::sample::RawSample;
use loopscan_analysis_model::settings::AnalysisSettings;
use loopscan_common::clock::SampleClock;
use loopscan_processing_core::motion::score_frame;
use loopscan_processing_core::LoopDetector;

const FRAME_SIZE: u32 = 48;

/// A diagonal gradient whose contrast is `amplitude`. Every pixel changes
/// by a different amount when the amplitude moves, so rounding to u8
/// averages out across the frame.
fn contrast_frame(amplitude: f64) -> PixelBuffer {
    PixelBuffer::from_fn(FRAME_SIZE, FRAME_SIZE, |x, y| {
        let weight = (x + y) as f64 / 47.0 - 1.0;
        let v = (128.0 + amplitude * weight).round().clamp(0.0, 255.0) as u8;
        [v, v, v]
    })
}

/// Contrast swings with a 2 s period, so its rate of change peaks once per second.
fn pumping_amplitude(t: f64) -> f64 {
    60.0 + 50.0 * (std::f64::consts::PI * (t - 0.02)).sin()
}

fn score_clip(rate: u32, duration: f64, frame_at: impl Fn(f64) -> PixelBuffer) -> Vec<RawSample> {
    let clock = SampleClock::new(rate, duration);
    let mut previous: Option<PixelBuffer> = None;
    let mut raw = Vec::with_capacity(clock.sample_count());
    for t in clock.instants() {
        let frame = frame_at(t);
        let score = score_frame(&frame, previous.as_ref());
        raw.push(RawSample::visual(t, score.visual_score));
        previous = Some(frame);
    }
    raw
}

fn settings(mode: DetectionMode) -> AnalysisSettings {
    AnalysisSettings {
        sensitivity: 1,
        sampling_rate: 10,
        detection_mode: mode,
        audio_weight: 0,
        ..Default::default()
    }
}

#[test]
fn pumping_clip_yields_one_rep_per_second() {
    let raw = score_clip(10, 12.0, |t| contrast_frame(pumping_amplitude(t)));
    let analysis = LoopDetector::new(settings(DetectionMode::Reps)).analyze(&raw);

    assert!(
        analysis.loops.len() >= 8,
        "expected at least 8 reps, got {}",
        analysis.loops.len()
    );
    for record in &analysis.loops {
        assert_eq!(record.rep_count, 1);
        assert!(
            (45..=80).contains(&record.bpm),
            "unexpected bpm {} for {:?}",
            record.bpm,
            record
        );
        assert!(record.confidence > 0.0 && record.confidence <= 1.0);
    }
}

#[test]
fn pumping_clip_merges_into_a_single_set() {
    let raw = score_clip(10, 12.0, |t| contrast_frame(pumping_amplitude(t)));
    let reps = LoopDetector::new(settings(DetectionMode::Reps)).analyze(&raw);
    let sets = LoopDetector::new(settings(DetectionMode::Sets)).analyze(&raw);

    assert_eq!(sets.loops.len(), 1);
    assert_eq!(sets.loops[0].rep_count, reps.loops.len());
    assert_eq!(sets.loops[0].label, format!("Set of {} Reps", reps.loops.len()));
}

#[test]
fn long_pause_splits_sets() {
    let frame_at = |t: f64| {
        let amplitude = if (5.0..10.0).contains(&t) {
            pumping_amplitude(5.0)
        } else {
            pumping_amplitude(t)
        };
        contrast_frame(amplitude)
    };
    let raw = score_clip(10, 15.0, frame_at);
    // Reps last about a second; keep the pause itself from reading as one long loop.
    let analysis = LoopDetector::new(AnalysisSettings {
        max_loop_duration: 3.0,
        ..settings(DetectionMode::Sets)
    })
    .analyze(&raw);

    assert_eq!(analysis.loops.len(), 2, "loops: {:?}", analysis.loops);
    assert!(analysis.loops[0].end_secs <= 5.5);
    assert!(analysis.loops[1].start_secs >= 9.5);
}

#[test]
fn solid_color_clip_has_no_motion_and_no_loops() {
    let raw = score_clip(10, 8.0, |_| PixelBuffer::solid(FRAME_SIZE, FRAME_SIZE, [90, 140, 200]));
    assert!(raw.iter().all(|s| s.visual_score == 0.0));

    for sensitivity in [1, 25, 50, 75, 100] {
        for mode in [DetectionMode::Reps, DetectionMode::Sets] {
            let analysis = LoopDetector::new(AnalysisSettings {
                sensitivity,
                detection_mode: mode,
                ..Default::default()
            })
            .analyze(&raw);
            assert!(analysis.loops.is_empty());
        }
    }
}

#[test]
fn flickering_solid_colors_are_still_flat() {
    // Fades between solid colors change every pixel but carry no structure.
    let raw = score_clip(10, 6.0, |t| {
        let v = if ((t * 10.0).round() as u32) % 2 == 0 { 30 } else { 220 };
        PixelBuffer::solid(FRAME_SIZE, FRAME_SIZE, [v, v, v])
    });
    assert!(raw.iter().all(|s| s.visual_score == 0.0));
    let analysis = LoopDetector::new(settings(DetectionMode::Reps)).analyze(&raw);
    assert!(analysis.loops.is_empty());
}
