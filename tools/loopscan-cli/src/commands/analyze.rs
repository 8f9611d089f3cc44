//! Detect repetitions or sets in a video.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use loopscan_analysis_engine::source::{FfmpegAudioSource, FfmpegFrameSource};
use loopscan_analysis_engine::{
    AnalysisProgress, AnalysisSession, AnalysisStage, AudioSource, ProgressCallback,
};
use loopscan_analysis_model::loops::DetectionMode;
use loopscan_analysis_model::result::AnalysisResult;
use loopscan_analysis_model::settings::AnalysisSettings;
use loopscan_common::config::AppConfig;

/// Settings given on the command line. `None` keeps the base value.
pub struct SettingsOverrides {
    pub sensitivity: Option<u32>,
    pub min_loop_duration: Option<f64>,
    pub max_loop_duration: Option<f64>,
    pub sampling_rate: Option<u32>,
    pub smoothing_window: Option<usize>,
    pub detection_mode: Option<DetectionMode>,
    pub audio_weight: Option<u32>,
    pub no_scene_cuts: bool,
    pub ignore_steady_motion: bool,
    pub no_audio: bool,
}

impl SettingsOverrides {
    fn apply(&self, mut settings: AnalysisSettings) -> AnalysisSettings {
        if let Some(v) = self.sensitivity {
            settings.sensitivity = v;
        }
        if let Some(v) = self.min_loop_duration {
            settings.min_loop_duration = v;
        }
        if let Some(v) = self.max_loop_duration {
            settings.max_loop_duration = v;
        }
        if let Some(v) = self.sampling_rate {
            settings.sampling_rate = v;
        }
        if let Some(v) = self.smoothing_window {
            settings.smoothing_window = v;
        }
        if let Some(v) = self.detection_mode {
            settings.detection_mode = v;
        }
        if let Some(v) = self.audio_weight {
            settings.audio_weight = v;
        }
        if self.no_scene_cuts {
            settings.detect_scene_changes = false;
        }
        if self.ignore_steady_motion {
            settings.ignore_steady_motion = true;
        }
        if self.no_audio {
            settings.audio_weight = 0;
        }
        settings
    }
}

pub async fn run(
    config: &AppConfig,
    video: PathBuf,
    settings_path: Option<PathBuf>,
    overrides: SettingsOverrides,
    output: Option<PathBuf>,
    save: bool,
) -> anyhow::Result<()> {
    let base = match &settings_path {
        Some(path) => AnalysisSettings::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {e}"))?,
        None => AnalysisSettings::default(),
    };
    let settings = overrides.apply(base);
    settings.validate()?;
    tracing::debug!(?settings, "Resolved analysis settings");

    println!("Analyzing: {}", video.display());
    println!(
        "  Mode: {:?}, sensitivity {}, {} fps, loops {:.2}-{:.2}s, audio weight {}",
        settings.detection_mode,
        settings.sensitivity,
        settings.sampling_rate,
        settings.min_loop_duration,
        settings.max_loop_duration,
        settings.audio_weight
    );

    let mut frames = FfmpegFrameSource::new(&video, config.media.clone());
    let mut audio = FfmpegAudioSource::new(&video, config.media.clone());
    let audio_source: Option<&mut dyn AudioSource> = if overrides.no_audio {
        None
    } else {
        Some(&mut audio)
    };

    let mut session = AnalysisSession::new(settings);

    let stop = session.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            eprintln!("Stopping analysis...");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let last_percent = AtomicU8::new(u8::MAX);
    let progress: ProgressCallback = Box::new(move |p: AnalysisProgress| {
        if p.stage != AnalysisStage::Sampling {
            return;
        }
        let percent = p.percent();
        if last_percent.swap(percent, Ordering::Relaxed) != percent {
            eprint!(
                "\r  Sampling: {percent:>3}% ({}/{})",
                p.samples_scored, p.total_samples
            );
        }
    });

    let result = session
        .run(&mut frames, audio_source, Some(progress))
        .await;
    eprintln!();
    let result = result?;

    print_result(&result);

    if let Some(path) = output {
        result.save(&path)?;
        println!("Result written to: {}", path.display());
    }
    if save {
        let path = results_path(&config.results_dir, &video);
        result.save(&path)?;
        println!("Result saved to: {}", path.display());
    }

    Ok(())
}

fn print_result(result: &AnalysisResult) {
    println!();
    if result.is_empty() {
        println!("No repetitions found.");
        return;
    }

    println!(
        "  {:>3}  {:>8}  {:>8}  {:>7}  {:>4}  {:>4}  {:>5}  Label",
        "#", "Start", "End", "Length", "BPM", "Reps", "Conf"
    );
    for (i, record) in result.loops.iter().enumerate() {
        println!(
            "  {:>3}  {:>7.2}s  {:>7.2}s  {:>6.2}s  {:>4}  {:>4}  {:>5.2}  {}",
            i + 1,
            record.start_secs,
            record.end_secs,
            record.duration_secs,
            record.bpm,
            record.rep_count,
            record.confidence,
            record.label
        );
    }
    println!();
    println!(
        "{} loop(s), {} rep(s) total{}",
        result.loops.len(),
        result.total_reps(),
        if result.audio_used { ", audio used" } else { "" }
    );
}

fn results_path(results_dir: &Path, video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    results_dir.join(format!("{stem}.loops.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> SettingsOverrides {
        SettingsOverrides {
            sensitivity: None,
            min_loop_duration: None,
            max_loop_duration: None,
            sampling_rate: None,
            smoothing_window: None,
            detection_mode: None,
            audio_weight: None,
            no_scene_cuts: false,
            ignore_steady_motion: false,
            no_audio: false,
        }
    }

    #[test]
    fn test_no_overrides_keep_base() {
        let base = AnalysisSettings {
            sensitivity: 20,
            ..Default::default()
        };
        let applied = no_overrides().apply(base.clone());
        assert_eq!(applied, base);
    }

    #[test]
    fn test_flags_override_base() {
        let overrides = SettingsOverrides {
            sensitivity: Some(80),
            detection_mode: Some(DetectionMode::Reps),
            no_scene_cuts: true,
            no_audio: true,
            audio_weight: Some(50),
            ..no_overrides()
        };
        let applied = overrides.apply(AnalysisSettings::default());
        assert_eq!(applied.sensitivity, 80);
        assert_eq!(applied.detection_mode, DetectionMode::Reps);
        assert!(!applied.detect_scene_changes);
        // --no-audio wins over an explicit weight.
        assert_eq!(applied.audio_weight, 0);
    }

    #[test]
    fn test_results_path_uses_video_stem() {
        let path = results_path(Path::new("/data/results"), Path::new("/videos/squats.mp4"));
        assert_eq!(path, PathBuf::from("/data/results/squats.loops.json"));
    }
}
