//! Show probed media information.

use std::path::PathBuf;

use loopscan_analysis_engine::source::ffmpeg::probe_media;
use loopscan_analysis_model::settings::AnalysisSettings;
use loopscan_common::clock::SampleClock;
use loopscan_common::config::AppConfig;

pub async fn run(config: &AppConfig, video: PathBuf, json: bool) -> anyhow::Result<()> {
    if !video.exists() {
        anyhow::bail!("Video not found: {}", video.display());
    }

    let info = probe_media(&config.media.ffprobe_binary, &video)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to probe video: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Video: {}", video.display());
    println!("  Duration: {:.2}s", info.duration_secs);
    println!("  Resolution: {}x{}", info.width, info.height);
    println!("  Audio: {}", if info.has_audio { "yes" } else { "no" });
    println!();

    let rate = AnalysisSettings::default().sampling_rate;
    let clock = SampleClock::new(rate, info.duration_secs);
    println!(
        "Analysis at {rate} fps scores {} frames ({}x{} each)",
        clock.sample_count(),
        config.media.frame_size,
        config.media.frame_size
    );

    Ok(())
}
