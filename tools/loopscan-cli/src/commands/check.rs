//! Check that ffmpeg tooling is available.

use loopscan_analysis_engine::source::ffmpeg::command_exists;
use loopscan_common::config::{config_file_path, AppConfig};

pub async fn run(config: &AppConfig, init_config: bool) -> anyhow::Result<()> {
    println!("Loopscan System Check");
    println!("{}", "=".repeat(50));

    let mut all_ok = true;
    for binary in [&config.media.ffmpeg_binary, &config.media.ffprobe_binary] {
        if command_exists(binary).await {
            println!("[OK] {binary}");
        } else {
            println!("[MISSING] {binary} (install ffmpeg or set media paths in the config)");
            all_ok = false;
        }
    }

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else if init_config {
        config.save()?;
        println!("[OK] Config written: {}", config_path.display());
    } else {
        println!("[INFO] No config file at {} (using defaults)", config_path.display());
    }
    println!("     Results directory: {}", config.results_dir.display());

    println!();
    if all_ok {
        println!("ffmpeg tooling is available. Loopscan is ready.");
    } else {
        println!("Some tools are missing. See above for fixes.");
    }

    Ok(())
}
