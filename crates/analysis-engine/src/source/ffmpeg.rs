//! ffmpeg/ffprobe-backed sources.
//!
//! Every frame request spawns one `ffmpeg` process that seeks, scales the
//! frame down to the scoring size and writes raw `rgb24` bytes to stdout.
//! Audio is decoded once, as mono `f32le` PCM.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use loopscan_analysis_model::audio::DecodedAudio;
use loopscan_analysis_model::frame::PixelBuffer;
use loopscan_common::config::MediaConfig;
use loopscan_common::error::{LoopscanError, LoopscanResult};

use super::{AudioSource, FrameSource, MediaInfo};

/// Frame source that seeks through a video file with ffmpeg.
pub struct FfmpegFrameSource {
    path: PathBuf,
    media: MediaConfig,
    name: String,
    previous: Option<PixelBuffer>,
}

impl FfmpegFrameSource {
    pub fn new(path: impl Into<PathBuf>, media: MediaConfig) -> Self {
        let path = path.into();
        let name = format!("ffmpeg:{}", path.display());
        Self {
            path,
            media,
            name,
            previous: None,
        }
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn open(&mut self) -> LoopscanResult<MediaInfo> {
        if !self.path.exists() {
            return Err(LoopscanError::FileNotFound {
                path: self.path.clone(),
            });
        }
        self.previous = None;

        let info = probe_media(&self.media.ffprobe_binary, &self.path).await?;
        tracing::info!(
            path = %self.path.display(),
            duration_secs = info.duration_secs,
            width = info.width,
            height = info.height,
            has_audio = info.has_audio,
            "Opened video"
        );
        Ok(info)
    }

    async fn seek_and_capture(&mut self, time_secs: f64) -> LoopscanResult<PixelBuffer> {
        let size = self.media.frame_size;
        let output = Command::new(&self.media.ffmpeg_binary)
            .args(frame_args(&self.path, time_secs, size))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| LoopscanError::capture(format!("Failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LoopscanError::capture(format!(
                "ffmpeg failed to grab frame at {time_secs:.3}s: {}",
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            // Seeking into the last partial frame interval decodes nothing.
            return match &self.previous {
                Some(previous) => {
                    tracing::warn!(
                        time_secs,
                        "No frame decoded near end of stream; reusing previous frame"
                    );
                    Ok(previous.clone())
                }
                None => Err(LoopscanError::capture(format!(
                    "ffmpeg produced no frame at {time_secs:.3}s"
                ))),
            };
        }

        let frame = PixelBuffer::new(size, size, output.stdout)?;
        self.previous = Some(frame.clone());
        Ok(frame)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Audio source that decodes a file's first audio stream with ffmpeg.
pub struct FfmpegAudioSource {
    path: PathBuf,
    media: MediaConfig,
    name: String,
}

impl FfmpegAudioSource {
    pub fn new(path: impl Into<PathBuf>, media: MediaConfig) -> Self {
        let path = path.into();
        let name = format!("ffmpeg-audio:{}", path.display());
        Self { path, media, name }
    }
}

#[async_trait]
impl AudioSource for FfmpegAudioSource {
    async fn decode(&mut self) -> LoopscanResult<DecodedAudio> {
        let sample_rate = self.media.audio_sample_rate;
        let output = Command::new(&self.media.ffmpeg_binary)
            .args(audio_args(&self.path, sample_rate))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| LoopscanError::audio(format!("Failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LoopscanError::audio(format!(
                "ffmpeg failed to decode audio: {}",
                stderr.trim()
            )));
        }

        let samples = pcm_from_f32le(&output.stdout);
        if samples.is_empty() {
            return Err(LoopscanError::audio("No audio samples decoded"));
        }

        tracing::debug!(
            sample_rate,
            samples = samples.len(),
            "Decoded audio track"
        );
        Ok(DecodedAudio::new(sample_rate, samples))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Probe duration, video size and audio presence with ffprobe.
pub async fn probe_media(ffprobe: &str, path: &Path) -> LoopscanResult<MediaInfo> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration:stream=codec_type,width,height,duration",
            "-of",
            "json",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| LoopscanError::source(format!("Failed to start ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LoopscanError::source(format!(
            "ffprobe could not read {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&raw)
}

/// Whether `binary` resolves on `PATH`.
pub async fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn parse_probe_output(raw: &str) -> LoopscanResult<MediaInfo> {
    let probe: ProbeOutput = serde_json::from_str(raw)?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| LoopscanError::source("No video stream found"))?;
    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    // Container duration first; some muxers only report it per stream.
    let duration_secs = probe
        .format
        .as_ref()
        .and_then(|f| parse_duration(f.duration.as_deref()))
        .or_else(|| parse_duration(video.duration.as_deref()))
        .ok_or_else(|| LoopscanError::source("Media reports no duration"))?;

    Ok(MediaInfo {
        duration_secs,
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        has_audio,
    })
}

fn parse_duration(raw: Option<&str>) -> Option<f64> {
    raw?.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

fn frame_args(path: &Path, time_secs: f64, size: u32) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        // Input-side seek: fast, lands on the frame shown at `time_secs`.
        "-ss".to_string(),
        format!("{time_secs:.3}"),
        "-i".to_string(),
        path.display().to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        "-vf".to_string(),
        format!("scale={size}:{size}"),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-".to_string(),
    ]
}

fn audio_args(path: &Path, sample_rate: u32) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        path.display().to_string(),
        "-vn".to_string(),
        "-ac".to_string(),
        "1".to_string(),
        "-ar".to_string(),
        sample_rate.to_string(),
        "-f".to_string(),
        "f32le".to_string(),
        "-".to_string(),
    ]
}

/// Interpret little-endian f32 bytes. A trailing partial sample is dropped.
fn pcm_from_f32le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
