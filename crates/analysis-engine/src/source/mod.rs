//! Frame and audio source contracts.
//!
//! A frame source exposes a single decode position: `seek_and_capture`
//! takes `&mut self`, so the session cannot have two seeks in flight.

pub mod ffmpeg;
pub mod synthetic;

use async_trait::async_trait;
use serde::Serialize;

use loopscan_analysis_model::audio::DecodedAudio;
use loopscan_analysis_model::frame::PixelBuffer;
use loopscan_common::error::LoopscanResult;

pub use ffmpeg::{FfmpegAudioSource, FfmpegFrameSource};
pub use synthetic::{FailingAudioSource, InMemoryAudioSource, SyntheticFrameSource};

/// Stream metadata reported when a frame source is opened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    /// Playable duration in seconds.
    pub duration_secs: f64,

    /// Native video width (before any scoring downscale).
    pub width: u32,

    /// Native video height.
    pub height: u32,

    /// Whether the media carries an audio stream.
    pub has_audio: bool,
}

/// Trait for anything that can hand out low-resolution frames by timestamp.
#[async_trait]
pub trait FrameSource: Send {
    /// Prepare the source and report its metadata.
    async fn open(&mut self) -> LoopscanResult<MediaInfo>;

    /// Seek to `time_secs` and return the frame shown there.
    ///
    /// Must settle before the next call; the session never overlaps seeks.
    async fn seek_and_capture(&mut self, time_secs: f64) -> LoopscanResult<PixelBuffer>;

    /// Source name for logs.
    fn name(&self) -> &str;
}

/// Trait for decoding a whole audio track into mono PCM.
#[async_trait]
pub trait AudioSource: Send {
    /// Decode the full track. Failures are recoverable for the caller.
    async fn decode(&mut self) -> LoopscanResult<DecodedAudio>;

    /// Source name for logs.
    fn name(&self) -> &str;
}
