//! In-process sources for tests and demos.

use async_trait::async_trait;

use loopscan_analysis_model::audio::DecodedAudio;
use loopscan_analysis_model::frame::PixelBuffer;
use loopscan_common::error::{LoopscanError, LoopscanResult};

use super::{AudioSource, FrameSource, MediaInfo};

type RenderFn = Box<dyn Fn(f64) -> PixelBuffer + Send + Sync>;

/// Frame source that renders each frame from a closure of time.
pub struct SyntheticFrameSource {
    name: String,
    duration_secs: f64,
    render: RenderFn,
    fail_from_secs: Option<f64>,
    captured: Vec<f64>,
}

impl SyntheticFrameSource {
    pub fn new(
        duration_secs: f64,
        render: impl Fn(f64) -> PixelBuffer + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: "synthetic".to_string(),
            duration_secs,
            render: Box::new(render),
            fail_from_secs: None,
            captured: Vec::new(),
        }
    }

    /// Solid color for the whole clip.
    pub fn solid(duration_secs: f64, size: u32, rgb: [u8; 3]) -> Self {
        Self::new(duration_secs, move |_| PixelBuffer::solid(size, size, rgb))
    }

    /// Make every capture at or after `time_secs` fail with a capture error.
    pub fn failing_from(mut self, time_secs: f64) -> Self {
        self.fail_from_secs = Some(time_secs);
        self
    }

    /// Timestamps requested so far, in call order.
    pub fn captured_times(&self) -> &[f64] {
        &self.captured
    }
}

#[async_trait]
impl FrameSource for SyntheticFrameSource {
    async fn open(&mut self) -> LoopscanResult<MediaInfo> {
        self.captured.clear();
        let probe = (self.render)(0.0);
        Ok(MediaInfo {
            duration_secs: self.duration_secs,
            width: probe.width(),
            height: probe.height(),
            has_audio: false,
        })
    }

    async fn seek_and_capture(&mut self, time_secs: f64) -> LoopscanResult<PixelBuffer> {
        self.captured.push(time_secs);
        if let Some(limit) = self.fail_from_secs {
            if time_secs >= limit {
                return Err(LoopscanError::capture(format!(
                    "{}: decoder stalled at {time_secs:.3}s",
                    self.name
                )));
            }
        }
        // Yield so the session really suspends at every seek.
        tokio::task::yield_now().await;
        Ok((self.render)(time_secs))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Audio source backed by an already-decoded buffer.
pub struct InMemoryAudioSource {
    audio: DecodedAudio,
}

impl InMemoryAudioSource {
    pub fn new(audio: DecodedAudio) -> Self {
        Self { audio }
    }

    /// Mono track of `duration_secs` generated from a closure of time.
    pub fn from_fn(sample_rate: u32, duration_secs: f64, f: impl Fn(f64) -> f32) -> Self {
        let count = (duration_secs * sample_rate as f64).floor() as usize;
        let samples = (0..count)
            .map(|i| f(i as f64 / sample_rate as f64))
            .collect();
        Self::new(DecodedAudio::new(sample_rate, samples))
    }
}

#[async_trait]
impl AudioSource for InMemoryAudioSource {
    async fn decode(&mut self) -> LoopscanResult<DecodedAudio> {
        Ok(self.audio.clone())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

/// Audio source whose decode always fails.
pub struct FailingAudioSource {
    message: String,
}

impl FailingAudioSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl AudioSource for FailingAudioSource {
    async fn decode(&mut self) -> LoopscanResult<DecodedAudio> {
        Err(LoopscanError::audio(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
