//! Analysis session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use loopscan_analysis_model::audio::DecodedAudio;
use loopscan_analysis_model::frame::PixelBuffer;
use loopscan_analysis_model::result::AnalysisResult;
use loopscan_analysis_model::sample::RawSample;
use loopscan_analysis_model::settings::AnalysisSettings;
use loopscan_common::clock::SampleClock;
use loopscan_common::error::{LoopscanError, LoopscanResult};
use loopscan_processing_core::audio::audio_score;
use loopscan_processing_core::motion::score_frame;
use loopscan_processing_core::LoopDetector;

use crate::log_sink::{LogLevel, LogSink, TracingLogSink};
use crate::progress::{AnalysisProgress, AnalysisStage, ProgressCallback};
use crate::source::{AudioSource, FrameSource};

/// State of an analysis session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No run started yet.
    Idle,
    /// Seeking and scoring frames.
    Sampling,
    /// Running the signal pipeline over the collected scores.
    Analyzing,
    /// The last run finished and its result is stored.
    Complete,
    /// The last run failed.
    Failed,
    /// The last run was stopped by the caller.
    Cancelled,
}

/// Runs loop detection over one video at a time.
///
/// A failed or cancelled run never replaces the result of an earlier
/// successful one.
pub struct AnalysisSession {
    settings: AnalysisSettings,
    state: SessionState,
    stop_flag: Arc<AtomicBool>,
    log_sink: Arc<dyn LogSink>,
    last_result: Option<AnalysisResult>,
}

impl AnalysisSession {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            settings,
            state: SessionState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            log_sink: Arc::new(TracingLogSink),
            last_result: None,
        }
    }

    pub fn with_log_sink(mut self, log_sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = log_sink;
        self
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Replace the settings used by the next run.
    pub fn set_settings(&mut self, settings: AnalysisSettings) {
        self.settings = settings;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Flag checked before every seek. Setting it cancels the run in progress.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Request cancellation of the run in progress.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Result of the most recent successful run.
    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_ref()
    }

    /// Analyze one video.
    ///
    /// `audio` is only decoded when the audio weight is non-zero; a decode
    /// failure is reported as a warning and the run continues video-only.
    pub async fn run(
        &mut self,
        frames: &mut dyn FrameSource,
        audio: Option<&mut dyn AudioSource>,
        progress: Option<ProgressCallback>,
    ) -> LoopscanResult<AnalysisResult> {
        self.stop_flag.store(false, Ordering::SeqCst);
        tracing::info!(
            source = frames.name(),
            sampling_rate = self.settings.sampling_rate,
            mode = ?self.settings.detection_mode,
            "Starting analysis"
        );

        match self.execute(frames, audio, progress).await {
            Ok(result) => {
                self.state = SessionState::Complete;
                self.last_result = Some(result.clone());
                Ok(result)
            }
            Err(err) if err.is_cancelled() => {
                self.state = SessionState::Cancelled;
                self.log_sink.emit(LogLevel::Warn, "Analysis cancelled");
                Err(err)
            }
            Err(err) => {
                self.state = SessionState::Failed;
                self.log_sink
                    .emit(LogLevel::Error, &format!("Analysis failed: {err}"));
                Err(err)
            }
        }
    }

    async fn execute(
        &mut self,
        frames: &mut dyn FrameSource,
        audio: Option<&mut dyn AudioSource>,
        progress: Option<ProgressCallback>,
    ) -> LoopscanResult<AnalysisResult> {
        self.settings.validate()?;
        self.state = SessionState::Sampling;
        report(&progress, AnalysisProgress::new(0.0, 0, 0, AnalysisStage::Opening));

        let info = frames.open().await?;
        if !(info.duration_secs.is_finite() && info.duration_secs > 0.0) {
            return Err(LoopscanError::source(format!(
                "{} has no playable duration",
                frames.name()
            )));
        }

        let clock = SampleClock::new(self.settings.sampling_rate, info.duration_secs);
        let total = clock.sample_count();

        let decoded = match audio {
            Some(source) if self.settings.uses_audio() => {
                report(
                    &progress,
                    AnalysisProgress::new(0.0, 0, total, AnalysisStage::DecodingAudio),
                );
                self.decode_audio(source).await
            }
            _ => None,
        };

        let raw = self
            .sample(frames, &clock, decoded.as_ref(), &progress)
            .await?;

        self.state = SessionState::Analyzing;
        report(
            &progress,
            AnalysisProgress::new(1.0, total, total, AnalysisStage::Analyzing),
        );
        let analysis = LoopDetector::new(self.settings.clone()).analyze(&raw);

        let result = AnalysisResult {
            loops: analysis.loops,
            samples: analysis.samples,
            progress: AnalysisResult::COMPLETE,
            duration_secs: info.duration_secs,
            sampling_rate: self.settings.sampling_rate,
            audio_used: decoded.is_some(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
        };

        let message = if result.is_empty() {
            "Analysis complete: no repetitions found".to_string()
        } else {
            format!(
                "Analysis complete: {} loop(s), {} rep(s)",
                result.loops.len(),
                result.total_reps()
            )
        };
        self.log_sink.emit(LogLevel::Success, &message);
        report(&progress, AnalysisProgress::complete(total));

        Ok(result)
    }

    /// Walk the clock, one seek at a time, and score every instant.
    async fn sample(
        &self,
        frames: &mut dyn FrameSource,
        clock: &SampleClock,
        audio: Option<&DecodedAudio>,
        progress: &Option<ProgressCallback>,
    ) -> LoopscanResult<Vec<RawSample>> {
        let total = clock.sample_count();
        let window = clock.interval_secs();
        let mut raw = Vec::with_capacity(total);
        let mut previous: Option<PixelBuffer> = None;

        for index in 0..total {
            if self.stop_flag.load(Ordering::SeqCst) {
                tracing::info!(samples_scored = index, "Stop requested");
                return Err(LoopscanError::Cancelled);
            }

            let time_secs = clock.time_at(index);
            let frame = frames.seek_and_capture(time_secs).await?;
            if let Some(prev) = &previous {
                if !frame.same_shape(prev) {
                    return Err(LoopscanError::source(format!(
                        "Frame at {time_secs:.3}s is {}x{}, expected {}x{}",
                        frame.width(),
                        frame.height(),
                        prev.width(),
                        prev.height()
                    )));
                }
            }

            let motion = score_frame(&frame, previous.as_ref());
            let audio_score = audio.map_or(0.0, |a| audio_score(a, time_secs, window));
            raw.push(RawSample::new(time_secs, motion.visual_score, audio_score));
            previous = Some(frame);

            tracing::trace!(
                time_secs,
                visual = motion.visual_score,
                audio = audio_score,
                flat = motion.is_flat(),
                "Scored instant"
            );
            report(
                progress,
                AnalysisProgress::new(
                    clock.progress_after(index + 1),
                    index + 1,
                    total,
                    AnalysisStage::Sampling,
                ),
            );
        }

        Ok(raw)
    }

    async fn decode_audio(&self, source: &mut dyn AudioSource) -> Option<DecodedAudio> {
        match source.decode().await {
            Ok(audio) if !audio.is_empty() => {
                tracing::debug!(
                    source = source.name(),
                    duration_secs = audio.duration_secs(),
                    "Audio decoded"
                );
                Some(audio)
            }
            Ok(_) => {
                self.log_sink.emit(
                    LogLevel::Warn,
                    "Audio track is empty; continuing with video only",
                );
                None
            }
            Err(err) => {
                self.log_sink.emit(
                    LogLevel::Warn,
                    &format!("Audio decode failed ({err}); continuing with video only"),
                );
                None
            }
        }
    }
}

fn report(progress: &Option<ProgressCallback>, update: AnalysisProgress) {
    if let Some(cb) = progress {
        cb(update);
    }
}
