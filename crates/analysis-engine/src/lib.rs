//! Loopscan Analysis Engine
//!
//! Drives an external frame source (and optionally an audio source) at a
//! fixed sampling rate, scores every instant, and hands the raw scores to
//! the pure loop-detection pipeline in `loopscan-processing-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               AnalysisSession                │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────┐ │
//! │  │ FrameSource │ │ AudioSource │ │ LogSink │ │
//! │  └──────┬──────┘ └──────┬──────┘ └────▲────┘ │
//! │         │               │             │      │
//! │         ▼               ▼             │      │
//! │  ┌─────────────────────────────┐      │      │
//! │  │  RawSample per instant      │      │      │
//! │  └──────────────┬──────────────┘      │      │
//! │                 ▼                     │      │
//! │  ┌─────────────────────────────┐      │      │
//! │  │  LoopDetector (pure)        ├──────┘      │
//! │  └─────────────────────────────┘             │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Sampling is strictly sequential: one seek is in flight at a time and
//! instants are visited in increasing time order.

pub mod log_sink;
pub mod progress;
pub mod session;
pub mod source;

pub use log_sink::{LogLevel, LogSink, MemoryLogSink, TracingLogSink};
pub use progress::{AnalysisProgress, AnalysisStage, ProgressCallback};
pub use session::*;
pub use source::{AudioSource, FrameSource, MediaInfo};
