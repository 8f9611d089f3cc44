//! Detected repetitions: atomic loops and the final loop/set records.

use serde::{Deserialize, Serialize};

/// How atomic loops are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Every atomic loop is reported on its own.
    Reps,
    /// Temporally adjacent atomic loops are merged into sets.
    #[default]
    Sets,
}

impl std::str::FromStr for DetectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reps" => Ok(Self::Reps),
            "sets" => Ok(Self::Sets),
            other => Err(format!("unknown detection mode '{other}' (expected reps|sets)")),
        }
    }
}

/// The span between two consecutive peaks that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtomicLoop {
    pub start_secs: f64,
    pub end_secs: f64,

    /// Sample indices of the bounding peaks.
    pub start_index: usize,
    pub end_index: usize,

    /// `round(60 / duration)`.
    pub bpm: u32,

    /// Heuristic strength in `[0, 1]` derived from the bounding peak values.
    pub confidence: f64,
}

impl AtomicLoop {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// A final reported unit: a single repetition or a merged set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopRecord {
    pub start_secs: f64,
    pub end_secs: f64,
    pub duration_secs: f64,
    pub bpm: u32,
    pub confidence: f64,
    pub rep_count: usize,
    pub label: String,

    /// Opaque thumbnail reference attached after assembly by whoever renders results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl LoopRecord {
    /// Report one atomic loop unchanged.
    pub fn from_atomic(atomic: &AtomicLoop, label: impl Into<String>) -> Self {
        Self {
            start_secs: atomic.start_secs,
            end_secs: atomic.end_secs,
            duration_secs: atomic.duration_secs(),
            bpm: atomic.bpm,
            confidence: atomic.confidence,
            rep_count: 1,
            label: label.into(),
            thumbnail: None,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}
