//! The output of a completed analysis run.

use std::path::Path;

use loopscan_common::error::LoopscanResult;
use serde::{Deserialize, Serialize};

use crate::loops::LoopRecord;
use crate::sample::Sample;

/// Everything a completed run hands back to the caller.
///
/// Only ever constructed for runs that finished; cancelled or failed runs
/// produce no result at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Detected repetitions or sets, ordered by start time.
    pub loops: Vec<LoopRecord>,

    /// The full per-instant signal, for visualization.
    pub samples: Vec<Sample>,

    /// Terminal progress value, always 100.
    pub progress: u8,

    pub duration_secs: f64,
    pub sampling_rate: u32,

    /// Whether decoded audio contributed to the fused signal.
    pub audio_used: bool,

    /// Completion timestamp (RFC 3339).
    pub analyzed_at: String,
}

impl AnalysisResult {
    pub const COMPLETE: u8 = 100;

    /// Total repetitions across all records.
    pub fn total_reps(&self) -> usize {
        self.loops.iter().map(|l| l.rep_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Write the result as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> LoopscanResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> LoopscanResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
