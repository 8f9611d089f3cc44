//! Progress reporting for analysis runs.

/// Progress callback for an analysis run.
pub type ProgressCallback = Box<dyn Fn(AnalysisProgress) + Send + Sync>;

/// Analysis progress report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisProgress {
    /// Current progress [0.0, 1.0].
    pub fraction: f64,

    /// Instants scored so far.
    pub samples_scored: usize,

    /// Instants the run will score in total.
    pub total_samples: usize,

    /// Current stage.
    pub stage: AnalysisStage,
}

/// Stages of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Opening,
    DecodingAudio,
    Sampling,
    Analyzing,
    Complete,
}

impl AnalysisProgress {
    pub fn new(
        fraction: f64,
        samples_scored: usize,
        total_samples: usize,
        stage: AnalysisStage,
    ) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            samples_scored,
            total_samples,
            stage,
        }
    }

    /// The terminal report of a successful run.
    pub fn complete(total_samples: usize) -> Self {
        Self::new(1.0, total_samples, total_samples, AnalysisStage::Complete)
    }

    /// Progress as an integer percentage in `[0, 100]`.
    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).round().clamp(0.0, 100.0) as u8
    }
}
