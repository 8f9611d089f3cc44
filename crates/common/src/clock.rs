//! Sampling clock for offline analysis.
//!
//! Analysis walks a finite video at a fixed sampling rate. Every sample
//! instant is derived from its index (`i / rate`) rather than by repeated
//! addition, so consecutive instants are exactly one interval apart and the
//! sequence never drifts past the end of the clip.

/// Fixed-rate sample instants over a finite duration.
#[derive(Debug, Clone, Copy)]
pub struct SampleClock {
    sampling_rate: u32,
    duration_secs: f64,
}

impl SampleClock {
    /// Create a clock sampling `duration_secs` at `sampling_rate` instants per second.
    ///
    /// A zero rate is treated as 1 so the interval stays finite.
    pub fn new(sampling_rate: u32, duration_secs: f64) -> Self {
        Self {
            sampling_rate: sampling_rate.max(1),
            duration_secs: if duration_secs.is_finite() {
                duration_secs.max(0.0)
            } else {
                0.0
            },
        }
    }

    /// Sampling rate in instants per second.
    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    /// Total clip duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Spacing between two instants in seconds.
    pub fn interval_secs(&self) -> f64 {
        1.0 / self.sampling_rate as f64
    }

    /// Time of the `index`-th instant.
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 / self.sampling_rate as f64
    }

    /// Number of instants strictly before the end of the clip.
    pub fn sample_count(&self) -> usize {
        let mut count = (self.duration_secs * self.sampling_rate as f64).ceil() as usize;
        // Float rounding in the product can land one step off in either direction.
        while count > 0 && self.time_at(count - 1) >= self.duration_secs {
            count -= 1;
        }
        while self.time_at(count) < self.duration_secs {
            count += 1;
        }
        count
    }

    /// All sample instants in increasing order; the last one is `< duration`.
    pub fn instants(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.sample_count()).map(move |i| self.time_at(i))
    }

    /// Fraction of all instants done once `scored` of them have been sampled, in `[0, 1]`.
    pub fn progress_after(&self, scored: usize) -> f64 {
        let total = self.sample_count();
        if total == 0 {
            return 1.0;
        }
        (scored as f64 / total as f64).min(1.0)
    }
}
