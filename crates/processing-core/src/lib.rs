//! Loopscan Processing Core: the loop detector
//!
//! Turns per-instant visual and audio activity into repetition records:
//! - **Motion:** Luminance frame differencing with flat-frame suppression
//! - **Audio:** Windowed RMS energy
//! - **Fusion:** Mean-relative normalization and weighted mixing
//! - **Scene cuts / Detrend:** Optional gating and steady-motion removal
//! - **Peaks / Assembly:** Peak picking, atomic loops, reps and sets
//!
//! This crate is pure computation with no I/O and no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod assembler;
pub mod audio;
pub mod detrend;
pub mod fusion;
pub mod motion;
pub mod peaks;
pub mod pipeline;
pub mod scene_cut;
pub mod smoothing;

pub use assembler::LoopAssembler;
pub use peaks::PeakDetector;
pub use pipeline::LoopDetector;
