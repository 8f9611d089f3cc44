//! Loopscan Analysis Model
//!
//! Defines the data contracts shared by the analysis pipeline:
//! - **Audio:** Decoded single-channel PCM
//! - **Frames:** Small packed RGB buffers captured at sample instants
//! - **Samples:** Per-instant raw scores, fused activity, scene-cut flags
//! - **Loops:** Atomic loops between peaks and the final rep/set records
//! - **Settings:** The validated configuration surface of one run
//! - **Result:** What a completed run hands back to its caller
//!
//! All times are seconds from the start of the analyzed video.

pub mod audio;
pub mod frame;
pub mod loops;
pub mod result;
pub mod sample;
pub mod settings;

pub use audio::*;
pub use frame::*;
pub use loops::*;
pub use result::*;
pub use sample::*;
pub use settings::*;
