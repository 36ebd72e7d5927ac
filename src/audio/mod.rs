//! Audio primitives: buffers, WAV I/O, mixing math, time-stretching.

pub mod buffer;
pub mod io;
pub mod mix;
pub mod stretch;

pub use buffer::AudioBuffer;
pub use stretch::{LinearStretcher, SignalsmithStretcher, Stretcher};
