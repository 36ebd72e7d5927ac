//! Narravox - Chunked Long-Form TTS Project Manager
//!
//! Narravox assembles a long-form speech recording from independently
//! generated chunks. Any chunk can be regenerated or replaced without
//! disturbing the rest of the timeline, then the whole project is
//! recombined into one normalized mix on explicit request.
//!
//! # Architecture
//!
//! - Project State: `project.json` manifest, the single source of truth,
//!   saved atomically as a full snapshot after every mutation
//! - Timeline Engine: derives chunk start times from durations and the
//!   crossfade width; locked/free replacement policies
//! - Chunk Store: active chunk files plus an append-only versioned archive
//! - Replacement Protocol: archive-then-overwrite with injected renderer
//!   and stretcher capabilities
//! - Final Mix Builder: equal-power crossfades and one uniform loudness
//!   gain, deterministic and reproducible

pub mod audio;
pub mod cli;
pub mod engine;
pub mod error;
pub mod render;
pub mod script;
pub mod state;
pub mod store;

pub use error::{NarravoxError, Result};
