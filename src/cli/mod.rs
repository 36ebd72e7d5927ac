//! CLI Module
//!
//! Command-line interface for the Narravox project manager.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::state::TimelineMode;

/// Narravox - chunked long-form TTS project manager
#[derive(Parser, Debug)]
#[command(name = "narravox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project from a script and render all chunks
    #[command(name = "init")]
    Init {
        /// Path for the new project directory
        path: PathBuf,

        /// Script text file
        #[arg(short, long)]
        script: PathBuf,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 24000)]
        sample_rate: u32,

        /// Loudness target in dBFS
        #[arg(long, default_value_t = -16.0)]
        loudness: f64,

        /// TTS model identity
        #[arg(long, default_value = "VibeVoice-Large")]
        model: String,

        /// Base seed; chunk i renders with seed + i - 1
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Crossfade between adjacent chunks in milliseconds
        #[arg(long, default_value_t = 40)]
        crossfade_ms: u32,

        /// Maximum words per chunk
        #[arg(long, default_value_t = 60)]
        max_words: usize,
    },

    /// Replace one chunk's audio (re-render or import)
    #[command(name = "replace")]
    Replace {
        /// Path to the project
        path: PathBuf,

        /// 1-based chunk index
        index: u32,

        /// Timeline policy: locked keeps the prior duration, free shifts
        /// downstream chunks
        #[arg(long, default_value = "locked", value_parser = parse_timeline)]
        timeline: TimelineMode,

        /// Seed override for re-rendering
        #[arg(long)]
        seed: Option<u64>,

        /// Import this audio file instead of re-rendering
        #[arg(long)]
        import: Option<PathBuf>,

        /// Renderer parameter overrides as key=value
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Assemble and write the final mix
    #[command(name = "build")]
    Build {
        /// Path to the project
        path: PathBuf,
    },

    /// Find the chunk covering a timeline position
    #[command(name = "find")]
    Find {
        /// Path to the project
        path: PathBuf,

        /// Timeline position in milliseconds
        timestamp_ms: u64,
    },

    /// Print project state
    #[command(name = "show")]
    Show {
        /// Path to the project
        path: PathBuf,
    },
}

fn parse_timeline(s: &str) -> Result<TimelineMode, String> {
    s.parse()
}
