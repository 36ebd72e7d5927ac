//! Final mix builder
//!
//! Consumes the committed chunk set, blends adjacent chunks over the
//! crossfade window, normalizes once, and writes the mix file. Runs only
//! on explicit request; nothing builds implicitly.

use std::path::PathBuf;

use log::info;

use crate::audio::{io, mix};
use crate::error::{NarravoxError, Result};
use crate::state::project::Project;

/// Assemble and write the final mix, returning its path.
///
/// Deterministic: building twice with no intervening edits produces
/// byte-identical output.
pub fn build_final_mix(project: &Project) -> Result<PathBuf> {
    project.validate()?;
    let store = project.store();
    let settings = &project.settings;

    let mut buffers = Vec::with_capacity(project.chunks().len());
    for chunk in project.chunks() {
        let path = store.chunk_path(chunk.index);
        let audio = io::decode(&path)?;

        if audio.sample_rate() != settings.sample_rate {
            return Err(NarravoxError::SampleRateMismatch {
                path,
                expected: settings.sample_rate,
                actual: audio.sample_rate(),
            });
        }
        // A duration that disagrees with the manifest means the manifest
        // is stale; refuse rather than emit a mix with wrong timestamps.
        if audio.duration_ms() != chunk.duration_ms {
            return Err(NarravoxError::CorruptManifest {
                reason: format!(
                    "chunk {} audio measures {} ms but manifest records {} ms",
                    chunk.index,
                    audio.duration_ms(),
                    chunk.duration_ms
                ),
            });
        }
        buffers.push(audio);
    }

    let mut combined = mix::stitch(&buffers, settings.sample_rate, settings.crossfade_ms);
    mix::match_loudness(&mut combined, settings.loudness_db);

    let output = project.final_mix_path();
    io::encode(&combined, &output)?;

    info!(
        "Built final mix: {} chunks, {} ms -> {}",
        buffers.len(),
        combined.duration_ms(),
        output.display()
    );
    Ok(output)
}
