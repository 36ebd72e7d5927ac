//! Chunk replacement protocol
//!
//! Orchestrates archive-then-overwrite with the selected timeline policy.
//! Step ordering is the safety mechanism: everything that can refuse the
//! replacement (render, decode, sample-rate check, stretch bound, the
//! crossfade bound on the new duration) runs before the archive copy, and
//! the active slot plus manifest are written only after archival is
//! confirmed. The only possible failure tail is
//! "archived but active audio and manifest unchanged", which is safely
//! retryable.

use std::path::Path;

use log::info;
use serde_json::{Map, Value};

use crate::audio::io;
use crate::audio::Stretcher;
use crate::error::{NarravoxError, Result};
use crate::render::{merge_params, Renderer};
use crate::state::project::Project;
use crate::state::timeline::{self, samples_from_ms, TimelineMode};

/// Where the replacement audio comes from.
pub enum ChunkSource<'a> {
    /// Re-render the chunk's own text.
    Tts {
        /// Seed override; the chunk's recorded seed when `None`.
        seed: Option<u64>,
        /// Renderer parameter overrides, merged onto project defaults.
        overrides: Map<String, Value>,
    },
    /// Import an existing audio file.
    Import {
        path: &'a Path,
        /// Recorded on the chunk when given; imports have no render seed
        /// of their own.
        seed: Option<u64>,
    },
}

/// What a completed replacement did, for callers that report.
#[derive(Debug, Clone)]
pub struct ReplaceOutcome {
    pub index: u32,
    pub archive_version: u32,
    pub old_duration_ms: u64,
    pub new_duration_ms: u64,
}

/// Replace the audio of chunk `index` in place.
pub fn replace_chunk(
    project: &mut Project,
    index: u32,
    source: ChunkSource<'_>,
    mode: TimelineMode,
    renderer: &dyn Renderer,
    stretcher: &dyn Stretcher,
) -> Result<ReplaceOutcome> {
    let chunk = project
        .chunk(index)
        .ok_or(NarravoxError::ChunkNotFound { index })?
        .clone();
    let sample_rate = project.settings.sample_rate;
    let store = project.store();
    let active_path = store.chunk_path(index);

    // Obtain the new buffer; rendering and decoding block before any
    // state mutation, so cancellation here is always safe.
    let (mut audio, new_seed, new_params, context_path) = match source {
        ChunkSource::Tts { seed, overrides } => {
            let seed = seed.unwrap_or(chunk.seed);
            let params = merge_params(&project.settings.default_params, &overrides);
            let audio = renderer.render(&chunk.text, seed, &params)?;
            (audio, Some(seed), params, active_path.clone())
        }
        ChunkSource::Import { path, seed } => {
            let audio = io::decode(path)?;
            let mut params = chunk.params.clone();
            params.insert("mode".to_string(), Value::String("import".to_string()));
            (audio, seed, params, path.to_path_buf())
        }
    };

    if audio.sample_rate() != sample_rate {
        return Err(NarravoxError::SampleRateMismatch {
            path: context_path,
            expected: sample_rate,
            actual: audio.sample_rate(),
        });
    }

    let measured_ms = audio.duration_ms();
    let new_duration_ms = match mode {
        TimelineMode::Locked => {
            timeline::check_stretch_ratio(index, measured_ms, chunk.duration_ms)?;
            let target = samples_from_ms(chunk.duration_ms, sample_rate) as usize;
            audio = stretcher.stretch(&audio, target)?;
            chunk.duration_ms
        }
        TimelineMode::Free => measured_ms,
    };

    // The committed manifest must keep satisfying the crossfade bound, so
    // a too-short replacement is refused here, ahead of any mutation, not
    // discovered by the validating save after the active slot changed.
    if project.settings.crossfade_ms as u64 >= new_duration_ms {
        return Err(NarravoxError::InvalidCrossfade {
            index,
            crossfade_ms: project.settings.crossfade_ms,
            duration_ms: new_duration_ms,
        });
    }

    // Archive-then-overwrite: the previous version must be safe on disk
    // before the active slot changes.
    let version = store.next_archive_version(index, chunk.archived_versions);
    store.archive(index, version)?;

    io::encode(&audio, &active_path)?;
    let digest = io::file_digest(&active_path)?;

    let record = project
        .chunk_mut(index)
        .ok_or(NarravoxError::ChunkNotFound { index })?;
    record.duration_ms = new_duration_ms;
    record.archived_versions = version;
    record.sha256 = digest;
    record.params = new_params;
    if let Some(seed) = new_seed {
        record.seed = seed;
    }

    if mode == TimelineMode::Free {
        timeline::recalculate(project);
    }

    project.save()?;

    info!(
        "Replaced chunk {index}: {} ms -> {} ms ({mode:?}), archived as v{version}",
        chunk.duration_ms, new_duration_ms
    );

    Ok(ReplaceOutcome {
        index,
        archive_version: version,
        old_duration_ms: chunk.duration_ms,
        new_duration_ms,
    })
}
