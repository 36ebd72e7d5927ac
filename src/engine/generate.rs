//! Initial sequential generation
//!
//! Renders every segmented chunk in order and saves the manifest after
//! each one, so an interrupted run leaves a valid project that describes
//! exactly the chunks completed so far.

use std::path::Path;

use log::info;

use crate::audio::io;
use crate::error::{NarravoxError, Result};
use crate::render::Renderer;
use crate::script;
use crate::state::project::{ChunkRecord, Project, ProjectSettings};

/// Create a project directory from a script and render all chunks.
pub fn generate_project(
    script_text: &str,
    root: &Path,
    settings: ProjectSettings,
    max_words_per_chunk: usize,
    renderer: &dyn Renderer,
) -> Result<Project> {
    let specs = script::segment(script_text, max_words_per_chunk)?;

    let mut project = Project::new(root, settings);
    project.create_dirs()?;
    let store = project.store();

    info!(
        "Generating {} chunks at {} Hz into {}",
        specs.len(),
        project.settings.sample_rate,
        root.display()
    );

    let crossfade = project.settings.crossfade_ms as u64;
    let mut next_start: u64 = 0;

    for (i, spec) in specs.into_iter().enumerate() {
        let index = (i + 1) as u32;
        let seed = project.settings.global_seed.wrapping_add(i as u64);
        let params = project.settings.default_params.clone();

        let audio = renderer.render(&spec.text, seed, &params)?;
        let chunk_path = store.chunk_path(index);
        if audio.sample_rate() != project.settings.sample_rate {
            return Err(NarravoxError::SampleRateMismatch {
                path: chunk_path,
                expected: project.settings.sample_rate,
                actual: audio.sample_rate(),
            });
        }

        io::encode(&audio, &chunk_path)?;

        let mut chunk = ChunkRecord::new(index, spec.text, spec.char_start, spec.char_end);
        chunk.t_start_ms = next_start;
        chunk.duration_ms = audio.duration_ms();
        chunk.seed = seed;
        chunk.params = params;
        chunk.sha256 = io::file_digest(&chunk_path)?;
        next_start = (chunk.t_start_ms + chunk.duration_ms).saturating_sub(crossfade);

        info!(
            "Rendered chunk {} ({} ms, seed {})",
            index, chunk.duration_ms, seed
        );
        project.push_chunk(chunk);
        project.save()?;
    }

    Ok(project)
}
