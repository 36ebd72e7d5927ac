//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde_json::{Map, Value};

use crate::audio::SignalsmithStretcher;
use crate::engine::{self, ChunkSource};
use crate::error::Result;
use crate::render::{self, mock::MockRenderer, Renderer};
use crate::state::{Project, ProjectSettings, TimelineMode};

/// Create a project from a script file and render every chunk.
#[allow(clippy::too_many_arguments)]
pub fn init(
    path: &Path,
    script_path: &Path,
    sample_rate: u32,
    loudness: f64,
    model: String,
    seed: u64,
    crossfade_ms: u32,
    max_words: usize,
) -> Result<()> {
    info!("Creating project at: {}", path.display());

    let script = fs::read_to_string(script_path)?;
    let settings = ProjectSettings {
        sample_rate,
        loudness_db: loudness,
        model_id: model,
        global_seed: seed,
        crossfade_ms,
        ..ProjectSettings::default()
    };

    let renderer = render::renderer_from_env(&settings)?;
    let project = engine::generate_project(&script, path, settings, max_words, renderer.as_ref())?;

    println!(
        "Project created: {} ({} chunks)",
        path.display(),
        project.chunks().len()
    );
    Ok(())
}

/// Replace one chunk's audio in place.
pub fn replace(
    path: &Path,
    index: u32,
    timeline: TimelineMode,
    seed: Option<u64>,
    import: Option<PathBuf>,
    params: &[String],
) -> Result<()> {
    info!("Replacing chunk {index} in: {}", path.display());

    let mut project = Project::load(path)?;
    let overrides = parse_param_overrides(params);

    let source = match &import {
        Some(file) => ChunkSource::Import { path: file, seed },
        None => ChunkSource::Tts { seed, overrides },
    };

    // Imports never invoke the renderer, so a placeholder is fine there;
    // TTS replacement resolves the real renderer from the environment.
    let renderer: Box<dyn Renderer> = if import.is_some() {
        Box::new(MockRenderer::new(project.settings.sample_rate))
    } else {
        render::renderer_from_env(&project.settings)?
    };

    let outcome = engine::replace_chunk(
        &mut project,
        index,
        source,
        timeline,
        renderer.as_ref(),
        &SignalsmithStretcher::new(),
    )?;

    println!(
        "Replaced chunk {}: {} ms -> {} ms (archived v{})",
        outcome.index, outcome.old_duration_ms, outcome.new_duration_ms, outcome.archive_version
    );
    Ok(())
}

/// Assemble and write the final mix.
pub fn build(path: &Path) -> Result<()> {
    info!("Building final mix for: {}", path.display());

    let project = Project::load(path)?;
    let output = engine::build_final_mix(&project)?;

    println!("Final mix written: {}", output.display());
    Ok(())
}

/// Find the chunk covering a timeline position.
pub fn find(path: &Path, timestamp_ms: u64) -> Result<()> {
    let project = Project::load(path)?;

    match engine::find_chunk_at(&project, timestamp_ms) {
        Some(chunk) => {
            println!(
                "Chunk {} covers {} ms (starts {} ms, {} ms long, seed {})",
                chunk.index, timestamp_ms, chunk.t_start_ms, chunk.duration_ms, chunk.seed
            );
            println!("  text: {}", chunk.text);
        }
        None => println!("No chunk covers {timestamp_ms} ms"),
    }
    Ok(())
}

/// Print project state.
pub fn show(path: &Path) -> Result<()> {
    let project = Project::load(path)?;
    let s = &project.settings;

    println!("Project: {}", path.display());
    println!(
        "  {} Hz, target {} dBFS, crossfade {} ms, model {}, seed {}",
        s.sample_rate, s.loudness_db, s.crossfade_ms, s.model_id, s.global_seed
    );
    println!("  last saved: {}", project.modified_at);
    println!("Chunks ({}):", project.chunks().len());
    for chunk in project.chunks() {
        println!(
            "  [{:3}] start {:>8} ms  dur {:>7} ms  seed {:<10} {}",
            chunk.index,
            chunk.t_start_ms,
            chunk.duration_ms,
            chunk.seed,
            preview(&chunk.text)
        );
    }
    Ok(())
}

/// Parse `key=value` overrides; values parse as JSON when possible and
/// fall back to strings.
fn parse_param_overrides(params: &[String]) -> Map<String, Value> {
    let mut map = Map::new();
    for entry in params {
        if let Some((key, value)) = entry.split_once('=') {
            let parsed = value
                .parse::<Value>()
                .unwrap_or_else(|_| Value::String(value.to_string()));
            map.insert(key.to_string(), parsed);
        }
    }
    map
}

fn preview(text: &str) -> String {
    const MAX: usize = 48;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    }
}
