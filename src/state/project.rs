//! Project manifest schema and persistence
//!
//! `project.json` is the single source of truth for a project directory:
//! project-wide settings plus the ordered chunk records. Every save is a
//! full snapshot written atomically (temp file + rename), so recovery after
//! a crash is simply "the last successful save is the truth".

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{NarravoxError, Result};
use crate::store::ChunkStore;

/// Manifest file name inside a project directory.
pub const PROJECT_FILE: &str = "project.json";

/// Crate version stamped into the manifest on every save.
pub const NARRAVOX_VERSION: &str = env!("CARGO_PKG_VERSION");

fn default_sample_rate() -> u32 {
    24000
}
fn default_loudness_db() -> f64 {
    -16.0
}
fn default_model_id() -> String {
    "VibeVoice-Large".to_string()
}
fn default_global_seed() -> u64 {
    42
}
fn default_crossfade_ms() -> u32 {
    40
}
fn default_chunks_dir() -> String {
    "chunks".to_string()
}
fn default_archive_dir() -> String {
    "chunks_archive".to_string()
}
fn default_final_mix() -> String {
    "final_mix.wav".to_string()
}

/// Project-wide settings.
///
/// `sample_rate` and `crossfade_ms` are immutable once any chunk exists;
/// changing them would invalidate every recorded duration and timestamp,
/// so no API mutates them after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Sample rate in Hz for all chunk audio and the final mix.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// RMS-based loudness target in dBFS (LUFS-like).
    #[serde(default = "default_loudness_db")]
    pub loudness_db: f64,

    /// Opaque identity of the TTS model.
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Base seed; chunk i renders with `global_seed + i - 1`.
    #[serde(default = "default_global_seed")]
    pub global_seed: u64,

    /// Crossfade overlap between adjacent chunks in milliseconds.
    #[serde(default = "default_crossfade_ms")]
    pub crossfade_ms: u32,

    /// Active chunk audio directory, relative to the project root.
    #[serde(default = "default_chunks_dir")]
    pub chunks_dir: String,

    /// Archived chunk versions directory, relative to the project root.
    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,

    /// Final mix output path, relative to the project root.
    #[serde(default = "default_final_mix")]
    pub final_mix: String,

    /// Default renderer parameter overrides.
    #[serde(default)]
    pub default_params: Map<String, Value>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            loudness_db: default_loudness_db(),
            model_id: default_model_id(),
            global_seed: default_global_seed(),
            crossfade_ms: default_crossfade_ms(),
            chunks_dir: default_chunks_dir(),
            archive_dir: default_archive_dir(),
            final_mix: default_final_mix(),
            default_params: Map::new(),
        }
    }
}

/// One chunk of script text and its rendered audio.
///
/// The 1-based index is a stable identity: chunks are replaced in place,
/// never deleted. Text segmentation (`text`, `char_start`, `char_end`) is
/// immutable after creation; only audio and timing fields change through
/// the replacement protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Stable 1-based index.
    pub index: u32,

    /// Active audio file name under `chunks_dir`.
    pub filename: String,

    /// Verbatim source text for this chunk.
    pub text: String,

    /// Offset of the chunk's first character in the original script.
    pub char_start: usize,

    /// Offset one past the chunk's last character.
    pub char_end: usize,

    /// Start time on the overlapped timeline, derived by the placement rule.
    #[serde(default)]
    pub t_start_ms: u64,

    /// Duration measured from the actual audio buffer.
    #[serde(default)]
    pub duration_ms: u64,

    /// Seed used for reproducible rendering.
    #[serde(default)]
    pub seed: u64,

    /// Renderer parameter overrides used for this chunk.
    #[serde(default)]
    pub params: Map<String, Value>,

    /// Reserved for multi-speaker projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<u32>,

    /// High-water mark of allocated archive versions for this index.
    /// Keeps version numbers monotonic even if archive files are removed
    /// externally.
    #[serde(default)]
    pub archived_versions: u32,

    /// SHA-256 digest of the active audio file, refreshed on every write.
    #[serde(default)]
    pub sha256: String,
}

impl ChunkRecord {
    /// Create a record for freshly segmented text; audio fields are filled
    /// in once the chunk is rendered.
    pub fn new(index: u32, text: String, char_start: usize, char_end: usize) -> Self {
        Self {
            index,
            filename: ChunkStore::chunk_filename(index),
            text,
            char_start,
            char_end,
            t_start_ms: 0,
            duration_ms: 0,
            seed: 0,
            params: Map::new(),
            speaker_id: None,
            archived_versions: 0,
            sha256: String::new(),
        }
    }
}

/// Project state: settings plus the ordered chunk sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Timestamp when the project was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last successful save.
    pub modified_at: DateTime<Utc>,

    /// Narravox version that last saved this manifest.
    #[serde(default)]
    pub narravox_version: String,

    /// Project-wide settings.
    #[serde(rename = "project")]
    pub settings: ProjectSettings,

    /// Chunk records, kept sorted by index.
    #[serde(default)]
    chunks: Vec<ChunkRecord>,

    /// Project directory (not serialized; set on load/create).
    #[serde(skip)]
    pub root: PathBuf,
}

impl Project {
    /// Create an in-memory project rooted at `root`. Nothing touches disk
    /// until `create_dirs`/`save`.
    pub fn new(root: &Path, settings: ProjectSettings) -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            modified_at: now,
            narravox_version: NARRAVOX_VERSION.to_string(),
            settings,
            chunks: Vec::new(),
            root: root.to_path_buf(),
        }
    }

    /// Path to the manifest inside a project directory.
    pub fn manifest_path(root: &Path) -> PathBuf {
        root.join(PROJECT_FILE)
    }

    /// Load and validate the manifest from a project directory.
    pub fn load(root: &Path) -> Result<Self> {
        let manifest = Self::manifest_path(root);
        if !manifest.exists() {
            return Err(NarravoxError::ProjectNotFound { path: manifest });
        }

        let content = fs::read_to_string(&manifest)?;
        let mut project: Project =
            serde_json::from_str(&content).map_err(|e| NarravoxError::CorruptManifest {
                reason: e.to_string(),
            })?;
        project.root = root.to_path_buf();
        project.chunks.sort_by_key(|c| c.index);
        project.validate()?;
        Ok(project)
    }

    /// Save a full snapshot of the manifest atomically.
    ///
    /// Serializes to `project.json.tmp` and renames over the manifest, so
    /// the on-disk file is always either the fully-old or fully-new
    /// serialization.
    pub fn save(&mut self) -> Result<()> {
        self.validate()?;
        self.modified_at = Utc::now();
        self.narravox_version = NARRAVOX_VERSION.to_string();

        fs::create_dir_all(&self.root)?;
        let manifest = Self::manifest_path(&self.root);
        let tmp = manifest.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &manifest)?;
        Ok(())
    }

    /// Create the chunk and archive directories.
    pub fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.chunks_dir())?;
        fs::create_dir_all(self.archive_dir())?;
        Ok(())
    }

    /// Validate schema invariants.
    ///
    /// Index contiguity, text-offset contiguity, and the crossfade bound
    /// are all checked here rather than discovered mid-build.
    pub fn validate(&self) -> Result<()> {
        if self.settings.sample_rate == 0 {
            return Err(NarravoxError::CorruptManifest {
                reason: "sample_rate must be positive".to_string(),
            });
        }

        for (i, chunk) in self.chunks.iter().enumerate() {
            let expected = (i + 1) as u32;
            if chunk.index != expected {
                return Err(NarravoxError::CorruptManifest {
                    reason: format!(
                        "chunk indices must be contiguous from 1: position {} holds index {}",
                        i + 1,
                        chunk.index
                    ),
                });
            }
            if chunk.char_start >= chunk.char_end {
                return Err(NarravoxError::CorruptManifest {
                    reason: format!("chunk {} has an empty text range", chunk.index),
                });
            }
            if i > 0 && chunk.char_start != self.chunks[i - 1].char_end {
                return Err(NarravoxError::CorruptManifest {
                    reason: format!(
                        "chunk {} text range is not contiguous with chunk {}",
                        chunk.index,
                        self.chunks[i - 1].index
                    ),
                });
            }
            if chunk.duration_ms > 0 && self.settings.crossfade_ms as u64 >= chunk.duration_ms {
                return Err(NarravoxError::InvalidCrossfade {
                    index: chunk.index,
                    crossfade_ms: self.settings.crossfade_ms,
                    duration_ms: chunk.duration_ms,
                });
            }
        }
        Ok(())
    }

    /// Chunks in index order.
    pub fn chunks(&self) -> &[ChunkRecord] {
        &self.chunks
    }

    /// Mutable access to chunks; callers must preserve index order.
    pub fn chunks_mut(&mut self) -> &mut [ChunkRecord] {
        &mut self.chunks
    }

    /// Look up a chunk by its 1-based index.
    pub fn chunk(&self, index: u32) -> Option<&ChunkRecord> {
        self.chunks.iter().find(|c| c.index == index)
    }

    /// Mutable lookup by index.
    pub fn chunk_mut(&mut self, index: u32) -> Option<&mut ChunkRecord> {
        self.chunks.iter_mut().find(|c| c.index == index)
    }

    /// Append a chunk record, keeping the sequence sorted by index.
    pub fn push_chunk(&mut self, chunk: ChunkRecord) {
        self.chunks.retain(|c| c.index != chunk.index);
        self.chunks.push(chunk);
        self.chunks.sort_by_key(|c| c.index);
    }

    /// Absolute path of the active chunks directory.
    pub fn chunks_dir(&self) -> PathBuf {
        self.root.join(&self.settings.chunks_dir)
    }

    /// Absolute path of the archive directory.
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(&self.settings.archive_dir)
    }

    /// Absolute path of the final mix output.
    pub fn final_mix_path(&self) -> PathBuf {
        self.root.join(&self.settings.final_mix)
    }

    /// File-addressing view over this project's chunk and archive dirs.
    pub fn store(&self) -> ChunkStore {
        ChunkStore::new(self.chunks_dir(), self.archive_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn chunk(index: u32, char_start: usize, char_end: usize, duration_ms: u64) -> ChunkRecord {
        let mut c = ChunkRecord::new(index, "hello there".to_string(), char_start, char_end);
        c.duration_ms = duration_ms;
        c
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = Project::load(dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_load_corrupt_manifest() {
        let dir = TempDir::new().unwrap();
        fs::write(Project::manifest_path(dir.path()), "{not json").unwrap();
        let err = Project::load(dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "CORRUPT_MANIFEST");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::new(dir.path(), ProjectSettings::default());
        let mut c = chunk(1, 0, 11, 1000);
        c.seed = 42;
        c.params.insert("cfg_scale".to_string(), serde_json::json!(1.3));
        project.push_chunk(c);
        project.push_chunk(chunk(2, 11, 20, 800));
        project.save().unwrap();

        let loaded = Project::load(dir.path()).unwrap();
        assert_eq!(loaded.settings, project.settings);
        assert_eq!(loaded.chunks(), project.chunks());
        assert_eq!(loaded.created_at, project.created_at);
        assert_eq!(loaded.modified_at, project.modified_at);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::new(dir.path(), ProjectSettings::default());
        project.save().unwrap();
        assert!(Project::manifest_path(dir.path()).exists());
        assert!(!dir.path().join("project.json.tmp").exists());
    }

    #[test]
    fn test_validate_rejects_oversized_crossfade() {
        // A 1200 ms crossfade cannot fit inside a 1000 ms chunk
        let dir = TempDir::new().unwrap();
        let settings = ProjectSettings {
            crossfade_ms: 1200,
            ..ProjectSettings::default()
        };
        let mut project = Project::new(dir.path(), settings);
        project.push_chunk(chunk(1, 0, 11, 1000));
        let err = project.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CROSSFADE");
    }

    #[test]
    fn test_validate_rejects_gapped_indices() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::new(dir.path(), ProjectSettings::default());
        project.push_chunk(chunk(1, 0, 11, 1000));
        project.push_chunk(chunk(3, 11, 20, 800));
        let err = project.validate().unwrap_err();
        assert_eq!(err.error_code(), "CORRUPT_MANIFEST");
    }

    #[test]
    fn test_validate_rejects_overlapping_text_ranges() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::new(dir.path(), ProjectSettings::default());
        project.push_chunk(chunk(1, 0, 11, 1000));
        project.push_chunk(chunk(2, 5, 20, 800));
        let err = project.validate().unwrap_err();
        assert_eq!(err.error_code(), "CORRUPT_MANIFEST");
    }

    #[test]
    fn test_push_chunk_replaces_same_index() {
        let dir = TempDir::new().unwrap();
        let mut project = Project::new(dir.path(), ProjectSettings::default());
        project.push_chunk(chunk(1, 0, 11, 1000));
        project.push_chunk(chunk(1, 0, 11, 900));
        assert_eq!(project.chunks().len(), 1);
        assert_eq!(project.chunks()[0].duration_ms, 900);
    }
}
