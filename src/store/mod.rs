//! Chunk store
//!
//! Pure file-addressing layer over the active chunk directory and the
//! archive namespace. No timing logic lives here.
//!
//! Archive entries are immutable snapshots keyed by (index, version).
//! Version numbers start at 1 and only ever increase; the caller passes a
//! floor (the manifest's per-chunk high-water mark) so numbers are not
//! reused even if archive files were removed externally. Retention is a
//! deployment concern, nothing here prunes.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use walkdir::WalkDir;

use crate::error::{NarravoxError, Result};

/// File addressing for one project's chunk audio.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    chunks_dir: PathBuf,
    archive_dir: PathBuf,
}

impl ChunkStore {
    pub fn new(chunks_dir: PathBuf, archive_dir: PathBuf) -> Self {
        Self {
            chunks_dir,
            archive_dir,
        }
    }

    /// Deterministic, index-sortable active file name.
    pub fn chunk_filename(index: u32) -> String {
        format!("chunk_{index:03}.wav")
    }

    /// Archive file name for a superseded version.
    pub fn archive_filename(index: u32, version: u32) -> String {
        format!("chunk_{index:03}__v{version}.wav")
    }

    /// Absolute path of the active audio for `index`.
    pub fn chunk_path(&self, index: u32) -> PathBuf {
        self.chunks_dir.join(Self::chunk_filename(index))
    }

    /// Absolute path of an archived version.
    pub fn archive_path(&self, index: u32, version: u32) -> PathBuf {
        self.archive_dir.join(Self::archive_filename(index, version))
    }

    /// Active chunks directory.
    pub fn chunks_dir(&self) -> &Path {
        &self.chunks_dir
    }

    /// Archive directory.
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Allocate the next archive version for `index`.
    ///
    /// Scans existing archive files for the index and takes the maximum of
    /// the scan and `floor`, plus one.
    pub fn next_archive_version(&self, index: u32, floor: u32) -> u32 {
        let prefix = format!("chunk_{index:03}__v");
        let mut max_seen = floor;
        for entry in WalkDir::new(&self.archive_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let name = entry.file_name().to_string_lossy();
            if let Some(rest) = name.strip_prefix(&prefix) {
                if let Some(version) = rest
                    .strip_suffix(".wav")
                    .and_then(|v| v.parse::<u32>().ok())
                {
                    max_seen = max_seen.max(version);
                }
            }
        }
        max_seen + 1
    }

    /// Copy the active audio for `index` into the archive as `version`.
    ///
    /// Ordering contract: this must complete, and the archive file's
    /// existence is confirmed, before the caller overwrites the active
    /// slot. A crash mid-replacement can therefore leave an extra archive
    /// copy but never lose the previous version.
    pub fn archive(&self, index: u32, version: u32) -> Result<PathBuf> {
        let source = self.chunk_path(index);
        if !source.exists() {
            return Err(NarravoxError::AudioNotFound { path: source });
        }

        fs::create_dir_all(&self.archive_dir)?;
        let destination = self.archive_path(index, version);
        fs::copy(&source, &destination)?;

        if !destination.exists() {
            return Err(NarravoxError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("archive copy vanished: {}", destination.display()),
            )));
        }

        info!(
            "Archived chunk {} -> {}",
            index,
            destination.file_name().unwrap_or_default().to_string_lossy()
        );
        Ok(destination)
    }
}
