//! Orchestration over project state, the chunk store, and the renderer.

pub mod generate;
pub mod mix;
pub mod replace;

pub use generate::generate_project;
pub use mix::build_final_mix;
pub use replace::{replace_chunk, ChunkSource, ReplaceOutcome};

use crate::state::project::{ChunkRecord, Project};

/// Find the chunk whose timeline span contains `timestamp_ms`.
///
/// Spans are `[t_start_ms, t_start_ms + duration_ms)`. Timestamps at or
/// past the last chunk's start resolve to the last chunk, so a position at
/// the very end of the mix still maps somewhere useful.
pub fn find_chunk_at(project: &Project, timestamp_ms: u64) -> Option<&ChunkRecord> {
    for chunk in project.chunks() {
        if timestamp_ms >= chunk.t_start_ms && timestamp_ms < chunk.t_start_ms + chunk.duration_ms {
            return Some(chunk);
        }
    }
    project
        .chunks()
        .last()
        .filter(|last| timestamp_ms >= last.t_start_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::project::{ChunkRecord, ProjectSettings};
    use crate::state::timeline;
    use std::path::Path;

    fn two_chunk_project() -> Project {
        let mut project = Project::new(Path::new("/tmp/find-test"), ProjectSettings::default());
        let mut c1 = ChunkRecord::new(1, "one".into(), 0, 4);
        c1.duration_ms = 1000;
        let mut c2 = ChunkRecord::new(2, "two".into(), 4, 8);
        c2.duration_ms = 800;
        project.push_chunk(c1);
        project.push_chunk(c2);
        timeline::recalculate(&mut project);
        project
    }

    #[test]
    fn test_find_inside_first_chunk() {
        let project = two_chunk_project();
        assert_eq!(find_chunk_at(&project, 0).unwrap().index, 1);
        assert_eq!(find_chunk_at(&project, 500).unwrap().index, 1);
    }

    #[test]
    fn test_find_in_overlap_prefers_earlier() {
        // 960..1000 is covered by both chunks; the earlier one wins
        let project = two_chunk_project();
        assert_eq!(find_chunk_at(&project, 980).unwrap().index, 1);
    }

    #[test]
    fn test_find_past_end_returns_last() {
        let project = two_chunk_project();
        assert_eq!(find_chunk_at(&project, 99_999).unwrap().index, 2);
    }

    #[test]
    fn test_find_in_empty_project() {
        let project = Project::new(Path::new("/tmp/empty"), ProjectSettings::default());
        assert!(find_chunk_at(&project, 0).is_none());
    }
}
