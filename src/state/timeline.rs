//! Timeline engine
//!
//! Derives each chunk's start time from the ordered durations and the
//! project crossfade, and defines the two replacement-time policies.
//!
//! Placement rule: `t[1] = 0`; for i > 1,
//! `t[i] = t[i-1] + duration[i-1] - crossfade_ms`, saturating at zero.
//! Consecutive chunks overlap by the crossfade width in the final mix, so
//! downstream timestamps are defined against that overlapped placement.

use serde::{Deserialize, Serialize};

use crate::error::{NarravoxError, Result};
use crate::state::project::Project;

/// Maximum tempo ratio a locked replacement may require before the
/// operation is refused instead of silently destroying content.
pub const MAX_STRETCH_RATIO: f64 = 3.0;

/// Replacement-time timeline policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMode {
    /// Time-stretch new audio to the prior duration; no other chunk moves.
    Locked,
    /// Keep the new audio's native duration and shift every later chunk.
    Free,
}

impl std::str::FromStr for TimelineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "locked" => Ok(TimelineMode::Locked),
            "free" => Ok(TimelineMode::Free),
            other => Err(format!("unknown timeline mode: {other}")),
        }
    }
}

/// Convert a sample count to integer milliseconds.
///
/// Uses round-half-to-even so timeline arithmetic reproduces exactly
/// across platforms.
pub fn ms_from_samples(samples: u64, sample_rate: u32) -> u64 {
    debug_assert!(sample_rate > 0);
    let exact = samples as f64 * 1000.0 / sample_rate as f64;
    exact.round_ties_even() as u64
}

/// Convert integer milliseconds to a sample count (round-half-to-even).
pub fn samples_from_ms(ms: u64, sample_rate: u32) -> u64 {
    debug_assert!(sample_rate > 0);
    let exact = ms as f64 * sample_rate as f64 / 1000.0;
    exact.round_ties_even() as u64
}

/// Recompute `t_start_ms` for every chunk from the placement rule.
///
/// Pure, deterministic pass over the ordered sequence; only `t_start_ms`
/// changes. Called after a free-mode replacement and during initial
/// generation.
pub fn recalculate(project: &mut Project) {
    let crossfade = project.settings.crossfade_ms as u64;
    let mut next_start: u64 = 0;
    for chunk in project.chunks_mut() {
        chunk.t_start_ms = next_start;
        next_start = (chunk.t_start_ms + chunk.duration_ms).saturating_sub(crossfade);
    }
}

/// Validate the tempo ratio a locked replacement would need.
///
/// Checked before any mutation so a refused stretch leaves the project
/// untouched.
pub fn check_stretch_ratio(index: u32, new_duration_ms: u64, old_duration_ms: u64) -> Result<f64> {
    if old_duration_ms == 0 || new_duration_ms == 0 {
        return Err(NarravoxError::StretchOutOfBounds {
            index,
            ratio: f64::INFINITY,
            limit: MAX_STRETCH_RATIO,
        });
    }
    let ratio = new_duration_ms as f64 / old_duration_ms as f64;
    if ratio > MAX_STRETCH_RATIO || ratio < 1.0 / MAX_STRETCH_RATIO {
        return Err(NarravoxError::StretchOutOfBounds {
            index,
            ratio,
            limit: MAX_STRETCH_RATIO,
        });
    }
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::project::{ChunkRecord, Project, ProjectSettings};
    use std::path::Path;
    use test_case::test_case;

    fn project_with_durations(durations: &[u64], crossfade_ms: u32) -> Project {
        let settings = ProjectSettings {
            crossfade_ms,
            ..ProjectSettings::default()
        };
        let mut project = Project::new(Path::new("/tmp/test-project"), settings);
        for (i, &d) in durations.iter().enumerate() {
            let mut chunk = ChunkRecord::new((i + 1) as u32, format!("chunk {}", i + 1), 0, 1);
            chunk.duration_ms = d;
            project.push_chunk(chunk);
        }
        project
    }

    #[test_case(0, 24000, 0; "zero")]
    #[test_case(24000, 24000, 1000; "one second")]
    #[test_case(12, 24000, 0; "rounds half to even down")]
    #[test_case(36, 24000, 2; "rounds half to even up")]
    fn test_ms_from_samples(samples: u64, rate: u32, expected: u64) {
        assert_eq!(ms_from_samples(samples, rate), expected);
    }

    #[test]
    fn test_samples_round_trip() {
        assert_eq!(samples_from_ms(1000, 24000), 24000);
        assert_eq!(samples_from_ms(40, 24000), 960);
    }

    #[test]
    fn test_placement_rule() {
        // 1000 ms + 800 ms with a 40 ms crossfade overlap
        let mut project = project_with_durations(&[1000, 800], 40);
        recalculate(&mut project);
        assert_eq!(project.chunks()[0].t_start_ms, 0);
        assert_eq!(project.chunks()[1].t_start_ms, 960);
    }

    #[test]
    fn test_placement_three_chunks() {
        let mut project = project_with_durations(&[1000, 800, 500], 40);
        recalculate(&mut project);
        let starts: Vec<u64> = project.chunks().iter().map(|c| c.t_start_ms).collect();
        assert_eq!(starts, vec![0, 960, 1720]);
    }

    #[test]
    fn test_placement_saturates_at_zero() {
        // Degenerate durations shorter than the crossfade must not wrap.
        let mut project = project_with_durations(&[10, 10], 40);
        recalculate(&mut project);
        assert_eq!(project.chunks()[1].t_start_ms, 0);
    }

    #[test]
    fn test_stretch_ratio_within_bounds() {
        let ratio = check_stretch_ratio(1, 1200, 1000).unwrap();
        assert!((ratio - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_stretch_ratio_too_long() {
        let err = check_stretch_ratio(1, 3500, 1000).unwrap_err();
        assert_eq!(err.error_code(), "STRETCH_OUT_OF_BOUNDS");
    }

    #[test]
    fn test_stretch_ratio_too_short() {
        let err = check_stretch_ratio(1, 300, 1000).unwrap_err();
        assert_eq!(err.error_code(), "STRETCH_OUT_OF_BOUNDS");
    }

    #[test]
    fn test_timeline_mode_parse() {
        assert_eq!("locked".parse::<TimelineMode>(), Ok(TimelineMode::Locked));
        assert_eq!("free".parse::<TimelineMode>(), Ok(TimelineMode::Free));
        assert!("sticky".parse::<TimelineMode>().is_err());
    }
}
