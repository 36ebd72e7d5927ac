//! Crossfade stitching and loudness matching
//!
//! Adjacent chunks are blended over the crossfade window with
//! complementary cosine-squared curves (`cos²` out, `sin²` in, summing to
//! unity), and the assembled mix gets one uniform gain to hit the loudness
//! target. No per-chunk gain and no dynamics processing, so chunks keep
//! their relative level.

use std::f64::consts::FRAC_PI_2;

use log::warn;

use crate::audio::buffer::AudioBuffer;
use crate::state::timeline::samples_from_ms;

/// Crossfade window width in samples for a project rate.
pub fn crossfade_window(sample_rate: u32, crossfade_ms: u32) -> usize {
    samples_from_ms(crossfade_ms as u64, sample_rate) as usize
}

/// Append `next` to `mix` with a crossfade of `window` samples.
///
/// The window shrinks to the shorter of the two signals; a zero window
/// degenerates to plain concatenation.
fn crossfade_append(mix: &mut Vec<f32>, next: &[f32], window: usize) {
    let window = window.min(mix.len()).min(next.len());
    if window == 0 {
        mix.extend_from_slice(next);
        return;
    }

    let tail = mix.len() - window;
    for i in 0..window {
        let phase = FRAC_PI_2 * i as f64 / window as f64;
        let fade_out = phase.cos().powi(2);
        let fade_in = phase.sin().powi(2);
        mix[tail + i] = (mix[tail + i] as f64 * fade_out + next[i] as f64 * fade_in) as f32;
    }
    mix.extend_from_slice(&next[window..]);
}

/// Stitch ordered chunk buffers into one continuous waveform.
///
/// Non-overlapping regions are copied verbatim; the result's length equals
/// the sum of chunk lengths minus one window per adjacent pair.
pub fn stitch(chunks: &[AudioBuffer], sample_rate: u32, crossfade_ms: u32) -> AudioBuffer {
    let window = crossfade_window(sample_rate, crossfade_ms);
    let mut mix: Vec<f32> = Vec::new();
    for chunk in chunks {
        crossfade_append(&mut mix, chunk.samples(), window);
    }
    AudioBuffer::from_samples(mix, sample_rate)
}

/// Apply one uniform gain so the buffer's RMS-dBFS estimate hits
/// `target_db`, then clamp to [-1, 1].
///
/// A fully silent buffer is left untouched (reported as a warning, not an
/// error) since there is no level to scale from. Returns whether gain was
/// applied.
pub fn match_loudness(buffer: &mut AudioBuffer, target_db: f64) -> bool {
    let current_db = buffer.rms_db();
    if !current_db.is_finite() {
        warn!("Mix is silent; skipping loudness normalization");
        return false;
    }

    let gain = 10f64.powf((target_db - current_db) / 20.0) as f32;
    for s in buffer.samples_mut() {
        *s *= gain;
    }
    buffer.clamp_to_unit();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constant(level: f32, len: usize) -> AudioBuffer {
        AudioBuffer::from_samples(vec![level; len], 1000)
    }

    #[test]
    fn test_stitch_length() {
        // 1000 samples + 800 samples with a 40-sample overlap
        let chunks = vec![constant(0.5, 1000), constant(0.5, 800)];
        let mix = stitch(&chunks, 1000, 40);
        assert_eq!(mix.len(), 1000 + 800 - 40);
    }

    #[test]
    fn test_stitch_without_crossfade_concatenates() {
        let chunks = vec![constant(0.1, 100), constant(0.2, 100)];
        let mix = stitch(&chunks, 1000, 0);
        assert_eq!(mix.len(), 200);
        assert_eq!(mix.samples()[99], 0.1);
        assert_eq!(mix.samples()[100], 0.2);
    }

    #[test]
    fn test_fade_curves_sum_to_unity() {
        // Equal constant signals must pass through the overlap unchanged
        let chunks = vec![constant(0.5, 100), constant(0.5, 100)];
        let mix = stitch(&chunks, 1000, 50);
        for &s in mix.samples() {
            assert_relative_eq!(s, 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_overlap_blends_monotonically() {
        let chunks = vec![constant(1.0, 100), constant(0.0, 100)];
        let mix = stitch(&chunks, 1000, 50);
        let overlap = &mix.samples()[50..100];
        // Fade-out starts at full level and decays toward the next chunk
        assert_relative_eq!(overlap[0], 1.0, epsilon = 1e-6);
        for pair in overlap.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-6);
        }
    }

    #[test]
    fn test_stitch_empty() {
        let mix = stitch(&[], 1000, 40);
        assert!(mix.is_empty());
    }

    #[test]
    fn test_match_loudness_hits_target() {
        let mut buffer = constant(0.05, 10000);
        assert!(match_loudness(&mut buffer, -16.0));
        assert_relative_eq!(buffer.rms_db(), -16.0, epsilon = 0.01);
    }

    #[test]
    fn test_match_loudness_is_uniform() {
        let mut samples = vec![0.02; 1000];
        samples.extend(vec![0.04; 1000]);
        let mut buffer = AudioBuffer::from_samples(samples, 1000);
        match_loudness(&mut buffer, -16.0);
        // Relative level between regions is preserved by a single gain
        let ratio = buffer.samples()[1500] / buffer.samples()[500];
        assert_relative_eq!(ratio, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_match_loudness_skips_silence() {
        let mut buffer = constant(0.0, 1000);
        assert!(!match_loudness(&mut buffer, -16.0));
        assert!(buffer.is_silent());
    }
}
