//! Tempo-only time-stretching
//!
//! Locked-mode replacement needs new audio stretched to an exact prior
//! duration without changing pitch. The transform is an injected
//! capability so the replacement protocol stays testable with a cheap
//! fake; the production implementation wraps signalsmith-stretch.

use signalsmith_stretch::Stretch;

use crate::audio::buffer::AudioBuffer;
use crate::error::{NarravoxError, Result};

/// A tempo-changing audio transform.
///
/// Implementations must return exactly `target_samples` samples at the
/// input's sample rate.
pub trait Stretcher {
    fn stretch(&self, input: &AudioBuffer, target_samples: usize) -> Result<AudioBuffer>;
}

/// Pitch-preserving stretcher backed by signalsmith-stretch.
#[derive(Debug, Default)]
pub struct SignalsmithStretcher;

impl SignalsmithStretcher {
    pub fn new() -> Self {
        Self
    }
}

impl Stretcher for SignalsmithStretcher {
    fn stretch(&self, input: &AudioBuffer, target_samples: usize) -> Result<AudioBuffer> {
        if input.is_empty() || target_samples == 0 {
            return Err(NarravoxError::RenderError {
                reason: "cannot stretch empty audio".to_string(),
            });
        }

        let mut stretcher = Stretch::preset_default(1, input.sample_rate());
        let latency = stretcher.output_latency();

        // The ratio is implied by the input/output length difference
        let mut output = vec![0.0f32; target_samples];
        stretcher.process(input.samples(), &mut output[..]);

        // Output lags the input by `latency` samples: the head of
        // `output` is warm-up and the last stretched samples only come
        // out of flush. Append the flushed tail, then drop the warm-up
        // so the buffer starts and ends with real content.
        let mut tail = vec![0.0f32; latency];
        stretcher.flush(&mut tail[..]);
        output.extend_from_slice(&tail);
        output.drain(..latency.min(output.len()));

        let mut buffer = AudioBuffer::from_samples(output, input.sample_rate());
        buffer.resize_to(target_samples);
        Ok(buffer)
    }
}

/// Linear-interpolation stretcher.
///
/// Changes pitch along with tempo, which is fine for the deterministic
/// tests that only assert on durations. Not for production audio.
#[derive(Debug, Default)]
pub struct LinearStretcher;

impl LinearStretcher {
    pub fn new() -> Self {
        Self
    }
}

impl Stretcher for LinearStretcher {
    fn stretch(&self, input: &AudioBuffer, target_samples: usize) -> Result<AudioBuffer> {
        if input.is_empty() || target_samples == 0 {
            return Err(NarravoxError::RenderError {
                reason: "cannot stretch empty audio".to_string(),
            });
        }

        let src = input.samples();
        let step = (src.len() - 1) as f64 / (target_samples.max(2) - 1) as f64;
        let samples: Vec<f32> = (0..target_samples)
            .map(|i| {
                let pos = i as f64 * step;
                let base = pos as usize;
                let frac = (pos - base as f64) as f32;
                let a = src[base.min(src.len() - 1)];
                let b = src[(base + 1).min(src.len() - 1)];
                a + (b - a) * frac
            })
            .collect();

        Ok(AudioBuffer::from_samples(samples, input.sample_rate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(len: usize, sample_rate: u32) -> AudioBuffer {
        let samples: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.5
            })
            .collect();
        AudioBuffer::from_samples(samples, sample_rate)
    }

    #[test]
    fn test_linear_stretch_exact_length() {
        let input = sine(28_800, 24000); // 1200 ms
        let out = LinearStretcher::new().stretch(&input, 24000).unwrap();
        assert_eq!(out.len(), 24000);
        assert_eq!(out.duration_ms(), 1000);
    }

    #[test]
    fn test_linear_stretch_up() {
        let input = sine(12_000, 24000);
        let out = LinearStretcher::new().stretch(&input, 21_600).unwrap();
        assert_eq!(out.len(), 21_600);
    }

    #[test]
    fn test_signalsmith_exact_length() {
        let input = sine(28_800, 24000);
        let out = SignalsmithStretcher::new().stretch(&input, 24000).unwrap();
        assert_eq!(out.len(), 24000);
    }

    #[test]
    fn test_signalsmith_keeps_head_and_tail_content() {
        // A steady tone must come out as a steady tone: no warm-up
        // silence at the head, no dropped content at the tail
        let input = sine(28_800, 24000);
        let out = SignalsmithStretcher::new().stretch(&input, 24000).unwrap();

        let window = 960; // 40 ms at 24 kHz
        let energy = |s: &[f32]| -> f64 {
            s.iter().map(|&x| (x as f64).powi(2)).sum::<f64>() / s.len() as f64
        };
        // The source tone has mean-square energy 0.125 (0.5 amplitude)
        assert!(
            energy(&out.samples()[..window]) > 1e-3,
            "head is near-silent: {}",
            energy(&out.samples()[..window])
        );
        assert!(
            energy(&out.samples()[out.len() - window..]) > 1e-3,
            "tail is near-silent: {}",
            energy(&out.samples()[out.len() - window..])
        );
    }

    #[test]
    fn test_stretch_rejects_empty_input() {
        let input = AudioBuffer::from_samples(vec![], 24000);
        assert!(SignalsmithStretcher::new().stretch(&input, 24000).is_err());
        assert!(LinearStretcher::new().stretch(&input, 24000).is_err());
    }
}
