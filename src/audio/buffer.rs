//! Audio buffer type for chunk audio
//!
//! Chunks are mono speech; the buffer stores one channel of f32 samples
//! together with the sample rate it was measured at.

use crate::state::timeline::ms_from_samples;

/// Mono audio buffer
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    /// Sample data in the range [-1.0, 1.0]
    samples: Vec<f32>,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer with the given length
    pub fn silence(num_samples: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; num_samples],
            sample_rate,
        }
    }

    /// Create a buffer from existing samples
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples at all
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in integer milliseconds (round-half-to-even)
    pub fn duration_ms(&self) -> u64 {
        ms_from_samples(self.samples.len() as u64, self.sample_rate)
    }

    /// Get a reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get a mutable reference to the samples
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Consume the buffer and return the samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Root-mean-square level as a linear value
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|&s| (s as f64).powi(2)).sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }

    /// RMS level in dBFS, or negative infinity for silence
    pub fn rms_db(&self) -> f64 {
        let rms = self.rms();
        if rms > 0.0 {
            20.0 * rms.log10()
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Peak absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }

    /// True when every sample is exactly zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }

    /// Truncate or zero-pad to an exact sample count
    pub fn resize_to(&mut self, num_samples: usize) {
        self.samples.resize(num_samples, 0.0);
    }

    /// Clamp all samples into [-1.0, 1.0]
    pub fn clamp_to_unit(&mut self) {
        for s in &mut self.samples {
            *s = s.clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_silence() {
        let buf = AudioBuffer::silence(2400, 24000);
        assert_eq!(buf.len(), 2400);
        assert_eq!(buf.duration_ms(), 100);
        assert!(buf.is_silent());
        assert_eq!(buf.rms_db(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_rms_of_sine() {
        let sample_rate = 24000;
        let samples: Vec<f32> = (0..24000)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect();
        let buf = AudioBuffer::from_samples(samples, sample_rate);
        // RMS of a unity sine is 1/sqrt(2) = -3.01 dBFS
        assert_relative_eq!(buf.rms_db(), -3.01, epsilon = 0.05);
    }

    #[test]
    fn test_resize_pads_with_silence() {
        let mut buf = AudioBuffer::from_samples(vec![0.5; 100], 24000);
        buf.resize_to(150);
        assert_eq!(buf.len(), 150);
        assert_eq!(buf.samples()[149], 0.0);

        buf.resize_to(80);
        assert_eq!(buf.len(), 80);
        assert_eq!(buf.samples()[79], 0.5);
    }

    #[test]
    fn test_clamp() {
        let mut buf = AudioBuffer::from_samples(vec![1.7, -2.0, 0.3], 24000);
        buf.clamp_to_unit();
        assert_eq!(buf.samples(), &[1.0, -1.0, 0.3]);
    }
}
