//! Deterministic mock renderer
//!
//! Produces synthetic speech-shaped audio without any model: a seeded tone
//! pair plus noise, with duration proportional to word count. Used for
//! end-to-end pipeline tests and offline development.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::render::Renderer;

/// Seconds of synthetic audio per word.
const SECONDS_PER_WORD: f64 = 0.28;
const MIN_DURATION_SECS: f64 = 0.35;
const MAX_DURATION_SECS: f64 = 6.0;

/// Renderer that synthesizes deterministic audio from (text, seed).
#[derive(Debug, Clone)]
pub struct MockRenderer {
    sample_rate: u32,
}

impl MockRenderer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl Renderer for MockRenderer {
    fn render(&self, text: &str, seed: u64, _params: &Map<String, Value>) -> Result<AudioBuffer> {
        let words = text.split_whitespace().count().max(1);
        let duration = (SECONDS_PER_WORD * words as f64).clamp(MIN_DURATION_SECS, MAX_DURATION_SECS);
        let num_samples = ((duration * self.sample_rate as f64).round() as usize)
            .max(self.sample_rate as usize / 4);

        let mut rng = StdRng::seed_from_u64(seed);
        let base_freq = 180.0 + (seed % 7) as f64 * 15.0;

        let samples: Vec<f32> = (0..num_samples)
            .map(|i| {
                let t = i as f64 / self.sample_rate as f64;
                let tone = 0.18 * (2.0 * std::f64::consts::PI * base_freq * t).sin()
                    + 0.08 * (2.0 * std::f64::consts::PI * base_freq * 0.5 * t).sin();
                let noise = 0.05 * rng.gen_range(-1.0f64..1.0);
                (tone + noise) as f32
            })
            .collect();

        Ok(AudioBuffer::from_samples(samples, self.sample_rate))
    }
}
