//! Renderer boundary
//!
//! The TTS model is an external collaborator: the core only depends on the
//! `Renderer` trait. Production builds talk to a sidecar over HTTP (the
//! `tts-bridge` feature); tests and CI set `NARRAVOX_MOCK_TTS` to get
//! deterministic synthetic speech instead.

#[cfg(feature = "tts-bridge")]
pub mod bridge;
pub mod mock;

use serde_json::{Map, Value};

use crate::audio::AudioBuffer;
use crate::error::Result;
use crate::state::project::ProjectSettings;

#[cfg(not(feature = "tts-bridge"))]
use crate::error::NarravoxError;

/// Environment toggle that selects the mock renderer.
pub const MOCK_ENV_VAR: &str = "NARRAVOX_MOCK_TTS";

/// Renders chunk text to audio.
///
/// Implementations must be deterministic for identical (text, seed, params)
/// inputs; "re-gen with the same seed" workflows rely on it.
pub trait Renderer {
    fn render(&self, text: &str, seed: u64, params: &Map<String, Value>) -> Result<AudioBuffer>;
}

/// Merge override parameters onto defaults; null overrides are dropped.
pub fn merge_params(
    defaults: &Map<String, Value>,
    overrides: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        if !value.is_null() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Whether the mock renderer was requested via the environment.
pub fn mock_mode() -> bool {
    match std::env::var(MOCK_ENV_VAR) {
        Ok(value) => !matches!(value.to_lowercase().as_str(), "" | "0" | "false" | "off"),
        Err(_) => false,
    }
}

/// Select a renderer from the environment.
#[cfg(feature = "tts-bridge")]
pub fn renderer_from_env(settings: &ProjectSettings) -> Result<Box<dyn Renderer>> {
    if mock_mode() {
        Ok(Box::new(mock::MockRenderer::new(settings.sample_rate)))
    } else {
        Ok(Box::new(bridge::BridgeRenderer::from_env(settings)?))
    }
}

/// Select a renderer from the environment.
#[cfg(not(feature = "tts-bridge"))]
pub fn renderer_from_env(settings: &ProjectSettings) -> Result<Box<dyn Renderer>> {
    if mock_mode() {
        Ok(Box::new(mock::MockRenderer::new(settings.sample_rate)))
    } else {
        Err(NarravoxError::RenderError {
            reason: format!(
                "no renderer configured: set {MOCK_ENV_VAR}=1 or build with the tts-bridge feature"
            ),
        })
    }
}
