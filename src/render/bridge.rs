//! HTTP bridge renderer
//!
//! Talks to a TTS sidecar process over HTTP. The sidecar owns the model
//! weights and GPU; this side only sends text plus rendering parameters
//! and receives raw samples back.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::audio::AudioBuffer;
use crate::error::{NarravoxError, Result};
use crate::render::Renderer;
use crate::state::project::ProjectSettings;

/// Bridge endpoint environment variable.
pub const BRIDGE_URL_ENV_VAR: &str = "NARRAVOX_TTS_URL";
/// Request timeout override in milliseconds.
pub const BRIDGE_TIMEOUT_ENV_VAR: &str = "NARRAVOX_TTS_TIMEOUT_MS";

const DEFAULT_BRIDGE_URL: &str = "http://localhost:8001";
const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Request sent to the TTS bridge.
#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    text: &'a str,
    seed: u64,
    sample_rate: u32,
    model: &'a str,
    params: &'a Map<String, Value>,
}

/// Response from the TTS bridge.
#[derive(Debug, Deserialize)]
struct BridgeResponse {
    sample_rate: u32,
    samples: Vec<f32>,
    #[serde(default)]
    error: Option<String>,
}

/// Renderer backed by the HTTP sidecar.
pub struct BridgeRenderer {
    url: String,
    timeout_ms: u64,
    sample_rate: u32,
    model_id: String,
}

impl BridgeRenderer {
    /// Configure the bridge from project settings and the environment.
    pub fn from_env(settings: &ProjectSettings) -> Result<Self> {
        let url = env::var(BRIDGE_URL_ENV_VAR).unwrap_or_else(|_| DEFAULT_BRIDGE_URL.into());
        let timeout_ms = env::var(BRIDGE_TIMEOUT_ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        Ok(Self {
            url,
            timeout_ms,
            sample_rate: settings.sample_rate,
            model_id: settings.model_id.clone(),
        })
    }
}

impl Renderer for BridgeRenderer {
    fn render(&self, text: &str, seed: u64, params: &Map<String, Value>) -> Result<AudioBuffer> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(|e| NarravoxError::RenderError {
                reason: e.to_string(),
            })?;

        let request = BridgeRequest {
            text,
            seed,
            sample_rate: self.sample_rate,
            model: &self.model_id,
            params,
        };

        let response = client
            .post(format!("{}/render", self.url))
            .json(&request)
            .send()
            .map_err(|e| NarravoxError::RenderError {
                reason: if e.is_timeout() {
                    format!("bridge timed out after {} ms", self.timeout_ms)
                } else {
                    format!("cannot reach bridge at {}: {}", self.url, e)
                },
            })?;

        if !response.status().is_success() {
            return Err(NarravoxError::RenderError {
                reason: format!("bridge returned {}", response.status()),
            });
        }

        let body: BridgeResponse = response.json().map_err(|e| NarravoxError::RenderError {
            reason: format!("malformed bridge response: {e}"),
        })?;

        if let Some(error) = body.error {
            return Err(NarravoxError::RenderError { reason: error });
        }

        Ok(AudioBuffer::from_samples(body.samples, body.sample_rate))
    }
}
