//! WAV decode/encode for chunk audio
//!
//! Chunks and the final mix are stored as WAV. Decode is deliberately
//! strict about sample rates: nothing here resamples, the caller compares
//! the decoded rate against the project rate and rejects mismatches.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use sha2::{Digest, Sha256};

use crate::audio::buffer::AudioBuffer;
use crate::error::{NarravoxError, Result};

/// Decode a WAV file to a mono f32 buffer at its native sample rate.
///
/// Multi-channel files contribute their first channel only; chunk audio is
/// speech and treated as mono throughout.
pub fn decode(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(NarravoxError::AudioNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = WavReader::open(path).map_err(|e| NarravoxError::InvalidAudio {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| NarravoxError::InvalidAudio {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?,
        (SampleFormat::Int, bits @ (16 | 24 | 32)) => {
            let scale = (1i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| NarravoxError::InvalidAudio {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
        }
        (format, bits) => {
            return Err(NarravoxError::InvalidAudio {
                path: path.to_path_buf(),
                reason: format!("unsupported sample format: {format:?} at {bits} bits"),
            })
        }
    };

    let mono: Vec<f32> = if channels <= 1 {
        interleaved
    } else {
        interleaved.into_iter().step_by(channels).collect()
    };

    Ok(AudioBuffer::from_samples(mono, spec.sample_rate))
}

/// Encode a buffer as 16-bit PCM WAV, creating parent directories.
pub fn encode(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| NarravoxError::InvalidAudio {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    for &sample in buffer.samples() {
        let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(scaled)
            .map_err(|e| NarravoxError::InvalidAudio {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
    }

    writer.finalize().map_err(|e| NarravoxError::InvalidAudio {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// SHA-256 digest of a file, hex encoded. Used for chunk provenance.
pub fn file_digest(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    let hash = Sha256::digest(&content);
    Ok(format!("{hash:x}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ramp_buffer(len: usize, sample_rate: u32) -> AudioBuffer {
        let samples: Vec<f32> = (0..len).map(|i| (i as f32 / len as f32) - 0.5).collect();
        AudioBuffer::from_samples(samples, sample_rate)
    }

    #[test]
    fn test_encode_decode_preserves_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunk.wav");
        let buffer = ramp_buffer(24000, 24000);

        encode(&buffer, &path).unwrap();
        let decoded = decode(&path).unwrap();

        assert_eq!(decoded.sample_rate(), 24000);
        assert_eq!(decoded.len(), 24000);
        assert_eq!(decoded.duration_ms(), 1000);
        // 16-bit quantization error stays below one LSB
        for (a, b) in buffer.samples().iter().zip(decoded.samples()) {
            assert!((a - b).abs() < 1.0 / 32000.0);
        }
    }

    #[test]
    fn test_decode_missing_file() {
        let err = decode(Path::new("/nonexistent/chunk.wav")).unwrap_err();
        assert_eq!(err.error_code(), "AUDIO_NOT_FOUND");
    }

    #[test]
    fn test_decode_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not_audio.wav");
        fs::write(&path, b"definitely not a wav file").unwrap();
        let err = decode(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_AUDIO");
    }

    #[test]
    fn test_file_digest_is_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunk.wav");
        encode(&ramp_buffer(1000, 24000), &path).unwrap();

        let a = file_digest(&path).unwrap();
        let b = file_digest(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
