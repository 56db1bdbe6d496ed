//! Whisper inference engine for sotto.
//!
//! Implements the core engine traits on top of whisper.cpp via whisper-rs:
//! ggml weights are fetched from Hugging Face on first use, WAV input is
//! normalized to 16 kHz mono, and decoding streams cumulative transcripts
//! window by window.

pub mod fetch;
mod wav;
mod whisper;

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use sotto_core::{DecodeHandle, Error, InferenceEngine, ModelId, Result};

use crate::whisper::WhisperDecoder;

/// Inference engine backed by whisper.cpp.
pub struct WhisperEngine {
    models_dir: PathBuf,
    language: Option<String>,
}

impl WhisperEngine {
    /// Create an engine that caches weights under `models_dir`.
    ///
    /// `language` is a code like "en" or "de"; `None` auto-detects.
    pub fn new(models_dir: impl Into<PathBuf>, language: Option<String>) -> Self {
        Self {
            models_dir: models_dir.into(),
            language,
        }
    }

    /// Route whisper.cpp and GGML logs through tracing. Call once at startup.
    pub fn install_logging_hooks() {
        whisper_rs::install_logging_hooks();
    }
}

#[async_trait]
impl InferenceEngine for WhisperEngine {
    async fn load(&self, id: ModelId, progress: mpsc::Sender<u8>) -> Result<Box<dyn DecodeHandle>> {
        let path = fetch::ensure_model(&self.models_dir, id, &progress)
            .await
            .map_err(|e| Error::load_failed(format!("{e:#}")))?;

        info!(model = %id, path = %path.display(), "Initializing Whisper context");
        let decoder = WhisperDecoder::new(&path, self.language.clone())
            .map_err(|e| Error::load_failed(format!("{e:#}")))?;

        Ok(Box::new(decoder))
    }
}
