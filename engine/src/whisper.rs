//! Whisper decode backend.
//!
//! Wraps whisper.cpp via whisper-rs. Each decoder owns its context and
//! state, so destroying a session frees the model memory.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, WhisperState};

use sotto_core::{DecodeHandle, Error};

use crate::wav::{self, TARGET_SAMPLE_RATE};

/// Audio seconds decoded per window. Each window appends to the cumulative
/// transcript and triggers one decode event.
const WINDOW_SECS: usize = 10;

/// Whisper decode handle for one loaded model.
pub struct WhisperDecoder {
    // Kept alive for the decoder's lifetime; dropped with the session.
    _ctx: WhisperContext,
    state: WhisperState,
    language: Option<String>,
}

impl WhisperDecoder {
    /// Load a Whisper GGML model from `model_path`.
    ///
    /// `language` is a code like "en" or "de"; `None` auto-detects.
    pub fn new(model_path: impl AsRef<Path>, language: Option<String>) -> Result<Self> {
        info!(
            path = %model_path.as_ref().display(),
            language = ?language,
            "Loading Whisper model"
        );

        let ctx = WhisperContext::new_with_params(
            model_path.as_ref().to_str().context("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .context("Failed to load Whisper model")?;

        let state = ctx.create_state().context("Failed to create Whisper state")?;

        Ok(Self {
            _ctx: ctx,
            state,
            language,
        })
    }

    /// Decode one audio window, returning its text.
    fn decode_window(&mut self, samples: &[f32]) -> Result<String> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        if let Some(ref lang) = self.language {
            params.set_language(Some(lang));
        } else {
            params.set_language(None); // Auto-detect
        }

        // Disable printing to stdout
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        self.state
            .full(params, samples)
            .context("Whisper inference failed")?;

        let num_segments = self.state.full_n_segments();
        let mut text = String::new();
        for i in 0..num_segments {
            if let Some(segment) = self.state.get_segment(i) {
                if let Ok(segment_text) = segment.to_str_lossy() {
                    text.push_str(&segment_text);
                }
            }
        }

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl DecodeHandle for WhisperDecoder {
    async fn stream(
        &mut self,
        audio: &[u8],
        decoded: mpsc::Sender<String>,
    ) -> sotto_core::Result<()> {
        let samples =
            wav::samples_16k_mono(audio).map_err(|e| Error::decode_failed(format!("{e:#}")))?;
        if samples.is_empty() {
            return Err(Error::decode_failed("audio contains no samples"));
        }

        debug!(
            samples = samples.len(),
            duration_secs = samples.len() as f32 / TARGET_SAMPLE_RATE as f32,
            "Streaming transcription"
        );

        let window = WINDOW_SECS * TARGET_SAMPLE_RATE as usize;
        let mut transcript = String::new();
        for chunk in samples.chunks(window) {
            let text = self
                .decode_window(chunk)
                .map_err(|e| Error::decode_failed(format!("{e:#}")))?;
            if !text.is_empty() {
                if !transcript.is_empty() {
                    transcript.push(' ');
                }
                transcript.push_str(&text);
            }
            if decoded.send(transcript.clone()).await.is_err() {
                // Receiver gone; decoding further windows has no audience.
                break;
            }
        }

        Ok(())
    }
}
