//! Inference engine boundary.
//!
//! The core drives any backend that implements these two traits. Progress
//! and decoded text travel over channels so the controller's event loop can
//! republish them to observers in arrival order.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::catalog::ModelId;
use crate::error::Result;

/// Loads model weights and produces decode handles.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Load `id`, reporting fetch/initialize progress as percentages.
    ///
    /// Sending progress is best-effort: a dropped receiver must not fail the
    /// load. The engine must not keep a clone of the sender past the returned
    /// future's completion.
    async fn load(&self, id: ModelId, progress: mpsc::Sender<u8>) -> Result<Box<dyn DecodeHandle>>;
}

/// One loaded model instance, able to decode audio bytes to text.
#[async_trait]
pub trait DecodeHandle: Send + Sync {
    /// Stream a transcription of `audio`, sending the cumulative transcript
    /// after each decoded window.
    ///
    /// Events are ordered by audio time and the stream is finite: the future
    /// resolves once the buffer is exhausted or a decode error occurs.
    /// Dropping the handle releases the engine resources behind it.
    async fn stream(&mut self, audio: &[u8], decoded: mpsc::Sender<String>) -> Result<()>;
}
