//! Model loading and session ownership.
//!
//! [`SessionManager`] mediates "load model by identifier" against the engine
//! and republishes typed load events; [`InferenceSession`] owns one loaded
//! model instance and is destroyed explicitly when replaced or torn down.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::catalog::ModelId;
use crate::engine::{DecodeHandle, InferenceEngine};
use crate::error::{Error, Result};

/// Events emitted while a model load is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    /// Percentage of model bytes fetched/initialized, non-decreasing in
    /// `[0, 100]` within one load attempt.
    Progress(u8),
    /// The model is loaded; sent exactly once, only on success.
    Ready,
}

/// Factory for [`InferenceSession`] handles.
pub struct SessionManager {
    engine: Arc<dyn InferenceEngine>,
}

impl SessionManager {
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Load a model, forwarding engine progress as [`LoadEvent`]s.
    ///
    /// Progress is capped at 100 and regressions from a misbehaving engine
    /// are dropped, so observers always see a non-decreasing sequence.
    /// Event delivery is best-effort: a dropped receiver never fails the
    /// load. On engine failure the error is returned and `Ready` is never
    /// sent; progress already forwarded is not rolled back.
    pub async fn load_model(
        &self,
        id: ModelId,
        events: mpsc::Sender<LoadEvent>,
    ) -> Result<InferenceSession> {
        let (raw_tx, mut raw_rx) = mpsc::channel(32);

        let load = self.engine.load(id, raw_tx);
        tokio::pin!(load);

        let mut last = 0u8;
        let mut outcome = None;
        loop {
            tokio::select! {
                res = &mut load, if outcome.is_none() => outcome = Some(res),
                received = raw_rx.recv() => match received {
                    Some(pct) => {
                        let pct = pct.min(100);
                        if pct < last {
                            warn!(pct, last, model = %id, "Dropping decreasing load progress");
                            continue;
                        }
                        last = pct;
                        let _ = events.send(LoadEvent::Progress(pct)).await;
                    }
                    None => break,
                },
            }
        }

        let handle = match outcome {
            // The engine may drop its sender before resolving.
            Some(res) => res?,
            None => load.await?,
        };

        let _ = events.send(LoadEvent::Ready).await;
        debug!(model = %id, "Session ready");
        Ok(InferenceSession::new(handle))
    }
}

/// One fully loaded model instance, ready to decode.
///
/// Created only by a successful [`SessionManager::load_model`]. The handle
/// slot doubles as the liveness flag; dropping the session releases the
/// engine resources behind it.
pub struct InferenceSession {
    handle: Option<Box<dyn DecodeHandle>>,
}

impl InferenceSession {
    fn new(handle: Box<dyn DecodeHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.handle.is_some()
    }

    /// Stream a transcription of `audio`, sending each cumulative transcript
    /// increment on `decoded`.
    ///
    /// Fails with [`Error::SessionDestroyed`] (sending nothing) if the
    /// session has been destroyed.
    pub async fn stream(&mut self, audio: &[u8], decoded: mpsc::Sender<String>) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(Error::SessionDestroyed)?;
        handle.stream(audio, decoded).await
    }

    /// Release the engine resources behind this session. Idempotent.
    pub fn destroy(&mut self) {
        if self.handle.take().is_some() {
            debug!("Session destroyed");
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
