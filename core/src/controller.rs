//! Orchestration controller: owns the live session and drives the
//! select → load → transcribe lifecycle.
//!
//! State lives behind an `RwLock` and is never held across an engine await:
//! an in-flight load or transcription runs against taken-out resources and
//! is reconciled on completion under an epoch guard, so a teardown that
//! races a slow engine can never resurrect a stale session.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::catalog::ModelId;
use crate::error::{Error, Result};
use crate::session::{InferenceSession, LoadEvent, SessionManager};

/// Lifecycle phase of the controller.
///
/// `Loading` and `Transcribing` are transient; `Ready` is the only stable
/// post-setup phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ModelSelected,
    Loading,
    Ready,
    Transcribing,
}

/// Events republished to observers.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    Phase(Phase),
    /// Current load progress percentage, non-decreasing per load attempt.
    LoadProgress(u8),
    /// The load-completion flag flipped to true.
    ModelLoaded,
    /// Current decoded text, growing monotonically per transcription.
    Transcript(String),
}

struct Inner {
    phase: Phase,
    selected: Option<ModelId>,
    session: Option<InferenceSession>,
    audio: Option<Arc<Vec<u8>>>,
    transcript: String,
    progress: u8,
    loaded: bool,
    /// Bumped on every load start and teardown; completions under a stale
    /// epoch discard their result instead of installing it.
    epoch: u64,
}

/// Orchestration controller for model selection, loading, and streaming
/// transcription. Holds zero or one live session at any instant.
pub struct Controller {
    manager: SessionManager,
    inner: RwLock<Inner>,
    event_tx: broadcast::Sender<ControllerEvent>,
}

impl Controller {
    pub fn new(manager: SessionManager) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            manager,
            inner: RwLock::new(Inner {
                phase: Phase::Idle,
                selected: None,
                session: None,
                audio: None,
                transcript: String::new(),
                progress: 0,
                loaded: false,
                epoch: 0,
            }),
            event_tx,
        }
    }

    /// Subscribe to republished controller events.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.event_tx.subscribe()
    }

    pub async fn phase(&self) -> Phase {
        self.inner.read().await.phase
    }

    pub async fn selected_model(&self) -> Option<ModelId> {
        self.inner.read().await.selected
    }

    /// Current decoded text.
    pub async fn transcript(&self) -> String {
        self.inner.read().await.transcript.clone()
    }

    /// Current load progress percentage.
    pub async fn progress(&self) -> u8 {
        self.inner.read().await.progress
    }

    /// Load-completion flag: true while a loaded session is held.
    pub async fn is_loaded(&self) -> bool {
        self.inner.read().await.loaded
    }

    fn emit(&self, event: ControllerEvent) {
        // Ignore send errors (no subscribers)
        let _ = self.event_tx.send(event);
    }

    /// Record `id` as the selected model.
    ///
    /// Allowed from any settled phase; an existing live session is
    /// unaffected until the next load replaces it. Rejected with `Busy`
    /// while a load or transcription is in flight.
    pub async fn select_model(&self, id: ModelId) -> Result<()> {
        {
            let mut inner = self.inner.write().await;
            match inner.phase {
                Phase::Loading | Phase::Transcribing => return Err(Error::Busy("select-model")),
                _ => {}
            }
            inner.selected = Some(id);
            inner.phase = Phase::ModelSelected;
        }
        info!(model = %id, "Model selected");
        self.emit(ControllerEvent::Phase(Phase::ModelSelected));
        Ok(())
    }

    /// Hand over the raw bytes of the user's audio file.
    ///
    /// Allowed in any phase; an in-flight transcription keeps streaming from
    /// the buffer it started with.
    pub async fn attach_audio(&self, bytes: Vec<u8>) {
        let mut inner = self.inner.write().await;
        debug!(bytes = bytes.len(), "Audio attached");
        inner.audio = Some(Arc::new(bytes));
    }

    /// Load the selected model, destroying any previously held session
    /// before the new load begins.
    pub async fn load(&self) -> Result<()> {
        let (id, epoch) = {
            let mut inner = self.inner.write().await;
            match inner.phase {
                Phase::Loading | Phase::Transcribing => return Err(Error::Busy("load")),
                _ => {}
            }
            let id = inner.selected.ok_or(Error::NoModelSelected)?;
            // Replace-and-release: the prior session is gone before the
            // engine sees the new load.
            if let Some(mut old) = inner.session.take() {
                old.destroy();
            }
            inner.loaded = false;
            inner.progress = 0;
            inner.phase = Phase::Loading;
            inner.epoch += 1;
            (id, inner.epoch)
        };
        self.emit(ControllerEvent::Phase(Phase::Loading));
        self.emit(ControllerEvent::LoadProgress(0));
        info!(model = %id, "Loading model");

        let result = self.run_load(id, epoch).await;

        let mut inner = self.inner.write().await;
        if inner.epoch != epoch {
            debug!(model = %id, "Discarding result of a stale load");
            if let Ok(mut session) = result {
                session.destroy();
            }
            return Ok(());
        }
        match result {
            Ok(session) => {
                inner.session = Some(session);
                inner.phase = Phase::Ready;
                inner.loaded = true;
                let republish_terminal = inner.progress != 100;
                inner.progress = 100;
                drop(inner);
                info!(model = %id, "Model loaded");
                if republish_terminal {
                    self.emit(ControllerEvent::LoadProgress(100));
                }
                self.emit(ControllerEvent::ModelLoaded);
                self.emit(ControllerEvent::Phase(Phase::Ready));
                Ok(())
            }
            Err(e) => {
                inner.phase = Phase::ModelSelected;
                drop(inner);
                warn!(model = %id, error = %e, "Model load failed");
                self.emit(ControllerEvent::Phase(Phase::ModelSelected));
                Err(e)
            }
        }
    }

    /// Drive the manager's load while republishing its events in order.
    async fn run_load(&self, id: ModelId, epoch: u64) -> Result<InferenceSession> {
        let (tx, mut rx) = mpsc::channel(32);

        let load = self.manager.load_model(id, tx);
        tokio::pin!(load);

        let mut outcome = None;
        loop {
            tokio::select! {
                res = &mut load, if outcome.is_none() => outcome = Some(res),
                event = rx.recv() => match event {
                    Some(LoadEvent::Progress(pct)) => {
                        {
                            let mut inner = self.inner.write().await;
                            if inner.epoch == epoch && inner.phase == Phase::Loading {
                                inner.progress = pct;
                            }
                        }
                        self.emit(ControllerEvent::LoadProgress(pct));
                    }
                    Some(LoadEvent::Ready) => {
                        debug!(model = %id, "Load reported ready");
                    }
                    None => break,
                },
            }
        }

        match outcome {
            Some(res) => res,
            None => load.await,
        }
    }

    /// Stream a transcription of the attached audio against the held
    /// session, returning the final transcript.
    ///
    /// On a decode failure the session and the partial transcript are
    /// retained and the controller returns to `Ready`.
    pub async fn transcribe(&self) -> Result<String> {
        let (mut session, audio, epoch) = {
            let mut inner = self.inner.write().await;
            match inner.phase {
                Phase::Transcribing => return Err(Error::Busy("transcribe")),
                Phase::Ready => {}
                _ => return Err(Error::NoModelLoaded),
            }
            let audio = inner.audio.clone().ok_or(Error::NoAudioLoaded)?;
            let Some(session) = inner.session.take() else {
                return Err(Error::NoModelLoaded);
            };
            inner.transcript.clear();
            inner.phase = Phase::Transcribing;
            (session, audio, inner.epoch)
        };
        self.emit(ControllerEvent::Phase(Phase::Transcribing));
        info!(bytes = audio.len(), "Transcription started");

        let result = self.run_stream(&mut session, &audio, epoch).await;

        let mut inner = self.inner.write().await;
        if inner.epoch != epoch {
            debug!("Discarding session of a torn-down transcription");
            session.destroy();
            return result;
        }
        inner.session = Some(session);
        inner.phase = Phase::Ready;
        drop(inner);
        self.emit(ControllerEvent::Phase(Phase::Ready));
        match &result {
            Ok(transcript) => info!(chars = transcript.len(), "Transcription complete"),
            Err(e) => warn!(error = %e, "Transcription failed"),
        }
        result
    }

    /// Drive the session's stream while republishing decode events in order.
    async fn run_stream(
        &self,
        session: &mut InferenceSession,
        audio: &[u8],
        epoch: u64,
    ) -> Result<String> {
        let (tx, mut rx) = mpsc::channel(32);

        let stream = session.stream(audio, tx);
        tokio::pin!(stream);

        let mut latest = String::new();
        let mut outcome = None;
        loop {
            tokio::select! {
                res = &mut stream, if outcome.is_none() => outcome = Some(res),
                event = rx.recv() => match event {
                    Some(text) => {
                        latest = text;
                        {
                            let mut inner = self.inner.write().await;
                            if inner.epoch == epoch && inner.phase == Phase::Transcribing {
                                inner.transcript.clone_from(&latest);
                            }
                        }
                        self.emit(ControllerEvent::Transcript(latest.clone()));
                    }
                    None => break,
                },
            }
        }

        match outcome {
            Some(res) => res?,
            None => stream.await?,
        }
        Ok(latest)
    }

    /// Tear down to `Idle`: destroy any held session and clear selection,
    /// audio, and observable state. Allowed in any phase; an in-flight
    /// operation discards its result when it completes.
    pub async fn teardown(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.epoch += 1;
            if let Some(mut session) = inner.session.take() {
                session.destroy();
            }
            inner.selected = None;
            inner.audio = None;
            inner.transcript.clear();
            inner.progress = 0;
            inner.loaded = false;
            inner.phase = Phase::Idle;
        }
        info!("Controller torn down");
        self.emit(ControllerEvent::Phase(Phase::Idle));
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
