//! End-to-end lifecycle scenarios against a scripted engine.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use sotto_core::{
    Controller, ControllerEvent, DecodeHandle, Error, InferenceEngine, ModelId, Phase, Result,
    SessionManager,
};

type EngineLog = Arc<Mutex<Vec<String>>>;

struct ScriptedEngine {
    progress: Vec<u8>,
    windows: Vec<String>,
    counter: AtomicUsize,
    log: EngineLog,
}

impl ScriptedEngine {
    fn new(progress: Vec<u8>, windows: Vec<&str>) -> Self {
        Self {
            progress,
            windows: windows.into_iter().map(String::from).collect(),
            counter: AtomicUsize::new(0),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl InferenceEngine for ScriptedEngine {
    async fn load(
        &self,
        id: ModelId,
        progress: mpsc::Sender<u8>,
    ) -> Result<Box<dyn DecodeHandle>> {
        for pct in &self.progress {
            let _ = progress.send(*pct).await;
        }
        let name = format!("S{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1);
        self.log.lock().unwrap().push(format!("load {name} {id}"));
        Ok(Box::new(ScriptedHandle {
            name,
            windows: self.windows.clone(),
            log: self.log.clone(),
        }))
    }
}

struct ScriptedHandle {
    name: String,
    windows: Vec<String>,
    log: EngineLog,
}

#[async_trait]
impl DecodeHandle for ScriptedHandle {
    async fn stream(&mut self, _audio: &[u8], decoded: mpsc::Sender<String>) -> Result<()> {
        for window in &self.windows {
            let _ = decoded.send(window.clone()).await;
        }
        Ok(())
    }
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(format!("destroy {}", self.name));
    }
}

fn controller(engine: ScriptedEngine) -> (Controller, EngineLog) {
    let log = engine.log.clone();
    (Controller::new(SessionManager::new(Arc::new(engine))), log)
}

/// Scenario A: select, load with progress [10, 45, 80, 100], reach Ready
/// with an empty transcript.
#[tokio::test]
async fn scenario_select_then_load_reaches_ready() {
    let (controller, _) = controller(ScriptedEngine::new(vec![10, 45, 80, 100], vec![]));
    let mut events = controller.subscribe();

    controller.select_model(ModelId::Base).await.unwrap();
    controller.load().await.unwrap();

    assert_eq!(controller.phase().await, Phase::Ready);
    assert!(controller.is_loaded().await);
    assert_eq!(controller.progress().await, 100);
    assert_eq!(controller.transcript().await, "");

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::LoadProgress(pct) = event {
            seen.push(pct);
        }
    }
    assert_eq!(seen, vec![0, 10, 45, 80, 100]);
}

/// Scenario B: from Ready with S1, selecting and loading M2 destroys S1
/// before S2 becomes live.
#[tokio::test]
async fn scenario_reload_replaces_session() {
    let (controller, log) = controller(ScriptedEngine::new(vec![100], vec![]));

    controller.select_model(ModelId::Tiny).await.unwrap();
    controller.load().await.unwrap();
    controller.select_model(ModelId::Base).await.unwrap();
    controller.load().await.unwrap();

    assert_eq!(controller.phase().await, Phase::Ready);
    let log = log.lock().unwrap();
    let destroy_s1 = log.iter().position(|e| e == "destroy S1").unwrap();
    let load_s2 = log.iter().position(|e| e.starts_with("load S2")).unwrap();
    assert!(destroy_s1 < load_s2, "Log was {:?}", *log);
}

/// Scenario C: transcribing yields monotonically growing decode events whose
/// last payload equals the returned transcript, then returns to Ready.
#[tokio::test]
async fn scenario_transcribe_streams_and_returns_to_ready() {
    let windows = vec![
        "the quick",
        "the quick brown fox",
        "the quick brown fox jumps over the lazy dog",
    ];
    let (controller, _) = controller(ScriptedEngine::new(vec![100], windows));
    let mut events = controller.subscribe();

    controller.select_model(ModelId::Base).await.unwrap();
    controller.load().await.unwrap();
    controller.attach_audio(vec![0u8; 96_000]).await;

    let transcript = controller.transcribe().await.unwrap();
    assert_eq!(
        transcript,
        "the quick brown fox jumps over the lazy dog"
    );
    assert_eq!(controller.phase().await, Phase::Ready);

    let mut texts = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::Transcript(text) = event {
            texts.push(text);
        }
    }
    assert_eq!(texts.len(), 3);
    for pair in texts.windows(2) {
        assert!(pair[1].starts_with(&pair[0]));
    }
    assert_eq!(texts.last().unwrap(), &transcript);
}

/// Scenario D: an identifier outside the catalog fails at the parse boundary
/// with InvalidModel and the controller never observes it.
#[tokio::test]
async fn scenario_unknown_identifier_is_rejected() {
    let (controller, log) = controller(ScriptedEngine::new(vec![100], vec![]));
    let mut events = controller.subscribe();

    let parsed = "large-v9".parse::<ModelId>();
    assert!(matches!(parsed, Err(Error::InvalidModel(_))));

    assert_eq!(controller.phase().await, Phase::Idle);
    assert!(events.try_recv().is_err());
    assert!(log.lock().unwrap().is_empty());
}
