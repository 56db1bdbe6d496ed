//! CLI command implementations.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use sotto_core::{Controller, ControllerEvent, ModelId, SessionManager, catalog};
use sotto_engine::{WhisperEngine, fetch};

use crate::config::Config;
use crate::format::human_size;

/// Print the model catalog with sizes and cache status. The configured
/// default model is marked with `*`.
pub async fn models(config: &Config) -> Result<()> {
    let models_dir = config.models_dir()?;

    println!("  {:<16} {:>10}  {}", "MODEL", "SIZE", "STATUS");
    for entry in catalog::entries() {
        let status = match fetch::check_model(&models_dir, entry.id).await {
            fetch::ModelStatus::Ready(_) => "downloaded",
            fetch::ModelStatus::Corrupted { .. } => "corrupted",
            fetch::ModelStatus::Missing => "-",
        };
        let marker = if entry.id == config.model.model { "*" } else { " " };
        println!(
            "{marker} {:<16} {:>10}  {status}",
            entry.id.name(),
            human_size(entry.size_bytes)
        );
    }
    Ok(())
}

/// Load a model and stream a transcription of `file` to stdout.
pub async fn transcribe(
    config: &Config,
    file: &Path,
    model: Option<&str>,
    language: Option<&str>,
) -> Result<()> {
    let id: ModelId = match model {
        Some(name) => name.parse()?,
        None => config.model.model,
    };
    let language = match language {
        Some("auto") => None,
        Some(lang) => Some(lang.to_string()),
        None => config.language(),
    };

    let audio = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    debug!(file = %file.display(), bytes = audio.len(), "Audio file read");

    let engine = WhisperEngine::new(config.models_dir()?, language);
    let controller = Arc::new(Controller::new(SessionManager::new(Arc::new(engine))));

    controller.select_model(id).await?;
    controller.attach_audio(audio).await;

    let bar = ProgressBar::new(100);
    bar.set_style(ProgressStyle::with_template("{msg} [{bar:40}] {pos}%")?.progress_chars("=> "));
    bar.set_message(format!("Loading {id}"));

    // Observer: drive the progress bar while loading, stream transcript
    // increments to stdout while decoding. Ends when the controller drops.
    let mut events = controller.subscribe();
    let observer = {
        let bar = bar.clone();
        tokio::spawn(async move {
            let mut printed = 0usize;
            while let Ok(event) = events.recv().await {
                match event {
                    ControllerEvent::LoadProgress(pct) => bar.set_position(u64::from(pct)),
                    ControllerEvent::ModelLoaded => bar.finish_with_message("Model loaded"),
                    ControllerEvent::Transcript(text) => {
                        if text.len() > printed {
                            print!("{}", &text[printed..]);
                            std::io::stdout().flush().ok();
                            printed = text.len();
                        }
                    }
                    ControllerEvent::Phase(_) => {}
                }
            }
        })
    };

    controller.load().await?;
    let transcript = controller.transcribe().await?;
    controller.teardown().await;

    drop(controller);
    let _ = observer.await;

    println!();
    debug!(chars = transcript.len(), "Transcription finished");
    Ok(())
}
