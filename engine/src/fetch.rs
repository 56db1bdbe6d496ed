//! Model weight fetch and cache.
//!
//! ggml weights are downloaded from Hugging Face on first use, streamed to a
//! temporary file with byte-accurate progress, size-validated, and renamed
//! into place atomically.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sotto_core::ModelId;

const WHISPER_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Remote location and expected size of a model's weights.
pub struct RemoteModel {
    pub filename: &'static str,
    pub url: String,
    pub size_bytes: u64,
}

/// Get the remote metadata for a model.
pub fn remote(id: ModelId) -> RemoteModel {
    let filename = match id {
        ModelId::Tiny => "ggml-tiny.bin",
        ModelId::TinyEn => "ggml-tiny.en.bin",
        ModelId::Base => "ggml-base.bin",
        ModelId::BaseEn => "ggml-base.en.bin",
        ModelId::Small => "ggml-small.bin",
        ModelId::SmallEn => "ggml-small.en.bin",
        ModelId::Medium => "ggml-medium.bin",
        ModelId::MediumEn => "ggml-medium.en.bin",
        ModelId::LargeV3 => "ggml-large-v3.bin",
        ModelId::LargeV3Turbo => "ggml-large-v3-turbo.bin",
    };
    RemoteModel {
        filename,
        url: format!("{WHISPER_BASE_URL}/{filename}"),
        size_bytes: id.size_bytes(),
    }
}

/// Cache state of a model's weights on disk.
#[derive(Debug)]
pub enum ModelStatus {
    Missing,
    Ready(PathBuf),
    Corrupted {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

/// Check whether a model's weights are cached and intact.
pub async fn check_model(models_dir: &Path, id: ModelId) -> ModelStatus {
    let info = remote(id);
    let path = models_dir.join(info.filename);
    match fs::metadata(&path).await {
        Err(_) => ModelStatus::Missing,
        Ok(metadata) if metadata.len() == info.size_bytes => ModelStatus::Ready(path),
        Ok(metadata) => ModelStatus::Corrupted {
            path,
            expected: info.size_bytes,
            actual: metadata.len(),
        },
    }
}

/// Ensure a model is available, downloading if necessary.
///
/// Emits download progress as percentages on `progress`; a cache hit reports
/// 100 immediately. Returns the path to the weights file.
pub async fn ensure_model(
    models_dir: &Path,
    id: ModelId,
    progress: &mpsc::Sender<u8>,
) -> Result<PathBuf> {
    match check_model(models_dir, id).await {
        ModelStatus::Ready(path) => {
            debug!(path = %path.display(), "Model already cached");
            let _ = progress.send(100).await;
            Ok(path)
        }
        ModelStatus::Corrupted {
            path,
            expected,
            actual,
        } => {
            warn!(
                path = %path.display(),
                expected,
                actual,
                "Cached model size mismatch, re-downloading"
            );
            fs::remove_file(&path)
                .await
                .context("Failed to remove corrupted model")?;
            download(models_dir, id, progress).await
        }
        ModelStatus::Missing => download(models_dir, id, progress).await,
    }
}

/// Stream a model's weights to disk, reporting progress.
async fn download(models_dir: &Path, id: ModelId, progress: &mpsc::Sender<u8>) -> Result<PathBuf> {
    let info = remote(id);
    let dest = models_dir.join(info.filename);

    fs::create_dir_all(models_dir)
        .await
        .context("Failed to create models directory")?;

    info!(url = %info.url, dest = %dest.display(), "Downloading model");

    let response = reqwest::get(&info.url)
        .await
        .with_context(|| format!("Failed to download model from {}", info.url))?;
    if !response.status().is_success() {
        anyhow::bail!("Failed to download model: HTTP {}", response.status());
    }
    let total = response.content_length().unwrap_or(info.size_bytes);

    // Write to a temporary file first, then rename (atomic)
    let temp_path = dest.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)
        .await
        .context("Failed to create temporary model file")?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let mut last_pct = 0u8;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("Failed to read download chunk")?;
        file.write_all(&chunk)
            .await
            .context("Failed to write model file")?;
        downloaded += chunk.len() as u64;
        if total > 0 {
            let pct = ((downloaded.min(total) * 100) / total) as u8;
            if pct > last_pct {
                last_pct = pct;
                let _ = progress.send(pct).await;
            }
        }
    }
    file.sync_all().await.context("Failed to sync model file")?;
    drop(file);

    if downloaded != info.size_bytes {
        let _ = fs::remove_file(&temp_path).await;
        anyhow::bail!(
            "Downloaded model size mismatch: expected {}, got {}",
            info.size_bytes,
            downloaded
        );
    }

    fs::rename(&temp_path, &dest)
        .await
        .context("Failed to finalize model file")?;

    info!(path = %dest.display(), size = downloaded, "Model downloaded");

    Ok(dest)
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
