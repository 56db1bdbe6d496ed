//! Error types for the orchestration core.

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the orchestration core.
///
/// Sequencing errors (`NoModelSelected`, `NoModelLoaded`, `NoAudioLoaded`,
/// `Busy`, `InvalidModel`) leave controller state untouched. Engine failures
/// carry the engine's message and the controller recovers locally:
/// `LoadFailed` returns it to the selected-model state, `DecodeFailed` keeps
/// the session alive.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown model identifier: {0}")]
    InvalidModel(String),

    #[error("no model selected")]
    NoModelSelected,

    #[error("no model loaded")]
    NoModelLoaded,

    #[error("no audio loaded")]
    NoAudioLoaded,

    #[error("session has been destroyed")]
    SessionDestroyed,

    #[error("{0} rejected: another operation is in flight")]
    Busy(&'static str),

    #[error("model load failed: {message}")]
    LoadFailed { message: String },

    #[error("decode failed: {message}")]
    DecodeFailed { message: String },
}

impl Error {
    /// Wrap an engine load failure, keeping its message.
    pub fn load_failed(err: impl std::fmt::Display) -> Self {
        Error::LoadFailed {
            message: err.to_string(),
        }
    }

    /// Wrap an engine decode failure, keeping its message.
    pub fn decode_failed(err: impl std::fmt::Display) -> Self {
        Error::DecodeFailed {
            message: err.to_string(),
        }
    }
}
