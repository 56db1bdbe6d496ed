//! Sotto core: session lifecycle and streaming-transcription orchestration.
//!
//! The controller owns at most one live [`session::InferenceSession`] and
//! drives the select → load → transcribe lifecycle against any backend that
//! implements the [`engine`] traits. Load progress and decoded text are
//! republished to observers as ordered events.

pub mod catalog;
pub mod controller;
pub mod engine;
pub mod error;
pub mod session;

pub use catalog::{ModelEntry, ModelId};
pub use controller::{Controller, ControllerEvent, Phase};
pub use engine::{DecodeHandle, InferenceEngine};
pub use error::{Error, Result};
pub use session::{InferenceSession, LoadEvent, SessionManager};
