//! Error types for the encoder contract.

use thiserror::Error;

/// Errors an encoder implementation can report to the controller.
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The encoder could not begin publishing or recording.
    #[error("Encoder start failed: {0}")]
    StartFailed(String),

    /// Start was called while a session was already running.
    #[error("Encoder already started")]
    AlreadyStarted,
}
