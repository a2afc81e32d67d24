//! Error types for controller operations.

use thiserror::Error;

use scorecast_encoder::EncoderError;

use crate::resolver::ResolutionError;
use crate::store::{PlatformError, StoreError};

/// Errors surfaced to the operator by controller operations.
///
/// The `Display` text is what the host shows as the current error.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Go-live requested without a camera session.
    #[error("Camera is not on.")]
    CameraNotActive,

    /// The destination could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The encoder refused to start.
    #[error("Could not start the encoder: {0}")]
    Encoder(#[from] EncoderError),

    /// The encoder reported a failed or rejected connection.
    #[error("{0}")]
    Connection(String),

    /// A destination store operation failed.
    #[error("Could not save stream destinations: {0}")]
    Store(#[from] StoreError),

    /// Fetching broadcasts from the managed platform failed.
    #[error("Failed to fetch YouTube streams.")]
    BroadcastFetch(#[source] PlatformError),

    /// Scheduling a broadcast on the managed platform failed.
    #[error("Could not schedule stream.")]
    BroadcastSchedule(#[source] PlatformError),

    /// No destination with the given id.
    #[error("Unknown stream destination {0}.")]
    UnknownDestination(u32),

    /// No broadcast with the given id.
    #[error("Unknown broadcast {0}.")]
    UnknownBroadcast(String),

    /// A setting was given an unusable value.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl SessionError {
    /// Validation failures block an operation before anything changes.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::CameraNotActive
                | Self::Resolution(_)
                | Self::UnknownDestination(_)
                | Self::UnknownBroadcast(_)
                | Self::InvalidSetting(_)
        )
    }
}

/// Result type for controller operations.
pub type SessionResult<T> = Result<T, SessionError>;
