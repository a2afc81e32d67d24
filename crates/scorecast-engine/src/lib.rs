//! Broadcast session controller.
//!
//! This crate owns the live session: it resolves where to transmit, drives
//! the encoder, classifies the encoder's status signals, keeps the bitrate
//! telemetry window and runs the game and penalty clocks.

mod clock;
mod error;
mod metrics;
mod orchestrator;
mod redact;
mod resolver;
mod scoreboard;
mod state;
mod status;
mod store;

pub use clock::{ClockCoordinator, ClockTick};
pub use error::{SessionError, SessionResult};
pub use metrics::{TelemetryWindow, TELEMETRY_WINDOW};
pub use orchestrator::{Collaborators, Controller, CLOCK_TICK};
pub use redact::{redact_context, redact_stream_url, RedactedUrl, REDACTED};
pub use resolver::{resolve, ResolutionError};
pub use scoreboard::Scoreboard;
pub use state::SessionState;
pub use status::{
    parse as parse_status, parse_at as parse_status_at, ConnectionTransition, StatusEvent,
};
pub use store::{
    BroadcastPlatform, DestinationStore, MemoryDestinationStore, PlatformError, StoreError,
    UnlinkedPlatform,
};

use crossbeam_channel::{Receiver, Sender};
use scorecast_ipc::{ControllerCommand, ControllerConfig, ControllerEvent};

/// Create a controller instance with IPC channels.
pub fn create_controller(
    config: ControllerConfig,
    collaborators: Collaborators,
    command_rx: Receiver<ControllerCommand>,
    event_tx: Sender<ControllerEvent>,
) -> Controller {
    Controller::new(config, collaborators, command_rx, event_tx)
}
