//! Typed host<->controller messages for the scorecast controller.
//!
//! This crate defines the message types and shared records used for
//! communication between the host (UI shell or console) and the
//! broadcast session controller.

mod commands;
mod events;
mod state;
mod types;

pub use commands::ControllerCommand;
pub use events::ControllerEvent;
pub use state::{ConnectionStatus, GameClockState, PenaltyClockState, PowerPlayStatus};
pub use types::{
    BitrateQuality, BroadcastDetails, ControllerConfig, Destination, DestinationDraft,
    LifecycleStatus, ParseSideError, RemoteBroadcast, ResolvedTarget, SessionSnapshot, Side,
    Team, TelemetrySample, VideoQuality, MANAGED_PLATFORM_NAME,
};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (host → controller).
///
/// Encoder status signals share this channel, so it is sized for bursts of
/// telemetry on top of operator input.
pub const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Channel capacity for events (controller → host).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<ControllerCommand>, Receiver<ControllerCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<ControllerEvent>, Receiver<ControllerEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
