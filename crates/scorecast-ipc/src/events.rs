//! Events sent from the controller to the host.

use serde::{Deserialize, Serialize};

use crate::state::{ConnectionStatus, GameClockState, PenaltyClockState};
use crate::types::{Destination, RemoteBroadcast, SessionSnapshot, Team, TelemetrySample};

/// Events that the controller can send to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// Connection status has changed.
    StatusChanged {
        /// Previous status.
        previous: ConnectionStatus,

        /// Current status.
        current: ConnectionStatus,
    },

    /// The camera session was turned on or off.
    CameraChanged { active: bool },

    /// The session went live or stopped.
    LiveChanged { live: bool },

    /// A new bitrate sample was retained.
    Telemetry(TelemetrySample),

    /// The encoder reported a new rendering fps.
    RenderingRate(u32),

    /// Game clock changed.
    ClockChanged(GameClockState),

    /// Penalty clock changed.
    PenaltyChanged(PenaltyClockState),

    /// Period number changed.
    PeriodChanged(u32),

    /// Team names, scores or colors changed.
    TeamsChanged { home: Team, away: Team },

    /// Destination list or selection changed.
    DestinationsChanged {
        destinations: Vec<Destination>,
        active_id: Option<u32>,
    },

    /// Broadcast list or selection changed.
    BroadcastsChanged {
        broadcasts: Vec<RemoteBroadcast>,
        active_id: Option<String>,
    },

    /// A user-visible error occurred.
    Error {
        /// Error message.
        message: String,
    },

    /// The host cleared the current error.
    ErrorCleared,

    /// Full state snapshot.
    Snapshot(Box<SessionSnapshot>),

    /// Controller is ready.
    Ready,

    /// Controller has shut down.
    Shutdown,
}
