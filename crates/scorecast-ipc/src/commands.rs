//! Commands sent from the host to the controller.

use serde::{Deserialize, Serialize};

use crate::types::{
    BitrateQuality, BroadcastDetails, Destination, DestinationDraft, Side, VideoQuality,
};

/// Commands that the host (and the encoder bridge) can send to the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ControllerCommand {
    /// Turn the camera session on or off.
    SetCameraActive(bool),

    /// Start transmitting to the active destination.
    GoLive,

    /// Stop transmitting.
    StopLive,

    /// Go live when off, stop when live.
    ToggleLive,

    /// Capture locally even without a network destination.
    SetRecordLocally(bool),

    /// Mute or unmute the microphone for the next session.
    SetMuted(bool),

    /// Select the stream resolution preset.
    SetStreamQuality(VideoQuality),

    /// Set target frames per second.
    SetFps(u32),

    /// Select the bitrate multiplier preset.
    SetBitrateQuality(BitrateQuality),

    /// Clear the current error message.
    ClearError,

    /// Store a new destination.
    AddDestination(DestinationDraft),

    /// Replace a stored destination.
    UpdateDestination(Destination),

    /// Delete a stored destination by id.
    DeleteDestination(u32),

    /// Make a destination the active one.
    SelectDestination(u32),

    /// The managed platform account was linked or unlinked.
    SetPlatformLinked(bool),

    /// Re-fetch broadcasts from the managed platform.
    RefreshBroadcasts,

    /// Schedule a new broadcast on the managed platform.
    ScheduleBroadcast(BroadcastDetails),

    /// Make a broadcast the active one.
    SelectBroadcast(String),

    /// Start the game clock.
    StartGameClock,

    /// Stop the game clock.
    StopGameClock,

    /// Start or stop the game clock.
    ToggleGameClock,

    /// Stop the game clock and reload the period length.
    ResetGameClock,

    /// Set the game clock to an explicit number of seconds.
    SetGameClock(u32),

    /// Change the period length (resets the game clock).
    SetPeriodLength(u32),

    /// Change the penalty length used by the next penalty.
    SetPenaltyLength(u32),

    /// Move to the next period.
    AdvancePeriod,

    /// Move back one period.
    PreviousPeriod,

    /// Start a penalty against a side.
    StartPenalty(Side),

    /// Clear the running penalty.
    ClearPenalty,

    /// Add a goal for a side.
    IncrementScore(Side),

    /// Remove a goal from a side.
    DecrementScore(Side),

    /// Rename a team.
    RenameTeam { side: Side, name: String },

    /// Change a team's overlay color.
    SetTeamColor { side: Side, color: String },

    /// Raw status signal from the encoder bridge.
    EncoderStatus { code: String, payload: String },

    /// Request a full snapshot.
    GetSnapshot,

    /// Shutdown the controller completely.
    Shutdown,
}
