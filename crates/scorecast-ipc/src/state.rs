//! Session and clock state types.

use serde::{Deserialize, Serialize};

/// Connection status of the outbound stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No transmission attempt has been made.
    #[default]
    Idle,

    /// Encoder started, waiting for the server to accept the publish.
    Connecting,

    /// The server accepted the stream.
    Connected,

    /// The encoder reported a failed or rejected connection.
    Failed,

    /// The stream was stopped or closed by the server.
    Closed,
}

impl ConnectionStatus {
    /// Returns a simple string representation of the status.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Failed => "Failed",
            Self::Closed => "Closed",
        }
    }
}

/// Which side currently holds the numerical advantage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerPlayStatus {
    /// No penalty in effect.
    #[default]
    None,

    /// The home side is on the power play.
    PowerPlay,

    /// The home side is killing a penalty.
    PenaltyKill,
}

impl PowerPlayStatus {
    /// Short overlay label.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::PowerPlay => Some("PP"),
            Self::PenaltyKill => Some("PK"),
        }
    }
}

/// Game clock countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClockState {
    /// Seconds left in the period.
    pub remaining_seconds: u32,

    /// Whether the clock is counting down.
    pub running: bool,
}

/// Penalty clock countdown and the power-play state it drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyClockState {
    /// Seconds left on the penalty.
    pub remaining_seconds: u32,

    /// Whether the penalty is being served.
    pub running: bool,

    /// Advantage status while the penalty runs.
    pub power_play: PowerPlayStatus,
}

impl PenaltyClockState {
    /// Returns true if no penalty is in effect.
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

/// Formats seconds as `M:SS` for overlays and logs.
pub(crate) fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

impl std::fmt::Display for GameClockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_clock(self.remaining_seconds))
    }
}

impl std::fmt::Display for PenaltyClockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.power_play.label() {
            Some(label) => write!(f, "{} {}", label, format_clock(self.remaining_seconds)),
            None => f.write_str(&format_clock(self.remaining_seconds)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_display() {
        let clock = GameClockState {
            remaining_seconds: 1200,
            running: false,
        };
        assert_eq!(clock.to_string(), "20:00");

        let penalty = PenaltyClockState {
            remaining_seconds: 65,
            running: true,
            power_play: PowerPlayStatus::PenaltyKill,
        };
        assert_eq!(penalty.to_string(), "PK 1:05");
    }

    #[test]
    fn test_connection_status_defaults_to_idle() {
        assert_eq!(ConnectionStatus::Idle.name(), "Idle");
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Idle);
    }

    #[test]
    fn test_penalty_default_is_clear() {
        assert!(PenaltyClockState::default().is_clear());
    }
}
