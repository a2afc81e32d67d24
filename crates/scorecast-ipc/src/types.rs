//! Common records used across IPC messages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{ConnectionStatus, GameClockState, PenaltyClockState};

/// Destination name that marks the managed video platform.
///
/// A destination with this name takes its stream key from the selected
/// remote broadcast instead of its own key field.
pub const MANAGED_PLATFORM_NAME: &str = "YouTube";

/// A configured outbound streaming target.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Store-assigned identifier.
    pub id: u32,

    /// Display name (e.g., "Twitch").
    pub name: String,

    /// Transport prefix (e.g., "rtmps://ingest.twitch.tv/app/").
    pub url: String,

    /// Stream key. Secret, may be empty.
    pub key: String,
}

impl Destination {
    /// Returns true if this destination is the managed platform.
    pub fn is_managed_platform(&self) -> bool {
        self.name == MANAGED_PLATFORM_NAME
    }
}

/// A destination that has not been stored yet.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationDraft {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub key: String,
}

impl DestinationDraft {
    /// Attach a store id.
    pub fn with_id(self, id: u32) -> Destination {
        Destination {
            id,
            name: self.name,
            url: self.url,
            key: self.key,
        }
    }
}

/// Lifecycle of a broadcast on the managed platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Created,
    Ready,
    Testing,
    Live,
    Complete,
    Revoked,
}

/// A scheduled broadcast on the managed platform.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBroadcast {
    /// Platform broadcast identifier.
    pub id: String,

    /// Broadcast title.
    #[serde(default)]
    pub title: String,

    /// Lifecycle status.
    pub lifecycle_status: LifecycleStatus,

    /// Platform-issued stream key bound to this broadcast.
    pub ingestion_stream_name: Option<String>,
}

/// Details for scheduling a new broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastDetails {
    pub title: String,
    pub description: String,

    /// Scheduled start time as an RFC 3339 string.
    pub scheduled_start: String,
}

/// The URL and key computed just before a transmission attempt.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// Full publish URL (destination prefix followed by the key).
    pub url: String,

    /// Effective stream key.
    pub key: String,
}

/// Debug text shown in place of a stream key.
const SECRET_PLACEHOLDER: &str = "[REDACTED]";

/// Debug formatting for stream keys. Empty keys stay visible as `""`.
struct Secret<'a>(&'a str);

impl fmt::Debug for Secret<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("\"\"")
        } else {
            f.write_str(SECRET_PLACEHOLDER)
        }
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("key", &Secret(&self.key))
            .finish()
    }
}

impl fmt::Debug for DestinationDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationDraft")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("key", &Secret(&self.key))
            .finish()
    }
}

impl fmt::Debug for RemoteBroadcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteBroadcast")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("lifecycle_status", &self.lifecycle_status)
            .field(
                "ingestion_stream_name",
                &self.ingestion_stream_name.as_deref().map(Secret),
            )
            .finish()
    }
}

/// The URL embeds the key, so the key is cut out of it as well.
impl fmt::Debug for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let url = if self.key.is_empty() {
            self.url.clone()
        } else {
            self.url.replace(&self.key, SECRET_PLACEHOLDER)
        };

        f.debug_struct("ResolvedTarget")
            .field("url", &url)
            .field("key", &Secret(&self.key))
            .finish()
    }
}

/// One bitrate observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp_ms: u64,

    /// Outbound bitrate in kbps.
    pub bitrate_kbps: f64,
}

/// Scoreboard side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Team 1.
    Home,

    /// Team 2.
    Away,
}

/// Error returned when a side name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown side: {0}")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "team1" | "home" => Ok(Self::Home),
            "team2" | "away" => Ok(Self::Away),
            other => Err(ParseSideError(other.to_string())),
        }
    }
}

/// A team on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub score: u32,

    /// Overlay color as a CSS hex string.
    pub color: String,
}

impl Team {
    /// Create a team with a zero score and the default color.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            color: "#FFFFFF".to_string(),
        }
    }
}

/// Stream resolution preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoQuality {
    #[serde(rename = "480p")]
    Sd480,
    #[default]
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    FullHd1080,
}

impl VideoQuality {
    /// Frame size in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Sd480 => (854, 480),
            Self::Hd720 => (1280, 720),
            Self::FullHd1080 => (1920, 1080),
        }
    }

    /// Base video bitrate in bits per second.
    pub fn bitrate_bps(self) -> u32 {
        match self {
            Self::Sd480 => 1_000_000,
            Self::Hd720 => 2_500_000,
            Self::FullHd1080 => 4_500_000,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sd480 => "480p (SD)",
            Self::Hd720 => "720p (HD)",
            Self::FullHd1080 => "1080p (Full HD)",
        }
    }
}

/// Bitrate multiplier preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitrateQuality {
    #[default]
    Standard,
    High,
}

impl BitrateQuality {
    /// Multiplier applied to the base bitrate.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Standard => 1.0,
            Self::High => 1.5,
        }
    }
}

/// Initial values for the controller.
///
/// The controller does not persist its own state, so the host rehydrates it
/// from this configuration at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Period length in seconds (default: 20:00).
    pub period_length_secs: u32,

    /// Penalty length in seconds (default: 2:00).
    pub penalty_length_secs: u32,

    /// Stream resolution preset.
    pub stream_quality: VideoQuality,

    /// Target frames per second.
    pub fps: u32,

    /// Bitrate multiplier preset.
    pub bitrate_quality: BitrateQuality,

    /// Capture locally even without a network destination.
    pub record_locally: bool,

    /// Start with the microphone muted.
    pub muted: bool,

    /// Destinations seeded into an empty store.
    pub default_destinations: Vec<DestinationDraft>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            period_length_secs: 20 * 60,
            penalty_length_secs: 2 * 60,
            stream_quality: VideoQuality::default(),
            fps: 30,
            bitrate_quality: BitrateQuality::default(),
            record_locally: false,
            muted: true,
            default_destinations: vec![
                DestinationDraft {
                    name: MANAGED_PLATFORM_NAME.to_string(),
                    url: "rtmp://a.rtmp.youtube.com/live2/".to_string(),
                    key: String::new(),
                },
                DestinationDraft {
                    name: "Twitch".to_string(),
                    url: "rtmps://ingest.twitch.tv/app/".to_string(),
                    key: String::new(),
                },
            ],
        }
    }
}

/// Read-only view of everything the host renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub camera_active: bool,
    pub live: bool,
    pub connection: ConnectionStatus,

    /// Last validation or connection failure, until the host clears it.
    pub error: Option<String>,

    pub destinations: Vec<Destination>,
    pub active_destination_id: Option<u32>,
    pub platform_linked: bool,
    pub broadcasts: Vec<RemoteBroadcast>,
    pub active_broadcast_id: Option<String>,
    pub record_locally: bool,
    pub muted: bool,

    pub game_clock: GameClockState,
    pub penalty_clock: PenaltyClockState,
    pub period: u32,
    pub home: Option<Team>,
    pub away: Option<Team>,

    /// Last rendered fps reported by the encoder.
    pub rendering_fps: u32,

    /// Retained bitrate samples in insertion order.
    pub telemetry: Vec<TelemetrySample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_str() {
        assert_eq!("team1".parse::<Side>(), Ok(Side::Home));
        assert_eq!("Away".parse::<Side>(), Ok(Side::Away));
        assert!("team3".parse::<Side>().is_err());
    }

    #[test]
    fn test_managed_platform_detection() {
        let youtube = DestinationDraft {
            name: "YouTube".to_string(),
            url: "rtmp://a.rtmp.youtube.com/live2/".to_string(),
            key: String::new(),
        }
        .with_id(1);
        assert!(youtube.is_managed_platform());

        let twitch = Destination {
            id: 2,
            name: "Twitch".to_string(),
            url: "rtmps://ingest.twitch.tv/app/".to_string(),
            key: "abc".to_string(),
        };
        assert!(!twitch.is_managed_platform());
    }

    #[test]
    fn test_debug_hides_stream_keys() {
        let draft = DestinationDraft {
            name: "Twitch".to_string(),
            url: "rtmps://ingest.twitch.tv/app/".to_string(),
            key: "live_SUPERSECRET".to_string(),
        };
        let target = ResolvedTarget {
            url: "rtmps://ingest.twitch.tv/app/live_SUPERSECRET".to_string(),
            key: "live_SUPERSECRET".to_string(),
        };
        let broadcast = RemoteBroadcast {
            id: "b1".to_string(),
            title: "Finals".to_string(),
            lifecycle_status: LifecycleStatus::Ready,
            ingestion_stream_name: Some("yt-SUPERSECRET".to_string()),
        };

        let shown = format!(
            "{:?} {:?} {:?} {:?}",
            draft,
            draft.clone().with_id(3),
            target,
            broadcast
        );
        assert!(!shown.contains("SUPERSECRET"), "{shown}");
        assert!(shown.contains("rtmps://ingest.twitch.tv/app/[REDACTED]"));
        assert!(shown.contains("name: \"Twitch\""));
    }

    #[test]
    fn test_debug_shows_empty_key() {
        let draft = DestinationDraft {
            name: "YouTube".to_string(),
            url: "rtmp://a.rtmp.youtube.com/live2/".to_string(),
            key: String::new(),
        };
        assert!(format!("{:?}", draft).contains("key: \"\""));
    }

    #[test]
    fn test_lifecycle_status_serializes_lowercase() {
        let json = serde_json::to_string(&LifecycleStatus::Ready).unwrap();
        assert_eq!(json, "\"ready\"");
    }

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.period_length_secs, 1200);
        assert_eq!(config.penalty_length_secs, 120);
        assert_eq!(config.default_destinations.len(), 2);
        assert!(config.muted);
    }
}
