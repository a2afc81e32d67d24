//! Controller-owned session state.

use scorecast_encoder::{AudioParams, VideoParams};
use scorecast_ipc::{
    BitrateQuality, ConnectionStatus, ControllerConfig, Destination, RemoteBroadcast,
    SessionSnapshot, VideoQuality,
};

use crate::clock::ClockCoordinator;
use crate::metrics::TelemetryWindow;
use crate::scoreboard::Scoreboard;

/// Everything the controller mutates.
///
/// Only the controller holds this, and only its named operations change it.
/// Hosts read copies through [`SessionState::snapshot`].
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Camera session running.
    pub camera_active: bool,

    /// A transmission (or local capture) is in progress.
    pub live: bool,

    pub connection: ConnectionStatus,

    /// Last user-visible failure, until cleared by the host.
    pub error: Option<String>,

    pub destinations: Vec<Destination>,
    pub active_destination_id: Option<u32>,

    pub platform_linked: bool,
    pub broadcasts: Vec<RemoteBroadcast>,
    pub active_broadcast_id: Option<String>,

    pub record_locally: bool,
    pub muted: bool,
    pub stream_quality: VideoQuality,
    pub fps: u32,
    pub bitrate_quality: BitrateQuality,

    pub clock: ClockCoordinator,
    pub scoreboard: Scoreboard,
    pub telemetry: TelemetryWindow,
    pub rendering_fps: u32,
}

impl SessionState {
    /// Initial state rehydrated from configuration.
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            camera_active: false,
            live: false,
            connection: ConnectionStatus::Idle,
            error: None,
            destinations: Vec::new(),
            active_destination_id: None,
            platform_linked: false,
            broadcasts: Vec::new(),
            active_broadcast_id: None,
            record_locally: config.record_locally,
            muted: config.muted,
            stream_quality: config.stream_quality,
            fps: config.fps,
            bitrate_quality: config.bitrate_quality,
            clock: ClockCoordinator::new(config.period_length_secs, config.penalty_length_secs),
            scoreboard: Scoreboard::new(),
            telemetry: TelemetryWindow::new(),
            rendering_fps: 0,
        }
    }

    /// The selected destination, if it still exists.
    pub fn active_destination(&self) -> Option<&Destination> {
        let id = self.active_destination_id?;
        self.destinations.iter().find(|d| d.id == id)
    }

    /// The selected broadcast, if it still exists.
    pub fn active_broadcast(&self) -> Option<&RemoteBroadcast> {
        let id = self.active_broadcast_id.as_deref()?;
        self.broadcasts.iter().find(|b| b.id == id)
    }

    /// Encoder video parameters for the current settings.
    pub fn video_params(&self) -> VideoParams {
        VideoParams::from_settings(self.stream_quality, self.fps, self.bitrate_quality)
    }

    /// Encoder audio parameters for the current settings.
    pub fn audio_params(&self) -> AudioParams {
        AudioParams::with_muted(self.muted)
    }

    /// Read-only copy for the host.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            camera_active: self.camera_active,
            live: self.live,
            connection: self.connection,
            error: self.error.clone(),
            destinations: self.destinations.clone(),
            active_destination_id: self.active_destination_id,
            platform_linked: self.platform_linked,
            broadcasts: self.broadcasts.clone(),
            active_broadcast_id: self.active_broadcast_id.clone(),
            record_locally: self.record_locally,
            muted: self.muted,
            game_clock: self.clock.game(),
            penalty_clock: self.clock.penalty(),
            period: self.clock.period(),
            home: Some(self.scoreboard.home().clone()),
            away: Some(self.scoreboard.away().clone()),
            rendering_fps: self.rendering_fps,
            telemetry: self.telemetry.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorecast_ipc::LifecycleStatus;

    #[test]
    fn test_initial_state_from_config() {
        let config = ControllerConfig {
            period_length_secs: 900,
            record_locally: true,
            ..ControllerConfig::default()
        };
        let state = SessionState::new(&config);

        assert_eq!(state.connection, ConnectionStatus::Idle);
        assert_eq!(state.clock.game().remaining_seconds, 900);
        assert!(state.record_locally);
        assert!(state.audio_params().muted);
    }

    #[test]
    fn test_dangling_selection_resolves_to_none() {
        let mut state = SessionState::new(&ControllerConfig::default());
        state.active_destination_id = Some(3);
        state.active_broadcast_id = Some("gone".to_string());
        assert!(state.active_destination().is_none());
        assert!(state.active_broadcast().is_none());

        state.broadcasts.push(RemoteBroadcast {
            id: "gone".to_string(),
            title: String::new(),
            lifecycle_status: LifecycleStatus::Created,
            ingestion_stream_name: None,
        });
        assert!(state.active_broadcast().is_some());
    }

    #[test]
    fn test_snapshot_copies_clock_and_teams() {
        let state = SessionState::new(&ControllerConfig::default());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.game_clock.remaining_seconds, 1200);
        assert_eq!(snapshot.period, 1);
        assert_eq!(snapshot.home.map(|t| t.name), Some("HOME".to_string()));
    }
}
