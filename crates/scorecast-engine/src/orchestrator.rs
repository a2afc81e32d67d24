//! Broadcast session controller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{never, select, tick, Receiver, Sender};
use parking_lot::RwLock;
use serde_json::json;
use tracing::{debug, error, info, instrument, trace, warn};

use scorecast_encoder::Encoder;
use scorecast_ipc::{
    BitrateQuality, BroadcastDetails, ConnectionStatus, ControllerCommand, ControllerConfig,
    ControllerEvent, Destination, DestinationDraft, LifecycleStatus, SessionSnapshot, Side,
    VideoQuality,
};

use crate::error::{SessionError, SessionResult};
use crate::redact::{redact_context, RedactedUrl};
use crate::resolver;
use crate::state::SessionState;
use crate::status::{self, ConnectionTransition, StatusEvent};
use crate::store::{BroadcastPlatform, DestinationStore, PlatformError};

/// Interval of the shared game/penalty clock tick.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Message shown when the encoder reports a failed connection.
const CONNECTION_FAILED: &str = "Connection failed. Check stream key and URL.";

/// External collaborators the controller drives.
pub struct Collaborators {
    pub encoder: Box<dyn Encoder>,
    pub store: Box<dyn DestinationStore>,
    pub platform: Box<dyn BroadcastPlatform>,
}

/// The broadcast session controller.
///
/// Owns all session state. Operator commands, encoder status signals and
/// clock ticks are all applied on the thread that calls [`Controller::run`];
/// nothing else mutates the state.
pub struct Controller {
    command_rx: Receiver<ControllerCommand>,
    event_tx: Sender<ControllerEvent>,
    config: ControllerConfig,
    state: SessionState,
    shared: Arc<RwLock<SessionSnapshot>>,
    encoder: Box<dyn Encoder>,
    store: Box<dyn DestinationStore>,
    platform: Box<dyn BroadcastPlatform>,
    ticker: Option<Receiver<Instant>>,
}

impl Controller {
    /// Create a new controller.
    pub fn new(
        config: ControllerConfig,
        collaborators: Collaborators,
        command_rx: Receiver<ControllerCommand>,
        event_tx: Sender<ControllerEvent>,
    ) -> Self {
        let state = SessionState::new(&config);
        let shared = Arc::new(RwLock::new(state.snapshot()));

        Self {
            command_rx,
            event_tx,
            config,
            state,
            shared,
            encoder: collaborators.encoder,
            store: collaborators.store,
            platform: collaborators.platform,
            ticker: None,
        }
    }

    /// Handle to the snapshot republished after every handled message.
    pub fn snapshot_handle(&self) -> Arc<RwLock<SessionSnapshot>> {
        Arc::clone(&self.shared)
    }

    /// Current state, read directly.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// Current connection status.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.state.connection
    }

    /// Run the controller (blocking).
    #[instrument(name = "controller_run", skip(self))]
    pub fn run(&mut self) {
        info!("Controller starting");

        let _ = self.initialize();
        self.send_event(ControllerEvent::Ready);
        self.publish();

        let command_rx = self.command_rx.clone();

        loop {
            let ticker = self.ticker.clone().unwrap_or_else(never);

            let keep_running = select! {
                recv(command_rx) -> command => match command {
                    Ok(command) => self.handle_command(command),
                    Err(_) => {
                        info!("Command channel disconnected, shutting down");
                        self.shutdown();
                        false
                    }
                },
                recv(ticker) -> _ => {
                    self.on_tick();
                    true
                }
            };

            self.sync_ticker();
            self.publish();

            if !keep_running {
                break;
            }
        }

        info!("Controller stopped");
    }

    /// Handle a command. Returns false if the controller should stop.
    ///
    /// Failures are already reported through the error event.
    pub fn handle_command(&mut self, command: ControllerCommand) -> bool {
        match command {
            ControllerCommand::EncoderStatus { .. } => trace!("Handling encoder status"),
            ref other => debug!(command = ?other, "Handling command"),
        }

        let _ = match command {
            ControllerCommand::SetCameraActive(active) => self.set_camera_active(active),
            ControllerCommand::GoLive => self.request_go_live(),
            ControllerCommand::StopLive => {
                self.request_stop_live();
                Ok(())
            }
            ControllerCommand::ToggleLive => self.toggle_live(),
            ControllerCommand::SetRecordLocally(enabled) => {
                self.set_record_locally(enabled);
                Ok(())
            }
            ControllerCommand::SetMuted(muted) => {
                self.set_muted(muted);
                Ok(())
            }
            ControllerCommand::SetStreamQuality(quality) => {
                self.set_stream_quality(quality);
                Ok(())
            }
            ControllerCommand::SetFps(fps) => self.set_fps(fps),
            ControllerCommand::SetBitrateQuality(quality) => {
                self.set_bitrate_quality(quality);
                Ok(())
            }
            ControllerCommand::ClearError => {
                self.clear_error();
                Ok(())
            }
            ControllerCommand::AddDestination(draft) => self.add_destination(draft),
            ControllerCommand::UpdateDestination(destination) => {
                self.update_destination(destination)
            }
            ControllerCommand::DeleteDestination(id) => self.delete_destination(id),
            ControllerCommand::SelectDestination(id) => self.select_destination(id),
            ControllerCommand::SetPlatformLinked(linked) => self.set_platform_linked(linked),
            ControllerCommand::RefreshBroadcasts => self.refresh_broadcasts(),
            ControllerCommand::ScheduleBroadcast(details) => self.schedule_broadcast(details),
            ControllerCommand::SelectBroadcast(id) => self.select_broadcast(&id),
            ControllerCommand::StartGameClock => {
                self.start_game_clock();
                Ok(())
            }
            ControllerCommand::StopGameClock => {
                self.stop_game_clock();
                Ok(())
            }
            ControllerCommand::ToggleGameClock => {
                self.toggle_game_clock();
                Ok(())
            }
            ControllerCommand::ResetGameClock => {
                self.reset_game_clock();
                Ok(())
            }
            ControllerCommand::SetGameClock(seconds) => {
                self.set_game_clock(seconds);
                Ok(())
            }
            ControllerCommand::SetPeriodLength(seconds) => self.set_period_length(seconds),
            ControllerCommand::SetPenaltyLength(seconds) => self.set_penalty_length(seconds),
            ControllerCommand::AdvancePeriod => {
                self.advance_period();
                Ok(())
            }
            ControllerCommand::PreviousPeriod => {
                self.previous_period();
                Ok(())
            }
            ControllerCommand::StartPenalty(side) => {
                self.start_penalty(side);
                Ok(())
            }
            ControllerCommand::ClearPenalty => {
                self.clear_penalty();
                Ok(())
            }
            ControllerCommand::IncrementScore(side) => {
                self.state.scoreboard.increment_score(side);
                self.emit_teams();
                Ok(())
            }
            ControllerCommand::DecrementScore(side) => {
                self.state.scoreboard.decrement_score(side);
                self.emit_teams();
                Ok(())
            }
            ControllerCommand::RenameTeam { side, name } => {
                self.state.scoreboard.rename_team(side, name);
                self.emit_teams();
                Ok(())
            }
            ControllerCommand::SetTeamColor { side, color } => {
                self.state.scoreboard.set_team_color(side, color);
                self.emit_teams();
                Ok(())
            }
            ControllerCommand::EncoderStatus { code, payload } => {
                self.on_encoder_signal(&code, &payload);
                Ok(())
            }
            ControllerCommand::GetSnapshot => {
                self.send_event(ControllerEvent::Snapshot(Box::new(self.state.snapshot())));
                Ok(())
            }
            ControllerCommand::Shutdown => {
                self.shutdown();
                return false;
            }
        };

        true
    }

    // --- startup / shutdown ---

    /// Load destinations, seeding the store with defaults when it is empty.
    #[instrument(name = "controller_initialize", skip(self))]
    pub fn initialize(&mut self) -> SessionResult<()> {
        let result = self.load_destinations();
        self.report_if_err(result)
    }

    fn load_destinations(&mut self) -> SessionResult<()> {
        let mut destinations = self.store.list()?;

        if destinations.is_empty() && !self.config.default_destinations.is_empty() {
            info!("No stream destinations found, populating with defaults");
            for draft in self.config.default_destinations.clone() {
                self.store.add(draft)?;
            }
            destinations = self.store.list()?;
        }

        self.state.active_destination_id = destinations.first().map(|d| d.id);
        self.state.destinations = destinations;
        self.emit_destinations();
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.state.live {
            self.request_stop_live();
        }
        self.state.clock.stop_game_clock();
        self.ticker = None;
        self.send_event(ControllerEvent::Shutdown);
    }

    // --- session state machine ---

    /// Turn the camera session on or off. Turning it off ends any live session.
    pub fn set_camera_active(&mut self, active: bool) -> SessionResult<()> {
        if !active && self.state.live {
            self.request_stop_live();
        }

        if self.state.camera_active != active {
            info!(active, "Camera session changed");
            self.state.camera_active = active;
            self.send_event(ControllerEvent::CameraChanged { active });
        }
        Ok(())
    }

    /// Start transmitting to the resolved destination.
    ///
    /// On any error nothing changes except the current error message. A call
    /// while already live or connecting is ignored.
    #[instrument(name = "request_go_live", skip(self))]
    pub fn request_go_live(&mut self) -> SessionResult<()> {
        let result = self.go_live();
        self.report_if_err(result)
    }

    fn go_live(&mut self) -> SessionResult<()> {
        if !self.state.camera_active {
            return Err(SessionError::CameraNotActive);
        }

        if self.state.live {
            debug!(status = self.state.connection.name(), "Already live, ignoring go-live");
            return Ok(());
        }

        let target = resolver::resolve(
            &self.state.destinations,
            self.state.active_destination_id,
            self.state.active_broadcast(),
            self.state.record_locally,
        )?;

        let video = self.state.video_params();
        let audio = self.state.audio_params();
        self.encoder.start(target.as_ref(), &video, &audio)?;

        self.state.telemetry.clear();
        self.state.rendering_fps = 0;
        self.set_live(true);

        match target {
            Some(ref target) => {
                info!(
                    destination = self
                        .state
                        .active_destination()
                        .map(|d| d.name.as_str())
                        .unwrap_or_default(),
                    url = %RedactedUrl(&target.url),
                    quality = self.state.stream_quality.label(),
                    encoder = self.encoder.name(),
                    "Starting transmission"
                );
                self.transition_to(ConnectionStatus::Connecting);
            }
            None => info!(encoder = self.encoder.name(), "Recording locally without a destination"),
        }

        Ok(())
    }

    /// Stop transmitting. Always succeeds.
    #[instrument(name = "request_stop_live", skip(self))]
    pub fn request_stop_live(&mut self) {
        info!("Stopping transmission");
        self.release_encoder();
        self.set_live(false);
        self.transition_to(ConnectionStatus::Closed);
    }

    /// Go live when off, stop when live.
    pub fn toggle_live(&mut self) -> SessionResult<()> {
        if self.state.live {
            self.request_stop_live();
            Ok(())
        } else {
            self.request_go_live()
        }
    }

    /// Apply a raw encoder status signal.
    ///
    /// Signals that arrive while no session is live (including late signals
    /// after a stop) are dropped.
    pub fn on_encoder_signal(&mut self, code: &str, payload: &str) {
        let event = status::parse(code, payload);

        if event == StatusEvent::Ignored {
            trace!(code, "Ignoring encoder status");
            return;
        }

        if !self.state.live {
            debug!(code, "Session not live, dropping encoder status");
            return;
        }

        match event {
            StatusEvent::Connection(ConnectionTransition::Connected) => {
                info!(code, "Encoder connected");
                self.transition_to(ConnectionStatus::Connected);
            }
            StatusEvent::Connection(ConnectionTransition::Failed) => {
                error!(code, "Encoder connection failed");
                self.transition_to(ConnectionStatus::Failed);
                self.force_off();
                self.report(SessionError::Connection(CONNECTION_FAILED.to_string()));
            }
            StatusEvent::Connection(ConnectionTransition::Closed) => {
                info!(code, "Encoder connection closed");
                self.transition_to(ConnectionStatus::Closed);
                self.force_off();
            }
            StatusEvent::Telemetry { sample, fps } => {
                if let Some(sample) = sample {
                    self.state.telemetry.insert(sample);
                    self.send_event(ControllerEvent::Telemetry(sample));
                }
                if let Some(fps) = fps {
                    self.state.rendering_fps = fps;
                    self.send_event(ControllerEvent::RenderingRate(fps));
                }
            }
            StatusEvent::Ignored => {}
        }
    }

    /// End the session after the encoder dropped the connection.
    fn force_off(&mut self) {
        self.release_encoder();
        self.set_live(false);
    }

    fn release_encoder(&mut self) {
        if let Err(e) = self.encoder.stop() {
            warn!(error = %e, "Encoder stop failed");
        }
    }

    fn set_live(&mut self, live: bool) {
        if self.state.live != live {
            self.state.live = live;
            self.send_event(ControllerEvent::LiveChanged { live });
        }
    }

    fn transition_to(&mut self, next: ConnectionStatus) {
        let previous = self.state.connection;
        if previous == next {
            return;
        }
        self.state.connection = next;

        info!(
            previous = previous.name(),
            current = next.name(),
            "Connection transition"
        );

        self.send_event(ControllerEvent::StatusChanged {
            previous,
            current: next,
        });
    }

    // --- settings ---

    pub fn set_record_locally(&mut self, enabled: bool) {
        self.state.record_locally = enabled;
    }

    /// Applies to the next session; the running encoder is not touched.
    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
    }

    pub fn set_stream_quality(&mut self, quality: VideoQuality) {
        self.state.stream_quality = quality;
    }

    pub fn set_fps(&mut self, fps: u32) -> SessionResult<()> {
        if fps == 0 {
            return self.report_if_err(Err(SessionError::InvalidSetting(
                "fps must be positive".to_string(),
            )));
        }
        self.state.fps = fps;
        Ok(())
    }

    pub fn set_bitrate_quality(&mut self, quality: BitrateQuality) {
        self.state.bitrate_quality = quality;
    }

    /// Clear the current error message.
    pub fn clear_error(&mut self) {
        if self.state.error.take().is_some() {
            self.send_event(ControllerEvent::ErrorCleared);
        }
    }

    // --- destinations ---

    pub fn add_destination(&mut self, draft: DestinationDraft) -> SessionResult<()> {
        let result = self
            .store
            .add(draft)
            .map_err(SessionError::from)
            .and_then(|_| self.reload_destinations());
        self.report_if_err(result)
    }

    pub fn update_destination(&mut self, destination: Destination) -> SessionResult<()> {
        let result = self
            .store
            .update(destination)
            .map_err(SessionError::from)
            .and_then(|_| self.reload_destinations());
        self.report_if_err(result)
    }

    pub fn delete_destination(&mut self, id: u32) -> SessionResult<()> {
        let result = self
            .store
            .delete(id)
            .map_err(SessionError::from)
            .and_then(|_| self.reload_destinations());
        self.report_if_err(result)
    }

    pub fn select_destination(&mut self, id: u32) -> SessionResult<()> {
        if !self.state.destinations.iter().any(|d| d.id == id) {
            return self.report_if_err(Err(SessionError::UnknownDestination(id)));
        }
        self.state.active_destination_id = Some(id);
        self.emit_destinations();
        Ok(())
    }

    /// Re-list after a write. On failure the previous list stays in place.
    fn reload_destinations(&mut self) -> SessionResult<()> {
        let destinations = self.store.list()?;

        let active_exists = self
            .state
            .active_destination_id
            .is_some_and(|id| destinations.iter().any(|d| d.id == id));
        if !active_exists {
            self.state.active_destination_id = destinations.first().map(|d| d.id);
        }

        self.state.destinations = destinations;
        self.emit_destinations();
        Ok(())
    }

    // --- managed platform ---

    /// Record whether the platform account is linked. Linking fetches
    /// broadcasts; unlinking forgets them.
    pub fn set_platform_linked(&mut self, linked: bool) -> SessionResult<()> {
        self.state.platform_linked = linked;

        if linked {
            info!("Platform account linked");
            self.refresh_broadcasts()
        } else {
            info!("Platform account unlinked");
            self.state.broadcasts.clear();
            self.state.active_broadcast_id = None;
            self.emit_broadcasts();
            Ok(())
        }
    }

    /// Re-fetch broadcasts, preferring a `Ready` one as the selection.
    #[instrument(name = "refresh_broadcasts", skip(self))]
    pub fn refresh_broadcasts(&mut self) -> SessionResult<()> {
        if !self.state.platform_linked {
            debug!("Platform not linked, skipping broadcast refresh");
            return Ok(());
        }

        let broadcasts = match self.platform.list_broadcasts() {
            Ok(broadcasts) => broadcasts,
            Err(e) => {
                log_platform_error("list_broadcasts", &e);
                return self.report_if_err(Err(SessionError::BroadcastFetch(e)));
            }
        };

        info!(count = broadcasts.len(), "Fetched broadcasts");

        self.state.active_broadcast_id = broadcasts
            .iter()
            .find(|b| b.lifecycle_status == LifecycleStatus::Ready)
            .or_else(|| broadcasts.first())
            .map(|b| b.id.clone());
        self.state.broadcasts = broadcasts;
        self.emit_broadcasts();
        Ok(())
    }

    /// Schedule a broadcast, then re-fetch the list.
    #[instrument(name = "schedule_broadcast", skip(self, details))]
    pub fn schedule_broadcast(&mut self, details: BroadcastDetails) -> SessionResult<()> {
        if !self.state.platform_linked {
            return self.report_if_err(Err(SessionError::BroadcastSchedule(
                PlatformError::Unauthorized,
            )));
        }

        if let Err(e) = self.platform.schedule(&details) {
            log_platform_error("schedule", &e);
            return self.report_if_err(Err(SessionError::BroadcastSchedule(e)));
        }

        info!(title = %details.title, "Scheduled broadcast, re-fetching");
        self.refresh_broadcasts()
    }

    pub fn select_broadcast(&mut self, id: &str) -> SessionResult<()> {
        if !self.state.broadcasts.iter().any(|b| b.id == id) {
            return self.report_if_err(Err(SessionError::UnknownBroadcast(id.to_string())));
        }
        self.state.active_broadcast_id = Some(id.to_string());
        self.emit_broadcasts();
        Ok(())
    }

    // --- clock ---

    /// Apply one second of game time.
    pub fn on_tick(&mut self) {
        let outcome = self.state.clock.tick();
        if outcome.is_idle() {
            return;
        }

        if outcome.game_changed || outcome.period_ended {
            self.emit_clock();
        }
        if outcome.penalty_changed {
            self.emit_penalty();
        }
    }

    pub fn start_game_clock(&mut self) {
        if self.state.clock.start_game_clock() {
            self.emit_clock();
        }
    }

    pub fn stop_game_clock(&mut self) {
        self.state.clock.stop_game_clock();
        self.emit_clock();
    }

    pub fn toggle_game_clock(&mut self) {
        self.state.clock.toggle_game_clock();
        self.emit_clock();
    }

    pub fn reset_game_clock(&mut self) {
        self.state.clock.reset_game_clock();
        self.emit_clock();
    }

    pub fn set_game_clock(&mut self, seconds: u32) {
        self.state.clock.set_game_clock(seconds);
        self.emit_clock();
    }

    pub fn set_period_length(&mut self, seconds: u32) -> SessionResult<()> {
        if seconds == 0 {
            return self.report_if_err(Err(SessionError::InvalidSetting(
                "period length must be positive".to_string(),
            )));
        }
        self.state.clock.set_period_length(seconds);
        self.emit_clock();
        Ok(())
    }

    pub fn set_penalty_length(&mut self, seconds: u32) -> SessionResult<()> {
        if seconds == 0 {
            return self.report_if_err(Err(SessionError::InvalidSetting(
                "penalty length must be positive".to_string(),
            )));
        }
        self.state.clock.set_penalty_length(seconds);
        Ok(())
    }

    pub fn advance_period(&mut self) {
        self.state.clock.advance_period();
        self.send_event(ControllerEvent::PeriodChanged(self.state.clock.period()));
    }

    pub fn previous_period(&mut self) {
        self.state.clock.previous_period();
        self.send_event(ControllerEvent::PeriodChanged(self.state.clock.period()));
    }

    pub fn start_penalty(&mut self, side: Side) {
        self.state.clock.start_penalty(side);
        info!(?side, penalty = %self.state.clock.penalty(), "Penalty started");
        self.emit_penalty();
    }

    pub fn clear_penalty(&mut self) {
        self.state.clock.clear_penalty();
        self.emit_penalty();
    }

    /// Create or drop the one-second ticker to match the game clock.
    fn sync_ticker(&mut self) {
        match (self.state.clock.is_ticking(), self.ticker.is_some()) {
            (true, false) => {
                debug!("Starting clock ticker");
                self.ticker = Some(tick(CLOCK_TICK));
            }
            (false, true) => {
                debug!("Stopping clock ticker");
                self.ticker = None;
            }
            _ => {}
        }
    }

    // --- reporting ---

    fn report_if_err(&mut self, result: SessionResult<()>) -> SessionResult<()> {
        result.map_err(|e| self.report(e))
    }

    /// Make an error the current user-visible error.
    fn report(&mut self, err: SessionError) -> SessionError {
        if err.is_validation() {
            warn!(error = %err, "Operation rejected");
        } else {
            error!(error = %err, "Operation failed");
        }

        let message = err.to_string();
        self.state.error = Some(message.clone());
        self.send_event(ControllerEvent::Error { message });
        err
    }

    fn emit_clock(&self) {
        self.send_event(ControllerEvent::ClockChanged(self.state.clock.game()));
    }

    fn emit_penalty(&self) {
        self.send_event(ControllerEvent::PenaltyChanged(self.state.clock.penalty()));
    }

    fn emit_teams(&self) {
        self.send_event(ControllerEvent::TeamsChanged {
            home: self.state.scoreboard.home().clone(),
            away: self.state.scoreboard.away().clone(),
        });
    }

    fn emit_destinations(&self) {
        self.send_event(ControllerEvent::DestinationsChanged {
            destinations: self.state.destinations.clone(),
            active_id: self.state.active_destination_id,
        });
    }

    fn emit_broadcasts(&self) {
        self.send_event(ControllerEvent::BroadcastsChanged {
            broadcasts: self.state.broadcasts.clone(),
            active_id: self.state.active_broadcast_id.clone(),
        });
    }

    fn publish(&self) {
        *self.shared.write() = self.state.snapshot();
    }

    fn send_event(&self, event: ControllerEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Platform errors can echo request bodies, which may hold tokens.
fn log_platform_error(operation: &str, err: &PlatformError) {
    let context = redact_context(json!({
        "operation": operation,
        "detail": err.to_string(),
    }));
    warn!(%context, "Platform request failed");
}

impl Drop for Controller {
    fn drop(&mut self) {
        if self.state.live {
            self.release_encoder();
        }
    }
}
