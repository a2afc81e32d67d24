//! Game clock and penalty clock coordination.
//!
//! Both clocks share one tick source. Penalty time only elapses while game
//! time elapses, so a penalty started with the game clock stopped stays
//! frozen until play resumes.

use tracing::{debug, info};

use scorecast_ipc::{GameClockState, PenaltyClockState, PowerPlayStatus, Side};

/// Outcome of a single clock tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTick {
    /// The game clock was decremented.
    pub game_changed: bool,

    /// The penalty clock was decremented.
    pub penalty_changed: bool,

    /// The penalty expired on this tick.
    pub penalty_expired: bool,

    /// The period ended on this tick.
    pub period_ended: bool,
}

impl ClockTick {
    /// Returns true if the tick changed nothing.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Owns the game clock, the penalty clock and the period counter.
#[derive(Debug, Clone)]
pub struct ClockCoordinator {
    game: GameClockState,
    penalty: PenaltyClockState,
    period: u32,
    period_length_secs: u32,
    penalty_length_secs: u32,
}

impl ClockCoordinator {
    /// Create a coordinator with the clock loaded to a full period.
    pub fn new(period_length_secs: u32, penalty_length_secs: u32) -> Self {
        Self {
            game: GameClockState {
                remaining_seconds: period_length_secs,
                running: false,
            },
            penalty: PenaltyClockState::default(),
            period: 1,
            period_length_secs,
            penalty_length_secs,
        }
    }

    /// Current game clock.
    pub fn game(&self) -> GameClockState {
        self.game
    }

    /// Current penalty clock.
    pub fn penalty(&self) -> PenaltyClockState {
        self.penalty
    }

    /// Current period number (1-based).
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Whether the shared ticker should be running.
    pub fn is_ticking(&self) -> bool {
        self.game.running
    }

    /// Advance both clocks by one second.
    ///
    /// Does nothing unless the game clock is running. Penalty expiry clears
    /// the running flag and the power-play status in the same tick that
    /// reaches zero.
    pub fn tick(&mut self) -> ClockTick {
        let mut outcome = ClockTick::default();

        if !self.game.running {
            return outcome;
        }

        if self.game.remaining_seconds > 0 {
            self.game.remaining_seconds -= 1;
            outcome.game_changed = true;
        }

        if self.penalty.running {
            if self.penalty.remaining_seconds <= 1 {
                self.penalty = PenaltyClockState::default();
                outcome.penalty_expired = true;
                info!("Penalty expired");
            } else {
                self.penalty.remaining_seconds -= 1;
            }
            outcome.penalty_changed = true;
        }

        if self.game.remaining_seconds == 0 {
            self.game.running = false;
            outcome.period_ended = true;
            info!(period = self.period, "Period ended");
        }

        outcome
    }

    /// Start the game clock. Returns false if there is no time left.
    pub fn start_game_clock(&mut self) -> bool {
        if self.game.remaining_seconds == 0 {
            debug!("Game clock at zero, not starting");
            return false;
        }
        self.game.running = true;
        true
    }

    /// Stop the game clock.
    pub fn stop_game_clock(&mut self) {
        self.game.running = false;
    }

    /// Start the clock if stopped, stop it if running. Returns the new state.
    pub fn toggle_game_clock(&mut self) -> bool {
        if self.game.running {
            self.stop_game_clock();
            false
        } else {
            self.start_game_clock()
        }
    }

    /// Stop the clock and reload a full period.
    pub fn reset_game_clock(&mut self) {
        self.game = GameClockState {
            remaining_seconds: self.period_length_secs,
            running: false,
        };
    }

    /// Set the remaining game time directly.
    pub fn set_game_clock(&mut self, seconds: u32) {
        self.game.remaining_seconds = seconds;
        if seconds == 0 {
            self.game.running = false;
        }
    }

    /// Change the period length. The game clock is reset to the new length.
    pub fn set_period_length(&mut self, seconds: u32) {
        self.period_length_secs = seconds;
        self.reset_game_clock();
    }

    /// Change the length used by the next penalty.
    pub fn set_penalty_length(&mut self, seconds: u32) {
        self.penalty_length_secs = seconds;
    }

    /// Start a penalty against `side`.
    ///
    /// A home penalty puts the home side on the penalty kill; an away
    /// penalty gives it the power play.
    pub fn start_penalty(&mut self, side: Side) {
        let power_play = match side {
            Side::Home => PowerPlayStatus::PenaltyKill,
            Side::Away => PowerPlayStatus::PowerPlay,
        };

        self.penalty = PenaltyClockState {
            remaining_seconds: self.penalty_length_secs,
            running: true,
            power_play,
        };
    }

    /// Clear any penalty unconditionally.
    pub fn clear_penalty(&mut self) {
        self.penalty = PenaltyClockState::default();
    }

    /// Move to the next period. The clock value is untouched.
    pub fn advance_period(&mut self) {
        self.period += 1;
    }

    /// Move back one period, never below the first.
    pub fn previous_period(&mut self) {
        self.period = self.period.saturating_sub(1).max(1);
    }
}

impl Default for ClockCoordinator {
    fn default() -> Self {
        Self::new(20 * 60, 2 * 60)
    }
}
