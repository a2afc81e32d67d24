//! Team names and scores shown on the overlay.

use scorecast_ipc::{Side, Team};

/// Home and away teams.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    home: Team,
    away: Team,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self {
            home: Team::named("HOME"),
            away: Team::named("AWAY"),
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    pub fn home(&self) -> &Team {
        &self.home
    }

    pub fn away(&self) -> &Team {
        &self.away
    }

    pub fn increment_score(&mut self, side: Side) {
        self.team_mut(side).score += 1;
    }

    /// Remove a goal. Scores never go below zero.
    pub fn decrement_score(&mut self, side: Side) {
        let team = self.team_mut(side);
        team.score = team.score.saturating_sub(1);
    }

    /// Rename a team, keeping its score.
    pub fn rename_team(&mut self, side: Side, name: impl Into<String>) {
        self.team_mut(side).name = name.into();
    }

    pub fn set_team_color(&mut self, side: Side, color: impl Into<String>) {
        self.team_mut(side).color = color.into();
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_floor_at_zero() {
        let mut board = Scoreboard::new();
        board.decrement_score(Side::Home);
        assert_eq!(board.home().score, 0);

        board.increment_score(Side::Home);
        board.increment_score(Side::Home);
        board.decrement_score(Side::Home);
        assert_eq!(board.home().score, 1);
        assert_eq!(board.away().score, 0);
    }

    #[test]
    fn test_rename_keeps_score() {
        let mut board = Scoreboard::new();
        board.increment_score(Side::Away);
        board.rename_team(Side::Away, "Rangers");
        board.set_team_color(Side::Away, "#0038A8");

        let away = board.away();
        assert_eq!(away.name, "Rangers");
        assert_eq!(away.score, 1);
        assert_eq!(away.color, "#0038A8");
    }
}
