//! A single tournament run
//!
//! Each win halves the remaining field (single-elimination bracket); a
//! loss ends the run where it stands. Draws are replayed and cost nothing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hand::Hand;

/// Result of one thrown hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Same hand, throw again
    Draw,
    /// Field halved, rivals remain
    Win,
    /// Run over, player knocked out
    Lose,
    /// Last rival gone
    Victory,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Draw => "Draw",
            Outcome::Win => "Win",
            Outcome::Lose => "Lose",
            Outcome::Victory => "Victory",
        }
    }

    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Outcome::Lose | Outcome::Victory)
    }
}

/// What the UI needs to render after a hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub outcome: Outcome,
    pub opponent: Hand,
    pub rivals: u64,
    pub round: u32,
}

/// State of the active run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRun {
    /// Starting population, player included
    pub total: u64,
    /// Competitors left besides the player
    pub rivals: u64,
    /// Decisive hands played (draws excluded)
    pub round: u32,
    pub alive: bool,
    /// Set when the last rival falls; a loss leaves it false
    pub won: bool,
}

impl TournamentRun {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            rivals: total.saturating_sub(1),
            round: 0,
            alive: true,
            won: false,
        }
    }

    /// Standing if the run ended now
    pub fn rank_preview(&self) -> u64 {
        self.rivals + 1
    }

    pub fn is_victory(&self) -> bool {
        !self.alive && self.won
    }

    pub fn is_defeat(&self) -> bool {
        !self.alive && !self.won
    }

    /// Throw `player` against a random opponent.
    ///
    /// With `force_win` the opponent always throws the hand `player` beats.
    /// Returns `None` once the run has ended.
    pub fn play_hand<R: Rng + ?Sized>(
        &mut self,
        player: Hand,
        force_win: bool,
        rng: &mut R,
    ) -> Option<RoundResult> {
        if !self.alive {
            return None;
        }

        let opponent = if force_win {
            player.victim()
        } else {
            Hand::random(rng)
        };

        Some(self.resolve(player, opponent))
    }

    /// Apply a hand against a known opponent
    pub fn resolve(&mut self, player: Hand, opponent: Hand) -> RoundResult {
        let outcome = if player == opponent {
            Outcome::Draw
        } else {
            self.round += 1;
            if player.beats(opponent) {
                self.rivals /= 2;
                if self.rivals == 0 {
                    self.alive = false;
                    self.won = true;
                    Outcome::Victory
                } else {
                    Outcome::Win
                }
            } else {
                self.alive = false;
                Outcome::Lose
            }
        };

        log::debug!(
            "{} vs {}: {} (rivals {}, round {})",
            player,
            opponent,
            outcome.as_str(),
            self.rivals,
            self.round
        );

        RoundResult {
            outcome,
            opponent,
            rivals: self.rivals,
            round: self.round,
        }
    }
}
