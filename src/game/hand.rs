//! The three hands and who beats whom

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Rock,
    Scissors,
    Paper,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Rock, Hand::Scissors, Hand::Paper];

    /// The hand this one beats
    pub fn victim(self) -> Hand {
        match self {
            Hand::Rock => Hand::Scissors,
            Hand::Scissors => Hand::Paper,
            Hand::Paper => Hand::Rock,
        }
    }

    pub fn beats(self, other: Hand) -> bool {
        self.victim() == other
    }

    /// Uniformly random hand
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Hand {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Rock => "Rock",
            Hand::Scissors => "Scissors",
            Hand::Paper => "Paper",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rock" | "r" => Some(Hand::Rock),
            "scissors" | "s" => Some(Hand::Scissors),
            "paper" | "p" => Some(Hand::Paper),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Hand::Rock => "✊",
            Hand::Scissors => "✌️",
            Hand::Paper => "🖐",
        }
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
