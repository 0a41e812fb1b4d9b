//! Tournament rules
//!
//! Pure game logic, no storage or DOM:
//! - Seeded RNG only (passed in by the caller)
//! - Rival counts only, no per-player simulation

pub mod hand;
pub mod run;
pub mod tier;

pub use hand::Hand;
pub use run::{Outcome, RoundResult, TournamentRun};
pub use tier::{Tier, VictoryCopy, wins_needed};
