//! RPS Gauntlet - A Rock-Paper-Scissors elimination tournament
//!
//! Core modules:
//! - `fx`: Confetti and ripple overlay (self-halting frame loop)
//! - `game`: Hands, tournament run state machine, victory tiers
//! - `records`: Best record, best round and badges
//! - `persistence`: Key-value storage with corrupt-state fallback
//! - `session`: The single active game session the UI drives
//! - `settings`: Player preferences and debug toggles

pub mod fx;
pub mod game;
pub mod persistence;
pub mod records;
pub mod session;
pub mod settings;

pub use fx::FxEngine;
pub use game::{Hand, Outcome, RoundResult, Tier, TournamentRun};
pub use persistence::{KvStore, MemoryStore};
pub use records::{BestRecord, Records};
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Confetti gravity (pixels/frame²)
    pub const GRAVITY: f32 = 0.12;

    /// Confetti defaults
    pub const CONFETTI_COUNT: usize = 140;
    pub const CONFETTI_POWER: f32 = 8.0;
    pub const CONFETTI_MIN_SPEED: f32 = 2.0;
    /// Maximum extra upward kick on spawn
    pub const CONFETTI_LIFT: f32 = 2.0;
    pub const CONFETTI_MIN_LIFE: f32 = 60.0;
    pub const CONFETTI_LIFE_SPREAD: f32 = 50.0;
    pub const CONFETTI_MIN_SIZE: f32 = 2.0;
    pub const CONFETTI_SIZE_SPREAD: f32 = 4.0;
    /// Angular velocity range is ±half of this
    pub const CONFETTI_SPIN: f32 = 0.2;

    /// Ripple defaults
    pub const RIPPLE_RADIUS: f32 = 12.0;
    pub const RIPPLE_SPREAD: f32 = 3.0;
    pub const RIPPLE_QTY: usize = 2;
    /// Radius offset between concentric rings
    pub const RIPPLE_RING_GAP: f32 = 8.0;
    pub const RIPPLE_ALPHA: f32 = 0.35;
    pub const RIPPLE_DECAY: f32 = 0.01;

    /// Population thresholds for victory tiers
    pub const WORLD_POPULATION: u64 = 8_000_000_000;
    pub const NATION_POPULATION: u64 = 1_000_000;
    pub const CITY_POPULATION: u64 = 10_000;
}

/// Format an integer with `,` thousands separators (en-US style)
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
