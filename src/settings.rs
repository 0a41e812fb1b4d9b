//! Player preferences and debug toggles
//!
//! Persisted separately from records in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KvStore};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Opponent always throws the losing hand (demo/testing)
    pub force_win: bool,
    /// Confetti and ripple overlay
    pub effects: bool,
    /// Reduced motion (smaller, shorter bursts)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            force_win: false,
            effects: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "jg_settings";

    /// Effective overlay toggle (respects reduced_motion)
    pub fn effective_effects(&self) -> bool {
        self.effects && !self.reduced_motion
    }

    /// Scale a confetti count for the current preferences
    pub fn confetti_count(&self, count: usize) -> usize {
        if !self.effects {
            0
        } else if self.reduced_motion {
            count / 4
        } else {
            count
        }
    }

    /// Apply `key=value` flags from a URL query string (`?force_win=1&effects=0`)
    pub fn apply_query(&mut self, query: &str) {
        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, "1"));
            let Some(flag) = parse_flag(value) else {
                continue;
            };
            match key {
                "force_win" | "cheat" => self.force_win = flag,
                "effects" | "fx" => self.effects = flag,
                "reduced_motion" => self.reduced_motion = flag,
                _ => {}
            }
        }
    }

    /// Load settings, falling back to defaults
    pub fn load<S: KvStore + ?Sized>(store: &S) -> Self {
        match persistence::load_or_none::<Self, _>(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings from storage");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save<S: KvStore + ?Sized>(&self, store: &mut S) {
        persistence::save_or_warn(store, Self::STORAGE_KEY, self);
        log::info!("Settings saved");
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" | "" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
