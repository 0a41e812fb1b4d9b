//! The single active game session
//!
//! Owns the run, the store, settings and the RNG. The UI layer holds one
//! `Session` and calls into it; nothing here touches the DOM.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::game::{Hand, RoundResult, Tier, TournamentRun, VictoryCopy, wins_needed};
use crate::persistence::KvStore;
use crate::records::{BestRecord, Records};
use crate::settings::Settings;

/// Where the player is in the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Choosing a population
    Setup,
    /// Throwing hands
    Running,
    /// Knocked out
    Defeated,
    /// Last one standing
    Victory,
}

/// Result screen data after a loss
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LossSummary {
    pub final_rank: u64,
    pub round: u32,
    pub total: u64,
    pub best: BestRecord,
    pub new_best_round: bool,
}

/// Victory screen data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VictorySummary {
    pub tier: Tier,
    pub copy: VictoryCopy,
    pub round: u32,
    pub total: u64,
    pub wins_needed: u32,
    /// First time this badge was earned
    pub newly_earned: bool,
    pub new_best_round: bool,
}

pub struct Session<S: KvStore> {
    store: S,
    settings: Settings,
    rng: Pcg32,
    run: Option<TournamentRun>,
}

impl<S: KvStore> Session<S> {
    /// Open a session over `store`, healing stale entries first
    pub fn new(mut store: S, seed: u64) -> Self {
        Records::migrate_and_cleanup(&mut store);
        let settings = Settings::load(&store);
        log::info!("Session opened with seed: {}", seed);
        Self {
            store,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            run: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace settings and persist them
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(&mut self.store);
    }

    /// Toggle force-win for this session only (not persisted)
    pub fn set_force_win(&mut self, on: bool) {
        if on {
            log::warn!("Force-win enabled");
        }
        self.settings.force_win = on;
    }

    /// Apply URL flags for this session only (not persisted)
    pub fn apply_query(&mut self, query: &str) {
        self.settings.apply_query(query);
        if self.settings.force_win {
            log::warn!("Force-win enabled");
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run(&self) -> Option<&TournamentRun> {
        self.run.as_ref()
    }

    pub fn phase(&self) -> Phase {
        match &self.run {
            None => Phase::Setup,
            Some(run) if run.alive => Phase::Running,
            Some(run) if run.is_victory() => Phase::Victory,
            Some(_) => Phase::Defeated,
        }
    }

    /// Begin a new run with `population` players, replacing any current one
    pub fn start_run(&mut self, population: u64) -> &TournamentRun {
        let total = population.max(1);
        Records::save_last_total(&mut self.store, total);
        log::info!("Run started with {} players", total);
        self.run.insert(TournamentRun::new(total))
    }

    /// Throw a hand. `None` if no run is in progress.
    pub fn play_hand(&mut self, hand: Hand) -> Option<RoundResult> {
        let force_win = self.settings.force_win;
        self.run.as_mut()?.play_hand(hand, force_win, &mut self.rng)
    }

    /// Commit a lost run. `None` unless the current run ended in defeat.
    pub fn finalize_loss(&mut self) -> Option<LossSummary> {
        let run = self.run.as_ref().filter(|r| r.is_defeat())?;
        let final_rank = run.rank_preview();
        let (round, total) = (run.round, run.total);

        let mut records = Records::load(&self.store);
        let best = records.submit_record(total, final_rank);
        let new_best_round = records.submit_round(round);
        records.save(&mut self.store);

        log::info!("Run lost: rank {} of {} in round {}", final_rank, total, round);
        Some(LossSummary {
            final_rank,
            round,
            total,
            best,
            new_best_round,
        })
    }

    /// Commit a won run and award its badge. `None` unless the run was won.
    pub fn finalize_victory(&mut self) -> Option<VictorySummary> {
        let run = self.run.as_ref().filter(|r| r.is_victory())?;
        let (round, total) = (run.round, run.total);
        let tier = Tier::for_total(total);

        let mut records = Records::load(&self.store);
        let newly_earned = records.award_badge(tier);
        records.submit_record(total, 1);
        let new_best_round = records.submit_round(round);
        records.save(&mut self.store);

        if newly_earned {
            log::info!("New badge earned: {}", tier.title());
        }
        log::info!("Run won: {} players in {} rounds", total, round);
        Some(VictorySummary {
            tier,
            copy: VictoryCopy::new(total),
            round,
            total,
            wins_needed: wins_needed(total),
            newly_earned,
            new_best_round,
        })
    }

    /// Abandon whatever run is active and go back to setup
    pub fn return_to_setup(&mut self) {
        self.run = None;
    }

    pub fn records(&self) -> Records {
        Records::load(&self.store)
    }

    pub fn best_record(&self) -> Option<BestRecord> {
        self.records().best_record
    }

    pub fn best_round(&self) -> Option<u32> {
        self.records().best_round
    }

    pub fn badges(&self) -> Vec<Tier> {
        self.records().badges_in_order()
    }

    pub fn last_total(&self) -> Option<u64> {
        Records::last_total(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Outcome;
    use crate::persistence::MemoryStore;
    use crate::records::keys;

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new(), 1234)
    }

    #[test]
    fn test_setup_until_started() {
        let mut s = session();
        assert_eq!(s.phase(), Phase::Setup);
        assert!(s.play_hand(Hand::Rock).is_none());
        assert!(s.finalize_loss().is_none());
        assert!(s.finalize_victory().is_none());
    }

    #[test]
    fn test_start_run_persists_last_total() {
        let mut s = session();
        let run = s.start_run(100);
        assert_eq!(run.rivals, 99);
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.store().get(keys::LAST_TOTAL).as_deref(), Some("100"));
        assert_eq!(s.last_total(), Some(100));
    }

    #[test]
    fn test_forced_victory() {
        let mut s = session();
        s.set_force_win(true);
        s.start_run(12_000);
        let mut last = None;
        while s.phase() == Phase::Running {
            last = s.play_hand(Hand::Scissors);
        }
        let last = last.unwrap();
        assert_eq!(last.outcome, Outcome::Victory);
        assert_eq!(last.opponent, Hand::Paper);
        assert_eq!(s.phase(), Phase::Victory);
        assert!(s.finalize_loss().is_none());

        let summary = s.finalize_victory().unwrap();
        assert_eq!(summary.tier, Tier::City);
        assert_eq!(summary.copy.title, "City Champion!");
        assert_eq!(summary.wins_needed, 14);
        assert!(summary.newly_earned);
        assert_eq!(s.best_record(), Some(BestRecord::new(12_000, 1)));
        assert_eq!(s.badges(), vec![Tier::City]);

        // Same tier again: no duplicate, not newly earned
        s.start_run(12_000);
        while s.phase() == Phase::Running {
            s.play_hand(Hand::Rock);
        }
        let again = s.finalize_victory().unwrap();
        assert!(!again.newly_earned);
        assert_eq!(s.records().badges.len(), 1);
    }

    #[test]
    fn test_loss_records_rank() {
        let mut s = session();
        s.start_run(100);
        // Drive the run directly so the loss lands with 5 rivals left
        if let Some(run) = s.run.as_mut() {
            run.rivals = 5;
            run.round = 4;
            run.resolve(Hand::Rock, Hand::Paper);
        }
        assert_eq!(s.phase(), Phase::Defeated);

        let summary = s.finalize_loss().unwrap();
        assert_eq!(summary.final_rank, 6);
        assert_eq!(summary.round, 5);
        assert_eq!(summary.total, 100);
        assert!(summary.new_best_round);
        assert_eq!(s.best_record(), Some(BestRecord::new(100, 6)));
        assert_eq!(s.best_round(), Some(5));
    }

    #[test]
    fn test_single_player_loss_goes_to_results() {
        let mut s = session();
        s.start_run(1);
        if let Some(run) = s.run.as_mut() {
            run.resolve(Hand::Scissors, Hand::Rock);
        }
        assert_eq!(s.phase(), Phase::Defeated);
        assert!(s.finalize_victory().is_none());

        let summary = s.finalize_loss().unwrap();
        assert_eq!(summary.final_rank, 1);
        assert_eq!(summary.total, 1);
        assert_eq!(s.best_record(), Some(BestRecord::new(1, 1)));
        assert!(s.badges().is_empty());
    }

    #[test]
    fn test_return_to_setup() {
        let mut s = session();
        s.start_run(10);
        s.return_to_setup();
        assert_eq!(s.phase(), Phase::Setup);
        assert!(s.run().is_none());
    }

    #[test]
    fn test_open_purges_bad_record() {
        let mut store = MemoryStore::new();
        store.set(keys::BEST_RECORD, r#"{"total":0,"rank":1}"#).unwrap();
        store.set(keys::LEGACY_BEST_RANK, "9").unwrap();
        let s = Session::new(store, 0);
        assert!(s.store().get(keys::BEST_RECORD).is_none());
        assert!(s.store().get(keys::LEGACY_BEST_RANK).is_none());
        assert_eq!(s.best_record(), None);
    }

    #[test]
    fn test_settings_persist() {
        let mut s = session();
        s.set_settings(Settings {
            force_win: true,
            ..Default::default()
        });
        assert!(s.settings().force_win);
        assert!(s.store().get(Settings::STORAGE_KEY).is_some());
    }

    #[test]
    fn test_query_flags_not_persisted() {
        let mut s = session();
        s.apply_query("?force_win=1");
        assert!(s.settings().force_win);
        assert!(s.store().get(Settings::STORAGE_KEY).is_none());

        s.start_run(2);
        let result = s.play_hand(Hand::Paper).unwrap();
        assert_eq!(result.opponent, Hand::Rock);
        assert_eq!(result.outcome, Outcome::Victory);
    }
}
