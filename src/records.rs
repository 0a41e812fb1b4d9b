//! Best standing, best round and earned badges
//!
//! Persisted to LocalStorage, updated on every finished run.

use serde::{Deserialize, Serialize};

use crate::game::Tier;
use crate::persistence::{self, KvStore};

/// Storage keys
pub mod keys {
    pub const BEST_RECORD: &str = "jg_best_record";
    pub const BEST_ROUND: &str = "jg_best_round";
    pub const BADGES: &str = "jg_badges";
    pub const LAST_TOTAL: &str = "jg_last_total";
    /// Pre-migration schema, deleted on startup
    pub const LEGACY_BEST_RANK: &str = "jg_best_rank";
}

/// Best finish ever: lowest rank wins, ties go to the larger field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRecord {
    pub total: u64,
    pub rank: u64,
}

impl BestRecord {
    pub fn new(total: u64, rank: u64) -> Self {
        Self { total, rank }
    }

    /// The better of two records (`self` on a full tie)
    pub fn better(self, other: BestRecord) -> BestRecord {
        if self.rank != other.rank {
            if self.rank < other.rank { self } else { other }
        } else if self.total >= other.total {
            self
        } else {
            other
        }
    }
}

/// Snapshot of everything persisted across runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Records {
    pub best_record: Option<BestRecord>,
    pub best_round: Option<u32>,
    /// Earned badge titles, insertion order
    pub badges: Vec<String>,
}

impl Records {
    /// Delete the legacy key and purge a record with no usable total
    pub fn migrate_and_cleanup<S: KvStore + ?Sized>(store: &mut S) {
        if store.get(keys::LEGACY_BEST_RANK).is_some() {
            store.remove(keys::LEGACY_BEST_RANK);
            log::info!("Removed legacy best-rank entry");
        }

        // Only the population is checked here; other damage is ignored on read
        let Ok(rec) = persistence::load_json::<serde_json::Value, _>(store, keys::BEST_RECORD) else {
            return;
        };
        let total = rec.get("total").and_then(serde_json::Value::as_f64);
        if !total.is_some_and(|t| t > 0.0) {
            store.remove(keys::BEST_RECORD);
            log::warn!("Purged best record with no population");
        }
    }

    /// Read all entries, treating anything unreadable as absent
    pub fn load<S: KvStore + ?Sized>(store: &S) -> Self {
        let best_record = persistence::load_or_none::<BestRecord, _>(store, keys::BEST_RECORD)
            .filter(|rec| rec.total > 0);
        let best_round = persistence::load_number(store, keys::BEST_ROUND)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX));
        let badges = persistence::load_or_none::<Vec<String>, _>(store, keys::BADGES).unwrap_or_default();

        Self {
            best_record,
            best_round,
            badges,
        }
    }

    /// Write all entries that have a value
    pub fn save<S: KvStore + ?Sized>(&self, store: &mut S) {
        if let Some(rec) = &self.best_record {
            persistence::save_or_warn(store, keys::BEST_RECORD, rec);
        }
        if let Some(round) = self.best_round {
            persistence::save_number(store, keys::BEST_ROUND, u64::from(round));
        }
        persistence::save_or_warn(store, keys::BADGES, &self.badges);
        log::info!(
            "Records saved (best {:?}, round {:?}, {} badges)",
            self.best_record,
            self.best_round,
            self.badges.len()
        );
    }

    /// Merge a finished run into the best record. Returns the new best.
    pub fn submit_record(&mut self, total: u64, rank: u64) -> BestRecord {
        let candidate = BestRecord::new(total, rank);
        let next = match self.best_record {
            Some(cur) => cur.better(candidate),
            None => candidate,
        };
        self.best_record = Some(next);
        next
    }

    /// Raise the best round if `round` beats it. Returns true on a new best.
    pub fn submit_round(&mut self, round: u32) -> bool {
        match self.best_round {
            Some(best) if round <= best => false,
            _ => {
                self.best_round = Some(round);
                true
            }
        }
    }

    pub fn has_badge(&self, tier: Tier) -> bool {
        self.badges.iter().any(|b| b == tier.title())
    }

    /// Add a badge. Returns true only the first time it is earned.
    pub fn award_badge(&mut self, tier: Tier) -> bool {
        if self.has_badge(tier) {
            return false;
        }
        self.badges.push(tier.title().to_string());
        true
    }

    /// Known badges in display order (unknown titles dropped)
    pub fn badges_in_order(&self) -> Vec<Tier> {
        let mut tiers: Vec<Tier> = self.badges.iter().filter_map(|b| Tier::from_title(b)).collect();
        tiers.sort();
        tiers.dedup();
        tiers
    }

    /// Population entered last time, for prefilling the setup form
    pub fn last_total<S: KvStore + ?Sized>(store: &S) -> Option<u64> {
        persistence::load_number(store, keys::LAST_TOTAL).filter(|&n| n > 0)
    }

    pub fn save_last_total<S: KvStore + ?Sized>(store: &mut S, total: u64) {
        persistence::save_number(store, keys::LAST_TOTAL, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_better_prefers_lower_rank() {
        let a = BestRecord::new(50, 3);
        let b = BestRecord::new(50, 1);
        assert_eq!(a.better(b), b);
        assert_eq!(b.better(a), b);
    }

    #[test]
    fn test_better_breaks_ties_on_total() {
        let a = BestRecord::new(50, 1);
        let b = BestRecord::new(9000, 1);
        assert_eq!(a.better(b), b);
        assert_eq!(b.better(a), b);
    }

    #[test]
    fn test_submit_record() {
        let mut records = Records::default();
        assert_eq!(records.submit_record(100, 6), BestRecord::new(100, 6));
        assert_eq!(records.submit_record(100, 40), BestRecord::new(100, 6));
        assert_eq!(records.submit_record(20, 1), BestRecord::new(20, 1));
    }

    #[test]
    fn test_submit_round() {
        let mut records = Records::default();
        assert!(records.submit_round(3));
        assert!(!records.submit_round(3));
        assert!(!records.submit_round(1));
        assert!(records.submit_round(5));
        assert_eq!(records.best_round, Some(5));
    }

    #[test]
    fn test_award_badge_once() {
        let mut records = Records::default();
        assert!(records.award_badge(Tier::City));
        assert!(!records.award_badge(Tier::City));
        assert_eq!(records.badges, vec!["City Champion!".to_string()]);
    }

    #[test]
    fn test_badges_in_order() {
        let mut records = Records::default();
        records.award_badge(Tier::World);
        records.award_badge(Tier::Defeated100);
        records.badges.push("Mystery Badge".into());
        records.badges.push("World Champion!".into());
        assert_eq!(records.badges_in_order(), vec![Tier::Defeated100, Tier::World]);
    }

    #[test]
    fn test_save_load_schema() {
        let mut store = MemoryStore::new();
        let mut records = Records::default();
        records.submit_record(12_000, 1);
        records.submit_round(14);
        records.award_badge(Tier::City);
        records.save(&mut store);

        assert_eq!(
            store.get(keys::BEST_RECORD).as_deref(),
            Some(r#"{"total":12000,"rank":1}"#)
        );
        assert_eq!(store.get(keys::BEST_ROUND).as_deref(), Some("14"));
        assert_eq!(store.get(keys::BADGES).as_deref(), Some(r#"["City Champion!"]"#));
        assert_eq!(Records::load(&store), records);
    }

    #[test]
    fn test_load_corrupt_entries_as_absent() {
        let mut store = MemoryStore::new();
        store.set(keys::BEST_RECORD, "{\"total\":").unwrap();
        store.set(keys::BEST_ROUND, "lots").unwrap();
        store.set(keys::BADGES, "not a list").unwrap();
        assert_eq!(Records::load(&store), Records::default());
    }

    #[test]
    fn test_cleanup_removes_legacy_and_bad_records() {
        let mut store = MemoryStore::new();
        store.set(keys::LEGACY_BEST_RANK, "3").unwrap();
        store.set(keys::BEST_RECORD, r#"{"total":0,"rank":1}"#).unwrap();
        Records::migrate_and_cleanup(&mut store);
        assert!(store.get(keys::LEGACY_BEST_RANK).is_none());
        assert!(store.get(keys::BEST_RECORD).is_none());

        store.set(keys::BEST_RECORD, r#"{"rank":1}"#).unwrap();
        Records::migrate_and_cleanup(&mut store);
        assert!(store.get(keys::BEST_RECORD).is_none());

        store.set(keys::BEST_RECORD, r#"{"total":-4,"rank":1}"#).unwrap();
        Records::migrate_and_cleanup(&mut store);
        assert!(store.get(keys::BEST_RECORD).is_none());
    }

    #[test]
    fn test_cleanup_only_checks_total() {
        let mut store = MemoryStore::new();
        store.set(keys::BEST_RECORD, r#"{"total":100}"#).unwrap();
        Records::migrate_and_cleanup(&mut store);
        assert!(store.get(keys::BEST_RECORD).is_some());
        // Still unusable on read
        assert_eq!(Records::load(&store).best_record, None);

        store.set(keys::BEST_RECORD, "{\"total\":").unwrap();
        Records::migrate_and_cleanup(&mut store);
        assert!(store.get(keys::BEST_RECORD).is_some());
    }

    #[test]
    fn test_cleanup_keeps_good_record() {
        let mut store = MemoryStore::new();
        store.set(keys::BEST_RECORD, r#"{"total":100,"rank":6}"#).unwrap();
        Records::migrate_and_cleanup(&mut store);
        assert_eq!(
            Records::load(&store).best_record,
            Some(BestRecord::new(100, 6))
        );
    }

    #[test]
    fn test_last_total() {
        let mut store = MemoryStore::new();
        assert_eq!(Records::last_total(&store), None);
        Records::save_last_total(&mut store, 8_000_000_000);
        assert_eq!(Records::last_total(&store), Some(8_000_000_000));
    }

    proptest! {
        #[test]
        fn prop_better_is_commutative_on_outcome(
            t1 in 1u64..1_000_000, r1 in 1u64..1_000,
            t2 in 1u64..1_000_000, r2 in 1u64..1_000
        ) {
            let a = BestRecord::new(t1, r1);
            let b = BestRecord::new(t2, r2);
            let best = a.better(b);
            prop_assert_eq!(best, b.better(a));
            prop_assert_eq!(best.rank, r1.min(r2));
        }
    }
}
