//! Victory tiers (badges) and their narrative copy

use serde::{Deserialize, Serialize};

use crate::consts::{CITY_POPULATION, NATION_POPULATION, WORLD_POPULATION};
use crate::format_count;

/// Milestone earned by winning a tournament of a given size
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Defeated100,
    City,
    National,
    World,
}

impl Tier {
    /// Display order, lowest first
    pub const ORDER: [Tier; 4] = [Tier::Defeated100, Tier::City, Tier::National, Tier::World];

    /// Tier for winning a field of `total` players
    pub fn for_total(total: u64) -> Tier {
        if total >= WORLD_POPULATION {
            Tier::World
        } else if total >= NATION_POPULATION {
            Tier::National
        } else if total >= CITY_POPULATION {
            Tier::City
        } else {
            Tier::Defeated100
        }
    }

    /// Badge title, also the persisted form
    pub fn title(&self) -> &'static str {
        match self {
            Tier::Defeated100 => "Defeated 100!",
            Tier::City => "City Champion!",
            Tier::National => "National Champion!",
            Tier::World => "World Champion!",
        }
    }

    pub fn from_title(s: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|t| t.title() == s)
    }

    pub fn hashtag(&self) -> &'static str {
        match self {
            Tier::Defeated100 => "Defeated100,RPS",
            Tier::City => "CityChampion,RPS",
            Tier::National => "NationalChampion,RPS",
            Tier::World => "WorldChampion,RPS",
        }
    }
}

/// ceil(log2(total)): wins a perfect bracket would need. Display only.
pub fn wins_needed(total: u64) -> u32 {
    let n = total.max(1);
    if n == 1 {
        0
    } else {
        u64::BITS - (n - 1).leading_zeros()
    }
}

/// Text for the victory screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VictoryCopy {
    pub title: &'static str,
    pub message: String,
    pub hashtag: &'static str,
}

impl VictoryCopy {
    pub fn new(total: u64) -> Self {
        let tier = Tier::for_total(total);
        let wins = format_count(u64::from(wins_needed(total)));
        let message = match tier {
            Tier::World => format!(
                "You kept winning until the last survivor. You are the strongest human alive. \
                 Initial participants: {}, theoretical wins needed: {}. You overcame them all.",
                format_count(total),
                wins
            ),
            Tier::National => format!(
                "You reached the top of a one-million tournament. The strongest in the nation is proven. \
                 Initial participants: {} (wins needed: {}).",
                format_count(total),
                wins
            ),
            Tier::City => format!(
                "You rose above ten thousand challengers. Champion of the metropolis. \
                 Wins needed: {}. Both luck and skill aligned.",
                wins
            ),
            Tier::Defeated100 => format!(
                "You conquered the 100-player stage. Earned the title of Community Champion. \
                 Wins needed: {}. Aim for the world next!",
                wins
            ),
        };

        Self {
            title: tier.title(),
            message,
            hashtag: tier.hashtag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(Tier::for_total(2), Tier::Defeated100);
        assert_eq!(Tier::for_total(9_999), Tier::Defeated100);
        assert_eq!(Tier::for_total(10_000), Tier::City);
        assert_eq!(Tier::for_total(12_000), Tier::City);
        assert_eq!(Tier::for_total(999_999), Tier::City);
        assert_eq!(Tier::for_total(1_000_000), Tier::National);
        assert_eq!(Tier::for_total(7_999_999_999), Tier::National);
        assert_eq!(Tier::for_total(8_000_000_000), Tier::World);
    }

    #[test]
    fn test_title_round_trip() {
        for tier in Tier::ORDER {
            assert_eq!(Tier::from_title(tier.title()), Some(tier));
        }
        assert_eq!(Tier::from_title("Galaxy Champion!"), None);
    }

    #[test]
    fn test_wins_needed() {
        assert_eq!(wins_needed(0), 0);
        assert_eq!(wins_needed(1), 0);
        assert_eq!(wins_needed(2), 1);
        assert_eq!(wins_needed(100), 7);
        assert_eq!(wins_needed(128), 7);
        assert_eq!(wins_needed(129), 8);
        assert_eq!(wins_needed(8_000_000_000), 33);
    }

    #[test]
    fn test_victory_copy() {
        let copy = VictoryCopy::new(12_000);
        assert_eq!(copy.title, "City Champion!");
        assert_eq!(copy.hashtag, "CityChampion,RPS");
        assert!(copy.message.contains("Wins needed: 14."));

        let copy = VictoryCopy::new(8_000_000_000);
        assert_eq!(copy.title, "World Champion!");
        assert!(copy.message.contains("8,000,000,000"));
    }

    proptest! {
        #[test]
        fn prop_tier_monotonic(a in 1u64..20_000_000_000, b in 1u64..20_000_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Tier::for_total(lo) <= Tier::for_total(hi));
        }

        #[test]
        fn prop_wins_needed_matches_float(total in 1u64..(1u64 << 20)) {
            let expected = (total as f64).log2().ceil() as u32;
            prop_assert_eq!(wins_needed(total), expected);
        }
    }
}
