//! Character and club stats.
//!
//! Stats are loaded outside the shot engine and may change between shots,
//! but are never mutated by it. Consumers read them through [`StatProvider`]
//! and fold them into a [`StatModifiers`] snapshot at each decision point.
//!
//! A [`Loadout`] carries a bag of clubs with one of them selected. Each club
//! has a nominal maximum distance in yards: a driver reaches
//! [`BASE_DRIVER_YARDS`] plus [`YARDS_PER_POWER_POINT`] for every point of
//! combined character and club power, and every other club falls short of
//! that by its `distance_offset`.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Player character stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterStats {
    /// Raw hitting power
    pub power: f32,
    /// Control, slows the swing bar
    pub control: f32,
    /// Accuracy, widens the perfect zone
    pub accuracy: f32,
    /// Extra spin imparted on contact
    pub spin: f32,
    /// Extra sidespin (curve) imparted on contact
    pub curve: f32,
}

/// Driver distance in yards with zero power.
pub const BASE_DRIVER_YARDS: f32 = 200.0;

/// Driver distance gained per point of combined power.
pub const YARDS_PER_POWER_POINT: f32 = 2.0;

/// Stats of one club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubStats {
    /// Display name
    pub name: String,
    /// Power as a percentage of a neutral club (100 = neutral)
    pub power_percent: f32,
    /// Power bonus, added to the character's power
    pub power: f32,
    /// Yards this club falls short of the driver
    pub distance_offset: f32,
    /// Control bonus
    pub control: f32,
    /// Accuracy bonus
    pub accuracy: f32,
    /// Spin bonus
    pub spin: f32,
    /// Curve bonus
    pub curve: f32,
    /// Loft angle in degrees. Lofts above a driver's steepen the launch.
    pub loft_angle: f32,
}

impl Default for ClubStats {
    fn default() -> Self {
        Self {
            name: String::from("Neutral"),
            power_percent: 100.0,
            power: 0.0,
            distance_offset: 0.0,
            control: 0.0,
            accuracy: 0.0,
            spin: 0.0,
            curve: 0.0,
            loft_angle: NEUTRAL_LOFT,
        }
    }
}

/// Loft of a neutral club, equal to a driver's.
pub const NEUTRAL_LOFT: f32 = 10.0;

impl ClubStats {
    #[allow(clippy::too_many_arguments)]
    fn stock(
        name: &str,
        power_percent: f32,
        power: f32,
        control: f32,
        accuracy: f32,
        spin: f32,
        curve: f32,
        loft_angle: f32,
        distance_offset: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            power_percent,
            power,
            distance_offset,
            control,
            accuracy,
            spin,
            curve,
            loft_angle,
        }
    }

    /// The stock set of woods, irons and wedges, driver first.
    #[must_use]
    pub fn starter_bag() -> Vec<Self> {
        vec![
            Self::stock("1W", 100.0, 6.0, 12.0, 8.0, 2.0, 2.0, 10.0, 0.0),
            Self::stock("2W", 96.0, 6.0, 13.0, 8.0, 2.0, 2.0, 12.0, 20.0),
            Self::stock("3W", 92.0, 6.0, 14.0, 9.0, 2.0, 2.0, 13.0, 40.0),
            Self::stock("5W", 84.0, 6.0, 15.0, 10.0, 2.0, 2.0, 17.0, 60.0),
            Self::stock("3I", 76.0, 5.0, 16.0, 11.0, 3.0, 3.0, 16.0, 50.0),
            Self::stock("4I", 74.0, 5.0, 17.0, 11.0, 3.0, 3.0, 19.0, 60.0),
            Self::stock("5I", 70.0, 5.0, 18.0, 12.0, 3.0, 3.0, 22.0, 70.0),
            Self::stock("6I", 66.0, 5.0, 19.0, 13.0, 3.0, 3.0, 25.0, 80.0),
            Self::stock("7I", 62.0, 5.0, 20.0, 13.0, 3.0, 3.0, 28.0, 90.0),
            Self::stock("8I", 58.0, 5.0, 21.0, 14.0, 3.0, 3.0, 32.0, 100.0),
            Self::stock("9I", 54.0, 5.0, 22.0, 15.0, 4.0, 4.0, 36.0, 110.0),
            Self::stock("PW", 48.0, 4.0, 23.0, 15.0, 4.0, 4.0, 44.0, 120.0),
            Self::stock("SW", 32.0, 3.0, 24.0, 16.0, 4.0, 4.0, 54.0, 140.0),
        ]
    }

    /// Nominal maximum distance in yards for a character using this club.
    #[must_use]
    pub fn max_distance(&self, character: &CharacterStats) -> f32 {
        let driver = BASE_DRIVER_YARDS + YARDS_PER_POWER_POINT * (character.power + self.power);
        (driver - self.distance_offset).max(0.0)
    }
}

/// Read access to the stats that modify a shot.
pub trait StatProvider {
    /// Current character stats.
    fn character_stats(&self) -> CharacterStats;

    /// Currently selected club, if any. `None` behaves as a neutral club.
    fn selected_club(&self) -> Option<ClubStats>;

    /// Nominal maximum distance in yards with the selected club.
    fn max_distance(&self) -> f32 {
        let club = self.selected_club().unwrap_or_default();
        club.max_distance(&self.character_stats())
    }
}

/// A character together with a bag of clubs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    /// Character stats
    pub character: CharacterStats,
    /// Clubs in the bag
    pub bag: Vec<ClubStats>,
    /// Index of the selected club in `bag`
    pub selected: usize,
}

impl Loadout {
    /// Creates a loadout with an empty bag.
    #[must_use]
    pub fn new(character: CharacterStats) -> Self {
        Self {
            character,
            bag: Vec::new(),
            selected: 0,
        }
    }

    /// Replaces the bag and selects its first club.
    #[must_use]
    pub fn with_bag(mut self, bag: Vec<ClubStats>) -> Self {
        self.bag = bag;
        self.selected = 0;
        self
    }

    /// Adds a club to the bag and selects it.
    #[must_use]
    pub fn with_club(mut self, club: ClubStats) -> Self {
        self.bag.push(club);
        self.selected = self.bag.len() - 1;
        self
    }

    /// Selects the next club, wrapping to the first.
    pub fn next_club(&mut self) -> Option<&ClubStats> {
        if self.bag.is_empty() {
            return None;
        }
        self.selected = (self.selected + 1) % self.bag.len();
        self.current_club()
    }

    /// Selects the previous club, wrapping to the last.
    pub fn prev_club(&mut self) -> Option<&ClubStats> {
        if self.bag.is_empty() {
            return None;
        }
        self.selected = match self.selected {
            0 => self.bag.len() - 1,
            index => (index - 1).min(self.bag.len() - 1),
        };
        self.current_club()
    }

    /// Selects a club by name. Returns `false` if the bag has no such club.
    pub fn select_club(&mut self, name: &str) -> bool {
        match self.bag.iter().position(|club| club.name == name) {
            Some(index) => {
                self.selected = index;
                true
            },
            None => false,
        }
    }

    /// The selected club. An out-of-range selection yields `None`.
    #[must_use]
    pub fn current_club(&self) -> Option<&ClubStats> {
        self.bag.get(self.selected)
    }

    /// Maximum distance of every club in the bag, in bag order.
    #[must_use]
    pub fn distances(&self) -> Vec<(&str, f32)> {
        self.bag
            .iter()
            .map(|club| (club.name.as_str(), club.max_distance(&self.character)))
            .collect()
    }
}

impl StatProvider for Loadout {
    fn character_stats(&self) -> CharacterStats {
        self.character
    }

    fn selected_club(&self) -> Option<ClubStats> {
        self.current_club().cloned()
    }
}

/// Combined character + club bonuses, snapshotted for one decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifiers {
    /// Club power + character power
    pub power: f32,
    /// Club power percentage (100 = neutral)
    pub club_power_percent: f32,
    /// Club loft angle in degrees
    pub loft_angle: f32,
    /// Club control + character control
    pub control: f32,
    /// Club accuracy + character accuracy
    pub accuracy: f32,
    /// Club spin + character spin
    pub spin: f32,
    /// Club curve + character curve
    pub curve: f32,
}

impl Default for StatModifiers {
    fn default() -> Self {
        Self::combine(&CharacterStats::default(), None)
    }
}

impl StatModifiers {
    /// Folds a character and an optional club into one snapshot.
    #[must_use]
    pub fn combine(character: &CharacterStats, club: Option<&ClubStats>) -> Self {
        let neutral = ClubStats::default();
        let club = club.unwrap_or(&neutral);
        Self {
            power: club.power + character.power,
            club_power_percent: club.power_percent,
            loft_angle: club.loft_angle,
            control: club.control + character.control,
            accuracy: club.accuracy + character.accuracy,
            spin: club.spin + character.spin,
            curve: club.curve + character.curve,
        }
    }

    /// Reads the provider and folds its stats into a snapshot.
    #[must_use]
    pub fn from_provider<P: StatProvider + ?Sized>(provider: &P) -> Self {
        let character = provider.character_stats();
        let club = provider.selected_club();
        if club.is_none() {
            trace!("No club selected, using neutral club stats");
        }
        Self::combine(&character, club.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_club_is_neutral() {
        let mods = StatModifiers::default();
        assert_eq!(mods.club_power_percent, 100.0);
        assert_eq!(mods.control, 0.0);
        assert_eq!(mods.spin, 0.0);
    }

    #[test]
    fn test_club_and_character_add() {
        let character = CharacterStats {
            power: 10.0,
            spin: 1.5,
            curve: 2.0,
            ..CharacterStats::default()
        };
        let club = ClubStats {
            power_percent: 110.0,
            spin: 0.5,
            curve: -1.0,
            ..ClubStats::default()
        };

        let mods = StatModifiers::combine(&character, Some(&club));
        assert_eq!(mods.power, 10.0);
        assert_eq!(mods.club_power_percent, 110.0);
        assert_eq!(mods.spin, 2.0);
        assert_eq!(mods.curve, 1.0);
    }

    #[test]
    fn test_loadout_deserializes_partial_club() {
        let loadout: Loadout = toml::from_str(
            r#"
            [character]
            control = 4.0

            [[bag]]
            name = "Driver"
            power_percent = 120.0
            "#,
        )
        .expect("valid loadout");

        assert_eq!(loadout.character.control, 4.0);
        assert_eq!(loadout.selected, 0);
        let club = loadout.selected_club().expect("club present");
        assert_eq!(club.name, "Driver");
        assert_eq!(club.power_percent, 120.0);
        assert_eq!(club.control, 0.0);
        assert_eq!(club.loft_angle, NEUTRAL_LOFT);
    }

    #[test]
    fn test_club_selection_wraps_both_ways() {
        let mut loadout = Loadout::default().with_bag(ClubStats::starter_bag());
        let last = loadout.bag.len() - 1;

        let club = loadout.prev_club().expect("bag not empty");
        assert_eq!(club.name, "SW");
        assert_eq!(loadout.selected, last);

        let club = loadout.next_club().expect("bag not empty");
        assert_eq!(club.name, "1W");
        assert_eq!(loadout.selected, 0);

        loadout.next_club();
        assert_eq!(loadout.selected_club().map(|club| club.name), Some("2W".to_string()));
    }

    #[test]
    fn test_empty_bag_selects_nothing() {
        let mut loadout = Loadout::default();
        assert!(loadout.next_club().is_none());
        assert!(loadout.prev_club().is_none());
        assert!(loadout.selected_club().is_none());
        assert!(!loadout.select_club("1W"));
        assert_eq!(loadout.max_distance(), BASE_DRIVER_YARDS);
    }

    #[test]
    fn test_out_of_range_selection_is_neutral() {
        let mut loadout = Loadout::default().with_bag(ClubStats::starter_bag());
        loadout.selected = 99;
        assert!(loadout.selected_club().is_none());
        assert_eq!(loadout.prev_club().map(|club| club.name.clone()), Some("SW".to_string()));
    }

    #[test]
    fn test_club_distances_follow_power() {
        let mut loadout = Loadout::new(CharacterStats {
            power: 14.0,
            ..CharacterStats::default()
        })
        .with_bag(ClubStats::starter_bag());

        // 200 + 2 * (14 + 6)
        assert_eq!(loadout.max_distance(), 240.0);
        assert!(loadout.select_club("3W"));
        assert_eq!(loadout.max_distance(), 200.0);
        assert!(loadout.select_club("3I"));
        assert_eq!(loadout.max_distance(), 188.0);

        let distances = loadout.distances();
        assert_eq!(distances.len(), loadout.bag.len());
        assert_eq!(distances[0], ("1W", 240.0));
        assert_eq!(distances.last(), Some(&("SW", 94.0)));
    }

    #[test]
    fn test_club_power_adds_to_character() {
        let loadout = Loadout::new(CharacterStats {
            power: 4.0,
            ..CharacterStats::default()
        })
        .with_bag(ClubStats::starter_bag());
        let mods = StatModifiers::from_provider(&loadout);
        assert_eq!(mods.power, 10.0);
        assert_eq!(mods.loft_angle, 10.0);
        assert_eq!(mods.control, 12.0);
    }
}
