//! Shot archetypes.
//!
//! `ShotType` is defined once here. The swing session, the resolver and the
//! flight controller all reference this definition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A selectable shot archetype.
///
/// Special shots override ordinary ballistic flight at a specific phase:
/// Spike and Tomahawk dive after the apex and stop dead on landing, Cobra
/// skims low and then kicks upward part way to its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    /// Ordinary ballistic shot
    #[default]
    Normal,
    /// High launch, steep fast dive after the apex, dead stop on landing
    Spike,
    /// Like Spike with a different launch calibration
    Tomahawk,
    /// Low gravity-defying skim followed by a steep rise
    Cobra,
}

impl ShotType {
    /// Every shot type, in menu order.
    pub const ALL: [ShotType; 4] = [
        ShotType::Normal,
        ShotType::Spike,
        ShotType::Tomahawk,
        ShotType::Cobra,
    ];

    /// Lowercase name used in config files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ShotType::Normal => "normal",
            ShotType::Spike => "spike",
            ShotType::Tomahawk => "tomahawk",
            ShotType::Cobra => "cobra",
        }
    }

    /// Returns true for Spike, Tomahawk and Cobra.
    #[must_use]
    pub const fn is_special(self) -> bool {
        !matches!(self, ShotType::Normal)
    }

    /// Returns true if the shot re-aims into a dive once the apex is reached.
    #[must_use]
    pub const fn dives_after_apex(self) -> bool {
        matches!(self, ShotType::Spike | ShotType::Tomahawk)
    }

    /// Returns true if the first landing after the apex ends the shot.
    #[must_use]
    pub const fn stops_on_landing(self) -> bool {
        self.dives_after_apex()
    }
}

impl fmt::Display for ShotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShotType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ShotType::ALL
            .into_iter()
            .find(|shot| shot.name() == lowered)
            .ok_or_else(|| ConfigError::UnknownShotType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_flags() {
        assert!(!ShotType::Normal.is_special());
        assert!(ShotType::Cobra.is_special());
        assert!(!ShotType::Cobra.dives_after_apex());
        assert!(ShotType::Spike.stops_on_landing());
        assert!(ShotType::Tomahawk.stops_on_landing());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("  Tomahawk ".parse::<ShotType>().ok(), Some(ShotType::Tomahawk));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "chip".parse::<ShotType>().expect_err("chip is not a shot type");
        assert!(matches!(err, ConfigError::UnknownShotType(name) if name == "chip"));
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(ShotType::Spike.to_string(), "spike");
    }
}
