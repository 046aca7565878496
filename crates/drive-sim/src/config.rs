//! Simulator configuration.
//!
//! One TOML file holds the gameplay tuning, the reference ball body, the
//! golfer's loadout and the list of scripted shots to play.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

use drive_common::{ClubStats, ConfigError, DriveError, DriveResult, Loadout, ShotType};
use drive_gameplay::{BodyConfig, GameplayConfig, ImpactPoint};

/// Configuration file name.
pub const CONFIG_FILE: &str = "grand-drive.toml";

/// One swing the scripted golfer will play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedShot {
    /// Shot archetype
    pub shot_type: ShotType,
    /// Club-ball contact point
    pub impact: ImpactPoint,
    /// Aim, in degrees clockwise from +Z
    pub aim_yaw_deg: f32,
    /// Power to press at (0.0 - 1.0)
    pub power: f32,
    /// Where to press on the accuracy pass, relative to the zone center
    /// along the marker's travel (negative = early, positive = late)
    pub accuracy_offset: f32,
    /// Club to take from the bag; keeps the current club when unset
    pub club: Option<String>,
}

impl Default for ScriptedShot {
    fn default() -> Self {
        Self {
            shot_type: ShotType::Normal,
            impact: ImpactPoint::CENTER,
            aim_yaw_deg: 0.0,
            power: 1.0,
            accuracy_offset: 0.0,
            club: None,
        }
    }
}

/// Simulator configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Frame delta fed to the session, in seconds
    pub frame_dt: f32,
    /// Give up on a shot after this many simulated seconds
    pub max_shot_seconds: f32,
    /// Shot engine tuning
    pub gameplay: GameplayConfig,
    /// Reference ball body
    pub body: BodyConfig,
    /// Character and club
    pub loadout: Loadout,
    /// Shots to play, in order
    pub shots: Vec<ScriptedShot>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_dt: 1.0 / 60.0,
            max_shot_seconds: 120.0,
            gameplay: GameplayConfig::default(),
            body: BodyConfig::default(),
            loadout: Loadout::default().with_bag(ClubStats::starter_bag()),
            shots: ShotType::ALL
                .iter()
                .map(|&shot_type| ScriptedShot {
                    shot_type,
                    ..ScriptedShot::default()
                })
                .collect(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration from a specific path, reporting why it failed.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> DriveResult<Self> {
        let path = path.as_ref();

        let mut contents = String::new();
        fs::File::open(path)?.read_to_string(&mut contents)?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.shots.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "shots",
                reason: "at least one shot is required".to_string(),
            }
            .into());
        }

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> DriveResult<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| DriveError::Serialization(e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    ///
    /// The body's gravity is authoritative: the flight controller's skim
    /// lift is derived from its vertical component.
    pub fn validate(&mut self) {
        self.gameplay.validate();

        let body_gravity = -self.body.gravity.y;
        let flight_gravity = &mut self.gameplay.flight.gravity;
        if body_gravity.is_finite() && (*flight_gravity - body_gravity).abs() > 1e-4 {
            warn!(
                "Config gameplay.flight.gravity = {} disagrees with body gravity {}, using body",
                flight_gravity, body_gravity
            );
            *flight_gravity = body_gravity;
        }

        if !self.loadout.bag.is_empty() && self.loadout.selected >= self.loadout.bag.len() {
            warn!(
                "Config loadout.selected = {} out of range, selecting the first club",
                self.loadout.selected
            );
            self.loadout.selected = 0;
        }

        self.frame_dt = if self.frame_dt.is_finite() {
            self.frame_dt.clamp(0.001, 0.1)
        } else {
            1.0 / 60.0
        };
        self.max_shot_seconds = if self.max_shot_seconds.is_finite() {
            self.max_shot_seconds.clamp(5.0, 600.0)
        } else {
            120.0
        };

        for shot in &mut self.shots {
            shot.power = if shot.power.is_finite() {
                shot.power.clamp(0.0, 1.0)
            } else {
                1.0
            };
            shot.accuracy_offset = if shot.accuracy_offset.is_finite() {
                shot.accuracy_offset.clamp(-2.0, 2.0)
            } else {
                0.0
            };
            shot.impact = ImpactPoint::new(shot.impact.horizontal, shot.impact.vertical);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.shots.len(), 4);
        assert_eq!(config.shots[3].shot_type, ShotType::Cobra);
        assert!((config.frame_dt - 1.0 / 60.0).abs() < f32::EPSILON);
        let club = config.loadout.current_club().expect("starter bag");
        assert_eq!(club.name, "1W");
        assert!(config.shots.iter().all(|shot| shot.club.is_none()));
    }

    #[test]
    fn test_flight_gravity_follows_body() {
        let mut config = SimConfig::default();
        config.body.gravity = glam::Vec3::new(0.0, -1.62, 0.0);
        config.gameplay.flight.gravity = 9.81;

        config.validate();

        assert!((config.gameplay.flight.gravity - 1.62).abs() < 1e-6);

        let mut config = SimConfig::default();
        config.validate();
        assert!((config.gameplay.flight.gravity - 9.81).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_club_selection_is_reset() {
        let mut config = SimConfig::default();
        config.loadout.selected = 40;
        config.validate();
        assert_eq!(config.loadout.selected, 0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimConfig::default();
        config.frame_dt = 5.0;
        config.max_shot_seconds = f32::INFINITY;
        config.shots[0].power = 3.0;
        config.shots[1].impact = ImpactPoint {
            horizontal: -4.0,
            vertical: 0.5,
        };

        config.validate();

        assert!((config.frame_dt - 0.1).abs() < f32::EPSILON);
        assert!((config.max_shot_seconds - 120.0).abs() < f32::EPSILON);
        assert!((config.shots[0].power - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.shots[1].impact, ImpactPoint::new(-1.0, 0.5));
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        let mut config = SimConfig::default();
        config.gameplay.flight.max_bounces = 4;
        config.loadout = Loadout::default().with_club(ClubStats {
            name: "Driver".to_string(),
            control: 12.0,
            ..ClubStats::default()
        });
        config.shots.truncate(1);
        config.shots[0].accuracy_offset = -0.05;
        config.shots[0].club = Some("Driver".to_string());

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = SimConfig::load_from(&config_path);
        assert_eq!(loaded.gameplay, config.gameplay);
        assert_eq!(loaded.loadout, config.loadout);
        assert_eq!(loaded.shots, config.shots);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = SimConfig::load_from("/nonexistent/path/grand-drive.toml");
        assert_eq!(config.shots.len(), 4);
    }

    #[test]
    fn test_try_load_reports_parse_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "frame_dt = \"fast\"").expect("write config");

        let err = SimConfig::try_load_from(&config_path).expect_err("invalid type");
        assert!(matches!(err, DriveError::Config(ConfigError::Parse(_))));

        let fallback = SimConfig::load_from(&config_path);
        assert!((fallback.frame_dt - 1.0 / 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_try_load_rejects_empty_shot_list() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "shots = []").expect("write config");

        let err = SimConfig::try_load_from(&config_path).expect_err("no shots");
        assert!(matches!(
            err,
            DriveError::Config(ConfigError::InvalidValue { field: "shots", .. })
        ));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(
            &config_path,
            r#"
            [[shots]]
            shot_type = "tomahawk"
            power = 0.8

            [gameplay.flight]
            stop_grace_period = 1.5
            "#,
        )
        .expect("write config");

        let config = SimConfig::try_load_from(&config_path).expect("valid config");
        assert_eq!(config.shots.len(), 1);
        assert_eq!(config.shots[0].shot_type, ShotType::Tomahawk);
        assert_eq!(config.shots[0].impact, ImpactPoint::CENTER);
        assert!((config.gameplay.flight.stop_grace_period - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.gameplay.flight.max_bounces, 10);
    }
}
