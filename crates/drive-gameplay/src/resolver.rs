//! Shot parameter resolution.
//!
//! Turns a swing result, an impact point and a shot type into the launch
//! parameters for the flight controller. Resolution is a pure function of its
//! inputs: the same request always yields a bit-identical [`LaunchSpec`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use drive_common::{ShotType, StatModifiers, NEUTRAL_LOFT};

use crate::swing::SwingResult;

/// Launch calibration for one shot type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotProfile {
    /// Launch angle above the horizontal, in degrees
    pub launch_angle_deg: f32,
    /// Impulse multiplier for this shot type
    pub power_modifier: f32,
    /// Compensates for drag and other losses that make impulse-to-distance
    /// non-linear at high multipliers. Tuned separately from `power_modifier`.
    pub distance_scale: f32,
}

impl ShotProfile {
    /// Built-in calibration, used when a config table omits a shot type.
    ///
    /// Spike and Tomahawk launch steeply and need more impulse to match
    /// Normal's range; Cobra launches flat and needs extra impulse to skim
    /// the same distance.
    #[must_use]
    pub const fn builtin(shot_type: ShotType) -> Self {
        match shot_type {
            ShotType::Normal => Self {
                launch_angle_deg: 30.0,
                power_modifier: 1.0,
                distance_scale: 1.0,
            },
            ShotType::Spike => Self {
                launch_angle_deg: 50.0,
                power_modifier: 1.35,
                distance_scale: 1.15,
            },
            ShotType::Tomahawk => Self {
                launch_angle_deg: 40.0,
                power_modifier: 1.25,
                distance_scale: 1.1,
            },
            ShotType::Cobra => Self {
                launch_angle_deg: 6.0,
                power_modifier: 1.2,
                distance_scale: 1.1,
            },
        }
    }
}

/// Per shot type calibration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotTable {
    /// Normal shot
    pub normal: Option<ShotProfile>,
    /// Spike shot
    pub spike: Option<ShotProfile>,
    /// Tomahawk shot
    pub tomahawk: Option<ShotProfile>,
    /// Cobra shot
    pub cobra: Option<ShotProfile>,
}

impl Default for ShotTable {
    fn default() -> Self {
        Self {
            normal: Some(ShotProfile::builtin(ShotType::Normal)),
            spike: Some(ShotProfile::builtin(ShotType::Spike)),
            tomahawk: Some(ShotProfile::builtin(ShotType::Tomahawk)),
            cobra: Some(ShotProfile::builtin(ShotType::Cobra)),
        }
    }
}

impl ShotTable {
    /// Profile for a shot type, falling back to the built-in calibration.
    #[must_use]
    pub fn profile(&self, shot_type: ShotType) -> ShotProfile {
        let entry = match shot_type {
            ShotType::Normal => self.normal,
            ShotType::Spike => self.spike,
            ShotType::Tomahawk => self.tomahawk,
            ShotType::Cobra => self.cobra,
        };
        entry.unwrap_or_else(|| {
            debug!("No profile configured for {shot_type}, using built-in calibration");
            ShotProfile::builtin(shot_type)
        })
    }

    /// Mutable access to the entry for a shot type.
    pub fn entry_mut(&mut self, shot_type: ShotType) -> &mut Option<ShotProfile> {
        match shot_type {
            ShotType::Normal => &mut self.normal,
            ShotType::Spike => &mut self.spike,
            ShotType::Tomahawk => &mut self.tomahawk,
            ShotType::Cobra => &mut self.cobra,
        }
    }
}

/// Tuning for shot resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Impulse at full power before shot modifiers
    pub base_power_multiplier: f32,
    /// Multiplier applied to final power on a perfect swing (capped at 1.0)
    pub perfect_bonus: f32,
    /// Distance a full-power shot is expected to travel
    pub target_distance_for_power100: f32,
    /// Spin torque per unit of impact offset
    pub spin_multiplier: f32,
    /// Spin torque added per point of spin stat
    pub spin_stat_coefficient: f32,
    /// Sidespin amplification per point of curve stat
    pub curve_stat_coefficient: f32,
    /// Impulse gain per point of power stat
    pub power_stat_coefficient: f32,
    /// Club loft at which the launch angle is left unchanged
    pub reference_loft_deg: f32,
    /// Launch angle change per degree of loft above the reference
    pub loft_angle_coefficient: f32,
    /// Steepest launch angle any club or shot may produce
    pub max_launch_angle_deg: f32,
    /// Per shot type calibration
    pub shots: ShotTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_power_multiplier: 45.0,
            perfect_bonus: 1.10,
            target_distance_for_power100: 180.0,
            spin_multiplier: 5.0,
            spin_stat_coefficient: 0.05,
            curve_stat_coefficient: 0.02,
            power_stat_coefficient: 0.005,
            reference_loft_deg: NEUTRAL_LOFT,
            loft_angle_coefficient: 0.25,
            max_launch_angle_deg: 85.0,
            shots: ShotTable::default(),
        }
    }
}

/// Where the club met the ball, as an offset from its center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactPoint {
    /// Left (-1) to right (1)
    pub horizontal: f32,
    /// Below (-1) to above (1)
    pub vertical: f32,
}

impl ImpactPoint {
    /// Dead center.
    pub const CENTER: Self = Self {
        horizontal: 0.0,
        vertical: 0.0,
    };

    /// Creates an impact point, clamping both axes to `[-1, 1]`.
    #[must_use]
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal: signed_unit(horizontal),
            vertical: signed_unit(vertical),
        }
    }
}

/// Everything the player decided for one shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    /// Swing outcome
    pub swing: SwingResult,
    /// Club contact point
    pub impact: ImpactPoint,
    /// Selected archetype
    pub shot_type: ShotType,
    /// Aim direction; only the horizontal part is used
    pub forward: Vec3,
}

/// Launch parameters for one shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Unit launch direction
    pub direction: Vec3,
    /// Impulse magnitude along `direction`
    pub impulse_magnitude: f32,
    /// Spin torque, applied as an impulse
    pub spin_torque: Vec3,
    /// Archetype driving the flight phases
    pub shot_type: ShotType,
    /// Expected carry, used to time Cobra's rise
    pub expected_distance: f32,
    /// Power after accuracy and perfect bonus
    pub final_power: f32,
    /// Whether the swing was perfect
    pub is_perfect: bool,
}

impl LaunchSpec {
    /// Launch impulse vector.
    #[must_use]
    pub fn impulse(&self) -> Vec3 {
        self.direction * self.impulse_magnitude
    }
}

fn unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn signed_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Power after accuracy and the capped perfect bonus.
#[must_use]
pub fn final_power(swing: &SwingResult, perfect_bonus: f32) -> f32 {
    let power = unit(swing.power) * unit(swing.accuracy);
    if swing.is_perfect {
        (power * perfect_bonus).min(1.0)
    } else {
        power
    }
}

/// Horizontal unit forward, defaulting to +Z when the aim is vertical or invalid.
fn horizontal_forward(forward: Vec3) -> Vec3 {
    let flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    if flat == Vec3::ZERO || !flat.is_finite() {
        Vec3::Z
    } else {
        flat
    }
}

/// Launch angle for a profile once the club's loft is taken into account.
#[must_use]
pub fn launch_angle(profile: &ShotProfile, loft_angle: f32, config: &ResolverConfig) -> f32 {
    let offset = (loft_angle - config.reference_loft_deg) * config.loft_angle_coefficient;
    let offset = if offset.is_finite() { offset } else { 0.0 };
    (profile.launch_angle_deg + offset).clamp(0.0, config.max_launch_angle_deg.max(0.0))
}

/// Resolves a shot request into launch parameters.
#[must_use]
pub fn resolve_shot(
    request: &ShotRequest,
    mods: &StatModifiers,
    config: &ResolverConfig,
) -> LaunchSpec {
    let final_power = final_power(&request.swing, config.perfect_bonus);
    let profile = config.shots.profile(request.shot_type);

    let power_scale = (mods.club_power_percent / 100.0)
        * (1.0 + mods.power * config.power_stat_coefficient);
    let power_scale = if power_scale.is_finite() {
        power_scale.max(0.0)
    } else {
        1.0
    };
    let impulse_magnitude = final_power
        * config.base_power_multiplier
        * profile.power_modifier
        * profile.distance_scale
        * power_scale;

    let forward = horizontal_forward(request.forward);
    let angle = launch_angle(&profile, mods.loft_angle, config).to_radians();
    let direction = (forward * angle.cos() + Vec3::Y * angle.sin()).normalize_or_zero();

    // Ball-local frame: x = right, y = up. Below-center contact spins around
    // +right, which the Magnus term turns into lift.
    let right = Vec3::Y.cross(forward);
    let impact = ImpactPoint::new(request.impact.horizontal, request.impact.vertical);
    let spin_bonus = mods.spin * config.spin_stat_coefficient;
    let curve_gain = 1.0 + mods.curve * config.curve_stat_coefficient;
    let spin_torque = (right * -impact.vertical + Vec3::Y * (impact.horizontal * curve_gain))
        * (config.spin_multiplier + spin_bonus);

    let spec = LaunchSpec {
        direction,
        impulse_magnitude,
        spin_torque,
        shot_type: request.shot_type,
        expected_distance: final_power * config.target_distance_for_power100,
        final_power,
        is_perfect: request.swing.is_perfect,
    };
    debug!(
        "Resolved {} shot: final power {:.3}, impulse {:.2}, expected distance {:.1}",
        spec.shot_type, spec.final_power, spec.impulse_magnitude, spec.expected_distance
    );
    spec
}
