//! Gameplay tuning.
//!
//! Every shot engine parameter lives in [`GameplayConfig`], grouped into one
//! table per component. All tables are serde-deserializable with defaults
//! for missing keys, so partial TOML files are valid.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::flight::FlightConfig;
use crate::resolver::ResolverConfig;
use crate::swing::SwingConfig;

/// Frame loop tuning for [`ShotSession`](crate::session::ShotSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed physics step in seconds
    pub fixed_dt: f32,
    /// Fixed steps allowed per frame before the backlog is dropped
    pub max_steps_per_frame: u32,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 10,
            event_capacity: 256,
        }
    }
}

/// All shot engine tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Swing timer
    pub swing: SwingConfig,
    /// Shot resolver
    pub resolver: ResolverConfig,
    /// Flight controller
    pub flight: FlightConfig,
    /// Frame loop
    pub session: SessionConfig,
}

/// Clamps `value` into `[min, max]`, logging when it had to move.
fn clamp_logged(field: &str, value: &mut f32, min: f32, max: f32) {
    let clamped = if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    };
    if clamped != *value {
        warn!("Config value {field} = {value} out of range, using {clamped}");
        *value = clamped;
    }
}

impl GameplayConfig {
    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        let swing = &mut self.swing;
        clamp_logged("swing.power_start", &mut swing.power_start, -1.0, 0.0);
        clamp_logged("swing.base_bar_speed", &mut swing.base_bar_speed, 0.05, 20.0);
        clamp_logged("swing.min_bar_speed", &mut swing.min_bar_speed, 0.05, 20.0);
        clamp_logged("swing.zone_center", &mut swing.zone_center, -1.0, 1.0);
        clamp_logged("swing.min_half_width", &mut swing.min_half_width, 0.01, 1.0);
        let min_half_width = swing.min_half_width;
        clamp_logged("swing.max_half_width", &mut swing.max_half_width, min_half_width, 1.0);
        clamp_logged("swing.perfect_threshold", &mut swing.perfect_threshold, 0.0, 1.0);
        clamp_logged("swing.early_accuracy", &mut swing.early_accuracy, 0.0, 1.0);
        clamp_logged("swing.late_accuracy", &mut swing.late_accuracy, 0.0, 1.0);

        let resolver = &mut self.resolver;
        clamp_logged("resolver.base_power_multiplier", &mut resolver.base_power_multiplier, 0.0, 1000.0);
        clamp_logged("resolver.perfect_bonus", &mut resolver.perfect_bonus, 1.0, 2.0);
        clamp_logged(
            "resolver.target_distance_for_power100",
            &mut resolver.target_distance_for_power100,
            0.0,
            2000.0,
        );
        clamp_logged("resolver.spin_multiplier", &mut resolver.spin_multiplier, 0.0, 100.0);
        clamp_logged("resolver.max_launch_angle_deg", &mut resolver.max_launch_angle_deg, 0.0, 90.0);

        let flight = &mut self.flight;
        clamp_logged("flight.angular_decay", &mut flight.angular_decay, 0.0, 1.0);
        clamp_logged("flight.max_magnus_force", &mut flight.max_magnus_force, 0.0, 1000.0);
        clamp_logged("flight.dive_speed_multiplier", &mut flight.dive_speed_multiplier, 0.0, 10.0);
        clamp_logged("flight.dive_angle_deg", &mut flight.dive_angle_deg, 0.0, 90.0);
        clamp_logged("flight.cobra_trigger_ratio", &mut flight.cobra_trigger_ratio, 0.0, 1.0);
        clamp_logged("flight.cobra_rise_angle_deg", &mut flight.cobra_rise_angle_deg, 0.0, 90.0);
        clamp_logged("flight.cobra_speed_multiplier", &mut flight.cobra_speed_multiplier, 0.0, 10.0);
        clamp_logged("flight.stop_grace_period", &mut flight.stop_grace_period, 1.0, 3.0);
        if flight.max_bounces == 0 {
            warn!("Config value flight.max_bounces = 0 out of range, using 1");
            flight.max_bounces = 1;
        }
        if flight.ground_band_min > flight.ground_band_max {
            warn!(
                "Config ground band [{}, {}] is inverted, swapping",
                flight.ground_band_min, flight.ground_band_max
            );
            std::mem::swap(&mut flight.ground_band_min, &mut flight.ground_band_max);
        }

        let session = &mut self.session;
        clamp_logged("session.fixed_dt", &mut session.fixed_dt, 0.001, 0.1);
        session.max_steps_per_frame = session.max_steps_per_frame.clamp(1, 60);
        session.event_capacity = session.event_capacity.max(16);
    }
}
