//! Swing timing minigame.
//!
//! A three-press swing: the first press starts the power bar, the second
//! fixes power, the third fixes accuracy against a perfect zone. The marker
//! lives on a bar from -1 (left extreme) through 0 (reference point) to 1
//! (right extreme).
//!
//! Bar speed and zone width are recomputed from stats at the start of each
//! power and accuracy pass, since the loadout may change between shots.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use drive_common::StatModifiers;

use crate::events::{publish_on, ShotEvent};

/// States of the swing timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwingState {
    /// Waiting for the first press
    #[default]
    Ready,
    /// Power marker is moving
    PowerPhase,
    /// Accuracy marker is moving
    AccuracyPhase,
    /// Result is being computed (transient)
    Hitting,
    /// Waiting for the ball to stop
    Cooldown,
}

/// How the marker moves during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerMotion {
    /// Bounces between the extremes until the player presses
    PingPong,
    /// Runs once toward the far extreme
    SingleDirection,
}

/// Tuning for the swing timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingConfig {
    /// Marker motion while choosing power
    pub power_motion: MarkerMotion,
    /// Marker motion while choosing accuracy
    pub accuracy_motion: MarkerMotion,
    /// Marker position when the power phase starts
    pub power_start: f32,
    /// Bar speed in bar units per second before control bonuses
    pub base_bar_speed: f32,
    /// Lower bound on bar speed
    pub min_bar_speed: f32,
    /// Bar speed removed per point of control
    pub control_speed_coefficient: f32,
    /// Center of the perfect zone
    pub zone_center: f32,
    /// Zone half-width before accuracy bonuses
    pub base_half_width: f32,
    /// Zone half-width added per point of accuracy
    pub accuracy_width_coefficient: f32,
    /// Lower bound on the zone half-width
    pub min_half_width: f32,
    /// Upper bound on the zone half-width
    pub max_half_width: f32,
    /// Distance from center that still counts as perfect
    pub perfect_threshold: f32,
    /// Accuracy awarded when pressing before the zone
    pub early_accuracy: f32,
    /// Accuracy awarded when pressing after the zone
    pub late_accuracy: f32,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            power_motion: MarkerMotion::PingPong,
            accuracy_motion: MarkerMotion::SingleDirection,
            power_start: -1.0,
            base_bar_speed: 2.0,
            min_bar_speed: 0.5,
            control_speed_coefficient: 0.02,
            zone_center: 0.0,
            base_half_width: 0.12,
            accuracy_width_coefficient: 0.005,
            min_half_width: 0.04,
            max_half_width: 0.35,
            perfect_threshold: 0.03,
            early_accuracy: 0.3,
            late_accuracy: 0.2,
        }
    }
}

impl SwingConfig {
    /// Bar speed for the given stats.
    #[must_use]
    pub fn bar_speed(&self, mods: &StatModifiers) -> f32 {
        (self.base_bar_speed - mods.control * self.control_speed_coefficient)
            .max(self.min_bar_speed)
    }

    /// Perfect zone for the given stats.
    #[must_use]
    pub fn perfect_zone(&self, mods: &StatModifiers) -> PerfectZone {
        let half_width = (self.base_half_width + mods.accuracy * self.accuracy_width_coefficient)
            .max(self.min_half_width)
            .min(self.max_half_width);
        PerfectZone {
            center: self.zone_center.clamp(-1.0, 1.0),
            half_width,
        }
    }
}

/// Target window on the accuracy bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerfectZone {
    /// Zone center on the bar
    pub center: f32,
    /// Half of the zone width
    pub half_width: f32,
}

impl PerfectZone {
    /// Whether a marker position lies inside the zone.
    #[must_use]
    pub fn contains(&self, marker: f32) -> bool {
        (marker - self.center).abs() <= self.half_width
    }
}

/// Outcome of a completed swing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingResult {
    /// Selected power in `[0, 1]`
    pub power: f32,
    /// Timing accuracy in `[0, 1]`
    pub accuracy: f32,
    /// Marker stopped on the zone center
    pub is_perfect: bool,
}

/// Scores a press at `marker` while the marker travels in `direction`.
///
/// Returns `(accuracy, is_perfect)`. Outside the zone the accuracy is the
/// configured early value if the marker had not reached the center yet, and
/// the late value if it had already passed it.
#[must_use]
pub fn score_accuracy(
    config: &SwingConfig,
    zone: &PerfectZone,
    marker: f32,
    direction: f32,
) -> (f32, bool) {
    let offset = marker - zone.center;
    let distance = offset.abs();

    if zone.contains(marker) {
        let accuracy = (1.0 - distance / zone.half_width.max(f32::EPSILON)).clamp(0.0, 1.0);
        (accuracy, distance < config.perfect_threshold)
    } else if offset * direction < 0.0 {
        (config.early_accuracy, false)
    } else {
        (config.late_accuracy, false)
    }
}

/// Moves a marker back and forth between -1 and 1, folding any overshoot.
///
/// Returns the new position and direction.
fn ping_pong(position: f32, direction: f32, distance: f32) -> (f32, f32) {
    let unfolded = (position + direction * distance + 1.0).rem_euclid(4.0);
    if unfolded <= 2.0 {
        (unfolded - 1.0, direction)
    } else {
        (3.0 - unfolded, -direction)
    }
}

/// The swing timing state machine.
#[derive(Debug)]
pub struct SwingTimer {
    config: SwingConfig,
    state: SwingState,
    marker: f32,
    direction: f32,
    bar_speed: f32,
    zone: PerfectZone,
    selected_power: Option<f32>,
    last_result: Option<SwingResult>,
    events: Sender<ShotEvent>,
}

impl SwingTimer {
    /// Creates a timer in the `Ready` state.
    #[must_use]
    pub fn new(config: SwingConfig, events: Sender<ShotEvent>) -> Self {
        let mods = StatModifiers::default();
        let bar_speed = config.bar_speed(&mods);
        let zone = config.perfect_zone(&mods);
        let marker = config.power_start.clamp(-1.0, 1.0);
        Self {
            config,
            state: SwingState::Ready,
            marker,
            direction: 1.0,
            bar_speed,
            zone,
            selected_power: None,
            last_result: None,
            events,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SwingState {
        self.state
    }

    /// Current marker position in `[-1, 1]`.
    #[must_use]
    pub const fn marker(&self) -> f32 {
        self.marker
    }

    /// Direction the marker is travelling (+1 right, -1 left).
    #[must_use]
    pub const fn direction(&self) -> f32 {
        self.direction
    }

    /// Bar speed in effect for the current phase.
    #[must_use]
    pub const fn bar_speed(&self) -> f32 {
        self.bar_speed
    }

    /// Perfect zone in effect for the current phase.
    #[must_use]
    pub const fn zone(&self) -> PerfectZone {
        self.zone
    }

    /// Power captured by the second press, if any.
    #[must_use]
    pub const fn selected_power(&self) -> Option<f32> {
        self.selected_power
    }

    /// Result of the most recent completed swing.
    #[must_use]
    pub const fn last_result(&self) -> Option<SwingResult> {
        self.last_result
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SwingConfig {
        &self.config
    }

    /// Handles a press of the swing button.
    ///
    /// Returns `false` if the press was ignored in the current state.
    pub fn trigger(&mut self, mods: &StatModifiers) -> bool {
        match self.state {
            SwingState::Ready => {
                self.begin_power(mods);
                true
            },
            SwingState::PowerPhase => {
                let power = ((self.marker + 1.0) * 0.5).clamp(0.0, 1.0);
                self.capture_power(power, mods);
                true
            },
            SwingState::AccuracyPhase => {
                self.hit();
                true
            },
            SwingState::Hitting | SwingState::Cooldown => false,
        }
    }

    /// Advances the marker by `dt` seconds.
    pub fn tick(&mut self, dt: f32, mods: &StatModifiers) {
        let distance = self.bar_speed * dt;
        if !distance.is_finite() || distance <= 0.0 {
            return;
        }

        match self.state {
            SwingState::PowerPhase => match self.config.power_motion {
                MarkerMotion::PingPong => self.bounce(distance),
                MarkerMotion::SingleDirection => {
                    self.marker += self.direction * distance;
                    if self.marker >= 1.0 {
                        self.marker = 1.0;
                        debug!("Power marker saturated, capturing full power");
                        self.capture_power(1.0, mods);
                    }
                },
            },
            SwingState::AccuracyPhase => match self.config.accuracy_motion {
                MarkerMotion::PingPong => self.bounce(distance),
                MarkerMotion::SingleDirection => {
                    self.marker += self.direction * distance;
                    if self.marker * self.direction >= 1.0 {
                        self.marker = self.direction;
                        self.miss();
                    }
                },
            },
            SwingState::Ready | SwingState::Hitting | SwingState::Cooldown => {},
        }

        self.marker = self.marker.clamp(-1.0, 1.0);
    }

    /// Signals that the ball stopped; re-arms the timer from `Cooldown`.
    pub fn on_ball_stopped(&mut self) {
        if self.state == SwingState::Cooldown {
            self.selected_power = None;
            self.marker = self.config.power_start.clamp(-1.0, 1.0);
            self.set_state(SwingState::Ready);
        }
    }

    /// Returns to `Ready` from any state, discarding a swing in progress.
    pub fn reset(&mut self) {
        self.selected_power = None;
        self.marker = self.config.power_start.clamp(-1.0, 1.0);
        self.direction = 1.0;
        if self.state != SwingState::Ready {
            self.set_state(SwingState::Ready);
        }
    }

    fn set_state(&mut self, state: SwingState) {
        debug!("Swing state {:?} -> {:?}", self.state, state);
        self.state = state;
        publish_on(&self.events, ShotEvent::SwingStateChanged { state });
    }

    fn bounce(&mut self, distance: f32) {
        let (marker, direction) = ping_pong(self.marker, self.direction, distance);
        self.marker = marker;
        self.direction = direction;
    }

    fn begin_power(&mut self, mods: &StatModifiers) {
        self.bar_speed = self.config.bar_speed(mods);
        self.zone = self.config.perfect_zone(mods);
        self.marker = self.config.power_start.clamp(-1.0, 1.0);
        self.direction = 1.0;
        self.selected_power = None;
        self.set_state(SwingState::PowerPhase);
    }

    fn capture_power(&mut self, power: f32, mods: &StatModifiers) {
        self.selected_power = Some(power);
        self.bar_speed = self.config.bar_speed(mods);
        self.zone = self.config.perfect_zone(mods);
        self.direction = if self.zone.center > self.marker {
            1.0
        } else {
            -1.0
        };
        debug!(
            "Power {power:.3} captured, bar speed {:.3}, zone half-width {:.3}",
            self.bar_speed, self.zone.half_width
        );
        self.set_state(SwingState::AccuracyPhase);
    }

    fn hit(&mut self) {
        self.set_state(SwingState::Hitting);

        let (accuracy, is_perfect) =
            score_accuracy(&self.config, &self.zone, self.marker, self.direction);
        let result = SwingResult {
            power: self.selected_power.unwrap_or(0.0),
            accuracy,
            is_perfect,
        };
        info!(
            "Swing complete: power {:.3}, accuracy {:.3}, perfect {}",
            result.power, result.accuracy, result.is_perfect
        );
        self.last_result = Some(result);
        publish_on(&self.events, ShotEvent::SwingComplete(result));

        self.set_state(SwingState::Cooldown);
    }

    fn miss(&mut self) {
        info!("Accuracy marker ran off the bar, swing missed");
        self.selected_power = None;
        publish_on(&self.events, ShotEvent::SwingMissed);
        self.set_state(SwingState::Ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;

    fn timer(config: SwingConfig) -> (SwingTimer, EventBus) {
        let bus = EventBus::new(64);
        (SwingTimer::new(config, bus.sender()), bus)
    }

    fn stats(control: f32, accuracy: f32) -> StatModifiers {
        StatModifiers {
            control,
            accuracy,
            ..StatModifiers::default()
        }
    }

    #[test]
    fn test_bar_speed_scenario() {
        let config = SwingConfig {
            base_bar_speed: 2.0,
            control_speed_coefficient: 0.02,
            ..SwingConfig::default()
        };
        let speed = config.bar_speed(&stats(12.0, 0.0));
        assert!((speed - 1.76).abs() < 1e-6);
    }

    #[test]
    fn test_bar_speed_floor() {
        let config = SwingConfig::default();
        assert_eq!(config.bar_speed(&stats(1000.0, 0.0)), config.min_bar_speed);
    }

    #[test]
    fn test_zone_width_clamped() {
        let config = SwingConfig::default();
        assert_eq!(
            config.perfect_zone(&stats(0.0, 10_000.0)).half_width,
            config.max_half_width
        );
        assert_eq!(
            config.perfect_zone(&stats(0.0, -10_000.0)).half_width,
            config.min_half_width
        );
        let zone = config.perfect_zone(&stats(0.0, 8.0));
        assert!((zone.half_width - 0.16).abs() < 1e-6);
    }

    #[test]
    fn test_full_swing_sequence() {
        let (mut timer, bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();

        assert!(timer.trigger(&mods));
        assert_eq!(timer.state(), SwingState::PowerPhase);
        assert_eq!(timer.marker(), -1.0);

        // 0.75 s at 2.0/s moves the marker from -1 to 0.5
        timer.tick(0.75, &mods);
        assert!((timer.marker() - 0.5).abs() < 1e-5);
        assert!(timer.trigger(&mods));
        assert_eq!(timer.state(), SwingState::AccuracyPhase);
        let power = timer.selected_power().expect("power captured");
        assert!((power - 0.75).abs() < 1e-5);
        assert_eq!(timer.direction(), -1.0);

        // Back to the zone center
        timer.tick(0.25, &mods);
        assert!(timer.marker().abs() < 1e-5);
        assert!(timer.trigger(&mods));
        assert_eq!(timer.state(), SwingState::Cooldown);

        let result = timer.last_result().expect("swing result");
        assert!((result.power - 0.75).abs() < 1e-5);
        assert!(result.accuracy > 0.99);
        assert!(result.is_perfect);

        let events = bus.drain();
        assert!(events.contains(&ShotEvent::SwingComplete(result)));
        assert_eq!(
            events.last(),
            Some(&ShotEvent::SwingStateChanged {
                state: SwingState::Cooldown
            })
        );
    }

    #[test]
    fn test_hitting_state_is_announced_before_result() {
        let (mut timer, bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.trigger(&mods);
        bus.drain();
        timer.trigger(&mods);

        let events = bus.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ShotEvent::SwingStateChanged {
                state: SwingState::Hitting
            }
        );
        assert!(matches!(events[1], ShotEvent::SwingComplete(_)));
    }

    #[test]
    fn test_presses_ignored_in_cooldown() {
        let (mut timer, _bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.trigger(&mods);
        timer.trigger(&mods);
        assert_eq!(timer.state(), SwingState::Cooldown);
        assert!(!timer.trigger(&mods));
        assert_eq!(timer.state(), SwingState::Cooldown);

        timer.on_ball_stopped();
        assert_eq!(timer.state(), SwingState::Ready);
    }

    #[test]
    fn test_ball_stopped_outside_cooldown_is_ignored() {
        let (mut timer, _bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.on_ball_stopped();
        assert_eq!(timer.state(), SwingState::PowerPhase);
    }

    #[test]
    fn test_single_direction_accuracy_miss() {
        let (mut timer, bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.tick(0.5, &mods);
        timer.trigger(&mods);
        bus.drain();

        // Marker at 0 heading left; half a second more reaches -1
        timer.tick(0.4, &mods);
        assert_eq!(timer.state(), SwingState::AccuracyPhase);
        timer.tick(0.2, &mods);
        assert_eq!(timer.state(), SwingState::Ready);
        assert_eq!(timer.selected_power(), None);
        assert!(timer.last_result().is_none());

        let events = bus.drain();
        assert_eq!(
            events,
            vec![
                ShotEvent::SwingMissed,
                ShotEvent::SwingStateChanged {
                    state: SwingState::Ready
                },
            ]
        );
    }

    #[test]
    fn test_ping_pong_accuracy_never_misses() {
        let config = SwingConfig {
            accuracy_motion: MarkerMotion::PingPong,
            ..SwingConfig::default()
        };
        let (mut timer, _bus) = timer(config);
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.trigger(&mods);
        for _ in 0..100 {
            timer.tick(0.13, &mods);
            assert_eq!(timer.state(), SwingState::AccuracyPhase);
        }
    }

    #[test]
    fn test_single_direction_power_autocaptures() {
        let config = SwingConfig {
            power_motion: MarkerMotion::SingleDirection,
            ..SwingConfig::default()
        };
        let (mut timer, _bus) = timer(config);
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.tick(5.0, &mods);
        assert_eq!(timer.state(), SwingState::AccuracyPhase);
        assert_eq!(timer.selected_power(), Some(1.0));
        assert_eq!(timer.marker(), 1.0);
        assert_eq!(timer.direction(), -1.0);
    }

    #[test]
    fn test_ping_pong_power_reflects() {
        let (mut timer, _bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        // 1.25 s at 2.0/s: -1 -> 1 then back to 0.5
        timer.tick(1.25, &mods);
        assert!((timer.marker() - 0.5).abs() < 1e-5);
        assert_eq!(timer.direction(), -1.0);
        assert_eq!(timer.state(), SwingState::PowerPhase);
    }

    #[test]
    fn test_early_and_late_scoring() {
        let config = SwingConfig::default();
        let zone = PerfectZone {
            center: 0.0,
            half_width: 0.1,
        };

        // Moving left, still right of the zone: early
        assert_eq!(score_accuracy(&config, &zone, 0.5, -1.0), (0.3, false));
        // Moving left, already left of the zone: late
        assert_eq!(score_accuracy(&config, &zone, -0.5, -1.0), (0.2, false));
        // Moving right mirrors it
        assert_eq!(score_accuracy(&config, &zone, -0.5, 1.0), (0.3, false));

        let (accuracy, perfect) = score_accuracy(&config, &zone, 0.05, -1.0);
        assert!((accuracy - 0.5).abs() < 1e-5);
        assert!(!perfect);
    }

    #[test]
    fn test_fallback_accuracies_are_configurable() {
        let config = SwingConfig {
            early_accuracy: 0.45,
            late_accuracy: 0.05,
            ..SwingConfig::default()
        };
        let zone = config.perfect_zone(&StatModifiers::default());
        assert_eq!(score_accuracy(&config, &zone, 0.9, -1.0).0, 0.45);
        assert_eq!(score_accuracy(&config, &zone, -0.9, -1.0).0, 0.05);
    }

    #[test]
    fn test_zone_recomputed_for_accuracy_phase() {
        let (mut timer, _bus) = timer(SwingConfig::default());
        timer.trigger(&stats(0.0, 0.0));
        let narrow = timer.zone().half_width;
        timer.trigger(&stats(10.0, 20.0));
        assert!(timer.zone().half_width > narrow);
        assert!(timer.bar_speed() < 2.0);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let (mut timer, _bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.tick(f32::NAN, &mods);
        timer.tick(-1.0, &mods);
        timer.tick(f32::INFINITY, &mods);
        assert_eq!(timer.marker(), -1.0);
    }

    #[test]
    fn test_reset_from_any_state() {
        let (mut timer, _bus) = timer(SwingConfig::default());
        let mods = StatModifiers::default();
        timer.trigger(&mods);
        timer.tick(0.3, &mods);
        timer.trigger(&mods);
        timer.reset();
        assert_eq!(timer.state(), SwingState::Ready);
        assert_eq!(timer.selected_power(), None);
        assert_eq!(timer.marker(), -1.0);
    }
}
