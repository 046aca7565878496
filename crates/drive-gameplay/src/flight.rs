//! Ball flight control.
//!
//! The flight controller owns the ball's physics body during a shot. It
//! applies the launch, adds wind and Magnus forces while the ball is flying,
//! runs the per shot type phase machine (Spike and Tomahawk dive after the
//! apex, Cobra skims then rises), counts bounces and decides when the ball
//! has stopped.
//!
//! Between shots the body is locked on the tee; `in_air` is true exactly
//! while the body is unlocked.

use crossbeam_channel::Sender;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use drive_common::ShotType;

use crate::body::{ForceMode, PhysicsBody};
use crate::events::{publish_on, ShotEvent};
use crate::resolver::LaunchSpec;

/// Phase of the ball's flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightPhase {
    /// Locked on the tee, waiting for a launch
    #[default]
    Teed,
    /// Climbing toward the apex
    Ascending,
    /// Spike/Tomahawk post-apex dive
    Diving,
    /// Cobra's gravity-defying low skim
    Skimming,
    /// Cobra after its steep kick upward
    Rising,
    /// Touched down at least once, bouncing or rolling
    Landed,
    /// At rest and locked
    Stopped,
}

impl FlightPhase {
    /// Whether wind and Magnus forces are withheld in this phase.
    #[must_use]
    pub const fn suppresses_environment(self) -> bool {
        matches!(self, FlightPhase::Diving)
    }
}

/// Why the ball was put back on the tee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetReason {
    /// External request (player or game flow)
    Requested,
    /// Physics state went non-finite or out of bounds
    Unstable,
}

/// Outcome of a finished shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotSummary {
    /// Archetype of the shot
    pub shot_type: ShotType,
    /// Horizontal distance at first touchdown
    pub carry_distance: f32,
    /// Horizontal distance where the ball stopped
    pub total_distance: f32,
    /// Highest point reached
    pub max_height: f32,
    /// Number of ground contacts
    pub bounce_count: u32,
    /// Seconds from launch to stop
    pub flight_time: f32,
    /// Stopped by a rule (special landing, bounce ceiling) rather than coming to rest
    pub forced: bool,
}

/// Tuning for the flight controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Where the ball sits before each shot
    pub tee_position: Vec3,
    /// Gravity magnitude, used for Cobra's skim
    pub gravity: f32,
    /// Below this speed environmental forces are skipped
    pub low_speed_threshold: f32,
    /// Fraction of spin removed per step while the ball is slow
    pub angular_decay: f32,
    /// Spin below this is left alone
    pub spin_epsilon: f32,
    /// Constant wind force
    pub wind: Vec3,
    /// Magnus force per unit of `v x w`
    pub magnus_coefficient: f32,
    /// Magnus force magnitude cap
    pub max_magnus_force: f32,
    /// Speed multiplier when Spike/Tomahawk enter the dive
    pub dive_speed_multiplier: f32,
    /// Dive angle below the horizontal, in degrees
    pub dive_angle_deg: f32,
    /// Fraction of expected distance at which Cobra rises
    pub cobra_trigger_ratio: f32,
    /// Cobra rise angle above the horizontal, in degrees
    pub cobra_rise_angle_deg: f32,
    /// Speed multiplier when Cobra rises
    pub cobra_speed_multiplier: f32,
    /// Ground contacts after which the shot is force-stopped
    pub max_bounces: u32,
    /// Seconds after launch before stop detection runs
    pub stop_grace_period: f32,
    /// Linear speed under which the ball may count as stopped
    pub stop_linear_speed: f32,
    /// Angular speed under which the ball may count as stopped
    pub stop_angular_speed: f32,
    /// Lowest height that counts as on the ground
    pub ground_band_min: f32,
    /// Highest height that counts as on the ground
    pub ground_band_max: f32,
    /// Largest horizontal coordinate considered sane
    pub max_horizontal_extent: f32,
    /// Lowest height considered sane
    pub min_height: f32,
    /// Highest height considered sane
    pub max_height: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            tee_position: Vec3::new(0.0, 0.1, 0.0),
            gravity: 9.81,
            low_speed_threshold: 0.5,
            angular_decay: 0.02,
            spin_epsilon: 0.01,
            wind: Vec3::ZERO,
            magnus_coefficient: 0.04,
            max_magnus_force: 4.0,
            dive_speed_multiplier: 3.5,
            dive_angle_deg: 30.0,
            cobra_trigger_ratio: 0.667,
            cobra_rise_angle_deg: 68.0,
            cobra_speed_multiplier: 1.17,
            max_bounces: 10,
            stop_grace_period: 2.0,
            stop_linear_speed: 0.1,
            stop_angular_speed: 0.5,
            ground_band_min: -0.5,
            ground_band_max: 0.5,
            max_horizontal_extent: 5000.0,
            min_height: -100.0,
            max_height: 2000.0,
        }
    }
}

/// Per-shot flight bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightState {
    /// Ball is flying, bouncing or rolling (body unlocked)
    pub in_air: bool,
    /// Vertical velocity has turned from positive to non-positive
    pub apex_reached: bool,
    /// At least one ground contact this shot
    pub has_landed: bool,
    /// Ground contacts this shot
    pub bounce_count: u32,
    /// Seconds since launch
    pub flight_time: f32,
    /// Archetype of the current shot
    pub shot_type: ShotType,
    /// Current phase
    pub phase: FlightPhase,
    /// Where the shot was launched from
    pub launch_origin: Vec3,
    /// Expected carry for the launched power
    pub expected_distance: f32,
    /// Highest point reached
    pub max_height: f32,
    /// Horizontal distance at first touchdown
    pub carry_distance: Option<f32>,
    /// Cobra has already kicked upward
    pub cobra_triggered: bool,
    previous_vertical_velocity: f32,
}

impl Default for FlightState {
    fn default() -> Self {
        Self {
            in_air: false,
            apex_reached: false,
            has_landed: false,
            bounce_count: 0,
            flight_time: 0.0,
            shot_type: ShotType::Normal,
            phase: FlightPhase::Teed,
            launch_origin: Vec3::ZERO,
            expected_distance: 0.0,
            max_height: 0.0,
            carry_distance: None,
            cobra_triggered: false,
            previous_vertical_velocity: 0.0,
        }
    }
}

/// Drives a physics body through one shot at a time.
#[derive(Debug)]
pub struct FlightController<B: PhysicsBody> {
    config: FlightConfig,
    body: B,
    state: FlightState,
    forward: Vec3,
    events: Sender<ShotEvent>,
}

impl<B: PhysicsBody> FlightController<B> {
    /// Takes ownership of the body and places it on the tee.
    pub fn new(config: FlightConfig, body: B, events: Sender<ShotEvent>) -> Self {
        let mut controller = Self {
            config,
            body,
            state: FlightState::default(),
            forward: Vec3::Z,
            events,
        };
        controller.place_on_tee();
        controller
    }

    /// Current flight state.
    #[must_use]
    pub const fn state(&self) -> &FlightState {
        &self.state
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FlightConfig {
        &self.config
    }

    /// Returns the physics body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Mutable access to the physics body, for the owner of the physics step.
    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    /// Whether a shot is in progress.
    #[must_use]
    pub const fn is_in_air(&self) -> bool {
        self.state.in_air
    }

    /// Launches a shot. Ignored (returns `false`) while a shot is in progress.
    pub fn launch(&mut self, spec: &LaunchSpec) -> bool {
        if self.state.in_air {
            debug!("Launch of {} ignored, ball already in flight", spec.shot_type);
            return false;
        }

        let origin = self.body.position();
        self.state = FlightState {
            in_air: true,
            shot_type: spec.shot_type,
            phase: FlightPhase::Teed,
            launch_origin: origin,
            expected_distance: spec.expected_distance.max(0.0),
            max_height: origin.y,
            ..FlightState::default()
        };
        let flat = Vec3::new(spec.direction.x, 0.0, spec.direction.z).normalize_or_zero();
        self.forward = if flat == Vec3::ZERO { Vec3::Z } else { flat };

        self.body.unlock();
        self.body.set_linear_velocity(Vec3::ZERO);
        self.body.set_angular_velocity(Vec3::ZERO);
        self.body.apply_impulse(spec.impulse());
        self.body.apply_torque(spec.spin_torque, ForceMode::Impulse);

        info!(
            "Launched {} shot: impulse {:.2}, expected distance {:.1}",
            spec.shot_type, spec.impulse_magnitude, spec.expected_distance
        );
        publish_on(
            &self.events,
            ShotEvent::ShotStarted {
                shot_type: spec.shot_type,
            },
        );
        let phase = if spec.shot_type == ShotType::Cobra {
            FlightPhase::Skimming
        } else {
            FlightPhase::Ascending
        };
        self.set_phase(phase);
        true
    }

    /// Advances flight logic by one fixed physics step.
    pub fn fixed_update(&mut self, dt: f32) {
        if !self.state.in_air || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        if self.is_unstable() {
            warn!(
                "Ball physics became unstable at {:?}, resetting to tee",
                self.body.position()
            );
            self.reset_to_tee(ResetReason::Unstable);
            return;
        }

        self.state.flight_time += dt;
        let position = self.body.position();
        self.state.max_height = self.state.max_height.max(position.y);

        self.detect_apex();
        self.update_cobra();
        self.apply_environment();
        self.check_stop();
    }

    /// Handles a collision reported by the physics engine.
    pub fn on_collision(&mut self) {
        if !self.state.in_air || self.body.is_locked() {
            return;
        }

        self.state.bounce_count += 1;
        self.state.has_landed = true;
        if self.state.carry_distance.is_none() {
            self.state.carry_distance = Some(self.horizontal_distance());
        }
        debug!("Ground contact {}", self.state.bounce_count);
        publish_on(
            &self.events,
            ShotEvent::Landed {
                bounce_count: self.state.bounce_count,
            },
        );

        if self.state.shot_type.stops_on_landing() && self.state.apex_reached {
            debug!("{} landed after its apex, stopping dead", self.state.shot_type);
            self.stop(true);
            return;
        }
        if self.state.bounce_count >= self.config.max_bounces {
            debug!("Bounce ceiling {} reached", self.config.max_bounces);
            self.stop(true);
            return;
        }
        if self.state.phase != FlightPhase::Landed {
            self.set_phase(FlightPhase::Landed);
        }
    }

    /// Puts the ball back on the tee. Safe to call in any state.
    pub fn reset_to_tee(&mut self, reason: ResetReason) {
        info!("Resetting ball to tee ({reason:?})");
        self.place_on_tee();
        publish_on(&self.events, ShotEvent::BallReset { reason });
    }

    fn place_on_tee(&mut self) {
        self.body.unlock();
        self.body.set_linear_velocity(Vec3::ZERO);
        self.body.set_angular_velocity(Vec3::ZERO);
        self.body.set_position(self.config.tee_position);
        self.body.lock();
        self.state = FlightState::default();
    }

    fn set_phase(&mut self, phase: FlightPhase) {
        debug!("Flight phase {:?} -> {:?}", self.state.phase, phase);
        self.state.phase = phase;
        publish_on(&self.events, ShotEvent::PhaseChanged { phase });
    }

    fn horizontal_distance(&self) -> f32 {
        let delta = self.body.position() - self.state.launch_origin;
        Vec3::new(delta.x, 0.0, delta.z).length()
    }

    /// Horizontal travel direction, falling back to the launch direction.
    fn heading(&self) -> Vec3 {
        let velocity = self.body.linear_velocity();
        let flat = Vec3::new(velocity.x, 0.0, velocity.z).normalize_or_zero();
        if flat == Vec3::ZERO {
            self.forward
        } else {
            flat
        }
    }

    fn is_unstable(&self) -> bool {
        let position = self.body.position();
        let config = &self.config;
        !position.is_finite()
            || !self.body.linear_velocity().is_finite()
            || !self.body.angular_velocity().is_finite()
            || position.x.abs() > config.max_horizontal_extent
            || position.z.abs() > config.max_horizontal_extent
            || position.y < config.min_height
            || position.y > config.max_height
    }

    fn detect_apex(&mut self) {
        let vertical = self.body.linear_velocity().y;
        let previous = std::mem::replace(&mut self.state.previous_vertical_velocity, vertical);
        if self.state.apex_reached || !(previous > 0.0 && vertical <= 0.0) {
            return;
        }

        self.state.apex_reached = true;
        let height = self.body.position().y;
        debug!("Apex reached at height {height:.2}");
        publish_on(&self.events, ShotEvent::ApexReached { height });

        if self.state.shot_type.dives_after_apex() && self.state.phase == FlightPhase::Ascending {
            self.begin_dive();
        }
    }

    fn begin_dive(&mut self) {
        let angle = self.config.dive_angle_deg.to_radians();
        let direction = self.heading() * angle.cos() - Vec3::Y * angle.sin();
        let speed = self.body.linear_velocity().length() * self.config.dive_speed_multiplier;
        self.body.set_linear_velocity(direction * speed);
        self.body.set_angular_velocity(Vec3::ZERO);
        self.state.previous_vertical_velocity = direction.y * speed;
        self.set_phase(FlightPhase::Diving);
    }

    fn update_cobra(&mut self) {
        if self.state.phase != FlightPhase::Skimming {
            return;
        }

        let trigger = self.state.expected_distance * self.config.cobra_trigger_ratio;
        if self.state.cobra_triggered || self.horizontal_distance() < trigger {
            let lift = Vec3::Y * (self.config.gravity * self.body.mass());
            self.body.apply_force(lift);
            return;
        }

        self.state.cobra_triggered = true;
        let angle = self.config.cobra_rise_angle_deg.to_radians();
        let direction = self.heading() * angle.cos() + Vec3::Y * angle.sin();
        let speed = self.body.linear_velocity().length() * self.config.cobra_speed_multiplier;
        self.body.set_linear_velocity(direction * speed);
        self.state.previous_vertical_velocity = direction.y * speed;
        debug!(
            "Cobra rising after {:.1} of {:.1} expected distance",
            self.horizontal_distance(),
            self.state.expected_distance
        );
        self.set_phase(FlightPhase::Rising);
    }

    fn apply_environment(&mut self) {
        let velocity = self.body.linear_velocity();
        if velocity.length() < self.config.low_speed_threshold {
            let spin = self.body.angular_velocity();
            if spin.length() > self.config.spin_epsilon {
                self.body
                    .set_angular_velocity(spin * (1.0 - self.config.angular_decay));
            }
            return;
        }
        if self.state.has_landed || self.state.phase.suppresses_environment() {
            return;
        }

        let magnus = (velocity.cross(self.body.angular_velocity()) * self.config.magnus_coefficient)
            .clamp_length_max(self.config.max_magnus_force);
        self.body.apply_force(self.config.wind + magnus);
    }

    fn check_stop(&mut self) {
        if self.state.flight_time < self.config.stop_grace_period {
            return;
        }
        let height = self.body.position().y;
        let resting = self.body.linear_velocity().length() < self.config.stop_linear_speed
            && self.body.angular_velocity().length() < self.config.stop_angular_speed
            && (self.config.ground_band_min..=self.config.ground_band_max).contains(&height);
        if resting {
            self.stop(false);
        }
    }

    fn stop(&mut self, forced: bool) {
        self.body.set_linear_velocity(Vec3::ZERO);
        self.body.set_angular_velocity(Vec3::ZERO);
        self.body.lock();
        self.state.in_air = false;

        let total_distance = self.horizontal_distance();
        let summary = ShotSummary {
            shot_type: self.state.shot_type,
            carry_distance: self.state.carry_distance.unwrap_or(total_distance),
            total_distance,
            max_height: self.state.max_height,
            bounce_count: self.state.bounce_count,
            flight_time: self.state.flight_time,
            forced,
        };
        info!(
            "Ball stopped: {} shot, carry {:.1}, total {:.1}, {} bounces",
            summary.shot_type, summary.carry_distance, summary.total_distance, summary.bounce_count
        );
        self.set_phase(FlightPhase::Stopped);
        publish_on(&self.events, ShotEvent::ShotStopped(summary));
    }
}
