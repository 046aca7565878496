//! Rigid-body interface for the golf ball.
//!
//! The flight controller drives the ball exclusively through [`PhysicsBody`],
//! which abstracts whatever rigid-body engine the game runs on. [`SimpleBody`]
//! is a small self-integrating implementation (gravity, flat ground,
//! restitution, rolling friction) used by tests and the headless simulator.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How a torque is applied to the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceMode {
    /// Continuous torque, integrated over the next step
    Force,
    /// Instant change of angular momentum
    #[default]
    Impulse,
    /// Continuous angular acceleration, ignoring inertia
    Acceleration,
    /// Instant change of angular velocity, ignoring inertia
    VelocityChange,
}

/// Capabilities the shot engine needs from a rigid body.
///
/// Collisions are reported by the owner of the physics step calling
/// [`FlightController::on_collision`](crate::flight::FlightController::on_collision).
pub trait PhysicsBody {
    /// Applies an instantaneous linear impulse.
    fn apply_impulse(&mut self, impulse: Vec3);

    /// Applies a force for the next physics step.
    fn apply_force(&mut self, force: Vec3);

    /// Applies a torque in the given mode.
    fn apply_torque(&mut self, torque: Vec3, mode: ForceMode);

    /// Current linear velocity.
    fn linear_velocity(&self) -> Vec3;

    /// Overwrites the linear velocity.
    fn set_linear_velocity(&mut self, velocity: Vec3);

    /// Current angular velocity.
    fn angular_velocity(&self) -> Vec3;

    /// Overwrites the angular velocity.
    fn set_angular_velocity(&mut self, velocity: Vec3);

    /// Current position of the body's center.
    fn position(&self) -> Vec3;

    /// Teleports the body.
    fn set_position(&mut self, position: Vec3);

    /// Body mass.
    fn mass(&self) -> f32;

    /// Makes the body kinematic: it ignores forces until unlocked.
    fn lock(&mut self);

    /// Returns the body to dynamic simulation.
    fn unlock(&mut self);

    /// Whether the body is currently locked.
    fn is_locked(&self) -> bool;
}

/// A contact reported by a self-integrating body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Where the body touched down
    pub position: Vec3,
    /// Surface normal
    pub normal: Vec3,
    /// Speed into the surface at impact
    pub impact_speed: f32,
}

/// A body that advances its own simulation, for use without an external engine.
pub trait Integrate: PhysicsBody {
    /// Advances the body by `dt` seconds, returning a contact if it touched down.
    fn integrate(&mut self, dt: f32) -> Option<Contact>;
}

/// Tuning for [`SimpleBody`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Mass
    pub mass: f32,
    /// Collision radius
    pub radius: f32,
    /// Scalar moment of inertia
    pub inertia: f32,
    /// Gravity acceleration vector
    pub gravity: Vec3,
    /// Height of the ground plane
    pub ground_height: f32,
    /// Fraction of normal speed kept on a bounce
    pub restitution: f32,
    /// Impacts slower than this settle instead of bouncing
    pub settle_speed: f32,
    /// Horizontal deceleration while rolling on the ground
    pub rolling_deceleration: f32,
    /// Linear damping per second
    pub linear_damping: f32,
    /// Angular damping per second
    pub angular_damping: f32,
    /// Angular velocity kept per step while on the ground
    pub ground_spin_retention: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 0.1,
            inertia: 1.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            ground_height: 0.0,
            restitution: 0.45,
            settle_speed: 0.6,
            rolling_deceleration: 4.0,
            linear_damping: 0.1,
            angular_damping: 0.2,
            ground_spin_retention: 0.9,
        }
    }
}

/// Minimal rigid body with a flat ground plane.
#[derive(Debug, Clone)]
pub struct SimpleBody {
    config: BodyConfig,
    position: Vec3,
    velocity: Vec3,
    angular_velocity: Vec3,
    pending_force: Vec3,
    pending_torque: Vec3,
    locked: bool,
    grounded: bool,
}

impl Default for SimpleBody {
    fn default() -> Self {
        Self::new(BodyConfig::default())
    }
}

impl SimpleBody {
    /// Creates a body resting on the ground at the origin.
    #[must_use]
    pub fn new(config: BodyConfig) -> Self {
        let position = Vec3::new(0.0, config.ground_height + config.radius, 0.0);
        Self {
            config,
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            pending_force: Vec3::ZERO,
            pending_torque: Vec3::ZERO,
            locked: false,
            grounded: true,
        }
    }

    /// Returns the body configuration.
    #[must_use]
    pub const fn config(&self) -> &BodyConfig {
        &self.config
    }

    /// Whether the body is resting or rolling on the ground.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Height at which the body's center rests on the ground.
    #[must_use]
    pub fn rest_height(&self) -> f32 {
        self.config.ground_height + self.config.radius
    }

    fn apply_rolling_friction(&mut self, dt: f32) {
        let horizontal = Vec3::new(self.velocity.x, 0.0, self.velocity.z);
        let speed = horizontal.length();
        let drop = self.config.rolling_deceleration * dt;
        if drop >= speed {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
        } else {
            let scaled = horizontal * ((speed - drop) / speed);
            self.velocity.x = scaled.x;
            self.velocity.z = scaled.z;
        }
        self.angular_velocity *= self.config.ground_spin_retention;
    }
}

impl PhysicsBody for SimpleBody {
    fn apply_impulse(&mut self, impulse: Vec3) {
        if self.locked {
            return;
        }
        self.velocity += impulse / self.config.mass;
    }

    fn apply_force(&mut self, force: Vec3) {
        if self.locked {
            return;
        }
        self.pending_force += force;
    }

    fn apply_torque(&mut self, torque: Vec3, mode: ForceMode) {
        if self.locked {
            return;
        }
        match mode {
            ForceMode::Force => self.pending_torque += torque,
            ForceMode::Acceleration => self.pending_torque += torque * self.config.inertia,
            ForceMode::Impulse => self.angular_velocity += torque / self.config.inertia,
            ForceMode::VelocityChange => self.angular_velocity += torque,
        }
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.angular_velocity = velocity;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.grounded = position.y <= self.rest_height();
    }

    fn mass(&self) -> f32 {
        self.config.mass
    }

    fn lock(&mut self) {
        self.locked = true;
        self.pending_force = Vec3::ZERO;
        self.pending_torque = Vec3::ZERO;
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Integrate for SimpleBody {
    fn integrate(&mut self, dt: f32) -> Option<Contact> {
        let force = std::mem::take(&mut self.pending_force);
        let torque = std::mem::take(&mut self.pending_torque);
        if self.locked || !dt.is_finite() || dt <= 0.0 {
            return None;
        }

        self.velocity += (force / self.config.mass + self.config.gravity) * dt;
        self.angular_velocity += torque / self.config.inertia * dt;
        self.velocity *= (1.0 - self.config.linear_damping * dt).max(0.0);
        self.angular_velocity *= (1.0 - self.config.angular_damping * dt).max(0.0);
        self.position += self.velocity * dt;

        let floor = self.rest_height();
        if self.position.y > floor {
            self.grounded = false;
            return None;
        }

        self.position.y = floor;
        let mut contact = None;
        if self.velocity.y < 0.0 {
            let impact_speed = -self.velocity.y;
            if !self.grounded {
                contact = Some(Contact {
                    position: self.position,
                    normal: Vec3::Y,
                    impact_speed,
                });
            }
            self.velocity.y = if impact_speed > self.config.settle_speed {
                impact_speed * self.config.restitution
            } else {
                0.0
            };
        }

        self.grounded = self.velocity.y <= 0.0;
        if self.grounded {
            self.velocity.y = 0.0;
            self.apply_rolling_friction(dt);
        }
        contact
    }
}
