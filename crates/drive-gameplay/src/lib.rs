//! # Drive Gameplay
//!
//! The Grand Drive shot engine.
//!
//! This crate turns a timed three-press swing into a flying, bouncing,
//! stopping ball:
//! - Swing timing minigame (power and accuracy passes)
//! - Shot resolver (swing result + stats + impact point -> launch parameters)
//! - Flight controller with the Spike, Tomahawk and Cobra special phases
//! - Physics body abstraction plus a self-integrating reference body
//! - Event bus for shot lifecycle notifications
//! - Shot session tying it all to a fixed-timestep frame loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod body;
pub mod config;
pub mod events;
pub mod flight;
pub mod resolver;
pub mod session;
pub mod swing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::body::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::flight::*;
    pub use crate::resolver::*;
    pub use crate::session::*;
    pub use crate::swing::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use drive_common::{ShotType, StatModifiers};
    use glam::Vec3;

    #[test]
    fn test_resolved_shot_flies_forward() {
        let config = GameplayConfig::default();
        let bus = EventBus::default();
        let mut flight = FlightController::new(config.flight.clone(), SimpleBody::default(), bus.sender());

        let request = ShotRequest {
            swing: SwingResult {
                power: 0.5,
                accuracy: 1.0,
                is_perfect: false,
            },
            impact: ImpactPoint::CENTER,
            shot_type: ShotType::Normal,
            forward: Vec3::X,
        };
        let spec = resolve_shot(&request, &StatModifiers::default(), &config.resolver);
        assert!(flight.launch(&spec));

        for _ in 0..30 {
            flight.fixed_update(config.session.fixed_dt);
            flight.body_mut().integrate(config.session.fixed_dt);
        }
        let position = flight.body().position();
        assert!(position.x > 5.0);
        assert!(position.z.abs() < 1e-3);
        assert!(position.y > config.flight.tee_position.y);
    }
}
