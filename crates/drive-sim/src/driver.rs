//! Scripted golfer.
//!
//! Stands in for the input layer: watches the swing marker frame by frame
//! and presses the button when it reaches the scripted power and accuracy
//! targets, then runs the session until the ball stops.

use glam::Vec3;
use serde::Serialize;
use tracing::{debug, warn};

use drive_common::{Loadout, StatProvider};
use drive_gameplay::{Integrate, ShotSession, ShotSummary, SwingState};

use crate::config::ScriptedShot;

/// How a scripted shot ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ShotOutcome {
    /// Ball flew and came to rest
    Completed(ShotSummary),
    /// The accuracy marker ran off the bar
    Missed,
    /// The shot did not finish in time; the ball was put back on the tee
    TimedOut,
}

/// Takes the shot's club from the bag and hands the loadout to the session.
///
/// An unknown club name keeps the current club.
pub fn equip<B: Integrate>(
    session: &mut ShotSession<B>,
    loadout: &mut Loadout,
    shot: &ScriptedShot,
) {
    let Some(name) = shot.club.as_deref() else {
        return;
    };
    if !loadout.select_club(name) {
        warn!("No club named {name} in the bag, keeping the current club");
        return;
    }
    debug!("Equipped {name}, max distance {:.0}y", loadout.max_distance());
    session.set_stat_provider(Box::new(loadout.clone()));
}

/// Plays scripted shots through a session at a fixed frame rate.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedGolfer {
    frame_dt: f32,
    max_shot_seconds: f32,
}

impl ScriptedGolfer {
    /// Creates a golfer stepping `frame_dt` seconds per frame.
    #[must_use]
    pub fn new(frame_dt: f32, max_shot_seconds: f32) -> Self {
        Self {
            frame_dt,
            max_shot_seconds,
        }
    }

    /// Marker position to press at, and the tolerance used to spot it.
    fn press_window<B: Integrate>(&self, session: &ShotSession<B>, target: f32) -> (f32, f32) {
        let tolerance = session.swing().bar_speed() * self.frame_dt * 0.5;
        let bound = (1.0 - tolerance).max(0.0);
        (target.clamp(-bound, bound), tolerance + 1e-4)
    }

    /// Whether the marker has reached `target` along its direction of travel.
    fn reached<B: Integrate>(&self, session: &ShotSession<B>, target: f32) -> bool {
        let (target, tolerance) = self.press_window(session, target);
        let swing = session.swing();
        (target - swing.marker()) * swing.direction() <= tolerance
    }

    /// Plays one shot from tee to rest.
    pub fn play<B: Integrate>(&self, session: &mut ShotSession<B>, shot: &ScriptedShot) -> ShotOutcome {
        if session.swing().state() != SwingState::Ready || session.flight().is_in_air() {
            session.reset_to_tee();
        }

        session.select_shot_type(shot.shot_type);
        session.set_impact_point(shot.impact);
        let yaw = shot.aim_yaw_deg.to_radians();
        session.set_aim(Vec3::new(yaw.sin(), 0.0, yaw.cos()));

        session.trigger();
        let power_target = shot.power.clamp(0.0, 1.0) * 2.0 - 1.0;
        let mut accuracy_target = None;
        let mut launched = false;
        let mut elapsed = 0.0;

        while elapsed < self.max_shot_seconds {
            match session.swing().state() {
                SwingState::PowerPhase => {
                    if self.reached(session, power_target) {
                        debug!("Pressing for power at {:.3}", session.swing().marker());
                        session.trigger();
                    }
                },
                SwingState::AccuracyPhase => {
                    let swing = session.swing();
                    let target = *accuracy_target.get_or_insert(
                        swing.zone().center + shot.accuracy_offset * swing.direction(),
                    );
                    if self.reached(session, target) {
                        debug!("Pressing for accuracy at {:.3}", session.swing().marker());
                        session.trigger();
                    }
                },
                SwingState::Ready if !launched => return ShotOutcome::Missed,
                SwingState::Ready | SwingState::Hitting | SwingState::Cooldown => {
                    if session.flight().is_in_air() {
                        launched = true;
                    } else if launched {
                        return session
                            .last_summary()
                            .copied()
                            .map_or(ShotOutcome::TimedOut, ShotOutcome::Completed);
                    }
                },
            }

            session.frame(self.frame_dt);
            elapsed += self.frame_dt;
        }

        warn!(
            "{} shot still running after {:.0}s, resetting",
            shot.shot_type, self.max_shot_seconds
        );
        session.reset_to_tee();
        ShotOutcome::TimedOut
    }
}
