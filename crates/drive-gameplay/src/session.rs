//! Shot session: wires the swing timer, resolver and flight controller
//! together and runs the frame loop.
//!
//! Collaborators (physics body, stat provider) are injected once at
//! construction. Each frame advances the swing timer with the variable frame
//! delta, runs zero or more fixed physics steps, then drains the event bus.
//! Drained events first drive the session's own reactions (launching a
//! completed swing, re-arming the timer when the ball stops or resets) and
//! are then handed to subscribers in registration order.

use glam::Vec3;
use tracing::{debug, info, trace};

use drive_common::{ShotType, StatModifiers, StatProvider};

use crate::body::Integrate;
use crate::config::GameplayConfig;
use crate::events::{EventBus, EventHandler, ShotEvent};
use crate::flight::{FlightController, ResetReason, ShotSummary};
use crate::resolver::{resolve_shot, ImpactPoint, LaunchSpec, ShotRequest};
use crate::swing::{SwingResult, SwingTimer};

/// A complete shot engine around one ball.
pub struct ShotSession<B: Integrate> {
    config: GameplayConfig,
    swing: SwingTimer,
    flight: FlightController<B>,
    stats: Box<dyn StatProvider>,
    bus: EventBus,
    listeners: Vec<Box<dyn EventHandler>>,
    impact: ImpactPoint,
    shot_type: ShotType,
    aim: Vec3,
    accumulator: f32,
    last_launch: Option<LaunchSpec>,
    last_summary: Option<ShotSummary>,
}

impl<B: Integrate> ShotSession<B> {
    /// Creates a session with the ball on the tee and the swing timer ready.
    pub fn new(config: GameplayConfig, body: B, stats: Box<dyn StatProvider>) -> Self {
        let bus = EventBus::new(config.session.event_capacity);
        let swing = SwingTimer::new(config.swing.clone(), bus.sender());
        let flight = FlightController::new(config.flight.clone(), body, bus.sender());
        Self {
            config,
            swing,
            flight,
            stats,
            bus,
            listeners: Vec::new(),
            impact: ImpactPoint::CENTER,
            shot_type: ShotType::Normal,
            aim: Vec3::Z,
            accumulator: 0.0,
            last_launch: None,
            last_summary: None,
        }
    }

    /// Registers a listener. Listeners see every event after the session has reacted to it.
    pub fn subscribe(&mut self, handler: impl EventHandler + 'static) {
        self.listeners.push(Box::new(handler));
    }

    /// Swaps the stat provider, e.g. after the golfer changes club.
    ///
    /// Ignored (returns `false`) while a shot is in flight.
    pub fn set_stat_provider(&mut self, stats: Box<dyn StatProvider>) -> bool {
        if self.flight.is_in_air() {
            debug!("Stat change ignored while ball is in flight");
            return false;
        }
        self.stats = stats;
        true
    }

    fn modifiers(&self) -> StatModifiers {
        StatModifiers::from_provider(self.stats.as_ref())
    }

    /// Presses the swing button. Returns `false` if the press was ignored.
    pub fn trigger(&mut self) -> bool {
        let mods = self.modifiers();
        self.swing.trigger(&mods)
    }

    /// Sets where the club will meet the ball. Persists across shots.
    pub fn set_impact_point(&mut self, impact: ImpactPoint) {
        self.impact = ImpactPoint::new(impact.horizontal, impact.vertical);
    }

    /// Selects the shot type for the next launch.
    ///
    /// Ignored (returns `false`) while a shot is in flight.
    pub fn select_shot_type(&mut self, shot_type: ShotType) -> bool {
        if self.flight.is_in_air() {
            debug!("Shot type change to {shot_type} ignored while ball is in flight");
            return false;
        }
        if shot_type.is_special() {
            debug!("Special shot {shot_type} selected");
        }
        self.shot_type = shot_type;
        true
    }

    /// Sets the aim direction. Only its horizontal part is used.
    pub fn set_aim(&mut self, forward: Vec3) {
        self.aim = forward;
    }

    /// Advances the session by one frame of `dt` seconds.
    ///
    /// Returns the number of fixed physics steps that ran.
    pub fn frame(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        let mods = self.modifiers();
        self.swing.tick(dt, &mods);

        let fixed_dt = self.config.session.fixed_dt;
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= fixed_dt && steps < self.config.session.max_steps_per_frame {
            self.accumulator -= fixed_dt;
            self.step(fixed_dt);
            steps += 1;
        }

        // Still behind: drop the backlog
        if self.accumulator > fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        self.process_events();
        steps
    }

    fn step(&mut self, dt: f32) {
        self.flight.fixed_update(dt);
        if let Some(contact) = self.flight.body_mut().integrate(dt) {
            trace!(
                "Contact at {:?}, impact speed {:.2}",
                contact.position,
                contact.impact_speed
            );
            self.flight.on_collision();
        }
    }

    /// Puts the ball back on the tee and re-arms the swing timer.
    ///
    /// A swing that completed since the last frame is discarded rather than
    /// launched, so the ball is always on the tee afterwards.
    pub fn reset_to_tee(&mut self) {
        self.dispatch(false);
        self.flight.reset_to_tee(ResetReason::Requested);
        self.dispatch(false);
    }

    /// Drains the bus until it is empty, reacting to and dispatching each event.
    pub fn process_events(&mut self) {
        self.dispatch(true);
    }

    fn dispatch(&mut self, allow_launch: bool) {
        loop {
            let events = self.bus.drain();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.react(&event, allow_launch);
                for listener in &mut self.listeners {
                    listener.handle(&event);
                }
            }
        }
    }

    fn react(&mut self, event: &ShotEvent, allow_launch: bool) {
        match event {
            ShotEvent::SwingComplete(result) if allow_launch => self.launch(*result),
            ShotEvent::SwingComplete(_) => debug!("Completed swing discarded by tee reset"),
            ShotEvent::ShotStopped(summary) => {
                self.last_summary = Some(*summary);
                self.swing.on_ball_stopped();
            },
            ShotEvent::BallReset { .. } => self.swing.reset(),
            _ => {},
        }
    }

    fn launch(&mut self, swing: SwingResult) {
        let request = ShotRequest {
            swing,
            impact: self.impact,
            shot_type: self.shot_type,
            forward: self.aim,
        };
        let spec = resolve_shot(&request, &self.modifiers(), &self.config.resolver);
        if self.flight.launch(&spec) {
            let club = self
                .stats
                .selected_club()
                .map_or_else(|| String::from("no club"), |club| club.name);
            info!(
                "{} shot away with {club} (max {:.0}y), final power {:.3}{}",
                spec.shot_type,
                self.stats.max_distance(),
                spec.final_power,
                if spec.is_perfect { " (perfect)" } else { "" }
            );
            self.last_launch = Some(spec);
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Returns the swing timer.
    #[must_use]
    pub const fn swing(&self) -> &SwingTimer {
        &self.swing
    }

    /// Returns the flight controller.
    #[must_use]
    pub const fn flight(&self) -> &FlightController<B> {
        &self.flight
    }

    /// Current impact point.
    #[must_use]
    pub const fn impact(&self) -> ImpactPoint {
        self.impact
    }

    /// Shot type used for the next launch.
    #[must_use]
    pub const fn shot_type(&self) -> ShotType {
        self.shot_type
    }

    /// Current aim direction.
    #[must_use]
    pub const fn aim(&self) -> Vec3 {
        self.aim
    }

    /// Launch parameters of the most recent shot.
    #[must_use]
    pub const fn last_launch(&self) -> Option<&LaunchSpec> {
        self.last_launch.as_ref()
    }

    /// Summary of the most recently finished shot.
    #[must_use]
    pub const fn last_summary(&self) -> Option<&ShotSummary> {
        self.last_summary.as_ref()
    }
}
