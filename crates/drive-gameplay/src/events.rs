//! Event bus for shot lifecycle notifications.
//!
//! The swing timer and flight controller publish into a shared bus; the
//! session drains it once per frame and forwards events, in publication
//! order, to registered [`EventHandler`]s.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use drive_common::ShotType;

use crate::flight::{FlightPhase, ResetReason, ShotSummary};
use crate::swing::{SwingResult, SwingState};

/// Notifications produced by the shot engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShotEvent {
    /// Swing timer moved to a new state
    SwingStateChanged {
        /// New state
        state: SwingState,
    },
    /// Player finished the swing
    SwingComplete(SwingResult),
    /// Accuracy marker ran off the bar; no shot is fired
    SwingMissed,
    /// Ball launched; the camera should start following
    ShotStarted {
        /// Archetype of the launched shot
        shot_type: ShotType,
    },
    /// Vertical velocity turned from rising to falling
    ApexReached {
        /// Height of the ball at the apex
        height: f32,
    },
    /// Flight phase changed
    PhaseChanged {
        /// New phase
        phase: FlightPhase,
    },
    /// Ball touched down
    Landed {
        /// Bounces so far, including this one
        bounce_count: u32,
    },
    /// Ball came to rest; the camera stops following and the swing timer resets
    ShotStopped(ShotSummary),
    /// Ball was put back on the tee
    BallReset {
        /// Why the reset happened
        reason: ResetReason,
    },
}

/// Event bus for broadcasting shot events.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<ShotEvent>,
    /// Receiver for collecting events
    receiver: Receiver<ShotEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: ShotEvent) {
        publish_on(&self.sender, event);
    }

    /// Drains all pending events in publication order.
    pub fn drain(&self) -> Vec<ShotEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<ShotEvent> {
        self.sender.clone()
    }
}

/// Non-blocking publish through a sender handle. A full bus drops the event.
pub fn publish_on(sender: &Sender<ShotEvent>, event: ShotEvent) {
    match sender.try_send(event) {
        Ok(()) => {},
        Err(TrySendError::Full(event)) => warn!("Event bus full, dropping {event:?}"),
        Err(TrySendError::Disconnected(_)) => {},
    }
}

/// Receives shot events dispatched by the session.
pub trait EventHandler {
    /// Handles an event.
    fn handle(&mut self, event: &ShotEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&ShotEvent),
{
    fn handle(&mut self, event: &ShotEvent) {
        self(event);
    }
}
