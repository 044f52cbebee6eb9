//! Outbound notifications.
//!
//! The component queues events as they happen; the host drains them once per tick.
//! Delivery is fire-and-forget: nothing is returned to the component.

use crate::{action_point::ActionPointId, types::Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraversalEvent {
    JumpInitiated,
    LegRaiseStarted,
    LegRaiseStopped,
    ClimbingStarted(ActionPointId),
    ClimbingStopped,
    /// Normalised horizontal/vertical direction of the move, for driving blend animation.
    WallClimbTransitionStarted { horizontal: f32, vertical: f32 },
    WallClimbTransitionEnded,
    /// A ledge stand point was found by the diagnostic ledge search.
    LedgeFound { stand_location: Vec3 },
}

/// FIFO of pending events.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    pending: Vec<TraversalEvent>,
}

impl EventQueue {
    #[inline]
    pub fn push(&mut self, event: TraversalEvent) {
        self.pending.push(event);
    }

    #[inline]
    pub fn drain(&mut self) -> Vec<TraversalEvent> {
        std::mem::take(&mut self.pending)
    }

    #[inline]
    pub fn pending(&self) -> &[TraversalEvent] {
        &self.pending
    }
}
