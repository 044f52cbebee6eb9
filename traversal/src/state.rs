//! Closed set of traversal states.

use crate::{
    action_point::ActionPointId,
    transition::ClimbTransition,
    types::{Vec2, Vec3},
};

/// What the character is doing while attached to an action point.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ClimbPhase {
    #[default]
    Idle,
    /// No reachable point in the input direction; the character leans toward it.
    Leaning(Lean),
    Transitioning(ClimbTransition),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lean {
    /// Input (horizontal, vertical) the character is leaning along.
    pub direction: Vec2,
    /// Set when this lean swapped sides relative to the previous one.
    pub hand_switch: bool,
}

/// Top-level per-character traversal state.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TraversalState {
    #[default]
    Grounded,
    Falling,
    Climbing(ClimbPhase),
}

impl TraversalState {
    #[inline]
    pub fn is_climbing(&self) -> bool {
        matches!(self, Self::Climbing(_))
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Climbing(ClimbPhase::Transitioning(_)))
    }

    #[inline]
    pub fn is_leaning(&self) -> bool {
        matches!(self, Self::Climbing(ClimbPhase::Leaning(_)))
    }

    pub fn transition(&self) -> Option<&ClimbTransition> {
        match self {
            Self::Climbing(ClimbPhase::Transitioning(transition)) => Some(transition),
            _ => None,
        }
    }

    pub fn transition_mut(&mut self) -> Option<&mut ClimbTransition> {
        match self {
            Self::Climbing(ClimbPhase::Transitioning(transition)) => Some(transition),
            _ => None,
        }
    }

    /// Action point the character is moving to, if transitioning.
    #[inline]
    pub fn transition_target(&self) -> Option<ActionPointId> {
        self.transition().map(|t| t.target)
    }

    pub fn lean(&self) -> Option<Lean> {
        match self {
            Self::Climbing(ClimbPhase::Leaning(lean)) => Some(*lean),
            _ => None,
        }
    }
}

/// Where the animation layer should pin a hand during a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct HandAnchor {
    pub socket: String,
    pub location: Vec3,
    /// Blend weight, `elapsed / duration` of the transition.
    pub weight: f32,
}

/// Directional climb input, accumulated between ticks and consumed once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClimbInput {
    pending: Vec2,
    pub current: Vec2,
    pub previous: Vec2,
    /// Last horizontal value that was not inside the deadzone.
    pub last_nonzero_horizontal: f32,
}

impl ClimbInput {
    #[inline]
    pub fn add_horizontal(&mut self, value: f32) {
        self.pending.x += value;
    }

    #[inline]
    pub fn add_vertical(&mut self, value: f32) {
        self.pending.y += value;
    }

    /// Move pending input into `current`, clamped to `[-1, 1]` per axis.
    pub fn consume(&mut self, deadzone: f32) {
        self.previous = self.current;
        self.current = self.pending.map(|v| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 });
        self.pending = Vec2::zeros();

        if self.current.x.abs() > deadzone {
            self.last_nonzero_horizontal = self.current.x;
        }
    }

    #[inline]
    pub fn is_active(&self, deadzone: f32) -> bool {
        self.current.x.abs() > deadzone || self.current.y.abs() > deadzone
    }
}
