//! Per-character registry of action points inside the detection volume.
//!
//! The registry is fed by enter/exit notifications. A [`DetectionVolume`] produces
//! those notifications itself by diffing the in-range set every tick, and it seeds the
//! registry with one synchronous overlap query at activation (points already inside
//! the volume never generate an "enter").
//!
//! Consumers must treat the registry as an unordered collection.

use rapier3d::prelude::ColliderHandle;

use crate::{
    action_point::{ActionPointId, ActionPoints},
    types::Vec3,
};

/// Something that started or stopped overlapping the detection volume.
///
/// Only action points are ever registered; the distinction is made here, at
/// registration time, never when querying the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlapCandidate {
    ActionPoint(ActionPointId),
    Other(ColliderHandle),
}

impl OverlapCandidate {
    #[inline]
    pub fn as_action_point(&self) -> Option<ActionPointId> {
        match self {
            OverlapCandidate::ActionPoint(id) => Some(*id),
            OverlapCandidate::Other(_) => None,
        }
    }
}

/// Enter/exit notification produced by a [`DetectionVolume`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionEvent {
    Entered(OverlapCandidate),
    Exited(OverlapCandidate),
}

/// The set of action points currently in range of one character, in enter order.
#[derive(Clone, Debug, Default)]
pub struct ActionPointRegistry {
    in_range: Vec<ActionPointId>,
}

impl ActionPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `candidate` if it is an action point. Returns true when it was newly added.
    pub fn on_enter(&mut self, candidate: OverlapCandidate) -> bool {
        let Some(id) = candidate.as_action_point() else {
            return false;
        };
        if self.in_range.contains(&id) {
            return false;
        }
        self.in_range.push(id);
        true
    }

    /// Forget `candidate`. Returns the removed id, if it was tracked.
    pub fn on_exit(&mut self, candidate: OverlapCandidate) -> Option<ActionPointId> {
        let id = candidate.as_action_point()?;
        let index = self.in_range.iter().position(|p| *p == id)?;
        self.in_range.remove(index);
        Some(id)
    }

    #[inline]
    pub fn contains(&self, id: ActionPointId) -> bool {
        self.in_range.contains(&id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = ActionPointId> + '_ {
        self.in_range.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.in_range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.in_range.is_empty()
    }

    /// Owning colliders of every tracked point, for sweep exclusion.
    pub fn owners(&self, points: &ActionPoints) -> Vec<ColliderHandle> {
        self.iter()
            .filter_map(|id| points.get(id).and_then(|p| p.owner))
            .collect()
    }
}

/// Sphere attached to the character that discovers action points.
#[derive(Clone, Debug)]
pub struct DetectionVolume {
    pub radius: f32,
    inside: Vec<ActionPointId>,
    subscribed: bool,
}

impl DetectionVolume {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            inside: Vec::new(),
            subscribed: false,
        }
    }

    /// Whether [`DetectionVolume::seed`] has run and notifications are being produced.
    #[inline]
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// One synchronous overlap query at activation. Returns the points already inside.
    pub fn seed(&mut self, center: Vec3, points: &ActionPoints) -> Vec<ActionPointId> {
        self.inside = points.overlapping(center, self.radius);
        self.subscribed = true;
        self.inside.clone()
    }

    /// Diff the in-range set against the previous call and report enter/exit notifications.
    ///
    /// Points removed from the level are reported as exits. Nothing is reported
    /// before [`DetectionVolume::seed`].
    pub fn sense(&mut self, center: Vec3, points: &ActionPoints) -> Vec<DetectionEvent> {
        if !self.subscribed {
            return Vec::new();
        }

        let now = points.overlapping(center, self.radius);
        let mut events = Vec::new();

        for id in &self.inside {
            if !now.contains(id) {
                events.push(DetectionEvent::Exited(OverlapCandidate::ActionPoint(*id)));
            }
        }
        for id in &now {
            if !self.inside.contains(id) {
                events.push(DetectionEvent::Entered(OverlapCandidate::ActionPoint(*id)));
            }
        }

        self.inside = now;
        events
    }
}
