//! Action points: discrete climbable holds placed on level geometry.
//!
//! The level owns every [`ActionPoint`] in an [`ActionPoints`] store. Characters only
//! ever hold [`ActionPointId`] handles into it. The `busy` flag is the one piece of
//! state several characters can observe; it is written by the character that
//! currently hangs on the point (see `TraversalComponent::set_current_action_point`).

use rapier3d::prelude::ColliderHandle;

use crate::types::Vec3;

/// Stable handle to an action point inside an [`ActionPoints`] store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionPointId(pub u32);

/// What kind of traversal an action point supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionPointType {
    #[default]
    None,
    WallClimb,
    LedgeClimb,
}

/// A world-space oriented hold.
///
/// `forward` points out of the climbable surface, toward the climber.
/// `right = up x forward`, so it matches the right axis of a character facing the wall.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionPoint {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub kind: ActionPointType,
    pub busy: bool,
    /// Collider of the geometry this point is attached to. Sweeps ignore it.
    pub owner: Option<ColliderHandle>,
}

impl ActionPoint {
    /// Build an orthonormal action point from a surface-outward `forward` and an approximate `up`.
    ///
    /// Degenerate inputs (zero or parallel vectors) fall back to `forward = +Z`, `up = +Y`.
    pub fn new(position: Vec3, forward: Vec3, up: Vec3, kind: ActionPointType) -> Self {
        let forward = forward.try_normalize(1.0e-6).unwrap_or_else(Vec3::z);
        let right = up
            .cross(&forward)
            .try_normalize(1.0e-6)
            .unwrap_or_else(|| Vec3::y().cross(&forward).try_normalize(1.0e-6).unwrap_or_else(Vec3::x));
        let up = forward.cross(&right);

        Self {
            position,
            forward,
            right,
            up,
            kind,
            busy: false,
            owner: None,
        }
    }

    /// A wall-climb hold on a surface facing `forward`, kept upright with world +Y.
    pub fn wall(position: Vec3, forward: Vec3) -> Self {
        Self::new(position, forward, Vec3::y(), ActionPointType::WallClimb)
    }

    pub fn with_owner(mut self, owner: ColliderHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Free to grab: typed and not held by anyone. Typeless points are placeholders.
    #[inline]
    pub fn is_available(&self) -> bool {
        !self.busy && self.kind != ActionPointType::None
    }
}

/// Level-wide store of action points.
///
/// Points are created and destroyed with the level geometry; ids are never reused
/// while the store lives.
#[derive(Clone, Debug, Default)]
pub struct ActionPoints {
    points: Vec<Option<ActionPoint>>,
}

impl ActionPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: ActionPoint) -> ActionPointId {
        let id = ActionPointId(self.points.len() as u32);
        self.points.push(Some(point));
        id
    }

    /// Remove a point from the level. Characters tracking it are told through their
    /// detection volume on the next tick.
    pub fn remove(&mut self, id: ActionPointId) -> Option<ActionPoint> {
        self.points.get_mut(id.0 as usize).and_then(Option::take)
    }

    #[inline]
    pub fn get(&self, id: ActionPointId) -> Option<&ActionPoint> {
        self.points.get(id.0 as usize).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ActionPointId) -> Option<&mut ActionPoint> {
        self.points.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionPointId, &ActionPoint)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (ActionPointId(i as u32), p)))
    }

    /// Ids of every point within `radius` of `center` (synchronous overlap query).
    pub fn overlapping(&self, center: Vec3, radius: f32) -> Vec<ActionPointId> {
        let radius_sq = radius * radius;
        self.iter()
            .filter(|(_, p)| (p.position - center).norm_squared() <= radius_sq)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_busy(&self, id: ActionPointId) -> bool {
        self.get(id).is_some_and(|p| p.busy)
    }

    pub fn set_busy(&mut self, id: ActionPointId, busy: bool) {
        if let Some(point) = self.get_mut(id) {
            point.busy = busy;
        }
    }

    pub fn busy_count(&self) -> usize {
        self.iter().filter(|(_, p)| p.busy).count()
    }
}
