/*!
Climb transition engine.

Pure geometry and timing used by the traversal component:
- the climbable height band (static on the ground, momentum-shifted while falling)
- selection of the first action point when climbing starts
- scoring of the next action point from directional input
- the timed blend between two action points
- placement of the character relative to an action point

Nothing here touches the character or the collision world; reachability is passed in
as a predicate so the caller decides how to sweep.
*/

use crate::{
    action_point::{ActionPoint, ActionPointId, ActionPoints},
    registry::ActionPointRegistry,
    settings::TraverseSettings,
    types::{DIST_EPS, Hand, Quat, Vec2, Vec3, lerp, rotation_facing_away},
};

/// Height window, relative to the character, in which an action point can be grabbed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimbableBand {
    pub min: f32,
    pub max: f32,
}

impl ClimbableBand {
    /// Static window used while on the ground.
    pub fn grounded(settings: &TraverseSettings) -> Self {
        Self {
            min: settings.min_height_threshold,
            max: settings.max_height_threshold,
        }
    }

    /// Window shifted by this tick's vertical travel.
    ///
    /// The whole band moves by `velocity_y * dt * falling_height_scalar`; when that shift is
    /// downward the lower bound moves by twice as much, so a fast fall can still catch
    /// points it is about to pass.
    pub fn falling(settings: &TraverseSettings, velocity_y: f32, dt: f32) -> Self {
        let shift = velocity_y * dt * settings.falling_height_scalar;
        Self {
            min: settings.min_height_threshold + shift + shift.min(0.0),
            max: settings.max_height_threshold + shift,
        }
    }

    #[inline]
    pub fn contains(&self, height: f32) -> bool {
        height >= self.min && height <= self.max
    }
}

/// A qualifying action point for starting a climb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartCandidate {
    pub id: ActionPointId,
    pub distance: f32,
    pub lateral_distance: f32,
    pub height: f32,
}

/// Distance threshold for grabbing, grown by how far the character travels this tick.
#[inline]
pub fn start_distance_threshold(settings: &TraverseSettings, velocity: Vec3, dt: f32) -> f32 {
    settings.max_distance_threshold + velocity.norm() * dt * settings.max_distance_scalar
}

/// Pick the action point to grab when climbing starts.
///
/// A free point qualifies when it is within the velocity-scaled distance threshold, its
/// height offset lies inside `band`, and its offset along the character's right axis is
/// at most half the lateral threshold. The closest qualifying point wins; equal distances
/// go to the smaller lateral offset.
pub fn select_start_point(
    points: &ActionPoints,
    registry: &ActionPointRegistry,
    location: Vec3,
    right: Vec3,
    band: ClimbableBand,
    max_distance: f32,
    settings: &TraverseSettings,
) -> Option<StartCandidate> {
    let half_lateral = settings.lateral_threshold * 0.5;
    let mut best: Option<StartCandidate> = None;

    for id in registry.iter() {
        let Some(point) = points.get(id) else {
            continue;
        };
        if !point.is_available() {
            continue;
        }

        let offset = point.position - location;
        let candidate = StartCandidate {
            id,
            distance: offset.norm(),
            lateral_distance: offset.dot(&right).abs(),
            height: offset.y,
        };

        if candidate.distance > max_distance
            || !band.contains(candidate.height)
            || candidate.lateral_distance > half_lateral
        {
            continue;
        }

        let better = best.as_ref().is_none_or(|b| {
            candidate.distance < b.distance
                || (candidate.distance == b.distance
                    && candidate.lateral_distance < b.lateral_distance)
        });
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Per-candidate score computed while looking for the next action point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraverseActionPointScore {
    pub id: ActionPointId,
    pub distance: f32,
    pub lateral_distance: f32,
    /// Offset from the current point in its (right, up) basis.
    pub relative_offset: Vec2,
    pub score: f32,
}

impl TraverseActionPointScore {
    /// Normalised (horizontal, vertical) direction toward this candidate.
    pub fn direction(&self) -> Vec2 {
        self.relative_offset
            .try_normalize(DIST_EPS)
            .unwrap_or_else(Vec2::zeros)
    }
}

/// World-space input direction on the surface of `point`, or `None` for released input.
pub fn input_direction(point: &ActionPoint, horizontal: f32, vertical: f32) -> Option<Vec3> {
    (point.right * horizontal + point.up * vertical).try_normalize(DIST_EPS)
}

/// Geometric filtering and scoring of every other in-range point, relative to `current`.
///
/// Rejects points that are busy, farther than the transition distance threshold (or
/// closer than its minimum), deviate sideways from the input axis by more than the
/// lateral threshold, or do not lie in the direction of the input. Reachability is not
/// checked here.
pub fn score_next_candidates(
    points: &ActionPoints,
    registry: &ActionPointRegistry,
    current: ActionPointId,
    horizontal: f32,
    vertical: f32,
    settings: &TraverseSettings,
) -> Vec<TraverseActionPointScore> {
    let Some(from) = points.get(current) else {
        return Vec::new();
    };
    let Some(direction) = input_direction(from, horizontal, vertical) else {
        return Vec::new();
    };
    let across = from
        .forward
        .cross(&direction)
        .try_normalize(DIST_EPS)
        .unwrap_or_else(|| from.up);
    let search_radius = settings.search_radius().max(DIST_EPS);

    let mut scores = Vec::new();
    for id in registry.iter() {
        if id == current {
            continue;
        }
        let Some(point) = points.get(id) else {
            continue;
        };
        if !point.is_available() {
            continue;
        }

        let offset = point.position - from.position;
        let distance = offset.norm();
        if distance > settings.max_distance_threshold || distance < settings.min_distance_threshold
        {
            continue;
        }

        let lateral_distance = offset.dot(&across).abs();
        if lateral_distance > settings.lateral_threshold {
            continue;
        }

        if offset.dot(&direction) <= 0.0 {
            continue;
        }

        scores.push(TraverseActionPointScore {
            id,
            distance,
            lateral_distance,
            relative_offset: Vec2::new(offset.dot(&from.right), offset.dot(&from.up)),
            score: (settings.lateral_threshold - lateral_distance)
                + (1.0 - distance / search_radius),
        });
    }

    scores
}

/// Highest-scoring reachable candidate. Exact ties keep the first one seen.
pub fn pick_best(
    scores: &[TraverseActionPointScore],
    mut reachable: impl FnMut(&TraverseActionPointScore) -> bool,
) -> Option<TraverseActionPointScore> {
    let mut best: Option<TraverseActionPointScore> = None;
    for candidate in scores {
        if !reachable(candidate) {
            continue;
        }
        if best.as_ref().is_none_or(|b| candidate.score > b.score) {
            best = Some(*candidate);
        }
    }
    best
}

/// Where the character stands when hanging from `point`.
///
/// `point.position + forward*offset.x + right*offset.y + up*offset.z`, shifted sideways by
/// half the hand width toward the free hand, then blended from `current` by `blend`
/// (1.0 snaps fully onto the point).
pub fn location_from_action_point(
    point: &ActionPoint,
    offset: Vec3,
    hand: Hand,
    hand_width: f32,
    current: Vec3,
    blend: f32,
) -> Vec3 {
    let stand = point.position
        + point.forward * offset.x
        + point.right * offset.y
        + point.up * offset.z
        + point.right * (hand.body_side() * hand_width * 0.5);

    lerp(current, stand, blend)
}

/// Rotation of a character hanging from `point`: facing into the surface.
#[inline]
pub fn rotation_from_action_point(point: &ActionPoint) -> Quat {
    rotation_facing_away(&point.forward, &point.up)
}

/// World location of one hand on `point`.
#[inline]
pub fn hand_location_on_action_point(point: &ActionPoint, hand: Hand, hand_width: f32) -> Vec3 {
    point.position - point.right * (hand.body_side() * hand_width * 0.5)
}

/// A timed blend from the current pose to a target action point.
#[derive(Clone, Debug, PartialEq)]
pub struct ClimbTransition {
    pub target: ActionPointId,
    pub from_location: Vec3,
    pub from_rotation: Quat,
    pub elapsed: f32,
    pub duration: f32,
    /// Hand that reaches the target first.
    pub hand: Hand,
    /// Normalised (horizontal, vertical) direction of the move.
    pub direction: Vec2,
}

impl ClimbTransition {
    pub fn new(
        target: ActionPointId,
        from_location: Vec3,
        from_rotation: Quat,
        direction: Vec2,
        duration: f32,
    ) -> Self {
        let direction = direction.try_normalize(DIST_EPS).unwrap_or_else(Vec2::zeros);
        Self {
            target,
            from_location,
            from_rotation,
            elapsed: 0.0,
            duration: duration.max(0.0),
            hand: Hand::leading(direction.x),
            direction,
        }
    }

    /// Advance the timer. Returns true once the transition has run its full duration.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.is_finished()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Blend factor in `[0, 1]`.
    #[inline]
    pub fn alpha(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Whether the leading hand should currently be anchored to the target.
    #[inline]
    pub fn in_hand_window(&self, window: (f32, f32)) -> bool {
        let alpha = self.alpha();
        alpha >= window.0 && alpha <= window.1
    }
}
