/*!
Animation match-target tracking.

A match-target request ties a playing montage to a world target: while the montage
is the active one, the character root is blended toward the target so that a named
socket (a hand, usually) lands on it. Requests are dropped once their montage stops,
and whatever posture they engaged (crouch, raised legs) is reported back so the
component can undo it.
*/

use crate::{
    action_point::{ActionPointId, ActionPoints},
    body::{AnimationDriver, MontageId},
    error::TraversalError,
    types::{Vec3, lerp},
};

/// Where a match-target request wants its socket to end up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchTarget {
    Location(Vec3),
    ActionPoint(ActionPointId),
}

impl MatchTarget {
    fn resolve(&self, points: &ActionPoints) -> Option<Vec3> {
        match self {
            Self::Location(location) => Some(*location),
            Self::ActionPoint(id) => points.get(*id).map(|p| p.position),
        }
    }
}

/// A request to blend the character toward a target while a montage plays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchTargetRequest {
    pub montage: Option<MontageId>,
    /// Socket whose offset from the root is preserved while matching.
    pub socket: String,
    pub target: Option<MatchTarget>,
    pub crouch: bool,
    pub raise_legs: bool,
    pub match_duration: f32,
}

#[derive(Clone, Debug, PartialEq)]
struct ActiveMatchTarget {
    montage: MontageId,
    target: MatchTarget,
    match_duration: f32,
    elapsed: f32,
    handled: bool,
    socket_offset: Vec3,
    crouched: bool,
    raised_legs: bool,
}

/// Posture a finished request had engaged and that must now be undone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostureRelease {
    pub uncrouch: bool,
    pub drop_legs: bool,
}

/// Outcome of one tracker tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchTargetStep {
    /// Root location the active requests want this tick, if any moved it.
    pub location: Option<Vec3>,
    pub released: Vec<PostureRelease>,
}

/// Per-character list of active match-target requests.
#[derive(Clone, Debug, Default)]
pub struct MatchTargetTracker {
    active: Vec<ActiveMatchTarget>,
}

impl MatchTargetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Validate a request without registering it.
    pub fn check(request: &MatchTargetRequest) -> Result<(MontageId, MatchTarget), TraversalError> {
        let montage = request.montage.ok_or(TraversalError::MissingMontage)?;
        let target = request.target.ok_or(TraversalError::MissingMatchTarget)?;
        Ok((montage, target))
    }

    /// Register a request and start its montage.
    ///
    /// The socket offset is measured now, against `root`. A socket the skeleton does not
    /// have yields a zero offset. `crouched` and `raised_legs` record which posture changes
    /// the caller actually applied on behalf of this request.
    pub fn push(
        &mut self,
        request: &MatchTargetRequest,
        root: Vec3,
        animation: &mut dyn AnimationDriver,
        crouched: bool,
        raised_legs: bool,
    ) -> Result<(), TraversalError> {
        let (montage, target) = Self::check(request)?;

        let socket_offset = match animation.socket_location(&request.socket) {
            Some(socket) => socket - root,
            None => {
                log::warn!(
                    "match-target socket `{}` not found, matching the root instead",
                    request.socket
                );
                Vec3::zeros()
            }
        };

        animation.play_montage(montage);
        self.active.push(ActiveMatchTarget {
            montage,
            target,
            match_duration: request.match_duration,
            elapsed: 0.0,
            handled: false,
            socket_offset,
            crouched,
            raised_legs,
        });
        Ok(())
    }

    /// Advance every request whose montage is still playing and drop the others.
    pub fn advance(
        &mut self,
        dt: f32,
        root: Vec3,
        animation: &dyn AnimationDriver,
        points: &ActionPoints,
    ) -> MatchTargetStep {
        let mut step = MatchTargetStep::default();
        let mut location = root;

        self.active.retain_mut(|request| {
            if !animation.is_montage_active(request.montage) {
                step.released.push(PostureRelease {
                    uncrouch: request.crouched,
                    drop_legs: request.raised_legs,
                });
                return false;
            }

            let duration = request.match_duration.max(0.0);
            request.elapsed = (request.elapsed + dt).clamp(0.0, duration);
            if request.elapsed >= duration {
                request.handled = true;
            }

            if !request.handled {
                if let Some(target) = request.target.resolve(points) {
                    let alpha = request.elapsed / duration;
                    location = lerp(location, target - request.socket_offset, alpha);
                    step.location = Some(location);
                }
            }
            true
        });

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{action_point::ActionPoint, test_support::TestAnimator};

    fn request(target: Vec3) -> MatchTargetRequest {
        MatchTargetRequest {
            montage: Some(MontageId(7)),
            socket: "hand_r".to_owned(),
            target: Some(MatchTarget::Location(target)),
            crouch: false,
            raise_legs: false,
            match_duration: 1.0,
        }
    }

    #[test]
    fn incomplete_requests_are_rejected() {
        let mut tracker = MatchTargetTracker::new();
        let mut animator = TestAnimator::default();

        let no_montage = MatchTargetRequest {
            montage: None,
            ..request(Vec3::zeros())
        };
        assert_eq!(
            tracker.push(&no_montage, Vec3::zeros(), &mut animator, false, false),
            Err(TraversalError::MissingMontage)
        );

        let no_target = MatchTargetRequest {
            target: None,
            ..request(Vec3::zeros())
        };
        assert_eq!(
            tracker.push(&no_target, Vec3::zeros(), &mut animator, false, false),
            Err(TraversalError::MissingMatchTarget)
        );

        assert!(tracker.is_empty());
        assert!(animator.played.is_empty());
    }

    #[test]
    fn root_blends_toward_target_minus_socket_offset() {
        let mut tracker = MatchTargetTracker::new();
        let mut animator = TestAnimator::default().with_socket("hand_r", Vec3::new(0.0, 100.0, 0.0));
        let points = ActionPoints::new();

        tracker
            .push(&request(Vec3::new(0.0, 300.0, 0.0)), Vec3::zeros(), &mut animator, false, false)
            .unwrap();
        assert_eq!(animator.played, vec![MontageId(7)]);

        // Root goal is (0, 200, 0); a quarter of the way there after 0.25s.
        let step = tracker.advance(0.25, Vec3::zeros(), &animator, &points);
        let location = step.location.unwrap();
        assert!((location - Vec3::new(0.0, 50.0, 0.0)).norm() < 1.0e-4);

        // Reaching the duration marks it handled: no more blending.
        let step = tracker.advance(1.0, location, &animator, &points);
        assert!(step.location.is_none());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn stopped_montage_releases_posture() {
        let mut tracker = MatchTargetTracker::new();
        let mut animator = TestAnimator::default();
        let points = ActionPoints::new();

        tracker
            .push(&request(Vec3::zeros()), Vec3::zeros(), &mut animator, true, false)
            .unwrap();
        animator.active = None;

        let step = tracker.advance(0.1, Vec3::zeros(), &animator, &points);
        assert!(tracker.is_empty());
        assert_eq!(
            step.released,
            vec![PostureRelease {
                uncrouch: true,
                drop_legs: false
            }]
        );
    }

    #[test]
    fn action_point_targets_follow_the_point() {
        let mut tracker = MatchTargetTracker::new();
        let mut animator = TestAnimator::default();
        let mut points = ActionPoints::new();
        let id = points.insert(ActionPoint::wall(Vec3::new(100.0, 0.0, 0.0), Vec3::z()));

        let request = MatchTargetRequest {
            target: Some(MatchTarget::ActionPoint(id)),
            ..request(Vec3::zeros())
        };
        tracker.push(&request, Vec3::zeros(), &mut animator, false, false).unwrap();

        let step = tracker.advance(0.5, Vec3::zeros(), &animator, &points);
        assert!((step.location.unwrap() - Vec3::new(50.0, 0.0, 0.0)).norm() < 1.0e-4);

        // A target that disappeared is skipped, not fatal.
        points.remove(id);
        let step = tracker.advance(0.1, Vec3::zeros(), &animator, &points);
        assert!(step.location.is_none());
    }

    #[test]
    fn zero_duration_is_handled_immediately() {
        let mut tracker = MatchTargetTracker::new();
        let mut animator = TestAnimator::default();
        let points = ActionPoints::new();
        let request = MatchTargetRequest {
            match_duration: 0.0,
            ..request(Vec3::new(10.0, 0.0, 0.0))
        };
        tracker.push(&request, Vec3::zeros(), &mut animator, false, false).unwrap();

        let step = tracker.advance(0.1, Vec3::zeros(), &animator, &points);
        assert!(step.location.is_none());
    }
}
