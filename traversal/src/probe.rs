/*!
Collision probe: swept-capsule queries against world geometry.

Three sweep patterns are built on a single "cast this capsule from A to B" query:
- ground:       straight down, used to keep blended motion from entering the floor
- reachability: from the character to a candidate's stand location, backed off the wall
- ledge:        up, then forward, then down, to find a standing surface above the wall

Failure policy
- Queries are advisory. A sweep that cannot execute (no world, invalid capsule,
  non-finite endpoints) is logged at debug level and reported as "no hit".
*/

use rapier3d::prelude::ColliderHandle;

use crate::{
    error::SweepError,
    types::{CapsuleSpec, DIST_EPS, Vec3},
};

/// The earliest contact found by a capsule sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// Distance travelled along the sweep before contact.
    pub distance: f32,
    /// Capsule center at the moment of contact.
    pub location: Vec3,
    /// Surface normal at the contact, facing the swept capsule.
    pub normal: Vec3,
    pub collider: Option<ColliderHandle>,
}

/// World geometry that can answer capsule sweeps.
pub trait SweepWorld {
    /// Sweep a Y-aligned capsule from `from` to `to` (capsule centers), ignoring `ignore`.
    ///
    /// `Ok(None)` means the path is clear. `Err` means the query itself could not run.
    fn sweep_capsule(
        &self,
        from: Vec3,
        to: Vec3,
        capsule: CapsuleSpec,
        ignore: &[ColliderHandle],
    ) -> Result<Option<SweepHit>, SweepError>;
}

/// Distances used by the three-step ledge search.
#[derive(Clone, Copy, Debug)]
pub struct LedgeReach {
    /// How far to rise above the current location.
    pub rise: f32,
    /// How far to move over the wall top.
    pub reach: f32,
}

/// Stateless helper bound to one character's capsule and exclusion list.
pub struct CollisionProbe<'a> {
    world: Option<&'a dyn SweepWorld>,
    capsule: CapsuleSpec,
    ignore: Vec<ColliderHandle>,
}

impl<'a> CollisionProbe<'a> {
    pub fn new(
        world: Option<&'a dyn SweepWorld>,
        capsule: CapsuleSpec,
        ignore: Vec<ColliderHandle>,
    ) -> Self {
        Self {
            world,
            capsule,
            ignore,
        }
    }

    #[inline]
    pub fn capsule(&self) -> CapsuleSpec {
        self.capsule
    }

    /// Sweep the capsule, degrading any execution failure to "no hit".
    pub fn sweep(&self, from: Vec3, to: Vec3) -> Option<SweepHit> {
        match self.try_sweep(from, to) {
            Ok(hit) => hit,
            Err(err) => {
                log::debug!("capsule sweep skipped: {err}");
                None
            }
        }
    }

    fn try_sweep(&self, from: Vec3, to: Vec3) -> Result<Option<SweepHit>, SweepError> {
        let world = self.world.ok_or(SweepError::WorldUnavailable)?;

        if !(self.capsule.radius > 0.0 && self.capsule.half_height.is_finite()) {
            return Err(SweepError::InvalidCapsule);
        }
        if !(from.iter().all(|v| v.is_finite()) && to.iter().all(|v| v.is_finite())) {
            return Err(SweepError::NonFiniteSweep);
        }
        if (to - from).norm_squared() <= DIST_EPS * DIST_EPS {
            return Ok(None);
        }

        world.sweep_capsule(from, to, self.capsule, &self.ignore)
    }

    /// Settle a per-tick displacement on the ground instead of letting it penetrate.
    ///
    /// Casts straight down from `location` by the larger of the capsule half-height and
    /// the downward part of `velocity`. On hit, the penetration below the surface is
    /// removed from `velocity.y`. Returns whether ground was hit.
    pub fn ground(&self, location: Vec3, velocity: &mut Vec3) -> bool {
        let drop = (-velocity.y).max(0.0);
        let reach = self.capsule.half_height.max(drop);

        let Some(hit) = self.sweep(location, location - Vec3::y() * reach) else {
            return false;
        };

        if drop > hit.distance {
            velocity.y += drop - hit.distance;
        }
        true
    }

    /// Whether the capsule can travel from `start` to `end` without hitting anything.
    #[inline]
    pub fn can_reach(&self, start: Vec3, end: Vec3) -> bool {
        self.sweep(start, end).is_none()
    }

    /// Look for a standing surface above and beyond a wall.
    ///
    /// Up (clearance above) then along `into_wall` (clearance ahead) then down (find the
    /// surface). Returns the capsule center resting on that surface.
    pub fn ledge(&self, location: Vec3, into_wall: Vec3, reach: LedgeReach) -> Option<Vec3> {
        let up = Vec3::y();

        let top = location + up * reach.rise;
        if self.sweep(location, top).is_some() {
            return None;
        }

        let ahead = top + into_wall * reach.reach;
        if self.sweep(top, ahead).is_some() {
            return None;
        }

        let bottom = ahead - up * (reach.rise + self.capsule.half_height);
        self.sweep(ahead, bottom).map(|hit| hit.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingWorld, FloorWorld, SphereBlockers};

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::new(42.0, 96.0)
    }

    #[test]
    fn missing_world_is_no_hit() {
        let probe = CollisionProbe::new(None, capsule(), Vec::new());
        assert!(probe.sweep(Vec3::zeros(), Vec3::new(0.0, -100.0, 0.0)).is_none());
        assert!(probe.can_reach(Vec3::zeros(), Vec3::x() * 100.0));
    }

    #[test]
    fn failing_world_degrades_to_no_hit() {
        let world = FailingWorld;
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());
        assert!(probe.sweep(Vec3::zeros(), Vec3::new(0.0, -100.0, 0.0)).is_none());
    }

    #[test]
    fn non_finite_sweep_is_no_hit() {
        let world = FloorWorld { floor_y: 0.0 };
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());
        assert!(probe.sweep(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::zeros()).is_none());
    }

    #[test]
    fn ground_sweep_removes_penetration() {
        // Feet start 20 units above the floor.
        let world = FloorWorld { floor_y: 0.0 };
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());
        let location = Vec3::new(0.0, 158.0, 0.0);

        let mut velocity = Vec3::new(5.0, -50.0, 0.0);
        assert!(probe.ground(location, &mut velocity));
        assert!((velocity.y + 20.0).abs() < 1.0e-4);
        assert_eq!(velocity.x, 5.0);
    }

    #[test]
    fn ground_sweep_leaves_clear_motion_alone() {
        let world = FloorWorld { floor_y: -1000.0 };
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());

        let mut velocity = Vec3::new(0.0, -10.0, 0.0);
        assert!(!probe.ground(Vec3::zeros(), &mut velocity));
        assert_eq!(velocity.y, -10.0);
    }

    #[test]
    fn blocked_path_is_unreachable() {
        let world = SphereBlockers::new(vec![(Vec3::new(100.0, 0.0, 0.0), 10.0)]);
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());

        assert!(!probe.can_reach(Vec3::zeros(), Vec3::new(200.0, 0.0, 0.0)));
        assert!(probe.can_reach(Vec3::zeros(), Vec3::new(0.0, 0.0, 200.0)));
    }

    #[test]
    fn ledge_search_finds_the_top_surface() {
        // Only a floor below the start: rise and reach are clear, down finds the floor.
        let world = FloorWorld { floor_y: 0.0 };
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());
        let stand = probe.ledge(
            Vec3::new(0.0, 150.0, 0.0),
            -Vec3::z(),
            LedgeReach {
                rise: 100.0,
                reach: 60.0,
            },
        );
        let stand = stand.expect("floor below the ledge search");
        assert!((stand.y - capsule().center_to_feet()).abs() < 1.0e-3);
        assert!((stand.z + 60.0).abs() < 1.0e-4);
    }

    #[test]
    fn ledge_search_fails_without_clearance_above() {
        let world = SphereBlockers::new(vec![(Vec3::new(0.0, 320.0, 0.0), 5.0)]);
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());
        let stand = probe.ledge(
            Vec3::new(0.0, 200.0, 0.0),
            -Vec3::z(),
            LedgeReach {
                rise: 100.0,
                reach: 60.0,
            },
        );
        assert!(stand.is_none());
    }
}
