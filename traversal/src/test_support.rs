//! Scripted collaborators for unit tests.

use std::collections::HashMap;

use rapier3d::prelude::ColliderHandle;

use crate::{
    body::{AnimationDriver, CharacterBody, DebugDraw, MontageId, MovementMode},
    constants::{DEFAULT_CAPSULE_HALF_HEIGHT, DEFAULT_CAPSULE_RADIUS},
    error::SweepError,
    probe::{SweepHit, SweepWorld},
    types::{CapsuleSpec, Quat, Vec3},
};

/// A character body that simply stores what it is told.
#[derive(Clone, Debug)]
pub struct TestBody {
    pub location: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub falling: bool,
    pub mode: MovementMode,
    pub capsule: CapsuleSpec,
    pub scale: f32,
    pub mesh_offset: Vec3,
    pub collision: bool,
    pub orient_to_movement: bool,
    pub crouched: bool,
    pub jumps: u32,
    pub collider: Option<ColliderHandle>,
}

impl Default for TestBody {
    fn default() -> Self {
        Self {
            location: Vec3::zeros(),
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            falling: false,
            mode: MovementMode::Walking,
            capsule: CapsuleSpec::new(DEFAULT_CAPSULE_RADIUS, DEFAULT_CAPSULE_HALF_HEIGHT),
            scale: 1.0,
            mesh_offset: Vec3::zeros(),
            collision: true,
            orient_to_movement: true,
            crouched: false,
            jumps: 0,
            collider: None,
        }
    }
}

impl CharacterBody for TestBody {
    fn location(&self) -> Vec3 {
        self.location
    }
    fn set_location(&mut self, location: Vec3) {
        self.location = location;
    }
    fn rotation(&self) -> Quat {
        self.rotation
    }
    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }
    fn velocity(&self) -> Vec3 {
        self.velocity
    }
    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }
    fn is_falling(&self) -> bool {
        self.falling && self.mode != MovementMode::Flying
    }
    fn movement_mode(&self) -> MovementMode {
        self.mode
    }
    fn set_movement_mode(&mut self, mode: MovementMode) {
        self.mode = mode;
    }
    fn capsule(&self) -> CapsuleSpec {
        self.capsule
    }
    fn set_capsule_size(&mut self, capsule: CapsuleSpec) {
        self.capsule = capsule;
    }
    fn capsule_scale(&self) -> f32 {
        self.scale
    }
    fn mesh_offset(&self) -> Vec3 {
        self.mesh_offset
    }
    fn set_mesh_offset(&mut self, offset: Vec3) {
        self.mesh_offset = offset;
    }
    fn collision_enabled(&self) -> bool {
        self.collision
    }
    fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision = enabled;
    }
    fn orient_rotation_to_movement(&self) -> bool {
        self.orient_to_movement
    }
    fn set_orient_rotation_to_movement(&mut self, enabled: bool) {
        self.orient_to_movement = enabled;
    }
    fn is_crouched(&self) -> bool {
        self.crouched
    }
    fn crouch(&mut self) {
        self.crouched = true;
    }
    fn uncrouch(&mut self) {
        self.crouched = false;
    }
    fn jump(&mut self) {
        self.jumps += 1;
    }
    fn collider(&self) -> Option<ColliderHandle> {
        self.collider
    }
}

/// Animation layer with a single active montage slot and fixed socket offsets from the root.
#[derive(Clone, Debug, Default)]
pub struct TestAnimator {
    pub active: Option<MontageId>,
    pub played: Vec<MontageId>,
    pub sockets: HashMap<String, Vec3>,
    pub root: Vec3,
}

impl TestAnimator {
    pub fn with_socket(mut self, name: &str, offset: Vec3) -> Self {
        self.sockets.insert(name.to_owned(), offset);
        self
    }
}

impl AnimationDriver for TestAnimator {
    fn is_montage_active(&self, montage: MontageId) -> bool {
        self.active == Some(montage)
    }
    fn play_montage(&mut self, montage: MontageId) {
        self.active = Some(montage);
        self.played.push(montage);
    }
    fn socket_location(&self, socket: &str) -> Option<Vec3> {
        self.sockets.get(socket).map(|offset| self.root + offset)
    }
}

/// Records every debug primitive.
#[derive(Clone, Debug, Default)]
pub struct RecordingDraw {
    pub arrows: Vec<(Vec3, Vec3)>,
    pub spheres: Vec<(Vec3, f32, bool)>,
    pub sweeps: usize,
}

impl DebugDraw for RecordingDraw {
    fn arrow(&mut self, from: Vec3, to: Vec3) {
        self.arrows.push((from, to));
    }
    fn sphere(&mut self, center: Vec3, radius: f32, hit: bool) {
        self.spheres.push((center, radius, hit));
    }
    fn sweep(&mut self, _from: Vec3, _to: Vec3, _capsule: CapsuleSpec, _hit: bool) {
        self.sweeps += 1;
    }
}

/// World whose sweeps always fail to execute.
pub struct FailingWorld;

impl SweepWorld for FailingWorld {
    fn sweep_capsule(
        &self,
        _from: Vec3,
        _to: Vec3,
        _capsule: CapsuleSpec,
        _ignore: &[ColliderHandle],
    ) -> Result<Option<SweepHit>, SweepError> {
        Err(SweepError::WorldUnavailable)
    }
}

/// An infinite horizontal floor. Only downward sweeps that cross it hit.
pub struct FloorWorld {
    pub floor_y: f32,
}

impl SweepWorld for FloorWorld {
    fn sweep_capsule(
        &self,
        from: Vec3,
        to: Vec3,
        capsule: CapsuleSpec,
        _ignore: &[ColliderHandle],
    ) -> Result<Option<SweepHit>, SweepError> {
        let feet_from = from.y - capsule.center_to_feet();
        let feet_to = to.y - capsule.center_to_feet();
        if feet_from < self.floor_y || feet_to >= self.floor_y {
            return Ok(None);
        }

        let t = (feet_from - self.floor_y) / (feet_from - feet_to);
        let delta = to - from;
        Ok(Some(SweepHit {
            distance: delta.norm() * t,
            location: from + delta * t,
            normal: Vec3::y(),
            collider: None,
        }))
    }
}

/// Spherical obstacles, tested coarsely against the path of the capsule center.
///
/// A sweep hits when the center path comes within `sphere radius + capsule radius`
/// of an obstacle. Obstacles may be tagged with a collider so exclusion can be tested.
pub struct SphereBlockers {
    pub blockers: Vec<(Vec3, f32, Option<ColliderHandle>)>,
    pub sweeps: std::cell::Cell<usize>,
}

impl SphereBlockers {
    pub fn new(blockers: Vec<(Vec3, f32)>) -> Self {
        Self {
            blockers: blockers.into_iter().map(|(c, r)| (c, r, None)).collect(),
            sweeps: std::cell::Cell::new(0),
        }
    }

    pub fn with_owned(mut self, center: Vec3, radius: f32, owner: ColliderHandle) -> Self {
        self.blockers.push((center, radius, Some(owner)));
        self
    }
}

impl SweepWorld for SphereBlockers {
    fn sweep_capsule(
        &self,
        from: Vec3,
        to: Vec3,
        capsule: CapsuleSpec,
        ignore: &[ColliderHandle],
    ) -> Result<Option<SweepHit>, SweepError> {
        self.sweeps.set(self.sweeps.get() + 1);

        let delta = to - from;
        let len = delta.norm();
        if len <= 0.0 {
            return Ok(None);
        }
        let dir = delta / len;

        let mut best: Option<SweepHit> = None;
        for (center, radius, owner) in &self.blockers {
            if owner.is_some_and(|o| ignore.contains(&o)) {
                continue;
            }

            let reach = radius + capsule.radius;
            let m = from - center;
            let b = m.dot(&dir);
            let c = m.norm_squared() - reach * reach;
            if c > 0.0 && b > 0.0 {
                continue;
            }
            let disc = b * b - c;
            if disc < 0.0 {
                continue;
            }
            let t = (-b - disc.sqrt()).max(0.0);
            if t > len {
                continue;
            }

            if best.as_ref().is_none_or(|h| t < h.distance) {
                let location = from + dir * t;
                best = Some(SweepHit {
                    distance: t,
                    location,
                    normal: (location - center).try_normalize(1.0e-6).unwrap_or(-dir),
                    collider: *owner,
                });
            }
        }

        Ok(best)
    }
}
