//! Interfaces to the systems the traversal component drives but does not own.
//!
//! - [`CharacterBody`]: the base locomotion integrator (walking, falling, jumping,
//!   capsule and collision settings).
//! - [`AnimationDriver`]: the montage/socket contract of the animation layer.
//! - [`DebugDraw`]: optional diagnostic sink.
//!
//! All of them are called synchronously from the owning character's tick.

use rapier3d::prelude::ColliderHandle;

use crate::{
    probe::SweepWorld,
    types::{CapsuleSpec, Quat, Vec3},
};

/// Movement modes of the base integrator that traversal switches between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovementMode {
    #[default]
    Walking,
    Falling,
    /// Non-colliding, gravity-free mode used while hanging with raised legs.
    Flying,
}

/// Handle of an animation montage known to the animation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MontageId(pub u32);

/// The character as seen by the base locomotion integrator.
pub trait CharacterBody {
    fn location(&self) -> Vec3;
    fn set_location(&mut self, location: Vec3);

    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);

    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn is_falling(&self) -> bool;
    fn movement_mode(&self) -> MovementMode;
    fn set_movement_mode(&mut self, mode: MovementMode);

    /// Unscaled capsule dimensions.
    fn capsule(&self) -> CapsuleSpec;
    fn set_capsule_size(&mut self, capsule: CapsuleSpec);
    /// Uniform component scale applied to the capsule.
    fn capsule_scale(&self) -> f32 {
        1.0
    }

    /// Visual mesh offset relative to the capsule center. Bodies without a mesh keep zero.
    fn mesh_offset(&self) -> Vec3 {
        Vec3::zeros()
    }
    fn set_mesh_offset(&mut self, _offset: Vec3) {}

    fn collision_enabled(&self) -> bool;
    fn set_collision_enabled(&mut self, enabled: bool);

    /// Whether the base integrator turns the character toward its movement direction.
    fn orient_rotation_to_movement(&self) -> bool;
    fn set_orient_rotation_to_movement(&mut self, enabled: bool);

    fn is_crouched(&self) -> bool;
    fn crouch(&mut self);
    fn uncrouch(&mut self);

    /// Launch the base integrator's jump.
    fn jump(&mut self);

    /// The character's own collider, excluded from every sweep.
    fn collider(&self) -> Option<ColliderHandle> {
        None
    }

    /// World-scale capsule.
    fn scaled_capsule(&self) -> CapsuleSpec {
        self.capsule().scaled(self.capsule_scale())
    }

    /// World-space right axis (local +X).
    fn right(&self) -> Vec3 {
        self.rotation() * Vec3::x()
    }

    /// World-space facing direction (local -Z).
    fn forward(&self) -> Vec3 {
        self.rotation() * -Vec3::z()
    }
}

/// The animation layer's montage and socket contract.
pub trait AnimationDriver {
    /// Whether `montage` is the currently active montage.
    fn is_montage_active(&self, montage: MontageId) -> bool;
    fn play_montage(&mut self, montage: MontageId);
    /// World location of a skeleton socket, if the socket exists.
    fn socket_location(&self, socket: &str) -> Option<Vec3>;
    fn has_socket(&self, socket: &str) -> bool {
        self.socket_location(socket).is_some()
    }
}

/// Optional visual diagnostics.
pub trait DebugDraw {
    fn arrow(&mut self, from: Vec3, to: Vec3);
    fn sphere(&mut self, center: Vec3, radius: f32, hit: bool);
    fn sweep(&mut self, from: Vec3, to: Vec3, capsule: CapsuleSpec, hit: bool);
}

/// Everything a traversal operation may touch outside the component itself.
pub struct TraversalContext<'a> {
    pub body: &'a mut dyn CharacterBody,
    pub animation: &'a mut dyn AnimationDriver,
    /// `None` when no collision world is available; every sweep then reports "no hit".
    pub world: Option<&'a dyn SweepWorld>,
    pub debug: Option<&'a mut dyn DebugDraw>,
}

impl<'a> TraversalContext<'a> {
    pub fn new(body: &'a mut dyn CharacterBody, animation: &'a mut dyn AnimationDriver) -> Self {
        Self {
            body,
            animation,
            world: None,
            debug: None,
        }
    }

    pub fn with_world(mut self, world: &'a dyn SweepWorld) -> Self {
        self.world = Some(world);
        self
    }

    pub fn with_debug(mut self, debug: &'a mut dyn DebugDraw) -> Self {
        self.debug = Some(debug);
        self
    }
}
