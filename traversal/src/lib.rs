pub mod action_point;
pub mod body;
pub mod component;
pub mod constants;
pub mod error;
pub mod events;
pub mod match_target;
pub mod probe;
pub mod registry;
pub mod settings;
pub mod state;
pub mod transition;
pub mod types;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;

pub use action_point::{ActionPoint, ActionPointId, ActionPointType, ActionPoints};
pub use body::{
    AnimationDriver, CharacterBody, DebugDraw, MontageId, MovementMode, TraversalContext,
};
pub use component::TraversalComponent;
pub use error::{SweepError, TraversalError};
pub use events::TraversalEvent;
pub use match_target::{MatchTarget, MatchTargetRequest};
pub use probe::{CollisionProbe, SweepHit, SweepWorld};
pub use registry::{ActionPointRegistry, DetectionVolume, OverlapCandidate};
pub use settings::{ClimbSettings, TraverseSettings};
pub use state::{ClimbPhase, HandAnchor, TraversalState};
pub use transition::{ClimbableBand, TraverseActionPointScore};
pub use types::{CapsuleSpec, Hand, Quat, Vec2, Vec3};
pub use world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};

// Re-export Rapier so hosts can build colliders and handles without depending on it directly.
pub use rapier3d;
