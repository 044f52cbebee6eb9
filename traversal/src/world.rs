//! Rapier-based query world for static level geometry.
//!
//! Builds an in-memory Rapier scene from a set of static collider definitions and answers
//! the capsule sweeps of [`SweepWorld`] against it.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-only: no dynamics are ever stepped, statics do not move after construction.
//! - Addressable: every definition id maps to its collider handle, so action points can
//!   name the geometry they are attached to and have sweeps ignore it.

use rapier3d::{
    na::Translation3,
    parry::query::ShapeCastOptions,
    prelude::*,
};

use crate::{
    error::SweepError,
    probe::{SweepHit, SweepWorld},
    types::{CapsuleSpec, DIST_EPS, Iso, Quat, Vec3},
};

/// Definition of an immutable level collider.
///
/// Conventions
/// - Units match the character (the reference character is 42 units in radius).
/// - For planes, the normal is derived from the pose: `normal = rotation * +Y`,
///   and `dist = dot(normal, translation) + offset_along_normal`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space), offset along its pose-derived normal.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vec3 },

    Sphere { radius: f32 },

    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },
}

/// Static world geometry plus the Rapier structures needed to query it.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    /// Collider handle of every definition, sorted by definition id.
    handles: Vec<(u32, ColliderHandle)>,
}

impl RapierQueryWorld {
    /// Build a query world from a list of static collider definitions.
    ///
    /// The input is sorted by `id` before insertion. NaN or otherwise invalid values
    /// should be filtered by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut handles = Vec::with_capacity(defs.len());

        // Each static is a fixed rigid-body with one attached collider.
        for def in defs.into_iter() {
            let iso = Iso::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = RigidBodyBuilder::fixed().pose(iso).build();
            let rb_handle = bodies.insert(rb);

            let collider = collider_from_def(&def);
            let handle = colliders.insert_with_parent(collider, rb_handle, &mut bodies);
            handles.push((def.id, handle));
        }

        // Collision detection only (no dynamics): fills the broad-phase BVH so queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();

        let hooks = ();
        let events = ();

        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        log::debug!("static query world built with {} colliders", handles.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
            handles,
        }
    }

    /// Collider built for the definition with this id.
    pub fn collider(&self, id: u32) -> Option<ColliderHandle> {
        self.handles
            .binary_search_by_key(&id, |(def_id, _)| *def_id)
            .ok()
            .map(|i| self.handles[i].1)
    }

    /// Create a borrowed `QueryPipeline` view for scene queries.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl SweepWorld for RapierQueryWorld {
    fn sweep_capsule(
        &self,
        from: Vec3,
        to: Vec3,
        capsule: CapsuleSpec,
        ignore: &[ColliderHandle],
    ) -> Result<Option<SweepHit>, SweepError> {
        if !(capsule.radius > 0.0 && capsule.half_height >= 0.0) {
            return Err(SweepError::InvalidCapsule);
        }

        let delta = to - from;
        let length = delta.norm();
        if !length.is_finite() {
            return Err(SweepError::NonFiniteSweep);
        }
        if length <= DIST_EPS {
            return Ok(None);
        }
        let direction = delta / length;

        let shape = Capsule::new_y(capsule.half_height, capsule.radius);
        let pose = Iso::translation(from.x, from.y, from.z);

        let skip_ignored = |handle: ColliderHandle, _: &Collider| !ignore.contains(&handle);
        let filter = QueryFilter::default().predicate(&skip_ignored);
        let pipeline = self.query_pipeline(filter);

        // Unit direction, so time of impact is the distance travelled.
        let mut options = ShapeCastOptions::with_max_time_of_impact(length);
        options.stop_at_penetration = true;

        let hit = pipeline
            .cast_shape(&pose, &direction, &shape, options)
            .map(|(handle, hit)| {
                // Surface normal facing the capsule, opposing the motion.
                let mut normal = -hit.normal1.into_inner();
                if normal.dot(&direction) > 0.0 {
                    normal = -normal;
                }
                SweepHit {
                    distance: hit.time_of_impact,
                    location: from + direction * hit.time_of_impact,
                    normal,
                    collider: Some(handle),
                }
            });

        Ok(hit)
    }
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// The pose lives on the parent rigid-body, so colliders get an identity local transform
/// (except planes, which are placed along their normal).
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            let n = def.rotation * Vec3::y();
            let dist = n.dot(&def.translation) + *offset_along_normal;
            let unit_n = UnitVector::new_normalize(n);

            ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n)))
                .translation(unit_n.into_inner() * dist)
                .build()
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build()
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius).build(),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius).build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::CollisionProbe;

    fn level() -> RapierQueryWorld {
        RapierQueryWorld::build(vec![
            // Wall slab facing -X, listed first to check id ordering.
            WorldStaticDef {
                id: 2,
                translation: Vec3::new(100.0, 0.0, 0.0),
                rotation: Quat::identity(),
                shape: ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(10.0, 500.0, 500.0),
                },
            },
            // Floor with its top face at y = 0.
            WorldStaticDef {
                id: 1,
                translation: Vec3::new(0.0, -10.0, 0.0),
                rotation: Quat::identity(),
                shape: ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(1000.0, 10.0, 1000.0),
                },
            },
        ])
    }

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::new(42.0, 96.0)
    }

    #[test]
    fn handles_are_addressable_by_id() {
        let world = level();
        assert!(world.collider(1).is_some());
        assert!(world.collider(2).is_some());
        assert_ne!(world.collider(1), world.collider(2));
        assert!(world.collider(3).is_none());
    }

    #[test]
    fn ground_sweep_settles_on_the_floor() {
        let world = level();
        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());

        // Capsule bottom 20 units above the floor.
        let mut velocity = Vec3::new(0.0, -50.0, 0.0);
        assert!(probe.ground(Vec3::new(0.0, 158.0, 0.0), &mut velocity));
        assert!((velocity.y + 20.0).abs() < 0.1);
    }

    #[test]
    fn wall_blocks_reachability_unless_ignored() {
        let world = level();
        let start = Vec3::new(0.0, 300.0, 0.0);

        let probe = CollisionProbe::new(Some(&world), capsule(), Vec::new());
        assert!(!probe.can_reach(start, Vec3::new(200.0, 300.0, 0.0)));
        assert!(probe.can_reach(start, Vec3::new(0.0, 300.0, 200.0)));

        let hit = probe.sweep(start, Vec3::new(200.0, 300.0, 0.0)).unwrap();
        assert_eq!(hit.collider, world.collider(2));
        assert!((hit.distance - 48.0).abs() < 0.1);
        assert!(hit.normal.x < -0.9);

        let wall = world.collider(2).unwrap();
        let ignoring = CollisionProbe::new(Some(&world), capsule(), vec![wall]);
        assert!(ignoring.can_reach(start, Vec3::new(200.0, 300.0, 0.0)));
    }

    #[test]
    fn invalid_capsule_is_an_error() {
        let world = level();
        let result = world.sweep_capsule(
            Vec3::zeros(),
            Vec3::x(),
            CapsuleSpec {
                radius: 0.0,
                half_height: 1.0,
            },
            &[],
        );
        assert_eq!(result, Err(SweepError::InvalidCapsule));
    }
}
