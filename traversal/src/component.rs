/*!
Per-character traversal component.

Owns the character's traversal state and drives it once per tick:

1. consume the directional input gathered since the last tick
2. sense the detection volume (enter/exit notifications feed the registry)
3. advance match-target requests
4. count down the climb pause
5. climbing: advance the running transition, or gate a new one on held input;
   not climbing: recompute the climbable band and follow the integrator's fall state
6. suppress "orient to movement" while falling or climbing
7. optional diagnostic drawing

Everything the component touches outside itself comes in through a
[`TraversalContext`] and the level's [`ActionPoints`] store. Outbound notifications
are queued and drained by the host with [`TraversalComponent::drain_events`].
*/

use crate::{
    action_point::{ActionPoint, ActionPointId, ActionPoints},
    body::{AnimationDriver, CharacterBody, MovementMode, TraversalContext},
    constants::INPUT_DEADZONE,
    error::TraversalError,
    events::{EventQueue, TraversalEvent},
    match_target::{MatchTargetRequest, MatchTargetTracker},
    probe::{CollisionProbe, LedgeReach},
    registry::{ActionPointRegistry, DetectionEvent, DetectionVolume, OverlapCandidate},
    settings::ClimbSettings,
    state::{ClimbInput, ClimbPhase, HandAnchor, Lean, TraversalState},
    transition::{
        ClimbTransition, ClimbableBand, TraverseActionPointScore, hand_location_on_action_point,
        input_direction, location_from_action_point, pick_best, rotation_from_action_point,
        score_next_candidates, select_start_point, start_distance_threshold,
    },
    types::{CapsuleSpec, Hand, Vec2, Vec3, lerp},
};

/// What raising the legs changed, so dropping them can put it back.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RaisedLegs {
    capsule: CapsuleSpec,
    mode: MovementMode,
    collision: bool,
    mesh_offset: Vec3,
    /// Scaled half-height removed from the capsule; the capsule center moved up by this much.
    lift: f32,
}

pub struct TraversalComponent {
    settings: ClimbSettings,
    state: TraversalState,

    registry: ActionPointRegistry,
    detection: Option<DetectionVolume>,
    match_targets: MatchTargetTracker,
    events: EventQueue,

    current: Option<ActionPointId>,
    input: ClimbInput,
    /// How long directional input has been held while climbing.
    hold_time: f32,
    pause_time: f32,
    frozen: bool,
    show_arrow: bool,

    band: ClimbableBand,
    last_dt: f32,

    raised: Option<RaisedLegs>,
    /// Capsule captured at begin play; ground sweeps use it regardless of posture.
    default_capsule: Option<CapsuleSpec>,

    hand_anchor: Option<HandAnchor>,
    /// Horizontal input of the last lean, for hand-switch detection.
    lean_horizontal: f32,
    last_ledge: Option<Vec3>,
}

impl Default for TraversalComponent {
    fn default() -> Self {
        Self::with_settings(ClimbSettings::default())
    }
}

impl TraversalComponent {
    /// Build a component from validated settings.
    pub fn new(settings: ClimbSettings) -> Result<Self, TraversalError> {
        if let Err(err) = settings.validate() {
            log::error!("climb settings rejected: {err}");
            return Err(err);
        }
        Ok(Self::with_settings(settings))
    }

    fn with_settings(settings: ClimbSettings) -> Self {
        Self {
            band: ClimbableBand::grounded(&settings.start),
            detection: settings.detection_radius.map(DetectionVolume::new),
            settings,
            state: TraversalState::Grounded,
            registry: ActionPointRegistry::new(),
            match_targets: MatchTargetTracker::new(),
            events: EventQueue::default(),
            current: None,
            input: ClimbInput::default(),
            hold_time: 0.0,
            pause_time: 0.0,
            frozen: false,
            show_arrow: false,
            last_dt: 0.0,
            raised: None,
            default_capsule: None,
            hand_anchor: None,
            lean_horizontal: 0.0,
            last_ledge: None,
        }
    }

    /// Capture the default capsule and seed the detection volume.
    pub fn begin_play(
        &mut self,
        body: &dyn CharacterBody,
        points: &ActionPoints,
    ) -> Result<(), TraversalError> {
        self.default_capsule = Some(body.capsule());
        self.init_detection(body.location(), points)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[inline]
    pub fn settings(&self) -> &ClimbSettings {
        &self.settings
    }

    #[inline]
    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    #[inline]
    pub fn is_climbing(&self) -> bool {
        self.state.is_climbing()
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning()
    }

    #[inline]
    pub fn has_legs_raised(&self) -> bool {
        self.raised.is_some()
    }

    #[inline]
    pub fn current_action_point(&self) -> Option<ActionPointId> {
        self.current
    }

    #[inline]
    pub fn registry(&self) -> &ActionPointRegistry {
        &self.registry
    }

    #[inline]
    pub fn input(&self) -> &ClimbInput {
        &self.input
    }

    #[inline]
    pub fn hold_time(&self) -> f32 {
        self.hold_time
    }

    #[inline]
    pub fn pause_time(&self) -> f32 {
        self.pause_time
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline]
    pub fn climbable_band(&self) -> ClimbableBand {
        self.band
    }

    /// Hand the animation layer should pin this tick, if any.
    #[inline]
    pub fn hand_anchor(&self) -> Option<&HandAnchor> {
        self.hand_anchor.as_ref()
    }

    /// Stand point found by the most recent ledge search.
    #[inline]
    pub fn last_ledge(&self) -> Option<Vec3> {
        self.last_ledge
    }

    #[inline]
    pub fn pending_events(&self) -> &[TraversalEvent] {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<TraversalEvent> {
        self.events.drain()
    }

    // ---------------------------------------------------------------------
    // Detection
    // ---------------------------------------------------------------------

    /// Seed the registry with the points already inside the detection volume.
    pub fn init_detection(&mut self, center: Vec3, points: &ActionPoints) -> Result<(), TraversalError> {
        let Some(volume) = self.detection.as_mut() else {
            log::error!("cannot detect action points: {}", TraversalError::MissingDetectionVolume);
            return Err(TraversalError::MissingDetectionVolume);
        };

        let seeded = volume.seed(center, points);
        for id in seeded {
            self.on_enter_detection_volume(OverlapCandidate::ActionPoint(id));
        }
        log::debug!("detection seeded with {} action points", self.registry.len());
        Ok(())
    }

    /// Register an overlapping action point. Anything else is ignored.
    pub fn on_enter_detection_volume(&mut self, candidate: OverlapCandidate) -> bool {
        self.registry.on_enter(candidate)
    }

    /// Unregister a point. Losing the point the character hangs on stops climbing first.
    pub fn on_exit_detection_volume(
        &mut self,
        candidate: OverlapCandidate,
        ctx: &mut TraversalContext<'_>,
        points: &mut ActionPoints,
    ) {
        if candidate.as_action_point().is_some() && candidate.as_action_point() == self.current {
            self.stop_climbing(ctx, points);
        }
        self.registry.on_exit(candidate);
    }

    fn sense_detection_volume(&mut self, ctx: &mut TraversalContext<'_>, points: &mut ActionPoints) {
        let Some(volume) = self.detection.as_mut() else {
            return;
        };

        for event in volume.sense(ctx.body.location(), points) {
            match event {
                DetectionEvent::Entered(candidate) => {
                    self.on_enter_detection_volume(candidate);
                }
                DetectionEvent::Exited(candidate) => {
                    self.on_exit_detection_volume(candidate, ctx, points);
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Input and control
    // ---------------------------------------------------------------------

    pub fn add_climb_horizontal_input(&mut self, value: f32) {
        self.input.add_horizontal(value);
    }

    pub fn add_climb_vertical_input(&mut self, value: f32) {
        self.input.add_vertical(value);
    }

    /// Stop new transitions and halt the one in flight.
    pub fn freeze_climb(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn show_arrow(&mut self, show: bool) {
        self.show_arrow = show;
    }

    /// Block new transitions for `duration` seconds.
    pub fn pause_climb(&mut self, duration: f32) {
        if duration.is_finite() {
            self.pause_time = self.pause_time.max(duration);
        }
    }

    pub fn jump(&mut self, ctx: &mut TraversalContext<'_>, points: &mut ActionPoints) {
        if ctx.body.is_falling() {
            return;
        }
        if self.state.is_climbing() {
            self.stop_climbing(ctx, points);
        }
        self.events.push(TraversalEvent::JumpInitiated);
        ctx.body.jump();
    }

    // ---------------------------------------------------------------------
    // Climbing
    // ---------------------------------------------------------------------

    /// Hang on `id`, releasing the previous point.
    pub fn set_current_action_point(&mut self, id: Option<ActionPointId>, points: &mut ActionPoints) {
        if let Some(previous) = self.current.take() {
            points.set_busy(previous, false);
        }
        if let Some(id) = id {
            points.set_busy(id, true);
            self.current = Some(id);
        }
    }

    /// Grab the best action point in reach. Returns whether climbing started.
    pub fn start_climbing(&mut self, ctx: &mut TraversalContext<'_>, points: &mut ActionPoints) -> bool {
        if self.state.is_climbing() {
            return false;
        }

        let location = ctx.body.location();
        let max_distance =
            start_distance_threshold(&self.settings.start, ctx.body.velocity(), self.last_dt);
        let Some(candidate) = select_start_point(
            points,
            &self.registry,
            location,
            ctx.body.right(),
            self.band,
            max_distance,
            &self.settings.start,
        ) else {
            log::debug!("no action point in reach to start climbing");
            return false;
        };
        let Some(point) = points.get(candidate.id) else {
            return false;
        };

        let stand = location_from_action_point(
            point,
            self.settings.start.player_offset_from_wall,
            Hand::None,
            self.settings.hand_width,
            location,
            1.0,
        );
        let rotation = rotation_from_action_point(point);

        self.set_current_action_point(Some(candidate.id), points);
        self.state = TraversalState::Climbing(ClimbPhase::Idle);
        self.hold_time = 0.0;
        self.lean_horizontal = 0.0;

        ctx.body.set_velocity(Vec3::zeros());
        ctx.body.set_location(stand + self.posture_offset());
        ctx.body.set_rotation(rotation);
        self.raise_legs(ctx.body);

        log::debug!(
            "started climbing on {:?} (distance {:.1}, lateral {:.1})",
            candidate.id,
            candidate.distance,
            candidate.lateral_distance
        );
        self.events.push(TraversalEvent::ClimbingStarted(candidate.id));
        true
    }

    /// Let go of the wall. Returns whether the character was climbing.
    pub fn stop_climbing(&mut self, ctx: &mut TraversalContext<'_>, points: &mut ActionPoints) -> bool {
        if !self.state.is_climbing() {
            return false;
        }

        self.set_current_action_point(None, points);
        self.drop_legs(ctx.body);
        ctx.body.set_movement_mode(MovementMode::Falling);

        self.state = TraversalState::Falling;
        self.band = self.band_for(&*ctx.body, self.last_dt);
        self.hold_time = 0.0;
        self.lean_horizontal = 0.0;
        self.hand_anchor = None;

        log::debug!("stopped climbing");
        self.events.push(TraversalEvent::ClimbingStopped);
        true
    }

    /// Shrink the capsule and switch to non-colliding flight. Returns whether anything changed.
    ///
    /// The capsule top stays where it was: the center moves up by the scaled half-height
    /// difference and the mesh moves down by the same amount, so it does not move in the world.
    pub fn raise_legs(&mut self, body: &mut dyn CharacterBody) -> bool {
        if !self.settings.can_ever_raise_legs || self.raised.is_some() {
            return false;
        }

        let capsule = body.capsule();
        let raised = CapsuleSpec::new(capsule.radius, self.settings.raised_half_height);
        let lift = (capsule.half_height - raised.half_height) * body.capsule_scale();
        let mesh_offset = body.mesh_offset();
        self.raised = Some(RaisedLegs {
            capsule,
            mode: body.movement_mode(),
            collision: body.collision_enabled(),
            mesh_offset,
            lift,
        });

        body.set_movement_mode(MovementMode::Flying);
        body.set_collision_enabled(false);
        body.set_capsule_size(raised);
        body.set_mesh_offset(mesh_offset - Vec3::y() * lift);
        body.set_location(body.location() + Vec3::y() * lift);

        log::debug!("legs raised");
        self.events.push(TraversalEvent::LegRaiseStarted);
        true
    }

    /// Undo [`TraversalComponent::raise_legs`] exactly. Returns whether anything changed.
    pub fn drop_legs(&mut self, body: &mut dyn CharacterBody) -> bool {
        if !self.settings.can_ever_raise_legs {
            return false;
        }
        let Some(raised) = self.raised.take() else {
            return false;
        };

        body.set_movement_mode(raised.mode);
        body.set_collision_enabled(raised.collision);
        body.set_capsule_size(raised.capsule);
        body.set_mesh_offset(raised.mesh_offset);
        body.set_location(body.location() - Vec3::y() * raised.lift);

        log::debug!("legs dropped");
        self.events.push(TraversalEvent::LegRaiseStopped);
        true
    }

    /// How far raised legs moved the capsule center up.
    fn posture_offset(&self) -> Vec3 {
        self.raised
            .map(|raised| Vec3::y() * raised.lift)
            .unwrap_or_else(Vec3::zeros)
    }

    /// Capsule center while hanging on `point`, for the current posture.
    fn stand_location(&self, point: &ActionPoint) -> Vec3 {
        location_from_action_point(
            point,
            self.settings.transition.player_offset_from_wall,
            Hand::None,
            self.settings.hand_width,
            point.position,
            1.0,
        ) + self.posture_offset()
    }

    fn band_for(&self, body: &dyn CharacterBody, dt: f32) -> ClimbableBand {
        if body.is_falling() {
            ClimbableBand::falling(&self.settings.start, body.velocity().y, dt)
        } else {
            ClimbableBand::grounded(&self.settings.start)
        }
    }

    /// Where the character stands on `point` for the running transition's hand, blended
    /// from `current` by `blend`. Hand placement only; the body itself hangs centered.
    pub fn get_location_from_action_point(&self, point: &ActionPoint, current: Vec3, blend: f32) -> Vec3 {
        let hand = self.state.transition().map(|t| t.hand).unwrap_or_default();
        location_from_action_point(
            point,
            self.settings.transition.player_offset_from_wall,
            hand,
            self.settings.hand_width,
            current,
            blend,
        )
    }

    /// Best reachable action point in the direction of the current input.
    pub fn find_next_action_point(
        &self,
        ctx: &mut TraversalContext<'_>,
        points: &ActionPoints,
    ) -> Option<TraverseActionPointScore> {
        let current = self.current?;
        let from = points.get(current)?;
        let settings = &self.settings.transition;
        let input = self.input.current;

        let scores = score_next_candidates(points, &self.registry, current, input.x, input.y, settings);
        if scores.is_empty() {
            return None;
        }

        let probe = self.probe(ctx, points, ctx.body.scaled_capsule());
        let start = ctx.body.location() + from.forward * settings.wall_step_depth;
        let mut debug = if self.show_arrow {
            ctx.debug.as_deref_mut()
        } else {
            None
        };

        pick_best(&scores, |candidate| {
            let Some(point) = points.get(candidate.id) else {
                return false;
            };
            let end = self.stand_location(point) + point.forward * settings.wall_step_depth;

            let hit = probe.sweep(start, end);
            if let Some(debug) = debug.as_deref_mut() {
                debug.sweep(start, end, probe.capsule(), hit.is_some());
            }
            hit.is_none()
        })
    }

    /// Begin moving to `target`. Ignored unless hanging idle on a point.
    pub fn start_climb_transition(
        &mut self,
        target: ActionPointId,
        direction: Vec2,
        duration: f32,
        body: &dyn CharacterBody,
        points: &ActionPoints,
    ) -> bool {
        if !self.state.is_climbing() || self.state.is_transitioning() || points.get(target).is_none() {
            return false;
        }

        let transition =
            ClimbTransition::new(target, body.location(), body.rotation(), direction, duration);
        log::debug!(
            "climb transition to {:?} with {:?} hand over {:.2}s",
            target,
            transition.hand,
            transition.duration
        );
        self.events.push(TraversalEvent::WallClimbTransitionStarted {
            horizontal: transition.direction.x,
            vertical: transition.direction.y,
        });

        self.state = TraversalState::Climbing(ClimbPhase::Transitioning(transition));
        self.hold_time = 0.0;
        true
    }

    /// Commit the running transition. A no-op when nothing is pending.
    pub fn end_climb_transition(&mut self, body: &mut dyn CharacterBody, points: &mut ActionPoints) -> bool {
        let Some(target) = self.state.transition_target() else {
            return false;
        };

        self.set_current_action_point(Some(target), points);
        if let Some(point) = points.get(target) {
            body.set_location(self.stand_location(point));
            body.set_rotation(rotation_from_action_point(point));
        }

        self.state = TraversalState::Climbing(ClimbPhase::Idle);
        self.hand_anchor = None;

        log::debug!("climb transition to {target:?} ended");
        self.events.push(TraversalEvent::WallClimbTransitionEnded);
        true
    }

    // ---------------------------------------------------------------------
    // Match targets and root motion
    // ---------------------------------------------------------------------

    /// Start a montage that blends the character toward a target.
    pub fn request_match_target(
        &mut self,
        request: MatchTargetRequest,
        ctx: &mut TraversalContext<'_>,
    ) -> Result<(), TraversalError> {
        if let Err(err) = MatchTargetTracker::check(&request) {
            log::error!("match-target request rejected: {err}");
            return Err(err);
        }

        let crouched = request.crouch && !ctx.body.is_crouched();
        if crouched {
            ctx.body.crouch();
        }
        let raised = request.raise_legs && self.raise_legs(ctx.body);

        self.match_targets
            .push(&request, ctx.body.location(), ctx.animation, crouched, raised)
    }

    /// Settle `velocity` (a per-tick displacement) on the ground. Returns whether ground was hit.
    pub fn sweep_for_ground(
        &self,
        ctx: &TraversalContext<'_>,
        points: &ActionPoints,
        velocity: &mut Vec3,
    ) -> bool {
        let capsule = self
            .default_capsule
            .unwrap_or_else(|| ctx.body.capsule())
            .scaled(ctx.body.capsule_scale());
        self.probe(ctx, points, capsule).ground(ctx.body.location(), velocity)
    }

    /// Ground-constrained copy of a root-motion displacement.
    pub fn constrain_root_motion(
        &self,
        ctx: &TraversalContext<'_>,
        points: &ActionPoints,
        velocity: Vec3,
    ) -> Vec3 {
        let mut velocity = velocity;
        self.sweep_for_ground(ctx, points, &mut velocity);
        velocity
    }

    fn tick_match_targets(&mut self, dt: f32, ctx: &mut TraversalContext<'_>, points: &ActionPoints) {
        if self.match_targets.is_empty() {
            return;
        }

        let root = ctx.body.location();
        let step = self.match_targets.advance(dt, root, &*ctx.animation, points);

        if let Some(goal) = step.location {
            let displacement = self.constrain_root_motion(ctx, points, goal - root);
            ctx.body.set_location(root + displacement);
        }

        for release in step.released {
            if release.uncrouch {
                ctx.body.uncrouch();
            }
            if release.drop_legs && !self.state.is_climbing() {
                self.drop_legs(ctx.body);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------

    pub fn tick(&mut self, dt: f32, ctx: &mut TraversalContext<'_>, points: &mut ActionPoints) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.last_dt = dt;

        self.input.consume(INPUT_DEADZONE);
        self.sense_detection_volume(ctx, points);
        self.tick_match_targets(dt, ctx, points);
        self.pause_time = (self.pause_time - dt).max(0.0);

        if self.state.is_climbing() {
            if self.state.is_transitioning() {
                self.tick_transition(dt, ctx, points);
            } else {
                self.tick_climb_input(dt, ctx, points);
            }
        } else {
            self.hand_anchor = None;
            self.band = self.band_for(&*ctx.body, dt);
            self.state = if ctx.body.is_falling() {
                TraversalState::Falling
            } else {
                TraversalState::Grounded
            };
        }

        let orient = !(ctx.body.is_falling() || self.state.is_climbing());
        if ctx.body.orient_rotation_to_movement() != orient {
            ctx.body.set_orient_rotation_to_movement(orient);
        }

        self.draw_input_arrow(ctx, points);
    }

    fn tick_transition(&mut self, dt: f32, ctx: &mut TraversalContext<'_>, points: &mut ActionPoints) {
        if self.frozen {
            return;
        }
        let Some(transition) = self.state.transition_mut() else {
            return;
        };
        transition.advance(dt);
        let transition = transition.clone();

        let Some(point) = points.get(transition.target) else {
            log::debug!("transition target {:?} disappeared", transition.target);
            self.state = TraversalState::Climbing(ClimbPhase::Idle);
            self.hand_anchor = None;
            return;
        };

        let alpha = transition.alpha();
        let goal = self.stand_location(point);
        let goal_rotation = rotation_from_action_point(point);
        ctx.body.set_location(lerp(transition.from_location, goal, alpha));
        ctx.body.set_rotation(
            transition
                .from_rotation
                .try_slerp(&goal_rotation, alpha, 1.0e-6)
                .unwrap_or(goal_rotation),
        );
        self.hand_anchor = self.hand_anchor_for(&transition, point, &*ctx.animation);

        if transition.is_finished() {
            self.end_climb_transition(ctx.body, points);
        }
    }

    fn hand_anchor_for(
        &self,
        transition: &ClimbTransition,
        point: &ActionPoint,
        animation: &dyn AnimationDriver,
    ) -> Option<HandAnchor> {
        if !transition.in_hand_window(self.settings.hand_anchor_window) {
            return None;
        }
        let socket = self.settings.hand_socket(transition.hand)?;
        if !animation.has_socket(socket) {
            return None;
        }

        let target = hand_location_on_action_point(point, transition.hand, self.settings.hand_width);
        let from = animation.socket_location(socket).unwrap_or(target);
        let weight = transition.alpha();
        Some(HandAnchor {
            socket: socket.to_owned(),
            location: lerp(from, target, weight),
            weight,
        })
    }

    fn tick_climb_input(&mut self, dt: f32, ctx: &mut TraversalContext<'_>, points: &mut ActionPoints) {
        if !self.input.is_active(INPUT_DEADZONE) {
            self.hold_time = 0.0;
            if self.state.is_leaning() {
                self.state = TraversalState::Climbing(ClimbPhase::Idle);
            }
            return;
        }

        self.hold_time += dt;
        if self.frozen
            || self.pause_time > 0.0
            || self.hold_time < self.settings.climb_transition_input_time
        {
            return;
        }

        match self.find_next_action_point(ctx, points) {
            Some(best) => {
                self.start_climb_transition(
                    best.id,
                    best.direction(),
                    self.settings.climb_transition_time,
                    ctx.body,
                    points,
                );
            }
            None => self.lean(ctx, points),
        }
    }

    fn lean(&mut self, ctx: &mut TraversalContext<'_>, points: &ActionPoints) {
        let input = self.input.current;
        let horizontal = self.input.last_nonzero_horizontal;
        let was_leaning = self.state.is_leaning();

        let hand_switch = self.lean_horizontal * horizontal < 0.0;
        if horizontal != 0.0 {
            self.lean_horizontal = horizontal;
        }
        if hand_switch {
            log::debug!("lean switched hands");
            self.pause_time = self.pause_time.max(self.settings.hand_switch_pause_time);
        }

        self.state = TraversalState::Climbing(ClimbPhase::Leaning(Lean {
            direction: input,
            hand_switch,
        }));

        if (!was_leaning || hand_switch) && input.y.abs() > input.x.abs() {
            self.search_ledge(ctx, points);
        }
    }

    fn search_ledge(&mut self, ctx: &mut TraversalContext<'_>, points: &ActionPoints) {
        let Some(current) = self.current.and_then(|id| points.get(id)) else {
            return;
        };

        let capsule = ctx.body.scaled_capsule();
        let reach = LedgeReach {
            rise: 2.0 * capsule.center_to_feet(),
            reach: 2.0 * capsule.radius + self.settings.transition.wall_step_depth,
        };
        let location = ctx.body.location();
        let found = self
            .probe(ctx, points, capsule)
            .ledge(location, -current.forward, reach);

        if self.show_arrow {
            if let Some(debug) = ctx.debug.as_deref_mut() {
                debug.sphere(found.unwrap_or(location), capsule.radius, found.is_some());
            }
        }

        self.last_ledge = found;
        if let Some(stand_location) = found {
            log::debug!("ledge found at {stand_location:?}");
            self.events.push(TraversalEvent::LedgeFound { stand_location });
        }
    }

    fn draw_input_arrow(&self, ctx: &mut TraversalContext<'_>, points: &ActionPoints) {
        if !self.show_arrow || !self.state.is_climbing() {
            return;
        }
        let Some(point) = self.current.and_then(|id| points.get(id)) else {
            return;
        };
        let input = self.input.current;
        let Some(direction) = input_direction(point, input.x, input.y) else {
            return;
        };

        let from = ctx.body.location();
        if let Some(debug) = ctx.debug.as_deref_mut() {
            debug.arrow(from, from + direction * self.settings.transition.max_distance_threshold);
        }
    }

    fn probe<'w>(
        &self,
        ctx: &TraversalContext<'w>,
        points: &ActionPoints,
        capsule: CapsuleSpec,
    ) -> CollisionProbe<'w> {
        let mut ignore = self.registry.owners(points);
        ignore.extend(ctx.body.collider());
        CollisionProbe::new(ctx.world, capsule, ignore)
    }
}
