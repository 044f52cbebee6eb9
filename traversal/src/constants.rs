//! Default tuning values for the traversal system.
//!
//! These mirror the reference climbing character. Distances are world units
//! (the reference level uses centimeters), time is in seconds.

/// Reference capsule radius.
pub const DEFAULT_CAPSULE_RADIUS: f32 = 42.0;

/// Reference capsule half-height (cylinder half-length).
pub const DEFAULT_CAPSULE_HALF_HEIGHT: f32 = 96.0;

/// Radius of the sphere used to discover action points around the character.
pub const DEFAULT_DETECTION_RADIUS: f32 = 500.0;

/// Capsule half-height while the legs are raised.
///
/// Clamped at runtime so it never drops below the capsule radius.
pub const DEFAULT_RAISED_HALF_HEIGHT: f32 = 44.0;

/// Duration of a hand-over-hand transition between two action points.
pub const CLIMB_TRANSITION_TIME: f32 = 0.5;

/// How long directional input must be held before a transition lookup fires.
pub const CLIMB_TRANSITION_INPUT_TIME: f32 = 0.15;

/// Fraction of the transition during which the leading hand is anchored.
pub const HAND_ANCHOR_WINDOW_START: f32 = 0.25;
pub const HAND_ANCHOR_WINDOW_END: f32 = 0.85;

/// Distance between the two hands on a hold.
pub const HAND_WIDTH: f32 = 40.0;

/// Climb pause applied when leaning swaps from one hand to the other.
pub const HAND_SWITCH_PAUSE_TIME: f32 = 0.25;

/// Skeleton socket names for the two hands.
pub const LEFT_HAND_SOCKET: &str = "hand_l";
pub const RIGHT_HAND_SOCKET: &str = "hand_r";

/// Input magnitude below which a stick axis is treated as released.
pub const INPUT_DEADZONE: f32 = 1.0e-3;
