/*!
Traversal settings.

Two `TraverseSettings` instances drive the climb logic:
- `start`: thresholds used when grabbing the first action point from the ground or
  while falling.
- `transition`: thresholds used when moving from one action point to the next.

`ClimbSettings` bundles both together with the timing and posture values of a
character. Everything here is read-only during traversal logic; hosts usually
load it from data files through serde and call [`ClimbSettings::validate`] once.
*/

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    constants::{
        CLIMB_TRANSITION_INPUT_TIME, CLIMB_TRANSITION_TIME, DEFAULT_DETECTION_RADIUS,
        DEFAULT_RAISED_HALF_HEIGHT, HAND_ANCHOR_WINDOW_END, HAND_ANCHOR_WINDOW_START, HAND_WIDTH,
        HAND_SWITCH_PAUSE_TIME, LEFT_HAND_SOCKET, RIGHT_HAND_SOCKET,
    },
    error::TraversalError,
    types::{Hand, Vec3},
};

/// Numeric thresholds for one traversal phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraverseSettings {
    /// Farthest an action point may be from the character (or current point).
    pub max_distance_threshold: f32,
    /// Closest a transition target may be to the current point.
    pub min_distance_threshold: f32,
    /// Facing alignment threshold. Validated and carried with the data; no selection step reads it.
    pub max_dot_threshold: f32,
    /// Upper bound of the climbable band, relative to the character.
    pub max_height_threshold: f32,
    /// Lower bound of the climbable band, relative to the character.
    pub min_height_threshold: f32,
    /// Maximum sideways deviation of a candidate.
    pub lateral_threshold: f32,
    /// Scales how far the band shifts with fall velocity.
    pub falling_height_scalar: f32,
    /// Stand location relative to an action point, in its (forward, right, up) basis.
    pub player_offset_from_wall: Vec3,
    /// How far the reachability sweep backs off the wall.
    pub wall_step_depth: f32,
    /// Scales distance thresholds by speed (start) or search radius (transition).
    pub max_distance_scalar: f32,
}

impl TraverseSettings {
    /// Thresholds for grabbing the first action point.
    pub fn start_defaults() -> Self {
        Self {
            max_distance_threshold: 200.0,
            min_distance_threshold: 0.0,
            max_dot_threshold: 0.5,
            max_height_threshold: 75.0,
            min_height_threshold: -50.0,
            lateral_threshold: 100.0,
            falling_height_scalar: 1.5,
            player_offset_from_wall: Vec3::new(28.169_436, 0.0, -86.333_076),
            wall_step_depth: 0.0,
            max_distance_scalar: 1.5,
        }
    }

    /// Thresholds for moving between action points while climbing.
    pub fn transition_defaults() -> Self {
        Self {
            max_distance_threshold: 200.0,
            min_distance_threshold: crate::constants::DEFAULT_CAPSULE_RADIUS,
            max_dot_threshold: 0.5,
            max_height_threshold: 75.0,
            min_height_threshold: -50.0,
            lateral_threshold: 100.0,
            falling_height_scalar: 1.5,
            player_offset_from_wall: Vec3::new(50.0, 0.0, -50.0),
            wall_step_depth: 30.0,
            max_distance_scalar: 1.5,
        }
    }

    /// Check ranges and ordering constraints.
    pub fn validate(&self) -> Result<(), TraversalError> {
        if self.max_height_threshold < self.min_height_threshold {
            return Err(TraversalError::InvalidSettings {
                field: "max_height_threshold",
                reason: format!(
                    "{} is below min_height_threshold {}",
                    self.max_height_threshold, self.min_height_threshold
                ),
            });
        }

        let non_negative = [
            ("max_distance_threshold", self.max_distance_threshold),
            ("min_distance_threshold", self.min_distance_threshold),
            ("lateral_threshold", self.lateral_threshold),
            ("falling_height_scalar", self.falling_height_scalar),
            ("wall_step_depth", self.wall_step_depth),
            ("max_distance_scalar", self.max_distance_scalar),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TraversalError::InvalidSettings {
                    field,
                    reason: format!("{value} must be a non-negative number"),
                });
            }
        }

        if self.min_distance_threshold > self.max_distance_threshold {
            return Err(TraversalError::InvalidSettings {
                field: "min_distance_threshold",
                reason: "exceeds max_distance_threshold".into(),
            });
        }

        if !(-1.0..=1.0).contains(&self.max_dot_threshold) {
            return Err(TraversalError::InvalidSettings {
                field: "max_dot_threshold",
                reason: format!("{} is outside [-1, 1]", self.max_dot_threshold),
            });
        }

        Ok(())
    }

    /// Radius used to normalise distances when scoring transition candidates.
    #[inline]
    pub fn search_radius(&self) -> f32 {
        self.max_distance_threshold * self.max_distance_scalar.max(1.0)
    }
}

impl Default for TraverseSettings {
    fn default() -> Self {
        Self::start_defaults()
    }
}

/// A `TraverseSettings` block as read from data, with every field optional.
///
/// The two instances in `ClimbSettings` have different defaults, so a partial block is
/// merged onto the defaults of the instance it fills rather than onto `Default`.
#[derive(Default, Deserialize)]
#[serde(default)]
struct TraverseSettingsPatch {
    max_distance_threshold: Option<f32>,
    min_distance_threshold: Option<f32>,
    max_dot_threshold: Option<f32>,
    max_height_threshold: Option<f32>,
    min_height_threshold: Option<f32>,
    lateral_threshold: Option<f32>,
    falling_height_scalar: Option<f32>,
    player_offset_from_wall: Option<Vec3>,
    wall_step_depth: Option<f32>,
    max_distance_scalar: Option<f32>,
}

impl TraverseSettingsPatch {
    fn apply(self, base: TraverseSettings) -> TraverseSettings {
        TraverseSettings {
            max_distance_threshold: self.max_distance_threshold.unwrap_or(base.max_distance_threshold),
            min_distance_threshold: self.min_distance_threshold.unwrap_or(base.min_distance_threshold),
            max_dot_threshold: self.max_dot_threshold.unwrap_or(base.max_dot_threshold),
            max_height_threshold: self.max_height_threshold.unwrap_or(base.max_height_threshold),
            min_height_threshold: self.min_height_threshold.unwrap_or(base.min_height_threshold),
            lateral_threshold: self.lateral_threshold.unwrap_or(base.lateral_threshold),
            falling_height_scalar: self.falling_height_scalar.unwrap_or(base.falling_height_scalar),
            player_offset_from_wall: self
                .player_offset_from_wall
                .unwrap_or(base.player_offset_from_wall),
            wall_step_depth: self.wall_step_depth.unwrap_or(base.wall_step_depth),
            max_distance_scalar: self.max_distance_scalar.unwrap_or(base.max_distance_scalar),
        }
    }
}

fn start_settings<'de, D: Deserializer<'de>>(d: D) -> Result<TraverseSettings, D::Error> {
    Ok(TraverseSettingsPatch::deserialize(d)?.apply(TraverseSettings::start_defaults()))
}

fn transition_settings<'de, D: Deserializer<'de>>(d: D) -> Result<TraverseSettings, D::Error> {
    Ok(TraverseSettingsPatch::deserialize(d)?.apply(TraverseSettings::transition_defaults()))
}

/// Per-character climbing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbSettings {
    #[serde(deserialize_with = "start_settings")]
    pub start: TraverseSettings,
    /// Missing fields of a partial block take the transition defaults, not the start ones.
    #[serde(deserialize_with = "transition_settings")]
    pub transition: TraverseSettings,

    /// Duration of a transition between two action points.
    pub climb_transition_time: f32,
    /// Directional input hold time before a transition lookup fires.
    pub climb_transition_input_time: f32,
    /// Fraction of the transition `[start, end]` during which the leading hand is anchored.
    pub hand_anchor_window: (f32, f32),
    /// Distance between both hands on a hold.
    pub hand_width: f32,
    /// Climb pause applied when leaning swaps hands.
    pub hand_switch_pause_time: f32,

    /// Whether this character supports raising its legs at all.
    pub can_ever_raise_legs: bool,
    /// Unscaled capsule half-height while the legs are raised.
    pub raised_half_height: f32,

    /// Radius of the detection sphere; `None` means the character has no detection volume.
    pub detection_radius: Option<f32>,

    pub left_hand_socket: String,
    pub right_hand_socket: String,
}

impl ClimbSettings {
    pub fn validate(&self) -> Result<(), TraversalError> {
        self.start.validate()?;
        self.transition.validate()?;

        let (window_start, window_end) = self.hand_anchor_window;
        if !(0.0..=1.0).contains(&window_start)
            || !(0.0..=1.0).contains(&window_end)
            || window_start > window_end
        {
            return Err(TraversalError::InvalidSettings {
                field: "hand_anchor_window",
                reason: format!("({window_start}, {window_end}) is not an ordered range in [0, 1]"),
            });
        }

        let non_negative = [
            ("climb_transition_time", self.climb_transition_time),
            ("climb_transition_input_time", self.climb_transition_input_time),
            ("hand_width", self.hand_width),
            ("hand_switch_pause_time", self.hand_switch_pause_time),
            ("raised_half_height", self.raised_half_height),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TraversalError::InvalidSettings {
                    field,
                    reason: format!("{value} must be a non-negative number"),
                });
            }
        }

        Ok(())
    }

    /// Socket name of the given hand, if any.
    pub fn hand_socket(&self, hand: Hand) -> Option<&str> {
        match hand {
            Hand::None => None,
            Hand::Left => Some(&self.left_hand_socket),
            Hand::Right => Some(&self.right_hand_socket),
        }
    }
}

impl Default for ClimbSettings {
    fn default() -> Self {
        Self {
            start: TraverseSettings::start_defaults(),
            transition: TraverseSettings::transition_defaults(),
            climb_transition_time: CLIMB_TRANSITION_TIME,
            climb_transition_input_time: CLIMB_TRANSITION_INPUT_TIME,
            hand_anchor_window: (HAND_ANCHOR_WINDOW_START, HAND_ANCHOR_WINDOW_END),
            hand_width: HAND_WIDTH,
            hand_switch_pause_time: HAND_SWITCH_PAUSE_TIME,
            can_ever_raise_legs: true,
            raised_half_height: DEFAULT_RAISED_HALF_HEIGHT,
            detection_radius: Some(DEFAULT_DETECTION_RADIUS),
            left_hand_socket: LEFT_HAND_SOCKET.to_owned(),
            right_hand_socket: RIGHT_HAND_SOCKET.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_settings_are_valid() {
        assert_eq!(ClimbSettings::default().validate(), Ok(()));
    }

    #[test]
    fn inverted_height_band_is_rejected() {
        let mut settings = TraverseSettings::start_defaults();
        settings.max_height_threshold = -60.0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(
            err,
            TraversalError::InvalidSettings {
                field: "max_height_threshold",
                ..
            }
        ));
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let mut settings = TraverseSettings::transition_defaults();
        settings.lateral_threshold = f32::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn unordered_hand_window_is_rejected() {
        let settings = ClimbSettings {
            hand_anchor_window: (0.9, 0.1),
            ..ClimbSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{
            "climb_transition_time": 0.8,
            "transition": { "lateral_threshold": 60.0 },
            "detection_radius": null
        }"#;
        let settings: ClimbSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.climb_transition_time, 0.8);
        assert_eq!(settings.transition.lateral_threshold, 60.0);
        assert_eq!(settings.transition.max_distance_threshold, 200.0);
        assert_eq!(settings.detection_radius, None);
        assert_eq!(settings.right_hand_socket, RIGHT_HAND_SOCKET);
    }

    #[test]
    fn partial_transition_block_keeps_transition_defaults() {
        let json = r#"{ "transition": { "lateral_threshold": 60.0 } }"#;
        let settings: ClimbSettings = serde_json::from_str(json).unwrap();
        let defaults = TraverseSettings::transition_defaults();

        assert_eq!(settings.transition.lateral_threshold, 60.0);
        assert_eq!(settings.transition.wall_step_depth, defaults.wall_step_depth);
        assert_eq!(settings.transition.min_distance_threshold, defaults.min_distance_threshold);
        assert_eq!(
            settings.transition.player_offset_from_wall,
            defaults.player_offset_from_wall
        );
        assert_eq!(settings.start, TraverseSettings::start_defaults());
    }

    #[test]
    fn partial_start_block_keeps_start_defaults() {
        let json = r#"{ "start": { "wall_step_depth": 12.0 } }"#;
        let settings: ClimbSettings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.start.wall_step_depth, 12.0);
        assert_eq!(settings.start.min_distance_threshold, 0.0);
        assert_eq!(
            settings.start.player_offset_from_wall,
            TraverseSettings::start_defaults().player_offset_from_wall
        );
        assert_eq!(settings.transition, TraverseSettings::transition_defaults());
    }
}
