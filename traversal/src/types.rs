/*!
Core math aliases and small value types shared by the traversal modules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the collision probe (capsule sweeps against world geometry)
- the climb transition engine (anchor placement, scoring)
- the traversal component (capsule resizing, hand anchoring)

Conventions
- +Y is up. Capsules are Y-aligned, matching Rapier's `Capsule::new_y`.
- A character faces its local -Z and its right axis is local +X.
*/

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Small distance used for "is this input/vector effectively zero" checks.
pub const DIST_EPS: f32 = 1.0e-6;

/// Capsule specification for a character.
///
/// half_height is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Build a capsule, clamping `half_height` so it never drops below `radius`.
    #[inline]
    pub fn new(radius: f32, half_height: f32) -> Self {
        let radius = radius.max(0.0);
        Self {
            radius,
            half_height: half_height.max(radius),
        }
    }

    /// Uniformly scale both dimensions (component scale to world scale).
    #[inline]
    pub fn scaled(self, scale: f32) -> Self {
        Self {
            radius: self.radius * scale,
            half_height: self.half_height * scale,
        }
    }

    /// Distance from the capsule center to its lowest point.
    #[inline]
    pub fn center_to_feet(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// Which hand leads (is anchored first) during a climb transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hand {
    #[default]
    None,
    Left,
    Right,
}

impl Hand {
    /// The hand that reaches first when moving with the given horizontal component.
    #[inline]
    pub fn leading(horizontal: f32) -> Self {
        if horizontal < 0.0 { Hand::Left } else { Hand::Right }
    }

    /// Signed lateral factor applied along the anchor's right axis.
    ///
    /// The body hangs beside the anchored hand, so a right-hand anchor shifts
    /// the body to the left and vice versa.
    #[inline]
    pub fn body_side(&self) -> f32 {
        match self {
            Hand::None => 0.0,
            Hand::Left => 1.0,
            Hand::Right => -1.0,
        }
    }
}

/// Linear interpolation between two points.
#[inline]
pub fn lerp(a: Vec3, b: Vec3, alpha: f32) -> Vec3 {
    a + (b - a) * alpha
}

/// Rotation facing `-forward` with `up` kept upright (local +Z is mapped to `forward`).
#[inline]
pub fn rotation_facing_away(forward: &Vec3, up: &Vec3) -> Quat {
    Quat::face_towards(forward, up)
}
