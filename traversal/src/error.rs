//! Error taxonomy for the traversal system.
//!
//! None of these are fatal: callers log them and keep base locomotion running.

/// Misconfiguration of a character's traversal setup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TraversalError {
    /// The character has no detection volume to discover action points with.
    #[error("no action point detection volume configured")]
    MissingDetectionVolume,

    /// A match-target request did not name a montage.
    #[error("match-target request has no animation montage")]
    MissingMontage,

    /// A match-target request did not name a target.
    #[error("match-target request has no match target")]
    MissingMatchTarget,

    /// A settings value is out of range.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSettings { field: &'static str, reason: String },
}

/// Failure to execute a collision sweep (as opposed to a sweep that finds nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SweepError {
    #[error("capsule has a non-positive or non-finite dimension")]
    InvalidCapsule,

    #[error("sweep endpoints are not finite")]
    NonFiniteSweep,

    #[error("no collision world available")]
    WorldUnavailable,
}
