//! Error types for the rig editor core

use igde_core::HandleError;
use thiserror::Error;

/// Rig editor errors
///
/// Apart from [`RigError::Exhausted`] every variant is an invalid argument:
/// the editor disables actions whose preconditions are not met, so these
/// only surface on caller bugs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RigError {
    /// Null handle passed where an element is required
    #[error("Null {0} handle")]
    Null(&'static str),

    /// Handle does not resolve to an element of the rig
    #[error("{kind} not found: {bits:#010x}")]
    NotFound { kind: &'static str, bits: u32 },

    /// Element is not a member of its selection
    #[error("{kind} is not selected: {bits:#010x}")]
    NotSelected { kind: &'static str, bits: u32 },

    /// No free slot left for another element
    #[error("No room for another {0}")]
    Exhausted(&'static str),
}

impl RigError {
    /// Map a failed arena lookup, keeping the offending handle.
    pub(crate) fn from_handle(err: HandleError, kind: &'static str, bits: u32) -> Self {
        match err {
            HandleError::Null => Self::Null(kind),
            HandleError::Stale | HandleError::OutOfBounds => Self::NotFound { kind, bits },
            HandleError::Exhausted => Self::Exhausted(kind),
        }
    }
}

/// Result type for rig operations
pub type Result<T> = std::result::Result<T, RigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_arena_keeps_kind() {
        assert_eq!(
            RigError::from_handle(HandleError::Exhausted, "bone", u32::MAX),
            RigError::Exhausted("bone")
        );
        assert_eq!(
            RigError::from_handle(HandleError::OutOfBounds, "shape", 7),
            RigError::NotFound { kind: "shape", bits: 7 }
        );
        assert_eq!(RigError::Exhausted("push").to_string(), "No room for another push");
    }
}
