//! Error types for Veil.
//!
//! This module provides the unified error type used throughout the engine.
//! Boundary operations (moves, pin enforcement) never propagate these to the
//! caller; they log the error and report a plain success flag instead.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while hiding, moving, or pinning status bar icons.
///
/// The first group mirrors the failure taxonomy of the positioning engine;
/// the rest are ambient failures from configuration and persistence.
#[derive(Debug, Error, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "message")]
pub enum VeilError {
    /// Another move or marker transition is in flight. This is a policy
    /// rejection, not a transient fault.
    #[error("Busy: {0}")]
    Busy(String),
    /// A required marker coordinate could not be determined.
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
    /// The simulated drag ran but the icon did not land in the target zone.
    #[error("Verification failed: {0}")]
    VerificationFailed(String),
    /// The accessibility permission is missing.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    /// The authentication challenge was declined or failed.
    #[error("Authentication failed")]
    AuthFailed,
    /// Too many failed challenges; further attempts are rejected for a while.
    #[error("Authentication locked out for {remaining_secs}s")]
    AuthLockedOut {
        /// Seconds left before a new challenge may be presented.
        remaining_secs: u64,
    },
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Pin store could not be read or written.
    #[error("Pin store error: {0}")]
    PinStoreError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
}

impl VeilError {
    /// Returns `true` for rejections caused by another operation in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool { matches!(self, Self::Busy(_)) }
}

impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for VeilError {
    fn from(err: serde_json::Error) -> Self { Self::PinStoreError(err.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_display() {
        let err = VeilError::Busy("move in progress".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Busy"));
        assert!(msg.contains("move in progress"));
        assert!(err.is_busy());
    }

    #[test]
    fn test_position_unavailable_is_not_busy() {
        let err = VeilError::PositionUnavailable("separator".to_string());
        assert!(!err.is_busy());
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn test_lockout_display_includes_remaining() {
        let err = VeilError::AuthLockedOut { remaining_secs: 12 };
        assert_eq!(err.to_string(), "Authentication locked out for 12s");
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: VeilError = io_err.into();
        assert!(matches!(err, VeilError::IoError(_)));
    }

    #[test]
    fn test_invalid_arguments_display_is_bare() {
        let err = VeilError::InvalidArguments("bad pin".to_string());
        assert_eq!(err.to_string(), "bad pin");
    }

    #[test]
    fn test_error_serializes_with_kind() {
        let err = VeilError::VerificationFailed("still visible".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("VerificationFailed"));
        assert!(json.contains("still visible"));
    }
}
