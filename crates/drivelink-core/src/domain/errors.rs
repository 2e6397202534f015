//! Domain error types
//!
//! Configuration failures form their own small, closed set so callers can
//! tell a missing credential apart from a malformed one without parsing
//! message text.

use thiserror::Error;

/// Errors raised while turning a [`DriveConfig`](crate::DriveConfig) into a
/// usable session. Not retryable without operator intervention.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required credential field is absent or empty while the
    /// integration is enabled.
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    /// A credential field is present but unusable (e.g., a redirect URI
    /// that does not parse).
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        /// The offending setting name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}
