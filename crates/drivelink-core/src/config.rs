//! Configuration module for DriveLink.
//!
//! Provides the typed configuration struct that maps the `DRIVE_*`
//! environment keys. Settings are resolved once at process start; changing
//! them requires a restart (no hot reload).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Environment keys
// ---------------------------------------------------------------------------

/// Enable/disable flag. Absent, empty, `"false"` or `"0"` mean disabled.
pub const ENV_ENABLED: &str = "DRIVE_ENABLED";
/// OAuth2 client identifier.
pub const ENV_CLIENT_ID: &str = "DRIVE_CLIENT_ID";
/// OAuth2 client secret.
pub const ENV_CLIENT_SECRET: &str = "DRIVE_CLIENT_SECRET";
/// OAuth2 redirect URI registered with the provider.
pub const ENV_REDIRECT_URI: &str = "DRIVE_REDIRECT_URI";
/// Long-lived refresh token obtained out of band.
pub const ENV_REFRESH_TOKEN: &str = "DRIVE_REFRESH_TOKEN";

// ---------------------------------------------------------------------------
// DriveConfig
// ---------------------------------------------------------------------------

/// Process-wide settings for the remote storage integration.
///
/// Credential fields are `Option` because their absence is only an error
/// once the integration is enabled and initialization runs; a disabled
/// configuration with no credentials is a perfectly valid state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Whether the integration is enabled at all. When false, no session
    /// is ever constructed and operations fail fast without network access.
    pub enabled: bool,
    /// OAuth2 client identifier.
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    pub client_secret: Option<String>,
    /// Redirect URI registered with the provider's app configuration.
    pub redirect_uri: Option<String>,
    /// Long-lived refresh token used for the non-interactive token grant.
    pub refresh_token: Option<String>,
}

impl DriveConfig {
    /// Resolves the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through an arbitrary key lookup.
    ///
    /// This is the seam used by tests to resolve from a map instead of the
    /// real environment; `from_env` is a thin wrapper over it.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            enabled: lookup(ENV_ENABLED)
                .map(|v| parse_enabled(&v))
                .unwrap_or(false),
            client_id: non_empty(ENV_CLIENT_ID),
            client_secret: non_empty(ENV_CLIENT_SECRET),
            redirect_uri: non_empty(ENV_REDIRECT_URI),
            refresh_token: non_empty(ENV_REFRESH_TOKEN),
        }
    }
}

/// Parses a boolean-like environment value. Unknown values mean disabled.
fn parse_enabled(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
