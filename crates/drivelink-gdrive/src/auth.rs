//! Session construction and one-time credential initialization
//!
//! Implements the delegated-credential model: a long-lived refresh token,
//! obtained out of band, is exchanged for short-lived access tokens on
//! demand. No interactive flow runs here and no network round-trip happens
//! at initialization time; credential validity is confirmed lazily by the
//! first real operation.
//!
//! ## Components
//!
//! - [`Session`] - an authenticated handle over the OAuth2 refresh grant
//! - [`CredentialManager`] - one-time-initialization guard owning the
//!   single process-wide session

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RedirectUrl,
    RefreshToken, TokenResponse, TokenUrl,
};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

use drivelink_core::config::{
    ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REDIRECT_URI, ENV_REFRESH_TOKEN,
};
use drivelink_core::{ConfigError, DriveConfig};

use crate::{DriveError, SessionError};

/// Google OAuth2 authorization endpoint
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth2 token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Access tokens within this margin of expiry are refreshed eagerly
const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// OAuth2 client configured for the refresh-token grant
type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

// ============================================================================
// Session
// ============================================================================

/// A short-lived access token plus its expiry
struct CachedToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_stale(&self) -> bool {
        self.expires_at < Utc::now() + Duration::minutes(EXPIRY_MARGIN_MINUTES)
    }
}

/// Authenticated handle against the remote storage provider.
///
/// Owned exclusively by [`CredentialManager`]; other components receive an
/// `Arc` reference, never ownership. Construction is pure: the first
/// [`access_token`](Session::access_token) call performs the refresh-token
/// grant. The session lives for the process lifetime and is never rotated
/// by this layer; token renewal is whatever the provider's refresh grant
/// gives implicitly.
pub struct Session {
    oauth: OAuthClient,
    refresh_token: RefreshToken,
    http: reqwest::Client,
    access: RwLock<Option<CachedToken>>,
}

impl Session {
    /// Builds a session from enabled configuration.
    ///
    /// Validates that all four credential fields are present and that the
    /// redirect URI parses; never performs network I/O.
    fn new(config: &DriveConfig, token_url: &str) -> Result<Self, ConfigError> {
        let client_id = required(ENV_CLIENT_ID, config.client_id.as_deref())?;
        let client_secret = required(ENV_CLIENT_SECRET, config.client_secret.as_deref())?;
        let redirect_uri = required(ENV_REDIRECT_URI, config.redirect_uri.as_deref())?;
        let refresh_token = required(ENV_REFRESH_TOKEN, config.refresh_token.as_deref())?;

        let oauth = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.to_string()))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string()).map_err(|e| {
                ConfigError::InvalidSetting {
                    field: "auth_url",
                    reason: e.to_string(),
                }
            })?)
            .set_token_uri(TokenUrl::new(token_url.to_string()).map_err(|e| {
                ConfigError::InvalidSetting {
                    field: "token_url",
                    reason: e.to_string(),
                }
            })?)
            .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string()).map_err(|e| {
                ConfigError::InvalidSetting {
                    field: ENV_REDIRECT_URI,
                    reason: e.to_string(),
                }
            })?);

        Ok(Self {
            oauth,
            refresh_token: RefreshToken::new(refresh_token.to_string()),
            http: reqwest::Client::new(),
            access: RwLock::new(None),
        })
    }

    /// Returns a valid access token, performing or repeating the
    /// refresh-token grant as needed.
    ///
    /// The cached token is shared across concurrent operations; renewal is
    /// double-checked under the write lock so racing callers trigger at
    /// most one grant.
    pub async fn access_token(&self) -> Result<String, SessionError> {
        {
            let cached = self.access.read().await;
            if let Some(token) = cached.as_ref().filter(|t| !t.is_stale()) {
                return Ok(token.secret.clone());
            }
        }

        let mut cached = self.access.write().await;
        if let Some(token) = cached.as_ref().filter(|t| !t.is_stale()) {
            return Ok(token.secret.clone());
        }

        debug!("Exchanging refresh token for a new access token");
        let token_result = self
            .oauth
            .exchange_refresh_token(&self.refresh_token)
            .request_async(&self.http)
            .await
            .map_err(|e| SessionError::Refresh(e.to_string()))?;

        let expires_in = token_result
            .expires_in()
            .unwrap_or_else(|| std::time::Duration::from_secs(3600));
        let expires_at = Utc::now() + Duration::seconds(expires_in.as_secs() as i64);

        let secret = token_result.access_token().secret().clone();
        *cached = Some(CachedToken {
            secret: secret.clone(),
            expires_at,
        });

        info!("Access token refreshed");
        Ok(secret)
    }
}

/// Rejects absent or empty credential fields
fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingSetting(field)),
    }
}

// ============================================================================
// CredentialManager
// ============================================================================

/// One-time initialization guard for the process-wide [`Session`].
///
/// At most one session exists per process. Concurrent first-time callers of
/// [`initialize`](CredentialManager::initialize) are serialized by the
/// internal `OnceCell`; subsequent calls short-circuit to the cached result.
/// The "intentionally disabled" outcome is cached too, so a disabled
/// configuration keeps answering `Ok(false)` without error.
pub struct CredentialManager {
    config: DriveConfig,
    token_url: String,
    session: OnceCell<Option<Arc<Session>>>,
}

impl CredentialManager {
    /// Creates a manager targeting the real Google token endpoint
    pub fn new(config: DriveConfig) -> Self {
        Self::with_token_url(config, GOOGLE_TOKEN_URL)
    }

    /// Creates a manager with a custom token endpoint (useful for testing)
    pub fn with_token_url(config: DriveConfig, token_url: impl Into<String>) -> Self {
        Self {
            config,
            token_url: token_url.into(),
            session: OnceCell::new(),
        }
    }

    /// Builds the session on first call; idempotent afterwards.
    ///
    /// Returns `Ok(false)` when the integration is disabled - an explicit
    /// "not configured" result, not a failure. Returns `Ok(true)` once a
    /// session exists. Fails with [`ConfigError`] when enabled but a
    /// required credential field is absent or malformed. Never attempts a
    /// network round-trip.
    pub async fn initialize(&self) -> Result<bool, ConfigError> {
        let slot = self
            .session
            .get_or_try_init(|| async {
                if !self.config.enabled {
                    info!("Remote storage integration disabled by configuration");
                    return Ok(None);
                }
                let session = Session::new(&self.config, &self.token_url)?;
                info!("Remote storage session constructed");
                Ok(Some(Arc::new(session)))
            })
            .await?;

        Ok(slot.is_some())
    }

    /// Pure, side-effect-free readiness query
    pub fn is_ready(&self) -> bool {
        matches!(self.session.get(), Some(Some(_)))
    }

    /// Returns the shared session, or [`DriveError::NotConfigured`] when
    /// the layer is disabled or not yet initialized.
    pub fn session(&self) -> Result<Arc<Session>, DriveError> {
        match self.session.get() {
            Some(Some(session)) => Ok(Arc::clone(session)),
            _ => Err(DriveError::NotConfigured),
        }
    }
}
