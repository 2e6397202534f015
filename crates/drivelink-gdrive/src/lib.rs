//! DriveLink GDrive - Google Drive adapter
//!
//! Provides the async remote object-storage integration:
//! - Session construction from delegated (refresh-token) credentials
//! - Streaming upload/download against the Drive v3 API
//! - Catalog operations: list, metadata fetch, delete
//! - A small caller-facing service facade
//!
//! ## Modules
//!
//! - [`auth`] - Session and one-time credential initialization
//! - [`client`] - Authenticated Drive API HTTP client and wire types
//! - [`transfer`] - Streaming upload/download operations
//! - [`catalog`] - Non-streaming metadata operations
//! - [`service`] - The seven caller-facing entry points

pub mod auth;
pub mod catalog;
pub mod client;
pub mod service;
pub mod transfer;

pub use auth::{CredentialManager, Session};
pub use service::{DriveService, Endpoints};

use std::time::Duration;

use drivelink_core::ConfigError;
use thiserror::Error;

/// Errors raised while obtaining an access token from the provider
#[derive(Debug, Error)]
pub enum SessionError {
    /// The refresh-token grant was rejected or could not be completed
    #[error("token refresh failed: {0}")]
    Refresh(String),
}

/// Errors raised by streaming upload/download operations
///
/// Any failure mid-stream terminates the operation; the caller must assume
/// partial local/remote state. No retry is performed by this layer because
/// a blind retry of a non-idempotent create risks duplicate remote objects.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Could not obtain an access token for the request
    #[error("authorization failed: {0}")]
    Auth(String),

    /// A network-level error occurred
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A local filesystem read or write failed
    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested object does not exist remotely
    #[error("object not found: {0}")]
    NotFound(String),

    /// The remote side rejected the transfer
    #[error("remote rejected transfer ({status}): {body}")]
    Remote {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body, best effort
        body: String,
    },

    /// The provider's response could not be parsed
    #[error("invalid response: {0}")]
    Decode(String),

    /// The upload session ended without the provider confirming completion
    #[error("upload session ended before completion")]
    Incomplete,
}

/// Errors raised by catalog (list/metadata/delete) operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The target object does not exist remotely. Surfaced distinctly so
    /// callers can decide whether "already deleted" counts as success.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Could not obtain an access token for the request
    #[error("authorization failed: {0}")]
    Auth(String),

    /// The provider rejected the credentials attached to the request
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Rate limit exceeded; retry after the specified duration if known
    #[error("too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying, from the `Retry-After` header
        retry_after: Option<Duration>,
    },

    /// A network-level error occurred
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote side returned an unexpected status
    #[error("remote error ({status}): {body}")]
    Remote {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body, best effort
        body: String,
    },

    /// The provider's response could not be parsed
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Umbrella error returned by the caller-facing [`DriveService`]
///
/// A closed set of tagged kinds so callers branch on variant, never on
/// message text.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Required credential missing or session construction failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Operation attempted while the layer is disabled or not initialized.
    /// Distinct from [`DriveError::Config`] because it may be an expected,
    /// intentional state.
    #[error("remote storage integration is not configured")]
    NotConfigured,

    /// Streaming upload/download failed mid-flight
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Metadata/list/delete call failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<SessionError> for TransferError {
    fn from(err: SessionError) -> Self {
        TransferError::Auth(err.to_string())
    }
}

impl From<SessionError> for CatalogError {
    fn from(err: SessionError) -> Self {
        CatalogError::Auth(err.to_string())
    }
}
