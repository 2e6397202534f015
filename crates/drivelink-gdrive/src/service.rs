//! Caller-facing service facade
//!
//! [`DriveService`] is the surface consumed by UI/CLI glue: one-time
//! initialization, a readiness query, and the five remote operations.
//! Every operation checks readiness and fails with
//! [`DriveError::NotConfigured`] before any network call is attempted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use drivelink_core::{DriveConfig, RemoteObject};

use crate::auth::{CredentialManager, GOOGLE_TOKEN_URL};
use crate::catalog::ObjectCatalog;
use crate::client::{DriveClient, DRIVE_API_BASE, DRIVE_UPLOAD_BASE};
use crate::transfer::{TransferClient, TransferRequest};
use crate::DriveError;

/// Provider endpoints, overridable for testing against a mock server
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Base URL for metadata/list/delete calls
    pub api_base: String,
    /// Base URL for upload-session creation
    pub upload_base: String,
    /// OAuth2 token endpoint for the refresh grant
    pub token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: DRIVE_API_BASE.to_string(),
            upload_base: DRIVE_UPLOAD_BASE.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }
}

/// Operation components built once after a successful enabled initialize
struct Parts {
    transfer: TransferClient,
    catalog: ObjectCatalog,
}

/// The remote object-storage integration surface.
///
/// Holds the single [`CredentialManager`] and, once initialized, the
/// transfer and catalog components sharing one session. All operations are
/// async and may run concurrently; the service is `Send + Sync` and meant
/// to be shared behind an `Arc` for the process lifetime.
pub struct DriveService {
    credentials: CredentialManager,
    endpoints: Endpoints,
    parts: OnceCell<Parts>,
}

impl DriveService {
    /// Creates a service over the given configuration, targeting the real
    /// provider endpoints
    pub fn new(config: DriveConfig) -> Self {
        Self::with_endpoints(config, Endpoints::default())
    }

    /// Creates a service from the process environment
    pub fn from_env() -> Self {
        Self::new(DriveConfig::from_env())
    }

    /// Creates a service with custom endpoints (useful for testing)
    pub fn with_endpoints(config: DriveConfig, endpoints: Endpoints) -> Self {
        let credentials = CredentialManager::with_token_url(config, endpoints.token_url.clone());
        Self {
            credentials,
            endpoints,
            parts: OnceCell::new(),
        }
    }

    /// One-time initialization.
    ///
    /// Returns `Ok(false)` when the integration is disabled by
    /// configuration - an intentional state, not an error. Returns
    /// `Ok(true)` once the session and operation components exist.
    /// Idempotent; concurrent callers are serialized and observe the same
    /// outcome. Performs no network I/O.
    pub async fn initialize(&self) -> Result<bool, DriveError> {
        let ready = self.credentials.initialize().await.map_err(DriveError::Config)?;
        if !ready {
            return Ok(false);
        }

        self.parts
            .get_or_try_init(|| async {
                let session = self.credentials.session()?;
                let client = Arc::new(DriveClient::with_base_urls(
                    session,
                    self.endpoints.api_base.clone(),
                    self.endpoints.upload_base.clone(),
                ));
                debug!("Drive service components constructed");
                Ok::<_, DriveError>(Parts {
                    transfer: TransferClient::new(Arc::clone(&client)),
                    catalog: ObjectCatalog::new(client),
                })
            })
            .await?;

        Ok(true)
    }

    /// Pure readiness query: true iff a session exists
    pub fn is_configured(&self) -> bool {
        self.credentials.is_ready()
    }

    /// Streams a local file to a new remote object
    pub async fn upload(
        &self,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Result<RemoteObject, DriveError> {
        let parts = self.parts()?;
        let request = TransferRequest::from_path(path, name, mime_type);
        Ok(parts.transfer.upload(request).await?)
    }

    /// Streams a remote object to a local path, creating parent directories
    /// as needed. See [`TransferClient::download`] for the partial-file
    /// contract on failure.
    pub async fn download(
        &self,
        id: &str,
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf, DriveError> {
        let parts = self.parts()?;
        Ok(parts.transfer.download(id, destination).await?)
    }

    /// Deletes a remote object. An already-deleted id surfaces as
    /// [`CatalogError::NotFound`](crate::CatalogError::NotFound), never as
    /// success.
    pub async fn remove(&self, id: &str) -> Result<bool, DriveError> {
        let parts = self.parts()?;
        Ok(parts.catalog.remove(id).await?)
    }

    /// Lists at most `page_size` remote objects (first page only)
    pub async fn list(&self, page_size: u32) -> Result<Vec<RemoteObject>, DriveError> {
        let parts = self.parts()?;
        Ok(parts.catalog.list(page_size).await?)
    }

    /// Fetches metadata for one remote object
    pub async fn get_metadata(&self, id: &str) -> Result<RemoteObject, DriveError> {
        let parts = self.parts()?;
        Ok(parts.catalog.get_metadata(id).await?)
    }

    /// Readiness gate shared by every operation
    fn parts(&self) -> Result<&Parts, DriveError> {
        self.parts.get().ok_or(DriveError::NotConfigured)
    }
}
