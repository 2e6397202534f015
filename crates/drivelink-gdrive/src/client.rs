//! Google Drive API HTTP client
//!
//! Wraps `reqwest::Client` with bearer authentication fed by the shared
//! [`Session`], base-URL construction for the Drive v3 API and upload
//! endpoints, and the wire-level [`DriveFile`] type.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;

use drivelink_core::RemoteObject;

use crate::auth::Session;
use crate::SessionError;

/// Base URL for the Drive v3 API
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive v3 upload endpoints
pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Field set requested on every metadata-bearing call
pub(crate) const OBJECT_FIELDS: &str =
    "id,name,mimeType,size,createdTime,webViewLink,webContentLink";

// ============================================================================
// Wire types
// ============================================================================

/// One file record as returned by the Drive v3 API.
///
/// `size` arrives as a decimal string (the API serializes int64 as string);
/// most fields are optional because partial responses only carry the
/// requested field set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Provider-assigned file ID
    pub id: String,
    /// File name
    pub name: String,
    /// MIME type
    #[serde(default)]
    pub mime_type: Option<String>,
    /// File size in bytes, as a decimal string
    #[serde(default)]
    pub size: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    /// Browser-viewable link
    #[serde(default)]
    pub web_view_link: Option<String>,
    /// Direct content download link
    #[serde(default)]
    pub web_content_link: Option<String>,
}

impl From<DriveFile> for RemoteObject {
    fn from(file: DriveFile) -> Self {
        RemoteObject {
            id: file.id,
            name: file.name,
            mime_type: file
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            size_bytes: file.size.as_deref().and_then(|s| s.parse().ok()),
            created_at: file.created_time,
            view_url: file.web_view_link,
            download_url: file.web_content_link,
        }
    }
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Drive API calls.
///
/// Holds one `reqwest::Client` (and therefore one connection pool) shared
/// by all operations, and a reference to the single [`Session`]. The
/// session is read-only shared state; concurrent requests need no
/// coordination.
pub struct DriveClient {
    http: Client,
    api_base: String,
    upload_base: String,
    session: Arc<Session>,
}

impl DriveClient {
    /// Creates a client targeting the real Google endpoints
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_base_urls(session, DRIVE_API_BASE, DRIVE_UPLOAD_BASE)
    }

    /// Creates a client with custom base URLs (useful for testing)
    pub fn with_base_urls(
        session: Arc<Session>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into(),
            upload_base: upload_base.into(),
            session,
        }
    }

    /// Creates an authenticated request builder against the API base.
    ///
    /// Obtains an access token from the session (refreshing if needed) and
    /// attaches it as a bearer header.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, SessionError> {
        let token = self.session.access_token().await?;
        let url = format!("{}{}", self.api_base, path);
        Ok(self.http.request(method, &url).bearer_auth(token))
    }

    /// Creates an authenticated request builder against the upload base
    pub(crate) async fn upload_request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, SessionError> {
        let token = self.session.access_token().await?;
        let url = format!("{}{}", self.upload_base, path);
        Ok(self.http.request(method, &url).bearer_auth(token))
    }

    /// Returns a bearer token for requests to absolute URLs (upload
    /// session URLs are absolute and bypass the base-URL builders)
    pub(crate) async fn bearer(&self) -> Result<String, SessionError> {
        self.session.access_token().await
    }

    /// Returns the underlying HTTP client, for absolute-URL requests
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}
