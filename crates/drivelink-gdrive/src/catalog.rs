//! Non-streaming metadata operations: list, metadata fetch, delete
//!
//! All operations are single round-trips against the Drive v3 `files`
//! collection. Failures are mapped onto the closed [`CatalogError`] set so
//! callers can branch on kind (a 404 is always `NotFound`, never a string
//! to parse).

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use drivelink_core::RemoteObject;

use crate::client::{DriveClient, DriveFile, OBJECT_FIELDS};
use crate::CatalogError;

/// Response envelope for `GET /files`.
///
/// `next_page_token` is parsed but intentionally unused: this layer returns
/// only the first page (full enumeration is out of scope).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    #[allow(dead_code)]
    next_page_token: Option<String>,
}

/// Catalog of remote objects.
///
/// Independent of [`TransferClient`](crate::transfer::TransferClient); both
/// may run concurrently against the same session.
pub struct ObjectCatalog {
    client: Arc<DriveClient>,
}

impl ObjectCatalog {
    /// Creates a catalog over the shared Drive client
    pub fn new(client: Arc<DriveClient>) -> Self {
        Self { client }
    }

    /// Lists at most `page_size` objects in the order reported by the
    /// remote store (no local sort).
    ///
    /// Only the first page is returned; callers needing full enumeration
    /// must be aware this is a bounded prefix.
    pub async fn list(&self, page_size: u32) -> Result<Vec<RemoteObject>, CatalogError> {
        debug!(page_size, "Listing remote objects");

        let fields = format!("files({OBJECT_FIELDS}),nextPageToken");
        let response = self
            .client
            .request(Method::GET, "/files")
            .await?
            .query(&[
                ("pageSize", page_size.to_string().as_str()),
                ("fields", fields.as_str()),
            ])
            .send()
            .await?;

        let response = check_status(response, None).await?;
        let list: FileListResponse = parse_json(response).await?;

        debug!(count = list.files.len(), "List completed");
        Ok(list.files.into_iter().map(RemoteObject::from).collect())
    }

    /// Fetches metadata for a single object.
    ///
    /// Fails with [`CatalogError::NotFound`] when `id` does not resolve
    /// remotely.
    pub async fn get_metadata(&self, id: &str) -> Result<RemoteObject, CatalogError> {
        debug!(id, "Fetching object metadata");

        let response = self
            .client
            .request(Method::GET, &format!("/files/{id}"))
            .await?
            .query(&[("fields", OBJECT_FIELDS)])
            .send()
            .await?;

        let response = check_status(response, Some(id)).await?;
        let file: DriveFile = parse_json(response).await?;
        Ok(file.into())
    }

    /// Deletes an object.
    ///
    /// An already-deleted `id` fails with [`CatalogError::NotFound`] rather
    /// than being masked as success; callers decide whether "already gone"
    /// is acceptable.
    pub async fn remove(&self, id: &str) -> Result<bool, CatalogError> {
        debug!(id, "Deleting remote object");

        let response = self
            .client
            .request(Method::DELETE, &format!("/files/{id}"))
            .await?
            .send()
            .await?;

        check_status(response, Some(id)).await?;
        debug!(id, "Object deleted");
        Ok(true)
    }
}

/// Maps a non-success status onto the catalog error taxonomy.
///
/// `target` names the single object the request addressed; a 404 maps to
/// `NotFound` only when a target is given. Collection-level requests pass
/// `None`, so an anomalous 404 there stays `Remote` instead of masquerading
/// as an object-not-found condition.
async fn check_status(response: Response, target: Option<&str>) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        return Err(CatalogError::TooManyRequests { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    Err(match (status, target) {
        (StatusCode::NOT_FOUND, Some(target)) => CatalogError::NotFound(target.to_string()),
        (StatusCode::UNAUTHORIZED, _) => CatalogError::Unauthorized(body),
        (StatusCode::FORBIDDEN, _) => CatalogError::Forbidden(body),
        _ => CatalogError::Remote {
            status: status.as_u16(),
            body,
        },
    })
}

/// Parses a `Retry-After` header given in whole seconds
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    response
        .json()
        .await
        .map_err(|e| CatalogError::Decode(e.to_string()))
}
