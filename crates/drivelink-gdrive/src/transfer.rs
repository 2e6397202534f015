//! Streaming upload/download operations
//!
//! Payload bytes move incrementally between local storage and the network;
//! no operation buffers a whole object in memory. Uploads use the Drive v3
//! resumable protocol with fixed-size chunks, declaring the total size only
//! on the final chunk so unknown-length byte sources work and the source is
//! read exactly once, sequentially, start to finish.
//!
//! No retry happens here. A blind retry of a non-idempotent create risks
//! duplicate remote objects; retry policy belongs to the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::{Method, StatusCode};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use drivelink_core::RemoteObject;

use crate::client::{DriveClient, DriveFile, OBJECT_FIELDS};
use crate::TransferError;

/// Upload chunk size: 4 MiB. The resumable protocol requires chunks in
/// multiples of 256 KiB (4 MiB = 256 KiB * 16), except the final one.
const CHUNK_SIZE: usize = 4 * 1024 * 1024;

// ============================================================================
// TransferRequest
// ============================================================================

/// Where the upload payload comes from
pub enum UploadSource {
    /// Read from a local file path
    File(PathBuf),
    /// Read from an arbitrary async byte stream
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

/// Local description of a pending upload. Created per call, consumed by
/// [`TransferClient::upload`], discarded after completion.
pub struct TransferRequest {
    /// Byte source, consumed exactly once
    pub source: UploadSource,
    /// Target object name. Names are not unique remote identifiers; every
    /// upload creates a new object.
    pub name: String,
    /// MIME type to record on the remote object
    pub mime_type: String,
}

impl TransferRequest {
    /// Describes an upload sourced from a local file
    pub fn from_path(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            source: UploadSource::File(path.into()),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Describes an upload sourced from an async reader
    pub fn from_reader(
        reader: Box<dyn AsyncRead + Send + Unpin>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            source: UploadSource::Reader(reader),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }
}

// ============================================================================
// TransferClient
// ============================================================================

/// Streaming transfer operations over the shared Drive client.
///
/// Independent of [`ObjectCatalog`](crate::catalog::ObjectCatalog); both may
/// run concurrently against the same session. Each operation holds one open
/// network stream and one open file stream for its duration; both are scoped
/// locals and released on every exit path.
pub struct TransferClient {
    client: Arc<DriveClient>,
}

impl TransferClient {
    /// Creates a transfer client over the shared Drive client
    pub fn new(client: Arc<DriveClient>) -> Self {
        Self { client }
    }

    /// Streams the request's payload to a new remote object.
    ///
    /// On success returns the object as reported by the provider; its `id`
    /// is the authoritative identifier. An error mid-stream terminates the
    /// operation; the caller must assume the remote side may hold a partial
    /// or absent object and must not blindly retry (uploads create, never
    /// overwrite).
    pub async fn upload(&self, request: TransferRequest) -> Result<RemoteObject, TransferError> {
        let TransferRequest {
            source,
            name,
            mime_type,
        } = request;

        info!(name, mime_type, "Starting streaming upload");

        let mut reader: Box<dyn AsyncRead + Send + Unpin> = match source {
            UploadSource::File(path) => Box::new(fs::File::open(&path).await?),
            UploadSource::Reader(reader) => reader,
        };

        let session_url = self.create_upload_session(&name, &mime_type).await?;

        let mut offset: u64 = 0;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let filled = fill_chunk(reader.as_mut(), &mut buffer).await?;
            let eof = filled < CHUNK_SIZE;
            let total = eof.then_some(offset + filled as u64);

            let completed = self
                .put_chunk(&session_url, &buffer[..filled], offset, total)
                .await?;
            offset += filled as u64;

            match completed {
                Some(file) => {
                    info!(id = %file.id, bytes = offset, "Upload completed");
                    return Ok(file.into());
                }
                None if eof => {
                    warn!(bytes = offset, "Provider did not confirm upload completion");
                    return Err(TransferError::Incomplete);
                }
                None => continue,
            }
        }
    }

    /// Opens a resumable upload session and returns its absolute URL
    async fn create_upload_session(
        &self,
        name: &str,
        mime_type: &str,
    ) -> Result<String, TransferError> {
        let metadata = serde_json::json!({ "name": name, "mimeType": mime_type });

        let response = self
            .client
            .upload_request(Method::POST, "/files")
            .await?
            .query(&[("uploadType", "resumable"), ("fields", OBJECT_FIELDS)])
            .header("X-Upload-Content-Type", mime_type)
            .json(&metadata)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                TransferError::Decode("upload session response missing Location header".to_string())
            })
    }

    /// Uploads one chunk within a session.
    ///
    /// Returns `Some(DriveFile)` when the provider confirms completion
    /// (200/201 with the final metadata), `None` when more bytes are
    /// expected (308 Resume Incomplete).
    async fn put_chunk(
        &self,
        session_url: &str,
        data: &[u8],
        offset: u64,
        total: Option<u64>,
    ) -> Result<Option<DriveFile>, TransferError> {
        let content_range = content_range(offset, data.len() as u64, total);
        debug!(%content_range, "Uploading chunk");

        let token = self.client.bearer().await?;
        let response = self
            .client
            .http()
            .put(session_url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_LENGTH, data.len().to_string())
            .header(reqwest::header::CONTENT_RANGE, content_range)
            .body(data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            let file: DriveFile = response
                .json()
                .await
                .map_err(|e| TransferError::Decode(e.to_string()))?;
            Ok(Some(file))
        } else if status == StatusCode::PERMANENT_REDIRECT {
            // 308 Resume Incomplete: the session expects more bytes
            Ok(None)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TransferError::Remote {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Streams a remote object's bytes to `destination`.
    ///
    /// The containing directory is created if absent. The response status
    /// is checked before the destination is touched, so a nonexistent `id`
    /// fails with [`TransferError::NotFound`] without creating a file. The
    /// write is not atomic: a failure partway through leaves a partial file
    /// at the destination, which the caller must treat as invalid and
    /// remove.
    pub async fn download(
        &self,
        id: &str,
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf, TransferError> {
        let destination = destination.as_ref().to_path_buf();
        debug!(id, dest = %destination.display(), "Starting streaming download");

        let response = self
            .client
            .request(Method::GET, &format!("/files/{id}"))
            .await?
            .query(&[("alt", "media")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(if status == StatusCode::NOT_FOUND {
                TransferError::NotFound(id.to_string())
            } else {
                let body = response.text().await.unwrap_or_default();
                TransferError::Remote {
                    status: status.as_u16(),
                    body,
                }
            });
        }

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(&destination).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        info!(id, written, dest = %destination.display(), "Download completed");
        Ok(destination)
    }
}

/// Reads sequentially until `buffer` is full or the source is exhausted
async fn fill_chunk<R>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Formats the `Content-Range` header for one chunk.
///
/// Intermediate chunks use `/*` (total unknown); the final chunk declares
/// the total. An empty final chunk degenerates to `bytes */total`, which
/// also finalizes sources whose length is an exact chunk multiple, and
/// `bytes */0` for empty sources. The `(0, None)` arm only keeps the match
/// total; the chunk loop never produces it, since a zero-length chunk
/// happens only at EOF and EOF always supplies a total.
fn content_range(offset: u64, len: u64, total: Option<u64>) -> String {
    match (len, total) {
        (0, Some(total)) => format!("bytes */{total}"),
        (_, Some(total)) => format!("bytes {}-{}/{}", offset, offset + len - 1, total),
        (0, None) => "bytes */*".to_string(),
        (_, None) => format!("bytes {}-{}/*", offset, offset + len - 1),
    }
}
