//! Integration tests for streaming transfer operations

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use drivelink_gdrive::{DriveError, TransferError};

use crate::common;

// ============================================================================
// upload
// ============================================================================

#[tokio::test]
async fn test_upload_streams_file_and_returns_remote_object() {
    let (server, service) = common::setup_service().await;
    common::mount_upload(&server, "up-001", "a.txt", "text/plain").await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("a.txt");
    std::fs::write(&source, b"local payload").unwrap();

    let object = service.upload(&source, "a.txt", "text/plain").await.unwrap();
    assert_eq!(object.id, "up-001");
    assert_eq!(object.name, "a.txt");
    assert_eq!(object.mime_type, "text/plain");
}

#[tokio::test]
async fn test_upload_declares_total_on_final_chunk() {
    let (server, service) = common::setup_service().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/upload-session/s1", server.uri())),
        )
        .mount(&server)
        .await;

    // 16-byte payload fits one chunk; the single PUT must carry the
    // total-declaring range.
    Mock::given(method("PUT"))
        .and(path("/upload-session/s1"))
        .and(header("Content-Range", "bytes 0-15/16"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::object_json("up-002", "b.bin", "application/octet-stream")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("b.bin");
    std::fs::write(&source, b"sixteen bytes!!!").unwrap();

    let object = service
        .upload(&source, "b.bin", "application/octet-stream")
        .await
        .unwrap();
    assert_eq!(object.id, "up-002");
}

#[tokio::test]
async fn test_upload_empty_file_finalizes_with_star_range() {
    let (server, service) = common::setup_service().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/upload-session/s2", server.uri())),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload-session/s2"))
        .and(header("Content-Range", "bytes */0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::object_json("up-003", "empty", "text/plain")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("empty");
    std::fs::write(&source, b"").unwrap();

    let object = service.upload(&source, "empty", "text/plain").await.unwrap();
    assert_eq!(object.id, "up-003");
}

#[tokio::test]
async fn test_upload_spanning_multiple_chunks() {
    let (server, service) = common::setup_service().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/upload-session/multi", server.uri())),
        )
        .mount(&server)
        .await;

    // 4 MiB + 10 bytes: one full intermediate chunk, then a short final one.
    // The intermediate PUT carries an open-ended range and gets 308 Resume
    // Incomplete; the final PUT declares the total.
    Mock::given(method("PUT"))
        .and(path("/upload-session/multi"))
        .and(header("Content-Range", "bytes 0-4194303/*"))
        .respond_with(ResponseTemplate::new(308))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload-session/multi"))
        .and(header("Content-Range", "bytes 4194304-4194313/4194314"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::object_json("up-multi", "big.bin", "application/octet-stream")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("big.bin");
    std::fs::write(&source, vec![0x5au8; 4 * 1024 * 1024 + 10]).unwrap();

    let object = service
        .upload(&source, "big.bin", "application/octet-stream")
        .await
        .unwrap();
    assert_eq!(object.id, "up-multi");
}

#[tokio::test]
async fn test_upload_unconfirmed_completion_is_incomplete() {
    let (server, service) = common::setup_service().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/upload-session/stuck", server.uri())),
        )
        .mount(&server)
        .await;

    // The provider keeps asking for more bytes even after the final,
    // total-declaring chunk
    Mock::given(method("PUT"))
        .and(path("/upload-session/stuck"))
        .respond_with(ResponseTemplate::new(308))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("d.txt");
    std::fs::write(&source, b"never done").unwrap();

    let err = service.upload(&source, "d.txt", "text/plain").await.unwrap_err();
    assert!(matches!(
        err,
        DriveError::Transfer(TransferError::Incomplete)
    ));
}

#[tokio::test]
async fn test_upload_remote_failure_is_typed() {
    let (server, service) = common::setup_service().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/upload-session/s3", server.uri())),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload-session/s3"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage backend error"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("c.txt");
    std::fs::write(&source, b"doomed payload").unwrap();

    let err = service.upload(&source, "c.txt", "text/plain").await.unwrap_err();
    match err {
        DriveError::Transfer(TransferError::Remote { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_missing_source_is_local_io_error() {
    let (server, service) = common::setup_service().await;

    // Session creation succeeds; the failure must come from the local read
    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/upload-session/s4", server.uri())),
        )
        .mount(&server)
        .await;

    let err = service
        .upload("/nonexistent/source.txt", "s.txt", "text/plain")
        .await
        .unwrap_err();
    assert!(matches!(err, DriveError::Transfer(TransferError::Io(_))));
}

// ============================================================================
// download
// ============================================================================

#[tokio::test]
async fn test_download_writes_destination_creating_directories() {
    let (server, service) = common::setup_service().await;

    let content = b"remote object payload";
    common::mount_download(&server, "dl-001", content).await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("nested/deep/out.bin");

    let written = service.download("dl-001", &destination).await.unwrap();
    assert_eq!(written, destination);
    assert_eq!(std::fs::read(&destination).unwrap(), content);
}

#[tokio::test]
async fn test_download_empty_object() {
    let (server, service) = common::setup_service().await;

    common::mount_download(&server, "dl-002", &[]).await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("empty.bin");

    service.download("dl-002", &destination).await.unwrap();
    assert_eq!(std::fs::read(&destination).unwrap(), Vec::<u8>::new());
}

#[tokio::test]
async fn test_download_unknown_id_creates_no_file() {
    let (server, service) = common::setup_service().await;

    Mock::given(method("GET"))
        .and(path("/files/ghost"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": 404, "message": "File not found: ghost." }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("ghost.bin");

    let err = service.download("ghost", &destination).await.unwrap_err();
    assert!(matches!(
        err,
        DriveError::Transfer(TransferError::NotFound(ref id)) if id == "ghost"
    ));
    // Status is checked before the destination is touched
    assert!(!destination.exists());
}
