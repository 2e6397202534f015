//! The `RemoteObject` snapshot record
//!
//! Represents one stored object as reported by the remote provider.
//! Instances are disconnected snapshots: there is no live binding back to
//! the remote store, so a caller must re-fetch to observe changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing one remotely stored object.
///
/// The `id` is opaque, provider-assigned and unique; it is authoritative
/// only when it came from a successful create/list/get call. Local code
/// never fabricates a meaningful `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Provider-assigned opaque identifier
    pub id: String,
    /// Object name. Names are not unique remote identifiers.
    pub name: String,
    /// MIME type as reported by the provider
    pub mime_type: String,
    /// Payload size in bytes (absent for objects without binary content)
    pub size_bytes: Option<u64>,
    /// Creation timestamp, when the provider reports one
    pub created_at: Option<DateTime<Utc>>,
    /// Browser-viewable URL, if the provider exposes one
    pub view_url: Option<String>,
    /// Direct download URL, if the provider exposes one
    pub download_url: Option<String>,
}
