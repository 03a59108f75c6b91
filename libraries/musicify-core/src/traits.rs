/// Collaborator traits consumed by the catalog
///
/// Object upload and third-party metadata lookup live behind these seams so
/// the server can swap local disk or a remote API without touching the
/// relationship logic.
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What kind of object is being uploaded; decides the storage folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Image,
    Lyrics,
}

impl MediaKind {
    pub fn folder(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "images",
            MediaKind::Lyrics => "lyrics",
        }
    }
}

/// A file received from a client, held in memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadFile {
    /// Lowercased extension taken from the original file name
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Result of an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedObject {
    pub url: String,
    /// Only known for audio
    pub duration_seconds: Option<f64>,
}

/// Object storage: `upload(file) -> URL`
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    async fn upload(&self, file: UploadFile, kind: MediaKind) -> Result<UploadedObject>;
}

/// An artist as reported by a metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupArtist {
    pub name: String,
    pub image_url: Option<String>,
}

/// Track metadata from a third-party provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub title: String,
    pub artists: Vec<LookupArtist>,
    pub image_url: Option<String>,
    pub duration_ms: Option<u64>,
}

/// Third-party metadata: `lookup(trackRef) -> track metadata`
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, track_ref: &str) -> Result<TrackMetadata>;
}
