use std::path::PathBuf;

use crate::domain::value_objects::upload_request::GeoLocation;

/// Where the media bytes come from. Encoded photos are already in memory;
/// videos stay on disk and are streamed.
#[derive(Clone, PartialEq)]
pub enum MediaBody {
    Bytes(Vec<u8>),
    File { path: PathBuf, size_bytes: u64 },
}

impl MediaBody {
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::File { size_bytes, .. } => *size_bytes,
        }
    }
}

impl std::fmt::Debug for MediaBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(bytes) => f
                .debug_struct("Bytes")
                .field("size_bytes", &bytes.len())
                .finish(),
            Self::File { path, size_bytes } => f
                .debug_struct("File")
                .field("path", path)
                .field("size_bytes", size_bytes)
                .finish(),
        }
    }
}

/// Media entry ready to be posted to an album feed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaEntry {
    pub title: String,
    pub content_type: String,
    pub body: MediaBody,
    pub location: Option<GeoLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedMedia {
    pub id: Option<String>,
    pub title: String,
}
