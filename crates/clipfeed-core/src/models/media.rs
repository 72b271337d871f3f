use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Media kind enum
///
/// `Text` posts carry no media; uploading one never touches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Text,
}

impl MediaKind {
    /// Path segment used by the media host (`/{kind}/upload`, `/{kind}/destroy`).
    pub fn as_resource_type(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Text => "text",
        }
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "text" => Ok(MediaKind::Text),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_resource_type())
    }
}

/// One upload call. Not persisted; dropped once the call resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Local path, `file://` URI or http(s) URL. Empty for text posts.
    pub source_uri: String,
    pub media_kind: MediaKind,
}

impl UploadRequest {
    pub fn new(source_uri: impl Into<String>, media_kind: MediaKind) -> Self {
        Self {
            source_uri: source_uri.into(),
            media_kind,
        }
    }

    pub fn text() -> Self {
        Self::new("", MediaKind::Text)
    }

    /// True when the request has nothing to upload.
    pub fn is_text(&self) -> bool {
        self.media_kind == MediaKind::Text || self.source_uri.trim().is_empty()
    }
}

/// Reference to a stored remote asset. Callers embed these fields in post/story records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub remote_url: String,
    /// Host identifier, needed later for deletion.
    pub public_id: String,
    /// Resource type as classified by the host ("image", "video", or "text").
    pub resource_kind: String,
}

impl UploadResult {
    pub fn text() -> Self {
        Self {
            remote_url: String::new(),
            public_id: String::new(),
            resource_kind: MediaKind::Text.as_resource_type().to_string(),
        }
    }

    /// True when the result points at a stored remote asset.
    pub fn has_remote_asset(&self) -> bool {
        !self.public_id.is_empty()
    }

    /// Parse the host's resource type back into a kind; unknown types map to `None`.
    pub fn media_kind(&self) -> Option<MediaKind> {
        self.resource_kind.parse().ok()
    }
}
