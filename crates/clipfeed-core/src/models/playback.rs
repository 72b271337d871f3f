use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identifier of a video-bearing entity (post, story, short).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VideoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Periodic status reported by the underlying media player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PlaybackStatus {
    Unloaded,
    Loaded {
        position_millis: u64,
        duration_millis: u64,
        did_just_finish: bool,
    },
}

impl PlaybackStatus {
    pub fn loaded(position_millis: u64, duration_millis: u64) -> Self {
        PlaybackStatus::Loaded {
            position_millis,
            duration_millis,
            did_just_finish: false,
        }
    }

    pub fn finished(duration_millis: u64) -> Self {
        PlaybackStatus::Loaded {
            position_millis: duration_millis,
            duration_millis,
            did_just_finish: true,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, PlaybackStatus::Loaded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tagging() {
        let json = serde_json::to_value(PlaybackStatus::loaded(10, 20)).unwrap();
        assert_eq!(json["state"], "loaded");
        assert_eq!(json["position_millis"], 10);

        let unloaded: PlaybackStatus =
            serde_json::from_value(serde_json::json!({ "state": "unloaded" })).unwrap();
        assert!(!unloaded.is_loaded());
    }

    #[test]
    fn video_id_display() {
        let id = VideoId::from("post-42");
        assert_eq!(id.to_string(), "post-42");
        assert_eq!(id.as_str(), "post-42");
    }
}
