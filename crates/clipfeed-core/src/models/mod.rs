pub mod media;
pub mod playback;

pub use media::{MediaKind, UploadRequest, UploadResult};
pub use playback::{PlaybackStatus, VideoId};
