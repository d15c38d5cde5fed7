use crate::config::SecurityConfig;
use crate::utils::validation::{THUMBNAIL_MIME_TYPES, VIDEO_MIME_TYPES};
use tokio::io::AsyncRead;

/// Which pipeline variant an upload goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Classified, remuxed for fast start, stored under an aspect prefix
    Video,
    /// Stored as-is
    Thumbnail,
}

impl AssetKind {
    /// Multipart field carrying the file
    pub fn form_field(&self) -> &'static str {
        match self {
            AssetKind::Video => "video",
            AssetKind::Thumbnail => "thumbnail",
        }
    }

    pub fn allowed_media_types(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Video => VIDEO_MIME_TYPES,
            AssetKind::Thumbnail => THUMBNAIL_MIME_TYPES,
        }
    }

    pub fn max_size(&self, config: &SecurityConfig) -> u64 {
        match self {
            AssetKind::Video => config.max_video_size,
            AssetKind::Thumbnail => config.max_thumbnail_size,
        }
    }
}

pub struct UploadRequest<R> {
    pub owner_id: String,
    pub video_id: String,
    pub kind: AssetKind,
    pub content_type: Option<String>,
    pub body: R,
}

impl<R> UploadRequest<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn video(owner_id: &str, video_id: &str, content_type: Option<&str>, body: R) -> Self {
        Self::new(AssetKind::Video, owner_id, video_id, content_type, body)
    }

    pub fn thumbnail(owner_id: &str, video_id: &str, content_type: Option<&str>, body: R) -> Self {
        Self::new(AssetKind::Thumbnail, owner_id, video_id, content_type, body)
    }

    pub fn new(
        kind: AssetKind,
        owner_id: &str,
        video_id: &str,
        content_type: Option<&str>,
        body: R,
    ) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            video_id: video_id.to_string(),
            kind,
            content_type: content_type.map(str::to_string),
            body,
        }
    }
}
