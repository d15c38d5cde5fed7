use anyhow::{Result, anyhow};
use mime::Mime;

/// Allowed MIME types for video uploads
pub const VIDEO_MIME_TYPES: &[&str] = &["video/mp4"];

/// Allowed MIME types for thumbnail uploads
pub const THUMBNAIL_MIME_TYPES: &[&str] = &["image/png", "image/jpeg"];

/// Parses a declared content type and checks its essence against `allowed`.
///
/// Parameters such as `; charset=` are ignored, case is not significant.
pub fn validate_media_type(content_type: Option<&str>, allowed: &[&str]) -> Result<Mime> {
    let declared = content_type
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Missing Content-Type for uploaded file"))?;

    let parsed: Mime = declared
        .parse()
        .map_err(|_| anyhow!("Malformed Content-Type: {}", declared))?;

    let essence = parsed.essence_str().to_ascii_lowercase();
    if !allowed.iter().any(|a| *a == essence) {
        return Err(anyhow!(
            "Content type '{}' is not allowed, expected one of: {}",
            essence,
            allowed.join(", ")
        ));
    }

    Ok(parsed)
}

/// File extension for an accepted MIME type, taken from its subtype
pub fn extension_for(media_type: &Mime) -> String {
    media_type.subtype().as_str().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_video_type() {
        assert!(validate_media_type(Some("video/mp4"), VIDEO_MIME_TYPES).is_ok());
        assert!(validate_media_type(Some("Video/MP4"), VIDEO_MIME_TYPES).is_ok());

        assert!(validate_media_type(Some("video/webm"), VIDEO_MIME_TYPES).is_err());
        assert!(validate_media_type(Some("image/png"), VIDEO_MIME_TYPES).is_err());
    }

    #[test]
    fn test_validate_thumbnail_type() {
        assert!(validate_media_type(Some("image/png"), THUMBNAIL_MIME_TYPES).is_ok());
        assert!(validate_media_type(Some("image/jpeg"), THUMBNAIL_MIME_TYPES).is_ok());

        assert!(validate_media_type(Some("image/gif"), THUMBNAIL_MIME_TYPES).is_err());
        assert!(validate_media_type(Some("image/svg+xml"), THUMBNAIL_MIME_TYPES).is_err());
    }

    #[test]
    fn test_parameters_are_ignored() {
        let parsed =
            validate_media_type(Some("image/png; charset=binary"), THUMBNAIL_MIME_TYPES).unwrap();
        assert_eq!(parsed.essence_str(), "image/png");
    }

    #[test]
    fn test_missing_or_malformed() {
        assert!(validate_media_type(None, VIDEO_MIME_TYPES).is_err());
        assert!(validate_media_type(Some(""), VIDEO_MIME_TYPES).is_err());
        assert!(validate_media_type(Some("mp4"), VIDEO_MIME_TYPES).is_err());
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(&"image/png".parse().unwrap()), "png");
        assert_eq!(extension_for(&"image/jpeg".parse().unwrap()), "jpeg");
        assert_eq!(extension_for(&"video/mp4".parse().unwrap()), "mp4");
    }
}
