use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Security configuration for uploads and authentication
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Maximum video size in bytes (default: 1 GB)
    pub max_video_size: u64,

    /// Maximum thumbnail size in bytes (default: 10 MB)
    pub max_thumbnail_size: u64,

    /// JWT Secret Key (Required in production)
    pub jwt_secret: String,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_video_size: 1 << 30,      // 1 GB
            max_thumbnail_size: 10 << 20, // 10 MB
            jwt_secret: "secret".to_string(),
            allowed_origins: vec![
                "http://localhost:8091".to_string(),
                "http://127.0.0.1:8091".to_string(),
            ],
        }
    }
}

impl SecurityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_video_size: env::var("MAX_VIDEO_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_video_size),

            max_thumbnail_size: env::var("MAX_THUMBNAIL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_thumbnail_size),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (relaxed limits, fixed secret)
    pub fn development() -> Self {
        Self {
            max_video_size: 1 << 30,
            max_thumbnail_size: 10 << 20,
            jwt_secret: "secret".to_string(),
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// External media tooling (ffprobe / ffmpeg) and local staging
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub ffprobe_bin: PathBuf,
    pub ffmpeg_bin: PathBuf,

    /// Upper bound for a single ffprobe run (default: 30s)
    pub probe_timeout: Duration,

    /// Upper bound for a single ffmpeg remux (default: 10 min)
    pub remux_timeout: Duration,

    /// Directory for staged uploads (default: system temp dir)
    pub staging_dir: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffprobe_bin: PathBuf::from("ffprobe"),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            probe_timeout: Duration::from_secs(30),
            remux_timeout: Duration::from_secs(600),
            staging_dir: env::temp_dir(),
        }
    }
}

impl MediaConfig {
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            ffprobe_bin: env::var("FFPROBE_BIN")
                .map(PathBuf::from)
                .unwrap_or(default.ffprobe_bin),
            ffmpeg_bin: env::var("FFMPEG_BIN")
                .map(PathBuf::from)
                .unwrap_or(default.ffmpeg_bin),
            probe_timeout: env::var("PROBE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.probe_timeout),
            remux_timeout: env::var("REMUX_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.remux_timeout),
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.staging_dir),
        }
    }
}

/// Where uploaded assets end up
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub s3_bucket: String,
    pub s3_region: String,

    /// Custom endpoint for S3-compatible services such as MinIO
    pub s3_endpoint: Option<String>,

    /// Base for public object URLs (default: virtual-hosted AWS URL)
    pub s3_public_base: Option<String>,

    /// Multipart part size in bytes, S3 requires at least 5 MB (default: 8 MB)
    pub chunk_size: usize,

    /// Local directory served under /assets
    pub assets_root: PathBuf,

    /// Public base URL for the local assets directory
    pub assets_base_url: String,

    /// Backend for thumbnails: "local" or "s3" (default: "local")
    pub thumbnail_backend: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            s3_bucket: "tubely".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_public_base: None,
            chunk_size: 8 * 1024 * 1024, // 8 MB
            assets_root: PathBuf::from("./assets"),
            assets_base_url: "http://localhost:8091/assets".to_string(),
            thumbnail_backend: "local".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            s3_bucket: env::var("S3_BUCKET").unwrap_or(default.s3_bucket),
            s3_region: env::var("S3_REGION").unwrap_or(default.s3_region),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_public_base: env::var("S3_PUBLIC_BASE").ok(),
            chunk_size: env::var("S3_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.chunk_size),
            assets_root: env::var("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.assets_root),
            assets_base_url: env::var("ASSETS_BASE_URL").unwrap_or(default.assets_base_url),
            thumbnail_backend: env::var("THUMBNAIL_BACKEND").unwrap_or(default.thumbnail_backend),
        }
    }

    /// Base URL that public object URLs are derived from
    pub fn public_base(&self) -> String {
        match &self.s3_public_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.s3.{}.amazonaws.com",
                self.s3_bucket, self.s3_region
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SecurityConfig::default();
        assert_eq!(config.max_video_size, 1024 * 1024 * 1024);
        assert_eq!(config.max_thumbnail_size, 10 * 1024 * 1024);
        assert!(!config.allowed_origins.contains(&"*".to_string()));
    }

    #[test]
    fn test_development_config() {
        let config = SecurityConfig::development();
        assert_eq!(config.jwt_secret, "secret");
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);
    }

    #[test]
    fn test_media_defaults() {
        let config = MediaConfig::default();
        assert_eq!(config.ffprobe_bin, PathBuf::from("ffprobe"));
        assert_eq!(config.ffmpeg_bin, PathBuf::from("ffmpeg"));
        assert!(config.probe_timeout < config.remux_timeout);
    }

    #[test]
    fn test_public_base_defaults_to_aws_host() {
        let config = StorageConfig {
            s3_bucket: "media".to_string(),
            s3_region: "eu-west-1".to_string(),
            ..Default::default()
        };
        assert_eq!(config.public_base(), "https://media.s3.eu-west-1.amazonaws.com");
    }

    #[test]
    fn test_public_base_override() {
        let config = StorageConfig {
            s3_public_base: Some("http://localhost:9000/tubely/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.public_base(), "http://localhost:9000/tubely");
    }
}
