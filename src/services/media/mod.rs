use crate::api::error::AppError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tempfile::TempPath;

pub mod probe;
pub mod process;
pub mod remux;

pub use probe::FfprobeClassifier;
pub use remux::FfmpegRemuxer;

/// Coarse presentation shape of a video, bucketed around 16:9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    Portrait,
    Landscape,
    Other,
}

impl AspectRatio {
    /// Uses integer math: `9 * long / short > 14` puts 16:9 and wider into a
    /// named bucket. Squares and anything closer to 4:3 are `Other`.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let (w, h) = (u64::from(width), u64::from(height));
        if w == 0 || h == 0 {
            return AspectRatio::Other;
        }
        if h > w && 9 * h / w > 14 {
            AspectRatio::Portrait
        } else if w > h && 9 * w / h > 14 {
            AspectRatio::Landscape
        } else {
            AspectRatio::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait => "portrait",
            AspectRatio::Landscape => "landscape",
            AspectRatio::Other => "other",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remuxed copy of a staged upload. The file is removed when this is dropped.
#[derive(Debug)]
pub struct ProcessedFile {
    path: TempPath,
}

impl ProcessedFile {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!("Failed to remove processed file {}: {}", path.display(), e);
        }
    }
}

/// Derives a presentation shape from a local media file
#[async_trait]
pub trait MediaClassifier: Send + Sync {
    async fn classify(&self, path: &Path) -> Result<AspectRatio, AppError>;
}

/// Rewrites a local media file for progressive playback
#[async_trait]
pub trait MediaTransformer: Send + Sync {
    async fn remux(&self, path: &Path) -> Result<ProcessedFile, AppError>;
}
