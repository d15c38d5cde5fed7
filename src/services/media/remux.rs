use super::process::run_tool;
use super::{MediaTransformer, ProcessedFile};
use crate::api::error::AppError;
use crate::config::MediaConfig;
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempPath;

/// Moves the moov atom to the front of an MP4 with a stream copy.
pub struct FfmpegRemuxer {
    bin: PathBuf,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.ffmpeg_bin.clone(), config.remux_timeout)
    }
}

pub fn processing_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".processing");
    PathBuf::from(name)
}

#[async_trait]
impl MediaTransformer for FfmpegRemuxer {
    async fn remux(&self, path: &Path) -> Result<ProcessedFile, AppError> {
        // Owned from the start so a partial write is removed on every failure
        let output_path = TempPath::from_path(processing_path(path));

        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            path.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output_path.as_os_str(),
        ];

        tracing::info!(
            "Starting fast-start remux: {} -> {}",
            path.display(),
            output_path.display()
        );

        run_tool(self.bin.as_os_str(), args, self.timeout)
            .await
            .map_err(|e| AppError::RemuxFailed(e.to_string()))?;

        let size = tokio::fs::metadata(&output_path)
            .await
            .map(|m| m.len())
            .map_err(|e| AppError::RemuxFailed(format!("no output written: {}", e)))?;

        if size == 0 {
            return Err(AppError::RemuxFailed("output file is empty".to_string()));
        }

        Ok(ProcessedFile::new(output_path))
    }
}
