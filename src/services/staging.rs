use crate::api::error::AppError;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

/// Local scratch space for inbound uploads.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

/// A full local copy of one upload. Removed on `release` or drop, whichever
/// comes first.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Opens the staged copy for reading from the start
    pub async fn open(&self) -> std::io::Result<tokio::fs::File> {
        tokio::fs::File::open(&self.path).await
    }

    pub fn release(self) {
        let path = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => tracing::debug!("Released staged file {}", path.display()),
            Err(e) => tracing::warn!("Failed to remove staged file {}: {}", path.display(), e),
        }
    }
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies `reader` into a fresh temp file, reading at most `max_bytes + 1`
    /// bytes. Anything over `max_bytes` is rejected and nothing is left behind.
    pub async fn stage<R>(&self, reader: R, suffix: &str, max_bytes: u64) -> Result<StagedFile, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StagingIo(format!("{}: {}", self.dir.display(), e)))?;

        let temp_file = tempfile::Builder::new()
            .prefix("tubely-upload-")
            .suffix(suffix)
            .tempfile_in(&self.dir)
            .map_err(|e| AppError::StagingIo(e.to_string()))?;
        let (file, path) = temp_file.into_parts();
        let mut writer = tokio::fs::File::from_std(file);

        let mut limited = reader.take(max_bytes.saturating_add(1));
        let written = tokio::io::copy(&mut limited, &mut writer)
            .await
            .map_err(|e| {
                let err_msg = e.to_string();
                if err_msg.contains("length limit exceeded") {
                    AppError::PayloadTooLarge(
                        "Request body exceeds the maximum allowed limit".to_string(),
                    )
                } else {
                    AppError::StagingIo(err_msg)
                }
            })?;

        if written > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Upload exceeds the {} byte limit",
                max_bytes
            )));
        }

        writer
            .flush()
            .await
            .map_err(|e| AppError::StagingIo(e.to_string()))?;
        writer
            .sync_all()
            .await
            .map_err(|e| AppError::StagingIo(e.to_string()))?;

        tracing::debug!("Staged {} bytes at {}", written, path.display());

        Ok(StagedFile {
            path,
            size: written,
        })
    }
}
