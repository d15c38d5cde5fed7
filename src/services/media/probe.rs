//! Aspect-ratio classification backed by ffprobe.

use super::process::{ToolError, run_tool};
use super::{AspectRatio, MediaClassifier};
use crate::api::error::AppError;
use crate::config::MediaConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

pub struct FfprobeClassifier {
    bin: PathBuf,
    timeout: Duration,
}

impl FfprobeClassifier {
    pub fn new(bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.ffprobe_bin.clone(), config.probe_timeout)
    }
}

#[async_trait]
impl MediaClassifier for FfprobeClassifier {
    async fn classify(&self, path: &Path) -> Result<AspectRatio, AppError> {
        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];

        let output = run_tool(self.bin.as_os_str(), args, self.timeout)
            .await
            .map_err(|e: ToolError| AppError::AnalysisFailed(e.to_string()))?;

        let (width, height) = parse_dimensions(&output.stdout)?;
        let ratio = AspectRatio::from_dimensions(width, height);

        tracing::debug!(
            "Classified {} as {} ({}x{})",
            path.display(),
            ratio,
            width,
            height
        );

        Ok(ratio)
    }
}

/// Extracts the geometry of the first stream that reports one.
pub fn parse_dimensions(stdout: &[u8]) -> Result<(u32, u32), AppError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| AppError::AnalysisFailed(format!("unparsable ffprobe output: {}", e)))?;

    output
        .streams
        .iter()
        .find_map(|stream| match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        })
        .ok_or(AppError::NoStreamData)
}
