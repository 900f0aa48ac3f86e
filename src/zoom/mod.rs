//! Zoom recordings: audio uploads, transcripts and generated reports.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::gateway::{call, ApiRequest, Gateway};

/// Largest upload the backend accepts.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AudioFile {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    /// Upload time as the backend formats it.
    #[serde(default)]
    pub uploaded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct StoredFile {
    pub filename: Option<String>,
    pub exists: bool,
    pub size: u64,
}

/// One recording with its transcript and report. Transcripts whose audio
/// was removed come back with `audio: None`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoomItem {
    #[serde(default)]
    pub audio: Option<AudioFile>,
    #[serde(default)]
    pub transcript: StoredFile,
    #[serde(default)]
    pub report: StoredFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportSummary {
    pub filename: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub transcript: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoomItemsResponse {
    pub items: Vec<ZoomItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoomReportsResponse {
    pub items: Vec<ReportSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
}

/// Result of a transcription run.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub message: Option<String>,
    /// Transcript length in characters.
    pub length: u64,
}

/// A freshly generated report.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedReport {
    pub filename: String,
    pub length: u64,
}

/// Works on the files of one Zoom resource at a time.
pub struct ZoomService<G: Gateway> {
    gateway: Arc<G>,
}

impl<G: Gateway> ZoomService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn items(&self, resource_id: &str) -> Result<Vec<ZoomItem>> {
        let request = ApiRequest::ZoomItems {
            id: require(resource_id, "Resource id")?,
        };
        let response: ZoomItemsResponse = call(self.gateway.as_ref(), &request).await?;
        Ok(response.items)
    }

    pub async fn reports(&self, resource_id: &str) -> Result<Vec<ReportSummary>> {
        let request = ApiRequest::ZoomReports {
            id: require(resource_id, "Resource id")?,
        };
        let response: ZoomReportsResponse = call(self.gateway.as_ref(), &request).await?;
        Ok(response.items)
    }

    /// Upload an mp3 recording read from `path`.
    ///
    /// Only `.mp3` files up to [`MAX_UPLOAD_BYTES`] are sent.
    pub async fn upload(&self, resource_id: &str, path: &Path) -> Result<String> {
        let id = require(resource_id, "Resource id")?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::Validation(format!("{} has no file name", path.display())))?
            .to_string();
        if !filename.to_ascii_lowercase().ends_with(".mp3") {
            return Err(ClientError::Validation("Only .mp3 recordings can be uploaded".to_string()));
        }
        let data = tokio::fs::read(path).await?;
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(ClientError::Validation(format!(
                "{filename} is larger than {} MB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        let request = ApiRequest::ZoomUpload { id, filename, data };
        let response: UploadResponse = call(self.gateway.as_ref(), &request).await?;
        tracing::info!(resource_id, filename = %response.filename, "Recording uploaded");
        Ok(response.filename)
    }

    /// Transcribe an uploaded recording.
    pub async fn process(&self, resource_id: &str, filename: &str) -> Result<Transcription> {
        let request = ApiRequest::ZoomProcess {
            id: require(resource_id, "Resource id")?,
            filename: require(filename, "File name")?,
        };
        let transcription: Transcription = call(self.gateway.as_ref(), &request).await?;
        tracing::info!(resource_id, filename, length = transcription.length, "Transcription finished");
        Ok(transcription)
    }

    /// Generate a report from a transcript; `prompt` steers the summary.
    pub async fn report(&self, resource_id: &str, filename: &str, prompt: &str) -> Result<GeneratedReport> {
        let request = ApiRequest::ZoomReport {
            id: require(resource_id, "Resource id")?,
            filename: require(filename, "File name")?,
            prompt: prompt.trim().to_string(),
        };
        call(self.gateway.as_ref(), &request).await
    }

    /// Text of a generated report.
    pub async fn open_report(&self, resource_id: &str, filename: &str) -> Result<String> {
        let request = ApiRequest::ZoomOpenReport {
            id: require(resource_id, "Resource id")?,
            filename: require(filename, "File name")?,
        };
        match self.gateway.send(&request).await? {
            Value::String(text) => Ok(text),
            other => Err(ClientError::Protocol(format!(
                "{} response is not text: {other}",
                request.action()
            ))),
        }
    }
}

fn require(value: &str, what: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::Validation(format!("{what} is required")));
    }
    Ok(value.to_string())
}
