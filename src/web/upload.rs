//! Upload handling: file name sanitization and persistence into the upload directory.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file part")]
    MissingFilePart,
    #[error("No selected file")]
    NoSelectedFile,
    #[error("Invalid file type. Please upload a CSV file.")]
    InvalidFileType,
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),
    #[error("Failed to read upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Failed to save upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::Multipart(e) => e.status(),
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs become
/// `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading/trailing `.`/`_`
/// are stripped. Returns `None` when nothing usable remains.
pub fn secure_filename(name: &str) -> Option<String> {
    let spaced: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Directory that receives uploaded CSV files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Validate the client file name and write the bytes under its sanitized form.
    ///
    /// Returns the stored file name, which is what the session remembers.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        if file_name.is_empty() {
            return Err(UploadError::NoSelectedFile);
        }
        if !file_name.ends_with(".csv") {
            return Err(UploadError::InvalidFileType);
        }
        let stored = secure_filename(file_name)
            .ok_or_else(|| UploadError::InvalidFileName(file_name.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&stored);
        tokio::fs::write(&path, bytes).await?;
        info!("File uploaded: {} ({} bytes)", stored, bytes.len());
        Ok(stored)
    }
}
