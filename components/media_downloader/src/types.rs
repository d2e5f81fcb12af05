// components/media_downloader/src/types.rs
use async_trait::async_trait;
use song_primitives::{MatchHints, MatchedMedia};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Required dependency not found: {0}")]
    DependencyNotFound(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: &'static str, stderr: String },

    #[error("Unexpected {tool} output: {reason}")]
    Parse { tool: &'static str, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Transcoder binary not found: {0}")]
    BinaryNotFound(&'static str),

    #[error("Transcoding failed ({status}): {stderr}")]
    Failed { status: String, stderr: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Source of audio for a song
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Search for the best single match for `query`
    ///
    /// Returns `Ok(None)` when nothing acceptable was found.
    async fn search(
        &self,
        query: &str,
        hints: &MatchHints,
    ) -> Result<Option<MatchedMedia>, DownloadError>;

    /// Look up the item behind a platform URL
    async fn fetch(&self, url: &str) -> Result<Option<MatchedMedia>, DownloadError>;

    /// Download the raw audio of `media` to `destination`
    ///
    /// Returns `Ok(false)` when the platform reported a failed download.
    async fn download(
        &self,
        media: &MatchedMedia,
        destination: &Path,
    ) -> Result<bool, DownloadError>;
}

/// Converts a downloaded file between audio formats
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        working_dir: &Path,
    ) -> Result<(), TranscodeError>;
}
