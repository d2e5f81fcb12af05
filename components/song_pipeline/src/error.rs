// components/song_pipeline/src/error.rs
use crate::queue::QueueError;
use catalog_client::CatalogError;
use media_downloader::{DownloadError, TranscodeError};
use thiserror::Error;
use track_tags::TagError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome classification for a failed song attempt
///
/// Collaborator errors are classified once, when they are converted into
/// this type. The batch driver only looks at the variant.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Catalog access token expired")]
    CredentialExpired,

    /// Worth retrying later in the same run
    #[error("Transient failure: {0}")]
    Transient(#[source] BoxError),

    #[error("Catalog error: {0}")]
    Catalog(#[source] CatalogError),

    #[error("Video platform error: {0}")]
    Platform(#[source] DownloadError),

    #[error("Transcoding failed: {0}")]
    Transcode(#[source] TranscodeError),

    #[error("Tagging failed: {0}")]
    Tags(#[from] TagError),

    #[error("Batch list error: {0}")]
    Queue(#[from] QueueError),

    #[error("Could not encode download record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("File name '{0}' would be stored outside the destination folder")]
    OutsideFolder(String),
}

impl PipelineError {
    pub fn transient(reason: impl Into<BoxError>) -> Self {
        PipelineError::Transient(reason.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, PipelineError::Transient(_))
    }
}

impl From<CatalogError> for PipelineError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::CredentialExpired => PipelineError::CredentialExpired,
            e if e.is_transient() => PipelineError::Transient(Box::new(e)),
            e => PipelineError::Catalog(e),
        }
    }
}

impl From<DownloadError> for PipelineError {
    fn from(e: DownloadError) -> Self {
        match e {
            DownloadError::ToolFailed { .. } | DownloadError::IoError(_) => {
                PipelineError::Transient(Box::new(e))
            }
            e => PipelineError::Platform(e),
        }
    }
}

impl From<TranscodeError> for PipelineError {
    fn from(e: TranscodeError) -> Self {
        PipelineError::Transcode(e)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Transient(Box::new(e))
    }
}
