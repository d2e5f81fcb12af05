// components/song_pipeline/src/lib.rs
//! Song resolution, download and reconciliation pipeline
//!
//! Collaborators (catalog, video platform, transcoder, tag store, prompt)
//! are injected as trait objects through [`Collaborators`]; configuration
//! is an explicit [`PipelineConfig`] value.
//!
//! - [`SongDownloader`] takes one reference from resolution to a tagged
//!   artifact plus a line in the download log.
//! - [`Reconciler`] decides whether a file already on disk satisfies a song.
//! - [`BatchDriver`] runs a [`BatchQueue`] to completion, requeueing
//!   transient failures and keeping the list file in step with progress.
mod batch;
mod collection;
mod config;
mod error;
mod hook;
mod naming;
mod prompt;
mod queue;
mod reconcile;
mod record;
mod song;

#[cfg(test)]
mod testing;

pub use batch::{BatchDriver, BatchReport};
pub use collection::{default_list_path, export_collection};
pub use config::{
    OverwritePolicy, PipelineConfig, RetryPolicy, DEFAULT_FILE_FORMAT, DEFAULT_INPUT_EXT,
    DEFAULT_OUTPUT_EXT, DEFAULT_SEARCH_FORMAT,
};
pub use error::{BoxError, PipelineError};
pub use hook::{analysis_output, AnalysisHook, CommandHook, HookError, ANALYSIS_SUFFIX};
pub use naming::{
    candidate_filename, is_degenerate, render_filename, render_query, sanitize_title, stays_inside,
    FIELDS,
};
pub use prompt::{is_affirmative, Prompt, StdinPrompt};
pub use queue::{BatchQueue, QueueError};
pub use reconcile::{Presence, Reconciler};
pub use record::{CatalogFields, DownloadRecord, PlatformFields, RecordLog, METADATA_LOG};
pub use song::{Collaborators, SongDownloader, SongOutcome};
