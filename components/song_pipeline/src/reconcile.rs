// components/song_pipeline/src/reconcile.rs
use crate::config::OverwritePolicy;
use crate::error::PipelineError;
use crate::hook::ANALYSIS_SUFFIX;
use crate::naming::stays_inside;
use crate::prompt::Prompt;
use media_downloader::TEMP_SUFFIX;
use song_primitives::{ResolvedMetadata, SongReference};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use track_tags::TagStore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// A satisfying artifact is on disk; nothing to download
    Exists,
    /// Nothing with the candidate's stem is left on disk
    Absent,
}

/// Decides whether an artifact already in the destination satisfies a song
pub struct Reconciler {
    folder: PathBuf,
    policy: OverwritePolicy,
    tags: Arc<dyn TagStore>,
    prompt: Arc<dyn Prompt>,
}

impl Reconciler {
    pub fn new(
        folder: impl Into<PathBuf>,
        policy: OverwritePolicy,
        tags: Arc<dyn TagStore>,
        prompt: Arc<dyn Prompt>,
    ) -> Self {
        Self {
            folder: folder.into(),
            policy,
            tags,
            prompt,
        }
    }

    /// Scan for files named after `candidate` and apply the overwrite policy
    ///
    /// Leftover temporary files in the scanned directory are deleted along
    /// the way. When the answer is `Absent`, every file matching the
    /// candidate's stem has been removed.
    pub async fn check(
        &self,
        candidate: &str,
        reference: &SongReference,
        metadata: Option<&ResolvedMetadata>,
    ) -> Result<Presence, PipelineError> {
        debug!(candidate, "cleaning temp files and checking for an existing download");

        if candidate.trim().is_empty() {
            return Ok(Presence::Absent);
        }
        if !stays_inside(candidate) {
            return Err(PipelineError::OutsideFolder(candidate.to_string()));
        }

        let candidate_path = self.folder.join(candidate);
        let Some(stem) = candidate_path.file_name().and_then(|name| name.to_str()) else {
            return Ok(Presence::Absent);
        };
        let directory = candidate_path.parent().unwrap_or(self.folder.as_path());

        let matching = scan(directory, stem).await?;
        let Some(existing) = matching.first() else {
            return Ok(Presence::Absent);
        };
        debug!(existing = %existing.display(), "found an already existing song");

        let presence = self.decide(existing, reference, metadata).await?;
        if presence == Presence::Absent {
            for path in &matching {
                tokio::fs::remove_file(path).await?;
            }
        }
        Ok(presence)
    }

    async fn decide(
        &self,
        existing: &Path,
        reference: &SongReference,
        metadata: Option<&ResolvedMetadata>,
    ) -> Result<Presence, PipelineError> {
        let name = existing
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if reference.is_catalog() {
            if let Some(metadata) = metadata {
                let already_tagged = self.tags.compare(existing, metadata);
                debug!(already_tagged, "checked tags of the existing file");
                if !already_tagged {
                    info!("\"{name}\" has outdated tags, downloading it again");
                    return Ok(Presence::Absent);
                }
            }
        }

        warn!("\"{name}\" already exists");
        match self.policy {
            OverwritePolicy::Prompt => {
                let question = format!("\"{name}\" has already been downloaded. Re-download? (y/N): ");
                if self.prompt.confirm(&question).await? {
                    Ok(Presence::Absent)
                } else {
                    Ok(Presence::Exists)
                }
            }
            OverwritePolicy::Force => {
                info!("Overwriting \"{name}\"");
                Ok(Presence::Absent)
            }
            OverwritePolicy::Skip => {
                info!("Skipping \"{name}\"");
                Ok(Presence::Exists)
            }
        }
    }
}

/// Files in `directory` named `stem` or `stem.<ext>`, in name order
///
/// Deletes any temporary download left in the directory. Analysis outputs
/// are not artifacts and never match.
async fn scan(directory: &Path, stem: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();

    let mut matching = Vec::new();
    for name in files {
        let path = directory.join(&name);
        if name.ends_with(TEMP_SUFFIX) {
            debug!(path = %path.display(), "removing leftover temp file");
            tokio::fs::remove_file(&path).await?;
        } else if matches_stem(&name, stem) && !name.ends_with(ANALYSIS_SUFFIX) {
            matching.push(path);
        }
    }
    Ok(matching)
}

fn matches_stem(name: &str, stem: &str) -> bool {
    match name.strip_prefix(stem) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}
