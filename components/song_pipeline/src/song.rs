// components/song_pipeline/src/song.rs
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::naming::{candidate_filename, render_query, sanitize_title, stays_inside, title_to_query};
use crate::prompt::Prompt;
use crate::reconcile::{Presence, Reconciler};
use crate::record::{DownloadRecord, RecordLog};
use catalog_client::CatalogService;
use media_downloader::{TranscodeError, Transcoder, VideoPlatform};
use song_primitives::{MatchHints, MatchedMedia, ReferenceKind, ResolvedMetadata, SongReference};
use std::path::PathBuf;
use std::sync::Arc;
use track_tags::TagStore;
use tracing::{debug, info, info_span, warn, Instrument};

/// External services a `SongDownloader` drives
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn CatalogService>,
    pub platform: Arc<dyn VideoPlatform>,
    pub transcoder: Arc<dyn Transcoder>,
    pub tags: Arc<dyn TagStore>,
    pub prompt: Arc<dyn Prompt>,
}

/// How a song that didn't fail ended
#[derive(Debug, Clone, PartialEq)]
pub enum SongOutcome {
    /// Stored at this path
    Downloaded(PathBuf),
    /// No media on the video platform (or no catalog track) matched
    NoMatch,
    /// Metadata-only mode and the catalog had nothing
    NoMetadata,
    /// Dry run; the artifact would have been named `filename`
    DryRun { filename: String },
    /// A satisfying artifact is already in the destination
    AlreadyPresent { filename: String },
}

impl SongOutcome {
    pub fn artifact(&self) -> Option<&PathBuf> {
        match self {
            SongOutcome::Downloaded(path) => Some(path),
            _ => None,
        }
    }
}

/// Resolves, downloads, transcodes, tags and records one song at a time
pub struct SongDownloader {
    config: PipelineConfig,
    catalog: Arc<dyn CatalogService>,
    platform: Arc<dyn VideoPlatform>,
    transcoder: Arc<dyn Transcoder>,
    tags: Arc<dyn TagStore>,
    reconciler: Reconciler,
    records: RecordLog,
}

impl SongDownloader {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        let config = config.normalized();
        let reconciler = Reconciler::new(
            config.folder.clone(),
            config.overwrite,
            collaborators.tags.clone(),
            collaborators.prompt,
        );
        let records = RecordLog::new(&config.folder);

        Self {
            config,
            catalog: collaborators.catalog,
            platform: collaborators.platform,
            transcoder: collaborators.transcoder,
            tags: collaborators.tags,
            reconciler,
            records,
        }
    }

    /// Control whether download records are also printed to stdout
    pub fn with_record_echo(mut self, echo: bool) -> Self {
        self.records = self.records.with_echo(echo);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.catalog
    }

    pub fn records(&self) -> &RecordLog {
        &self.records
    }

    /// Run the whole pipeline for one reference
    ///
    /// `number` is the position in a batch list and only affects logging.
    pub async fn download(
        &self,
        reference: &SongReference,
        number: Option<usize>,
    ) -> Result<SongOutcome, PipelineError> {
        let span = info_span!("song", %reference, number = ?number);
        self.run(reference, number).instrument(span).await
    }

    async fn run(
        &self,
        reference: &SongReference,
        number: Option<usize>,
    ) -> Result<SongOutcome, PipelineError> {
        let (metadata, media) = self.resolve(reference).await?;

        let Some(media) = media else {
            debug!("found no matching video");
            return Ok(SongOutcome::NoMatch);
        };

        if self.config.download_only_metadata && metadata.is_none() {
            info!("found no metadata, skipping the download");
            return Ok(SongOutcome::NoMetadata);
        }

        info!("{} ({})", media.display_title(number), media.url);

        let filename = self.filename_for(metadata.as_ref(), &media);
        if self.config.dry_run {
            info!(%filename, "dry run, not downloading");
            return Ok(SongOutcome::DryRun { filename });
        }

        let presence = self
            .reconciler
            .check(&filename, reference, metadata.as_ref())
            .await?;
        if presence == Presence::Exists {
            return Ok(SongOutcome::AlreadyPresent { filename });
        }

        let artifact = self.fetch_artifact(&filename, &media).await?;

        if let Some(metadata) = &metadata {
            if !self.config.no_metadata {
                self.tags.embed(&artifact, metadata)?;
            }
            if !self.config.no_file_storage {
                self.records
                    .append(&DownloadRecord::new(metadata, &media))
                    .await?;
            }
        }

        Ok(SongOutcome::Downloaded(artifact))
    }

    /// Catalog metadata and the media to download for `reference`
    async fn resolve(
        &self,
        reference: &SongReference,
    ) -> Result<(Option<ResolvedMetadata>, Option<MatchedMedia>), PipelineError> {
        let kind = reference.kind();

        if kind == ReferenceKind::VideoUrl {
            debug!("input song is a video URL");
            let Some(media) = self.platform.fetch(reference.as_str()).await? else {
                return Ok((None, None));
            };
            let query = title_to_query(&media.title);
            let metadata = self.catalog.resolve(&query).await?;
            return Ok((metadata, Some(media)));
        }

        let metadata = self.catalog.resolve(reference.as_str()).await?;
        let query = match (&metadata, kind) {
            (Some(metadata), _) => render_query(&self.config.search_format, metadata),
            (None, ReferenceKind::CatalogTrack { id }) => {
                debug!(%id, "catalog has no such track");
                return Ok((None, None));
            }
            (None, _) => reference.as_str().to_string(),
        };

        let hints = MatchHints {
            duration: metadata.as_ref().map(|metadata| metadata.duration),
        };
        let media = self.platform.search(&query, &hints).await?;
        Ok((metadata, media))
    }

    fn filename_for(&self, metadata: Option<&ResolvedMetadata>, media: &MatchedMedia) -> String {
        if metadata.is_none() {
            warn!("could not find metadata");
        }
        let title = if sanitize_title(&media.title).is_empty() {
            &media.id
        } else {
            &media.title
        };
        let filename = candidate_filename(
            &self.config.file_format,
            metadata,
            title,
            self.config.no_spaces,
        );
        debug!(from = %media.title, to = %filename, "refined song name");
        filename
    }

    /// Download, transcode and clean up; returns the final artifact path
    async fn fetch_artifact(
        &self,
        filename: &str,
        media: &MatchedMedia,
    ) -> Result<PathBuf, PipelineError> {
        if !stays_inside(filename) {
            return Err(PipelineError::OutsideFolder(filename.to_string()));
        }

        let folder = &self.config.folder;
        let input = folder.join(format!("{filename}{}", self.config.input_ext));
        let output = folder.join(format!("{filename}{}", self.config.output_ext));

        if let Some(directory) = input.parent() {
            tokio::fs::create_dir_all(directory).await?;
        }

        if !self.platform.download(media, &input).await? {
            return Err(PipelineError::transient(format!(
                "download of {} did not complete",
                media.url
            )));
        }

        match self.transcoder.transcode(&input, &output, folder).await {
            Ok(()) => {}
            Err(TranscodeError::BinaryNotFound(tool)) => {
                warn!("could not find {tool}, skipping conversion");
                return Ok(input);
            }
            Err(e) => return Err(e.into()),
        }

        if self.config.input_ext != self.config.output_ext {
            tokio::fs::remove_file(&input).await?;
        }
        Ok(output)
    }
}
