// components/song_pipeline/src/testing.rs
//! In-memory collaborators for pipeline tests.
use crate::hook::{AnalysisHook, HookError};
use crate::prompt::Prompt;
use async_trait::async_trait;
use catalog_client::{CatalogError, CatalogService, EnumeratedCollection};
use media_downloader::{DownloadError, TranscodeError, Transcoder, VideoPlatform};
use parking_lot::Mutex;
use song_primitives::{
    catalog_track_url, AlbumInfo, ArtistCredit, Collection, MatchHints, MatchedMedia,
    ResolvedMetadata,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use track_tags::{TagError, TagStore};

pub fn catalog_url(id: &str) -> String {
    catalog_track_url(id)
}

pub fn metadata(id: &str, artist: &str, title: &str) -> ResolvedMetadata {
    ResolvedMetadata {
        id: id.to_string(),
        name: title.to_string(),
        artists: vec![ArtistCredit {
            id: format!("artist-{id}"),
            name: artist.to_string(),
        }],
        album: AlbumInfo {
            id: "2UJcKiJxNryhL050F5Z1Fk".into(),
            name: "Nevermind".into(),
            release_date: Some("1991-09-26".into()),
            release_date_precision: Some("day".into()),
        },
        track_number: 1,
        disc_number: 1,
        popularity: 80,
        duration: Duration::from_secs(301),
        genre: Some("Grunge".into()),
        publisher: Some("DGC".into()),
        total_tracks: Some(13),
        release_date: Some("1991-09-26".into()),
        year: Some("1991".into()),
        copyright: None,
        isrc: Some("USGF19942501".into()),
        lyrics: None,
        external_url: Some(catalog_track_url(id)),
        audio_features: None,
    }
}

pub fn media(id: &str, title: &str, seconds: u64) -> MatchedMedia {
    MatchedMedia {
        id: id.to_string(),
        title: title.to_string(),
        duration: Duration::from_secs(seconds),
        url: format!("https://www.youtube.com/watch?v={id}"),
    }
}

/// Catalog answering from a fixed table of queries
#[derive(Default)]
pub struct FakeCatalog {
    tracks: HashMap<String, ResolvedMetadata>,
    collections: HashMap<String, EnumeratedCollection>,
    /// Queries answered with `CredentialExpired` until reauthentication
    expiring: HashSet<String>,
    expired: AtomicBool,
    pub reauthentications: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_track(mut self, query: impl Into<String>, metadata: ResolvedMetadata) -> Self {
        self.tracks.insert(query.into(), metadata);
        self
    }

    pub fn with_collection(mut self, id: &str, collection: EnumeratedCollection) -> Self {
        self.collections.insert(id.to_string(), collection);
        self
    }

    /// Make the token expire the first time `query` is resolved
    pub fn expiring_on(mut self, query: impl Into<String>) -> Self {
        self.expiring.insert(query.into());
        self.expired.store(true, Ordering::SeqCst);
        self
    }

    /// Token stays expired even after reauthenticating
    pub fn always_expired(self) -> Self {
        self.expired.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn resolve(&self, query: &str) -> Result<Option<ResolvedMetadata>, CatalogError> {
        self.queries.lock().push(query.to_string());
        let expired = self.expired.load(Ordering::SeqCst);
        if expired && (self.expiring.is_empty() || self.expiring.contains(query)) {
            return Err(CatalogError::CredentialExpired);
        }
        Ok(self.tracks.get(query).cloned())
    }

    async fn enumerate(&self, collection: &Collection) -> Result<EnumeratedCollection, CatalogError> {
        self.collections
            .get(&collection.id)
            .cloned()
            .ok_or(CatalogError::Status {
                status: 404,
                body: "no such collection".into(),
            })
    }

    async fn reauthenticate(&self) -> Result<(), CatalogError> {
        self.reauthentications.fetch_add(1, Ordering::SeqCst);
        if !self.expiring.is_empty() {
            self.expired.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Video platform with canned search results
#[derive(Default)]
pub struct FakePlatform {
    searches: HashMap<String, MatchedMedia>,
    urls: HashMap<String, MatchedMedia>,
    /// Remaining failed downloads per video id
    failures: Mutex<HashMap<String, u32>>,
    /// Queries whose search fails with an unclassified error
    broken_queries: HashSet<String>,
    pub downloads: Mutex<Vec<String>>,
}

impl FakePlatform {
    pub fn with_search(mut self, query: impl Into<String>, media: MatchedMedia) -> Self {
        self.searches.insert(query.into(), media);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>, media: MatchedMedia) -> Self {
        self.urls.insert(url.into(), media);
        self
    }

    pub fn failing_downloads(self, video_id: &str, times: u32) -> Self {
        self.failures.lock().insert(video_id.to_string(), times);
        self
    }

    pub fn broken_search(mut self, query: impl Into<String>) -> Self {
        self.broken_queries.insert(query.into());
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().len()
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn search(
        &self,
        query: &str,
        _hints: &MatchHints,
    ) -> Result<Option<MatchedMedia>, DownloadError> {
        if self.broken_queries.contains(query) {
            return Err(DownloadError::Parse {
                tool: "fake",
                reason: format!("cannot search for {query}"),
            });
        }
        Ok(self.searches.get(query).cloned())
    }

    async fn fetch(&self, url: &str) -> Result<Option<MatchedMedia>, DownloadError> {
        Ok(self.urls.get(url).cloned())
    }

    async fn download(
        &self,
        media: &MatchedMedia,
        destination: &Path,
    ) -> Result<bool, DownloadError> {
        {
            let mut failures = self.failures.lock();
            if let Some(remaining) = failures.get_mut(&media.id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(false);
                }
            }
        }
        tokio::fs::write(destination, media.id.as_bytes()).await?;
        self.downloads.lock().push(media.id.clone());
        Ok(true)
    }
}

/// Transcoder that copies the input, or pretends its binary is missing
#[derive(Default)]
pub struct FakeTranscoder {
    pub missing: bool,
}

impl FakeTranscoder {
    pub fn missing() -> Self {
        Self { missing: true }
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        _working_dir: &Path,
    ) -> Result<(), TranscodeError> {
        if self.missing {
            return Err(TranscodeError::BinaryNotFound("ffmpeg"));
        }
        if input != output {
            tokio::fs::copy(input, output).await?;
        }
        Ok(())
    }
}

/// Tag store remembering which catalog id each file was tagged with
#[derive(Default)]
pub struct FakeTags {
    tagged: Mutex<HashMap<PathBuf, String>>,
}

impl FakeTags {
    pub fn mark_tagged(&self, path: &Path, metadata: &ResolvedMetadata) {
        self.tagged.lock().insert(path.to_path_buf(), metadata.id.clone());
    }

    pub fn tag_of(&self, path: &Path) -> Option<String> {
        self.tagged.lock().get(path).cloned()
    }
}

impl TagStore for FakeTags {
    fn embed(&self, path: &Path, metadata: &ResolvedMetadata) -> Result<(), TagError> {
        std::fs::metadata(path)?;
        self.mark_tagged(path, metadata);
        Ok(())
    }

    fn compare(&self, path: &Path, metadata: &ResolvedMetadata) -> bool {
        self.tag_of(path).as_deref() == Some(metadata.id.as_str())
    }
}

pub struct FakePrompt {
    answer: bool,
    asked: AtomicUsize,
}

impl FakePrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn questions(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prompt for FakePrompt {
    async fn confirm(&self, _question: &str) -> std::io::Result<bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

/// Hook recording the artifacts it was run on
#[derive(Default)]
pub struct RecordingHook {
    pub fail: bool,
    pub analysed: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl AnalysisHook for RecordingHook {
    async fn analyse(&self, artifact: &Path) -> Result<(), HookError> {
        self.analysed.lock().push(artifact.to_path_buf());
        if self.fail {
            return Err(HookError::Failed {
                program: "fake-analyser".into(),
                status: "exit status: 2".into(),
            });
        }
        Ok(())
    }
}
