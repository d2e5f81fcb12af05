// components/song_pipeline/src/record.rs
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use song_primitives::{format_clock, MatchedMedia, ResolvedMetadata};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// File name of the download log inside the destination folder
pub const METADATA_LOG: &str = "metadata.jsonl";

/// One line of the download log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub spotify: CatalogFields,
    pub youtube: PlatformFields,
}

/// Catalog fields of a record, keyed by their dotted source names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFields {
    pub id: String,
    pub name: String,
    pub popularity: u32,
    pub track_number: u32,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub publisher: Option<String>,
    pub total_tracks: Option<u32>,
    pub lyrics: Option<String>,
    pub year: Option<String>,
    /// Seconds
    pub duration: f64,
    #[serde(rename = "external_ids.isrc")]
    pub isrc: Option<String>,
    #[serde(rename = "artists.name")]
    pub artist_name: Option<String>,
    #[serde(rename = "artists.id")]
    pub artist_id: Option<String>,
    #[serde(rename = "album.name")]
    pub album_name: String,
    #[serde(rename = "album.id")]
    pub album_id: String,
    #[serde(rename = "album.release_date")]
    pub album_release_date: Option<String>,
    #[serde(rename = "album.release_date_precision")]
    pub album_release_date_precision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformFields {
    pub videoid: String,
    pub title: String,
    /// `HH:MM:SS`
    pub duration: String,
}

impl DownloadRecord {
    pub fn new(metadata: &ResolvedMetadata, media: &MatchedMedia) -> Self {
        let artist = metadata.primary_artist();
        Self {
            spotify: CatalogFields {
                id: metadata.id.clone(),
                name: metadata.name.clone(),
                popularity: metadata.popularity,
                track_number: metadata.track_number,
                genre: metadata.genre.clone(),
                release_date: metadata.release_date.clone(),
                publisher: metadata.publisher.clone(),
                total_tracks: metadata.total_tracks,
                lyrics: metadata.lyrics.clone(),
                year: metadata.year.clone(),
                duration: metadata.duration.as_secs_f64(),
                isrc: metadata.isrc.clone(),
                artist_name: artist.map(|artist| artist.name.clone()),
                artist_id: artist.map(|artist| artist.id.clone()),
                album_name: metadata.album.name.clone(),
                album_id: metadata.album.id.clone(),
                album_release_date: metadata.album.release_date.clone(),
                album_release_date_precision: metadata.album.release_date_precision.clone(),
            },
            youtube: PlatformFields {
                videoid: media.id.clone(),
                title: media.title.clone(),
                duration: format_clock(media.duration),
            },
        }
    }
}

/// Append-only JSON-lines log of completed downloads
#[derive(Debug, Clone)]
pub struct RecordLog {
    path: PathBuf,
    echo: bool,
}

impl RecordLog {
    /// Log at `<folder>/metadata.jsonl`, echoing each record to stdout
    pub fn new(folder: &Path) -> Self {
        Self {
            path: folder.join(METADATA_LOG),
            echo: true,
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &DownloadRecord) -> Result<(), PipelineError> {
        let line = serde_json::to_string(record)?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{line}\n").as_bytes()).await?;
        file.flush().await?;

        if self.echo {
            println!("{line}");
        }
        Ok(())
    }

    /// Every record in the log, oldest first
    pub async fn read_all(&self) -> Result<Vec<DownloadRecord>, PipelineError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(PipelineError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{media, metadata};

    #[test]
    fn record_uses_dotted_catalog_keys() {
        let record = DownloadRecord::new(
            &metadata("5ghIJDpPoe3CfHMGu71E6T", "Nirvana", "Smells Like Teen Spirit"),
            &media("hTWKbfoikeg", "Nirvana - Smells Like Teen Spirit", 301),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["spotify"]["id"], "5ghIJDpPoe3CfHMGu71E6T");
        assert_eq!(json["spotify"]["artists.name"], "Nirvana");
        assert_eq!(json["spotify"]["album.name"], "Nevermind");
        assert_eq!(json["spotify"]["external_ids.isrc"], "USGF19942501");
        assert_eq!(json["spotify"]["duration"], 301.0);
        assert_eq!(json["youtube"]["videoid"], "hTWKbfoikeg");
        assert_eq!(json["youtube"]["duration"], "00:05:01");

        let keys: Vec<_> = json["spotify"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 18);
    }

    #[tokio::test]
    async fn records_are_appended_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordLog::new(dir.path()).with_echo(false);
        let first = DownloadRecord::new(&metadata("a", "A", "One"), &media("v1", "A - One", 100));
        let second = DownloadRecord::new(&metadata("b", "B", "Two"), &media("v2", "B - Two", 200));

        log.append(&first).await.unwrap();
        log.append(&second).await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join(METADATA_LOG)).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert_eq!(log.read_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn missing_log_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = RecordLog::new(dir.path());
        assert!(log.read_all().await.unwrap().is_empty());
    }
}
