use crate::error::CatalogError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const LRCLIB_GET: &str = "https://lrclib.net/api/get";

/// Lookup key for a lyrics provider
#[derive(Debug, Clone)]
pub struct LyricsQuery<'a> {
    pub artist: &'a str,
    pub title: &'a str,
    pub album: &'a str,
    pub duration: Duration,
}

#[async_trait]
pub trait LyricsProvider: Send + Sync {
    async fn lookup(&self, query: &LyricsQuery<'_>) -> Result<Option<String>, CatalogError>;
}

/// Plain lyrics from the public LRCLIB service
pub struct LrcLib {
    http: reqwest::Client,
}

impl LrcLib {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LrcLibRecord {
    plain_lyrics: Option<String>,
    #[serde(default)]
    instrumental: bool,
}

#[async_trait]
impl LyricsProvider for LrcLib {
    async fn lookup(&self, query: &LyricsQuery<'_>) -> Result<Option<String>, CatalogError> {
        let duration = query.duration.as_secs().to_string();
        let response = self
            .http
            .get(LRCLIB_GET)
            .query(&[
                ("artist_name", query.artist),
                ("track_name", query.title),
                ("album_name", query.album),
                ("duration", duration.as_str()),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record: LrcLibRecord = response.error_for_status()?.json().await?;
        Ok(plain_lyrics(record))
    }
}

fn plain_lyrics(record: LrcLibRecord) -> Option<String> {
    if record.instrumental {
        return None;
    }
    record.plain_lyrics.filter(|text| !text.trim().is_empty())
}
