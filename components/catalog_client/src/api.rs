//! Wire types for the Spotify Web API, limited to the fields we read.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: Paging<Track>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalIds {
    pub isrc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleAlbum {
    pub id: String,
    pub name: String,
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
    pub total_tracks: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub popularity: Option<u32>,
    pub track_number: u32,
    pub disc_number: u32,
    pub duration_ms: u64,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub artists: Vec<SimpleArtist>,
    pub album: SimpleAlbum,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Copyright {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FullAlbum {
    pub name: String,
    pub label: Option<String>,
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub copyrights: Vec<Copyright>,
    pub tracks: Option<Paging<TrackRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FullArtist {
    #[serde(default)]
    pub genres: Vec<String>,
}

/// A track as it appears in album and playlist listings
#[derive(Debug, Clone, Deserialize)]
pub struct TrackRef {
    pub id: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl TrackRef {
    /// Id of a downloadable catalog track; local files and episodes have none
    pub fn track_id(&self) -> Option<&str> {
        if self.is_local || self.kind.as_deref().is_some_and(|kind| kind != "track") {
            return None;
        }
        self.id.as_deref()
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<TrackRef>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistName {
    pub name: String,
}
