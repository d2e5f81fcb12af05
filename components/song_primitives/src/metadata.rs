// components/song_primitives/src/metadata.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistCredit {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub id: String,
    pub name: String,
    pub release_date: Option<String>,
    /// `year`, `month` or `day`
    pub release_date_precision: Option<String>,
}

/// Derived audio features reported by the catalog service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: Option<f32>,
    pub energy: Option<f32>,
    pub key: Option<i32>,
    pub loudness: Option<f32>,
    pub mode: Option<i32>,
    pub speechiness: Option<f32>,
    pub acousticness: Option<f32>,
    pub instrumentalness: Option<f32>,
    pub liveness: Option<f32>,
    pub valence: Option<f32>,
    pub tempo: Option<f32>,
    pub time_signature: Option<i32>,
}

/// The catalog record a song reference resolved to
///
/// Built once by the catalog client's mapping step and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub id: String,
    pub name: String,
    /// Credited artists in catalog order; the first is the primary artist
    pub artists: Vec<ArtistCredit>,
    pub album: AlbumInfo,
    pub track_number: u32,
    pub disc_number: u32,
    pub popularity: u32,
    pub duration: Duration,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub total_tracks: Option<u32>,
    pub release_date: Option<String>,
    pub year: Option<String>,
    pub copyright: Option<String>,
    pub isrc: Option<String>,
    pub lyrics: Option<String>,
    pub external_url: Option<String>,
    pub audio_features: Option<AudioFeatures>,
}

impl ResolvedMetadata {
    pub fn primary_artist(&self) -> Option<&ArtistCredit> {
        self.artists.first()
    }

    /// All artist names joined the way they are written into tags
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
