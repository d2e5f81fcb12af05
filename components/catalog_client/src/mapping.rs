//! Conversion from catalog wire types to `ResolvedMetadata`.
//!
//! This is the single place that knows how the API nests its fields; the
//! rest of the workspace only sees the typed record.
use crate::api::{FullAlbum, FullArtist, Track};
use song_primitives::{AlbumInfo, ArtistCredit, AudioFeatures, ResolvedMetadata};
use std::time::Duration;

/// Everything fetched for a track, ready to be flattened
pub struct TrackDetails {
    pub track: Track,
    pub album: Option<FullAlbum>,
    pub artist: Option<FullArtist>,
    pub audio_features: Option<AudioFeatures>,
    pub lyrics: Option<String>,
}

pub fn to_metadata(details: TrackDetails) -> ResolvedMetadata {
    let TrackDetails {
        track,
        album,
        artist,
        audio_features,
        lyrics,
    } = details;

    let release_date = track.album.release_date.clone();
    let year = release_date
        .as_deref()
        .and_then(|date| date.get(..4))
        .map(str::to_string);
    let genre = artist
        .as_ref()
        .and_then(|artist| artist.genres.first())
        .map(|genre| title_case(genre));
    let total_tracks = album
        .as_ref()
        .and_then(|album| album.total_tracks)
        .or(track.album.total_tracks);
    let publisher = album.as_ref().and_then(|album| album.label.clone());
    let copyright = album
        .as_ref()
        .and_then(|album| album.copyrights.first())
        .map(|copyright| copyright.text.clone());

    ResolvedMetadata {
        artists: track
            .artists
            .into_iter()
            .map(|artist| ArtistCredit {
                id: artist.id.unwrap_or_default(),
                name: artist.name,
            })
            .collect(),
        album: AlbumInfo {
            id: track.album.id,
            name: track.album.name,
            release_date: track.album.release_date,
            release_date_precision: track.album.release_date_precision,
        },
        track_number: track.track_number,
        disc_number: track.disc_number,
        popularity: track.popularity.unwrap_or_default(),
        duration: Duration::from_millis(track.duration_ms),
        genre,
        publisher,
        total_tracks,
        release_date,
        year,
        copyright,
        isrc: track.external_ids.isrc,
        lyrics,
        external_url: track.external_urls.spotify,
        audio_features,
        id: track.id,
        name: track.name,
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK: &str = r#"{
        "id": "5ghIJDpPoe3CfHMGu71E6T",
        "name": "Smells Like Teen Spirit",
        "popularity": 80,
        "track_number": 1,
        "disc_number": 1,
        "duration_ms": 301920,
        "external_ids": {"isrc": "USGF19942501"},
        "external_urls": {"spotify": "https://open.spotify.com/track/5ghIJDpPoe3CfHMGu71E6T"},
        "artists": [{"id": "6olE6TJLqED3rqDCT0FyPh", "name": "Nirvana"}],
        "album": {
            "id": "2UJcKiJxNryhL050F5Z1Fk",
            "name": "Nevermind",
            "release_date": "1991-09-26",
            "release_date_precision": "day",
            "total_tracks": 13
        }
    }"#;

    fn track() -> Track {
        serde_json::from_str(TRACK).unwrap()
    }

    #[test]
    fn track_only_maps_core_fields() {
        let metadata = to_metadata(TrackDetails {
            track: track(),
            album: None,
            artist: None,
            audio_features: None,
            lyrics: None,
        });

        assert_eq!(metadata.id, "5ghIJDpPoe3CfHMGu71E6T");
        assert_eq!(metadata.artists[0].name, "Nirvana");
        assert_eq!(metadata.album.name, "Nevermind");
        assert_eq!(metadata.year.as_deref(), Some("1991"));
        assert_eq!(metadata.total_tracks, Some(13));
        assert_eq!(metadata.duration, Duration::from_millis(301_920));
        assert_eq!(metadata.isrc.as_deref(), Some("USGF19942501"));
        assert!(metadata.genre.is_none());
        assert!(metadata.publisher.is_none());
    }

    #[test]
    fn album_and_artist_enrich_the_record() {
        let album: FullAlbum = serde_json::from_str(
            r#"{"name": "Nevermind", "label": "Geffen", "total_tracks": 12,
                "copyrights": [{"text": "1991 Geffen Records"}]}"#,
        )
        .unwrap();
        let artist: FullArtist =
            serde_json::from_str(r#"{"genres": ["grunge rock", "alternative"]}"#).unwrap();

        let metadata = to_metadata(TrackDetails {
            track: track(),
            album: Some(album),
            artist: Some(artist),
            audio_features: Some(AudioFeatures {
                tempo: Some(116.8),
                ..AudioFeatures::default()
            }),
            lyrics: Some("Load up on guns".into()),
        });

        assert_eq!(metadata.genre.as_deref(), Some("Grunge Rock"));
        assert_eq!(metadata.publisher.as_deref(), Some("Geffen"));
        assert_eq!(metadata.total_tracks, Some(12));
        assert_eq!(metadata.copyright.as_deref(), Some("1991 Geffen Records"));
        assert_eq!(metadata.lyrics.as_deref(), Some("Load up on guns"));
        assert_eq!(metadata.audio_features.and_then(|f| f.tempo), Some(116.8));
    }

    #[test]
    fn short_release_date_has_no_year() {
        let mut track = track();
        track.album.release_date = Some("19".into());
        let metadata = to_metadata(TrackDetails {
            track,
            album: None,
            artist: None,
            audio_features: None,
            lyrics: None,
        });
        assert!(metadata.year.is_none());
    }
}
