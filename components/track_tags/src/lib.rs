use lofty::{Accessor, ItemKey, LoftyError, Probe, Tag, TagExt, TaggedFileExt};
use song_primitives::ResolvedMetadata;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lofty error: {0}")]
    Lofty(#[from] LoftyError),
}

/// Reads and writes catalog metadata in audio file tags
pub trait TagStore: Send + Sync {
    /// Write `metadata` into the file's tags
    fn embed(&self, path: &Path, metadata: &ResolvedMetadata) -> Result<(), TagError>;

    /// Whether the file is already tagged with `metadata`
    fn compare(&self, path: &Path, metadata: &ResolvedMetadata) -> bool;
}

/// The identifying fields as found in a file's tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSummary {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TagSummary {
    /// The summary `LoftyTags::embed` produces for `metadata`
    pub fn expected(metadata: &ResolvedMetadata) -> Self {
        Self {
            title: Some(metadata.name.clone()),
            artist: Some(metadata.artist_names()),
            album: Some(metadata.album.name.clone()),
        }
    }
}

/// Tag store using lofty; works with any container lofty can write
#[derive(Debug, Default, Clone)]
pub struct LoftyTags;

impl TagStore for LoftyTags {
    fn embed(&self, path: &Path, metadata: &ResolvedMetadata) -> Result<(), TagError> {
        let tagged_file = Probe::open(path)?.read()?;

        // Keep items we don't manage, e.g. the encoder string
        let mut tag = tagged_file
            .primary_tag()
            .cloned()
            .unwrap_or_else(|| Tag::new(tagged_file.primary_tag_type()));

        apply(&mut tag, metadata);
        tag.save_to_path(path)?;

        debug!(path = %path.display(), tag_type = ?tag.tag_type(), "embedded metadata");
        Ok(())
    }

    fn compare(&self, path: &Path, metadata: &ResolvedMetadata) -> bool {
        match read_summary(path) {
            Ok(Some(found)) => found == TagSummary::expected(metadata),
            Ok(None) => false,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "could not read tags");
                false
            }
        }
    }
}

/// Read the identifying fields from the primary tag, falling back to the first tag
pub fn read_summary(path: impl AsRef<Path>) -> Result<Option<TagSummary>, TagError> {
    let tagged_file = Probe::open(path.as_ref())?.read()?;
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag());

    Ok(tag.map(|tag| TagSummary {
        title: tag.title().map(|s| s.to_string()),
        artist: tag.artist().map(|s| s.to_string()),
        album: tag.album().map(|s| s.to_string()),
    }))
}

fn apply(tag: &mut Tag, metadata: &ResolvedMetadata) {
    tag.set_title(metadata.name.clone());
    tag.set_artist(metadata.artist_names());
    tag.set_album(metadata.album.name.clone());

    if let Some(primary) = metadata.primary_artist() {
        tag.insert_text(ItemKey::AlbumArtist, primary.name.clone());
    }
    if let Some(genre) = &metadata.genre {
        tag.set_genre(genre.clone());
    }
    if let Some(year) = metadata.year.as_deref().and_then(|y| y.parse::<u32>().ok()) {
        tag.set_year(year);
    }

    tag.set_track(metadata.track_number);
    if let Some(total) = metadata.total_tracks {
        tag.set_track_total(total);
    }
    tag.set_disk(metadata.disc_number);

    // Optional extras; formats that cannot hold an item drop it on save
    let extras = [
        (ItemKey::Isrc, &metadata.isrc),
        (ItemKey::Publisher, &metadata.publisher),
        (ItemKey::CopyrightMessage, &metadata.copyright),
        (ItemKey::Lyrics, &metadata.lyrics),
    ];
    for (key, value) in extras {
        if let Some(value) = value {
            tag.insert_text(key, value.clone());
        }
    }

    if let Some(url) = &metadata.external_url {
        tag.set_comment(url.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use song_primitives::{AlbumInfo, ArtistCredit};
    use std::time::Duration;
    use tempfile::TempDir;

    fn metadata() -> ResolvedMetadata {
        ResolvedMetadata {
            id: "5ghIJDpPoe3CfHMGu71E6T".into(),
            name: "Smells Like Teen Spirit".into(),
            artists: vec![ArtistCredit {
                id: "6olE6TJLqED3rqDCT0FyPh".into(),
                name: "Nirvana".into(),
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
            publisher: Some("Geffen".into()),
            total_tracks: Some(13),
            release_date: Some("1991-09-26".into()),
            year: Some("1991".into()),
            copyright: None,
            isrc: Some("USGF19942501".into()),
            lyrics: None,
            external_url: Some("https://open.spotify.com/track/5ghIJDpPoe3CfHMGu71E6T".into()),
            audio_features: None,
        }
    }

    /// A short silent 16-bit mono WAV file
    fn write_wav(path: &Path) {
        let samples: u32 = 800;
        let data_len = samples * 2;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&8000u32.to_le_bytes());
        bytes.extend_from_slice(&16000u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(bytes.len() + data_len as usize, 0);
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn expected_summary_joins_artists() {
        let mut metadata = metadata();
        metadata.artists.push(ArtistCredit {
            id: "x".into(),
            name: "Guest".into(),
        });
        let expected = TagSummary::expected(&metadata);
        assert_eq!(expected.artist.as_deref(), Some("Nirvana, Guest"));
    }

    #[test]
    fn untagged_file_does_not_compare_equal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("song.wav");
        write_wav(&path);

        assert!(!LoftyTags.compare(&path, &metadata()));
    }

    #[test]
    fn embedded_file_compares_equal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("song.wav");
        write_wav(&path);

        LoftyTags.embed(&path, &metadata()).unwrap();

        assert!(LoftyTags.compare(&path, &metadata()));
        let summary = read_summary(&path).unwrap().unwrap();
        assert_eq!(summary.title.as_deref(), Some("Smells Like Teen Spirit"));
    }

    #[test]
    fn different_metadata_does_not_compare_equal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("song.wav");
        write_wav(&path);
        LoftyTags.embed(&path, &metadata()).unwrap();

        let mut other = metadata();
        other.name = "Lithium".into();
        assert!(!LoftyTags.compare(&path, &other));
    }

    #[test]
    fn non_audio_file_does_not_compare_equal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        assert!(!LoftyTags.compare(&path, &metadata()));
    }
}
