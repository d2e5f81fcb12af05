// components/song_primitives/src/reference.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

const CATALOG_HOST: &str = "open.spotify.com";
const VIDEO_HOSTS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

/// One requested song, exactly as it was read from its source
///
/// The string is never rewritten after construction apart from trimming
/// surrounding whitespace, so it can be matched back against the line it
/// came from in a batch list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongReference(String);

/// What kind of input a `SongReference` holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A catalog-service track, by id
    CatalogTrack { id: String },
    /// A video-platform URL
    VideoUrl,
    /// Free text, used as a search query
    Text,
}

impl SongReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> ReferenceKind {
        if let Some(id) = catalog_id(&self.0, "track") {
            return ReferenceKind::CatalogTrack { id };
        }
        if is_video_url(&self.0) {
            return ReferenceKind::VideoUrl;
        }
        ReferenceKind::Text
    }

    pub fn is_catalog(&self) -> bool {
        matches!(self.kind(), ReferenceKind::CatalogTrack { .. })
    }
}

impl fmt::Display for SongReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SongReference {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Canonical catalog URL for a track id, as written to batch lists
pub fn catalog_track_url(id: &str) -> String {
    format!("https://{CATALOG_HOST}/track/{id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Playlist,
    Album,
    User,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectionKind::Playlist => "playlist",
            CollectionKind::Album => "album",
            CollectionKind::User => "user",
        };
        f.write_str(name)
    }
}

/// A catalog collection whose tracks can be enumerated into references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub kind: CollectionKind,
    pub id: String,
}

impl Collection {
    /// Parse a playlist URL/URI, an album URL/URI, or a user name/profile URL
    ///
    /// Returns `None` when the input does not name a collection of `kind`.
    pub fn parse(kind: CollectionKind, input: &str) -> Option<Self> {
        let input = input.trim();
        let id = match kind {
            CollectionKind::Playlist => catalog_id(input, "playlist")?,
            CollectionKind::Album => catalog_id(input, "album")?,
            CollectionKind::User => match catalog_id(input, "user") {
                Some(id) => id,
                None if !input.is_empty() && !input.contains([':', '/']) => input.to_string(),
                None => return None,
            },
        };
        Some(Self { kind, id })
    }
}

/// Extract the id following `segment` in a catalog URL or URI
fn catalog_id(input: &str, segment: &str) -> Option<String> {
    let input = input.trim();

    if let Some(rest) = input.strip_prefix("spotify:") {
        // spotify:track:<id> and the legacy spotify:user:<name>:playlist:<id>
        let parts: Vec<&str> = rest.split(':').collect();
        return parts
            .windows(2)
            .rev()
            .find(|pair| pair[0] == segment)
            .map(|pair| pair[1].to_string())
            .filter(|id| !id.is_empty());
    }

    let url = Url::parse(input).ok()?;
    if url.host_str() != Some(CATALOG_HOST) {
        return None;
    }
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    let position = segments.iter().position(|s| *s == segment)?;
    segments
        .get(position + 1)
        .map(|id| id.to_string())
        .filter(|id| !id.is_empty())
}

fn is_video_url(input: &str) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https")
        && url
            .host_str()
            .map(|host| VIDEO_HOSTS.contains(&host))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://open.spotify.com/track/2DGa7iaidT5s0qnINlwMjJ", "2DGa7iaidT5s0qnINlwMjJ")]
    #[case(
        "https://open.spotify.com/track/2DGa7iaidT5s0qnINlwMjJ?si=abc123",
        "2DGa7iaidT5s0qnINlwMjJ"
    )]
    #[case(
        "https://open.spotify.com/intl-de/track/2DGa7iaidT5s0qnINlwMjJ",
        "2DGa7iaidT5s0qnINlwMjJ"
    )]
    #[case("spotify:track:2DGa7iaidT5s0qnINlwMjJ", "2DGa7iaidT5s0qnINlwMjJ")]
    #[case("  spotify:track:2DGa7iaidT5s0qnINlwMjJ \n", "2DGa7iaidT5s0qnINlwMjJ")]
    fn catalog_tracks_are_recognised(#[case] raw: &str, #[case] id: &str) {
        assert_eq!(
            SongReference::new(raw).kind(),
            ReferenceKind::CatalogTrack { id: id.to_string() }
        );
    }

    #[rstest]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ")]
    #[case("https://youtu.be/dQw4w9WgXcQ")]
    #[case("http://music.youtube.com/watch?v=dQw4w9WgXcQ")]
    fn video_urls_are_recognised(#[case] raw: &str) {
        assert_eq!(SongReference::new(raw).kind(), ReferenceKind::VideoUrl);
    }

    #[rstest]
    #[case("Queen - Bohemian Rhapsody")]
    #[case("https://open.spotify.com/album/1GbtB4zTqAsyfZEsm1RZfx")]
    #[case("https://example.com/watch?v=dQw4w9WgXcQ")]
    #[case("spotify:track:")]
    fn everything_else_is_text(#[case] raw: &str) {
        assert_eq!(SongReference::new(raw).kind(), ReferenceKind::Text);
    }

    #[test]
    fn reference_keeps_its_text() {
        let reference = SongReference::new(" a song \t");
        assert_eq!(reference.as_str(), "a song");
        assert_eq!(reference.to_string(), "a song");
    }

    #[rstest]
    #[case(
        CollectionKind::Playlist,
        "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=x",
        "37i9dQZF1DXcBWIGoYBM5M"
    )]
    #[case(
        CollectionKind::Playlist,
        "spotify:user:someone:playlist:37i9dQZF1DXcBWIGoYBM5M",
        "37i9dQZF1DXcBWIGoYBM5M"
    )]
    #[case(CollectionKind::Album, "spotify:album:1GbtB4zTqAsyfZEsm1RZfx", "1GbtB4zTqAsyfZEsm1RZfx")]
    #[case(CollectionKind::User, "https://open.spotify.com/user/someone", "someone")]
    #[case(CollectionKind::User, "someone", "someone")]
    fn collections_parse(#[case] kind: CollectionKind, #[case] raw: &str, #[case] id: &str) {
        assert_eq!(
            Collection::parse(kind, raw),
            Some(Collection {
                kind,
                id: id.to_string()
            })
        );
    }

    #[test]
    fn album_url_is_not_a_playlist() {
        assert_eq!(
            Collection::parse(
                CollectionKind::Playlist,
                "https://open.spotify.com/album/1GbtB4zTqAsyfZEsm1RZfx"
            ),
            None
        );
    }

    #[test]
    fn canonical_track_url_round_trips() {
        let url = catalog_track_url("2DGa7iaidT5s0qnINlwMjJ");
        assert_eq!(
            SongReference::new(url).kind(),
            ReferenceKind::CatalogTrack {
                id: "2DGa7iaidT5s0qnINlwMjJ".to_string()
            }
        );
    }
}
