use crate::api::{
    FullAlbum, FullArtist, Paging, PlaylistItem, PlaylistName, PlaylistSummary, SearchResponse,
    TokenResponse, Track, TrackRef,
};
use crate::error::CatalogError;
use crate::lyrics::{LyricsProvider, LyricsQuery};
use crate::mapping::{to_metadata, TrackDetails};
use crate::types::{CatalogService, EnumeratedCollection};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use song_primitives::{
    catalog_track_url, AudioFeatures, Collection, CollectionKind, ReferenceKind, ResolvedMetadata,
    SongReference,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-credentials pair for the catalog API
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Spotify Web API client
///
/// The access token expires after a fixed window; requests made with a
/// stale token fail with `CatalogError::CredentialExpired` and the caller
/// decides when to `reauthenticate`.
pub struct SpotifyClient {
    http: reqwest::Client,
    credentials: Credentials,
    token: RwLock<String>,
    lyrics: Option<Arc<dyn LyricsProvider>>,
}

impl SpotifyClient {
    /// Authenticate and return a ready client
    pub async fn connect(credentials: Credentials) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let token = request_token(&http, &credentials).await?;

        Ok(Self {
            http,
            credentials,
            token: RwLock::new(token),
            lyrics: None,
        })
    }

    pub fn with_lyrics(mut self, provider: Arc<dyn LyricsProvider>) -> Self {
        self.lyrics = Some(provider);
        self
    }

    /// HTTP client shared with collaborators such as lyrics providers
    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, CatalogError> {
        let token = self.token.read().clone();
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        match check_status(response).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    async fn endpoint<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CatalogError> {
        self.get(&format!("{API_BASE}/{path}"), &[]).await
    }

    /// Fetch optional enrichment; only an expired token is worth surfacing
    async fn best_effort<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CatalogError> {
        match self.endpoint(path).await {
            Ok(value) => Ok(value),
            Err(CatalogError::CredentialExpired) => Err(CatalogError::CredentialExpired),
            Err(e) => {
                debug!(path, error = %e, "optional catalog lookup failed");
                Ok(None)
            }
        }
    }

    async fn find_track(&self, query: &str) -> Result<Option<Track>, CatalogError> {
        match SongReference::new(query).kind() {
            ReferenceKind::CatalogTrack { id } => self.endpoint(&format!("tracks/{id}")).await,
            _ => {
                let found: Option<SearchResponse> = self
                    .get(
                        &format!("{API_BASE}/search"),
                        &[("q", query), ("type", "track"), ("limit", "1")],
                    )
                    .await?;
                Ok(found.and_then(|found| found.tracks.items.into_iter().next()))
            }
        }
    }

    async fn lookup_lyrics(&self, track: &Track) -> Option<String> {
        let provider = self.lyrics.as_ref()?;
        let query = LyricsQuery {
            artist: track.artists.first().map(|a| a.name.as_str()).unwrap_or_default(),
            title: &track.name,
            album: &track.album.name,
            duration: Duration::from_millis(track.duration_ms),
        };
        match provider.lookup(&query).await {
            Ok(lyrics) => lyrics,
            Err(e) => {
                warn!(track = %track.name, error = %e, "lyrics lookup failed");
                None
            }
        }
    }

    /// Collect track references from `page` and every page after it
    async fn collect_pages<T, F>(
        &self,
        mut page: Paging<T>,
        references: &mut Vec<SongReference>,
        track_of: F,
    ) -> Result<(), CatalogError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> Option<&TrackRef>,
    {
        loop {
            references.extend(
                page.items
                    .iter()
                    .filter_map(|item| track_of(item)?.track_id())
                    .map(|id| SongReference::new(catalog_track_url(id))),
            );
            let Some(next) = page.next.take() else {
                return Ok(());
            };
            page = match self.get(&next, &[]).await? {
                Some(page) => page,
                None => return Ok(()),
            };
        }
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        references: &mut Vec<SongReference>,
    ) -> Result<(), CatalogError> {
        let first: Option<Paging<PlaylistItem>> = self
            .get(
                &format!("{API_BASE}/playlists/{playlist_id}/tracks"),
                &[("limit", "100")],
            )
            .await?;
        match first {
            Some(page) => {
                self.collect_pages(page, references, |item: &PlaylistItem| item.track.as_ref())
                    .await
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogService for SpotifyClient {
    async fn resolve(&self, query: &str) -> Result<Option<ResolvedMetadata>, CatalogError> {
        let Some(track) = self.find_track(query).await? else {
            debug!(query, "no catalog match");
            return Ok(None);
        };

        let album: Option<FullAlbum> = self.best_effort(&format!("albums/{}", track.album.id)).await?;
        let artist: Option<FullArtist> = match track.artists.first().and_then(|a| a.id.as_deref()) {
            Some(artist_id) => self.best_effort(&format!("artists/{artist_id}")).await?,
            None => None,
        };
        let audio_features: Option<AudioFeatures> =
            self.best_effort(&format!("audio-features/{}", track.id)).await?;
        let lyrics = self.lookup_lyrics(&track).await;

        let metadata = to_metadata(TrackDetails {
            track,
            album,
            artist,
            audio_features,
            lyrics,
        });
        debug!(id = %metadata.id, name = %metadata.name, "resolved catalog track");

        Ok(Some(metadata))
    }

    async fn enumerate(&self, collection: &Collection) -> Result<EnumeratedCollection, CatalogError> {
        let mut references = Vec::new();
        let id = collection.id.as_str();

        let name = match collection.kind {
            CollectionKind::Playlist => {
                let playlist: Option<PlaylistName> = self
                    .get(&format!("{API_BASE}/playlists/{id}"), &[("fields", "name")])
                    .await?;
                self.playlist_tracks(id, &mut references).await?;
                playlist.map(|p| p.name).unwrap_or_else(|| id.to_string())
            }
            CollectionKind::Album => match self.endpoint::<FullAlbum>(&format!("albums/{id}")).await? {
                Some(FullAlbum {
                    name,
                    tracks: Some(page),
                    ..
                }) => {
                    self.collect_pages(page, &mut references, |track: &TrackRef| Some(track))
                        .await?;
                    name
                }
                Some(album) => album.name,
                None => id.to_string(),
            },
            CollectionKind::User => {
                let first: Option<Paging<PlaylistSummary>> = self
                    .get(&format!("{API_BASE}/users/{id}/playlists"), &[("limit", "50")])
                    .await?;
                let mut playlists = Vec::new();
                let mut page = first;
                while let Some(mut current) = page {
                    playlists.append(&mut current.items);
                    page = match current.next {
                        Some(next) => self.get(&next, &[]).await?,
                        None => None,
                    };
                }
                for playlist in &playlists {
                    info!(playlist = %playlist.name, "enumerating user playlist");
                    self.playlist_tracks(&playlist.id, &mut references).await?;
                }
                id.to_string()
            }
        };

        info!(%name, kind = %collection.kind, tracks = references.len(), "enumerated collection");
        Ok(EnumeratedCollection { name, references })
    }

    async fn reauthenticate(&self) -> Result<(), CatalogError> {
        let token = request_token(&self.http, &self.credentials).await?;
        *self.token.write() = token;
        info!("catalog access token refreshed");
        Ok(())
    }
}

async fn request_token(http: &reqwest::Client, credentials: &Credentials) -> Result<String, CatalogError> {
    let response = http
        .post(TOKEN_URL)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let token = read_token(response).await?;
    debug!(expires_in = token.expires_in, "obtained catalog access token");
    Ok(token.access_token)
}

/// Rejected credentials are fatal; outages and throttling stay transient
async fn read_token(response: Response) -> Result<TokenResponse, CatalogError> {
    let status = response.status();
    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    ) {
        let body = response.text().await.unwrap_or_default();
        return Err(CatalogError::Authentication(format!("HTTP {status}: {body}")));
    }

    match check_status(response).await? {
        Some(response) => Ok(response.json().await?),
        None => Err(CatalogError::Authentication(format!(
            "token endpoint answered HTTP {status}"
        ))),
    }
}

/// Map error statuses onto `CatalogError`; `Ok(None)` means not found
async fn check_status(response: Response) -> Result<Option<Response>, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(Some(response));
    }
    match status {
        StatusCode::NOT_FOUND => Ok(None),
        StatusCode::UNAUTHORIZED => Err(CatalogError::CredentialExpired),
        StatusCode::TOO_MANY_REQUESTS => Err(CatalogError::RateLimited),
        status if status.is_server_error() => Err(CatalogError::Unavailable(status.as_u16())),
        status => Err(CatalogError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        }),
    }
}
