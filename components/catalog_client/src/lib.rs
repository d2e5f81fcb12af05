//! Catalog-service client: track resolution and collection enumeration.
//!
//! `CatalogService` is the seam the download pipeline depends on;
//! `SpotifyClient` implements it against the Spotify Web API. Wire JSON is
//! deserialized into the private `api` types and flattened into
//! `ResolvedMetadata` by `mapping`, so nothing downstream walks raw JSON.
mod api;
mod error;
mod lyrics;
mod mapping;
mod spotify;
mod types;

pub use error::CatalogError;
pub use lyrics::{LrcLib, LyricsProvider, LyricsQuery};
pub use spotify::{Credentials, SpotifyClient};
pub use types::{CatalogService, EnumeratedCollection};
