use crate::error::CatalogError;
use async_trait::async_trait;
use song_primitives::{Collection, ResolvedMetadata, SongReference};

/// The tracks of a playlist, album or user
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedCollection {
    pub name: String,
    pub references: Vec<SongReference>,
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Resolve a catalog URL or a free-text query to a track
    ///
    /// An unknown track or an empty search result is `Ok(None)`.
    async fn resolve(&self, query: &str) -> Result<Option<ResolvedMetadata>, CatalogError>;

    async fn enumerate(&self, collection: &Collection) -> Result<EnumeratedCollection, CatalogError>;

    /// Replace the current access token with a fresh one
    async fn reauthenticate(&self) -> Result<(), CatalogError>;
}
