//! Song primitives for songsync
//!
//! This component holds the typed data model shared by every other brick:
//! - `SongReference`: what the user asked for, classified by format
//! - `ResolvedMetadata`: the catalog record a reference resolved to
//! - `MatchedMedia`: the video-platform item chosen as audio source
//!
//! Nothing in here performs I/O.
//!
//! # Examples
//!
//! ```
//! use song_primitives::{ReferenceKind, SongReference};
//!
//! let reference = SongReference::new("spotify:track:4uLU6hMCjMI75M1A2tKUQC");
//! assert_eq!(
//!     reference.kind(),
//!     ReferenceKind::CatalogTrack { id: "4uLU6hMCjMI75M1A2tKUQC".to_string() }
//! );
//! ```

mod media;
mod metadata;
mod reference;

pub use media::{format_clock, MatchHints, MatchedMedia};
pub use metadata::{AlbumInfo, ArtistCredit, AudioFeatures, ResolvedMetadata};
pub use reference::{catalog_track_url, Collection, CollectionKind, ReferenceKind, SongReference};
