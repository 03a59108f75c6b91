//! Musicify Core
//!
//! Domain types, error handling and boundary input types shared by the
//! Musicify storage layer, server and client.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `Genre`, `Artist`, `Album`, `Playlist`, `User`
//! - **Boundary Types**: `IdList` and `NameList`, the only shapes request
//!   bodies are allowed to reach the catalog logic in
//! - **Collaborator Traits**: `ObjectUploader`, `MetadataLookup`
//! - **Error Handling**: Unified `MusicifyError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use musicify_core::{normalize_genre_name, IdList};
//!
//! assert_eq!(normalize_genre_name("  Hip-Hop!!  "), "hiphop");
//!
//! let ids: IdList = serde_json::from_value(serde_json::json!(["3", 1, 3])).unwrap();
//! assert_eq!(ids.as_slice(), &[3, 1]);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod input;
pub mod media;
pub mod normalize;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{MusicifyError, Result};
pub use input::{IdList, NameList};
pub use media::{extract_spotify_track_id, format_duration};
pub use normalize::normalize_genre_name;
pub use traits::{
    LookupArtist, MediaKind, MetadataLookup, ObjectUploader, TrackMetadata, UploadFile,
    UploadedObject,
};

pub use types::{
    Album, AlbumId, Artist, ArtistId, CreateAlbum, CreateArtist, CreateGenre, CreatePlaylist,
    Genre, GenreId, NewSong, Playlist, PlaylistId, PlaylistSummary, Song, SongId, SongUpdate,
    UpdateAlbum, UpdateArtist, UpdateGenre, UpdatePlaylist, UpsertUser, User, UserId,
};
