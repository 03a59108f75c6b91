//! Song types

use super::{ArtistId, GenreId};
use crate::input::{IdList, NameList};
use serde::{Deserialize, Serialize};

pub type SongId = i64;

/// A song; the canonical owner of its artist and genre relationships
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub name: String,
    /// Credited artists, in credit order
    pub artists: Vec<ArtistId>,
    /// Artist names joined with ", " at write time
    pub artist_name: String,
    /// Free-text album name
    pub album: String,
    pub image: String,
    /// Audio file URL
    pub file: String,
    pub lrc_file: Option<String>,
    pub duration: String,
    pub genres: Vec<GenreId>,
    pub created_at: String,
}

/// Data for creating a song
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    pub name: String,
    pub artists: IdList,
    pub album: String,
    pub image: String,
    pub file: String,
    pub lrc_file: Option<String>,
    pub duration: String,
    pub genres: IdList,
    /// Genre names to create (or reuse by normalized name) before tagging
    pub new_genres: NameList,
}

/// Song update; `None` keeps the stored value.
///
/// When `genres` or `new_genres` is given, the resulting genre set replaces
/// the old one. `artists` replaces the credit list when present.
#[derive(Debug, Clone, Default)]
pub struct SongUpdate {
    pub name: Option<String>,
    pub album: Option<String>,
    pub image: Option<String>,
    pub file: Option<String>,
    pub lrc_file: Option<String>,
    pub duration: Option<String>,
    pub artists: Option<IdList>,
    pub genres: Option<IdList>,
    pub new_genres: NameList,
}

impl SongUpdate {
    pub fn touches_genres(&self) -> bool {
        self.genres.is_some() || !self.new_genres.is_empty()
    }
}
