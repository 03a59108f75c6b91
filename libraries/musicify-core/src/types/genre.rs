//! Genre types

use super::SongId;
use serde::{Deserialize, Serialize};

pub type GenreId = i64;

/// A music genre with its song back-references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    pub normalized_name: String,
    pub bg_color: String,
    /// Songs tagged with this genre, in tagging order
    pub song_list: Vec<SongId>,
    /// Always equal to `song_list.len()` once a mutation commits
    pub song_count: i64,
    pub created_at: String,
}

/// Data for creating a new genre
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGenre {
    pub name: String,
    pub bg_color: Option<String>,
}

impl CreateGenre {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bg_color: None,
        }
    }
}

/// Partial genre update; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGenre {
    pub name: Option<String>,
    pub bg_color: Option<String>,
}
