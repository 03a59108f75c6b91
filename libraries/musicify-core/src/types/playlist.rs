//! Playlist types

use super::{Song, UserId};
use serde::{Deserialize, Serialize};

pub type PlaylistId = i64;

/// A playlist with its songs resolved, in playlist order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub creator: UserId,
    pub is_public: bool,
    pub songs: Vec<Song>,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing entry for a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub creator: UserId,
    pub is_public: bool,
    pub song_count: i64,
    pub updated_at: String,
}

/// Data for creating a new playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylist {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub creator: UserId,
    pub is_public: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylist {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_public: Option<bool>,
}
