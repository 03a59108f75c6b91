//! Album types
//!
//! Songs refer to albums by name only, so renaming an album does not touch
//! its songs.

use serde::{Deserialize, Serialize};

pub type AlbumId = i64;

/// An album
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub desc: String,
    pub image: String,
    pub bg_color: String,
    pub created_at: String,
}

/// Data for creating a new album
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbum {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub image: String,
    pub bg_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbum {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub image: Option<String>,
    pub bg_color: Option<String>,
}
