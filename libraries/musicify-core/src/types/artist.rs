//! Artist types

use super::GenreId;
use serde::{Deserialize, Serialize};

pub type ArtistId = i64;

/// An artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub image: String,
    pub bg_color: String,
    /// Union of the genres of every song crediting this artist
    pub genres: Vec<GenreId>,
    pub created_at: String,
}

/// Data for creating a new artist
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtist {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub bg_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtist {
    pub name: Option<String>,
    pub image: Option<String>,
    pub bg_color: Option<String>,
}
