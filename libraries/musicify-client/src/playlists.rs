//! Playlist operations against a Musicify server.

use crate::client::{authorized, read_json};
use crate::error::{ClientError, Result};
use crate::types::{MutationResponse, NewPlaylist, PlaylistDetail, PlaylistSummary};
use async_trait::async_trait;
use musicify_core::{PlaylistId, SongId};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// The remote side of the playlist store.
///
/// Mutations report logical refusals as `Ok(MutationResponse { success: false, .. })`;
/// `Err(ClientError::Transport(_))` means no answer arrived.
#[async_trait]
pub trait PlaylistRemote: Send + Sync {
    async fn list(&self) -> Result<Vec<PlaylistSummary>>;

    async fn get(&self, id: PlaylistId) -> Result<PlaylistDetail>;

    async fn create(&self, playlist: NewPlaylist) -> Result<PlaylistSummary>;

    async fn add_song(&self, playlist_id: PlaylistId, song_id: SongId) -> Result<MutationResponse>;

    async fn remove_song(&self, playlist_id: PlaylistId, song_id: SongId)
        -> Result<MutationResponse>;

    async fn delete(&self, playlist_id: PlaylistId) -> Result<MutationResponse>;
}

/// Playlist client bound to one server and token.
#[derive(Clone)]
pub struct PlaylistClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct PlaylistList {
    playlists: Vec<PlaylistSummary>,
}

#[derive(Deserialize)]
struct PlaylistEnvelope<T> {
    playlist: T,
}

impl PlaylistClient {
    pub(crate) fn new(http: Client, base_url: String, access_token: Option<String>) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/api/playlist/{}", self.base_url, route)
    }

    async fn mutate(&self, route: &str, body: Value) -> Result<MutationResponse> {
        let url = self.endpoint(route);
        debug!(url = %url, "Sending playlist mutation");

        let response = authorized(self.http.post(&url), self.access_token.as_deref())
            .json(&body)
            .send()
            .await?;

        read_mutation(response).await
    }

    /// Set the song order. `song_ids` must list every song in the playlist once.
    pub async fn reorder(
        &self,
        playlist_id: PlaylistId,
        song_ids: &[SongId],
    ) -> Result<MutationResponse> {
        self.mutate(
            "reorder-songs",
            json!({ "playlistId": playlist_id, "songIds": song_ids }),
        )
        .await
    }
}

/// Decode a mutation envelope, whatever the status code.
///
/// Only a body that is not an envelope at all becomes an error.
async fn read_mutation(response: Response) -> Result<MutationResponse> {
    let status = response.status();
    let text = response.text().await?;

    match serde_json::from_str::<MutationResponse>(&text) {
        Ok(parsed) => {
            if !parsed.success {
                debug!(status = status.as_u16(), message = ?parsed.message, "Mutation refused");
            }
            Ok(parsed)
        }
        Err(e) if status.is_success() => Err(ClientError::Parse(format!(
            "Failed to parse mutation response: {}",
            e
        ))),
        Err(_) => Err(ClientError::Server {
            status: status.as_u16(),
            message: text,
        }),
    }
}

#[async_trait]
impl PlaylistRemote for PlaylistClient {
    async fn list(&self) -> Result<Vec<PlaylistSummary>> {
        let url = self.endpoint("list");
        debug!(url = %url, "Fetching playlists");

        let response = authorized(self.http.get(&url), self.access_token.as_deref())
            .send()
            .await?;
        let list: PlaylistList = read_json(response).await?;

        debug!(playlists = list.playlists.len(), "Fetched playlists");
        Ok(list.playlists)
    }

    async fn get(&self, id: PlaylistId) -> Result<PlaylistDetail> {
        let url = self.endpoint("get");
        debug!(url = %url, playlist_id = id, "Fetching playlist");

        let response = authorized(self.http.get(&url), self.access_token.as_deref())
            .query(&[("id", id)])
            .send()
            .await?;
        let envelope: PlaylistEnvelope<PlaylistDetail> = read_json(response).await?;
        Ok(envelope.playlist)
    }

    async fn create(&self, playlist: NewPlaylist) -> Result<PlaylistSummary> {
        let url = self.endpoint("create");
        let request = authorized(self.http.post(&url), self.access_token.as_deref());

        let request = match playlist.image {
            Some(image) => {
                let part = Part::bytes(image.data)
                    .file_name(image.file_name)
                    .mime_str(&image.content_type)
                    .map_err(|e| {
                        ClientError::Parse(format!("Invalid image content type: {}", e))
                    })?;
                let form = Form::new()
                    .text("name", playlist.name)
                    .text("description", playlist.description)
                    .text("isPublic", playlist.is_public.to_string())
                    .part("image", part);
                request.multipart(form)
            }
            None => request.json(&json!({
                "name": playlist.name,
                "description": playlist.description,
                "isPublic": playlist.is_public,
            })),
        };

        let envelope: PlaylistEnvelope<PlaylistSummary> = read_json(request.send().await?).await?;
        debug!(playlist_id = envelope.playlist.id, "Created playlist");
        Ok(envelope.playlist)
    }

    async fn add_song(&self, playlist_id: PlaylistId, song_id: SongId) -> Result<MutationResponse> {
        self.mutate(
            "add-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
        )
        .await
    }

    async fn remove_song(
        &self,
        playlist_id: PlaylistId,
        song_id: SongId,
    ) -> Result<MutationResponse> {
        self.mutate(
            "remove-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
        )
        .await
    }

    async fn delete(&self, playlist_id: PlaylistId) -> Result<MutationResponse> {
        self.mutate("delete", json!({ "id": playlist_id })).await
    }
}
