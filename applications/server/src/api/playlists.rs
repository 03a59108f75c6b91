/// Playlists API routes
///
/// Public playlists are readable by anyone, private ones only by their
/// creator. Every mutation is creator-only.
use crate::{
    error::{Result, ServerError},
    forms::RequestForm,
    middleware::{AuthenticatedUser, MaybeUser},
    state::AppState,
};
use axum::{extract::State, Json};
use musicify_core::{
    CreatePlaylist, MediaKind, MusicifyError, PlaylistId, PlaylistSummary, UpdatePlaylist, User,
};
use musicify_storage::playlists;
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// `playlistId`, or `id` for the playlist-level routes
fn playlist_id(form: &RequestForm) -> Result<PlaylistId> {
    match form.opt_id("playlistId")? {
        Some(id) => Ok(id),
        None => form.id("id"),
    }
}

/// Load a playlist the caller is allowed to modify
async fn owned_playlist(pool: &SqlitePool, id: PlaylistId, user: &User) -> Result<PlaylistSummary> {
    let playlist = playlists::get_summary(pool, id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Playlist", id))?;

    if playlist.creator != user.id {
        tracing::warn!(playlist_id = id, user_id = user.id, "Rejected playlist mutation");
        return Err(ServerError::Forbidden(
            "Only the creator can modify this playlist".to_string(),
        ));
    }
    Ok(playlist)
}

/// POST /api/playlist/create
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let name = form.required_text("name", "Playlist name is required")?;
    let image = match form.take_file("image") {
        Some(file) => Some(app_state.uploader.upload(file, MediaKind::Image).await?.url),
        None => None,
    };

    let playlist = playlists::create(
        app_state.pool(),
        CreatePlaylist {
            name,
            description: form.text("description").unwrap_or_default(),
            image,
            creator: auth.user().id,
            is_public: form.opt_flag("isPublic").unwrap_or(true),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Playlist created",
        "playlist": playlist,
    })))
}

/// GET /api/playlist/list
/// Public playlists plus the caller's own
pub async fn list_playlists(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<Value>> {
    let viewer = user.map(|u| u.id);
    let playlists = playlists::get_visible(app_state.pool(), viewer).await?;

    Ok(Json(json!({ "success": true, "playlists": playlists })))
}

/// GET /api/playlist/get?id=
pub async fn get_playlist(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = playlist_id(&form)?;
    let playlist = playlists::get_with_songs(app_state.pool(), id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Playlist", id))?;

    let is_creator = user.as_ref().is_some_and(|u| u.id == playlist.creator);
    if !playlist.is_public && !is_creator {
        return Err(ServerError::Forbidden("This playlist is private".to_string()));
    }

    Ok(Json(json!({ "success": true, "playlist": playlist })))
}

/// POST /api/playlist/update
pub async fn update_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let id = playlist_id(&form)?;
    owned_playlist(app_state.pool(), id, auth.user()).await?;

    let image = match form.take_file("image") {
        Some(file) => Some(app_state.uploader.upload(file, MediaKind::Image).await?.url),
        None => None,
    };

    let playlist = playlists::update(
        app_state.pool(),
        id,
        UpdatePlaylist {
            name: form.text("name"),
            description: form.text("description"),
            image,
            is_public: form.opt_flag("isPublic"),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Playlist updated",
        "playlist": playlist,
    })))
}

/// POST /api/playlist/delete
pub async fn delete_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = playlist_id(&form)?;
    owned_playlist(app_state.pool(), id, auth.user()).await?;
    playlists::delete(app_state.pool(), id).await?;

    tracing::info!(playlist_id = id, "Playlist deleted");

    Ok(Json(json!({ "success": true, "message": "Playlist deleted" })))
}

/// POST /api/playlist/add-song
pub async fn add_song(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = playlist_id(&form)?;
    let song_id = form.id("songId")?;
    owned_playlist(app_state.pool(), id, auth.user()).await?;

    if !playlists::add_song(app_state.pool(), id, song_id).await? {
        return Err(ServerError::BadRequest("Song already in playlist".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Song added to playlist" })))
}

/// POST /api/playlist/remove-song
pub async fn remove_song(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = playlist_id(&form)?;
    let song_id = form.id("songId")?;
    owned_playlist(app_state.pool(), id, auth.user()).await?;

    if !playlists::remove_song(app_state.pool(), id, song_id).await? {
        return Err(ServerError::NotFound("Song not in playlist".to_string()));
    }

    Ok(Json(json!({ "success": true, "message": "Song removed from playlist" })))
}

/// POST /api/playlist/reorder-songs
pub async fn reorder_songs(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = playlist_id(&form)?;
    let order = form.ids("songIds")?;
    owned_playlist(app_state.pool(), id, auth.user()).await?;

    playlists::reorder(app_state.pool(), id, &order).await?;

    Ok(Json(json!({ "success": true, "message": "Playlist reordered" })))
}
